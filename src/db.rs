use anyhow::Result;
use rusqlite::Connection;

// AUTOINCREMENT keeps deleted ids from being reassigned; the content CHECK
// mirrors the validation-layer minimum so a bypassed insert still fails.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tasks (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    content   TEXT NOT NULL CHECK(length(trim(content)) >= 3),
    category  TEXT NOT NULL DEFAULT 'General',
    deadline  TEXT,
    location  TEXT,
    completed INTEGER NOT NULL DEFAULT 0 CHECK(completed IN (0, 1))
);
";

fn set_pragmas(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;",
    )?;
    Ok(())
}

pub fn open(path: &str) -> Result<Connection> {
    let conn = Connection::open(path)?;
    set_pragmas(&conn)?;
    Ok(conn)
}

pub fn init(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

#[cfg(test)]
pub fn open_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    set_pragmas(&conn)?;
    init(&conn)?;
    Ok(conn)
}
