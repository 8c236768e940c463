use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, Row};
use thiserror::Error;

use crate::model::{NewTask, Task};

const DEADLINE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task {0} not found")]
    NotFound(i64),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

const TASK_COLUMNS: &str = "id, content, category, deadline, location, completed";

fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    let deadline: Option<String> = row.get(3)?;
    let deadline = deadline
        .map(|s| {
            NaiveDateTime::parse_from_str(&s, DEADLINE_FORMAT).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    3,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })
        })
        .transpose()?;
    Ok(Task {
        id: row.get(0)?,
        content: row.get(1)?,
        category: row.get(2)?,
        deadline,
        location: row.get(4)?,
        completed: row.get::<_, i64>(5)? != 0,
    })
}

pub fn create_task(conn: &Connection, new: &NewTask) -> Result<Task, StoreError> {
    conn.execute(
        "INSERT INTO tasks (content, category, deadline, location) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            new.content,
            new.category,
            new.deadline.format(DEADLINE_FORMAT).to_string(),
            new.location,
        ],
    )?;
    get_task(conn, conn.last_insert_rowid())
}

/// Every task, open ones first, each group ordered by deadline. Rows without
/// a deadline sort before dated ones within their group (SQLite ascending
/// NULL order); the create path always stores a deadline, so such rows only
/// come from legacy data.
pub fn list_tasks(conn: &Connection) -> Result<Vec<Task>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks ORDER BY completed, deadline"
    ))?;
    let rows = stmt.query_map([], row_to_task)?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
}

pub fn get_task(conn: &Connection, id: i64) -> Result<Task, StoreError> {
    conn.query_row(
        &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
        [id],
        row_to_task,
    )
    .optional()?
    .ok_or(StoreError::NotFound(id))
}

pub fn set_completed(conn: &Connection, id: i64, completed: bool) -> Result<(), StoreError> {
    let changed = conn.execute(
        "UPDATE tasks SET completed = ?1 WHERE id = ?2",
        rusqlite::params![completed, id],
    )?;
    if changed == 0 {
        return Err(StoreError::NotFound(id));
    }
    Ok(())
}

/// Removes the row and returns the deleted record so callers can name it.
pub fn delete_task(conn: &Connection, id: i64) -> Result<Task, StoreError> {
    let task = get_task(conn, id)?;
    conn.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
    Ok(task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use chrono::NaiveDate;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    fn new_task(content: &str, deadline: NaiveDateTime) -> NewTask {
        NewTask {
            content: content.to_string(),
            category: "General".to_string(),
            deadline,
            location: None,
        }
    }

    #[test]
    fn create_and_get_round_trip() {
        let conn = db::open_memory().unwrap();
        let new = NewTask {
            content: "Buy milk".to_string(),
            category: "Errands".to_string(),
            deadline: at(2099, 1, 1, 9, 30),
            location: Some("123 Main St".to_string()),
        };
        let created = create_task(&conn, &new).unwrap();
        let fetched = get_task(&conn, created.id).unwrap();
        assert_eq!(fetched.content, "Buy milk");
        assert_eq!(fetched.category, "Errands");
        assert_eq!(fetched.deadline, Some(at(2099, 1, 1, 9, 30)));
        assert_eq!(fetched.location.as_deref(), Some("123 Main St"));
        assert!(!fetched.completed);
    }

    #[test]
    fn incomplete_tasks_list_before_completed() {
        let conn = db::open_memory().unwrap();
        // The completed task has the earlier deadline; it must still sort last.
        let done = create_task(&conn, &new_task("write report", at(2099, 1, 1, 9, 0))).unwrap();
        let open = create_task(&conn, &new_task("send report", at(2099, 6, 1, 9, 0))).unwrap();
        set_completed(&conn, done.id, true).unwrap();

        let tasks = list_tasks(&conn).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, open.id);
        assert_eq!(tasks[1].id, done.id);
    }

    #[test]
    fn open_tasks_ordered_by_deadline() {
        let conn = db::open_memory().unwrap();
        let later = create_task(&conn, &new_task("later", at(2099, 12, 1, 17, 0))).unwrap();
        let sooner = create_task(&conn, &new_task("sooner", at(2099, 1, 1, 17, 0))).unwrap();

        let tasks = list_tasks(&conn).unwrap();
        assert_eq!(tasks[0].id, sooner.id);
        assert_eq!(tasks[1].id, later.id);
    }

    #[test]
    fn legacy_rows_without_deadline_sort_first_in_group() {
        let conn = db::open_memory().unwrap();
        let dated = create_task(&conn, &new_task("has deadline", at(2099, 1, 1, 17, 0))).unwrap();
        conn.execute(
            "INSERT INTO tasks (content, category) VALUES ('no deadline', 'General')",
            [],
        )
        .unwrap();

        let tasks = list_tasks(&conn).unwrap();
        assert_eq!(tasks[0].content, "no deadline");
        assert_eq!(tasks[0].deadline, None);
        assert_eq!(tasks[1].id, dated.id);
    }

    #[test]
    fn toggle_twice_restores_original_state() {
        let conn = db::open_memory().unwrap();
        let task = create_task(&conn, &new_task("Buy milk", at(2099, 1, 1, 17, 0))).unwrap();

        set_completed(&conn, task.id, true).unwrap();
        assert!(get_task(&conn, task.id).unwrap().completed);

        set_completed(&conn, task.id, false).unwrap();
        let back = get_task(&conn, task.id).unwrap();
        assert!(!back.completed);
        assert_eq!(back.content, task.content);
        assert_eq!(back.deadline, task.deadline);
    }

    #[test]
    fn delete_then_reuse_id_is_not_found() {
        let conn = db::open_memory().unwrap();
        let task = create_task(&conn, &new_task("Buy milk", at(2099, 1, 1, 17, 0))).unwrap();
        let deleted = delete_task(&conn, task.id).unwrap();
        assert_eq!(deleted.content, "Buy milk");

        assert!(matches!(
            delete_task(&conn, task.id),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            set_completed(&conn, task.id, true),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let conn = db::open_memory().unwrap();
        let first = create_task(&conn, &new_task("first task", at(2099, 1, 1, 17, 0))).unwrap();
        delete_task(&conn, first.id).unwrap();
        let second = create_task(&conn, &new_task("second task", at(2099, 1, 1, 17, 0))).unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn schema_rejects_short_content() {
        let conn = db::open_memory().unwrap();
        let result = conn.execute(
            "INSERT INTO tasks (content, category) VALUES ('Hi', 'General')",
            [],
        );
        assert!(result.is_err());
    }
}
