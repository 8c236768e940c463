use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use taskboard::{db, server};

#[derive(Parser)]
#[command(name = "taskboard", about = "Deadline-aware task board over plain HTML forms")]
struct Cli {
    /// Path to the SQLite database [default: ~/.taskboard/taskboard.db]
    #[arg(long, env = "TASKBOARD_DB")]
    db: Option<String>,

    /// Address to listen on
    #[arg(long, env = "TASKBOARD_LISTEN", default_value = "127.0.0.1:8080")]
    listen: SocketAddr,

    /// Directory served under /static
    #[arg(long, env = "TASKBOARD_ASSETS", default_value = "static")]
    assets: PathBuf,
}

fn default_db_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".taskboard").join("taskboard.db"))
}

fn resolve_db_path(cli_db: Option<String>) -> Result<String> {
    match cli_db {
        Some(p) => Ok(p),
        None => {
            let path = default_db_path()?;
            Ok(path
                .to_str()
                .context("default DB path is not valid UTF-8")?
                .to_string())
        }
    }
}

fn ensure_db_dir(db_path: &str) -> Result<()> {
    if let Some(parent) = std::path::Path::new(db_path).parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let db_path = resolve_db_path(cli.db)?;
    ensure_db_dir(&db_path)?;
    let conn = db::open(&db_path)?;
    db::init(&conn)?;

    let app = server::router(conn, cli.assets);
    let listener = tokio::net::TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("failed to bind {}", cli.listen))?;
    log::info!("listening on http://{} (db: {db_path})", cli.listen);
    axum::serve(listener, app).await?;
    Ok(())
}
