use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use rusqlite::Connection;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".song-sheet-manager";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "songs.sqlite";

/// Ensure the database file exists, run lazy migrations, and return a live
/// connection. Foreign keys are switched on so the cascade rules in the
/// schema behave the same during tests and production runs.
pub fn ensure_schema() -> Result<Connection> {
    let db_path = db_path()?;

    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let conn = Connection::open(&db_path).context("failed to open SQLite database")?;
    apply_schema(&conn)?;
    Ok(conn)
}

/// Create the tables on a connection. Split out from [`ensure_schema`] so
/// tests can run the identical schema against an in-memory database.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign keys")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS songs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            artist TEXT NOT NULL DEFAULT '',
            key TEXT NOT NULL DEFAULT '',
            lyrics TEXT NOT NULL DEFAULT '',
            font_size INTEGER NOT NULL DEFAULT 11,
            show_header INTEGER NOT NULL DEFAULT 1,
            show_page_numbers INTEGER NOT NULL DEFAULT 1,
            pdf BLOB
        )",
        [],
    )
    .context("failed to create songs table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS groups (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )",
        [],
    )
    .context("failed to create groups table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS group_songs (
            group_id INTEGER NOT NULL,
            song_id INTEGER NOT NULL,
            PRIMARY KEY (group_id, song_id),
            FOREIGN KEY(group_id) REFERENCES groups(id) ON DELETE CASCADE,
            FOREIGN KEY(song_id) REFERENCES songs(id) ON DELETE CASCADE
        )",
        [],
    )
    .context("failed to create group_songs table")?;

    Ok(())
}

/// Write a consistent snapshot of the database next to the live file using
/// `VACUUM INTO`, which takes its own read transaction and therefore cannot
/// observe a half-applied write. Returns the snapshot path.
pub fn backup_database(conn: &Connection) -> Result<PathBuf> {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock is before the unix epoch")?
        .as_secs();
    let target = db_path()?
        .with_file_name(format!("songs-backup-{stamp}.sqlite"));
    let target_str = target
        .to_str()
        .ok_or_else(|| anyhow!("backup path is not valid UTF-8"))?;
    conn.execute("VACUUM INTO ?1", [target_str])
        .context("failed to back up database")?;
    Ok(target)
}

/// Resolve the absolute path to the SQLite database inside the user's home.
fn db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}
