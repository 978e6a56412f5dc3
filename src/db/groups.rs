use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, Error as SqlError, ErrorCode};

use crate::models::{Group, Song};

/// Retrieve every group ordered by name. The query doubles as the single
/// source of truth for how groups are ordered in the UI.
pub fn fetch_groups(conn: &Connection) -> Result<Vec<Group>> {
    let mut stmt = conn
        .prepare("SELECT id, name FROM groups ORDER BY name COLLATE NOCASE")
        .context("failed to prepare group query")?;

    let groups = stmt
        .query_map([], |row| {
            Ok(Group {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
        .context("failed to load groups")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect groups")?;

    Ok(groups)
}

/// Insert a new group row, returning the hydrated struct so the caller can
/// push it straight into the in-memory list.
pub fn create_group(conn: &Connection, name: &str) -> Result<Group> {
    conn.execute("INSERT INTO groups (name) VALUES (?1)", params![name])
        .map_err(|err| map_unique_constraint(err, name))
        .context("failed to insert group")?;

    let id = conn.last_insert_rowid();
    Ok(Group {
        id,
        name: name.to_string(),
    })
}

/// Rename an existing group, surfacing a friendly error when nothing was
/// updated or the new name collides with another group.
pub fn update_group(conn: &Connection, id: i64, name: &str) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE groups SET name = ?1 WHERE id = ?2",
            params![name, id],
        )
        .map_err(|err| map_unique_constraint(err, name))
        .context("failed to update group")?;

    if updated == 0 {
        Err(anyhow!("Group not found"))
    } else {
        Ok(())
    }
}

/// Remove a group row. The schema cascades to `group_songs`, so membership
/// rows disappear without manual cleanup.
pub fn delete_group(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM groups WHERE id = ?1", params![id])
        .context("failed to delete group")?;

    if deleted == 0 {
        Err(anyhow!("Group not found"))
    } else {
        Ok(())
    }
}

/// Get every song linked to a specific group, for the detail view.
pub fn fetch_songs_for_group(conn: &Connection, group_id: i64) -> Result<Vec<Song>> {
    let mut stmt = conn
        .prepare(
            "SELECT s.id, s.title, s.artist, s.key
             FROM songs s
             INNER JOIN group_songs gs ON gs.song_id = s.id
             WHERE gs.group_id = ?1
             ORDER BY s.title COLLATE NOCASE, s.artist COLLATE NOCASE",
        )
        .context("failed to prepare group songs query")?;

    let songs = stmt
        .query_map([group_id], |row| {
            Ok(Song {
                id: row.get(0)?,
                title: row.get(1)?,
                artist: row.get(2)?,
                key: row.get(3)?,
            })
        })
        .context("failed to iterate group songs")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect group songs")?;

    Ok(songs)
}

/// Return songs not yet assigned to a given group, so the picker shows only
/// eligible options.
pub fn fetch_available_songs(conn: &Connection, group_id: i64) -> Result<Vec<Song>> {
    let mut stmt = conn
        .prepare(
            "SELECT s.id, s.title, s.artist, s.key
             FROM songs s
             WHERE NOT EXISTS (
                 SELECT 1 FROM group_songs gs WHERE gs.song_id = s.id AND gs.group_id = ?1
             )
             ORDER BY s.title COLLATE NOCASE, s.artist COLLATE NOCASE",
        )
        .context("failed to prepare available songs query")?;

    let songs = stmt
        .query_map([group_id], |row| {
            Ok(Song {
                id: row.get(0)?,
                title: row.get(1)?,
                artist: row.get(2)?,
                key: row.get(3)?,
            })
        })
        .context("failed to iterate available songs")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect available songs")?;

    Ok(songs)
}

/// Create a membership link. `INSERT OR IGNORE` makes repeated requests
/// idempotent, which simplifies state management in the UI.
pub fn add_song_to_group(conn: &Connection, group_id: i64, song_id: i64) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO group_songs (group_id, song_id) VALUES (?1, ?2)",
        params![group_id, song_id],
    )
    .context("failed to link song to group")?;
    Ok(())
}

/// Remove a membership link and surface a descriptive error if it never
/// existed.
pub fn remove_song_from_group(conn: &Connection, group_id: i64, song_id: i64) -> Result<()> {
    let deleted = conn
        .execute(
            "DELETE FROM group_songs WHERE group_id = ?1 AND song_id = ?2",
            params![group_id, song_id],
        )
        .context("failed to unlink song from group")?;

    if deleted == 0 {
        Err(anyhow!("Song not in this group"))
    } else {
        Ok(())
    }
}

/// Coerce SQLite constraint errors into human-readable messages. The only
/// constraint guarded today is group-name uniqueness.
fn map_unique_constraint(err: SqlError, name: &str) -> anyhow::Error {
    if matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::ConstraintViolation)
    ) {
        anyhow!("A group named \"{name}\" already exists.")
    } else {
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::apply_schema;
    use crate::db::songs::create_song;
    use crate::models::SheetOptions;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().expect("in-memory db");
        apply_schema(&conn).expect("schema");
        conn
    }

    fn seed_song(conn: &Connection, title: &str) -> Song {
        create_song(conn, title, "", "", "", SheetOptions::default(), b"%PDF")
            .expect("insert song")
    }

    #[test]
    fn membership_round_trip() {
        let conn = test_conn();
        let group = create_group(&conn, "Sunday Service").unwrap();
        let song = seed_song(&conn, "Doxology");
        let other = seed_song(&conn, "Unassigned");

        add_song_to_group(&conn, group.id, song.id).unwrap();
        // repeated link stays idempotent
        add_song_to_group(&conn, group.id, song.id).unwrap();

        let members = fetch_songs_for_group(&conn, group.id).unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].title, "Doxology");

        let available = fetch_available_songs(&conn, group.id).unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, other.id);

        remove_song_from_group(&conn, group.id, song.id).unwrap();
        assert!(remove_song_from_group(&conn, group.id, song.id).is_err());
    }

    #[test]
    fn duplicate_group_names_are_rejected_with_a_friendly_message() {
        let conn = test_conn();
        create_group(&conn, "Advent").unwrap();
        let err = create_group(&conn, "Advent").unwrap_err();
        assert!(err.chain().any(|cause| cause
            .to_string()
            .contains("already exists")));
    }

    #[test]
    fn deleting_a_group_cascades_membership_but_keeps_songs() {
        let conn = test_conn();
        let group = create_group(&conn, "Lent").unwrap();
        let song = seed_song(&conn, "Kept");
        add_song_to_group(&conn, group.id, song.id).unwrap();

        delete_group(&conn, group.id).unwrap();
        let remaining: i64 = conn
            .query_row("SELECT COUNT(*) FROM group_songs", [], |row| row.get(0))
            .unwrap();
        assert_eq!(remaining, 0);
        let songs: i64 = conn
            .query_row("SELECT COUNT(*) FROM songs", [], |row| row.get(0))
            .unwrap();
        assert_eq!(songs, 1);
    }
}
