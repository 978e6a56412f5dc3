use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection};

use crate::models::{SheetOptions, Song};

/// Orderings offered by the song list. `Newest` reproduces the classic
/// most-recently-added-first view; the text sorts are case-insensitive so
/// mixed-case titles group together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Title,
    Artist,
    Newest,
}

impl SortOrder {
    /// The ORDER BY clause backing this sort. Static strings only; nothing
    /// user-supplied is ever spliced into SQL.
    fn clause(self) -> &'static str {
        match self {
            SortOrder::Title => "title COLLATE NOCASE, artist COLLATE NOCASE",
            SortOrder::Artist => "artist COLLATE NOCASE, title COLLATE NOCASE",
            SortOrder::Newest => "id DESC",
        }
    }

    /// Label shown in the list header.
    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Title => "title",
            SortOrder::Artist => "artist",
            SortOrder::Newest => "newest",
        }
    }

    /// Advance to the next sort in the cycle.
    pub fn next(self) -> Self {
        match self {
            SortOrder::Title => SortOrder::Artist,
            SortOrder::Artist => SortOrder::Newest,
            SortOrder::Newest => SortOrder::Title,
        }
    }
}

/// Which metadata column a search runs against. Kept as an enum so the
/// column name is whitelisted rather than interpolated from user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchField {
    #[default]
    Title,
    Artist,
    Key,
}

impl SearchField {
    fn column(self) -> &'static str {
        match self {
            SearchField::Title => "title",
            SearchField::Artist => "artist",
            SearchField::Key => "key",
        }
    }

    /// Label shown next to the search prompt.
    pub fn label(self) -> &'static str {
        self.column()
    }

    /// Advance to the next searchable field.
    pub fn next(self) -> Self {
        match self {
            SearchField::Title => SearchField::Artist,
            SearchField::Artist => SearchField::Key,
            SearchField::Key => SearchField::Title,
        }
    }
}

/// Fetch the whole catalog in the requested order.
pub fn fetch_all_songs(conn: &Connection, sort: SortOrder) -> Result<Vec<Song>> {
    let sql = format!(
        "SELECT id, title, artist, key FROM songs ORDER BY {}",
        sort.clause()
    );
    let mut stmt = conn
        .prepare(&sql)
        .context("failed to prepare song list query")?;

    let songs = stmt
        .query_map([], |row| {
            Ok(Song {
                id: row.get(0)?,
                title: row.get(1)?,
                artist: row.get(2)?,
                key: row.get(3)?,
            })
        })
        .context("failed to iterate songs")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect songs")?;

    Ok(songs)
}

/// Substring search over one metadata field, in the requested order. An
/// empty term behaves like [`fetch_all_songs`].
pub fn search_songs(
    conn: &Connection,
    field: SearchField,
    term: &str,
    sort: SortOrder,
) -> Result<Vec<Song>> {
    let sql = format!(
        "SELECT id, title, artist, key FROM songs WHERE {} LIKE ?1 ORDER BY {}",
        field.column(),
        sort.clause()
    );
    let mut stmt = conn
        .prepare(&sql)
        .context("failed to prepare song search query")?;

    let pattern = format!("%{}%", term.trim());
    let songs = stmt
        .query_map([pattern], |row| {
            Ok(Song {
                id: row.get(0)?,
                title: row.get(1)?,
                artist: row.get(2)?,
                key: row.get(3)?,
            })
        })
        .context("failed to iterate search results")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect search results")?;

    Ok(songs)
}

/// Load the stored lyric text and layout options for the edit form. The
/// text is authoritative: editing never round-trips through the PDF.
pub fn fetch_lyrics(conn: &Connection, id: i64) -> Result<(String, SheetOptions)> {
    conn.query_row(
        "SELECT lyrics, font_size, show_header, show_page_numbers FROM songs WHERE id = ?1",
        [id],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                SheetOptions {
                    font_size: row.get::<_, i64>(1)? as u8,
                    show_header: row.get::<_, bool>(2)?,
                    show_page_numbers: row.get::<_, bool>(3)?,
                },
            ))
        },
    )
    .context("song not found")
}

/// Fetch the rendered PDF blob, if the song has one.
pub fn fetch_pdf(conn: &Connection, id: i64) -> Result<Option<Vec<u8>>> {
    conn.query_row("SELECT pdf FROM songs WHERE id = ?1", [id], |row| {
        row.get::<_, Option<Vec<u8>>>(0)
    })
    .context("song not found")
}

/// Insert a brand new song with its rendered sheet. The hydrated struct is
/// echoed back so callers can update UI state without re-querying.
pub fn create_song(
    conn: &Connection,
    title: &str,
    artist: &str,
    key: &str,
    lyrics: &str,
    options: SheetOptions,
    pdf: &[u8],
) -> Result<Song> {
    conn.execute(
        "INSERT INTO songs (title, artist, key, lyrics, font_size, show_header, show_page_numbers, pdf)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            title,
            artist,
            key,
            lyrics,
            i64::from(options.font_size),
            options.show_header,
            options.show_page_numbers,
            pdf
        ],
    )
    .context("failed to insert song")?;

    let id = conn.last_insert_rowid();
    Ok(Song {
        id,
        title: title.to_string(),
        artist: artist.to_string(),
        key: key.to_string(),
    })
}

/// Update every editable field plus the freshly rendered sheet. Surfaces an
/// explicit error when zero rows are touched.
#[allow(clippy::too_many_arguments)]
pub fn update_song(
    conn: &Connection,
    id: i64,
    title: &str,
    artist: &str,
    key: &str,
    lyrics: &str,
    options: SheetOptions,
    pdf: &[u8],
) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE songs SET title = ?1, artist = ?2, key = ?3, lyrics = ?4,
             font_size = ?5, show_header = ?6, show_page_numbers = ?7, pdf = ?8
             WHERE id = ?9",
            params![
                title,
                artist,
                key,
                lyrics,
                i64::from(options.font_size),
                options.show_header,
                options.show_page_numbers,
                pdf,
                id
            ],
        )
        .context("failed to update song")?;

    if updated == 0 {
        Err(anyhow!("Song not found"))
    } else {
        Ok(())
    }
}

/// Permanently delete a song. The join table cascades automatically so
/// groups lose the entry without additional cleanup.
pub fn delete_song(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM songs WHERE id = ?1", params![id])
        .context("failed to delete song")?;

    if deleted == 0 {
        Err(anyhow!("Song not found"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::apply_schema;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().expect("in-memory db");
        apply_schema(&conn).expect("schema");
        conn
    }

    fn seed(conn: &Connection, title: &str, artist: &str, key: &str) -> Song {
        create_song(
            conn,
            title,
            artist,
            key,
            "la la",
            SheetOptions::default(),
            b"%PDF-stub",
        )
        .expect("insert")
    }

    #[test]
    fn crud_round_trip() {
        let conn = test_conn();
        let song = seed(&conn, "Amazing Grace", "John Newton", "G");

        let all = fetch_all_songs(&conn, SortOrder::Title).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "Amazing Grace");

        update_song(
            &conn,
            song.id,
            "Amazing Grace",
            "Traditional",
            "A",
            "new text",
            SheetOptions {
                font_size: 14,
                show_header: false,
                show_page_numbers: true,
            },
            b"%PDF-new",
        )
        .unwrap();
        let (lyrics, options) = fetch_lyrics(&conn, song.id).unwrap();
        assert_eq!(lyrics, "new text");
        assert_eq!(options.font_size, 14);
        assert!(!options.show_header);

        delete_song(&conn, song.id).unwrap();
        assert!(fetch_all_songs(&conn, SortOrder::Title).unwrap().is_empty());
        assert!(delete_song(&conn, song.id).is_err());
    }

    #[test]
    fn search_is_scoped_to_the_requested_field() {
        let conn = test_conn();
        seed(&conn, "Grace Notes", "Someone", "C");
        seed(&conn, "Other", "Grace Jones", "D");

        let by_title = search_songs(&conn, SearchField::Title, "grace", SortOrder::Title).unwrap();
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].title, "Grace Notes");

        let by_artist =
            search_songs(&conn, SearchField::Artist, "grace", SortOrder::Title).unwrap();
        assert_eq!(by_artist.len(), 1);
        assert_eq!(by_artist[0].artist, "Grace Jones");
    }

    #[test]
    fn newest_sort_puts_latest_insert_first() {
        let conn = test_conn();
        seed(&conn, "First", "", "");
        seed(&conn, "Second", "", "");
        let songs = fetch_all_songs(&conn, SortOrder::Newest).unwrap();
        assert_eq!(songs[0].title, "Second");
    }

    #[test]
    fn pdf_blob_survives_storage() {
        let conn = test_conn();
        let song = seed(&conn, "Stored", "", "");
        let pdf = fetch_pdf(&conn, song.id).unwrap();
        assert_eq!(pdf.as_deref(), Some(&b"%PDF-stub"[..]));
    }
}
