//! Domain models that mirror the SQLite schema and get passed throughout the
//! TUI. These types stay light-weight data holders so the other layers can
//! focus on presentation, layout, and persistence logic; anything heavier
//! (the rendered PDF blob, the lyric text) is fetched on demand by id rather
//! than dragged around with every list row.

use std::fmt;

#[derive(Debug, Clone)]
/// Catalog row for a song sheet. Mirrors the `songs` table minus the lyric
/// text and PDF blob, which list views never need.
pub struct Song {
    /// Primary key from the SQLite store. Edit/delete/open flows bubble the
    /// id back to the persistence layer, so we keep it even in display-only
    /// contexts.
    pub id: i64,
    /// Title shown in lists and stamped on the rendered sheet header.
    pub title: String,
    /// Artist field; may be blank for traditional or unattributed songs.
    pub artist: String,
    /// Musical key as free text ("G", "Cm", "Lá"). Blank when unknown.
    pub key: String,
}

impl Song {
    /// Compose an `Artist • Key` summary that gracefully drops whichever
    /// side is blank. The same separator appears on the rendered sheet, so
    /// list rows and printed headers read identically.
    pub fn summary(&self) -> String {
        join_summary(&self.artist, &self.key)
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.summary();
        if summary.is_empty() {
            write!(f, "{}", self.title)
        } else {
            write!(f, "{} — {}", self.title, summary)
        }
    }
}

/// Join artist and key with the `•` separator, omitting blank sides.
pub fn join_summary(artist: &str, key: &str) -> String {
    let artist = artist.trim();
    let key = key.trim();
    match (artist.is_empty(), key.is_empty()) {
        (true, true) => String::new(),
        (false, true) => artist.to_string(),
        (true, false) => key.to_string(),
        (false, false) => format!("{artist} • {key}"),
    }
}

#[derive(Debug, Clone)]
/// Named group of songs (a set list, a service, a binder). `group_songs`
/// rows link these to songs many-to-many.
pub struct Group {
    /// Primary key from the database.
    pub id: i64,
    /// User-facing group name, unique across the table.
    pub name: String,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Per-song layout options persisted alongside the metadata so that editing
/// a song reopens the form with the settings its sheet was rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetOptions {
    /// Body font size in points. Valid range is 8–16; forms enforce it.
    pub font_size: u8,
    /// Render the centered title/artist header on page 1.
    pub show_header: bool,
    /// Stamp page numbers in the bottom corner of every page.
    pub show_page_numbers: bool,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            font_size: 11,
            show_header: true,
            show_page_numbers: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_omits_blank_sides() {
        assert_eq!(join_summary("João Gilberto", "D"), "João Gilberto • D");
        assert_eq!(join_summary("João Gilberto", ""), "João Gilberto");
        assert_eq!(join_summary("  ", "Em"), "Em");
        assert_eq!(join_summary("", ""), "");
    }
}
