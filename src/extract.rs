//! Best-effort field extraction from recovered sheet text.
//!
//! Import recovers a plain-text blob from an existing PDF and this module
//! splits it into title / artist / key / body using line heuristics: the
//! first non-blank line is the title, the second is scanned for a known
//! delimiter between artist and key, and a musical-key vocabulary catches
//! the delimiter-less `John Doe G` shape. The rules are deliberately
//! forgiving — a miss leaves fields blank for the user to fill in on the
//! confirmation form rather than failing the import. The one hard error is
//! a document too short to even carry a title and an artist line.

use thiserror::Error;

/// Errors surfaced by the extractor.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// Fewer than two non-blank lines: there is nothing to even call a
    /// title, so the import is rejected outright.
    #[error("document needs at least a title line and an artist/key line")]
    InsufficientContent,
}

/// Fields recovered from raw text. Blank title/artist/key are expected
/// outcomes of the heuristics, not errors; the confirmation form lets the
/// user repair them before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
    pub title: String,
    pub artist: String,
    pub key: String,
    /// Lyric lines with interior blank lines (stanza gaps) preserved.
    pub body: Vec<String>,
}

/// Artist/key delimiters in priority order: the list position decides the
/// tie-break when a line contains several candidates, not their position in
/// the string.
const DELIMITERS: [char; 7] = ['•', '-', '|', ':', ';', '–', '—'];

/// Lowercased musical-key vocabulary: naturals with optional accidental and
/// minor suffix, plus the Portuguese solfège spellings (accented and
/// plain). Matched case-insensitively against the last token of the
/// artist line when no delimiter is present.
const KEY_VOCABULARY: [&str; 64] = [
    "c", "c#", "cb", "cm", "c#m", "cbm", "d", "d#", "db", "dm", "d#m", "dbm",
    "e", "e#", "eb", "em", "e#m", "ebm", "f", "f#", "fb", "fm", "f#m", "fbm",
    "g", "g#", "gb", "gm", "g#m", "gbm", "a", "a#", "ab", "am", "a#m", "abm",
    "b", "b#", "bb", "bm", "b#m", "bbm", "dó", "do", "dóm", "dom", "ré",
    "re", "rém", "rem", "mi", "mim", "fá", "fa", "fám", "fam", "sol", "solm",
    "lá", "la", "lám", "lam", "si", "sim",
];

/// Invisible code points scrubbed from extracted metadata fields. These
/// leak out of PDF text recovery (soft hyphens, zero-width joiners, BOMs)
/// and would otherwise poison search and display.
const INVISIBLES: [char; 6] = [
    '\u{00AD}', '\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}', '\u{FEFF}',
];

/// Split recovered text into structured fields.
pub fn extract_fields(raw: &str) -> Result<ExtractedFields, ExtractError> {
    let lines: Vec<String> = sanitize(raw).lines().map(str::to_string).collect();

    let mut non_blank = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());
    let (_, title_line) = non_blank.next().ok_or(ExtractError::InsufficientContent)?;
    let (header_index, header_line) =
        non_blank.next().ok_or(ExtractError::InsufficientContent)?;

    let title = clean_field(title_line);
    let (artist, key) = split_artist_key(header_line);

    let mut body: Vec<String> = lines[header_index + 1..]
        .iter()
        .map(|line| line.trim().to_string())
        .collect();
    while body.first().is_some_and(|line| line.is_empty()) {
        body.remove(0);
    }
    while body.last().is_some_and(|line| line.is_empty()) {
        body.pop();
    }

    Ok(ExtractedFields {
        title,
        artist,
        key,
        body,
    })
}

/// Strip control characters other than tab/newline/carriage-return while
/// keeping line structure intact, so blank lines survive into the body.
fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|ch| !ch.is_control() || matches!(ch, '\t' | '\n' | '\r'))
        .collect()
}

/// Remove invisible code points and trim surrounding whitespace.
fn clean_field(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !INVISIBLES.contains(ch))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Split the second line into artist and key. Delimiters win in list order;
/// without one, a trailing key-vocabulary token is peeled off; otherwise
/// the whole line is the artist and the key stays blank.
fn split_artist_key(line: &str) -> (String, String) {
    for delimiter in DELIMITERS {
        if let Some((artist, key)) = line.split_once(delimiter) {
            return (clean_field(artist), clean_field(key));
        }
    }

    if let Some(token) = line.split_whitespace().next_back() {
        if KEY_VOCABULARY.contains(&token.to_lowercase().as_str()) {
            let artist = line.trim_end();
            let artist = &artist[..artist.len() - token.len()];
            return (clean_field(artist), clean_field(token));
        }
    }

    (clean_field(line), String::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(raw: &str) -> ExtractedFields {
        extract_fields(raw).expect("extraction should succeed")
    }

    #[test]
    fn delimited_header_splits_into_artist_and_key() {
        let got = fields("Title\nArtist • Cm\nline1\nline2");
        assert_eq!(got.title, "Title");
        assert_eq!(got.artist, "Artist");
        assert_eq!(got.key, "Cm");
        assert_eq!(got.body, vec!["line1", "line2"]);
    }

    #[test]
    fn delimiter_priority_follows_list_order_not_position() {
        // ':' appears first in the string but '-' outranks it in the list.
        let got = fields("Title\nIntro: Verse - Db\nbody");
        assert_eq!(got.artist, "Intro: Verse");
        assert_eq!(got.key, "Db");
    }

    #[test]
    fn vocabulary_fallback_peels_a_trailing_key_token() {
        let got = fields("Title\nJohn Doe G");
        assert_eq!(got.artist, "John Doe");
        assert_eq!(got.key, "G");
        assert!(got.body.is_empty());
    }

    #[test]
    fn fallback_matches_case_insensitively_and_in_solfege() {
        let got = fields("Canção\nElis Regina lám\n");
        assert_eq!(got.artist, "Elis Regina");
        assert_eq!(got.key, "lám");
    }

    #[test]
    fn plain_header_becomes_artist_with_empty_key() {
        let got = fields("Title\nThe Unaccompanied Choir\nbody");
        assert_eq!(got.artist, "The Unaccompanied Choir");
        assert_eq!(got.key, "");
    }

    #[test]
    fn one_line_is_insufficient() {
        assert_eq!(
            extract_fields("OnlyOneLine"),
            Err(ExtractError::InsufficientContent)
        );
        assert_eq!(
            extract_fields("Title\n\n  \n"),
            Err(ExtractError::InsufficientContent)
        );
        assert_eq!(extract_fields(""), Err(ExtractError::InsufficientContent));
    }

    #[test]
    fn leading_blank_lines_do_not_shift_the_title() {
        let got = fields("\n\nTitle\nArtist - D\n\nfirst\n\nsecond\n\n");
        assert_eq!(got.title, "Title");
        assert_eq!(got.artist, "Artist");
        // interior blank survives, boundary blanks are trimmed
        assert_eq!(got.body, vec!["first", "", "second"]);
    }

    #[test]
    fn control_and_invisible_characters_are_scrubbed() {
        let got = fields("Ti\u{0000}tle\u{200B}\nArt\u{0007}ist \u{FEFF}| Em\nla");
        assert_eq!(got.title, "Title");
        assert_eq!(got.artist, "Artist");
        assert_eq!(got.key, "Em");
    }

    #[test]
    fn non_key_last_token_leaves_key_blank() {
        let got = fields("Title\nSimon and Garfunkel\nbody");
        assert_eq!(got.artist, "Simon and Garfunkel");
        assert_eq!(got.key, "");
    }
}
