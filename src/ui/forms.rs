use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::extract::ExtractedFields;
use crate::models::{Group, SheetOptions, Song};

/// Allowed bounds for the body font size.
const FONT_SIZE_MIN: u8 = 8;
const FONT_SIZE_MAX: u8 = 16;

/// Fields within the song form, in focus order. Lyrics come last so Tab
/// walks the metadata before dropping into the editor.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum SongField {
    #[default]
    Title,
    Artist,
    Key,
    FontSize,
    Header,
    PageNumbers,
    Lyrics,
}

impl SongField {
    fn next(self) -> Self {
        match self {
            SongField::Title => SongField::Artist,
            SongField::Artist => SongField::Key,
            SongField::Key => SongField::FontSize,
            SongField::FontSize => SongField::Header,
            SongField::Header => SongField::PageNumbers,
            SongField::PageNumbers => SongField::Lyrics,
            SongField::Lyrics => SongField::Title,
        }
    }

    fn previous(self) -> Self {
        match self {
            SongField::Title => SongField::Lyrics,
            SongField::Artist => SongField::Title,
            SongField::Key => SongField::Artist,
            SongField::FontSize => SongField::Key,
            SongField::Header => SongField::FontSize,
            SongField::PageNumbers => SongField::Header,
            SongField::Lyrics => SongField::PageNumbers,
        }
    }
}

/// Validated output of [`SongForm::parse_inputs`], ready for composition
/// and persistence.
pub(crate) struct SongDraft {
    pub(crate) title: String,
    pub(crate) artist: String,
    pub(crate) key: String,
    pub(crate) lyrics: Vec<String>,
    pub(crate) options: SheetOptions,
}

/// Form state for creating or editing a song sheet, including the
/// multi-line lyrics editor. Text input appends at the end of the active
/// field; the lyrics editor additionally tracks which row is being edited.
#[derive(Clone)]
pub(crate) struct SongForm {
    pub(crate) title: String,
    pub(crate) artist: String,
    pub(crate) key: String,
    pub(crate) font_size: String,
    pub(crate) show_header: bool,
    pub(crate) show_page_numbers: bool,
    pub(crate) lyrics: Vec<String>,
    pub(crate) lyric_row: usize,
    pub(crate) active: SongField,
    pub(crate) error: Option<String>,
}

impl Default for SongForm {
    fn default() -> Self {
        let defaults = SheetOptions::default();
        Self {
            title: String::new(),
            artist: String::new(),
            key: String::new(),
            font_size: defaults.font_size.to_string(),
            show_header: defaults.show_header,
            show_page_numbers: defaults.show_page_numbers,
            lyrics: vec![String::new()],
            lyric_row: 0,
            active: SongField::default(),
            error: None,
        }
    }
}

impl SongForm {
    /// Populate the form from an existing song when entering edit mode.
    pub(crate) fn from_song(song: &Song, lyrics: &str, options: SheetOptions) -> Self {
        let mut rows: Vec<String> = lyrics.lines().map(str::to_string).collect();
        if rows.is_empty() {
            rows.push(String::new());
        }
        Self {
            title: song.title.clone(),
            artist: song.artist.clone(),
            key: song.key.clone(),
            font_size: options.font_size.to_string(),
            show_header: options.show_header,
            show_page_numbers: options.show_page_numbers,
            lyrics: rows,
            ..Self::default()
        }
    }

    /// Seed the form from extractor output so the user can confirm or
    /// repair the guessed fields before the import is saved.
    pub(crate) fn from_extracted(fields: ExtractedFields) -> Self {
        let mut rows = fields.body;
        if rows.is_empty() {
            rows.push(String::new());
        }
        Self {
            title: fields.title,
            artist: fields.artist,
            key: fields.key,
            lyrics: rows,
            ..Self::default()
        }
    }

    /// Move focus to the next field.
    pub(crate) fn focus_next(&mut self) {
        self.active = self.active.next();
    }

    /// Move focus to the previous field.
    pub(crate) fn focus_previous(&mut self) {
        self.active = self.active.previous();
    }

    /// Append a character to the active field. Digits only for the font
    /// size; space toggles the boolean fields.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            SongField::Title => self.title.push(ch),
            SongField::Artist => self.artist.push(ch),
            SongField::Key => self.key.push(ch),
            SongField::FontSize => {
                if !ch.is_ascii_digit() || self.font_size.len() >= 2 {
                    return false;
                }
                self.font_size.push(ch);
            }
            SongField::Header | SongField::PageNumbers => {
                if ch == ' ' {
                    self.toggle_value();
                } else {
                    return false;
                }
            }
            SongField::Lyrics => self.lyrics[self.lyric_row].push(ch),
        }
        true
    }

    /// Remove the last character from the active field. In the lyrics
    /// editor an empty row is removed and focus moves to the row above.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            SongField::Title => {
                self.title.pop();
            }
            SongField::Artist => {
                self.artist.pop();
            }
            SongField::Key => {
                self.key.pop();
            }
            SongField::FontSize => {
                self.font_size.pop();
            }
            SongField::Header | SongField::PageNumbers => {}
            SongField::Lyrics => {
                let row = &mut self.lyrics[self.lyric_row];
                if row.pop().is_none() && self.lyric_row > 0 {
                    self.lyrics.remove(self.lyric_row);
                    self.lyric_row -= 1;
                }
            }
        }
    }

    /// Enter inside the lyrics editor opens a fresh row under the cursor;
    /// elsewhere it just advances focus. Returns whether a row was added.
    pub(crate) fn newline(&mut self) -> bool {
        if self.active == SongField::Lyrics {
            self.lyric_row += 1;
            self.lyrics.insert(self.lyric_row, String::new());
            true
        } else {
            self.focus_next();
            false
        }
    }

    /// Flip the boolean under focus, if any.
    pub(crate) fn toggle_value(&mut self) {
        match self.active {
            SongField::Header => self.show_header = !self.show_header,
            SongField::PageNumbers => self.show_page_numbers = !self.show_page_numbers,
            _ => {}
        }
    }

    /// Move the lyrics cursor up or down when the editor has focus.
    pub(crate) fn move_lyric_row(&mut self, offset: isize) {
        if self.active != SongField::Lyrics {
            return;
        }
        let last = self.lyrics.len().saturating_sub(1) as isize;
        let row = (self.lyric_row as isize + offset).clamp(0, last);
        self.lyric_row = row as usize;
    }

    /// Validate the inputs and return typed values ready for composition.
    pub(crate) fn parse_inputs(&self) -> Result<SongDraft> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(anyhow!("Song title is required."));
        }
        let font_size: u8 = self
            .font_size
            .trim()
            .parse()
            .map_err(|_| anyhow!("Font size must be a number."))?;
        if !(FONT_SIZE_MIN..=FONT_SIZE_MAX).contains(&font_size) {
            return Err(anyhow!(
                "Font size must be between {FONT_SIZE_MIN} and {FONT_SIZE_MAX}."
            ));
        }

        let mut lyrics: Vec<String> =
            self.lyrics.iter().map(|row| row.trim_end().to_string()).collect();
        while lyrics.last().is_some_and(|row| row.is_empty()) {
            lyrics.pop();
        }

        Ok(SongDraft {
            title: title.to_string(),
            artist: self.artist.trim().to_string(),
            key: self.key.trim().to_string(),
            lyrics,
            options: SheetOptions {
                font_size,
                show_header: self.show_header,
                show_page_numbers: self.show_page_numbers,
            },
        })
    }

    /// Render a single metadata line for the form widget.
    pub(crate) fn text_line(&self, field_name: &str, field: SongField) -> Line<'static> {
        let value = match field {
            SongField::Title => &self.title,
            SongField::Artist => &self.artist,
            SongField::Key => &self.key,
            SongField::FontSize => &self.font_size,
            _ => unreachable!("text_line only renders text fields"),
        };
        let display = if value.is_empty() {
            match field {
                SongField::Title => "<required>".to_string(),
                _ => "<blank>".to_string(),
            }
        } else {
            value.clone()
        };
        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, self.value_style(field, value.is_empty())),
        ])
    }

    /// Render one of the on/off option lines.
    pub(crate) fn toggle_line(&self, field_name: &str, field: SongField) -> Line<'static> {
        let value = match field {
            SongField::Header => self.show_header,
            SongField::PageNumbers => self.show_page_numbers,
            _ => unreachable!("toggle_line only renders boolean fields"),
        };
        let display = if value { "[x]" } else { "[ ]" };
        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display.to_string(), self.value_style(field, false)),
        ])
    }

    fn value_style(&self, field: SongField, is_blank: bool) -> Style {
        if self.active == field {
            Style::default().fg(Color::Yellow)
        } else if is_blank {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        }
    }
}

/// Form state for creating or renaming a group.
#[derive(Default, Clone)]
pub(crate) struct GroupForm {
    pub(crate) name: String,
    pub(crate) error: Option<String>,
}

impl GroupForm {
    pub(crate) fn from_group(group: &Group) -> Self {
        Self {
            name: group.name.clone(),
            error: None,
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.name.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.name.pop();
    }

    pub(crate) fn parse_inputs(&self) -> Result<String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(anyhow!("Group name is required."));
        }
        Ok(name.to_string())
    }
}

#[derive(Clone)]
pub(crate) struct ConfirmSongDelete {
    pub(crate) id: i64,
    pub(crate) title: String,
}

impl ConfirmSongDelete {
    pub(crate) fn from(song: &Song) -> Self {
        Self {
            id: song.id,
            title: song.title.clone(),
        }
    }
}

#[derive(Clone)]
pub(crate) struct ConfirmGroupDelete {
    pub(crate) id: i64,
    pub(crate) name: String,
}

impl ConfirmGroupDelete {
    pub(crate) fn from(group: &Group) -> Self {
        Self {
            id: group.id,
            name: group.name.clone(),
        }
    }
}

/// Confirmation for pulling a song out of a group (the song itself stays).
#[derive(Clone)]
pub(crate) struct ConfirmGroupRemove {
    pub(crate) group_id: i64,
    pub(crate) song_id: i64,
    pub(crate) title: String,
}

/// Single-line path input shared by the import and export flows.
#[derive(Clone)]
pub(crate) struct PathPrompt {
    pub(crate) label: &'static str,
    pub(crate) value: String,
    pub(crate) error: Option<String>,
}

impl PathPrompt {
    pub(crate) fn new(label: &'static str, value: String) -> Self {
        Self {
            label,
            value,
            error: None,
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.value.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.value.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_blank_title_and_bad_font_size() {
        let mut form = SongForm::default();
        assert!(form.parse_inputs().is_err());

        form.title = "Name".to_string();
        form.font_size = "7".to_string();
        assert!(form.parse_inputs().is_err());
        form.font_size = "17".to_string();
        assert!(form.parse_inputs().is_err());
        form.font_size = "12".to_string();
        assert_eq!(form.parse_inputs().unwrap().options.font_size, 12);
    }

    #[test]
    fn trailing_blank_lyric_rows_are_dropped() {
        let mut form = SongForm {
            title: "T".to_string(),
            ..SongForm::default()
        };
        form.lyrics = vec!["one".to_string(), "".to_string(), "two".to_string(), "".to_string()];
        let draft = form.parse_inputs().unwrap();
        assert_eq!(draft.lyrics, vec!["one", "", "two"]);
    }

    #[test]
    fn lyrics_editor_adds_and_removes_rows() {
        let mut form = SongForm::default();
        form.active = SongField::Lyrics;
        form.push_char('a');
        assert!(form.newline());
        form.push_char('b');
        assert_eq!(form.lyrics, vec!["a", "b"]);

        form.backspace(); // removes 'b'
        form.backspace(); // removes the now-empty row
        assert_eq!(form.lyrics, vec!["a"]);
        assert_eq!(form.lyric_row, 0);
    }

    #[test]
    fn font_size_field_only_accepts_two_digits() {
        let mut form = SongForm::default();
        form.active = SongField::FontSize;
        form.font_size.clear();
        assert!(form.push_char('1'));
        assert!(form.push_char('4'));
        assert!(!form.push_char('2'));
        assert!(!form.push_char('x'));
        assert_eq!(form.font_size, "14");
    }

    #[test]
    fn extracted_fields_prefill_the_form() {
        let fields = ExtractedFields {
            title: "Imported".to_string(),
            artist: "Someone".to_string(),
            key: "Em".to_string(),
            body: vec!["first".to_string(), "second".to_string()],
        };
        let form = SongForm::from_extracted(fields);
        assert_eq!(form.title, "Imported");
        assert_eq!(form.lyrics.len(), 2);
        assert!(form.show_header);
    }
}
