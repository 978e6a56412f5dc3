use std::env;
use std::fs;
use std::mem;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use crossterm::event::KeyCode;
use open::that as open_file;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use rusqlite::Connection;

use crate::db::{
    add_song_to_group, backup_database, create_group, create_song, delete_group, delete_song,
    fetch_lyrics, fetch_pdf, remove_song_from_group, update_group, update_song, SearchField,
};
use crate::extract::extract_fields;
use crate::layout::{compose, BuiltinMetrics, SheetRequest};
use crate::models::Song;
use crate::pdf;

use super::forms::{
    ConfirmGroupDelete, ConfirmGroupRemove, ConfirmSongDelete, GroupForm, PathPrompt, SongDraft,
    SongField, SongForm,
};
use super::helpers::{centered_rect, surface_error, truncate_with_ellipsis};
use super::screens::{GroupDetailScreen, GroupsScreen, SongListScreen, SongPicker};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;

/// High-level navigation states. Keeping this explicit makes it easy to
/// reason about which rendering path runs and what the keyboard should do.
enum Screen {
    Songs,
    Groups,
    GroupDetail(GroupDetailScreen),
}

/// Fine-grained modes scoped to the current screen. Forms and confirms are
/// modal; `Normal` is plain list navigation.
enum Mode {
    Normal,
    AddingSong { form: SongForm, imported: bool },
    EditingSong { id: i64, form: SongForm },
    ConfirmSongDelete(ConfirmSongDelete),
    Searching(SearchPrompt),
    AddingGroup(GroupForm),
    EditingGroup { id: i64, form: GroupForm },
    ConfirmGroupDelete(ConfirmGroupDelete),
    PickingSong(SongPicker),
    ConfirmGroupRemove(ConfirmGroupRemove),
    ImportingPath(PathPrompt),
    ExportingSong { id: i64, prompt: PathPrompt },
}

/// State for the inline search bar: the field being matched and the query
/// typed so far.
struct SearchPrompt {
    field: SearchField,
    query: String,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    conn: Connection,
    songs: SongListScreen,
    groups: GroupsScreen,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    /// Hydrate both top-level screens from the database and start on the
    /// song catalog.
    pub fn new(conn: Connection) -> Result<Self> {
        let songs = SongListScreen::new(&conn)?;
        let groups = GroupsScreen::new(&conn)?;
        Ok(Self {
            conn,
            songs,
            groups,
            screen: Screen::Songs,
            mode: Mode::Normal,
            status: None,
        })
    }

    fn set_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn report(&mut self, err: &anyhow::Error) {
        let message = surface_error(err);
        self.set_status(message, StatusKind::Error);
    }

    // ---------- key handling ----------

    /// Route one key press. Returns `true` when the app should exit.
    pub(crate) fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingSong { form, imported } => self.handle_song_form(code, None, form, imported),
            Mode::EditingSong { id, form } => self.handle_song_form(code, Some(id), form, false),
            Mode::ConfirmSongDelete(confirm) => self.handle_confirm_song_delete(code, confirm)?,
            Mode::Searching(prompt) => self.handle_search(code, prompt)?,
            Mode::AddingGroup(form) => self.handle_group_form(code, None, form)?,
            Mode::EditingGroup { id, form } => self.handle_group_form(code, Some(id), form)?,
            Mode::ConfirmGroupDelete(confirm) => self.handle_confirm_group_delete(code, confirm)?,
            Mode::PickingSong(picker) => self.handle_pick_song(code, picker)?,
            Mode::ConfirmGroupRemove(confirm) => self.handle_confirm_group_remove(code, confirm)?,
            Mode::ImportingPath(prompt) => self.handle_import_path(code, prompt)?,
            Mode::ExportingSong { id, prompt } => self.handle_export_path(code, id, prompt)?,
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match &mut self.screen {
            Screen::Songs => match code {
                KeyCode::Char('q') => *exit = true,
                KeyCode::Esc => {
                    if self.songs.search.is_some() {
                        self.songs.clear_search(&self.conn)?;
                        self.set_status("Search cleared.", StatusKind::Info);
                    } else {
                        *exit = true;
                    }
                }
                KeyCode::Up => self.songs.move_selection(-1),
                KeyCode::Down => self.songs.move_selection(1),
                KeyCode::PageUp => self.songs.move_selection(-10),
                KeyCode::PageDown => self.songs.move_selection(10),
                KeyCode::Enter | KeyCode::Char('o') => {
                    if let Some(song) = self.songs.current_song().cloned() {
                        self.open_song(&song);
                    } else {
                        self.set_status("No song selected.", StatusKind::Error);
                    }
                }
                KeyCode::Char('n') => {
                    return Ok(Mode::AddingSong {
                        form: SongForm::default(),
                        imported: false,
                    });
                }
                KeyCode::Char('e') => {
                    if let Some(song) = self.songs.current_song().cloned() {
                        match fetch_lyrics(&self.conn, song.id) {
                            Ok((lyrics, options)) => {
                                return Ok(Mode::EditingSong {
                                    id: song.id,
                                    form: SongForm::from_song(&song, &lyrics, options),
                                });
                            }
                            Err(err) => self.report(&err),
                        }
                    } else {
                        self.set_status("No song selected to edit.", StatusKind::Error);
                    }
                }
                KeyCode::Char('d') | KeyCode::Delete => {
                    if let Some(song) = self.songs.current_song() {
                        return Ok(Mode::ConfirmSongDelete(ConfirmSongDelete::from(song)));
                    }
                    self.set_status("No song selected to delete.", StatusKind::Error);
                }
                KeyCode::Char('x') => {
                    if let Some(song) = self.songs.current_song().cloned() {
                        let prompt =
                            PathPrompt::new("Save PDF as", format!("{}.pdf", song.title));
                        return Ok(Mode::ExportingSong {
                            id: song.id,
                            prompt,
                        });
                    }
                    self.set_status("No song selected to export.", StatusKind::Error);
                }
                KeyCode::Char('i') => {
                    return Ok(Mode::ImportingPath(PathPrompt::new(
                        "Import PDF from",
                        String::new(),
                    )));
                }
                KeyCode::Char('/') => {
                    let (field, query) = match &self.songs.search {
                        Some((field, term)) => (*field, term.clone()),
                        None => (SearchField::default(), String::new()),
                    };
                    return Ok(Mode::Searching(SearchPrompt { field, query }));
                }
                KeyCode::Char('s') => {
                    let sort = self.songs.cycle_sort(&self.conn)?;
                    self.set_status(format!("Sorted by {}.", sort.label()), StatusKind::Info);
                }
                KeyCode::Char('g') | KeyCode::Tab => {
                    self.groups.refresh(&self.conn)?;
                    self.screen = Screen::Groups;
                }
                _ => {}
            },
            Screen::Groups => match code {
                KeyCode::Char('q') => *exit = true,
                KeyCode::Esc | KeyCode::Char('g') | KeyCode::Tab => {
                    self.songs.refresh(&self.conn)?;
                    self.screen = Screen::Songs;
                }
                KeyCode::Up => self.groups.move_selection(-1),
                KeyCode::Down => self.groups.move_selection(1),
                KeyCode::Enter => {
                    if let Some(group) = self.groups.current_group().cloned() {
                        let detail = GroupDetailScreen::new(&self.conn, group)?;
                        self.screen = Screen::GroupDetail(detail);
                    } else {
                        self.set_status("No group selected.", StatusKind::Error);
                    }
                }
                KeyCode::Char('n') => return Ok(Mode::AddingGroup(GroupForm::default())),
                KeyCode::Char('e') => {
                    if let Some(group) = self.groups.current_group() {
                        return Ok(Mode::EditingGroup {
                            id: group.id,
                            form: GroupForm::from_group(group),
                        });
                    }
                    self.set_status("No group selected to rename.", StatusKind::Error);
                }
                KeyCode::Char('d') | KeyCode::Delete => {
                    if let Some(group) = self.groups.current_group() {
                        return Ok(Mode::ConfirmGroupDelete(ConfirmGroupDelete::from(group)));
                    }
                    self.set_status("No group selected to delete.", StatusKind::Error);
                }
                _ => {}
            },
            Screen::GroupDetail(detail) => match code {
                KeyCode::Char('q') => *exit = true,
                KeyCode::Esc => {
                    self.groups.refresh(&self.conn)?;
                    self.screen = Screen::Groups;
                }
                KeyCode::Up => detail.move_selection(-1),
                KeyCode::Down => detail.move_selection(1),
                KeyCode::Enter | KeyCode::Char('o') => {
                    if let Some(song) = detail.current_song().cloned() {
                        self.open_song(&song);
                    } else {
                        self.set_status("No song selected.", StatusKind::Error);
                    }
                }
                KeyCode::Char('a') => {
                    let picker = SongPicker::new(&self.conn, detail.group.id)?;
                    if picker.choices.is_empty() {
                        self.set_status(
                            "Every song is already in this group.",
                            StatusKind::Info,
                        );
                    } else {
                        return Ok(Mode::PickingSong(picker));
                    }
                }
                KeyCode::Char('r') | KeyCode::Delete => {
                    if let Some(song) = detail.current_song() {
                        return Ok(Mode::ConfirmGroupRemove(ConfirmGroupRemove {
                            group_id: detail.group.id,
                            song_id: song.id,
                            title: song.title.clone(),
                        }));
                    }
                    self.set_status("No song selected to remove.", StatusKind::Error);
                }
                _ => {}
            },
        }
        Ok(Mode::Normal)
    }

    /// Shared handler for the create and edit song forms. Saving happens
    /// through Ctrl+S so Enter stays free for the lyrics editor.
    fn handle_song_form(
        &mut self,
        code: KeyCode,
        id: Option<i64>,
        mut form: SongForm,
        imported: bool,
    ) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Discarded.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab => form.focus_next(),
            KeyCode::BackTab => form.focus_previous(),
            KeyCode::Enter => {
                form.newline();
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Up => form.move_lyric_row(-1),
            KeyCode::Down => form.move_lyric_row(1),
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            _ => {}
        }
        match id {
            Some(id) => Mode::EditingSong { id, form },
            None => Mode::AddingSong { form, imported },
        }
    }

    /// Ctrl+S: commit whichever form is open.
    pub(crate) fn handle_ctrl_s(&mut self) -> Result<()> {
        let mode = mem::replace(&mut self.mode, Mode::Normal);
        self.mode = match mode {
            Mode::AddingSong { mut form, imported } => match self.save_song(None, &form) {
                Ok(title) => {
                    let verb = if imported { "Imported" } else { "Added" };
                    self.set_status(format!("{verb} \"{title}\"."), StatusKind::Info);
                    Mode::Normal
                }
                Err(err) => {
                    form.error = Some(surface_error(&err));
                    Mode::AddingSong { form, imported }
                }
            },
            Mode::EditingSong { id, mut form } => match self.save_song(Some(id), &form) {
                Ok(title) => {
                    self.set_status(format!("Updated \"{title}\"."), StatusKind::Info);
                    Mode::Normal
                }
                Err(err) => {
                    form.error = Some(surface_error(&err));
                    Mode::EditingSong { id, form }
                }
            },
            other => other,
        };
        Ok(())
    }

    /// Ctrl+B: snapshot the database.
    pub(crate) fn handle_ctrl_b(&mut self) -> Result<()> {
        match backup_database(&self.conn) {
            Ok(path) => self.set_status(
                format!("Backup written to {}", path.display()),
                StatusKind::Info,
            ),
            Err(err) => self.report(&err),
        }
        Ok(())
    }

    /// Validate the form, compose and render the sheet, and persist it.
    /// Returns the saved title for the status line.
    fn save_song(&mut self, id: Option<i64>, form: &SongForm) -> Result<String> {
        let draft = form.parse_inputs()?;
        let bytes = render_sheet(&draft)?;
        let lyrics = draft.lyrics.join("\n");
        match id {
            Some(id) => update_song(
                &self.conn,
                id,
                &draft.title,
                &draft.artist,
                &draft.key,
                &lyrics,
                draft.options,
                &bytes,
            )?,
            None => {
                create_song(
                    &self.conn,
                    &draft.title,
                    &draft.artist,
                    &draft.key,
                    &lyrics,
                    draft.options,
                    &bytes,
                )?;
            }
        }
        self.refresh_song_views()?;
        Ok(draft.title)
    }

    /// Reload whichever song lists are currently alive so mutations show up
    /// immediately.
    fn refresh_song_views(&mut self) -> Result<()> {
        self.songs.refresh(&self.conn)?;
        if let Screen::GroupDetail(detail) = &mut self.screen {
            detail.refresh(&self.conn)?;
        }
        Ok(())
    }

    fn handle_confirm_song_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmSongDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Char('y') | KeyCode::Enter => {
                match delete_song(&self.conn, confirm.id) {
                    Ok(()) => {
                        self.refresh_song_views()?;
                        self.set_status(
                            format!("Deleted \"{}\".", confirm.title),
                            StatusKind::Info,
                        );
                    }
                    Err(err) => self.report(&err),
                }
                Ok(Mode::Normal)
            }
            KeyCode::Char('n') | KeyCode::Esc => Ok(Mode::Normal),
            _ => Ok(Mode::ConfirmSongDelete(confirm)),
        }
    }

    fn handle_search(&mut self, code: KeyCode, mut prompt: SearchPrompt) -> Result<Mode> {
        match code {
            KeyCode::Esc => return Ok(Mode::Normal),
            KeyCode::Tab => prompt.field = prompt.field.next(),
            KeyCode::Enter => {
                self.songs
                    .set_search(&self.conn, prompt.field, prompt.query.clone())?;
                let message = if prompt.query.trim().is_empty() {
                    "Search cleared.".to_string()
                } else {
                    format!("{} match(es).", self.songs.songs.len())
                };
                self.set_status(message, StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Backspace => {
                prompt.query.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => prompt.query.push(ch),
            _ => {}
        }
        Ok(Mode::Searching(prompt))
    }

    fn handle_group_form(
        &mut self,
        code: KeyCode,
        id: Option<i64>,
        mut form: GroupForm,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc => return Ok(Mode::Normal),
            KeyCode::Enter => {
                let save = form.parse_inputs().and_then(|name| {
                    match id {
                        Some(id) => update_group(&self.conn, id, &name)?,
                        None => {
                            create_group(&self.conn, &name)?;
                        }
                    }
                    Ok(name)
                });
                match save {
                    Ok(name) => {
                        self.groups.refresh(&self.conn)?;
                        self.set_status(format!("Saved group \"{name}\"."), StatusKind::Info);
                        return Ok(Mode::Normal);
                    }
                    Err(err) => form.error = Some(surface_error(&err)),
                }
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            _ => {}
        }
        Ok(match id {
            Some(id) => Mode::EditingGroup { id, form },
            None => Mode::AddingGroup(form),
        })
    }

    fn handle_confirm_group_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmGroupDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Char('y') | KeyCode::Enter => {
                match delete_group(&self.conn, confirm.id) {
                    Ok(()) => {
                        self.groups.refresh(&self.conn)?;
                        self.set_status(
                            format!("Deleted group \"{}\".", confirm.name),
                            StatusKind::Info,
                        );
                    }
                    Err(err) => self.report(&err),
                }
                Ok(Mode::Normal)
            }
            KeyCode::Char('n') | KeyCode::Esc => Ok(Mode::Normal),
            _ => Ok(Mode::ConfirmGroupDelete(confirm)),
        }
    }

    fn handle_pick_song(&mut self, code: KeyCode, mut picker: SongPicker) -> Result<Mode> {
        match code {
            KeyCode::Esc => return Ok(Mode::Normal),
            KeyCode::Up => picker.move_selection(-1),
            KeyCode::Down => picker.move_selection(1),
            KeyCode::Enter => {
                if let Some(song) = picker.current_song().cloned() {
                    match add_song_to_group(&self.conn, picker.group_id, song.id) {
                        Ok(()) => {
                            self.refresh_song_views()?;
                            self.set_status(
                                format!("Added \"{}\" to the group.", song.title),
                                StatusKind::Info,
                            );
                        }
                        Err(err) => self.report(&err),
                    }
                }
                return Ok(Mode::Normal);
            }
            _ => {}
        }
        Ok(Mode::PickingSong(picker))
    }

    fn handle_confirm_group_remove(
        &mut self,
        code: KeyCode,
        confirm: ConfirmGroupRemove,
    ) -> Result<Mode> {
        match code {
            KeyCode::Char('y') | KeyCode::Enter => {
                match remove_song_from_group(&self.conn, confirm.group_id, confirm.song_id) {
                    Ok(()) => {
                        self.refresh_song_views()?;
                        self.set_status(
                            format!("Removed \"{}\" from the group.", confirm.title),
                            StatusKind::Info,
                        );
                    }
                    Err(err) => self.report(&err),
                }
                Ok(Mode::Normal)
            }
            KeyCode::Char('n') | KeyCode::Esc => Ok(Mode::Normal),
            _ => Ok(Mode::ConfirmGroupRemove(confirm)),
        }
    }

    fn handle_import_path(&mut self, code: KeyCode, mut prompt: PathPrompt) -> Result<Mode> {
        match code {
            KeyCode::Esc => return Ok(Mode::Normal),
            KeyCode::Enter => match self.run_import(&prompt.value) {
                Ok(form) => {
                    self.set_status(
                        "Review the imported fields, then press Ctrl+S to save.",
                        StatusKind::Info,
                    );
                    return Ok(Mode::AddingSong {
                        form,
                        imported: true,
                    });
                }
                Err(err) => prompt.error = Some(surface_error(&err)),
            },
            KeyCode::Backspace => prompt.backspace(),
            KeyCode::Char(ch) => {
                prompt.push_char(ch);
            }
            _ => {}
        }
        Ok(Mode::ImportingPath(prompt))
    }

    /// Read the PDF, recover its text, and split it into a prefilled form.
    fn run_import(&self, raw_path: &str) -> Result<SongForm> {
        let path = raw_path.trim();
        if path.is_empty() {
            return Err(anyhow!("Enter the path of a PDF file."));
        }
        let text = pdf::recover_text_from_file(&PathBuf::from(path))?;
        let fields = extract_fields(&text)?;
        Ok(SongForm::from_extracted(fields))
    }

    fn handle_export_path(
        &mut self,
        code: KeyCode,
        id: i64,
        mut prompt: PathPrompt,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc => return Ok(Mode::Normal),
            KeyCode::Enter => match self.run_export(id, &prompt.value) {
                Ok(path) => {
                    self.set_status(
                        format!("PDF saved to {}", path.display()),
                        StatusKind::Info,
                    );
                    return Ok(Mode::Normal);
                }
                Err(err) => prompt.error = Some(surface_error(&err)),
            },
            KeyCode::Backspace => prompt.backspace(),
            KeyCode::Char(ch) => {
                prompt.push_char(ch);
            }
            _ => {}
        }
        Ok(Mode::ExportingSong { id, prompt })
    }

    fn run_export(&self, id: i64, raw_path: &str) -> Result<PathBuf> {
        let path = raw_path.trim();
        if path.is_empty() {
            return Err(anyhow!("Enter a destination path."));
        }
        let bytes = fetch_pdf(&self.conn, id)?
            .ok_or_else(|| anyhow!("This song has no rendered PDF."))?;
        let target = PathBuf::from(path);
        fs::write(&target, bytes)
            .with_context(|| format!("failed to write {}", target.display()))?;
        Ok(target)
    }

    /// Drop the stored PDF into a temp file and hand it to the OS viewer.
    fn open_song(&mut self, song: &Song) {
        let result = (|| -> Result<()> {
            let bytes = fetch_pdf(&self.conn, song.id)?
                .ok_or_else(|| anyhow!("This song has no rendered PDF."))?;
            let path = env::temp_dir().join(format!("song-sheet-{}.pdf", song.id));
            fs::write(&path, bytes)
                .with_context(|| format!("failed to write {}", path.display()))?;
            open_file(&path).context("failed to launch the PDF viewer")?;
            Ok(())
        })();
        match result {
            Ok(()) => self.set_status(format!("Opened \"{}\".", song.title), StatusKind::Info),
            Err(err) => self.report(&err),
        }
    }

    // ---------- rendering ----------

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Songs => self.draw_song_list(frame, content_area),
            Screen::Groups => self.draw_groups(frame, content_area),
            Screen::GroupDetail(detail) => self.draw_group_detail(frame, content_area, detail),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::AddingSong {
                form,
                imported: true,
            } => self.draw_song_form(frame, area, "Confirm Import", form),
            Mode::AddingSong { form, .. } => self.draw_song_form(frame, area, "New Song", form),
            Mode::EditingSong { form, .. } => self.draw_song_form(frame, area, "Edit Song", form),
            Mode::ConfirmSongDelete(confirm) => self.draw_confirm(
                frame,
                area,
                "Delete Song",
                &format!("Really delete \"{}\"? (y/n)", confirm.title),
            ),
            Mode::Searching(prompt) => self.draw_search_bar(frame, area, prompt),
            Mode::AddingGroup(form) => self.draw_group_form(frame, area, "New Group", form),
            Mode::EditingGroup { form, .. } => {
                self.draw_group_form(frame, area, "Rename Group", form)
            }
            Mode::ConfirmGroupDelete(confirm) => self.draw_confirm(
                frame,
                area,
                "Delete Group",
                &format!(
                    "Really delete group \"{}\"? Its songs are kept. (y/n)",
                    confirm.name
                ),
            ),
            Mode::PickingSong(picker) => self.draw_picker(frame, area, picker),
            Mode::ConfirmGroupRemove(confirm) => self.draw_confirm(
                frame,
                area,
                "Remove From Group",
                &format!("Remove \"{}\" from this group? (y/n)", confirm.title),
            ),
            Mode::ImportingPath(prompt) => self.draw_path_prompt(frame, area, prompt),
            Mode::ExportingSong { prompt, .. } => self.draw_path_prompt(frame, area, prompt),
            Mode::Normal => {}
        }
    }

    fn draw_song_list(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(area);

        let header = Paragraph::new(Line::from(self.songs.describe()))
            .alignment(Alignment::Left)
            .block(Block::default().borders(Borders::ALL).title("Song Sheets"));
        frame.render_widget(header, chunks[0]);

        if self.songs.songs.is_empty() {
            let hint = if self.songs.search.is_some() {
                "No matches. Esc clears the search."
            } else {
                "No songs yet. Press 'n' to write one or 'i' to import a PDF."
            };
            let message = Paragraph::new(hint)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(message, chunks[1]);
            return;
        }

        self.draw_song_rows(frame, chunks[1], &self.songs.songs, self.songs.selected);
    }

    fn draw_song_rows(&self, frame: &mut Frame, area: Rect, songs: &[Song], selected: usize) {
        let width = area.width.saturating_sub(4) as usize;
        let items: Vec<ListItem> = songs
            .iter()
            .map(|song| ListItem::new(truncate_with_ellipsis(&song.to_string(), width)))
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select((!songs.is_empty()).then_some(selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_groups(&self, frame: &mut Frame, area: Rect) {
        if self.groups.groups.is_empty() {
            let message = Paragraph::new("No groups yet. Press 'n' to create one.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Groups"));
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = self
            .groups
            .groups
            .iter()
            .map(|group| ListItem::new(group.name.clone()))
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Groups"))
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(self.groups.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_group_detail(&self, frame: &mut Frame, area: Rect, detail: &GroupDetailScreen) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(area);

        let header = Paragraph::new(Line::from(vec![
            Span::styled(
                detail.group.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  •  {} song(s)", detail.songs.len())),
        ]))
        .block(Block::default().borders(Borders::ALL).title("Group"));
        frame.render_widget(header, chunks[0]);

        if detail.songs.is_empty() {
            let message = Paragraph::new("No songs in this group. Press 'a' to add one.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(message, chunks[1]);
            return;
        }

        self.draw_song_rows(frame, chunks[1], &detail.songs, detail.selected);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let text = match (&self.mode, &self.screen) {
            (Mode::Normal, Screen::Songs) => {
                "n new  e edit  d delete  Enter open  x export  i import  / search  s sort  g groups  Ctrl+B backup  q quit"
            }
            (Mode::Normal, Screen::Groups) => {
                "n new  e rename  d delete  Enter open  Esc back  q quit"
            }
            (Mode::Normal, Screen::GroupDetail(_)) => {
                "a add song  r remove  Enter open  Esc back  q quit"
            }
            (Mode::AddingSong { .. } | Mode::EditingSong { .. }, _) => {
                "Tab next field  Enter new lyric line  Ctrl+S save  Esc discard"
            }
            (Mode::Searching(_), _) => "Tab switch field  Enter apply  Esc cancel",
            (Mode::ImportingPath(_) | Mode::ExportingSong { .. }, _) => "Enter confirm  Esc cancel",
            (Mode::AddingGroup(_) | Mode::EditingGroup { .. }, _) => "Enter save  Esc cancel",
            _ => "y confirm  n cancel",
        };
        Line::from(Span::styled(
            text,
            Style::default().fg(Color::DarkGray),
        ))
    }

    fn draw_song_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &SongForm) {
        let popup_area = centered_rect(80, 85, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title(title.to_string());
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Min(1)])
            .split(inner);

        let mut meta_lines = vec![
            form.text_line("Title", SongField::Title),
            form.text_line("Artist", SongField::Artist),
            form.text_line("Key", SongField::Key),
            form.text_line("Font size (8-16)", SongField::FontSize),
            form.toggle_line("Header on page 1", SongField::Header),
            form.toggle_line("Page numbers", SongField::PageNumbers),
        ];
        meta_lines.push(match &form.error {
            Some(error) => Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )),
            None => Line::from(""),
        });
        frame.render_widget(Paragraph::new(meta_lines), chunks[0]);

        let lyrics_block = Block::default()
            .borders(Borders::ALL)
            .title("Lyrics (Enter adds a line, Space toggles options)");
        let lyrics_inner = lyrics_block.inner(chunks[1]);
        let visible = lyrics_inner.height.max(1) as usize;
        let scroll = form.lyric_row.saturating_sub(visible - 1);
        let lyric_lines: Vec<Line> = form
            .lyrics
            .iter()
            .enumerate()
            .skip(scroll)
            .take(visible)
            .map(|(index, row)| {
                let active = form.active == SongField::Lyrics && index == form.lyric_row;
                let style = if active {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };
                Line::from(Span::styled(row.clone(), style))
            })
            .collect();
        frame.render_widget(Paragraph::new(lyric_lines).block(lyrics_block), chunks[1]);

        // Cursor sits at the end of whichever field is being typed into.
        match form.active {
            SongField::Title | SongField::Artist | SongField::Key | SongField::FontSize => {
                let (row, label, value) = match form.active {
                    SongField::Title => (0u16, "Title", &form.title),
                    SongField::Artist => (1, "Artist", &form.artist),
                    SongField::Key => (2, "Key", &form.key),
                    _ => (3, "Font size (8-16)", &form.font_size),
                };
                let x = chunks[0].x + label.chars().count() as u16 + 2 + value.chars().count() as u16;
                frame.set_cursor_position((x.min(chunks[0].right()), chunks[0].y + row));
            }
            SongField::Lyrics => {
                let row = (form.lyric_row - scroll) as u16;
                let x = lyrics_inner.x
                    + form.lyrics[form.lyric_row].chars().count() as u16;
                frame.set_cursor_position((
                    x.min(lyrics_inner.right()),
                    lyrics_inner.y + row.min(lyrics_inner.height.saturating_sub(1)),
                ));
            }
            _ => {}
        }
    }

    fn draw_group_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &GroupForm) {
        let popup_area = centered_rect(60, 25, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title(title.to_string());
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![Line::from(vec![
            Span::raw("Name: "),
            Span::styled(form.name.clone(), Style::default().fg(Color::Yellow)),
        ])];
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let cursor_x = inner.x + "Name: ".len() as u16 + form.name.chars().count() as u16;
        frame.set_cursor_position((cursor_x.min(inner.right()), inner.y));
    }

    fn draw_confirm(&self, frame: &mut Frame, area: Rect, title: &str, message: &str) {
        let popup_area = centered_rect(60, 25, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title(title.to_string());
        let paragraph = Paragraph::new(message.to_string())
            .block(block)
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, popup_area);
    }

    fn draw_picker(&self, frame: &mut Frame, area: Rect, picker: &SongPicker) {
        let popup_area = centered_rect(70, 70, area);
        frame.render_widget(Clear, popup_area);

        let width = popup_area.width.saturating_sub(4) as usize;
        let items: Vec<ListItem> = picker
            .choices
            .iter()
            .map(|song| ListItem::new(truncate_with_ellipsis(&song.to_string(), width)))
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Add Song To Group"),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(picker.selected));
        frame.render_stateful_widget(list, popup_area, &mut state);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, prompt: &SearchPrompt) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Search");
        let label = format!("{}: ", prompt.field.label());
        let paragraph = Paragraph::new(Span::raw(format!("{label}{}", prompt.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + label.chars().count() as u16 + prompt.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x.min(inner.right()), inner.y));
    }

    fn draw_path_prompt(&self, frame: &mut Frame, area: Rect, prompt: &PathPrompt) {
        let height = 4u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(prompt.label.to_string());
        let mut lines = vec![Line::from(prompt.value.clone())];
        if let Some(error) = &prompt.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }
        let paragraph = Paragraph::new(lines)
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + prompt.value.chars().count() as u16;
        frame.set_cursor_position((cursor_x.min(inner.right()), inner.y));
    }
}

/// Compose and encode a sheet from validated form output.
fn render_sheet(draft: &SongDraft) -> Result<Vec<u8>> {
    let request = SheetRequest {
        title: draft.title.clone(),
        artist: draft.artist.clone(),
        key: draft.key.clone(),
        body: draft.lyrics.clone(),
        font_size: draft.options.font_size,
        include_header: draft.options.show_header,
        include_page_numbers: draft.options.show_page_numbers,
    };
    let pages = compose(&request, &BuiltinMetrics);
    pdf::render(&pages)
}
