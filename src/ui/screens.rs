use anyhow::Result;
use rusqlite::Connection;

use crate::db::{
    fetch_all_songs, fetch_available_songs, fetch_groups, fetch_songs_for_group, search_songs,
    SearchField, SortOrder,
};
use crate::models::{Group, Song};

/// Clamp-style cursor movement shared by every list screen.
fn move_index(selected: &mut usize, len: usize, offset: isize) {
    if len == 0 {
        *selected = 0;
        return;
    }
    let last = (len - 1) as isize;
    *selected = (*selected as isize + offset).clamp(0, last) as usize;
}

/// The main catalog view: the full song list, optionally narrowed by a
/// field-scoped search, in one of the available sort orders. The screen
/// owns its query state so a refresh after any mutation re-runs the same
/// view the user was looking at.
pub(crate) struct SongListScreen {
    pub(crate) songs: Vec<Song>,
    pub(crate) selected: usize,
    pub(crate) search: Option<(SearchField, String)>,
    pub(crate) sort: SortOrder,
}

impl SongListScreen {
    pub(crate) fn new(conn: &Connection) -> Result<Self> {
        let mut screen = Self {
            songs: Vec::new(),
            selected: 0,
            search: None,
            sort: SortOrder::default(),
        };
        screen.refresh(conn)?;
        Ok(screen)
    }

    /// Re-run the current query (search or full list) and keep the cursor
    /// in bounds.
    pub(crate) fn refresh(&mut self, conn: &Connection) -> Result<()> {
        self.songs = match &self.search {
            Some((field, term)) if !term.trim().is_empty() => {
                search_songs(conn, *field, term, self.sort)?
            }
            _ => fetch_all_songs(conn, self.sort)?,
        };
        if self.selected >= self.songs.len() {
            self.selected = self.songs.len().saturating_sub(1);
        }
        Ok(())
    }

    pub(crate) fn set_search(
        &mut self,
        conn: &Connection,
        field: SearchField,
        term: String,
    ) -> Result<()> {
        self.search = if term.trim().is_empty() {
            None
        } else {
            Some((field, term))
        };
        self.selected = 0;
        self.refresh(conn)
    }

    pub(crate) fn clear_search(&mut self, conn: &Connection) -> Result<()> {
        self.search = None;
        self.refresh(conn)
    }

    pub(crate) fn cycle_sort(&mut self, conn: &Connection) -> Result<SortOrder> {
        self.sort = self.sort.next();
        self.refresh(conn)?;
        Ok(self.sort)
    }

    pub(crate) fn current_song(&self) -> Option<&Song> {
        self.songs.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        move_index(&mut self.selected, self.songs.len(), offset);
    }

    /// One-line description of the active view for the list header.
    pub(crate) fn describe(&self) -> String {
        match &self.search {
            Some((field, term)) => format!(
                "{} songs  •  {} ~ \"{}\"  •  sorted by {}",
                self.songs.len(),
                field.label(),
                term,
                self.sort.label()
            ),
            None => format!(
                "{} songs  •  sorted by {}",
                self.songs.len(),
                self.sort.label()
            ),
        }
    }
}

/// The group overview list.
pub(crate) struct GroupsScreen {
    pub(crate) groups: Vec<Group>,
    pub(crate) selected: usize,
}

impl GroupsScreen {
    pub(crate) fn new(conn: &Connection) -> Result<Self> {
        let mut screen = Self {
            groups: Vec::new(),
            selected: 0,
        };
        screen.refresh(conn)?;
        Ok(screen)
    }

    pub(crate) fn refresh(&mut self, conn: &Connection) -> Result<()> {
        self.groups = fetch_groups(conn)?;
        if self.selected >= self.groups.len() {
            self.selected = self.groups.len().saturating_sub(1);
        }
        Ok(())
    }

    pub(crate) fn current_group(&self) -> Option<&Group> {
        self.groups.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        move_index(&mut self.selected, self.groups.len(), offset);
    }
}

/// Detail view for a single group: its member songs.
pub(crate) struct GroupDetailScreen {
    pub(crate) group: Group,
    pub(crate) songs: Vec<Song>,
    pub(crate) selected: usize,
}

impl GroupDetailScreen {
    pub(crate) fn new(conn: &Connection, group: Group) -> Result<Self> {
        let mut screen = Self {
            group,
            songs: Vec::new(),
            selected: 0,
        };
        screen.refresh(conn)?;
        Ok(screen)
    }

    pub(crate) fn refresh(&mut self, conn: &Connection) -> Result<()> {
        self.songs = fetch_songs_for_group(conn, self.group.id)?;
        if self.selected >= self.songs.len() {
            self.selected = self.songs.len().saturating_sub(1);
        }
        Ok(())
    }

    pub(crate) fn current_song(&self) -> Option<&Song> {
        self.songs.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        move_index(&mut self.selected, self.songs.len(), offset);
    }
}

/// Modal picker listing songs not yet in the target group.
pub(crate) struct SongPicker {
    pub(crate) group_id: i64,
    pub(crate) choices: Vec<Song>,
    pub(crate) selected: usize,
}

impl SongPicker {
    pub(crate) fn new(conn: &Connection, group_id: i64) -> Result<Self> {
        Ok(Self {
            group_id,
            choices: fetch_available_songs(conn, group_id)?,
            selected: 0,
        })
    }

    pub(crate) fn current_song(&self) -> Option<&Song> {
        self.choices.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        move_index(&mut self.selected, self.choices.len(), offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{apply_schema, create_song};
    use crate::models::SheetOptions;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().expect("in-memory db");
        apply_schema(&conn).expect("schema");
        conn
    }

    #[test]
    fn search_state_survives_refresh() {
        let conn = test_conn();
        for title in ["Alpha", "Beta", "Alphabet"] {
            create_song(&conn, title, "", "", "", SheetOptions::default(), b"%PDF").unwrap();
        }
        let mut screen = SongListScreen::new(&conn).unwrap();
        assert_eq!(screen.songs.len(), 3);

        screen
            .set_search(&conn, SearchField::Title, "alpha".to_string())
            .unwrap();
        assert_eq!(screen.songs.len(), 2);

        create_song(&conn, "Alphabetical", "", "", "", SheetOptions::default(), b"%PDF").unwrap();
        screen.refresh(&conn).unwrap();
        assert_eq!(screen.songs.len(), 3);

        screen.clear_search(&conn).unwrap();
        assert_eq!(screen.songs.len(), 4);
    }

    #[test]
    fn selection_clamps_to_list_bounds() {
        let conn = test_conn();
        create_song(&conn, "Only", "", "", "", SheetOptions::default(), b"%PDF").unwrap();
        let mut screen = SongListScreen::new(&conn).unwrap();
        screen.move_selection(5);
        assert_eq!(screen.selected, 0);
        screen.move_selection(-3);
        assert_eq!(screen.selected, 0);
    }
}
