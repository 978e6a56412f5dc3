//! Persistence module split across logical submodules.

pub(crate) mod connection;
mod groups;
mod songs;

pub use connection::{apply_schema, backup_database, ensure_schema};
pub use groups::{
    add_song_to_group, create_group, delete_group, fetch_available_songs, fetch_groups,
    fetch_songs_for_group, remove_song_from_group, update_group,
};
pub use songs::{
    create_song, delete_song, fetch_all_songs, fetch_lyrics, fetch_pdf, search_songs, update_song,
    SearchField, SortOrder,
};
