//! Library surface for the song sheet manager.
//!
//! The crate splits into a pure layout engine ([`layout`]), a heuristic field
//! extractor ([`extract`]), a PDF codec ([`pdf`]), a SQLite persistence layer
//! ([`db`]), and the Ratatui front end ([`ui`]). The binary target wires them
//! together; the re-exports below cover everything `main.rs` needs.
pub mod db;
pub mod extract;
pub mod layout;
pub mod models;
pub mod pdf;
pub mod ui;

/// Persistence bootstrap used by `main.rs`.
pub use db::ensure_schema;

/// The primary domain types the other layers manipulate.
pub use models::{Group, SheetOptions, Song};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
