//! Binary entry point that glues the SQLite-backed catalog to the TUI: bring
//! up the database, hydrate the initial app state, and drive the Ratatui
//! event loop until the user exits.
use song_sheet_manager::{ensure_schema, run_app, App};

/// Initialize persistence, hydrate the screens, and launch the event loop.
///
/// Returning a `Result` bubbles fatal initialization problems (for example a
/// home directory that cannot be written) to the terminal instead of crashing
/// silently.
fn main() -> anyhow::Result<()> {
    let conn = ensure_schema()?;
    let mut app = App::new(conn)?;
    run_app(&mut app)
}
