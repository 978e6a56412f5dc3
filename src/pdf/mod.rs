//! PDF collaborators for the layout core: an encoder that turns composed
//! pages into bytes, and a reader that recovers plain text from existing
//! documents during import. Both sit on `lopdf`; nothing in here performs
//! layout decisions of its own.

mod reader;
mod writer;

pub use reader::{recover_text, recover_text_from_file};
pub use writer::render;
