//! Recover plain text from an existing PDF for the import flow.
//!
//! The extractor downstream only needs lines of text in reading order; the
//! heavy lifting (content stream parsing, encoding tables) is lopdf's.
//! Extraction quality varies with how the source PDF was produced, which is
//! exactly why the field splitter treats its input as best-effort.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use lopdf::Document;

/// Load a PDF from disk and recover its text page by page.
pub fn recover_text_from_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    recover_text(&bytes)
}

/// Recover text from in-memory PDF bytes, pages joined with newlines.
pub fn recover_text(bytes: &[u8]) -> Result<String> {
    let doc = Document::load_mem(bytes).context("failed to parse PDF document")?;
    let mut text = String::new();
    for page_number in doc.get_pages().keys() {
        let page_text = doc
            .extract_text(&[*page_number])
            .with_context(|| format!("failed to extract text from page {page_number}"))?;
        text.push_str(&page_text);
        if !text.ends_with('\n') {
            text.push('\n');
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{compose, BuiltinMetrics, SheetRequest};
    use crate::pdf::render;

    #[test]
    fn rejects_garbage_bytes() {
        assert!(recover_text(b"not a pdf at all").is_err());
    }

    #[test]
    fn recovers_text_from_rendered_sheet() {
        let request = SheetRequest {
            title: "Be Thou My Vision".to_string(),
            artist: "Traditional".to_string(),
            key: "D".to_string(),
            body: vec!["Be thou my vision O Lord of my heart".to_string()],
            font_size: 11,
            include_header: true,
            include_page_numbers: false,
        };
        let bytes = render(&compose(&request, &BuiltinMetrics)).expect("render");
        let text = recover_text(&bytes).expect("extraction");
        assert!(text.contains("Be Thou My Vision"));
        assert!(text.contains("Traditional"));
    }
}
