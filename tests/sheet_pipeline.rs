//! End-to-end checks over the compose / encode / recover pipeline: a sheet
//! laid out from known metadata should, after its text is recovered, yield
//! the same fields the extractor would guess from a scanned import.

use song_sheet_manager::extract::extract_fields;
use song_sheet_manager::layout::{compose, BuiltinMetrics, Page, SheetRequest};
use song_sheet_manager::pdf::{recover_text, render};

fn request(title: &str, artist: &str, key: &str, body: &[&str]) -> SheetRequest {
    SheetRequest {
        title: title.to_string(),
        artist: artist.to_string(),
        key: key.to_string(),
        body: body.iter().map(|line| line.to_string()).collect(),
        font_size: 11,
        include_header: true,
        include_page_numbers: true,
    }
}

/// Flatten composed pages back into the plain-text view an import would see.
fn page_text(pages: &[Page]) -> String {
    pages
        .iter()
        .flat_map(|page| page.runs.iter())
        .map(|run| run.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn composed_sheet_text_round_trips_through_the_extractor() {
    let pages = compose(
        &request(
            "Águas de Março",
            "Tom Jobim",
            "Em",
            &["É pau, é pedra", "é o fim do caminho"],
        ),
        &BuiltinMetrics,
    );

    let fields = extract_fields(&page_text(&pages)).expect("extraction");
    assert_eq!(fields.title, "Águas de Março");
    assert_eq!(fields.artist, "Tom Jobim");
    assert_eq!(fields.key, "Em");
    assert_eq!(fields.body, vec!["É pau, é pedra", "é o fim do caminho"]);
}

#[test]
fn extractor_recovers_key_without_a_delimiter() {
    let pages = compose(
        &request("Morning Hymn", "Traditional G", "", &["verse one"]),
        &BuiltinMetrics,
    );
    // No blank key, so the header line is just the artist text with a
    // trailing key token for the vocabulary fallback to peel off.
    let fields = extract_fields(&page_text(&pages)).expect("extraction");
    assert_eq!(fields.title, "Morning Hymn");
    assert_eq!(fields.artist, "Traditional");
    assert_eq!(fields.key, "G");
}

#[test]
fn rendered_pdf_text_contains_the_sheet_content() {
    let pages = compose(
        &request("Stored Sheet", "Somebody", "C", &["a memorable lyric line"]),
        &BuiltinMetrics,
    );
    let bytes = render(&pages).expect("pdf encoding");
    assert!(bytes.starts_with(b"%PDF"));

    let text = recover_text(&bytes).expect("text recovery");
    assert!(text.contains("Stored Sheet"));
    assert!(text.contains("a memorable lyric line"));
}

#[test]
fn long_sheets_paginate_and_number_every_page() {
    let body: Vec<String> = (1..=200).map(|n| format!("line number {n}")).collect();
    let body_refs: Vec<&str> = body.iter().map(String::as_str).collect();
    let pages = compose(
        &request("Long Sheet", "Someone", "D", &body_refs),
        &BuiltinMetrics,
    );

    assert!(pages.len() > 1, "200 lines cannot fit a single A4 page");
    for (index, page) in pages.iter().enumerate() {
        assert_eq!(page.number, (index + 1) as u32);
        let stamp = page.number_stamp.as_ref().expect("page number stamp");
        assert_eq!(stamp.text, page.number.to_string());
    }
}
