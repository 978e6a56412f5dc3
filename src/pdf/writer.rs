//! Encode composed pages into a PDF document.
//!
//! Each [`TextRun`] becomes a BT/Tf/Td/Tj/ET group in the page content
//! stream; the two faces the layout engine knows about map onto the base-14
//! Helvetica and Helvetica-Bold with WinAnsi encoding, so no font files are
//! embedded and the output stays tiny.

use anyhow::{Context, Result};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::layout::{FontStyle, Page, TextRun, PAGE_HEIGHT, PAGE_WIDTH};

/// Resource name of the regular face.
const FONT_REGULAR: &str = "F1";
/// Resource name of the bold face.
const FONT_BOLD: &str = "F2";

/// Serialize a composed page sequence into PDF bytes.
pub fn render(pages: &[Page]) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_REGULAR => regular_id,
            FONT_BOLD => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let content = page_content(page);
        let encoded = content
            .encode()
            .context("failed to encode page content stream")?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .context("failed to serialize PDF document")?;
    Ok(bytes)
}

/// Build the content stream for one page: every run in reading order, then
/// the page-number stamp.
fn page_content(page: &Page) -> Content {
    let mut operations = Vec::new();
    for run in page
        .runs
        .iter()
        .chain(page.number_stamp.as_ref().into_iter())
    {
        push_run(&mut operations, run);
    }
    Content { operations }
}

fn push_run(operations: &mut Vec<Operation>, run: &TextRun) {
    let font = match run.style {
        FontStyle::Regular => FONT_REGULAR,
        FontStyle::Bold => FONT_BOLD,
    };
    operations.push(Operation::new("BT", vec![]));
    operations.push(Operation::new("Tf", vec![font.into(), run.size.into()]));
    operations.push(Operation::new("Td", vec![run.x.into(), run.y.into()]));
    operations.push(Operation::new(
        "Tj",
        vec![Object::String(
            to_winansi(&run.text),
            lopdf::StringFormat::Literal,
        )],
    ));
    operations.push(Operation::new("ET", vec![]));
}

/// Map text onto WinAnsi bytes: ASCII and Latin-1 pass through, the handful
/// of typographic characters WinAnsi relocated get their proper slots, and
/// anything unrepresentable degrades to `?`.
fn to_winansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            '\u{20}'..='\u{7E}' | '\u{A0}'..='\u{FF}' => ch as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            '‰' => 0x89,
            '‹' => 0x8B,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            '›' => 0x9B,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{compose, BuiltinMetrics, SheetRequest};

    fn sample_pages() -> Vec<Page> {
        let request = SheetRequest {
            title: "Amazing Grace".to_string(),
            artist: "John Newton".to_string(),
            key: "G".to_string(),
            body: vec![
                "Amazing grace how sweet the sound".to_string(),
                "That saved a wretch like me".to_string(),
            ],
            font_size: 11,
            include_header: true,
            include_page_numbers: true,
        };
        compose(&request, &BuiltinMetrics)
    }

    #[test]
    fn render_produces_a_loadable_document() {
        let bytes = render(&sample_pages()).expect("render should succeed");
        assert!(bytes.starts_with(b"%PDF"));
        let doc = Document::load_mem(&bytes).expect("output should parse");
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn page_count_matches_input() {
        let mut pages = sample_pages();
        let extra = pages[0].clone();
        pages.push(Page {
            number: 2,
            ..extra
        });
        let bytes = render(&pages).expect("render should succeed");
        let doc = Document::load_mem(&bytes).expect("output should parse");
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn winansi_maps_separator_and_dashes() {
        assert_eq!(to_winansi("a • b"), vec![b'a', b' ', 0x95, b' ', b'b']);
        assert_eq!(to_winansi("–—"), vec![0x96, 0x97]);
        assert_eq!(to_winansi("né"), vec![b'n', 0xE9]);
        assert_eq!(to_winansi("→"), vec![b'?']);
    }
}
