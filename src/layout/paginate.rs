//! Pagination: flows wrapped lyric lines down the page, breaking to a new
//! page whenever the cursor crosses the bottom margin.

use std::mem;

use super::wrap::wrap_line;
use super::{
    FontMetrics, FontStyle, Page, SheetRequest, TextRun, BOTTOM_MARGIN, LINE_PADDING, MARGIN,
    PAGE_HEIGHT, PAGE_NUMBER_SIZE, PAGE_WIDTH, SUMMARY_SIZE, TITLE_SIZE,
};
use crate::models::join_summary;

/// Baseline of the centered title on page 1.
const TITLE_Y: f64 = PAGE_HEIGHT - 80.0;
/// Drop from the title baseline to the summary baseline.
const SUMMARY_DROP: f64 = 24.0;
/// Gap between the last header baseline and the first body line.
const HEADER_GAP: f64 = 30.0;
/// First body baseline when the header is suppressed, and the top baseline
/// of every continuation page (which never repeats the header).
const BODY_TOP: f64 = PAGE_HEIGHT - 60.0;
/// Baseline of the page-number stamp.
const PAGE_NUMBER_Y: f64 = 30.0;

/// Lay out a full sheet. Cannot fail: degenerate input just produces more
/// (or emptier) pages, and callers keep the precondition that the title is
/// non-empty and the font size is within bounds.
pub fn compose(request: &SheetRequest, metrics: &dyn FontMetrics) -> Vec<Page> {
    let size = f64::from(request.font_size);
    let line_height = size + LINE_PADDING;
    let max_width = PAGE_WIDTH - 2.0 * MARGIN;

    let mut pages = Vec::new();
    let mut page = Page {
        number: 1,
        runs: Vec::new(),
        number_stamp: None,
    };
    let mut y = if request.include_header {
        place_header(&mut page, request, metrics)
    } else {
        BODY_TOP
    };

    for logical in &request.body {
        for physical in wrap_line(logical, FontStyle::Regular, size, max_width, metrics) {
            // Wrapping one logical line can itself span a page boundary, so
            // the break check runs before every physical placement.
            if y < BOTTOM_MARGIN {
                finish_page(&mut pages, &mut page, request, metrics);
                y = BODY_TOP;
            }
            if !physical.is_empty() {
                page.runs.push(TextRun {
                    text: physical,
                    x: MARGIN,
                    y,
                    size,
                    style: FontStyle::Regular,
                });
            }
            y -= line_height;
        }
    }

    finish_page(&mut pages, &mut page, request, metrics);
    pages
}

/// Emit the centered title and, when artist or key is present, the summary
/// line beneath it. Returns the baseline for the first body line.
fn place_header(page: &mut Page, request: &SheetRequest, metrics: &dyn FontMetrics) -> f64 {
    let title_width = metrics.width(&request.title, FontStyle::Bold, TITLE_SIZE);
    page.runs.push(TextRun {
        text: request.title.clone(),
        x: (PAGE_WIDTH - title_width) / 2.0,
        y: TITLE_Y,
        size: TITLE_SIZE,
        style: FontStyle::Bold,
    });

    let mut bottom = TITLE_Y;
    let summary = join_summary(&request.artist, &request.key);
    if !summary.is_empty() {
        bottom = TITLE_Y - SUMMARY_DROP;
        let summary_width = metrics.width(&summary, FontStyle::Regular, SUMMARY_SIZE);
        page.runs.push(TextRun {
            text: summary,
            x: (PAGE_WIDTH - summary_width) / 2.0,
            y: bottom,
            size: SUMMARY_SIZE,
            style: FontStyle::Regular,
        });
    }
    bottom - HEADER_GAP
}

/// Stamp the page number when requested, push the finished page, and reset
/// the working page for the next one.
fn finish_page(
    pages: &mut Vec<Page>,
    page: &mut Page,
    request: &SheetRequest,
    metrics: &dyn FontMetrics,
) {
    if request.include_page_numbers {
        let text = page.number.to_string();
        let width = metrics.width(&text, FontStyle::Regular, PAGE_NUMBER_SIZE);
        page.number_stamp = Some(TextRun {
            text,
            x: PAGE_WIDTH - MARGIN - width,
            y: PAGE_NUMBER_Y,
            size: PAGE_NUMBER_SIZE,
            style: FontStyle::Regular,
        });
    }
    let next = Page {
        number: page.number + 1,
        runs: Vec::new(),
        number_stamp: None,
    };
    pages.push(mem::replace(page, next));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::CountingMetrics;

    fn request(body: Vec<&str>) -> SheetRequest {
        SheetRequest {
            title: "Amazing Grace".to_string(),
            artist: "John Newton".to_string(),
            key: "G".to_string(),
            body: body.into_iter().map(str::to_string).collect(),
            font_size: 11,
            include_header: true,
            include_page_numbers: true,
        }
    }

    #[test]
    fn single_verse_fits_on_one_page() {
        let pages = compose(&request(vec!["line one", "line two"]), &CountingMetrics);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].number, 1);
        // title + summary + two body lines
        assert_eq!(pages[0].runs.len(), 4);
    }

    #[test]
    fn header_appears_only_on_first_page() {
        let body: Vec<&str> = std::iter::repeat("la la la").take(200).collect();
        let pages = compose(&request(body), &CountingMetrics);
        assert!(pages.len() > 1);
        assert!(pages[0]
            .runs
            .iter()
            .any(|run| run.style == FontStyle::Bold && run.text == "Amazing Grace"));
        for page in &pages[1..] {
            assert!(page.runs.iter().all(|run| run.style == FontStyle::Regular));
            assert!(page.runs.iter().all(|run| run.text != "Amazing Grace"));
        }
    }

    #[test]
    fn suppressing_header_starts_body_higher() {
        let mut with_header = request(vec!["first"]);
        let mut without = with_header.clone();
        without.include_header = false;
        with_header.include_page_numbers = false;
        without.include_page_numbers = false;

        let headered = compose(&with_header, &CountingMetrics);
        let plain = compose(&without, &CountingMetrics);
        let body_y = |pages: &[Page]| {
            pages[0]
                .runs
                .iter()
                .find(|run| run.text == "first")
                .map(|run| run.y)
                .unwrap()
        };
        assert!(body_y(&plain) > body_y(&headered));
        assert_eq!(body_y(&plain), BODY_TOP);
    }

    #[test]
    fn blank_lines_keep_their_vertical_slot() {
        let spaced = compose(&request(vec!["a", "", "b"]), &CountingMetrics);
        let packed = compose(&request(vec!["a", "b"]), &CountingMetrics);
        let y_of = |pages: &[Page], text: &str| {
            pages[0]
                .runs
                .iter()
                .find(|run| run.text == text)
                .map(|run| run.y)
                .unwrap()
        };
        let gap_spaced = y_of(&spaced, "a") - y_of(&spaced, "b");
        let gap_packed = y_of(&packed, "a") - y_of(&packed, "b");
        assert!((gap_spaced - 2.0 * gap_packed).abs() < 1e-9);
    }

    #[test]
    fn page_numbers_stamped_on_every_page_when_enabled() {
        let body: Vec<&str> = std::iter::repeat("verse").take(150).collect();
        let pages = compose(&request(body), &CountingMetrics);
        assert!(pages.len() > 1);
        for (index, page) in pages.iter().enumerate() {
            let stamp = page.number_stamp.as_ref().expect("missing stamp");
            assert_eq!(stamp.text, (index + 1).to_string());
            assert!(stamp.x < PAGE_WIDTH - MARGIN);
            assert_eq!(stamp.size, PAGE_NUMBER_SIZE);
        }
    }

    #[test]
    fn page_numbers_absent_when_disabled() {
        let mut req = request(vec!["only line"]);
        req.include_page_numbers = false;
        let pages = compose(&req, &CountingMetrics);
        assert!(pages.iter().all(|page| page.number_stamp.is_none()));
    }

    #[test]
    fn no_body_run_sits_below_the_bottom_margin() {
        let body: Vec<&str> = std::iter::repeat("down we go").take(300).collect();
        let pages = compose(&request(body), &CountingMetrics);
        for page in &pages {
            for run in &page.runs {
                assert!(run.y >= BOTTOM_MARGIN - 1e-9);
            }
        }
    }

    #[test]
    fn wrapped_lines_never_exceed_usable_width_except_lone_words() {
        let long = "word ".repeat(60);
        let req = request(vec![long.as_str()]);
        let max = PAGE_WIDTH - 2.0 * MARGIN;
        for page in compose(&req, &CountingMetrics) {
            for run in page.runs.iter().filter(|run| run.style == FontStyle::Regular) {
                if run.text.contains(' ') {
                    let width =
                        CountingMetrics.width(&run.text, FontStyle::Regular, run.size);
                    assert!(width <= max + 1e-9);
                }
            }
        }
    }

    #[test]
    fn appending_lines_never_shrinks_the_page_count() {
        let mut body: Vec<String> = Vec::new();
        let mut last = 0;
        for index in 0..400 {
            body.push(format!("line number {index}"));
            let req = SheetRequest {
                body: body.clone(),
                ..request(vec![])
            };
            let count = compose(&req, &CountingMetrics).len();
            assert!(count >= last, "page count shrank at line {index}");
            last = count;
        }
    }

    #[test]
    fn compose_is_deterministic() {
        let req = request(vec!["one", "", "two", "three"]);
        assert_eq!(
            compose(&req, &CountingMetrics),
            compose(&req, &CountingMetrics)
        );
    }
}
