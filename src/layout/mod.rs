//! Pure sheet layout engine.
//!
//! Given song metadata, lyric lines, and layout options, [`compose`]
//! produces a sequence of [`Page`]s holding positioned text runs, ready for
//! the PDF encoder. The engine performs width-aware word wrapping and
//! pagination but does no I/O and touches no storage; fonts enter only as
//! an abstract [`FontMetrics`] width provider, so the whole module is
//! deterministic and trivially testable.

pub mod metrics;
mod paginate;
mod wrap;

pub use metrics::{BuiltinMetrics, FontMetrics, FontStyle};
pub use paginate::compose;
pub use wrap::wrap_line;

/// A4 page width in points, matching the encoder's media box.
pub const PAGE_WIDTH: f64 = 595.28;
/// A4 page height in points.
pub const PAGE_HEIGHT: f64 = 841.89;
/// Left and right margin; the usable line width is the page minus both.
pub const MARGIN: f64 = 50.0;
/// No text is placed once the cursor drops below this baseline.
pub const BOTTOM_MARGIN: f64 = 50.0;
/// Fixed leading added to the font size to form the line height.
pub const LINE_PADDING: f64 = 3.0;
/// Point size of the bold title on page 1.
pub const TITLE_SIZE: f64 = 16.0;
/// Point size of the `Artist • Key` summary under the title.
pub const SUMMARY_SIZE: f64 = 12.0;
/// Point size of the bottom-corner page-number stamp.
pub const PAGE_NUMBER_SIZE: f64 = 9.0;

/// Everything `compose` needs to lay out one sheet. Built fresh per
/// invocation by whichever caller owns the data (form save, import
/// confirmation) and discarded afterwards.
#[derive(Debug, Clone)]
pub struct SheetRequest {
    /// Song title; callers guarantee it is non-empty before composing.
    pub title: String,
    /// Artist, possibly blank.
    pub artist: String,
    /// Musical key, possibly blank.
    pub key: String,
    /// Lyric text as logical lines; blank lines mark stanza gaps and are
    /// preserved in the output.
    pub body: Vec<String>,
    /// Body font size in points (8–16, enforced upstream).
    pub font_size: u8,
    /// Render the centered header block on page 1.
    pub include_header: bool,
    /// Stamp a page number on every finished page.
    pub include_page_numbers: bool,
}

/// One positioned piece of text. `x`/`y` locate the baseline start in page
/// coordinates with the origin at the bottom-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub style: FontStyle,
}

/// A finished page: text runs in reading order plus the optional
/// page-number stamp kept apart from the flow so encoders can treat it as
/// furniture rather than content.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 1-based page number.
    pub number: u32,
    /// Header and body runs in reading order.
    pub runs: Vec<TextRun>,
    /// Bottom-corner page number, present when the request asked for one.
    pub number_stamp: Option<TextRun>,
}

/// Test-only metric stub: every character is one unit wide, scaled by size.
/// Exact enough to express wrap boundaries as plain character counts.
#[cfg(test)]
pub(crate) struct CountingMetrics;

#[cfg(test)]
impl FontMetrics for CountingMetrics {
    fn width(&self, text: &str, _style: FontStyle, size: f64) -> f64 {
        text.chars().count() as f64 * size
    }
}
