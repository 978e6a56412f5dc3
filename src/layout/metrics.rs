//! Font width metrics used for positioning text on the page.
//!
//! The layout engine never rasterizes anything; all it needs from a font is
//! "how wide is this string at this size". That contract is the
//! [`FontMetrics`] trait, and [`BuiltinMetrics`] satisfies it with the
//! standard Adobe AFM advance widths for Helvetica and Helvetica-Bold, the
//! two faces the PDF encoder embeds. Widths are stored in 1/1000-em units
//! and scaled by the requested point size.

/// The two font variants a sheet uses: regular for the body and summary
/// line, bold for the title and page headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
}

/// Abstract width provider. Layout correctness only requires the result to
/// be non-decreasing as text grows; visual quality depends on accuracy.
pub trait FontMetrics {
    /// Rendered width of `text` in page units at `size` points.
    fn width(&self, text: &str, style: FontStyle, size: f64) -> f64;
}

/// Advance width applied to any character outside the ASCII tables. Roughly
/// a lowercase letter; keeps accented Latin text close to its true width
/// and preserves monotonicity either way.
const FALLBACK_ADVANCE: u16 = 556;

/// Helvetica advance widths for code points 32..=126, in 1/1000 em.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333,
    278, 278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278,
    584, 584, 584, 556, 1015, 667, 667, 722, 722, 667, 611, 778, 722, 278,
    500, 667, 556, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 278, 278, 278, 469, 556, 333, 556, 556, 500, 556, 556,
    278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333, 500,
    278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold advance widths for code points 32..=126, in 1/1000 em.
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333,
    278, 278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333,
    584, 584, 584, 611, 975, 722, 722, 722, 722, 667, 611, 778, 722, 278,
    556, 722, 611, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 333, 278, 333, 584, 556, 333, 556, 611, 556, 611, 556,
    333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389, 556,
    333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Metric provider backed by the built-in Helvetica AFM tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinMetrics;

impl BuiltinMetrics {
    fn advance(ch: char, style: FontStyle) -> u16 {
        let table = match style {
            FontStyle::Regular => &HELVETICA,
            FontStyle::Bold => &HELVETICA_BOLD,
        };
        let code = ch as u32;
        if (32..=126).contains(&code) {
            table[(code - 32) as usize]
        } else {
            FALLBACK_ADVANCE
        }
    }
}

impl FontMetrics for BuiltinMetrics {
    fn width(&self, text: &str, style: FontStyle, size: f64) -> f64 {
        let millis: u32 = text
            .chars()
            .map(|ch| u32::from(Self::advance(ch, style)))
            .sum();
        f64::from(millis) * size / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_scales_with_size() {
        let metrics = BuiltinMetrics;
        let at_10 = metrics.width("Amazing Grace", FontStyle::Regular, 10.0);
        let at_20 = metrics.width("Amazing Grace", FontStyle::Regular, 20.0);
        assert!((at_20 - 2.0 * at_10).abs() < 1e-9);
    }

    #[test]
    fn width_is_monotonic_in_text_length() {
        let metrics = BuiltinMetrics;
        let mut text = String::new();
        let mut last = 0.0;
        for ch in "How sweet the sound — é".chars() {
            text.push(ch);
            let width = metrics.width(&text, FontStyle::Regular, 12.0);
            assert!(width >= last, "width shrank after pushing {ch:?}");
            last = width;
        }
    }

    #[test]
    fn bold_runs_wider_than_regular() {
        let metrics = BuiltinMetrics;
        let regular = metrics.width("Hallelujah", FontStyle::Regular, 16.0);
        let bold = metrics.width("Hallelujah", FontStyle::Bold, 16.0);
        assert!(bold > regular);
    }

    #[test]
    fn empty_text_has_zero_width() {
        assert_eq!(BuiltinMetrics.width("", FontStyle::Bold, 16.0), 0.0);
    }
}
