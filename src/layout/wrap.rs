//! Width-aware word wrapping for lyric lines.

use super::metrics::{FontMetrics, FontStyle};

/// Break one logical line into physical lines no wider than `max_width`.
///
/// Accumulation is greedy: each word is tentatively appended to the running
/// line (with a single joining space) and the candidate is measured; when
/// the candidate overflows and the running line already holds text, the
/// running line is emitted and the word starts a fresh one. Splits happen
/// only at spaces — a single word wider than `max_width` is placed alone on
/// its own line and allowed to overflow rather than hyphenated.
///
/// An empty or whitespace-only input yields one blank physical line so that
/// stanza gaps in lyrics keep their vertical spacing.
pub fn wrap_line(
    text: &str,
    style: FontStyle,
    size: f64,
    max_width: f64,
    metrics: &dyn FontMetrics,
) -> Vec<String> {
    if text.trim().is_empty() {
        return vec![String::new()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if metrics.width(&candidate, style, size) > max_width && !current.is_empty() {
            lines.push(current);
            current = word.to_string();
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::CountingMetrics;

    /// Width of `text` under the counting stub (1 unit per char at size 1).
    fn w(text: &str) -> f64 {
        CountingMetrics.width(text, FontStyle::Regular, 1.0)
    }

    fn wrap(text: &str, max_width: f64) -> Vec<String> {
        wrap_line(text, FontStyle::Regular, 1.0, max_width, &CountingMetrics)
    }

    #[test]
    fn short_line_passes_through() {
        assert_eq!(wrap("just a line", 100.0), vec!["just a line"]);
    }

    #[test]
    fn greedy_boundary_keeps_exact_fit_whole() {
        // Max width exactly the width of "hello world": the first two words
        // stay together and only the third spills over.
        let max = w("hello world");
        assert_eq!(wrap("hello world foo", max), vec!["hello world", "foo"]);
    }

    #[test]
    fn blank_line_is_preserved() {
        assert_eq!(wrap("", 10.0), vec![""]);
        assert_eq!(wrap("   ", 10.0), vec![""]);
    }

    #[test]
    fn overlong_word_overflows_alone() {
        let lines = wrap("hi incomprehensibilities yo", 10.0);
        assert_eq!(lines, vec!["hi", "incomprehensibilities", "yo"]);
    }

    #[test]
    fn every_multiword_line_fits() {
        let max = 14.0;
        for line in wrap("the quick brown fox jumps over the lazy dog", max) {
            assert!(w(&line) <= max, "{line:?} exceeds max width");
        }
    }

    #[test]
    fn runs_of_spaces_collapse_at_split_points() {
        assert_eq!(wrap("one  two\tthree", 100.0), vec!["one two three"]);
    }
}
