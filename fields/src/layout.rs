//! Greedy word wrap shared by the editor and the renderer.
//!
//! The editor measures in characters against an average glyph width to
//! decide whether a field is too short for its text. The renderer measures
//! with real font metrics in PDF units. Both go through [`wrap_lines`] so the
//! line breaking itself is identical.

/// Average glyph width as a fraction of font size, for estimates.
pub const AVG_CHAR_WIDTH_RATIO: f64 = 0.55;

/// Line height as a multiple of font size, for estimates.
pub const LINE_HEIGHT_RATIO: f64 = 1.2;

/// Wrap `text` into lines no wider than `max_width` according to `measure`.
///
/// Paragraphs are split on `\n` and words on whitespace. A word that alone
/// exceeds `max_width` still gets its own line. Blank paragraphs produce no
/// lines.
pub fn wrap_lines<F>(text: &str, max_width: f64, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if measure(&candidate) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_owned()));
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

/// Characters that fit on one line at the average glyph width.
#[must_use]
pub fn max_chars_per_line(width: f64, font_size: f64) -> f64 {
    let avg = font_size * AVG_CHAR_WIDTH_RATIO;
    if avg <= 0.0 || !width.is_finite() {
        return f64::INFINITY;
    }
    (width / avg).floor()
}

/// Estimated number of rendered lines for `text` in a box `width` wide.
#[must_use]
pub fn estimate_line_count(text: &str, width: f64, font_size: f64) -> usize {
    let limit = max_chars_per_line(width, font_size);
    #[allow(clippy::cast_precision_loss)]
    let lines = wrap_lines(text, limit, |s| s.chars().count() as f64);
    lines.len()
}

/// Estimated rendered height of `text`, in the same units as `font_size`.
#[must_use]
pub fn estimate_height(text: &str, width: f64, font_size: f64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let lines = estimate_line_count(text, width, font_size) as f64;
    lines * font_size * LINE_HEIGHT_RATIO
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;
