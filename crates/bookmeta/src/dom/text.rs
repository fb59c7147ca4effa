// ABOUTME: Text extraction helpers: normalized text content versus the raw, unnormalized text.
// ABOUTME: Strips bidirectional marks that retailers embed around localized labels.

//! Text access helpers.
//!
//! Key behaviors:
//! - `text_content` trims, collapses whitespace and drops directional marks.
//! - `raw_text` returns the text nodes untouched: entities decoded, whitespace kept.
//!   Script bodies come back exactly as written.
//! - `sanitize_label` turns a raw detail label such as `Publisher &rlm; : &lrm;`
//!   into the bare label `Publisher`.

use scraper::ElementRef;

const LEFT_TO_RIGHT_MARK: char = '\u{200E}';
const RIGHT_TO_LEFT_MARK: char = '\u{200F}';
const NO_BREAK_SPACE: char = '\u{00A0}';

/// Normalizes whitespace in a string by collapsing runs of whitespace into single spaces.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes left-to-right and right-to-left marks, both as characters and as entities.
pub fn strip_directional_marks(s: &str) -> String {
    s.replace("&lrm;", "")
        .replace("&rlm;", "")
        .replace([LEFT_TO_RIGHT_MARK, RIGHT_TO_LEFT_MARK], "")
}

/// Returns the element's text with whitespace collapsed and directional marks removed.
pub fn text_content(el: ElementRef<'_>) -> String {
    let text = el.text().collect::<String>();
    normalize_whitespace(&strip_directional_marks(&text))
}

/// Returns the concatenated text nodes without normalization.
pub fn raw_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

/// Cleans a detail label for localization lookup.
///
/// Newlines, directional marks and non-breaking spaces are dropped, then a
/// trailing colon and the surrounding whitespace are removed.
pub fn sanitize_label(el: ElementRef<'_>) -> String {
    let raw = raw_text(el).replace('\n', "").replace(NO_BREAK_SPACE, " ");
    let stripped = strip_directional_marks(&raw);
    let trimmed = stripped.trim();
    let without_colon = trimmed.strip_suffix(':').unwrap_or(trimmed);
    normalize_whitespace(without_colon)
}
