// ABOUTME: DOM access helpers shared by every retailer resolver.
// ABOUTME: Covers cached selector lookups, text normalization, and transient label/value entries.

pub mod compiled;
pub mod entry;
pub mod text;

pub use compiled::{
    descendants_named, get_or_compile, select_all_in, select_first, select_first_in,
};
pub use entry::Entry;
pub use text::{
    normalize_whitespace, raw_text, sanitize_label, strip_directional_marks, text_content,
};
