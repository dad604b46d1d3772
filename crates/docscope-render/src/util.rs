//! Shared helpers for the markdown adapter.

use pulldown_cmark::HeadingLevel;

/// Convert heading level enum to number (1-6).
#[must_use]
pub(crate) fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Split a fence info string into language and meta string.
///
/// `"rust title=main.rs"` becomes `(Some("rust"), Some("title=main.rs"))`.
pub(crate) fn split_fence_info(info: &str) -> (Option<&str>, Option<&str>) {
    let info = info.trim();
    if info.is_empty() {
        return (None, None);
    }
    match info.split_once(char::is_whitespace) {
        Some((lang, meta)) => {
            let meta = meta.trim();
            (Some(lang), (!meta.is_empty()).then_some(meta))
        }
        None => (Some(info), None),
    }
}
