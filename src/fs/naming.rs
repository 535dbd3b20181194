//! Path component sanitisation.
//!
//! Sanitisation is a pure function so that re-running a query maps every
//! page to the same path. Two different titles can still collapse onto the
//! same component after truncation; the illustration id prefix makes that
//! rare but not impossible, and the later write wins.

use crate::media::ItemRef;

/// Maximum length of a sanitised component, in characters.
pub const MAX_COMPONENT_CHARS: usize = 80;

/// Placeholder for authors whose name sanitises to nothing.
const UNKNOWN_AUTHOR: &str = "unknown_author";

/// Sanitize a path component, replacing unsafe characters and truncating.
///
/// Never fails: an input that sanitises to nothing (empty, only dots, only
/// whitespace) yields `fallback` instead.
pub fn sanitize_component(name: &str, fallback: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let truncated: String = tidy(&replaced).chars().take(MAX_COMPONENT_CHARS).collect();
    let cleaned = tidy(&truncated);

    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Trim surrounding whitespace and trailing dots.
///
/// Trailing dots are invalid on Windows, and stripping them also turns `.`
/// and `..` into the empty string.
fn tidy(name: &str) -> &str {
    name.trim().trim_end_matches(['.', ' '])
}

/// Folder name for an author.
pub fn author_dir_name(item: &ItemRef) -> String {
    sanitize_component(&item.author_name, UNKNOWN_AUTHOR)
}

/// Folder name for an illustration: `{id}_{title}`.
pub fn item_dir_name(item: &ItemRef) -> String {
    sanitize_component(&format!("{}_{}", item.id, item.title), &item.id)
}

/// File stem for a page: `p{index}`.
pub fn page_stem(page_index: u32) -> String {
    format!("p{}", page_index)
}

/// File name for a page: `p{index}.{ext}`.
pub fn page_file_name(page_index: u32, extension: &str) -> String {
    format!("{}.{}", page_stem(page_index), extension)
}
