// src/sanitize.rs

/// Maps an arbitrary label to a string that is safe as a single path
/// component.
///
/// Path separators, shell wildcards, quotes, spaces and control characters
/// become `-`; everything else passes through untouched.
pub fn safe_filename(label: &str) -> String {
    label
        .chars()
        .map(|c| if is_disallowed(c) { '-' } else { c })
        .collect()
}

fn is_disallowed(c: char) -> bool {
    matches!(c, '/' | '\\' | '?' | '%' | '*' | ':' | '|' | '"' | '<' | '>' | ' ')
        || c <= '\u{1F}'
        || c == '\u{7F}'
}
