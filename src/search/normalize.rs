//! Text normalization shared by the index builder and the query parser

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lowercase, strip diacritics, collapse every run of non `[a-z0-9]`
/// characters to a single space and trim.
///
/// Pure and total: the output only ever contains `[a-z0-9 ]`, with no leading,
/// trailing or doubled spaces, so normalizing twice is the same as once.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    // Lowercase before decomposing so expansions like 'İ' → "i\u{307}" lose their mark
    for c in text.to_lowercase().nfd().filter(|c| !is_combining_mark(*c)) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            pending_space = true;
        }
    }

    out
}

/// Normalize and split on whitespace, dropping empties
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
