//! Query parsing

use once_cell::sync::Lazy;
use regex::Regex;

use super::normalize::{normalize, tokenize};

static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]*)""#).expect("valid phrase regex"));

/// A parsed search query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    /// Normalized double-quoted phrases
    pub phrases: Vec<String>,
    /// Normalized individual terms from everything outside quotes
    pub terms: Vec<String>,
}

impl ParsedQuery {
    /// An empty query scores every item 0 (search inactive)
    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty() && self.terms.is_empty()
    }
}

/// Split a raw query into exact phrases and loose terms
///
/// An unmatched trailing quote is ignored and its text treated as terms.
pub fn parse_query(raw: &str) -> ParsedQuery {
    let mut phrases = Vec::new();
    for capture in QUOTED.captures_iter(raw) {
        let phrase = normalize(&capture[1]);
        if !phrase.is_empty() && !phrases.contains(&phrase) {
            phrases.push(phrase);
        }
    }

    let remainder = QUOTED.replace_all(raw, " ");
    let mut terms: Vec<String> = Vec::new();
    for term in tokenize(&remainder) {
        if !terms.contains(&term) {
            terms.push(term);
        }
    }

    ParsedQuery { phrases, terms }
}
