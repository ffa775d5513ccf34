//! Relevance scoring
//!
//! The constants are relative weights. What must hold is the ordering:
//! - a phrase beats a single term in the same field
//! - title > author > colors > alt >= description
//! - a literal match scores a substring base, plus a bonus when it is a whole
//!   token or, failing that, a token prefix: whole token > prefix > bare
//!   substring > fuzzy (distance 1 > distance 2)
//! - a term naming one of the item's colors adds a fixed bonus on top

use crate::color::resolve_alias;
use crate::state::data::GalleryItem;

use super::fuzzy::edit_distance_at_most;
use super::index::{FieldIndex, SearchIndex};
use super::query::ParsedQuery;

const TITLE_WEIGHT: f32 = 5.0;
const AUTHOR_WEIGHT: f32 = 3.0;
const COLORS_WEIGHT: f32 = 2.5;
const ALT_WEIGHT: f32 = 1.6;
const DESCRIPTION_WEIGHT: f32 = 1.4;

const PHRASE_MATCH: f32 = 12.0;
const SUBSTRING_MATCH: f32 = 5.0;
const TOKEN_MATCH: f32 = 4.0;
const PREFIX_MATCH: f32 = 2.5;
const FUZZY_ONE: f32 = 1.5;
const FUZZY_TWO: f32 = 0.75;

const COLOR_BONUS: f32 = 6.0;

/// Terms this short only tolerate a single edit
const SHORT_TERM_LEN: usize = 4;

fn weighted_fields(index: &SearchIndex) -> [(&FieldIndex, f32); 5] {
    [
        (&index.title, TITLE_WEIGHT),
        (&index.author, AUTHOR_WEIGHT),
        (&index.colors, COLORS_WEIGHT),
        (&index.alt, ALT_WEIGHT),
        (&index.description, DESCRIPTION_WEIGHT),
    ]
}

/// Score an item against a parsed query; 0 means "not a match"
pub fn score_item(item: &GalleryItem, query: &ParsedQuery) -> f32 {
    if query.is_empty() {
        return 0.0;
    }
    score_index(item.index(), query)
}

pub fn score_index(index: &SearchIndex, query: &ParsedQuery) -> f32 {
    let fields = weighted_fields(index);
    let mut score = 0.0;

    for phrase in &query.phrases {
        for (field, weight) in &fields {
            if field.text.contains(phrase.as_str()) {
                score += PHRASE_MATCH * weight;
            }
        }
    }

    for term in &query.terms {
        for (field, weight) in &fields {
            score += term_field_score(term, field) * weight;
        }
        if resolve_alias(term).is_some_and(|category| index.color_set.contains(&category)) {
            score += COLOR_BONUS;
        }
    }

    score
}

/// Unweighted contribution of one term in one field
fn term_field_score(term: &str, field: &FieldIndex) -> f32 {
    if field.text.is_empty() {
        return 0.0;
    }

    if field.text.contains(term) {
        let token_bonus = if field.tokens.iter().any(|t| t == term) {
            TOKEN_MATCH
        } else if field.tokens.iter().any(|t| t.starts_with(term)) {
            PREFIX_MATCH
        } else {
            0.0
        };
        return SUBSTRING_MATCH + token_bonus;
    }

    let max_dist = if term.chars().count() <= SHORT_TERM_LEN { 1 } else { 2 };
    let best = field
        .tokens
        .iter()
        .map(|token| edit_distance_at_most(term, token, max_dist))
        .min()
        .unwrap_or(max_dist + 1);

    match best {
        1 => FUZZY_ONE,
        2 if max_dist >= 2 => FUZZY_TWO,
        _ => 0.0,
    }
}
