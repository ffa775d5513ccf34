//! Text search over gallery items
//!
//! Normalization, fuzzy matching, query parsing, the per-item index, relevance
//! scoring and the filter/sort/paginate pipeline.

pub mod fuzzy;
pub mod index;
pub mod normalize;
pub mod pipeline;
pub mod query;
pub mod score;

pub use pipeline::{paginate, run_pipeline, total_pages};
pub use query::{parse_query, ParsedQuery};
