//! ReadScore text similarity
//!
//! Case-insensitive Levenshtein distance and the 0-100 accuracy score
//! reported for a recognized sentence.

mod distance;
mod similarity;

pub use distance::levenshtein;
pub use similarity::{score, Accuracy};
