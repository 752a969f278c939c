//! Incremental story clustering.
//!
//! Articles are compared through their capitalized-token fingerprints. The
//! inverted index keeps lookups proportional to the tokens an article
//! shares with others instead of the number of live articles.

pub mod assignment;
pub mod fingerprint;
pub mod index;
#[cfg(test)]
mod tests;
pub mod types;

pub use types::*;

pub use assignment::{similarity, StoryClusterer};
pub use fingerprint::extract_fingerprint;
pub use index::InvertedIndex;
