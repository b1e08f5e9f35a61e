//! Near-duplicate detection via MinHash + LSH (C6): shingles file content,
//! computes MinHash signatures, bands them for candidate generation, and
//! verifies candidates by exact signature similarity.

mod analyze;
mod glob;
mod lsh;
mod minhash;
mod shingle;

pub use analyze::{analyze_similarity, SimilarityConfig, SimilarityFile, SimilarityResult};
pub use glob::{glob_match, should_consider_path};
pub use lsh::{connected_components, lsh_candidates};
pub use minhash::{minhash_params, minhash_signature, signature_similarity, MinHashParams, P};
pub use shingle::{file_tokens, normalize_text};
