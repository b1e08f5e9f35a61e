//! AST parsing and tree edit distance (C3): parses source into a simplified
//! tree, compares two versions with the Zhang-Shasha algorithm, and
//! classifies the result into a [`docimpact_core::ChangeType`].

mod diff;
mod fallback;
mod registry;
mod tree;
mod zhang_shasha;

pub use diff::{analyze_change, ClassificationThresholds, SemanticChange};
pub use registry::{parse_to_tree, ParseOutcome};
pub use tree::TreeNode;
pub use zhang_shasha::{EditCosts, ZhangShasha};
