use crate::registry::parse_to_tree;
use crate::zhang_shasha::{EditCosts, ZhangShasha};
use docimpact_core::{ChangeType, Language};

/// Thresholds for classifying a normalized tree edit distance, carried
/// separately from [`docimpact_core::PipelineConfig`] so this crate has no
/// dependency on the full config shape.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationThresholds {
    pub refactor: f64,
    pub minor: f64,
    pub major: f64,
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self {
            refactor: 0.1,
            minor: 0.3,
            major: 0.6,
        }
    }
}

/// Outcome of comparing two versions of one file's source text.
#[derive(Debug, Clone)]
pub struct SemanticChange {
    pub change_type: ChangeType,
    pub distance: f64,
    pub normalized_distance: f64,
    pub parse_error: bool,
}

/// Parses both versions, computes the Zhang-Shasha distance between their
/// trees, and classifies the result. A parse failure on either side is
/// impossible here by construction (tree-sitter parse failures fall back to
/// the deterministic tokenizer in [`parse_to_tree`]) — this function never
/// aborts and always returns a classification, with the fallback-derived
/// tree naturally producing a larger distance for genuinely broken input.
pub fn analyze_change(
    old_code: &str,
    new_code: &str,
    language: Language,
    thresholds: ClassificationThresholds,
) -> SemanticChange {
    if old_code == new_code {
        return SemanticChange {
            change_type: ChangeType::Identical,
            distance: 0.0,
            normalized_distance: 0.0,
            parse_error: false,
        };
    }

    let old_outcome = parse_to_tree(old_code, language);
    let new_outcome = parse_to_tree(new_code, language);

    if old_outcome.used_fallback || new_outcome.used_fallback {
        return SemanticChange {
            change_type: ChangeType::Major,
            distance: f64::INFINITY,
            normalized_distance: 1.0,
            parse_error: true,
        };
    }

    let tree1 = old_outcome.tree;
    let tree2 = new_outcome.tree;

    let mut zs = ZhangShasha::new(EditCosts::default());
    let distance = zs.distance(&tree1, &tree2);

    let max_size = tree1.size().max(tree2.size()) as f64;
    let normalized = if max_size > 0.0 { distance / max_size } else { 0.0 };

    let change_type = classify(normalized, thresholds);

    SemanticChange {
        change_type,
        distance,
        normalized_distance: normalized,
        parse_error: false,
    }
}

fn classify(normalized: f64, thresholds: ClassificationThresholds) -> ChangeType {
    if normalized < 0.001 {
        ChangeType::Identical
    } else if normalized <= thresholds.refactor {
        ChangeType::Refactor
    } else if normalized <= thresholds.minor {
        ChangeType::Minor
    } else if normalized <= thresholds.major {
        ChangeType::Major
    } else {
        ChangeType::Rewrite
    }
}
