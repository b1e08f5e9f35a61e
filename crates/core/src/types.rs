use crate::error::Warning;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A short identifier string extracted from source code (a function or
/// class name). Collisions across files are expected and accepted: they
/// merge into the same Aho-Corasick pattern.
pub type EntityName = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Java,
    Kotlin,
    Unknown,
}

impl Language {
    pub fn from_extension(ext: &str) -> Self {
        match ext.trim_start_matches('.') {
            "py" => Self::Python,
            "js" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            "ts" | "tsx" => Self::TypeScript,
            "java" => Self::Java,
            "kt" | "kts" => Self::Kotlin,
            _ => Self::Unknown,
        }
    }

    pub fn from_path(path: &str) -> Self {
        match path.rsplit('.').next() {
            Some(ext) => Self::from_extension(ext),
            None => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Java => "java",
            Self::Kotlin => "kotlin",
            Self::Unknown => "none",
        }
    }
}

/// Classification of a tree-edit-distance comparison between two versions
/// of one file. Ordered from least to most severe for convenience, though
/// no code relies on the derived ordinal values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Identical,
    Refactor,
    Minor,
    Major,
    Rewrite,
}

impl ChangeType {
    /// `needs_doc_update ⇔ change_type ∈ {minor, major, rewrite}`.
    pub fn needs_doc_update(&self) -> bool {
        matches!(self, Self::Minor | Self::Major | Self::Rewrite)
    }

    /// `{refactor:0, minor:1, major:3, rewrite:5}`; `identical` never
    /// reaches the scorer since it never needs a doc update, but carries a
    /// weight of 0 for completeness.
    pub fn severity_weight(&self) -> f64 {
        match self {
            Self::Identical | Self::Refactor => 0.0,
            Self::Minor => 1.0,
            Self::Major => 3.0,
            Self::Rewrite => 5.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identical => "identical",
            Self::Refactor => "refactor",
            Self::Minor => "minor",
            Self::Major => "major",
            Self::Rewrite => "rewrite",
        }
    }
}

/// How a path's presence differs between the two snapshots being compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStatus {
    Added,
    Deleted,
    Modified,
    Oversized,
}

/// One file's semantic-diff record, produced by C3 and consumed by C7/C8.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangedFile {
    pub path: String,
    pub change_type: ChangeType,
    pub distance: f64,
    pub normalized_distance: f64,
    pub size_old: usize,
    pub size_new: usize,
    pub language: Language,
    pub entities: BTreeSet<EntityName>,
    pub needs_doc_update: bool,
    pub parse_error: bool,
}

impl ChangedFile {
    pub fn file_stem(&self) -> &str {
        let name = self.path.rsplit('/').next().unwrap_or(&self.path);
        name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// `score > 5 → HIGH`, `2 ≤ score ≤ 5 → MEDIUM`, else `LOW`.
    pub fn from_score(score: f64) -> Self {
        if score > 5.0 {
            Self::High
        } else if score >= 2.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// A documentation file whose content references entities changed in this
/// run, ranked by impact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactedDoc {
    pub doc_path: String,
    pub priority: Priority,
    pub score: f64,
    pub reasons: Vec<String>,
    pub changed_entities: BTreeSet<EntityName>,
    pub mention_counts: BTreeMap<EntityName, usize>,
    pub line_numbers: BTreeMap<EntityName, Vec<u32>>,
    pub community_size: usize,
}

/// Aggregation of every layer's output for one `(old_ref, new_ref)` run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub old_ref: String,
    pub new_ref: String,
    pub code_slug: String,
    pub docs_slug: String,
    pub changes: Vec<ChangedFile>,
    pub files_added: Vec<String>,
    pub files_deleted: Vec<String>,
    pub impacted_docs: Vec<ImpactedDoc>,
    pub similarity_pairs: Vec<SimilarPair>,
    pub warnings: Vec<Warning>,
    pub truncated: bool,
    pub elapsed_seconds: f64,
}

/// A near-duplicate pair reported by C6, `a < b` lexicographically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarPair {
    pub a: String,
    pub b: String,
    pub similarity: f64,
}
