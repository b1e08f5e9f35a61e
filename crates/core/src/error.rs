use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cross-cutting error kinds surfaced by the orchestrator entry point.
///
/// `Fetch`, `TreeTruncated`, and `Config` are fatal: the orchestrator
/// aborts the run and returns this error directly. The remaining kinds are
/// tolerated: callers in the relevant layer catch them, record a
/// [`Warning`], and continue with a partial or empty result.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("fetch failed for reference '{reference}' in {component}: {message}")]
    Fetch {
        component: String,
        reference: String,
        message: String,
    },

    #[error("tree listing for reference '{reference}' was truncated by the host")]
    TreeTruncated { reference: String },

    #[error("failed to parse '{path}': {message}")]
    Parse { path: String, message: String },

    #[error("{layer} is unavailable: {message}")]
    LayerUnavailable { layer: String, message: String },

    #[error("{component} exceeded its time budget and returned a partial result")]
    BudgetExceeded { component: String },

    #[error("rewrite of '{entity}' in '{doc_path}' failed: {message}")]
    Rewrite {
        entity: String,
        doc_path: String,
        message: String,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlDecode(#[from] toml::de::Error),
}

impl AnalysisError {
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Fetch { .. } | Self::TreeTruncated { .. } | Self::Config(_)
        )
    }

    pub fn component(&self) -> &str {
        match self {
            Self::Fetch { component, .. } => component,
            Self::TreeTruncated { .. } => "snapshot",
            Self::Parse { .. } => "parser",
            Self::LayerUnavailable { layer, .. } => layer,
            Self::BudgetExceeded { component } => component,
            Self::Rewrite { .. } => "rewriter",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
            Self::TomlDecode(_) => "config",
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// A tolerated failure attached to [`crate::AnalysisResult::warnings`]
/// instead of aborting the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warning {
    pub component: String,
    pub message: String,
}

impl From<&AnalysisError> for Warning {
    fn from(err: &AnalysisError) -> Self {
        Self {
            component: err.component().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_kinds_are_fetch_truncated_config() {
        assert!(AnalysisError::Fetch {
            component: "snapshot".into(),
            reference: "main".into(),
            message: "boom".into()
        }
        .is_fatal());
        assert!(AnalysisError::TreeTruncated {
            reference: "main".into()
        }
        .is_fatal());
        assert!(AnalysisError::Config("bad".into()).is_fatal());
        assert!(!AnalysisError::LayerUnavailable {
            layer: "graph".into(),
            message: "no networkx".into()
        }
        .is_fatal());
    }
}
