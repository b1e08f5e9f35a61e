use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for the five analysis layers and the orchestrator, named after
/// the invocation envelope. Every field has a default; a TOML file
/// overrides a subset of them through [`PartialConfig`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub merkle_tree_chunk_size: usize,
    pub rolling_hash_window_size: usize,
    pub tree_edit_distance_refactor_threshold: f64,
    pub tree_edit_distance_threshold: f64,
    pub tree_edit_distance_major_threshold: f64,
    pub louvain_resolution: f64,
    pub min_community_size: usize,
    pub minhash_num_perm: usize,
    pub lsh_num_bands: usize,
    pub lsh_rows_per_band: usize,
    pub similarity_threshold: f64,
    pub max_file_size_mb: u64,
    pub max_analysis_time_seconds: u64,
    pub max_workers: usize,
    pub similarity_max_files: usize,
    pub similarity_max_tokens_per_file: usize,
    pub similarity_max_pairs: usize,
    pub similarity_cross_only: bool,
    pub similarity_text_normalize: bool,
    pub similarity_include_globs: Vec<String>,
    pub similarity_exclude_globs: Vec<String>,
    pub similarity_text_extensions: Vec<String>,
    pub similarity_binary_extensions: Vec<String>,
    pub rewrite_confidence_floor: f64,
    pub verbose: bool,
    pub debug: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            merkle_tree_chunk_size: 1024,
            rolling_hash_window_size: 32,
            tree_edit_distance_refactor_threshold: 0.1,
            tree_edit_distance_threshold: 0.3,
            tree_edit_distance_major_threshold: 0.6,
            louvain_resolution: 1.0,
            min_community_size: 3,
            minhash_num_perm: 128,
            lsh_num_bands: 16,
            lsh_rows_per_band: 8,
            similarity_threshold: 0.7,
            max_file_size_mb: 10,
            max_analysis_time_seconds: 300,
            max_workers: 4,
            similarity_max_files: 2000,
            similarity_max_tokens_per_file: 4000,
            similarity_max_pairs: 50_000,
            similarity_cross_only: true,
            similarity_text_normalize: true,
            similarity_include_globs: vec!["*".to_string()],
            similarity_exclude_globs: [
                "*/node_modules/*",
                "*/dist/*",
                "*/build/*",
                "*/.git/*",
                "*/.next/*",
                "*/.cache/*",
                "*/coverage/*",
                "*/vendor/*",
                "*/target/*",
                "*/.venv/*",
                "*/__pycache__/*",
                "*.lock",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            similarity_text_extensions: [
                ".js", ".ts", ".tsx", ".jsx", ".json", ".md", ".py", ".java", ".go", ".rb",
                ".php", ".css", ".scss", ".html", ".xml", ".yml", ".yaml", ".sh", ".c", ".h",
                ".cpp", ".hpp",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            similarity_binary_extensions: [
                ".png", ".jpg", ".jpeg", ".gif", ".svg", ".ico", ".webp", ".avif", ".mp3",
                ".mp4", ".mov", ".wav", ".pdf", ".zip", ".gz", ".bz2", ".7z", ".rar", ".tar",
                ".woff", ".woff2", ".ttf", ".eot", ".otf", ".bin", ".exe", ".dll", ".so",
                ".dylib", ".wasm",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            rewrite_confidence_floor: 0.3,
            verbose: false,
            debug: false,
        }
    }
}

/// Ambient logging configuration, independent of the pipeline tunables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| AnalysisError::Config(format!("cannot read {:?}: {e}", path.as_ref())))?;
        let partial: PartialConfig = toml::from_str(&text)?;
        Ok(partial.merge_onto(Self::default()))
    }
}

/// Mirrors [`Config`] with every field optional, so a TOML file only needs
/// to mention the keys it wants to override.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartialConfig {
    pub pipeline: Option<PartialPipelineConfig>,
    pub logging: Option<PartialLoggingConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartialPipelineConfig {
    pub merkle_tree_chunk_size: Option<usize>,
    pub rolling_hash_window_size: Option<usize>,
    pub tree_edit_distance_refactor_threshold: Option<f64>,
    pub tree_edit_distance_threshold: Option<f64>,
    pub tree_edit_distance_major_threshold: Option<f64>,
    pub louvain_resolution: Option<f64>,
    pub min_community_size: Option<usize>,
    pub minhash_num_perm: Option<usize>,
    pub lsh_num_bands: Option<usize>,
    pub lsh_rows_per_band: Option<usize>,
    pub similarity_threshold: Option<f64>,
    pub max_file_size_mb: Option<u64>,
    pub max_analysis_time_seconds: Option<u64>,
    pub max_workers: Option<usize>,
    pub similarity_max_files: Option<usize>,
    pub similarity_max_tokens_per_file: Option<usize>,
    pub similarity_max_pairs: Option<usize>,
    pub similarity_cross_only: Option<bool>,
    pub similarity_text_normalize: Option<bool>,
    pub similarity_include_globs: Option<Vec<String>>,
    pub similarity_exclude_globs: Option<Vec<String>>,
    pub similarity_text_extensions: Option<Vec<String>>,
    pub similarity_binary_extensions: Option<Vec<String>>,
    pub rewrite_confidence_floor: Option<f64>,
    pub verbose: Option<bool>,
    pub debug: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartialLoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

impl PartialConfig {
    pub fn merge_onto(self, mut base: Config) -> Config {
        if let Some(p) = self.pipeline {
            macro_rules! over {
                ($field:ident) => {
                    if let Some(v) = p.$field {
                        base.pipeline.$field = v;
                    }
                };
            }
            over!(merkle_tree_chunk_size);
            over!(rolling_hash_window_size);
            over!(tree_edit_distance_refactor_threshold);
            over!(tree_edit_distance_threshold);
            over!(tree_edit_distance_major_threshold);
            over!(louvain_resolution);
            over!(min_community_size);
            over!(minhash_num_perm);
            over!(lsh_num_bands);
            over!(lsh_rows_per_band);
            over!(similarity_threshold);
            over!(max_file_size_mb);
            over!(max_analysis_time_seconds);
            over!(max_workers);
            over!(similarity_max_files);
            over!(similarity_max_tokens_per_file);
            over!(similarity_max_pairs);
            over!(similarity_cross_only);
            over!(similarity_text_normalize);
            over!(similarity_include_globs);
            over!(similarity_exclude_globs);
            over!(similarity_text_extensions);
            over!(similarity_binary_extensions);
            over!(rewrite_confidence_floor);
            over!(verbose);
            over!(debug);
        }
        if let Some(l) = self.logging {
            if let Some(v) = l.level {
                base.logging.level = v;
            }
            if let Some(v) = l.json {
                base.logging.json = v;
            }
        }
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.merkle_tree_chunk_size, 1024);
        assert_eq!(cfg.minhash_num_perm, 128);
        assert_eq!(cfg.lsh_num_bands, 16);
        assert_eq!(cfg.lsh_rows_per_band, 8);
        assert_eq!(cfg.similarity_threshold, 0.7);
    }

    #[test]
    fn partial_overlay_only_touches_named_fields() {
        let partial = PartialConfig {
            pipeline: Some(PartialPipelineConfig {
                min_community_size: Some(5),
                ..Default::default()
            }),
            logging: None,
        };
        let merged = partial.merge_onto(Config::default());
        assert_eq!(merged.pipeline.min_community_size, 5);
        assert_eq!(merged.pipeline.minhash_num_perm, 128);
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docimpact.toml");
        std::fs::write(&path, "[pipeline]\nmin_community_size = 7\n").unwrap();
        let cfg = Config::from_file(&path).unwrap();
        assert_eq!(cfg.pipeline.min_community_size, 7);
    }
}
