use crate::glob::should_consider_path;
use crate::lsh::lsh_candidates;
use crate::minhash::{minhash_params, minhash_signature, signature_similarity};
use crate::shingle::{file_tokens, normalize_text};
use docimpact_core::SimilarPair;
use std::collections::BTreeMap;

/// One repository file as seen by the similarity layer: which snapshot
/// ("code" or "docs") it came from, its path, and its raw bytes.
pub struct SimilarityFile<'a> {
    pub kind: &'static str,
    pub path: &'a str,
    pub data: &'a [u8],
}

/// Tunables this layer needs, lifted out of [`docimpact_core::PipelineConfig`]
/// so this crate doesn't depend on the full config shape.
pub struct SimilarityConfig {
    pub rolling_hash_window_size: usize,
    pub minhash_num_perm: usize,
    pub lsh_num_bands: usize,
    pub lsh_rows_per_band: usize,
    pub similarity_threshold: f64,
    pub similarity_max_files: usize,
    pub similarity_max_tokens_per_file: usize,
    pub similarity_max_pairs: usize,
    pub similarity_cross_only: bool,
    pub similarity_text_normalize: bool,
    pub similarity_include_globs: Vec<String>,
    pub similarity_exclude_globs: Vec<String>,
    pub similarity_text_extensions: Vec<String>,
    pub similarity_binary_extensions: Vec<String>,
}

fn ext_of(path: &str) -> String {
    path.rsplit('/')
        .next()
        .unwrap_or(path)
        .rsplit_once('.')
        .map(|(_, e)| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

/// Result of a similarity pass: accepted pairs at/above threshold, plus
/// whether the candidate set had to be truncated to `similarity_max_pairs`.
pub struct SimilarityResult {
    pub pairs: Vec<SimilarPair>,
    pub truncated: bool,
}

/// Runs the full C6 pipeline over a stream of files from both snapshots:
/// filter by glob + binary extension, optionally normalize text, shingle,
/// MinHash-sign, LSH-band for candidates, verify by exact signature
/// similarity, and keep pairs at or above `similarity_threshold`.
///
/// Files are split across both snapshots under one `similarity_max_files`
/// budget, counted in iteration order without rebalancing between
/// snapshots -- a snapshot much smaller than the other can end up
/// under-represented in the truncated set.
pub fn analyze_similarity<'a>(
    files: impl IntoIterator<Item = SimilarityFile<'a>>,
    config: &SimilarityConfig,
) -> SimilarityResult {
    let params = minhash_params(config.minhash_num_perm, 42);
    let mut signatures: BTreeMap<String, Vec<u64>> = BTreeMap::new();
    let mut kind_by_id: BTreeMap<String, &'static str> = BTreeMap::new();

    let mut processed = 0usize;
    for file in files {
        if processed >= config.similarity_max_files {
            break;
        }
        if !should_consider_path(file.path, &config.similarity_include_globs, &config.similarity_exclude_globs) {
            continue;
        }
        let ext = ext_of(file.path);
        if config.similarity_binary_extensions.contains(&ext) {
            continue;
        }

        let data = if config.similarity_text_normalize && config.similarity_text_extensions.contains(&ext) {
            normalize_text(file.data, &ext)
        } else {
            file.data.to_vec()
        };

        let tokens = file_tokens(&data, config.rolling_hash_window_size, config.similarity_max_tokens_per_file);
        let sig = minhash_signature(&tokens, &params);

        let fid = format!("{}:{}", file.kind, file.path);
        signatures.insert(fid.clone(), sig);
        kind_by_id.insert(fid, file.kind);
        processed += 1;
    }

    let mut candidates: Vec<(String, String)> =
        lsh_candidates(&signatures, config.lsh_num_bands, config.lsh_rows_per_band)
            .into_iter()
            .collect();

    let truncated = candidates.len() > config.similarity_max_pairs;
    if truncated {
        candidates.truncate(config.similarity_max_pairs);
    }

    let mut pairs = Vec::new();
    for (a, b) in candidates {
        if config.similarity_cross_only && kind_by_id.get(&a) == kind_by_id.get(&b) {
            continue;
        }
        let similarity = signature_similarity(&signatures[&a], &signatures[&b]);
        if similarity >= config.similarity_threshold {
            pairs.push(SimilarPair { a, b, similarity });
        }
    }

    pairs.sort_by(|x, y| {
        y.similarity
            .partial_cmp(&x.similarity)
            .unwrap()
            .then_with(|| x.a.cmp(&y.a))
            .then_with(|| x.b.cmp(&y.b))
    });

    SimilarityResult { pairs, truncated }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_config() -> SimilarityConfig {
        SimilarityConfig {
            rolling_hash_window_size: 8,
            minhash_num_perm: 32,
            lsh_num_bands: 8,
            lsh_rows_per_band: 4,
            similarity_threshold: 0.5,
            similarity_max_files: 2000,
            similarity_max_tokens_per_file: 4000,
            similarity_max_pairs: 50_000,
            similarity_cross_only: true,
            similarity_text_normalize: false,
            similarity_include_globs: vec!["*".to_string()],
            similarity_exclude_globs: vec![],
            similarity_text_extensions: vec![".md".to_string()],
            similarity_binary_extensions: vec![".png".to_string()],
        }
    }

    #[test]
    fn near_duplicate_docs_with_whitespace_differences_match() {
        let mut cfg = default_config();
        cfg.similarity_text_normalize = true;
        cfg.similarity_cross_only = false;
        let doc_a = "# Title\n\nThis is the same content repeated many times to build shingles. ".repeat(4);
        let doc_b = "#   Title\n\n\nThis is the same content repeated   many times to build shingles.   ".repeat(4);
        let files = vec![
            SimilarityFile { kind: "docs", path: "a.md", data: doc_a.as_bytes() },
            SimilarityFile { kind: "docs", path: "b.md", data: doc_b.as_bytes() },
        ];
        let result = analyze_similarity(files, &cfg);
        assert!(!result.pairs.is_empty(), "expected near-duplicate docs to match");
        assert!(result.pairs[0].similarity >= cfg.similarity_threshold);
    }

    #[test]
    fn cross_only_drops_same_kind_pairs() {
        let cfg = default_config();
        let data = b"identical content for both files to guarantee a match across kinds here";
        let files = vec![
            SimilarityFile { kind: "code", path: "a.txt", data },
            SimilarityFile { kind: "code", path: "b.txt", data },
        ];
        let result = analyze_similarity(files, &cfg);
        assert!(result.pairs.is_empty());
    }

    #[test]
    fn binary_extensions_are_skipped() {
        let cfg = default_config();
        let files = vec![
            SimilarityFile { kind: "code", path: "a.png", data: b"stuff" },
            SimilarityFile { kind: "docs", path: "b.png", data: b"stuff" },
        ];
        let result = analyze_similarity(files, &cfg);
        assert!(result.pairs.is_empty());
    }
}
