use docimpact_core::{
    AnalysisResult, ChangedFile, Language, PipelineConfig, SimilarPair, Snapshot, Warning,
};
use docimpact_graph::{build_call_graph, detect_communities, Community};
use docimpact_merkle::DigestIndex;
use docimpact_parser::{analyze_change, ClassificationThresholds};
use docimpact_patterns::{build_cross_reference_index, extract_entities, CrossReferenceIndex};
use docimpact_similarity::{analyze_similarity, SimilarityConfig, SimilarityFile};
use std::collections::BTreeSet;
use std::time::Instant;

use crate::scorer::score_impacted_docs;

/// Everything the orchestrator needs for one `(old_ref, new_ref)` run.
/// Fetching (C1) has already happened by the time this is built: the
/// orchestrator is pure computation over three already-materialized
/// snapshots, which keeps C7 free of network/subprocess concerns and lets
/// it be exercised without a [`docimpact_snapshot::SnapshotSource`] at all.
pub struct RunInputs {
    pub old_ref: String,
    pub new_ref: String,
    pub code_slug: String,
    pub docs_slug: String,
    pub code_old: Snapshot,
    pub code_new: Snapshot,
    pub docs: Snapshot,
}

/// Runs C2 → C3 → C5 → C4 → C6 and assembles the final [`AnalysisResult`].
/// C5 and C6 are tolerant: a time-budget expiry before they
/// start still produces an empty result plus a `LayerUnavailable` warning
/// rather than aborting the run.
pub fn run(inputs: RunInputs, config: &PipelineConfig) -> AnalysisResult {
    let start = Instant::now();
    let budget = std::time::Duration::from_secs(config.max_analysis_time_seconds);
    let mut warnings: Vec<Warning> = Vec::new();
    let mut truncated = false;

    // --- C2: Merkle diff narrows to changed paths ---
    let old_index = DigestIndex::build(&inputs.code_old, config.merkle_tree_chunk_size);
    let new_index = DigestIndex::build(&inputs.code_new, config.merkle_tree_chunk_size);
    let diff = old_index.diff(&new_index);

    // --- C3: semantic diff per modified file, in enumeration order ---
    let thresholds = ClassificationThresholds {
        refactor: config.tree_edit_distance_refactor_threshold,
        minor: config.tree_edit_distance_threshold,
        major: config.tree_edit_distance_major_threshold,
    };

    let mut changes: Vec<ChangedFile> = Vec::new();
    let mut modified_sorted = diff.modified.clone();
    modified_sorted.sort();

    for path in &modified_sorted {
        if start.elapsed() > budget {
            truncated = true;
            warnings.push(Warning {
                component: "parser".to_string(),
                message: format!(
                    "max_analysis_time_seconds exceeded; {} of {} modified files analyzed",
                    changes.len(),
                    modified_sorted.len()
                ),
            });
            break;
        }

        let Some(old_entry) = inputs.code_old.get(path) else {
            continue;
        };
        let Some(new_entry) = inputs.code_new.get(path) else {
            continue;
        };
        let (Some(old_bytes), Some(new_bytes)) = (&old_entry.content, &new_entry.content) else {
            continue;
        };

        let old_code = String::from_utf8_lossy(old_bytes);
        let new_code = String::from_utf8_lossy(new_bytes);
        let language = Language::from_path(path);

        let change = analyze_change(&old_code, &new_code, language, thresholds);

        let mut entities: BTreeSet<String> = extract_entities(&new_code, language);
        entities.extend(extract_entities(&old_code, language));

        changes.push(ChangedFile {
            path: path.clone(),
            change_type: change.change_type,
            distance: change.distance,
            normalized_distance: change.normalized_distance,
            size_old: old_bytes.len(),
            size_new: new_bytes.len(),
            language,
            entities,
            needs_doc_update: change.change_type.needs_doc_update(),
            parse_error: change.parse_error,
        });
    }

    // --- all entities across the new snapshot, for cross-ref (C4) and
    // entity-to-changed-file attribution (C8) ---
    let mut all_entities: BTreeSet<String> = BTreeSet::new();
    for entry in &inputs.code_new.entries {
        let Some(bytes) = &entry.content else { continue };
        let language = Language::from_path(&entry.path);
        if language == Language::Unknown {
            continue;
        }
        let text = String::from_utf8_lossy(bytes);
        all_entities.extend(extract_entities(&text, language));
    }

    // --- C5: call graph + communities, restricted to JS/TS-family files,
    // tolerant of the time budget already having expired ---
    let communities: Vec<Community> = if start.elapsed() > budget {
        warnings.push(Warning {
            component: "graph".to_string(),
            message: "skipped: time budget already exceeded".to_string(),
        });
        Vec::new()
    } else {
        let js_files: Vec<(String, String)> = inputs
            .code_new
            .entries
            .iter()
            .filter(|e| matches!(Language::from_path(&e.path), Language::JavaScript | Language::TypeScript))
            .filter_map(|e| {
                e.content
                    .as_ref()
                    .map(|b| (e.path.clone(), String::from_utf8_lossy(b).into_owned()))
            })
            .collect();
        let borrowed: Vec<(&str, &str)> = js_files.iter().map(|(p, s)| (p.as_str(), s.as_str())).collect();
        let graph = build_call_graph(borrowed);
        detect_communities(&graph, config.min_community_size)
    };

    // --- C4: cross-reference index over all docs ---
    let cross_ref: CrossReferenceIndex = if start.elapsed() > budget {
        warnings.push(Warning {
            component: "patterns".to_string(),
            message: "skipped: time budget already exceeded".to_string(),
        });
        build_cross_reference_index(&BTreeSet::new(), std::iter::empty(), 60)
    } else {
        let docs: Vec<(String, String)> = inputs
            .docs
            .entries
            .iter()
            .filter_map(|e| {
                e.content
                    .as_ref()
                    .map(|b| (e.path.clone(), String::from_utf8_lossy(b).into_owned()))
            })
            .collect();
        let borrowed: Vec<(&str, &str)> = docs.iter().map(|(p, s)| (p.as_str(), s.as_str())).collect();
        build_cross_reference_index(&all_entities, borrowed, 60)
    };

    // --- C6: similarity across both snapshots, cross-kind by default ---
    let similarity_pairs: Vec<SimilarPair> = if start.elapsed() > budget {
        warnings.push(Warning {
            component: "similarity".to_string(),
            message: "skipped: time budget already exceeded".to_string(),
        });
        Vec::new()
    } else {
        let sim_config = SimilarityConfig {
            rolling_hash_window_size: config.rolling_hash_window_size,
            minhash_num_perm: config.minhash_num_perm,
            lsh_num_bands: config.lsh_num_bands,
            lsh_rows_per_band: config.lsh_rows_per_band,
            similarity_threshold: config.similarity_threshold,
            similarity_max_files: config.similarity_max_files,
            similarity_max_tokens_per_file: config.similarity_max_tokens_per_file,
            similarity_max_pairs: config.similarity_max_pairs,
            similarity_cross_only: config.similarity_cross_only,
            similarity_text_normalize: config.similarity_text_normalize,
            similarity_include_globs: config.similarity_include_globs.clone(),
            similarity_exclude_globs: config.similarity_exclude_globs.clone(),
            similarity_text_extensions: config.similarity_text_extensions.clone(),
            similarity_binary_extensions: config.similarity_binary_extensions.clone(),
        };

        let code_files = inputs.code_new.entries.iter().filter_map(|e| {
            e.content
                .as_ref()
                .map(|b| SimilarityFile { kind: "code", path: e.path.as_str(), data: b.as_slice() })
        });
        let doc_files = inputs.docs.entries.iter().filter_map(|e| {
            e.content
                .as_ref()
                .map(|b| SimilarityFile { kind: "docs", path: e.path.as_str(), data: b.as_slice() })
        });
        let result = analyze_similarity(code_files.chain(doc_files), &sim_config);
        if result.truncated {
            warnings.push(Warning {
                component: "similarity".to_string(),
                message: format!(
                    "candidate pairs truncated to similarity_max_pairs={}",
                    config.similarity_max_pairs
                ),
            });
        }
        result.pairs
    };

    // --- C8: impact scoring ---
    let impacted_docs = score_impacted_docs(&changes, &all_entities, &cross_ref, &communities);

    AnalysisResult {
        old_ref: inputs.old_ref,
        new_ref: inputs.new_ref,
        code_slug: inputs.code_slug,
        docs_slug: inputs.docs_slug,
        changes,
        files_added: diff.added,
        files_deleted: diff.deleted,
        impacted_docs,
        similarity_pairs,
        warnings,
        truncated,
        elapsed_seconds: start.elapsed().as_secs_f64(),
    }
}
