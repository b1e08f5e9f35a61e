use docimpact_core::{ChangedFile, EntityName, ImpactedDoc, Priority};
use docimpact_graph::{max_community_size_for, Community};
use docimpact_patterns::CrossReferenceIndex;
use std::collections::{BTreeMap, BTreeSet};

/// Accumulator for one doc's impact while folding over changed files,
/// mirroring `doc_analyzer.py`'s `doc_impacts[doc_path]` dict.
#[derive(Default)]
struct DocImpact {
    entities: BTreeSet<EntityName>,
    severity_sum: f64,
    mention_counts: BTreeMap<EntityName, usize>,
    line_numbers: BTreeMap<EntityName, Vec<u32>>,
    reasons: Vec<String>,
}

/// A short stem produces unreliable bidirectional substring matches;
/// logged rather than filtered so the behavior stays visible instead of
/// silently over- or under-attributing entities to a file.
const SHORT_STEM_THRESHOLD: usize = 3;

/// Entities attributed to `cf`: those already associated by C3/C4, plus any
/// known entity whose name bidirectionally substring-matches the file's
/// stem (case-insensitive). This deliberately keeps the false-positive-prone
/// behavior on short stems rather than "fixing" it.
fn entities_for_file<'a>(cf: &'a ChangedFile, all_entities: &'a BTreeSet<EntityName>) -> BTreeSet<EntityName> {
    let mut entities = cf.entities.clone();
    let stem = cf.file_stem().to_lowercase();

    if stem.len() <= SHORT_STEM_THRESHOLD {
        tracing::debug!(file = %cf.path, stem = %stem, "short file stem used in bidirectional entity match");
    }

    for entity in all_entities {
        let lower = entity.to_lowercase();
        if stem.contains(&lower) || lower.contains(&stem) {
            entities.insert(entity.clone());
        }
    }
    entities
}

/// Computes priority-ranked [`ImpactedDoc`]s: `score = 2.0 * avg_severity +
/// 1.5 * total_mentions + 0.5 * community_size`. Sorted by score
/// descending, ties broken by `doc_path` ascending.
pub fn score_impacted_docs(
    changes: &[ChangedFile],
    all_entities: &BTreeSet<EntityName>,
    cross_ref: &CrossReferenceIndex,
    communities: &[Community],
) -> Vec<ImpactedDoc> {
    let mut doc_impacts: BTreeMap<String, DocImpact> = BTreeMap::new();

    for cf in changes {
        if !cf.needs_doc_update {
            continue;
        }
        let severity = cf.change_type.severity_weight();
        let entities_in_file = entities_for_file(cf, all_entities);

        for entity in &entities_in_file {
            let Some(docs) = cross_ref.entity_to_docs.get(entity) else {
                continue;
            };
            for doc_path in docs {
                let matches = cross_ref
                    .mentions
                    .get(doc_path)
                    .and_then(|by_entity| by_entity.get(entity));
                let mention_count = matches.map(|m| m.len()).unwrap_or(0);
                let line_nums: Vec<u32> = matches
                    .map(|m| m.iter().map(|mm| mm.line_number).collect())
                    .unwrap_or_default();

                let impact = doc_impacts.entry(doc_path.clone()).or_default();
                impact.entities.insert(entity.clone());
                impact.severity_sum += severity;
                impact.mention_counts.insert(entity.clone(), mention_count);
                impact.line_numbers.insert(entity.clone(), line_nums);
                impact.reasons.push(format!(
                    "{entity}: {} change (distance: {:.2})",
                    cf.change_type.as_str().to_uppercase(),
                    cf.normalized_distance
                ));
            }
        }
    }

    let mut impacted_docs: Vec<ImpactedDoc> = doc_impacts
        .into_iter()
        .map(|(doc_path, impact)| {
            let entity_count = impact.entities.len().max(1) as f64;
            let avg_severity = impact.severity_sum / entity_count;
            let total_mentions: usize = impact.mention_counts.values().sum();
            let community_size = max_community_size_for(communities, impact.entities.iter().map(String::as_str));

            let score = 2.0 * avg_severity + 1.5 * (total_mentions as f64) + 0.5 * (community_size as f64);

            ImpactedDoc {
                doc_path,
                priority: Priority::from_score(score),
                score,
                reasons: impact.reasons,
                changed_entities: impact.entities,
                mention_counts: impact.mention_counts,
                line_numbers: impact.line_numbers,
                community_size,
            }
        })
        .collect();

    impacted_docs.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap()
            .then_with(|| a.doc_path.cmp(&b.doc_path))
    });

    impacted_docs
}
