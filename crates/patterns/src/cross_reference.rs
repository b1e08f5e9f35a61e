use crate::aho_corasick::{AhoCorasick, Match};
use docimpact_core::EntityName;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// `doc_path → entity → ordered matches`.
pub type MentionIndex = BTreeMap<String, BTreeMap<EntityName, Vec<Match>>>;

/// Cross-reference join result: one automaton run per doc, over the union
/// of all known entities, grounded on
/// `CrossReferenceAnalyzer.analyze_cross_references`.
pub struct CrossReferenceIndex {
    pub mentions: MentionIndex,
    pub entity_to_docs: HashMap<EntityName, BTreeSet<String>>,
}

/// Builds a [`CrossReferenceIndex`] by scanning every doc with one
/// automaton built from the union of `entities`. An empty entity set scans
/// nothing and returns an empty index.
pub fn build_cross_reference_index<'a>(
    entities: &BTreeSet<EntityName>,
    docs: impl IntoIterator<Item = (&'a str, &'a str)>,
    context_chars: usize,
) -> CrossReferenceIndex {
    let mut mentions = MentionIndex::new();
    let mut entity_to_docs: HashMap<EntityName, BTreeSet<String>> = HashMap::new();

    if entities.is_empty() {
        return CrossReferenceIndex {
            mentions,
            entity_to_docs,
        };
    }

    let automaton = AhoCorasick::new(entities.iter().cloned(), false);

    for (doc_path, content) in docs {
        let by_pattern = automaton.search_by_pattern(content, context_chars);
        if by_pattern.is_empty() {
            continue;
        }
        let mut per_doc: BTreeMap<EntityName, Vec<Match>> = BTreeMap::new();
        for (entity, mut matches) in by_pattern {
            matches.sort_by_key(|m| m.start);
            entity_to_docs
                .entry(entity.clone())
                .or_default()
                .insert(doc_path.to_string());
            per_doc.insert(entity, matches);
        }
        mentions.insert(doc_path.to_string(), per_doc);
    }

    CrossReferenceIndex {
        mentions,
        entity_to_docs,
    }
}

impl CrossReferenceIndex {
    /// Docs impacted by any of `changed_entities`, each with its per-entity
    /// mention count and the line numbers of every match, grounded on
    /// `CrossReferenceAnalyzer.get_documentation_impact`.
    pub fn documentation_impact(
        &self,
        changed_entities: &BTreeSet<EntityName>,
    ) -> BTreeMap<String, BTreeMap<EntityName, Vec<u32>>> {
        let mut impact: BTreeMap<String, BTreeMap<EntityName, Vec<u32>>> = BTreeMap::new();

        for entity in changed_entities {
            let Some(docs) = self.entity_to_docs.get(entity) else {
                continue;
            };
            for doc in docs {
                let lines = self
                    .mentions
                    .get(doc)
                    .and_then(|by_entity| by_entity.get(entity))
                    .map(|matches| matches.iter().map(|m| m.line_number).collect())
                    .unwrap_or_default();
                impact.entry(doc.clone()).or_default().insert(entity.clone(), lines);
            }
        }

        impact
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_references_across_multiple_docs() {
        let entities: BTreeSet<EntityName> =
            ["validate_password".to_string(), "login".to_string()].into_iter().collect();
        let docs = vec![
            ("guide.md", "Use validate_password() to check passwords."),
            ("auth.md", "The login() method authenticates users."),
        ];
        let index = build_cross_reference_index(&entities, docs, 20);
        assert!(index.entity_to_docs["validate_password"].contains("guide.md"));
        assert!(index.entity_to_docs["login"].contains("auth.md"));
    }

    #[test]
    fn documentation_impact_reports_only_changed_entities() {
        let entities: BTreeSet<EntityName> =
            ["foo".to_string(), "bar".to_string()].into_iter().collect();
        let docs = vec![("d.md", "foo is documented here, so is bar.")];
        let index = build_cross_reference_index(&entities, docs, 10);

        let changed: BTreeSet<EntityName> = ["foo".to_string()].into_iter().collect();
        let impact = index.documentation_impact(&changed);
        assert!(impact.contains_key("d.md"));
        assert!(impact["d.md"].contains_key("foo"));
        assert!(!impact["d.md"].contains_key("bar"));
    }

    #[test]
    fn empty_entity_set_produces_empty_index() {
        let entities = BTreeSet::new();
        let index = build_cross_reference_index(&entities, vec![("d.md", "anything")], 10);
        assert!(index.mentions.is_empty());
    }
}
