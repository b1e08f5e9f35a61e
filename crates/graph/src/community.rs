use crate::callgraph::{CallGraph, NodeId};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::{HashMap, HashSet};

/// A nonempty partition member of the call graph's node set.
#[derive(Debug, Clone)]
pub struct Community {
    pub members: Vec<NodeId>,
}

/// Detects communities over an undirected, symmetrized [`CallGraph`].
///
/// Louvain modularity maximization would be the natural first choice, but
/// it requires a modularity-optimization crate this workspace does not
/// otherwise need; no such dependency is wired in, so this always runs
/// synchronous label propagation instead, seeded for determinism.
/// Communities below `min_community_size` are dropped.
pub fn detect_communities(graph: &CallGraph, min_community_size: usize) -> Vec<Community> {
    let labels = label_propagation(graph, 42, 10);

    let mut by_label: HashMap<&str, Vec<NodeId>> = HashMap::new();
    for (node, label) in &labels {
        by_label.entry(label.as_str()).or_default().push(node.clone());
    }

    let min_size = min_community_size.max(1);
    let mut communities: Vec<Community> = by_label
        .into_values()
        .filter(|members| members.len() >= min_size)
        .map(|mut members| {
            members.sort();
            Community { members }
        })
        .collect();
    communities.sort_by(|a, b| a.members.first().cmp(&b.members.first()));
    communities
}

/// Synchronous label propagation: each node starts labeled with its own id;
/// each round (up to `max_iter`) shuffles the node visit order with a fixed
/// seed and relabels every node to the most common label among its
/// neighbors, breaking ties by `(count desc, label asc)`. Stops early once a
/// round produces no change.
///
/// Tie-break decision: picks the lexicographically *smallest* label on a
/// count tie, the opposite of favoring the largest.
fn label_propagation(graph: &CallGraph, seed: u64, max_iter: usize) -> HashMap<NodeId, String> {
    let mut labels: HashMap<NodeId, String> = graph
        .adjacency
        .keys()
        .map(|n| (n.clone(), n.clone()))
        .collect();

    let mut nodes: Vec<NodeId> = graph.adjacency.keys().cloned().collect();
    nodes.sort();
    let mut rng = StdRng::seed_from_u64(seed);

    for _ in 0..max_iter {
        nodes.shuffle(&mut rng);
        let mut changes = 0usize;
        for node in &nodes {
            let neighbors = match graph.adjacency.get(node) {
                Some(n) => n,
                None => continue,
            };
            if neighbors.is_empty() {
                continue;
            }
            let mut counts: HashMap<&str, usize> = HashMap::new();
            for nb in neighbors {
                let label = labels[nb].as_str();
                *counts.entry(label).or_insert(0) += 1;
            }
            let best_label = counts
                .into_iter()
                .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
                .map(|(label, _)| label.to_string())
                .unwrap();
            if labels[node] != best_label {
                labels.insert(node.clone(), best_label);
                changes += 1;
            }
        }
        if changes == 0 {
            break;
        }
    }

    labels
}

/// Size of the largest community containing any of `entities`, or 0 if none
/// match (used by C8's `community_size` scoring term).
pub fn max_community_size_for<'a>(
    communities: &[Community],
    entities: impl Iterator<Item = &'a str>,
) -> usize {
    let targets: HashSet<&str> = entities.collect();
    communities
        .iter()
        .filter(|c| c.members.iter().any(|m| targets.iter().any(|t| m.contains(t))))
        .map(|c| c.members.len())
        .max()
        .unwrap_or(0)
}
