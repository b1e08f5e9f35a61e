use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

/// Partitions each signature into `num_bands` bands of `rows_per_band` rows
/// and groups file ids that share a `(band_index, row_tuple)` bucket.
/// Reduces `rows_per_band` to fit the signature length if the requested
/// banding would exceed it. Returns unordered candidate pairs
/// `(a, b)` with `a < b`.
pub fn lsh_candidates(
    signatures: &BTreeMap<String, Vec<u64>>,
    num_bands: usize,
    rows_per_band: usize,
) -> BTreeSet<(String, String)> {
    let mut pairs = BTreeSet::new();
    let Some(first) = signatures.values().next() else {
        return pairs;
    };
    let k = first.len();
    if k == 0 {
        return pairs;
    }

    let rows_per_band = if num_bands * rows_per_band > k {
        (k / num_bands.max(1)).max(1)
    } else {
        rows_per_band
    };

    let mut buckets: HashMap<(usize, Vec<u64>), Vec<String>> = HashMap::new();
    for (fid, sig) in signatures {
        for band_idx in 0..num_bands {
            let start = band_idx * rows_per_band;
            let end = (start + rows_per_band).min(sig.len());
            if start >= end {
                break;
            }
            let key = (band_idx, sig[start..end].to_vec());
            buckets.entry(key).or_default().push(fid.clone());
        }
    }

    for ids in buckets.into_values() {
        if ids.len() < 2 {
            continue;
        }
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                let (a, b) = if ids[i] < ids[j] {
                    (ids[i].clone(), ids[j].clone())
                } else {
                    (ids[j].clone(), ids[i].clone())
                };
                pairs.insert((a, b));
            }
        }
    }

    pairs
}

/// Connected components of an undirected graph given as an edge list,
/// restricted to nodes that appear in `all_nodes` (so isolated files still
/// surface as singleton components if a caller needs the full partition).
pub fn connected_components(all_nodes: &[String], edges: &[(String, String)]) -> Vec<Vec<String>> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for (a, b) in edges {
        adjacency.entry(a.as_str()).or_default().push(b.as_str());
        adjacency.entry(b.as_str()).or_default().push(a.as_str());
    }

    let mut visited: BTreeSet<&str> = BTreeSet::new();
    let mut components = Vec::new();

    for node in all_nodes {
        let node = node.as_str();
        if visited.contains(node) {
            continue;
        }
        let mut component = Vec::new();
        let mut queue = VecDeque::from([node]);
        visited.insert(node);
        while let Some(cur) = queue.pop_front() {
            component.push(cur.to_string());
            for &nb in adjacency.get(cur).into_iter().flatten() {
                if visited.insert(nb) {
                    queue.push_back(nb);
                }
            }
        }
        components.push(component);
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(values: &[u64]) -> Vec<u64> {
        values.to_vec()
    }

    #[test]
    fn identical_bands_land_in_same_bucket() {
        let mut sigs = BTreeMap::new();
        sigs.insert("a".to_string(), sig(&[1, 2, 3, 4, 5, 6, 7, 8]));
        sigs.insert("b".to_string(), sig(&[1, 2, 3, 4, 9, 9, 9, 9]));
        sigs.insert("c".to_string(), sig(&[9, 9, 9, 9, 9, 9, 9, 9]));
        let candidates = lsh_candidates(&sigs, 2, 4);
        assert!(candidates.contains(&("a".to_string(), "b".to_string())));
        assert!(!candidates.contains(&("a".to_string(), "c".to_string())));
    }

    #[test]
    fn oversized_banding_is_reduced_to_fit() {
        let mut sigs = BTreeMap::new();
        sigs.insert("a".to_string(), sig(&[1, 2, 3, 4]));
        sigs.insert("b".to_string(), sig(&[1, 2, 3, 4]));
        // 10 bands * 10 rows > 4 total rows: must shrink rows_per_band.
        let candidates = lsh_candidates(&sigs, 10, 10);
        assert!(candidates.contains(&("a".to_string(), "b".to_string())));
    }

    #[test]
    fn connected_components_partition_all_nodes() {
        let nodes = vec!["a".to_string(), "b".to_string(), "c".to_string(), "d".to_string()];
        let edges = vec![("a".to_string(), "b".to_string())];
        let components = connected_components(&nodes, &edges);
        assert_eq!(components.len(), 3);
        let sizes: Vec<usize> = components.iter().map(|c| c.len()).collect();
        assert!(sizes.contains(&2));
    }
}
