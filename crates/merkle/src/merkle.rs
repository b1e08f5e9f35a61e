use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use docimpact_core::Snapshot;

fn sha256(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

fn hex(bytes: [u8; 32]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Binary Merkle root over fixed-size chunks of `data`: empty data hashes
/// to `sha256("")`; a single chunk is hashed twice (leaf
/// digest, then the digest of that digest) so it cannot be confused with a
/// plain leaf hash; an odd fanout at any level duplicates the last node.
pub fn merkle_root_for_bytes(data: &[u8], chunk_size: usize) -> String {
    if data.is_empty() {
        return hex(sha256(b""));
    }
    let chunk_size = chunk_size.max(1);
    let mut level: Vec<[u8; 32]> = data.chunks(chunk_size).map(sha256).collect();
    if level.len() == 1 {
        return hex(sha256(&level[0]));
    }
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        let mut iter = level.into_iter();
        while let Some(a) = iter.next() {
            let b = iter.next().unwrap_or(a);
            let mut buf = Vec::with_capacity(64);
            buf.extend_from_slice(&a);
            buf.extend_from_slice(&b);
            next.push(sha256(&buf));
        }
        level = next;
    }
    hex(level[0])
}

/// Per-file Merkle roots for one snapshot, sorted by path. Oversized files
/// (no content) are absent from the index.
#[derive(Debug, Default, Clone)]
pub struct DigestIndex {
    roots: BTreeMap<String, String>,
}

impl DigestIndex {
    pub fn build(snapshot: &Snapshot, chunk_size: usize) -> Self {
        let roots = snapshot
            .entries
            .iter()
            .filter_map(|entry| {
                entry
                    .content
                    .as_ref()
                    .map(|bytes| (entry.path.clone(), merkle_root_for_bytes(bytes, chunk_size)))
            })
            .collect();
        Self { roots }
    }

    pub fn root_for(&self, path: &str) -> Option<&str> {
        self.roots.get(path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Two-pointer diff over both sorted path sets: a path in only one
    /// index is added/deleted; a path in both with differing roots is
    /// modified.
    pub fn diff(&self, other: &DigestIndex) -> SnapshotDiff {
        let mut added = Vec::new();
        let mut deleted = Vec::new();
        let mut modified = Vec::new();

        let mut old_iter = self.roots.iter().peekable();
        let mut new_iter = other.roots.iter().peekable();

        loop {
            match (old_iter.peek(), new_iter.peek()) {
                (Some((op, oh)), Some((np, nh))) => {
                    if op == np {
                        if oh != nh {
                            modified.push((*op).clone());
                        }
                        old_iter.next();
                        new_iter.next();
                    } else if op < np {
                        deleted.push((*op).clone());
                        old_iter.next();
                    } else {
                        added.push((*np).clone());
                        new_iter.next();
                    }
                }
                (Some((op, _)), None) => {
                    deleted.push((*op).clone());
                    old_iter.next();
                }
                (None, Some((np, _))) => {
                    added.push((*np).clone());
                    new_iter.next();
                }
                (None, None) => break,
            }
        }

        SnapshotDiff {
            added,
            deleted,
            modified,
        }
    }
}

/// Path-level classification of the difference between two snapshots.
/// `modified` paths are candidates for C3's tree-edit-distance comparison;
/// `added`/`deleted` paths never reach the semantic analyzer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    pub added: Vec<String>,
    pub deleted: Vec<String>,
    pub modified: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use docimpact_core::SnapshotEntry;

    #[test]
    fn empty_data_hashes_to_sha256_of_empty_input() {
        let expected = hex(sha256(b""));
        assert_eq!(merkle_root_for_bytes(b"", 16), expected);
    }

    #[test]
    fn single_chunk_is_double_hashed() {
        let data = b"hello";
        let leaf = sha256(data);
        let expected = hex(sha256(&leaf));
        assert_eq!(merkle_root_for_bytes(data, 1024), expected);
    }

    #[test]
    fn identical_bytes_give_identical_root_regardless_of_chunk_size() {
        let data = vec![7u8; 4096];
        let r1 = merkle_root_for_bytes(&data, 256);
        let r2 = merkle_root_for_bytes(&data, 256);
        assert_eq!(r1, r2);
    }

    #[test]
    fn different_chunk_sizes_can_give_different_roots() {
        let data = vec![3u8; 4096];
        let r1 = merkle_root_for_bytes(&data, 256);
        let r2 = merkle_root_for_bytes(&data, 512);
        assert_ne!(r1, r2);
    }

    #[test]
    fn odd_fanout_duplicates_last_node() {
        // 3 chunks -> level of 3 leaves -> next level duplicates the 3rd.
        let data = vec![1u8; 30];
        let root_3_chunks = merkle_root_for_bytes(&data, 10);
        // Build the same structure by hand for 3 equal chunks.
        let leaves: Vec<[u8; 32]> = data.chunks(10).map(sha256).collect();
        assert_eq!(leaves.len(), 3);
        let mut buf01 = Vec::new();
        buf01.extend_from_slice(&leaves[0]);
        buf01.extend_from_slice(&leaves[1]);
        let h01 = sha256(&buf01);
        let mut buf22 = Vec::new();
        buf22.extend_from_slice(&leaves[2]);
        buf22.extend_from_slice(&leaves[2]);
        let h22 = sha256(&buf22);
        let mut buf_final = Vec::new();
        buf_final.extend_from_slice(&h01);
        buf_final.extend_from_slice(&h22);
        let expected = hex(sha256(&buf_final));
        assert_eq!(root_3_chunks, expected);
    }

    fn snapshot_with(files: &[(&str, &[u8])]) -> Snapshot {
        let mut snap = Snapshot::new("ref".to_string(), "sha".to_string());
        for (path, bytes) in files {
            snap.entries.push(SnapshotEntry {
                path: path.to_string(),
                size: bytes.len(),
                content: Some(bytes.to_vec()),
            });
        }
        snap
    }

    #[test]
    fn diff_classifies_added_deleted_modified() {
        let old = snapshot_with(&[("a.txt", b"aaa"), ("b.txt", b"bbb"), ("c.txt", b"ccc")]);
        let new = snapshot_with(&[("a.txt", b"xxx"), ("b.txt", b"bbb"), ("d.txt", b"ddd")]);

        let old_idx = DigestIndex::build(&old, 1024);
        let new_idx = DigestIndex::build(&new, 1024);
        let diff = old_idx.diff(&new_idx);

        assert_eq!(diff.modified, vec!["a.txt".to_string()]);
        assert_eq!(diff.deleted, vec!["c.txt".to_string()]);
        assert_eq!(diff.added, vec!["d.txt".to_string()]);
    }
}
