use serde::{Deserialize, Serialize};

/// One file inside a [`Snapshot`]: path is relative and forward-slash
/// normalized. Oversized files keep their path and size but carry no
/// content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub path: String,
    pub size: usize,
    pub content: Option<Vec<u8>>,
}

/// An immutable tar archive plus file index for one reference, produced
/// once per reference per run. Read-only for the rest of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub reference: String,
    pub resolved_sha: String,
    pub entries: Vec<SnapshotEntry>,
    pub oversized_paths: Vec<String>,
}

impl Snapshot {
    pub fn new(reference: String, resolved_sha: String) -> Self {
        Self {
            reference,
            resolved_sha,
            entries: Vec::new(),
            oversized_paths: Vec::new(),
        }
    }

    pub fn get(&self, path: &str) -> Option<&SnapshotEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.path.as_str())
    }

    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(|e| e.size as u64).sum()
    }
}
