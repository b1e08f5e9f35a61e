pub mod merkle;

pub use merkle::{merkle_root_for_bytes, DigestIndex, SnapshotDiff};
