use docimpact_core::{Snapshot, SnapshotEntry};
use std::io::Read;
use tar::Archive;

/// Drops the single leading path component every tarball entry carries
/// (GitHub tarballs and `git archive --prefix` both wrap the tree in one
/// synthetic top directory); entries with no `/` are kept as-is.
pub fn strip_leading_dir(path: &str) -> &str {
    match path.split_once('/') {
        Some((_, rest)) if !rest.is_empty() => rest,
        _ => path,
    }
}

/// Reads every regular file out of a gzip-decompressed tar stream into a
/// [`Snapshot`], skipping files over `max_bytes` into `oversized_paths`
/// rather than dropping them outright.
pub fn snapshot_from_tar<R: Read>(
    mut archive: Archive<R>,
    reference: String,
    resolved_sha: String,
    max_bytes: u64,
) -> std::io::Result<Snapshot> {
    let mut snapshot = Snapshot::new(reference, resolved_sha);
    for entry in archive.entries()? {
        let mut entry = entry?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let raw_path = entry.path()?.to_string_lossy().into_owned();
        let path = strip_leading_dir(&raw_path).to_string();
        if path.is_empty() {
            continue;
        }
        let size = entry.header().size()?;
        if size > max_bytes {
            snapshot.oversized_paths.push(path);
            continue;
        }
        let mut content = Vec::with_capacity(size as usize);
        entry.read_to_end(&mut content)?;
        snapshot.entries.push(SnapshotEntry {
            path,
            size: content.len(),
            content: Some(content),
        });
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_single_leading_component() {
        assert_eq!(strip_leading_dir("repo-abc123/src/lib.rs"), "src/lib.rs");
    }

    #[test]
    fn keeps_path_with_no_leading_component() {
        assert_eq!(strip_leading_dir("lib.rs"), "lib.rs");
    }

    #[test]
    fn keeps_bare_directory_entry_as_is() {
        assert_eq!(strip_leading_dir("repo-abc123/"), "repo-abc123/");
    }
}
