use crate::tar_util::snapshot_from_tar;
use docimpact_core::{AnalysisError, Result, Snapshot};
use std::path::PathBuf;
use std::process::Stdio;
use tar::Archive;
use tokio::process::Command;

/// Synthetic prefix `git archive` is asked to wrap every entry in, so the
/// shared tar reader strips exactly one path component the same way it does
/// for a GitHub tarball.
const ARCHIVE_PREFIX: &str = "snapshot/";

/// Local working-copy backend for C1: shells out to `git archive` rather
/// than serving bytes straight off disk, so it is a second, independent
/// implementation of the `SnapshotSource` contract rather than a stand-in
/// for the remote one.
pub struct LocalGitSource {
    repo_path: PathBuf,
    max_file_size_mb: u64,
}

impl LocalGitSource {
    pub fn new(repo_path: impl Into<PathBuf>, max_file_size_mb: u64) -> Self {
        Self {
            repo_path: repo_path.into(),
            max_file_size_mb,
        }
    }

    async fn run(&self, args: &[&str]) -> Result<Vec<u8>> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo_path)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| git_err(args.join(" "), format!("failed to spawn git: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(git_err(args.join(" "), stderr.trim().to_string()));
        }
        Ok(output.stdout)
    }

    /// Mirrors the remote backend's default-branch fallback: `origin/HEAD`'s
    /// symbolic ref first, then `main`, then `master`, leaving plain `HEAD`
    /// as the last resort for a repo with neither.
    async fn default_branch(&self) -> String {
        if let Ok(bytes) = self.run(&["symbolic-ref", "refs/remotes/origin/HEAD"]).await {
            let out = String::from_utf8_lossy(&bytes).trim().to_string();
            if let Some(name) = out.strip_prefix("refs/remotes/origin/") {
                return name.to_string();
            }
        }
        for candidate in ["main", "master"] {
            if self.run(&["rev-parse", "--verify", candidate]).await.is_ok() {
                return candidate.to_string();
            }
        }
        "HEAD".to_string()
    }

    async fn resolve_sha(&self, reference: &str) -> Result<String> {
        let target = if reference.is_empty() {
            self.default_branch().await
        } else {
            reference.to_string()
        };
        let bytes = self.run(&["rev-parse", &target]).await?;
        Ok(String::from_utf8_lossy(&bytes).trim().to_string())
    }

    pub async fn fetch(&self, reference: &str) -> Result<Snapshot> {
        let sha = self.resolve_sha(reference).await?;
        let prefix_arg = format!("--prefix={ARCHIVE_PREFIX}");
        let tar_bytes = self
            .run(&["archive", "--format=tar", &prefix_arg, &sha])
            .await?;

        let max_bytes = self.max_file_size_mb * 1024 * 1024;
        let archive = Archive::new(tar_bytes.as_slice());
        let reported_reference = if reference.is_empty() {
            sha.clone()
        } else {
            reference.to_string()
        };
        snapshot_from_tar(archive, reported_reference, sha, max_bytes)
            .map_err(|e| git_err("archive", format!("failed to unpack archive: {e}")))
    }
}

fn git_err(reference: impl Into<String>, message: impl Into<String>) -> AnalysisError {
    AnalysisError::Fetch {
        component: "snapshot".to_string(),
        reference: reference.into(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command as StdCommand;

    fn init_repo(dir: &std::path::Path) {
        let run = |args: &[&str]| {
            StdCommand::new("git")
                .arg("-C")
                .arg(dir)
                .args(args)
                .output()
                .expect("git command failed")
        };
        run(&["init", "-q"]);
        run(&["config", "user.email", "test@example.com"]);
        run(&["config", "user.name", "test"]);
        std::fs::write(dir.join("hello.txt"), b"hello world").unwrap();
        run(&["add", "."]);
        run(&["commit", "-q", "-m", "initial"]);
    }

    #[tokio::test]
    async fn fetches_head_snapshot_from_a_real_repo() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());
        let source = LocalGitSource::new(dir.path(), 10);
        let snapshot = source.fetch("HEAD").await.unwrap();
        assert!(snapshot.get("hello.txt").is_some());
        assert_eq!(
            snapshot.get("hello.txt").unwrap().content.as_deref(),
            Some(b"hello world".as_slice())
        );
    }

    #[tokio::test]
    async fn unresolvable_reference_is_a_fatal_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());
        let source = LocalGitSource::new(dir.path(), 10);
        let err = source.fetch("does-not-exist").await.unwrap_err();
        assert!(err.is_fatal());
    }
}
