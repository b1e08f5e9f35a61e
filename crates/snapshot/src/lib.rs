//! Snapshot Source (C1): fetches an immutable file listing plus content for
//! one reference, from either a remote host over HTTP or a local git
//! working copy. Both backends strip the single leading path component of
//! every archive entry and report oversized files rather than skip them
//! silently.

mod local_git;
mod remote;
mod tar_util;

pub use local_git::LocalGitSource;
pub use remote::{RemoteConfig, RemoteSource};

use docimpact_core::{Result, Snapshot};

/// Uniform fetch contract satisfied by both backends. Each backend also
/// exposes an inherent `fetch` with the same signature; this trait exists so
/// orchestration code can be generic over which backend a run was
/// configured with.
pub trait SnapshotSource {
    async fn fetch(&self, reference: &str) -> Result<Snapshot>;
}

impl SnapshotSource for RemoteSource {
    async fn fetch(&self, reference: &str) -> Result<Snapshot> {
        RemoteSource::fetch(self, reference).await
    }
}

impl SnapshotSource for LocalGitSource {
    async fn fetch(&self, reference: &str) -> Result<Snapshot> {
        LocalGitSource::fetch(self, reference).await
    }
}
