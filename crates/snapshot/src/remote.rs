use crate::tar_util::snapshot_from_tar;
use docimpact_core::{AnalysisError, Result, Snapshot};
use flate2::read::GzDecoder;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tar::Archive;

const USER_AGENT: &str = "docimpact-snapshot";

/// Everything needed to address one repository on a GitHub-compatible API.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub api_base: String,
    pub token: Option<String>,
    pub slug: String,
    pub max_file_size_mb: u64,
}

impl RemoteConfig {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            token: None,
            slug: slug.into(),
            max_file_size_mb: 10,
        }
    }
}

/// Authenticated HTTP backend for C1: resolves a branch to a commit, checks
/// the recursive tree listing for truncation, then downloads and unpacks
/// the tarball for that commit.
pub struct RemoteSource {
    config: RemoteConfig,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct TreeResponse {
    truncated: bool,
}

impl RemoteSource {
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(USER_AGENT);
        if let Some(token) = &config.token {
            let mut headers = reqwest::header::HeaderMap::new();
            let mut value = reqwest::header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| AnalysisError::Config(format!("invalid token header: {e}")))?;
            value.set_sensitive(true);
            headers.insert(reqwest::header::AUTHORIZATION, value);
            builder = builder.default_headers(headers);
        }
        let client = builder
            .build()
            .map_err(|e| AnalysisError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    fn slug_path(&self) -> String {
        // GitHub slugs are `owner/repo`; only the `/` needs to survive
        // percent-encoding, both segments are already URL-safe in practice.
        self.config.slug.clone()
    }

    async fn http_get_json(&self, url: &str, reference: &str) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_err(reference, format!("network error for {url}: {e}")))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<no-body>".to_string());
        if !status.is_success() {
            return Err(fetch_err(
                reference,
                format!("HTTP {} for {url}: {body}", status.as_u16()),
            ));
        }
        serde_json::from_str(&body)
            .map_err(|e| fetch_err(reference, format!("invalid JSON from {url}: {e}")))
    }

    async fn http_get_bytes(&self, url: &str, reference: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_err(reference, format!("network error for {url}: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no-body>".to_string());
            return Err(fetch_err(
                reference,
                format!("HTTP {} for {url}: {body}", status.as_u16()),
            ));
        }
        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| fetch_err(reference, format!("failed to read body from {url}: {e}")))
    }

    async fn default_branch(&self, reference: &str) -> Result<String> {
        let url = format!("{}/repos/{}", self.config.api_base, self.slug_path());
        let data = self.http_get_json(&url, reference).await?;
        data.get("default_branch")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| fetch_err(reference, "repository metadata missing default_branch"))
    }

    async fn commit_sha(&self, branch: &str) -> Result<String> {
        let url = format!(
            "{}/repos/{}/git/ref/heads/{}",
            self.config.api_base,
            self.slug_path(),
            branch
        );
        let data = self.http_get_json(&url, branch).await?;
        data.get("object")
            .and_then(|o| o.get("sha"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| fetch_err(branch, "could not resolve branch to a commit sha"))
    }

    /// Resolves `reference` to a branch name, falling back once to the
    /// repository's default branch when the given branch can't be resolved
    /// (a 404 on the ref lookup, or a missing sha in its response).
    async fn resolve_branch_with_fallback(&self, reference: Option<&str>) -> Result<String> {
        let Some(branch) = reference else {
            return self.default_branch("HEAD").await;
        };
        match self.commit_sha(branch).await {
            Ok(_) => Ok(branch.to_string()),
            Err(AnalysisError::Fetch { message, .. })
                if message.contains("HTTP 404") || message.contains("could not resolve branch") =>
            {
                tracing::warn!(branch, "branch not found, falling back to default branch");
                self.default_branch(branch).await
            }
            Err(e) => Err(e),
        }
    }

    async fn tree_is_truncated(&self, sha: &str, reference: &str) -> Result<bool> {
        let url = format!(
            "{}/repos/{}/git/trees/{}?recursive=1",
            self.config.api_base,
            self.slug_path(),
            sha
        );
        let data = self.http_get_json(&url, reference).await?;
        let response: TreeResponse = serde_json::from_value(data)
            .map_err(|e| fetch_err(reference, format!("invalid tree response: {e}")))?;
        Ok(response.truncated)
    }

    async fn tarball(&self, reference: &str) -> Result<Vec<u8>> {
        let url = format!(
            "{}/repos/{}/tarball/{}",
            self.config.api_base,
            self.slug_path(),
            reference
        );
        self.http_get_bytes(&url, reference).await
    }

    pub async fn fetch(&self, reference: &str) -> Result<Snapshot> {
        let given = if reference.is_empty() {
            None
        } else {
            Some(reference)
        };
        let branch = self.resolve_branch_with_fallback(given).await?;
        let sha = self.commit_sha(&branch).await?;

        if self.tree_is_truncated(&sha, &branch).await? {
            return Err(AnalysisError::TreeTruncated {
                reference: branch.clone(),
            });
        }

        let tar_bytes = self.tarball(&sha).await?;
        let max_bytes = self.config.max_file_size_mb * 1024 * 1024;
        let decoder = GzDecoder::new(tar_bytes.as_slice());
        let archive = Archive::new(decoder);
        snapshot_from_tar(archive, branch.clone(), sha, max_bytes)
            .map_err(|e| fetch_err(&branch, format!("failed to unpack tarball: {e}")))
    }
}

fn fetch_err(reference: &str, message: impl Into<String>) -> AnalysisError {
    AnalysisError::Fetch {
        component: "snapshot".to_string(),
        reference: reference.to_string(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_points_at_github() {
        let config = RemoteConfig::new("owner/repo");
        assert_eq!(config.api_base, "https://api.github.com");
        assert!(config.token.is_none());
    }

    #[test]
    fn fetch_err_tags_snapshot_component() {
        let err = fetch_err("main", "boom");
        assert_eq!(err.component(), "snapshot");
        assert!(err.is_fatal());
    }
}
