//! Where repository data comes from.
//!
//! [`RepoSource`] is the seam between the engine and the hosted API;
//! [`GitHubClient`] is the HTTP implementation, and tests substitute an
//! in-memory one.

use crate::cache::TtlCache;
use crate::error::RepotreeError;
use crate::options::ViewerOptions;
use crate::repo;
use crate::types::{CommitInfo, RepoInfo, RepoMeta, TreeListing};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;
#[cfg(feature = "logging")]
use tracing;

pub trait RepoSource: Send + Sync {
    /// Repository metadata, used for the default branch.
    fn repository(&self, repo: &RepoInfo) -> Result<RepoMeta, RepotreeError>;

    /// Recursive listing of `branch`.
    fn tree(&self, repo: &RepoInfo, branch: &str) -> Result<TreeListing, RepotreeError>;

    /// Most recent commit touching `path`, if any.
    fn latest_commit(
        &self,
        repo: &RepoInfo,
        path: &str,
    ) -> Result<Option<CommitInfo>, RepotreeError>;
}

/// Blocking client for the GitHub REST API.
///
/// Response bodies are memoized per request URL for the configured TTL.
pub struct GitHubClient {
    agent: ureq::Agent,
    api_base: String,
    cache: TtlCache<String, String>,
}

impl GitHubClient {
    pub fn new(options: &ViewerOptions) -> Self {
        Self::with_cache(options, TtlCache::new(options.cache_ttl()))
    }

    /// Uses a caller-supplied cache, e.g. to share one between clients.
    pub fn with_cache(options: &ViewerOptions, cache: TtlCache<String, String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(options.timeout())
            .user_agent(&options.user_agent)
            .build();
        Self {
            agent,
            api_base: options.api_base.clone(),
            cache,
        }
    }

    pub fn cache(&self) -> &TtlCache<String, String> {
        &self.cache
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url, context: &str) -> Result<T, RepotreeError> {
        let body = self.get_body(url)?;
        serde_json::from_str(&body).map_err(|e| RepotreeError::decode(context, e))
    }

    /// Response body for `url`, served from the cache while fresh.
    fn get_body(&self, url: Url) -> Result<String, RepotreeError> {
        let key = url.to_string();
        self.cache.purge_expired();
        self.cache
            .get_or_try_insert_with(key.clone(), || self.fetch(&key))
    }

    fn fetch(&self, url: &str) -> Result<String, RepotreeError> {
        #[cfg(feature = "logging")]
        tracing::debug!("GET {}", url);
        let response = self
            .agent
            .get(url)
            .set("Accept", "application/vnd.github+json")
            .call();
        match response {
            Ok(response) => response.into_string().map_err(|e| RepotreeError::Http {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(ureq::Error::Status(status, _)) => {
                #[cfg(feature = "logging")]
                tracing::warn!("GET {} returned HTTP {}", url, status);
                Err(RepotreeError::Status {
                    url: url.to_string(),
                    status,
                })
            }
            Err(e) => Err(RepotreeError::Http {
                url: url.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

impl RepoSource for GitHubClient {
    fn repository(&self, info: &RepoInfo) -> Result<RepoMeta, RepotreeError> {
        let url = repo::repository_url(&self.api_base, info)?;
        self.get_json(url, "repository metadata")
            .map_err(|e| match e {
                RepotreeError::Status { status, .. } => RepotreeError::NotFound(format!(
                    "repository {} not found or not accessible (HTTP {})",
                    info, status
                )),
                other => other,
            })
    }

    fn tree(&self, info: &RepoInfo, branch: &str) -> Result<TreeListing, RepotreeError> {
        let url = repo::tree_url(&self.api_base, info, branch)?;
        self.get_json(url, "repository tree")
    }

    fn latest_commit(
        &self,
        info: &RepoInfo,
        path: &str,
    ) -> Result<Option<CommitInfo>, RepotreeError> {
        let url = repo::latest_commit_url(&self.api_base, info, path)?;
        parse_latest_commit(&self.get_body(url)?)
    }
}

#[derive(Debug, Deserialize)]
struct ApiCommit {
    sha: String,
    commit: ApiCommitDetail,
}

#[derive(Debug, Deserialize)]
struct ApiCommitDetail {
    message: String,
    author: ApiSignature,
}

#[derive(Debug, Deserialize)]
struct ApiSignature {
    name: String,
    date: DateTime<Utc>,
}

impl From<ApiCommit> for CommitInfo {
    fn from(api: ApiCommit) -> Self {
        CommitInfo {
            message: api.commit.message,
            author: api.commit.author.name,
            date: api.commit.author.date,
            sha: api.sha.chars().take(7).collect(),
        }
    }
}

/// Decodes a commit-history response body into its newest entry.
pub fn parse_latest_commit(body: &str) -> Result<Option<CommitInfo>, RepotreeError> {
    let commits: Vec<ApiCommit> =
        serde_json::from_str(body).map_err(|e| RepotreeError::decode("commit history", e))?;
    Ok(commits.into_iter().next().map(CommitInfo::from))
}
