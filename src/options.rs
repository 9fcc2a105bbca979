use crate::error::RepotreeError;
use crate::repo::DEFAULT_API_BASE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerOptions {
    /// Repository URL or `owner/repo` shorthand.
    pub url: String,
    /// Branch to list; the repository's default branch when unset.
    pub branch: Option<String>,
    pub api_base: String,
    pub cache_ttl_secs: u64,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Glob patterns matched against full listing paths.
    pub exclude_patterns: Vec<String>,
    /// Keep entries under `.git/`.
    pub include_git_dir: bool,
    /// Look up the latest commit of every file.
    pub with_commits: bool,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            url: String::new(),
            branch: None,
            api_base: DEFAULT_API_BASE.to_string(),
            cache_ttl_secs: 300,
            timeout_secs: 30,
            user_agent: concat!("repotree/", env!("CARGO_PKG_VERSION")).to_string(),
            exclude_patterns: Vec::new(),
            include_git_dir: false,
            with_commits: false,
        }
    }
}

impl ViewerOptions {
    /// Loads options from a JSON file; absent fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RepotreeError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| RepotreeError::io(path, e))?;
        serde_json::from_str(&text)
            .map_err(|e| RepotreeError::decode(format!("options file {}", path.display()), e))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Default)]
pub struct ViewerBuilder {
    options: ViewerOptions,
}

impl ViewerBuilder {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            options: ViewerOptions {
                url: url.into(),
                ..Default::default()
            },
        }
    }
    pub fn from_options(options: ViewerOptions) -> Self {
        Self { options }
    }
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.options.url = url.into();
        self
    }
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.options.branch = Some(branch.into());
        self
    }
    pub fn default_branch(mut self) -> Self {
        self.options.branch = None;
        self
    }
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.options.api_base = base.into();
        self
    }
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.options.cache_ttl_secs = ttl.as_secs();
        self
    }
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout_secs = timeout.as_secs();
        self
    }
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.options.user_agent = agent.into();
        self
    }
    pub fn exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.options.exclude_patterns = patterns;
        self
    }
    pub fn include_git_dir(mut self, yes: bool) -> Self {
        self.options.include_git_dir = yes;
        self
    }
    pub fn with_commits(mut self, yes: bool) -> Self {
        self.options.with_commits = yes;
        self
    }
    pub fn build(self) -> ViewerOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn builder_overrides_defaults() {
        let options = ViewerBuilder::new("octo/demo")
            .branch("dev")
            .cache_ttl(Duration::from_secs(60))
            .exclude_patterns(vec!["**/*.lock".into()])
            .with_commits(true)
            .build();
        assert_eq!(options.url, "octo/demo");
        assert_eq!(options.branch.as_deref(), Some("dev"));
        assert_eq!(options.cache_ttl(), Duration::from_secs(60));
        assert_eq!(options.api_base, DEFAULT_API_BASE);
        assert!(options.with_commits);
        assert!(!options.include_git_dir);
    }

    #[test]
    fn loads_partial_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"url": "https://github.com/octo/demo", "timeout_secs": 5, "exclude_patterns": ["docs/**"]}}"#
        )
        .unwrap();
        let options = ViewerOptions::from_json_file(file.path()).unwrap();
        assert_eq!(options.url, "https://github.com/octo/demo");
        assert_eq!(options.timeout(), Duration::from_secs(5));
        assert_eq!(options.exclude_patterns, vec!["docs/**".to_string()]);
        assert_eq!(options.cache_ttl_secs, 300);
    }

    #[test]
    fn bad_json_file_is_decode_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            ViewerOptions::from_json_file(file.path()),
            Err(RepotreeError::Decode { .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            ViewerOptions::from_json_file("/nonexistent/repotree.json"),
            Err(RepotreeError::Io { .. })
        ));
    }
}
