//! Repository URLs: parsing user input and building API and archive links.

use crate::error::RepotreeError;
use crate::types::RepoInfo;
use url::Url;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
const WEB_HOST: &str = "github.com";

/// Extracts owner and repository name from a repository URL.
///
/// Accepts `https://github.com/<owner>/<repo>` with or without scheme, extra
/// path segments (`/tree/main/src`), a query, a fragment, or a `.git` suffix.
/// The bare `<owner>/<repo>` shorthand is accepted too.
pub fn parse_repo_url(input: &str) -> Result<RepoInfo, RepotreeError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(RepotreeError::InvalidUrl("empty URL".into()));
    }
    if let Some(info) = parse_shorthand(input) {
        return Ok(info);
    }

    let with_scheme = if input.contains("://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    };
    let url = Url::parse(&with_scheme)
        .map_err(|e| RepotreeError::InvalidUrl(format!("{}: {}", input, e)))?;
    let host = url.host_str().unwrap_or_default();
    if host != WEB_HOST && !host.ends_with(".github.com") {
        return Err(RepotreeError::InvalidUrl(format!(
            "{}: not a {} URL",
            input, WEB_HOST
        )));
    }

    let mut segments = url
        .path_segments()
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty());
    match (segments.next(), segments.next()) {
        (Some(owner), Some(repo)) => repo_info(owner, repo)
            .ok_or_else(|| RepotreeError::InvalidUrl(format!("{}: empty repository name", input))),
        _ => Err(RepotreeError::InvalidUrl(format!(
            "{}: expected {}/<owner>/<repo>",
            input, WEB_HOST
        ))),
    }
}

fn parse_shorthand(input: &str) -> Option<RepoInfo> {
    if input.contains("://") || (input.contains('.') && input.split('/').count() != 2) {
        return None;
    }
    let (owner, repo) = input.split_once('/')?;
    if owner.contains(WEB_HOST) || repo.contains('/') {
        return None;
    }
    repo_info(owner, repo)
}

fn repo_info(owner: &str, repo: &str) -> Option<RepoInfo> {
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    Some(RepoInfo {
        owner: owner.to_string(),
        repo: repo.to_string(),
    })
}

fn api_url(base: &str, segments: &[&str]) -> Result<Url, RepotreeError> {
    let mut url =
        Url::parse(base).map_err(|e| RepotreeError::InvalidUrl(format!("{}: {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| RepotreeError::InvalidUrl(format!("{}: cannot be a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// `GET /repos/<owner>/<repo>`
pub fn repository_url(base: &str, info: &RepoInfo) -> Result<Url, RepotreeError> {
    api_url(base, &["repos", &info.owner, &info.repo])
}

/// `GET /repos/<owner>/<repo>/git/trees/<branch>?recursive=1`
pub fn tree_url(base: &str, info: &RepoInfo, branch: &str) -> Result<Url, RepotreeError> {
    let mut url = api_url(base, &["repos", &info.owner, &info.repo, "git", "trees", branch])?;
    url.query_pairs_mut().append_pair("recursive", "1");
    Ok(url)
}

/// `GET /repos/<owner>/<repo>/commits?path=<path>&per_page=1`
pub fn latest_commit_url(base: &str, info: &RepoInfo, path: &str) -> Result<Url, RepotreeError> {
    let mut url = api_url(base, &["repos", &info.owner, &info.repo, "commits"])?;
    url.query_pairs_mut()
        .append_pair("path", path)
        .append_pair("per_page", "1");
    Ok(url)
}

/// Download link for a ZIP snapshot of `branch`.
pub fn archive_url(info: &RepoInfo, branch: &str) -> String {
    format!(
        "https://{}/{}/{}/archive/refs/heads/{}.zip",
        WEB_HOST, info.owner, info.repo, branch
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(owner: &str, repo: &str) -> RepoInfo {
        RepoInfo {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    #[test]
    fn parses_common_forms() {
        let expected = info("rust-lang", "cargo");
        for input in [
            "https://github.com/rust-lang/cargo",
            "https://github.com/rust-lang/cargo/",
            "http://www.github.com/rust-lang/cargo",
            "github.com/rust-lang/cargo",
            "https://github.com/rust-lang/cargo.git",
            "https://github.com/rust-lang/cargo#readme",
            "https://github.com/rust-lang/cargo?tab=readme",
            "https://github.com/rust-lang/cargo/tree/master/src",
            "rust-lang/cargo",
            "  rust-lang/cargo  ",
        ] {
            assert_eq!(parse_repo_url(input).unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn rejects_other_inputs() {
        for input in [
            "",
            "https://gitlab.com/a/b",
            "https://github.com/only-owner",
            "not a url",
            "https://github.com/",
        ] {
            assert!(
                matches!(parse_repo_url(input), Err(RepotreeError::InvalidUrl(_))),
                "{input}"
            );
        }
    }

    #[test]
    fn api_urls() {
        let repo = info("octo", "demo");
        assert_eq!(
            repository_url(DEFAULT_API_BASE, &repo).unwrap().as_str(),
            "https://api.github.com/repos/octo/demo"
        );
        assert_eq!(
            tree_url("https://example.test/api/", &repo, "main")
                .unwrap()
                .as_str(),
            "https://example.test/api/repos/octo/demo/git/trees/main?recursive=1"
        );
        assert_eq!(
            latest_commit_url(DEFAULT_API_BASE, &repo, "src/a b.rs")
                .unwrap()
                .as_str(),
            "https://api.github.com/repos/octo/demo/commits?path=src%2Fa+b.rs&per_page=1"
        );
    }

    #[test]
    fn archive_link() {
        assert_eq!(
            archive_url(&info("octo", "demo"), "main"),
            "https://github.com/octo/demo/archive/refs/heads/main.zip"
        );
    }
}
