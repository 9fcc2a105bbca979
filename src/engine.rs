use crate::error::RepotreeError;
use crate::expansion::ExpansionState;
use crate::options::ViewerOptions;
use crate::repo::parse_repo_url;
use crate::source::RepoSource;
use crate::tree::{self, TreeBuild, build_with_report};
use crate::types::{CommitInfo, RepoInfo, RepoTree, TreeRecord};
use globset::{Glob, GlobSet, GlobSetBuilder};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::collections::BTreeMap;
#[cfg(feature = "logging")]
use tracing;

/// Decides which listing paths reach the builder.
struct PathFilter {
    include_git_dir: bool,
    matcher: Option<GlobSet>,
}

impl PathFilter {
    fn new(options: &ViewerOptions) -> Result<Self, RepotreeError> {
        let matcher = if !options.exclude_patterns.is_empty() {
            let mut builder = GlobSetBuilder::new();
            for pattern in &options.exclude_patterns {
                let glob = Glob::new(pattern).map_err(|e| {
                    RepotreeError::InvalidPattern(format!("'{}': {}", pattern, e))
                })?;
                builder.add(glob);
            }
            Some(builder.build().map_err(|e| {
                RepotreeError::InvalidPattern(format!("failed to build glob set: {}", e))
            })?)
        } else {
            None
        };
        Ok(Self {
            include_git_dir: options.include_git_dir,
            matcher,
        })
    }

    /// A path is dropped when it or any of its ancestors is excluded.
    fn keeps(&self, path: &str) -> bool {
        if !self.include_git_dir && (path == ".git" || path.contains(".git/")) {
            return false;
        }
        match &self.matcher {
            Some(matcher) => {
                !matcher.is_match(path) && !crate::path::ancestors(path).any(|a| matcher.is_match(a))
            }
            None => true,
        }
    }
}

/// Fetches and builds the tree described by `options`.
///
/// Resolves the default branch when none is given, drops excluded paths,
/// and, with `with_commits`, looks up the latest commit of every file.
/// Failed commit lookups are recorded in [`RepoTree::commit_errors`] rather
/// than failing the load.
pub fn load_repository<S: RepoSource + ?Sized>(
    source: &S,
    options: &ViewerOptions,
) -> Result<RepoTree, RepotreeError> {
    #[cfg(feature = "logging")]
    tracing::debug!("Loading repository {}", options.url);
    let repo = parse_repo_url(&options.url)?;
    let filter = PathFilter::new(options)?;
    let branch = match &options.branch {
        Some(branch) => branch.clone(),
        None => source.repository(&repo)?.default_branch,
    };
    let listing = source.tree(&repo, &branch)?;
    if listing.truncated {
        #[cfg(feature = "logging")]
        tracing::warn!("Listing for {} is truncated; the tree is partial", repo);
    }

    let records: Vec<TreeRecord> = listing
        .tree
        .into_iter()
        .filter(|record| filter.keeps(&record.path))
        .collect();
    let TreeBuild { forest, skipped } = build_with_report(&records);
    #[cfg(feature = "logging")]
    tracing::debug!(
        "Built {} root nodes from {} records ({} skipped)",
        forest.len(),
        records.len(),
        skipped.len()
    );

    let mut result = RepoTree {
        repo,
        branch,
        truncated: listing.truncated,
        forest,
        skipped,
        commits: BTreeMap::new(),
        commit_errors: BTreeMap::new(),
    };
    if options.with_commits {
        let mut files = Vec::new();
        tree::walk(&result.forest, &mut |_, node| {
            if !node.is_dir() {
                files.push(node.path.clone());
            }
        });
        let (commits, errors) = load_commits(source, &result.repo, &files);
        result.commits = commits;
        result.commit_errors = errors;
    }
    Ok(result)
}

type CommitLookup = (String, Result<Option<CommitInfo>, RepotreeError>);

/// Looks up the latest commit for each path. Returns found commits and the
/// error message of every failed lookup; paths with no history appear in neither.
pub fn load_commits<S: RepoSource + ?Sized>(
    source: &S,
    repo: &RepoInfo,
    paths: &[String],
) -> (BTreeMap<String, CommitInfo>, BTreeMap<String, String>) {
    #[cfg(feature = "parallel")]
    let lookups: Vec<CommitLookup> = paths
        .par_iter()
        .map(|path| (path.clone(), source.latest_commit(repo, path)))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let lookups: Vec<CommitLookup> = paths
        .iter()
        .map(|path| (path.clone(), source.latest_commit(repo, path)))
        .collect();

    let mut commits = BTreeMap::new();
    let mut errors = BTreeMap::new();
    for (path, lookup) in lookups {
        match lookup {
            Ok(Some(commit)) => {
                commits.insert(path, commit);
            }
            Ok(None) => {}
            Err(e) => {
                #[cfg(feature = "logging")]
                tracing::warn!("Commit lookup for {} failed: {}", path, e);
                errors.insert(path, e.to_string());
            }
        }
    }
    (commits, errors)
}

/// A viewing session: the loaded tree plus its expansion state.
///
/// Every load replaces the tree and collapses everything.
pub struct Session<S> {
    source: S,
    current: Option<RepoTree>,
    expansion: ExpansionState,
}

impl<S: RepoSource> Session<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            current: None,
            expansion: ExpansionState::new(),
        }
    }

    /// Loads a repository. On failure the previous tree is discarded.
    pub fn load(&mut self, options: &ViewerOptions) -> Result<&RepoTree, RepotreeError> {
        self.current = None;
        self.expansion.reset();
        let loaded = load_repository(&self.source, options)?;
        Ok(self.current.insert(loaded))
    }

    pub fn tree(&self) -> Option<&RepoTree> {
        self.current.as_ref()
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    pub fn toggle(&mut self, path: &str) {
        self.expansion.toggle(path);
    }

    pub fn expand_all(&mut self) {
        if let Some(current) = &self.current {
            self.expansion.expand_all(&current.forest);
        }
    }

    pub fn collapse_all(&mut self) {
        self.expansion.collapse_all();
    }

    /// Latest commit for one file of the loaded tree, fetched on demand.
    pub fn latest_commit(&self, path: &str) -> Result<Option<CommitInfo>, RepotreeError> {
        let current = self
            .current
            .as_ref()
            .ok_or_else(|| RepotreeError::NotFound("no repository loaded".into()))?;
        if let Some(commit) = current.commits.get(path) {
            return Ok(Some(commit.clone()));
        }
        match tree::find(&current.forest, path) {
            Some(node) if !node.is_dir() => self.source.latest_commit(&current.repo, path),
            Some(_) => Ok(None),
            None => Err(RepotreeError::NotFound(format!("{} is not in the tree", path))),
        }
    }

    /// ZIP download link for the loaded branch.
    pub fn archive_url(&self) -> Option<String> {
        self.current
            .as_ref()
            .map(|t| crate::repo::archive_url(&t.repo, &t.branch))
    }
}
