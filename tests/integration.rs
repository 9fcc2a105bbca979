use chrono::{TimeZone, Utc};
use repotree::output::{self, OutputFormat, RenderOptions};
use repotree::{
    CommitInfo, ExpansionState, RepoInfo, RepoMeta, RepoSource, RepotreeError, Session,
    SkipReason, TreeListing, TreeRecord, ViewerBuilder, load_repository, to_outline,
};
use std::collections::HashMap;
use std::fs;
use std::sync::Mutex;
use tempfile::tempdir;

#[derive(Default)]
struct MockSource {
    branch: String,
    listings: HashMap<String, TreeListing>,
    commits: HashMap<String, CommitInfo>,
    failing_commits: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl MockSource {
    fn new(records: Vec<TreeRecord>) -> Self {
        let mut listings = HashMap::new();
        listings.insert(
            "main".to_string(),
            TreeListing {
                sha: Some("deadbeef".into()),
                tree: records,
                truncated: false,
            },
        );
        Self {
            branch: "main".into(),
            listings,
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl RepoSource for MockSource {
    fn repository(&self, repo: &RepoInfo) -> Result<RepoMeta, RepotreeError> {
        self.calls.lock().unwrap().push(format!("repo {}", repo));
        if repo.repo == "missing" {
            return Err(RepotreeError::NotFound(format!("repository {}", repo)));
        }
        Ok(RepoMeta {
            default_branch: self.branch.clone(),
            description: None,
        })
    }

    fn tree(&self, _repo: &RepoInfo, branch: &str) -> Result<TreeListing, RepotreeError> {
        self.calls.lock().unwrap().push(format!("tree {}", branch));
        self.listings
            .get(branch)
            .cloned()
            .ok_or_else(|| RepotreeError::Status {
                url: format!("trees/{}", branch),
                status: 404,
            })
    }

    fn latest_commit(
        &self,
        _repo: &RepoInfo,
        path: &str,
    ) -> Result<Option<CommitInfo>, RepotreeError> {
        if self.failing_commits.iter().any(|p| p == path) {
            return Err(RepotreeError::Status {
                url: format!("commits?path={}", path),
                status: 403,
            });
        }
        Ok(self.commits.get(path).cloned())
    }
}

fn sample_records() -> Vec<TreeRecord> {
    vec![
        TreeRecord::blob("src/a.ts", Some(120)),
        TreeRecord::blob("src/b.ts", Some(40)),
        TreeRecord::blob("README.md", Some(500)),
        TreeRecord::tree(".git"),
        TreeRecord::blob(".git/config", Some(10)),
        TreeRecord::tree("docs"),
        TreeRecord::blob("docs/guide.md", Some(7)),
        TreeRecord::tree(".github"),
        TreeRecord::blob(".github/ci.yml", Some(3)),
    ]
}

fn commit(sha: &str) -> CommitInfo {
    CommitInfo {
        message: "Initial commit".into(),
        author: "Ada".into(),
        date: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        sha: sha.into(),
    }
}

#[test]
fn integration_full_flow() {
    let source = MockSource::new(sample_records());
    let options = ViewerBuilder::new("https://github.com/octo/demo").build();
    let result = load_repository(&source, &options).unwrap();

    assert_eq!(result.repo.to_string(), "octo/demo");
    assert_eq!(result.branch, "main");
    assert!(!result.truncated);
    assert!(result.skipped.is_empty());
    assert_eq!(source.calls(), vec!["repo octo/demo", "tree main"]);
    assert_eq!(
        to_outline(&result.forest),
        concat!(
            ".github/\n",
            "  ci.yml\n",
            "docs/\n",
            "  guide.md\n",
            "src/\n",
            "  a.ts\n",
            "  b.ts\n",
            "README.md",
        )
    );
}

#[test]
fn explicit_branch_skips_metadata_lookup() {
    let mut source = MockSource::new(vec![TreeRecord::blob("x.rs", Some(1))]);
    let listing = source.listings.remove("main").unwrap();
    source.listings.insert("dev".into(), listing);
    let options = ViewerBuilder::new("octo/demo").branch("dev").build();
    let result = load_repository(&source, &options).unwrap();
    assert_eq!(result.branch, "dev");
    assert_eq!(source.calls(), vec!["tree dev"]);
}

#[test]
fn git_dir_can_be_kept() {
    let source = MockSource::new(sample_records());
    let options = ViewerBuilder::new("octo/demo")
        .include_git_dir(true)
        .build();
    let result = load_repository(&source, &options).unwrap();
    assert_eq!(result.forest[0].path, ".git");
    assert_eq!(result.forest[0].children[0].name, "config");
}

#[test]
fn exclude_patterns_drop_whole_subtrees() {
    let source = MockSource::new(sample_records());
    let options = ViewerBuilder::new("octo/demo")
        .exclude_patterns(vec!["docs".into(), "**/*.ts".into()])
        .build();
    let result = load_repository(&source, &options).unwrap();
    let names: Vec<_> = result.forest.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec![".github", "README.md"]);
}

#[test]
fn invalid_exclude_pattern_is_an_error() {
    let source = MockSource::new(sample_records());
    let options = ViewerBuilder::new("octo/demo")
        .exclude_patterns(vec!["a[".into()])
        .build();
    assert!(matches!(
        load_repository(&source, &options),
        Err(RepotreeError::InvalidPattern(_))
    ));
}

#[test]
fn truncated_listing_is_propagated() {
    let mut source = MockSource::new(sample_records());
    source.listings.get_mut("main").unwrap().truncated = true;
    let result = load_repository(&source, &ViewerBuilder::new("octo/demo").build()).unwrap();
    assert!(result.truncated);
    assert!(!result.forest.is_empty());
}

#[test]
fn conflicting_records_are_reported() {
    let source = MockSource::new(vec![
        TreeRecord::blob("lib", Some(4)),
        TreeRecord::blob("lib/mod.rs", Some(5)),
    ]);
    let result = load_repository(&source, &ViewerBuilder::new("octo/demo").build()).unwrap();
    assert_eq!(result.skipped.len(), 1);
    assert_eq!(result.skipped[0].reason, SkipReason::ConflictingKind);
    assert!(result.forest[0].is_dir());
}

#[test]
fn bad_url_and_missing_repo_fail() {
    let source = MockSource::new(sample_records());
    assert!(matches!(
        load_repository(&source, &ViewerBuilder::new("https://example.com/x").build()),
        Err(RepotreeError::InvalidUrl(_))
    ));
    assert!(matches!(
        load_repository(&source, &ViewerBuilder::new("octo/missing").build()),
        Err(RepotreeError::NotFound(_))
    ));
}

#[test]
fn commits_are_collected_and_failures_recorded() {
    let mut source = MockSource::new(sample_records());
    source.commits.insert("src/a.ts".into(), commit("aaaaaaa"));
    source.failing_commits.push("README.md".into());
    let options = ViewerBuilder::new("octo/demo").with_commits(true).build();
    let result = load_repository(&source, &options).unwrap();

    assert_eq!(result.commits.len(), 1);
    assert_eq!(result.commits["src/a.ts"].sha, "aaaaaaa");
    assert_eq!(result.commit_errors.len(), 1);
    assert!(result.commit_errors["README.md"].contains("403"));
}

#[test]
fn session_resets_expansion_on_load() {
    let mut source = MockSource::new(sample_records());
    source.commits.insert("src/b.ts".into(), commit("bbbbbbb"));
    let mut session = Session::new(source);
    let options = ViewerBuilder::new("octo/demo").build();

    session.load(&options).unwrap();
    session.toggle("src");
    assert!(session.expansion().is_expanded("src"));
    session.expand_all();
    assert_eq!(session.expansion().len(), 3);

    session.load(&options).unwrap();
    assert!(session.expansion().is_empty());

    assert_eq!(
        session.latest_commit("src/b.ts").unwrap().map(|c| c.sha),
        Some("bbbbbbb".to_string())
    );
    assert_eq!(session.latest_commit("src").unwrap(), None);
    assert!(session.latest_commit("nope.txt").is_err());
    assert_eq!(
        session.archive_url().as_deref(),
        Some("https://github.com/octo/demo/archive/refs/heads/main.zip")
    );

    assert!(session.load(&ViewerBuilder::new("octo/missing").build()).is_err());
    assert!(session.tree().is_none());
}

#[test]
fn outline_is_written_to_file() {
    let source = MockSource::new(sample_records());
    let result = load_repository(&source, &ViewerBuilder::new("octo/demo").build()).unwrap();
    let dir = tempdir().unwrap();
    let target = dir.path().join("tree.txt");
    output::write_result_to_file(
        &result,
        OutputFormat::Outline,
        &ExpansionState::new(),
        &RenderOptions::default(),
        &target,
    )
    .unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), to_outline(&result.forest));

    let err = output::write_result_to_file(
        &result,
        OutputFormat::Outline,
        &ExpansionState::new(),
        &RenderOptions::default(),
        dir.path().join("missing/dir/tree.txt"),
    )
    .unwrap_err();
    assert!(matches!(err, RepotreeError::Io { .. }));
}
