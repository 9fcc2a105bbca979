//! # Repotree
//!
//! `repotree` turns a hosted repository's flat file listing into a sorted,
//! nested forest, tracks which directories are expanded, and renders the result
//! as an indented outline or an interactive-style tree view.
//!
//! The tree logic ([`build`], [`sort`], [`ExpansionState`], [`to_outline`]) is
//! pure and synchronous. Fetching goes through the [`RepoSource`] trait;
//! [`GitHubClient`] implements it over the GitHub REST API with a
//! time-bounded response cache.
//!
//! # Features
//!
//! - `parallel`: Looks up per-file commits in parallel using Rayon.
//! - `logging`: Enables debug logging via the `tracing` crate.
//!
//! # Example
//!
//! ```
//! use repotree::{build, to_outline, ExpansionState, TreeRecord};
//!
//! let forest = build(&[
//!     TreeRecord::blob("src/a.ts", Some(120)),
//!     TreeRecord::blob("src/b.ts", Some(40)),
//!     TreeRecord::blob("README.md", Some(500)),
//! ]);
//! assert_eq!(to_outline(&forest), "src/\n  a.ts\n  b.ts\nREADME.md");
//!
//! let mut state = ExpansionState::new();
//! state.toggle("src");
//! assert_eq!(state.visible_rows(&forest).len(), 4);
//! ```
//!
//! Loading from the network:
//!
//! ```no_run
//! use repotree::{GitHubClient, ViewerBuilder, load_repository};
//!
//! let options = ViewerBuilder::new("https://github.com/rust-lang/cargo")
//!     .exclude_patterns(vec!["tests/**".into()])
//!     .build();
//! let client = GitHubClient::new(&options);
//! let repo = load_repository(&client, &options).expect("Failed to load repository");
//! println!("{}", repotree::to_outline(&repo.forest));
//! ```

pub mod cache;
mod engine;
mod error;
mod expansion;
mod options;
pub mod outline;
pub mod output;
pub mod path;
pub mod repo;
pub mod source;
pub mod tree;
mod types;

pub use cache::TtlCache;
pub use engine::{Session, load_commits, load_repository};
pub use error::RepotreeError;
pub use expansion::{ExpansionState, VisibleRow};
pub use options::{ViewerBuilder, ViewerOptions};
pub use outline::{parse_outline, to_outline, to_outline_with};
pub use repo::{archive_url, parse_repo_url};
pub use source::{GitHubClient, RepoSource};
pub use tree::{TreeBuild, build, build_with_report, sort};
pub use types::{
    CommitInfo, Node, NodeKind, RecordKind, RepoInfo, RepoMeta, RepoTree, SkipReason,
    SkippedRecord, TreeListing, TreeRecord,
};
