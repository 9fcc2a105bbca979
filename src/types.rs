use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of an entry in the hosted listing.
///
/// Anything other than `blob` or `tree` (submodule `commit` entries, for
/// instance) is kept verbatim in [`RecordKind::Other`] and built as an opaque
/// leaf with no size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordKind {
    Blob,
    Tree,
    Other(String),
}

impl From<String> for RecordKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "blob" => RecordKind::Blob,
            "tree" => RecordKind::Tree,
            _ => RecordKind::Other(value),
        }
    }
}

impl From<RecordKind> for String {
    fn from(kind: RecordKind) -> Self {
        match kind {
            RecordKind::Blob => "blob".to_string(),
            RecordKind::Tree => "tree".to_string(),
            RecordKind::Other(other) => other,
        }
    }
}

/// One entry of a flat repository listing, as returned by the hosted API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeRecord {
    /// Slash-delimited path relative to the repository root.
    ///
    /// A record without a path decodes to an empty string and is skipped by the builder.
    #[serde(default)]
    pub path: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<RecordKind>,
    /// Size in bytes; only meaningful for blobs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl TreeRecord {
    pub fn blob(path: impl Into<String>, size: Option<u64>) -> Self {
        Self {
            path: path.into(),
            kind: Some(RecordKind::Blob),
            size,
        }
    }

    pub fn tree(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: Some(RecordKind::Tree),
            size: None,
        }
    }
}

/// A recursive tree listing response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeListing {
    #[serde(default)]
    pub sha: Option<String>,
    pub tree: Vec<TreeRecord>,
    /// Set by the API when the listing was cut short; never inferred locally.
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Directory,
    File,
}

/// A node of the built forest.
///
/// Serialized directories always carry `children`, even when empty; files
/// never do.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Node {
    /// Last segment of [`Node::path`].
    pub name: String,
    /// Full path, unique within the forest.
    pub path: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Sorted children; always empty for files.
    #[serde(default)]
    pub children: Vec<Node>,
    #[serde(default)]
    pub size: Option<u64>,
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 3 + usize::from(self.is_dir()) + usize::from(self.size.is_some());
        let mut state = serializer.serialize_struct("Node", len)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("path", &self.path)?;
        state.serialize_field("type", &self.kind)?;
        if self.is_dir() {
            state.serialize_field("children", &self.children)?;
        } else {
            state.skip_field("children")?;
        }
        match &self.size {
            Some(size) => state.serialize_field("size", size)?,
            None => state.skip_field("size")?,
        }
        state.end()
    }
}

impl Node {
    pub fn directory(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            name: crate::path::name(&path).to_string(),
            path,
            kind: NodeKind::Directory,
            children: Vec::new(),
            size: None,
        }
    }

    pub fn file(path: impl Into<String>, size: Option<u64>) -> Self {
        let path = path.into();
        Self {
            name: crate::path::name(&path).to_string(),
            path,
            kind: NodeKind::File,
            children: Vec::new(),
            size,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }
}

/// Why the builder dropped a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingPath,
    MissingKind,
    EmptySegment,
    /// A file record whose path is also implied as a directory by another record.
    ConflictingKind,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::MissingPath => "record has no path",
            SkipReason::MissingKind => "record has no type",
            SkipReason::EmptySegment => "path contains an empty segment",
            SkipReason::ConflictingKind => "path is listed as a file but used as a directory",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub path: String,
    pub reason: SkipReason,
}

/// Owner and name of a hosted repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoInfo {
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for RepoInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// The parts of the repository metadata response we use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoMeta {
    pub default_branch: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Latest commit touching a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub message: String,
    pub author: String,
    pub date: DateTime<Utc>,
    /// Abbreviated (7 character) commit id.
    pub sha: String,
}

/// Everything loaded for one repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoTree {
    pub repo: RepoInfo,
    /// Branch the listing was taken from.
    pub branch: String,
    /// Copied from the listing; the forest may be incomplete when set.
    pub truncated: bool,
    pub forest: Vec<Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedRecord>,
    /// Latest commit per file path, when requested.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub commits: BTreeMap<String, CommitInfo>,
    /// Files whose commit lookup failed, with the error message.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub commit_errors: BTreeMap<String, String>,
}
