//! Building a sorted forest from a flat repository listing.

use crate::path;
use crate::types::{Node, NodeKind, RecordKind, SkipReason, SkippedRecord, TreeRecord};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;
#[cfg(feature = "logging")]
use tracing;

/// Result of [`build_with_report`]: the forest plus every record that was dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeBuild {
    pub forest: Vec<Node>,
    pub skipped: Vec<SkippedRecord>,
}

/// Builds the root-level forest from `records`, discarding skip details.
pub fn build(records: &[TreeRecord]) -> Vec<Node> {
    build_with_report(records).forest
}

/// Builds the root-level forest from an unordered flat listing.
///
/// Intermediate directories are inferred from path prefixes. Malformed records
/// (no path, no type, empty segments) are skipped and reported rather than
/// aborting the build. A file record whose path is also used as a directory is
/// rejected as [`SkipReason::ConflictingKind`]; the directory is kept.
/// Duplicate file records resolve to the last one seen.
///
/// Every level of the result is ordered by [`sort`].
pub fn build_with_report(records: &[TreeRecord]) -> TreeBuild {
    let mut skipped = Vec::new();
    let mut accepted = Vec::with_capacity(records.len());
    for record in records {
        match validate(record) {
            Ok(kind) => accepted.push((record, kind)),
            Err(reason) => {
                #[cfg(feature = "logging")]
                tracing::debug!("Skipping record '{}': {}", record.path, reason);
                skipped.push(SkippedRecord {
                    path: record.path.clone(),
                    reason,
                });
            }
        }
    }

    let mut directories: HashSet<&str> = HashSet::new();
    for (record, kind) in &accepted {
        directories.extend(path::ancestors(&record.path));
        if matches!(kind, RecordKind::Tree) {
            directories.insert(record.path.as_str());
        }
    }

    let mut nodes: HashMap<&str, Node> = directories
        .iter()
        .map(|p| (*p, Node::directory(*p)))
        .collect();

    for (record, kind) in &accepted {
        if matches!(kind, RecordKind::Tree) {
            continue;
        }
        if directories.contains(record.path.as_str()) {
            #[cfg(feature = "logging")]
            tracing::warn!(
                "'{}' is listed as a file but has descendants; keeping the directory",
                record.path
            );
            skipped.push(SkippedRecord {
                path: record.path.clone(),
                reason: SkipReason::ConflictingKind,
            });
            continue;
        }
        let size = match kind {
            RecordKind::Blob => record.size,
            _ => None,
        };
        nodes.insert(record.path.as_str(), Node::file(record.path.as_str(), size));
    }

    // Deepest first, so every node's children are attached before it is moved into its parent.
    let mut order: Vec<&str> = nodes.keys().copied().collect();
    order.sort_by_key(|p| std::cmp::Reverse(path::depth(p)));

    let mut forest = Vec::new();
    for key in order {
        let Some(node) = nodes.remove(key) else {
            continue;
        };
        match path::parent(key) {
            None => forest.push(node),
            Some(parent) => match nodes.get_mut(parent) {
                Some(dir) if dir.kind == NodeKind::Directory => dir.children.push(node),
                _ => {
                    #[cfg(feature = "logging")]
                    tracing::debug!("Dropping '{}': parent '{}' is not a directory", key, parent);
                }
            },
        }
    }

    sort_in_place(&mut forest);
    TreeBuild { forest, skipped }
}

fn validate(record: &TreeRecord) -> Result<RecordKind, SkipReason> {
    if record.path.is_empty() {
        return Err(SkipReason::MissingPath);
    }
    let kind = record.kind.clone().ok_or(SkipReason::MissingKind)?;
    if !path::is_well_formed(&record.path) {
        return Err(SkipReason::EmptySegment);
    }
    Ok(kind)
}

/// Orders `nodes` at every level: directories before files, then by [`compare_names`].
///
/// Applying it twice gives the same result as applying it once.
pub fn sort(mut nodes: Vec<Node>) -> Vec<Node> {
    sort_in_place(&mut nodes);
    nodes
}

pub fn sort_in_place(nodes: &mut [Node]) {
    nodes.sort_by(compare_nodes);
    for node in nodes.iter_mut() {
        if node.is_dir() {
            sort_in_place(&mut node.children);
        }
    }
}

/// Sibling order: directories first, then by name.
pub fn compare_nodes(a: &Node, b: &Node) -> Ordering {
    match (a.kind, b.kind) {
        (NodeKind::Directory, NodeKind::File) => Ordering::Less,
        (NodeKind::File, NodeKind::Directory) => Ordering::Greater,
        _ => compare_names(&a.name, &b.name),
    }
}

/// Human-oriented name comparison.
///
/// Compares by base letters first (case and accents ignored; whitespace, then
/// punctuation and symbols in root collation order, then digits, then letters),
/// then accents, then case with lowercase first. Falls back to code point order
/// so the result is a total order.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(&primary_key(b))
        .then_with(|| accent_key(a).cmp(&accent_key(b)))
        .then_with(|| case_key(a).cmp(&case_key(b)))
        .then_with(|| a.cmp(b))
}

/// ASCII punctuation and symbols in root collation order.
const PUNCTUATION_ORDER: &str = "_-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$";

fn char_weight(c: char) -> (u8, u32) {
    if c.is_whitespace() {
        (0, c as u32)
    } else if let Some(rank) = PUNCTUATION_ORDER.find(c) {
        (1, rank as u32)
    } else if c.is_numeric() {
        (2, c as u32)
    } else if c.is_alphabetic() {
        (3, c as u32)
    } else {
        (4, c as u32)
    }
}

fn primary_key(s: &str) -> Vec<(u8, u32)> {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(char_weight)
        .collect()
}

fn accent_key(s: &str) -> String {
    s.nfd().flat_map(char::to_lowercase).collect()
}

fn case_key(s: &str) -> Vec<bool> {
    s.nfd().map(char::is_uppercase).collect()
}

/// Looks up the node at `target` by descending one segment at a time.
pub fn find<'a>(forest: &'a [Node], target: &str) -> Option<&'a Node> {
    let mut level = forest;
    let mut found = None;
    let mut prefix_len = 0;
    for segment in path::segments(target) {
        prefix_len += segment.len();
        let expected = &target[..prefix_len];
        let node = level.iter().find(|n| n.path == expected)?;
        level = &node.children;
        found = Some(node);
        prefix_len += 1;
    }
    found
}

/// Calls `visit(depth, node)` for every node in pre-order.
pub fn walk<'a, F>(forest: &'a [Node], visit: &mut F)
where
    F: FnMut(usize, &'a Node),
{
    walk_inner(forest, 0, visit);
}

fn walk_inner<'a, F>(nodes: &'a [Node], depth: usize, visit: &mut F)
where
    F: FnMut(usize, &'a Node),
{
    for node in nodes {
        visit(depth, node);
        walk_inner(&node.children, depth + 1, visit);
    }
}

/// Paths of every directory in the forest, in pre-order.
pub fn directory_paths(forest: &[Node]) -> Vec<String> {
    let mut out = Vec::new();
    walk(forest, &mut |_, node| {
        if node.is_dir() {
            out.push(node.path.clone());
        }
    });
    out
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    pub directories: usize,
    pub files: usize,
    /// Sum of known file sizes in bytes.
    pub total_size: u64,
}

pub fn stats(forest: &[Node]) -> TreeStats {
    let mut stats = TreeStats::default();
    walk(forest, &mut |_, node| match node.kind {
        NodeKind::Directory => stats.directories += 1,
        NodeKind::File => {
            stats.files += 1;
            stats.total_size += node.size.unwrap_or(0);
        }
    });
    stats
}
