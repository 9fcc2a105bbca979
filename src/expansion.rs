//! Which directories of a forest are currently expanded.

use crate::tree;
use crate::types::Node;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Set of expanded directory paths.
///
/// Keyed by [`Node::path`], so it survives rebuilding an identical tree. Call
/// [`ExpansionState::reset`] when a new repository is loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionState {
    expanded: BTreeSet<String>,
}

/// A row shown under the current expansion state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRow<'a> {
    pub depth: usize,
    pub node: &'a Node,
    /// Only meaningful for directories.
    pub expanded: bool,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership of `path`.
    pub fn toggle(&mut self, path: &str) {
        if !self.expanded.remove(path) {
            self.expanded.insert(path.to_string());
        }
    }

    pub fn expand(&mut self, path: &str) {
        self.expanded.insert(path.to_string());
    }

    pub fn collapse(&mut self, path: &str) {
        self.expanded.remove(path);
    }

    /// Replaces the state with every directory path in `forest`.
    pub fn expand_all(&mut self, forest: &[Node]) {
        self.expanded = tree::directory_paths(forest).into_iter().collect();
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    pub fn reset(&mut self) {
        self.expanded.clear();
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded.contains(path)
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.expanded.iter().map(String::as_str)
    }

    /// Rows to display: root nodes, plus the children of every expanded
    /// directory whose ancestors are all expanded, in stored order.
    pub fn visible_rows<'a>(&self, forest: &'a [Node]) -> Vec<VisibleRow<'a>> {
        let mut rows = Vec::new();
        self.collect_rows(forest, 0, &mut rows);
        rows
    }

    fn collect_rows<'a>(&self, nodes: &'a [Node], depth: usize, rows: &mut Vec<VisibleRow<'a>>) {
        for node in nodes {
            let expanded = node.is_dir() && self.is_expanded(&node.path);
            rows.push(VisibleRow {
                depth,
                node,
                expanded,
            });
            if expanded {
                self.collect_rows(&node.children, depth + 1, rows);
            }
        }
    }
}

impl<S: Into<String>> FromIterator<S> for ExpansionState {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            expanded: iter.into_iter().map(Into::into).collect(),
        }
    }
}
