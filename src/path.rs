//! Slash-delimited repository paths.
//!
//! Listing paths are always `/`-separated regardless of the host platform, so
//! these helpers work on plain `&str` rather than [`std::path::Path`].

/// Separator used by the hosted API for every listing path.
pub const SEPARATOR: char = '/';

/// Splits `path` into its segments, in order.
///
/// Empty segments produced by doubled, leading or trailing separators are
/// passed through so callers can reject them. An empty path yields no segments.
pub fn segments(path: &str) -> Vec<&str> {
    if path.is_empty() {
        return Vec::new();
    }
    path.split(SEPARATOR).collect()
}

/// Returns true when every segment of `path` is non-empty.
pub fn is_well_formed(path: &str) -> bool {
    !path.is_empty() && segments(path).iter().all(|s| !s.is_empty())
}

/// The parent path, or `None` for a root-level path.
pub fn parent(path: &str) -> Option<&str> {
    path.rfind(SEPARATOR).map(|idx| &path[..idx])
}

/// The last segment of `path`.
pub fn name(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Every proper prefix of `path`, shortest first.
///
/// `ancestors("a/b/c")` yields `["a", "a/b"]`.
pub fn ancestors(path: &str) -> impl Iterator<Item = &str> {
    path.match_indices(SEPARATOR).map(move |(idx, _)| &path[..idx])
}

/// Number of segments in `path` minus one; root-level paths have depth 0.
pub fn depth(path: &str) -> usize {
    path.matches(SEPARATOR).count()
}
