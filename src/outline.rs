//! Plain-text outline of a forest, one indented line per node.
//!
//! This is the text handed to copy and save actions:
//!
//! ```text
//! src/
//!   core/
//!     tree.rs
//!   lib.rs
//! README.md
//! ```

use crate::error::RepotreeError;
use crate::types::Node;

pub const DEFAULT_INDENT: &str = "  ";
/// Appended to directory names.
pub const DIRECTORY_MARKER: char = '/';
/// Starts a name written in escaped form.
pub const ESCAPE: char = '\\';

/// Renders `nodes` with the default two-space indent.
pub fn to_outline(nodes: &[Node]) -> String {
    let mut lines = Vec::new();
    push_lines(nodes, DEFAULT_INDENT, 0, &mut lines);
    lines.join("\n")
}

/// Renders `nodes` in their stored order, indenting each line by
/// `depth × indent_unit`. Lines are joined with `\n` and there is no
/// trailing newline.
///
/// A name that would read back differently (it starts with the indent unit or
/// [`ESCAPE`], or contains a line break) is written as [`ESCAPE`] followed by
/// the name with `\\`, `\n` and `\r` escaped.
pub fn to_outline_with(nodes: &[Node], indent_unit: &str) -> Result<String, RepotreeError> {
    check_indent_unit(indent_unit)?;
    let mut lines = Vec::new();
    push_lines(nodes, indent_unit, 0, &mut lines);
    Ok(lines.join("\n"))
}

fn check_indent_unit(indent_unit: &str) -> Result<(), RepotreeError> {
    let message = if indent_unit.is_empty() {
        "indent unit must not be empty"
    } else if indent_unit.contains(ESCAPE) || indent_unit.contains(['\n', '\r']) {
        "indent unit must not contain '\\' or line breaks"
    } else {
        return Ok(());
    };
    Err(RepotreeError::InvalidOutline {
        line: 0,
        message: message.into(),
    })
}

fn push_lines(nodes: &[Node], indent_unit: &str, depth: usize, lines: &mut Vec<String>) {
    for node in nodes {
        let mut line = indent_unit.repeat(depth);
        push_name(&mut line, &node.name, indent_unit);
        if node.is_dir() {
            line.push(DIRECTORY_MARKER);
            lines.push(line);
            push_lines(&node.children, indent_unit, depth + 1, lines);
        } else {
            lines.push(line);
        }
    }
}

fn push_name(line: &mut String, name: &str, indent_unit: &str) {
    let needs_escape = name.starts_with(indent_unit)
        || name.starts_with(ESCAPE)
        || name.contains(['\n', '\r']);
    if !needs_escape {
        line.push_str(name);
        return;
    }
    line.push(ESCAPE);
    for c in name.chars() {
        match c {
            '\\' => line.push_str("\\\\"),
            '\n' => line.push_str("\\n"),
            '\r' => line.push_str("\\r"),
            c => line.push(c),
        }
    }
}

fn unescape_name(escaped: &str) -> Option<String> {
    let mut name = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c != ESCAPE {
            name.push(c);
            continue;
        }
        match chars.next()? {
            '\\' => name.push('\\'),
            'n' => name.push('\n'),
            'r' => name.push('\r'),
            _ => return None,
        }
    }
    Some(name)
}

/// One parsed outline line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineLine {
    pub depth: usize,
    pub name: String,
    pub is_dir: bool,
    /// Path rebuilt from the enclosing directory lines.
    pub path: String,
}

/// Reads an outline back, recovering each line's depth and full path.
///
/// Fails when a line is indented more than one level below the previous line,
/// nests under a file, or holds a malformed escaped name.
pub fn parse_outline(text: &str, indent_unit: &str) -> Result<Vec<OutlineLine>, RepotreeError> {
    check_indent_unit(indent_unit)?;
    let mut parsed: Vec<OutlineLine> = Vec::new();
    let mut stack: Vec<(String, bool)> = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        if raw.is_empty() {
            continue;
        }
        let mut rest = raw;
        let mut depth = 0;
        while let Some(stripped) = rest.strip_prefix(indent_unit) {
            rest = stripped;
            depth += 1;
        }
        if depth > stack.len() {
            return Err(RepotreeError::InvalidOutline {
                line: idx + 1,
                message: format!("depth {} follows depth {}", depth, stack.len().saturating_sub(1)),
            });
        }
        stack.truncate(depth);
        if let Some((parent, false)) = stack.last() {
            return Err(RepotreeError::InvalidOutline {
                line: idx + 1,
                message: format!("'{}' is nested under file '{}'", rest, parent),
            });
        }
        let (name, is_dir) = match rest.strip_suffix(DIRECTORY_MARKER) {
            Some(name) => (name, true),
            None => (rest, false),
        };
        let name = match name.strip_prefix(ESCAPE) {
            Some(escaped) => unescape_name(escaped).ok_or_else(|| RepotreeError::InvalidOutline {
                line: idx + 1,
                message: format!("bad escape in '{}'", name),
            })?,
            None => name.to_string(),
        };
        let path = match stack.last() {
            Some((parent, _)) => format!("{}/{}", parent, name),
            None => name.to_string(),
        };
        stack.push((path.clone(), is_dir));
        parsed.push(OutlineLine {
            depth,
            name,
            is_dir,
            path,
        });
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{build, walk};
    use crate::types::TreeRecord;

    fn sample() -> Vec<Node> {
        build(&[
            TreeRecord::blob("src/lib.rs", Some(10)),
            TreeRecord::blob("src/core/tree.rs", Some(20)),
            TreeRecord::tree("docs"),
            TreeRecord::blob("README.md", Some(5)),
        ])
    }

    #[test]
    fn renders_nested_outline() {
        assert_eq!(
            to_outline(&sample()),
            concat!(
                "docs/\n",
                "src/\n",
                "  core/\n",
                "    tree.rs\n",
                "  lib.rs\n",
                "README.md",
            )
        );
    }

    #[test]
    fn custom_indent_unit() {
        let forest = build(&[TreeRecord::blob("a/b.txt", None)]);
        assert_eq!(to_outline_with(&forest, "\t").unwrap(), "a/\n\tb.txt");
    }

    #[test]
    fn empty_indent_unit_is_rejected() {
        let forest = build(&[TreeRecord::blob("a/b.txt", None)]);
        assert!(matches!(
            to_outline_with(&forest, ""),
            Err(RepotreeError::InvalidOutline { line: 0, .. })
        ));
    }

    #[test]
    fn names_starting_with_indent_keep_their_parent() {
        let forest = build(&[
            TreeRecord::blob("src/a.rs", None),
            TreeRecord::blob("  notes.txt", None),
            TreeRecord::blob("src/\\x", None),
        ]);
        let text = to_outline(&forest);
        assert_eq!(text, "src/\n  \\\\\\x\n  a.rs\n\\  notes.txt");

        let parsed = parse_outline(&text, DEFAULT_INDENT).unwrap();
        let actual: Vec<_> = parsed.iter().map(|l| (l.depth, l.path.as_str())).collect();
        assert_eq!(
            actual,
            vec![(0, "src"), (1, "src/\\x"), (1, "src/a.rs"), (0, "  notes.txt")]
        );
    }

    #[test]
    fn line_breaks_in_names_are_escaped() {
        let forest = build(&[TreeRecord::blob("odd\nname", None)]);
        let text = to_outline_with(&forest, "\t").unwrap();
        assert_eq!(text, "\\odd\\nname");
        let parsed = parse_outline(&text, "\t").unwrap();
        assert_eq!(parsed[0].name, "odd\nname");
    }

    #[test]
    fn parse_rejects_bad_escape() {
        let err = parse_outline("\\a\\q", DEFAULT_INDENT).unwrap_err();
        assert!(matches!(err, RepotreeError::InvalidOutline { line: 1, .. }));
    }

    #[test]
    fn empty_forest_is_empty_text() {
        assert_eq!(to_outline(&[]), "");
    }

    #[test]
    fn parse_recovers_depth_and_paths() {
        let forest = sample();
        let parsed = parse_outline(&to_outline(&forest), DEFAULT_INDENT).unwrap();

        let mut expected = Vec::new();
        walk(&forest, &mut |depth, node| {
            expected.push((depth, node.path.clone(), node.is_dir()))
        });
        let actual: Vec<_> = parsed
            .into_iter()
            .map(|l| (l.depth, l.path, l.is_dir))
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn parse_rejects_skipped_levels() {
        let err = parse_outline("a/\n    b", DEFAULT_INDENT).unwrap_err();
        assert!(matches!(err, RepotreeError::InvalidOutline { line: 2, .. }));
    }

    #[test]
    fn parse_rejects_children_of_files() {
        let err = parse_outline("a.txt\n  b", DEFAULT_INDENT).unwrap_err();
        assert!(matches!(err, RepotreeError::InvalidOutline { line: 2, .. }));
    }
}
