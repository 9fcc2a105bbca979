//! Output formatting for loaded repositories.
//!
//! Provides functions to render a [`RepoTree`] as a plain-text outline, an
//! expandable tree view with sizes and icons, a path list, or JSON.

use crate::expansion::ExpansionState;
use crate::outline;
use crate::tree;
use crate::{RepoTree, RepotreeError};
use std::fs;
use std::path::Path;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Outline,
    Tree,
    Paths,
    Json,
}

impl OutputFormat {
    /// Returns the conventional file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Outline | OutputFormat::Tree | OutputFormat::Paths => "txt",
            OutputFormat::Json => "json",
        }
    }
}

/// Presentation switches for [`format_result`].
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Indent unit for the outline and tree views.
    pub indent: String,
    /// Show human-readable file sizes in the tree view.
    pub sizes: bool,
    /// Prefix tree view entries with an icon glyph.
    pub icons: bool,
    /// Pretty-print JSON.
    pub pretty: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            indent: outline::DEFAULT_INDENT.to_string(),
            sizes: true,
            icons: false,
            pretty: true,
        }
    }
}

/// Formats the loaded repository into a string.
///
/// Only [`OutputFormat::Tree`] honours `state`; the other formats always cover
/// the whole forest.
pub fn format_result(
    result: &RepoTree,
    format: OutputFormat,
    state: &ExpansionState,
    options: &RenderOptions,
) -> Result<String, RepotreeError> {
    match format {
        OutputFormat::Outline => outline::to_outline_with(&result.forest, &options.indent),
        OutputFormat::Tree => Ok(format_tree(result, state, options)),
        OutputFormat::Paths => Ok(format_paths(result)),
        OutputFormat::Json => format_json(result, options.pretty),
    }
}

/// Writes the formatted result to a file.
pub fn write_result_to_file(
    result: &RepoTree,
    format: OutputFormat,
    state: &ExpansionState,
    options: &RenderOptions,
    path: impl AsRef<Path>,
) -> Result<(), RepotreeError> {
    let content = format_result(result, format, state, options)?;
    fs::write(&path, content).map_err(|e| RepotreeError::io(path.as_ref(), e))?;
    Ok(())
}

/// Formats a byte count using binary units, keeping at most one decimal.
///
/// `0` is `"0 B"`, `1024` is `"1 KB"`, `1536` is `"1.5 KB"`. Gigabytes is the
/// largest unit.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut unit = 0;
    while unit + 1 < UNITS.len() && bytes >= 1024u64.pow(unit as u32 + 1) {
        unit += 1;
    }
    let value = bytes as f64 / 1024f64.powi(unit as i32);
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{:.0} {}", rounded, UNITS[unit])
    } else {
        format!("{:.1} {}", rounded, UNITS[unit])
    }
}

/// Broad category of a file, used to pick an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconKind {
    Folder,
    File,
    Code,
    Json,
    Markup,
    Spreadsheet,
    Database,
    Text,
    Image,
    Video,
    Audio,
    Package,
    Archive,
    Lock,
    License,
}

impl IconKind {
    pub fn glyph(&self) -> &'static str {
        match self {
            IconKind::Folder => "📁",
            IconKind::File => "📄",
            IconKind::Code => "📝",
            IconKind::Json => "🔧",
            IconKind::Markup => "📐",
            IconKind::Spreadsheet => "📊",
            IconKind::Database => "🗄",
            IconKind::Text => "📃",
            IconKind::Image => "🖼",
            IconKind::Video => "🎞",
            IconKind::Audio => "🎵",
            IconKind::Package => "📦",
            IconKind::Archive => "🗜",
            IconKind::Lock => "🔒",
            IconKind::License => "©",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileIcon {
    pub kind: IconKind,
    /// Palette name such as `blue-400`.
    pub color: &'static str,
}

const fn icon(kind: IconKind, color: &'static str) -> FileIcon {
    FileIcon { kind, color }
}

pub const FOLDER_ICON: FileIcon = icon(IconKind::Folder, "blue-400");
pub const DEFAULT_ICON: FileIcon = icon(IconKind::File, "gray-400");

/// Picks the icon for a file name. Exact special names win over extensions;
/// extensions are matched case-insensitively.
pub fn file_icon(name: &str) -> FileIcon {
    if let Some(special) = special_file_icon(name) {
        return special;
    }
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or(name)
        .to_lowercase();
    extension_icon(&extension).unwrap_or(DEFAULT_ICON)
}

fn special_file_icon(name: &str) -> Option<FileIcon> {
    let found = match name {
        "package.json" => icon(IconKind::Package, "red-300"),
        "package-lock.json" => icon(IconKind::Lock, "yellow-300"),
        "yarn.lock" => icon(IconKind::Lock, "blue-300"),
        ".gitignore" => icon(IconKind::Text, "gray-400"),
        ".env" => icon(IconKind::Lock, "yellow-300"),
        "LICENSE" => icon(IconKind::License, "yellow-200"),
        _ => return None,
    };
    Some(found)
}

fn extension_icon(ext: &str) -> Option<FileIcon> {
    let found = match ext {
        "tsx" | "ts" => icon(IconKind::Code, "blue-400"),
        "jsx" | "js" | "mjs" => icon(IconKind::Code, "yellow-400"),
        "py" => icon(IconKind::Code, "green-400"),
        "rb" => icon(IconKind::Code, "red-400"),
        "php" | "kt" => icon(IconKind::Code, "purple-400"),
        "java" | "rs" | "swift" => icon(IconKind::Code, "orange-400"),
        "cpp" | "c" => icon(IconKind::Code, "blue-300"),
        "go" => icon(IconKind::Code, "cyan-400"),
        "json" => icon(IconKind::Json, "yellow-300"),
        "yaml" | "yml" => icon(IconKind::Markup, "yellow-200"),
        "xml" => icon(IconKind::Markup, "orange-300"),
        "csv" => icon(IconKind::Spreadsheet, "green-300"),
        "xls" | "xlsx" => icon(IconKind::Spreadsheet, "green-400"),
        "db" | "sql" => icon(IconKind::Database, "blue-300"),
        "css" => icon(IconKind::Code, "blue-400"),
        "scss" | "sass" => icon(IconKind::Code, "pink-400"),
        "less" => icon(IconKind::Code, "blue-300"),
        "styled" => icon(IconKind::Code, "pink-300"),
        "md" => icon(IconKind::Text, "white"),
        "txt" => icon(IconKind::Text, "gray-300"),
        "pdf" => icon(IconKind::Text, "red-400"),
        "doc" | "docx" => icon(IconKind::Text, "blue-400"),
        "jpg" | "jpeg" | "png" | "gif" | "svg" => icon(IconKind::Image, "purple-400"),
        "mp4" | "avi" | "mov" => icon(IconKind::Video, "blue-400"),
        "mp3" | "wav" => icon(IconKind::Audio, "green-400"),
        "package" => icon(IconKind::Package, "red-300"),
        "lock" => icon(IconKind::Lock, "yellow-300"),
        "zip" | "rar" | "tar" | "gz" => icon(IconKind::Archive, "yellow-400"),
        _ => return None,
    };
    Some(found)
}

// ----------------------- Internal formatting -----------------------

fn format_tree(result: &RepoTree, state: &ExpansionState, options: &RenderOptions) -> String {
    let mut out = String::with_capacity(1024);
    for row in state.visible_rows(&result.forest) {
        let node = row.node;
        out.push_str(&options.indent.repeat(row.depth));
        if node.is_dir() {
            out.push_str(if row.expanded { "▾ " } else { "▸ " });
        } else {
            out.push_str("  ");
        }
        if options.icons {
            let icon = if node.is_dir() {
                FOLDER_ICON
            } else {
                file_icon(&node.name)
            };
            out.push_str(icon.kind.glyph());
            out.push(' ');
        }
        out.push_str(&node.name);
        if node.is_dir() {
            out.push(outline::DIRECTORY_MARKER);
        }
        if options.sizes {
            if let Some(size) = node.size {
                out.push_str(&format!("  ({})", format_size(size)));
            }
        }
        if let Some(commit) = result.commits.get(&node.path) {
            out.push_str(&format!(
                "  [{} {} by {} on {}]",
                commit.sha,
                commit.message.lines().next().unwrap_or(""),
                commit.author,
                commit.date.format("%Y-%m-%d")
            ));
        }
        out.push('\n');
    }
    out
}

fn format_paths(result: &RepoTree) -> String {
    let mut out = String::new();
    tree::walk(&result.forest, &mut |_, node| {
        if !node.is_dir() {
            out.push_str(&node.path);
            out.push('\n');
        }
    });
    out
}

fn format_json(result: &RepoTree, pretty: bool) -> Result<String, RepotreeError> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    Ok(json)
}
