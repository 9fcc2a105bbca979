//! Command-line interface for repotree.
//!
//! Fetches a repository listing and prints it as an outline, a tree view,
//! a path list, or JSON.

use clap::{Parser, ValueEnum};
use repotree::output::{self, RenderOptions};
use repotree::{
    ExpansionState, GitHubClient, RepoTree, RepotreeError, ViewerBuilder, ViewerOptions,
    archive_url, load_repository,
};
use std::path::PathBuf;
use std::process::exit;
use std::time::Duration;

/// repotree: browse a hosted repository's file structure
#[derive(Parser)]
#[command(name = "repotree", version, about, long_about = None)]
struct Cli {
    /// Repository URL (https://github.com/<owner>/<repo>) or owner/repo
    url: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Outline)]
    format: OutputFormat,

    /// Branch to list (defaults to the repository's default branch)
    #[arg(short, long)]
    branch: Option<String>,

    /// Expand every directory in the tree view
    #[arg(long, conflicts_with = "expand")]
    expand_all: bool,

    /// Expand a directory in the tree view (can be repeated)
    #[arg(long = "expand")]
    expand: Vec<String>,

    /// Exclude paths matching a glob (can be repeated)
    #[arg(short = 'x', long = "exclude")]
    exclude_patterns: Vec<String>,

    /// Keep entries under .git/
    #[arg(long)]
    include_git: bool,

    /// Look up the latest commit of every file
    #[arg(long)]
    with_commits: bool,

    /// Hide file sizes in the tree view
    #[arg(long)]
    no_sizes: bool,

    /// Show file-type icons in the tree view
    #[arg(long)]
    icons: bool,

    /// Spaces per indentation level
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u16).range(1..))]
    indent: u16,

    /// Compact JSON output
    #[arg(long)]
    compact: bool,

    /// Write the output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Load options from a JSON file; flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Response cache lifetime in seconds
    #[arg(long)]
    cache_ttl: Option<u64>,

    /// Print the ZIP download link after the output
    #[arg(long)]
    download_url: bool,

    /// Enable debug logging (requires the `logging` feature)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Outline,
    Tree,
    Paths,
    Json,
}

impl From<OutputFormat> for output::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Outline => output::OutputFormat::Outline,
            OutputFormat::Tree => output::OutputFormat::Tree,
            OutputFormat::Paths => output::OutputFormat::Paths,
            OutputFormat::Json => output::OutputFormat::Json,
        }
    }
}

impl Cli {
    fn viewer_options(&self) -> Result<ViewerOptions, RepotreeError> {
        let base = match &self.config {
            Some(path) => ViewerOptions::from_json_file(path)?,
            None => ViewerOptions::default(),
        };
        let mut builder = ViewerBuilder::from_options(base);
        if let Some(url) = &self.url {
            builder = builder.url(url.clone());
        }
        if let Some(branch) = &self.branch {
            builder = builder.branch(branch.clone());
        }
        if !self.exclude_patterns.is_empty() {
            builder = builder.exclude_patterns(self.exclude_patterns.clone());
        }
        if self.include_git {
            builder = builder.include_git_dir(true);
        }
        if self.with_commits {
            builder = builder.with_commits(true);
        }
        if let Some(ttl) = self.cache_ttl {
            builder = builder.cache_ttl(Duration::from_secs(ttl));
        }
        let options = builder.build();
        if options.url.is_empty() {
            return Err(RepotreeError::InvalidUrl(
                "no repository URL given (pass one or set \"url\" in --config)".into(),
            ));
        }
        Ok(options)
    }

    fn render_options(&self) -> RenderOptions {
        RenderOptions {
            indent: " ".repeat(usize::from(self.indent)),
            sizes: !self.no_sizes,
            icons: self.icons,
            pretty: !self.compact,
        }
    }

    fn expansion(&self, result: &RepoTree) -> ExpansionState {
        let mut state = ExpansionState::new();
        if self.expand_all {
            state.expand_all(&result.forest);
        } else {
            for path in &self.expand {
                state.expand(path.trim_end_matches('/'));
            }
        }
        state
    }
}

#[cfg(feature = "logging")]
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;
    let default = if verbose { "repotree=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("REPOTREE_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    #[cfg(feature = "logging")]
    init_logging(cli.verbose);
    #[cfg(not(feature = "logging"))]
    if cli.verbose {
        eprintln!("Warning: built without the `logging` feature; --verbose has no effect");
    }

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), RepotreeError> {
    let options = cli.viewer_options()?;
    let client = GitHubClient::new(&options);
    let result = load_repository(&client, &options)?;

    if result.truncated {
        eprintln!("Warning: repository is too large, showing partial structure");
    }
    for skipped in &result.skipped {
        eprintln!("Warning: skipped '{}': {}", skipped.path, skipped.reason);
    }
    for (path, error) in &result.commit_errors {
        eprintln!("Warning: no commit info for {}: {}", path, error);
    }

    let state = cli.expansion(&result);
    let render = cli.render_options();
    let format: output::OutputFormat = cli.format.into();
    match &cli.output {
        Some(path) => output::write_result_to_file(&result, format, &state, &render, path)?,
        None => {
            let text = output::format_result(&result, format, &state, &render)?;
            if text.ends_with('\n') {
                print!("{}", text);
            } else {
                println!("{}", text);
            }
        }
    }

    if cli.download_url {
        println!("{}", archive_url(&result.repo, &result.branch));
    }
    Ok(())
}
