//! Command-line interface module for sortdrop.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Building the dispatcher from configuration
//! - Handling "file created" events for explicit paths
//! - One-shot sweeps of a directory, with dry-run support

use crate::config::SortConfig;
use crate::dispatcher::{Dispatcher, Disposition};
use crate::file_category::Category;
use crate::output::{OutputFormatter, plural};
use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Sort files into category directories by extension.
#[derive(Debug, Parser)]
#[command(name = "sortdrop", version, about)]
pub struct Cli {
    /// Configuration file (defaults to .sortdroprc.toml, then ~/.config/sortdrop/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Resolve relative category directories against this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Represents a CLI command to execute.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Handle newly created files, moving each into its category directory
    Handle {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Dispatch every file directly inside a directory
    Sweep {
        dir: PathBuf,
        /// Show what would be moved without touching any file
        #[arg(long)]
        dry_run: bool,
        /// Also sweep files whose name starts with '.'
        #[arg(long)]
        include_hidden: bool,
    },
    /// Print the category of each path
    Classify {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Print the category directories and the extensions they receive
    Dirs,
}

/// Outcome of a sweep over a directory.
#[derive(Debug, Default)]
pub struct SweepReport {
    /// Number of files moved, by category label.
    pub moved: BTreeMap<String, usize>,
    /// Files left in place because their type is unknown.
    pub skipped: Vec<PathBuf>,
    /// Files that could not be moved, with the error message.
    pub failed: Vec<(PathBuf, String)>,
}

impl SweepReport {
    /// Returns the number of files moved.
    pub fn moved_total(&self) -> usize {
        self.moved.values().sum()
    }

    /// Returns true if no file failed to move.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs the CLI application with parsed arguments.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use sortdrop::cli::{Cli, run_cli};
///
/// let cli = Cli::parse_from(["sortdrop", "handle", "photo.jpg"]);
/// if let Err(e) = run_cli(&cli) {
///     eprintln!("Error: {:#}", e);
/// }
/// ```
pub fn run_cli(cli: &Cli) -> Result<()> {
    let dispatcher = build_dispatcher(cli.config.as_deref(), cli.root.as_deref())?;

    match &cli.command {
        Command::Handle { paths } => handle_paths(&dispatcher, paths),
        Command::Sweep {
            dir,
            dry_run,
            include_hidden,
        } => {
            if *dry_run {
                sweep_dry_run(&dispatcher, dir, *include_hidden)
            } else {
                sweep(&dispatcher, dir, *include_hidden)
            }
        }
        Command::Classify { paths } => {
            classify_paths(&dispatcher, paths);
            Ok(())
        }
        Command::Dirs => {
            print_directories(&dispatcher);
            Ok(())
        }
    }
}

/// Loads configuration and builds the dispatcher.
pub fn build_dispatcher(config_path: Option<&Path>, root: Option<&Path>) -> Result<Dispatcher> {
    let config = SortConfig::load(config_path).context("Error loading configuration")?;
    let mut directories = config
        .compile()
        .context("Error validating configuration")?;
    if let Some(root) = root {
        directories = directories.rooted_at(root);
    }
    Ok(Dispatcher::new(Default::default(), directories))
}

/// Runs the "file created" handler on each path in turn.
///
/// Every path is attempted; the command fails afterwards if any move failed.
pub fn handle_paths(dispatcher: &Dispatcher, paths: &[PathBuf]) -> Result<()> {
    let mut failures = 0;

    for path in paths {
        match dispatcher.handle_file_created(path) {
            Ok(Disposition::Moved {
                category,
                destination,
            }) => OutputFormatter::success(&format!(
                "{} [{}] -> {}",
                path.display(),
                category,
                destination.display()
            )),
            Ok(Disposition::Skipped) => OutputFormatter::warning(&format!(
                "Unknown file type for {}, left in place",
                path.display()
            )),
            Err(e) => {
                failures += 1;
                OutputFormatter::error(&format!(
                    "{}: {:#}",
                    path.display(),
                    anyhow::Error::new(e)
                ));
            }
        }
    }

    if failures > 0 {
        bail!(
            "{} of {} {} could not be moved",
            failures,
            paths.len(),
            plural(paths.len())
        );
    }
    Ok(())
}

/// Lists the regular files directly inside `dir`, sorted by name.
///
/// Hidden files (names starting with '.') are left out unless
/// `include_hidden` is set.
pub fn collect_files(dir: &Path, include_hidden: bool) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Error reading directory {}", dir.display()))?;

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter(|entry| include_hidden || !entry.file_name().to_string_lossy().starts_with('.'))
        .map(|entry| entry.path())
        .collect();
    files.sort();
    Ok(files)
}

/// Dispatches every file in `files`, collecting the outcome of each.
pub fn sweep_files(dispatcher: &Dispatcher, files: &[PathBuf]) -> SweepReport {
    let progress = OutputFormatter::create_progress_bar(files.len() as u64);
    let mut report = SweepReport::default();

    for path in files {
        if let Some(name) = path.file_name() {
            progress.set_message(name.to_string_lossy().into_owned());
        }
        match dispatcher.handle_file_created(path) {
            Ok(Disposition::Moved { category, .. }) => {
                *report.moved.entry(category.label().to_string()).or_insert(0) += 1;
            }
            Ok(Disposition::Skipped) => report.skipped.push(path.clone()),
            Err(e) => report
                .failed
                .push((path.clone(), format!("{:#}", anyhow::Error::new(e)))),
        }
        progress.inc(1);
    }

    progress.finish_and_clear();
    report
}

/// Moves every recognized file in `dir` into its category directory.
pub fn sweep(dispatcher: &Dispatcher, dir: &Path, include_hidden: bool) -> Result<()> {
    OutputFormatter::info(&format!("Sorting contents of: {}", dir.display()));

    let files = collect_files(dir, include_hidden)?;
    if files.is_empty() {
        OutputFormatter::plain("No files found to sort.");
        return Ok(());
    }

    let report = sweep_files(dispatcher, &files);

    for path in &report.skipped {
        OutputFormatter::warning(&format!("Unknown file type for {}", path.display()));
    }
    for (path, reason) in &report.failed {
        OutputFormatter::error(&format!("{}: {}", path.display(), reason));
    }

    OutputFormatter::summary_table(&report.moved, report.moved_total());

    if !report.skipped.is_empty() {
        OutputFormatter::plain(&format!(
            "{} {} left in place.",
            report.skipped.len(),
            plural(report.skipped.len())
        ));
    }

    if !report.is_success() {
        bail!(
            "{} {} could not be moved",
            report.failed.len(),
            plural(report.failed.len())
        );
    }

    OutputFormatter::success("Sorting complete!");
    Ok(())
}

/// Prints where each file in `dir` would go, without moving anything.
pub fn sweep_dry_run(dispatcher: &Dispatcher, dir: &Path, include_hidden: bool) -> Result<()> {
    OutputFormatter::dry_run_notice(&format!("Analyzing contents of: {}", dir.display()));

    let files = collect_files(dir, include_hidden)?;
    if files.is_empty() {
        OutputFormatter::plain("No files found to sort.");
        return Ok(());
    }

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut skipped = 0;

    for path in &files {
        match dispatcher.plan(path) {
            Some((category, destination)) => {
                OutputFormatter::plain(&format!(
                    " - {} [{}]\n   → Would move to {}",
                    path.display(),
                    category,
                    destination.display()
                ));
                *counts.entry(category.label().to_string()).or_insert(0) += 1;
            }
            None => {
                skipped += 1;
                OutputFormatter::plain(&format!(" - {} [unknown]\n   → Would stay", path.display()));
            }
        }
    }

    let total = counts.values().sum();
    OutputFormatter::summary_table(&counts, total);
    if skipped > 0 {
        OutputFormatter::plain(&format!("{} {} would stay in place.", skipped, plural(skipped)));
    }

    OutputFormatter::dry_run_notice("Dry run complete. No files were modified.");
    Ok(())
}

fn classify_paths(dispatcher: &Dispatcher, paths: &[PathBuf]) {
    for path in paths {
        let category = dispatcher.table().classify(path);
        OutputFormatter::plain(&format!("{}\t{}", category, path.display()));
    }
}

fn print_directories(dispatcher: &Dispatcher) {
    OutputFormatter::header("Category directories");
    for (category, dir) in dispatcher.directories().iter() {
        OutputFormatter::plain(&format!("{:<8} -> {}", category, dir.display()));
        OutputFormatter::plain(&format!(
            "           {}",
            dispatcher.table().extensions(category).join(" ")
        ));
    }
    OutputFormatter::plain(&format!(
        "Files of type '{}' are left in place.",
        Category::Unknown
    ));
}
