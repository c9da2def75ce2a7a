//! rawcull - find and remove camera RAW files that were never worked on.
//!
//! Usage:
//!   rawcull [PATH]               Show what would be deleted
//!   rawcull plan [PATH] --list   Also list every file
//!   rawcull delete [PATH]        Delete after confirmation
//!   rawcull export [PATH] -o F   Write the plan as JSON
//!   rawcull retry LIST           Retry paths from a recovery list
//!   rawcull --help               Show help

mod logging;
mod settings;

use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};
use itertools::Itertools;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;

use rawcull_classify::ClassificationEngine;
use rawcull_core::{DeletionPlan, DeletionPolicy, DirectoryStats, ScanReport, ScanWarning};
use rawcull_ops::{DeletionExecutor, DeletionMode, OperationComplete, write_recovery_list};
use rawcull_scan::{DirectoryScanner, ScanConfig};

use crate::settings::{DeletionCase, Settings, policy_from_cases};

#[derive(Parser)]
#[command(
    name = "rawcull",
    version,
    about = "Find and remove camera RAW files that were never reviewed",
    long_about = "rawcull walks a photo library and marks .cr2 files for deletion \
                  depending on which companions sit next to them: an .xmp sidecar \
                  (edited in Lightroom) and/or a .jpg/.jpeg preview.\n\n\
                  By default only RAW files with no companion at all are marked. \
                  Nothing is removed unless you run `rawcull delete`."
)]
struct Cli {
    /// Directory to search (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    #[command(flatten)]
    select: SelectArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Options deciding which files end up in the plan.
#[derive(Args, Clone, Default)]
struct SelectArgs {
    /// Delete RAW files in this case (repeatable, defaults to settings)
    #[arg(short, long, value_enum)]
    when: Vec<DeletionCase>,

    /// Glob of directories to skip, replacing the defaults (repeatable)
    #[arg(short = 'x', long)]
    exclude: Vec<String>,

    /// Scanner threads (0 = auto-detect)
    #[arg(short = 'j', long)]
    threads: Option<usize>,
}

/// Options shared by the commands that remove files.
#[derive(Args, Clone)]
struct RemoveArgs {
    /// Unlink files instead of moving them to the trash
    #[arg(long)]
    permanent: bool,

    /// Do not ask for confirmation
    #[arg(short, long)]
    yes: bool,

    /// Where to write the paths that could not be removed
    #[arg(long)]
    recovery_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Show what would be deleted
    Plan {
        /// Directory to search
        #[arg(default_value = ".")]
        path: PathBuf,

        #[command(flatten)]
        select: SelectArgs,

        /// List every file marked for deletion
        #[arg(short, long)]
        list: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete the marked files
    Delete {
        /// Directory to search
        #[arg(default_value = ".")]
        path: PathBuf,

        #[command(flatten)]
        select: SelectArgs,

        #[command(flatten)]
        remove: RemoveArgs,
    },

    /// Write the plan to a JSON file
    Export {
        /// Directory to search
        #[arg(default_value = ".")]
        path: PathBuf,

        #[command(flatten)]
        select: SelectArgs,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Retry the files listed in a recovery list
    Retry {
        /// Recovery list written by a failed deletion
        list: PathBuf,

        #[command(flatten)]
        remove: RemoveArgs,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// JSON view of a classified scan.
#[derive(Serialize)]
struct PlanOutput<'a> {
    root: &'a Path,
    policy: &'a DeletionPolicy,
    cancelled: bool,
    plan: &'a DeletionPlan,
    warnings: &'a [ScanWarning],
}

impl<'a> PlanOutput<'a> {
    fn new(report: &'a ScanReport, policy: &'a DeletionPolicy, plan: &'a DeletionPlan) -> Self {
        Self {
            root: &report.root,
            policy,
            cancelled: report.cancelled,
            plan,
            warnings: &report.warnings,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    logging::init_logger();

    let cli = Cli::parse();
    let settings = Settings::load();

    match cli.command {
        Some(Command::Plan {
            path,
            select,
            list,
            format,
        }) => run_plan(&path, &select, &settings, list, format).await,
        Some(Command::Delete {
            path,
            select,
            remove,
        }) => run_delete(&path, &select, &remove, &settings).await,
        Some(Command::Export {
            path,
            select,
            output,
        }) => run_export(&path, &select, &settings, &output).await,
        Some(Command::Retry { list, remove }) => run_retry(&list, &remove, &settings).await,
        None => run_plan(&cli.path, &cli.select, &settings, false, OutputFormat::Text).await,
    }
}

/// Scan and classify, then print the plan.
async fn run_plan(
    path: &Path,
    select: &SelectArgs,
    settings: &Settings,
    list: bool,
    format: OutputFormat,
) -> Result<()> {
    let policy = resolve_policy(select, settings);
    let report = scan(path, select, settings).await?;
    let plan = ClassificationEngine::new(policy.clone()).classify_report(&report);

    match format {
        OutputFormat::Text => {
            print_warnings(&report);
            print_summary(&report, &policy, &plan);
            if list {
                print_file_list(&plan);
            }
        }
        OutputFormat::Json => {
            let output = PlanOutput::new(&report, &policy, &plan);
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Scan, classify, confirm, and remove.
async fn run_delete(
    path: &Path,
    select: &SelectArgs,
    remove: &RemoveArgs,
    settings: &Settings,
) -> Result<()> {
    let policy = resolve_policy(select, settings);
    let report = scan(path, select, settings).await?;
    let plan = ClassificationEngine::new(policy.clone()).classify_report(&report);

    print_warnings(&report);
    print_summary(&report, &policy, &plan);

    if report.cancelled {
        // A directory may have been cut off before its companions were seen
        bail!("Scan was cancelled; refusing to delete from a partial plan");
    }
    if plan.is_empty() {
        return Ok(());
    }

    let mode = resolve_mode(remove, settings);
    if !remove.yes && !confirm(mode, plan.file_count(), plan.total_bytes)? {
        println!(" Nothing deleted.");
        return Ok(());
    }

    remove_files(plan.targets(), mode, &resolve_recovery_file(remove, settings)).await
}

/// Scan, classify, and write the plan as JSON.
async fn run_export(
    path: &Path,
    select: &SelectArgs,
    settings: &Settings,
    output: &Path,
) -> Result<()> {
    let policy = resolve_policy(select, settings);
    let report = scan(path, select, settings).await?;
    let plan = ClassificationEngine::new(policy.clone()).classify_report(&report);

    let json = serde_json::to_string_pretty(&PlanOutput::new(&report, &policy, &plan))?;
    std::fs::write(output, json)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    eprintln!(
        "Exported {} files ({}) to {}",
        plan.file_count(),
        format_size(plan.total_bytes),
        output.display()
    );

    Ok(())
}

/// Remove the paths of a recovery list.
async fn run_retry(list: &Path, remove: &RemoveArgs, settings: &Settings) -> Result<()> {
    let paths = rawcull_ops::read_recovery_list(list)?;
    if paths.is_empty() {
        println!(" {} lists no files.", list.display());
        return Ok(());
    }

    // Sizes are informational only; a file that is gone fails on removal
    let targets: Vec<(PathBuf, u64)> = paths
        .into_iter()
        .map(|p| {
            let size = std::fs::metadata(&p).map(|m| m.len()).unwrap_or(0);
            (p, size)
        })
        .collect();
    let bytes = targets.iter().map(|(_, size)| size).sum();

    let mode = resolve_mode(remove, settings);
    if !remove.yes && !confirm(mode, targets.len(), bytes)? {
        println!(" Nothing deleted.");
        return Ok(());
    }

    let recovery_file = remove.recovery_file.clone().unwrap_or_else(|| list.to_path_buf());
    remove_files(targets, mode, &recovery_file).await?;

    if recovery_file == list {
        std::fs::remove_file(list)
            .with_context(|| format!("Failed to remove {}", list.display()))?;
    }

    Ok(())
}

/// Run the scanner on the blocking pool with progress and Ctrl-C handling.
async fn scan(path: &Path, select: &SelectArgs, settings: &Settings) -> Result<ScanReport> {
    let exclude_patterns = if select.exclude.is_empty() {
        settings.exclude_patterns.clone()
    } else {
        select.exclude.clone()
    };
    let config = ScanConfig::builder()
        .root(path)
        .threads(select.threads.unwrap_or(settings.threads))
        .exclude_patterns(exclude_patterns)
        .build()
        .context("Invalid scan options")?;

    let scanner = DirectoryScanner::new();
    let cancel = scanner.cancellation_token();
    let mut progress_rx = scanner.subscribe();

    let finished = scanner.cancellation_token();

    // First Ctrl-C stops the scan; once it is over, Ctrl-C exits
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if cancel.is_cancelled() {
                std::process::exit(130);
            }
            eprintln!();
            eprintln!("Cancelling scan...");
            cancel.cancel();
        }
    });

    let show_progress = std::io::stderr().is_terminal();
    let progress = tokio::spawn(async move {
        let mut shown = false;
        loop {
            match progress_rx.recv().await {
                Ok(p) if show_progress => {
                    eprint!(
                        "\r\x1b[2KSearching {} ({} remaining)",
                        truncate(&p.current_directory.display().to_string(), 60),
                        p.directories_remaining
                    );
                    shown = true;
                }
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
        }
        if shown {
            eprint!("\r\x1b[2K");
        }
    });

    let result = tokio::task::spawn_blocking(move || scanner.scan(&config)).await;
    let _ = progress.await;
    finished.cancel();

    let report = result?.context("Scan failed")?;
    if report.cancelled {
        eprintln!("Scan cancelled; results are partial.");
    }
    Ok(report)
}

/// Remove files and write the recovery list if anything failed.
async fn remove_files(
    targets: Vec<(PathBuf, u64)>,
    mode: DeletionMode,
    recovery_file: &Path,
) -> Result<()> {
    let show_progress = std::io::stderr().is_terminal();
    let complete = DeletionExecutor { mode }
        .execute_targets(targets, |p| {
            if show_progress {
                eprint!(
                    "\r\x1b[2K[{:>3.0}%] {}",
                    p.percentage(),
                    p.current_file
                        .as_deref()
                        .map(|f| truncate(&f.display().to_string(), 60))
                        .unwrap_or_default()
                );
            }
        })
        .await;
    if show_progress {
        eprint!("\r\x1b[2K");
    }

    report_completion(&complete);

    if !complete.is_success() {
        write_recovery_list(recovery_file, &complete.failed_paths())?;
        eprintln!(
            "Paths that could not be removed were written to {}",
            recovery_file.display()
        );
        bail!(
            "{} of {} files could not be removed",
            complete.failed,
            complete.failed + complete.succeeded
        );
    }

    Ok(())
}

fn report_completion(complete: &OperationComplete) {
    println!(
        " {} ({} freed)",
        complete.summary(),
        format_size(complete.bytes_freed)
    );
    for error in &complete.errors {
        eprintln!("  {error}");
    }
}

/// Ask on stdin. Anything but y/yes declines.
fn confirm(mode: DeletionMode, files: usize, bytes: u64) -> Result<bool> {
    let action = match mode {
        DeletionMode::Trash => "Move",
        DeletionMode::Permanent => "Permanently delete",
    };
    let target = match mode {
        DeletionMode::Trash => " to the trash",
        DeletionMode::Permanent => "",
    };
    print!(" {action} {files} files ({}){target}? [y/N] ", format_size(bytes));
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn resolve_policy(select: &SelectArgs, settings: &Settings) -> DeletionPolicy {
    if select.when.is_empty() {
        policy_from_cases(&settings.delete_when)
    } else {
        policy_from_cases(&select.when)
    }
}

fn resolve_mode(remove: &RemoveArgs, settings: &Settings) -> DeletionMode {
    if remove.permanent || !settings.use_trash {
        DeletionMode::Permanent
    } else {
        DeletionMode::Trash
    }
}

fn resolve_recovery_file(remove: &RemoveArgs, settings: &Settings) -> PathBuf {
    remove
        .recovery_file
        .clone()
        .unwrap_or_else(|| settings.recovery_file.clone())
}

fn print_warnings(report: &ScanReport) {
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
}

/// Print the per-directory table and totals.
fn print_summary(report: &ScanReport, policy: &DeletionPolicy, plan: &DeletionPlan) {
    let rows: Vec<(String, &DirectoryStats)> = plan
        .directories
        .iter()
        .map(|row| (display_directory(&row.directory, &report.root), row))
        .collect();
    let totals = plan.totals();

    let width = rows
        .iter()
        .map(|(name, _)| name.chars().count())
        .chain([9])
        .max()
        .unwrap_or(9)
        .min(60);
    let rule = "─".repeat(width + 62);

    println!();
    println!(" {}", report.root.display());
    println!(
        " Deleting RAW files with: {}",
        policy.codes().map(|c| c.label()).join("; ")
    );
    println!("{rule}");
    print_row(width, "Directory", ["RAW", "RAW delete", "XMP", "XMP delete", "JPEG"].map(String::from));
    println!("{rule}");
    for (name, row) in &rows {
        print_row(width, &truncate(name, width), counts(row));
    }
    println!("{rule}");
    print_row(width, "Total", counts(&totals));
    println!("{rule}");

    if plan.is_empty() {
        println!(" Nothing to delete.");
    } else {
        println!(
            " {} files marked for deletion, {} reclaimable",
            plan.file_count(),
            format_size(plan.total_bytes)
        );
    }
    println!(
        " {} files in {} directories, scanned in {:.2}s",
        report.stats.files_matched,
        report.stats.directories_scanned,
        report.duration.as_secs_f64()
    );
    if report.has_warnings() {
        println!(" {} warning(s) during scan", report.warnings.len());
    }
}

fn counts(row: &DirectoryStats) -> [String; 5] {
    [
        row.raw_found,
        row.raw_marked,
        row.xmp_found,
        row.xmp_marked,
        row.jpeg_found,
    ]
    .map(|n| n.to_string())
}

fn print_row(width: usize, name: &str, cells: [String; 5]) {
    println!(
        " {:<width$} {:>10} {:>11} {:>10} {:>11} {:>10}",
        name,
        cells[0],
        cells[1],
        cells[2],
        cells[3],
        cells[4],
        width = width
    );
}

/// Print every marked file, grouped by directory.
fn print_file_list(plan: &DeletionPlan) {
    println!();
    for (directory, entries) in &plan.entries.iter().chunk_by(|e| e.raw.directory.clone()) {
        println!(" {}", directory.display());
        for file in entries.flat_map(|e| e.files()) {
            println!("   {:<40} {:>10}", file.file_name(), format_size(file.size));
        }
    }
}

/// Directory relative to the scan root, "." for the root itself.
fn display_directory(directory: &Path, root: &Path) -> String {
    match directory.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel.display().to_string(),
        Err(_) => directory.display().to_string(),
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Truncate a string to max length, keeping the end.
fn truncate(s: &str, max_len: usize) -> String {
    let len = s.chars().count();
    if len <= max_len {
        s.to_string()
    } else {
        let tail: String = s.chars().skip(len - max_len + 1).collect();
        format!("…{tail}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_is_plan() {
        let cli = Cli::parse_from(["rawcull", "/photos", "--when", "raw-xmp"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.path, PathBuf::from("/photos"));
        assert_eq!(cli.select.when, vec![DeletionCase::RawXmp]);
    }

    #[test]
    fn test_delete_flags() {
        let cli = Cli::parse_from([
            "rawcull", "delete", "/photos", "--permanent", "--yes", "-w", "raw-only", "-w",
            "raw-jpeg", "-x", "*.cache",
        ]);
        match cli.command {
            Some(Command::Delete {
                path,
                select,
                remove,
            }) => {
                assert_eq!(path, PathBuf::from("/photos"));
                assert!(remove.permanent);
                assert!(remove.yes);
                assert_eq!(select.when, vec![DeletionCase::RawOnly, DeletionCase::RawJpeg]);
                assert_eq!(select.exclude, vec!["*.cache".to_string()]);
            }
            _ => panic!("expected delete"),
        }
    }

    #[test]
    fn test_flags_override_settings() {
        let settings = Settings::default();
        let select = SelectArgs {
            when: vec![DeletionCase::RawXmpJpeg],
            ..Default::default()
        };
        let policy = resolve_policy(&select, &settings);
        assert_eq!(policy.codes().map(|c| c.value()).collect::<Vec<_>>(), vec![3]);

        let policy = resolve_policy(&SelectArgs::default(), &settings);
        assert_eq!(policy, DeletionPolicy::default());
    }

    #[test]
    fn test_mode_resolution() {
        let remove = RemoveArgs {
            permanent: false,
            yes: false,
            recovery_file: None,
        };
        let mut settings = Settings::default();
        assert_eq!(resolve_mode(&remove, &settings), DeletionMode::Trash);
        settings.use_trash = false;
        assert_eq!(resolve_mode(&remove, &settings), DeletionMode::Permanent);
        assert_eq!(
            resolve_recovery_file(&remove, &settings),
            PathBuf::from("files-to-delete.txt")
        );
    }

    #[test]
    fn test_display_directory() {
        let root = Path::new("/photos");
        assert_eq!(display_directory(Path::new("/photos"), root), ".");
        assert_eq!(display_directory(Path::new("/photos/2024/a"), root), "2024/a");
        assert_eq!(display_directory(Path::new("/other"), root), "/other");
    }

    #[test]
    fn test_truncate_keeps_end() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "…ghij");
    }
}
