mod compare;
mod config;
mod diff;
mod filter;
mod snapshot;
mod watch;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use compare::{compare_bodies, compare_snapshots, CompareOptions, Comparison};
use config::{OrgDiffConfig, OutputFormat};
use filter::{apply_filter, parse_filter_expr, FilterRule};
use snapshot::{load_snapshot, ArtifactKind};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use watch::{SnapshotWatcher, WatchEvent};

/// Compare Apex classes and Aura bundles between two org snapshots
#[derive(Parser)]
#[command(name = "orgdiff", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Header label for the left (main org) column
    #[arg(long, global = true)]
    left_label: Option<String>,

    /// Header label for the right (secondary org) column
    #[arg(long, global = true)]
    right_label: Option<String>,

    /// Filter expression over artifact names and status (e.g. '+Account*,-*Test,+changed')
    #[arg(long, global = true)]
    filter: Option<String>,

    /// Output format (defaults to the configured format, html otherwise)
    #[arg(long, value_enum, global = true)]
    format: Option<OutputFormat>,

    /// Write output to a file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Re-run the comparison whenever a snapshot directory changes
    #[arg(long, global = true)]
    watch: bool,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Compare two text files
    Files { left: PathBuf, right: PathBuf },
    /// Compare the Apex classes of two snapshot directories
    Classes { left: PathBuf, right: PathBuf },
    /// Compare the Aura definitions of two snapshot directories
    Aura { left: PathBuf, right: PathBuf },
    /// Render a pre-computed JSON span list ('-' reads stdin)
    Spans { file: PathBuf },
}

/// Everything a single comparison run needs, resolved from CLI and config
struct RunSettings {
    options: CompareOptions,
    rules: Vec<FilterRule>,
    format: OutputFormat,
    output: Option<PathBuf>,
    excluded_aura_types: Vec<String>,
}

impl RunSettings {
    fn resolve(cli: &Cli, config: &OrgDiffConfig) -> Self {
        Self {
            options: CompareOptions {
                left_label: cli.left_label.clone().or_else(|| config.labels.left.clone()),
                right_label: cli.right_label.clone().or_else(|| config.labels.right.clone()),
                timeout: config.diff.timeout(),
            },
            rules: cli
                .filter
                .as_deref()
                .map(parse_filter_expr)
                .unwrap_or_default(),
            format: cli.format.unwrap_or(config.output.format),
            output: cli.output.clone(),
            excluded_aura_types: config.snapshot.excluded_aura_types.clone(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let work_dir = std::env::current_dir().context("Failed to determine working directory")?;
    let config = config::load_config(&work_dir);
    let settings = RunSettings::resolve(&cli, &config);

    let watch_roots = match (&cli.command, cli.watch) {
        (_, false) => None,
        (Command::Classes { left, right } | Command::Aura { left, right }, true) => {
            Some([left, right])
        }
        _ => anyhow::bail!("--watch only applies to the classes and aura commands"),
    };

    let results = run(&cli.command, &settings)?;
    write_output(&results, &settings)?;

    if let Some(roots) = watch_roots {
        watch_loop(&cli.command, &settings, &roots, config.watch.debounce_ms)?;
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
}

/// Run one comparison for the selected command
fn run(command: &Command, settings: &RunSettings) -> Result<Vec<Comparison>> {
    let results = match command {
        Command::Files { left, right } => {
            let left_body = read_text(left)?;
            let right_body = read_text(right)?;
            let name = left
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| left.display().to_string());
            vec![compare_bodies(&name, &left_body, &right_body, &settings.options)]
        }
        Command::Classes { left, right } => {
            return compare_dirs(left, right, ArtifactKind::ApexClass, settings);
        }
        Command::Aura { left, right } => {
            return compare_dirs(left, right, ArtifactKind::Aura, settings);
        }
        Command::Spans { file } => {
            let input = if file.as_os_str() == "-" {
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read spans from stdin")?;
                buf
            } else {
                read_text(file)?
            };
            let spans = diff::parse_spans_json(&input)
                .with_context(|| format!("Invalid span list in {}", file.display()))?;
            let name = file.display().to_string();
            vec![Comparison::from_spans(&name, &spans, &settings.options)]
        }
    };

    Ok(results
        .into_iter()
        .filter(|c| apply_filter(&settings.rules, c))
        .collect())
}

fn compare_dirs(
    left: &Path,
    right: &Path,
    kind: ArtifactKind,
    settings: &RunSettings,
) -> Result<Vec<Comparison>> {
    let left_artifacts = load_snapshot(left, kind, &settings.excluded_aura_types)?;
    let right_artifacts = load_snapshot(right, kind, &settings.excluded_aura_types)?;
    Ok(compare_snapshots(
        &left_artifacts,
        &right_artifacts,
        &settings.rules,
        &settings.options,
    ))
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Serialize results in the requested format
fn format_results(results: &[Comparison], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(results)?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Html => Ok(results
            .iter()
            .map(|c| {
                format!(
                    "<div class=\"artifact\" data-name=\"{}\">{}</div>\n",
                    diff::escape_html(&c.name),
                    c.result_html
                )
            })
            .collect()),
    }
}

fn write_output(results: &[Comparison], settings: &RunSettings) -> Result<()> {
    let rendered = format_results(results, settings.format)?;
    match &settings.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote {} results to {}", results.len(), path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Block on snapshot changes, re-running the comparison after each batch
fn watch_loop(
    command: &Command,
    settings: &RunSettings,
    roots: &[&PathBuf; 2],
    debounce_ms: u64,
) -> Result<()> {
    let (tx, rx) = mpsc::channel::<WatchEvent>();
    let root_paths: Vec<&Path> = roots.iter().map(|p| p.as_path()).collect();
    let _watcher = SnapshotWatcher::new(&root_paths, debounce_ms, tx)?;

    for WatchEvent::FilesChanged(paths) in rx {
        log::info!(
            "{} file{} changed, comparing again",
            paths.len(),
            if paths.len() == 1 { "" } else { "s" }
        );
        // A half-written snapshot can fail to load; the next change retries
        match run(command, settings) {
            Ok(results) => write_output(&results, settings)?,
            Err(e) => log::error!("Comparison failed: {:#}", e),
        }
    }
    Ok(())
}
