//! # dotenv-manager
//!
//! Terminal editor that switches `.env` variables between alternative values
//! without disturbing anything else in the file.
//!
//! ```text
//! main_entry
//!     │
//!     ├──> --list   ─> rows() ─> stdout (plain or JSON)
//!     │
//!     └──> runtime::run
//!            ├─> FileWatcher ─────┐
//!            ├─> input thread ────┼─> Session::update ─> Effects ─> tasks
//!            └─> Screen <─ view ──┘
//! ```

use anyhow::{bail, Context as AnyhowContext, Result};
use clap::Parser;
use config::{debounce_from, SessionConfig, DEBOUNCE_ENV, DEFAULT_ENV_FILE};
use dotenv_document::{rows, Parsed, Row, RowKind};
use serde::Serialize;
use std::env;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

pub mod config;
mod frontend;
mod runtime;
pub mod session;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "dotenv-manager")]
#[command(about = "Switch .env variables between alternative values", long_about = None)]
#[command(version)]
struct Cli {
    /// Environment file to edit
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, conflicts_with = "verbose")]
    quiet: bool,

    /// Write logs to this file (interactive sessions log nowhere otherwise)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Quiet period before an external change is acted on (overrides DOTENV_MANAGER_DEBOUNCE_MS)
    #[arg(long, value_name = "MS")]
    debounce_ms: Option<u64>,

    /// Do not watch the file for external changes
    #[arg(long)]
    no_watch: bool,

    /// Print variable groups and exit
    #[arg(long)]
    list: bool,

    /// Emit JSON instead of text (with --list)
    #[arg(long, requires = "list")]
    json: bool,
}

#[derive(Serialize)]
struct ListOutput<'a> {
    path: String,
    groups: usize,
    rows: &'a [Row],
    warnings: Vec<String>,
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let path = cli
        .file
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ENV_FILE));
    if let Err(err) = tokio::fs::metadata(&path).await {
        if err.kind() == io::ErrorKind::NotFound {
            bail!("file not found: {}", path.display());
        }
        return Err(err).with_context(|| format!("cannot access {}", path.display()));
    }
    let parsed = dotenv_document::load(&path)
        .await
        .with_context(|| format!("Error parsing file {}", path.display()))?;

    if cli.list {
        return print_listing(&path, &parsed, cli.json);
    }

    let env_debounce = env::var(DEBOUNCE_ENV).ok();
    let debounce = debounce_from(cli.debounce_ms, env_debounce.as_deref())?;
    if !console::Term::stdout().is_term() {
        bail!("stdout is not a terminal; use --list to print the variable groups");
    }

    let config = SessionConfig::new(path, !cli.no_watch, debounce);
    runtime::run(config, parsed).await
}

/// `--list` logs to stderr. The interactive screen owns the terminal, so it
/// only logs when given a file.
fn init_logging(cli: &Cli) -> Result<()> {
    let target = if cli.list {
        env_logger::Target::Stderr
    } else if let Some(log_file) = &cli.log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .with_context(|| format!("failed to open log file {}", log_file.display()))?;
        env_logger::Target::Pipe(Box::new(file))
    } else {
        return Ok(());
    };

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(target).init();
    Ok(())
}

fn print_listing(path: &Path, parsed: &Parsed, json: bool) -> Result<()> {
    let rows = rows(&parsed.document);
    if json {
        let output = ListOutput {
            path: path.display().to_string(),
            groups: parsed.document.groups().len(),
            rows: &rows,
            warnings: parsed.warnings.iter().map(ToString::to_string).collect(),
        };
        let text = serde_json::to_string_pretty(&output).context("failed to encode listing")?;
        return print_stdout(&text);
    }

    let text = rows
        .iter()
        .map(|row| match row.kind {
            RowKind::Header { .. } => {
                format!("[{}] {}", if row.active { "x" } else { " " }, row.text)
            }
            RowKind::Member { .. } => {
                format!("    {} {}", if row.checked { "*" } else { " " }, row.text)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    print_stdout(&text)
}
