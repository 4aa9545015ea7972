//! Cache way partitioning advisor CLI.
//!
//! This binary reads one JSON analysis document and performs:
//! 1. **Analyze:** Run the configured searches over every interval and print
//!    the JSON report, optionally followed by statistics sections on stderr.
//! 2. **Profiles:** Print the capacity profiles for external plotting.
//!
//! Log output goes to stderr and is controlled by `RUST_LOG` (default `warn`).

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

use waysplit_core::AnalysisDocument;
use waysplit_core::common::{ProfileId, StackKind, ThreadId};
use waysplit_core::config::{SearchMode, StackMode};
use waysplit_core::stats::{AnalysisStats, STATS_SECTIONS};

#[derive(Parser, Debug)]
#[command(
    name = "waysplit",
    author,
    version,
    about = "Reuse-distance driven cache way partitioning advisor",
    long_about = "Decide how to split the ways of a shared cache between threads from per-thread reuse-distance histograms.\n\nExamples:\n  waysplit analyze run.json --stack-mode hybrid --stats\n  waysplit analyze run.json --search-mode both --compact\n  waysplit profiles run.json --thread 0 --interval 3"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze every interval of a document and print the JSON report.
    Analyze {
        /// Analysis document (JSON).
        input: PathBuf,

        /// Override the document's stack mode.
        #[arg(long, value_enum)]
        stack_mode: Option<StackModeArg>,

        /// Override the document's search mode.
        #[arg(long, value_enum)]
        search_mode: Option<SearchModeArg>,

        /// Print statistics to stderr; optionally restrict to the named sections.
        #[arg(
            long,
            num_args = 0..,
            value_parser = clap::builder::PossibleValuesParser::new(STATS_SECTIONS.iter().copied())
        )]
        stats: Option<Vec<String>>,

        /// Print the report on a single line.
        #[arg(long)]
        compact: bool,
    },

    /// Print capacity profiles as JSON.
    Profiles {
        /// Analysis document (JSON).
        input: PathBuf,

        /// Only this thread.
        #[arg(long)]
        thread: Option<ThreadId>,

        /// Only this interval.
        #[arg(long)]
        interval: Option<ProfileId>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StackModeArg {
    Private,
    Shared,
    Hybrid,
}

impl From<StackModeArg> for StackMode {
    fn from(arg: StackModeArg) -> Self {
        match arg {
            StackModeArg::Private => Self::Private,
            StackModeArg::Shared => Self::Shared,
            StackModeArg::Hybrid => Self::Hybrid,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SearchModeArg {
    Heuristic,
    Exhaustive,
    Both,
}

impl From<SearchModeArg> for SearchMode {
    fn from(arg: SearchModeArg) -> Self {
        match arg {
            SearchModeArg::Heuristic => Self::Heuristic,
            SearchModeArg::Exhaustive => Self::Exhaustive,
            SearchModeArg::Both => Self::Both,
        }
    }
}

/// One capacity profile as printed by `profiles`.
#[derive(Serialize, Debug)]
struct ProfileRow<'a> {
    thread: ThreadId,
    interval: ProfileId,
    stack: StackKind,
    labels: &'a [String],
    counts: &'a [u64],
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Analyze {
            input,
            stack_mode,
            search_mode,
            stats,
            compact,
        } => cmd_analyze(&input, stack_mode, search_mode, stats.as_deref(), compact),
        Commands::Profiles {
            input,
            thread,
            interval,
        } => cmd_profiles(&input, thread, interval),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn load_document(path: &Path) -> Result<AnalysisDocument, Box<dyn Error>> {
    let file = File::open(path).map_err(|e| format!("cannot open {}: {e}", path.display()))?;
    let document = AnalysisDocument::from_reader(BufReader::new(file))
        .map_err(|e| format!("cannot parse {}: {e}", path.display()))?;
    info!(
        path = %path.display(),
        histograms = document.histograms.len(),
        "loaded analysis document"
    );
    Ok(document)
}

fn write_json<T: Serialize>(value: &T, compact: bool) -> Result<(), Box<dyn Error>> {
    let mut out = io::stdout().lock();
    if compact {
        serde_json::to_writer(&mut out, value)?;
    } else {
        serde_json::to_writer_pretty(&mut out, value)?;
    }
    writeln!(out)?;
    Ok(())
}

/// Runs the analysis; CLI mode flags take precedence over the document.
fn cmd_analyze(
    input: &Path,
    stack_mode: Option<StackModeArg>,
    search_mode: Option<SearchModeArg>,
    stats: Option<&[String]>,
    compact: bool,
) -> Result<(), Box<dyn Error>> {
    let mut document = load_document(input)?;
    if let Some(mode) = stack_mode {
        document.config.stack_mode = mode.into();
    }
    if let Some(mode) = search_mode {
        document.config.search_mode = mode.into();
    }

    let analyzer = document.analyzer()?;
    let store = document.store()?;
    let report = analyzer.analyze(&store)?;
    write_json(&report, compact)?;

    if let Some(sections) = stats {
        AnalysisStats::from_report(&report).print_sections(sections);
    }
    Ok(())
}

/// Prints capacity profiles, optionally restricted to one thread or interval.
fn cmd_profiles(
    input: &Path,
    thread: Option<ThreadId>,
    interval: Option<ProfileId>,
) -> Result<(), Box<dyn Error>> {
    let document = load_document(input)?;
    let store = document.store()?;
    if let Some(t) = thread.filter(|&t| t >= store.num_threads()) {
        return Err(format!("thread {t} out of range for {} threads", store.num_threads()).into());
    }
    let labels = store.boundaries().labels();

    let mut rows = Vec::new();
    for t in 0..store.num_threads() {
        if thread.is_some_and(|wanted| wanted != t) {
            continue;
        }
        for i in store.intervals() {
            if interval.is_some_and(|wanted| wanted != i) {
                continue;
            }
            for stack in [StackKind::Private, StackKind::Shared] {
                if let Ok(profile) = store.profile(t, i, stack) {
                    rows.push(ProfileRow {
                        thread: t,
                        interval: i,
                        stack,
                        labels,
                        counts: profile.counts(),
                    });
                }
            }
        }
    }

    write_json(&rows, false)
}
