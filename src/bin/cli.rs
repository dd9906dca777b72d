//! snaptrack CLI
//!
//! Records JSON observations of sources and reports what changed.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use snaptrack::{
    config::{self, DEFAULT_CONFIG_FILE},
    error::{AppError, Result},
    models::{CompareResult, Config},
    pipeline,
    services::SnapshotTracker,
    utils::{load_content, report},
};

/// snaptrack - Content Change Tracker
#[derive(Parser, Debug)]
#[command(
    name = "snaptrack",
    version,
    about = "Track structured content per source and report what changed"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Directory holding persisted snapshots (overrides the config file)
    #[arg(short, long)]
    storage_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a JSON observation of a source and report changes
    Observe {
        /// Source identifier, typically a URL
        source: String,
        /// JSON file holding the observed content
        file: PathBuf,
    },

    /// Diff two JSON files
    Diff {
        old: PathBuf,
        new: PathBuf,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the stored history of a source
    History { source: String },

    /// Compare two stored snapshots of a source by index
    Compare {
        source: String,
        a: usize,
        b: usize,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the similarity of two strings
    Similarity { a: String, b: String },

    /// List sources with stored snapshots
    Sources,

    /// Delete stored snapshots of one source, or of all sources
    Clear {
        /// Source to clear; all sources if omitted
        source: Option<String>,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn print_result(title: &str, result: &CompareResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        report::changes(title, result);
    }
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::load_all(&cli.config, cli.storage_dir.clone());
    let level = config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(cli.verbose, &level);

    let config: Config = match config {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            return Err(e);
        }
    };
    log::debug!("Using configuration {:?}", config);

    let tracker = SnapshotTracker::new(config.tracker.clone())?;

    match cli.command {
        Command::Observe { source, file } => {
            let content = load_content(&file)?;
            tracker.load_snapshots(&source).await?;

            let observation = tracker.observe(&source, content).await?;
            report::header(&format!("Observed {}", source));
            match &observation.changes {
                Some(result) => report::changes("Changes since last snapshot", result),
                None => report::sub_item("First snapshot of this source"),
            }
            report::summary(
                "Snapshot",
                &[
                    ("changed", observation.changed.to_string()),
                    ("hash", observation.snapshot.short_hash().to_string()),
                    ("history", tracker.history_len(&source).await.to_string()),
                ],
            );
        }

        Command::Diff { old, new, json } => {
            let old = load_content(&old)?;
            let new = load_content(&new)?;
            let result = CompareResult::from_changes(pipeline::diff(&old, &new));
            print_result("Diff", &result, json)?;
        }

        Command::History { source } => {
            let loaded = tracker.load_snapshots(&source).await?;
            report::header(&format!("History of {}", source));
            if loaded == 0 {
                log::warn!("No snapshots stored for {}", source);
            }
            for (index, snapshot) in tracker.get_snapshots(&source).await.iter().enumerate() {
                report::sub_item(&report::snapshot_line(index, snapshot));
            }
        }

        Command::Compare { source, a, b, json } => {
            tracker.load_snapshots(&source).await?;
            let Some(result) = tracker.compare_snapshots(&source, a, b).await else {
                let len = tracker.history_len(&source).await;
                return Err(AppError::validation(format!(
                    "{} has {} snapshots; cannot compare #{} with #{}",
                    source, len, a, b
                )));
            };
            print_result(&format!("#{} -> #{}", a, b), &result, json)?;
        }

        Command::Similarity { a, b } => {
            println!("{:.4}", pipeline::string_similarity(&a, &b));
        }

        Command::Sources => {
            tracker.load_all().await?;
            for source in tracker.get_tracked_urls().await {
                let count = tracker.history_len(&source).await;
                println!("{}\t{}", count, source);
            }
        }

        Command::Clear { source } => match source {
            Some(source) => {
                tracker.clear(&source).await?;
                log::info!("Cleared history of {}", source);
            }
            None => {
                tracker.clear_all().await?;
                log::info!("Cleared all histories");
            }
        },

        Command::Validate => {
            log::info!("Validating configuration...");
            log::info!("✓ Config OK");
            report::summary(
                "Configuration",
                &[
                    ("file", cli.config.display().to_string()),
                    ("max_snapshots", config.tracker.max_snapshots.to_string()),
                    (
                        "storage_dir",
                        config
                            .tracker
                            .storage_dir
                            .as_ref()
                            .map(|d| d.display().to_string())
                            .unwrap_or_default(),
                    ),
                    ("log_level", config.logging.level.clone()),
                ],
            );
        }
    }

    Ok(())
}
