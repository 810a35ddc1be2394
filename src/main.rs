use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rift_insights::calculate::{self, PlayerAnalysis};
use rift_insights::config::AppConfig;
use rift_insights::ingest::IngestPolicy;
use rift_insights::models::{GameRecord, HighlightRow};
use rift_insights::storage::csv::{load_games, load_reference_set, write_reference_set};
use rift_insights::storage::jsonl::{write_analysis, JsonlReader, OutputTable};
use rift_insights::storage::parquet::ParquetWriter;
use rift_insights::storage::StorageConfig;

#[derive(Parser)]
#[command(name = "rift-insights")]
#[command(about = "Match-history statistics compared against a reference population")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Jsonl,
    Parquet,
    All,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse one player's games against the reference tables
    Analyze {
        /// Player identifier; games are read from <data-dir>/games/<player>.csv
        player: String,

        /// Read games from this file instead
        #[arg(long)]
        games: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "all")]
        format: OutputFormat,

        /// Skip rows that fail to parse instead of aborting
        #[arg(long)]
        skip_invalid: bool,
    },

    /// Build reference tables from every game file in the games directory
    BuildReference {
        /// Directory of raw game files (defaults to <data-dir>/games)
        #[arg(long)]
        games_dir: Option<PathBuf>,

        /// Write tables here instead of <data-dir>/reference
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Skip rows that fail to parse instead of aborting
        #[arg(long)]
        skip_invalid: bool,
    },

    /// Check that a game file parses
    Validate {
        /// Raw game file
        path: PathBuf,
    },

    /// Print the highlights saved by a previous `analyze`
    Highlights {
        /// Player identifier
        player: String,
    },

    /// Print the effective configuration
    Config,
}

/// JSON document written by `analyze`.
#[derive(Serialize)]
struct AnalysisReport<'a> {
    player: &'a str,
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    analysis: &'a PlayerAnalysis,
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = if cli.config.exists() {
        AppConfig::from_file(&cli.config)
            .with_context(|| format!("Failed to load config from {:?}", cli.config))?
    } else {
        AppConfig::default()
    };

    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    Ok(config)
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn policy(skip_invalid: bool) -> IngestPolicy {
    if skip_invalid {
        IngestPolicy::SkipInvalid
    } else {
        IngestPolicy::FailFast
    }
}

fn read_games(path: &Path, policy: IngestPolicy) -> Result<Vec<GameRecord>> {
    let result = load_games(path, policy)
        .with_context(|| format!("Failed to load games from {:?}", path))?;
    if !result.skipped.is_empty() {
        warn!(
            "Skipped {} of {} rows in {:?}",
            result.skipped.len(),
            result.total_rows(),
            path
        );
    }
    Ok(result.records)
}

fn game_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {:?}", dir))? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "csv") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn print_highlights(highlights: &[HighlightRow]) {
    for highlight in highlights {
        println!(
            "  {:<6} {} {} {} ({})",
            highlight.direction,
            highlight.row.key.champion.as_deref().unwrap_or("-"),
            highlight.row.key.position,
            highlight.row.column,
            if highlight.row.key.win { "win" } else { "loss" }
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    init_tracing(&config.log_level, cli.json_logs);
    info!("Starting rift-insights v{}", env!("CARGO_PKG_VERSION"));

    let storage = StorageConfig::new(config.data_dir.clone());

    match cli.command {
        Commands::Analyze {
            player,
            games,
            format,
            skip_invalid,
        } => {
            let games_path = games.unwrap_or_else(|| storage.games_path(&player));
            let records = read_games(&games_path, policy(skip_invalid))?;

            let reference = load_reference_set(&storage.reference_dir(), &config.reference)?;
            if reference.stats.is_empty() {
                warn!("No reference statistics found; comparisons will be empty");
            }

            let analysis = calculate::analyze(&records, &reference, &config.analysis)?;

            let out_dir = storage.player_output_dir(&player);
            if matches!(format, OutputFormat::Json | OutputFormat::All) {
                fs::create_dir_all(&out_dir)?;
                let report = AnalysisReport {
                    player: &player,
                    generated_at: Utc::now(),
                    analysis: &analysis,
                };
                let path = out_dir.join("analysis.json");
                fs::write(&path, serde_json::to_string_pretty(&report)?)?;
                debug!("Wrote {:?}", path);
            }
            if matches!(format, OutputFormat::Jsonl | OutputFormat::All) {
                write_analysis(&storage, &player, &analysis)?;
            }
            if matches!(format, OutputFormat::Parquet | OutputFormat::All) {
                let writer = ParquetWriter::new(storage.clone());
                writer.write_comparisons(&player, &analysis.stats)?;
                writer.write_durations(&player, &analysis.durations)?;
            }

            println!(
                "Analysed {} games of {} (queue {})",
                analysis.games_analyzed, player, analysis.queue_id
            );
            println!("  Statistics: {}", analysis.stats.len());
            print_highlights(&analysis.highlights);
            println!("Output written to {:?}", out_dir);
        }

        Commands::BuildReference {
            games_dir,
            out_dir,
            skip_invalid,
        } => {
            let games_dir = games_dir.unwrap_or_else(|| storage.games_dir());
            let files = game_files(&games_dir)?;
            if files.is_empty() {
                bail!("No game files found in {:?}", games_dir);
            }

            let mut records = Vec::new();
            for path in &files {
                records.extend(read_games(path, policy(skip_invalid))?);
            }
            info!("Loaded {} records from {} files", records.len(), files.len());

            let reference = calculate::build_reference(&records, &config.analysis)?;
            let out_dir = out_dir.unwrap_or_else(|| storage.reference_dir());
            write_reference_set(&out_dir, &config.reference, &reference)?;

            println!(
                "Built {} reference rows from {} records into {:?}",
                reference.stats.len(),
                records.len(),
                out_dir
            );
        }

        Commands::Validate { path } => {
            let result = load_games(&path, IngestPolicy::SkipInvalid)?;
            println!(
                "{}: {} rows, {} valid",
                path.display(),
                result.total_rows(),
                result.records.len()
            );
            for (index, error) in &result.skipped {
                println!("  line {}: {}", index + 1, error);
            }
            if !result.skipped.is_empty() {
                bail!("{} invalid rows", result.skipped.len());
            }
        }

        Commands::Highlights { player } => {
            let reader: JsonlReader<HighlightRow> =
                JsonlReader::for_table(&storage, OutputTable::Highlights, &player);
            if !reader.exists() {
                bail!("No saved analysis for {}; run `analyze` with --format jsonl first", player);
            }

            let highlights = reader.read_all()?;
            println!("{} highlights for {}", highlights.len(), player);
            print_highlights(&highlights);
        }

        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
