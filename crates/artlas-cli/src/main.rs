//! artlas CLI - Command-line interface
//!
//! Usage:
//!   artlas enrich <name>
//!   artlas batch <file> [-o report.json] [--delay-ms N] [--skip-existing]
//!   artlas check <name>

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use artlas_core::{open_repository, AppConfig, ArtistRepository, ArtistStore, LoggingConfig};
use artlas_pipeline::{
    read_names, ArtistEnricher, BatchOrchestrator, BatchReport, EnrichmentContext, ItemOutcome,
};

#[derive(Parser)]
#[command(name = "artlas")]
#[command(about = "Artist enrichment from public knowledge sources")]
#[command(version)]
struct Cli {
    /// TOML configuration file (environment variables take precedence)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enrich and store a single artist
    Enrich {
        /// Artist name
        name: String,
    },
    /// Enrich every name in a newline-separated file
    Batch {
        /// File of artist names
        file: PathBuf,

        /// Where to write the JSON report
        #[arg(short, long, default_value = "artist_results.json")]
        output: PathBuf,

        /// Delay between items in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Skip names already in the store
        #[arg(long)]
        skip_existing: bool,
    },
    /// Show a stored artist
    Check {
        /// Artist name or localized name
        name: String,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.level.as_str().into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_file(logging.include_location)
        .with_line_number(logging.include_location);

    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn orchestrator(
    config: &AppConfig,
    store: Arc<dyn ArtistRepository>,
) -> anyhow::Result<BatchOrchestrator> {
    let context = EnrichmentContext::from_config(config).context("Failed to build sources")?;
    Ok(BatchOrchestrator::new(
        ArtistEnricher::new(context),
        store,
        config.batch.clone(),
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_ref())?;
    init_tracing(&config.logging);

    match cli.command {
        Commands::Enrich { name } => {
            let store = open_repository(&config.database).await;
            let orchestrator = orchestrator(&config, store)?;

            match orchestrator.process(&name).await {
                ItemOutcome::Saved { artist, save } => {
                    println!(
                        "Saved '{}' ({}, {}, {})",
                        artist.record.name,
                        save.id(),
                        artist.classification.era,
                        artist.classification.copyright_status
                    );
                    Ok(ExitCode::SUCCESS)
                }
                ItemOutcome::Skipped => {
                    println!("'{name}' is already stored");
                    Ok(ExitCode::SUCCESS)
                }
                ItemOutcome::Failed { reason } => {
                    println!("Failed '{name}': {reason}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Batch {
            file,
            output,
            delay_ms,
            skip_existing,
        } => {
            let names = match read_names(&file).await {
                Ok(names) => names,
                Err(e) => {
                    eprintln!("File not found: {} ({e})", file.display());
                    return Ok(ExitCode::FAILURE);
                }
            };

            if let Some(delay_ms) = delay_ms {
                config.batch.delay_ms = delay_ms;
            }
            config.batch.skip_existing |= skip_existing;

            // store and source failures still end in a report
            let store = open_repository(&config.database).await;
            let report = match orchestrator(&config, store) {
                Ok(orchestrator) => orchestrator.run(&names).await,
                Err(e) => {
                    tracing::error!(error = %e, "Batch could not start");
                    BatchReport::all_failed(&names, &format!("{e:#}"))
                }
            };
            report
                .write_json(&output)
                .await
                .with_context(|| format!("Failed to write report to {}", output.display()))?;

            println!(
                "Processed {} artists: {} saved, {} failed, {} skipped ({}). Report: {}",
                report.total,
                report.successful.len(),
                report.failed.len(),
                report.skipped.len(),
                report.success_rate,
                output.display()
            );
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { name } => {
            let store = ArtistStore::connect(&config.database)
                .await
                .context("Failed to open artist store")?;

            match store.find_existing(&name).await? {
                Some(artist) => {
                    println!("{}", serde_json::to_string_pretty(&artist)?);
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    println!("'{name}' is not stored");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}
