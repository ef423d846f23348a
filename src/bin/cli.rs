//! chanauth CLI
//!
//! Batch and single-channel entry points for the token pipeline.

use std::path::PathBuf;

use chanauth::{
    error::{AppError, Result},
    models::Config,
    pipeline,
    services::{CurlProber, HttpFetcher, StatusClassifier},
    storage::LocalStorage,
};
use clap::{Parser, Subcommand};

/// chanauth - Channel auth token extractor
#[derive(Parser, Debug)]
#[command(
    name = "chanauth",
    version,
    about = "Extracts channel auth tokens and checks the resulting playback URLs"
)]

struct Cli {
    /// Directory holding config.toml, listing caches and output files
    #[arg(short, long, default_value = ".")]
    data_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List identifiers found in the listing caches
    Collect,

    /// Fetch and decode channel data into the record store
    Scrape,

    /// Generate auth URLs from the record store
    Synthesize,

    /// Probe every generated auth URL
    Probe {
        /// URL file (default: paths.urls_file)
        #[arg(long)]
        urls: Option<String>,
    },

    /// Run full pipeline: Scrape → Synthesize → Probe
    Pipeline,

    /// Strict run for a single channel
    Manual {
        /// Channel identifier; prompts when omitted
        #[arg(long)]
        id: Option<u64>,
    },

    /// Validate configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.data_dir.join("config.toml");
    let config = if config_path.exists() {
        Config::load_or_default(&config_path)
    } else {
        log::debug!("No config at {}, using defaults", config_path.display());
        Config::default()
    };

    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }

    let storage = LocalStorage::new(&cli.data_dir);
    log::info!("Data directory: {}", storage.root().display());

    match cli.command {
        Command::Collect => {
            let ids = pipeline::run_collect(&config, &storage).await?;
            for id in ids {
                println!("{id}");
            }
        }

        Command::Scrape => {
            let fetcher = HttpFetcher::new(config.fetch.clone())?;
            pipeline::run_scrape(&config, &storage, &fetcher).await?;
        }

        Command::Synthesize => {
            pipeline::run_synthesize(
                &config,
                &storage,
                &config.paths.keys_file,
                &config.paths.urls_file,
            )
            .await?;
        }

        Command::Probe { urls } => {
            let urls_file = urls.unwrap_or_else(|| config.paths.urls_file.clone());
            let prober = CurlProber::new(&config.probe);
            pipeline::run_probe(
                &config,
                &storage,
                &urls_file,
                &prober,
                StatusClassifier::from_config(&config.probe),
            )
            .await?;
        }

        Command::Pipeline => {
            let fetcher = HttpFetcher::new(config.fetch.clone())?;
            let prober = CurlProber::new(&config.probe);
            pipeline::run_pipeline(&config, &storage, &fetcher, &prober).await?;
        }

        Command::Manual { id } => {
            let id = match id {
                Some(id) => id,
                None => pipeline::prompt_identifier().await.inspect_err(|e| {
                    log::error!("{e}. Exiting.");
                })?,
            };
            let fetcher = HttpFetcher::new(config.fetch.clone())?;
            let prober = CurlProber::new(&config.probe);
            pipeline::run_manual(&config, &storage, &fetcher, &prober, id).await?;
        }

        Command::Validate => {
            log::info!("✓ Config OK");
            log::info!("  Fetch endpoint: {}", config.fetch.endpoint_template);
            log::info!("  Auth endpoint: {}", config.auth.endpoint);
            log::info!(
                "  Probe host: {}",
                config
                    .probe_host()
                    .ok_or_else(|| AppError::config("no probe host"))?
            );
            log::info!("  Listing files: {}", config.paths.listing_files.join(", "));
        }
    }

    log::info!("Done!");

    Ok(())
}
