//! # carousel
//!
//! CLI tool for the live carousel.
//!
//! ## Commands
//!
//! - `replay`: Feed an initial collection and a recorded event stream
//!   through the carousel engine and print the final view state
//! - `config`: Validate a configuration file and print the effective values
//!
//! ## Example
//!
//! ```bash
//! # Replay a capture, printing one line per step
//! carousel replay --initial items.json --events capture.jsonl --trace
//!
//! # Let autoplay run for ten seconds after the last event
//! carousel replay --events capture.jsonl --until 10000
//!
//! # Check a config file
//! carousel --config carousel.toml config
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use live_carousel_client::ClientConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{config, replay};

/// CLI tool for the live carousel.
#[derive(Parser, Debug)]
#[command(name = "carousel")]
#[command(version, about, long_about = None)]
struct Cli {
    /// TOML configuration file (with a [carousel] table)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a recorded event stream through the engine
    Replay {
        /// JSON-lines file of channel messages and inputs
        #[arg(long, short)]
        events: PathBuf,

        /// JSON array of items returned by the initial fetch
        #[arg(long, short)]
        initial: Option<PathBuf>,

        /// Keep the clock running until this many milliseconds
        #[arg(long)]
        until: Option<u64>,

        /// Print one JSON line per step before the final snapshot
        #[arg(long)]
        trace: bool,
    },

    /// Validate configuration and print the effective values
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = ClientConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Replay {
            events,
            initial,
            until,
            trace,
        } => {
            replay::run(&settings.carousel, &events, initial.as_deref(), until, trace).await?;
        }
        Commands::Config => {
            config::run(&settings)?;
        }
    }

    Ok(())
}
