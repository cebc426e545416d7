//! ipmap-proxy
//!
//! Classifies client addresses against ordered IP/subnet rules and exposes
//! the results as lazily resolved placeholders in rendered responses.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌────────────────────────────────────────────────┐
//!                      │                  IPMAP PROXY                    │
//!   Client Request     │  ┌────────┐   ┌─────────────┐   ┌───────────┐  │
//!   ───────────────────┼─▶│  http  │──▶│ placeholder │──▶│  response │──┼──▶ Client
//!                      │  │ server │   │  replacer   │   │ templates │  │
//!                      │  └───┬────┘   └──────┬──────┘   └───────────┘  │
//!                      │      │ load          │ on demand                │
//!                      │      ▼               ▼                          │
//!                      │  ┌────────┐   ┌─────────────┐                   │
//!                      │  │ArcSwap │──▶│   ipmap     │                   │
//!                      │  │Snapshot│   │ table+match │                   │
//!                      │  └───▲────┘   └─────────────┘                   │
//!                      │      │ swap                                     │
//!                      │  ┌───┴────┐   ┌─────────────┐                   │
//!                      │  │ config │   │ observa-    │                   │
//!                      │  │watcher │   │ bility      │                   │
//!                      │  └────────┘   └─────────────┘                   │
//!                      └────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use ipmap_proxy::config::loader::{load_config, ConfigError};
use ipmap_proxy::lifecycle::startup;

#[derive(Parser)]
#[command(name = "ipmap-proxy")]
#[command(about = "Maps client IPs and subnets to request placeholders", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve requests
    Run {
        /// Configuration file (TOML, or JSON with a .json extension)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Check a configuration file and report every problem
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => match startup::run(config.as_deref()).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("ipmap-proxy: {e}");
                ExitCode::FAILURE
            }
        },
        Commands::Validate { config } => match load_config(&config) {
            Ok(cfg) => {
                println!(
                    "{}: ok ({} ipmaps, {} mappings)",
                    config.display(),
                    cfg.ipmaps.len(),
                    cfg.ipmaps.iter().map(|m| m.mappings.len()).sum::<usize>()
                );
                ExitCode::SUCCESS
            }
            Err(ConfigError::Validation(errors)) => {
                for error in &errors {
                    eprintln!("{}: {}", config.display(), error);
                }
                ExitCode::FAILURE
            }
            Err(e) => {
                eprintln!("{}: {}", config.display(), e);
                ExitCode::FAILURE
            }
        },
    }
}
