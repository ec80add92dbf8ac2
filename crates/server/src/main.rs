//! SRI - confidence-gated product recommendations
//!
//! Serves the HTTP API and form, or runs a single analysis from the
//! command line.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sri_core::{ProfileInput, ValidationErrors};
use sri_server::config::ProducerBackend;
use sri_server::{cli, router, AppState, ServiceConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sri")]
#[command(about = "Product recommendations with human review for low-confidence judgments", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file
    #[arg(short, long, env = "SRI_CONFIG")]
    config: Option<PathBuf>,

    /// Groq API key
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Force the simulated producer regardless of configuration
    #[arg(long)]
    simulated: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Override the configured bind address
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Analyze one profile and print the decision as JSON
    Analyze {
        /// Client name
        #[arg(long, default_value = "Client Anonyme")]
        name: String,

        /// Client age
        #[arg(long)]
        age: i64,

        /// Activity sector
        #[arg(long)]
        sector: String,

        /// Free-text need
        #[arg(long)]
        need: String,
    },

    /// Print configuration and catalog
    Info,
}

fn init_logging(default_level: &str, to_stderr: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    if to_stderr {
        // Keep stdout clean for the JSON result
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let mut config = ServiceConfig::load(args.config.as_deref())?;
    if args.simulated {
        config.producer.backend = ProducerBackend::Simulated;
    }

    match args.command {
        Commands::Serve { bind } => {
            init_logging(&config.logging.level, false);
            if let Some(bind) = bind {
                config.server.bind = bind;
            }

            let state = AppState::from_config(&config, args.api_key.as_deref()).await?;
            info!(
                "Starting SRI on {} (producer: {}, threshold: {})",
                config.server.bind,
                state.gate().producer_name(),
                config.gate.threshold
            );

            let listener = tokio::net::TcpListener::bind(&config.server.bind)
                .await
                .with_context(|| format!("failed to bind {}", config.server.bind))?;
            axum::serve(listener, router(state))
                .with_graceful_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                    info!("Shutting down");
                })
                .await?;
        }

        Commands::Analyze { name, age, sector, need } => {
            init_logging(&config.logging.level, true);
            let input = ProfileInput::new(name, age, sector, need);
            match cli::analyze(&config, args.api_key.as_deref(), input).await {
                Ok(outcome) => println!("{}", serde_json::to_string_pretty(&outcome)?),
                Err(err) => {
                    if let Some(errors) = err.downcast_ref::<ValidationErrors>() {
                        eprintln!("{}", serde_json::to_string_pretty(errors)?);
                    }
                    return Err(err);
                }
            }
        }

        Commands::Info => {
            init_logging(&config.logging.level, false);
            print!("{}", cli::info(&config)?);
        }
    }

    Ok(())
}
