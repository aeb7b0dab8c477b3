//! proxy-fallback
//!
//! Operator CLI for a fallback proxy group.
//!
//! # Architecture Overview
//!
//! ```text
//!   config.toml ──▶ config (load, validate, resolve)
//!                        │
//!                        ▼
//!               ┌─────────────────┐   tick    ┌──────────────┐
//!               │  FallbackGroup  │◀─────────│   scheduler   │
//!               │  candidates[]   │  flags    │ probe passes  │
//!               └────────┬────────┘◀─────────└──────────────┘
//!                        │ dial(metadata)
//!                        ▼
//!            first valid candidate ──▶ upstream proxy ──▶ target
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use proxy_fallback::config::loader::load_config;
use proxy_fallback::lifecycle::signals::wait_for_shutdown_signal;
use proxy_fallback::lifecycle::startup::build_fallback_group;
use proxy_fallback::observability::{logging, metrics};
use proxy_fallback::Metadata;

#[derive(Parser)]
#[command(name = "proxy-fallback")]
#[command(about = "Fallback proxy group: probe upstreams and dial through the first reachable one", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "PROXY_FALLBACK_CONFIG", default_value = "proxy-fallback.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe every upstream once and print the group status as JSON
    Status,
    /// Keep probing in the background and log active upstream changes
    Watch,
    /// Open one connection through the group
    Dial {
        /// Target as host:port
        target: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    logging::init_tracing(&config.observability)?;

    tracing::info!(
        config = %cli.config.display(),
        group = %config.fallback.name,
        proxies = config.fallback.proxies.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let group = build_fallback_group(&config)?;

    match cli.command {
        Commands::Status => {
            group.probe_now().await;
            println!("{}", serde_json::to_string_pretty(&group.status())?);
        }
        Commands::Watch => {
            let mut ticker = tokio::time::interval(Duration::from_secs(1));
            let mut last = String::new();
            let signal = wait_for_shutdown_signal();
            tokio::pin!(signal);

            loop {
                tokio::select! {
                    _ = &mut signal => break,
                    _ = ticker.tick() => {
                        let now = group.now();
                        if now != last {
                            tracing::info!(group = %group.name(), now = %now, "Active upstream");
                            last = now.to_string();
                        }
                    }
                }
            }
        }
        Commands::Dial { target } => {
            let metadata = Metadata::parse_addr(&target)?;
            let dialed = match group.dial_via(&metadata).await {
                Ok((via, _conn)) => {
                    println!("connected to {} via {}", metadata, via);
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(target = %metadata, error = %e, "Dial failed");
                    Err(e)
                }
            };
            println!("{}", serde_json::to_string_pretty(&group.status())?);
            if let Err(e) = dialed {
                group.close();
                return Err(e.into());
            }
        }
    }

    group.close();
    tracing::info!("Shutdown complete");
    Ok(())
}
