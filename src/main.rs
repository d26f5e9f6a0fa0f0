//! UDP Datagram Load Balancer
//!
//! A caching, rate-limiting load balancer for opaque datagram queries,
//! built with Tokio.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌────────────────────────────────────────────────────┐
//!                      │                  UDP LOAD BALANCER                 │
//!                      │                                                    │
//!   Client Datagram    │  ┌──────────┐    ┌──────────┐    ┌─────────────┐  │
//!   ───────────────────┼─▶│   net    │───▶│ dispatch │───▶│  security   │  │
//!                      │  │ listener │    │ handler  │    │ rate_limit  │  │
//!                      │  └──────────┘    └────┬─────┘    └─────────────┘  │
//!                      │                       │                           │
//!                      │                       ▼                           │
//!                      │                ┌────────────┐    ┌─────────────┐  │
//!                      │                │   cache    │───▶│load_balancer│  │
//!                      │                │ (TTL store)│miss│ round robin │  │
//!                      │                └────────────┘    └──────┬──────┘  │
//!                      │                                         │         │
//!   Client Reply       │  ┌──────────┐                   ┌───────▼──────┐  │
//!   ◀──────────────────┼──│  reply   │◀──────────────────│   backend    │◀─┼── Backend
//!                      │  │  socket  │                   │  forwarding  │  │    Worker
//!                      │  └──────────┘                   └──────────────┘  │
//!                      │                                                   │
//!                      │  ┌─────────────────────────────────────────────┐  │
//!                      │  │            Cross-Cutting Concerns           │  │
//!                      │  │  ┌────────┐ ┌─────────┐ ┌───────┐ ┌───────┐ │  │
//!                      │  │  │ config │ │ health  │ │ admin │ │observ-│ │  │
//!                      │  │  │        │ │ monitor │ │  API  │ │ability│ │  │
//!                      │  │  └────────┘ └─────────┘ └───────┘ └───────┘ │  │
//!                      │  │  ┌──────────────────┐ ┌───────────────────┐ │  │
//!                      │  │  │    lifecycle     │ │      janitor      │ │  │
//!                      │  │  │ shutdown/signals │ │ cache/log sweeps  │ │  │
//!                      │  │  └──────────────────┘ └───────────────────┘ │  │
//!                      │  └─────────────────────────────────────────────┘  │
//!                      └────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use udp_balancer::config::{loader::load_config, BalancerConfig};
use udp_balancer::dispatch::Dispatcher;
use udp_balancer::lifecycle::{signals, Shutdown};
use udp_balancer::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "udp-balancer")]
#[command(about = "Caching, rate-limiting UDP load balancer", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => BalancerConfig::default(),
    };

    logging::init(&config.observability.log_level);

    tracing::info!("udp-balancer v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backends = config.backends.len(),
        health_interval_secs = config.health_check.interval_secs,
        rate_limit_window_secs = config.rate_limit.window_secs,
        rate_limit_max_requests = config.rate_limit.max_requests,
        cache_ttl_secs = config.cache.ttl_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let dispatcher = Dispatcher::bind(config).await?;
    let shutdown = Arc::new(Shutdown::new());

    tokio::select! {
        result = dispatcher.run(shutdown.clone()) => {
            result?;
        }
        _ = signals::shutdown_signal() => {
            shutdown.trigger();
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
