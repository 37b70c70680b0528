//! WebSocket gateway (v1)
//!
//! Accepts WebSocket upgrades, authenticates each handshake and tracks
//! accepted clients until they disconnect.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                 WS GATEWAY                   │
//!   Upgrade request    │  ┌──────────┐   ┌──────────────┐             │
//!   ───────────────────┼─▶│  http    │──▶│     auth     │ reject ─────┼──▶ 401 / 500
//!                      │  │ server   │   │ authenticator│             │
//!                      │  └──────────┘   └──────┬───────┘             │
//!                      │                        │ accept              │
//!                      │                        ▼                     │
//!   WebSocket frames   │  ┌──────────┐   ┌──────────────┐             │
//!   ◀──────────────────┼─▶│websocket │──▶│   registry   │◀── admin    │
//!                      │  │ session  │   │ clientId map │             │
//!                      │  └──────────┘   └──────────────┘             │
//!                      │                                              │
//!                      │  config · observability · lifecycle          │
//!                      └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use ws_gateway::lifecycle::{signals, startup};
use ws_gateway::observability::{logging, metrics};
use ws_gateway::{GatewayServer, Shutdown};

#[derive(Parser)]
#[command(name = "ws-gateway")]
#[command(about = "Authenticating WebSocket gateway", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured WebSocket port.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = startup::resolve_config(args.config.as_deref(), args.port)?;

    logging::init_logging(&config.observability);
    tracing::info!("ws-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    startup::report_config(&config);

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let listener = TcpListener::bind(config.listen_addr()?).await?;

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    let server = GatewayServer::new(config);
    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
