//! WireGuard Admin Gateway
//!
//! Control-plane HTTP gateway for VPN peer lifecycle management, guarded
//! by a single shared-secret session. Peer key material, configuration
//! rendering, and tunnel reconciliation live behind the `PeerStore` seam.

pub mod config;
pub mod ctx;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod peer_store;
pub mod router;
pub mod session;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub use config::{AppState, GatewayConfig};
pub use error::{Error, Result};
pub use router::app;

use peer_store::MemoryPeerStore;

pub async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // Already set, ignore
    }

    let config = Arc::new(GatewayConfig::from_env());
    info!("=== WireGuard Admin Gateway ===");
    info!("Release: {}", config.release);
    if config.password.is_none() {
        info!("No PASSWORD configured, authentication is disabled");
    }

    let state = AppState::new(config.clone(), Arc::new(MemoryPeerStore::new()));
    let app = app(state);

    let addr: SocketAddr = format!("{}:{}", config.bind, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        "Listening on http://{}{}",
        listener.local_addr()?,
        config.cookie_path()
    );

    axum::serve(listener, app).await?;
    Ok(())
}
