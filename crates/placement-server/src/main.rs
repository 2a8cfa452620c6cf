//! Placement Server binary
//!
//! Standalone entry point; `placement serve` starts the same server.

use placement_core::PortalConfig;
use placement_server::{start_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let portal = PortalConfig::load()?;
    let port = match std::env::var("PORT") {
        Ok(port) => port.parse()?,
        Err(_) => ServerConfig::default().port,
    };

    start_server(ServerConfig {
        port,
        portal,
        ..Default::default()
    })
    .await
}
