//! `placement serve`: portal pages, student sessions and offline assets

use anyhow::{Context, Result};

use placement_core::PortalConfig;
use placement_server::{start_server, ServerConfig};

/// Run the serve command.
pub async fn run(port: u16) -> Result<()> {
    let portal = PortalConfig::load().context("Failed to load configuration")?;

    print_banner(port, &portal.base_url);

    // Initialize tracing for server mode (stdout, not file)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let server = start_server(ServerConfig {
        port,
        portal,
        ..Default::default()
    });

    tokio::select! {
        result = server => result?,
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for ctrl+c")?;
            println!("\n  Shutting down...");
        }
    }

    Ok(())
}

fn print_banner(port: u16, base_url: &str) {
    println!();
    println!("  \x1b[1;36mPlacement\x1b[0m server starting");
    println!("  ─────────────────────────────────────");
    println!("  Local:  http://localhost:{}", port);
    println!("  API:    {}", base_url);
    println!();
}
