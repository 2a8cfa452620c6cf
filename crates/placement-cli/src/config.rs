//! `placement config`: print or initialize `~/.placement/config.toml`

use anyhow::{Context, Result};

use placement_core::{paths, PortalConfig};

pub fn run(init: bool) -> Result<()> {
    if init {
        let path = PortalConfig::default()
            .save()
            .context("Failed to write configuration")?;
        println!("  \x1b[32m✓\x1b[0m Wrote default configuration to {}", path.display());
        return Ok(());
    }

    let config = PortalConfig::load().context("Failed to load configuration")?;
    let path = paths::config_path();
    let source = if path.exists() { "file" } else { "defaults" };

    println!("# {} ({})", path.display(), source);
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
