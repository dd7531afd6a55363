//! Print the effective configuration.

use anyhow::{Context, Result};
use live_carousel_client::ClientConfig;

/// Run the config command.
pub fn run(config: &ClientConfig) -> Result<()> {
    let rendered = config
        .to_toml()
        .context("Failed to render configuration")?;
    print!("{}", rendered);
    Ok(())
}
