use anyhow::{Context, Result};

use crate::config::{Config, ConfigStore};

pub fn show_config(store: &ConfigStore, effective: &Config) -> Result<()> {
    println!("Config file: {}", store.path().display());
    let rendered =
        serde_json::to_string_pretty(effective).context("Failed to render configuration")?;
    println!("{}", rendered);
    if effective.remote_enabled() {
        println!("\nDashboard: {} (team {})", effective.api_url, effective.team_name);
    } else {
        println!("\nDashboard: disabled (set teamName to enable)");
    }
    Ok(())
}

/// Update one key in the config file. Overrides from flags or the
/// environment are not written back.
pub fn set_config(store: &ConfigStore, key: &str, value: &str) -> Result<()> {
    let mut config = store
        .read()
        .context("Refusing to overwrite an unreadable config file")?;
    config.set(key, value)?;
    store.write(&config)?;
    println!("✅ Set {} = {}", key, value);
    Ok(())
}
