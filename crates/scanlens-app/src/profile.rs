use std::fs;
use std::path::Path;

use anyhow::Context;
use scanlens_config::Config;

/// Config picked up from the working directory when no path is given
const DEFAULT_CONFIG_FILE: &str = "scanlens.json";

fn load_config_file(path: &Path) -> anyhow::Result<Config> {
    tracing::info!("Loading config from {}", path.display());
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    Ok(config)
}

/// Explicit file, then `scanlens.json`, then defaults. Environment overrides always win.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let file = match path {
        Some(path) => Some(path),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => Some(Path::new(DEFAULT_CONFIG_FILE)),
        None => None,
    };

    let Some(file) = file else {
        return Ok(Config::new());
    };

    let mut config = load_config_file(file)?;
    config.apply_env();
    Ok(config)
}
