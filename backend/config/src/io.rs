//! Config file loading.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::info;

use crate::env::resolve_env_vars;
use crate::schema::CantaConfig;

/// Load configuration from a JSON file, resolving `${VAR}` references.
pub fn load_config(path: &Path) -> Result<CantaConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("config file {} is not valid JSON", path.display()))?;
    let resolved = resolve_env_vars(&value)?;
    let config: CantaConfig =
        serde_json::from_value(resolved).context("config file does not match expected schema")?;
    Ok(config)
}

/// Load from the given file if it exists, otherwise fall back to
/// environment variables.
pub fn load_or_env(path: &Path) -> Result<CantaConfig> {
    if path.exists() {
        info!(path = %path.display(), "loading config file");
        load_config(path)
    } else {
        info!("no config file found, using environment variables");
        Ok(CantaConfig::from_env())
    }
}
