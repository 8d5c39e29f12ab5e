//! CLI command implementations.

pub mod batch;
pub mod config;
pub mod extract;
pub mod predict;
pub mod serve;

use std::path::{Path, PathBuf};

use tracing::debug;

use formscan_core::FormscanConfig;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("formscan")
        .join("config.json")
}

/// Load configuration from `config_path`, falling back to the default file
/// when it exists, then apply environment overrides.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<FormscanConfig> {
    let mut config = match config_path {
        Some(path) => FormscanConfig::from_file(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path, e))?,
        None => {
            let path = default_config_path();
            if path.exists() {
                debug!("Loading config from {}", path.display());
                FormscanConfig::from_file(&path)?
            } else {
                FormscanConfig::default()
            }
        }
    };

    config.apply_env_overrides();
    Ok(config)
}
