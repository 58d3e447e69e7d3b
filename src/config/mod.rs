pub mod schema;

pub use schema::BiotoolsConfig;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Default config path (~/.biotools/biotools.toml).
pub fn default_config_path() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".biotools").join("biotools.toml"))
        .unwrap_or_else(|| PathBuf::from("biotools.toml"))
}

/// Load config from the given path, or return defaults.
pub fn load_config(path: &Path) -> Result<BiotoolsConfig> {
    if path.exists() {
        let contents =
            std::fs::read_to_string(path).context("Failed to read biotools config file")?;
        let config: BiotoolsConfig =
            toml::from_str(&contents).context("Failed to parse biotools config (TOML)")?;
        Ok(config)
    } else {
        Ok(BiotoolsConfig::default())
    }
}
