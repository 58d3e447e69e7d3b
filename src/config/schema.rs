//! Configuration schema for biotools.toml.

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BiotoolsConfig {
    /// Base URL of the bio.tools REST API.
    pub api_base_url: String,

    /// Fixed delay between paginated API requests, in milliseconds.
    pub page_delay_ms: u64,

    /// Number of entries shown in ranked term reports.
    pub top_n: usize,

    /// URL of the SPDX license-list JSON.
    pub spdx_license_url: String,

    /// Directory where generated tables and dumps are written.
    pub output_dir: String,

    /// Log level used when the CLI does not pass `--log-level`.
    pub log_level: String,
}

impl Default for BiotoolsConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://bio.tools/api".into(),
            page_delay_ms: 1000,
            top_n: 30,
            spdx_license_url:
                "https://raw.githubusercontent.com/spdx/license-list-data/master/json/licenses.json"
                    .into(),
            output_dir: ".".into(),
            log_level: "info".into(),
        }
    }
}

impl BiotoolsConfig {
    /// Resolve a path that may contain `~` to an absolute path.
    pub fn resolve_path(&self, path: &str) -> String {
        shellexpand::tilde(path).into_owned()
    }

    /// Resolved output directory.
    pub fn resolved_output_dir(&self) -> String {
        self.resolve_path(&self.output_dir)
    }
}
