//! Application configuration.
//!
//! Defaults live here; callers override them from CLI flags and environment
//! variables in that order, with the loaded config file the final fallback
//! layer under both.

use crate::libs::data_storage::DataStorage;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const CONFIG_FILE_NAME: &str = "config.json";

/// Plausible residential/datacenter ISP ranges used to synthesize a
/// session-stable `X-Forwarded-For` header when enabled. Never load-bearing
/// for correctness, only for header-enhancement experimentation.
fn default_forwarded_for_ranges() -> Vec<String> {
    vec![
        "66.249.64.0/19".to_string(),
        "17.0.0.0/8".to_string(),
        "72.14.192.0/18".to_string(),
        "104.244.42.0/21".to_string(),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Number of targets dispatched to the remote client per slice.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Delay in seconds between slices.
    #[serde(default = "default_inter_slice_delay")]
    pub inter_slice_delay: u64,
    /// How long a loaded credential mapping stays valid before forced reload.
    #[serde(default = "default_credential_cache_ttl")]
    pub credential_cache_ttl_secs: u64,
    /// Cap on authentication recoveries per process lifetime.
    #[serde(default = "default_max_auth_recoveries")]
    pub max_auth_recoveries: u32,
    /// Whether the remote client attaches enhanced per-request headers.
    #[serde(default = "default_header_enhancement")]
    pub header_enhancement: bool,
    /// Whether a synthetic forwarded-for header is attached in addition.
    #[serde(default)]
    pub forwarded_for_enabled: bool,
    #[serde(default = "default_forwarded_for_ranges")]
    pub forwarded_for_ranges: Vec<String>,
}

fn default_batch_size() -> usize {
    50
}
fn default_inter_slice_delay() -> u64 {
    1
}
fn default_credential_cache_ttl() -> u64 {
    30
}
fn default_max_auth_recoveries() -> u32 {
    10
}
fn default_header_enhancement() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            inter_slice_delay: default_inter_slice_delay(),
            credential_cache_ttl_secs: default_credential_cache_ttl(),
            max_auth_recoveries: default_max_auth_recoveries(),
            header_enhancement: default_header_enhancement(),
            forwarded_for_enabled: false,
            forwarded_for_ranges: default_forwarded_for_ranges(),
        }
    }
}

impl Config {
    /// Loads the config file if present, falling back to defaults.
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            let contents = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
            let config: Config = serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn default_path() -> Result<PathBuf> {
        DataStorage::new().get_path(CONFIG_FILE_NAME)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::default_path()?;
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        Ok(())
    }
}
