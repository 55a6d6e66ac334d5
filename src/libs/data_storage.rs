//! Cross-platform data storage path management for application files.
//!
//! Resolves the base directory for the history database, identifier cache,
//! and configuration file, following the same OS conventions across
//! Windows, macOS and Linux.
//!
//! - Windows: `%LOCALAPPDATA%\<owner>\<name>\`
//! - macOS: `~/Library/Application Support/<owner>/<name>/`
//! - Linux: `~/.local/share/<owner>/<name>/` (XDG base directory)

use anyhow::Result;
use std::env::consts::OS;
use std::env::var;
use std::path::{Path, PathBuf};
use std::fs;

// Include compile-time application metadata (APP_METADATA_NAME, _OWNER, _VERSION).
include!(concat!(env!("OUT_DIR"), "/app_metadata.rs"));

/// Cross-platform data storage path manager.
#[derive(Clone)]
pub struct DataStorage {
    base_path: PathBuf,
}

impl DataStorage {
    /// Builds the platform-appropriate base path for application data.
    pub fn new() -> Self {
        let base_path = match OS {
            "windows" => var("LOCALAPPDATA").unwrap_or_else(|_| ".".into()),
            "macos" => var("HOME").unwrap_or_else(|_| ".".into()) + "/Library/Application Support",
            _ => var("HOME").unwrap_or_else(|_| ".".into()) + "/.local/share",
        };

        let base_path = Path::new(&base_path).join(APP_METADATA_OWNER).join(APP_METADATA_NAME);

        Self { base_path }
    }

    /// Resolves a filename to a complete path within the application data
    /// directory, creating parent directories as needed.
    pub fn get_path(&self, file_name: &str) -> Result<PathBuf> {
        if !self.base_path.exists() {
            fs::create_dir_all(&self.base_path)?;
        }

        Ok(self.base_path.join(file_name))
    }

    /// Returns the base directory itself, creating it if necessary.
    pub fn base_dir(&self) -> Result<PathBuf> {
        if !self.base_path.exists() {
            fs::create_dir_all(&self.base_path)?;
        }
        Ok(self.base_path.clone())
    }
}

impl Default for DataStorage {
    fn default() -> Self {
        Self::new()
    }
}
