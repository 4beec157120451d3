//! Configuration module for Cardsales-RS
//!
//! Handles loading and validating settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Candidate settings files, in lookup order
pub fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
        PathBuf::from("/etc/cardsales/settings.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("cardsales-rs/settings.yml"));
    }
    paths
}

/// First existing settings file: `CARDSALES_SETTINGS_PATH`, then the defaults
pub fn locate() -> Option<PathBuf> {
    std::env::var("CARDSALES_SETTINGS_PATH")
        .ok()
        .map(PathBuf::from)
        .filter(|p| p.exists())
        .or_else(|| default_paths().into_iter().find(|p| p.exists()))
}

/// Load settings from `path` (defaults when `None`), then apply environment
/// overrides.
///
/// Runs before logging is set up, so callers report the source themselves.
pub fn load_from(path: Option<&Path>) -> Result<Settings> {
    let mut settings = match path {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    settings.merge_env();
    Ok(settings)
}
