//! Configuration loading and discovery for `dmdcolor.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::DmdConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up while discovering configuration.
pub const CONFIG_FILE_NAME: &str = "dmdcolor.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse dmdcolor.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override the match cap
    pub max_matches: Option<usize>,
    /// Render at extra resolution
    pub extra: Option<bool>,
    /// Force backgrounds over lit pixels
    pub force_background: Option<bool>,
    /// Enable or disable dynamic shadows
    pub dyna_shadows: Option<bool>,
    /// Override image scale
    pub scale: Option<u32>,
    /// Override the animated preview length
    pub preview_ms: Option<u32>,
}

/// Find the configuration that applies to a file.
///
/// Search order:
/// 1. Walk up from the file's directory looking for dmdcolor.toml
/// 2. Check XDG_CONFIG_HOME/dmdcolor/dmdcolor.toml (or ~/.config/dmdcolor/dmdcolor.toml)
pub fn find_config_for(file: &Path) -> Option<PathBuf> {
    let start = match file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => env::current_dir().ok()?,
    };
    find_config_from(start).or_else(find_xdg_config)
}

/// Find dmdcolor.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("dmdcolor").join(CONFIG_FILE_NAME);
    config_path.exists().then_some(config_path)
}

/// Find dmdcolor.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a dmdcolor.toml file, or the defaults when no
/// path is given.
pub fn load_config(path: Option<&Path>) -> Result<DmdConfig, ConfigError> {
    match path {
        Some(p) => load_config_file(p),
        None => Ok(DmdConfig::default()),
    }
}

fn load_config_file(path: &Path) -> Result<DmdConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: DmdConfig = toml::from_str(&contents)?;
    tracing::debug!(path = %path.display(), "loaded configuration");
    check(config)
}

/// Reject a configuration that fails validation.
pub fn check(config: DmdConfig) -> Result<DmdConfig, ConfigError> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }
    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut DmdConfig, overrides: &CliOverrides) {
    if let Some(max_matches) = overrides.max_matches {
        config.locate.max_matches = max_matches;
    }
    if let Some(extra) = overrides.extra {
        config.render.extra = extra;
    }
    if let Some(force_background) = overrides.force_background {
        config.render.force_background = force_background;
    }
    if let Some(dyna_shadows) = overrides.dyna_shadows {
        config.render.dyna_shadows = dyna_shadows;
    }
    if let Some(scale) = overrides.scale {
        config.render.scale = scale;
    }
    if let Some(preview_ms) = overrides.preview_ms {
        config.rotation.preview_ms = preview_ms;
    }
}
