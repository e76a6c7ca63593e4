//! Configuration module for the colorizer preview tools
//!
//! Provides types, discovery and parsing for `dmdcolor.toml`.

pub mod loader;
pub mod schema;

pub use loader::{
    check, find_config_for, find_config_from, find_xdg_config, load_config, merge_cli_overrides, CliOverrides,
    ConfigError, CONFIG_FILE_NAME,
};
pub use schema::*;
