//! Configuration Module
//!
//! Loads and validates configuration from TOML files and the environment.

pub mod loader;

pub use loader::{
    Config, ConfigError, load_config, resolve_config, DEFAULT_CONFIG_FILE,
};
