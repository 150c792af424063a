//! Configuration management for clipfetch
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use clipfetch::config::Config;
//!
//! let config = Config::load(None).expect("Failed to load configuration");
//! println!("Server listening on: {}", config.server.bind_addr);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `CLIPFETCH__<section>__<key>`
//!
//! Examples:
//! - `CLIPFETCH__SERVER__BIND_ADDR=0.0.0.0:9000`
//! - `CLIPFETCH__EXTRACTOR__BINARY=/usr/local/bin/yt-dlp`
//! - `CLIPFETCH__DOWNLOADS__STRATEGY=generic`
//!
//! A bare `PORT` variable replaces only the port of `server.bind_addr`.
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/clipfetch.toml`.
//! This can be overridden using the `CLIPFETCH_CONFIG` environment variable
//! or the `--config` command line flag.

mod models;
mod sources;
mod validation;

use std::path::PathBuf;

pub use crate::humanize::ByteSize;
pub use models::{
    Config, DownloadsConfig, ExtractorConfig, ServerConfig, TelemetryConfig, TranscoderConfig,
    VimeoConfig,
};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// `path` wins over `CLIPFETCH_CONFIG`, which wins over the default
    /// `config/clipfetch.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file is malformed
    /// - Validation fails (empty binaries, bad timeouts, unknown strategy, etc.)
    pub fn load(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = sources::load(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path, without `.env` or `PORT`
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}
