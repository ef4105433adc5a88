//! CLI interface and argument parsing
//!
//! This module provides the command-line interface using clap.

pub mod commands;

use crate::config::{load_config, LoggingConfig};
use clap::{Parser, Subcommand};

/// design-export - rate-limited, cached image export for design files
#[derive(Parser, Debug)]
#[command(name = "design-export")]
#[command(version, about, long_about = None)]
#[command(author = "Design Export Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "design-export.toml",
        env = "DESIGN_EXPORT_CONFIG"
    )]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "DESIGN_EXPORT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export frame images from a design file
    Export(commands::export::ExportArgs),

    /// Remove every cached image
    ClearCache(commands::cache::ClearCacheArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

impl Cli {
    /// Log level and file logging settings for this invocation
    ///
    /// `--log-level` wins over `application.log_level`. Commands that read
    /// the configuration file take `[logging]` from it; when the file can't
    /// be loaded, console-only defaults are used and the command itself
    /// reports the error.
    pub fn logging_settings(&self) -> (String, LoggingConfig) {
        let config = match self.command {
            Commands::Init(_) => None,
            _ => load_config(&self.config).ok(),
        };

        let (config_level, logging) = match config {
            Some(config) => (Some(config.application.log_level), config.logging),
            None => (None, LoggingConfig::default()),
        };
        let level = self
            .log_level
            .clone()
            .or(config_level)
            .unwrap_or_else(|| "info".to_string());

        (level, logging)
    }
}
