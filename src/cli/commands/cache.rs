//! Clear-cache command implementation

use super::{EXIT_CONFIG, EXIT_FATAL, EXIT_SUCCESS};
use crate::config::load_config;
use crate::core::cache::ContentAddressedCache;
use clap::Args;

/// Arguments for the clear-cache command
#[derive(Args, Debug)]
pub struct ClearCacheArgs {}

impl ClearCacheArgs {
    /// Execute the clear-cache command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        // Clearing never downloads, so a default client is enough
        let cache = ContentAddressedCache::new(&config.cache.directory, reqwest::Client::new());
        tracing::info!(directory = %cache.directory().display(), "Clearing image cache");

        match cache.clear().await {
            Ok(()) => {
                println!("🧹 Cleared image cache: {}", cache.directory().display());
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to clear cache");
                println!("❌ Failed to clear image cache");
                println!("   Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }
}
