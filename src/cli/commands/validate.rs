//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the configuration file.

use super::{EXIT_CONFIG, EXIT_SUCCESS};
use crate::config::{is_personal_token, load_config, PERSONAL_TOKEN_PREFIX};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates before returning
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                println!();
                return Ok(EXIT_CONFIG);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  API Base URL: {}", config.figma.base_url);
        println!(
            "  Access Token: {}",
            if config.figma.access_token.is_some() {
                "configured"
            } else {
                "not set"
            }
        );
        println!(
            "  Rate Limits: tier 1 {} rpm, tier 2 {} rpm",
            config.figma.rate_limit.tier1_requests_per_minute,
            config.figma.rate_limit.tier2_requests_per_minute
        );
        println!("  Batch Size: {}", config.export.batch_size);
        println!("  Max Frames: {}", config.export.max_frames);
        println!(
            "  Image Format: {} @ {}x",
            config.export.format, config.export.scale
        );
        println!("  Cache Directory: {}", config.cache.directory);
        println!();

        match &config.figma.access_token {
            None => {
                println!("⚠️  No access token set; requests will be anonymous");
                println!("   Set DESIGN_EXPORT_FIGMA_ACCESS_TOKEN or figma.access_token");
                println!();
            }
            Some(token) if !is_personal_token(token) => {
                tracing::warn!("Access token is not a personal access token");
                println!(
                    "⚠️  Access token doesn't start with {PERSONAL_TOKEN_PREFIX}; it is sent as a personal access token"
                );
                println!();
            }
            Some(_) => {}
        }

        Ok(EXIT_SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_validate_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[export]\nmax_frames = 10\n").unwrap();
        file.flush().unwrap();

        let code = ValidateArgs {}
            .execute(&file.path().to_string_lossy())
            .await
            .unwrap();
        assert_eq!(code, EXIT_SUCCESS);
    }

    #[tokio::test]
    async fn test_validate_invalid_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[export]\nformat = \"gif\"\n").unwrap();
        file.flush().unwrap();

        let code = ValidateArgs {}
            .execute(&file.path().to_string_lossy())
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }

    #[tokio::test]
    async fn test_validate_accepts_non_personal_token() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[figma]\naccess_token = \"oauth-token\"\n")
            .unwrap();
        file.flush().unwrap();

        let code = ValidateArgs {}
            .execute(&file.path().to_string_lossy())
            .await
            .unwrap();
        assert_eq!(code, EXIT_SUCCESS);
    }
}
