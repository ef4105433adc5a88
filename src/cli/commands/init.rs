//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use super::{EXIT_CONFIG, EXIT_FATAL, EXIT_SUCCESS};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "design-export.toml")]
    pub output: String,

    /// Include every setting with explanatory comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing design-export configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Create a personal access token in your account settings");
                println!("  2. Put it in a .env file as FIGMA_TOKEN=...");
                println!("  3. Validate configuration: design-export validate-config");
                println!("  4. Run export: design-export export <FILE_KEY>");
                println!();
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(EXIT_FATAL)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# design-export configuration

[application]
log_level = "info"

[figma]
access_token = "${FIGMA_TOKEN}"

[export]
max_frames = 100
format = "png"
scale = 1.0

[cache]
directory = ".design-export/cache/images"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# design-export configuration
#
# Every setting below shows its default. Any value can also be set through
# DESIGN_EXPORT_<SECTION>_<KEY>, for example DESIGN_EXPORT_EXPORT_MAX_FRAMES.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# API Settings
# ============================================================================
[figma]
# API root
base_url = "https://api.figma.com/v1"

# Personal access token (use an environment variable)
access_token = "${FIGMA_TOKEN}"

# HTTP request timeout in seconds
timeout_seconds = 30

# Upper bound for one rate-limited request in seconds (0 disables)
task_timeout_seconds = 120

[figma.rate_limit]
# Image export endpoint
tier1_requests_per_minute = 10

# File document endpoint
tier2_requests_per_minute = 25

[figma.retry]
# Retries for 429, 5xx and connection failures
max_retries = 3
initial_delay_ms = 1000
max_delay_ms = 30000
backoff_multiplier = 2.0

# ============================================================================
# Export Settings
# ============================================================================
[export]
# Ids per image export request (1-500)
batch_size = 100

# Frames exported per run, in document order
max_frames = 100

# Image format: png, jpg, svg or pdf
format = "png"

# Render scale (0.01-4)
scale = 1.0

# Download rendered images into the cache
download_images = true

# Concurrent image downloads
download_concurrency = 4

# Optional JSON manifest of exported frames
# manifest_path = "design-export-manifest.json"

# ============================================================================
# Cache Settings
# ============================================================================
[cache]
# Cached images are named after their node id and never expire; run
# `design-export clear-cache` after designs change.
directory = ".design-export/cache/images"

# ============================================================================
# Logging Settings
# ============================================================================
[logging]
# JSON log files in addition to console output
local_enabled = false
local_path = ".design-export/logs"

# Rotation: daily, hourly or never
local_rotation = "daily"
"#
        .to_string()
    }
}
