//! Configuration management
//!
//! TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! The configuration file supports:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `DESIGN_EXPORT_<SECTION>_<KEY>` overrides
//! - Defaults for every setting
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use design_export::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("design-export.toml")?;
//!
//! println!("API: {}", config.figma.base_url);
//! println!("Cache: {}", config.cache.directory);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`FigmaConfig`] - API endpoint, token, timeouts, rate limits, retries
//! - [`ExportConfig`] - Batch size, frame cap, image format, downloads
//! - [`CacheConfig`] - Image cache directory
//! - [`LoggingConfig`] - File logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [figma]
//! access_token = "${FIGMA_TOKEN}"
//!
//! [figma.rate_limit]
//! tier1_requests_per_minute = 10
//! tier2_requests_per_minute = 25
//!
//! [export]
//! max_frames = 100
//! format = "png"
//!
//! [cache]
//! directory = ".design-export/cache/images"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, CacheConfig, DesignExportConfig, ExportConfig, FigmaConfig, LoggingConfig,
    RateLimitConfig, RetryConfig,
};
pub use secret::{
    is_personal_token, secret_string, SecretString, SecretValue, PERSONAL_TOKEN_PREFIX,
};
