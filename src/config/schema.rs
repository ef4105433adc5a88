//! Configuration schema types
//!
//! Every section has serde defaults, so an empty file is a valid
//! configuration apart from the access token.

use crate::adapters::figma::ImageFormat;
use crate::config::SecretString;
use crate::core::export::batch::{DEFAULT_BATCH_SIZE, DEFAULT_MAX_FRAMES, MAX_BATCH_SIZE};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Root configuration, mapped from `design-export.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DesignExportConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Design API connection
    #[serde(default)]
    pub figma: FigmaConfig,

    /// Export behaviour
    #[serde(default)]
    pub export: ExportConfig,

    /// Local image cache
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DesignExportConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value found
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.figma.validate()?;
        self.export.validate()?;
        self.cache.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Design API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FigmaConfig {
    /// API root, without a trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Personal access token sent as `X-Figma-Token`
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub access_token: Option<SecretString>,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Upper bound on one rate-limited request, in seconds; 0 disables it
    #[serde(default = "default_task_timeout_seconds")]
    pub task_timeout_seconds: u64,

    /// Per-tier request quotas
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl FigmaConfig {
    fn validate(&self) -> Result<(), String> {
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| format!("Invalid figma.base_url '{}': {}", self.base_url, e))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(format!(
                "figma.base_url must use http or https, got '{}'",
                parsed.scheme()
            ));
        }

        if let Some(token) = &self.access_token {
            use secrecy::ExposeSecret;
            if token.expose_secret().is_empty() {
                return Err("figma.access_token must not be empty when set".to_string());
            }
        }

        if self.timeout_seconds == 0 {
            return Err("figma.timeout_seconds must be > 0".to_string());
        }

        self.rate_limit.validate()?;
        self.retry.validate()?;
        Ok(())
    }
}

impl Default for FigmaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_token: None,
            timeout_seconds: default_timeout_seconds(),
            task_timeout_seconds: default_task_timeout_seconds(),
            rate_limit: RateLimitConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

/// Requests per minute allowed on each provider tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Image export endpoint
    #[serde(default = "default_tier1_rpm")]
    pub tier1_requests_per_minute: u32,

    /// File document endpoint
    #[serde(default = "default_tier2_rpm")]
    pub tier2_requests_per_minute: u32,
}

impl RateLimitConfig {
    fn validate(&self) -> Result<(), String> {
        if self.tier1_requests_per_minute == 0 {
            return Err("figma.rate_limit.tier1_requests_per_minute must be > 0".to_string());
        }
        if self.tier2_requests_per_minute == 0 {
            return Err("figma.rate_limit.tier2_requests_per_minute must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            tier1_requests_per_minute: default_tier1_rpm(),
            tier2_requests_per_minute: default_tier2_rpm(),
        }
    }
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_retries > 10 {
            return Err("figma.retry.max_retries must be <= 10".to_string());
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err("figma.retry.initial_delay_ms must be <= max_delay_ms".to_string());
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err("figma.retry.backoff_multiplier must be >= 1.0".to_string());
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Export behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Ids per image export request (1-500)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Frames kept per run, in discovery order
    #[serde(default = "default_max_frames")]
    pub max_frames: usize,

    /// Image format (png, jpg, svg, pdf)
    #[serde(default = "default_format")]
    pub format: String,

    /// Render scale (0.01-4)
    #[serde(default = "default_scale")]
    pub scale: f64,

    /// Download rendered images into the cache
    #[serde(default = "default_true")]
    pub download_images: bool,

    /// Concurrent image downloads
    #[serde(default = "default_download_concurrency")]
    pub download_concurrency: usize,

    /// Optional JSON manifest of exported nodes
    #[serde(default)]
    pub manifest_path: Option<String>,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(format!(
                "export.batch_size must be between 1 and {MAX_BATCH_SIZE}"
            ));
        }

        if self.max_frames == 0 {
            return Err("export.max_frames must be > 0".to_string());
        }

        ImageFormat::from_str(&self.format)?;

        if !(0.01..=4.0).contains(&self.scale) {
            return Err(format!(
                "export.scale must be between 0.01 and 4, got {}",
                self.scale
            ));
        }

        if self.download_concurrency == 0 || self.download_concurrency > 64 {
            return Err("export.download_concurrency must be between 1 and 64".to_string());
        }

        Ok(())
    }

    /// Parsed image format; call after [`DesignExportConfig::validate`]
    pub fn image_format(&self) -> Result<ImageFormat, String> {
        ImageFormat::from_str(&self.format)
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_frames: default_max_frames(),
            format: default_format(),
            scale: default_scale(),
            download_images: true,
            download_concurrency: default_download_concurrency(),
            manifest_path: None,
        }
    }
}

/// Local image cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding cached images
    #[serde(default = "default_cache_directory")]
    pub directory: String,
}

impl CacheConfig {
    fn validate(&self) -> Result<(), String> {
        if self.directory.trim().is_empty() {
            return Err("cache.directory must not be empty".to_string());
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: default_cache_directory(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "https://api.figma.com/v1".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_task_timeout_seconds() -> u64 {
    120
}

fn default_tier1_rpm() -> u32 {
    10
}

fn default_tier2_rpm() -> u32 {
    25
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_max_frames() -> usize {
    DEFAULT_MAX_FRAMES
}

fn default_format() -> String {
    "png".to_string()
}

fn default_scale() -> f64 {
    1.0
}

fn default_download_concurrency() -> usize {
    4
}

fn default_cache_directory() -> String {
    ".design-export/cache/images".to_string()
}

fn default_local_path() -> String {
    ".design-export/logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
