//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::DesignExportConfig;
use super::secret::secret_string;
use crate::domain::errors::DesignExportError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "DESIGN_EXPORT";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Substitutes `${VAR}` placeholders from the environment
/// 3. Parses the TOML into [`DesignExportConfig`]
/// 4. Applies `DESIGN_EXPORT_<SECTION>_<KEY>` overrides
/// 5. Validates the result
///
/// # Errors
///
/// Returns a configuration error if the file can't be read or parsed, a
/// referenced variable is unset, an override can't be parsed, or
/// validation fails.
///
/// # Examples
///
/// ```no_run
/// use design_export::config::load_config;
///
/// let config = load_config("design-export.toml").expect("Failed to load config");
/// println!("{}", config.figma.base_url);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<DesignExportConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(DesignExportError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        DesignExportError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: DesignExportConfig = toml::from_str(&contents)
        .map_err(|e| DesignExportError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        DesignExportError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Replace `${VAR_NAME}` placeholders with environment values
///
/// Comment lines are left untouched. All missing variables are reported
/// together.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| DesignExportError::Configuration(format!("Invalid placeholder pattern: {e}")))?;
    let mut missing_vars: Vec<String> = Vec::new();
    let mut lines = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    caps[0].to_string()
                }
            }
        });
        lines.push(processed.into_owned());
    }

    if !missing_vars.is_empty() {
        return Err(DesignExportError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn env_var(section: &str, key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}_{section}_{key}")).ok()
}

fn parse_override<T: FromStr>(section: &str, key: &str) -> Result<Option<T>> {
    match env_var(section, key) {
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            DesignExportError::Configuration(format!(
                "Invalid value '{raw}' for {ENV_PREFIX}_{section}_{key}"
            ))
        }),
        None => Ok(None),
    }
}

/// Applies environment variable overrides using the `DESIGN_EXPORT_` prefix
///
/// Variables follow the pattern `DESIGN_EXPORT_<SECTION>_<KEY>`, for
/// example `DESIGN_EXPORT_FIGMA_ACCESS_TOKEN` or
/// `DESIGN_EXPORT_EXPORT_MAX_FRAMES`.
fn apply_env_overrides(config: &mut DesignExportConfig) -> Result<()> {
    // Application
    if let Some(val) = env_var("APPLICATION", "LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Figma
    if let Some(val) = env_var("FIGMA", "BASE_URL") {
        config.figma.base_url = val;
    }
    if let Some(val) = env_var("FIGMA", "ACCESS_TOKEN") {
        config.figma.access_token = Some(secret_string(val));
    }
    if let Some(val) = parse_override("FIGMA", "TIMEOUT_SECONDS")? {
        config.figma.timeout_seconds = val;
    }
    if let Some(val) = parse_override("FIGMA", "TASK_TIMEOUT_SECONDS")? {
        config.figma.task_timeout_seconds = val;
    }
    if let Some(val) = parse_override("FIGMA", "TIER1_REQUESTS_PER_MINUTE")? {
        config.figma.rate_limit.tier1_requests_per_minute = val;
    }
    if let Some(val) = parse_override("FIGMA", "TIER2_REQUESTS_PER_MINUTE")? {
        config.figma.rate_limit.tier2_requests_per_minute = val;
    }
    if let Some(val) = parse_override("FIGMA", "MAX_RETRIES")? {
        config.figma.retry.max_retries = val;
    }

    // Export
    if let Some(val) = parse_override("EXPORT", "BATCH_SIZE")? {
        config.export.batch_size = val;
    }
    if let Some(val) = parse_override("EXPORT", "MAX_FRAMES")? {
        config.export.max_frames = val;
    }
    if let Some(val) = env_var("EXPORT", "FORMAT") {
        config.export.format = val;
    }
    if let Some(val) = parse_override("EXPORT", "SCALE")? {
        config.export.scale = val;
    }
    if let Some(val) = parse_override("EXPORT", "DOWNLOAD_IMAGES")? {
        config.export.download_images = val;
    }
    if let Some(val) = parse_override("EXPORT", "DOWNLOAD_CONCURRENCY")? {
        config.export.download_concurrency = val;
    }
    if let Some(val) = env_var("EXPORT", "MANIFEST_PATH") {
        config.export.manifest_path = Some(val);
    }

    // Cache
    if let Some(val) = env_var("CACHE", "DIRECTORY") {
        config.cache.directory = val;
    }

    // Logging
    if let Some(val) = parse_override("LOGGING", "LOCAL_ENABLED")? {
        config.logging.local_enabled = val;
    }
    if let Some(val) = env_var("LOGGING", "LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = env_var("LOGGING", "LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
