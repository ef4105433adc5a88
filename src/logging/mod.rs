//! Logging and observability
//!
//! This module provides structured logging with:
//! - Console output filtered by level
//! - Optional JSON file logging with rotation
//! - Helper macros for recurring export events
//!
//! # Example
//!
//! ```no_run
//! use design_export::logging::init_logging;
//! use design_export::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(file_key = "aBcD1234", "Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of an export run
///
/// # Example
///
/// ```no_run
/// use design_export::log_export_start;
/// use design_export::domain::FileKey;
///
/// let key = FileKey::new("aBcD1234").unwrap();
/// log_export_start!(&key, 100);
/// ```
#[macro_export]
macro_rules! log_export_start {
    ($file_key:expr, $max_frames:expr) => {
        tracing::info!(
            file_key = %$file_key,
            max_frames = $max_frames,
            "Starting export"
        );
    };
}

/// Log the completion of an export run
///
/// # Example
///
/// ```no_run
/// use design_export::log_export_complete;
/// use std::time::Duration;
///
/// log_export_complete!(42, 40, Duration::from_secs(10));
/// ```
#[macro_export]
macro_rules! log_export_complete {
    ($exported:expr, $cached:expr, $duration:expr) => {
        tracing::info!(
            exported = $exported,
            cached = $cached,
            duration_ms = $duration.as_millis() as u64,
            "Export run finished"
        );
    };
}

/// Log an error with context
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log one image export batch
///
/// # Example
///
/// ```no_run
/// use design_export::log_batch_processing;
///
/// log_batch_processing!(2, 3, 100);
/// ```
#[macro_export]
macro_rules! log_batch_processing {
    ($current:expr, $total:expr, $size:expr) => {
        tracing::debug!(
            batch = $current,
            total_batches = $total,
            batch_size = $size,
            progress_pct = ($current as f64 / $total as f64 * 100.0),
            "Processing batch"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use design_export::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying request"
        );
    };
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    #[test]
    fn test_macros_expand_without_subscriber() {
        let key = crate::domain::FileKey::new("abc").unwrap();
        crate::log_export_start!(&key, 10);
        crate::log_export_complete!(3usize, 2usize, Duration::from_millis(5));
        crate::log_batch_processing!(1usize, 2usize, 100usize);
        crate::log_retry_attempt!(1usize, 3usize, String::from("503"));
        crate::log_error_with_context!("boom", "testing");
    }
}
