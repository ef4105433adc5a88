//! CLI command implementations
//!
//! Every command returns a process exit code:
//! 0 success, 1 partial, 2 configuration, 4 connection or API, 5 fatal.

pub mod cache;
pub mod export;
pub mod init;
pub mod validate;

/// Exit code for a successful run
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code when some nodes could not be exported or cached
pub const EXIT_PARTIAL: i32 = 1;
/// Exit code for configuration errors
pub const EXIT_CONFIG: i32 = 2;
/// Exit code for connection and API errors
pub const EXIT_CONNECTION: i32 = 4;
/// Exit code for any other failure
pub const EXIT_FATAL: i32 = 5;
