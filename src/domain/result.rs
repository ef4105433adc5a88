//! Result type alias for design-export

use super::errors::DesignExportError;

/// Result type alias for design-export operations
///
/// # Examples
///
/// ```
/// use design_export::domain::result::Result;
/// use design_export::domain::errors::DesignExportError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(DesignExportError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, DesignExportError>;
