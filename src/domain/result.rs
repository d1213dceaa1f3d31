//! Result type alias for Obscura

use super::errors::ObscuraError;

/// Result type alias for Obscura operations
///
/// # Examples
///
/// ```
/// use obscura::domain::result::Result;
/// use obscura::domain::errors::ObscuraError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(ObscuraError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, ObscuraError>;
