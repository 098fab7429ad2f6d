//! Result type alias for deid
//!
//! This module provides a convenient Result type alias that uses DeidError
//! as the error type.

use super::errors::DeidError;

/// Result type alias for deid operations
///
/// # Examples
///
/// ```
/// use deid::domain::result::Result;
/// use deid::domain::errors::DeidError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(DeidError::UnknownAnnotator("nope".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, DeidError>;
