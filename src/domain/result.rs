//! Result type alias for Shroud
//!
//! This module provides a convenient Result type alias that uses ShroudError
//! as the error type.

use super::errors::ShroudError;

/// Result type alias for Shroud operations
///
/// # Examples
///
/// ```
/// use shroud::domain::result::Result;
/// use shroud::domain::errors::ShroudError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(ShroudError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, ShroudError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(ShroudError::Validation("test error".to_string()));
        assert!(result.is_err());
    }
}
