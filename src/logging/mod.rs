//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - Human-readable console output on stderr
//! - Optional JSON log files with rotation
//! - Level from configuration, overridable with `RUST_LOG`
//!
//! Original values of detected entities are never logged. Events carry labels,
//! counts and offsets only.
//!
//! # Example
//!
//! ```no_run
//! use shroud::logging::init_logging;
//! use shroud::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(entities = 3, "Text anonymized");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log a completed anonymize call
///
/// # Example
///
/// ```no_run
/// use shroud::log_anonymization;
/// use std::time::Duration;
///
/// log_anonymization!(4, 2, Duration::from_millis(12));
/// ```
#[macro_export]
macro_rules! log_anonymization {
    ($entities:expr, $new_mappings:expr, $duration:expr) => {
        tracing::info!(
            entities = $entities,
            new_mappings = $new_mappings,
            duration_ms = $duration.as_millis() as u64,
            "Text anonymized"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use shroud::log_error_with_context;
/// use shroud::domain::ShroudError;
///
/// let error = ShroudError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
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

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use shroud::log_retry_attempt;
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
            "Retrying operation"
        );
    };
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    #[test]
    fn test_macros_expand_without_subscriber() {
        log_anonymization!(2usize, 1usize, Duration::from_millis(5));
        log_error_with_context!("boom", "testing");
        log_retry_attempt!(1, 3, "timeout");
    }
}
