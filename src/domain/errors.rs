//! Domain error types
//!
//! This module defines the error hierarchy for Shroud.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Shroud error type
///
/// This is the primary error type used throughout the library.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum ShroudError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Entity recognition errors
    #[error("Recognition error: {0}")]
    Recognition(#[from] RecognitionError),

    /// Fake-value generation errors
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// Anonymization mapping errors (locking, persistence)
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// Downstream question-answering pipeline errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Entity recognition errors
///
/// Raised by recognizers and the recognizer registry. A recognition failure
/// always aborts the anonymize call so no sensitive text passes through.
#[derive(Debug, Error)]
pub enum RecognitionError {
    /// No registered recognizer serves the requested language
    #[error("No recognizers registered for language '{0}'")]
    UnsupportedLanguage(String),

    /// A regex pattern failed to compile
    #[error("Invalid pattern '{name}': {message}")]
    InvalidPattern { name: String, message: String },

    /// A recognizer failed while analyzing text
    #[error("Recognizer '{recognizer}' failed: {message}")]
    Failed { recognizer: String, message: String },
}

/// Fake-value generation errors
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No generator is registered for the label
    #[error("No fake-value generator for label: {0}")]
    UnsupportedLabel(String),

    /// The generator is known but failed to produce a value
    #[error("Generator '{generator}' failed: {message}")]
    Failed { generator: String, message: String },
}

/// Question-answering pipeline errors
///
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Failed to reach the answer model endpoint
    #[error("Failed to connect to answer model: {0}")]
    ConnectionFailed(String),

    /// The answer model rejected the request
    #[error("Answer model returned {status}: {message}")]
    RequestFailed { status: u16, message: String },

    /// The response did not contain an answer
    #[error("Invalid response from answer model: {0}")]
    InvalidResponse(String),

    /// No document has been indexed yet
    #[error("No document indexed")]
    EmptyIndex,

    /// Prompt template is missing a placeholder
    #[error("Invalid prompt template: {0}")]
    InvalidTemplate(String),
}

impl GenerationError {
    /// Whether the engine may fall back to the default operator
    pub fn is_unsupported_label(&self) -> bool {
        matches!(self, Self::UnsupportedLabel(_))
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for ShroudError {
    fn from(err: std::io::Error) -> Self {
        ShroudError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ShroudError {
    fn from(err: serde_json::Error) -> Self {
        ShroudError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ShroudError {
    fn from(err: toml::de::Error) -> Self {
        ShroudError::Configuration(format!("TOML parse error: {err}"))
    }
}
