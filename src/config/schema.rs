//! Configuration schema types
//!
//! Every section has defaults, so an empty file is a valid configuration.

use crate::anonymization::config::AnonymizerConfig;
use crate::config::SecretString;
use serde::Deserialize;

/// Main Shroud configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShroudConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Recognizers, operators and mapping persistence
    #[serde(default)]
    pub anonymizer: AnonymizerConfig,

    /// Question-answering pipeline
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ShroudConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.anonymizer.validate().map_err(|e| e.to_string())?;
        self.pipeline.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (detect but don't substitute)
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
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

/// Question-answering pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Answer model endpoint (HTTP POST)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Bearer token for the endpoint
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Model identifier sent with each request
    #[serde(default = "default_model_id")]
    pub model_id: String,

    /// Maximum chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared by neighbouring chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Chunks retrieved per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// JSON pointer to the answer in the response body
    #[serde(default = "default_response_pointer")]
    pub response_pointer: String,

    /// Prompt template with `{context}` and `{anonymized_question}`
    #[serde(default)]
    pub template: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            model_id: default_model_id(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            timeout_seconds: default_timeout_seconds(),
            max_retries: default_max_retries(),
            response_pointer: default_response_pointer(),
            template: None,
        }
    }
}

impl PipelineConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref endpoint) = self.endpoint {
            let parsed = url::Url::parse(endpoint)
                .map_err(|e| format!("Invalid pipeline.endpoint '{endpoint}': {e}"))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(format!(
                    "pipeline.endpoint must use http or https, got '{}'",
                    parsed.scheme()
                ));
            }
        }

        if self.chunk_size == 0 {
            return Err("pipeline.chunk_size must be > 0".to_string());
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(format!(
                "pipeline.chunk_overlap ({}) must be smaller than pipeline.chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            ));
        }

        if self.top_k == 0 {
            return Err("pipeline.top_k must be > 0".to_string());
        }

        if self.timeout_seconds == 0 {
            return Err("pipeline.timeout_seconds must be > 0".to_string());
        }

        if !self.response_pointer.is_empty() && !self.response_pointer.starts_with('/') {
            return Err(format!(
                "pipeline.response_pointer must be a JSON pointer starting with '/', got '{}'",
                self.response_pointer
            ));
        }

        if let Some(ref template) = self.template {
            for placeholder in ["{context}", "{anonymized_question}"] {
                if !template.contains(placeholder) {
                    return Err(format!("pipeline.template is missing {placeholder}"));
                }
            }
        }

        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
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

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty".to_string());
        }

        Ok(())
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_model_id() -> String {
    "anthropic.claude-3-5-sonnet-20240620-v1:0".to_string()
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    100
}

fn default_top_k() -> usize {
    4
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_max_retries() -> usize {
    3
}

fn default_response_pointer() -> String {
    "/completion".to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_valid() {
        let config: ShroudConfig = toml::from_str("").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.application.log_level, "info");
        assert_eq!(config.pipeline.chunk_size, 1000);
        assert_eq!(config.pipeline.chunk_overlap, 100);
        assert_eq!(config.pipeline.top_k, 4);
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = ShroudConfig::default();
        config.application.log_level = "verbose".to_string();
        assert!(config.validate().unwrap_err().contains("log_level"));
    }

    #[test]
    fn test_chunk_overlap_must_be_smaller() {
        let mut config = ShroudConfig::default();
        config.pipeline.chunk_overlap = 1000;
        assert!(config.validate().is_err());

        config.pipeline.chunk_overlap = 100;
        config.pipeline.chunk_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_endpoint_must_be_http() {
        let mut config = ShroudConfig::default();
        config.pipeline.endpoint = Some("ftp://models.example.com".to_string());
        assert!(config.validate().is_err());

        config.pipeline.endpoint = Some("https://models.example.com/v1/answer".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_template_placeholders() {
        let mut config = ShroudConfig::default();
        config.pipeline.template = Some("Context: {context}".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_rotation() {
        let mut config = ShroudConfig::default();
        config.logging.local_rotation = "weekly".to_string();
        assert!(config.validate().is_err());
    }
}
