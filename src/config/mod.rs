//! Configuration management for Shroud.
//!
//! Configuration is read from a TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `SHROUD_<SECTION>_<KEY>` overrides
//! - Default values for every setting
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use shroud::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("shroud.toml")?;
//! println!("Language: {}", config.anonymizer.language);
//! println!("Chunk size: {}", config.pipeline.chunk_size);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level and dry-run
//! - [`AnonymizerConfig`] - recognizers, operators, faker seed, mapping path, audit
//! - [`PipelineConfig`] - answer model endpoint, chunking and retrieval
//! - [`LoggingConfig`] - optional rolling log files
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [anonymizer]
//! faker_seed = 42
//! mapping_path = "./mapping/anonymization_mapping.json"
//! presets = ["polish_id", "time", "legal_terms"]
//!
//! [anonymizer.operators.US_SSN]
//! type = "hash"
//! salt = "${SHROUD_HASH_SALT}"
//!
//! [pipeline]
//! endpoint = "https://models.example.com/v1/answer"
//! api_key = "${SHROUD_API_KEY}"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use crate::anonymization::config::{AnonymizerConfig, AuditConfig};
pub use loader::{load_config, load_config_str};
pub use schema::{ApplicationConfig, LoggingConfig, PipelineConfig, ShroudConfig};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
