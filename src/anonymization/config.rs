//! Anonymizer configuration

use crate::anonymization::models::EntityLabel;
use crate::anonymization::operators::{OperatorConfig, Operators};
use crate::anonymization::recognizer::{presets, PatternRecognizerConfig};
use crate::domain::{Result, ShroudError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// `[anonymizer]` section
#[derive(Debug, Clone, Deserialize)]
pub struct AnonymizerConfig {
    /// Language passed to recognizers
    #[serde(default = "default_language")]
    pub language: String,

    /// Labels to detect; empty means every supported label
    #[serde(default)]
    pub entities: Vec<String>,

    /// Minimum recognizer score (0.0 - 1.0)
    #[serde(default)]
    pub score_threshold: f32,

    /// Seed for reproducible fake values
    #[serde(default)]
    pub faker_seed: Option<u64>,

    /// Use the fake-value generator for labels without an explicit operator
    #[serde(default = "default_true")]
    pub add_default_faker_operators: bool,

    /// Register the built-in pattern recognizers
    #[serde(default = "default_true")]
    pub use_default_recognizers: bool,

    /// JSON file holding the persisted mapping
    #[serde(default)]
    pub mapping_path: Option<PathBuf>,

    /// Extra pattern library (TOML)
    #[serde(default)]
    pub pattern_library: Option<PathBuf>,

    /// Ready-made recognizers to enable (`polish_id`, `time`, `legal_terms`)
    #[serde(default)]
    pub presets: Vec<String>,

    /// Inline pattern recognizers
    #[serde(default)]
    pub recognizers: Vec<PatternRecognizerConfig>,

    /// Operators keyed by label or `default`
    #[serde(default)]
    pub operators: BTreeMap<String, OperatorConfig>,

    /// Audit logging
    #[serde(default)]
    pub audit: AuditConfig,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for AnonymizerConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            entities: Vec::new(),
            score_threshold: 0.0,
            faker_seed: None,
            add_default_faker_operators: true,
            use_default_recognizers: true,
            mapping_path: None,
            pattern_library: None,
            presets: Vec::new(),
            recognizers: Vec::new(),
            operators: BTreeMap::new(),
            audit: AuditConfig::default(),
        }
    }
}

impl AnonymizerConfig {
    /// Parsed entity labels
    pub fn entity_labels(&self) -> Result<Vec<EntityLabel>> {
        self.entities
            .iter()
            .map(|e| EntityLabel::new(e.as_str()).map_err(ShroudError::Configuration))
            .collect()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.language.trim().is_empty() {
            return Err(ShroudError::Configuration(
                "anonymizer.language cannot be empty".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.score_threshold) {
            return Err(ShroudError::Configuration(format!(
                "anonymizer.score_threshold must be between 0 and 1, got {}",
                self.score_threshold
            )));
        }

        self.entity_labels()?;

        for name in &self.presets {
            if presets::preset(name).is_none() {
                return Err(ShroudError::Configuration(format!(
                    "Unknown preset '{name}'. Available: {}",
                    presets::PRESET_NAMES.join(", ")
                )));
            }
        }

        if let Some(ref path) = self.pattern_library {
            if !path.exists() {
                return Err(ShroudError::Configuration(format!(
                    "Pattern library file not found: {}",
                    path.display()
                )));
            }
            if path.extension().and_then(|s| s.to_str()) != Some("toml") {
                return Err(ShroudError::Configuration(format!(
                    "Pattern library must be a TOML file: {}",
                    path.display()
                )));
            }
        }

        for recognizer in &self.recognizers {
            recognizer.build().map_err(|e| {
                ShroudError::Configuration(format!(
                    "Invalid recognizer for '{}': {e}",
                    recognizer.entity
                ))
            })?;
        }

        Operators::from_config(&self.operators)?;

        self.audit.validate()
    }

    /// Apply `SHROUD_ANONYMIZER_*` environment overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("SHROUD_ANONYMIZER_LANGUAGE") {
            self.language = val;
        }

        if let Ok(val) = std::env::var("SHROUD_ANONYMIZER_ENTITIES") {
            self.entities = val
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(val) = std::env::var("SHROUD_ANONYMIZER_SCORE_THRESHOLD") {
            self.score_threshold = parse_env("SHROUD_ANONYMIZER_SCORE_THRESHOLD", &val)?;
        }

        if let Ok(val) = std::env::var("SHROUD_ANONYMIZER_FAKER_SEED") {
            self.faker_seed = Some(parse_env("SHROUD_ANONYMIZER_FAKER_SEED", &val)?);
        }

        if let Ok(val) = std::env::var("SHROUD_ANONYMIZER_ADD_DEFAULT_FAKER_OPERATORS") {
            self.add_default_faker_operators =
                parse_env("SHROUD_ANONYMIZER_ADD_DEFAULT_FAKER_OPERATORS", &val)?;
        }

        if let Ok(val) = std::env::var("SHROUD_ANONYMIZER_MAPPING_PATH") {
            self.mapping_path = Some(PathBuf::from(val));
        }

        if let Ok(val) = std::env::var("SHROUD_ANONYMIZER_PATTERN_LIBRARY") {
            self.pattern_library = Some(PathBuf::from(val));
        }

        self.audit.apply_env_overrides()
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| ShroudError::Configuration(format!("Invalid {name} value: {value}")))
}

/// Audit logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Enable audit logging
    #[serde(default)]
    pub enabled: bool,

    /// Audit log file path
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,

    /// Use JSON format for audit logs
    #[serde(default = "default_true")]
    pub json_format: bool,
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/anonymization.log")
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: default_audit_log_path(),
            json_format: true,
        }
    }
}

impl AuditConfig {
    /// Validate audit configuration
    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.log_path.as_os_str().is_empty() {
            return Err(ShroudError::Configuration(
                "anonymizer.audit.log_path cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("SHROUD_ANONYMIZER_AUDIT_ENABLED") {
            self.enabled = parse_env("SHROUD_ANONYMIZER_AUDIT_ENABLED", &val)?;
        }

        if let Ok(val) = std::env::var("SHROUD_ANONYMIZER_AUDIT_LOG_PATH") {
            self.log_path = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("SHROUD_ANONYMIZER_AUDIT_JSON_FORMAT") {
            self.json_format = parse_env("SHROUD_ANONYMIZER_AUDIT_JSON_FORMAT", &val)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnonymizerConfig::default();
        assert_eq!(config.language, "en");
        assert!(config.add_default_faker_operators);
        assert!(config.use_default_recognizers);
        assert!(config.faker_seed.is_none());
        assert!(!config.audit.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_section() {
        let config: AnonymizerConfig = toml::from_str(
            r#"
language = "en"
entities = ["PERSON", "polish_id"]
faker_seed = 42
presets = ["polish_id", "time"]

[[recognizers]]
entity = "LEGAL_TERM"
deny_list = ["Nomura"]

[operators.PHONE_NUMBER]
type = "mask"
masking_char = "*"
chars_to_mask = 12
from_end = true
"#,
        )
        .unwrap();

        assert_eq!(config.faker_seed, Some(42));
        assert_eq!(config.entity_labels().unwrap()[1].as_str(), "POLISH_ID");
        assert_eq!(config.recognizers.len(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_errors() {
        let mut config = AnonymizerConfig {
            score_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.score_threshold = 0.5;
        config.presets = vec!["swiss_id".to_string()];
        assert!(config.validate().is_err());

        config.presets.clear();
        config.entities = vec!["bad label".to_string()];
        assert!(config.validate().is_err());

        config.entities.clear();
        config.recognizers = vec![PatternRecognizerConfig::new("X").with_pattern("x", "(", 0.5)];
        assert!(config.validate().is_err());

        config.recognizers.clear();
        config.pattern_library = Some(PathBuf::from("/nonexistent/patterns.toml"));
        assert!(config.validate().is_err());
    }
}
