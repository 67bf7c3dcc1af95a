//! Integration tests for configuration loading and validation
//!
//! Tests that modify environment variables hold ENV_MUTEX.

use secrecy::ExposeSecret;
use shroud::anonymization::ReversibleAnonymizer;
use shroud::config::{load_config, load_config_str};
use shroud::domain::ShroudError;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn cleanup_env_vars() {
    for var in [
        "SHROUD_APPLICATION_LOG_LEVEL",
        "SHROUD_APPLICATION_DRY_RUN",
        "SHROUD_ANONYMIZER_FAKER_SEED",
        "SHROUD_ANONYMIZER_MAPPING_PATH",
        "SHROUD_ANONYMIZER_ENTITIES",
        "SHROUD_PIPELINE_ENDPOINT",
        "SHROUD_PIPELINE_API_KEY",
        "TEST_SHROUD_SALT",
    ] {
        std::env::remove_var(var);
    }
}

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const COMPLETE_CONFIG: &str = r#"
[application]
log_level = "debug"
dry_run = false

[anonymizer]
language = "en"
faker_seed = 42
mapping_path = "./mapping/anonymization_mapping.json"
presets = ["polish_id", "time"]

[[anonymizer.recognizers]]
entity = "CASE_ID"
patterns = [{ name = "case", regex = '\bCASE-\d{4}\b', score = 0.9 }]

[anonymizer.operators.PHONE_NUMBER]
type = "mask"
masking_char = "*"
chars_to_mask = 12
from_end = true

[anonymizer.operators.US_SSN]
type = "hash"
salt = "${TEST_SHROUD_SALT}"

[anonymizer.operators.CASE_ID]
type = "replace"
new_value = "CASE-XXXX"

[pipeline]
endpoint = "https://models.example.com/v1/answer"
chunk_size = 500
chunk_overlap = 50

[logging]
local_enabled = false
"#;

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TEST_SHROUD_SALT", "pepper");

    let file = write_config(COMPLETE_CONFIG);
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.anonymizer.faker_seed, Some(42));
    assert_eq!(config.anonymizer.recognizers.len(), 1);
    assert_eq!(config.anonymizer.operators.len(), 3);
    assert_eq!(config.pipeline.chunk_size, 500);
    assert!(config.pipeline.api_key.is_none());

    let anonymizer = ReversibleAnonymizer::from_config(&config.anonymizer, false).unwrap();
    let safe = anonymizer
        .anonymize("Case CASE-1234: call 999-888-7777, ID ABC123456")
        .unwrap();
    assert!(safe.starts_with("Case CASE-XXXX: call ************, ID "));
    assert!(!safe.contains("ABC123456"));

    cleanup_env_vars();
}

#[test]
fn test_missing_substitution_variable() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(COMPLETE_CONFIG);
    let err = load_config(file.path()).unwrap_err();
    assert!(matches!(err, ShroudError::Configuration(_)));
    assert!(err.to_string().contains("TEST_SHROUD_SALT"));
}

#[test]
fn test_env_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("SHROUD_APPLICATION_LOG_LEVEL", "warn");
    std::env::set_var("SHROUD_ANONYMIZER_FAKER_SEED", "7");
    std::env::set_var("SHROUD_ANONYMIZER_ENTITIES", "PERSON, EMAIL_ADDRESS");
    std::env::set_var("SHROUD_PIPELINE_ENDPOINT", "http://localhost:8080/answer");
    std::env::set_var("SHROUD_PIPELINE_API_KEY", "sk-test");

    let config = load_config_str("[application]\nlog_level = \"info\"\n").unwrap();

    assert_eq!(config.application.log_level, "warn");
    assert_eq!(config.anonymizer.faker_seed, Some(7));
    assert_eq!(config.anonymizer.entities, vec!["PERSON", "EMAIL_ADDRESS"]);
    assert_eq!(
        config.pipeline.endpoint.as_deref(),
        Some("http://localhost:8080/answer")
    );
    let key: &str = config.pipeline.api_key.as_ref().unwrap().expose_secret().as_ref();
    assert_eq!(key, "sk-test");

    cleanup_env_vars();
}

#[test]
fn test_invalid_override_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("SHROUD_ANONYMIZER_FAKER_SEED", "forty-two");

    let result = load_config_str("");
    assert!(matches!(result, Err(ShroudError::Configuration(_))));

    cleanup_env_vars();
}

#[test]
fn test_validation_errors() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let cases = [
        "[application]\nlog_level = \"loud\"\n",
        "[anonymizer]\nscore_threshold = 2.0\n",
        "[anonymizer]\nentities = [\"lower case\"]\n",
        "[anonymizer]\npresets = [\"klingon_id\"]\n",
        "[[anonymizer.recognizers]]\nentity = \"BAD\"\npatterns = [{ name = \"p\", regex = '(unclosed', score = 0.5 }]\n",
        "[anonymizer.operators.PHONE_NUMBER]\ntype = \"mask\"\nmasking_char = \"\"\nchars_to_mask = 4\n",
        "[pipeline]\nchunk_size = 0\n",
        "[pipeline]\nchunk_size = 100\nchunk_overlap = 100\n",
    ];

    for case in cases {
        let result = load_config_str(case);
        assert!(
            matches!(result, Err(ShroudError::Configuration(_))),
            "expected configuration error for:\n{case}"
        );
    }
}
