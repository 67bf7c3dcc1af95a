//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::ShroudConfig;
use super::secret::secret_string;
use crate::domain::errors::ShroudError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into ShroudConfig
/// 4. Applies environment variable overrides (SHROUD_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`ShroudError::Configuration`] if the file is missing or
/// unreadable, a referenced variable is unset, parsing fails or validation
/// fails.
///
/// # Examples
///
/// ```no_run
/// use shroud::config::loader::load_config;
///
/// let config = load_config("shroud.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ShroudConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ShroudError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ShroudError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_str(&contents)
}

/// Loads configuration from TOML text
pub fn load_config_str(contents: &str) -> Result<ShroudConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: ShroudConfig = toml::from_str(&contents)
        .map_err(|e| ShroudError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        ShroudError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| ShroudError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |cap: &regex::Captures<'_>| {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    cap[0].to_string()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(ShroudError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the SHROUD_* prefix
///
/// Environment variables follow the pattern: SHROUD_<SECTION>_<KEY>
/// For example: SHROUD_APPLICATION_LOG_LEVEL, SHROUD_PIPELINE_ENDPOINT
fn apply_env_overrides(config: &mut ShroudConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("SHROUD_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("SHROUD_APPLICATION_DRY_RUN") {
        config.application.dry_run = parse_bool("SHROUD_APPLICATION_DRY_RUN", &val)?;
    }

    // Anonymizer overrides
    config.anonymizer.apply_env_overrides()?;

    // Pipeline overrides
    if let Ok(val) = std::env::var("SHROUD_PIPELINE_ENDPOINT") {
        config.pipeline.endpoint = Some(val);
    }
    if let Ok(val) = std::env::var("SHROUD_PIPELINE_API_KEY") {
        config.pipeline.api_key = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("SHROUD_PIPELINE_MODEL_ID") {
        config.pipeline.model_id = val;
    }
    if let Ok(val) = std::env::var("SHROUD_PIPELINE_TOP_K") {
        if let Ok(top_k) = val.parse() {
            config.pipeline.top_k = top_k;
        }
    }
    if let Ok(val) = std::env::var("SHROUD_PIPELINE_MAX_RETRIES") {
        if let Ok(retries) = val.parse() {
            config.pipeline.max_retries = retries;
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("SHROUD_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_bool("SHROUD_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Ok(val) = std::env::var("SHROUD_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    value
        .parse()
        .map_err(|_| ShroudError::Configuration(format!("Invalid {name} value: {value}")))
}
