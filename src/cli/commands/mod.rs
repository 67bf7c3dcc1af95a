//! CLI command implementations
//!
//! Commands that write text to stdout print their status lines to stderr.

pub mod analyze;
pub mod anonymize;
pub mod ask;
pub mod deanonymize;
pub mod init;
pub mod validate;

use crate::anonymization::{JsonFileStore, ReversibleAnonymizer};
use crate::config::{load_config, load_config_str, ShroudConfig};
use crate::domain::{Result, ShroudError};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const DEFAULT_CONFIG_PATH: &str = "shroud.toml";

/// Load the configuration file
///
/// A missing file at the default location falls back to built-in defaults
/// (environment overrides still apply). An explicitly named file must exist.
pub(crate) fn load(config_path: &str) -> Result<ShroudConfig> {
    if config_path == DEFAULT_CONFIG_PATH && !Path::new(config_path).exists() {
        tracing::debug!("No shroud.toml found, using defaults");
        return load_config_str("");
    }
    load_config(config_path)
}

/// Exit code for an error: 2 for configuration problems, 5 otherwise
pub(crate) fn exit_code(error: &ShroudError) -> i32 {
    match error {
        ShroudError::Configuration(_) | ShroudError::Validation(_) => 2,
        _ => 5,
    }
}

pub(crate) fn report_error(context: &str, error: &ShroudError) -> i32 {
    crate::log_error_with_context!(error, context);
    eprintln!("❌ {context}");
    eprintln!("   Error: {error}");
    exit_code(error)
}

/// Build the anonymizer and load the persisted mapping, if any
pub(crate) fn build_anonymizer(
    config: &ShroudConfig,
    dry_run: bool,
) -> Result<(ReversibleAnonymizer, Option<JsonFileStore>)> {
    let anonymizer = ReversibleAnonymizer::from_config(&config.anonymizer, dry_run)?;
    let store = config.anonymizer.mapping_path.as_ref().map(JsonFileStore::new);
    if let Some(ref store) = store {
        anonymizer.load_mapping(store)?;
    }
    Ok((anonymizer, store))
}

/// Read a file, or stdin when the path is absent or `-`
pub(crate) fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(p) if p.as_os_str() != "-" => std::fs::read_to_string(p)
            .map_err(|e| ShroudError::Io(format!("Failed to read {}: {e}", p.display()))),
        _ => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Write to a file, or stdout when the path is absent or `-`
pub(crate) fn write_output(path: Option<&PathBuf>, text: &str) -> Result<()> {
    match path {
        Some(p) if p.as_os_str() != "-" => {
            if let Some(parent) = p.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(p, text)?;
        }
        _ => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
