//! Validate config command implementation

use crate::anonymization::ReversibleAnonymizer;
use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading validates every section
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        // Building the anonymizer compiles every recognizer pattern
        let mut anonymizer_config = config.anonymizer.clone();
        anonymizer_config.audit.enabled = false;
        let anonymizer = match ReversibleAnonymizer::from_config(&anonymizer_config, true) {
            Ok(a) => a,
            Err(e) => {
                println!("❌ Anonymizer could not be built");
                println!("   Error: {e}");
                return Ok(2);
            }
        };
        let entities = anonymizer
            .supported_entities()?
            .iter()
            .map(|l| l.as_str().to_string())
            .collect::<Vec<_>>();

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Language: {}", config.anonymizer.language);
        println!("  Supported Entities: {}", entities.join(", "));
        println!(
            "  Faker Seed: {}",
            config
                .anonymizer
                .faker_seed
                .map_or_else(|| "random".to_string(), |s| s.to_string())
        );
        println!(
            "  Mapping File: {}",
            config
                .anonymizer
                .mapping_path
                .as_ref()
                .map_or_else(|| "(none)".to_string(), |p| p.display().to_string())
        );
        println!("  Custom Operators: {}", config.anonymizer.operators.len());
        println!("  Audit Log: {}", config.anonymizer.audit.enabled);
        println!(
            "  Answer Model: {}",
            config.pipeline.endpoint.as_deref().unwrap_or("(not configured)")
        );
        println!("  Model ID: {}", config.pipeline.model_id);
        println!(
            "  Chunking: {} chars, {} overlap, top {}",
            config.pipeline.chunk_size, config.pipeline.chunk_overlap, config.pipeline.top_k
        );
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_invalid_config_exit_code() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[anonymizer]\nscore_threshold = 1.5\n").unwrap();
        file.flush().unwrap();

        let code = ValidateArgs {}
            .execute(&file.path().to_string_lossy())
            .await
            .unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_valid_config_exit_code() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[anonymizer]\npresets = [\"polish_id\"]\n").unwrap();
        file.flush().unwrap();

        let code = ValidateArgs {}
            .execute(&file.path().to_string_lossy())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }
}
