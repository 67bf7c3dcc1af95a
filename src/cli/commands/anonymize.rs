//! Anonymize command implementation

use super::{build_anonymizer, load, read_input, report_error, write_output};
use crate::anonymization::{AnonymizationReport, MappingStore};
use crate::domain::Result;
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the anonymize command
#[derive(Args, Debug)]
pub struct AnonymizeArgs {
    /// Input file (stdin when omitted or `-`)
    pub input: Option<PathBuf>,

    /// Output file (stdout when omitted or `-`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write a JSON report of the substitutions
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Mapping file (overrides anonymizer.mapping_path)
    #[arg(short, long)]
    pub mapping: Option<PathBuf>,

    /// Seed for reproducible fake values (overrides anonymizer.faker_seed)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Detect entities without substituting or recording anything
    #[arg(long)]
    pub dry_run: bool,
}

impl AnonymizeArgs {
    /// Execute the anonymize command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting anonymize command");

        match self.run(config_path) {
            Ok(()) => Ok(0),
            Err(e) => Ok(report_error("Anonymization failed", &e)),
        }
    }

    fn run(&self, config_path: &str) -> Result<()> {
        let mut config = load(config_path)?;
        if let Some(ref mapping) = self.mapping {
            config.anonymizer.mapping_path = Some(mapping.clone());
        }
        if let Some(seed) = self.seed {
            config.anonymizer.faker_seed = Some(seed);
        }
        let dry_run = self.dry_run || config.application.dry_run;

        let (anonymizer, store) = build_anonymizer(&config, dry_run)?;
        let text = read_input(self.input.as_ref())?;

        let started = Instant::now();
        let result = anonymizer.anonymize_detailed(&text)?;
        let report = AnonymizationReport::from_result(&result);
        crate::log_anonymization!(report.total(), report.new_mappings, started.elapsed());

        write_output(self.output.as_ref(), &result.text)?;

        if let Some(ref path) = self.report {
            report.write_to(path)?;
            eprintln!("📄 Report written to {}", path.display());
        }

        match store {
            Some(ref store) if !dry_run => {
                store.save(&anonymizer.mapping()?)?;
                eprintln!("🔐 Mapping saved to {}", store.path().display());
            }
            None if !dry_run && report.new_mappings > 0 => {
                eprintln!("⚠️  No mapping path configured; substitutes cannot be reversed later");
            }
            _ => {}
        }

        eprintln!("✅ {}", report.summary());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::{AnonymizationMapping, JsonFileStore};

    #[tokio::test]
    async fn test_anonymize_file_with_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("contract.txt");
        let output = dir.path().join("contract.anon.txt");
        let mapping = dir.path().join("mapping.json");
        std::fs::write(&input, "Contact billing@acme.com or 555-123-4567.").unwrap();

        let args = AnonymizeArgs {
            input: Some(input),
            output: Some(output.clone()),
            report: None,
            mapping: Some(mapping.clone()),
            seed: Some(42),
            dry_run: false,
        };
        let code = args
            .execute(&dir.path().join("missing.toml").to_string_lossy())
            .await
            .unwrap();
        // An explicitly named config file must exist
        assert_eq!(code, 2);

        let code = args.execute(super::super::DEFAULT_CONFIG_PATH).await.unwrap();
        assert_eq!(code, 0);

        let anonymized = std::fs::read_to_string(&output).unwrap();
        assert!(!anonymized.contains("billing@acme.com"));
        assert!(!anonymized.contains("555-123-4567"));

        let saved: AnonymizationMapping = JsonFileStore::new(&mapping).load().unwrap();
        assert_eq!(saved.len(), 2);
        assert!(saved.get("EMAIL_ADDRESS", "billing@acme.com").is_some());
    }
}
