//! Deanonymize command implementation

use super::{build_anonymizer, load, read_input, report_error, write_output};
use crate::domain::{Result, ShroudError};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the deanonymize command
#[derive(Args, Debug)]
pub struct DeanonymizeArgs {
    /// Input file (stdin when omitted or `-`)
    pub input: Option<PathBuf>,

    /// Output file (stdout when omitted or `-`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Mapping file (overrides anonymizer.mapping_path)
    #[arg(short, long)]
    pub mapping: Option<PathBuf>,
}

impl DeanonymizeArgs {
    /// Execute the deanonymize command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting deanonymize command");

        match self.run(config_path) {
            Ok(()) => Ok(0),
            Err(e) => Ok(report_error("Deanonymization failed", &e)),
        }
    }

    fn run(&self, config_path: &str) -> Result<()> {
        let mut config = load(config_path)?;
        if let Some(ref mapping) = self.mapping {
            config.anonymizer.mapping_path = Some(mapping.clone());
        }
        if config.anonymizer.mapping_path.is_none() {
            return Err(ShroudError::Configuration(
                "A mapping file is required: pass --mapping or set anonymizer.mapping_path"
                    .to_string(),
            ));
        }

        let (anonymizer, _) = build_anonymizer(&config, false)?;
        let pairs = anonymizer.mapping()?.len();
        if pairs == 0 {
            eprintln!("⚠️  Mapping is empty; text is returned unchanged");
        }

        let text = read_input(self.input.as_ref())?;
        let restored = anonymizer.deanonymize(&text)?;
        write_output(self.output.as_ref(), &restored)?;

        eprintln!("✅ Restored text using {pairs} mapping pairs");
        Ok(())
    }
}
