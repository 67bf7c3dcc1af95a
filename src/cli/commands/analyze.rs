//! Analyze command implementation
//!
//! Prints the resolved detections as JSON without substituting anything.

use super::{load, read_input, report_error, write_output};
use crate::anonymization::{EntityMatch, ReversibleAnonymizer};
use crate::domain::Result;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Arguments for the analyze command
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Input file (stdin when omitted or `-`)
    pub input: Option<PathBuf>,

    /// Output file (stdout when omitted or `-`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Only detect these labels (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub entities: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Detection<'a> {
    label: &'a str,
    text: &'a str,
    start: usize,
    end: usize,
    score: f32,
    recognizer: &'a str,
}

impl<'a> From<&'a EntityMatch> for Detection<'a> {
    fn from(m: &'a EntityMatch) -> Self {
        Self {
            label: m.label().as_str(),
            text: m.text(),
            start: m.start(),
            end: m.end(),
            score: m.score(),
            recognizer: m.recognizer(),
        }
    }
}

impl AnalyzeArgs {
    /// Execute the analyze command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting analyze command");

        match self.run(config_path) {
            Ok(()) => Ok(0),
            Err(e) => Ok(report_error("Analysis failed", &e)),
        }
    }

    fn run(&self, config_path: &str) -> Result<()> {
        let mut config = load(config_path)?;
        if !self.entities.is_empty() {
            config.anonymizer.entities = self.entities.clone();
        }

        // Detection only: no mapping is loaded and nothing is audited
        config.anonymizer.audit.enabled = false;
        let anonymizer = ReversibleAnonymizer::from_config(&config.anonymizer, true)?;

        let text = read_input(self.input.as_ref())?;
        let matches = anonymizer.analyze(&text)?;
        let detections: Vec<Detection<'_>> = matches.iter().map(Detection::from).collect();

        let mut json = serde_json::to_string_pretty(&detections)?;
        json.push('\n');
        write_output(self.output.as_ref(), &json)?;

        eprintln!("🔍 {} entities detected", detections.len());
        Ok(())
    }
}
