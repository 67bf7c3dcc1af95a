//! Anonymization reports
//!
//! A report describes one anonymize call: the anonymized text, one record per
//! substituted span and per-label counts. Original values are represented
//! only by their SHA-256 hash.

use crate::anonymization::models::AnonymizedText;
use crate::anonymization::operators::value_hash;
use crate::domain::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Report for one anonymize call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnonymizationReport {
    /// When the report was created (RFC 3339)
    pub generated_at: String,

    /// The anonymized text
    pub anonymized_text: String,

    /// Whether the call ran in dry-run mode
    pub dry_run: bool,

    /// One record per substituted span, in text order
    pub entities: Vec<EntityRecord>,

    /// Substituted spans per label
    pub counts_by_label: BTreeMap<String, usize>,

    /// Pairs added to the mapping by this call
    pub new_mappings: usize,
}

/// A substituted span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub label: String,
    pub recognizer: String,
    pub operator: String,
    pub score: f32,
    /// Offsets in the input text
    pub start: usize,
    pub end: usize,
    /// Offsets in the anonymized text
    pub output_start: usize,
    pub output_end: usize,
    pub substitute: String,
    /// SHA-256 hash of the original value
    pub value_hash: String,
}

impl AnonymizationReport {
    /// Build a report from a detailed anonymize result
    pub fn from_result(result: &AnonymizedText) -> Self {
        let mut counts_by_label = BTreeMap::new();
        let entities = result
            .substitutions
            .iter()
            .map(|s| {
                *counts_by_label
                    .entry(s.entity.label().to_string())
                    .or_insert(0) += 1;
                EntityRecord {
                    label: s.entity.label().to_string(),
                    recognizer: s.entity.recognizer().to_string(),
                    operator: s.operator.clone(),
                    score: s.entity.score(),
                    start: s.entity.start(),
                    end: s.entity.end(),
                    output_start: s.output_start,
                    output_end: s.output_end,
                    // A dry-run substitute is the original itself
                    substitute: if result.dry_run {
                        String::new()
                    } else {
                        s.substitute.clone()
                    },
                    value_hash: value_hash(s.entity.text()),
                }
            })
            .collect();

        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            anonymized_text: result.text.clone(),
            dry_run: result.dry_run,
            entities,
            counts_by_label,
            new_mappings: result.substitutions.iter().filter(|s| s.newly_mapped).count(),
        }
    }

    /// Total substituted spans
    pub fn total(&self) -> usize {
        self.entities.len()
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as pretty JSON
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Human-readable summary
    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "{} entities substituted ({} new mappings){}",
            self.total(),
            self.new_mappings,
            if self.dry_run { " [dry run]" } else { "" }
        )];
        for (label, count) in &self.counts_by_label {
            lines.push(format!("  {label}: {count}"));
        }
        lines.join("\n")
    }
}
