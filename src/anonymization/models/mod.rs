//! Anonymization data models

pub mod entity;
pub mod mapping;

pub use entity::{labels, EntityLabel, EntityMatch};
pub use mapping::{AnonymizationMapping, MappingEntries};

use serde::{Deserialize, Serialize};

/// A substitution applied to one recognized span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedSubstitution {
    /// The recognized span in the input text
    pub entity: EntityMatch,
    /// Value written in place of the span
    pub substitute: String,
    /// Name of the operator that produced the substitute
    pub operator: String,
    /// Start offset of the substitute in the output text
    pub output_start: usize,
    /// End offset of the substitute in the output text
    pub output_end: usize,
    /// Whether this call recorded a new mapping pair
    pub newly_mapped: bool,
}

/// Result of a detailed anonymize call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnonymizedText {
    /// Fully substituted text
    pub text: String,
    /// Substitutions in output order
    pub substitutions: Vec<AppliedSubstitution>,
    /// Whether substitution was skipped (dry-run)
    pub dry_run: bool,
}

impl AnonymizedText {
    /// Total number of substituted spans
    pub fn total_substitutions(&self) -> usize {
        self.substitutions.len()
    }

    /// Check if anything was detected
    pub fn has_detections(&self) -> bool {
        !self.substitutions.is_empty()
    }
}
