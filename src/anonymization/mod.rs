//! Reversible anonymization
//!
//! Detects sensitive spans in text, replaces them with substitutes and keeps
//! a mapping so the substitutes can later be turned back into the originals.
//!
//! # Architecture
//!
//! - **Recognition**: pattern recognizers behind the [`Recognizer`] trait
//! - **Resolution**: overlapping spans reduced to a non-overlapping set
//! - **Operators**: replace, mask, hash, fake, template, time or custom
//! - **Mapping**: `label → original → substitute`, persisted as JSON
//! - **Audit**: JSON-lines log with hashed values
//!
//! # Usage
//!
//! ```rust,ignore
//! use shroud::anonymization::{AnonymizerConfig, ReversibleAnonymizer};
//!
//! let anonymizer = ReversibleAnonymizer::from_config(&AnonymizerConfig::default(), false)?;
//! let safe = anonymizer.anonymize(question)?;
//! let answer = anonymizer.deanonymize(&model_output)?;
//! ```

pub mod audit;
pub mod config;
pub mod engine;
pub mod faker;
pub mod models;
pub mod operators;
pub mod recognizer;
pub mod report;
pub mod resolve;
pub mod store;

// Re-export main types
pub use config::AnonymizerConfig;
pub use engine::{AnonymizerBuilder, ReversibleAnonymizer};
pub use models::{AnonymizationMapping, AnonymizedText, EntityLabel, EntityMatch};
pub use operators::{Operator, OperatorConfig};
pub use recognizer::{Recognizer, RecognizerRegistry};
pub use report::AnonymizationReport;
pub use store::{JsonFileStore, MappingStore};
