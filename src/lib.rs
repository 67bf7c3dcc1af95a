// Shroud - Reversible anonymization for LLM pipelines
// Copyright (c) 2025 Shroud Contributors
// Licensed under the MIT License

//! # Shroud - Reversible Anonymization
//!
//! Shroud replaces personal and sensitive information in text with realistic
//! substitutes before the text reaches a language model, and restores the
//! originals in whatever comes back.
//!
//! ## Overview
//!
//! This library provides:
//! - **Recognition** of entities with pattern recognizers
//! - **Substitution** with fake values, masks, hashes or custom operators
//! - **Mapping** of every substitute to its original, persisted as JSON
//! - **Deanonymization** of model output in a single pass
//! - **Question answering** over anonymized documents
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`anonymization`] - Recognizers, operators, mapping and the anonymizer
//! - [`pipeline`] - Splitting, retrieval, prompt and answer model glue
//! - [`domain`] - Error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shroud::anonymization::{JsonFileStore, ReversibleAnonymizer};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let anonymizer = ReversibleAnonymizer::builder().faker_seed(42).build()?;
//!
//!     let safe = anonymizer.anonymize("Write to jane.doe@example.com about the invoice")?;
//!     let answer = format!("Model reply quoting: {safe}");
//!     println!("{}", anonymizer.deanonymize(&answer)?);
//!
//!     anonymizer.save_mapping(&JsonFileStore::new("mapping.json"))?;
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Shroud uses the [`domain::ShroudError`] type for all library errors:
//!
//! ```rust,no_run
//! use shroud::domain::ShroudError;
//!
//! fn example() -> Result<(), ShroudError> {
//!     let config = shroud::config::load_config("shroud.toml")?;
//!     let _anonymizer =
//!         shroud::anonymization::ReversibleAnonymizer::from_config(&config.anonymizer, false)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Shroud logs through the `tracing` crate. Events carry labels, counts and
//! hashes, never original values.

pub mod anonymization;
pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
pub mod pipeline;
