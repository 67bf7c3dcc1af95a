//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Shroud using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Shroud - reversible anonymization for text sent to language models
#[derive(Parser, Debug)]
#[command(name = "shroud")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = commands::DEFAULT_CONFIG_PATH, env = "SHROUD_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SHROUD_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replace sensitive entities and persist the mapping
    Anonymize(commands::anonymize::AnonymizeArgs),

    /// Restore original values using the persisted mapping
    Deanonymize(commands::deanonymize::DeanonymizeArgs),

    /// Print detected entities as JSON without substituting
    Analyze(commands::analyze::AnalyzeArgs),

    /// Index documents and answer questions through the anonymizer
    Ask(commands::ask::AskArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
