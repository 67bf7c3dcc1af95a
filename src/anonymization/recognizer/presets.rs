//! Ready-made custom recognizers
//!
//! Polish identity card numbers, 12-hour clock times and a small set of
//! legal terms. Enable them with `presets = [...]` in the anonymizer config.

use super::pattern::{PatternRecognizer, PatternRecognizerConfig};
use crate::anonymization::models::labels;
use crate::domain::Result;

/// Names accepted by [`preset`]
pub const PRESET_NAMES: &[&str] = &["polish_id", "time", "legal_terms"];

/// Polish identity card number: three letters followed by six digits
pub fn polish_id() -> PatternRecognizerConfig {
    PatternRecognizerConfig::new(labels::POLISH_ID).with_pattern(
        "polish_id_pattern",
        r"[A-Z]{3}\d{6}",
        1.0,
    )
}

/// 12-hour clock time such as `9:30 AM`
pub fn time() -> PatternRecognizerConfig {
    PatternRecognizerConfig::new(labels::TIME).with_pattern(
        "time_pattern",
        r"(1[0-2]|0?[1-9]):[0-5][0-9] (AM|PM)",
        1.0,
    )
}

/// Party names, contract terms and bank-account phrases
pub fn legal_terms() -> PatternRecognizerConfig {
    PatternRecognizerConfig::new(labels::LEGAL_TERM)
        .with_pattern("party_name_pattern", r"\b(Nomura)\b", 0.5)
        .with_pattern(
            "contract_terms_pattern",
            r"\b(Confidentiality Agreement|Non-Disclosure Agreement|NDA)\b",
            0.5,
        )
        .with_pattern(
            "financial_info_pattern",
            r"\b(Bank Account Number: \d{10,12})\b",
            0.5,
        )
}

/// Build a preset recognizer by name
pub fn preset(name: &str) -> Option<Result<PatternRecognizer>> {
    let config = match name.to_lowercase().as_str() {
        "polish_id" => polish_id(),
        "time" => time(),
        "legal_terms" => legal_terms(),
        _ => return None,
    };
    Some(config.build())
}
