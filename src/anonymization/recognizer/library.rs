//! Pattern library for entity recognition

use super::pattern::{PatternRecognizer, PatternRecognizerConfig};
use crate::domain::{Result, ShroudError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Pattern library container
#[derive(Debug, Deserialize)]
struct PatternLibrary {
    recognizers: BTreeMap<String, PatternRecognizerConfig>,
}

/// Load recognizers from a TOML pattern library file
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Vec<PatternRecognizer>> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
        ShroudError::Configuration(format!(
            "Failed to read pattern library {}: {e}",
            path.as_ref().display()
        ))
    })?;

    from_toml(&content)
}

/// Load recognizers from TOML content
///
/// Table names become recognizer names unless the entry sets `name`.
pub fn from_toml(content: &str) -> Result<Vec<PatternRecognizer>> {
    let library: PatternLibrary = toml::from_str(content)
        .map_err(|e| ShroudError::Configuration(format!("Failed to parse pattern library: {e}")))?;

    library
        .recognizers
        .into_iter()
        .map(|(table_name, mut config)| {
            if config.name.is_none() {
                config.name = Some(table_name);
            }
            config.build()
        })
        .collect()
}

/// Built-in recognizers compiled from the embedded library
pub fn default_recognizers() -> Result<Vec<PatternRecognizer>> {
    let default_toml = include_str!("../../../patterns/default_recognizers.toml");
    from_toml(default_toml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::models::labels;
    use crate::anonymization::recognizer::Recognizer;

    fn find<'a>(recognizers: &'a [PatternRecognizer], entity: &str) -> &'a PatternRecognizer {
        recognizers
            .iter()
            .find(|r| r.entity().as_str() == entity)
            .unwrap()
    }

    fn texts(recognizer: &PatternRecognizer, text: &str) -> Vec<String> {
        recognizer
            .analyze(text, &[], "en")
            .unwrap()
            .into_iter()
            .map(|m| m.text().to_string())
            .collect()
    }

    #[test]
    fn test_load_default_recognizers() {
        let recognizers = default_recognizers().unwrap();
        assert!(recognizers.len() >= 10);
        assert!(recognizers.iter().any(|r| r.name() == "email_recognizer"));
    }

    #[test]
    fn test_email_pattern() {
        let recognizers = default_recognizers().unwrap();
        let email = find(&recognizers, labels::EMAIL_ADDRESS);
        assert_eq!(
            texts(email, "reach me at johndoe@example.com."),
            vec!["johndoe@example.com"]
        );
        assert!(texts(email, "not-an-email").is_empty());
    }

    #[test]
    fn test_phone_pattern() {
        let recognizers = default_recognizers().unwrap();
        let phone = find(&recognizers, labels::PHONE_NUMBER);
        assert_eq!(
            texts(phone, "My phone number is 999-888-7777"),
            vec!["999-888-7777"]
        );
        assert_eq!(texts(phone, "Call (555) 123-4567"), vec!["(555) 123-4567"]);
        assert!(texts(phone, "account 1234567890").is_empty());
    }

    #[test]
    fn test_ssn_and_iban_patterns() {
        let recognizers = default_recognizers().unwrap();
        let ssn = find(&recognizers, labels::US_SSN);
        assert_eq!(texts(ssn, "SSN 602-76-4532."), vec!["602-76-4532"]);

        let iban = find(&recognizers, labels::IBAN_CODE);
        assert_eq!(
            texts(iban, "account, PL61109010140000071219812874."),
            vec!["PL61109010140000071219812874"]
        );
    }

    #[test]
    fn test_driver_license_context_pattern() {
        let recognizers = default_recognizers().unwrap();
        let dl = find(&recognizers, labels::US_DRIVER_LICENSE);
        assert_eq!(
            texts(dl, "a driver's license - DL No: 999000680 issued"),
            vec!["999000680"]
        );
    }

    #[test]
    fn test_date_pattern() {
        let recognizers = default_recognizers().unwrap();
        let date = find(&recognizers, labels::DATE_TIME);
        assert_eq!(
            texts(date, "Date: October 19, 2021"),
            vec!["October 19, 2021"]
        );
    }

    #[test]
    fn test_from_toml_uses_table_name() {
        let content = r#"
[recognizers.party_names]
entity = "LEGAL_TERM"
deny_list = ["Nomura"]
"#;
        let recognizers = from_toml(content).unwrap();
        assert_eq!(recognizers.len(), 1);
        assert_eq!(recognizers[0].name(), "party_names");
    }

    #[test]
    fn test_from_toml_rejects_bad_label() {
        let content = r#"
[recognizers.bad]
entity = "not valid"
deny_list = ["x"]
"#;
        assert!(from_toml(content).is_err());
    }

    #[test]
    fn test_from_file_missing() {
        assert!(from_file("/nonexistent/patterns.toml").is_err());
    }
}
