//! Entity labels and recognized spans

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Well-known entity labels
///
/// Custom recognizers may introduce any other label that passes
/// [`EntityLabel::new`] validation.
pub mod labels {
    pub const PERSON: &str = "PERSON";
    pub const PHONE_NUMBER: &str = "PHONE_NUMBER";
    pub const EMAIL_ADDRESS: &str = "EMAIL_ADDRESS";
    pub const ORGANIZATION: &str = "ORGANIZATION";
    pub const LOCATION: &str = "LOCATION";
    pub const CREDIT_CARD: &str = "CREDIT_CARD";
    pub const DATE_TIME: &str = "DATE_TIME";
    pub const NRP: &str = "NRP";
    pub const IP_ADDRESS: &str = "IP_ADDRESS";
    pub const IBAN_CODE: &str = "IBAN_CODE";
    pub const US_DRIVER_LICENSE: &str = "US_DRIVER_LICENSE";
    pub const US_SSN: &str = "US_SSN";
    pub const URL: &str = "URL";
    pub const AWS_ACCESS_KEY: &str = "AWS_ACCESS_KEY";
    pub const IPV4: &str = "IPV4";
    pub const IPV6: &str = "IPV6";
    pub const TIME: &str = "TIME";
    pub const POLISH_ID: &str = "POLISH_ID";
    pub const LEGAL_TERM: &str = "LEGAL_TERM";
}

/// Entity label newtype wrapper
///
/// Labels are upper-case identifiers made of `A-Z`, `0-9` and `_`.
/// Input is trimmed and upper-cased before validation.
///
/// # Examples
///
/// ```
/// use shroud::anonymization::models::EntityLabel;
///
/// let label = EntityLabel::new("polish_id").unwrap();
/// assert_eq!(label.as_str(), "POLISH_ID");
/// assert!(EntityLabel::new("not a label").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityLabel(String);

impl EntityLabel {
    /// Creates a new label, normalizing case
    pub fn new(label: impl Into<String>) -> Result<Self, String> {
        let label = label.into().trim().to_uppercase();
        if label.is_empty() {
            return Err("Entity label cannot be empty".to_string());
        }
        if !label
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(format!(
                "Invalid entity label '{label}'. Labels may only contain A-Z, 0-9 and '_'"
            ));
        }
        Ok(Self(label))
    }

    /// Returns the label as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for EntityLabel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntityLabel> for String {
    fn from(label: EntityLabel) -> Self {
        label.0
    }
}

impl AsRef<str> for EntityLabel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EntityLabel {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A span of text recognized as a sensitive entity
///
/// Offsets are byte offsets into the analyzed text; `end` is exclusive.
/// Matches are immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMatch {
    start: usize,
    end: usize,
    label: EntityLabel,
    score: f32,
    text: String,
    recognizer: String,
}

impl EntityMatch {
    /// Create a new match. The score is clamped to `[0, 1]`.
    pub fn new(
        label: EntityLabel,
        start: usize,
        end: usize,
        score: f32,
        text: impl Into<String>,
        recognizer: impl Into<String>,
    ) -> Self {
        Self {
            start,
            end,
            label,
            score: score.clamp(0.0, 1.0),
            text: text.into(),
            recognizer: recognizer.into(),
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn label(&self) -> &EntityLabel {
        &self.label
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    /// The matched source text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Name of the recognizer that produced this match
    pub fn recognizer(&self) -> &str {
        &self.recognizer
    }

    /// Span length in bytes (zero for inverted spans)
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The same match with its text taken from `source` at its offsets
    ///
    /// Recognizers may report normalized text; the mapping must key on the
    /// exact bytes that get replaced.
    pub fn anchored_to(mut self, source: &str) -> Self {
        if let Some(slice) = source.get(self.start..self.end) {
            if slice != self.text {
                self.text = slice.to_string();
            }
        }
        self
    }

    /// Whether two spans share at least one byte
    pub fn overlaps(&self, other: &EntityMatch) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(s: &str) -> EntityLabel {
        EntityLabel::new(s).unwrap()
    }

    #[test]
    fn test_label_normalization() {
        assert_eq!(label(" phone_number ").as_str(), "PHONE_NUMBER");
        assert_eq!(label("Iban_Code").to_string(), "IBAN_CODE");
    }

    #[test]
    fn test_label_validation() {
        assert!(EntityLabel::new("").is_err());
        assert!(EntityLabel::new("   ").is_err());
        assert!(EntityLabel::new("PHONE-NUMBER").is_err());
        assert!(EntityLabel::new("NAME WITH SPACE").is_err());
        assert!(EntityLabel::new("ZIP5").is_ok());
    }

    #[test]
    fn test_label_deserialize_validates() {
        let ok: EntityLabel = serde_json::from_str("\"person\"").unwrap();
        assert_eq!(ok.as_str(), labels::PERSON);

        let bad = serde_json::from_str::<EntityLabel>("\"bad label\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_match_overlap() {
        let a = EntityMatch::new(label("A"), 0, 5, 0.5, "hello", "r");
        let b = EntityMatch::new(label("B"), 4, 8, 0.5, "o wo", "r");
        let c = EntityMatch::new(label("C"), 5, 8, 0.5, " wo", "r");

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_match_score_clamped() {
        let m = EntityMatch::new(label("A"), 0, 1, 3.0, "x", "r");
        assert_eq!(m.score(), 1.0);
        let m = EntityMatch::new(label("A"), 0, 1, -1.0, "x", "r");
        assert_eq!(m.score(), 0.0);
    }

    #[test]
    fn test_inverted_span_is_empty() {
        let m = EntityMatch::new(label("A"), 5, 2, 1.0, "", "r");
        assert_eq!(m.len(), 0);
        assert!(m.is_empty());
    }
}
