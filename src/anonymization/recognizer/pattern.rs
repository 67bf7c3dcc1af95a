//! Regex and deny-list based recognizer

use super::Recognizer;
use crate::anonymization::models::{EntityLabel, EntityMatch};
use crate::domain::{RecognitionError, Result, ShroudError};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Named group that narrows a match to the sensitive part
const VALUE_GROUP: &str = "value";

/// A single regex pattern with its confidence score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternConfig {
    /// Pattern name (used in error messages)
    pub name: String,
    /// Regex source
    pub regex: String,
    /// Confidence score (0.0 - 1.0)
    pub score: f32,
}

/// Post-match validation applied to every candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Validator {
    /// Luhn checksum (card numbers)
    Luhn,
    /// ISO 13616 mod-97 checksum
    Iban,
}

impl Validator {
    /// Validate a matched value
    pub fn validate(&self, value: &str) -> bool {
        match self {
            Self::Luhn => luhn_valid(value),
            Self::Iban => iban_valid(value),
        }
    }
}

/// Serializable description of a pattern recognizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRecognizerConfig {
    /// Entity label produced by this recognizer
    pub entity: String,

    /// Registry name; defaults to `<entity>_recognizer` in lower case
    #[serde(default)]
    pub name: Option<String>,

    /// Regex patterns
    #[serde(default)]
    pub patterns: Vec<PatternConfig>,

    /// Literal terms matched on word boundaries with score 1.0
    #[serde(default)]
    pub deny_list: Vec<String>,

    /// Language served by this recognizer
    #[serde(default = "default_language")]
    pub language: String,

    /// Case-insensitive matching
    #[serde(default = "default_ignore_case")]
    pub ignore_case: bool,

    /// Optional checksum validation
    #[serde(default)]
    pub validator: Option<Validator>,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_ignore_case() -> bool {
    true
}

impl PatternRecognizerConfig {
    /// Create a config for a label with no patterns yet
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            name: None,
            patterns: Vec::new(),
            deny_list: Vec::new(),
            language: default_language(),
            ignore_case: default_ignore_case(),
            validator: None,
        }
    }

    /// Add a regex pattern
    pub fn with_pattern(mut self, name: &str, regex: &str, score: f32) -> Self {
        self.patterns.push(PatternConfig {
            name: name.to_string(),
            regex: regex.to_string(),
            score,
        });
        self
    }

    /// Add deny-list terms
    pub fn with_deny_list<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deny_list.extend(terms.into_iter().map(Into::into));
        self
    }

    /// Set the registry name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Compile into a recognizer
    pub fn build(&self) -> Result<PatternRecognizer> {
        PatternRecognizer::from_config(self)
    }
}

#[derive(Debug, Clone)]
struct CompiledPattern {
    name: String,
    regex: Regex,
    score: f32,
}

/// Recognizer matching regex patterns and deny-list terms for one label
///
/// # Examples
///
/// ```
/// use shroud::anonymization::recognizer::{PatternRecognizerConfig, Recognizer};
/// use shroud::anonymization::models::EntityLabel;
///
/// let recognizer = PatternRecognizerConfig::new("POLISH_ID")
///     .with_pattern("polish_id_pattern", r"[A-Z]{3}\d{6}", 1.0)
///     .build()
///     .unwrap();
///
/// let label = EntityLabel::new("POLISH_ID").unwrap();
/// let found = recognizer.analyze("card ABC123456", &[label], "en").unwrap();
/// assert_eq!(found[0].text(), "ABC123456");
/// ```
#[derive(Debug, Clone)]
pub struct PatternRecognizer {
    name: String,
    entity: EntityLabel,
    language: String,
    patterns: Vec<CompiledPattern>,
    validator: Option<Validator>,
}

impl PatternRecognizer {
    /// Compile a recognizer from its configuration
    pub fn from_config(config: &PatternRecognizerConfig) -> Result<Self> {
        let entity = EntityLabel::new(config.entity.as_str()).map_err(ShroudError::Validation)?;
        let name = config
            .name
            .clone()
            .unwrap_or_else(|| format!("{}_recognizer", entity.as_str().to_lowercase()));

        if config.patterns.is_empty() && config.deny_list.is_empty() {
            return Err(ShroudError::Validation(format!(
                "Recognizer '{name}' needs at least one pattern or deny-list term"
            )));
        }

        let mut patterns = Vec::with_capacity(config.patterns.len() + 1);
        for pattern in &config.patterns {
            if !(0.0..=1.0).contains(&pattern.score) {
                return Err(ShroudError::Validation(format!(
                    "Pattern '{}' score {} is outside [0, 1]",
                    pattern.name, pattern.score
                )));
            }
            patterns.push(CompiledPattern {
                name: pattern.name.clone(),
                regex: compile(&pattern.name, &pattern.regex, config.ignore_case)?,
                score: pattern.score,
            });
        }

        let terms: Vec<String> = config
            .deny_list
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(regex::escape)
            .collect();
        if !terms.is_empty() {
            let deny_name = format!("{name}_deny_list");
            let source = format!(r"\b(?:{})\b", terms.join("|"));
            patterns.push(CompiledPattern {
                regex: compile(&deny_name, &source, config.ignore_case)?,
                name: deny_name,
                score: 1.0,
            });
        }

        Ok(Self {
            name,
            entity,
            language: config.language.to_lowercase(),
            patterns,
            validator: config.validator,
        })
    }

    /// The label this recognizer produces
    pub fn entity(&self) -> &EntityLabel {
        &self.entity
    }

    fn score_for(&self, value: &str, pattern_score: f32) -> Option<f32> {
        match self.validator {
            Some(validator) if validator.validate(value) => Some(1.0),
            Some(_) => None,
            None => Some(pattern_score),
        }
    }
}

fn compile(name: &str, source: &str, ignore_case: bool) -> Result<Regex> {
    RegexBuilder::new(source)
        .case_insensitive(ignore_case)
        .multi_line(true)
        .build()
        .map_err(|e| {
            RecognitionError::InvalidPattern {
                name: name.to_string(),
                message: e.to_string(),
            }
            .into()
        })
}

impl Recognizer for PatternRecognizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_entities(&self) -> Vec<EntityLabel> {
        vec![self.entity.clone()]
    }

    fn supported_language(&self) -> &str {
        &self.language
    }

    fn analyze(
        &self,
        text: &str,
        entities: &[EntityLabel],
        _language: &str,
    ) -> Result<Vec<EntityMatch>> {
        if !entities.is_empty() && !entities.contains(&self.entity) {
            return Ok(Vec::new());
        }

        let mut found = Vec::new();
        for pattern in &self.patterns {
            for captures in pattern.regex.captures_iter(text) {
                let matched = captures.name(VALUE_GROUP).or_else(|| captures.get(0));
                let Some(matched) = matched else {
                    continue;
                };
                if matched.as_str().is_empty() {
                    continue;
                }
                let Some(score) = self.score_for(matched.as_str(), pattern.score) else {
                    tracing::trace!(
                        recognizer = %self.name,
                        pattern = %pattern.name,
                        "Candidate rejected by validator"
                    );
                    continue;
                };
                found.push(EntityMatch::new(
                    self.entity.clone(),
                    matched.start(),
                    matched.end(),
                    score,
                    matched.as_str(),
                    self.name.as_str(),
                ));
            }
        }

        Ok(found)
    }
}

fn luhn_valid(value: &str) -> bool {
    let digits: Vec<u32> = value.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() < 12 || digits.len() > 19 {
        return false;
    }
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

fn iban_valid(value: &str) -> bool {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.len() < 15 || compact.len() > 34 || !compact.is_ascii() {
        return false;
    }
    let (head, tail) = compact.split_at(4);
    let mut remainder: u32 = 0;
    for c in tail.chars().chain(head.chars()) {
        let Some(value) = c.to_digit(36) else {
            return false;
        };
        remainder = if value >= 10 {
            (remainder * 100 + value) % 97
        } else {
            (remainder * 10 + value) % 97
        };
    }
    remainder == 1
}
