//! Substitution operators
//!
//! An [`Operator`] turns an original value into its substitute. Operators are
//! resolved per label through the [`Operators`] registry; labels with no
//! usable operator fall back to an indexed placeholder that never contains
//! the original value.

pub mod hash;
pub mod mask;

pub use hash::{salted_hash, value_hash, HashType};
pub use mask::mask;

use crate::anonymization::faker::{self, FakeValueGenerator, FakerRng, DEFAULT_TIME_FORMAT};
use crate::anonymization::models::EntityLabel;
use crate::config::{secret_string, SecretString};
use crate::domain::{GenerationError, Result, ShroudError};
use chrono::format::{Item, StrftimeItems};
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Key of the fallback entry in operator configuration
pub const DEFAULT_OPERATOR_KEY: &str = "default";

/// Handler signature for code-registered operators
pub type CustomHandler = dyn Fn(&mut FakerRng, &str) -> String + Send + Sync;

/// A named substitution function registered in code
///
/// # Examples
///
/// ```
/// use shroud::anonymization::faker::bothify;
/// use shroud::anonymization::operators::CustomOperator;
///
/// let fake_polish_id = CustomOperator::new("fake_polish_id", |rng, _| bothify(rng, "???######"));
/// assert_eq!(fake_polish_id.name(), "fake_polish_id");
/// ```
#[derive(Clone)]
pub struct CustomOperator {
    name: String,
    handler: Arc<CustomHandler>,
}

impl CustomOperator {
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut FakerRng, &str) -> String + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            handler: Arc::new(handler),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, rng: &mut FakerRng, original: &str) -> String {
        (self.handler)(rng, original)
    }
}

impl fmt::Debug for CustomOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomOperator")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Substitution strategy for one label
#[derive(Debug, Clone)]
pub enum Operator {
    /// Fixed literal
    Replace { new_value: String },
    /// Overwrite characters with `masking_char`
    Mask {
        masking_char: char,
        chars_to_mask: usize,
        from_end: bool,
    },
    /// Hex digest of `salt || value`
    Hash {
        salt: SecretString,
        hash_type: HashType,
    },
    /// Value from the fake-value generator; `generator` overrides the label
    Fake { generator: Option<EntityLabel> },
    /// Bothify pattern (`?` letter, `#` digit)
    Template { pattern: String },
    /// Random time of day in a strftime format
    Time { format: String },
    /// Handler registered in code
    Custom(CustomOperator),
}

impl Operator {
    pub fn replace(new_value: impl Into<String>) -> Self {
        Self::Replace {
            new_value: new_value.into(),
        }
    }

    pub fn mask(masking_char: char, chars_to_mask: usize, from_end: bool) -> Self {
        Self::Mask {
            masking_char,
            chars_to_mask,
            from_end,
        }
    }

    pub fn hash(salt: impl Into<String>, hash_type: HashType) -> Self {
        Self::Hash {
            salt: secret_string(salt),
            hash_type,
        }
    }

    pub fn fake() -> Self {
        Self::Fake { generator: None }
    }

    pub fn template(pattern: impl Into<String>) -> Self {
        Self::Template {
            pattern: pattern.into(),
        }
    }

    pub fn custom<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut FakerRng, &str) -> String + Send + Sync + 'static,
    {
        Self::Custom(CustomOperator::new(name, handler))
    }

    /// Name recorded in reports and audit entries
    pub fn name(&self) -> &str {
        match self {
            Self::Replace { .. } => "replace",
            Self::Mask { .. } => "mask",
            Self::Hash { .. } => "hash",
            Self::Fake { .. } => "fake",
            Self::Template { .. } => "template",
            Self::Time { .. } => "time",
            Self::Custom(custom) => custom.name(),
        }
    }

    /// Whether output is random, so collisions can be retried
    pub fn is_generative(&self) -> bool {
        matches!(
            self,
            Self::Fake { .. } | Self::Template { .. } | Self::Time { .. } | Self::Custom(_)
        )
    }

    /// Produce a substitute for `value`
    ///
    /// # Errors
    ///
    /// `Fake` fails with [`GenerationError::UnsupportedLabel`] when the
    /// generator has nothing for the label.
    pub fn apply(
        &self,
        label: &EntityLabel,
        value: &str,
        generator: &mut dyn FakeValueGenerator,
    ) -> std::result::Result<String, GenerationError> {
        match self {
            Self::Replace { new_value } => Ok(new_value.clone()),
            Self::Mask {
                masking_char,
                chars_to_mask,
                from_end,
            } => Ok(mask(value, *masking_char, *chars_to_mask, *from_end)),
            Self::Hash { salt, hash_type } => {
                Ok(salted_hash(value, salt.expose_secret().as_ref(), *hash_type))
            }
            Self::Fake { generator: kind } => {
                let kind = kind.as_ref().unwrap_or(label);
                generator.generate(kind.as_str(), value)
            }
            Self::Template { pattern } => Ok(faker::bothify(generator.rng(), pattern)),
            Self::Time { format } => faker::random_time(generator.rng(), format),
            Self::Custom(custom) => Ok(custom.call(generator.rng(), value)),
        }
    }
}

/// Built-in fallback substitute: `<LABEL>`, `<LABEL_2>`, ...
pub fn placeholder(label: &EntityLabel, index: usize) -> String {
    if index <= 1 {
        format!("<{label}>")
    } else {
        format!("<{label}_{index}>")
    }
}

/// Serializable operator configuration
///
/// ```toml
/// [anonymizer.operators.PHONE_NUMBER]
/// type = "mask"
/// masking_char = "*"
/// chars_to_mask = 12
/// from_end = true
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperatorConfig {
    Replace {
        new_value: String,
    },
    Mask {
        #[serde(default = "default_masking_char")]
        masking_char: String,
        chars_to_mask: usize,
        #[serde(default)]
        from_end: bool,
    },
    Hash {
        #[serde(default)]
        salt: Option<SecretString>,
        #[serde(default)]
        hash_type: HashType,
    },
    Fake {
        #[serde(default)]
        generator: Option<String>,
    },
    Template {
        pattern: String,
    },
    Time {
        #[serde(default = "default_time_format")]
        format: String,
    },
}

fn default_masking_char() -> String {
    "*".to_string()
}

fn default_time_format() -> String {
    DEFAULT_TIME_FORMAT.to_string()
}

impl OperatorConfig {
    /// Validate and convert into an operator
    pub fn to_operator(&self) -> Result<Operator> {
        match self {
            Self::Replace { new_value } => Ok(Operator::replace(new_value.clone())),
            Self::Mask {
                masking_char,
                chars_to_mask,
                from_end,
            } => {
                let mut chars = masking_char.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Operator::mask(c, *chars_to_mask, *from_end)),
                    _ => Err(ShroudError::Validation(format!(
                        "masking_char must be exactly one character, got '{masking_char}'"
                    ))),
                }
            }
            Self::Hash { salt, hash_type } => Ok(Operator::Hash {
                salt: salt.clone().unwrap_or_else(|| secret_string(String::new())),
                hash_type: *hash_type,
            }),
            Self::Fake { generator } => {
                let generator = generator
                    .as_deref()
                    .map(EntityLabel::new)
                    .transpose()
                    .map_err(ShroudError::Validation)?;
                Ok(Operator::Fake { generator })
            }
            Self::Template { pattern } => {
                if pattern.is_empty() {
                    return Err(ShroudError::Validation(
                        "template pattern cannot be empty".to_string(),
                    ));
                }
                Ok(Operator::template(pattern.clone()))
            }
            Self::Time { format } => {
                if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
                    return Err(ShroudError::Validation(format!(
                        "invalid time format '{format}'"
                    )));
                }
                Ok(Operator::Time {
                    format: format.clone(),
                })
            }
        }
    }
}

/// Operators keyed by label, plus an optional default
///
/// Inserting for a label that already has an operator replaces it, so
/// registering the same operator twice has no further effect.
#[derive(Debug, Clone, Default)]
pub struct Operators {
    by_label: BTreeMap<EntityLabel, Operator>,
    default: Option<Operator>,
}

impl Operators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from configuration keyed by label or `"default"`
    pub fn from_config(config: &BTreeMap<String, OperatorConfig>) -> Result<Self> {
        let mut operators = Self::new();
        for (key, entry) in config {
            let operator = entry.to_operator().map_err(|e| {
                ShroudError::Configuration(format!("Operator for '{key}': {e}"))
            })?;
            if key.eq_ignore_ascii_case(DEFAULT_OPERATOR_KEY) {
                operators.set_default(operator);
            } else {
                let label = EntityLabel::new(key.as_str()).map_err(ShroudError::Configuration)?;
                operators.insert(label, operator);
            }
        }
        Ok(operators)
    }

    /// Set the operator for a label, returning the previous one
    pub fn insert(&mut self, label: EntityLabel, operator: Operator) -> Option<Operator> {
        self.by_label.insert(label, operator)
    }

    /// Set the fallback operator
    pub fn set_default(&mut self, operator: Operator) -> Option<Operator> {
        self.default.replace(operator)
    }

    pub fn get(&self, label: &str) -> Option<&Operator> {
        self.by_label.get(label)
    }

    pub fn default_operator(&self) -> Option<&Operator> {
        self.default.as_ref()
    }

    pub fn len(&self) -> usize {
        self.by_label.len() + usize::from(self.default.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Operators to try for a label, in order
    ///
    /// Explicit entry, then the fake-value generator when `use_faker` is set,
    /// then the default entry. An empty list means the placeholder applies.
    pub fn candidates(&self, label: &EntityLabel, use_faker: bool) -> Vec<Operator> {
        let mut chain = Vec::with_capacity(3);
        if let Some(explicit) = self.by_label.get(label) {
            chain.push(explicit.clone());
        }
        if use_faker {
            chain.push(Operator::fake());
        }
        if let Some(default) = &self.default {
            chain.push(default.clone());
        }
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::faker::SeededFaker;
    use crate::anonymization::models::labels;

    fn label(s: &str) -> EntityLabel {
        EntityLabel::new(s).unwrap()
    }

    fn parse(toml_str: &str) -> BTreeMap<String, OperatorConfig> {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn test_apply_deterministic_operators() {
        let mut faker = SeededFaker::seeded(1);
        let phone = label(labels::PHONE_NUMBER);

        let replaced = Operator::replace("{PHONE_NUMBER}")
            .apply(&phone, "999-888-7777", &mut faker)
            .unwrap();
        assert_eq!(replaced, "{PHONE_NUMBER}");

        let masked = Operator::mask('*', 12, true)
            .apply(&phone, "999-888-7777", &mut faker)
            .unwrap();
        assert_eq!(masked, "************");

        let hashed = Operator::hash("mysalt", HashType::Sha256)
            .apply(&phone, "999-888-7777", &mut faker)
            .unwrap();
        assert_eq!(hashed, salted_hash("999-888-7777", "mysalt", HashType::Sha256));
    }

    #[test]
    fn test_fake_with_generator_override() {
        let mut faker = SeededFaker::seeded(42);
        let operator = Operator::Fake {
            generator: Some(label(labels::POLISH_ID)),
        };
        let value = operator
            .apply(&label("CUSTOMER_CODE"), "x", &mut faker)
            .unwrap();
        assert_eq!(value.len(), 9);
    }

    #[test]
    fn test_fake_unsupported_label() {
        let mut faker = SeededFaker::seeded(42);
        let err = Operator::fake()
            .apply(&label("CUSTOMER_CODE"), "x", &mut faker)
            .unwrap_err();
        assert!(err.is_unsupported_label());
    }

    #[test]
    fn test_custom_operator_uses_shared_rng() {
        let op = Operator::custom("fake_polish_id", |rng, _| faker::bothify(rng, "???######"));
        let mut a = SeededFaker::seeded(42);
        let mut b = SeededFaker::seeded(42);
        let id = label(labels::POLISH_ID);

        assert_eq!(
            op.apply(&id, "ABC123456", &mut a).unwrap(),
            op.apply(&id, "ABC123456", &mut b).unwrap()
        );
        assert_eq!(op.name(), "fake_polish_id");
        assert!(op.is_generative());
    }

    #[test]
    fn test_placeholder() {
        let person = label(labels::PERSON);
        assert_eq!(placeholder(&person, 1), "<PERSON>");
        assert_eq!(placeholder(&person, 3), "<PERSON_3>");
    }

    #[test]
    fn test_operators_from_config() {
        let config = parse(
            r#"
[PHONE_NUMBER]
type = "mask"
masking_char = "*"
chars_to_mask = 12
from_end = true

[TITLE]
type = "hash"
salt = "mysalt"

[default]
type = "replace"
new_value = "<REDACTED>"
"#,
        );
        let operators = Operators::from_config(&config).unwrap();

        assert!(matches!(
            operators.get(labels::PHONE_NUMBER),
            Some(Operator::Mask { chars_to_mask: 12, from_end: true, .. })
        ));
        assert!(matches!(operators.get("TITLE"), Some(Operator::Hash { .. })));
        assert!(matches!(
            operators.default_operator(),
            Some(Operator::Replace { .. })
        ));
        assert_eq!(operators.len(), 3);
    }

    #[test]
    fn test_config_rejects_bad_values() {
        let bad_mask = parse("[X]\ntype = \"mask\"\nmasking_char = \"\"\nchars_to_mask = 2\n");
        assert!(Operators::from_config(&bad_mask).is_err());

        let bad_time = parse("[TIME]\ntype = \"time\"\nformat = \"%Q\"\n");
        assert!(Operators::from_config(&bad_time).is_err());

        let bad_label = parse("[\"not a label\"]\ntype = \"replace\"\nnew_value = \"x\"\n");
        assert!(Operators::from_config(&bad_label).is_err());
    }

    #[test]
    fn test_candidate_order() {
        let mut operators = Operators::new();
        operators.insert(label(labels::PERSON), Operator::replace("{PERSON}"));
        operators.set_default(Operator::replace("<REDACTED>"));

        let chain = operators.candidates(&label(labels::PERSON), true);
        let names: Vec<&str> = chain.iter().map(Operator::name).collect();
        assert_eq!(names, vec!["replace", "fake", "replace"]);

        let chain = operators.candidates(&label(labels::TIME), false);
        assert_eq!(chain.len(), 1);

        assert!(Operators::new().candidates(&label(labels::TIME), false).is_empty());
    }

    #[test]
    fn test_insert_same_label_replaces() {
        let mut operators = Operators::new();
        assert!(operators
            .insert(label(labels::PERSON), Operator::fake())
            .is_none());
        assert!(operators
            .insert(label(labels::PERSON), Operator::fake())
            .is_some());
        assert_eq!(operators.len(), 1);
    }
}
