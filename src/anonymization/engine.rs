//! Reversible anonymization engine
//!
//! This module provides [`ReversibleAnonymizer`], which replaces recognized
//! entities with substitutes and records every `original → substitute` pair so
//! that text produced later (for example by a language model) can be mapped
//! back to the original values.
//!
//! # Architecture
//!
//! - **Recognizers**: find candidate spans; overlaps are resolved before
//!   substitution
//! - **Operators**: produce substitutes per label, with fallback to the
//!   default operator and finally an indexed placeholder
//! - **Mapping**: one substitute per original value per label, reused on
//!   every later occurrence
//!
//! # Examples
//!
//! ```
//! use shroud::anonymization::ReversibleAnonymizer;
//!
//! # fn example() -> shroud::domain::Result<()> {
//! let anonymizer = ReversibleAnonymizer::builder().faker_seed(42).build()?;
//!
//! let safe = anonymizer.anonymize("Write to johndoe@example.com")?;
//! assert!(!safe.contains("johndoe@example.com"));
//!
//! let restored = anonymizer.deanonymize(&safe)?;
//! assert_eq!(restored, "Write to johndoe@example.com");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use crate::anonymization::audit::AuditLogger;
use crate::anonymization::config::AnonymizerConfig;
use crate::anonymization::faker::{FakeValueGenerator, SeededFaker};
use crate::anonymization::models::{
    AnonymizationMapping, AnonymizedText, AppliedSubstitution, EntityLabel, EntityMatch,
};
use crate::anonymization::operators::{placeholder, Operator, Operators};
use crate::anonymization::recognizer::{library, presets, Recognizer, RecognizerRegistry};
use crate::anonymization::resolve::resolve_overlaps;
use crate::anonymization::store::MappingStore;
use crate::domain::{Result, ShroudError};
use regex::RegexBuilder;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

/// Attempts at regenerating a colliding substitute before suffixing it
const MAX_REGENERATION_ATTEMPTS: usize = 10;

/// Compiled size limit for the deanonymization alternation
const DEANONYMIZE_REGEX_SIZE_LIMIT: usize = 256 * 1024 * 1024;

/// Name recorded for placeholder substitutions
const PLACEHOLDER_OPERATOR: &str = "placeholder";

/// Reversible anonymizer
///
/// # Thread Safety
///
/// All methods take `&self`; share one instance across threads with `Arc`.
/// The check-then-insert of new mapping pairs happens under a single write
/// lock, so concurrent first sightings of the same value agree on one
/// substitute.
pub struct ReversibleAnonymizer {
    language: String,
    entities: Vec<EntityLabel>,
    add_default_faker_operators: bool,
    dry_run: bool,
    recognizers: RwLock<RecognizerRegistry>,
    operators: RwLock<Operators>,
    faker: Mutex<Box<dyn FakeValueGenerator>>,
    mapping: RwLock<AnonymizationMapping>,
    audit: Option<AuditLogger>,
}

impl std::fmt::Debug for ReversibleAnonymizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReversibleAnonymizer")
            .field("language", &self.language)
            .field("entities", &self.entities)
            .field("add_default_faker_operators", &self.add_default_faker_operators)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl ReversibleAnonymizer {
    /// Start building an anonymizer
    pub fn builder() -> AnonymizerBuilder {
        AnonymizerBuilder::default()
    }

    /// Build an anonymizer from configuration
    ///
    /// Registers the built-in recognizers (unless disabled), the configured
    /// pattern library, presets and inline recognizers, in that order.
    pub fn from_config(config: &AnonymizerConfig, dry_run: bool) -> Result<Self> {
        config.validate()?;

        let mut builder = Self::builder()
            .language(config.language.clone())
            .entities(config.entity_labels()?)
            .score_threshold(config.score_threshold)
            .add_default_faker_operators(config.add_default_faker_operators)
            .default_recognizers(config.use_default_recognizers)
            .operators(Operators::from_config(&config.operators)?)
            .dry_run(dry_run);

        if let Some(seed) = config.faker_seed {
            builder = builder.faker_seed(seed);
        }

        if let Some(ref path) = config.pattern_library {
            for recognizer in library::from_file(path)? {
                builder = builder.recognizer(Arc::new(recognizer));
            }
        }

        for name in &config.presets {
            let recognizer = presets::preset(name).ok_or_else(|| {
                ShroudError::Configuration(format!("Unknown preset '{name}'"))
            })??;
            builder = builder.recognizer(Arc::new(recognizer));
        }

        for recognizer in &config.recognizers {
            builder = builder.recognizer(Arc::new(recognizer.build()?));
        }

        if let Some(audit) = AuditLogger::from_config(&config.audit)? {
            builder = builder.audit_logger(audit);
        }

        builder.build()
    }

    /// Language passed to recognizers
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Whether anonymize leaves text untouched
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Replace every recognized entity and return the substituted text
    ///
    /// # Errors
    ///
    /// Recognition failures and generator failures other than an unsupported
    /// label abort the call; no partially substituted text is returned.
    pub fn anonymize(&self, text: &str) -> Result<String> {
        self.anonymize_detailed(text).map(|result| result.text)
    }

    /// Like [`anonymize`](Self::anonymize), also returning every substitution
    pub fn anonymize_detailed(&self, text: &str) -> Result<AnonymizedText> {
        let started = Instant::now();
        let matches = self.analyze(text)?;

        let result = if self.dry_run {
            self.dry_run_result(text, matches)?
        } else {
            self.substitute(text, matches)?
        };

        tracing::debug!(
            detections = result.substitutions.len(),
            new_mappings = result.substitutions.iter().filter(|s| s.newly_mapped).count(),
            dry_run = self.dry_run,
            "Anonymization complete"
        );

        if let Some(ref audit) = self.audit {
            audit.log_anonymization(&result, started.elapsed().as_millis() as u64)?;
        }

        Ok(result)
    }

    /// Detect entities without substituting anything
    ///
    /// Returns non-overlapping matches sorted by start offset.
    pub fn analyze(&self, text: &str) -> Result<Vec<EntityMatch>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let raw = {
            let recognizers = self.recognizers.read().map_err(|_| poisoned("recognizers"))?;
            recognizers.analyze(text, &self.entities, &self.language)?
        };
        Ok(resolve_overlaps(text, raw))
    }

    /// Replace every known substitute with its original value
    ///
    /// A single left-to-right scan is made, preferring the longest substitute
    /// at each position, so restored text is never rescanned. Substitutes
    /// shared by several originals are left untouched.
    pub fn deanonymize(&self, text: &str) -> Result<String> {
        let mapping = self.mapping.read().map_err(|_| poisoned("mapping"))?;

        let ambiguous = mapping.ambiguous_substitutes();
        if !ambiguous.is_empty() {
            tracing::warn!(
                count = ambiguous.len(),
                "Substitutes shared by several originals are left untouched"
            );
        }

        let pairs = mapping.substitution_pairs();
        if pairs.is_empty() || text.is_empty() {
            return Ok(text.to_string());
        }

        let alternation = pairs
            .iter()
            .map(|(substitute, _)| regex::escape(substitute))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = RegexBuilder::new(&alternation)
            .size_limit(DEANONYMIZE_REGEX_SIZE_LIMIT)
            .dfa_size_limit(DEANONYMIZE_REGEX_SIZE_LIMIT)
            .build()
            .map_err(|e| ShroudError::Mapping(format!("Failed to build substitute matcher: {e}")))?;
        let originals: HashMap<&str, &str> = pairs.into_iter().collect();

        let mut restored = 0usize;
        let output = pattern.replace_all(text, |caps: &regex::Captures<'_>| {
            let found = &caps[0];
            match originals.get(found) {
                Some(original) => {
                    restored += 1;
                    (*original).to_string()
                }
                None => found.to_string(),
            }
        });

        tracing::debug!(restored, "Deanonymization complete");
        Ok(output.into_owned())
    }

    /// Register a recognizer, replacing one with the same name
    ///
    /// Returns true if an existing recognizer was replaced.
    pub fn add_recognizer(&self, recognizer: Arc<dyn Recognizer>) -> Result<bool> {
        let mut recognizers = self.recognizers.write().map_err(|_| poisoned("recognizers"))?;
        Ok(recognizers.add(recognizer))
    }

    /// Set the operator for a label, replacing any existing one
    ///
    /// Values already in the mapping keep their substitutes.
    pub fn add_operator(&self, label: EntityLabel, operator: Operator) -> Result<()> {
        let mut operators = self.operators.write().map_err(|_| poisoned("operators"))?;
        tracing::debug!(label = %label, operator = operator.name(), "Operator registered");
        operators.insert(label, operator);
        Ok(())
    }

    /// Set the operator used for labels without an explicit entry
    pub fn set_default_operator(&self, operator: Operator) -> Result<()> {
        let mut operators = self.operators.write().map_err(|_| poisoned("operators"))?;
        operators.set_default(operator);
        Ok(())
    }

    /// Labels the registered recognizers can produce for the language
    pub fn supported_entities(&self) -> Result<Vec<EntityLabel>> {
        let recognizers = self.recognizers.read().map_err(|_| poisoned("recognizers"))?;
        Ok(recognizers
            .supported_entities(&self.language)
            .into_iter()
            .collect())
    }

    /// Snapshot of the current mapping
    pub fn mapping(&self) -> Result<AnonymizationMapping> {
        let mapping = self.mapping.read().map_err(|_| poisoned("mapping"))?;
        Ok(mapping.clone())
    }

    /// Merge pairs from a store into the mapping
    ///
    /// Existing pairs win on conflict. Returns the number of pairs added.
    pub fn load_mapping(&self, store: &dyn MappingStore) -> Result<usize> {
        let loaded = store.load()?;
        let mut mapping = self.mapping.write().map_err(|_| poisoned("mapping"))?;
        let added = mapping.merge(&loaded);
        tracing::info!(added, total = mapping.len(), "Mapping loaded");
        Ok(added)
    }

    /// Persist the current mapping
    pub fn save_mapping(&self, store: &dyn MappingStore) -> Result<()> {
        let snapshot = self.mapping()?;
        store.save(&snapshot)?;
        tracing::info!(total = snapshot.len(), "Mapping saved");
        Ok(())
    }

    fn dry_run_result(&self, text: &str, matches: Vec<EntityMatch>) -> Result<AnonymizedText> {
        let operators = self.operators.read().map_err(|_| poisoned("operators"))?;
        let substitutions = matches
            .into_iter()
            .map(|entity| {
                let operator = operators
                    .candidates(entity.label(), self.add_default_faker_operators)
                    .first()
                    .map(|op| op.name().to_string())
                    .unwrap_or_else(|| PLACEHOLDER_OPERATOR.to_string());
                AppliedSubstitution {
                    substitute: entity.text().to_string(),
                    operator,
                    output_start: entity.start(),
                    output_end: entity.end(),
                    newly_mapped: false,
                    entity,
                }
            })
            .collect();

        Ok(AnonymizedText {
            text: text.to_string(),
            substitutions,
            dry_run: true,
        })
    }

    fn substitute(&self, text: &str, matches: Vec<EntityMatch>) -> Result<AnonymizedText> {
        if matches.is_empty() {
            return Ok(AnonymizedText {
                text: text.to_string(),
                substitutions: Vec::new(),
                dry_run: false,
            });
        }

        let operators = self
            .operators
            .read()
            .map_err(|_| poisoned("operators"))?
            .clone();

        // Lock order: mapping, then faker
        let mut mapping = self.mapping.write().map_err(|_| poisoned("mapping"))?;
        let mut faker = self.faker.lock().map_err(|_| poisoned("faker"))?;

        let mut output = String::with_capacity(text.len());
        let mut cursor = 0;
        let mut substitutions = Vec::with_capacity(matches.len());

        for entity in matches {
            let (substitute, operator, newly_mapped) =
                match mapping.get(entity.label().as_str(), entity.text()) {
                    Some(existing) => (existing.to_string(), "mapping".to_string(), false),
                    None => {
                        let (candidate, operator) =
                            self.generate(&entity, &operators, &mapping, &mut **faker)?;
                        let (stored, inserted) =
                            mapping.insert_if_absent(entity.label(), entity.text(), candidate);
                        (stored, operator, inserted)
                    }
                };

            output.push_str(&text[cursor..entity.start()]);
            let output_start = output.len();
            output.push_str(&substitute);
            let output_end = output.len();
            cursor = entity.end();

            substitutions.push(AppliedSubstitution {
                entity,
                substitute,
                operator,
                output_start,
                output_end,
                newly_mapped,
            });
        }
        output.push_str(&text[cursor..]);

        Ok(AnonymizedText {
            text: output,
            substitutions,
            dry_run: false,
        })
    }

    /// Produce a substitute for a value not yet in the mapping
    fn generate(
        &self,
        entity: &EntityMatch,
        operators: &Operators,
        mapping: &AnonymizationMapping,
        faker: &mut dyn FakeValueGenerator,
    ) -> Result<(String, String)> {
        let label = entity.label();
        let original = entity.text();
        let use_faker = self.add_default_faker_operators && faker.supports(label.as_str());

        for operator in operators.candidates(label, use_faker) {
            let value = match operator.apply(label, original, faker) {
                Ok(value) => value,
                Err(e) if e.is_unsupported_label() => {
                    tracing::debug!(
                        label = %label,
                        operator = operator.name(),
                        "No generator for label, falling back"
                    );
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let value = if operator.is_generative() {
                self.avoid_collision(value, entity, &operator, mapping, faker)?
            } else {
                value
            };

            if value == original {
                tracing::warn!(
                    label = %label,
                    operator = operator.name(),
                    "Operator returned the original value, falling back"
                );
                continue;
            }

            return Ok((value, operator.name().to_string()));
        }

        let mut index = mapping.label_len(label.as_str()) + 1;
        let mut value = placeholder(label, index);
        while value == original || mapping.substitute_taken_by_other(&value, original) {
            index += 1;
            value = placeholder(label, index);
        }
        Ok((value, PLACEHOLDER_OPERATOR.to_string()))
    }

    /// Regenerate or suffix a generated value so it maps back to one original
    fn avoid_collision(
        &self,
        mut value: String,
        entity: &EntityMatch,
        operator: &Operator,
        mapping: &AnonymizationMapping,
        faker: &mut dyn FakeValueGenerator,
    ) -> Result<String> {
        let original = entity.text();
        let unusable =
            |v: &str| v.is_empty() || v == original || mapping.substitute_taken_by_other(v, original);

        let mut attempts = 0;
        while unusable(&value) && attempts < MAX_REGENERATION_ATTEMPTS {
            value = operator.apply(entity.label(), original, faker)?;
            attempts += 1;
        }

        if unusable(&value) {
            let base = value;
            let mut suffix = 2;
            value = format!("{base} {suffix}");
            while unusable(&value) {
                suffix += 1;
                value = format!("{base} {suffix}");
            }
            tracing::debug!(
                label = %entity.label(),
                "Generated value collided, numeric suffix added"
            );
        }

        Ok(value)
    }
}

fn poisoned(what: &str) -> ShroudError {
    ShroudError::Mapping(format!("{what} lock poisoned"))
}

/// Builder for [`ReversibleAnonymizer`]
pub struct AnonymizerBuilder {
    language: String,
    entities: Vec<EntityLabel>,
    score_threshold: f32,
    add_default_faker_operators: bool,
    default_recognizers: bool,
    recognizers: Vec<Arc<dyn Recognizer>>,
    operators: Operators,
    faker: Option<Box<dyn FakeValueGenerator>>,
    faker_seed: Option<u64>,
    mapping: AnonymizationMapping,
    dry_run: bool,
    audit: Option<AuditLogger>,
}

impl Default for AnonymizerBuilder {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            entities: Vec::new(),
            score_threshold: 0.0,
            add_default_faker_operators: true,
            default_recognizers: true,
            recognizers: Vec::new(),
            operators: Operators::new(),
            faker: None,
            faker_seed: None,
            mapping: AnonymizationMapping::new(),
            dry_run: false,
            audit: None,
        }
    }
}

impl AnonymizerBuilder {
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Restrict detection to these labels (empty means all)
    pub fn entities(mut self, entities: Vec<EntityLabel>) -> Self {
        self.entities = entities;
        self
    }

    pub fn score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = threshold;
        self
    }

    /// Use the fake-value generator for labels without an explicit operator
    pub fn add_default_faker_operators(mut self, enabled: bool) -> Self {
        self.add_default_faker_operators = enabled;
        self
    }

    /// Register the built-in pattern recognizers (on by default)
    pub fn default_recognizers(mut self, enabled: bool) -> Self {
        self.default_recognizers = enabled;
        self
    }

    pub fn recognizer(mut self, recognizer: Arc<dyn Recognizer>) -> Self {
        self.recognizers.push(recognizer);
        self
    }

    pub fn operator(mut self, label: EntityLabel, operator: Operator) -> Self {
        self.operators.insert(label, operator);
        self
    }

    pub fn default_operator(mut self, operator: Operator) -> Self {
        self.operators.set_default(operator);
        self
    }

    /// Replace all operators
    pub fn operators(mut self, operators: Operators) -> Self {
        self.operators = operators;
        self
    }

    /// Seed the built-in faker
    pub fn faker_seed(mut self, seed: u64) -> Self {
        self.faker_seed = Some(seed);
        self
    }

    /// Use a custom fake-value generator
    pub fn faker(mut self, faker: Box<dyn FakeValueGenerator>) -> Self {
        self.faker = Some(faker);
        self
    }

    /// Start from an existing mapping
    pub fn mapping(mut self, mapping: AnonymizationMapping) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn audit_logger(mut self, audit: AuditLogger) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn build(self) -> Result<ReversibleAnonymizer> {
        let language = self.language.trim().to_lowercase();
        if language.is_empty() {
            return Err(ShroudError::Configuration(
                "Language cannot be empty".to_string(),
            ));
        }

        let mut registry = if self.default_recognizers {
            RecognizerRegistry::with_defaults()?
        } else {
            RecognizerRegistry::new()
        }
        .with_score_threshold(self.score_threshold);
        for recognizer in self.recognizers {
            registry.add(recognizer);
        }

        let faker = self
            .faker
            .unwrap_or_else(|| Box::new(SeededFaker::new(self.faker_seed)));

        tracing::info!(
            language = %language,
            recognizers = registry.len(),
            operators = self.operators.len(),
            seeded = self.faker_seed.is_some(),
            dry_run = self.dry_run,
            "Anonymizer initialized"
        );

        Ok(ReversibleAnonymizer {
            language,
            entities: self.entities,
            add_default_faker_operators: self.add_default_faker_operators,
            dry_run: self.dry_run,
            recognizers: RwLock::new(registry),
            operators: RwLock::new(self.operators),
            faker: Mutex::new(faker),
            mapping: RwLock::new(self.mapping),
            audit: self.audit,
        })
    }
}
