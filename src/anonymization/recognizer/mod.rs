//! Entity recognition module
//!
//! Provides the trait-based recognition interface, the regex/deny-list
//! [`PatternRecognizer`] and the [`RecognizerRegistry`] that unions the
//! results of every registered recognizer.

pub mod library;
pub mod pattern;
pub mod presets;

pub use pattern::{PatternConfig, PatternRecognizer, PatternRecognizerConfig, Validator};

use crate::anonymization::models::{EntityLabel, EntityMatch};
use crate::domain::{RecognitionError, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Trait for entity recognizers
///
/// Implementations may be pattern based (see [`PatternRecognizer`]) or wrap
/// an external model. An empty `entities` slice means "all supported".
pub trait Recognizer: Send + Sync {
    /// Unique registry name
    fn name(&self) -> &str;

    /// Labels this recognizer can produce
    fn supported_entities(&self) -> Vec<EntityLabel>;

    /// Language tag served by this recognizer (e.g. `en`)
    fn supported_language(&self) -> &str;

    /// Detect entities in text
    fn analyze(
        &self,
        text: &str,
        entities: &[EntityLabel],
        language: &str,
    ) -> Result<Vec<EntityMatch>>;
}

/// Registry of recognizers keyed by name
///
/// Adding a recognizer whose name is already registered replaces the old one,
/// so registration is idempotent.
#[derive(Clone, Default)]
pub struct RecognizerRegistry {
    recognizers: BTreeMap<String, Arc<dyn Recognizer>>,
    score_threshold: f32,
}

impl RecognizerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry preloaded with the built-in recognizers
    pub fn with_defaults() -> Result<Self> {
        let mut registry = Self::new();
        for recognizer in library::default_recognizers()? {
            registry.add(Arc::new(recognizer));
        }
        Ok(registry)
    }

    /// Drop matches scoring below the threshold
    pub fn with_score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn score_threshold(&self) -> f32 {
        self.score_threshold
    }

    /// Register a recognizer. Returns true if it replaced an existing one.
    pub fn add(&mut self, recognizer: Arc<dyn Recognizer>) -> bool {
        let name = recognizer.name().to_string();
        let replaced = self.recognizers.insert(name.clone(), recognizer).is_some();
        tracing::debug!(recognizer = %name, replaced, "Recognizer registered");
        replaced
    }

    /// Remove a recognizer by name
    pub fn remove(&mut self, name: &str) -> bool {
        self.recognizers.remove(name).is_some()
    }

    /// Registered recognizer names in order
    pub fn names(&self) -> Vec<&str> {
        self.recognizers.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.recognizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recognizers.is_empty()
    }

    /// Labels supported for a language
    pub fn supported_entities(&self, language: &str) -> BTreeSet<EntityLabel> {
        self.for_language(language)
            .flat_map(|r| r.supported_entities())
            .collect()
    }

    fn for_language<'a>(&'a self, language: &'a str) -> impl Iterator<Item = &'a Arc<dyn Recognizer>> {
        self.recognizers
            .values()
            .filter(move |r| r.supported_language().eq_ignore_ascii_case(language))
    }

    /// Run every matching recognizer and union the results
    ///
    /// Results are filtered to the requested labels and the score threshold.
    /// Overlapping spans are returned as-is; see
    /// [`resolve_overlaps`](crate::anonymization::resolve::resolve_overlaps).
    ///
    /// # Errors
    ///
    /// Fails if no recognizer serves `language` or any recognizer fails.
    pub fn analyze(
        &self,
        text: &str,
        entities: &[EntityLabel],
        language: &str,
    ) -> Result<Vec<EntityMatch>> {
        let candidates: Vec<&Arc<dyn Recognizer>> = self.for_language(language).collect();
        if candidates.is_empty() {
            return Err(RecognitionError::UnsupportedLanguage(language.to_string()).into());
        }

        let mut results = Vec::new();
        for recognizer in candidates {
            if !entities.is_empty()
                && !recognizer
                    .supported_entities()
                    .iter()
                    .any(|e| entities.contains(e))
            {
                continue;
            }

            let found = recognizer.analyze(text, entities, language)?;
            tracing::trace!(
                recognizer = recognizer.name(),
                count = found.len(),
                "Recognizer finished"
            );
            results.extend(found.into_iter().filter(|m| {
                m.score() >= self.score_threshold
                    && (entities.is_empty() || entities.contains(m.label()))
            }));
        }

        Ok(results)
    }
}

impl std::fmt::Debug for RecognizerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecognizerRegistry")
            .field("recognizers", &self.names())
            .field("score_threshold", &self.score_threshold)
            .finish()
    }
}
