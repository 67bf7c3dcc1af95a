//! Anonymization mapping between original values and their substitutes

use super::entity::EntityLabel;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Serialized form: label → (original → substitute)
pub type MappingEntries = BTreeMap<EntityLabel, BTreeMap<String, String>>;

/// Bidirectional record of every substitution made by an anonymizer
///
/// Within a label each original value maps to exactly one substitute, created
/// once and reused on every later occurrence. The mapping only grows; existing
/// pairs are never overwritten.
///
/// Serializes as a plain JSON object `{label: {original: substitute}}`.
///
/// # Examples
///
/// ```
/// use shroud::anonymization::models::{AnonymizationMapping, EntityLabel};
///
/// let mut mapping = AnonymizationMapping::new();
/// let person = EntityLabel::new("PERSON").unwrap();
///
/// let (sub, inserted) = mapping.insert_if_absent(&person, "John Doe", "Jane Roe".to_string());
/// assert!(inserted);
/// assert_eq!(sub, "Jane Roe");
///
/// let (sub, inserted) = mapping.insert_if_absent(&person, "John Doe", "Other".to_string());
/// assert!(!inserted);
/// assert_eq!(sub, "Jane Roe");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MappingEntries", into = "MappingEntries")]
pub struct AnonymizationMapping {
    entries: MappingEntries,
    /// substitute → distinct originals that map to it
    reverse: HashMap<String, BTreeSet<String>>,
}

impl AnonymizationMapping {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the substitute recorded for an original value
    pub fn get(&self, label: &str, original: &str) -> Option<&str> {
        self.entries
            .get(label)
            .and_then(|values| values.get(original))
            .map(String::as_str)
    }

    /// Record `original → substitute` unless the original already has one
    ///
    /// Returns the substitute now stored for the original and whether the
    /// pair was newly inserted.
    pub fn insert_if_absent(
        &mut self,
        label: &EntityLabel,
        original: &str,
        substitute: String,
    ) -> (String, bool) {
        if let Some(existing) = self.get(label.as_str(), original) {
            return (existing.to_string(), false);
        }

        self.reverse
            .entry(substitute.clone())
            .or_default()
            .insert(original.to_string());
        self.entries
            .entry(label.clone())
            .or_default()
            .insert(original.to_string(), substitute.clone());

        (substitute, true)
    }

    /// Whether the value is used as a substitute anywhere in the mapping
    pub fn contains_substitute(&self, substitute: &str) -> bool {
        self.reverse.contains_key(substitute)
    }

    /// Whether the substitute is already taken by a different original
    pub fn substitute_taken_by_other(&self, substitute: &str, original: &str) -> bool {
        self.reverse
            .get(substitute)
            .map(|originals| originals.iter().any(|o| o != original))
            .unwrap_or(false)
    }

    /// Number of distinct originals already mapped under a label
    pub fn label_len(&self, label: &str) -> usize {
        self.entries.get(label).map(BTreeMap::len).unwrap_or(0)
    }

    /// Total number of recorded pairs across all labels
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Labels present in the mapping
    pub fn labels(&self) -> impl Iterator<Item = &EntityLabel> {
        self.entries.keys()
    }

    /// Iterate `(label, original, substitute)` triples in label order
    pub fn iter(&self) -> impl Iterator<Item = (&EntityLabel, &str, &str)> {
        self.entries.iter().flat_map(|(label, values)| {
            values
                .iter()
                .map(move |(original, substitute)| (label, original.as_str(), substitute.as_str()))
        })
    }

    /// Merge another mapping, keeping existing pairs on conflict
    ///
    /// Returns the number of pairs added.
    pub fn merge(&mut self, other: &AnonymizationMapping) -> usize {
        let mut added = 0;
        for (label, original, substitute) in other.iter() {
            let (_, inserted) = self.insert_if_absent(label, original, substitute.to_string());
            if inserted {
                added += 1;
            }
        }
        added
    }

    /// Reversible `(substitute, original)` pairs, longest substitute first
    ///
    /// Substitutes shared by several distinct originals cannot be reversed and
    /// are excluded; see [`ambiguous_substitutes`](Self::ambiguous_substitutes).
    /// Ties in length are ordered lexicographically so the result is stable.
    pub fn substitution_pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = self
            .reverse
            .iter()
            .filter(|(substitute, originals)| !substitute.is_empty() && originals.len() == 1)
            .filter_map(|(substitute, originals)| {
                originals
                    .iter()
                    .next()
                    .map(|original| (substitute.as_str(), original.as_str()))
            })
            .collect();

        pairs.sort_by_key(|(substitute, _)| (Reverse(substitute.len()), *substitute));
        pairs
    }

    /// Substitutes that map back to more than one original
    pub fn ambiguous_substitutes(&self) -> Vec<&str> {
        let mut ambiguous: Vec<&str> = self
            .reverse
            .iter()
            .filter(|(_, originals)| originals.len() > 1)
            .map(|(substitute, _)| substitute.as_str())
            .collect();
        ambiguous.sort_unstable();
        ambiguous
    }
}

impl From<MappingEntries> for AnonymizationMapping {
    fn from(entries: MappingEntries) -> Self {
        let mut reverse: HashMap<String, BTreeSet<String>> = HashMap::new();
        for values in entries.values() {
            for (original, substitute) in values {
                reverse
                    .entry(substitute.clone())
                    .or_default()
                    .insert(original.clone());
            }
        }
        Self { entries, reverse }
    }
}

impl From<AnonymizationMapping> for MappingEntries {
    fn from(mapping: AnonymizationMapping) -> Self {
        mapping.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(s: &str) -> EntityLabel {
        EntityLabel::new(s).unwrap()
    }

    #[test]
    fn test_insert_is_first_write_wins() {
        let mut mapping = AnonymizationMapping::new();
        let phone = label("PHONE_NUMBER");

        mapping.insert_if_absent(&phone, "999-888-7777", "555-010-0000".to_string());
        let (sub, inserted) =
            mapping.insert_if_absent(&phone, "999-888-7777", "555-010-9999".to_string());

        assert!(!inserted);
        assert_eq!(sub, "555-010-0000");
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn test_same_original_under_two_labels() {
        let mut mapping = AnonymizationMapping::new();
        mapping.insert_if_absent(&label("PERSON"), "Jordan", "Alex Smith".to_string());
        mapping.insert_if_absent(&label("LOCATION"), "Jordan", "Springfield".to_string());

        assert_eq!(mapping.get("PERSON", "Jordan"), Some("Alex Smith"));
        assert_eq!(mapping.get("LOCATION", "Jordan"), Some("Springfield"));
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.labels().count(), 2);
    }

    #[test]
    fn test_substitution_pairs_longest_first() {
        let mut mapping = AnonymizationMapping::new();
        mapping.insert_if_absent(&label("A"), "one", "555-0100".to_string());
        mapping.insert_if_absent(&label("B"), "two", "call 555-0100 now".to_string());
        mapping.insert_if_absent(&label("C"), "three", "x".to_string());

        let pairs = mapping.substitution_pairs();
        let subs: Vec<&str> = pairs.iter().map(|(s, _)| *s).collect();
        assert_eq!(subs, vec!["call 555-0100 now", "555-0100", "x"]);
    }

    #[test]
    fn test_ambiguous_substitutes_excluded() {
        let mut mapping = AnonymizationMapping::new();
        let person = label("PERSON");
        mapping.insert_if_absent(&person, "John Doe", "{PERSON}".to_string());
        mapping.insert_if_absent(&person, "Jane Roe", "{PERSON}".to_string());
        mapping.insert_if_absent(&person, "Victoria Cherry", "Kim Lee".to_string());

        assert_eq!(mapping.ambiguous_substitutes(), vec!["{PERSON}"]);
        let pairs = mapping.substitution_pairs();
        assert_eq!(pairs, vec![("Kim Lee", "Victoria Cherry")]);
        assert!(mapping.substitute_taken_by_other("{PERSON}", "John Doe"));
        assert!(!mapping.substitute_taken_by_other("Kim Lee", "Victoria Cherry"));
    }

    #[test]
    fn test_json_round_trip_rebuilds_reverse_index() {
        let mut mapping = AnonymizationMapping::new();
        mapping.insert_if_absent(&label("POLISH_ID"), "ABC123456", "QWE987654".to_string());
        mapping.insert_if_absent(&label("TIME"), "9:30 AM", "04:12 PM".to_string());

        let json = serde_json::to_string(&mapping).unwrap();
        assert!(json.contains("\"POLISH_ID\":{\"ABC123456\":\"QWE987654\"}"));

        let restored: AnonymizationMapping = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, mapping);
        assert!(restored.contains_substitute("04:12 PM"));
    }

    #[test]
    fn test_merge_keeps_existing() {
        let mut base = AnonymizationMapping::new();
        base.insert_if_absent(&label("PERSON"), "John Doe", "Kim Lee".to_string());

        let mut other = AnonymizationMapping::new();
        other.insert_if_absent(&label("PERSON"), "John Doe", "Someone Else".to_string());
        other.insert_if_absent(&label("PERSON"), "Jane Roe", "Pat Poe".to_string());

        assert_eq!(base.merge(&other), 1);
        assert_eq!(base.get("PERSON", "John Doe"), Some("Kim Lee"));
        assert_eq!(base.get("PERSON", "Jane Roe"), Some("Pat Poe"));
    }
}
