//! Integration tests for reversible anonymization

use shroud::anonymization::faker::{bothify, FakerRng};
use shroud::anonymization::models::labels;
use shroud::anonymization::recognizer::{presets, PatternRecognizerConfig};
use shroud::anonymization::{EntityLabel, EntityMatch, Operator, Recognizer, ReversibleAnonymizer};
use shroud::domain::Result;
use std::sync::Arc;
use std::thread;

const CONTRACT: &str = "Agreement ABC123456 signed at 9:30 AM.\n\
Contact: jane.doe@example.com, phone 415-555-0134.\n\
Payments from 10.0.0.7 are confirmed by jane.doe@example.com.";

fn label(s: &str) -> EntityLabel {
    EntityLabel::new(s).unwrap()
}

fn fake_polish_id() -> Operator {
    Operator::custom("fake_polish_id", |rng: &mut FakerRng, _original: &str| {
        bothify(rng, "???######").to_uppercase()
    })
}

fn contract_anonymizer(seed: u64) -> ReversibleAnonymizer {
    ReversibleAnonymizer::builder()
        .faker_seed(seed)
        .recognizer(Arc::new(presets::polish_id().build().unwrap()))
        .recognizer(Arc::new(presets::time().build().unwrap()))
        .operator(label(labels::POLISH_ID), fake_polish_id())
        .build()
        .unwrap()
}

#[test]
fn test_document_round_trip() {
    let anonymizer = contract_anonymizer(42);
    let safe = anonymizer.anonymize(CONTRACT).unwrap();

    for original in ["ABC123456", "jane.doe@example.com", "415-555-0134", "10.0.0.7"] {
        assert!(!safe.contains(original), "{original} leaked into {safe}");
    }
    assert_eq!(anonymizer.deanonymize(&safe).unwrap(), CONTRACT);
}

#[test]
fn test_same_value_same_substitute_across_calls() {
    let anonymizer = contract_anonymizer(42);
    let document = anonymizer.anonymize_detailed(CONTRACT).unwrap();
    let question = anonymizer
        .anonymize_detailed("Who is jane.doe@example.com?")
        .unwrap();

    let emails: Vec<&str> = document
        .substitutions
        .iter()
        .filter(|s| s.entity.label().as_str() == labels::EMAIL_ADDRESS)
        .map(|s| s.substitute.as_str())
        .collect();
    assert_eq!(emails.len(), 2);
    assert_eq!(emails[0], emails[1]);
    assert_eq!(question.substitutions[0].substitute, emails[0]);
    assert!(!question.substitutions[0].newly_mapped);
}

#[test]
fn test_seeded_custom_operator_is_reproducible() {
    let first = contract_anonymizer(42).anonymize(CONTRACT).unwrap();
    let second = contract_anonymizer(42).anonymize(CONTRACT).unwrap();
    assert_eq!(first, second);

    let polish_id = &first["Agreement ".len().."Agreement ".len() + 9];
    assert!(polish_id[..3].chars().all(|c| c.is_ascii_uppercase()));
    assert!(polish_id[3..].chars().all(|c| c.is_ascii_digit()));
}

#[test]
fn test_phone_mask_scenario() {
    let anonymizer = ReversibleAnonymizer::builder()
        .operator(label(labels::PHONE_NUMBER), Operator::mask('*', 12, true))
        .build()
        .unwrap();

    let safe = anonymizer.anonymize("My phone number is 999-888-7777").unwrap();
    assert_eq!(safe, "My phone number is ************");
    assert_eq!(
        anonymizer.deanonymize(&safe).unwrap(),
        "My phone number is 999-888-7777"
    );
}

#[test]
fn test_registration_is_idempotent() {
    let anonymizer = ReversibleAnonymizer::builder().faker_seed(7).build().unwrap();
    let before = anonymizer.supported_entities().unwrap().len();

    let recognizer = Arc::new(
        PatternRecognizerConfig::new("CASE_ID")
            .with_pattern("case", r"\bCASE-\d{4}\b", 0.9)
            .build()
            .unwrap(),
    );
    assert!(!anonymizer.add_recognizer(recognizer.clone()).unwrap());
    assert!(anonymizer.add_recognizer(recognizer).unwrap());
    assert_eq!(anonymizer.supported_entities().unwrap().len(), before + 1);

    anonymizer
        .add_operator(label("CASE_ID"), Operator::replace("CASE-0000"))
        .unwrap();
    anonymizer
        .add_operator(label("CASE_ID"), Operator::replace("CASE-0000"))
        .unwrap();

    let safe = anonymizer.anonymize("see CASE-1234").unwrap();
    assert_eq!(safe, "see CASE-0000");
}

#[test]
fn test_longest_substitute_restored_first() {
    let anonymizer = ReversibleAnonymizer::builder()
        .operator(
            label(labels::EMAIL_ADDRESS),
            Operator::custom("constant_email", |_: &mut FakerRng, _: &str| {
                "user@example.org".to_string()
            }),
        )
        .build()
        .unwrap();

    // The collision suffix makes one substitute a prefix of the other
    let safe = anonymizer
        .anonymize("a@acme.com then b@acme.com")
        .unwrap();
    assert_eq!(safe, "user@example.org then user@example.org 2");
    assert_eq!(
        anonymizer.deanonymize(&safe).unwrap(),
        "a@acme.com then b@acme.com"
    );
}

#[test]
fn test_shared_replace_value_is_not_reversed() {
    let anonymizer = ReversibleAnonymizer::builder()
        .operator(label(labels::EMAIL_ADDRESS), Operator::replace("[email]"))
        .build()
        .unwrap();

    let safe = anonymizer
        .anonymize("a@acme.com then b@acme.com")
        .unwrap();
    assert_eq!(safe, "[email] then [email]");
    assert_eq!(anonymizer.deanonymize(&safe).unwrap(), safe);
}

#[test]
fn test_concurrent_calls_share_one_mapping() {
    let anonymizer = Arc::new(contract_anonymizer(3));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let anonymizer = Arc::clone(&anonymizer);
            thread::spawn(move || {
                let text = format!("user{}@example.com wrote to shared@example.com", i % 4);
                let safe = anonymizer.anonymize(&text).unwrap();
                assert_eq!(anonymizer.deanonymize(&safe).unwrap(), text);
                safe
            })
        })
        .collect();

    let outputs: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    // 4 distinct senders plus the shared recipient
    assert_eq!(anonymizer.mapping().unwrap().len(), 5);

    let shared = anonymizer
        .mapping()
        .unwrap()
        .get(labels::EMAIL_ADDRESS, "shared@example.com")
        .map(str::to_string)
        .unwrap();
    assert!(outputs.iter().all(|o| o.ends_with(&shared)));
}

/// Name model that reports correct offsets but lower-cased text
struct LowercasingNameModel;

impl Recognizer for LowercasingNameModel {
    fn name(&self) -> &str {
        "lowercasing_name_model"
    }

    fn supported_entities(&self) -> Vec<EntityLabel> {
        vec![label(labels::PERSON)]
    }

    fn supported_language(&self) -> &str {
        "en"
    }

    fn analyze(&self, text: &str, _: &[EntityLabel], _: &str) -> Result<Vec<EntityMatch>> {
        Ok(["John Doe", "Jane Roe"]
            .iter()
            .filter_map(|name| {
                text.find(name).map(|start| {
                    EntityMatch::new(
                        label(labels::PERSON),
                        start,
                        start + name.len(),
                        0.85,
                        name.to_lowercase(),
                        self.name(),
                    )
                })
            })
            .collect())
    }
}

#[test]
fn test_mapping_keys_on_source_text_not_reported_text() {
    let anonymizer = ReversibleAnonymizer::builder()
        .faker_seed(42)
        .recognizer(Arc::new(LowercasingNameModel))
        .build()
        .unwrap();

    let text = "John Doe met Jane Roe";
    let safe = anonymizer.anonymize(text).unwrap();
    assert!(!safe.contains("John Doe"));
    assert!(!safe.contains("Jane Roe"));

    let mapping = anonymizer.mapping().unwrap();
    assert!(mapping.get(labels::PERSON, "John Doe").is_some());
    assert!(mapping.get(labels::PERSON, "john doe").is_none());

    assert_eq!(anonymizer.deanonymize(&safe).unwrap(), text);
}
