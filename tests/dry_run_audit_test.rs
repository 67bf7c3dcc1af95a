//! Dry-run behaviour and audit log contents

use shroud::anonymization::audit::AuditLogger;
use shroud::anonymization::operators::value_hash;
use shroud::anonymization::ReversibleAnonymizer;
use tempfile::TempDir;

const NOTE: &str = "Reach Jo at jo@example.org or 415-555-0134.";

#[test]
fn test_dry_run_detects_without_substituting() {
    let anonymizer = ReversibleAnonymizer::builder()
        .faker_seed(1)
        .dry_run(true)
        .build()
        .unwrap();

    let result = anonymizer.anonymize_detailed(NOTE).unwrap();
    assert!(result.dry_run);
    assert_eq!(result.text, NOTE);
    assert_eq!(result.total_substitutions(), 2);
    assert!(result.substitutions.iter().all(|s| !s.newly_mapped));
    assert!(anonymizer.mapping().unwrap().is_empty());
}

#[test]
fn test_audit_log_never_contains_plaintext() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("audit").join("anonymization.log");

    let anonymizer = ReversibleAnonymizer::builder()
        .faker_seed(1)
        .audit_logger(AuditLogger::new(log_path.clone(), true).unwrap())
        .build()
        .unwrap();

    anonymizer.anonymize(NOTE).unwrap();
    anonymizer.anonymize("jo@example.org again").unwrap();

    let contents = std::fs::read_to_string(&log_path).unwrap();
    let entries: Vec<serde_json::Value> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["detections_count"], 2);
    assert_eq!(entries[0]["new_mappings"], 2);
    assert_eq!(entries[1]["new_mappings"], 0);
    assert_eq!(
        entries[1]["detections"][0]["value_hash"],
        value_hash("jo@example.org")
    );
    assert!(!contents.contains("jo@example.org"));
    assert!(!contents.contains("415-555-0134"));
}

#[test]
fn test_text_audit_format() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("anonymization.log");

    let anonymizer = ReversibleAnonymizer::builder()
        .audit_logger(AuditLogger::new(log_path.clone(), false).unwrap())
        .build()
        .unwrap();
    anonymizer.anonymize(NOTE).unwrap();

    let contents = std::fs::read_to_string(&log_path).unwrap();
    assert!(contents.contains("Detections: 2"));
    assert!(contents.contains("EMAIL_ADDRESS"));
    assert!(!contents.contains("jo@example.org"));
}
