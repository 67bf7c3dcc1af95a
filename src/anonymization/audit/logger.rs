//! Audit logger for anonymization calls

use crate::anonymization::config::AuditConfig;
use crate::anonymization::models::{AnonymizedText, AppliedSubstitution};
use crate::anonymization::operators::value_hash;
use crate::domain::{Result, ShroudError};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

/// Audit log entry
#[derive(Debug, Serialize)]
struct AuditLogEntry {
    timestamp: String,
    call_id: String,
    detections_count: usize,
    new_mappings: usize,
    dry_run: bool,
    processing_time_ms: u64,
    detections: Vec<AuditDetection>,
}

/// Audit detection entry (with hashed value)
#[derive(Debug, Serialize)]
struct AuditDetection {
    label: String,
    recognizer: String,
    operator: String,
    score: f32,
    /// SHA-256 hash of the original value (never log plaintext)
    value_hash: String,
}

/// Append-only audit log
#[derive(Debug)]
pub struct AuditLogger {
    log_path: PathBuf,
    json_format: bool,
    write_lock: Mutex<()>,
}

impl AuditLogger {
    /// Create a logger, creating the log directory if needed
    pub fn new(log_path: PathBuf, json_format: bool) -> Result<Self> {
        if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                ShroudError::Io(format!(
                    "Failed to create audit log directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        Ok(Self {
            log_path,
            json_format,
            write_lock: Mutex::new(()),
        })
    }

    /// Logger for an enabled audit section, `None` when disabled
    pub fn from_config(config: &AuditConfig) -> Result<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }
        Self::new(config.log_path.clone(), config.json_format).map(Some)
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Record one anonymize call
    ///
    /// Returns the generated call id.
    pub fn log_anonymization(&self, result: &AnonymizedText, processing_time_ms: u64) -> Result<Uuid> {
        let call_id = Uuid::new_v4();
        let entry = AuditLogEntry {
            timestamp: chrono::Utc::now().to_rfc3339(),
            call_id: call_id.to_string(),
            detections_count: result.substitutions.len(),
            new_mappings: result.substitutions.iter().filter(|s| s.newly_mapped).count(),
            dry_run: result.dry_run,
            processing_time_ms,
            detections: result
                .substitutions
                .iter()
                .map(create_audit_detection)
                .collect(),
        };

        self.write_entry(&entry)?;
        Ok(call_id)
    }

    /// Write an audit entry to the log file
    fn write_entry(&self, entry: &AuditLogEntry) -> Result<()> {
        let line = if self.json_format {
            let mut json = serde_json::to_string(entry)?;
            json.push('\n');
            json
        } else {
            let labels: Vec<&str> = entry.detections.iter().map(|d| d.label.as_str()).collect();
            format!(
                "[{}] Call: {} | Detections: {} | New: {} | Labels: {} | Time: {}ms\n",
                entry.timestamp,
                entry.call_id,
                entry.detections_count,
                entry.new_mappings,
                labels.join(","),
                entry.processing_time_ms
            )
        };

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| ShroudError::Io("Audit log lock poisoned".to_string()))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| {
                ShroudError::Io(format!(
                    "Failed to open audit log {}: {e}",
                    self.log_path.display()
                ))
            })?;

        file.write_all(line.as_bytes())
            .map_err(|e| ShroudError::Io(format!("Failed to write audit entry: {e}")))
    }
}

fn create_audit_detection(substitution: &AppliedSubstitution) -> AuditDetection {
    AuditDetection {
        label: substitution.entity.label().to_string(),
        recognizer: substitution.entity.recognizer().to_string(),
        operator: substitution.operator.clone(),
        score: substitution.entity.score(),
        value_hash: value_hash(substitution.entity.text()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::models::{EntityLabel, EntityMatch};
    use tempfile::tempdir;

    fn sample() -> AnonymizedText {
        let entity = EntityMatch::new(
            EntityLabel::new("EMAIL_ADDRESS").unwrap(),
            8,
            24,
            1.0,
            "test@example.com",
            "email_recognizer",
        );
        AnonymizedText {
            text: "contact jane@example.org".to_string(),
            substitutions: vec![AppliedSubstitution {
                entity,
                substitute: "jane@example.org".to_string(),
                operator: "fake".to_string(),
                output_start: 8,
                output_end: 24,
                newly_mapped: true,
            }],
            dry_run: false,
        }
    }

    #[test]
    fn test_disabled_config_gives_no_logger() {
        let config = AuditConfig::default();
        assert!(AuditLogger::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_json_entry_has_no_plaintext() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("nested").join("audit.log");
        let logger = AuditLogger::new(log_path.clone(), true).unwrap();

        let call_id = logger.log_anonymization(&sample(), 3).unwrap();
        logger.log_anonymization(&sample(), 4).unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let entry: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(entry["call_id"], call_id.to_string());
        assert_eq!(entry["detections_count"], 1);
        assert_eq!(entry["detections"][0]["label"], "EMAIL_ADDRESS");
        assert_eq!(
            entry["detections"][0]["value_hash"],
            value_hash("test@example.com")
        );
        assert!(!content.contains("test@example.com"));
    }

    #[test]
    fn test_plain_text_format() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit.log");
        let logger = AuditLogger::new(log_path.clone(), false).unwrap();

        logger.log_anonymization(&sample(), 1).unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("Detections: 1"));
        assert!(content.contains("Labels: EMAIL_ADDRESS"));
        assert!(!content.contains("test@example.com"));
    }
}
