//! Persisted anonymization mapping
//!
//! The mapping is stored as a whole: a JSON object
//! `{label: {original: substitute}}`.

use crate::anonymization::models::AnonymizationMapping;
use crate::domain::{Result, ShroudError};
use std::path::{Path, PathBuf};

/// Whole-mapping load/save
pub trait MappingStore: Send + Sync {
    /// Load the stored mapping; a missing or unreadable store yields an empty one
    ///
    /// Unreadable content must be preserved elsewhere before returning.
    fn load(&self) -> Result<AnonymizationMapping>;

    /// Replace the stored mapping
    fn save(&self, mapping: &AnonymizationMapping) -> Result<()>;
}

/// Mapping stored as pretty-printed JSON on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "mapping.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Sibling path for an unreadable mapping, e.g. `mapping.json.corrupt-20240101T120000Z`
    fn quarantine_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "mapping.json".into());
        name.push(format!(
            ".corrupt-{}",
            chrono::Utc::now().format("%Y%m%dT%H%M%S%.3fZ")
        ));
        self.path.with_file_name(name)
    }

    /// Move an unreadable mapping aside so a later save cannot overwrite it
    fn quarantine(&self) -> Result<PathBuf> {
        let target = self.quarantine_path();
        std::fs::rename(&self.path, &target).map_err(|e| {
            ShroudError::Io(format!(
                "Mapping file {} is corrupt and could not be moved aside: {e}",
                self.path.display()
            ))
        })?;
        Ok(target)
    }
}

impl MappingStore for JsonFileStore {
    fn load(&self) -> Result<AnonymizationMapping> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    path = %self.path.display(),
                    "No mapping file found, starting with an empty mapping"
                );
                return Ok(AnonymizationMapping::new());
            }
            Err(e) => {
                return Err(ShroudError::Io(format!(
                    "Failed to read mapping file {}: {e}",
                    self.path.display()
                )))
            }
        };

        match serde_json::from_str::<AnonymizationMapping>(&content) {
            Ok(mapping) => {
                tracing::debug!(
                    path = %self.path.display(),
                    entries = mapping.len(),
                    "Mapping loaded"
                );
                Ok(mapping)
            }
            Err(e) => {
                let moved_to = self.quarantine()?;
                tracing::warn!(
                    path = %self.path.display(),
                    moved_to = %moved_to.display(),
                    error = %e,
                    "Mapping file is corrupt, moved aside; starting with an empty mapping"
                );
                Ok(AnonymizationMapping::new())
            }
        }
    }

    fn save(&self, mapping: &AnonymizationMapping) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                ShroudError::Io(format!(
                    "Failed to create mapping directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let json = serde_json::to_string_pretty(mapping)?;
        let temp = self.temp_path();
        std::fs::write(&temp, json).map_err(|e| {
            ShroudError::Io(format!("Failed to write {}: {e}", temp.display()))
        })?;
        std::fs::rename(&temp, &self.path).map_err(|e| {
            ShroudError::Io(format!(
                "Failed to move mapping into place at {}: {e}",
                self.path.display()
            ))
        })?;

        tracing::debug!(
            path = %self.path.display(),
            entries = mapping.len(),
            "Mapping saved"
        );
        Ok(())
    }
}
