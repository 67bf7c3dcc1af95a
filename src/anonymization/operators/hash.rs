//! Salted one-way hashing

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};

/// Digest used by the hash operator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashType {
    #[default]
    Sha256,
    Sha512,
}

impl HashType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }
}

/// Lowercase hex digest of `salt || value`
pub fn salted_hash(value: &str, salt: &str, hash_type: HashType) -> String {
    match hash_type {
        HashType::Sha256 => {
            let mut hasher = Sha256::new();
            hasher.update(salt.as_bytes());
            hasher.update(value.as_bytes());
            format!("{:x}", hasher.finalize())
        }
        HashType::Sha512 => {
            let mut hasher = Sha512::new();
            hasher.update(salt.as_bytes());
            hasher.update(value.as_bytes());
            format!("{:x}", hasher.finalize())
        }
    }
}

/// Unsalted SHA-256 used for audit records and reports
pub fn value_hash(value: &str) -> String {
    salted_hash(value, "", HashType::Sha256)
}
