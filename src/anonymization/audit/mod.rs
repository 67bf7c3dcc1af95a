//! Audit logging module
//!
//! Records one entry per anonymize call. Sensitive values only ever appear
//! as SHA-256 hashes.

pub mod logger;

pub use logger::AuditLogger;
