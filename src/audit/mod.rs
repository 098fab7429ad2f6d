//! Audit logging
//!
//! One record per de-identified document, with annotated values replaced by
//! their SHA-256 hashes.

pub mod logger;

pub use logger::{hash_value, AuditLogger};
