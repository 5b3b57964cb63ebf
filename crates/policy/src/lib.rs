//! Generational retention core
//!
//! This crate provides:
//! - Backup file modeling (extension classes, embedded dates, stripe keys)
//! - Weekly/monthly retention bucket construction
//! - The four-way keep/delete classifier
//! - Per-database policy validation
//!
//! Everything here is pure in-memory computation over an already-fetched
//! listing; storage I/O lives in the `storage` crate and deletion is the
//! caller's job.

pub mod backup;
pub mod classify;
pub mod error;
pub mod interval;
pub mod rules;
pub mod stripe;

// Re-exports
pub use backup::{BackupFile, BackupKind};
pub use classify::{classify, classify_database, Classification};
pub use error::Error;
pub use interval::{IntervalSet, TimeInterval};
pub use rules::{DatabaseRetention, RetentionJob, RetentionRules};

/// Result type for retention operations
pub type Result<T> = std::result::Result<T, Error>;
