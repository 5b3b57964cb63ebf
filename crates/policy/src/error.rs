//! Error types for the retention core

use thiserror::Error;

/// Errors surfaced by classification and policy validation
#[derive(Debug, Error)]
pub enum Error {
    /// A database's retention configuration failed validation.
    ///
    /// Carries every violation found, not just the first. The caller skips
    /// this database and keeps processing its siblings.
    #[error("invalid retention policy for database `{database}`: {}", .problems.join("; "))]
    InvalidPolicy {
        database: String,
        problems: Vec<String>,
    },

    /// The classifier produced a file marked both keep and delete.
    ///
    /// This is an internal logic defect, not a data problem. Nothing may be
    /// deleted for the affected database.
    #[error("inconsistent classification: `{name}` appears in more than one result set")]
    InconsistentClassification { name: String },
}
