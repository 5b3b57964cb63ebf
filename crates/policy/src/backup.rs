//! Backup file modeling
//!
//! Turns a raw blob listing entry (name plus optional storage creation
//! time) into a timestamped, stripe-aware record. The timestamp resolves
//! through a fallback chain that ends at a far-future sentinel, so a file
//! we cannot date is never eligible for deletion.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Extension of full database backups
pub const FULL_BACKUP_EXT: &str = ".bak";
/// Extension of transaction log backups
pub const TRANSACTION_LOG_EXT: &str = ".trn";

/// Kind of backup artifact, derived from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupKind {
    /// Complete database snapshot
    Full,
    /// Incremental transaction log
    TransactionLog,
}

impl BackupKind {
    /// Classify a blob name by extension, case-insensitively.
    ///
    /// Returns `None` for names with neither backup extension; such blobs
    /// are excluded before they ever reach the classifier.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(FULL_BACKUP_EXT) {
            Some(Self::Full)
        } else if lower.ends_with(TRANSACTION_LOG_EXT) {
            Some(Self::TransactionLog)
        } else {
            None
        }
    }
}

/// A single backup artifact from a container listing
///
/// Name and timestamp are fixed at construction and never recomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupFile {
    name: String,
    timestamp: DateTime<Utc>,
    kind: BackupKind,
    stripe_key: String,
}

impl BackupFile {
    /// Build a record from a listing entry whose kind is already known.
    ///
    /// Timestamp priority: an embedded `_YYYY_MM_DD_` token in the name,
    /// then the storage-reported creation time when `use_storage_timestamp`
    /// is set, then the far-future sentinel.
    pub fn new(
        name: impl Into<String>,
        kind: BackupKind,
        storage_created: Option<DateTime<Utc>>,
        use_storage_timestamp: bool,
    ) -> Self {
        let name = name.into();
        let fallback = if use_storage_timestamp {
            storage_created
        } else {
            None
        };
        let timestamp = embedded_date(&name)
            .map(|d| d.and_time(NaiveTime::MIN).and_utc())
            .or(fallback)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let stripe_key = stripe_key(&name);

        Self {
            name,
            timestamp,
            kind,
            stripe_key,
        }
    }

    /// Build a record straight from a listing entry, filtering by
    /// extension. Returns `None` for non-backup blobs.
    pub fn from_listing(
        name: &str,
        storage_created: Option<DateTime<Utc>>,
        use_storage_timestamp: bool,
    ) -> Option<Self> {
        let kind = BackupKind::from_name(name)?;
        Some(Self::new(name, kind, storage_created, use_storage_timestamp))
    }

    /// Blob name, case preserved
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-folded name used as identity in set comparisons
    pub fn name_key(&self) -> String {
        self.name.to_ascii_lowercase()
    }

    /// Logical creation time
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Full backup or transaction log
    pub fn kind(&self) -> BackupKind {
        self.kind
    }

    /// Whether this is a transaction log artifact
    pub fn is_transaction_log(&self) -> bool {
        self.kind == BackupKind::TransactionLog
    }

    /// Name prefix grouping parallel stripes of one logical backup
    pub fn stripe_key(&self) -> &str {
        &self.stripe_key
    }

    /// Whether the timestamp fell through to the never-delete sentinel
    pub fn is_undated(&self) -> bool {
        self.timestamp == DateTime::<Utc>::MAX_UTC
    }
}

/// Scan for the leftmost `_YYYY_MM_DD_` token naming a real calendar date.
///
/// Fixed width: four digit year, two digit month, two digit day, all
/// underscore-delimited. A token that matches the shape but is not a valid
/// date is skipped and the scan continues.
fn embedded_date(name: &str) -> Option<NaiveDate> {
    const TOKEN_LEN: usize = 12; // _YYYY_MM_DD_
    let bytes = name.as_bytes();
    if bytes.len() < TOKEN_LEN {
        return None;
    }

    for start in 0..=bytes.len() - TOKEN_LEN {
        let token = &bytes[start..start + TOKEN_LEN];
        if token[0] != b'_' || token[5] != b'_' || token[8] != b'_' || token[11] != b'_' {
            continue;
        }
        let digits = token[1..5]
            .iter()
            .chain(&token[6..8])
            .chain(&token[9..11])
            .all(|b| b.is_ascii_digit());
        if !digits {
            continue;
        }

        // All-ASCII by the checks above, so slicing the str is safe.
        let year: i32 = name[start + 1..start + 5].parse().ok()?;
        let month: u32 = name[start + 6..start + 8].parse().ok()?;
        let day: u32 = name[start + 9..start + 11].parse().ok()?;

        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    None
}

/// Portion of the name preceding its rightmost run of one or two digits.
///
/// Parallel stripe files differ only in a trailing stripe index
/// (`..._1.bak`, `..._2.bak`); everything before that index is the group
/// key. A name with no digit anywhere has no group and keys as itself.
/// Only the last two digits of a longer run count as the index.
fn stripe_key(name: &str) -> String {
    let bytes = name.as_bytes();
    let Some(last) = bytes.iter().rposition(|b| b.is_ascii_digit()) else {
        return name.to_string();
    };

    let mut start = last;
    if start > 0 && bytes[start - 1].is_ascii_digit() {
        start -= 1;
    }
    name[..start].to_string()
}
