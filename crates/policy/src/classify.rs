//! The four-way retention classifier
//!
//! Consumes every backup file for one database plus the interval set and
//! partitions them into delete / keep-all / keep-weekly / keep-monthly.
//! Each pass produces a new remaining pool rather than mutating one in
//! place. The classifier never talks to storage; deletion belongs to the
//! caller, and only after [`Classification::check_disjoint`] has passed.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::backup::BackupFile;
use crate::error::Error;
use crate::interval::{IntervalSet, TimeInterval};
use crate::rules::RetentionRules;
use crate::stripe::expand_stripe_group;

/// Disjoint classification of one database's backup files
///
/// Every input file lands in exactly one of the four sets.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub to_delete: Vec<BackupFile>,
    pub keep_all: Vec<BackupFile>,
    pub keep_weekly: Vec<BackupFile>,
    pub keep_monthly: Vec<BackupFile>,
}

impl Classification {
    /// Total number of classified files
    pub fn total(&self) -> usize {
        self.to_delete.len() + self.kept()
    }

    /// Number of files retained across the three keep sets
    pub fn kept(&self) -> usize {
        self.keep_all.len() + self.keep_weekly.len() + self.keep_monthly.len()
    }

    /// Verify the four sets are pairwise disjoint.
    ///
    /// A violation means the classifier itself is defective; the caller
    /// must abort without deleting anything for this database.
    pub fn check_disjoint(&self) -> Result<(), Error> {
        let mut seen = HashSet::with_capacity(self.total());
        let all = self
            .keep_all
            .iter()
            .chain(&self.keep_weekly)
            .chain(&self.keep_monthly)
            .chain(&self.to_delete);
        for file in all {
            if !seen.insert(file.name_key()) {
                return Err(Error::InconsistentClassification {
                    name: file.name().to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Classify one database's files against rules and a reference instant.
pub fn classify_database(
    files: Vec<BackupFile>,
    rules: &RetentionRules,
    now: DateTime<Utc>,
) -> Result<Classification, Error> {
    let intervals = IntervalSet::build(now, rules);
    classify(files, rules, &intervals)
}

/// Classify one database's files against prebuilt intervals.
pub fn classify(
    files: Vec<BackupFile>,
    rules: &RetentionRules,
    intervals: &IntervalSet,
) -> Result<Classification, Error> {
    // Pass 1: unconditional deletions. Transaction logs are never retained
    // outside the keep-all window; nothing of any kind survives past the
    // global cutoff.
    let (doomed, pool): (Vec<_>, Vec<_>) = files.into_iter().partition(|f| {
        (f.is_transaction_log() && f.timestamp() < intervals.keep_all_cutoff)
            || f.timestamp() < intervals.global_cutoff
    });

    // Pass 2: everything inside the keep-all window stays, no thinning.
    let (keep_all, pool): (Vec<_>, Vec<_>) = pool
        .into_iter()
        .partition(|f| f.timestamp() >= intervals.keep_all_cutoff);

    // Passes 3 and 4: weekly buckets claim their representatives first;
    // the monthly pass only sees what the weekly pass left behind.
    let (keep_weekly, pool) =
        select_bucket_representatives(pool, &intervals.weekly, rules.striped, "weekly");
    let (keep_monthly, pool) =
        select_bucket_representatives(pool, &intervals.monthly, rules.striped, "monthly");

    // Pass 5: the residue lost its bucket or fell between boundaries.
    let mut to_delete = doomed;
    to_delete.extend(pool);

    let result = Classification {
        to_delete,
        keep_all,
        keep_weekly,
        keep_monthly,
    };
    result.check_disjoint()?;
    Ok(result)
}

/// Walk buckets newest to oldest, keeping the newest file (or tied stripe
/// group) in each, and return the kept files plus the shrunken pool.
fn select_bucket_representatives(
    mut pool: Vec<BackupFile>,
    buckets: &[TimeInterval],
    striped: bool,
    pass: &str,
) -> (Vec<BackupFile>, Vec<BackupFile>) {
    let mut kept = Vec::new();

    for bucket in buckets {
        let chosen = bucket_representatives(&pool, bucket, striped);
        if chosen.is_empty() {
            // An empty bucket is a normal state, not an error.
            continue;
        }
        debug!(
            pass,
            start = %bucket.start,
            end = %bucket.end,
            kept = chosen.len(),
            "bucket representative selected"
        );

        let (take, rest): (Vec<_>, Vec<_>) = pool
            .into_iter()
            .partition(|f| chosen.contains(&f.name_key()));
        kept.extend(take);
        pool = rest;
    }

    (kept, pool)
}

/// Explicit tied-max selection inside one bucket.
///
/// Returns the name keys of every file sharing the maximum timestamp,
/// expanded to whole stripe groups when the database is striped.
fn bucket_representatives(
    pool: &[BackupFile],
    bucket: &TimeInterval,
    striped: bool,
) -> HashSet<String> {
    let candidates: Vec<&BackupFile> = pool
        .iter()
        .filter(|f| bucket.contains(f.timestamp()))
        .collect();

    let Some(newest) = candidates.iter().map(|f| f.timestamp()).max() else {
        return HashSet::new();
    };

    let mut chosen = HashSet::new();
    for file in candidates.iter().filter(|f| f.timestamp() == newest) {
        for member in expand_stripe_group(file, pool, striped) {
            chosen.insert(member.name_key());
        }
    }
    chosen
}
