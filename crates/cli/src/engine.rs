//! Per-database retention enforcement pipeline
//!
//! The pipeline for one database: list the container, model the listing,
//! classify, then delete the delete set one object at a time. A failed
//! delete is reported and the loop continues; an inconsistent
//! classification aborts before anything is deleted.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use policy::{classify_database, BackupFile, Classification, RetentionJob};
use storage::ObjectStore;
use tracing::{debug, info, warn};

/// Outcome of one database's enforcement pass
#[derive(Debug)]
pub struct DatabaseOutcome {
    pub database: String,
    pub container: String,
    pub classification: Classification,
    /// Objects actually deleted
    pub deleted: usize,
    /// Delete calls that failed and were skipped over
    pub failed: usize,
    pub dry_run: bool,
}

/// Classify one database's container listing without touching anything.
pub async fn plan_database(
    store: &dyn ObjectStore,
    job: &RetentionJob,
    now: DateTime<Utc>,
) -> Result<Classification> {
    let listing = store
        .list_objects(&job.container)
        .await
        .with_context(|| format!("failed to list container `{}`", job.container))?;

    let mut files: Vec<BackupFile> = Vec::with_capacity(listing.len());
    let mut ignored = 0usize;
    for object in listing {
        let file =
            BackupFile::from_listing(&object.name, object.created, job.rules.use_storage_timestamp);
        match file {
            Some(file) => files.push(file),
            None => ignored += 1,
        }
    }
    if ignored > 0 {
        debug!(database = %job.database, ignored, "skipped non-backup objects");
    }

    info!(
        database = %job.database,
        container = %job.container,
        files = files.len(),
        "classifying backup listing"
    );
    let classification = classify_database(files, &job.rules, now)?;
    Ok(classification)
}

/// Enforce retention for one database.
pub async fn enforce_database(
    store: &dyn ObjectStore,
    job: &RetentionJob,
    now: DateTime<Utc>,
    dry_run: bool,
) -> Result<DatabaseOutcome> {
    let classification = plan_database(store, job, now).await?;

    // Re-assert keep/delete disjointness immediately before anything
    // destructive.
    classification.check_disjoint()?;

    let mut deleted = 0usize;
    let mut failed = 0usize;
    if !dry_run {
        for file in &classification.to_delete {
            match store.delete_object(&job.container, file.name()).await {
                Ok(()) => {
                    deleted += 1;
                    info!(database = %job.database, object = %file.name(), "deleted backup object");
                }
                Err(e) => {
                    failed += 1;
                    warn!(
                        database = %job.database,
                        object = %file.name(),
                        error = %e,
                        "delete failed, continuing with remaining objects"
                    );
                }
            }
        }
    }

    Ok(DatabaseOutcome {
        database: job.database.clone(),
        container: job.container.clone(),
        classification,
        deleted,
        failed,
        dry_run,
    })
}
