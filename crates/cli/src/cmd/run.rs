//! Enforce retention across the configured databases

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use storage::DirStore;
use tracing::error;

use crate::config;
use crate::engine::{self, DatabaseOutcome};
use crate::locks::RunLock;
use crate::logging;
use crate::report;

/// Aggregate counters across one run
#[derive(Debug, Default)]
struct RunTotals {
    kept: usize,
    deleted: usize,
    failed_deletes: usize,
    skipped_databases: usize,
    failed_databases: usize,
}

pub async fn run(
    config_path: Option<PathBuf>,
    dry_run: bool,
    database: Option<String>,
) -> Result<()> {
    // 1. Load configuration and bring up logging.
    let config = config::load(config_path.as_deref()).context("Failed to load configuration")?;
    let _log_guard = logging::init(config.engine.log_dir.as_deref());

    // 2. Resolve the database selection.
    let databases: Vec<_> = match &database {
        Some(name) => {
            let selected: Vec<_> = config
                .databases
                .iter()
                .filter(|db| db.name.eq_ignore_ascii_case(name))
                .cloned()
                .collect();
            if selected.is_empty() {
                anyhow::bail!("No configured database named `{}`", name);
            }
            selected
        }
        None => config.databases.clone(),
    };
    if databases.is_empty() {
        println!("{}", "No databases configured - nothing to do".dimmed());
        return Ok(());
    }

    // 3. A real run takes the run lock; a dry run touches nothing.
    let _lock = if dry_run {
        None
    } else {
        Some(RunLock::acquire(&config.engine.state_dir())?)
    };

    let store = DirStore::new(config.storage.root.clone());
    let now = Utc::now();

    let header = if dry_run {
        "Planning Retention (dry run)..."
    } else {
        "Running Retention..."
    };
    println!("{}", header.bold());
    println!();

    // 4. One database at a time; a failure never blocks its siblings.
    let progress = ProgressBar::new(databases.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut totals = RunTotals::default();
    let mut outcomes: Vec<DatabaseOutcome> = Vec::new();

    for entry in &databases {
        progress.set_message(entry.name.clone());

        let job = match entry.validate() {
            Ok(job) => job,
            Err(e) => {
                error!(error = %e, "skipping database with invalid policy");
                totals.skipped_databases += 1;
                progress.inc(1);
                continue;
            }
        };

        match engine::enforce_database(&store, &job, now, dry_run).await {
            Ok(outcome) => {
                totals.kept += outcome.classification.kept();
                totals.deleted += outcome.deleted;
                totals.failed_deletes += outcome.failed;
                outcomes.push(outcome);
            }
            Err(e) => {
                // Listing failure or an inconsistent classification; in
                // either case nothing was deleted for this database.
                error!(database = %job.database, error = %e, "retention failed for database");
                totals.failed_databases += 1;
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    // 5. Per-database report.
    for outcome in &outcomes {
        report::print_summary_line(&outcome.database, &outcome.classification);
        if dry_run {
            report::print_breakdown(&outcome.classification);
        }
    }
    println!();

    // 6. Run summary.
    let done = if dry_run {
        "Dry Run Complete"
    } else {
        "Retention Complete"
    };
    println!("{}", done.green().bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();
    println!("Databases processed: {}", outcomes.len());
    println!("Objects kept:        {}", totals.kept.to_string().green());
    if dry_run {
        let planned: usize = outcomes
            .iter()
            .map(|o| o.classification.to_delete.len())
            .sum();
        println!("Objects to delete:   {}", planned.to_string().yellow());
    } else {
        println!("Objects deleted:     {}", totals.deleted.to_string().yellow());
    }
    if totals.failed_deletes > 0 {
        println!(
            "Failed deletes:      {}",
            totals.failed_deletes.to_string().red()
        );
    }
    if totals.skipped_databases > 0 {
        println!(
            "Skipped (invalid):   {}",
            totals.skipped_databases.to_string().red()
        );
    }
    if totals.failed_databases > 0 {
        println!(
            "Failed databases:    {}",
            totals.failed_databases.to_string().red()
        );
    }

    Ok(())
}
