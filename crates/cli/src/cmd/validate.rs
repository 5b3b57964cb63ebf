//! Check the configuration file and every database policy

use std::path::PathBuf;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use crate::config;

pub async fn run(config_path: Option<PathBuf>) -> Result<()> {
    let path = config_path
        .clone()
        .unwrap_or_else(config::default_config_path);
    let config = config::load(config_path.as_deref()).context("Failed to load configuration")?;

    println!("{}", "Configuration".bold());
    println!("{}: {}\n", "Location".dimmed(), path.display());

    if !config.storage.root.is_dir() {
        println!(
            "{} storage root does not exist: {}",
            "warning:".yellow(),
            config.storage.root.display()
        );
    }
    if config.databases.is_empty() {
        println!("{} no databases configured", "warning:".yellow());
    }

    let mut invalid = 0usize;
    for entry in &config.databases {
        match entry.validate() {
            Ok(job) => {
                println!(
                    "{} {} (container `{}`, keep-all {}d, {} weekly, {} monthly{})",
                    "✓".green(),
                    job.database.bold(),
                    job.container,
                    job.rules.retain_all_days,
                    job.rules.weekly_backups,
                    job.rules.monthly_backups,
                    if job.rules.striped { ", striped" } else { "" }
                );
            }
            Err(e) => {
                invalid += 1;
                println!("{} {}", "✗".red(), e);
            }
        }
    }

    if invalid > 0 {
        anyhow::bail!("{} invalid database polic{}", invalid, if invalid == 1 { "y" } else { "ies" });
    }
    Ok(())
}
