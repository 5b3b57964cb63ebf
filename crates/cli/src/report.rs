//! Human-readable rendering of classification results

use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use policy::{BackupFile, Classification};

/// Format a backup timestamp for display
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    if ts == DateTime::<Utc>::MAX_UTC {
        "undated".to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// One-line summary for a database
pub fn print_summary_line(database: &str, c: &Classification) {
    println!(
        "{} {} kept ({} recent, {} weekly, {} monthly), {} to delete",
        database.bold(),
        c.kept().to_string().green(),
        c.keep_all.len(),
        c.keep_weekly.len(),
        c.keep_monthly.len(),
        c.to_delete.len().to_string().yellow()
    );
}

/// Full breakdown of all four sets
pub fn print_breakdown(c: &Classification) {
    print_set("keep (recent)", &c.keep_all);
    print_set("keep (weekly)", &c.keep_weekly);
    print_set("keep (monthly)", &c.keep_monthly);
    print_delete_set(&c.to_delete);
}

fn print_set(label: &str, files: &[BackupFile]) {
    if files.is_empty() {
        return;
    }
    println!("  {}", label.cyan());
    for file in files {
        println!(
            "    {} {}",
            file.name(),
            format_timestamp(file.timestamp()).dimmed()
        );
    }
}

fn print_delete_set(files: &[BackupFile]) {
    if files.is_empty() {
        println!("  {}", "nothing to delete".dimmed());
        return;
    }
    println!("  {}", "delete".red());
    for file in files {
        println!(
            "    {} {}",
            file.name(),
            format_timestamp(file.timestamp()).dimmed()
        );
    }
}
