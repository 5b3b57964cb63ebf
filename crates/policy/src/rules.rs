//! Retention rules and per-database validation
//!
//! Raw configuration values deserialize as-is (signed, possibly nonsense)
//! and must pass through [`DatabaseRetention::validate`] before
//! classification runs. Validation collects every problem for a database
//! instead of stopping at the first.

use serde::Deserialize;

use crate::error::Error;

/// Validated retention parameters for one database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionRules {
    /// Width in days of the unconditional keep window
    pub retain_all_days: u32,
    /// Trailing weekly generations kept past the keep-all window
    pub weekly_backups: u32,
    /// Trailing monthly generations kept past the keep-all window
    pub monthly_backups: u32,
    /// Full backups are striped across co-timestamped files
    pub striped: bool,
    /// Fall back to storage creation time when a name has no embedded date
    pub use_storage_timestamp: bool,
}

/// One `[[databases]]` entry as it appears in the configuration file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseRetention {
    /// Database name, used for reporting and `--database` filtering
    pub name: String,
    /// Storage container holding this database's backup blobs
    pub container: String,
    pub retain_all_days: i64,
    pub weekly_backups: i64,
    pub monthly_backups: i64,
    #[serde(default)]
    pub striped: bool,
    #[serde(default = "default_true")]
    pub use_storage_timestamp: bool,
}

fn default_true() -> bool {
    true
}

/// A database ready to classify: identity plus validated rules
#[derive(Debug, Clone)]
pub struct RetentionJob {
    pub database: String,
    pub container: String,
    pub rules: RetentionRules,
}

impl DatabaseRetention {
    /// Check this entry for well-formedness, collecting every violation.
    ///
    /// A rejected database is skipped by the caller; sibling databases
    /// still run.
    pub fn validate(&self) -> Result<RetentionJob, Error> {
        let mut problems = Vec::new();

        if self.name.trim().is_empty() {
            problems.push("database name must not be empty".to_string());
        }
        if self.container.trim().is_empty() {
            problems.push("container must not be empty".to_string());
        }

        let retain_all_days = checked_count("retain_all_days", self.retain_all_days, &mut problems);
        let weekly_backups = checked_count("weekly_backups", self.weekly_backups, &mut problems);
        let monthly_backups = checked_count("monthly_backups", self.monthly_backups, &mut problems);

        if !problems.is_empty() {
            return Err(Error::InvalidPolicy {
                database: self.name.clone(),
                problems,
            });
        }

        Ok(RetentionJob {
            database: self.name.clone(),
            container: self.container.clone(),
            rules: RetentionRules {
                retain_all_days,
                weekly_backups,
                monthly_backups,
                striped: self.striped,
                use_storage_timestamp: self.use_storage_timestamp,
            },
        })
    }
}

/// Validate one counter field into its unsigned form
fn checked_count(field: &str, value: i64, problems: &mut Vec<String>) -> u32 {
    if value < 0 {
        problems.push(format!("{field} must be non-negative, got {value}"));
        return 0;
    }
    match u32::try_from(value) {
        Ok(v) => v,
        Err(_) => {
            problems.push(format!("{field} is out of range, got {value}"));
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> DatabaseRetention {
        DatabaseRetention {
            name: "orders".to_string(),
            container: "orders-backups".to_string(),
            retain_all_days: 7,
            weekly_backups: 4,
            monthly_backups: 6,
            striped: false,
            use_storage_timestamp: true,
        }
    }

    #[test]
    fn test_valid_entry_passes() {
        let job = entry().validate().unwrap();
        assert_eq!(job.database, "orders");
        assert_eq!(job.container, "orders-backups");
        assert_eq!(job.rules.retain_all_days, 7);
        assert_eq!(job.rules.weekly_backups, 4);
        assert_eq!(job.rules.monthly_backups, 6);
    }

    #[test]
    fn test_negative_counter_rejected() {
        let mut bad = entry();
        bad.weekly_backups = -1;
        let err = bad.validate().unwrap_err();
        assert!(err.to_string().contains("weekly_backups"));
    }

    #[test]
    fn test_all_problems_collected() {
        let bad = DatabaseRetention {
            name: "  ".to_string(),
            container: String::new(),
            retain_all_days: -3,
            weekly_backups: -1,
            monthly_backups: -2,
            striped: false,
            use_storage_timestamp: true,
        };
        match bad.validate() {
            Err(Error::InvalidPolicy { problems, .. }) => assert_eq!(problems.len(), 5),
            other => panic!("expected InvalidPolicy, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_counters_are_valid() {
        let mut zero = entry();
        zero.retain_all_days = 0;
        zero.weekly_backups = 0;
        zero.monthly_backups = 0;
        assert!(zero.validate().is_ok());
    }

    #[test]
    fn test_toml_defaults() {
        let entry: DatabaseRetention = toml::from_str(
            r#"
            name = "orders"
            container = "orders-backups"
            retain_all_days = 7
            weekly_backups = 4
            monthly_backups = 6
            "#,
        )
        .unwrap();
        assert!(!entry.striped);
        assert!(entry.use_storage_timestamp);
    }
}
