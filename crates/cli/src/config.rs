//! Configuration loading
//!
//! A single TOML file describes the storage root, engine housekeeping
//! directories, and the per-database retention policies. Parsing is
//! strict (`deny_unknown_fields`); per-database policy validation happens
//! separately in the `policy` crate so one bad database never blocks its
//! siblings.

use std::path::{Path, PathBuf};

use policy::DatabaseRetention;
use serde::Deserialize;
use thiserror::Error;

/// Engine-level housekeeping settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Directory for daily-rolling audit logs; console-only when unset
    pub log_dir: Option<PathBuf>,
    /// Directory for the run lock; defaults under the local data dir
    pub state_dir: Option<PathBuf>,
}

impl EngineConfig {
    /// Resolved state directory for lock files
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("cull")
        })
    }
}

/// Storage backend settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory store root; each container is a sub-directory
    pub root: PathBuf,
}

/// Complete configuration file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub databases: Vec<DatabaseRetention>,
}

/// Configuration file problems
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Load configuration from an explicit path or the default location.
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path(),
    };
    if !path.exists() {
        return Err(ConfigError::NotFound(path));
    }

    let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let config = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    Ok(config)
}

/// Default config location: `<config_dir>/cull/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cull")
        .join("config.toml")
}

/// Documented sample configuration
pub fn example_config() -> &'static str {
    r#"# Cull configuration
#
# Containers are sub-directories of storage.root; every *.bak and *.trn
# blob inside a database's container is subject to its retention policy.

[engine]
# Daily-rolling audit log directory. Omit to log to the console only.
# log_dir = "/var/log/cull"
# Run-lock directory. Defaults to the local data dir.
# state_dir = "/var/lib/cull"

[storage]
root = "/srv/backups"

[[databases]]
name = "orders"
container = "orders-backups"
# Keep everything from the last week.
retain_all_days = 7
# Then one backup per week for four weeks ...
weekly_backups = 4
# ... and one backup per month for six months.
monthly_backups = 6
# Set for databases whose full backups are striped across
# co-timestamped files (kept or deleted as a group).
striped = false
# Fall back to the storage creation time when a blob name carries no
# _YYYY_MM_DD_ token. Defaults to true.
use_storage_timestamp = true
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_parses() {
        let config: AppConfig = toml::from_str(example_config()).unwrap();
        assert_eq!(config.storage.root, PathBuf::from("/srv/backups"));
        assert_eq!(config.databases.len(), 1);
        assert_eq!(config.databases[0].name, "orders");
        assert!(config.databases[0].validate().is_ok());
    }

    #[test]
    fn test_minimal_config() {
        let config: AppConfig = toml::from_str(
            r#"
            [storage]
            root = "/srv/backups"
            "#,
        )
        .unwrap();
        assert!(config.databases.is_empty());
        assert!(config.engine.log_dir.is_none());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result: Result<AppConfig, _> = toml::from_str(
            r#"
            [storage]
            root = "/srv/backups"
            bucket = "typo"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let missing = Path::new("/nonexistent/cull.toml");
        assert!(matches!(
            load(Some(missing)),
            Err(ConfigError::NotFound(_))
        ));
    }
}
