//! File-based configuration.
//!
//! # Responsibility
//! - Load optional `pressroom.toml` settings for the database and logging.
//! - Resolve effective values against built-in defaults.
//!
//! # Invariants
//! - A missing config file is not an error; it yields `None`.
//! - Unknown keys are rejected so typos surface early.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "pressroom.toml";
const DEFAULT_DATABASE_FILE: &str = "pressroom.db";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PressroomConfig {
    /// SQLite database file.
    pub database: Option<PathBuf>,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: Option<String>,
    /// Absolute directory for rolling log files. Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl PressroomConfig {
    pub fn database_or_default(&self) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_FILE))
    }

    pub fn log_level_or_default(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }

    /// Overlays `other` on top of `self`; set fields in `other` win.
    pub fn merged_with(self, other: Self) -> Self {
        Self {
            database: other.database.or(self.database),
            log_level: other.log_level.or(self.log_level),
            log_dir: other.log_dir.or(self.log_dir),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_FILE)
}

/// Loads config from `path`, or from `pressroom.toml` in the working directory.
pub fn load_config(path: Option<&Path>) -> Result<Option<PressroomConfig>, ConfigError> {
    let path = path.map_or_else(default_config_path, Path::to_path_buf);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })?;
    Ok(Some(config))
}

#[cfg(test)]
mod tests {
    use super::{load_config, ConfigError, PressroomConfig};
    use std::path::PathBuf;

    #[test]
    fn missing_file_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(Some(&dir.path().join("absent.toml"))).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn parses_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pressroom.toml");
        std::fs::write(
            &path,
            "database = \"data/articles.db\"\nlog_level = \"warn\"\nlog_dir = \"/var/log/pressroom\"\n",
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(config.database_or_default(), PathBuf::from("data/articles.db"));
        assert_eq!(config.log_level_or_default(), "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/pressroom")));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pressroom.toml");
        std::fs::write(&path, "databse = \"typo.db\"\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn merge_prefers_overlay_values() {
        let file = PressroomConfig {
            database: Some(PathBuf::from("file.db")),
            log_level: Some("info".to_string()),
            log_dir: None,
        };
        let flags = PressroomConfig {
            database: Some(PathBuf::from("flag.db")),
            ..PressroomConfig::default()
        };

        let merged = file.merged_with(flags);
        assert_eq!(merged.database_or_default(), PathBuf::from("flag.db"));
        assert_eq!(merged.log_level_or_default(), "info");
        assert_eq!(merged.log_dir, None);
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = PressroomConfig::default();
        assert_eq!(config.database_or_default(), PathBuf::from("pressroom.db"));
        assert!(!config.log_level_or_default().is_empty());
    }
}
