//! Application settings.
//!
//! Settings come from a JSON file whose path is named by `BLOG_SETTINGS`;
//! any field left out keeps its default.

use crate::auth::{AdminCredentials, HashParams};
use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Environment variable naming the settings file.
pub const SETTINGS_ENV_VAR: &str = "BLOG_SETTINGS";

const DEFAULT_DATABASE_FILE: &str = "blog.db";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogConfig {
    pub database_path: PathBuf,
    /// Admin identity. The default carries no password hash, so login is
    /// refused until one is configured.
    pub admin: AdminCredentials,
    pub password_hashing: HashParams,
    pub log_level: String,
    /// Absolute directory for rolling log files; file logging is off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_FILE),
            admin: AdminCredentials::default(),
            password_hashing: HashParams::default(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: Option<PathBuf>,
        source: serde_json::Error,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read settings `{}`: {source}", path.display())
            }
            Self::Parse {
                path: Some(path),
                source,
            } => write!(f, "invalid settings `{}`: {source}", path.display()),
            Self::Parse { path: None, source } => write!(f, "invalid settings: {source}"),
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

impl BlogConfig {
    /// Parses settings from a JSON document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|source| ConfigError::Parse { path: None, source })
    }

    /// Reads settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            source,
        })
    }

    /// Loads the file named by `BLOG_SETTINGS`, or defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(SETTINGS_ENV_VAR) {
            Some(path) if !path.is_empty() => Self::load(PathBuf::from(path)),
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BlogConfig, ConfigError};
    use std::path::PathBuf;

    #[test]
    fn defaults_match_initial_deployment() {
        let config = BlogConfig::default();
        assert_eq!(config.database_path, PathBuf::from("blog.db"));
        assert_eq!(config.admin.username, "admin");
        assert!(config.admin.password_hash.is_empty());
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let config = BlogConfig::from_json_str(r#"{ "database_path": "/srv/blog/blog.db" }"#)
            .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/srv/blog/blog.db"));
        assert_eq!(config.admin.username, "admin");
    }

    #[test]
    fn admin_block_overrides_credentials() {
        let config = BlogConfig::from_json_str(
            r#"{ "admin": { "username": "editor", "password_hash": "$argon2id$x" } }"#,
        )
        .unwrap();
        assert_eq!(config.admin.username, "editor");
        assert_eq!(config.admin.password_hash, "$argon2id$x");
    }

    #[test]
    fn partial_admin_block_keeps_remaining_defaults() {
        let config =
            BlogConfig::from_json_str(r#"{ "admin": { "username": "editor" } }"#).unwrap();
        assert_eq!(config.admin.username, "editor");
        assert!(config.admin.password_hash.is_empty());

        let config =
            BlogConfig::from_json_str(r#"{ "admin": { "password_hash": "$argon2id$x" } }"#)
                .unwrap();
        assert_eq!(config.admin.username, "admin");
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let err = BlogConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { path: None, .. }));
    }

    #[test]
    fn load_reads_file_and_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "log_level": "warn" }"#).unwrap();
        assert_eq!(BlogConfig::load(&path).unwrap().log_level, "warn");

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            BlogConfig::load(&missing),
            Err(ConfigError::Io { .. })
        ));
    }
}
