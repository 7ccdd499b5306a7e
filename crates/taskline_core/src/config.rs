//! Runtime configuration resolved from environment variables.
//!
//! Only outer surfaces (FFI, CLI) call [`Config::from_env`]; the core
//! itself takes paths and settings as parameters.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "TASKLINE_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "TASKLINE_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "TASKLINE_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "taskline.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_level: String,
    /// File logging stays off when unset.
    pub log_dir: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::resolve(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable lookup. Blank values count
    /// as unset.
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: read(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(default_db_path),
            log_level: read(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(LOG_DIR_ENV),
        }
    }
}

fn default_db_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::{Config, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use crate::logging::default_log_level;
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn unset_and_blank_values_fall_back_to_defaults() {
        let vars = HashMap::from([(LOG_LEVEL_ENV, "   ".to_string())]);
        let config = Config::resolve(|name| vars.get(name).cloned());
        assert_eq!(config.db_path, std::env::temp_dir().join("taskline.sqlite3"));
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn explicit_values_are_trimmed() {
        let vars = HashMap::from([
            (DB_PATH_ENV, " /data/tl.db ".to_string()),
            (LOG_LEVEL_ENV, "warn".to_string()),
            (LOG_DIR_ENV, "/var/log/taskline".to_string()),
        ]);
        let config = Config::resolve(|name| vars.get(name).cloned());
        assert_eq!(config.db_path, PathBuf::from("/data/tl.db"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir.as_deref(), Some("/var/log/taskline"));
    }
}
