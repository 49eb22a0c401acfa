//! Optional JSON configuration file for the `tarkit` binary.
//!
//! ```json
//! {
//!   "logging": { "debug": false, "log_file": "/var/log/tarkit.log", "json": false },
//!   "archive": { "level": 6, "fail_fast": false }
//! }
//! ```
//!
//! Every field is optional. Command-line flags win over the file; the file wins over
//! built-in defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::archive::{ArchiveOptions, EntryErrorPolicy, DEFAULT_LEVEL};
use crate::logging::LoggingConfig;
use crate::{fsx as fs, TarkitError};

/// Environment variable consulted when neither flag nor file names a log file.
pub const LOG_FILE_ENV: &str = "TARKIT_LOG_FILE";

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub archive: ArchiveSettings,
}

/// Defaults for `tarkit create`.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ArchiveSettings {
    pub level: u32,
    pub fail_fast: bool,
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self { level: DEFAULT_LEVEL, fail_fast: false }
    }
}

impl ArchiveSettings {
    pub fn options(&self) -> ArchiveOptions {
        ArchiveOptions {
            level: self.level,
            policy: if self.fail_fast { EntryErrorPolicy::FailFast } else { EntryErrorPolicy::Continue },
        }
    }
}

impl Config {
    /// Reads and parses a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, TarkitError> {
        let text = fs::read_to_string(path).map_err(TarkitError::at(path))?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Loads `path` when given, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, TarkitError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }
}

/// Gets the log file from the command-line option, the config file, or the
/// `TARKIT_LOG_FILE` environment variable, in that order.
pub fn resolve_log_file(flag: Option<PathBuf>, from_config: Option<PathBuf>) -> Option<PathBuf> {
    flag.or(from_config)
        .or_else(|| std::env::var_os(LOG_FILE_ENV).filter(|v| !v.is_empty()).map(PathBuf::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("tarkit.json");
        fs::write(&p, r#"{"archive": {"fail_fast": true}}"#).unwrap();

        let cfg = Config::from_file(&p).unwrap();
        assert_eq!(cfg.archive.level, DEFAULT_LEVEL);
        assert_eq!(cfg.archive.options().policy, EntryErrorPolicy::FailFast);
        assert_eq!(cfg.logging, LoggingConfig::default());
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("bad.json");
        fs::write(&p, "{ not json").unwrap();
        assert!(matches!(Config::from_file(&p), Err(TarkitError::Config(_))));
    }

    #[test]
    fn missing_path_means_defaults() {
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }

    #[test]
    fn flag_wins_over_config_for_log_file() {
        let got = resolve_log_file(Some("a.log".into()), Some("b.log".into()));
        assert_eq!(got, Some(PathBuf::from("a.log")));
        let got = resolve_log_file(None, Some("b.log".into()));
        assert_eq!(got, Some(PathBuf::from("b.log")));
    }
}
