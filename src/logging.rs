//! Logging initialization for the `tarkit` binary.
//!
//! Library code only emits `tracing` events; installing a subscriber is left to the
//! binary (or to the embedding application).

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use crate::TarkitError;

/// Where and how much to log.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `debug` level instead of `info`.
    pub debug: bool,
    /// Append log lines to this file instead of stderr.
    pub log_file: Option<PathBuf>,
    /// Emit JSON lines instead of the human-readable format.
    pub json: bool,
}

impl LoggingConfig {
    fn default_directive(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }
}

/// Installs the global `tracing` subscriber. `RUST_LOG` overrides the level chosen by
/// `cfg.debug`.
///
/// A log file that cannot be opened is an [`TarkitError::Io`]. An already installed
/// subscriber is reported as [`TarkitError::Other`], which callers may ignore.
pub fn init_logging(cfg: &LoggingConfig) -> Result<(), TarkitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.default_directive()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let result = match &cfg.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path).map_err(TarkitError::at(path))?;
            let builder = builder.with_ansi(false).with_writer(Mutex::new(file));
            if cfg.json {
                builder.json().try_init()
            } else {
                builder.try_init()
            }
        }
        None => {
            let builder = builder.with_writer(std::io::stderr);
            if cfg.json {
                builder.json().try_init()
            } else {
                builder.try_init()
            }
        }
    };
    result.map_err(TarkitError::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_info_on_stderr() {
        let cfg: LoggingConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, LoggingConfig::default());
        assert_eq!(cfg.default_directive(), "info");
    }

    #[test]
    fn debug_flag_selects_debug_directive() {
        let cfg: LoggingConfig = serde_json::from_str(r#"{"debug": true, "log_file": "/tmp/x.log"}"#).unwrap();
        assert_eq!(cfg.default_directive(), "debug");
        assert_eq!(cfg.log_file, Some(PathBuf::from("/tmp/x.log")));
    }

    #[test]
    fn unopenable_log_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = LoggingConfig { log_file: Some(dir.path().join("no/such/dir.log")), ..Default::default() };
        let err = init_logging(&cfg).unwrap_err();
        assert!(matches!(err, TarkitError::Io { .. }));
    }
}
