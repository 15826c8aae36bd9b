//! Process configuration
//!
//! Resolved once at the process boundary and handed to the core. The core
//! never reads the environment itself.
//!
//! Precedence for the ledger path: `--file`, then `BCHOC_FILE_PATH`, then
//! `bchoc_data` in the working directory. The log threshold comes from
//! `BCHOC_LOG` and defaults to `WARN`.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::ledger::LedgerHandle;
use crate::observability::Severity;

/// Environment variable naming the ledger file
pub const LEDGER_PATH_ENV: &str = "BCHOC_FILE_PATH";

/// Environment variable naming the log threshold
pub const LOG_LEVEL_ENV: &str = "BCHOC_LOG";

/// Ledger file used when nothing else is configured
pub const DEFAULT_LEDGER_PATH: &str = "bchoc_data";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ledger path must not be empty")]
    EmptyLedgerPath,

    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::EmptyLedgerPath => "BCHOC_CONFIG_EMPTY_PATH",
            ConfigError::InvalidLogLevel(_) => "BCHOC_CONFIG_LOG_LEVEL",
        }
    }
}

/// Resolved settings for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    pub ledger_path: PathBuf,
    pub log_level: Severity,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from(DEFAULT_LEDGER_PATH),
            log_level: Severity::Warn,
        }
    }
}

impl LedgerConfig {
    /// Builds the configuration from already-collected inputs.
    ///
    /// `ledger_path` is the flag or environment value, if any. `log_level`
    /// is the raw `BCHOC_LOG` text, if set.
    pub fn resolve(
        ledger_path: Option<PathBuf>,
        log_level: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let ledger_path = match ledger_path {
            Some(path) if path.as_os_str().is_empty() => {
                return Err(ConfigError::EmptyLedgerPath)
            }
            Some(path) => path,
            None => PathBuf::from(DEFAULT_LEDGER_PATH),
        };

        let log_level = match log_level {
            Some(raw) if !raw.trim().is_empty() => raw
                .parse::<Severity>()
                .map_err(|_| ConfigError::InvalidLogLevel(raw.to_string()))?,
            _ => Severity::Warn,
        };

        Ok(Self {
            ledger_path,
            log_level,
        })
    }

    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }

    /// Store handle for the configured path
    pub fn handle(&self) -> LedgerHandle {
        LedgerHandle::new(self.ledger_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LedgerConfig::resolve(None, None).unwrap();
        assert_eq!(config, LedgerConfig::default());
        assert_eq!(config.ledger_path(), Path::new("bchoc_data"));
        assert_eq!(config.log_level, Severity::Warn);
    }

    #[test]
    fn test_explicit_path_wins() {
        let config = LedgerConfig::resolve(Some(PathBuf::from("/tmp/coc.bin")), None).unwrap();
        assert_eq!(config.handle().path(), Path::new("/tmp/coc.bin"));
    }

    #[test]
    fn test_empty_path_rejected() {
        assert_eq!(
            LedgerConfig::resolve(Some(PathBuf::new()), None),
            Err(ConfigError::EmptyLedgerPath)
        );
    }

    #[test]
    fn test_log_level() {
        let config = LedgerConfig::resolve(None, Some("info")).unwrap();
        assert_eq!(config.log_level, Severity::Info);

        let blank = LedgerConfig::resolve(None, Some("  ")).unwrap();
        assert_eq!(blank.log_level, Severity::Warn);

        assert_eq!(
            LedgerConfig::resolve(None, Some("loud")),
            Err(ConfigError::InvalidLogLevel("loud".to_string()))
        );
    }
}
