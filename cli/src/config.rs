//! Configuration for the `taskboard` binary.
//!
//! Read from the environment, then overridden by command line flags:
//! - `TASKBOARD_DATA_DIR` - Optional. Directory holding `tasks.json`. Defaults to `~/.taskboard`.
//! - `TASKBOARD_HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `TASKBOARD_PORT` - Optional. Server port. Defaults to `3000`.
//! - `TASKBOARD_VALIDATION` - Optional. `strict` or `lenient`. Defaults to `strict`.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// How the procedure server answers writes that fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Reply `422` with the validation error.
    #[default]
    Strict,
    /// Log the error and reply `204`, as if the write happened.
    Lenient,
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(ValidationMode::Strict),
            "lenient" => Ok(ValidationMode::Lenient),
            other => Err(format!("expected 'strict' or 'lenient', got '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// `None` means the repository default (`~/.taskboard`).
    pub data_dir: Option<PathBuf>,

    pub host: String,

    pub port: u16,

    pub validation: ValidationMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            host: "127.0.0.1".to_string(),
            port: 3000,
            validation: ValidationMode::Strict,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let data_dir = lookup("TASKBOARD_DATA_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let host = lookup("TASKBOARD_HOST").unwrap_or(defaults.host);

        let port = match lookup("TASKBOARD_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("TASKBOARD_PORT".to_string(), raw))?,
            None => defaults.port,
        };

        let validation = match lookup("TASKBOARD_VALIDATION") {
            Some(raw) => raw
                .parse()
                .map_err(|e| ConfigError::InvalidValue("TASKBOARD_VALIDATION".to_string(), e))?,
            None => defaults.validation,
        };

        Ok(Self {
            data_dir,
            host,
            port,
            validation,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_reads_values() {
        let config = Config::from_lookup(lookup(&[
            ("TASKBOARD_DATA_DIR", "/tmp/board"),
            ("TASKBOARD_HOST", "0.0.0.0"),
            ("TASKBOARD_PORT", "8080"),
            ("TASKBOARD_VALIDATION", "Lenient"),
        ]))
        .unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/board")));
        assert_eq!(config.addr(), "0.0.0.0:8080");
        assert_eq!(config.validation, ValidationMode::Lenient);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Config::from_lookup(lookup(&[("TASKBOARD_PORT", "http")])).is_err());
        assert!(Config::from_lookup(lookup(&[("TASKBOARD_PORT", "70000")])).is_err());
        assert!(Config::from_lookup(lookup(&[("TASKBOARD_VALIDATION", "loose")])).is_err());
    }
}
