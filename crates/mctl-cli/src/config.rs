//! Optional JSON profile file.
use std::{fs, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use mctl_core::config::FrameworkConfig;
use mctl_model::DEFAULT_USER;
use mctl_observe::LoggerConfig;

/// Defaults read from `--config`. Command-line flags take precedence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Master address; empty means leader discovery.
    pub master: String,
    /// User tasks run as.
    pub user: String,
    pub framework: FrameworkConfig,
    pub logger: LoggerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            master: String::new(),
            user: DEFAULT_USER.to_string(),
            framework: FrameworkConfig::default(),
            logger: LoggerConfig::default(),
        }
    }
}

impl Config {
    /// Read `path`, or fall back to defaults when no file was given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn absent_file_means_defaults() {
        let cfg = Config::load(None).unwrap();
        assert_eq!(cfg.master, "");
        assert_eq!(cfg.user, "root");
        assert_eq!(cfg.framework.name, "mctl");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"master":"10.0.0.1:5050","framework":{{"role":"batch"}},"logger":{{"level":"info"}}}}"#
        )
        .unwrap();

        let cfg = Config::load(Some(file.path())).unwrap();
        assert_eq!(cfg.master, "10.0.0.1:5050");
        assert_eq!(cfg.user, "root");
        assert_eq!(cfg.framework.role, "batch");
        assert_eq!(cfg.framework.name, "mctl");
        assert_eq!(cfg.logger.level.as_str(), "info");
    }

    #[test]
    fn missing_or_bad_file_is_an_error() {
        assert!(Config::load(Some(Path::new("/nonexistent/mctl.json"))).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(Config::load(Some(file.path())).is_err());
    }
}
