use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::error::LoggerError;

/// Filter used when nothing else is configured.
pub const DEFAULT_LEVEL: &str = "warn";

/// An `EnvFilter` directive string, checked when it is created.
///
/// ```
/// use mctl_observe::LoggerLevel;
///
/// let level: LoggerLevel = "mctl_core=debug,warn".parse().unwrap();
/// assert_eq!(level.as_str(), "mctl_core=debug,warn");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LoggerLevel(String);

impl LoggerLevel {
    pub fn new(directives: impl Into<String>) -> Result<Self, LoggerError> {
        let directives = directives.into();
        EnvFilter::try_new(&directives)
            .map_err(|e| LoggerError::InvalidLevel(format!("{directives:?}: {e}")))?;
        Ok(Self(directives))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.0).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
    }
}

impl Default for LoggerLevel {
    fn default() -> Self {
        Self(DEFAULT_LEVEL.to_string())
    }
}

impl fmt::Display for LoggerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LoggerLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for LoggerLevel {
    type Error = LoggerError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<LoggerLevel> for String {
    fn from(level: LoggerLevel) -> Self {
        level.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_are_validated() {
        for ok in ["info", "trace", "mctl_core=trace,mctl_model=debug,warn"] {
            assert!(ok.parse::<LoggerLevel>().is_ok(), "{ok}");
        }
        for bad in ["mctl_core=loud", "a=trace,b=wat"] {
            assert!(matches!(
                bad.parse::<LoggerLevel>(),
                Err(LoggerError::InvalidLevel(_))
            ));
        }
    }

    #[test]
    fn serializes_as_plain_string() {
        let level: LoggerLevel = serde_json::from_str(r#""debug""#).unwrap();
        assert_eq!(level.to_string(), "debug");
        assert_eq!(serde_json::to_string(&level).unwrap(), r#""debug""#);
        assert!(serde_json::from_str::<LoggerLevel>(r#""x=nope""#).is_err());
    }

    #[test]
    fn defaults_to_warn() {
        assert_eq!(LoggerLevel::default().as_str(), DEFAULT_LEVEL);
    }
}
