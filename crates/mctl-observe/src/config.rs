use serde::{Deserialize, Serialize};

use crate::{ColorMode, LoggerFormat, LoggerLevel, LoggerTimeZone};

/// Logger settings, as found under `logger` in the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` directives such as `warn` or `mctl_core=debug,warn`.
    pub level: LoggerLevel,
    pub tz: LoggerTimeZone,
    /// Print the module target of each record.
    pub with_targets: bool,
    pub color: ColorMode,
}
