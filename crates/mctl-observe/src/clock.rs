use std::{fmt, str::FromStr, sync::OnceLock};

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};
use tracing_subscriber::fmt::{format::Writer, time::FormatTime};

use crate::error::LoggerError;

static LOCAL_OFFSET: OnceLock<UtcOffset> = OnceLock::new();

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggerTimeZone {
    #[default]
    Utc,
    Local,
}

impl LoggerTimeZone {
    fn offset(&self) -> UtcOffset {
        match self {
            LoggerTimeZone::Utc => UtcOffset::UTC,
            LoggerTimeZone::Local => local_offset(),
        }
    }
}

impl FromStr for LoggerTimeZone {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utc" => Ok(LoggerTimeZone::Utc),
            "local" => Ok(LoggerTimeZone::Local),
            _ => Err(LoggerError::InvalidTimeZone(s.to_string())),
        }
    }
}

/// Cache the local UTC offset.
///
/// Must run before any thread is spawned: most Unix platforms refuse to report the
/// offset from a multi-threaded process. Falls back to UTC.
pub fn init_local_offset() {
    local_offset();
}

fn local_offset() -> UtcOffset {
    *LOCAL_OFFSET.get_or_init(|| UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC))
}

/// RFC 3339 record timestamps.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogClock {
    tz: LoggerTimeZone,
}

impl LogClock {
    pub fn new(tz: LoggerTimeZone) -> Self {
        Self { tz }
    }

    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.tz.offset())
    }
}

impl FormatTime for LogClock {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let ts = self.now().format(&Rfc3339).map_err(|_| fmt::Error)?;
        write!(w, "{ts} ")
    }
}
