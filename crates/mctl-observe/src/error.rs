use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown log format {0:?}, expected text, json or journald")]
    InvalidFormat(String),

    #[error("unknown color mode {0:?}, expected auto, always or never")]
    InvalidColor(String),

    #[error("unknown timezone {0:?}, expected utc or local")]
    InvalidTimeZone(String),

    #[error("bad log filter {0}")]
    InvalidLevel(String),

    #[error("journald logging is only available on linux")]
    JournaldNotSupported,

    #[error("cannot connect to journald: {0}")]
    JournaldInitFailed(String),

    #[error("a global logger is already installed")]
    AlreadyInitialized,
}
