//! Logging for the `mctl` binaries.
//!
//! Everything is written to stderr; stdout belongs to command output.
mod clock;
mod config;
mod error;
mod filter;
mod format;
mod init;

pub use clock::{LogClock, LoggerTimeZone, init_local_offset};
pub use config::LoggerConfig;
pub use error::LoggerError;
pub use filter::{DEFAULT_LEVEL, LoggerLevel};
pub use format::{ColorMode, LoggerFormat};
pub use init::init_logger;
