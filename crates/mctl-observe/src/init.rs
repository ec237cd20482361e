use std::io;

use tracing_subscriber::{Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{LogClock, LoggerConfig, LoggerError, LoggerFormat};

type Output = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber described by `cfg`.
///
/// Call [`crate::init_local_offset`] first when `cfg.tz` is local.
/// Fails with [`LoggerError::AlreadyInitialized`] on a second call.
pub fn init_logger(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    let output = match cfg.format {
        LoggerFormat::Text => fmt::layer()
            .with_writer(io::stderr)
            .with_ansi(cfg.color.enabled())
            .with_target(cfg.with_targets)
            .with_timer(LogClock::new(cfg.tz))
            .boxed(),
        LoggerFormat::Json => fmt::layer()
            .json()
            .with_writer(io::stderr)
            .with_target(cfg.with_targets)
            .with_timer(LogClock::new(cfg.tz))
            .boxed(),
        LoggerFormat::Journald => journald()?,
    };

    tracing_subscriber::registry()
        .with(output)
        .with(cfg.level.to_env_filter())
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)
}

#[cfg(target_os = "linux")]
fn journald() -> Result<Output, LoggerError> {
    tracing_journald::layer()
        .map(|layer| layer.boxed())
        .map_err(|e| LoggerError::JournaldInitFailed(e.to_string()))
}

#[cfg(not(target_os = "linux"))]
fn journald() -> Result<Output, LoggerError> {
    Err(LoggerError::JournaldNotSupported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ColorMode;

    #[test]
    fn only_one_global_logger() {
        let cfg = LoggerConfig {
            color: ColorMode::Never,
            ..LoggerConfig::default()
        };
        // Another test in this binary may have installed one already.
        let _ = init_logger(&cfg);
        let again = init_logger(&LoggerConfig {
            format: LoggerFormat::Json,
            ..cfg
        });
        assert!(matches!(again, Err(LoggerError::AlreadyInitialized)));
    }

    #[test]
    #[cfg(not(target_os = "linux"))]
    fn journald_needs_linux() {
        assert!(matches!(journald(), Err(LoggerError::JournaldNotSupported)));
    }
}
