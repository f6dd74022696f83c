//! Process-wide log verbosity.
//!
//! Levels: 0 off, 1 error, 2 warn, 3 info, 4 debug, 5 trace. Every call site
//! logs through `tracing`; the subscriber installed by [`init_logging`]
//! consults the current level on each event, so [`log_set_level`] takes
//! effect immediately.

use std::sync::atomic::{AtomicU8, Ordering};

use tracing::Level;

use crate::ArmError;

pub const DEFAULT_LOG_LEVEL: u8 = 3;
pub const MAX_LOG_LEVEL: u8 = 5;

static LOG_LEVEL: AtomicU8 = AtomicU8::new(DEFAULT_LOG_LEVEL);

pub fn log_set_level(level: u8) -> Result<(), ArmError> {
    if level > MAX_LOG_LEVEL {
        return Err(ArmError::InvalidLogLevel(level));
    }
    LOG_LEVEL.store(level, Ordering::Relaxed);
    Ok(())
}

pub fn log_level() -> u8 {
    LOG_LEVEL.load(Ordering::Relaxed)
}

/// Most verbose `tracing` level let through at the current setting.
pub fn max_tracing_level() -> Option<Level> {
    match log_level() {
        0 => None,
        1 => Some(Level::ERROR),
        2 => Some(Level::WARN),
        3 => Some(Level::INFO),
        4 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    }
}

pub fn enabled(level: &Level) -> bool {
    max_tracing_level().is_some_and(|max| *level <= max)
}

/// Installs a formatting subscriber gated by [`log_level`].
///
/// Returns an error if a global subscriber is already set.
#[cfg(feature = "logging")]
pub fn init_logging() -> Result<(), ArmError> {
    use tracing_subscriber::filter::filter_fn;
    use tracing_subscriber::prelude::*;

    let layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_filter(filter_fn(|metadata| enabled(metadata.level())));
    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|e| ArmError::Config(format!("logging already initialised: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_gate() {
        assert!(matches!(log_set_level(6), Err(ArmError::InvalidLogLevel(6))));

        log_set_level(0).unwrap();
        assert!(!enabled(&Level::ERROR));

        log_set_level(2).unwrap();
        assert!(enabled(&Level::ERROR));
        assert!(enabled(&Level::WARN));
        assert!(!enabled(&Level::INFO));

        log_set_level(5).unwrap();
        assert!(enabled(&Level::TRACE));

        log_set_level(DEFAULT_LOG_LEVEL).unwrap();
        assert_eq!(log_level(), 3);
    }
}
