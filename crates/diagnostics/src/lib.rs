// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Logging facade shared by the treefs workspace.
//!
//! Output is controlled by the `TREEFS_LOG` environment variable:
//! - `off` (default) - nothing is emitted
//! - `error`, `warn`, `info` - progressively more
//! - `debug` - every structural change the storage engine makes

use std::str::FromStr;
use std::sync::Once;

// Re-export emit so the macros below resolve from any crate
pub use emit;

/// Environment variable read by [`init_diagnostics`].
pub const LOG_ENV: &str = "TREEFS_LOG";

static INIT: Once = Once::new();

/// Minimum level that reaches the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    fn as_emit(self) -> Option<emit::Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(emit::Level::Error),
            LogLevel::Warn => Some(emit::Level::Warn),
            LogLevel::Info => Some(emit::Level::Info),
            LogLevel::Debug => Some(emit::Level::Debug),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "off" => Ok(LogLevel::Off),
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            other => Err(format!("Unknown log level '{}'", other)),
        }
    }
}

/// Initialize diagnostics from the `TREEFS_LOG` environment variable.
///
/// Only the first call has any effect.
pub fn init_diagnostics() {
    let requested = std::env::var(LOG_ENV).unwrap_or_default();
    let level = requested.parse().unwrap_or_else(|_| {
        // The emitter is not up yet, so this is the only way to say so.
        eprintln!(
            "Warning: Unknown {} value '{}', using 'info'",
            LOG_ENV, requested
        );
        LogLevel::Info
    });
    init_with_level(level);
}

/// Initialize diagnostics at an explicit level, ignoring the environment.
pub fn init_with_level(level: LogLevel) {
    INIT.call_once(|| {
        let Some(min) = level.as_emit() else {
            return;
        };
        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(min))
            .init();

        // The runtime must outlive every caller; there is no shutdown hook.
        std::mem::forget(rt);
    });
}

/// Log a structural operation a user might want to see.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log internal detail useful when chasing a bug.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log a recoverable oddity.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log a failure.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

pub use init_diagnostics as init;
