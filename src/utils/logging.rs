//! Per-module switchable logging macros.
//!
//! Every record is emitted under the `sticky_note` target so host glue can
//! filter the engine's output with `RUST_LOG=sticky_note=debug`.
//!
//! A module opts in by declaring the flag and importing the macros:
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_error, log_info};
//!
//! log_info!("mounted note {}", uid);
//! ```

/// Log target shared by every macro in this module.
pub const LOG_TARGET: &str = "sticky_note";

/// Info-level record, skipped when the calling module sets `ENABLE_LOGS = false`.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!(target: $crate::utils::logging::LOG_TARGET, $($arg)*);
        }
    };
}

/// Debug-level record; same gating as [`log_info!`].
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!(target: $crate::utils::logging::LOG_TARGET, $($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!(target: $crate::utils::logging::LOG_TARGET, $($arg)*);
        }
    };
}

/// Error-level record. Host write rejections go through here so the
/// operation name and block uid always land in the same line.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!(target: $crate::utils::logging::LOG_TARGET, $($arg)*);
        }
    };
}
