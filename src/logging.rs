//! Logging abstraction layer.
//!
//! Provides macros that dispatch to either the [`log`](https://docs.rs/log)
//! or [`tracing`](https://docs.rs/tracing) crate depending on which feature
//! is enabled. The two features are **mutually exclusive** — enable at most one.
//!
//! | Feature    | Backend         | Default |
//! |------------|-----------------|---------|
//! | `log`      | `log` crate     | yes     |
//! | `tracing`  | `tracing` crate | no      |
//!
//! # What gets logged where
//!
//! - `trace_log!` — every ancestor probed while resolving a step target,
//!   every link followed while expanding default children.
//! - `debug_log!` — the outcome of each synchronization hook.
//! - `info_log!` — plugin construction and activity-level stack changes.
//! - `warn_log!` — configuration that is accepted but likely a mistake.
//! - `error_log!` — a reserved parameter that failed to decode, right
//!   before the error is returned.
//!
//! Every record is emitted under the `omniflow` target so hosts can filter
//! it with `RUST_LOG=omniflow=debug`.
//!
//! ```ignore
//! use omniflow::{debug_log, warn_log};
//!
//! debug_log!("before-push '{}': substituting step push", intent.activity_name);
//! warn_log!("initial activity '{}' is not listed in children of '{}'", child, parent);
//! ```

/// Log target shared by every record this crate emits.
#[doc(hidden)]
pub const LOG_TARGET: &str = "omniflow";

/// Emit a **trace**-level record under the `omniflow` target.
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::trace!(target: $crate::logging::LOG_TARGET, $($arg)*);
        #[cfg(feature = "log")]
        ::log::trace!(target: $crate::logging::LOG_TARGET, $($arg)*);
    };
}

/// Emit a **debug**-level record under the `omniflow` target.
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(target: $crate::logging::LOG_TARGET, $($arg)*);
        #[cfg(feature = "log")]
        ::log::debug!(target: $crate::logging::LOG_TARGET, $($arg)*);
    };
}

/// Emit an **info**-level record under the `omniflow` target.
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::info!(target: $crate::logging::LOG_TARGET, $($arg)*);
        #[cfg(feature = "log")]
        ::log::info!(target: $crate::logging::LOG_TARGET, $($arg)*);
    };
}

/// Emit a **warn**-level record under the `omniflow` target.
#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::warn!(target: $crate::logging::LOG_TARGET, $($arg)*);
        #[cfg(feature = "log")]
        ::log::warn!(target: $crate::logging::LOG_TARGET, $($arg)*);
    };
}

/// Emit an **error**-level record under the `omniflow` target.
#[macro_export]
macro_rules! error_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::error!(target: $crate::logging::LOG_TARGET, $($arg)*);
        #[cfg(feature = "log")]
        ::log::error!(target: $crate::logging::LOG_TARGET, $($arg)*);
    };
}
