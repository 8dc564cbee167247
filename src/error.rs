//! Error types for subview synchronization.
//!
//! Only two things can go wrong while synchronizing nested navigation:
//!
//! - [`DecodeError`] — a reserved parameter (`OMNI_childName` /
//!   `OMNI_childParams`) holds something this crate did not write, or the two
//!   lists disagree. Treating it as "no chain" would desynchronize what the
//!   stack records from what was rendered, so it is always surfaced.
//! - [`ConfigError`] — the subview configuration table is inconsistent
//!   (cyclic default children, unknown activity names, duplicates).
//!
//! [`OmniflowError`] wraps both and is what hooks and the composer return.
//!
//! # Examples
//!
//! ```
//! use omniflow::error::{ConfigError, OmniflowError};
//!
//! let err: OmniflowError = ConfigError::CyclicDefaults {
//!     environment: "desktop".into(),
//!     cycle: vec!["Root".into(), "View".into(), "Root".into()],
//! }
//! .into();
//! assert!(err.is_config());
//! assert_eq!(
//!     err.to_string(),
//!     "initial activity chain loops in environment 'desktop': Root -> View -> Root"
//! );
//! ```

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = OmniflowError> = std::result::Result<T, E>;

// ============================================================================
// DecodeError
// ============================================================================

/// Failure to read encoded subview state back out of activity parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The string was not produced by the configured codec.
    #[error("encoded value was not produced by this codec: '{preview}'")]
    ForeignPayload {
        /// First few characters of the rejected payload.
        preview: String,
    },

    /// The envelope was recognised but its body is corrupt.
    #[error("malformed encoded value: {reason}")]
    Malformed { reason: String },

    /// The payload decoded, but not to the shape the key requires.
    #[error("'{key}' must decode to {expected}")]
    UnexpectedShape {
        key: &'static str,
        expected: &'static str,
    },

    /// Child names and child params are not index-aligned.
    #[error("subview chain is misaligned: {names} names but {params} parameter sets")]
    MisalignedChain { names: usize, params: usize },

    /// Only one of the two reserved keys is present.
    #[error("'{present}' is set but '{missing}' is missing")]
    IncompleteChain {
        present: &'static str,
        missing: &'static str,
    },
}

impl DecodeError {
    /// Build a [`ForeignPayload`](Self::ForeignPayload) error, keeping only a
    /// short prefix of the offending input.
    pub fn foreign(payload: &str) -> Self {
        const PREVIEW_CHARS: usize = 24;
        let preview: String = payload.chars().take(PREVIEW_CHARS).collect();
        Self::ForeignPayload { preview }
    }
}

// ============================================================================
// ConfigError
// ============================================================================

/// Problems found while validating or loading a subview configuration table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Following `initialActivity` links revisits an activity.
    #[error("initial activity chain loops in environment '{environment}': {}", .cycle.join(" -> "))]
    CyclicDefaults {
        environment: String,
        /// The chain of activity names, ending with the repeated one.
        cycle: Vec<String>,
    },

    /// A subview configuration names an activity that is not declared.
    #[error("activity '{activity}' references undeclared activity '{referenced}'")]
    UnknownActivity { activity: String, referenced: String },

    /// The same activity name appears twice in the table.
    #[error("activity '{name}' is declared more than once")]
    DuplicateActivity { name: String },

    /// The configuration source could not be parsed.
    #[error("failed to parse configuration: {message}")]
    Parse { message: String },
}

// ============================================================================
// OmniflowError
// ============================================================================

/// Top-level error returned by hooks, the composer and typed codec helpers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OmniflowError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A typed value could not be converted into a structured value.
    #[error("failed to encode parameters: {message}")]
    Encode { message: String },
}

impl OmniflowError {
    /// Check if this is a decode failure.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    /// Check if this is a configuration failure.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

// ============================================================================
// Tests
// ============================================================================
