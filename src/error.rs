//! Error taxonomy for the layer editing core.
//!
//! Every failure is returned to the immediate caller; nothing is retried,
//! logged-and-dropped, or turned into user-facing text here. Front ends
//! (Python bindings, WASM exports, a CLI) translate these into messages.
//!
//! | Kind | Variants |
//! |------|----------|
//! | invalid input | [`EditorError::InvalidInput`], [`EditorError::OutOfBounds`], [`EditorError::Codec`] |
//! | invalid state | [`EditorError::InvalidState`] |
//!
//! "Resource absent" results (no visible layer) are plain `Option`s.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EditorError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("pixel ({x}, {y}) is outside a {width}x{height} image")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("codec error: {0}")]
    Codec(String),
}

impl EditorError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        EditorError::InvalidInput(reason.into())
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        EditorError::InvalidState(reason.into())
    }

    /// True for argument failures (bad parameters, out-of-range pixels, malformed bytes).
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            EditorError::InvalidInput(_) | EditorError::OutOfBounds { .. } | EditorError::Codec(_)
        )
    }

    /// True when the model is not in a state that supports the request.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, EditorError::InvalidState(_))
    }
}

/// Convert a signed count coming from a binding layer into a `usize`.
///
/// The core takes unsigned sizes; callers holding signed integers (Python
/// `int`, JS numbers) go through this to get the invalid-input rejection.
pub fn non_negative(value: i64, what: &str) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| EditorError::invalid_input(format!("{what} must not be negative, got {value}")))
}
