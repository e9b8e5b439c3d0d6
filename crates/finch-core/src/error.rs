//! Error types and exit-code constants for finch.
//!
//! Finality violations are *diagnostics* (see [`crate::diagnostics`]) and
//! never abort a check. This module covers the operational failures of the
//! CLI surface — bad arguments, unreadable snapshots — bridged into a
//! unified [`FinchError`] suitable for JSON output.
//!
//! ## Exit Code Mapping
//!
//! - `1`: check completed and reported violations (not an error; see
//!   [`VIOLATIONS_EXIT_CODE`])
//! - `2`: invalid arguments (bad input from caller)
//! - `3`: resolution errors (snapshot not found, snapshot unparsable)
//! - `10`: internal errors (bugs, unexpected state)

use std::fmt;

use thiserror::Error;

/// Exit code when the check itself succeeded but reported violations.
pub const VIOLATIONS_EXIT_CODE: u8 = 1;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output and CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed request).
    InvalidArguments = 2,
    /// Resolution errors (snapshot not found, snapshot unparsable).
    ResolutionError = 3,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
///
/// Every operational failure is converted to this type before being
/// rendered as an error response. Finality violations never appear here.
#[derive(Debug, Error)]
pub enum FinchError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments {
        /// What was wrong with the arguments.
        message: String,
    },

    /// Snapshot path does not exist.
    #[error("snapshot not found: {path}")]
    SnapshotNotFound {
        /// The missing path.
        path: String,
    },

    /// Snapshot file exists but could not be parsed.
    #[error("cannot parse snapshot {path}: {reason}")]
    SnapshotParse {
        /// The offending file.
        path: String,
        /// Parser message.
        reason: String,
    },

    /// IO error while reading a snapshot.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    Internal {
        /// What went wrong.
        message: String,
    },
}

impl FinchError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        FinchError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create a snapshot-not-found error.
    pub fn snapshot_not_found(path: impl Into<String>) -> Self {
        FinchError::SnapshotNotFound { path: path.into() }
    }

    /// Create a snapshot parse error.
    pub fn snapshot_parse(path: impl Into<String>, reason: impl Into<String>) -> Self {
        FinchError::SnapshotParse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        FinchError::Internal {
            message: message.into(),
        }
    }

    /// Stable kind string for JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            FinchError::InvalidArguments { .. } => "invalid-arguments",
            FinchError::SnapshotNotFound { .. } => "snapshot-not-found",
            FinchError::SnapshotParse { .. } => "snapshot-parse",
            FinchError::Io(_) => "io",
            FinchError::Internal { .. } => "internal",
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&FinchError> for OutputErrorCode {
    fn from(err: &FinchError) -> Self {
        match err {
            FinchError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            FinchError::SnapshotNotFound { .. } => OutputErrorCode::ResolutionError,
            FinchError::SnapshotParse { .. } => OutputErrorCode::ResolutionError,
            FinchError::Io(_) => OutputErrorCode::InternalError,
            FinchError::Internal { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<FinchError> for OutputErrorCode {
    fn from(err: FinchError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Tests
// ============================================================================
