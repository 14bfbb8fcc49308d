//! Error types and error code constants for tugscope.
//!
//! `RefactorError` is the single error type the CLI renders. Layer errors
//! (parse, resolve, span edits, config) are converted into it at the
//! operation boundary.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad location, invalid new name)
//! - `3`: Resolution errors (no symbol, unbound name, rename target not found)
//! - `4`: Apply errors (failed to render or write changes)
//! - `6`: Parse failure (source is not valid input)
//! - `10`: Internal errors (bugs, unexpected state)

use std::fmt;

use thiserror::Error;

pub use crate::types::Location;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output.
///
/// These codes map to CLI exit codes and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed request).
    InvalidArguments = 2,
    /// Resolution errors (symbol not found, unbound name).
    ResolutionError = 3,
    /// Apply errors (failed to render or write changes).
    ApplyError = 4,
    /// The source text failed to parse.
    ParseFailure = 6,
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
#[derive(Debug, Error)]
pub enum RefactorError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// No identifier at the specified location.
    #[error("no symbol found at {file}:{line}:{col}")]
    SymbolNotFound { file: String, line: u32, col: u32 },

    /// An identifier has no declaring scope and the policy rejects free names.
    #[error("no declaration for '{name}' in scope chain of {location}")]
    UnboundDeclaringScope { name: String, location: Location },

    /// The rename anchor does not name the target symbol.
    #[error("rename target '{name}' not found at {location}")]
    RenameTargetNotFound { name: String, location: Location },

    /// Invalid identifier for the new name.
    #[error("invalid identifier '{name}': {reason}")]
    InvalidIdentifier { name: String, reason: String },

    /// The source failed to parse.
    #[error("parse error at {file}:{line}:{col}: expected {expected}")]
    ParseFailure {
        file: String,
        line: u32,
        col: u32,
        expected: String,
    },

    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// Failed to apply changes.
    #[error("apply error: {message}")]
    ApplyError {
        message: String,
        file: Option<String>,
    },

    /// Configuration could not be loaded.
    #[error("config error: {message}")]
    ConfigError { message: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&RefactorError> for OutputErrorCode {
    fn from(err: &RefactorError) -> Self {
        match err {
            RefactorError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            RefactorError::SymbolNotFound { .. } => OutputErrorCode::ResolutionError,
            RefactorError::UnboundDeclaringScope { .. } => OutputErrorCode::ResolutionError,
            RefactorError::RenameTargetNotFound { .. } => OutputErrorCode::ResolutionError,
            RefactorError::InvalidIdentifier { .. } => OutputErrorCode::InvalidArguments,
            RefactorError::ParseFailure { .. } => OutputErrorCode::ParseFailure,
            RefactorError::FileNotFound { .. } => OutputErrorCode::ResolutionError,
            RefactorError::ApplyError { .. } => OutputErrorCode::ApplyError,
            RefactorError::ConfigError { .. } => OutputErrorCode::InvalidArguments,
            RefactorError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<RefactorError> for OutputErrorCode {
    fn from(err: RefactorError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Bridges
// ============================================================================

impl From<crate::patch::EditError> for RefactorError {
    fn from(err: crate::patch::EditError) -> Self {
        RefactorError::ApplyError {
            message: err.to_string(),
            file: None,
        }
    }
}

impl From<crate::config::ConfigError> for RefactorError {
    fn from(err: crate::config::ConfigError) -> Self {
        RefactorError::ConfigError {
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl RefactorError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        RefactorError::InvalidArguments {
            message: message.into(),
            details: None,
        }
    }

    /// Create a symbol not found error.
    pub fn symbol_not_found(file: impl Into<String>, line: u32, col: u32) -> Self {
        RefactorError::SymbolNotFound {
            file: file.into(),
            line,
            col,
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        RefactorError::FileNotFound { path: path.into() }
    }

    /// Create an apply error for a file.
    pub fn apply(message: impl Into<String>, file: Option<String>) -> Self {
        RefactorError::ApplyError {
            message: message.into(),
            file,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        RefactorError::InternalError {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
