//! Error types for scope resolution and renaming.

use thiserror::Error;
use tugscope_core::patch::EditError;
use tugscope_core::types::Position;
use tugscope_cst::ParseError;

/// Errors produced by the resolution engine.
///
/// A position that matches no identifier is not an error; queries return
/// `None` for it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The parser rejected the source.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// No scope in the chain declares the name and the policy is `reject`.
    #[error("no declaring scope for `{name}` at {position}")]
    UnboundDeclaringScope { name: String, position: Position },

    /// The anchor does not sit on an occurrence of the target name.
    #[error("no occurrence of `{name}` at {line}:{column}")]
    RenameTargetNotFound { name: String, line: u32, column: u32 },

    /// The replacement is not a valid identifier.
    #[error("invalid identifier `{name}`: {reason}")]
    InvalidIdentifier { name: String, reason: String },

    /// Printing the renamed tree failed.
    #[error("render failed: {0}")]
    Render(#[from] EditError),

    /// The streaming producer task failed.
    #[error("stream producer failed: {0}")]
    Producer(String),
}

/// Result type for resolution operations.
pub type ResolveResult<T> = Result<T, ResolveError>;
