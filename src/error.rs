//! Error types for the operation model and sequence engine
//!
//! Three channels are kept apart: parse errors (malformed persisted text),
//! construction/extension errors (invalid requests made by a caller), and
//! `InternalError`, the fatal channel that signals a bug in the engine
//! itself. Exceptions raised by the program under test are never errors;
//! they are data carried by `ExecutionOutcome::Exceptional`.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Malformed operation text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct OperationParseError {
    /// Human-readable diagnostic, including the offending substring.
    pub message: String,
}

impl OperationParseError {
    /// Build a parse error from a diagnostic message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Convenience result alias for operation parsing.
pub type ParseResult<T> = std::result::Result<T, OperationParseError>;

/// Malformed persisted sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("statement {index} (`{line}`): {message}")]
pub struct SequenceParseError {
    /// Diagnostic message.
    pub message: String,
    /// Zero-based index of the offending statement.
    pub index: usize,
    /// The offending line, trimmed.
    pub line: String,
}

/// Invalid operation construction requested by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    /// String literal exceeds the configured escaped length.
    #[error("String too long, escaped length = {length} (maximum {max})")]
    StringTooLong {
        /// Escaped length of the rejected string.
        length: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Literal value does not fit the declared type.
    #[error("invalid literal: {0}")]
    InvalidLiteral(String),

    /// Attempt to build a setter for a `static final` field.
    #[error("cannot create setter for static final field {0}")]
    StaticFinalField(String),

    /// Type argument mismatch while building an operation.
    #[error("invalid operation type: {0}")]
    InvalidType(String),
}

/// Invalid attempt to extend a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// Number of variables differs from the operation's input arity.
    #[error("operation {operation} expects {expected} inputs, got {actual}")]
    ArityMismatch {
        /// Operation name.
        operation: String,
        /// Expected input count.
        expected: usize,
        /// Supplied input count.
        actual: usize,
    },

    /// Input references a statement that does not precede the new one.
    #[error("input variable {index} is not defined before statement {position}")]
    ForwardReference {
        /// Referenced statement index.
        index: usize,
        /// Index the new statement would take.
        position: usize,
    },

    /// Input references a statement that produces no value.
    #[error("input variable {0} is produced by a void statement")]
    VoidInput(usize),

    /// Producer output type cannot flow into the declared input type.
    #[error("input {position}: variable of type {actual} is not assignable to {expected}")]
    IncompatibleInput {
        /// Input position within the operation.
        position: usize,
        /// Declared input type.
        expected: String,
        /// Type of the supplied variable.
        actual: String,
    },
}

/// Fatal failure of the engine itself.
///
/// Never caught inside the crate; callers are expected to abort the
/// generation run that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalError {
    /// The reflective machinery rejected a call the engine constructed.
    #[error("reflective call failed for {code}: {detail}")]
    Reflection {
        /// Description of the attempted call.
        code: String,
        /// Failure details.
        detail: String,
    },

    /// The invoked code raised a thread-termination signal.
    #[error("thread death raised while executing {0}")]
    ThreadDeath(String),

    /// A statement before the last one threw under `FailurePolicy::RequireFinal`.
    #[error("exception before final statement (statement {index}): {exception}")]
    PrematureException {
        /// Index of the statement that threw.
        index: usize,
        /// Rendered exception.
        exception: String,
    },

    /// Instantiation left type variables unresolved.
    #[error("operation {operation} still has unresolved type parameters {parameters}")]
    UnresolvedType {
        /// Operation name.
        operation: String,
        /// Remaining parameters.
        parameters: String,
    },

    /// A persisted operation did not survive a parse/print round trip.
    #[error("round trip mismatch: printed `{printed}`, reparsed `{reparsed}`")]
    RoundTrip {
        /// Original textual form.
        printed: String,
        /// Textual form after reparsing.
        reparsed: String,
    },

    /// Runtime inputs referenced a statement without a normal outcome.
    #[error("statement {0} has no normal outcome to supply as input")]
    MissingInput(usize),
}

/// Convenience result alias for the fatal channel.
pub type InternalResult<T> = std::result::Result<T, InternalError>;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Path not found
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result alias for configuration handling.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
