//! Randoop core – typed operations and sequence execution
//!
//! This crate implements the part of a feedback-directed random test
//! generator that everything else builds on:
//! - A unified type model with generic substitution
//! - Operations (constructors, methods, fields, enum constants, literals,
//!   arrays, casts) decorated with the types they are used at
//! - A lossless `TAG : description` text form for persisted operations
//! - Reflective execution against a host-populated class registry
//! - Sequences of statements, executed in order under a failure policy,
//!   rendered as Java source and JUnit tests

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod execution;
pub mod junit;
pub mod operation;
pub mod reflect;
pub mod sequence;
pub mod session;
pub mod types;

// Re-export key types for convenience
pub use config::RandoopConfig;
pub use error::{InternalError, OperationError, OperationParseError, SequenceError, SequenceParseError};
pub use execution::ExecutionOutcome;
pub use operation::{Operation, OperationParser, TypedOperation};
pub use reflect::{ClassCatalog, ClassRegistry, Value};
pub use sequence::{ExecutableSequence, FailurePolicy, Sequence};
pub use session::Session;
pub use types::{Substitution, Type, TypeTuple};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
