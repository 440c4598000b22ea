//! Outcomes of executing a single statement.
//!
//! An exception thrown by the program under test is data: it comes back as
//! [`ExecutionOutcome::Exceptional`]. Failures of the engine itself travel
//! on the separate [`InternalError`](crate::error::InternalError) channel.

mod executor;

pub use executor::execute_reflection_code;

use std::fmt;
use std::time::Duration;

use crate::reflect::{Throwable, Value};

/// Result of executing one operation.
#[derive(Debug, Clone)]
pub enum ExecutionOutcome {
    /// The call completed and produced `value` (null for `void`).
    Normal {
        /// Returned value.
        value: Value,
        /// Time spent in the underlying call.
        elapsed: Duration,
    },

    /// The call threw.
    Exceptional {
        /// The thrown exception.
        exception: Throwable,
        /// Time spent in the underlying call.
        elapsed: Duration,
    },
}

impl ExecutionOutcome {
    /// Normal completion.
    pub fn normal(value: Value, elapsed: Duration) -> Self {
        ExecutionOutcome::Normal { value, elapsed }
    }

    /// Exceptional completion.
    pub fn exceptional(exception: Throwable, elapsed: Duration) -> Self {
        ExecutionOutcome::Exceptional { exception, elapsed }
    }

    /// Time measured around the call.
    pub fn elapsed(&self) -> Duration {
        match self {
            ExecutionOutcome::Normal { elapsed, .. } | ExecutionOutcome::Exceptional { elapsed, .. } => {
                *elapsed
            }
        }
    }

    /// Whether the call completed normally.
    pub fn is_normal(&self) -> bool {
        matches!(self, ExecutionOutcome::Normal { .. })
    }

    /// Returned value of a normal outcome.
    pub fn value(&self) -> Option<&Value> {
        match self {
            ExecutionOutcome::Normal { value, .. } => Some(value),
            ExecutionOutcome::Exceptional { .. } => None,
        }
    }

    /// Exception of an exceptional outcome.
    pub fn exception(&self) -> Option<&Throwable> {
        match self {
            ExecutionOutcome::Normal { .. } => None,
            ExecutionOutcome::Exceptional { exception, .. } => Some(exception),
        }
    }
}

impl fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionOutcome::Normal { value, .. } => write!(f, "[NormalExecution {}]", value),
            ExecutionOutcome::Exceptional { exception, .. } => {
                write!(f, "[ExceptionalExecution {}]", exception)
            }
        }
    }
}
