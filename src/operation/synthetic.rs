//! Operations the engine builds itself; they have no reflective member
//! behind them and are never persisted.

use std::fmt;
use std::time::Duration;

use super::{push_argument, CodeArgument};
use crate::execution::ExecutionOutcome;
use crate::reflect::jdk;
use crate::reflect::{ClassRegistry, Throwable, Value};
use crate::types::{Type, TypeTuple};

/// Cast of a reference to `target`, checked only against its erasure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UncheckedCast {
    target: Type,
}

impl UncheckedCast {
    /// Cast to `target`.
    pub fn new(target: Type) -> Self {
        Self { target }
    }

    /// Target type.
    pub fn target(&self) -> &Type {
        &self.target
    }

    pub(crate) fn execute(&self, inputs: &[Value], registry: &ClassRegistry) -> ExecutionOutcome {
        let value = inputs.first().cloned().unwrap_or(Value::Null);
        if registry.is_instance(&value, &self.target) {
            return ExecutionOutcome::normal(value, Duration::ZERO);
        }
        let message = format!(
            "class {} cannot be cast to class {}",
            value.runtime_class_name().unwrap_or_default(),
            self.target.erasure().binary_name()
        );
        ExecutionOutcome::exceptional(
            Throwable::with_message(jdk::CLASS_CAST_EXCEPTION, message),
            Duration::ZERO,
        )
    }

    pub(crate) fn append_code(&self, args: &[CodeArgument], out: &mut String) {
        out.push('(');
        out.push_str(&self.target.name());
        out.push(')');
        if let Some(arg) = args.first() {
            out.push_str(arg.code());
        }
    }
}

impl fmt::Display for UncheckedCast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.target)
    }
}

/// `int + int`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PlusOperation;

impl PlusOperation {
    pub(crate) fn execute(&self, inputs: &[Value]) -> ExecutionOutcome {
        let sum = inputs
            .iter()
            .filter_map(Value::as_int)
            .fold(0i32, i32::wrapping_add);
        ExecutionOutcome::normal(Value::Int(sum), Duration::ZERO)
    }

    pub(crate) fn append_code(&self, inputs: &TypeTuple, args: &[CodeArgument], out: &mut String) {
        for (idx, (arg, ty)) in args.iter().zip(inputs.iter()).enumerate() {
            if idx > 0 {
                out.push_str(" + ");
            }
            push_argument(arg, ty, out);
        }
    }
}

impl fmt::Display for PlusOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("int + int")
    }
}
