//! The reflective call boundary.

use std::fmt;
use std::time::Instant;

use super::ExecutionOutcome;
use crate::error::{InternalError, InternalResult};
use crate::reflect::jdk;
use crate::reflect::{ClassRegistry, InvocationError, Value};

/// Run `call`, timing it, and classify what happened.
///
/// * a returned value becomes [`ExecutionOutcome::Normal`];
/// * an exception thrown by the invoked code becomes
///   [`ExecutionOutcome::Exceptional`];
/// * `java.lang.ThreadDeath` and rejections by the reflective machinery are
///   engine failures and come back as [`InternalError`].
///
/// `code` describes the call for diagnostics. Nothing shared is mutated, so
/// concurrent callers need no coordination.
pub fn execute_reflection_code<F>(
    code: &dyn fmt::Display,
    registry: &ClassRegistry,
    call: F,
) -> InternalResult<ExecutionOutcome>
where
    F: FnOnce() -> Result<Value, InvocationError>,
{
    tracing::trace!("invoking {}", code);
    let start = Instant::now();
    let result = call();
    let elapsed = start.elapsed();

    match result {
        Ok(value) => {
            tracing::trace!("{} returned {} after {:?}", code, value, elapsed);
            Ok(ExecutionOutcome::normal(value, elapsed))
        }
        Err(InvocationError::Target(exception)) => {
            if registry.is_subclass(&exception.class_name, jdk::THREAD_DEATH) {
                tracing::warn!("thread death while executing {}", code);
                return Err(InternalError::ThreadDeath(code.to_string()));
            }
            tracing::debug!("{} threw {}", code, exception);
            Ok(ExecutionOutcome::exceptional(exception, elapsed))
        }
        Err(InvocationError::Reflection(detail)) => {
            tracing::warn!("reflective call {} rejected: {}", code, detail);
            Err(InternalError::Reflection {
                code: code.to_string(),
                detail,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{ClassCatalog, Throwable};

    fn registry() -> ClassRegistry {
        ClassCatalog::new().snapshot()
    }

    #[test]
    fn normal_return_is_captured() {
        let outcome = execute_reflection_code(&"f()", &registry(), || Ok(Value::Int(7))).unwrap();
        assert!(outcome.is_normal());
        assert_eq!(outcome.value(), Some(&Value::Int(7)));
    }

    #[test]
    fn thrown_exceptions_are_outcomes() {
        let outcome = execute_reflection_code(&"f()", &registry(), || {
            Err(InvocationError::Target(Throwable::new(jdk::ILLEGAL_STATE_EXCEPTION)))
        })
        .unwrap();
        assert_eq!(
            outcome.exception().map(|e| e.class_name.as_str()),
            Some(jdk::ILLEGAL_STATE_EXCEPTION)
        );
    }

    #[test]
    fn thread_death_is_fatal() {
        let err = execute_reflection_code(&"f()", &registry(), || {
            Err(InvocationError::Target(Throwable::new(jdk::THREAD_DEATH)))
        })
        .unwrap_err();
        assert_eq!(err, InternalError::ThreadDeath("f()".to_string()));
    }

    #[test]
    fn reflection_failures_are_fatal() {
        let err = execute_reflection_code(&"f()", &registry(), || {
            Err(InvocationError::Reflection("argument type mismatch".into()))
        })
        .unwrap_err();
        assert!(matches!(err, InternalError::Reflection { .. }));
    }
}
