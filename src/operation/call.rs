//! Constructor and method calls.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::{owner_description, push_arguments, CodeArgument};
use crate::error::InternalResult;
use crate::execution::{execute_reflection_code, ExecutionOutcome};
use crate::reflect::jdk;
use crate::reflect::{ClassDef, ClassRegistry, ConstructorDef, MethodDef, Throwable, Value};
use crate::types::{Type, TypeTuple};

/// Call of one reflective constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConstructorCall {
    constructor: Arc<ConstructorDef>,
    inner: bool,
}

impl ConstructorCall {
    /// Wrap a constructor of `class`.
    pub fn new(class: &ClassDef, constructor: Arc<ConstructorDef>) -> Self {
        constructor.set_accessible();
        Self {
            constructor,
            inner: class.is_inner_class(),
        }
    }

    /// Underlying constructor.
    pub fn constructor(&self) -> &ConstructorDef {
        &self.constructor
    }

    /// Whether the declaring class is a non-static member class, whose
    /// first argument is the enclosing instance.
    pub fn is_inner(&self) -> bool {
        self.inner
    }

    /// Runtime argument count.
    pub fn arity(&self) -> usize {
        self.constructor.parameter_types().len()
    }

    pub(crate) fn execute(&self, inputs: &[Value], registry: &ClassRegistry) -> InternalResult<ExecutionOutcome> {
        // reflection would accept a null enclosing instance
        if self.inner && inputs.first().is_some_and(Value::is_null) {
            return Ok(ExecutionOutcome::exceptional(
                Throwable::new(jdk::NULL_POINTER_EXCEPTION),
                Duration::ZERO,
            ));
        }
        execute_reflection_code(self, registry, || self.constructor.invoke(registry, inputs))
    }

    pub(crate) fn append_code(
        &self,
        declaring: Option<&Type>,
        inputs: &TypeTuple,
        args: &[CodeArgument],
        out: &mut String,
    ) {
        let declaring = declaring
            .cloned()
            .unwrap_or_else(|| Type::class(self.constructor.declaring_class()));
        let start = if self.inner && !args.is_empty() {
            out.push_str(args[0].code());
            out.push_str(".new ");
            out.push_str(&declaring.simple_name());
            1
        } else {
            out.push_str("new ");
            out.push_str(&declaring.name());
            0
        };
        out.push('(');
        push_arguments(&args[start..], &inputs.as_slice()[start..], out);
        out.push(')');
    }

    pub(crate) fn description(&self, declaring: Option<&Type>) -> String {
        match declaring {
            Some(ty) => {
                let params: Vec<String> = self
                    .constructor
                    .parameter_types()
                    .iter()
                    .map(|param| param.erasure().binary_name())
                    .collect();
                format!("{}.<init>({})", owner_description(ty), params.join(","))
            }
            None => self.constructor.signature(),
        }
    }
}

impl fmt::Display for ConstructorCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.constructor.signature())
    }
}

/// Call of one reflective method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodCall {
    method: Arc<MethodDef>,
}

impl MethodCall {
    /// Wrap a method.
    pub fn new(method: Arc<MethodDef>) -> Self {
        method.set_accessible();
        Self { method }
    }

    /// Underlying method.
    pub fn method(&self) -> &MethodDef {
        &self.method
    }

    /// Whether the method is `static`.
    pub fn is_static(&self) -> bool {
        self.method.is_static()
    }

    /// Runtime argument count, receiver included.
    pub fn arity(&self) -> usize {
        self.method.parameter_types().len() + usize::from(!self.is_static())
    }

    pub(crate) fn execute(&self, inputs: &[Value], registry: &ClassRegistry) -> InternalResult<ExecutionOutcome> {
        let null = Value::Null;
        let (receiver, args) = match inputs.split_first() {
            Some((receiver, args)) if !self.is_static() => (receiver, args),
            _ => (&null, inputs),
        };
        execute_reflection_code(self, registry, || self.method.invoke(registry, receiver, args))
    }

    pub(crate) fn append_code(
        &self,
        declaring: Option<&Type>,
        inputs: &TypeTuple,
        args: &[CodeArgument],
        out: &mut String,
    ) {
        let start = if self.is_static() {
            match declaring {
                Some(ty) => out.push_str(&ty.erasure().name()),
                None => out.push_str(&self.method.declaring_class().replace('$', ".")),
            }
            0
        } else {
            let receiver = &args[0];
            let expected = &inputs[0];
            if expected.is_boxed_primitive() {
                out.push_str("((");
                out.push_str(&expected.name());
                out.push(')');
                out.push_str(receiver.code());
                out.push(')');
            } else {
                out.push_str(receiver.code());
            }
            1
        };
        out.push('.');

        let bounds: Vec<Type> = self
            .method
            .type_parameters()
            .iter()
            .map(|var| var.erasure())
            .collect();
        if bounds.iter().any(|bound| !bound.is_object()) {
            let names: Vec<String> = bounds.iter().map(Type::name).collect();
            out.push('<');
            out.push_str(&names.join(", "));
            out.push('>');
        }

        out.push_str(self.method.name());
        out.push('(');
        push_arguments(&args[start..], &inputs.as_slice()[start..], out);
        out.push(')');
    }

    pub(crate) fn description(&self, declaring: Option<&Type>) -> String {
        let class = match declaring {
            Some(ty) => owner_description(ty),
            None => self.method.declaring_class().to_string(),
        };
        let params: Vec<String> = self
            .method
            .erased_parameter_types()
            .iter()
            .map(Type::binary_name)
            .collect();
        format!("{}.{}({})", class, self.method.name(), params.join(","))
    }
}

impl fmt::Display for MethodCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.method.signature())
    }
}
