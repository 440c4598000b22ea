//! Array creation and element stores.

use std::fmt;
use std::time::Duration;

use super::{push_argument, push_arguments, CodeArgument};
use crate::error::{OperationParseError, ParseResult};
use crate::execution::ExecutionOutcome;
use crate::reflect::jdk;
use crate::reflect::{ArrayRef, ClassRegistry, Throwable, Value};
use crate::types::{Type, TypeTuple};

fn store_value(element_type: &Type, value: &Value) -> Value {
    match element_type.as_primitive() {
        Some(primitive) => value.widen_to(primitive).unwrap_or_else(|| value.clone()),
        None => value.clone(),
    }
}

fn thrown(class_name: &str, message: String) -> ExecutionOutcome {
    ExecutionOutcome::exceptional(Throwable::with_message(class_name, message), Duration::ZERO)
}

/// `new T[] { a, b, ... }` with a fixed number of elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InitializedArrayCreation {
    element_type: Type,
    length: usize,
}

impl InitializedArrayCreation {
    /// Array of `length` elements of `element_type`.
    pub fn new(element_type: Type, length: usize) -> Self {
        Self { element_type, length }
    }

    /// Element type.
    pub fn element_type(&self) -> &Type {
        &self.element_type
    }

    /// Number of elements.
    pub fn length(&self) -> usize {
        self.length
    }

    pub(crate) fn execute(&self, inputs: &[Value]) -> ExecutionOutcome {
        let elements = inputs
            .iter()
            .map(|value| store_value(&self.element_type, value))
            .collect();
        let array = ArrayRef::new(self.element_type.erasure(), elements);
        ExecutionOutcome::normal(Value::Array(array), Duration::ZERO)
    }

    pub(crate) fn append_code(&self, args: &[CodeArgument], out: &mut String) {
        out.push_str("new ");
        out.push_str(&self.element_type.name());
        out.push_str("[] { ");
        let expected = vec![self.element_type.clone(); args.len()];
        push_arguments(args, &expected, out);
        out.push_str(" }");
    }

    /// `elementBinaryName[length]`
    pub(crate) fn description(&self) -> String {
        format!("{}[{}]", self.element_type.binary_name(), self.length)
    }

    /// Inverse of the description; the element type may itself be an
    /// array binary name such as `[I`.
    pub fn parse(description: &str, registry: &ClassRegistry) -> ParseResult<Self> {
        let malformed = || {
            OperationParseError::new(format!(
                "Expected `type[length]` in array creation description: `{}`",
                description
            ))
        };
        let description = description.trim();
        let open = description.rfind('[').ok_or_else(malformed)?;
        let length_text = description[open + 1..]
            .strip_suffix(']')
            .ok_or_else(malformed)?;
        let length = length_text.trim().parse::<usize>().map_err(|_| {
            OperationParseError::new(format!(
                "Array length `{}` is not a number in `{}`",
                length_text, description
            ))
        })?;
        let element_text = &description[..open];
        let element_type = Type::for_name(element_text).map_err(|err| {
            OperationParseError::new(format!("Unrecognized element type `{}`: {}", element_text, err))
        })?;
        let mut base = &element_type;
        while let Some(component) = base.component() {
            base = component;
        }
        if let Some(ct) = base.as_class() {
            if !registry.contains(&ct.name) {
                return Err(OperationParseError::new(format!(
                    "Unrecognized element type `{}` in `{}`",
                    element_text, description
                )));
            }
        }
        Ok(Self::new(element_type, length))
    }
}

impl fmt::Display for InitializedArrayCreation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

/// `array[index] = value`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayElementSet {
    element_type: Type,
}

impl ArrayElementSet {
    /// Store into arrays of `element_type`.
    pub fn new(element_type: Type) -> Self {
        Self { element_type }
    }

    /// Element type.
    pub fn element_type(&self) -> &Type {
        &self.element_type
    }

    pub(crate) fn execute(&self, inputs: &[Value], registry: &ClassRegistry) -> ExecutionOutcome {
        let (array, index, value) = match inputs {
            [array, index, value] => (array, index, value),
            _ => return thrown(jdk::ILLEGAL_ARGUMENT_EXCEPTION, "wrong number of arguments".into()),
        };
        let array = match array {
            Value::Array(array) => array,
            _ => {
                return ExecutionOutcome::exceptional(
                    Throwable::new(jdk::NULL_POINTER_EXCEPTION),
                    Duration::ZERO,
                )
            }
        };
        let index = index.as_int().unwrap_or(-1);
        let slot = usize::try_from(index).ok().filter(|idx| *idx < array.len());
        let Some(slot) = slot else {
            return thrown(
                jdk::ARRAY_INDEX_OUT_OF_BOUNDS_EXCEPTION,
                format!("Index {} out of bounds for length {}", index, array.len()),
            );
        };
        let stored = store_value(array.component(), value);
        if !registry.is_instance(&stored, array.component()) {
            return thrown(
                jdk::ARRAY_STORE_EXCEPTION,
                stored.runtime_class_name().unwrap_or_default(),
            );
        }
        array.set(slot, stored);
        ExecutionOutcome::normal(Value::Null, Duration::ZERO)
    }

    pub(crate) fn append_code(&self, inputs: &TypeTuple, args: &[CodeArgument], out: &mut String) {
        if let [array, index, value] = args {
            out.push_str(array.code());
            out.push('[');
            out.push_str(index.code());
            out.push_str("] = ");
            push_argument(value, inputs.get(2).unwrap_or(&self.element_type), out);
        }
    }
}

impl fmt::Display for ArrayElementSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[].<set>", self.element_type)
    }
}

/// `java.lang.reflect.Array.newInstance(T.class, length)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReflectiveArrayCreation {
    element_type: Type,
}

impl ReflectiveArrayCreation {
    /// Arrays of `element_type`.
    pub fn new(element_type: Type) -> Self {
        Self { element_type }
    }

    /// Element type.
    pub fn element_type(&self) -> &Type {
        &self.element_type
    }

    pub(crate) fn execute(&self, inputs: &[Value]) -> ExecutionOutcome {
        let length = inputs.first().and_then(Value::as_int).unwrap_or(0);
        match usize::try_from(length) {
            Ok(length) => ExecutionOutcome::normal(
                Value::Array(ArrayRef::with_length(self.element_type.erasure(), length)),
                Duration::ZERO,
            ),
            Err(_) => thrown(jdk::NEGATIVE_ARRAY_SIZE_EXCEPTION, length.to_string()),
        }
    }

    pub(crate) fn append_code(&self, args: &[CodeArgument], out: &mut String) {
        let element = self.element_type.erasure();
        out.push_str(&format!(
            "({}[])java.lang.reflect.Array.newInstance({}.class, ",
            element.name(),
            element.name()
        ));
        if let Some(length) = args.first() {
            out.push_str(length.code());
        }
        out.push(')');
    }
}

impl fmt::Display for ReflectiveArrayCreation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "java.lang.reflect.Array.newInstance({}.class)", self.element_type.erasure())
    }
}
