//! Field reads and writes.

use std::fmt;
use std::sync::Arc;

use super::{owner_description, push_argument, CodeArgument};
use crate::error::{InternalResult, OperationError};
use crate::execution::{execute_reflection_code, ExecutionOutcome};
use crate::reflect::{ClassRegistry, FieldDef, Value};
use crate::types::{Type, TypeTuple};

fn owner_name(field: &FieldDef, declaring: Option<&Type>) -> String {
    match declaring {
        Some(ty) => ty.erasure().binary_name(),
        None => field.declaring_class().to_string(),
    }
}

fn described_owner(field: &FieldDef, declaring: Option<&Type>) -> String {
    match declaring {
        Some(ty) => owner_description(ty),
        None => field.declaring_class().to_string(),
    }
}

fn push_target(field: &FieldDef, declaring: Option<&Type>, args: &[CodeArgument], out: &mut String) {
    if field.is_static() {
        out.push_str(&owner_name(field, declaring).replace('$', "."));
    } else {
        out.push_str(args[0].code());
    }
    out.push('.');
    out.push_str(field.name());
}

/// Read of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldGet {
    field: Arc<FieldDef>,
}

impl FieldGet {
    /// Wrap a field.
    pub fn new(field: Arc<FieldDef>) -> Self {
        field.set_accessible();
        Self { field }
    }

    /// Underlying field.
    pub fn field(&self) -> &FieldDef {
        &self.field
    }

    /// Runtime argument count.
    pub fn arity(&self) -> usize {
        usize::from(!self.field.is_static())
    }

    pub(crate) fn execute(&self, inputs: &[Value], registry: &ClassRegistry) -> InternalResult<ExecutionOutcome> {
        let null = Value::Null;
        let receiver = inputs.first().unwrap_or(&null);
        execute_reflection_code(self, registry, || self.field.get(registry, receiver))
    }

    pub(crate) fn append_code(&self, declaring: Option<&Type>, args: &[CodeArgument], out: &mut String) {
        push_target(&self.field, declaring, args, out);
    }

    pub(crate) fn description(&self, declaring: Option<&Type>) -> String {
        format!("{}.<get>({})", described_owner(&self.field, declaring), self.field.name())
    }
}

impl fmt::Display for FieldGet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description(None))
    }
}

/// Write of a field. Never built for `static final` fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldSet {
    field: Arc<FieldDef>,
}

impl FieldSet {
    /// Wrap a non-constant field.
    pub fn new(field: Arc<FieldDef>) -> Result<Self, OperationError> {
        if field.is_static() && field.is_final() {
            return Err(OperationError::StaticFinalField(format!(
                "{}.{}",
                field.declaring_class(),
                field.name()
            )));
        }
        field.set_accessible();
        Ok(Self { field })
    }

    /// Underlying field.
    pub fn field(&self) -> &FieldDef {
        &self.field
    }

    /// Runtime argument count: receiver (unless static) and the value.
    pub fn arity(&self) -> usize {
        1 + usize::from(!self.field.is_static())
    }

    pub(crate) fn execute(&self, inputs: &[Value], registry: &ClassRegistry) -> InternalResult<ExecutionOutcome> {
        let null = Value::Null;
        let (value, receiver) = match inputs {
            [receiver, value] => (value, receiver),
            [value] => (value, &null),
            _ => (&null, &null),
        };
        execute_reflection_code(self, registry, || {
            self.field
                .set(registry, receiver, value)
                .map(|()| Value::Null)
        })
    }

    pub(crate) fn append_code(
        &self,
        declaring: Option<&Type>,
        inputs: &TypeTuple,
        args: &[CodeArgument],
        out: &mut String,
    ) {
        push_target(&self.field, declaring, args, out);
        out.push_str(" = ");
        if let (Some(arg), Some(ty)) = (args.last(), inputs.as_slice().last()) {
            push_argument(arg, ty, out);
        }
    }

    pub(crate) fn description(&self, declaring: Option<&Type>) -> String {
        format!("{}.<set>({})", described_owner(&self.field, declaring), self.field.name())
    }
}

impl fmt::Display for FieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description(None))
    }
}
