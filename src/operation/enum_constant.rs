//! Enum constants.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use crate::error::OperationError;
use crate::execution::ExecutionOutcome;
use crate::reflect::{ObjectRef, Value};
use crate::types::Type;

/// One constant of an enum type. Equality is identity of the constant.
#[derive(Debug, Clone)]
pub struct EnumConstant {
    value: ObjectRef,
}

impl EnumConstant {
    /// Wrap an enum constant instance.
    pub fn new(value: ObjectRef) -> Result<Self, OperationError> {
        if value.enum_constant().is_none() {
            return Err(OperationError::InvalidLiteral(format!(
                "{} is not an enum constant",
                value.class_name()
            )));
        }
        Ok(Self { value })
    }

    /// The constant instance.
    pub fn value(&self) -> &ObjectRef {
        &self.value
    }

    /// Constant name.
    pub fn name(&self) -> &str {
        self.value
            .enum_constant()
            .map(|tag| tag.name.as_str())
            .unwrap_or_default()
    }

    /// The enum type.
    pub fn enum_type(&self) -> Type {
        Type::class(self.value.class_name())
    }

    pub(crate) fn execute(&self) -> ExecutionOutcome {
        ExecutionOutcome::normal(Value::Object(self.value.clone()), Duration::ZERO)
    }

    pub(crate) fn append_code(&self, declaring: Option<&Type>, out: &mut String) {
        let owner = declaring.cloned().unwrap_or_else(|| self.enum_type());
        out.push_str(&owner.erasure().name());
        out.push('.');
        out.push_str(self.name());
    }

    /// `pkg.Enum:NAME`
    pub(crate) fn description(&self) -> String {
        format!("{}:{}", self.value.class_name(), self.name())
    }
}

impl PartialEq for EnumConstant {
    fn eq(&self, other: &Self) -> bool {
        self.value.ptr_eq(&other.value)
    }
}

impl Eq for EnumConstant {}

impl Hash for EnumConstant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.id().hash(state);
    }
}

impl fmt::Display for EnumConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}
