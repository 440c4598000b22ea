//! Finite maps from type variables to reference types.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::OperationError;

use super::{Type, TypeVariable};

/// Mapping used to instantiate generic types and operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    map: BTreeMap<TypeVariable, Type>,
}

impl Substitution {
    /// The empty substitution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair parameters with arguments position by position.
    pub fn for_args(
        parameters: &[TypeVariable],
        arguments: &[Type],
    ) -> Result<Self, OperationError> {
        if parameters.len() != arguments.len() {
            return Err(OperationError::InvalidType(format!(
                "{} type parameters but {} arguments",
                parameters.len(),
                arguments.len()
            )));
        }
        parameters
            .iter()
            .zip(arguments)
            .try_fold(Self::new(), |acc, (var, ty)| acc.bind(var.clone(), ty.clone()))
    }

    /// Extend with one more binding. Only reference types may be bound, and
    /// an existing binding for the same variable is replaced.
    pub fn bind(mut self, variable: TypeVariable, ty: Type) -> Result<Self, OperationError> {
        if !ty.is_reference() {
            return Err(OperationError::InvalidType(format!(
                "cannot bind {} to non-reference type {}",
                variable, ty
            )));
        }
        self.map.insert(variable, ty);
        Ok(self)
    }

    /// Binding for `variable`.
    pub fn get(&self, variable: &TypeVariable) -> Option<&Type> {
        self.map.get(variable)
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Iterate bindings in variable order.
    pub fn iter(&self) -> impl Iterator<Item = (&TypeVariable, &Type)> {
        self.map.iter()
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (idx, (var, ty)) in self.map.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} := {}", var, ty)?;
        }
        f.write_str("}")
    }
}
