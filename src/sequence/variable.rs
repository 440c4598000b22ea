//! Variables naming statement results.

use std::fmt;

use crate::types::{PrimitiveType, Type};

/// Result of the statement at `index`, with its static type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    index: usize,
    ty: Type,
}

impl Variable {
    /// Variable for the statement at `index`.
    pub fn new(index: usize, ty: Type) -> Self {
        Self { index, ty }
    }

    /// Index of the defining statement.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Static type.
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// Source name: a base derived from the type, then the index.
    pub fn name(&self) -> String {
        format!("{}{}", variable_base_name(&self.ty), self.index)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Base of generated variable names for values of `ty`.
///
/// `int` gives `i`, `String` gives `str`, `Object` gives `obj`, arrays append
/// `Array` to their element's base, other classes use their lower-camel
/// simple name.
pub fn variable_base_name(ty: &Type) -> String {
    match ty {
        Type::Primitive(primitive) => primitive_base(*primitive).to_string(),
        Type::Void => "void".to_string(),
        Type::Array(component) => format!("{}Array", variable_base_name(component)),
        Type::Variable(var) => lower_camel(&var.name),
        Type::Class(_) if ty.is_string() => "str".to_string(),
        Type::Class(_) if ty.is_object() => "obj".to_string(),
        Type::Class(ct) => lower_camel(ct.simple_name()),
    }
}

fn primitive_base(primitive: PrimitiveType) -> &'static str {
    match primitive {
        PrimitiveType::Boolean => "b",
        PrimitiveType::Byte => "by",
        PrimitiveType::Char => "c",
        PrimitiveType::Short => "s",
        PrimitiveType::Int => "i",
        PrimitiveType::Long => "l",
        PrimitiveType::Float => "f",
        PrimitiveType::Double => "d",
    }
}

fn lower_camel(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => "var".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_names() {
        assert_eq!(variable_base_name(&Type::INT), "i");
        assert_eq!(variable_base_name(&Type::string()), "str");
        assert_eq!(variable_base_name(&Type::object()), "obj");
        assert_eq!(variable_base_name(&Type::array(Type::INT)), "iArray");
        assert_eq!(variable_base_name(&Type::array(Type::string())), "strArray");
        assert_eq!(
            variable_base_name(&Type::generic("java.util.ArrayList", vec![Type::string()])),
            "arrayList"
        );
        assert_eq!(variable_base_name(&Type::class("java.lang.Thread$State")), "state");
    }

    #[test]
    fn name_appends_index() {
        assert_eq!(Variable::new(3, Type::LONG).name(), "l3");
    }
}
