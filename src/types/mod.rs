//! Unified type model for declaring, input and output types of operations.
//!
//! A single [`Type`] covers primitive, class/interface (raw or
//! parameterized), array and type-variable forms. Generic and concrete types
//! are not separate families: [`Type::is_generic`] tells them apart and
//! [`Type::substitute`] instantiates either kind uniformly.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

pub mod names;
pub mod substitution;

pub use names::{parse_type, TypeNameError};
pub use substitution::Substitution;

/// Binary name of `java.lang.Object`.
pub const OBJECT: &str = "java.lang.Object";
/// Binary name of `java.lang.String`.
pub const STRING: &str = "java.lang.String";
/// Binary name of `java.lang.Class`.
pub const CLASS: &str = "java.lang.Class";

/// The eight primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveType {
    /// `boolean`
    Boolean,
    /// `byte`
    Byte,
    /// `char`
    Char,
    /// `short`
    Short,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `float`
    Float,
    /// `double`
    Double,
}

impl PrimitiveType {
    /// Every primitive type, in declaration order.
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Boolean,
        PrimitiveType::Byte,
        PrimitiveType::Char,
        PrimitiveType::Short,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
    ];

    /// Keyword name (`int`, `boolean`, ...).
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Char => "char",
            PrimitiveType::Short => "short",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }

    /// Look up a primitive by keyword.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }

    /// Binary name of the corresponding box class.
    pub fn boxed_name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "java.lang.Boolean",
            PrimitiveType::Byte => "java.lang.Byte",
            PrimitiveType::Char => "java.lang.Character",
            PrimitiveType::Short => "java.lang.Short",
            PrimitiveType::Int => "java.lang.Integer",
            PrimitiveType::Long => "java.lang.Long",
            PrimitiveType::Float => "java.lang.Float",
            PrimitiveType::Double => "java.lang.Double",
        }
    }

    /// Primitive whose box class has the given binary name.
    pub fn from_boxed_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.boxed_name() == name)
    }

    /// Single-letter field descriptor used in array binary names.
    pub fn descriptor(self) -> char {
        match self {
            PrimitiveType::Boolean => 'Z',
            PrimitiveType::Byte => 'B',
            PrimitiveType::Char => 'C',
            PrimitiveType::Short => 'S',
            PrimitiveType::Int => 'I',
            PrimitiveType::Long => 'J',
            PrimitiveType::Float => 'F',
            PrimitiveType::Double => 'D',
        }
    }

    /// Inverse of [`PrimitiveType::descriptor`].
    pub fn from_descriptor(code: char) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.descriptor() == code)
    }

    /// Whether this is a numeric type (everything except `boolean`).
    pub fn is_numeric(self) -> bool {
        self != PrimitiveType::Boolean
    }

    /// Identity or widening primitive conversion from `self` to `target`.
    pub fn widens_to(self, target: PrimitiveType) -> bool {
        use PrimitiveType::*;
        if self == target {
            return true;
        }
        match self {
            Byte => matches!(target, Short | Int | Long | Float | Double),
            Short | Char => matches!(target, Int | Long | Float | Double),
            Int => matches!(target, Long | Float | Double),
            Long => matches!(target, Float | Double),
            Float => matches!(target, Double),
            Boolean | Double => false,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Type variable of a generic class or method.
///
/// Variables are identified by name; the bound only feeds erasure.
#[derive(Debug, Clone)]
pub struct TypeVariable {
    /// Declared name (`E`, `T`, ...).
    pub name: String,
    /// First upper bound, when one other than `Object` is declared.
    pub bound: Option<Box<Type>>,
}

impl TypeVariable {
    /// Unbounded type variable.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bound: None,
        }
    }

    /// Type variable with an upper bound.
    pub fn bounded(name: impl Into<String>, bound: Type) -> Self {
        Self {
            name: name.into(),
            bound: Some(Box::new(bound)),
        }
    }

    /// Erasure of the variable: the erasure of its bound, or `Object`.
    pub fn erasure(&self) -> Type {
        match &self.bound {
            Some(bound) => bound.erasure(),
            None => Type::object(),
        }
    }
}

impl PartialEq for TypeVariable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for TypeVariable {}

impl Hash for TypeVariable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for TypeVariable {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeVariable {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl fmt::Display for TypeVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Wildcard type argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Wildcard {
    /// `?`
    Unbounded,
    /// `? extends T`
    Extends(Box<Type>),
    /// `? super T`
    Super(Box<Type>),
}

/// Argument of a parameterized class type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeArgument {
    /// A reference type (possibly a type variable).
    Type(Type),
    /// A wildcard.
    Wildcard(Wildcard),
}

impl TypeArgument {
    fn substitute(&self, substitution: &Substitution) -> TypeArgument {
        match self {
            TypeArgument::Type(ty) => TypeArgument::Type(ty.substitute(substitution)),
            TypeArgument::Wildcard(Wildcard::Unbounded) => {
                TypeArgument::Wildcard(Wildcard::Unbounded)
            }
            TypeArgument::Wildcard(Wildcard::Extends(bound)) => TypeArgument::Wildcard(
                Wildcard::Extends(Box::new(bound.substitute(substitution))),
            ),
            TypeArgument::Wildcard(Wildcard::Super(bound)) => TypeArgument::Wildcard(
                Wildcard::Super(Box::new(bound.substitute(substitution))),
            ),
        }
    }

    fn collect_parameters(&self, out: &mut Vec<TypeVariable>) {
        match self {
            TypeArgument::Type(ty) => ty.collect_parameters(out),
            TypeArgument::Wildcard(Wildcard::Unbounded) => {}
            TypeArgument::Wildcard(Wildcard::Extends(bound))
            | TypeArgument::Wildcard(Wildcard::Super(bound)) => bound.collect_parameters(out),
        }
    }

    fn is_generic(&self) -> bool {
        match self {
            TypeArgument::Type(ty) => ty.is_generic(),
            TypeArgument::Wildcard(Wildcard::Unbounded) => false,
            TypeArgument::Wildcard(Wildcard::Extends(bound))
            | TypeArgument::Wildcard(Wildcard::Super(bound)) => bound.is_generic(),
        }
    }

    fn has_wildcard(&self) -> bool {
        match self {
            TypeArgument::Type(ty) => ty.has_wildcard(),
            TypeArgument::Wildcard(_) => true,
        }
    }
}

impl fmt::Display for TypeArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeArgument::Type(ty) => write!(f, "{}", ty),
            TypeArgument::Wildcard(Wildcard::Unbounded) => f.write_str("?"),
            TypeArgument::Wildcard(Wildcard::Extends(bound)) => write!(f, "? extends {}", bound),
            TypeArgument::Wildcard(Wildcard::Super(bound)) => write!(f, "? super {}", bound),
        }
    }
}

/// Class or interface type; an empty argument list denotes a raw or
/// non-generic type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassType {
    /// Binary name (`java.util.ArrayList`, `pkg.Outer$Inner`).
    pub name: String,
    /// Type arguments.
    pub arguments: Vec<TypeArgument>,
}

impl ClassType {
    /// Raw or non-generic class type.
    pub fn raw(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    /// Source-form name with `$` rendered as `.`.
    pub fn canonical_name(&self) -> String {
        self.name.replace('$', ".")
    }

    /// Simple name: text after the last `.` or `$`.
    pub fn simple_name(&self) -> &str {
        let cut = self
            .name
            .rfind(|c| c == '.' || c == '$')
            .map(|idx| idx + 1)
            .unwrap_or(0);
        &self.name[cut..]
    }

    /// Package prefix, if any.
    pub fn package_name(&self) -> Option<&str> {
        self.name.rfind('.').map(|idx| &self.name[..idx])
    }
}

/// A type occurring in an operation signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Type {
    /// Primitive type.
    Primitive(PrimitiveType),
    /// `void`, only valid as an output type.
    Void,
    /// Class or interface type.
    Class(ClassType),
    /// Array with the given component type.
    Array(Box<Type>),
    /// Type variable.
    Variable(TypeVariable),
}

impl Type {
    /// `boolean`
    pub const BOOLEAN: Type = Type::Primitive(PrimitiveType::Boolean);
    /// `byte`
    pub const BYTE: Type = Type::Primitive(PrimitiveType::Byte);
    /// `char`
    pub const CHAR: Type = Type::Primitive(PrimitiveType::Char);
    /// `short`
    pub const SHORT: Type = Type::Primitive(PrimitiveType::Short);
    /// `int`
    pub const INT: Type = Type::Primitive(PrimitiveType::Int);
    /// `long`
    pub const LONG: Type = Type::Primitive(PrimitiveType::Long);
    /// `float`
    pub const FLOAT: Type = Type::Primitive(PrimitiveType::Float);
    /// `double`
    pub const DOUBLE: Type = Type::Primitive(PrimitiveType::Double);

    /// Raw or non-generic class type with the given binary name.
    pub fn class(name: impl Into<String>) -> Type {
        Type::Class(ClassType::raw(name))
    }

    /// Parameterized class type.
    pub fn parameterized(name: impl Into<String>, arguments: Vec<TypeArgument>) -> Type {
        Type::Class(ClassType {
            name: name.into(),
            arguments,
        })
    }

    /// Parameterized class type whose arguments are all plain types.
    pub fn generic(name: impl Into<String>, arguments: Vec<Type>) -> Type {
        Type::parameterized(name, arguments.into_iter().map(TypeArgument::Type).collect())
    }

    /// Array of `component`.
    pub fn array(component: Type) -> Type {
        Type::Array(Box::new(component))
    }

    /// Unbounded type variable.
    pub fn variable(name: impl Into<String>) -> Type {
        Type::Variable(TypeVariable::new(name))
    }

    /// `java.lang.Object`
    pub fn object() -> Type {
        Type::class(OBJECT)
    }

    /// `java.lang.String`
    pub fn string() -> Type {
        Type::class(STRING)
    }

    /// Raw `java.lang.Class`
    pub fn class_literal() -> Type {
        Type::class(CLASS)
    }

    /// Box class type for a primitive.
    pub fn boxed(primitive: PrimitiveType) -> Type {
        Type::class(primitive.boxed_name())
    }

    /// Primitive payload, if primitive.
    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            Type::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// Class payload, if a class or interface type.
    pub fn as_class(&self) -> Option<&ClassType> {
        match self {
            Type::Class(ct) => Some(ct),
            _ => None,
        }
    }

    /// Array component type, if an array.
    pub fn component(&self) -> Option<&Type> {
        match self {
            Type::Array(component) => Some(component),
            _ => None,
        }
    }

    /// Whether this is a primitive type.
    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    /// Whether this is `void`.
    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    /// Whether this is a reference type (class, array or type variable).
    pub fn is_reference(&self) -> bool {
        matches!(self, Type::Class(_) | Type::Array(_) | Type::Variable(_))
    }

    /// Whether this is an array type.
    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array(_))
    }

    /// Whether this is a type variable.
    pub fn is_variable(&self) -> bool {
        matches!(self, Type::Variable(_))
    }

    /// Whether this is a class type with type arguments.
    pub fn is_parameterized(&self) -> bool {
        matches!(self, Type::Class(ct) if !ct.arguments.is_empty())
    }

    /// Whether this is exactly `java.lang.String`.
    pub fn is_string(&self) -> bool {
        matches!(self, Type::Class(ct) if ct.name == STRING)
    }

    /// Whether this is exactly `java.lang.Object`.
    pub fn is_object(&self) -> bool {
        matches!(self, Type::Class(ct) if ct.name == OBJECT)
    }

    /// Whether this is the raw `java.lang.Class` or an instantiation of it.
    pub fn is_class_literal_type(&self) -> bool {
        matches!(self, Type::Class(ct) if ct.name == CLASS)
    }

    /// Whether this is a box class of a primitive.
    pub fn is_boxed_primitive(&self) -> bool {
        self.unboxed().is_some()
    }

    /// Primitive that this box class unboxes to.
    pub fn unboxed(&self) -> Option<PrimitiveType> {
        match self {
            Type::Class(ct) if ct.arguments.is_empty() => PrimitiveType::from_boxed_name(&ct.name),
            _ => None,
        }
    }

    /// Whether values of this type are written as literals rather than
    /// built by calls: primitives, their boxes and `String`.
    pub fn is_nonreceiver_type(&self) -> bool {
        self.is_primitive() || self.is_boxed_primitive() || self.is_string()
    }

    /// Whether a type variable occurs anywhere in this type.
    pub fn is_generic(&self) -> bool {
        match self {
            Type::Primitive(_) | Type::Void => false,
            Type::Variable(_) => true,
            Type::Array(component) => component.is_generic(),
            Type::Class(ct) => ct.arguments.iter().any(TypeArgument::is_generic),
        }
    }

    /// Whether a wildcard argument occurs anywhere in this type.
    pub fn has_wildcard(&self) -> bool {
        match self {
            Type::Class(ct) => ct.arguments.iter().any(TypeArgument::has_wildcard),
            Type::Array(component) => component.has_wildcard(),
            _ => false,
        }
    }

    /// Type variables occurring in this type, de-duplicated, in order of
    /// first occurrence.
    pub fn type_parameters(&self) -> Vec<TypeVariable> {
        let mut out = Vec::new();
        self.collect_parameters(&mut out);
        out
    }

    fn collect_parameters(&self, out: &mut Vec<TypeVariable>) {
        match self {
            Type::Primitive(_) | Type::Void => {}
            Type::Variable(var) => {
                if !out.contains(var) {
                    out.push(var.clone());
                }
            }
            Type::Array(component) => component.collect_parameters(out),
            Type::Class(ct) => {
                for arg in &ct.arguments {
                    arg.collect_parameters(out);
                }
            }
        }
    }

    /// Replace every occurrence of a mapped type variable.
    pub fn substitute(&self, substitution: &Substitution) -> Type {
        if substitution.is_empty() {
            return self.clone();
        }
        match self {
            Type::Primitive(_) | Type::Void => self.clone(),
            Type::Variable(var) => substitution
                .get(var)
                .cloned()
                .unwrap_or_else(|| self.clone()),
            Type::Array(component) => Type::array(component.substitute(substitution)),
            Type::Class(ct) => Type::Class(ClassType {
                name: ct.name.clone(),
                arguments: ct
                    .arguments
                    .iter()
                    .map(|arg| arg.substitute(substitution))
                    .collect(),
            }),
        }
    }

    /// Type erasure: type arguments dropped, variables replaced by bounds.
    pub fn erasure(&self) -> Type {
        match self {
            Type::Primitive(_) | Type::Void => self.clone(),
            Type::Variable(var) => var.erasure(),
            Type::Array(component) => Type::array(component.erasure()),
            Type::Class(ct) => Type::class(ct.name.clone()),
        }
    }

    /// Reflection-style binary name (`int`, `java.lang.String`, `[I`,
    /// `[Ljava.lang.Object;`). Type arguments are erased.
    pub fn binary_name(&self) -> String {
        match self {
            Type::Primitive(p) => p.name().to_string(),
            Type::Void => "void".to_string(),
            Type::Class(ct) => ct.name.clone(),
            Type::Array(_) => self.descriptor(),
            Type::Variable(var) => var.erasure().binary_name(),
        }
    }

    /// Binary name keeping type arguments, in the form [`Type::for_name`]
    /// reads back (`java.util.Map$Entry<java.lang.String,[I>`).
    pub fn parameterized_binary_name(&self) -> String {
        match self {
            Type::Class(ct) if !ct.arguments.is_empty() => {
                let arguments: Vec<String> = ct
                    .arguments
                    .iter()
                    .map(|arg| match arg {
                        TypeArgument::Type(ty) => ty.parameterized_binary_name(),
                        TypeArgument::Wildcard(Wildcard::Unbounded) => "?".to_string(),
                        TypeArgument::Wildcard(Wildcard::Extends(bound)) => {
                            format!("? extends {}", bound.parameterized_binary_name())
                        }
                        TypeArgument::Wildcard(Wildcard::Super(bound)) => {
                            format!("? super {}", bound.parameterized_binary_name())
                        }
                    })
                    .collect();
                format!("{}<{}>", ct.name, arguments.join(","))
            }
            Type::Array(component) if component.is_parameterized() => {
                format!("{}[]", component.parameterized_binary_name())
            }
            _ => self.binary_name(),
        }
    }

    fn descriptor(&self) -> String {
        match self {
            Type::Primitive(p) => p.descriptor().to_string(),
            Type::Void => "V".to_string(),
            Type::Class(ct) => format!("L{};", ct.name),
            Type::Array(component) => format!("[{}", component.descriptor()),
            Type::Variable(var) => var.erasure().descriptor(),
        }
    }

    /// Compilable source-form name.
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// Unqualified name used for variable naming and inner-class creation.
    pub fn simple_name(&self) -> String {
        match self {
            Type::Primitive(p) => p.name().to_string(),
            Type::Void => "void".to_string(),
            Type::Class(ct) => ct.simple_name().to_string(),
            Type::Array(component) => format!("{}[]", component.simple_name()),
            Type::Variable(var) => var.name.clone(),
        }
    }

    /// Parse a type name; see [`names::parse_type`].
    pub fn for_name(text: &str) -> Result<Type, TypeNameError> {
        parse_type(text)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(p) => write!(f, "{}", p),
            Type::Void => f.write_str("void"),
            Type::Class(ct) => {
                f.write_str(&ct.canonical_name())?;
                if !ct.arguments.is_empty() {
                    f.write_str("<")?;
                    for (idx, arg) in ct.arguments.iter().enumerate() {
                        if idx > 0 {
                            f.write_str(",")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            Type::Array(component) => write!(f, "{}[]", component),
            Type::Variable(var) => write!(f, "{}", var),
        }
    }
}

/// Ordered list of input types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeTuple(Vec<Type>);

impl TypeTuple {
    /// Tuple from a list of types.
    pub fn new(types: Vec<Type>) -> Self {
        Self(types)
    }

    /// The empty tuple.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Number of types.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the tuple is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Type at `index`.
    pub fn get(&self, index: usize) -> Option<&Type> {
        self.0.get(index)
    }

    /// Iterate over the types.
    pub fn iter(&self) -> std::slice::Iter<'_, Type> {
        self.0.iter()
    }

    /// Borrow as a slice.
    pub fn as_slice(&self) -> &[Type] {
        &self.0
    }

    /// Whether any element is generic.
    pub fn is_generic(&self) -> bool {
        self.0.iter().any(Type::is_generic)
    }

    /// Whether any element mentions a wildcard.
    pub fn has_wildcard(&self) -> bool {
        self.0.iter().any(Type::has_wildcard)
    }

    /// Type variables of all elements, de-duplicated, in order.
    pub fn type_parameters(&self) -> Vec<TypeVariable> {
        let mut out = Vec::new();
        for ty in &self.0 {
            ty.collect_parameters(&mut out);
        }
        out
    }

    /// Substitute every element.
    pub fn substitute(&self, substitution: &Substitution) -> TypeTuple {
        TypeTuple(self.0.iter().map(|ty| ty.substitute(substitution)).collect())
    }
}

impl std::ops::Index<usize> for TypeTuple {
    type Output = Type;

    fn index(&self, index: usize) -> &Type {
        &self.0[index]
    }
}

impl FromIterator<Type> for TypeTuple {
    fn from_iter<I: IntoIterator<Item = Type>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for TypeTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (idx, ty) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", ty)?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(arg: Type) -> Type {
        Type::generic("java.util.List", vec![arg])
    }

    #[test]
    fn binary_names_follow_reflection_form() {
        assert_eq!(Type::INT.binary_name(), "int");
        assert_eq!(Type::array(Type::INT).binary_name(), "[I");
        assert_eq!(
            Type::array(Type::array(Type::object())).binary_name(),
            "[[Ljava.lang.Object;"
        );
        assert_eq!(list_of(Type::string()).binary_name(), "java.util.List");
    }

    #[test]
    fn parameterized_binary_names_read_back() {
        let entry = Type::generic(
            "java.util.Map$Entry",
            vec![Type::string(), Type::array(Type::INT)],
        );
        let text = entry.parameterized_binary_name();
        assert_eq!(text, "java.util.Map$Entry<java.lang.String,[I>");
        assert_eq!(Type::for_name(&text).unwrap(), entry);

        let nested = list_of(list_of(Type::string()));
        assert_eq!(Type::for_name(&nested.parameterized_binary_name()).unwrap(), nested);
        assert_eq!(Type::INT.parameterized_binary_name(), "int");
    }

    #[test]
    fn source_names_render_arguments_and_members() {
        let entry = Type::class("java.util.Map$Entry");
        assert_eq!(entry.name(), "java.util.Map.Entry");
        assert_eq!(entry.simple_name(), "Entry");
        assert_eq!(
            list_of(Type::string()).name(),
            "java.util.List<java.lang.String>"
        );
        let wild = Type::parameterized(
            "java.util.List",
            vec![TypeArgument::Wildcard(Wildcard::Extends(Box::new(
                Type::class("java.lang.Number"),
            )))],
        );
        assert_eq!(wild.name(), "java.util.List<? extends java.lang.Number>");
        assert!(wild.has_wildcard());
    }

    #[test]
    fn type_parameters_are_deduplicated_in_order() {
        let map = Type::generic(
            "java.util.Map",
            vec![Type::variable("K"), list_of(Type::variable("V"))],
        );
        let tuple = TypeTuple::new(vec![map, Type::variable("K"), Type::array(Type::variable("T"))]);
        let names: Vec<_> = tuple
            .type_parameters()
            .into_iter()
            .map(|v| v.name)
            .collect();
        assert_eq!(names, vec!["K", "V", "T"]);
    }

    #[test]
    fn erasure_uses_bounds() {
        let bounded = Type::Variable(TypeVariable::bounded("N", Type::class("java.lang.Number")));
        assert_eq!(bounded.erasure(), Type::class("java.lang.Number"));
        assert_eq!(Type::variable("T").erasure(), Type::object());
        assert_eq!(list_of(Type::variable("T")).erasure(), Type::class("java.util.List"));
    }

    #[test]
    fn widening_follows_primitive_lattice() {
        assert!(PrimitiveType::Byte.widens_to(PrimitiveType::Int));
        assert!(PrimitiveType::Char.widens_to(PrimitiveType::Long));
        assert!(!PrimitiveType::Char.widens_to(PrimitiveType::Short));
        assert!(!PrimitiveType::Double.widens_to(PrimitiveType::Float));
        assert!(!PrimitiveType::Boolean.widens_to(PrimitiveType::Int));
    }
}
