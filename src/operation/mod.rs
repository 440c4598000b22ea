//! The typed-operation model.
//!
//! An [`Operation`] is a pure description `op : [T1..Tn] -> T` of a callable
//! program element; a [`TypedOperation`] decorates it with the declaring,
//! input and output types it is used at.
//!
//! Operations are immutable once built and shared through `Arc`. All
//! per-call state lives on the executing thread's stack.

pub mod array;
pub mod call;
pub mod enum_constant;
pub mod field;
pub mod literal;
pub mod model;
pub mod parser;
pub mod synthetic;
pub mod typed;

pub use array::{ArrayElementSet, InitializedArrayCreation, ReflectiveArrayCreation};
pub use call::{ConstructorCall, MethodCall};
pub use enum_constant::EnumConstant;
pub use field::{FieldGet, FieldSet};
pub use literal::{NonreceiverTerm, DEFAULT_STRING_MAXLEN};
pub use model::{operations_for_class, DefaultReflectionPredicate, ReflectionPredicate};
pub use parser::{parse_operation, OperationParser};
pub use synthetic::{PlusOperation, UncheckedCast};
pub use typed::TypedOperation;

use std::fmt;

use crate::error::InternalResult;
use crate::execution::ExecutionOutcome;
use crate::reflect::{ClassRegistry, Value};
use crate::types::{Type, TypeTuple};

/// A variable handed to code generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeArgument {
    /// Variable name.
    pub name: String,
    /// Static type of the variable.
    pub ty: Type,
    /// Literal code used in place of the name, when the defining statement
    /// is inlined.
    pub inline: Option<String>,
}

impl CodeArgument {
    /// Plain variable reference.
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            inline: None,
        }
    }

    /// Variable whose defining literal is written at the use site.
    pub fn inlined(name: impl Into<String>, ty: Type, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty,
            inline: Some(code.into()),
        }
    }

    /// Text used at the use site.
    pub fn code(&self) -> &str {
        self.inline.as_deref().unwrap_or(&self.name)
    }
}

/// Write `arg`, casting when its static type differs from `expected`.
pub(crate) fn push_argument(arg: &CodeArgument, expected: &Type, out: &mut String) {
    if arg.ty != *expected {
        out.push('(');
        out.push_str(&expected.name());
        out.push(')');
    }
    out.push_str(arg.code());
}

/// Class part of a member description. Type arguments are kept when the
/// declaring type is a fully instantiated parameterization.
pub(crate) fn owner_description(declaring: &Type) -> String {
    if declaring.is_parameterized() && !declaring.is_generic() && !declaring.has_wildcard() {
        declaring.parameterized_binary_name()
    } else {
        declaring.erasure().binary_name()
    }
}

/// Comma-separated arguments with casts.
pub(crate) fn push_arguments(args: &[CodeArgument], expected: &[Type], out: &mut String) {
    for (idx, (arg, ty)) in args.iter().zip(expected).enumerate() {
        if idx > 0 {
            out.push_str(", ");
        }
        push_argument(arg, ty, out);
    }
}

/// Every kind of operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Constructor invocation.
    Constructor(ConstructorCall),
    /// Method invocation.
    Method(MethodCall),
    /// Field read.
    FieldGet(FieldGet),
    /// Field write.
    FieldSet(FieldSet),
    /// Enum constant.
    EnumConstant(EnumConstant),
    /// Literal value.
    Literal(NonreceiverTerm),
    /// Array built from its elements.
    ArrayCreation(InitializedArrayCreation),
    /// Store into an array slot.
    ArrayElementSet(ArrayElementSet),
    /// Array of a given length built through `java.lang.reflect.Array`.
    ReflectiveArrayCreation(ReflectiveArrayCreation),
    /// Unchecked reference cast.
    UncheckedCast(UncheckedCast),
    /// Integer addition.
    Plus(PlusOperation),
}

impl Operation {
    /// Tag used in the persisted textual form.
    pub fn tag(&self) -> &'static str {
        match self {
            Operation::Constructor(_) => "ConstructorCall",
            Operation::Method(_) => "MethodCall",
            Operation::FieldGet(_) => "FieldGet",
            Operation::FieldSet(_) => "FieldSet",
            Operation::EnumConstant(_) => "EnumConstant",
            Operation::Literal(_) => "NonreceiverTerm",
            Operation::ArrayCreation(_) => "InitializedArrayCreation",
            Operation::ArrayElementSet(_) => "ArrayElementSet",
            Operation::ReflectiveArrayCreation(_) => "ReflectiveArrayCreation",
            Operation::UncheckedCast(_) => "UncheckedCast",
            Operation::Plus(_) => "PlusOperation",
        }
    }

    /// Whether [`OperationParser`] can read this operation back.
    pub fn is_parsable(&self) -> bool {
        !matches!(
            self,
            Operation::ArrayElementSet(_)
                | Operation::ReflectiveArrayCreation(_)
                | Operation::UncheckedCast(_)
                | Operation::Plus(_)
        )
    }

    /// Unqualified name.
    pub fn name(&self) -> String {
        match self {
            Operation::Constructor(_) => "<init>".to_string(),
            Operation::Method(op) => op.method().name().to_string(),
            Operation::FieldGet(op) => format!("<get>({})", op.field().name()),
            Operation::FieldSet(op) => format!("<set>({})", op.field().name()),
            Operation::EnumConstant(op) => op.name().to_string(),
            Operation::Literal(op) => op.code_string(),
            Operation::ArrayCreation(op) => op.to_string(),
            Operation::ArrayElementSet(op) => op.to_string(),
            Operation::ReflectiveArrayCreation(op) => op.to_string(),
            Operation::UncheckedCast(op) => op.to_string(),
            Operation::Plus(_) => "+".to_string(),
        }
    }

    /// Exact number of runtime arguments, receiver included.
    pub fn arity(&self) -> usize {
        match self {
            Operation::Constructor(op) => op.arity(),
            Operation::Method(op) => op.arity(),
            Operation::FieldGet(op) => op.arity(),
            Operation::FieldSet(op) => op.arity(),
            Operation::EnumConstant(_) | Operation::Literal(_) => 0,
            Operation::ArrayCreation(op) => op.length(),
            Operation::ArrayElementSet(_) => 3,
            Operation::ReflectiveArrayCreation(_) | Operation::UncheckedCast(_) => 1,
            Operation::Plus(_) => 2,
        }
    }

    /// Whether the first input is a receiver.
    pub fn has_receiver(&self) -> bool {
        match self {
            Operation::Method(op) => !op.is_static(),
            Operation::FieldGet(op) => !op.field().is_static(),
            Operation::FieldSet(op) => !op.field().is_static(),
            _ => false,
        }
    }

    /// Static method or static field access.
    pub fn is_static(&self) -> bool {
        match self {
            Operation::Method(op) => op.is_static(),
            Operation::FieldGet(op) => op.field().is_static(),
            Operation::FieldSet(op) => op.field().is_static(),
            _ => false,
        }
    }

    /// Method or constructor call.
    pub fn is_message(&self) -> bool {
        matches!(self, Operation::Method(_) | Operation::Constructor(_))
    }

    /// Method call.
    pub fn is_method_call(&self) -> bool {
        matches!(self, Operation::Method(_))
    }

    /// Constructor call.
    pub fn is_constructor_call(&self) -> bool {
        matches!(self, Operation::Constructor(_))
    }

    /// Read of a `static final` field.
    pub fn is_constant_field(&self) -> bool {
        matches!(self, Operation::FieldGet(op) if op.field().is_static() && op.field().is_final())
    }

    /// Literal value.
    pub fn is_nonreceiving_value(&self) -> bool {
        matches!(self, Operation::Literal(_))
    }

    /// Unchecked cast.
    pub fn is_unchecked_cast(&self) -> bool {
        matches!(self, Operation::UncheckedCast(_))
    }

    /// Whether the underlying reflective member passes `predicate`.
    pub fn satisfies(&self, predicate: &dyn ReflectionPredicate) -> bool {
        match self {
            Operation::Constructor(op) => predicate.test_constructor(op.constructor()),
            Operation::Method(op) => predicate.test_method(op.method()),
            Operation::FieldGet(op) => predicate.test_field(op.field()),
            Operation::FieldSet(op) => predicate.test_field(op.field()),
            _ => true,
        }
    }

    /// Execute on `inputs`.
    ///
    /// # Panics
    ///
    /// If `inputs.len()` differs from [`Operation::arity`].
    pub fn execute(&self, inputs: &[Value], registry: &ClassRegistry) -> InternalResult<ExecutionOutcome> {
        assert_eq!(
            inputs.len(),
            self.arity(),
            "{} expects {} inputs",
            self,
            self.arity()
        );
        match self {
            Operation::Constructor(op) => op.execute(inputs, registry),
            Operation::Method(op) => op.execute(inputs, registry),
            Operation::FieldGet(op) => op.execute(inputs, registry),
            Operation::FieldSet(op) => op.execute(inputs, registry),
            Operation::EnumConstant(op) => Ok(op.execute()),
            Operation::Literal(op) => Ok(op.execute()),
            Operation::ArrayCreation(op) => Ok(op.execute(inputs)),
            Operation::ArrayElementSet(op) => Ok(op.execute(inputs, registry)),
            Operation::ReflectiveArrayCreation(op) => Ok(op.execute(inputs)),
            Operation::UncheckedCast(op) => Ok(op.execute(inputs, registry)),
            Operation::Plus(op) => Ok(op.execute(inputs)),
        }
    }

    /// Append the Java expression applying this operation to `args`.
    pub fn append_code(
        &self,
        declaring: Option<&Type>,
        inputs: &TypeTuple,
        args: &[CodeArgument],
        out: &mut String,
    ) {
        match self {
            Operation::Constructor(op) => op.append_code(declaring, inputs, args, out),
            Operation::Method(op) => op.append_code(declaring, inputs, args, out),
            Operation::FieldGet(op) => op.append_code(declaring, args, out),
            Operation::FieldSet(op) => op.append_code(declaring, inputs, args, out),
            Operation::EnumConstant(op) => op.append_code(declaring, out),
            Operation::Literal(op) => out.push_str(&op.code_string()),
            Operation::ArrayCreation(op) => op.append_code(args, out),
            Operation::ArrayElementSet(op) => op.append_code(inputs, args, out),
            Operation::ReflectiveArrayCreation(op) => op.append_code(args, out),
            Operation::UncheckedCast(op) => op.append_code(args, out),
            Operation::Plus(op) => op.append_code(inputs, args, out),
        }
    }

    /// Description following the tag in the persisted form.
    pub fn description(&self, declaring: Option<&Type>) -> String {
        match self {
            Operation::Constructor(op) => op.description(declaring),
            Operation::Method(op) => op.description(declaring),
            Operation::FieldGet(op) => op.description(declaring),
            Operation::FieldSet(op) => op.description(declaring),
            Operation::EnumConstant(op) => op.description(),
            Operation::Literal(op) => op.description(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Constructor(op) => write!(f, "{}", op),
            Operation::Method(op) => write!(f, "{}", op),
            Operation::FieldGet(op) => write!(f, "{}", op),
            Operation::FieldSet(op) => write!(f, "{}", op),
            Operation::EnumConstant(op) => write!(f, "{}", op),
            Operation::Literal(op) => write!(f, "{}", op),
            Operation::ArrayCreation(op) => write!(f, "{}", op),
            Operation::ArrayElementSet(op) => write!(f, "{}", op),
            Operation::ReflectiveArrayCreation(op) => write!(f, "{}", op),
            Operation::UncheckedCast(op) => write!(f, "{}", op),
            Operation::Plus(op) => write!(f, "{}", op),
        }
    }
}
