//! Host-populated model of the runtime under test.
//!
//! Classes are described once by the host (or the built-in [`jdk`] module),
//! registered with a [`ClassCatalog`], and frozen into a [`ClassRegistry`]
//! that parsing and execution consult.

pub mod catalog;
pub mod class;
pub mod jdk;
pub mod value;

pub use catalog::{ClassCatalog, ClassRegistry};
pub use class::{
    CallFrame, ClassDef, ClassKind, ConstructorDef, FieldDef, InvocationError, MethodDef,
    Modifiers, NativeFn,
};
pub use value::{ArrayRef, EnumTag, ObjectRef, Throwable, Value};
