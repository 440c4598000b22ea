//! Class definitions and reflective member handles.
//!
//! Handles are immutable capability tokens: a signature plus a native body.
//! The only mutable bit is the accessibility flag, which is flipped once and
//! idempotently, and static field storage.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::BitOr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use thiserror::Error;

use super::catalog::ClassRegistry;
use super::jdk;
use super::value::{ObjectRef, Throwable, Value};
use crate::types::{Type, TypeArgument, TypeVariable, OBJECT};

/// Failure of a reflective call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationError {
    /// The invoked code threw.
    #[error("invocation target threw {0}")]
    Target(Throwable),

    /// The reflective machinery rejected the call (bad arguments, abstract
    /// target, illegal access).
    #[error("{0}")]
    Reflection(String),
}

/// Arguments handed to a native body.
pub struct CallFrame<'a> {
    /// Registry the call runs against.
    pub registry: &'a ClassRegistry,
    /// Receiver for instance members and constructors.
    pub receiver: Option<&'a Value>,
    /// Arguments after invocation conversion.
    pub args: &'a [Value],
}

static NULL_VALUE: Value = Value::Null;

impl CallFrame<'_> {
    /// Argument at `index`, or null when absent.
    pub fn arg(&self, index: usize) -> &Value {
        self.args.get(index).unwrap_or(&NULL_VALUE)
    }

    /// Receiver as an object; a null receiver raises `NullPointerException`.
    pub fn this(&self) -> Result<&ObjectRef, Throwable> {
        match self.receiver {
            Some(Value::Object(obj)) => Ok(obj),
            _ => Err(Throwable::new(jdk::NULL_POINTER_EXCEPTION)),
        }
    }

    /// Receiver as a plain value.
    pub fn receiver_value(&self) -> &Value {
        self.receiver.unwrap_or(&NULL_VALUE)
    }

    /// `int` argument at `index`.
    pub fn int_arg(&self, index: usize) -> Result<i32, Throwable> {
        self.arg(index).as_int().ok_or_else(|| {
            Throwable::with_message(
                jdk::ILLEGAL_ARGUMENT_EXCEPTION,
                format!("argument {} is not an int", index),
            )
        })
    }
}

/// Native implementation of a constructor or method.
pub type NativeFn = Arc<dyn Fn(&CallFrame<'_>) -> Result<Value, Throwable> + Send + Sync>;

/// Java access and property modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(u16);

impl Modifiers {
    /// `public`
    pub const PUBLIC: Modifiers = Modifiers(0x0001);
    /// `private`
    pub const PRIVATE: Modifiers = Modifiers(0x0002);
    /// `protected`
    pub const PROTECTED: Modifiers = Modifiers(0x0004);
    /// `static`
    pub const STATIC: Modifiers = Modifiers(0x0008);
    /// `final`
    pub const FINAL: Modifiers = Modifiers(0x0010);
    /// `abstract`
    pub const ABSTRACT: Modifiers = Modifiers(0x0400);

    /// No modifiers (package-private).
    pub const fn empty() -> Self {
        Modifiers(0)
    }

    /// Whether all bits of `other` are set.
    pub fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    /// `public`?
    pub fn is_public(self) -> bool {
        self.contains(Self::PUBLIC)
    }

    /// `static`?
    pub fn is_static(self) -> bool {
        self.contains(Self::STATIC)
    }

    /// `final`?
    pub fn is_final(self) -> bool {
        self.contains(Self::FINAL)
    }

    /// `abstract`?
    pub fn is_abstract(self) -> bool {
        self.contains(Self::ABSTRACT)
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

fn signature_of(declaring: &str, name: &str, parameters: &[Type]) -> String {
    let params: Vec<String> = parameters.iter().map(|p| p.erasure().binary_name()).collect();
    format!("{}.{}({})", declaring, name, params.join(","))
}

/// Non-public members are reachable only after `set_accessible`.
fn check_access(
    modifiers: Modifiers,
    accessible: &AtomicBool,
    member: impl FnOnce() -> String,
) -> Result<(), InvocationError> {
    if modifiers.is_public() || accessible.load(Ordering::Acquire) {
        return Ok(());
    }
    Err(InvocationError::Reflection(format!(
        "cannot access non-public member {}",
        member()
    )))
}

/// Apply method invocation conversion to `args` against erased `parameters`.
pub(crate) fn convert_arguments(
    registry: &ClassRegistry,
    parameters: &[Type],
    args: &[Value],
) -> Result<Vec<Value>, InvocationError> {
    if parameters.len() != args.len() {
        return Err(InvocationError::Reflection(format!(
            "wrong number of arguments: expected {}, got {}",
            parameters.len(),
            args.len()
        )));
    }
    parameters
        .iter()
        .zip(args)
        .map(|(param, arg)| {
            let param = param.erasure();
            // unboxing a null argument throws inside the callee
            if param.is_primitive() && arg.is_null() {
                return Err(InvocationError::Target(Throwable::new(jdk::NULL_POINTER_EXCEPTION)));
            }
            let converted = match param.as_primitive() {
                Some(primitive) => arg.widen_to(primitive),
                None if arg.is_null() || registry.is_instance(arg, &param) => Some(arg.clone()),
                None => None,
            };
            converted.ok_or_else(|| {
                InvocationError::Reflection(format!(
                    "argument type mismatch: {} is not a {}",
                    arg.runtime_class_name().unwrap_or_else(|| "null".to_string()),
                    param
                ))
            })
        })
        .collect()
}

/// Reflective constructor handle.
pub struct ConstructorDef {
    declaring_class: String,
    parameter_types: Vec<Type>,
    modifiers: Modifiers,
    body: NativeFn,
    accessible: AtomicBool,
}

impl ConstructorDef {
    /// Public constructor with the given (generic) parameter types.
    pub fn new<F>(parameter_types: Vec<Type>, body: F) -> Self
    where
        F: Fn(&CallFrame<'_>) -> Result<Value, Throwable> + Send + Sync + 'static,
    {
        Self {
            declaring_class: String::new(),
            parameter_types,
            modifiers: Modifiers::PUBLIC,
            body: Arc::new(body),
            accessible: AtomicBool::new(false),
        }
    }

    /// Public no-argument constructor with an empty body.
    pub fn nullary() -> Self {
        Self::new(Vec::new(), |_| Ok(Value::Null))
    }

    /// Replace the modifiers.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Binary name of the declaring class.
    pub fn declaring_class(&self) -> &str {
        &self.declaring_class
    }

    /// Declared parameter types (for inner classes the outer instance comes
    /// first).
    pub fn parameter_types(&self) -> &[Type] {
        &self.parameter_types
    }

    /// Modifiers.
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// `pkg.C.<init>(types)`
    pub fn signature(&self) -> String {
        signature_of(&self.declaring_class, "<init>", &self.parameter_types)
    }

    /// Allow reflective access. Idempotent.
    pub fn set_accessible(&self) {
        self.accessible.store(true, Ordering::Release);
    }

    /// Whether [`ConstructorDef::set_accessible`] has been called.
    pub fn is_accessible(&self) -> bool {
        self.accessible.load(Ordering::Acquire)
    }

    /// Allocate and initialize a new instance.
    pub fn invoke(&self, registry: &ClassRegistry, args: &[Value]) -> Result<Value, InvocationError> {
        check_access(self.modifiers, &self.accessible, || self.signature())?;
        let class = registry.get(&self.declaring_class).ok_or_else(|| {
            InvocationError::Reflection(format!("unknown class {}", self.declaring_class))
        })?;
        if class.is_abstract() {
            return Err(InvocationError::Reflection(format!(
                "cannot instantiate abstract type {}",
                self.declaring_class
            )));
        }
        let args = convert_arguments(registry, &self.parameter_types, args)?;
        let object = Value::Object(registry.allocate(class));
        let frame = CallFrame {
            registry,
            receiver: Some(&object),
            args: &args,
        };
        (self.body)(&frame).map_err(InvocationError::Target)?;
        Ok(object)
    }
}

impl PartialEq for ConstructorDef {
    fn eq(&self, other: &Self) -> bool {
        self.signature() == other.signature()
    }
}

impl Eq for ConstructorDef {}

impl Hash for ConstructorDef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.signature().hash(state);
    }
}

impl fmt::Debug for ConstructorDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDef")
            .field("signature", &self.signature())
            .field("modifiers", &self.modifiers)
            .finish()
    }
}

/// Reflective method handle.
pub struct MethodDef {
    declaring_class: String,
    name: String,
    type_parameters: Vec<TypeVariable>,
    parameter_types: Vec<Type>,
    return_type: Type,
    modifiers: Modifiers,
    body: Option<NativeFn>,
    accessible: AtomicBool,
}

impl MethodDef {
    /// Public instance method with a native body.
    pub fn new<F>(name: impl Into<String>, parameter_types: Vec<Type>, return_type: Type, body: F) -> Self
    where
        F: Fn(&CallFrame<'_>) -> Result<Value, Throwable> + Send + Sync + 'static,
    {
        Self {
            declaring_class: String::new(),
            name: name.into(),
            type_parameters: Vec::new(),
            parameter_types,
            return_type,
            modifiers: Modifiers::PUBLIC,
            body: Some(Arc::new(body)),
            accessible: AtomicBool::new(false),
        }
    }

    /// Public abstract method without a body.
    pub fn abstract_method(name: impl Into<String>, parameter_types: Vec<Type>, return_type: Type) -> Self {
        Self {
            declaring_class: String::new(),
            name: name.into(),
            type_parameters: Vec::new(),
            parameter_types,
            return_type,
            modifiers: Modifiers::PUBLIC | Modifiers::ABSTRACT,
            body: None,
            accessible: AtomicBool::new(false),
        }
    }

    /// Mark as `static`.
    pub fn into_static(mut self) -> Self {
        self.modifiers = self.modifiers | Modifiers::STATIC;
        self
    }

    /// Replace the modifiers.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Declare method-level type parameters.
    pub fn with_type_parameters(mut self, type_parameters: Vec<TypeVariable>) -> Self {
        self.type_parameters = type_parameters;
        self
    }

    /// Binary name of the declaring class.
    pub fn declaring_class(&self) -> &str {
        &self.declaring_class
    }

    /// Method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Method-level type parameters.
    pub fn type_parameters(&self) -> &[TypeVariable] {
        &self.type_parameters
    }

    /// Declared (generic) parameter types.
    pub fn parameter_types(&self) -> &[Type] {
        &self.parameter_types
    }

    /// Declared (generic) return type.
    pub fn return_type(&self) -> &Type {
        &self.return_type
    }

    /// Modifiers.
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Whether the method is `static`.
    pub fn is_static(&self) -> bool {
        self.modifiers.is_static()
    }

    /// Whether the method has no body.
    pub fn is_abstract(&self) -> bool {
        self.body.is_none()
    }

    /// Erased parameter types.
    pub fn erased_parameter_types(&self) -> Vec<Type> {
        self.parameter_types.iter().map(Type::erasure).collect()
    }

    /// `pkg.C.m(types)` with erased parameter types.
    pub fn signature(&self) -> String {
        signature_of(&self.declaring_class, &self.name, &self.parameter_types)
    }

    /// Allow reflective access. Idempotent.
    pub fn set_accessible(&self) {
        self.accessible.store(true, Ordering::Release);
    }

    /// Whether [`MethodDef::set_accessible`] has been called.
    pub fn is_accessible(&self) -> bool {
        self.accessible.load(Ordering::Acquire)
    }

    /// Invoke on `receiver` (ignored for static methods), dispatching
    /// virtually on the receiver's runtime class.
    pub fn invoke(
        &self,
        registry: &ClassRegistry,
        receiver: &Value,
        args: &[Value],
    ) -> Result<Value, InvocationError> {
        check_access(self.modifiers, &self.accessible, || self.signature())?;
        let args = convert_arguments(registry, &self.parameter_types, args)?;
        if self.is_static() {
            let body = self.body.as_ref().ok_or_else(|| self.abstract_error())?;
            let frame = CallFrame {
                registry,
                receiver: None,
                args: &args,
            };
            return body(&frame).map_err(InvocationError::Target);
        }

        if receiver.is_null() {
            return Err(InvocationError::Target(Throwable::new(
                jdk::NULL_POINTER_EXCEPTION,
            )));
        }
        if !registry.is_instance(receiver, &Type::class(self.declaring_class.clone())) {
            return Err(InvocationError::Reflection(format!(
                "object is not an instance of declaring class {}",
                self.declaring_class
            )));
        }
        let runtime_class = receiver
            .runtime_class_name()
            .unwrap_or_else(|| OBJECT.to_string());
        let target: &MethodDef = registry
            .resolve_virtual(&runtime_class, &self.name, &self.erased_parameter_types())
            .map(|method| method.as_ref())
            .unwrap_or(self);
        let body = target.body.as_ref().ok_or_else(|| target.abstract_error())?;
        let frame = CallFrame {
            registry,
            receiver: Some(receiver),
            args: &args,
        };
        body(&frame).map_err(InvocationError::Target)
    }

    fn abstract_error(&self) -> InvocationError {
        InvocationError::Reflection(format!("abstract method {} has no body", self.signature()))
    }
}

impl PartialEq for MethodDef {
    fn eq(&self, other: &Self) -> bool {
        self.signature() == other.signature()
    }
}

impl Eq for MethodDef {}

impl Hash for MethodDef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.signature().hash(state);
    }
}

impl fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDef")
            .field("signature", &self.signature())
            .field("return_type", &self.return_type)
            .field("modifiers", &self.modifiers)
            .finish()
    }
}

/// Reflective field handle. Static storage lives on the handle.
#[derive(Debug)]
pub struct FieldDef {
    declaring_class: String,
    name: String,
    ty: Type,
    modifiers: Modifiers,
    static_value: RwLock<Value>,
    accessible: AtomicBool,
}

impl FieldDef {
    /// Public instance field.
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            declaring_class: String::new(),
            name: name.into(),
            static_value: RwLock::new(Value::zero(&ty)),
            ty,
            modifiers: Modifiers::PUBLIC,
            accessible: AtomicBool::new(false),
        }
    }

    /// Public static field with an initial value.
    pub fn static_field(name: impl Into<String>, ty: Type, value: Value) -> Self {
        let mut field = Self::new(name, ty);
        field.modifiers = Modifiers::PUBLIC | Modifiers::STATIC;
        field.static_value = RwLock::new(value);
        field
    }

    /// Public `static final` constant.
    pub fn constant(name: impl Into<String>, ty: Type, value: Value) -> Self {
        let mut field = Self::static_field(name, ty, value);
        field.modifiers = field.modifiers | Modifiers::FINAL;
        field
    }

    /// Replace the modifiers.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Binary name of the declaring class.
    pub fn declaring_class(&self) -> &str {
        &self.declaring_class
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type.
    pub fn field_type(&self) -> &Type {
        &self.ty
    }

    /// Modifiers.
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Whether the field is `static`.
    pub fn is_static(&self) -> bool {
        self.modifiers.is_static()
    }

    /// Whether the field is `final`.
    pub fn is_final(&self) -> bool {
        self.modifiers.is_final()
    }

    /// Allow reflective access. Idempotent.
    pub fn set_accessible(&self) {
        self.accessible.store(true, Ordering::Release);
    }

    /// Whether [`FieldDef::set_accessible`] has been called.
    pub fn is_accessible(&self) -> bool {
        self.accessible.load(Ordering::Acquire)
    }

    /// Read the field of `receiver` (ignored for static fields).
    pub fn get(&self, registry: &ClassRegistry, receiver: &Value) -> Result<Value, InvocationError> {
        check_access(self.modifiers, &self.accessible, || self.qualified_name())?;
        if self.is_static() {
            return Ok(self.static_value.read().clone());
        }
        let object = self.instance(registry, receiver)?;
        Ok(object
            .get_field(&self.name)
            .unwrap_or_else(|| Value::zero(&self.ty)))
    }

    /// Write `value` into the field of `receiver` (ignored for static
    /// fields).
    pub fn set(
        &self,
        registry: &ClassRegistry,
        receiver: &Value,
        value: &Value,
    ) -> Result<(), InvocationError> {
        check_access(self.modifiers, &self.accessible, || self.qualified_name())?;
        if self.is_static() && self.is_final() {
            return Err(InvocationError::Reflection(format!(
                "cannot set static final field {}.{}",
                self.declaring_class, self.name
            )));
        }
        let mut converted = convert_arguments(registry, std::slice::from_ref(&self.ty), std::slice::from_ref(value))?;
        let value = converted.pop().unwrap_or(Value::Null);
        if self.is_static() {
            *self.static_value.write() = value;
            return Ok(());
        }
        let object = self.instance(registry, receiver)?;
        object.set_field(self.name.clone(), value);
        Ok(())
    }

    fn qualified_name(&self) -> String {
        format!("{}.{}", self.declaring_class, self.name)
    }

    fn instance<'v>(&self, registry: &ClassRegistry, receiver: &'v Value) -> Result<&'v ObjectRef, InvocationError> {
        match receiver {
            Value::Null => Err(InvocationError::Target(Throwable::new(
                jdk::NULL_POINTER_EXCEPTION,
            ))),
            Value::Object(object)
                if registry.is_subclass(object.class_name(), &self.declaring_class) =>
            {
                Ok(object)
            }
            other => Err(InvocationError::Reflection(format!(
                "cannot access field {}.{} on {}",
                self.declaring_class,
                self.name,
                other.runtime_class_name().unwrap_or_default()
            ))),
        }
    }
}

impl PartialEq for FieldDef {
    fn eq(&self, other: &Self) -> bool {
        self.declaring_class == other.declaring_class && self.name == other.name
    }
}

impl Eq for FieldDef {}

impl Hash for FieldDef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.declaring_class.hash(state);
        self.name.hash(state);
    }
}

/// Kind of type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    /// Ordinary class.
    Class,
    /// Interface.
    Interface,
    /// Enum type.
    Enum,
}

/// A class, interface or enum registered with the catalog.
#[derive(Debug)]
pub struct ClassDef {
    name: String,
    kind: ClassKind,
    modifiers: Modifiers,
    type_parameters: Vec<TypeVariable>,
    superclass: Option<Type>,
    interfaces: Vec<Type>,
    enclosing: Option<String>,
    constructors: Vec<Arc<ConstructorDef>>,
    methods: Vec<Arc<MethodDef>>,
    fields: Vec<Arc<FieldDef>>,
    enum_constants: Vec<String>,
    enum_values: OnceCell<Vec<ObjectRef>>,
}

impl ClassDef {
    fn declare(name: String, kind: ClassKind, modifiers: Modifiers, superclass: Option<Type>) -> Self {
        Self {
            name,
            kind,
            modifiers,
            type_parameters: Vec::new(),
            superclass,
            interfaces: Vec::new(),
            enclosing: None,
            constructors: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            enum_constants: Vec::new(),
            enum_values: OnceCell::new(),
        }
    }

    /// Public class extending `java.lang.Object`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let superclass = (name != OBJECT).then(Type::object);
        Self::declare(name, ClassKind::Class, Modifiers::PUBLIC, superclass)
    }

    /// Public interface.
    pub fn interface(name: impl Into<String>) -> Self {
        Self::declare(
            name.into(),
            ClassKind::Interface,
            Modifiers::PUBLIC | Modifiers::ABSTRACT,
            None,
        )
    }

    /// Public enum with the given constants, extending `java.lang.Enum<Self>`.
    pub fn enumeration(name: impl Into<String>, constants: &[&str]) -> Self {
        let name = name.into();
        let superclass = Type::generic(jdk::ENUM, vec![Type::class(name.clone())]);
        let mut def = Self::declare(
            name,
            ClassKind::Enum,
            Modifiers::PUBLIC | Modifiers::FINAL,
            Some(superclass),
        );
        def.enum_constants = constants.iter().map(|c| c.to_string()).collect();
        def
    }

    /// Replace the modifiers.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Declare the class type parameters.
    pub fn with_type_parameters(mut self, type_parameters: Vec<TypeVariable>) -> Self {
        self.type_parameters = type_parameters;
        self
    }

    /// Set the (possibly parameterized) superclass.
    pub fn extends(mut self, superclass: Type) -> Self {
        self.superclass = Some(superclass);
        self
    }

    /// Add a (possibly parameterized) superinterface.
    pub fn implements(mut self, interface: Type) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Make this a non-static member (inner) class of `outer`. Call before
    /// adding constructors: their first parameter becomes the outer instance.
    pub fn member_of(mut self, outer: impl Into<String>) -> Self {
        self.enclosing = Some(outer.into());
        self
    }

    /// Make this a static nested class of `outer`.
    pub fn nested_in(mut self, outer: impl Into<String>) -> Self {
        self.enclosing = Some(outer.into());
        self.modifiers = self.modifiers | Modifiers::STATIC;
        self
    }

    /// Add a constructor.
    pub fn constructor(mut self, mut ctor: ConstructorDef) -> Self {
        ctor.declaring_class = self.name.clone();
        if self.is_inner_class() {
            if let Some(outer) = &self.enclosing {
                ctor.parameter_types.insert(0, Type::class(outer.clone()));
            }
        }
        self.constructors.push(Arc::new(ctor));
        self
    }

    /// Add a method.
    pub fn method(mut self, mut method: MethodDef) -> Self {
        method.declaring_class = self.name.clone();
        self.methods.push(Arc::new(method));
        self
    }

    /// Add a field.
    pub fn field(mut self, mut field: FieldDef) -> Self {
        field.declaring_class = self.name.clone();
        self.fields.push(Arc::new(field));
        self
    }

    /// Binary name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declaration kind.
    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    /// Modifiers.
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Class type parameters.
    pub fn type_parameters(&self) -> &[TypeVariable] {
        &self.type_parameters
    }

    /// Generic superclass.
    pub fn superclass(&self) -> Option<&Type> {
        self.superclass.as_ref()
    }

    /// Generic superinterfaces.
    pub fn interfaces(&self) -> &[Type] {
        &self.interfaces
    }

    /// Binary name of the enclosing class for member classes.
    pub fn enclosing_class(&self) -> Option<&str> {
        self.enclosing.as_deref()
    }

    /// Declared constructors.
    pub fn constructors(&self) -> &[Arc<ConstructorDef>] {
        &self.constructors
    }

    /// Declared methods.
    pub fn methods(&self) -> &[Arc<MethodDef>] {
        &self.methods
    }

    /// Declared fields.
    pub fn fields(&self) -> &[Arc<FieldDef>] {
        &self.fields
    }

    /// Names of the enum constants, in ordinal order.
    pub fn enum_constant_names(&self) -> &[String] {
        &self.enum_constants
    }

    /// Whether this is an interface.
    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    /// Whether this is an enum.
    pub fn is_enum(&self) -> bool {
        self.kind == ClassKind::Enum
    }

    /// Whether instances cannot be created directly.
    pub fn is_abstract(&self) -> bool {
        self.is_interface() || self.is_enum() || self.modifiers.is_abstract()
    }

    /// Whether the class is `public`.
    pub fn is_public(&self) -> bool {
        self.modifiers.is_public()
    }

    /// Whether the class is declared inside another class.
    pub fn is_member_class(&self) -> bool {
        self.enclosing.is_some()
    }

    /// Whether this is a non-static member class, whose constructors take
    /// the outer instance.
    pub fn is_inner_class(&self) -> bool {
        self.is_member_class() && !self.modifiers.is_static() && !self.is_interface() && !self.is_enum()
    }

    /// The class type with its own type parameters as arguments, or the
    /// raw type when the class is not generic.
    pub fn this_type(&self) -> Type {
        Type::parameterized(
            self.name.clone(),
            self.type_parameters
                .iter()
                .cloned()
                .map(|var| TypeArgument::Type(Type::Variable(var)))
                .collect(),
        )
    }

    /// Raw class type.
    pub fn raw_type(&self) -> Type {
        Type::class(self.name.clone())
    }

    /// The enum constants as runtime objects; stable across calls.
    pub fn enum_values(&self) -> &[ObjectRef] {
        self.enum_values.get_or_init(|| {
            self.enum_constants
                .iter()
                .enumerate()
                .map(|(ordinal, name)| ObjectRef::enum_constant_of(self.name.clone(), name.clone(), ordinal))
                .collect()
        })
    }

    /// Enum constant by name.
    pub fn enum_constant(&self, name: &str) -> Option<ObjectRef> {
        self.enum_values()
            .iter()
            .find(|obj| obj.enum_constant().map(|tag| tag.name.as_str()) == Some(name))
            .cloned()
    }

    /// Declared method with the given name and erased parameter types.
    pub fn declared_method(&self, name: &str, erased: &[Type]) -> Option<&Arc<MethodDef>> {
        self.methods
            .iter()
            .find(|m| m.name() == name && m.erased_parameter_types() == erased)
    }

    /// Declared constructor with the given erased parameter types.
    pub fn declared_constructor(&self, erased: &[Type]) -> Option<&Arc<ConstructorDef>> {
        self.constructors.iter().find(|c| {
            c.parameter_types()
                .iter()
                .map(Type::erasure)
                .collect::<Vec<_>>()
                == erased
        })
    }

    /// Declared field by name.
    pub fn declared_field(&self, name: &str) -> Option<&Arc<FieldDef>> {
        self.fields.iter().find(|f| f.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_class_constructors_take_the_outer_instance() {
        let inner = ClassDef::new("pkg.Outer$Inner")
            .member_of("pkg.Outer")
            .constructor(ConstructorDef::new(vec![Type::INT], |_| Ok(Value::Null)));
        assert!(inner.is_inner_class());
        let ctor = &inner.constructors()[0];
        assert_eq!(ctor.parameter_types(), &[Type::class("pkg.Outer"), Type::INT]);
        assert_eq!(ctor.signature(), "pkg.Outer$Inner.<init>(pkg.Outer,int)");
    }

    #[test]
    fn static_nested_classes_are_not_inner() {
        let nested = ClassDef::new("pkg.Outer$Nested")
            .nested_in("pkg.Outer")
            .constructor(ConstructorDef::nullary());
        assert!(nested.is_member_class());
        assert!(!nested.is_inner_class());
        assert!(nested.constructors()[0].parameter_types().is_empty());
    }

    #[test]
    fn method_identity_is_the_erased_signature() {
        let def = ClassDef::new("pkg.Box")
            .with_type_parameters(vec![TypeVariable::new("T")])
            .method(MethodDef::new("put", vec![Type::variable("T")], Type::Void, |_| Ok(Value::Null)));
        let method = &def.methods()[0];
        assert_eq!(method.signature(), "pkg.Box.put(java.lang.Object)");
        assert!(def.declared_method("put", &[Type::object()]).is_some());
    }

    #[test]
    fn accessibility_flip_is_idempotent() {
        let field = FieldDef::new("x", Type::INT);
        assert!(!field.is_accessible());
        field.set_accessible();
        field.set_accessible();
        assert!(field.is_accessible());
    }

    #[test]
    fn non_public_members_need_accessibility() {
        let catalog = crate::reflect::ClassCatalog::new();
        let def = catalog.register(
            ClassDef::new("pkg.Hidden")
                .method(
                    MethodDef::new("secret", vec![], Type::INT, |_| Ok(Value::Int(7)))
                        .with_modifiers(Modifiers::PRIVATE | Modifiers::STATIC),
                )
                .field(FieldDef::new("count", Type::INT).with_modifiers(Modifiers::PRIVATE | Modifiers::STATIC)),
        );
        let registry = catalog.snapshot();
        let method = &def.methods()[0];
        let field = &def.fields()[0];

        assert!(matches!(
            method.invoke(&registry, &Value::Null, &[]),
            Err(InvocationError::Reflection(_))
        ));
        assert!(matches!(
            field.get(&registry, &Value::Null),
            Err(InvocationError::Reflection(_))
        ));

        method.set_accessible();
        field.set_accessible();
        assert_eq!(method.invoke(&registry, &Value::Null, &[]).unwrap(), Value::Int(7));
        field.set(&registry, &Value::Null, &Value::Int(3)).unwrap();
        assert_eq!(field.get(&registry, &Value::Null).unwrap(), Value::Int(3));
    }

    #[test]
    fn null_for_primitive_parameter_throws() {
        let registry = crate::reflect::ClassCatalog::new().snapshot();
        let result = convert_arguments(&registry, &[Type::INT], &[Value::Null]);
        match result {
            Err(InvocationError::Target(exception)) => {
                assert_eq!(exception.class_name, jdk::NULL_POINTER_EXCEPTION)
            }
            other => panic!("expected a thrown exception, got {:?}", other),
        }
        assert_eq!(
            convert_arguments(&registry, &[Type::object()], &[Value::Null]).unwrap(),
            vec![Value::Null]
        );
    }

    #[test]
    fn enum_values_are_stable() {
        let def = ClassDef::enumeration("pkg.Color", &["RED", "GREEN"]);
        let first = def.enum_constant("GREEN").unwrap();
        let second = def.enum_constant("GREEN").unwrap();
        assert!(first.ptr_eq(&second));
        assert_eq!(first.enum_constant().unwrap().ordinal, 1);
        assert!(def.enum_constant("BLUE").is_none());
    }
}
