//! Runtime values flowing between executed statements.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

use crate::types::{PrimitiveType, Type, CLASS, STRING};

/// A value of the program under test.
///
/// Primitive variants double as their boxed forms. Strings compare by
/// content, objects and arrays by identity.
#[derive(Debug, Clone)]
pub enum Value {
    /// The null reference.
    Null,
    /// `boolean` / `java.lang.Boolean`
    Boolean(bool),
    /// `byte` / `java.lang.Byte`
    Byte(i8),
    /// `short` / `java.lang.Short`
    Short(i16),
    /// `int` / `java.lang.Integer`
    Int(i32),
    /// `long` / `java.lang.Long`
    Long(i64),
    /// `float` / `java.lang.Float`
    Float(f32),
    /// `double` / `java.lang.Double`
    Double(f64),
    /// `char` / `java.lang.Character` (a UTF-16 code unit)
    Char(u16),
    /// `java.lang.String`
    String(String),
    /// A `java.lang.Class` literal.
    Class(Type),
    /// Heap object.
    Object(ObjectRef),
    /// Array.
    Array(ArrayRef),
}

impl Value {
    /// Whether this is the null reference.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Primitive kind of a primitive (or boxed) value.
    pub fn primitive_type(&self) -> Option<PrimitiveType> {
        Some(match self {
            Value::Boolean(_) => PrimitiveType::Boolean,
            Value::Byte(_) => PrimitiveType::Byte,
            Value::Short(_) => PrimitiveType::Short,
            Value::Int(_) => PrimitiveType::Int,
            Value::Long(_) => PrimitiveType::Long,
            Value::Float(_) => PrimitiveType::Float,
            Value::Double(_) => PrimitiveType::Double,
            Value::Char(_) => PrimitiveType::Char,
            _ => return None,
        })
    }

    /// Binary name of the runtime class; `None` for null.
    pub fn runtime_class_name(&self) -> Option<String> {
        if let Some(primitive) = self.primitive_type() {
            return Some(primitive.boxed_name().to_string());
        }
        match self {
            Value::String(_) => Some(STRING.to_string()),
            Value::Class(_) => Some(CLASS.to_string()),
            Value::Object(obj) => Some(obj.class_name().to_string()),
            Value::Array(array) => Some(Type::array(array.component().clone()).binary_name()),
            _ => None,
        }
    }

    /// Default value of a field or array slot of type `ty`.
    pub fn zero(ty: &Type) -> Value {
        match ty.as_primitive() {
            Some(PrimitiveType::Boolean) => Value::Boolean(false),
            Some(PrimitiveType::Byte) => Value::Byte(0),
            Some(PrimitiveType::Short) => Value::Short(0),
            Some(PrimitiveType::Int) => Value::Int(0),
            Some(PrimitiveType::Long) => Value::Long(0),
            Some(PrimitiveType::Float) => Value::Float(0.0),
            Some(PrimitiveType::Double) => Value::Double(0.0),
            Some(PrimitiveType::Char) => Value::Char(0),
            None => Value::Null,
        }
    }

    /// Apply identity or widening primitive conversion.
    pub fn widen_to(&self, target: PrimitiveType) -> Option<Value> {
        let source = self.primitive_type()?;
        if !source.widens_to(target) {
            return None;
        }
        if source == target {
            return Some(self.clone());
        }
        let integral = self.integral();
        let floating = match self {
            Value::Float(f) => Some(*f as f64),
            Value::Double(d) => Some(*d),
            _ => None,
        };
        Some(match target {
            PrimitiveType::Short => Value::Short(integral? as i16),
            PrimitiveType::Int => Value::Int(integral? as i32),
            PrimitiveType::Long => Value::Long(integral?),
            PrimitiveType::Float => Value::Float(match integral {
                Some(i) => i as f32,
                None => floating? as f32,
            }),
            PrimitiveType::Double => Value::Double(match integral {
                Some(i) => i as f64,
                None => floating?,
            }),
            PrimitiveType::Boolean | PrimitiveType::Byte | PrimitiveType::Char => return None,
        })
    }

    fn integral(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(*v as i64),
            Value::Short(v) => Some(*v as i64),
            Value::Int(v) => Some(*v as i64),
            Value::Long(v) => Some(*v),
            Value::Char(v) => Some(*v as i64),
            _ => None,
        }
    }

    /// `int` payload.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// `boolean` payload.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// String payload.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(text) => Some(text),
            _ => None,
        }
    }

    /// Object payload.
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Array payload.
    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Class(a), Value::Class(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(v) => v.hash(state),
            Value::Byte(v) => v.hash(state),
            Value::Short(v) => v.hash(state),
            Value::Int(v) => v.hash(state),
            Value::Long(v) => v.hash(state),
            Value::Float(v) => v.to_bits().hash(state),
            Value::Double(v) => v.to_bits().hash(state),
            Value::Char(v) => v.hash(state),
            Value::String(v) => v.hash(state),
            Value::Class(v) => v.hash(state),
            Value::Object(v) => v.id().hash(state),
            Value::Array(v) => v.id().hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Short(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{:?}", v),
            Value::Double(v) => write!(f, "{:?}", v),
            Value::Char(v) => match char::from_u32(*v as u32) {
                Some(ch) => write!(f, "{}", ch),
                None => write!(f, "\\u{:04x}", v),
            },
            Value::String(v) => f.write_str(v),
            Value::Class(ty) => {
                if ty.is_primitive() {
                    write!(f, "{}", ty)
                } else {
                    write!(f, "class {}", ty.binary_name())
                }
            }
            Value::Object(obj) => match obj.enum_constant() {
                Some(tag) => f.write_str(&tag.name),
                None => write!(f, "{}@{}", obj.class_name(), obj.short_id()),
            },
            Value::Array(array) => write!(
                f,
                "{}@{}",
                Type::array(array.component().clone()).binary_name(),
                array.short_id()
            ),
        }
    }
}

/// Enum-constant identity carried by enum instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumTag {
    /// Constant name.
    pub name: String,
    /// Declaration ordinal.
    pub ordinal: usize,
}

type NativeSlot = RwLock<Option<Box<dyn Any + Send + Sync>>>;

struct ObjectData {
    id: Uuid,
    class_name: String,
    fields: RwLock<BTreeMap<String, Value>>,
    enum_tag: Option<EnumTag>,
    native: NativeSlot,
}

/// Shared handle to a heap object.
#[derive(Clone)]
pub struct ObjectRef(Arc<ObjectData>);

impl ObjectRef {
    /// Allocate an object of `class_name` with the given field slots.
    pub fn new(class_name: impl Into<String>, fields: BTreeMap<String, Value>) -> Self {
        Self::build(class_name.into(), fields, None)
    }

    /// Allocate an enum constant.
    pub fn enum_constant_of(class_name: impl Into<String>, name: impl Into<String>, ordinal: usize) -> Self {
        Self::build(
            class_name.into(),
            BTreeMap::new(),
            Some(EnumTag {
                name: name.into(),
                ordinal,
            }),
        )
    }

    fn build(class_name: String, fields: BTreeMap<String, Value>, enum_tag: Option<EnumTag>) -> Self {
        Self(Arc::new(ObjectData {
            id: Uuid::new_v4(),
            class_name,
            fields: RwLock::new(fields),
            enum_tag,
            native: RwLock::new(None),
        }))
    }

    /// Identity of this object.
    pub fn id(&self) -> Uuid {
        self.0.id
    }

    fn short_id(&self) -> String {
        self.0.id.simple().to_string()[..8].to_string()
    }

    /// Binary name of the runtime class.
    pub fn class_name(&self) -> &str {
        &self.0.class_name
    }

    /// Whether both handles point at the same object.
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Enum-constant tag, if this object is an enum constant.
    pub fn enum_constant(&self) -> Option<&EnumTag> {
        self.0.enum_tag.as_ref()
    }

    /// Read a field slot.
    pub fn get_field(&self, name: &str) -> Option<Value> {
        self.0.fields.read().get(name).cloned()
    }

    /// Write a field slot.
    pub fn set_field(&self, name: impl Into<String>, value: Value) {
        self.0.fields.write().insert(name.into(), value);
    }

    /// Attach host-side state (e.g. the backing store of a collection).
    pub fn set_native<T: Any + Send + Sync>(&self, data: T) {
        *self.0.native.write() = Some(Box::new(data));
    }

    /// Read host-side state of type `T`.
    pub fn with_native<T: Any, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let guard = self.0.native.read();
        guard.as_ref()?.downcast_ref::<T>().map(f)
    }

    /// Mutate host-side state of type `T`.
    pub fn with_native_mut<T: Any, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut guard = self.0.native.write();
        guard.as_mut()?.downcast_mut::<T>().map(f)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRef")
            .field("id", &self.0.id)
            .field("class", &self.0.class_name)
            .field("enum", &self.0.enum_tag)
            .finish()
    }
}

struct ArrayData {
    id: Uuid,
    component: Type,
    elements: RwLock<Vec<Value>>,
}

/// Shared handle to an array.
#[derive(Clone)]
pub struct ArrayRef(Arc<ArrayData>);

impl ArrayRef {
    /// Array of `component` holding `elements`.
    pub fn new(component: Type, elements: Vec<Value>) -> Self {
        Self(Arc::new(ArrayData {
            id: Uuid::new_v4(),
            component,
            elements: RwLock::new(elements),
        }))
    }

    /// Array of `length` default-initialized slots.
    pub fn with_length(component: Type, length: usize) -> Self {
        let zero = Value::zero(&component);
        Self::new(component, vec![zero; length])
    }

    /// Identity of this array.
    pub fn id(&self) -> Uuid {
        self.0.id
    }

    fn short_id(&self) -> String {
        self.0.id.simple().to_string()[..8].to_string()
    }

    /// Whether both handles point at the same array.
    pub fn ptr_eq(&self, other: &ArrayRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Component type.
    pub fn component(&self) -> &Type {
        &self.0.component
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.0.elements.read().len()
    }

    /// Whether the array has no slots.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`.
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.elements.read().get(index).cloned()
    }

    /// Store `value` at `index`; false when out of bounds.
    pub fn set(&self, index: usize, value: Value) -> bool {
        let mut elements = self.0.elements.write();
        match elements.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Copy of the elements.
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.elements.read().clone()
    }
}

impl fmt::Debug for ArrayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayRef")
            .field("id", &self.0.id)
            .field("component", &self.0.component)
            .field("elements", &*self.0.elements.read())
            .finish()
    }
}

/// An exception raised by the program under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Throwable {
    /// Binary name of the exception class.
    pub class_name: String,
    /// Detail message.
    pub message: Option<String>,
    /// Cause, if chained.
    pub cause: Option<Box<Throwable>>,
}

impl Throwable {
    /// Exception without a message.
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            message: None,
            cause: None,
        }
    }

    /// Exception with a detail message.
    pub fn with_message(class_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            message: Some(message.into()),
            cause: None,
        }
    }

    /// Chain a cause.
    pub fn caused_by(mut self, cause: Throwable) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Simple name of the exception class.
    pub fn simple_name(&self) -> &str {
        let cut = self
            .class_name
            .rfind(|c| c == '.' || c == '$')
            .map(|idx| idx + 1)
            .unwrap_or(0);
        &self.class_name[cut..]
    }
}

impl fmt::Display for Throwable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.class_name, message)?,
            None => f.write_str(&self.class_name)?,
        }
        if let Some(cause) = &self.cause {
            write!(f, " (caused by {})", cause)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floating_values_compare_by_bits() {
        assert_eq!(Value::Double(f64::NAN), Value::Double(f64::NAN));
        assert_ne!(Value::Double(0.0), Value::Double(-0.0));
        assert_ne!(Value::Int(1), Value::Long(1));
    }

    #[test]
    fn objects_compare_by_identity() {
        let a = ObjectRef::new("pkg.A", BTreeMap::new());
        let b = ObjectRef::new("pkg.A", BTreeMap::new());
        assert_eq!(Value::Object(a.clone()), Value::Object(a.clone()));
        assert_ne!(Value::Object(a), Value::Object(b));
    }

    #[test]
    fn widening_converts_payloads() {
        assert_eq!(Value::Byte(-3).widen_to(PrimitiveType::Long), Some(Value::Long(-3)));
        assert_eq!(Value::Char(65).widen_to(PrimitiveType::Int), Some(Value::Int(65)));
        assert_eq!(Value::Float(1.5).widen_to(PrimitiveType::Double), Some(Value::Double(1.5)));
        assert_eq!(Value::Int(1).widen_to(PrimitiveType::Short), None);
        assert_eq!(Value::Boolean(true).widen_to(PrimitiveType::Int), None);
    }

    #[test]
    fn native_payload_round_trips() {
        let obj = ObjectRef::new("java.util.ArrayList", BTreeMap::new());
        obj.set_native(Vec::<Value>::new());
        obj.with_native_mut(|items: &mut Vec<Value>| items.push(Value::Int(4)));
        assert_eq!(obj.with_native(|items: &Vec<Value>| items.len()), Some(1));
        assert_eq!(obj.with_native(|s: &String| s.len()), None);
    }

    #[test]
    fn arrays_default_initialize() {
        let array = ArrayRef::with_length(Type::INT, 3);
        assert_eq!(array.to_vec(), vec![Value::Int(0); 3]);
        assert!(array.set(2, Value::Int(9)));
        assert!(!array.set(3, Value::Int(9)));
        assert_eq!(array.get(2), Some(Value::Int(9)));
    }
}
