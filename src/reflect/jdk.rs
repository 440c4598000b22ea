//! Built-in platform classes.
//!
//! A small model of `java.lang` and `java.util`: enough for literals, boxing,
//! enum constants, the exception hierarchy the engine raises itself, and a
//! generic collection to exercise type substitution.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::catalog::ClassCatalog;
use super::class::{CallFrame, ClassDef, ConstructorDef, FieldDef, MethodDef, Modifiers};
use super::value::{Throwable, Value};
use crate::types::{PrimitiveType, Type, TypeVariable, CLASS, OBJECT, STRING};

/// `java.lang.Number`
pub const NUMBER: &str = "java.lang.Number";
/// `java.lang.Comparable`
pub const COMPARABLE: &str = "java.lang.Comparable";
/// `java.lang.Enum`
pub const ENUM: &str = "java.lang.Enum";
/// `java.lang.Cloneable`
pub const CLONEABLE: &str = "java.lang.Cloneable";
/// `java.io.Serializable`
pub const SERIALIZABLE: &str = "java.io.Serializable";
/// `java.lang.Thread`
pub const THREAD: &str = "java.lang.Thread";
/// `java.lang.Thread$State`
pub const THREAD_STATE: &str = "java.lang.Thread$State";
/// `java.util.Collection`
pub const COLLECTION: &str = "java.util.Collection";
/// `java.util.List`
pub const LIST: &str = "java.util.List";
/// `java.util.AbstractList`
pub const ABSTRACT_LIST: &str = "java.util.AbstractList";
/// `java.util.ArrayList`
pub const ARRAY_LIST: &str = "java.util.ArrayList";

/// `java.lang.Throwable`
pub const THROWABLE: &str = "java.lang.Throwable";
/// `java.lang.Exception`
pub const EXCEPTION: &str = "java.lang.Exception";
/// `java.lang.RuntimeException`
pub const RUNTIME_EXCEPTION: &str = "java.lang.RuntimeException";
/// `java.lang.Error`
pub const ERROR: &str = "java.lang.Error";
/// `java.lang.ThreadDeath`
pub const THREAD_DEATH: &str = "java.lang.ThreadDeath";
/// `java.lang.NullPointerException`
pub const NULL_POINTER_EXCEPTION: &str = "java.lang.NullPointerException";
/// `java.lang.ClassCastException`
pub const CLASS_CAST_EXCEPTION: &str = "java.lang.ClassCastException";
/// `java.lang.IllegalArgumentException`
pub const ILLEGAL_ARGUMENT_EXCEPTION: &str = "java.lang.IllegalArgumentException";
/// `java.lang.NumberFormatException`
pub const NUMBER_FORMAT_EXCEPTION: &str = "java.lang.NumberFormatException";
/// `java.lang.IllegalStateException`
pub const ILLEGAL_STATE_EXCEPTION: &str = "java.lang.IllegalStateException";
/// `java.lang.IndexOutOfBoundsException`
pub const INDEX_OUT_OF_BOUNDS_EXCEPTION: &str = "java.lang.IndexOutOfBoundsException";
/// `java.lang.ArrayIndexOutOfBoundsException`
pub const ARRAY_INDEX_OUT_OF_BOUNDS_EXCEPTION: &str = "java.lang.ArrayIndexOutOfBoundsException";
/// `java.lang.StringIndexOutOfBoundsException`
pub const STRING_INDEX_OUT_OF_BOUNDS_EXCEPTION: &str = "java.lang.StringIndexOutOfBoundsException";
/// `java.lang.ArrayStoreException`
pub const ARRAY_STORE_EXCEPTION: &str = "java.lang.ArrayStoreException";
/// `java.lang.NegativeArraySizeException`
pub const NEGATIVE_ARRAY_SIZE_EXCEPTION: &str = "java.lang.NegativeArraySizeException";
/// `java.lang.ArithmeticException`
pub const ARITHMETIC_EXCEPTION: &str = "java.lang.ArithmeticException";
/// `java.lang.UnsupportedOperationException`
pub const UNSUPPORTED_OPERATION_EXCEPTION: &str = "java.lang.UnsupportedOperationException";

/// Exception classes and their superclasses, parents first.
const EXCEPTIONS: &[(&str, &str)] = &[
    (THROWABLE, OBJECT),
    (EXCEPTION, THROWABLE),
    (ERROR, THROWABLE),
    (RUNTIME_EXCEPTION, EXCEPTION),
    (THREAD_DEATH, ERROR),
    (NULL_POINTER_EXCEPTION, RUNTIME_EXCEPTION),
    (CLASS_CAST_EXCEPTION, RUNTIME_EXCEPTION),
    (ILLEGAL_ARGUMENT_EXCEPTION, RUNTIME_EXCEPTION),
    (NUMBER_FORMAT_EXCEPTION, ILLEGAL_ARGUMENT_EXCEPTION),
    (ILLEGAL_STATE_EXCEPTION, RUNTIME_EXCEPTION),
    (INDEX_OUT_OF_BOUNDS_EXCEPTION, RUNTIME_EXCEPTION),
    (ARRAY_INDEX_OUT_OF_BOUNDS_EXCEPTION, INDEX_OUT_OF_BOUNDS_EXCEPTION),
    (STRING_INDEX_OUT_OF_BOUNDS_EXCEPTION, INDEX_OUT_OF_BOUNDS_EXCEPTION),
    (ARRAY_STORE_EXCEPTION, RUNTIME_EXCEPTION),
    (NEGATIVE_ARRAY_SIZE_EXCEPTION, RUNTIME_EXCEPTION),
    (ARITHMETIC_EXCEPTION, RUNTIME_EXCEPTION),
    (UNSUPPORTED_OPERATION_EXCEPTION, RUNTIME_EXCEPTION),
];

/// Field holding an exception object's detail message.
const DETAIL_MESSAGE: &str = "detailMessage";

/// Register the built-in classes with `catalog`.
pub fn install(catalog: &ClassCatalog) {
    catalog.register(object_class());
    catalog.register(ClassDef::interface(CLONEABLE));
    catalog.register(ClassDef::interface(SERIALIZABLE));
    catalog.register(
        ClassDef::interface(COMPARABLE)
            .with_type_parameters(vec![TypeVariable::new("T")])
            .method(MethodDef::abstract_method(
                "compareTo",
                vec![Type::variable("T")],
                Type::INT,
            )),
    );
    catalog.register(string_class());
    catalog.register(class_class());
    catalog.register(number_class());
    for primitive in PrimitiveType::ALL {
        catalog.register(boxed_class(primitive));
    }
    catalog.register(enum_class());
    catalog.register(ClassDef::new(THREAD));
    catalog.register(
        ClassDef::enumeration(
            THREAD_STATE,
            &["NEW", "RUNNABLE", "BLOCKED", "WAITING", "TIMED_WAITING", "TERMINATED"],
        )
        .nested_in(THREAD),
    );
    for (name, parent) in EXCEPTIONS {
        catalog.register(exception_class(name, parent));
    }
    for def in collection_classes() {
        catalog.register(def);
    }
}

fn throw(class_name: &str, message: impl Into<String>) -> Throwable {
    Throwable::with_message(class_name, message)
}

fn npe() -> Throwable {
    Throwable::new(NULL_POINTER_EXCEPTION)
}

fn object_class() -> ClassDef {
    ClassDef::new(OBJECT)
        .constructor(ConstructorDef::nullary())
        .method(MethodDef::new(
            "equals",
            vec![Type::object()],
            Type::BOOLEAN,
            |frame| Ok(Value::Boolean(frame.receiver_value() == frame.arg(0))),
        ))
        .method(MethodDef::new("hashCode", vec![], Type::INT, |frame| {
            let mut hasher = DefaultHasher::new();
            frame.receiver_value().hash(&mut hasher);
            Ok(Value::Int(hasher.finish() as i32))
        }))
        .method(MethodDef::new("toString", vec![], Type::string(), |frame| {
            Ok(Value::String(frame.receiver_value().to_string()))
        }))
}

fn receiver_str<'a>(frame: &'a CallFrame<'_>) -> Result<&'a str, Throwable> {
    frame.receiver_value().as_str().ok_or_else(npe)
}

fn string_arg<'a>(frame: &'a CallFrame<'_>, index: usize) -> Result<&'a str, Throwable> {
    frame.arg(index).as_str().ok_or_else(npe)
}

fn compare_utf16(left: &str, right: &str) -> i32 {
    let mut a = left.encode_utf16();
    let mut b = right.encode_utf16();
    loop {
        match (a.next(), b.next()) {
            (Some(x), Some(y)) if x != y => return x as i32 - y as i32,
            (Some(_), Some(_)) => continue,
            (Some(_), None) => return 1 + a.count() as i32,
            (None, Some(_)) => return -(1 + b.count() as i32),
            (None, None) => return 0,
        }
    }
}

fn string_class() -> ClassDef {
    ClassDef::new(STRING)
        .with_modifiers(Modifiers::PUBLIC | Modifiers::FINAL)
        .implements(Type::class(SERIALIZABLE))
        .implements(Type::generic(COMPARABLE, vec![Type::string()]))
        .method(MethodDef::new("length", vec![], Type::INT, |frame| {
            Ok(Value::Int(receiver_str(frame)?.encode_utf16().count() as i32))
        }))
        .method(MethodDef::new("isEmpty", vec![], Type::BOOLEAN, |frame| {
            Ok(Value::Boolean(receiver_str(frame)?.is_empty()))
        }))
        .method(MethodDef::new("charAt", vec![Type::INT], Type::CHAR, |frame| {
            let text = receiver_str(frame)?;
            let index = frame.int_arg(0)?;
            let units: Vec<u16> = text.encode_utf16().collect();
            usize::try_from(index)
                .ok()
                .and_then(|i| units.get(i).copied())
                .map(Value::Char)
                .ok_or_else(|| {
                    throw(
                        STRING_INDEX_OUT_OF_BOUNDS_EXCEPTION,
                        format!("index {}, length {}", index, units.len()),
                    )
                })
        }))
        .method(MethodDef::new(
            "concat",
            vec![Type::string()],
            Type::string(),
            |frame| {
                let text = receiver_str(frame)?;
                let other = string_arg(frame, 0)?;
                Ok(Value::String(format!("{}{}", text, other)))
            },
        ))
        .method(MethodDef::new(
            "substring",
            vec![Type::INT],
            Type::string(),
            |frame| {
                let text = receiver_str(frame)?;
                let begin = frame.int_arg(0)?;
                let units: Vec<u16> = text.encode_utf16().collect();
                let start = usize::try_from(begin)
                    .ok()
                    .filter(|start| *start <= units.len())
                    .ok_or_else(|| {
                        throw(
                            STRING_INDEX_OUT_OF_BOUNDS_EXCEPTION,
                            format!("begin {}, length {}", begin, units.len()),
                        )
                    })?;
                Ok(Value::String(String::from_utf16_lossy(&units[start..])))
            },
        ))
        .method(MethodDef::new(
            "indexOf",
            vec![Type::string()],
            Type::INT,
            |frame| {
                let text = receiver_str(frame)?;
                let needle = string_arg(frame, 0)?;
                let index = text
                    .find(needle)
                    .map(|byte| text[..byte].encode_utf16().count() as i32)
                    .unwrap_or(-1);
                Ok(Value::Int(index))
            },
        ))
        .method(MethodDef::new("toUpperCase", vec![], Type::string(), |frame| {
            Ok(Value::String(receiver_str(frame)?.to_uppercase()))
        }))
        .method(MethodDef::new(
            "compareTo",
            vec![Type::string()],
            Type::INT,
            |frame| {
                let text = receiver_str(frame)?;
                let other = string_arg(frame, 0)?;
                Ok(Value::Int(compare_utf16(text, other)))
            },
        ))
        .method(
            MethodDef::new("valueOf", vec![Type::INT], Type::string(), |frame| {
                Ok(Value::String(frame.arg(0).to_string()))
            })
            .into_static(),
        )
}

fn class_class() -> ClassDef {
    ClassDef::new(CLASS)
        .with_modifiers(Modifiers::PUBLIC | Modifiers::FINAL)
        .with_type_parameters(vec![TypeVariable::new("T")])
        .implements(Type::class(SERIALIZABLE))
        .method(MethodDef::new("getName", vec![], Type::string(), |frame| {
            match frame.receiver_value() {
                Value::Class(ty) => Ok(Value::String(ty.binary_name())),
                _ => Err(npe()),
            }
        }))
        .method(MethodDef::new("getSimpleName", vec![], Type::string(), |frame| {
            match frame.receiver_value() {
                Value::Class(ty) => Ok(Value::String(ty.simple_name())),
                _ => Err(npe()),
            }
        }))
}

fn number_class() -> ClassDef {
    ClassDef::new(NUMBER)
        .with_modifiers(Modifiers::PUBLIC | Modifiers::ABSTRACT)
        .implements(Type::class(SERIALIZABLE))
        .constructor(ConstructorDef::nullary())
        .method(MethodDef::abstract_method("intValue", vec![], Type::INT))
        .method(MethodDef::abstract_method("longValue", vec![], Type::LONG))
        .method(MethodDef::abstract_method("doubleValue", vec![], Type::DOUBLE))
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Float(f) => Some(*f as f64),
        Value::Double(d) => Some(*d),
        other => other.widen_to(PrimitiveType::Long).map(|v| match v {
            Value::Long(l) => l as f64,
            _ => 0.0,
        }),
    }
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Float(f) => Some(*f as i64),
        Value::Double(d) => Some(*d as i64),
        other => match other.widen_to(PrimitiveType::Long) {
            Some(Value::Long(l)) => Some(l),
            _ => None,
        },
    }
}

fn compare_boxed(left: &Value, right: &Value) -> Option<i32> {
    let ordering = match (left, right) {
        (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
        (Value::Float(_) | Value::Double(_), _) | (_, Value::Float(_) | Value::Double(_)) => {
            as_f64(left)?.total_cmp(&as_f64(right)?)
        }
        _ => as_i64(left)?.cmp(&as_i64(right)?),
    };
    Some(ordering as i32)
}

fn boxed_class(primitive: PrimitiveType) -> ClassDef {
    let boxed = Type::boxed(primitive);
    let prim = Type::Primitive(primitive);
    let mut def = ClassDef::new(primitive.boxed_name())
        .with_modifiers(Modifiers::PUBLIC | Modifiers::FINAL)
        .implements(Type::generic(COMPARABLE, vec![boxed.clone()]))
        .method(
            MethodDef::new("valueOf", vec![prim.clone()], boxed.clone(), |frame| {
                Ok(frame.arg(0).clone())
            })
            .into_static(),
        )
        .method(MethodDef::new(
            format!("{}Value", primitive.name()),
            vec![],
            prim,
            |frame| Ok(frame.receiver_value().clone()),
        ))
        .method(MethodDef::new(
            "compareTo",
            vec![boxed],
            Type::INT,
            |frame| {
                if frame.arg(0).is_null() {
                    return Err(npe());
                }
                compare_boxed(frame.receiver_value(), frame.arg(0))
                    .map(Value::Int)
                    .ok_or_else(npe)
            },
        ));

    if primitive.is_numeric() && primitive != PrimitiveType::Char {
        def = def
            .extends(Type::class(NUMBER))
            .implements(Type::class(SERIALIZABLE));
        if primitive != PrimitiveType::Int {
            def = def.method(MethodDef::new("intValue", vec![], Type::INT, |frame| {
                as_i64(frame.receiver_value())
                    .map(|v| Value::Int(v as i32))
                    .ok_or_else(npe)
            }));
        }
        if primitive != PrimitiveType::Long {
            def = def.method(MethodDef::new("longValue", vec![], Type::LONG, |frame| {
                as_i64(frame.receiver_value()).map(Value::Long).ok_or_else(npe)
            }));
        }
        if primitive != PrimitiveType::Double {
            def = def.method(MethodDef::new("doubleValue", vec![], Type::DOUBLE, |frame| {
                as_f64(frame.receiver_value()).map(Value::Double).ok_or_else(npe)
            }));
        }
    } else {
        def = def.implements(Type::class(SERIALIZABLE));
    }

    match primitive {
        PrimitiveType::Int => def
            .field(FieldDef::constant("MIN_VALUE", Type::INT, Value::Int(i32::MIN)))
            .field(FieldDef::constant("MAX_VALUE", Type::INT, Value::Int(i32::MAX)))
            .method(
                MethodDef::new("parseInt", vec![Type::string()], Type::INT, |frame| {
                    let text = string_arg(frame, 0).map_err(|_| {
                        throw(NUMBER_FORMAT_EXCEPTION, "Cannot parse null string: null")
                    })?;
                    text.parse::<i32>().map(Value::Int).map_err(|_| {
                        throw(
                            NUMBER_FORMAT_EXCEPTION,
                            format!("For input string: \"{}\"", text),
                        )
                    })
                })
                .into_static(),
            ),
        PrimitiveType::Long => def
            .field(FieldDef::constant("MIN_VALUE", Type::LONG, Value::Long(i64::MIN)))
            .field(FieldDef::constant("MAX_VALUE", Type::LONG, Value::Long(i64::MAX))),
        _ => def,
    }
}

fn enum_class() -> ClassDef {
    let e = TypeVariable::bounded("E", Type::generic(ENUM, vec![Type::variable("E")]));
    ClassDef::new(ENUM)
        .with_modifiers(Modifiers::PUBLIC | Modifiers::ABSTRACT)
        .with_type_parameters(vec![e])
        .implements(Type::generic(COMPARABLE, vec![Type::variable("E")]))
        .implements(Type::class(SERIALIZABLE))
        .method(MethodDef::new("name", vec![], Type::string(), enum_name))
        .method(MethodDef::new("toString", vec![], Type::string(), enum_name))
        .method(MethodDef::new("ordinal", vec![], Type::INT, |frame| {
            let tag = frame.this()?.enum_constant().ok_or_else(npe)?;
            Ok(Value::Int(tag.ordinal as i32))
        }))
        .method(MethodDef::new(
            "compareTo",
            vec![Type::variable("E")],
            Type::INT,
            |frame| {
                let mine = frame.this()?.enum_constant().ok_or_else(npe)?.ordinal as i32;
                let theirs = match frame.arg(0) {
                    Value::Object(obj) => obj.enum_constant().ok_or_else(npe)?.ordinal as i32,
                    _ => return Err(npe()),
                };
                Ok(Value::Int(mine - theirs))
            },
        ))
}

fn enum_name(frame: &CallFrame<'_>) -> Result<Value, Throwable> {
    let tag = frame.this()?.enum_constant().ok_or_else(npe)?;
    Ok(Value::String(tag.name.clone()))
}

fn exception_class(name: &str, parent: &str) -> ClassDef {
    let mut def = ClassDef::new(name)
        .extends(Type::class(parent))
        .constructor(ConstructorDef::nullary())
        .constructor(ConstructorDef::new(vec![Type::string()], |frame| {
            frame.this()?.set_field(DETAIL_MESSAGE, frame.arg(0).clone());
            Ok(Value::Null)
        }));
    if name == THROWABLE {
        def = def
            .implements(Type::class(SERIALIZABLE))
            .field(FieldDef::new(DETAIL_MESSAGE, Type::string()).with_modifiers(Modifiers::PRIVATE))
            .method(MethodDef::new("getMessage", vec![], Type::string(), |frame| {
                Ok(frame.this()?.get_field(DETAIL_MESSAGE).unwrap_or(Value::Null))
            }));
    }
    def
}

fn list_elements<R>(frame: &CallFrame<'_>, f: impl FnOnce(&mut Vec<Value>) -> R) -> Result<R, Throwable> {
    frame
        .this()?
        .with_native_mut(f)
        .ok_or_else(|| throw(ILLEGAL_STATE_EXCEPTION, "list storage missing"))
}

fn out_of_bounds(index: i32, length: usize) -> Throwable {
    throw(
        INDEX_OUT_OF_BOUNDS_EXCEPTION,
        format!("Index {} out of bounds for length {}", index, length),
    )
}

fn checked_index(index: i32, length: usize) -> Result<usize, Throwable> {
    usize::try_from(index)
        .ok()
        .filter(|i| *i < length)
        .ok_or_else(|| out_of_bounds(index, length))
}

fn collection_classes() -> Vec<ClassDef> {
    let e = || Type::variable("E");
    let params = || vec![TypeVariable::new("E")];

    let collection = ClassDef::interface(COLLECTION)
        .with_type_parameters(params())
        .method(MethodDef::abstract_method("size", vec![], Type::INT))
        .method(MethodDef::abstract_method("isEmpty", vec![], Type::BOOLEAN))
        .method(MethodDef::abstract_method("add", vec![e()], Type::BOOLEAN))
        .method(MethodDef::abstract_method("contains", vec![Type::object()], Type::BOOLEAN))
        .method(MethodDef::abstract_method("clear", vec![], Type::Void));

    let list = ClassDef::interface(LIST)
        .with_type_parameters(params())
        .implements(Type::generic(COLLECTION, vec![e()]))
        .method(MethodDef::abstract_method("get", vec![Type::INT], e()))
        .method(MethodDef::abstract_method("set", vec![Type::INT, e()], e()))
        .method(MethodDef::abstract_method("add", vec![Type::INT, e()], Type::Void))
        .method(MethodDef::abstract_method("remove", vec![Type::INT], e()))
        .method(MethodDef::abstract_method("indexOf", vec![Type::object()], Type::INT));

    let abstract_list = ClassDef::new(ABSTRACT_LIST)
        .with_modifiers(Modifiers::PUBLIC | Modifiers::ABSTRACT)
        .with_type_parameters(params())
        .implements(Type::generic(LIST, vec![e()]))
        .constructor(ConstructorDef::nullary().with_modifiers(Modifiers::PROTECTED));

    let array_list = ClassDef::new(ARRAY_LIST)
        .with_type_parameters(params())
        .extends(Type::generic(ABSTRACT_LIST, vec![e()]))
        .implements(Type::generic(LIST, vec![e()]))
        .implements(Type::class(CLONEABLE))
        .implements(Type::class(SERIALIZABLE))
        .constructor(ConstructorDef::new(vec![], |frame| {
            frame.this()?.set_native(Vec::<Value>::new());
            Ok(Value::Null)
        }))
        .constructor(ConstructorDef::new(vec![Type::INT], |frame| {
            let capacity = frame.int_arg(0)?;
            let capacity = usize::try_from(capacity).map_err(|_| {
                throw(
                    ILLEGAL_ARGUMENT_EXCEPTION,
                    format!("Illegal Capacity: {}", capacity),
                )
            })?;
            frame.this()?.set_native(Vec::<Value>::with_capacity(capacity));
            Ok(Value::Null)
        }))
        .method(MethodDef::new("size", vec![], Type::INT, |frame| {
            list_elements(frame, |items| Value::Int(items.len() as i32))
        }))
        .method(MethodDef::new("isEmpty", vec![], Type::BOOLEAN, |frame| {
            list_elements(frame, |items| Value::Boolean(items.is_empty()))
        }))
        .method(MethodDef::new("add", vec![e()], Type::BOOLEAN, |frame| {
            let item = frame.arg(0).clone();
            list_elements(frame, |items| {
                items.push(item);
                Value::Boolean(true)
            })
        }))
        .method(MethodDef::new("add", vec![Type::INT, e()], Type::Void, |frame| {
            let index = frame.int_arg(0)?;
            let item = frame.arg(1).clone();
            list_elements(frame, |items| -> Result<Value, Throwable> {
                let slot = usize::try_from(index)
                    .ok()
                    .filter(|i| *i <= items.len())
                    .ok_or_else(|| out_of_bounds(index, items.len()))?;
                items.insert(slot, item);
                Ok(Value::Null)
            })?
        }))
        .method(MethodDef::new("get", vec![Type::INT], e(), |frame| {
            let index = frame.int_arg(0)?;
            list_elements(frame, |items| {
                checked_index(index, items.len()).map(|i| items[i].clone())
            })?
        }))
        .method(MethodDef::new("set", vec![Type::INT, e()], e(), |frame| {
            let index = frame.int_arg(0)?;
            let item = frame.arg(1).clone();
            list_elements(frame, |items| {
                checked_index(index, items.len()).map(|i| std::mem::replace(&mut items[i], item))
            })?
        }))
        .method(MethodDef::new("remove", vec![Type::INT], e(), |frame| {
            let index = frame.int_arg(0)?;
            list_elements(frame, |items| {
                checked_index(index, items.len()).map(|i| items.remove(i))
            })?
        }))
        .method(MethodDef::new(
            "contains",
            vec![Type::object()],
            Type::BOOLEAN,
            |frame| {
                let needle = frame.arg(0).clone();
                list_elements(frame, |items| Value::Boolean(items.contains(&needle)))
            },
        ))
        .method(MethodDef::new(
            "indexOf",
            vec![Type::object()],
            Type::INT,
            |frame| {
                let needle = frame.arg(0).clone();
                list_elements(frame, |items| {
                    Value::Int(
                        items
                            .iter()
                            .position(|item| *item == needle)
                            .map(|i| i as i32)
                            .unwrap_or(-1),
                    )
                })
            },
        ))
        .method(MethodDef::new("clear", vec![], Type::Void, |frame| {
            list_elements(frame, |items| {
                items.clear();
                Value::Null
            })
        }));

    vec![collection, list, abstract_list, array_list]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::class::InvocationError;

    #[test]
    fn array_list_dispatches_through_interfaces() {
        let registry = ClassCatalog::new().snapshot();
        let class = registry.get(ARRAY_LIST).unwrap();
        let list = class.declared_constructor(&[]).unwrap().invoke(&registry, &[]).unwrap();

        let add = registry
            .find_method(COLLECTION, "add", &[Type::object()])
            .unwrap()
            .clone();
        assert!(add.is_abstract());
        add.invoke(&registry, &list, &[Value::String("a".into())]).unwrap();

        let get = registry.find_method(ARRAY_LIST, "get", &[Type::INT]).unwrap();
        assert_eq!(
            get.invoke(&registry, &list, &[Value::Int(0)]).unwrap(),
            Value::String("a".into())
        );
        match get.invoke(&registry, &list, &[Value::Int(5)]) {
            Err(InvocationError::Target(t)) => assert_eq!(t.class_name, INDEX_OUT_OF_BOUNDS_EXCEPTION),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn negative_capacity_is_rejected() {
        let registry = ClassCatalog::new().snapshot();
        let ctor = registry
            .get(ARRAY_LIST)
            .unwrap()
            .declared_constructor(&[Type::INT])
            .unwrap()
            .clone();
        match ctor.invoke(&registry, &[Value::Int(-1)]) {
            Err(InvocationError::Target(t)) => {
                assert_eq!(t.class_name, ILLEGAL_ARGUMENT_EXCEPTION);
                assert_eq!(t.message.as_deref(), Some("Illegal Capacity: -1"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn exceptions_form_a_hierarchy() {
        let registry = ClassCatalog::new().snapshot();
        assert!(registry.is_subclass(ARRAY_INDEX_OUT_OF_BOUNDS_EXCEPTION, RUNTIME_EXCEPTION));
        assert!(registry.is_subclass(THREAD_DEATH, THROWABLE));
        assert!(!registry.is_subclass(THREAD_DEATH, EXCEPTION));
    }

    #[test]
    fn string_methods_use_utf16_indices() {
        let registry = ClassCatalog::new().snapshot();
        let length = registry.find_method(STRING, "length", &[]).unwrap();
        let text = Value::String("h\u{e9}llo".into());
        assert_eq!(length.invoke(&registry, &text, &[]).unwrap(), Value::Int(5));
        let compare = registry.find_method(STRING, "compareTo", &[Type::string()]).unwrap();
        assert_eq!(
            compare
                .invoke(&registry, &Value::String("a".into()), &[Value::String("b".into())])
                .unwrap(),
            Value::Int(-1)
        );
    }

    #[test]
    fn integer_parse_raises_number_format() {
        let registry = ClassCatalog::new().snapshot();
        let parse = registry
            .find_method("java.lang.Integer", "parseInt", &[Type::string()])
            .unwrap();
        assert_eq!(
            parse.invoke(&registry, &Value::Null, &[Value::String("42".into())]).unwrap(),
            Value::Int(42)
        );
        assert!(matches!(
            parse.invoke(&registry, &Value::Null, &[Value::String("x".into())]),
            Err(InvocationError::Target(t)) if t.class_name == NUMBER_FORMAT_EXCEPTION
        ));
    }
}
