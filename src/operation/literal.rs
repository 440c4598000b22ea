//! Literal values: primitives, boxed primitives, strings, class literals and
//! `null`.

use std::fmt;
use std::time::Duration;

use crate::error::{OperationError, OperationParseError, ParseResult};
use crate::execution::ExecutionOutcome;
use crate::reflect::{ClassRegistry, Value};
use crate::types::{PrimitiveType, Type, STRING};

/// Default bound on the escaped length of string literals.
pub const DEFAULT_STRING_MAXLEN: usize = 10_000;

/// A literal value of a primitive, boxed primitive, `String` or `Class`
/// type, or `null` of any reference type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonreceiverTerm {
    ty: Type,
    value: Value,
}

impl NonreceiverTerm {
    /// Validate `value` against `ty` using [`DEFAULT_STRING_MAXLEN`].
    pub fn new(ty: Type, value: Value) -> Result<Self, OperationError> {
        Self::with_string_maxlen(ty, value, DEFAULT_STRING_MAXLEN)
    }

    /// Validate `value` against `ty` with an explicit string length bound.
    pub fn with_string_maxlen(ty: Type, value: Value, maxlen: usize) -> Result<Self, OperationError> {
        if let Value::String(text) = &value {
            check_string_length(text, maxlen)?;
        }
        if !accepts(&ty, &value) {
            return Err(OperationError::InvalidLiteral(format!(
                "value {} does not fit type {}",
                value, ty
            )));
        }
        Ok(Self { ty, value })
    }

    /// The canonical literal of `ty`: zero or `false` for primitives, `'a'`
    /// for `char`, `""` for `String` and `null` otherwise.
    pub fn null_or_zero(ty: &Type) -> Self {
        let value = match ty.as_primitive() {
            // not actually zero, kept for compatibility with persisted tests
            Some(PrimitiveType::Char) => Value::Char(u16::from(b'a')),
            Some(_) => Value::zero(ty),
            None if ty.is_string() => Value::String(String::new()),
            None => Value::Null,
        };
        Self {
            ty: ty.clone(),
            value,
        }
    }

    /// Declared type.
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// Literal value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Whether this is the `null` literal.
    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    /// The value, as produced at execution time.
    pub fn execute(&self) -> ExecutionOutcome {
        ExecutionOutcome::normal(self.value.clone(), Duration::ZERO)
    }

    /// Java source expression for the value.
    pub fn code_string(&self) -> String {
        code_string(&self.value)
    }

    /// `typeBinaryName:value`
    pub fn description(&self) -> String {
        let value = match &self.value {
            Value::Null => "null".to_string(),
            Value::String(text) => format!("\"{}\"", escape_java(text)),
            Value::Char(unit) => format!("{:x}", unit),
            Value::Float(v) => java_float(f64::from(*v), &format!("{:?}", v)),
            Value::Double(v) => java_float(*v, &format!("{:?}", v)),
            Value::Class(ty) => format!("{}.class", ty.binary_name()),
            other => other.to_string(),
        };
        format!("{}:{}", self.ty.binary_name(), value)
    }

    /// Inverse of [`NonreceiverTerm::description`].
    pub fn parse(description: &str, registry: &ClassRegistry, maxlen: usize) -> ParseResult<Self> {
        let (type_text, value_text) = description.split_once(':').ok_or_else(|| {
            OperationParseError::new(format!(
                "Expected `type:value` in nonreceiver description: `{}`",
                description
            ))
        })?;
        let type_text = type_text.trim();
        if type_text.is_empty() || type_text.contains(char::is_whitespace) {
            return Err(OperationParseError::new(format!(
                "Malformed type `{}` in nonreceiver description: `{}`",
                type_text, description
            )));
        }
        let type_text = if type_text == "String" { STRING } else { type_text };
        let ty = Type::for_name(type_text).map_err(|err| {
            OperationParseError::new(format!("Unrecognized type `{}`: {}", type_text, err))
        })?;
        if let Some(ct) = ty.as_class() {
            if !registry.contains(&ct.name) {
                return Err(OperationParseError::new(format!(
                    "Unrecognized type `{}` in nonreceiver description: `{}`",
                    type_text, description
                )));
            }
        }

        let value_text = value_text.trim();
        let value = parse_value(&ty, value_text).ok_or_else(|| {
            OperationParseError::new(format!(
                "Cannot parse `{}` as a value of type {} in nonreceiver description: `{}`",
                value_text, ty, description
            ))
        })?;
        Self::with_string_maxlen(ty, value, maxlen)
            .map_err(|err| OperationParseError::new(format!("{} in `{}`", err, description)))
    }
}

impl fmt::Display for NonreceiverTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

fn accepts(ty: &Type, value: &Value) -> bool {
    if let Some(primitive) = ty.as_primitive() {
        return value.primitive_type() == Some(primitive);
    }
    if value.is_null() {
        return ty.is_reference();
    }
    if let Some(primitive) = ty.unboxed() {
        return value.primitive_type() == Some(primitive);
    }
    match value {
        Value::String(_) => ty.is_string(),
        Value::Class(_) => ty.is_class_literal_type(),
        _ => false,
    }
}

fn check_string_length(text: &str, maxlen: usize) -> Result<(), OperationError> {
    let length = escape_java(text).len();
    if length > maxlen {
        return Err(OperationError::StringTooLong { length, max: maxlen });
    }
    Ok(())
}

fn parse_value(ty: &Type, text: &str) -> Option<Value> {
    if text == "null" {
        return ty.is_reference().then_some(Value::Null);
    }
    if let Some(primitive) = ty.as_primitive().or_else(|| ty.unboxed()) {
        return parse_primitive(primitive, text);
    }
    if ty.is_string() {
        let inner = text.strip_prefix('"')?.strip_suffix('"')?;
        return unescape_java(inner).ok().map(Value::String);
    }
    if ty.is_class_literal_type() {
        let name = text.strip_suffix(".class")?;
        return Type::for_name(name).ok().map(Value::Class);
    }
    None
}

fn parse_primitive(primitive: PrimitiveType, text: &str) -> Option<Value> {
    Some(match primitive {
        PrimitiveType::Boolean => match text {
            "true" => Value::Boolean(true),
            "false" => Value::Boolean(false),
            _ => return None,
        },
        PrimitiveType::Char => Value::Char(u16::from_str_radix(text, 16).ok()?),
        PrimitiveType::Byte => Value::Byte(text.parse().ok()?),
        PrimitiveType::Short => Value::Short(text.parse().ok()?),
        PrimitiveType::Int => Value::Int(text.parse().ok()?),
        PrimitiveType::Long => Value::Long(text.parse().ok()?),
        PrimitiveType::Float => Value::Float(match java_special(text) {
            Some(v) => v as f32,
            None => finite(text)?.parse().ok()?,
        }),
        PrimitiveType::Double => Value::Double(match java_special(text) {
            Some(v) => v,
            None => finite(text)?.parse().ok()?,
        }),
    })
}

fn java_special(text: &str) -> Option<f64> {
    match text {
        "NaN" => Some(f64::NAN),
        "Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

fn finite(text: &str) -> Option<&str> {
    (!text.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')).then_some(text)
}

fn java_float(v: f64, finite: &str) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "Infinity".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        finite.to_string()
    }
}

/// Java source expression for a literal value.
pub fn code_string(value: &Value) -> String {
    let rep = match value {
        Value::Null => return "null".to_string(),
        Value::String(text) => return format!("\"{}\"", escape_java(text)),
        Value::Class(ty) => return format!("{}.class", ty.erasure().name()),
        Value::Boolean(v) => return v.to_string(),
        Value::Char(unit) => return char_literal(*unit),
        Value::Double(v) => {
            if let Some(constant) = special_float("Double", *v) {
                return constant;
            }
            format!("{:?}d", v)
        }
        Value::Float(v) => {
            if let Some(constant) = special_float("Float", f64::from(*v)) {
                return constant;
            }
            format!("{:?}f", v)
        }
        Value::Long(v) => format!("{}L", v),
        Value::Byte(v) => format!("(byte){}", v),
        Value::Short(v) => format!("(short){}", v),
        Value::Int(v) => v.to_string(),
        Value::Object(_) | Value::Array(_) => return value.to_string(),
    };
    if rep.starts_with('-') {
        format!("({})", rep)
    } else {
        rep
    }
}

fn special_float(class: &str, v: f64) -> Option<String> {
    let name = if v.is_nan() {
        "NaN"
    } else if v == f64::INFINITY {
        "POSITIVE_INFINITY"
    } else if v == f64::NEG_INFINITY {
        "NEGATIVE_INFINITY"
    } else {
        return None;
    };
    Some(format!("{}.{}", class, name))
}

fn char_literal(unit: u16) -> String {
    if unit == u16::from(b' ') {
        return "' '".to_string();
    }
    let mut out = String::from("'");
    if unit == u16::from(b'\'') {
        out.push_str("\\'");
    } else {
        escape_unit(unit, &mut out);
    }
    out.push('\'');
    out
}

/// Escape `text` as the body of a Java string literal. Non-ASCII and
/// control characters become `\uXXXX` escapes of their UTF-16 units.
pub fn escape_java(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for unit in text.encode_utf16() {
        escape_unit(unit, &mut out);
    }
    out
}

fn escape_unit(unit: u16, out: &mut String) {
    match unit {
        0x22 => out.push_str("\\\""),
        0x5c => out.push_str("\\\\"),
        0x08 => out.push_str("\\b"),
        0x0a => out.push_str("\\n"),
        0x09 => out.push_str("\\t"),
        0x0c => out.push_str("\\f"),
        0x0d => out.push_str("\\r"),
        0x20..=0x7e => out.push(char::from(unit as u8)),
        _ => out.push_str(&format!("\\u{:04X}", unit)),
    }
}

/// Inverse of [`escape_java`]; also accepts `\'`.
pub fn unescape_java(text: &str) -> Result<String, String> {
    let mut units: Vec<u16> = Vec::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            let mut buf = [0u16; 2];
            units.extend_from_slice(ch.encode_utf16(&mut buf));
            continue;
        }
        let escaped = chars
            .next()
            .ok_or_else(|| format!("dangling escape in `{}`", text))?;
        let unit = match escaped {
            '"' => 0x22,
            '\'' => 0x27,
            '\\' => 0x5c,
            'b' => 0x08,
            'n' => 0x0a,
            't' => 0x09,
            'f' => 0x0c,
            'r' => 0x0d,
            'u' => {
                let hex: String = chars.by_ref().take(4).collect();
                if hex.len() != 4 {
                    return Err(format!("truncated unicode escape in `{}`", text));
                }
                u16::from_str_radix(&hex, 16)
                    .map_err(|_| format!("invalid unicode escape `\\u{}`", hex))?
            }
            other => return Err(format!("unknown escape `\\{}`", other)),
        };
        units.push(unit);
    }
    String::from_utf16(&units).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::ClassCatalog;

    fn registry() -> ClassRegistry {
        ClassCatalog::new().snapshot()
    }

    #[test]
    fn canonical_literals() {
        let cases = [
            (Type::INT, Value::Int(0)),
            (Type::LONG, Value::Long(0)),
            (Type::FLOAT, Value::Float(0.0)),
            (Type::DOUBLE, Value::Double(0.0)),
            (Type::BOOLEAN, Value::Boolean(false)),
            (Type::BYTE, Value::Byte(0)),
            (Type::SHORT, Value::Short(0)),
            (Type::CHAR, Value::Char(0x61)),
            (Type::string(), Value::String(String::new())),
            (Type::class_literal(), Value::Null),
            (Type::class("java.lang.Integer"), Value::Null),
        ];
        for (ty, expected) in cases {
            assert_eq!(NonreceiverTerm::null_or_zero(&ty).value(), &expected, "{}", ty);
        }
    }

    #[test]
    fn primitive_literals_are_never_null() {
        assert!(NonreceiverTerm::new(Type::INT, Value::Null).is_err());
        assert!(NonreceiverTerm::new(Type::INT, Value::Long(1)).is_err());
        assert!(NonreceiverTerm::new(Type::class("java.lang.Integer"), Value::Null).is_ok());
        assert!(NonreceiverTerm::new(Type::class("java.util.ArrayList"), Value::Null).is_ok());
        assert!(NonreceiverTerm::new(Type::object(), Value::Int(1)).is_err());
    }

    #[test]
    fn long_strings_are_rejected() {
        let err = NonreceiverTerm::with_string_maxlen(Type::string(), Value::String("\n\n".into()), 3)
            .unwrap_err();
        assert_eq!(err, OperationError::StringTooLong { length: 4, max: 3 });
    }

    #[test]
    fn code_strings() {
        assert_eq!(code_string(&Value::Int(-3)), "(-3)");
        assert_eq!(code_string(&Value::Long(5)), "5L");
        assert_eq!(code_string(&Value::Byte(-1)), "(byte)-1");
        assert_eq!(code_string(&Value::Short(2)), "(short)2");
        assert_eq!(code_string(&Value::Double(1.5)), "1.5d");
        assert_eq!(code_string(&Value::Double(-0.0)), "(-0.0d)");
        assert_eq!(code_string(&Value::Float(f32::NAN)), "Float.NaN");
        assert_eq!(code_string(&Value::Double(f64::NEG_INFINITY)), "Double.NEGATIVE_INFINITY");
        assert_eq!(code_string(&Value::Char(u16::from(b'\''))), "'\\''");
        assert_eq!(code_string(&Value::Char(u16::from(b' '))), "' '");
        assert_eq!(code_string(&Value::String("a\"b\u{e9}".into())), "\"a\\\"b\\u00E9\"");
        assert_eq!(code_string(&Value::Class(Type::string())), "java.lang.String.class");
    }

    #[test]
    fn descriptions() {
        let term = NonreceiverTerm::new(Type::CHAR, Value::Char(u16::from(b'a'))).unwrap();
        assert_eq!(term.description(), "char:61");
        let term = NonreceiverTerm::new(Type::string(), Value::String("hi\n".into())).unwrap();
        assert_eq!(term.description(), "java.lang.String:\"hi\\n\"");
        let term = NonreceiverTerm::new(Type::DOUBLE, Value::Double(f64::INFINITY)).unwrap();
        assert_eq!(term.description(), "double:Infinity");
    }

    #[test]
    fn parse_accepts_string_alias() {
        let term = NonreceiverTerm::parse("String:\"x y\"", &registry(), DEFAULT_STRING_MAXLEN).unwrap();
        assert_eq!(term.ty(), &Type::string());
        assert_eq!(term.value(), &Value::String("x y".into()));
    }

    #[test]
    fn parse_rejects_bad_input() {
        let registry = registry();
        for text in [
            "int",
            "int:abc",
            "boolean:TRUE",
            "java.lang.String:unquoted",
            "pkg.Missing:null",
            "java . lang.String:null",
            "int:null",
            "double:inf",
        ] {
            assert!(
                NonreceiverTerm::parse(text, &registry, DEFAULT_STRING_MAXLEN).is_err(),
                "{}",
                text
            );
        }
    }

    #[test]
    fn unescape_inverts_escape() {
        let text = "tab\there \"quoted\" \\ \u{1F600} \u{7}";
        assert_eq!(unescape_java(&escape_java(text)).unwrap(), text);
        assert!(unescape_java("\\q").is_err());
    }
}
