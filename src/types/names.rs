//! Parsing of type names.
//!
//! Accepts the forms that appear in persisted operations and on the command
//! line: primitive keywords, `void`, reflection binary names
//! (`java.lang.String`, `[I`, `[[Ljava.lang.Object;`), source array suffixes
//! (`int[]`) and source-form type arguments
//! (`java.util.List<? extends java.lang.Number>`).

use thiserror::Error;

use super::{ClassType, PrimitiveType, Type, TypeArgument, Wildcard};

/// Malformed type name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} in type name `{text}`")]
pub struct TypeNameError {
    /// What went wrong.
    pub message: String,
    /// The text being parsed.
    pub text: String,
}

/// Parse a type name.
pub fn parse_type(text: &str) -> Result<Type, TypeNameError> {
    let mut parser = Parser::new(text.trim());
    let ty = parser.parse_type()?;
    parser.skip_ws();
    if !parser.eof() {
        return Err(parser.error("trailing characters"));
    }
    Ok(ty)
}

/// Whether `name` is a syntactically valid dotted binary class name.
pub fn is_class_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .split('.')
            .all(|segment| !segment.is_empty() && segment.bytes().all(is_ident_char))
        && !name.as_bytes()[0].is_ascii_digit()
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    index: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            index: 0,
        }
    }

    fn eof(&self) -> bool {
        self.index >= self.bytes.len()
    }

    fn current(&self) -> Option<u8> {
        self.bytes.get(self.index).copied()
    }

    fn advance(&mut self) {
        if self.index < self.bytes.len() {
            self.index += 1;
        }
    }

    fn skip_ws(&mut self) {
        while let Some(ch) = self.current() {
            if ch.is_ascii_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn parse_type(&mut self) -> Result<Type, TypeNameError> {
        self.skip_ws();
        let mut ty = match self.current() {
            None => return Err(self.error("empty type")),
            Some(b'[') => self.parse_descriptor()?,
            Some(_) => self.parse_named()?,
        };
        loop {
            self.skip_ws();
            if self.current() == Some(b'[') && self.bytes.get(self.index + 1) == Some(&b']') {
                self.advance();
                self.advance();
                ty = Type::array(ty);
            } else {
                break;
            }
        }
        Ok(ty)
    }

    fn parse_descriptor(&mut self) -> Result<Type, TypeNameError> {
        // consume '['
        self.advance();
        let component = match self.current() {
            Some(b'[') => self.parse_descriptor()?,
            Some(b'L') => {
                self.advance();
                let start = self.index;
                while let Some(ch) = self.current() {
                    if ch == b';' {
                        break;
                    }
                    self.advance();
                }
                if self.current() != Some(b';') {
                    return Err(self.error("unterminated class descriptor"));
                }
                let name = &self.src[start..self.index];
                self.advance();
                if !is_class_name(name) {
                    return Err(self.error("invalid class name in descriptor"));
                }
                Type::class(name)
            }
            Some(code) => {
                let primitive = PrimitiveType::from_descriptor(code as char)
                    .ok_or_else(|| self.error("unknown array descriptor"))?;
                self.advance();
                Type::Primitive(primitive)
            }
            None => return Err(self.error("truncated array descriptor")),
        };
        Ok(Type::array(component))
    }

    fn parse_named(&mut self) -> Result<Type, TypeNameError> {
        let start = self.index;
        while let Some(ch) = self.current() {
            if is_ident_char(ch) || ch == b'.' {
                self.advance();
            } else {
                break;
            }
        }
        let name = &self.src[start..self.index];
        if name.is_empty() {
            return Err(self.error("unexpected character"));
        }
        if name == "void" {
            return Ok(Type::Void);
        }
        if let Some(primitive) = PrimitiveType::from_name(name) {
            return Ok(Type::Primitive(primitive));
        }
        if !is_class_name(name) {
            return Err(self.error("invalid class name"));
        }
        let name = if name == "String" {
            super::STRING
        } else {
            name
        };

        self.skip_ws();
        let mut arguments = Vec::new();
        if self.current() == Some(b'<') {
            self.advance();
            loop {
                arguments.push(self.parse_argument()?);
                self.skip_ws();
                match self.current() {
                    Some(b',') => self.advance(),
                    Some(b'>') => {
                        self.advance();
                        break;
                    }
                    _ => return Err(self.error("expected `,` or `>`")),
                }
            }
        }
        Ok(Type::Class(ClassType {
            name: name.to_string(),
            arguments,
        }))
    }

    fn parse_argument(&mut self) -> Result<TypeArgument, TypeNameError> {
        self.skip_ws();
        if self.current() != Some(b'?') {
            let ty = self.parse_type()?;
            if !ty.is_reference() {
                return Err(self.error("type argument must be a reference type"));
            }
            return Ok(TypeArgument::Type(ty));
        }
        self.advance();
        self.skip_ws();
        let rest = &self.src[self.index..];
        if rest.starts_with("extends") {
            self.index += "extends".len();
            let bound = self.parse_type()?;
            Ok(TypeArgument::Wildcard(Wildcard::Extends(Box::new(bound))))
        } else if rest.starts_with("super") {
            self.index += "super".len();
            let bound = self.parse_type()?;
            Ok(TypeArgument::Wildcard(Wildcard::Super(Box::new(bound))))
        } else {
            Ok(TypeArgument::Wildcard(Wildcard::Unbounded))
        }
    }

    fn error(&self, message: &str) -> TypeNameError {
        TypeNameError {
            message: format!("{} at byte {}", message, self.index),
            text: self.src.to_string(),
        }
    }
}

fn is_ident_char(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_' || ch == b'$'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_primitives_and_void() {
        assert_eq!(parse_type("int").unwrap(), Type::INT);
        assert_eq!(parse_type("void").unwrap(), Type::Void);
    }

    #[test]
    fn parses_binary_array_descriptors() {
        assert_eq!(parse_type("[I").unwrap(), Type::array(Type::INT));
        assert_eq!(
            parse_type("[[Ljava.lang.Object;").unwrap(),
            Type::array(Type::array(Type::object()))
        );
        assert!(parse_type("[Q").is_err());
        assert!(parse_type("[Ljava.lang.Object").is_err());
    }

    #[test]
    fn parses_source_forms() {
        assert_eq!(parse_type("int[][]").unwrap(), Type::array(Type::array(Type::INT)));
        assert_eq!(parse_type("String").unwrap(), Type::string());
        let parsed = parse_type("java.util.Map<java.lang.String, ? super java.lang.Integer>").unwrap();
        assert_eq!(
            parsed.name(),
            "java.util.Map<java.lang.String,? super java.lang.Integer>"
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_type("").is_err());
        assert!(parse_type("java..lang").is_err());
        assert!(parse_type("java.util.List<int>").is_err());
        assert!(parse_type("int x").is_err());
    }

    #[test]
    fn binary_name_round_trips() {
        for name in ["int", "java.lang.String", "[J", "[Ljava.util.List;", "pkg.Outer$Inner"] {
            assert_eq!(parse_type(name).unwrap().binary_name(), name);
        }
    }
}
