//! Textual operation encoding: `TAG : description`.
//!
//! The tag picks one variant parser from a closed table. Each variant parser
//! consumes only the description and is the left inverse of the variant's
//! printed form. Members are resolved against a [`ClassRegistry`]. A raw
//! class part gives raw (erased) types; an instantiated one such as
//! `java.util.ArrayList<java.lang.String>` gives the member typed at that
//! instantiation.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;

use super::model::inherited_substitution;
use super::{
    ConstructorCall, EnumConstant, FieldGet, FieldSet, InitializedArrayCreation, MethodCall,
    NonreceiverTerm, Operation, TypedOperation, DEFAULT_STRING_MAXLEN,
};
use crate::error::{InternalError, InternalResult, OperationError, OperationParseError, ParseResult};
use crate::reflect::{ClassDef, ClassRegistry};
use crate::types::{ClassType, Substitution, Type, TypeTuple};

type VariantParser = fn(&OperationParser<'_>, &str) -> ParseResult<Arc<TypedOperation>>;

static VARIANT_PARSERS: Lazy<HashMap<&'static str, VariantParser>> = Lazy::new(|| {
    let mut table: HashMap<&'static str, VariantParser> = HashMap::new();
    table.insert("NonreceiverTerm", parse_literal);
    table.insert("MethodCall", parse_method);
    table.insert("ConstructorCall", parse_constructor);
    table.insert("InitializedArrayCreation", parse_array_creation);
    table.insert("EnumConstant", parse_enum_constant);
    table.insert("FieldGet", parse_field_get);
    table.insert("FieldSet", parse_field_set);
    table
});

/// Stateless dispatcher from persisted text to typed operations.
#[derive(Debug, Clone, Copy)]
pub struct OperationParser<'a> {
    registry: &'a ClassRegistry,
    string_maxlen: usize,
}

impl<'a> OperationParser<'a> {
    /// Parser resolving members in `registry`.
    pub fn new(registry: &'a ClassRegistry) -> Self {
        Self {
            registry,
            string_maxlen: DEFAULT_STRING_MAXLEN,
        }
    }

    /// Override the maximum escaped length of string literals.
    pub fn with_string_maxlen(mut self, string_maxlen: usize) -> Self {
        self.string_maxlen = string_maxlen;
        self
    }

    /// Registry members are resolved in.
    pub fn registry(&self) -> &'a ClassRegistry {
        self.registry
    }

    /// Parse one `TAG : description` line.
    pub fn parse(&self, text: &str) -> ParseResult<Arc<TypedOperation>> {
        let Some((tag, description)) = text.split_once(':') else {
            return Err(OperationParseError::new(format!(
                "Expected `TAG : description` but found no `:` in `{}`",
                text.trim()
            )));
        };
        let tag = tag.trim();
        let parse_variant = VARIANT_PARSERS.get(tag).ok_or_else(|| {
            OperationParseError::new(format!(
                "Unrecognized operation tag `{}` in `{}`",
                tag,
                text.trim()
            ))
        })?;
        parse_variant(self, description.trim())
    }

    /// Print `operation`, parse it back and compare the printed forms.
    ///
    /// A mismatch is a bug in the printer or the parser, so it is reported
    /// on the fatal channel.
    pub fn check_round_trip(&self, operation: &TypedOperation) -> InternalResult<()> {
        let printed = operation.to_parsable_string();
        let reparsed = self
            .parse(&printed)
            .map(|op| op.to_parsable_string())
            .unwrap_or_else(|err| err.message);
        if reparsed != printed {
            tracing::warn!("round trip mismatch for {}", printed);
            return Err(InternalError::RoundTrip { printed, reparsed });
        }
        Ok(())
    }

    fn class(&self, name: &str, description: &str) -> ParseResult<&'a Arc<ClassDef>> {
        self.registry.get(name).ok_or_else(|| {
            OperationParseError::new(format!("Unrecognized class `{}` in `{}`", name, description))
        })
    }

    /// Resolve the class part of a member description.
    fn owner(&self, text: &str, description: &str) -> ParseResult<Owner<'a>> {
        if !text.contains('<') {
            return Ok(Owner {
                class: self.class(text, description)?,
                instantiation: None,
            });
        }
        let malformed = |reason: String| {
            OperationParseError::new(format!(
                "Unrecognized class `{}` in `{}`: {}",
                text, description, reason
            ))
        };
        let ty = Type::for_name(text).map_err(|err| malformed(err.to_string()))?;
        if ty.is_generic() || ty.has_wildcard() {
            return Err(malformed("type arguments must be concrete".to_string()));
        }
        let Type::Class(instantiation) = ty else {
            return Err(malformed("not a class type".to_string()));
        };
        let class = self.class(&instantiation.name, description)?;
        if class.type_parameters().len() != instantiation.arguments.len() {
            return Err(malformed(format!(
                "{} takes {} type arguments",
                class.name(),
                class.type_parameters().len()
            )));
        }
        Ok(Owner {
            class,
            instantiation: Some(instantiation),
        })
    }

    /// Build a member of `member_owner` as used through `instantiation`.
    fn instantiated_member(
        &self,
        instantiation: &ClassType,
        member_owner: &str,
        description: &str,
        build: impl FnOnce(Type, &Substitution) -> Result<Arc<TypedOperation>, OperationError>,
    ) -> ParseResult<Arc<TypedOperation>> {
        let inherited = match self.registry.get(member_owner) {
            Some(owner) => inherited_substitution(self.registry, instantiation, owner),
            None => Substitution::new(),
        };
        let operation = build(Type::Class(instantiation.clone()), &inherited)
            .map_err(|err| OperationParseError::new(format!("{} (from `{}`)", err, description)))?;
        erase_method_variables(operation, description)
    }
}

/// Class part of a member description.
struct Owner<'a> {
    class: &'a Arc<ClassDef>,
    instantiation: Option<ClassType>,
}

/// Type variables of generic methods are not persisted; they read back as
/// their erasure.
fn erase_method_variables(operation: Arc<TypedOperation>, description: &str) -> ParseResult<Arc<TypedOperation>> {
    let erasure = operation
        .type_parameters()
        .into_iter()
        .try_fold(Substitution::new(), |acc, var| {
            let bound = var.erasure();
            acc.bind(var, bound)
        })
        .map_err(|err| OperationParseError::new(format!("{} (from `{}`)", err, description)))?;
    Ok(operation.apply(&erasure))
}

/// Parse with default settings.
pub fn parse_operation(text: &str, registry: &ClassRegistry) -> ParseResult<Arc<TypedOperation>> {
    OperationParser::new(registry).parse(text)
}

struct Signature<'t> {
    class: &'t str,
    name: &'t str,
    parameters: Vec<Type>,
}

/// `pkg.Class.name(type1,type2)`
fn split_signature(description: &str) -> ParseResult<Signature<'_>> {
    let malformed = || {
        OperationParseError::new(format!(
            "Expected `Class.name(types)` but found `{}`",
            description
        ))
    };
    let open = description.find('(').ok_or_else(malformed)?;
    let arguments = description[open + 1..]
        .strip_suffix(')')
        .ok_or_else(malformed)?;
    let qualified = &description[..open];
    let (class, name) = qualified.rsplit_once('.').ok_or_else(malformed)?;
    if class.is_empty() || name.is_empty() {
        return Err(malformed());
    }
    let parameters = arguments
        .split(',')
        .map(str::trim)
        .filter(|param| !param.is_empty())
        .map(|param| {
            Type::for_name(param).map_err(|err| {
                OperationParseError::new(format!(
                    "Unrecognized parameter type `{}` in `{}`: {}",
                    param, description, err
                ))
            })
        })
        .collect::<ParseResult<Vec<_>>>()?;
    Ok(Signature {
        class,
        name,
        parameters,
    })
}

/// `pkg.Class.<get>(name)` or `pkg.Class.<set>(name)`
fn split_field<'t>(description: &'t str, marker: &str) -> ParseResult<(&'t str, &'t str)> {
    let malformed = || {
        OperationParseError::new(format!(
            "Expected `Class{}name)` but found `{}`",
            marker, description
        ))
    };
    let (class, rest) = description.split_once(marker).ok_or_else(malformed)?;
    let name = rest.strip_suffix(')').ok_or_else(malformed)?.trim();
    if class.is_empty() || name.is_empty() {
        return Err(malformed());
    }
    Ok((class, name))
}

fn parse_literal(parser: &OperationParser<'_>, description: &str) -> ParseResult<Arc<TypedOperation>> {
    let term = NonreceiverTerm::parse(description, parser.registry, parser.string_maxlen)?;
    Ok(TypedOperation::create_nonreceiver_initialization(term))
}

fn parse_method(parser: &OperationParser<'_>, description: &str) -> ParseResult<Arc<TypedOperation>> {
    let signature = split_signature(description)?;
    let owner = parser.owner(signature.class, description)?;
    let class = owner.class;
    let method = parser
        .registry
        .find_method(class.name(), signature.name, &signature.parameters)
        .ok_or_else(|| {
            OperationParseError::new(format!(
                "Method `{}` not found in class {} (from `{}`)",
                signature.name, signature.class, description
            ))
        })?;
    if let Some(instantiation) = &owner.instantiation {
        return parser.instantiated_member(
            instantiation,
            method.declaring_class(),
            description,
            |declaring, inherited| Ok(TypedOperation::for_inherited_method(method, declaring, inherited)),
        );
    }
    let declaring = class.raw_type();
    let mut inputs = Vec::with_capacity(signature.parameters.len() + 1);
    if !method.is_static() {
        inputs.push(declaring.clone());
    }
    inputs.extend(method.erased_parameter_types());
    let operation = Operation::Method(MethodCall::new(Arc::clone(method)));
    Ok(Arc::new(TypedOperation::class_operation(
        operation,
        declaring,
        TypeTuple::new(inputs),
        method.return_type().erasure(),
    )))
}

fn parse_constructor(parser: &OperationParser<'_>, description: &str) -> ParseResult<Arc<TypedOperation>> {
    let signature = split_signature(description)?;
    if signature.name != "<init>" {
        return Err(OperationParseError::new(format!(
            "Expected constructor name `<init>` but found `{}` in `{}`",
            signature.name, description
        )));
    }
    let owner = parser.owner(signature.class, description)?;
    let class = owner.class;
    let constructor = class
        .declared_constructor(&signature.parameters)
        .ok_or_else(|| {
            OperationParseError::new(format!(
                "Constructor not found in class {} (from `{}`)",
                signature.class, description
            ))
        })?;
    if let Some(instantiation) = &owner.instantiation {
        return parser.instantiated_member(
            instantiation,
            class.name(),
            description,
            |_, inherited| Ok(TypedOperation::for_constructor(class, constructor).apply(inherited)),
        );
    }
    let operation = Operation::Constructor(ConstructorCall::new(class, Arc::clone(constructor)));
    Ok(Arc::new(TypedOperation::class_operation(
        operation,
        class.raw_type(),
        TypeTuple::new(signature.parameters),
        class.raw_type(),
    )))
}

fn parse_array_creation(parser: &OperationParser<'_>, description: &str) -> ParseResult<Arc<TypedOperation>> {
    let creation = InitializedArrayCreation::parse(description, parser.registry)?;
    Ok(TypedOperation::create_array_creation(
        creation.element_type().clone(),
        creation.length(),
    ))
}

fn parse_enum_constant(parser: &OperationParser<'_>, description: &str) -> ParseResult<Arc<TypedOperation>> {
    let (enum_name, constant_name) = description.rsplit_once(':').ok_or_else(|| {
        OperationParseError::new(format!(
            "Expected `EnumType:NAME` but found `{}`",
            description
        ))
    })?;
    let (enum_name, constant_name) = (enum_name.trim(), constant_name.trim());
    let class = parser.class(enum_name, description)?;
    if !class.is_enum() {
        return Err(OperationParseError::new(format!(
            "Class {} is not an enum (from `{}`)",
            enum_name, description
        )));
    }
    let value = class.enum_constant(constant_name).ok_or_else(|| {
        OperationParseError::new(format!(
            "Enum {} has no constant `{}` (from `{}`)",
            enum_name, constant_name, description
        ))
    })?;
    let constant = EnumConstant::new(value).map_err(|err| OperationParseError::new(err.to_string()))?;
    Ok(TypedOperation::for_enum_constant(constant))
}

fn parse_field_get(parser: &OperationParser<'_>, description: &str) -> ParseResult<Arc<TypedOperation>> {
    let (class_text, field_name) = split_field(description, ".<get>(")?;
    let owner = parser.owner(class_text, description)?;
    let class = owner.class;
    let field = parser.registry.find_field(class.name(), field_name).ok_or_else(|| {
        OperationParseError::new(format!(
            "Field `{}` not found in class {} (from `{}`)",
            field_name, class_text, description
        ))
    })?;
    if let Some(instantiation) = &owner.instantiation {
        return parser.instantiated_member(
            instantiation,
            field.declaring_class(),
            description,
            |declaring, inherited| Ok(TypedOperation::for_field_get(field, declaring, inherited)),
        );
    }
    let declaring = class.raw_type();
    let inputs = if field.is_static() {
        TypeTuple::empty()
    } else {
        TypeTuple::new(vec![declaring.clone()])
    };
    let operation = Operation::FieldGet(FieldGet::new(Arc::clone(field)));
    Ok(Arc::new(TypedOperation::class_operation(
        operation,
        declaring,
        inputs,
        field.field_type().erasure(),
    )))
}

fn parse_field_set(parser: &OperationParser<'_>, description: &str) -> ParseResult<Arc<TypedOperation>> {
    let (class_text, field_name) = split_field(description, ".<set>(")?;
    let owner = parser.owner(class_text, description)?;
    let class = owner.class;
    let field = parser.registry.find_field(class.name(), field_name).ok_or_else(|| {
        OperationParseError::new(format!(
            "Field `{}` not found in class {} (from `{}`)",
            field_name, class_text, description
        ))
    })?;
    if let Some(instantiation) = &owner.instantiation {
        return parser.instantiated_member(
            instantiation,
            field.declaring_class(),
            description,
            |declaring, inherited| TypedOperation::for_field_set(field, declaring, inherited),
        );
    }
    let setter = FieldSet::new(Arc::clone(field))
        .map_err(|err| OperationParseError::new(format!("{} (from `{}`)", err, description)))?;
    let declaring = class.raw_type();
    let mut inputs = Vec::with_capacity(2);
    if !field.is_static() {
        inputs.push(declaring.clone());
    }
    inputs.push(field.field_type().erasure());
    Ok(Arc::new(TypedOperation::class_operation(
        Operation::FieldSet(setter),
        declaring,
        TypeTuple::new(inputs),
        Type::Void,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{jdk, ClassCatalog, FieldDef, Value};
    use crate::types::TypeVariable;

    fn registry() -> ClassRegistry {
        ClassCatalog::new().snapshot()
    }

    #[test]
    fn parses_array_list_add() {
        let registry = registry();
        let text = "MethodCall : java.util.ArrayList.add(java.lang.Object)";
        let op = parse_operation(text, &registry).unwrap();
        assert_eq!(op.declaring_type(), Some(&Type::class(jdk::ARRAY_LIST)));
        assert_eq!(
            op.input_types().as_slice(),
            &[Type::class(jdk::ARRAY_LIST), Type::object()]
        );
        assert_eq!(op.output_type(), &Type::BOOLEAN);
        assert_eq!(op.to_parsable_string(), text);
    }

    #[test]
    fn parses_int_literal() {
        let registry = registry();
        let op = parse_operation("NonreceiverTerm : int:3", &registry).unwrap();
        match op.operation() {
            Operation::Literal(term) => {
                assert_eq!(term.ty(), &Type::INT);
                assert_eq!(term.value(), &Value::Int(3));
            }
            other => panic!("expected a literal, got {}", other),
        }
        assert_eq!(op.to_parsable_string(), "NonreceiverTerm : int:3");
    }

    #[test]
    fn parses_members_of_every_kind() {
        let registry = registry();
        for text in [
            "ConstructorCall : java.util.ArrayList.<init>(int)",
            "ConstructorCall : java.util.ArrayList.<init>()",
            "MethodCall : java.lang.String.valueOf(int)",
            "MethodCall : java.lang.Integer.parseInt(java.lang.String)",
            "FieldGet : java.lang.Integer.<get>(MAX_VALUE)",
            "EnumConstant : java.lang.Thread$State:RUNNABLE",
            "InitializedArrayCreation : java.lang.String[2]",
            "NonreceiverTerm : java.lang.String:\"a b\"",
            "NonreceiverTerm : java.lang.Object:null",
        ] {
            let op = parse_operation(text, &registry)
                .unwrap_or_else(|err| panic!("{}: {}", text, err));
            assert_eq!(op.to_parsable_string(), text);
            OperationParser::new(&registry).check_round_trip(&op).unwrap();
        }
    }

    #[test]
    fn instantiated_owner_keeps_type_arguments() {
        let registry = registry();
        let list = Type::generic(jdk::ARRAY_LIST, vec![Type::string()]);

        let text = "MethodCall : java.util.ArrayList<java.lang.String>.get(int)";
        let get = parse_operation(text, &registry).unwrap();
        assert_eq!(get.declaring_type(), Some(&list));
        assert_eq!(get.input_types().as_slice(), &[list.clone(), Type::INT]);
        assert_eq!(get.output_type(), &Type::string());
        assert!(get.is_cast());
        assert_eq!(get.to_parsable_string(), text);

        let text = "ConstructorCall : java.util.ArrayList<java.lang.String>.<init>()";
        let ctor = parse_operation(text, &registry).unwrap();
        assert_eq!(ctor.output_type(), &list);
        assert_eq!(ctor.to_parsable_string(), text);

        for bad in [
            "MethodCall : java.util.ArrayList<?>.get(int)",
            "MethodCall : java.util.ArrayList<java.lang.String,java.lang.String>.get(int)",
            "MethodCall : java.lang.String<java.lang.String>.length()",
            "MethodCall : java.util.ArrayList<int>.get(int)",
        ] {
            assert!(parse_operation(bad, &registry).is_err(), "{} should not parse", bad);
        }
    }

    #[test]
    fn static_method_has_no_receiver_input() {
        let registry = registry();
        let op = parse_operation("MethodCall : java.lang.String.valueOf(int)", &registry).unwrap();
        assert!(op.is_static());
        assert_eq!(op.input_types().as_slice(), &[Type::INT]);
    }

    #[test]
    fn field_set_parses_for_mutable_fields() {
        let catalog = ClassCatalog::new();
        catalog.register(crate::reflect::ClassDef::new("pkg.Point").field(FieldDef::new("x", Type::INT)));
        let registry = catalog.snapshot();
        let text = "FieldSet : pkg.Point.<set>(x)";
        let op = parse_operation(text, &registry).unwrap();
        assert_eq!(op.input_types().as_slice(), &[Type::class("pkg.Point"), Type::INT]);
        assert_eq!(op.output_type(), &Type::Void);
        assert_eq!(op.to_parsable_string(), text);
    }

    #[test]
    fn instantiated_fields_follow_inherited_arguments() {
        let catalog = ClassCatalog::new();
        catalog.register(
            crate::reflect::ClassDef::new("pkg.Box")
                .with_type_parameters(vec![TypeVariable::new("T")])
                .field(FieldDef::new("value", Type::variable("T"))),
        );
        catalog.register(
            crate::reflect::ClassDef::new("pkg.Crate")
                .with_type_parameters(vec![TypeVariable::new("U")])
                .extends(Type::generic("pkg.Box", vec![Type::variable("U")])),
        );
        let registry = catalog.snapshot();

        let text = "FieldSet : pkg.Crate<java.lang.Integer>.<set>(value)";
        let op = parse_operation(text, &registry).unwrap();
        let crate_type = Type::generic("pkg.Crate", vec![Type::class("java.lang.Integer")]);
        assert_eq!(
            op.input_types().as_slice(),
            &[crate_type, Type::class("java.lang.Integer")]
        );
        assert_eq!(op.to_parsable_string(), text);

        let raw = parse_operation("FieldGet : pkg.Crate.<get>(value)", &registry).unwrap();
        assert_eq!(raw.output_type(), &Type::object());
    }

    #[test]
    fn rejects_malformed_text() {
        let registry = registry();
        let cases = [
            ("MethodCall java.lang.String.length()", "no `:`"),
            ("Bogus : x", "`Bogus`"),
            ("MethodCall : java.lang.String.nothing()", "nothing"),
            ("MethodCall : pkg.Missing.m()", "pkg.Missing"),
            ("ConstructorCall : java.util.ArrayList.make()", "make"),
            ("FieldSet : java.lang.Integer.<set>(MAX_VALUE)", "static final"),
            ("EnumConstant : java.lang.Thread$State:ASLEEP", "ASLEEP"),
            ("NonreceiverTerm : int:three", "three"),
        ];
        for (text, needle) in cases {
            let err = parse_operation(text, &registry).unwrap_err();
            assert!(
                err.message.contains(needle),
                "`{}` produced `{}`",
                text,
                err.message
            );
        }
    }
}
