//! Enumeration of the operations a class offers.

use std::collections::HashSet;
use std::sync::Arc;

use super::{EnumConstant, TypedOperation};
use crate::reflect::{ClassDef, ClassRegistry, ConstructorDef, FieldDef, MethodDef};
use crate::types::{ClassType, Substitution, Type, TypeArgument, Wildcard};

/// Filter over reflective members eligible for operations.
pub trait ReflectionPredicate: Send + Sync {
    /// Whether operations of `class` are wanted at all.
    fn test_class(&self, class: &ClassDef) -> bool {
        let _ = class;
        true
    }

    /// Whether `method` is eligible.
    fn test_method(&self, method: &MethodDef) -> bool {
        let _ = method;
        true
    }

    /// Whether `constructor` is eligible.
    fn test_constructor(&self, constructor: &ConstructorDef) -> bool {
        let _ = constructor;
        true
    }

    /// Whether `field` is eligible.
    fn test_field(&self, field: &FieldDef) -> bool {
        let _ = field;
        true
    }
}

/// Keeps public members whose name is not omitted.
///
/// Omit entries match either the bare member name (`hashCode`) or the
/// qualified one (`java.lang.Object.hashCode`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultReflectionPredicate {
    omit: Vec<String>,
    public_only: bool,
}

impl DefaultReflectionPredicate {
    /// Predicate with an omit list.
    pub fn new(omit: Vec<String>, public_only: bool) -> Self {
        Self { omit, public_only }
    }

    fn omitted(&self, declaring: &str, name: &str) -> bool {
        self.omit
            .iter()
            .any(|entry| entry == name || *entry == format!("{}.{}", declaring, name))
    }

    fn visible(&self, public: bool) -> bool {
        !self.public_only || public
    }
}

impl Default for DefaultReflectionPredicate {
    fn default() -> Self {
        Self::new(Vec::new(), true)
    }
}

impl ReflectionPredicate for DefaultReflectionPredicate {
    fn test_class(&self, class: &ClassDef) -> bool {
        self.visible(class.is_public())
    }

    fn test_method(&self, method: &MethodDef) -> bool {
        self.visible(method.modifiers().is_public())
            && !self.omitted(method.declaring_class(), method.name())
    }

    fn test_constructor(&self, constructor: &ConstructorDef) -> bool {
        self.visible(constructor.modifiers().is_public())
    }

    fn test_field(&self, field: &FieldDef) -> bool {
        self.visible(field.modifiers().is_public())
            && !self.omitted(field.declaring_class(), field.name())
    }
}

/// Type arguments of `owner` as seen from `ct`; wildcards become their
/// upper bound.
pub(crate) fn inherited_substitution(registry: &ClassRegistry, ct: &ClassType, owner: &ClassDef) -> Substitution {
    if owner.type_parameters().is_empty() {
        return Substitution::new();
    }
    let Some(projected) = registry.as_super(ct, owner.name()) else {
        return Substitution::new();
    };
    let arguments: Vec<Type> = projected
        .arguments
        .iter()
        .map(|arg| match arg {
            TypeArgument::Type(ty) => ty.clone(),
            TypeArgument::Wildcard(Wildcard::Extends(bound)) => (**bound).clone(),
            TypeArgument::Wildcard(_) => Type::object(),
        })
        .collect();
    Substitution::for_args(owner.type_parameters(), &arguments).unwrap_or_else(|_| Substitution::new())
}

/// Every operation of class `name` that passes `predicate`, sorted.
///
/// Constructors are skipped for abstract types. Methods and fields are
/// collected along the supertype order, the most specific declaration
/// winning, with inherited signatures rewritten in terms of the class's own
/// type parameters. Static members are only taken from the class itself.
pub fn operations_for_class(
    name: &str,
    registry: &ClassRegistry,
    predicate: &dyn ReflectionPredicate,
) -> Vec<Arc<TypedOperation>> {
    let Some(class) = registry.get(name) else {
        tracing::warn!("no class {} in registry", name);
        return Vec::new();
    };
    if !predicate.test_class(class) {
        tracing::debug!("class {} rejected by predicate", name);
        return Vec::new();
    }
    let declaring = class.this_type();
    let this_class = declaring
        .as_class()
        .cloned()
        .unwrap_or_else(|| ClassType::raw(name));

    let mut operations = Vec::new();
    if !class.is_abstract() {
        operations.extend(
            class
                .constructors()
                .iter()
                .filter(|ctor| predicate.test_constructor(ctor))
                .map(|ctor| TypedOperation::for_constructor(class, ctor)),
        );
    }

    let mut seen_methods: HashSet<(String, Vec<Type>)> = HashSet::new();
    let mut seen_fields: HashSet<String> = HashSet::new();
    for owner_name in registry.linearize(name) {
        let Some(owner) = registry.get(&owner_name) else {
            continue;
        };
        let inherited = owner_name != name;
        let substitution = if inherited {
            inherited_substitution(registry, &this_class, owner)
        } else {
            Substitution::new()
        };

        for method in owner.methods() {
            if inherited && method.is_static() {
                continue;
            }
            let key = (method.name().to_string(), method.erased_parameter_types());
            if !seen_methods.insert(key) || !predicate.test_method(method) {
                continue;
            }
            operations.push(TypedOperation::for_inherited_method(
                method,
                declaring.clone(),
                &substitution,
            ));
        }

        for field in owner.fields() {
            if inherited && field.is_static() {
                continue;
            }
            if !seen_fields.insert(field.name().to_string()) || !predicate.test_field(field) {
                continue;
            }
            operations.push(TypedOperation::for_field_get(field, declaring.clone(), &substitution));
            if let Ok(setter) = TypedOperation::for_field_set(field, declaring.clone(), &substitution) {
                operations.push(setter);
            }
        }
    }

    if class.is_enum() {
        operations.extend(
            class
                .enum_values()
                .iter()
                .filter_map(|value| EnumConstant::new(value.clone()).ok())
                .map(TypedOperation::for_enum_constant),
        );
    }

    operations.sort();
    tracing::debug!("{} operations for {}", operations.len(), name);
    operations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{jdk, ClassCatalog};

    fn names(ops: &[Arc<TypedOperation>]) -> Vec<String> {
        ops.iter().map(|op| op.operation().name()).collect()
    }

    #[test]
    fn array_list_operations_are_generic_and_deduplicated() {
        let registry = ClassCatalog::new().snapshot();
        let ops = operations_for_class(jdk::ARRAY_LIST, &registry, &DefaultReflectionPredicate::default());

        let constructors = ops.iter().filter(|op| op.is_constructor_call()).count();
        assert_eq!(constructors, 2);

        let adds: Vec<_> = ops
            .iter()
            .filter(|op| op.operation().name() == "add")
            .collect();
        assert_eq!(adds.len(), 2, "Collection.add is shadowed by ArrayList.add");
        let single = adds
            .iter()
            .find(|op| op.input_types().len() == 2)
            .unwrap();
        assert_eq!(single.input_types()[1], Type::variable("E"));
        assert_eq!(single.type_parameters().len(), 1);

        let mut sorted = ops.clone();
        sorted.sort();
        assert_eq!(ops, sorted);
        assert!(names(&ops).contains(&"hashCode".to_string()));
    }

    #[test]
    fn enum_constants_and_inherited_methods() {
        let registry = ClassCatalog::new().snapshot();
        let ops = operations_for_class(jdk::THREAD_STATE, &registry, &DefaultReflectionPredicate::default());
        let constants = ops
            .iter()
            .filter(|op| matches!(op.operation(), super::super::Operation::EnumConstant(_)))
            .count();
        assert_eq!(constants, 6);
        assert!(!ops.iter().any(|op| op.is_constructor_call()));

        let compare = ops
            .iter()
            .find(|op| op.operation().name() == "compareTo")
            .unwrap();
        assert_eq!(compare.input_types()[1], Type::class(jdk::THREAD_STATE));
    }

    #[test]
    fn constant_fields_have_getters_only() {
        let registry = ClassCatalog::new().snapshot();
        let ops = operations_for_class("java.lang.Integer", &registry, &DefaultReflectionPredicate::default());
        let max: Vec<_> = ops
            .iter()
            .filter(|op| op.operation().name().contains("MAX_VALUE"))
            .collect();
        assert_eq!(max.len(), 1);
        assert!(max[0].is_constant_field());
    }

    #[test]
    fn omit_list_filters_methods() {
        let registry = ClassCatalog::new().snapshot();
        let predicate = DefaultReflectionPredicate::new(
            vec!["hashCode".into(), "java.lang.String.concat".into()],
            true,
        );
        let ops = operations_for_class("java.lang.String", &registry, &predicate);
        let names = names(&ops);
        assert!(!names.contains(&"hashCode".to_string()));
        assert!(!names.contains(&"concat".to_string()));
        assert!(names.contains(&"length".to_string()));
    }

    #[test]
    fn unknown_class_has_no_operations() {
        let registry = ClassCatalog::new().snapshot();
        assert!(operations_for_class("pkg.Nowhere", &registry, &DefaultReflectionPredicate::default()).is_empty());
    }
}
