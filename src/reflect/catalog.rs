//! Class catalog and registry snapshots
//!
//! Hosts register class definitions with a [`ClassCatalog`]. Parsing and
//! execution run against an immutable [`ClassRegistry`] snapshot taken from
//! it, so a registry can be shared freely between threads.

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use super::class::{ClassDef, FieldDef, MethodDef};
use super::jdk;
use super::value::{ObjectRef, Value};
use crate::types::{ClassType, Substitution, Type, TypeArgument, Wildcard, OBJECT};

/// Mutable registration surface for class definitions.
pub struct ClassCatalog {
    classes: RwLock<HashMap<String, Arc<ClassDef>>>,
}

impl ClassCatalog {
    /// Catalog with no classes at all.
    pub fn empty() -> Self {
        Self {
            classes: RwLock::new(HashMap::new()),
        }
    }

    /// Catalog preloaded with the built-in platform classes.
    pub fn new() -> Self {
        let catalog = Self::empty();
        jdk::install(&catalog);
        catalog
    }

    /// Register a class definition, replacing any previous definition with
    /// the same binary name.
    pub fn register(&self, def: ClassDef) -> Arc<ClassDef> {
        let def = Arc::new(def);
        let mut classes = self.classes.write();
        if classes.insert(def.name().to_string(), Arc::clone(&def)).is_some() {
            tracing::debug!("Replaced class definition {}", def.name());
        }
        def
    }

    /// Whether a class with this binary name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.classes.read().contains_key(name)
    }

    /// Produce an immutable snapshot for parsing and execution.
    pub fn snapshot(&self) -> ClassRegistry {
        let classes = self.classes.read();
        ClassRegistry {
            classes: Arc::new(classes.clone()),
        }
    }
}

impl Default for ClassCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable view of the catalog.
#[derive(Clone)]
pub struct ClassRegistry {
    classes: Arc<HashMap<String, Arc<ClassDef>>>,
}

impl std::fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("classes", &self.classes.len())
            .finish()
    }
}

impl ClassRegistry {
    /// Class definition by binary name.
    pub fn get(&self, name: &str) -> Option<&Arc<ClassDef>> {
        self.classes.get(name)
    }

    /// Whether the snapshot contains the class.
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Registered binary names, sorted.
    pub fn class_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.classes.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Supertypes of `name` in lookup order: the class itself, its
    /// superclass chain, then interfaces breadth-first, then `Object`.
    pub fn linearize(&self, name: &str) -> Vec<String> {
        let mut order: Vec<String> = Vec::new();
        let mut next = Some(name.to_string());
        while let Some(current) = next {
            if order.contains(&current) {
                break;
            }
            next = self
                .get(&current)
                .and_then(|def| def.superclass())
                .and_then(Type::as_class)
                .map(|ct| ct.name.clone());
            order.push(current);
        }

        let mut idx = 0;
        while idx < order.len() {
            if let Some(def) = self.get(&order[idx]) {
                for interface in def.interfaces() {
                    if let Some(ct) = interface.as_class() {
                        if !order.contains(&ct.name) {
                            order.push(ct.name.clone());
                        }
                    }
                }
            }
            idx += 1;
        }

        if !order.iter().any(|n| n == OBJECT) {
            order.push(OBJECT.to_string());
        }
        order
    }

    /// Whether `sub` is `sup` or one of its subclasses/implementations.
    pub fn is_subclass(&self, sub: &str, sup: &str) -> bool {
        sub == sup || sup == OBJECT || self.linearize(sub).iter().any(|n| n == sup)
    }

    fn direct_supertypes(&self, ct: &ClassType) -> Vec<ClassType> {
        let Some(def) = self.get(&ct.name) else {
            return Vec::new();
        };
        let substitution = if ct.arguments.is_empty() || ct.arguments.len() != def.type_parameters().len() {
            None
        } else {
            let arguments: Vec<Type> = ct
                .arguments
                .iter()
                .map(|arg| match arg {
                    TypeArgument::Type(ty) => ty.clone(),
                    TypeArgument::Wildcard(Wildcard::Extends(bound)) => (**bound).clone(),
                    TypeArgument::Wildcard(_) => Type::object(),
                })
                .collect();
            Substitution::for_args(def.type_parameters(), &arguments).ok()
        };

        let mut supers: Vec<ClassType> = def
            .superclass()
            .into_iter()
            .chain(def.interfaces())
            .filter_map(|ty| {
                let projected = match &substitution {
                    Some(sub) => ty.substitute(sub),
                    None if def.type_parameters().is_empty() => ty.clone(),
                    None => ty.erasure(),
                };
                projected.as_class().cloned()
            })
            .collect();
        if def.superclass().is_none() && ct.name != OBJECT {
            supers.push(ClassType::raw(OBJECT));
        }
        supers
    }

    /// Project `ct` onto its supertype named `target`, carrying type
    /// arguments through the declared `extends`/`implements` clauses.
    pub fn as_super(&self, ct: &ClassType, target: &str) -> Option<ClassType> {
        let mut queue = VecDeque::from([ct.clone()]);
        let mut seen = HashSet::new();
        while let Some(current) = queue.pop_front() {
            if current.name == target {
                return Some(current);
            }
            if !seen.insert(current.name.clone()) {
                continue;
            }
            queue.extend(self.direct_supertypes(&current));
        }
        if target == OBJECT {
            return Some(ClassType::raw(OBJECT));
        }
        None
    }

    /// Whether a value of static type `source` may be assigned to a
    /// variable of type `target`.
    pub fn is_assignable(&self, target: &Type, source: &Type) -> bool {
        if target == source {
            return true;
        }
        match (target, source) {
            (Type::Void, _) | (_, Type::Void) => false,
            (Type::Primitive(t), Type::Primitive(s)) => s.widens_to(*t),
            (Type::Primitive(t), _) => source.unboxed().is_some_and(|s| s.widens_to(*t)),
            (_, Type::Primitive(s)) => self.is_assignable(target, &Type::boxed(*s)),
            (Type::Variable(t), Type::Variable(s)) => t.name == s.name,
            (Type::Variable(t), _) => self.is_assignable(&t.erasure(), source),
            (_, Type::Variable(s)) => self.is_assignable(target, &s.erasure()),
            (Type::Class(t), Type::Array(_)) => is_array_supertype(&t.name),
            (Type::Array(t), Type::Array(s)) => {
                if t.is_primitive() || s.is_primitive() {
                    t == s
                } else {
                    self.is_assignable(t, s)
                }
            }
            (Type::Array(_), Type::Class(_)) => false,
            (Type::Class(t), Type::Class(s)) => {
                let Some(projected) = self.as_super(s, &t.name) else {
                    return false;
                };
                if t.arguments.is_empty() || projected.arguments.is_empty() {
                    return true;
                }
                t.arguments.len() == projected.arguments.len()
                    && t
                        .arguments
                        .iter()
                        .zip(&projected.arguments)
                        .all(|(t, s)| self.contains_argument(t, s))
            }
        }
    }

    fn contains_argument(&self, target: &TypeArgument, source: &TypeArgument) -> bool {
        use TypeArgument::{Type as Plain, Wildcard as Wild};
        match (target, source) {
            (Plain(t), Plain(s)) => t == s,
            (Wild(Wildcard::Unbounded), _) => true,
            (Wild(Wildcard::Extends(bound)), Plain(s)) => self.is_assignable(bound, s),
            (Wild(Wildcard::Extends(bound)), Wild(Wildcard::Extends(s))) => {
                self.is_assignable(bound, s)
            }
            (Wild(Wildcard::Extends(bound)), Wild(Wildcard::Unbounded)) => bound.is_object(),
            (Wild(Wildcard::Super(bound)), Plain(s)) => self.is_assignable(s, bound),
            (Wild(Wildcard::Super(bound)), Wild(Wildcard::Super(s))) => {
                self.is_assignable(s, bound)
            }
            _ => false,
        }
    }

    /// Runtime `instanceof` check against the erasure of `ty`. Null is an
    /// instance of every reference type.
    pub fn is_instance(&self, value: &Value, ty: &Type) -> bool {
        match ty {
            Type::Void => false,
            Type::Primitive(p) => value.primitive_type() == Some(*p),
            Type::Variable(var) => self.is_instance(value, &var.erasure()),
            _ if value.is_null() => true,
            Type::Array(_) => match value {
                Value::Array(array) => {
                    self.is_assignable(&ty.erasure(), &Type::array(array.component().clone()))
                }
                _ => false,
            },
            Type::Class(ct) => match value {
                Value::Array(_) => is_array_supertype(&ct.name),
                _ => value
                    .runtime_class_name()
                    .is_some_and(|name| self.is_subclass(&name, &ct.name)),
            },
        }
    }

    /// Allocate an instance of `class` with every instance field along the
    /// superclass chain default-initialized.
    pub fn allocate(&self, class: &ClassDef) -> ObjectRef {
        let mut fields = BTreeMap::new();
        let mut next = Some(class.name().to_string());
        while let Some(name) = next {
            let Some(def) = self.get(&name) else {
                break;
            };
            for field in def.fields().iter().filter(|f| !f.is_static()) {
                fields
                    .entry(field.name().to_string())
                    .or_insert_with(|| Value::zero(field.field_type()));
            }
            next = def
                .superclass()
                .and_then(Type::as_class)
                .map(|ct| ct.name.clone());
        }
        ObjectRef::new(class.name(), fields)
    }

    /// Method visible on `class` with this name and erased parameters,
    /// abstract or not.
    pub fn find_method(&self, class: &str, name: &str, erased: &[Type]) -> Option<&Arc<MethodDef>> {
        self.linearize(class)
            .iter()
            .find_map(|owner| self.get(owner)?.declared_method(name, erased))
    }

    /// Most specific implementation of a method for runtime class `class`.
    pub fn resolve_virtual(&self, class: &str, name: &str, erased: &[Type]) -> Option<&Arc<MethodDef>> {
        self.linearize(class).iter().find_map(|owner| {
            self.get(owner)?
                .declared_method(name, erased)
                .filter(|method| !method.is_abstract())
        })
    }

    /// Field visible on `class` with this name.
    pub fn find_field(&self, class: &str, name: &str) -> Option<&Arc<FieldDef>> {
        self.linearize(class)
            .iter()
            .find_map(|owner| self.get(owner)?.declared_field(name))
    }
}

fn is_array_supertype(name: &str) -> bool {
    matches!(name, OBJECT | jdk::CLONEABLE | jdk::SERIALIZABLE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeVariable;

    fn registry() -> ClassRegistry {
        ClassCatalog::new().snapshot()
    }

    #[test]
    fn snapshot_is_isolated_from_later_registration() {
        let catalog = ClassCatalog::new();
        let before = catalog.snapshot();
        catalog.register(ClassDef::new("pkg.Late"));
        assert!(!before.contains("pkg.Late"));
        assert!(catalog.snapshot().contains("pkg.Late"));
    }

    #[test]
    fn projects_generic_supertypes() {
        let registry = registry();
        let list = ClassType {
            name: "java.util.ArrayList".to_string(),
            arguments: vec![TypeArgument::Type(Type::string())],
        };
        let collection = registry.as_super(&list, "java.util.Collection").unwrap();
        assert_eq!(collection.arguments, vec![TypeArgument::Type(Type::string())]);
        let raw = registry
            .as_super(&ClassType::raw("java.util.ArrayList"), "java.util.List")
            .unwrap();
        assert!(raw.arguments.is_empty());
    }

    #[test]
    fn assignability_covers_boxing_widening_and_wildcards() {
        let registry = registry();
        assert!(registry.is_assignable(&Type::LONG, &Type::INT));
        assert!(registry.is_assignable(&Type::INT, &Type::class("java.lang.Integer")));
        assert!(registry.is_assignable(&Type::object(), &Type::INT));
        assert!(registry.is_assignable(&Type::class("java.lang.Number"), &Type::DOUBLE));
        assert!(!registry.is_assignable(&Type::INT, &Type::LONG));
        assert!(!registry.is_assignable(&Type::string(), &Type::object()));

        let strings = Type::generic("java.util.ArrayList", vec![Type::string()]);
        let list_of_strings = Type::generic("java.util.List", vec![Type::string()]);
        let list_of_objects = Type::generic("java.util.List", vec![Type::object()]);
        let list_of_wild = Type::parameterized(
            "java.util.List",
            vec![TypeArgument::Wildcard(Wildcard::Extends(Box::new(Type::object())))],
        );
        assert!(registry.is_assignable(&list_of_strings, &strings));
        assert!(!registry.is_assignable(&list_of_objects, &strings));
        assert!(registry.is_assignable(&list_of_wild, &strings));
        assert!(registry.is_assignable(&Type::class("java.util.List"), &strings));
        assert!(registry.is_assignable(&list_of_strings, &Type::class("java.util.ArrayList")));
    }

    #[test]
    fn arrays_are_covariant_for_references_only() {
        let registry = registry();
        let strings = Type::array(Type::string());
        assert!(registry.is_assignable(&Type::array(Type::object()), &strings));
        assert!(!registry.is_assignable(&Type::array(Type::LONG), &Type::array(Type::INT)));
        assert!(registry.is_assignable(&Type::object(), &Type::array(Type::INT)));
        assert!(registry.is_assignable(&Type::class(jdk::CLONEABLE), &strings));
    }

    #[test]
    fn instance_checks_use_runtime_classes() {
        let registry = registry();
        assert!(registry.is_instance(&Value::Int(3), &Type::class("java.lang.Number")));
        assert!(registry.is_instance(&Value::String("x".into()), &Type::class("java.lang.Comparable")));
        assert!(!registry.is_instance(&Value::Int(3), &Type::string()));
        assert!(registry.is_instance(&Value::Null, &Type::string()));
        assert!(!registry.is_instance(&Value::Null, &Type::INT));
        assert!(registry.is_instance(&Value::Int(1), &Type::Variable(TypeVariable::new("T"))));
    }

    #[test]
    fn allocation_initializes_inherited_fields() {
        let catalog = ClassCatalog::new();
        catalog.register(ClassDef::new("pkg.Base").field(FieldDef::new("count", Type::INT)));
        catalog.register(
            ClassDef::new("pkg.Derived")
                .extends(Type::class("pkg.Base"))
                .field(FieldDef::new("name", Type::string())),
        );
        let registry = catalog.snapshot();
        let object = registry.allocate(registry.get("pkg.Derived").unwrap());
        assert_eq!(object.get_field("count"), Some(Value::Int(0)));
        assert_eq!(object.get_field("name"), Some(Value::Null));
    }
}
