//! Operations decorated with the types they are used at.
//!
//! A class operation carries the declaring type; a term operation
//! (literals, arrays, synthetic operations) does not. Both share one
//! representation, and a flag marks decorators that must check the result
//! of a call whose declared return type is a type variable.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::{
    ArrayElementSet, CodeArgument, ConstructorCall, EnumConstant, FieldGet, FieldSet,
    InitializedArrayCreation, MethodCall, NonreceiverTerm, Operation, PlusOperation,
    ReflectiveArrayCreation, UncheckedCast,
};
use crate::error::{InternalError, InternalResult, OperationError};
use crate::execution::ExecutionOutcome;
use crate::reflect::jdk;
use crate::reflect::{ClassDef, ClassRegistry, ConstructorDef, FieldDef, MethodDef, Throwable, Value};
use crate::types::{Substitution, Type, TypeTuple, TypeVariable};

/// An [`Operation`] with its declaring, input and output types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypedOperation {
    operation: Arc<Operation>,
    declaring: Option<Type>,
    inputs: TypeTuple,
    output: Type,
    cast: bool,
}

impl TypedOperation {
    /// Operation declared by a class.
    pub fn class_operation(operation: Operation, declaring: Type, inputs: TypeTuple, output: Type) -> Self {
        Self {
            operation: Arc::new(operation),
            declaring: Some(declaring),
            inputs,
            output,
            cast: false,
        }
    }

    /// Operation without a declaring class.
    pub fn term(operation: Operation, inputs: TypeTuple, output: Type) -> Self {
        Self {
            operation: Arc::new(operation),
            declaring: None,
            inputs,
            output,
            cast: false,
        }
    }

    /// Check the runtime class of normal results against the output type.
    pub fn with_cast(mut self) -> Self {
        self.cast = true;
        self
    }

    /// Constructor of `class`; inputs are the declared parameters and the
    /// output is the class type over its own type parameters.
    pub fn for_constructor(class: &ClassDef, constructor: &Arc<ConstructorDef>) -> Arc<Self> {
        let this = class.this_type();
        let inputs = TypeTuple::new(constructor.parameter_types().to_vec());
        let operation = Operation::Constructor(ConstructorCall::new(class, Arc::clone(constructor)));
        Arc::new(Self::class_operation(operation, this.clone(), inputs, this))
    }

    /// Method used through `declaring`; the receiver (for instance
    /// methods) is input 0.
    pub fn for_method(method: &Arc<MethodDef>, declaring: Type) -> Arc<Self> {
        Self::for_inherited_method(method, declaring, &Substitution::new())
    }

    /// Method declared in a supertype of `declaring`; `inherited` maps the
    /// supertype's type parameters to their arguments as seen from
    /// `declaring`.
    pub fn for_inherited_method(method: &Arc<MethodDef>, declaring: Type, inherited: &Substitution) -> Arc<Self> {
        let mut inputs = Vec::with_capacity(method.parameter_types().len() + 1);
        if !method.is_static() {
            inputs.push(declaring.clone());
        }
        inputs.extend(method.parameter_types().iter().map(|ty| ty.substitute(inherited)));
        let output = method.return_type().substitute(inherited);
        let operation = Operation::Method(MethodCall::new(Arc::clone(method)));
        let typed = Self::class_operation(operation, declaring, TypeTuple::new(inputs), output);
        Arc::new(if method.return_type().is_variable() {
            typed.with_cast()
        } else {
            typed
        })
    }

    /// Read of `field` through `declaring`.
    pub fn for_field_get(field: &Arc<FieldDef>, declaring: Type, inherited: &Substitution) -> Arc<Self> {
        let inputs = if field.is_static() {
            TypeTuple::empty()
        } else {
            TypeTuple::new(vec![declaring.clone()])
        };
        let output = field.field_type().substitute(inherited);
        let operation = Operation::FieldGet(FieldGet::new(Arc::clone(field)));
        Arc::new(Self::class_operation(operation, declaring, inputs, output))
    }

    /// Write of `field` through `declaring`; fails for `static final`
    /// fields.
    pub fn for_field_set(
        field: &Arc<FieldDef>,
        declaring: Type,
        inherited: &Substitution,
    ) -> Result<Arc<Self>, OperationError> {
        let operation = Operation::FieldSet(FieldSet::new(Arc::clone(field))?);
        let mut inputs = Vec::with_capacity(2);
        if !field.is_static() {
            inputs.push(declaring.clone());
        }
        inputs.push(field.field_type().substitute(inherited));
        Ok(Arc::new(Self::class_operation(
            operation,
            declaring,
            TypeTuple::new(inputs),
            Type::Void,
        )))
    }

    /// Enum constant of its enum type.
    pub fn for_enum_constant(constant: EnumConstant) -> Arc<Self> {
        let ty = constant.enum_type();
        Arc::new(Self::class_operation(
            Operation::EnumConstant(constant),
            ty.clone(),
            TypeTuple::empty(),
            ty,
        ))
    }

    /// Literal initialization.
    pub fn create_nonreceiver_initialization(term: NonreceiverTerm) -> Arc<Self> {
        let output = term.ty().clone();
        Arc::new(Self::term(Operation::Literal(term), TypeTuple::empty(), output))
    }

    /// Initialization with the canonical literal of `ty`.
    pub fn create_null_or_zero_initialization(ty: &Type) -> Arc<Self> {
        Self::create_nonreceiver_initialization(NonreceiverTerm::null_or_zero(ty))
    }

    /// Initialization of a primitive, boxed primitive or `String`.
    pub fn create_primitive_initialization(ty: Type, value: Value) -> Result<Arc<Self>, OperationError> {
        Ok(Self::create_nonreceiver_initialization(NonreceiverTerm::new(ty, value)?))
    }

    /// `new T[] { ... }` of `length` elements.
    pub fn create_array_creation(element_type: Type, length: usize) -> Arc<Self> {
        let inputs = TypeTuple::new(vec![element_type.clone(); length]);
        let output = Type::array(element_type.clone());
        let operation = Operation::ArrayCreation(InitializedArrayCreation::new(element_type, length));
        Arc::new(Self::term(operation, inputs, output))
    }

    /// `array[index] = value`
    pub fn create_array_element_set(element_type: Type) -> Arc<Self> {
        let inputs = TypeTuple::new(vec![
            Type::array(element_type.clone()),
            Type::INT,
            element_type.clone(),
        ]);
        let operation = Operation::ArrayElementSet(ArrayElementSet::new(element_type));
        Arc::new(Self::term(operation, inputs, Type::Void))
    }

    /// Array of a runtime length built reflectively.
    pub fn create_reflective_array_creation(element_type: Type) -> Arc<Self> {
        let output = Type::array(element_type.clone());
        let operation = Operation::ReflectiveArrayCreation(ReflectiveArrayCreation::new(element_type));
        Arc::new(Self::term(operation, TypeTuple::new(vec![Type::INT]), output))
    }

    /// Cast from `from` to `to`.
    pub fn create_unchecked_cast(from: Type, to: Type) -> Arc<Self> {
        let operation = Operation::UncheckedCast(UncheckedCast::new(to.clone()));
        Arc::new(Self::term(operation, TypeTuple::new(vec![from]), to))
    }

    /// `int + int`
    pub fn create_plus() -> Arc<Self> {
        Arc::new(Self::term(
            Operation::Plus(PlusOperation),
            TypeTuple::new(vec![Type::INT, Type::INT]),
            Type::INT,
        ))
    }

    /// Underlying operation.
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Declaring type of a class operation.
    pub fn declaring_type(&self) -> Option<&Type> {
        self.declaring.as_ref()
    }

    /// Input types, receiver first for instance operations.
    pub fn input_types(&self) -> &TypeTuple {
        &self.inputs
    }

    /// Output type.
    pub fn output_type(&self) -> &Type {
        &self.output
    }

    /// Whether normal results are checked against the output type.
    pub fn is_cast(&self) -> bool {
        self.cast
    }

    /// Whether this operation has a declaring class.
    pub fn is_class_operation(&self) -> bool {
        self.declaring.is_some()
    }

    /// Name qualified by the declaring type.
    pub fn name(&self) -> String {
        match &self.declaring {
            Some(declaring) => format!("{}.{}", declaring, self.operation.name()),
            None => self.operation.name(),
        }
    }

    /// Whether an unresolved type variable remains.
    pub fn is_generic(&self) -> bool {
        self.declaring.as_ref().is_some_and(Type::is_generic)
            || self.inputs.is_generic()
            || self.output.is_generic()
    }

    /// Whether a wildcard occurs in the input or output types.
    pub fn has_wildcard_types(&self) -> bool {
        self.inputs.has_wildcard() || self.output.has_wildcard()
    }

    /// Type parameters of the inputs, then of a parameterized output,
    /// de-duplicated in order of first occurrence.
    pub fn type_parameters(&self) -> Vec<TypeVariable> {
        let mut parameters = self.inputs.type_parameters();
        if self.output.is_parameterized() {
            for var in self.output.type_parameters() {
                if !parameters.contains(&var) {
                    parameters.push(var);
                }
            }
        }
        parameters
    }

    /// Substitute every type; the empty substitution returns `self`
    /// itself.
    pub fn apply(self: &Arc<Self>, substitution: &Substitution) -> Arc<Self> {
        if substitution.is_empty() {
            return Arc::clone(self);
        }
        Arc::new(Self {
            operation: Arc::clone(&self.operation),
            declaring: self.declaring.as_ref().map(|ty| ty.substitute(substitution)),
            inputs: self.inputs.substitute(substitution),
            output: self.output.substitute(substitution),
            cast: self.cast,
        })
    }

    /// [`TypedOperation::apply`], requiring a fully concrete result.
    pub fn instantiate(self: &Arc<Self>, substitution: &Substitution) -> InternalResult<Arc<Self>> {
        let instantiated = self.apply(substitution);
        if instantiated.is_generic() {
            let remaining: Vec<String> = instantiated
                .declaring
                .iter()
                .flat_map(Type::type_parameters)
                .chain(instantiated.inputs.type_parameters())
                .chain(instantiated.output.type_parameters())
                .map(|var| var.name)
                .collect();
            return Err(InternalError::UnresolvedType {
                operation: self.name(),
                parameters: remaining.join(", "),
            });
        }
        Ok(instantiated)
    }

    // Predicates of the wrapped operation.

    /// See [`Operation::is_static`].
    pub fn is_static(&self) -> bool {
        self.operation.is_static()
    }

    /// See [`Operation::is_message`].
    pub fn is_message(&self) -> bool {
        self.operation.is_message()
    }

    /// See [`Operation::is_method_call`].
    pub fn is_method_call(&self) -> bool {
        self.operation.is_method_call()
    }

    /// See [`Operation::is_constructor_call`].
    pub fn is_constructor_call(&self) -> bool {
        self.operation.is_constructor_call()
    }

    /// See [`Operation::is_constant_field`].
    pub fn is_constant_field(&self) -> bool {
        self.operation.is_constant_field()
    }

    /// See [`Operation::is_nonreceiving_value`].
    pub fn is_nonreceiving_value(&self) -> bool {
        self.operation.is_nonreceiving_value()
    }

    /// See [`Operation::is_unchecked_cast`].
    pub fn is_unchecked_cast(&self) -> bool {
        self.operation.is_unchecked_cast()
    }

    /// Execute on `inputs`, then apply the output check of cast-performing
    /// decorators.
    ///
    /// # Panics
    ///
    /// If `inputs.len()` differs from the operation's arity.
    pub fn execute(&self, inputs: &[Value], registry: &ClassRegistry) -> InternalResult<ExecutionOutcome> {
        let outcome = self.operation.execute(inputs, registry)?;
        if !self.cast {
            return Ok(outcome);
        }
        Ok(match outcome {
            ExecutionOutcome::Normal { value, elapsed } if !registry.is_instance(&value, &self.output) => {
                let message = format!(
                    "class {} cannot be cast to class {}",
                    value.runtime_class_name().unwrap_or_default(),
                    self.output.erasure().binary_name()
                );
                tracing::debug!("{}: {}", self.name(), message);
                ExecutionOutcome::exceptional(
                    Throwable::with_message(jdk::CLASS_CAST_EXCEPTION, message),
                    elapsed,
                )
            }
            other => other,
        })
    }

    /// Append the Java expression applying this operation to `args`.
    pub fn append_code(&self, args: &[CodeArgument], out: &mut String) {
        self.operation
            .append_code(self.declaring.as_ref(), &self.inputs, args, out);
    }

    /// `TAG : description`
    pub fn to_parsable_string(&self) -> String {
        format!(
            "{} : {}",
            self.operation.tag(),
            self.operation.description(self.declaring.as_ref())
        )
    }
}

impl PartialOrd for TypedOperation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Term operations first, then class operations by declaring type, then by
/// the wrapped operation.
impl Ord for TypedOperation {
    fn cmp(&self, other: &Self) -> Ordering {
        let by_declaring = match (&self.declaring, &other.declaring) {
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => a.name().cmp(&b.name()),
            (None, None) => Ordering::Equal,
        };
        by_declaring
            .then_with(|| self.operation.to_string().cmp(&other.operation.to_string()))
            .then_with(|| self.inputs.cmp(&other.inputs))
            .then_with(|| self.output.cmp(&other.output))
            .then_with(|| self.cast.cmp(&other.cast))
    }
}

impl fmt::Display for TypedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parameters = self.type_parameters();
        if !parameters.is_empty() {
            let names: Vec<&str> = parameters.iter().map(|var| var.name.as_str()).collect();
            write!(f, "<{}> ", names.join(","))?;
        }
        write!(f, "{} : {} -> {}", self.name(), self.inputs, self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{ClassCatalog, ClassDef};
    use crate::types::TypeVariable;

    fn box_class() -> ClassDef {
        ClassDef::new("pkg.Box")
            .with_type_parameters(vec![TypeVariable::new("T")])
            .field(FieldDef::new("value", Type::variable("T")))
            .constructor(ConstructorDef::new(vec![Type::variable("T")], |frame| {
                frame.this()?.set_field("value", frame.arg(0).clone());
                Ok(Value::Null)
            }))
            .method(MethodDef::new("get", vec![], Type::variable("T"), |frame| {
                Ok(frame.this()?.get_field("value").unwrap_or(Value::Null))
            }))
    }

    fn integer_substitution(class: &ClassDef) -> Substitution {
        Substitution::for_args(class.type_parameters(), &[Type::class("java.lang.Integer")]).unwrap()
    }

    #[test]
    fn empty_substitution_returns_the_same_decorator() {
        let class = box_class();
        let get = TypedOperation::for_method(&class.methods()[0], class.this_type());
        assert!(Arc::ptr_eq(&get, &get.apply(&Substitution::new())));
        let literal = TypedOperation::create_null_or_zero_initialization(&Type::INT);
        assert!(Arc::ptr_eq(&literal, &literal.apply(&Substitution::new())));
    }

    #[test]
    fn apply_substitutes_every_type() {
        let catalog = ClassCatalog::new();
        let class = catalog.register(box_class());
        let ctor = TypedOperation::for_constructor(&class, &class.constructors()[0]);
        assert!(ctor.is_generic());
        assert_eq!(ctor.type_parameters(), vec![TypeVariable::new("T")]);

        let concrete = ctor.instantiate(&integer_substitution(&class)).unwrap();
        let expected = Type::generic("pkg.Box", vec![Type::class("java.lang.Integer")]);
        assert_eq!(concrete.declaring_type(), Some(&expected));
        assert_eq!(concrete.output_type(), &expected);
        assert_eq!(concrete.input_types()[0], Type::class("java.lang.Integer"));
        assert!(ctor.is_generic(), "original is untouched");
    }

    #[test]
    fn instantiate_rejects_unresolved_parameters() {
        let class = box_class();
        let get = TypedOperation::for_method(&class.methods()[0], class.this_type());
        let partial = Substitution::new()
            .bind(TypeVariable::new("U"), Type::string())
            .unwrap();
        let err = get.instantiate(&partial).unwrap_err();
        assert!(matches!(err, InternalError::UnresolvedType { .. }));
    }

    #[test]
    fn cast_decorator_turns_wrong_results_into_class_cast_exceptions() {
        let catalog = ClassCatalog::new();
        let class = catalog.register(box_class());
        let registry = catalog.snapshot();

        let ctor = TypedOperation::for_constructor(&class, &class.constructors()[0]);
        let holder = ctor
            .execute(&[Value::String("text".into())], &registry)
            .unwrap();
        let holder = holder.value().cloned().unwrap();

        let get = TypedOperation::for_method(&class.methods()[0], class.this_type());
        assert!(get.is_cast());
        let get_integer = get.instantiate(&integer_substitution(&class)).unwrap();
        let outcome = get_integer.execute(&[holder.clone()], &registry).unwrap();
        let exception = outcome.exception().expect("cast must fail");
        assert_eq!(exception.class_name, jdk::CLASS_CAST_EXCEPTION);

        let get_string = get
            .instantiate(&Substitution::for_args(class.type_parameters(), &[Type::string()]).unwrap())
            .unwrap();
        let outcome = get_string.execute(&[holder], &registry).unwrap();
        assert_eq!(outcome.value(), Some(&Value::String("text".into())));
    }

    #[test]
    fn term_operations_sort_first() {
        let class = box_class();
        let get = TypedOperation::for_method(&class.methods()[0], class.this_type());
        let literal = TypedOperation::create_null_or_zero_initialization(&Type::INT);
        let mut ops = vec![get.clone(), literal.clone()];
        ops.sort();
        assert_eq!(ops, vec![literal, get]);
    }

    #[test]
    fn static_final_fields_have_no_setter() {
        let class = ClassDef::new("pkg.Consts").field(FieldDef::constant("MAX", Type::INT, Value::Int(9)));
        let field = &class.fields()[0];
        let err = TypedOperation::for_field_set(field, class.raw_type(), &Substitution::new()).unwrap_err();
        assert!(matches!(err, OperationError::StaticFinalField(_)));
        let get = TypedOperation::for_field_get(field, class.raw_type(), &Substitution::new());
        assert!(get.is_constant_field());
        assert!(get.input_types().is_empty());
    }
}
