//! Integration tests for sequences
//!
//! Tests the flow from the persisted sequence form through execution to
//! generated Java code, driven by a session and its configuration.

use randoop::error::InternalError;
use randoop::junit::JUnitWriter;
use randoop::reflect::jdk;
use randoop::operation::{parse_operation, TypedOperation};
use randoop::sequence::{NoopVisitor, StepEvent, Variable};
use randoop::types::{Substitution, Type, TypeVariable};
use randoop::{ClassCatalog, ExecutableSequence, FailurePolicy, RandoopConfig, Sequence, Session, Value};
use tempfile::TempDir;

const LIST_SEQUENCE: &str = concat!(
    "var0 =  ConstructorCall : java.util.ArrayList.<init>() : \n",
    "var1 =  NonreceiverTerm : java.lang.String:\"hi\" : \n",
    "var2 =  MethodCall : java.util.ArrayList.add(java.lang.Object) : var0 var1 \n",
    "var3 =  MethodCall : java.util.ArrayList.size() : var0 \n",
);

const THROWING_SEQUENCE: &str = concat!(
    "var0 =  NonreceiverTerm : java.lang.String:\"seven\" : \n",
    "var1 =  MethodCall : java.lang.Integer.parseInt(java.lang.String) : var0 \n",
    "var2 =  MethodCall : java.lang.String.length() : var0 \n",
);

fn default_session() -> Session {
    Session::new(ClassCatalog::new().snapshot(), RandoopConfig::default())
}

#[test]
fn test_persisted_form_round_trips() {
    let session = default_session();
    let sequence = session.parse_sequence(LIST_SEQUENCE).unwrap();
    assert_eq!(sequence.len(), 4);
    assert_eq!(sequence.to_parsable_string(), LIST_SEQUENCE);
    assert_eq!(session.parse_sequence(&sequence.to_parsable_string()).unwrap(), sequence);
}

#[test]
fn test_result_names_are_free_form() {
    let session = default_session();
    let sequence = session
        .parse_sequence(concat!(
            "list =  ConstructorCall : java.util.ArrayList.<init>() : \n",
            "\n",
            "empty =  MethodCall : java.util.ArrayList.isEmpty() : list \n",
        ))
        .unwrap();
    assert_eq!(sequence.statement(1).unwrap().inputs(), &[0]);
}

#[test]
fn test_bad_sequences_report_the_statement() {
    let session = default_session();

    let err = session
        .parse_sequence(concat!(
            "var0 =  NonreceiverTerm : int:1 : \n",
            "var0 =  NonreceiverTerm : int:2 : \n",
        ))
        .unwrap_err();
    assert_eq!(err.index, 1);

    let err = session
        .parse_sequence("var0 =  MethodCall : java.util.ArrayList.size() : var9 \n")
        .unwrap_err();
    assert_eq!(err.index, 0);

    let err = session
        .parse_sequence("var0 =  NoSuchTag : whatever : \n")
        .unwrap_err();
    assert!(err.line.contains("NoSuchTag"));
}

#[test]
fn test_normal_execution() {
    let session = default_session();
    let sequence = session.parse_sequence(LIST_SEQUENCE).unwrap();
    let executed = session.execute(sequence, &mut NoopVisitor).unwrap();

    assert!(executed.is_normal_execution());
    assert!(!executed.has_non_executed_statements());
    assert!(!executed.has_null_input());
    assert_eq!(executed.executed_size(), 4);
    assert_eq!(executed.result(2).and_then(|r| r.value()), Some(&Value::Boolean(true)));
    assert_eq!(executed.result(3).and_then(|r| r.value()), Some(&Value::Int(1)));
}

#[test]
fn test_halt_stops_at_first_exception() {
    let session = default_session();
    let sequence = session.parse_sequence(THROWING_SEQUENCE).unwrap();
    let executed = session.execute(sequence, &mut NoopVisitor).unwrap();

    assert!(!executed.is_normal_execution());
    assert_eq!(executed.exception_index(), Some(1));
    assert_eq!(executed.executed_size(), 2);
    assert!(executed.has_non_executed_statements());
    assert!(executed.throws_exception(jdk::NUMBER_FORMAT_EXCEPTION, session.registry()));
    assert!(executed.throws_exception(jdk::RUNTIME_EXCEPTION, session.registry()));
    assert!(!executed.throws_exception(jdk::NULL_POINTER_EXCEPTION, session.registry()));
}

#[test]
fn test_require_final_rejects_early_exception() {
    let config = RandoopConfig {
        failure_policy: FailurePolicy::RequireFinal,
        ..RandoopConfig::default()
    };
    let session = Session::new(ClassCatalog::new().snapshot(), config);
    let sequence = session.parse_sequence(THROWING_SEQUENCE).unwrap();

    let err = session.execute(sequence.clone(), &mut NoopVisitor).unwrap_err();
    assert!(matches!(err, InternalError::PrematureException { index: 1, .. }));

    let registry = session.registry();
    let mut executable = ExecutableSequence::new(sequence.clone());
    let policy = FailurePolicy::RequireFinal;
    assert_eq!(executable.step(registry, policy).unwrap(), StepEvent::Executed(0));
    assert!(executable.step(registry, policy).is_err());
    assert_eq!(executable.step(registry, policy).unwrap(), StepEvent::Completed);
    assert_eq!(executable.executed_size(), 2);

    let tail = sequence.prefix(2);
    let executed = session.execute(tail, &mut NoopVisitor).unwrap();
    assert_eq!(executed.exception_index(), Some(1));
}

#[test]
fn test_stepping_and_reset() {
    let session = default_session();
    let sequence = session.parse_sequence(THROWING_SEQUENCE).unwrap();
    let mut executable = ExecutableSequence::new(sequence);

    let registry = session.registry();
    assert_eq!(executable.step(registry, FailurePolicy::Halt).unwrap(), StepEvent::Executed(0));
    assert_eq!(executable.step(registry, FailurePolicy::Halt).unwrap(), StepEvent::Halted(1));
    assert_eq!(executable.step(registry, FailurePolicy::Halt).unwrap(), StepEvent::Completed);

    executable.reset();
    assert_eq!(executable.executed_size(), 0);
    assert_eq!(executable.step(registry, FailurePolicy::Halt).unwrap(), StepEvent::Executed(0));
}

#[test]
fn test_null_input_is_recorded() {
    let session = default_session();
    let sequence = session
        .parse_sequence(concat!(
            "var0 =  ConstructorCall : java.util.ArrayList.<init>() : \n",
            "var1 =  NonreceiverTerm : java.lang.Object:null : \n",
            "var2 =  MethodCall : java.util.ArrayList.contains(java.lang.Object) : var0 var1 \n",
        ))
        .unwrap();
    let executed = session.execute(sequence, &mut NoopVisitor).unwrap();
    assert!(executed.is_normal_execution());
    assert!(executed.has_null_input());
    assert_eq!(executed.result(2).and_then(|r| r.value()), Some(&Value::Boolean(false)));
}

#[test]
fn test_generated_code() {
    let session = default_session();
    let sequence = session.parse_sequence(LIST_SEQUENCE).unwrap();
    assert_eq!(
        sequence.to_code_string(true),
        concat!(
            "java.util.ArrayList arrayList0 = new java.util.ArrayList();\n",
            "boolean b2 = arrayList0.add((java.lang.Object)\"hi\");\n",
            "int i3 = arrayList0.size();\n",
        )
    );
}

#[test]
fn test_config_file_drives_session() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("randoop.json");
    let config = RandoopConfig {
        inline_literals: false,
        omit_methods: vec!["java.lang.Integer.parseInt".to_string()],
        ..RandoopConfig::default()
    };
    config.save(&path).unwrap();

    let session = Session::new(ClassCatalog::new().snapshot(), RandoopConfig::load(&path).unwrap());
    assert!(!session.config().inline_literals);

    let names: Vec<String> = session
        .operations_for_class("java.lang.Integer")
        .iter()
        .map(|op| op.to_parsable_string())
        .collect();
    assert!(!names.iter().any(|n| n.contains("parseInt")));
    assert!(names.iter().any(|n| n.contains("MAX_VALUE")));

    let executed = session
        .execute(session.parse_sequence(THROWING_SEQUENCE).unwrap(), &mut NoopVisitor)
        .unwrap();
    let source = JUnitWriter::new("ConfigTest")
        .with_inline_literals(session.config().inline_literals)
        .render(&[executed]);
    assert!(source.contains("java.lang.String str0 = \"seven\";"));
    assert!(source.contains("} catch (java.lang.NumberFormatException e) {"));
    assert!(!source.contains("length()"));
}

#[test]
fn test_concatenated_sequences_execute() {
    let session = default_session();
    let list = session.parse_sequence(LIST_SEQUENCE).unwrap();
    let both = Sequence::concatenate(&[list.clone(), list]);
    let executed = session.execute(both, &mut NoopVisitor).unwrap();
    assert!(executed.is_normal_execution());
    assert_eq!(executed.result(7).and_then(|r| r.value()), Some(&Value::Int(1)));
}

#[test]
fn test_instantiated_generic_sequence_round_trips() {
    let session = default_session();
    let registry = session.registry();
    let to_string = Substitution::new()
        .bind(TypeVariable::new("E"), Type::string())
        .unwrap();
    let list_ops = session.operations_for_class(jdk::ARRAY_LIST);
    let list_op = |name: &str, arity: usize| {
        list_ops
            .iter()
            .find(|op| op.operation().name() == name && op.input_types().len() == arity)
            .unwrap()
            .instantiate(&to_string)
            .unwrap()
    };
    let list_type = Type::generic(jdk::ARRAY_LIST, vec![Type::string()]);
    let var = |index: usize, ty: &Type| Variable::new(index, ty.clone());

    let sequence = Sequence::new()
        .extend(list_op("<init>", 0), &[], registry)
        .and_then(|s| {
            let hi = TypedOperation::create_primitive_initialization(Type::string(), Value::String("hi".into()));
            s.extend(hi.unwrap(), &[], registry)
        })
        .and_then(|s| s.extend(list_op("add", 2), &[var(0, &list_type), var(1, &Type::string())], registry))
        .and_then(|s| {
            let zero = TypedOperation::create_primitive_initialization(Type::INT, Value::Int(0));
            s.extend(zero.unwrap(), &[], registry)
        })
        .and_then(|s| s.extend(list_op("get", 2), &[var(0, &list_type), var(3, &Type::INT)], registry))
        .and_then(|s| {
            let length = parse_operation("MethodCall : java.lang.String.length()", registry).unwrap();
            s.extend(length, &[var(4, &Type::string())], registry)
        })
        .unwrap();

    let text = sequence.to_parsable_string();
    assert!(text.contains("MethodCall : java.util.ArrayList<java.lang.String>.get(int) : var0 var3 \n"));
    let reloaded = session.parse_sequence(&text).unwrap();
    assert_eq!(reloaded, sequence);
    assert_eq!(reloaded.to_parsable_string(), text);

    let executed = session.execute(reloaded, &mut NoopVisitor).unwrap();
    assert!(executed.is_normal_execution());
    assert_eq!(executed.result(5).and_then(|r| r.value()), Some(&Value::Int(2)));
}

#[test]
fn test_null_argument_for_primitive_parameter_throws() {
    let session = default_session();
    let sequence = session
        .parse_sequence(concat!(
            "var0 =  NonreceiverTerm : java.lang.Integer:null : \n",
            "var1 =  MethodCall : java.lang.String.valueOf(int) : var0 \n",
        ))
        .unwrap();
    let executed = session.execute(sequence, &mut NoopVisitor).unwrap();
    assert!(!executed.is_normal_execution());
    assert_eq!(executed.exception_index(), Some(1));
    assert!(executed.throws_exception(jdk::NULL_POINTER_EXCEPTION, session.registry()));
}
