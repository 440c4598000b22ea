//! Statement-by-statement execution of a sequence.

use serde::{Deserialize, Serialize};

use super::Sequence;
use crate::error::{InternalError, InternalResult};
use crate::execution::ExecutionOutcome;
use crate::reflect::{ClassRegistry, Value};

/// What to do when a statement throws.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first exceptional statement.
    #[default]
    Halt,
    /// Only the final statement may throw; an earlier exception is an
    /// internal error.
    RequireFinal,
}

/// Observer of sequence execution.
pub trait ExecutionVisitor {
    /// Called once before the first statement.
    fn initialize(&mut self, sequence: &ExecutableSequence) {
        let _ = sequence;
    }

    /// Called before statement `index` executes.
    fn visit_before(&mut self, sequence: &ExecutableSequence, index: usize) {
        let _ = (sequence, index);
    }

    /// Called after statement `index` executes; its outcome is available.
    fn visit_after(&mut self, sequence: &ExecutableSequence, index: usize) {
        let _ = (sequence, index);
    }

    /// Called once when execution stops.
    fn visit_after_sequence(&mut self, sequence: &ExecutableSequence) {
        let _ = sequence;
    }
}

/// Visitor that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopVisitor;

impl ExecutionVisitor for NoopVisitor {}

/// Visitor that traces every outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingVisitor;

impl ExecutionVisitor for LoggingVisitor {
    fn initialize(&mut self, sequence: &ExecutableSequence) {
        tracing::debug!("executing sequence of {} statements", sequence.sequence().len());
    }

    fn visit_after(&mut self, sequence: &ExecutableSequence, index: usize) {
        if let Some(outcome) = sequence.result(index) {
            tracing::trace!("statement {}: {}", index, outcome);
        }
    }

    fn visit_after_sequence(&mut self, sequence: &ExecutableSequence) {
        tracing::debug!(
            "sequence finished after {} statements (normal: {})",
            sequence.executed_size(),
            sequence.is_normal_execution()
        );
    }
}

/// Progress of one [`ExecutableSequence::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    /// Statement executed; execution may continue.
    Executed(usize),
    /// Statement threw and execution stopped.
    Halted(usize),
    /// Nothing left to execute.
    Completed,
}

/// A sequence together with the outcomes of its executed prefix.
#[derive(Debug, Clone)]
pub struct ExecutableSequence {
    sequence: Sequence,
    outcomes: Vec<ExecutionOutcome>,
    null_input: bool,
    halted: bool,
}

impl ExecutableSequence {
    /// Wrap `sequence`; nothing is executed yet.
    pub fn new(sequence: Sequence) -> Self {
        Self {
            sequence,
            outcomes: Vec::new(),
            null_input: false,
            halted: false,
        }
    }

    /// The wrapped sequence.
    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    /// Forget all outcomes.
    pub fn reset(&mut self) {
        self.outcomes.clear();
        self.null_input = false;
        self.halted = false;
    }

    fn next_index(&self) -> Option<usize> {
        let index = self.outcomes.len();
        (!self.halted && index < self.sequence.len()).then_some(index)
    }

    /// Execute the next statement.
    pub fn step(&mut self, registry: &ClassRegistry, policy: FailurePolicy) -> InternalResult<StepEvent> {
        let Some(index) = self.next_index() else {
            return Ok(StepEvent::Completed);
        };
        let Some(statement) = self.sequence.statement(index) else {
            return Ok(StepEvent::Completed);
        };

        let mut values = Vec::with_capacity(statement.inputs().len());
        for input in statement.inputs() {
            match self.outcomes.get(*input) {
                Some(ExecutionOutcome::Normal { value, .. }) => values.push(value.clone()),
                _ => return Err(InternalError::MissingInput(*input)),
            }
        }
        if values.iter().any(Value::is_null) {
            self.null_input = true;
        }

        let outcome = statement.operation().execute(&values, registry)?;
        let thrown = outcome.exception().map(ToString::to_string);
        self.outcomes.push(outcome);

        match (thrown, policy) {
            (None, _) => Ok(StepEvent::Executed(index)),
            (Some(exception), FailurePolicy::RequireFinal) if index + 1 < self.sequence.len() => {
                tracing::warn!("statement {} threw {} before the final statement", index, exception);
                self.halted = true;
                Err(InternalError::PrematureException { index, exception })
            }
            (Some(exception), _) => {
                tracing::debug!("statement {} threw {}", index, exception);
                self.halted = true;
                Ok(StepEvent::Halted(index))
            }
        }
    }

    /// Execute every remaining statement, notifying `visitor`.
    pub fn execute(
        &mut self,
        registry: &ClassRegistry,
        policy: FailurePolicy,
        visitor: &mut dyn ExecutionVisitor,
    ) -> InternalResult<()> {
        visitor.initialize(self);
        while let Some(index) = self.next_index() {
            visitor.visit_before(self, index);
            self.step(registry, policy)?;
            visitor.visit_after(self, index);
        }
        visitor.visit_after_sequence(self);
        Ok(())
    }

    /// Outcome of statement `index`, if it was executed.
    pub fn result(&self, index: usize) -> Option<&ExecutionOutcome> {
        self.outcomes.get(index)
    }

    /// All outcomes in statement order.
    pub fn results(&self) -> &[ExecutionOutcome] {
        &self.outcomes
    }

    /// Number of executed statements.
    pub fn executed_size(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether every statement executed and completed normally.
    pub fn is_normal_execution(&self) -> bool {
        self.outcomes.len() == self.sequence.len() && self.outcomes.iter().all(ExecutionOutcome::is_normal)
    }

    /// Index of the first statement that threw.
    pub fn exception_index(&self) -> Option<usize> {
        self.outcomes.iter().position(|outcome| !outcome.is_normal())
    }

    /// Whether a statement threw an exception of class `class_name` or a
    /// subclass of it.
    pub fn throws_exception(&self, class_name: &str, registry: &ClassRegistry) -> bool {
        self.outcomes
            .iter()
            .filter_map(ExecutionOutcome::exception)
            .any(|thrown| registry.is_subclass(&thrown.class_name, class_name))
    }

    /// Whether execution stopped before the end.
    pub fn has_non_executed_statements(&self) -> bool {
        self.outcomes.len() < self.sequence.len()
    }

    /// Whether some executed statement received a null input.
    pub fn has_null_input(&self) -> bool {
        self.null_input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::OperationParser;
    use crate::reflect::{jdk, ClassCatalog};

    const THROWING: &str = concat!(
        "var0 =  ConstructorCall : java.util.ArrayList.<init>() : \n",
        "var1 =  NonreceiverTerm : int:5 : \n",
        "var2 =  MethodCall : java.util.ArrayList.get(int) : var0 var1 \n",
        "var3 =  MethodCall : java.util.ArrayList.size() : var0 \n",
    );

    fn sequence(registry: &ClassRegistry, text: &str) -> ExecutableSequence {
        let parser = OperationParser::new(registry);
        ExecutableSequence::new(Sequence::parse(text, &parser).unwrap())
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl ExecutionVisitor for Recorder {
        fn initialize(&mut self, _: &ExecutableSequence) {
            self.events.push("init".into());
        }

        fn visit_before(&mut self, _: &ExecutableSequence, index: usize) {
            self.events.push(format!("before {}", index));
        }

        fn visit_after(&mut self, sequence: &ExecutableSequence, index: usize) {
            let normal = sequence.result(index).is_some_and(ExecutionOutcome::is_normal);
            self.events.push(format!("after {} {}", index, normal));
        }

        fn visit_after_sequence(&mut self, _: &ExecutableSequence) {
            self.events.push("done".into());
        }
    }

    #[test]
    fn halt_stops_at_first_exception() {
        let registry = ClassCatalog::new().snapshot();
        let mut exec = sequence(&registry, THROWING);
        let mut recorder = Recorder::default();
        exec.execute(&registry, FailurePolicy::Halt, &mut recorder).unwrap();

        assert_eq!(exec.executed_size(), 3);
        assert_eq!(exec.exception_index(), Some(2));
        assert!(exec.has_non_executed_statements());
        assert!(!exec.is_normal_execution());
        assert!(exec.throws_exception(jdk::INDEX_OUT_OF_BOUNDS_EXCEPTION, &registry));
        assert!(exec.throws_exception(jdk::RUNTIME_EXCEPTION, &registry));
        assert!(!exec.throws_exception(jdk::NULL_POINTER_EXCEPTION, &registry));
        assert_eq!(
            recorder.events,
            vec![
                "init", "before 0", "after 0 true", "before 1", "after 1 true", "before 2",
                "after 2 false", "done"
            ]
        );
    }

    #[test]
    fn require_final_rejects_early_exceptions() {
        let registry = ClassCatalog::new().snapshot();
        let mut exec = sequence(&registry, THROWING);
        let err = exec
            .execute(&registry, FailurePolicy::RequireFinal, &mut NoopVisitor)
            .unwrap_err();
        assert!(matches!(err, InternalError::PrematureException { index: 2, .. }));

        let prefix = exec.sequence().prefix(3);
        let mut exec = ExecutableSequence::new(prefix);
        exec.execute(&registry, FailurePolicy::RequireFinal, &mut NoopVisitor)
            .unwrap();
        assert_eq!(exec.exception_index(), Some(2));
        assert!(!exec.has_non_executed_statements());
    }

    #[test]
    fn normal_execution_and_null_inputs() {
        let registry = ClassCatalog::new().snapshot();
        let text = concat!(
            "var0 =  ConstructorCall : java.util.ArrayList.<init>() : \n",
            "var1 =  NonreceiverTerm : java.lang.Object:null : \n",
            "var2 =  MethodCall : java.util.ArrayList.add(java.lang.Object) : var0 var1 \n",
            "var3 =  MethodCall : java.util.ArrayList.size() : var0 \n",
        );
        let mut exec = sequence(&registry, text);
        assert_eq!(exec.step(&registry, FailurePolicy::Halt).unwrap(), StepEvent::Executed(0));
        exec.execute(&registry, FailurePolicy::Halt, &mut LoggingVisitor).unwrap();
        assert!(exec.is_normal_execution());
        assert!(exec.has_null_input());
        assert_eq!(exec.result(3).and_then(ExecutionOutcome::value), Some(&Value::Int(1)));
        assert_eq!(exec.step(&registry, FailurePolicy::Halt).unwrap(), StepEvent::Completed);

        exec.reset();
        assert_eq!(exec.executed_size(), 0);
        assert!(!exec.has_null_input());
    }
}
