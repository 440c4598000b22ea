//! Sequences of statements over typed operations.
//!
//! A [`Sequence`] is immutable: [`Sequence::extend`] validates the new
//! statement and returns a fresh sequence. Statements may only consume the
//! results of earlier statements, so index order is always a valid
//! execution order.

mod executable;
mod text;
mod variable;

pub use executable::{
    ExecutableSequence, ExecutionVisitor, FailurePolicy, LoggingVisitor, NoopVisitor, StepEvent,
};
pub use variable::{variable_base_name, Variable};

use std::sync::Arc;

use crate::error::SequenceError;
use crate::operation::{CodeArgument, Operation, TypedOperation};
use crate::reflect::ClassRegistry;
use crate::types::Type;

/// One operation applied to earlier results.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Statement {
    operation: Arc<TypedOperation>,
    inputs: Vec<usize>,
}

impl Statement {
    /// Typed operation applied by this statement.
    pub fn operation(&self) -> &Arc<TypedOperation> {
        &self.operation
    }

    /// Indices of the statements supplying each input.
    pub fn inputs(&self) -> &[usize] {
        &self.inputs
    }

    /// Output type of the operation.
    pub fn output_type(&self) -> &Type {
        self.operation.output_type()
    }

    /// Whether the statement produces no value.
    pub fn is_void(&self) -> bool {
        self.output_type().is_void()
    }

    /// Literal code when this statement is a non-null literal.
    fn inline_code(&self) -> Option<String> {
        match self.operation.operation() {
            Operation::Literal(term) if !term.is_null() => Some(term.code_string()),
            _ => None,
        }
    }
}

/// Ordered, immutable list of statements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Sequence {
    statements: Vec<Statement>,
}

impl Sequence {
    /// The empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of statements.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Whether there are no statements.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// All statements in order.
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Statement at `index`.
    pub fn statement(&self, index: usize) -> Option<&Statement> {
        self.statements.get(index)
    }

    /// Variable holding the result of statement `index`.
    pub fn variable(&self, index: usize) -> Option<Variable> {
        self.statements
            .get(index)
            .map(|stmt| Variable::new(index, stmt.output_type().clone()))
    }

    /// Variables of every statement, void ones included.
    pub fn variables(&self) -> Vec<Variable> {
        (0..self.len()).filter_map(|idx| self.variable(idx)).collect()
    }

    /// Variable of the final statement.
    pub fn last_variable(&self) -> Option<Variable> {
        self.len().checked_sub(1).and_then(|idx| self.variable(idx))
    }

    /// Variables bound to the inputs of statement `index`.
    pub fn input_variables(&self, index: usize) -> Vec<Variable> {
        self.statements
            .get(index)
            .map(|stmt| {
                stmt.inputs
                    .iter()
                    .filter_map(|input| self.variable(*input))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Append `operation` applied to `inputs`.
    ///
    /// Each input must name an earlier, non-void statement whose output is
    /// assignable to the operation's input type at that position.
    pub fn extend(
        &self,
        operation: Arc<TypedOperation>,
        inputs: &[Variable],
        registry: &ClassRegistry,
    ) -> Result<Sequence, SequenceError> {
        let expected = operation.input_types();
        if expected.len() != inputs.len() {
            return Err(SequenceError::ArityMismatch {
                operation: operation.name(),
                expected: expected.len(),
                actual: inputs.len(),
            });
        }
        let position = self.len();
        for (slot, (variable, declared)) in inputs.iter().zip(expected.iter()).enumerate() {
            let producer = self
                .statements
                .get(variable.index())
                .ok_or(SequenceError::ForwardReference {
                    index: variable.index(),
                    position,
                })?;
            if producer.is_void() {
                return Err(SequenceError::VoidInput(variable.index()));
            }
            if !registry.is_assignable(declared, producer.output_type()) {
                return Err(SequenceError::IncompatibleInput {
                    position: slot,
                    expected: declared.name(),
                    actual: producer.output_type().name(),
                });
            }
        }

        let mut statements = self.statements.clone();
        statements.push(Statement {
            operation,
            inputs: inputs.iter().map(Variable::index).collect(),
        });
        Ok(Sequence { statements })
    }

    /// Sequences laid end to end, input indices shifted.
    pub fn concatenate(sequences: &[Sequence]) -> Sequence {
        let mut statements = Vec::new();
        for sequence in sequences {
            let offset = statements.len();
            statements.extend(sequence.statements.iter().map(|stmt| Statement {
                operation: Arc::clone(&stmt.operation),
                inputs: stmt.inputs.iter().map(|input| input + offset).collect(),
            }));
        }
        Sequence { statements }
    }

    /// The first `length` statements.
    pub fn prefix(&self, length: usize) -> Sequence {
        Sequence {
            statements: self.statements.iter().take(length).cloned().collect(),
        }
    }

    /// Whether statement `index` is a literal written at its use sites.
    pub fn is_inlined(&self, index: usize) -> bool {
        self.statements
            .get(index)
            .is_some_and(|stmt| stmt.inline_code().is_some())
    }

    /// Java source for statement `index`; empty for out-of-range indices.
    pub fn statement_code(&self, index: usize, inline_literals: bool) -> String {
        let Some(stmt) = self.statements.get(index) else {
            return String::new();
        };
        let args: Vec<CodeArgument> = stmt
            .inputs
            .iter()
            .map(|input| {
                let producer = &self.statements[*input];
                let name = Variable::new(*input, producer.output_type().clone()).name();
                let ty = producer.output_type().clone();
                match producer.inline_code().filter(|_| inline_literals) {
                    Some(code) => CodeArgument::inlined(name, ty, code),
                    None => CodeArgument::new(name, ty),
                }
            })
            .collect();

        let mut out = String::new();
        if stmt.operation.is_unchecked_cast() {
            out.push_str("@SuppressWarnings(\"unchecked\")\n");
        }
        if !stmt.is_void() {
            let variable = Variable::new(index, stmt.output_type().clone());
            out.push_str(&format!("{} {} = ", stmt.output_type().name(), variable.name()));
        }
        stmt.operation.append_code(&args, &mut out);
        out.push(';');
        out
    }

    /// Emitted statements as `(index, code)`, skipping inlined literals
    /// other than the final statement.
    pub fn code_lines(&self, inline_literals: bool) -> Vec<(usize, String)> {
        let last = self.len().saturating_sub(1);
        (0..self.len())
            .filter(|idx| !(inline_literals && *idx != last && self.is_inlined(*idx)))
            .map(|idx| (idx, self.statement_code(idx, inline_literals)))
            .collect()
    }

    /// Java source for the whole sequence, one statement per line.
    pub fn to_code_string(&self, inline_literals: bool) -> String {
        let mut out = String::new();
        for (_, code) in self.code_lines(inline_literals) {
            out.push_str(&code);
            out.push('\n');
        }
        out
    }
}
