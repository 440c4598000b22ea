//! One generation run: class registry, configuration and an id.

use std::sync::Arc;

use uuid::Uuid;

use crate::config::RandoopConfig;
use crate::error::{InternalResult, ParseResult, SequenceParseError};
use crate::operation::{operations_for_class, OperationParser, TypedOperation};
use crate::reflect::ClassRegistry;
use crate::sequence::{ExecutableSequence, ExecutionVisitor, Sequence};

/// Context handed to everything that parses, enumerates or executes.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    registry: ClassRegistry,
    config: RandoopConfig,
}

impl Session {
    /// New session over a registry snapshot.
    pub fn new(registry: ClassRegistry, config: RandoopConfig) -> Self {
        let id = Uuid::new_v4();
        tracing::debug!("session {} over {} classes", id, registry.len());
        Self { id, registry, config }
    }

    /// Session identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Class registry.
    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    /// Configuration.
    pub fn config(&self) -> &RandoopConfig {
        &self.config
    }

    /// Operation parser honoring the configured string bound.
    pub fn parser(&self) -> OperationParser<'_> {
        OperationParser::new(&self.registry).with_string_maxlen(self.config.string_maxlen)
    }

    /// Parse one `TAG : description` line.
    pub fn parse_operation(&self, text: &str) -> ParseResult<Arc<TypedOperation>> {
        self.parser().parse(text)
    }

    /// Parse a persisted sequence.
    pub fn parse_sequence(&self, text: &str) -> Result<Sequence, SequenceParseError> {
        Sequence::parse(text, &self.parser())
    }

    /// Operations of `class_name` allowed by the configured filter.
    pub fn operations_for_class(&self, class_name: &str) -> Vec<Arc<TypedOperation>> {
        operations_for_class(class_name, &self.registry, &self.config.reflection_predicate())
    }

    /// Execute `sequence` under the configured failure policy.
    pub fn execute(
        &self,
        sequence: Sequence,
        visitor: &mut dyn ExecutionVisitor,
    ) -> InternalResult<ExecutableSequence> {
        let mut executable = ExecutableSequence::new(sequence);
        executable.execute(&self.registry, self.config.failure_policy, visitor)?;
        Ok(executable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::ClassCatalog;
    use crate::sequence::NoopVisitor;

    #[test]
    fn sessions_are_distinct() {
        let registry = ClassCatalog::new().snapshot();
        let a = Session::new(registry.clone(), RandoopConfig::default());
        let b = Session::new(registry, RandoopConfig::default());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn string_bound_applies_to_parsing() {
        let config = RandoopConfig {
            string_maxlen: 3,
            ..RandoopConfig::default()
        };
        let session = Session::new(ClassCatalog::new().snapshot(), config);
        assert!(session.parse_operation("NonreceiverTerm : java.lang.String:\"abc\"").is_ok());
        assert!(session.parse_operation("NonreceiverTerm : java.lang.String:\"abcd\"").is_err());
    }

    #[test]
    fn execute_uses_configured_policy() {
        let session = Session::new(ClassCatalog::new().snapshot(), RandoopConfig::default());
        let sequence = session
            .parse_sequence("var0 =  NonreceiverTerm : int:3 : \n")
            .unwrap();
        let executed = session.execute(sequence, &mut NoopVisitor).unwrap();
        assert!(executed.is_normal_execution());
        assert!(!session.operations_for_class("java.lang.Integer").is_empty());
    }
}
