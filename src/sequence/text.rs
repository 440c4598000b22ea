//! Persisted sequence form, one statement per line:
//! `var2 =  MethodCall : java.util.ArrayList.add(java.lang.Object) : var0 var1 `

use std::collections::HashMap;

use super::{Sequence, Variable};
use crate::error::SequenceParseError;
use crate::operation::OperationParser;

const VARIABLE_PREFIX: &str = "var";

impl Sequence {
    /// Persisted form; [`Sequence::parse`] reads it back.
    pub fn to_parsable_string(&self) -> String {
        let mut out = String::new();
        for (index, stmt) in self.statements.iter().enumerate() {
            out.push_str(&format!(
                "{}{} =  {} : ",
                VARIABLE_PREFIX,
                index,
                stmt.operation().to_parsable_string()
            ));
            for input in stmt.inputs() {
                out.push_str(&format!("{}{} ", VARIABLE_PREFIX, input));
            }
            out.push('\n');
        }
        out
    }

    /// Parse the persisted form. Blank lines are skipped; result names only
    /// need to be unique and declared before use.
    pub fn parse(text: &str, parser: &OperationParser<'_>) -> Result<Sequence, SequenceParseError> {
        let mut sequence = Sequence::new();
        let mut names: HashMap<String, usize> = HashMap::new();

        for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
            let index = sequence.len();
            let fail = |message: String| {
                tracing::warn!("rejected statement {} `{}`: {}", index, line, message);
                SequenceParseError {
                    message,
                    index,
                    line: line.to_string(),
                }
            };

            let (name, rest) = line
                .split_once('=')
                .ok_or_else(|| fail("expected `name = operation : inputs`".to_string()))?;
            let name = name.trim();
            if name.is_empty() || name.contains(char::is_whitespace) {
                return Err(fail(format!("malformed result name `{}`", name)));
            }
            if names.contains_key(name) {
                return Err(fail(format!("duplicate result name `{}`", name)));
            }
            let (operation_text, input_text) = rest
                .rsplit_once(':')
                .ok_or_else(|| fail("expected `: inputs` after the operation".to_string()))?;

            let operation = parser
                .parse(operation_text.trim())
                .map_err(|err| fail(err.message))?;

            let mut inputs = Vec::new();
            for input in input_text.split_whitespace() {
                let producer = *names
                    .get(input)
                    .ok_or_else(|| fail(format!("undeclared input variable `{}`", input)))?;
                let ty = sequence
                    .statement(producer)
                    .map(|stmt| stmt.output_type().clone())
                    .ok_or_else(|| fail(format!("undeclared input variable `{}`", input)))?;
                inputs.push(Variable::new(producer, ty));
            }

            sequence = sequence
                .extend(operation, &inputs, parser.registry())
                .map_err(|err| fail(err.to_string()))?;
            names.insert(name.to_string(), index);
        }
        Ok(sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::ClassCatalog;

    const LIST_SEQUENCE: &str = concat!(
        "var0 =  ConstructorCall : java.util.ArrayList.<init>() : \n",
        "var1 =  NonreceiverTerm : java.lang.String:\"a:b\" : \n",
        "var2 =  MethodCall : java.util.ArrayList.add(java.lang.Object) : var0 var1 \n",
    );

    #[test]
    fn persisted_form_round_trips() {
        let registry = ClassCatalog::new().snapshot();
        let parser = OperationParser::new(&registry);
        let seq = Sequence::parse(LIST_SEQUENCE, &parser).unwrap();
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.statement(2).unwrap().inputs(), &[0, 1]);
        assert_eq!(seq.to_parsable_string(), LIST_SEQUENCE);
    }

    #[test]
    fn accepts_arbitrary_names() {
        let registry = ClassCatalog::new().snapshot();
        let parser = OperationParser::new(&registry);
        let text = "list = ConstructorCall : java.util.ArrayList.<init>() :\n\
                    n = MethodCall : java.util.ArrayList.size() : list\n";
        let seq = Sequence::parse(text, &parser).unwrap();
        assert_eq!(seq.statement(1).unwrap().inputs(), &[0]);
    }

    #[test]
    fn reports_offending_statement() {
        let registry = ClassCatalog::new().snapshot();
        let parser = OperationParser::new(&registry);

        let text = "var0 =  NonreceiverTerm : int:1 : \nvar0 =  NonreceiverTerm : int:2 : \n";
        let err = Sequence::parse(text, &parser).unwrap_err();
        assert_eq!(err.index, 1);
        assert!(err.message.contains("duplicate"));

        let text = "var0 =  MethodCall : java.util.ArrayList.size() : var9 \n";
        let err = Sequence::parse(text, &parser).unwrap_err();
        assert_eq!(err.index, 0);
        assert!(err.message.contains("var9"));

        let text = "var0 =  NonreceiverTerm : int:1 : \nvar1 =  Nope : x : \n";
        let err = Sequence::parse(text, &parser).unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(err.line, "var1 =  Nope : x :");
        assert!(err.message.contains("Nope"));
    }
}
