//! JUnit 4 rendering of executed sequences.

use crate::sequence::ExecutableSequence;
use crate::types::Type;

const INDENT: &str = "    ";

/// Writes one test class with a test method per sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JUnitWriter {
    class_name: String,
    package: Option<String>,
    inline_literals: bool,
}

impl JUnitWriter {
    /// Writer for a class in the default package.
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            package: None,
            inline_literals: true,
        }
    }

    /// Place the class in `package`.
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// Toggle literal inlining.
    pub fn with_inline_literals(mut self, inline_literals: bool) -> Self {
        self.inline_literals = inline_literals;
        self
    }

    /// Complete source of the test class.
    pub fn render(&self, tests: &[ExecutableSequence]) -> String {
        let mut out = String::new();
        if let Some(package) = &self.package {
            out.push_str(&format!("package {};\n\n", package));
        }
        out.push_str("import org.junit.Test;\n");
        out.push_str("import static org.junit.Assert.*;\n\n");
        out.push_str(&format!("public class {} {{\n", self.class_name));
        for (idx, test) in tests.iter().enumerate() {
            out.push('\n');
            out.push_str(&format!("{}@Test\n", INDENT));
            out.push_str(&format!("{}public void test{}() throws Throwable {{\n", INDENT, idx));
            self.render_body(test, &mut out);
            out.push_str(&format!("{}}}\n", INDENT));
        }
        out.push_str("}\n");
        out
    }

    /// Statements of one test method; an exceptional final statement is
    /// wrapped in `try`/`fail`/`catch`.
    fn render_body(&self, test: &ExecutableSequence, out: &mut String) {
        let body_indent = INDENT.repeat(2);
        let thrown = test
            .exception_index()
            .and_then(|idx| test.result(idx).and_then(|r| r.exception()).map(|exc| (idx, exc)));

        let Some((last, exception)) = thrown else {
            for (_, code) in test.sequence().code_lines(self.inline_literals) {
                push_indented(out, &body_indent, &code);
            }
            return;
        };

        let executed = test.sequence().prefix(last + 1);
        let catch_name = Type::class(exception.class_name.clone()).name();
        for (idx, code) in executed.code_lines(self.inline_literals) {
            if idx != last {
                push_indented(out, &body_indent, &code);
                continue;
            }
            let inner = format!("{}{}", body_indent, INDENT);
            out.push_str(&format!("{}try {{\n", body_indent));
            push_indented(out, &inner, &code);
            out.push_str(&format!(
                "{}fail(\"Expected exception of type {}\");\n",
                inner, catch_name
            ));
            out.push_str(&format!("{}}} catch ({} e) {{\n", body_indent, catch_name));
            out.push_str(&format!("{}// Expected exception.\n", inner));
            out.push_str(&format!("{}}}\n", body_indent));
        }
    }
}

fn push_indented(out: &mut String, indent: &str, code: &str) {
    for line in code.lines() {
        out.push_str(indent);
        out.push_str(line);
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::OperationParser;
    use crate::reflect::ClassCatalog;
    use crate::sequence::{FailurePolicy, NoopVisitor, Sequence};

    fn executed(text: &str) -> ExecutableSequence {
        let registry = ClassCatalog::new().snapshot();
        let parser = OperationParser::new(&registry);
        let mut exec = ExecutableSequence::new(Sequence::parse(text, &parser).unwrap());
        exec.execute(&registry, FailurePolicy::Halt, &mut NoopVisitor)
            .unwrap();
        exec
    }

    #[test]
    fn renders_normal_and_throwing_tests() {
        let normal = executed(concat!(
            "var0 =  ConstructorCall : java.util.ArrayList.<init>() : \n",
            "var1 =  MethodCall : java.util.ArrayList.size() : var0 \n",
        ));
        let throwing = executed(concat!(
            "var0 =  NonreceiverTerm : java.lang.String:\"abc\" : \n",
            "var1 =  NonreceiverTerm : int:9 : \n",
            "var2 =  MethodCall : java.lang.String.charAt(int) : var0 var1 \n",
            "var3 =  MethodCall : java.lang.String.length() : var0 \n",
        ));
        let source = JUnitWriter::new("RegressionTest0")
            .with_package("demo")
            .render(&[normal, throwing]);

        let expected = "\
package demo;

import org.junit.Test;
import static org.junit.Assert.*;

public class RegressionTest0 {

    @Test
    public void test0() throws Throwable {
        java.util.ArrayList arrayList0 = new java.util.ArrayList();
        int i1 = arrayList0.size();
    }

    @Test
    public void test1() throws Throwable {
        try {
            char c2 = \"abc\".charAt(9);
            fail(\"Expected exception of type java.lang.StringIndexOutOfBoundsException\");
        } catch (java.lang.StringIndexOutOfBoundsException e) {
            // Expected exception.
        }
    }
}
";
        assert_eq!(source, expected);
    }
}
