//! A minimal validation pass over a parsed query document.
//!
//! The pass walks the top-level definitions of a document once and hands each
//! one to every registered [`ValidationRule`]. Rules report findings through
//! the [`ValidationContext`]; reporting never stops the walk.
use std::path::Path;

use apollo_compiler::Node;
use apollo_compiler::ast;
use apollo_compiler::parser::SourceSpan;

use crate::error::Location;
use crate::error::ParseErrors;
use crate::error::ValidationError;

/// Parse a query document.
pub fn parse_document(
    source_text: impl Into<String>,
    path: impl AsRef<Path>,
) -> Result<ast::Document, ParseErrors> {
    ast::Document::parse(source_text, path)
        .map_err(|invalid| ParseErrors::from_diagnostics(&invalid.errors))
}

/// Run `rules` over `document` and return everything they reported.
pub fn validate(document: &ast::Document, rules: &[&dyn ValidationRule]) -> Vec<ValidationError> {
    let mut context = ValidationContext::new(document);
    for definition in &document.definitions {
        match definition {
            ast::Definition::OperationDefinition(operation) => rules
                .iter()
                .for_each(|rule| rule.operation_definition(&mut context, operation)),
            ast::Definition::FragmentDefinition(fragment) => rules
                .iter()
                .for_each(|rule| rule.fragment_definition(&mut context, fragment)),
            _ => {}
        }
    }
    context.into_errors()
}

/// A hook invoked by [`validate`] for the definitions of a document.
///
/// Every method has an empty default so rules only implement what they need.
pub trait ValidationRule {
    /// Visit an operation definition.
    fn operation_definition(
        &self,
        context: &mut ValidationContext<'_>,
        operation: &Node<ast::OperationDefinition>,
    ) {
        let _ = (context, operation);
    }

    /// Visit a fragment definition.
    fn fragment_definition(
        &self,
        context: &mut ValidationContext<'_>,
        fragment: &Node<ast::FragmentDefinition>,
    ) {
        let _ = (context, fragment);
    }
}

/// State shared by the rules of a single validation pass.
#[derive(Debug)]
pub struct ValidationContext<'doc> {
    document: &'doc ast::Document,
    errors: Vec<ValidationError>,
}

impl<'doc> ValidationContext<'doc> {
    pub fn new(document: &'doc ast::Document) -> Self {
        Self {
            document,
            errors: Vec::new(),
        }
    }

    /// The document being validated.
    pub fn document(&self) -> &'doc ast::Document {
        self.document
    }

    pub fn report_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    /// Line and column where `span` starts in the document.
    pub fn location(&self, span: Option<SourceSpan>) -> Option<Location> {
        let range = span?.line_column_range(&self.document.sources)?;
        Some(Location {
            line: range.start.line as u32,
            column: range.start.column as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Default)]
    struct RecordDefinitions {
        seen: RefCell<Vec<String>>,
    }

    impl ValidationRule for RecordDefinitions {
        fn operation_definition(
            &self,
            context: &mut ValidationContext<'_>,
            operation: &Node<ast::OperationDefinition>,
        ) {
            let name = operation
                .name
                .as_ref()
                .map_or("<anonymous>", |name| name.as_str());
            self.seen.borrow_mut().push(format!("operation {name}"));
            let location = context.location(operation.location());
            context.report_error(
                ValidationError::new(format!("saw {name}")).with_location(location),
            );
        }

        fn fragment_definition(
            &self,
            _context: &mut ValidationContext<'_>,
            fragment: &Node<ast::FragmentDefinition>,
        ) {
            self.seen
                .borrow_mut()
                .push(format!("fragment {}", fragment.name));
        }
    }

    struct Silent;

    impl ValidationRule for Silent {}

    #[test]
    fn visits_definitions_in_document_order() {
        let document = parse_document(
            "query A { a }\nfragment F on Query { b }\nquery B { ...F }",
            "query.graphql",
        )
        .unwrap();
        let rule = RecordDefinitions::default();
        let errors = validate(&document, &[&rule, &Silent]);

        assert_eq!(
            *rule.seen.borrow(),
            vec!["operation A", "fragment F", "operation B"]
        );
        assert_eq!(
            errors,
            vec![
                ValidationError::new("saw A")
                    .with_location(Some(Location { line: 1, column: 1 })),
                ValidationError::new("saw B")
                    .with_location(Some(Location { line: 3, column: 1 })),
            ]
        );
    }

    #[test]
    fn location_of_an_indented_operation() {
        let document = parse_document("\n    { a }", "query.graphql").unwrap();
        let rule = RecordDefinitions::default();
        let errors = validate(&document, &[&rule]);
        assert_eq!(errors[0].locations, vec![Location { line: 2, column: 5 }]);
    }

    #[test]
    fn rules_without_hooks_report_nothing() {
        let document = parse_document("{ a }", "query.graphql").unwrap();
        assert!(validate(&document, &[&Silent]).is_empty());
    }

    #[test]
    fn parse_errors_are_returned() {
        let errors = parse_document("{ a ", "query.graphql").unwrap_err();
        assert!(!errors.errors.is_empty());
    }
}
