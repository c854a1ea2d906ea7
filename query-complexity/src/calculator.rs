//! Syntactic cost calculation for GraphQL selection sets.
//!
//! Every field costs its configured override, or the default cost, plus the
//! cost of everything selected below it. Fragment spreads and inline fragments
//! are transparent: they cost exactly what their selections cost. No schema is
//! consulted, so list sizes, arguments and directives play no part.
use std::collections::HashMap;
use std::collections::HashSet;

use apollo_compiler::Node;
use apollo_compiler::ast;

use crate::configuration::CostSettings;

/// Prefix reserved by the GraphQL spec for introspection fields.
pub const INTROSPECTION_PREFIX: &str = "__";

/// Whether `field_name` is an introspection meta-field such as `__schema` or `__type`.
pub fn is_introspection_field(field_name: &str) -> bool {
    field_name.starts_with(INTROSPECTION_PREFIX)
}

/// Fragment definitions of a document, by name.
///
/// If a document defines the same fragment twice (which validation rejects),
/// the last definition wins.
#[derive(Debug, Default)]
pub struct Fragments<'doc> {
    definitions: HashMap<&'doc str, &'doc Node<ast::FragmentDefinition>>,
}

impl<'doc> Fragments<'doc> {
    pub fn collect(document: &'doc ast::Document) -> Self {
        let definitions = document
            .definitions
            .iter()
            .filter_map(|definition| match definition {
                ast::Definition::FragmentDefinition(fragment) => {
                    Some((fragment.name.as_str(), fragment))
                }
                _ => None,
            })
            .collect();
        Self { definitions }
    }

    pub fn get(&self, name: &str) -> Option<&'doc Node<ast::FragmentDefinition>> {
        self.definitions.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    fn get_key_value(
        &self,
        name: &str,
    ) -> Option<(&'doc str, &'doc Node<ast::FragmentDefinition>)> {
        self.definitions
            .get_key_value(name)
            .map(|(name, definition)| (*name, *definition))
    }
}

/// Complexity of an operation's top-level `selections`, resolving fragment
/// spreads against the fragment definitions of `document`.
pub fn calculate_operation_complexity(
    document: &ast::Document,
    selections: &[ast::Selection],
    settings: &CostSettings,
) -> u64 {
    let fragments = Fragments::collect(document);
    calculate_selection_complexity(selections, &fragments, settings)
}

/// Complexity of a selection set.
///
/// A spread of an unknown fragment costs nothing. A spread of a fragment that is
/// already being expanded further up the tree (a fragment cycle) also costs
/// nothing, so cyclic documents still terminate.
pub fn calculate_selection_complexity(
    selections: &[ast::Selection],
    fragments: &Fragments<'_>,
    settings: &CostSettings,
) -> u64 {
    Calculation {
        fragments,
        settings,
        expanding: HashSet::new(),
    }
    .score_selection_set(selections)
}

/// Complexity of every operation in `document`, in document order.
pub fn operation_complexities<'doc>(
    document: &'doc ast::Document,
    settings: &CostSettings,
) -> Vec<(Option<&'doc str>, u64)> {
    let fragments = Fragments::collect(document);
    document
        .definitions
        .iter()
        .filter_map(|definition| match definition {
            ast::Definition::OperationDefinition(operation) => Some((
                operation.name.as_ref().map(|name| name.as_str()),
                calculate_selection_complexity(&operation.selection_set, &fragments, settings),
            )),
            _ => None,
        })
        .collect()
}

struct Calculation<'a, 'doc> {
    fragments: &'a Fragments<'doc>,
    settings: &'a CostSettings,
    /// Fragments on the current path from the root selection set.
    expanding: HashSet<&'doc str>,
}

impl<'doc> Calculation<'_, 'doc> {
    fn score_selection_set(&mut self, selections: &[ast::Selection]) -> u64 {
        selections.iter().fold(0, |total, selection| {
            total.saturating_add(self.score_selection(selection))
        })
    }

    fn score_selection(&mut self, selection: &ast::Selection) -> u64 {
        match selection {
            ast::Selection::Field(field) => self.score_field(field),
            ast::Selection::FragmentSpread(spread) => self.score_fragment_spread(spread),
            ast::Selection::InlineFragment(inline) => {
                self.score_selection_set(&inline.selection_set)
            }
        }
    }

    fn score_field(&mut self, field: &ast::Field) -> u64 {
        let name = field.name.as_str();
        // The whole subtree of an introspection field is free, whatever it selects.
        if self.settings.ignore_introspection && is_introspection_field(name) {
            return 0;
        }

        let cost = self.settings.field_cost(name);
        if field.selection_set.is_empty() {
            return cost;
        }
        cost.saturating_add(self.score_selection_set(&field.selection_set))
    }

    fn score_fragment_spread(&mut self, spread: &ast::FragmentSpread) -> u64 {
        let fragment_name = spread.fragment_name.as_str();
        let Some((name, definition)) = self.fragments.get_key_value(fragment_name) else {
            // Undefined fragment. The document is invalid and will be rejected
            // by some other validation rule.
            tracing::debug!("fragment {fragment_name} is not defined, counting it as zero");
            return 0;
        };

        if !self.expanding.insert(name) {
            // https://spec.graphql.org/October2021/#sec-Fragment-spreads-must-not-form-cycles
            tracing::warn!("fragment {name} spreads itself, counting the cyclic spread as zero");
            return 0;
        }
        let cost = self.score_selection_set(&definition.selection_set);
        self.expanding.remove(name);
        cost
    }
}
