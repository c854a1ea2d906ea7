//! Rejects operations whose complexity exceeds a configured maximum.
use std::fmt;
use std::sync::Arc;

use apollo_compiler::Node;
use apollo_compiler::ast;

use crate::calculator::calculate_operation_complexity;
use crate::configuration::ComplexityLimitConfig;
use crate::configuration::CostSettings;
use crate::error::ConfigurationError;
use crate::error::ValidationError;
use crate::validation::ValidationContext;
use crate::validation::ValidationRule;

/// Builds the violation message from `(complexity, max_complexity)`.
pub type MessageFormatter = Arc<dyn Fn(u64, u64) -> String + Send + Sync>;

/// A [`ValidationRule`] that scores every operation of a document and reports
/// the ones costing more than `max_complexity`.
///
/// Operations are scored independently of each other, each from its own
/// top-level selections. An operation costing exactly `max_complexity` passes.
#[derive(Clone)]
pub struct ComplexityLimit {
    max_complexity: u64,
    settings: CostSettings,
    warn_only: bool,
    message: Option<MessageFormatter>,
}

impl fmt::Debug for ComplexityLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComplexityLimit")
            .field("max_complexity", &self.max_complexity)
            .field("settings", &self.settings)
            .field("warn_only", &self.warn_only)
            .field("message", &self.message.as_ref().map(|_| "<formatter>"))
            .finish()
    }
}

impl ComplexityLimit {
    pub fn new(config: ComplexityLimitConfig) -> Result<Self, ConfigurationError> {
        if config.max_complexity == 0 {
            return Err(ConfigurationError::InvalidMaxComplexity);
        }
        if config.default_cost == 0 {
            return Err(ConfigurationError::InvalidDefaultCost);
        }
        Ok(Self {
            max_complexity: config.max_complexity,
            settings: config.cost_settings(),
            warn_only: config.warn_only,
            message: None,
        })
    }

    /// Replace the default violation message.
    pub fn with_message<F>(mut self, formatter: F) -> Self
    where
        F: Fn(u64, u64) -> String + Send + Sync + 'static,
    {
        self.message = Some(Arc::new(formatter));
        self
    }

    pub fn max_complexity(&self) -> u64 {
        self.max_complexity
    }

    pub fn cost_settings(&self) -> &CostSettings {
        &self.settings
    }

    fn message(&self, complexity: u64) -> String {
        match &self.message {
            Some(formatter) => formatter(complexity, self.max_complexity),
            None => format!(
                "Query complexity {complexity} exceeds the maximum allowed of {}",
                self.max_complexity
            ),
        }
    }
}

impl ValidationRule for ComplexityLimit {
    fn operation_definition(
        &self,
        context: &mut ValidationContext<'_>,
        operation: &Node<ast::OperationDefinition>,
    ) {
        let complexity = calculate_operation_complexity(
            context.document(),
            &operation.selection_set,
            &self.settings,
        );
        let operation_name = operation.name.as_ref().map(|name| name.as_str());
        tracing::debug!(
            operation_name,
            complexity,
            max_complexity = self.max_complexity,
            "calculated operation complexity"
        );

        if complexity <= self.max_complexity {
            return;
        }

        let message = self.message(complexity);
        if self.warn_only {
            tracing::warn!(
                "request exceeded complexity limit: {message}, operation name: {operation_name:?}"
            );
            return;
        }

        let location = context.location(operation.location());
        context.report_error(
            ValidationError::complexity_exceeded(message, complexity, self.max_complexity)
                .with_location(location),
        );
    }
}
