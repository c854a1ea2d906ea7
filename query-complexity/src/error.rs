//! Complexity limit errors.
use apollo_compiler::validation::DiagnosticList;
use displaydoc::Display;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

/// Extension code attached to complexity limit violations.
pub const MAX_COMPLEXITY_LIMIT_CODE: &str = "MAX_COMPLEXITY_LIMIT";

/// Errors raised while building a [`ComplexityLimit`](crate::ComplexityLimit) from configuration.
#[derive(Error, Display, Debug)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// max_complexity must be a positive integer
    InvalidMaxComplexity,

    /// default_cost must be a positive integer
    InvalidDefaultCost,

    /// could not deserialize configuration: {0}
    InvalidYaml(#[from] serde_yaml::Error),
}

/// Collection of parsing errors for a query document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrors {
    pub errors: Vec<String>,
}

impl ParseErrors {
    pub(crate) fn from_diagnostics(diagnostics: &DiagnosticList) -> Self {
        Self {
            errors: diagnostics.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl std::error::Error for ParseErrors {}

impl std::fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut errors = self.errors.iter();
        for (i, error) in errors.by_ref().take(5).enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{error}")?;
        }
        let remaining = errors.count();
        if remaining > 0 {
            write!(f, "\n...and {remaining} other errors")?;
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "camelCase")]
/// The error location
pub struct Location {
    /// The line number
    pub line: u32,
    /// The column number
    pub column: u32,
}

/// A finding reported by a validation rule, shaped like a
/// [GraphQL error](https://spec.graphql.org/October2021/#sec-Errors).
#[derive(Error, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct ValidationError {
    /// The error message.
    pub message: String,

    /// The locations of the error in the query document.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,

    /// Structured details about the error.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
            extensions: Map::new(),
        }
    }

    pub fn with_location(mut self, location: Option<Location>) -> Self {
        self.locations.extend(location);
        self
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }

    /// The `code` extension, if one was set.
    pub fn code(&self) -> Option<&str> {
        self.extensions.get("code").and_then(Value::as_str)
    }

    pub(crate) fn complexity_exceeded(message: String, complexity: u64, max: u64) -> Self {
        Self::new(message)
            .with_extension("code", MAX_COMPLEXITY_LIMIT_CODE)
            .with_extension("complexity", complexity)
            .with_extension("maxComplexity", max)
    }
}
