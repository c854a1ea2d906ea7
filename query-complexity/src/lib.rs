//! Estimate the cost of GraphQL operations before executing them, and reject
//! the ones that cost more than a configured ceiling.
//!
//! Cost is purely syntactic. Each selected field costs a configured amount
//! (an override for its name, or a default), plus whatever it selects.
//! Fragments cost what they contain, and introspection fields are free
//! unless configured otherwise.
//!
//! ```ignore
//! use query_complexity::{ComplexityLimit, ComplexityLimitConfig};
//! use query_complexity::validation::{parse_document, validate};
//!
//! let limit = ComplexityLimit::new(ComplexityLimitConfig::new(100))?;
//! let document = parse_document("{ user { posts { id } } }", "query.graphql")?;
//! let errors = validate(&document, &[&limit]);
//! ```

pub mod calculator;
pub mod configuration;
pub mod error;
pub mod limit;
pub mod validation;

pub use calculator::calculate_operation_complexity;
pub use calculator::calculate_selection_complexity;
pub use configuration::ComplexityLimitConfig;
pub use configuration::CostSettings;
pub use error::ConfigurationError;
pub use error::ValidationError;
pub use limit::ComplexityLimit;
pub use limit::MessageFormatter;
