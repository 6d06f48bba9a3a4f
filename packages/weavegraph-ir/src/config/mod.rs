//! Weaver configuration
//!
//! YAML (v1 schema) with range validation:
//! ```yaml
//! version: 1
//! return_value_name: returnValue
//! max_pull_depth: 16
//! warnings_as_errors: false
//! defer_contracts_to_layer_end: true
//! ```

mod error;
mod validation;
mod weaver_config;

pub use error::{ConfigError, ConfigResult};
pub use validation::Validatable;
pub use weaver_config::WeaverConfig;
