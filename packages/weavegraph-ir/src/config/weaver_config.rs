//! Weaver settings

use super::error::{ConfigError, ConfigResult};
use super::validation::Validatable;
use serde::{Deserialize, Serialize};
use std::path::Path;

const SUPPORTED_VERSIONS: &[u32] = &[1];
const MAX_PULL_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaverConfig {
    /// Base name of the temporary holding a captured return value
    pub return_value_name: String,
    /// Delegation levels a pulled parameter is forwarded through
    pub max_pull_depth: usize,
    /// Treat warning diagnostics as blocking during aspect construction
    pub warnings_as_errors: bool,
    /// Compose contracts once per member at the end of each layer instead
    /// of after every contract advice
    pub defer_contracts_to_layer_end: bool,
}

impl Default for WeaverConfig {
    fn default() -> Self {
        Self {
            return_value_name: "returnValue".to_string(),
            max_pull_depth: 16,
            warnings_as_errors: false,
            defer_contracts_to_layer_end: true,
        }
    }
}

/// On-disk schema; every setting is optional over the defaults
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFileV1 {
    version: Option<u32>,
    return_value_name: Option<String>,
    max_pull_depth: Option<usize>,
    warnings_as_errors: Option<bool>,
    defer_contracts_to_layer_end: Option<bool>,
}

#[derive(Serialize)]
struct ConfigExportV1<'a> {
    version: u32,
    #[serde(flatten)]
    config: &'a WeaverConfig,
}

impl WeaverConfig {
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let file: ConfigFileV1 = serde_yaml::from_str(content)?;

        let version = file.version.ok_or(ConfigError::MissingVersion)?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ConfigError::UnsupportedVersion {
                found: version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let defaults = Self::default();
        let config = Self {
            return_value_name: file.return_value_name.unwrap_or(defaults.return_value_name),
            max_pull_depth: file.max_pull_depth.unwrap_or(defaults.max_pull_depth),
            warnings_as_errors: file.warnings_as_errors.unwrap_or(defaults.warnings_as_errors),
            defer_contracts_to_layer_end: file
                .defer_contracts_to_layer_end
                .unwrap_or(defaults.defer_contracts_to_layer_end),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file (v1 schema)
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        let export = ConfigExportV1 {
            version: 1,
            config: self,
        };
        Ok(serde_yaml::to_string(&export)?)
    }

    pub fn with_return_value_name(mut self, name: impl Into<String>) -> Self {
        self.return_value_name = name.into();
        self
    }

    pub fn with_max_pull_depth(mut self, depth: usize) -> Self {
        self.max_pull_depth = depth;
        self
    }

    pub fn with_warnings_as_errors(mut self, enabled: bool) -> Self {
        self.warnings_as_errors = enabled;
        self
    }

    pub fn with_deferred_contracts(mut self, enabled: bool) -> Self {
        self.defer_contracts_to_layer_end = enabled;
        self
    }
}

impl Validatable for WeaverConfig {
    fn validate(&self) -> ConfigResult<()> {
        if !(1..=MAX_PULL_DEPTH).contains(&self.max_pull_depth) {
            return Err(ConfigError::range_with_hint(
                "max_pull_depth",
                self.max_pull_depth,
                1,
                MAX_PULL_DEPTH,
                "Pull depth must be at least 1",
            ));
        }

        let name = &self.return_value_name;
        let is_identifier = name
            .chars()
            .next()
            .map_or(false, |c| c.is_alphabetic() || c == '_')
            && name.chars().all(|c| c.is_alphanumeric() || c == '_');
        if !is_identifier {
            return Err(ConfigError::invalid_value(
                "return_value_name",
                format!("'{}' is not an identifier", name),
            ));
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "WeaverConfig"
    }
}
