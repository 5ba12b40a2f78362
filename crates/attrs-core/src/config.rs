//! # Engine Configuration
//!
//! Knobs that change how absent and textual inputs are coerced. The
//! configuration is attached to a type registry when it is built and is
//! read-only afterwards.
//!
//! ```yaml
//! absent: omit
//! trim_strings: true
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What an attribute becomes when its key is missing and it declares no
/// default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsentPolicy {
    /// Zero-fill: `""`, `0`, `false`, empty list; value objects and
    /// date/times stay null.
    #[default]
    Zero,
    /// Leave the attribute null (omitted from flattened output). List
    /// attributes still start out as an empty list.
    Omit,
}

/// Coercion engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Treatment of absent attributes without a default.
    pub absent: AbsentPolicy,
    /// Trim surrounding whitespace when coercing text into a string.
    pub trim_strings: bool,
}

impl EngineConfig {
    /// Parse configuration from YAML text.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Parse configuration from JSON text.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Builder-style setter for the absent policy.
    pub fn with_absent(mut self, absent: AbsentPolicy) -> Self {
        self.absent = absent;
        self
    }

    /// Builder-style setter for string trimming.
    pub fn with_trim_strings(mut self, trim: bool) -> Self {
        self.trim_strings = trim;
        self
    }
}
