//! Behavior configuration.

use crate::error::{Result, ValueObjectError};
use serde::{Deserialize, Serialize};

/// Tuning knobs of a [`ValueObjectsBehavior`](crate::ValueObjectsBehavior).
///
/// Every field has a default, so partial configuration text is accepted:
///
/// ```rust
/// use value_objects::BehaviorConfig;
///
/// let config = BehaviorConfig::from_json(r#"{"attribute_separator": "/"}"#).unwrap();
/// assert_eq!(config.attribute_separator, "/");
/// assert!(config.initialize_on_init);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Separates the mapped attribute from the nested field in assignment names.
    pub attribute_separator: String,
    /// Create sub-objects as soon as the record is constructed.
    pub initialize_on_init: bool,
    /// Re-resolve dependent classes before routing attribute writes.
    pub refresh_dependents: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            attribute_separator: ".".to_string(),
            initialize_on_init: true,
            refresh_dependents: false,
        }
    }
}

impl BehaviorConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(ValueObjectError::Config)
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.attribute_separator = separator.into();
        self
    }

    pub fn with_initialize_on_init(mut self, enabled: bool) -> Self {
        self.initialize_on_init = enabled;
        self
    }

    pub fn with_refresh_dependents(mut self, enabled: bool) -> Self {
        self.refresh_dependents = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BehaviorConfig::default();
        assert_eq!(config.attribute_separator, ".");
        assert!(config.initialize_on_init);
        assert!(!config.refresh_dependents);
        assert_eq!(BehaviorConfig::from_json("{}").unwrap(), config);
    }

    #[test]
    fn test_invalid_text_is_config_error() {
        let err = BehaviorConfig::from_json(r#"{"initialize_on_init": "yes"}"#).unwrap_err();
        assert!(matches!(err, ValueObjectError::Config(_)));
    }
}
