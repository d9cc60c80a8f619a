//! Document-wide settings for subgraph instancing.

use serde::{Deserialize, Serialize};

use crate::error::LibraryError;

/// Maximum number of flow input pins a subgraph context materializes.
pub const DEFAULT_MAX_INPUT_FLOW: usize = 5;

/// Maximum depth of subgraphs instancing subgraphs.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 16;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Only the first `max_input_flow` resolved flow names become pins.
    pub max_input_flow: usize,
    pub max_nesting_depth: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_input_flow: DEFAULT_MAX_INPUT_FLOW,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

impl Settings {
    pub fn from_toml_str(source: &str) -> Result<Self, LibraryError> {
        let settings: Settings = toml::from_str(source)?;
        settings.validate()
    }

    pub fn from_json_str(source: &str) -> Result<Self, LibraryError> {
        let settings: Settings = serde_json::from_str(source)?;
        settings.validate()
    }

    fn validate(self) -> Result<Self, LibraryError> {
        if self.max_nesting_depth == 0 {
            return Err(LibraryError::invalid_argument(
                "max_nesting_depth must be at least 1",
            ));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_keys_missing() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.max_input_flow, 5);
    }

    #[test]
    fn test_partial_toml_override() {
        let settings = Settings::from_toml_str("max_nesting_depth = 4\n").unwrap();
        assert_eq!(settings.max_nesting_depth, 4);
        assert_eq!(settings.max_input_flow, DEFAULT_MAX_INPUT_FLOW);
    }

    #[test]
    fn test_json_settings() {
        let settings = Settings::from_json_str(r#"{"max_input_flow": 3}"#).unwrap();
        assert_eq!(settings.max_input_flow, 3);
    }

    #[test]
    fn test_zero_depth_rejected() {
        let result = Settings::from_toml_str("max_nesting_depth = 0");
        assert!(matches!(result, Err(LibraryError::InvalidArgument(_))));
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        assert!(matches!(
            Settings::from_toml_str("max_input_flow = \"many\""),
            Err(LibraryError::Toml(_))
        ));
    }
}
