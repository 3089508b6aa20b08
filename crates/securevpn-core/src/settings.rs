//! Client Settings
//!
//! The two sidebar toggles. Kill switch is display state only (there
//! is no traffic to block); auto-connect makes the frontend press the
//! connect button once at startup.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// User-facing toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// "Block internet if VPN disconnects" (display only)
    #[serde(default = "default_true")]
    pub kill_switch: bool,
    /// "Connect on startup"
    #[serde(default)]
    pub auto_connect: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            kill_switch: true,
            auto_connect: false,
        }
    }
}

impl Settings {
    /// Load from TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self, SettingsError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| SettingsError::IoError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Load from TOML string
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        toml::from_str(content).map_err(|e| SettingsError::ParseError(e.to_string()))
    }

    /// Export as TOML
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

/// Settings errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();

        assert!(settings.kill_switch);
        assert!(!settings.auto_connect);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings = Settings::from_toml("auto_connect = true\n").unwrap();

        assert!(settings.kill_switch);
        assert!(settings.auto_connect);

        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_toml_roundtrip() {
        let settings = Settings {
            kill_switch: false,
            auto_connect: true,
        };

        let parsed = Settings::from_toml(&settings.to_toml()).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_bad_file_is_an_error() {
        let result = Settings::from_toml("kill_switch = \"maybe\"");
        assert!(matches!(result, Err(SettingsError::ParseError(_))));
    }
}
