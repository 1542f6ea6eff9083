//! Session configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MenuError;

/// Tunables for a [`MenuSession`](crate::state::MenuSession).
///
/// The container node is not part of this struct because node handles only
/// exist at runtime; see [`MenuSession::set_container`](crate::state::MenuSession::set_container).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Z-layer of the transparent overlay that captures outside clicks.
    /// Zero or negative disables the overlay entirely.
    pub top_sheet_z_index: i32,
    /// Horizontal overlap between a side-opened submenu and its parent.
    pub submenu_overlap: f32,
    /// Upward shift of a side-opened submenu relative to its trigger item.
    pub submenu_vertical_offset: f32,
    /// Optional log filter passed to the logging setup.
    pub log_filter: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            top_sheet_z_index: 5,
            submenu_overlap: 2.0,
            submenu_vertical_offset: 4.0,
            log_filter: None,
        }
    }
}

impl SessionConfig {
    /// Parse a configuration from JSON text. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, MenuError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MenuError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            MenuError::config_with_source(format!("Cannot read {}", path.display()), e)
        })?;
        let config = Self::from_json_str(&text)?;
        tracing::debug!(path = %path.display(), ?config, "Loaded session config");
        Ok(config)
    }

    /// Whether the outside-click overlay is enabled.
    pub fn top_sheet_enabled(&self) -> bool {
        self.top_sheet_z_index > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SessionConfig::from_json_str(r#"{ "top_sheet_z_index": 0 }"#).unwrap();
        assert_eq!(config.top_sheet_z_index, 0);
        assert!(!config.top_sheet_enabled());
        assert_eq!(config.submenu_overlap, 2.0);
        assert_eq!(config.submenu_vertical_offset, 4.0);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("popmenu.json");
        std::fs::write(&path, r#"{ "submenu_overlap": 6.5, "log_filter": "trace" }"#).unwrap();

        let config = SessionConfig::load(&path).unwrap();
        assert_eq!(config.submenu_overlap, 6.5);
        assert_eq!(config.log_filter.as_deref(), Some("trace"));
        assert!(config.top_sheet_enabled());
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let dir = tempdir().unwrap();
        let err = SessionConfig::load(dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.category(), "Config");
    }
}
