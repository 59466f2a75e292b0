use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    engine::EnginePolicy, error::Result, host::NotificationConfig,
    overlay::drag::DEFAULT_DRAG_THRESHOLD,
};

/// Entrypoint the overlay content starts from unless a show request names
/// another one.
pub const DEFAULT_ENTRYPOINT: &str = "overlayMain";

/// Plugin-wide configuration. Every field has a default so a partial or empty
/// document is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginSettings {
    pub engine_policy: EnginePolicy,
    /// Create the engine for `entrypoint` while the plugin starts.
    pub preload_on_startup: bool,
    pub drag_threshold: f32,
    pub entrypoint: String,
    pub notification: NotificationConfig,
    pub debug_logging: bool,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            engine_policy: EnginePolicy::Preloaded,
            preload_on_startup: false,
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            entrypoint: DEFAULT_ENTRYPOINT.to_string(),
            notification: NotificationConfig::default(),
            debug_logging: false,
        }
    }
}

impl PluginSettings {
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load settings from a JSON file, falling back to defaults when the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NotificationVisibility;

    #[test]
    fn empty_document_uses_defaults() {
        let settings = PluginSettings::from_json("{}").unwrap();
        assert_eq!(settings, PluginSettings::default());
        assert_eq!(settings.entrypoint, "overlayMain");
        assert_eq!(settings.drag_threshold, 5.0);
    }

    #[test]
    fn partial_document_overrides_fields() {
        let settings = PluginSettings::from_json(
            r#"{
                "enginePolicy": "onDemand",
                "dragThreshold": 8,
                "notification": { "title": "Bubble", "visibility": "VISIBILITY_PUBLIC" }
            }"#,
        )
        .unwrap();

        assert_eq!(settings.engine_policy, EnginePolicy::OnDemand);
        assert_eq!(settings.drag_threshold, 8.0);
        assert_eq!(settings.notification.title, "Bubble");
        assert_eq!(
            settings.notification.visibility,
            NotificationVisibility::Public
        );
        assert!(!settings.preload_on_startup);
    }

    #[test]
    fn malformed_document_is_an_error() {
        let err = PluginSettings::from_json(r#"{"dragThreshold": "far"}"#).unwrap_err();
        assert_eq!(err.code(), "SETTINGS_ERROR");
    }

    #[test]
    fn missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("floatwin-settings-does-not-exist.json");
        assert_eq!(PluginSettings::load(&path).unwrap(), PluginSettings::default());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("floatwin.json");
        fs::write(&path, r#"{"preloadOnStartup": true, "entrypoint": "bubbleMain"}"#).unwrap();

        let settings = PluginSettings::load(&path).unwrap();
        assert!(settings.preload_on_startup);
        assert_eq!(settings.entrypoint, "bubbleMain");
    }
}
