use crate::error::{RenderError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Renderer settings. Every field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Elements carrying this class get enter/leave animations.
    pub animate_class: String,
    pub enter_class: String,
    pub enter_active_class: String,
    pub leave_class: String,
    pub leave_active_class: String,
    /// Tag used for embedded template anchors.
    pub template_anchor_tag: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            animate_class: "ng-animate".to_string(),
            enter_class: "ng-enter".to_string(),
            enter_active_class: "ng-enter-active".to_string(),
            leave_class: "ng-leave".to_string(),
            leave_active_class: "ng-leave-active".to_string(),
            template_anchor_tag: "script".to_string(),
        }
    }
}

impl RendererConfig {
    pub fn from_json_str(source: &str) -> Result<Self> {
        serde_json::from_str(source).map_err(|e| RenderError::Config(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| RenderError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = RendererConfig::from_json_str(r#"{ "animate_class": "fx" }"#).unwrap();
        assert_eq!(config.animate_class, "fx");
        assert_eq!(config.enter_class, "ng-enter");
        assert_eq!(config.template_anchor_tag, "script");
    }

    #[test]
    fn test_invalid_config() {
        let err = RendererConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, RenderError::Config(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = RendererConfig::from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, RenderError::Config(msg) if msg.contains("here.json")));
    }
}
