use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use trellis_render::{RenderTemplateCmd, TemplateId};

/// A JSON template bundle: component templates, the root host view and the
/// page the host view is rendered into.
#[derive(Debug, Default, Deserialize)]
pub struct Bundle {
    #[serde(default)]
    pub components: Vec<ComponentEntry>,
    #[serde(default)]
    pub host: Vec<RenderTemplateCmd>,
    #[serde(default)]
    pub document: DocumentEntry,
}

#[derive(Debug, Deserialize)]
pub struct ComponentEntry {
    pub id: TemplateId,
    pub commands: Vec<RenderTemplateCmd>,
    #[serde(default)]
    pub styles: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DocumentEntry {
    /// Materialised into `<body>` before the host view is built.
    #[serde(default)]
    pub body: Vec<RenderTemplateCmd>,
}

impl Bundle {
    pub fn from_path(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read bundle: {}", path.display()))?;
        serde_json::from_str(&source)
            .with_context(|| format!("Failed to parse bundle: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_bundle_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "components": [{{ "id": 1, "commands": [{{ "kind": "text", "value": "hi" }}] }}],
                "host": [
                    {{ "kind": "begin_component", "name": "app-root", "template_id": 1 }},
                    {{ "kind": "end_component" }}
                ]
            }}"#
        )
        .unwrap();

        let bundle = Bundle::from_path(file.path()).unwrap();
        assert_eq!(bundle.components.len(), 1);
        assert!(bundle.components[0].styles.is_empty());
        assert_eq!(bundle.host.len(), 2);
        assert!(bundle.document.body.is_empty());
    }

    #[test]
    fn test_malformed_bundle_names_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ \"host\": 3 }}").unwrap();

        let err = Bundle::from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse bundle"));
    }
}
