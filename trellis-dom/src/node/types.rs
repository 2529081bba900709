use indexmap::IndexMap;
use serde_json::Value;
use smartstring::{LazyCompact, SmartString};
use std::fmt;

pub type Name = SmartString<LazyCompact>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Element payload. The `style` attribute is kept parsed in `styles`, the
/// `class` attribute stays a plain attribute and is split on demand.
#[derive(Debug, Clone, Default)]
pub struct ElementData {
    pub tag: Name,
    pub attributes: IndexMap<Name, String>,
    pub styles: IndexMap<Name, String>,
    pub properties: IndexMap<Name, Value>,
    pub shadow_root: Option<NodeId>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase().into(),
            ..Self::default()
        }
    }

    pub fn class_list(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .get("class")
            .map(String::as_str)
            .unwrap_or_default()
            .split_ascii_whitespace()
    }

    pub fn has_class(&self, class_name: &str) -> bool {
        self.class_list().any(|c| c == class_name)
    }

    /// Serialized form of the inline style, as `getAttribute("style")` reports it.
    pub fn style_text(&self) -> Option<String> {
        if self.styles.is_empty() {
            return None;
        }
        let text = self
            .styles
            .iter()
            .map(|(name, value)| format!("{name}: {value};"))
            .collect::<Vec<_>>()
            .join(" ");
        Some(text)
    }

    pub fn set_style_text(&mut self, text: &str) {
        self.styles.clear();
        for declaration in text.split(';') {
            if let Some((name, value)) = declaration.split_once(':') {
                let name = name.trim();
                let value = value.trim();
                if !name.is_empty() && !value.is_empty() {
                    self.styles.insert(name.to_ascii_lowercase().into(), value.to_string());
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
    Comment(String),
    ShadowRoot { host: NodeId },
}

impl NodeKind {
    pub fn element(tag: &str) -> Self {
        Self::Element(ElementData::new(tag))
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match self {
            Self::Element(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match self {
            Self::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Whether nodes of this kind may hold children.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Document | Self::Element(_) | Self::ShadowRoot { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_text_roundtrip_keeps_order() {
        let mut el = ElementData::new("DIV");
        assert_eq!(el.tag, "div");
        el.set_style_text("color: red; background-color : blue;;");
        assert_eq!(
            el.style_text().as_deref(),
            Some("color: red; background-color: blue;")
        );
    }

    #[test]
    fn test_class_list_splits_whitespace() {
        let mut el = ElementData::new("span");
        el.attributes.insert("class".into(), " a  b\tc ".to_string());
        assert_eq!(el.class_list().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert!(el.has_class("b"));
        assert!(!el.has_class("d"));
    }
}
