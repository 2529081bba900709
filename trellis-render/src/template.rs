//! Template commands: the flat instruction stream a view is built from.

use serde::{Deserialize, Serialize};

/// Identifier a component template is registered under.
pub type TemplateId = u32;

/// A listener declared on an element. `target` is set for global listeners
/// written as `window:resize`, `document:keyup` or `body:click`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventBinding {
    #[serde(default)]
    pub target: Option<String>,
    pub name: String,
}

impl EventBinding {
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            target: None,
            name: name.into(),
        }
    }

    pub fn global(target: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
            name: name.into(),
        }
    }

    /// `target:name` for global bindings, `name` otherwise.
    pub fn full_name(&self) -> String {
        match &self.target {
            Some(target) => format!("{target}:{}", self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementCmd {
    pub name: String,
    /// Alternating `[name, value, name, value, ..]`.
    #[serde(default)]
    pub attr_name_and_values: Vec<String>,
    #[serde(default)]
    pub event_bindings: Vec<EventBinding>,
    #[serde(default)]
    pub is_bound: bool,
    #[serde(default)]
    pub ng_content_index: Option<usize>,
}

impl ElementCmd {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attr_name_and_values: Vec::new(),
            event_bindings: Vec::new(),
            is_bound: false,
            ng_content_index: None,
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attr_name_and_values.push(name.into());
        self.attr_name_and_values.push(value.into());
        self
    }

    pub fn bound(mut self) -> Self {
        self.is_bound = true;
        self
    }

    /// Adds an event binding; binding an event always makes the element bound.
    pub fn on(mut self, binding: EventBinding) -> Self {
        self.event_bindings.push(binding);
        self.is_bound = true;
        self
    }

    pub fn projected_into(mut self, ng_content_index: usize) -> Self {
        self.ng_content_index = Some(ng_content_index);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentCmd {
    #[serde(flatten)]
    pub element: ElementCmd,
    pub template_id: TemplateId,
    #[serde(default)]
    pub native_shadow: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedTemplateCmd {
    #[serde(default)]
    pub attr_name_and_values: Vec<String>,
    #[serde(default)]
    pub is_merged: bool,
    #[serde(default)]
    pub ng_content_index: Option<usize>,
    #[serde(default)]
    pub children: Vec<RenderTemplateCmd>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderTemplateCmd {
    Text {
        #[serde(default)]
        value: Option<String>,
        #[serde(default)]
        is_bound: bool,
        #[serde(default)]
        ng_content_index: Option<usize>,
    },
    NgContent {
        index: usize,
        #[serde(default)]
        ng_content_index: Option<usize>,
    },
    BeginElement(ElementCmd),
    EndElement,
    BeginComponent(ComponentCmd),
    EndComponent,
    EmbeddedTemplate(EmbeddedTemplateCmd),
}

impl RenderTemplateCmd {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: Some(value.into()),
            is_bound: false,
            ng_content_index: None,
        }
    }

    pub fn bound_text(value: impl Into<String>) -> Self {
        Self::Text {
            value: Some(value.into()),
            is_bound: true,
            ng_content_index: None,
        }
    }

    pub fn ng_content(index: usize) -> Self {
        Self::NgContent {
            index,
            ng_content_index: None,
        }
    }

    pub fn begin_element(element: ElementCmd) -> Self {
        Self::BeginElement(element)
    }

    pub fn begin_component(
        element: ElementCmd,
        template_id: TemplateId,
        native_shadow: bool,
    ) -> Self {
        Self::BeginComponent(ComponentCmd {
            element,
            template_id,
            native_shadow,
        })
    }

    pub fn embedded_template(
        attrs: &[&str],
        is_merged: bool,
        children: Vec<RenderTemplateCmd>,
    ) -> Self {
        Self::EmbeddedTemplate(EmbeddedTemplateCmd {
            attr_name_and_values: attrs.iter().map(|s| s.to_string()).collect(),
            is_merged,
            ng_content_index: None,
            children,
        })
    }

    /// Content slot this command projects into when it is a component child.
    pub fn ng_content_index(&self) -> Option<usize> {
        match self {
            Self::Text {
                ng_content_index, ..
            }
            | Self::NgContent {
                ng_content_index, ..
            } => *ng_content_index,
            Self::BeginElement(element) => element.ng_content_index,
            Self::BeginComponent(component) => component.element.ng_content_index,
            Self::EmbeddedTemplate(template) => template.ng_content_index,
            Self::EndElement | Self::EndComponent => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_tagged_commands() {
        let cmds: Vec<RenderTemplateCmd> = serde_json::from_value(json!([
            { "kind": "begin_element", "name": "div", "attr_name_and_values": ["id", "a"],
              "is_bound": true },
            { "kind": "text", "value": "hi" },
            { "kind": "end_element" },
            { "kind": "begin_component", "name": "my-cmp", "template_id": 3,
              "native_shadow": true },
            { "kind": "end_component" },
            { "kind": "embedded_template", "is_merged": true,
              "children": [{ "kind": "text", "value": "x" }] }
        ]))
        .unwrap();

        assert_eq!(
            cmds[0],
            RenderTemplateCmd::begin_element(ElementCmd::new("div").attr("id", "a").bound())
        );
        assert_eq!(cmds[1], RenderTemplateCmd::text("hi"));
        assert_eq!(cmds[2], RenderTemplateCmd::EndElement);
        assert_eq!(
            cmds[3],
            RenderTemplateCmd::begin_component(ElementCmd::new("my-cmp"), 3, true)
        );
        assert_eq!(
            cmds[5],
            RenderTemplateCmd::embedded_template(&[], true, vec![RenderTemplateCmd::text("x")])
        );
    }

    #[test]
    fn test_event_binding_full_name() {
        assert_eq!(EventBinding::local("click").full_name(), "click");
        assert_eq!(EventBinding::global("window", "resize").full_name(), "window:resize");
    }

    #[test]
    fn test_event_binding_marks_element_bound() {
        let element = ElementCmd::new("button").on(EventBinding::local("click"));
        assert!(element.is_bound);
        assert_eq!(element.event_bindings.len(), 1);
    }

    #[test]
    fn test_ng_content_index() {
        let cmd = RenderTemplateCmd::begin_element(ElementCmd::new("p").projected_into(1));
        assert_eq!(cmd.ng_content_index(), Some(1));
        assert_eq!(RenderTemplateCmd::EndElement.ng_content_index(), None);
    }
}
