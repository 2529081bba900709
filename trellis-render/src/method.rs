use crate::error::{RenderError, Result};
use serde_json::Value;
use trellis_dom::{Document, DomEvent, EventTarget, NodeId};

/// Element methods callers may invoke by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementMethod {
    Focus,
    Blur,
    Click,
    Reset,
    SetAttribute { name: String, value: String },
    RemoveAttribute { name: String },
}

impl ElementMethod {
    pub fn parse(method: &str, args: &[Value]) -> Result<Self> {
        let parsed = match method {
            "focus" => Self::Focus,
            "blur" => Self::Blur,
            "click" => Self::Click,
            "reset" => Self::Reset,
            "setAttribute" => {
                let [name, value] = args else {
                    return Err(arity(method, 2, args.len()));
                };
                Self::SetAttribute {
                    name: string_arg(method, name)?,
                    value: string_arg(method, value)?,
                }
            }
            "removeAttribute" => {
                let [name] = args else {
                    return Err(arity(method, 1, args.len()));
                };
                Self::RemoveAttribute {
                    name: string_arg(method, name)?,
                }
            }
            other => return Err(RenderError::UnknownElementMethod(other.to_string())),
        };
        if matches!(parsed, Self::Focus | Self::Blur | Self::Click | Self::Reset)
            && !args.is_empty()
        {
            return Err(arity(method, 0, args.len()));
        }
        Ok(parsed)
    }

    pub fn invoke(&self, document: &Document, element: NodeId) -> Result<()> {
        match self {
            Self::Focus => document.focus(element)?,
            Self::Blur => document.blur(element)?,
            Self::Click => {
                document.dispatch_event(EventTarget::Node(element), &DomEvent::new("click"))?;
            }
            Self::Reset => {
                document.dispatch_event(EventTarget::Node(element), &DomEvent::new("reset"))?;
            }
            Self::SetAttribute { name, value } => document.set_attribute(element, name, value)?,
            Self::RemoveAttribute { name } => document.remove_attribute(element, name)?,
        }
        Ok(())
    }
}

fn arity(method: &str, expected: usize, got: usize) -> RenderError {
    RenderError::InvalidMethodArguments {
        method: method.to_string(),
        reason: format!("expected {expected} argument(s), got {got}"),
    }
}

/// Strings pass through; numbers and booleans are stringified.
fn string_arg(method: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(RenderError::InvalidMethodArguments {
            method: method.to_string(),
            reason: format!("unsupported argument {other}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_allow_listed_methods() {
        assert_eq!(ElementMethod::parse("focus", &[]).unwrap(), ElementMethod::Focus);
        assert_eq!(
            ElementMethod::parse("setAttribute", &[json!("tabindex"), json!(0)]).unwrap(),
            ElementMethod::SetAttribute {
                name: "tabindex".into(),
                value: "0".into()
            }
        );
        assert_eq!(
            ElementMethod::parse("removeAttribute", &[json!("hidden")]).unwrap(),
            ElementMethod::RemoveAttribute {
                name: "hidden".into()
            }
        );
    }

    #[test]
    fn test_parse_rejects_unknown_and_bad_arguments() {
        assert_eq!(
            ElementMethod::parse("scrollIntoView", &[]).unwrap_err(),
            RenderError::UnknownElementMethod("scrollIntoView".into())
        );
        assert!(matches!(
            ElementMethod::parse("setAttribute", &[json!("x")]),
            Err(RenderError::InvalidMethodArguments { .. })
        ));
        assert!(matches!(
            ElementMethod::parse("removeAttribute", &[json!(null)]),
            Err(RenderError::InvalidMethodArguments { .. })
        ));
        assert!(matches!(
            ElementMethod::parse("focus", &[json!(1)]),
            Err(RenderError::InvalidMethodArguments { .. })
        ));
    }

    #[test]
    fn test_invoke() {
        let document = Document::new();
        let input = document.create_element("input");

        ElementMethod::Focus.invoke(&document, input).unwrap();
        assert_eq!(document.active_element(), Some(input));
        ElementMethod::Blur.invoke(&document, input).unwrap();
        assert_eq!(document.active_element(), None);

        ElementMethod::parse("setAttribute", &[json!("type"), json!("text")])
            .unwrap()
            .invoke(&document, input)
            .unwrap();
        assert_eq!(document.get_attribute(input, "type").unwrap().as_deref(), Some("text"));
    }
}
