use super::manager::EventManagerPlugin;
use crate::error::{RenderError, Result};
use std::rc::Rc;
use trellis_dom::{DomEvent, EventTarget, Listener, NodeId, SharedDocument};

const MODIFIER_KEYS: [&str; 4] = ["alt", "control", "meta", "shift"];

/// Key combination listeners such as `keydown.control.shift.enter`.
///
/// The handler only runs when the pressed key and the active modifiers match
/// the combination exactly.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyEventsPlugin;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEventName {
    pub dom_event_name: String,
    pub full_key: String,
}

impl KeyEventsPlugin {
    /// Splits `keydown.shift.a` into `keydown` and the canonical key `shift.a`.
    pub fn parse_event_name(event_name: &str) -> Option<KeyEventName> {
        let lowered = event_name.to_lowercase();
        let mut parts: Vec<&str> = lowered.split('.').collect();
        let dom_event_name = parts.remove(0);
        if !matches!(dom_event_name, "keydown" | "keyup") {
            return None;
        }
        let key = normalize_key(parts.pop()?);

        let mut full_key = String::new();
        for modifier in MODIFIER_KEYS {
            if let Some(position) = parts.iter().position(|part| *part == modifier) {
                parts.remove(position);
                full_key.push_str(modifier);
                full_key.push('.');
            }
        }
        full_key.push_str(key);

        // Anything left over is not a modifier we know.
        if !parts.is_empty() || key.is_empty() {
            return None;
        }
        Some(KeyEventName {
            dom_event_name: dom_event_name.to_string(),
            full_key,
        })
    }

    /// Canonical key of a keyboard event, e.g. `control.shift.a`.
    pub fn event_full_key(event: &DomEvent) -> String {
        let mut key = event.key().unwrap_or_default().to_lowercase();
        if key == " " {
            key = "space".to_string();
        } else if key == "." {
            key = "dot".to_string();
        }
        let modifiers = event.modifiers();
        let mut full_key = String::new();
        for (modifier, active) in MODIFIER_KEYS
            .into_iter()
            .zip([modifiers.alt, modifiers.control, modifiers.meta, modifiers.shift])
        {
            if active && modifier != key {
                full_key.push_str(modifier);
                full_key.push('.');
            }
        }
        full_key.push_str(&key);
        full_key
    }
}

fn normalize_key(key: &str) -> &str {
    match key {
        "esc" => "escape",
        other => other,
    }
}

impl EventManagerPlugin for KeyEventsPlugin {
    fn supports(&self, event_name: &str) -> bool {
        Self::parse_event_name(event_name).is_some()
    }

    fn add_event_listener(
        &self,
        document: &SharedDocument,
        element: NodeId,
        event_name: &str,
        handler: Listener,
    ) -> Result<()> {
        let Some(parsed) = Self::parse_event_name(event_name) else {
            return Err(RenderError::NoEventPlugin(event_name.to_string()));
        };
        let full_key = parsed.full_key;
        let filtered: Listener = Rc::new(move |event: &DomEvent| {
            if Self::event_full_key(event) == full_key {
                handler(event);
            }
        });
        document.add_event_listener(EventTarget::Node(element), &parsed.dom_event_name, filtered)?;
        Ok(())
    }
}
