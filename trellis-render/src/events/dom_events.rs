use super::manager::{resolve_global_target, EventManagerPlugin};
use crate::error::Result;
use crate::view::EventDisposer;
use trellis_dom::{EventTarget, Listener, NodeId, SharedDocument};

/// Plain DOM listeners; supports every event name.
#[derive(Debug, Default, Clone, Copy)]
pub struct DomEventsPlugin;

impl EventManagerPlugin for DomEventsPlugin {
    fn supports(&self, _event_name: &str) -> bool {
        true
    }

    fn add_event_listener(
        &self,
        document: &SharedDocument,
        element: NodeId,
        event_name: &str,
        handler: Listener,
    ) -> Result<()> {
        document.add_event_listener(EventTarget::Node(element), event_name, handler)?;
        Ok(())
    }

    fn add_global_event_listener(
        &self,
        document: &SharedDocument,
        target: &str,
        event_name: &str,
        handler: Listener,
    ) -> Result<EventDisposer> {
        let target = resolve_global_target(document, target)?;
        let id = document.add_event_listener(target, event_name, handler)?;
        let document = document.clone();
        Ok(EventDisposer::new(move || {
            document.remove_event_listener(id);
        }))
    }
}
