use super::{DomEventsPlugin, KeyEventsPlugin};
use crate::error::{RenderError, Result};
use crate::view::EventDisposer;
use trellis_dom::{EventTarget, Listener, NodeId, SharedDocument};

/// Attaches listeners for the event names it supports.
///
/// Every method but `supports` defaults to [`RenderError::NotImplemented`].
pub trait EventManagerPlugin {
    fn supports(&self, event_name: &str) -> bool;

    fn add_event_listener(
        &self,
        document: &SharedDocument,
        element: NodeId,
        event_name: &str,
        handler: Listener,
    ) -> Result<()> {
        let _ = (document, element, event_name, handler);
        Err(RenderError::NotImplemented("add_event_listener"))
    }

    fn add_global_event_listener(
        &self,
        document: &SharedDocument,
        target: &str,
        event_name: &str,
        handler: Listener,
    ) -> Result<EventDisposer> {
        let _ = (document, target, event_name, handler);
        Err(RenderError::NotImplemented("add_global_event_listener"))
    }
}

/// Routes listener registration to the last registered plugin that
/// supports the event name.
pub struct EventManager {
    document: SharedDocument,
    plugins: Vec<Box<dyn EventManagerPlugin>>,
}

impl EventManager {
    pub fn new(document: SharedDocument, plugins: Vec<Box<dyn EventManagerPlugin>>) -> Self {
        Self { document, plugins }
    }

    /// Plain DOM events plus `keydown.*`/`keyup.*` key combinations.
    pub fn with_default_plugins(document: SharedDocument) -> Self {
        Self::new(
            document,
            vec![Box::new(DomEventsPlugin), Box::new(KeyEventsPlugin)],
        )
    }

    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    pub fn add_event_listener(
        &self,
        element: NodeId,
        event_name: &str,
        handler: Listener,
    ) -> Result<()> {
        let plugin = self.find_plugin(event_name)?;
        plugin.add_event_listener(&self.document, element, event_name, handler)
    }

    pub fn add_global_event_listener(
        &self,
        target: &str,
        event_name: &str,
        handler: Listener,
    ) -> Result<EventDisposer> {
        let plugin = self.find_plugin(event_name)?;
        plugin.add_global_event_listener(&self.document, target, event_name, handler)
    }

    fn find_plugin(&self, event_name: &str) -> Result<&dyn EventManagerPlugin> {
        self.plugins
            .iter()
            .rev()
            .find(|plugin| plugin.supports(event_name))
            .map(|plugin| plugin.as_ref())
            .ok_or_else(|| RenderError::NoEventPlugin(event_name.to_string()))
    }
}

/// Maps `window`, `document` and `body` to listener targets.
pub fn resolve_global_target(document: &SharedDocument, target: &str) -> Result<EventTarget> {
    match target {
        "window" => Ok(EventTarget::Window),
        "document" => Ok(EventTarget::Node(document.root())),
        "body" => Ok(EventTarget::Node(document.body())),
        other => Err(RenderError::UnknownEventTarget(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use trellis_dom::{Document, DomEvent};

    struct OnlyClicks {
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl EventManagerPlugin for OnlyClicks {
        fn supports(&self, event_name: &str) -> bool {
            event_name == "click"
        }

        fn add_event_listener(
            &self,
            _: &SharedDocument,
            _: NodeId,
            _: &str,
            _: Listener,
        ) -> Result<()> {
            self.log.borrow_mut().push("clicks");
            Ok(())
        }
    }

    #[test]
    fn test_last_supporting_plugin_wins() {
        let document = Document::shared();
        let log = Rc::new(RefCell::new(Vec::new()));
        let manager = EventManager::new(
            document.clone(),
            vec![Box::new(DomEventsPlugin), Box::new(OnlyClicks { log: log.clone() })],
        );
        let el = document.create_element("div");

        manager.add_event_listener(el, "click", Rc::new(|_: &DomEvent| {})).unwrap();
        assert_eq!(*log.borrow(), vec!["clicks"]);
        assert_eq!(document.listener_count(EventTarget::Node(el), "click"), 0);

        manager.add_event_listener(el, "input", Rc::new(|_: &DomEvent| {})).unwrap();
        assert_eq!(document.listener_count(EventTarget::Node(el), "input"), 1);
    }

    #[test]
    fn test_default_plugin_methods_are_not_implemented() {
        let document = Document::shared();
        let manager = EventManager::new(
            document.clone(),
            vec![Box::new(OnlyClicks { log: Rc::default() })],
        );

        let err = manager
            .add_global_event_listener("window", "click", Rc::new(|_: &DomEvent| {}))
            .unwrap_err();
        assert_eq!(err, RenderError::NotImplemented("add_global_event_listener"));
    }

    #[test]
    fn test_no_plugin() {
        let document = Document::shared();
        let manager = EventManager::new(document.clone(), Vec::new());
        let el = document.create_element("div");
        let err = manager
            .add_event_listener(el, "click", Rc::new(|_: &DomEvent| {}))
            .unwrap_err();
        assert_eq!(err, RenderError::NoEventPlugin("click".into()));
    }

    #[test]
    fn test_resolve_global_target() {
        let document = Document::shared();
        assert_eq!(resolve_global_target(&document, "window").unwrap(), EventTarget::Window);
        assert_eq!(
            resolve_global_target(&document, "body").unwrap(),
            EventTarget::Node(document.body())
        );
        assert_eq!(
            resolve_global_target(&document, "document").unwrap(),
            EventTarget::Node(document.root())
        );
        assert!(matches!(
            resolve_global_target(&document, "screen"),
            Err(RenderError::UnknownEventTarget(t)) if t == "screen"
        ));
    }
}
