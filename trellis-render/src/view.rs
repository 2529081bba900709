//! Built render views and their hydration lifecycle.

use crate::api::RenderEventDispatcher;
use crate::error::{RenderError, Result};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use trellis_dom::{DomEvent, NodeId};

/// Event callback; returning `false` prevents the default action.
pub type EventCallback = Rc<dyn Fn(&DomEvent) -> bool>;

pub(crate) type DispatcherSlot = Rc<RefCell<Option<Rc<dyn RenderEventDispatcher>>>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HydrationState {
    #[default]
    Dehydrated,
    Hydrated,
    Destroyed,
}

/// Detaches a listener added through a global target.
pub struct EventDisposer(Box<dyn FnOnce()>);

impl EventDisposer {
    pub fn new(dispose: impl FnOnce() + 'static) -> Self {
        Self(Box::new(dispose))
    }

    pub fn dispose(self) {
        (self.0)()
    }
}

impl fmt::Debug for EventDisposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EventDisposer")
    }
}

/// A listener on `window`, `document` or `body`, attached only while the
/// view is hydrated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalEventBinding {
    pub element_index: usize,
    pub target: String,
    pub name: String,
}

impl GlobalEventBinding {
    pub fn full_name(&self) -> String {
        format!("{}:{}", self.target, self.name)
    }
}

pub struct RenderView {
    fragments: Vec<Rc<[NodeId]>>,
    bound_text_nodes: Vec<NodeId>,
    bound_elements: Vec<NodeId>,
    native_shadow_roots: Vec<NodeId>,
    global_event_bindings: Vec<GlobalEventBinding>,
    global_event_disposers: Vec<EventDisposer>,
    dispatcher: DispatcherSlot,
    state: HydrationState,
}

impl RenderView {
    pub(crate) fn new(
        fragments: Vec<Rc<[NodeId]>>,
        bound_text_nodes: Vec<NodeId>,
        bound_elements: Vec<NodeId>,
        native_shadow_roots: Vec<NodeId>,
        global_event_bindings: Vec<GlobalEventBinding>,
        dispatcher: DispatcherSlot,
    ) -> Self {
        Self {
            fragments,
            bound_text_nodes,
            bound_elements,
            native_shadow_roots,
            global_event_bindings,
            global_event_disposers: Vec::new(),
            dispatcher,
            state: HydrationState::Dehydrated,
        }
    }

    pub fn fragments(&self) -> &[Rc<[NodeId]>] {
        &self.fragments
    }

    pub fn bound_text_nodes(&self) -> &[NodeId] {
        &self.bound_text_nodes
    }

    pub fn bound_elements(&self) -> &[NodeId] {
        &self.bound_elements
    }

    pub fn native_shadow_roots(&self) -> &[NodeId] {
        &self.native_shadow_roots
    }

    pub fn global_event_bindings(&self) -> &[GlobalEventBinding] {
        &self.global_event_bindings
    }

    pub fn state(&self) -> HydrationState {
        self.state
    }

    pub fn is_hydrated(&self) -> bool {
        self.state == HydrationState::Hydrated
    }

    pub fn bound_element(&self, index: usize) -> Result<NodeId> {
        self.bound_elements
            .get(index)
            .copied()
            .ok_or(RenderError::ElementIndexOutOfRange {
                index,
                len: self.bound_elements.len(),
            })
    }

    pub fn bound_text_node(&self, index: usize) -> Result<NodeId> {
        self.bound_text_nodes
            .get(index)
            .copied()
            .ok_or(RenderError::TextIndexOutOfRange {
                index,
                len: self.bound_text_nodes.len(),
            })
    }

    pub fn set_event_dispatcher(&self, dispatcher: Option<Rc<dyn RenderEventDispatcher>>) {
        *self.dispatcher.borrow_mut() = dispatcher;
    }

    /// Forwards to the installed dispatcher; with none installed the default
    /// action is allowed.
    pub fn dispatch_render_event(
        &self,
        element_index: usize,
        event_name: &str,
        event: &DomEvent,
    ) -> bool {
        dispatch(&self.dispatcher, element_index, event_name, event)
    }

    /// Attaches every global listener through `global_on` and marks the view
    /// hydrated.
    pub fn hydrate<F>(&mut self, mut global_on: F) -> Result<()>
    where
        F: FnMut(&str, &str, EventCallback) -> Result<EventDisposer>,
    {
        match self.state {
            HydrationState::Hydrated => return Err(RenderError::AlreadyHydrated),
            HydrationState::Destroyed => return Err(RenderError::ViewDestroyed),
            HydrationState::Dehydrated => {}
        }
        let mut disposers = Vec::with_capacity(self.global_event_bindings.len());
        for binding in &self.global_event_bindings {
            let handler =
                event_handler(&self.dispatcher, binding.element_index, binding.full_name());
            match global_on(&binding.target, &binding.name, handler) {
                Ok(disposer) => disposers.push(disposer),
                Err(err) => {
                    disposers.into_iter().for_each(EventDisposer::dispose);
                    return Err(err);
                }
            }
        }
        self.global_event_disposers = disposers;
        self.state = HydrationState::Hydrated;
        Ok(())
    }

    /// Detaches the global listeners attached by [`RenderView::hydrate`].
    pub fn dehydrate(&mut self) -> Result<()> {
        match self.state {
            HydrationState::Dehydrated => return Err(RenderError::AlreadyDehydrated),
            HydrationState::Destroyed => return Err(RenderError::ViewDestroyed),
            HydrationState::Hydrated => {}
        }
        self.dispose_global_listeners();
        self.state = HydrationState::Dehydrated;
        Ok(())
    }

    pub(crate) fn destroy(&mut self) {
        self.dispose_global_listeners();
        self.set_event_dispatcher(None);
        self.state = HydrationState::Destroyed;
    }

    fn dispose_global_listeners(&mut self) {
        for disposer in self.global_event_disposers.drain(..) {
            disposer.dispose();
        }
    }
}

impl fmt::Debug for RenderView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderView")
            .field("fragments", &self.fragments)
            .field("bound_text_nodes", &self.bound_text_nodes)
            .field("bound_elements", &self.bound_elements)
            .field("native_shadow_roots", &self.native_shadow_roots)
            .field("global_event_bindings", &self.global_event_bindings)
            .field("state", &self.state)
            .finish()
    }
}

/// Callback routing an event from bound element `element_index` to whatever
/// dispatcher is installed in `slot` at the time the event fires.
pub(crate) fn event_handler(
    slot: &DispatcherSlot,
    element_index: usize,
    event_name: String,
) -> EventCallback {
    let slot = slot.clone();
    Rc::new(move |event: &DomEvent| dispatch(&slot, element_index, &event_name, event))
}

fn dispatch(
    slot: &DispatcherSlot,
    element_index: usize,
    event_name: &str,
    event: &DomEvent,
) -> bool {
    // Clone out so the dispatcher may replace itself.
    let dispatcher = slot.borrow().clone();
    match dispatcher {
        Some(dispatcher) => dispatcher.dispatch_render_event(element_index, event_name, event),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn view_with_global(binding: GlobalEventBinding) -> RenderView {
        RenderView::new(
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            vec![binding],
            DispatcherSlot::default(),
        )
    }

    fn resize_binding() -> GlobalEventBinding {
        GlobalEventBinding {
            element_index: 0,
            target: "window".into(),
            name: "resize".into(),
        }
    }

    #[test]
    fn test_dispatch_without_dispatcher_allows_default() {
        let view = view_with_global(resize_binding());
        assert!(view.dispatch_render_event(0, "click", &DomEvent::new("click")));
    }

    #[test]
    fn test_dispatcher_receives_index_and_name() {
        let view = view_with_global(resize_binding());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        view.set_event_dispatcher(Some(Rc::new(move |index: usize, name: &str, _: &DomEvent| {
            log.borrow_mut().push((index, name.to_string()));
            false
        })));

        assert!(!view.dispatch_render_event(3, "input", &DomEvent::new("input")));
        assert_eq!(*seen.borrow(), vec![(3, "input".to_string())]);
    }

    #[test]
    fn test_hydrate_attaches_and_dehydrate_disposes() {
        let mut view = view_with_global(resize_binding());
        let disposed = Rc::new(Cell::new(0));
        let mut attached = Vec::new();

        let counter = disposed.clone();
        view.hydrate(|target, name, _handler| {
            attached.push(format!("{target}:{name}"));
            let counter = counter.clone();
            Ok(EventDisposer::new(move || counter.set(counter.get() + 1)))
        })
        .unwrap();
        assert_eq!(attached, vec!["window:resize"]);
        assert!(view.is_hydrated());

        assert_eq!(
            view.hydrate(|_, _, _| Ok(EventDisposer::new(|| {}))).unwrap_err(),
            RenderError::AlreadyHydrated
        );

        view.dehydrate().unwrap();
        assert_eq!(disposed.get(), 1);
        assert_eq!(view.dehydrate().unwrap_err(), RenderError::AlreadyDehydrated);
    }

    #[test]
    fn test_global_handler_uses_full_event_name() {
        let mut view = view_with_global(resize_binding());
        let names = Rc::new(RefCell::new(Vec::new()));
        let log = names.clone();
        view.set_event_dispatcher(Some(Rc::new(move |_: usize, name: &str, _: &DomEvent| {
            log.borrow_mut().push(name.to_string());
            true
        })));

        let mut handlers = Vec::new();
        view.hydrate(|_, _, handler| {
            handlers.push(handler);
            Ok(EventDisposer::new(|| {}))
        })
        .unwrap();
        assert!(handlers[0](&DomEvent::new("resize")));
        assert_eq!(*names.borrow(), vec!["window:resize"]);
    }

    #[test]
    fn test_destroyed_view_rejects_lifecycle_calls() {
        let mut view = view_with_global(resize_binding());
        view.destroy();
        assert_eq!(view.state(), HydrationState::Destroyed);
        assert_eq!(
            view.hydrate(|_, _, _| Ok(EventDisposer::new(|| {}))).unwrap_err(),
            RenderError::ViewDestroyed
        );
        assert_eq!(view.dehydrate().unwrap_err(), RenderError::ViewDestroyed);
    }

    #[test]
    fn test_failed_hydrate_rolls_back() {
        let mut view = RenderView::new(
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            vec![resize_binding(), GlobalEventBinding {
                element_index: 0,
                target: "nowhere".into(),
                name: "click".into(),
            }],
            DispatcherSlot::default(),
        );
        let disposed = Rc::new(Cell::new(false));
        let flag = disposed.clone();

        let err = view
            .hydrate(|target, _, _| {
                if target == "nowhere" {
                    return Err(RenderError::UnknownEventTarget(target.to_string()));
                }
                let flag = flag.clone();
                Ok(EventDisposer::new(move || flag.set(true)))
            })
            .unwrap_err();

        assert_eq!(err, RenderError::UnknownEventTarget("nowhere".into()));
        assert!(disposed.get());
        assert_eq!(view.state(), HydrationState::Dehydrated);
    }
}
