use crate::node::NodeId;
use std::cell::Cell;
use std::rc::Rc;

/// Something a listener can be registered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Node(NodeId),
    Window,
}

/// Keyboard modifier state carried by key events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub alt: bool,
    pub control: bool,
    pub meta: bool,
    pub shift: bool,
}

/// A dispatched event. Mutable flags use `Cell` so listeners only need `&DomEvent`.
#[derive(Debug)]
pub struct DomEvent {
    event_type: String,
    bubbles: bool,
    key: Option<String>,
    modifiers: Modifiers,
    target: Cell<Option<EventTarget>>,
    current_target: Cell<Option<EventTarget>>,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl DomEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            bubbles: true,
            key: None,
            modifiers: Modifiers::default(),
            target: Cell::new(None),
            current_target: Cell::new(None),
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    pub fn keyboard(
        event_type: impl Into<String>,
        key: impl Into<String>,
        modifiers: Modifiers,
    ) -> Self {
        Self {
            key: Some(key.into()),
            modifiers,
            ..Self::new(event_type)
        }
    }

    pub fn non_bubbling(mut self) -> Self {
        self.bubbles = false;
        self
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn target(&self) -> Option<EventTarget> {
        self.target.get()
    }

    pub fn current_target(&self) -> Option<EventTarget> {
        self.current_target.get()
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }

    pub(crate) fn set_target(&self, target: EventTarget) {
        self.target.set(Some(target));
    }

    pub(crate) fn set_current_target(&self, target: Option<EventTarget>) {
        self.current_target.set(target);
    }
}

pub type Listener = Rc<dyn Fn(&DomEvent)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct ListenerEntry {
    id: ListenerId,
    target: EventTarget,
    event_type: String,
    callback: Listener,
}

/// Listener bookkeeping for a document, in registration order.
pub struct ListenerRegistry {
    entries: Vec<ListenerEntry>,
    next_id: u64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    pub fn add(&mut self, target: EventTarget, event_type: &str, callback: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push(ListenerEntry {
            id,
            target,
            event_type: event_type.to_string(),
            callback,
        });
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        before != self.entries.len()
    }

    /// Snapshot of the callbacks for a target, so they can run without the registry borrowed.
    pub fn listeners_for(&self, target: EventTarget, event_type: &str) -> Vec<Listener> {
        self.entries
            .iter()
            .filter(|entry| entry.target == target && entry.event_type == event_type)
            .map(|entry| entry.callback.clone())
            .collect()
    }

    pub fn count(&self, target: EventTarget, event_type: &str) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.target == target && entry.event_type == event_type)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
