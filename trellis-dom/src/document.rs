use crate::error::{DomError, Result};
use crate::event::{DomEvent, EventTarget, Listener, ListenerId, ListenerRegistry};
use crate::node::{ElementData, NodeArena, NodeId, NodeKind};
use crate::selector::Selector;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Shared handle to a document (interior mutability handled internally).
pub type SharedDocument = Rc<Document>;

/// Single-threaded document tree: `#document > html > (head, body)`.
///
/// Every method takes `&self`; borrows of the arena never outlive a call, so
/// listeners invoked by [`Document::dispatch_event`] may mutate the document.
pub struct Document {
    arena: RefCell<NodeArena>,
    listeners: RefCell<ListenerRegistry>,
    root: NodeId,
    document_element: NodeId,
    head: NodeId,
    body: NodeId,
    active_element: Cell<Option<NodeId>>,
}

impl Document {
    pub fn new() -> Self {
        let mut arena = NodeArena::new();
        let root = arena.create(NodeKind::Document);
        let html = arena.create(NodeKind::element("html"));
        let head = arena.create(NodeKind::element("head"));
        let body = arena.create(NodeKind::element("body"));
        arena.attach(root, html, 0);
        arena.attach(html, head, 0);
        arena.attach(html, body, 1);

        Self {
            arena: RefCell::new(arena),
            listeners: RefCell::new(ListenerRegistry::new()),
            root,
            document_element: html,
            head,
            body,
            active_element: Cell::new(None),
        }
    }

    pub fn shared() -> SharedDocument {
        Rc::new(Self::new())
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn document_element(&self) -> NodeId {
        self.document_element
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    // ---- construction ----

    pub fn create_element(&self, tag: &str) -> NodeId {
        self.arena.borrow_mut().create(NodeKind::element(tag))
    }

    pub fn create_text_node(&self, text: &str) -> NodeId {
        self.arena.borrow_mut().create(NodeKind::Text(text.to_string()))
    }

    pub fn create_comment(&self, text: &str) -> NodeId {
        self.arena.borrow_mut().create(NodeKind::Comment(text.to_string()))
    }

    /// `<style>` element holding `css` as its only text child.
    pub fn create_style_element(&self, css: &str) -> NodeId {
        let mut arena = self.arena.borrow_mut();
        let style = arena.create(NodeKind::element("style"));
        let text = arena.create(NodeKind::Text(css.to_string()));
        arena.attach(style, text, 0);
        style
    }

    pub fn create_shadow_root(&self, host: NodeId) -> Result<NodeId> {
        let mut arena = self.arena.borrow_mut();
        let existing = element_of(&arena, host)?.shadow_root;
        if existing.is_some() {
            return Err(DomError::ShadowRootExists(host));
        }
        let shadow_root = arena.create(NodeKind::ShadowRoot { host });
        if let Some(data) = arena.get_mut(host).and_then(NodeKind::as_element_mut) {
            data.shadow_root = Some(shadow_root);
        }
        Ok(shadow_root)
    }

    // ---- tree queries ----

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.borrow().contains(id)
    }

    pub fn node_kind(&self, id: NodeId) -> Result<NodeKind> {
        self.arena
            .borrow()
            .get(id)
            .cloned()
            .ok_or(DomError::NodeNotFound(id))
    }

    pub fn is_element_node(&self, id: NodeId) -> bool {
        matches!(self.arena.borrow().get(id), Some(NodeKind::Element(_)))
    }

    pub fn is_text_node(&self, id: NodeId) -> bool {
        matches!(self.arena.borrow().get(id), Some(NodeKind::Text(_)))
    }

    pub fn tag_name(&self, id: NodeId) -> Result<String> {
        let arena = self.arena.borrow();
        Ok(element_of(&arena, id)?.tag.to_string())
    }

    pub fn parent_node(&self, id: NodeId) -> Option<NodeId> {
        self.arena.borrow().parent(id)
    }

    pub fn child_nodes(&self, id: NodeId) -> Vec<NodeId> {
        self.arena.borrow().children(id).to_vec()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.arena.borrow().children(id).first().copied()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let arena = self.arena.borrow();
        let parent = arena.parent(id)?;
        let siblings = arena.children(parent);
        let position = siblings.iter().position(|c| *c == id)?;
        siblings.get(position + 1).copied()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let arena = self.arena.borrow();
        let parent = arena.parent(id)?;
        let siblings = arena.children(parent);
        let position = siblings.iter().position(|c| *c == id)?;
        position.checked_sub(1).map(|p| siblings[p])
    }

    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.arena
            .borrow()
            .get(host)
            .and_then(NodeKind::as_element)
            .and_then(|data| data.shadow_root)
    }

    /// Host element of a shadow root.
    pub fn host(&self, shadow_root: NodeId) -> Option<NodeId> {
        match self.arena.borrow().get(shadow_root) {
            Some(NodeKind::ShadowRoot { host }) => Some(*host),
            _ => None,
        }
    }

    /// Whether the node is connected to this document (through shadow hosts too).
    pub fn is_connected(&self, id: NodeId) -> bool {
        let arena = self.arena.borrow();
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root {
                return true;
            }
            current = match arena.get(node) {
                Some(NodeKind::ShadowRoot { host }) => Some(*host),
                _ => arena.parent(node),
            };
        }
        false
    }

    // ---- tree mutation ----

    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let mut arena = self.arena.borrow_mut();
        check_insertion(&arena, parent, child)?;
        arena.detach(child);
        let end = arena.children(parent).len();
        arena.attach(parent, child, end);
        Ok(())
    }

    /// Inserts `child` into `parent` before `reference` (appends when `None`).
    pub fn insert_before(
        &self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        let mut arena = self.arena.borrow_mut();
        check_insertion(&arena, parent, child)?;
        if reference == Some(child) {
            return Ok(());
        }
        if let Some(reference) = reference {
            if arena.parent(reference) != Some(parent) {
                return Err(DomError::HierarchyRequest {
                    parent,
                    child,
                    reason: "reference node is not a child of parent",
                });
            }
        }
        arena.detach(child);
        let position = match reference {
            Some(reference) => arena
                .children(parent)
                .iter()
                .position(|c| *c == reference)
                .unwrap_or(0),
            None => arena.children(parent).len(),
        };
        arena.attach(parent, child, position);
        Ok(())
    }

    /// Detaches the node from its parent; a no-op for detached nodes.
    pub fn remove(&self, id: NodeId) -> Result<()> {
        let mut arena = self.arena.borrow_mut();
        if !arena.contains(id) {
            return Err(DomError::NodeNotFound(id));
        }
        arena.detach(id);
        Ok(())
    }

    pub fn clear_nodes(&self, id: NodeId) -> Result<()> {
        let mut arena = self.arena.borrow_mut();
        if !arena.contains(id) {
            return Err(DomError::NodeNotFound(id));
        }
        arena.clear_children(id);
        Ok(())
    }

    // ---- attributes ----

    pub fn set_attribute(&self, id: NodeId, name: &str, value: &str) -> Result<()> {
        let mut arena = self.arena.borrow_mut();
        let data = element_of_mut(&mut arena, id)?;
        let name = name.to_ascii_lowercase();
        if name == "style" {
            data.set_style_text(value);
        } else {
            data.attributes.insert(name.into(), value.to_string());
        }
        Ok(())
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Result<Option<String>> {
        let arena = self.arena.borrow();
        let data = element_of(&arena, id)?;
        let name = name.to_ascii_lowercase();
        if name == "style" {
            return Ok(data.style_text());
        }
        Ok(data.attributes.get(name.as_str()).cloned())
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> Result<bool> {
        Ok(self.get_attribute(id, name)?.is_some())
    }

    pub fn remove_attribute(&self, id: NodeId, name: &str) -> Result<()> {
        let mut arena = self.arena.borrow_mut();
        let data = element_of_mut(&mut arena, id)?;
        let name = name.to_ascii_lowercase();
        if name == "style" {
            data.styles.clear();
        } else {
            data.attributes.shift_remove(name.as_str());
        }
        Ok(())
    }

    /// Attributes in insertion order, `style` last when present.
    pub fn attributes(&self, id: NodeId) -> Result<Vec<(String, String)>> {
        let arena = self.arena.borrow();
        let data = element_of(&arena, id)?;
        let mut attrs: Vec<(String, String)> = data
            .attributes
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        if let Some(style) = data.style_text() {
            attrs.push(("style".to_string(), style));
        }
        Ok(attrs)
    }

    // ---- class list ----

    pub fn add_class(&self, id: NodeId, class_name: &str) -> Result<()> {
        let mut arena = self.arena.borrow_mut();
        let data = element_of_mut(&mut arena, id)?;
        if data.has_class(class_name) {
            return Ok(());
        }
        let mut classes: Vec<&str> = data.class_list().collect();
        classes.push(class_name);
        let joined = classes.join(" ");
        data.attributes.insert("class".into(), joined);
        Ok(())
    }

    pub fn remove_class(&self, id: NodeId, class_name: &str) -> Result<()> {
        let mut arena = self.arena.borrow_mut();
        let data = element_of_mut(&mut arena, id)?;
        if !data.has_class(class_name) {
            return Ok(());
        }
        let joined = data
            .class_list()
            .filter(|c| *c != class_name)
            .collect::<Vec<_>>()
            .join(" ");
        data.attributes.insert("class".into(), joined);
        Ok(())
    }

    pub fn has_class(&self, id: NodeId, class_name: &str) -> bool {
        self.arena
            .borrow()
            .get(id)
            .and_then(NodeKind::as_element)
            .is_some_and(|data| data.has_class(class_name))
    }

    pub fn class_list(&self, id: NodeId) -> Result<Vec<String>> {
        let arena = self.arena.borrow();
        Ok(element_of(&arena, id)?.class_list().map(str::to_string).collect())
    }

    // ---- inline style ----

    pub fn set_style(&self, id: NodeId, name: &str, value: &str) -> Result<()> {
        let mut arena = self.arena.borrow_mut();
        element_of_mut(&mut arena, id)?
            .styles
            .insert(name.to_ascii_lowercase().into(), value.to_string());
        Ok(())
    }

    pub fn remove_style(&self, id: NodeId, name: &str) -> Result<()> {
        let mut arena = self.arena.borrow_mut();
        element_of_mut(&mut arena, id)?
            .styles
            .shift_remove(name.to_ascii_lowercase().as_str());
        Ok(())
    }

    pub fn get_style(&self, id: NodeId, name: &str) -> Result<Option<String>> {
        let arena = self.arena.borrow();
        Ok(element_of(&arena, id)?
            .styles
            .get(name.to_ascii_lowercase().as_str())
            .cloned())
    }

    // ---- properties ----

    pub fn set_property(&self, id: NodeId, name: &str, value: Value) -> Result<()> {
        let mut arena = self.arena.borrow_mut();
        element_of_mut(&mut arena, id)?
            .properties
            .insert(name.into(), value);
        Ok(())
    }

    /// Property value, `None` when the property was never set.
    pub fn get_property(&self, id: NodeId, name: &str) -> Result<Option<Value>> {
        let arena = self.arena.borrow();
        Ok(element_of(&arena, id)?.properties.get(name).cloned())
    }

    pub fn remove_property(&self, id: NodeId, name: &str) -> Result<()> {
        let mut arena = self.arena.borrow_mut();
        element_of_mut(&mut arena, id)?.properties.shift_remove(name);
        Ok(())
    }

    // ---- text ----

    /// Sets a text/comment node's data, or replaces an element's children with one text node.
    pub fn set_text(&self, id: NodeId, text: &str) -> Result<()> {
        let mut arena = self.arena.borrow_mut();
        match arena.get_mut(id) {
            Some(NodeKind::Text(data)) | Some(NodeKind::Comment(data)) => {
                *data = text.to_string();
                return Ok(());
            }
            Some(kind) if kind.is_container() => {}
            Some(_) => return Err(DomError::NotAnElement(id)),
            None => return Err(DomError::NodeNotFound(id)),
        }
        arena.clear_children(id);
        if !text.is_empty() {
            let child = arena.create(NodeKind::Text(text.to_string()));
            arena.attach(id, child, 0);
        }
        Ok(())
    }

    pub fn text_content(&self, id: NodeId) -> Result<String> {
        let arena = self.arena.borrow();
        if !arena.contains(id) {
            return Err(DomError::NodeNotFound(id));
        }
        let mut out = String::new();
        collect_text(&arena, id, &mut out);
        Ok(out)
    }

    // ---- focus ----

    pub fn focus(&self, id: NodeId) -> Result<()> {
        if !self.is_element_node(id) {
            return Err(DomError::NotAnElement(id));
        }
        self.active_element.set(Some(id));
        Ok(())
    }

    pub fn blur(&self, id: NodeId) -> Result<()> {
        if !self.is_element_node(id) {
            return Err(DomError::NotAnElement(id));
        }
        if self.active_element.get() == Some(id) {
            self.active_element.set(None);
        }
        Ok(())
    }

    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element.get()
    }

    // ---- selectors ----

    /// First element in document order matching `selector` (shadow trees are not searched).
    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let selector = Selector::parse(selector)?;
        let arena = self.arena.borrow();
        let mut matches = Vec::new();
        let mut stack: Vec<NodeId> = arena.children(self.root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if selector.matches(&arena, id) {
                matches.push(id);
            }
            stack.extend(arena.children(id).iter().rev().copied());
        }
        Ok(matches)
    }

    // ---- events ----

    pub fn add_event_listener(
        &self,
        target: EventTarget,
        event_type: &str,
        listener: Listener,
    ) -> Result<ListenerId> {
        if let EventTarget::Node(id) = target {
            if !self.contains(id) {
                return Err(DomError::NodeNotFound(id));
            }
        }
        Ok(self.listeners.borrow_mut().add(target, event_type, listener))
    }

    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        self.listeners.borrow_mut().remove(id)
    }

    pub fn listener_count(&self, target: EventTarget, event_type: &str) -> usize {
        self.listeners.borrow().count(target, event_type)
    }

    /// Runs listeners along the propagation path (target, ancestors across
    /// shadow boundaries, window). Returns `false` if the default action was prevented.
    pub fn dispatch_event(&self, target: EventTarget, event: &DomEvent) -> Result<bool> {
        let path = self.propagation_path(target)?;
        tracing::trace!(
            event = event.event_type(),
            ?target,
            depth = path.len(),
            "dispatching event"
        );
        event.set_target(target);
        for (depth, current) in path.into_iter().enumerate() {
            if depth > 0 && !event.bubbles() {
                break;
            }
            let listeners = self.listeners.borrow().listeners_for(current, event.event_type());
            event.set_current_target(Some(current));
            for listener in listeners {
                listener(event);
            }
            if event.propagation_stopped() {
                break;
            }
        }
        event.set_current_target(None);
        Ok(!event.default_prevented())
    }

    fn propagation_path(&self, target: EventTarget) -> Result<Vec<EventTarget>> {
        let EventTarget::Node(id) = target else {
            return Ok(vec![EventTarget::Window]);
        };
        let arena = self.arena.borrow();
        if !arena.contains(id) {
            return Err(DomError::NodeNotFound(id));
        }
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            path.push(EventTarget::Node(node));
            current = match arena.get(node) {
                Some(NodeKind::ShadowRoot { host }) => Some(*host),
                _ => arena.parent(node),
            };
        }
        if path.last() == Some(&EventTarget::Node(self.root)) {
            path.push(EventTarget::Window);
        }
        Ok(path)
    }

    // ---- serialisation ----

    pub fn outer_html(&self, id: NodeId) -> Result<String> {
        let arena = self.arena.borrow();
        if !arena.contains(id) {
            return Err(DomError::NodeNotFound(id));
        }
        let mut out = String::new();
        crate::serialize::write_node(&arena, id, &mut out);
        Ok(out)
    }

    pub fn inner_html(&self, id: NodeId) -> Result<String> {
        let arena = self.arena.borrow();
        if !arena.contains(id) {
            return Err(DomError::NodeNotFound(id));
        }
        let mut out = String::new();
        crate::serialize::write_children(&arena, id, &mut out);
        Ok(out)
    }

    /// Serialises the whole document, doctype included.
    pub fn to_html(&self) -> String {
        let arena = self.arena.borrow();
        let mut out = String::from("<!DOCTYPE html>");
        crate::serialize::write_node(&arena, self.document_element, &mut out);
        out
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn element_of(arena: &NodeArena, id: NodeId) -> Result<&ElementData> {
    match arena.get(id) {
        Some(NodeKind::Element(data)) => Ok(data),
        Some(_) => Err(DomError::NotAnElement(id)),
        None => Err(DomError::NodeNotFound(id)),
    }
}

fn element_of_mut(arena: &mut NodeArena, id: NodeId) -> Result<&mut ElementData> {
    match arena.get_mut(id) {
        Some(NodeKind::Element(data)) => Ok(data),
        Some(_) => Err(DomError::NotAnElement(id)),
        None => Err(DomError::NodeNotFound(id)),
    }
}

fn check_insertion(arena: &NodeArena, parent: NodeId, child: NodeId) -> Result<()> {
    let parent_kind = arena.get(parent).ok_or(DomError::NodeNotFound(parent))?;
    let child_kind = arena.get(child).ok_or(DomError::NodeNotFound(child))?;
    let reason = if !parent_kind.is_container() {
        Some("parent cannot have children")
    } else if matches!(child_kind, NodeKind::Document | NodeKind::ShadowRoot { .. }) {
        Some("node cannot be inserted")
    } else if arena.is_inclusive_ancestor(child, parent) {
        Some("node is an ancestor of parent")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(DomError::HierarchyRequest {
            parent,
            child,
            reason,
        }),
        None => Ok(()),
    }
}

fn collect_text(arena: &NodeArena, id: NodeId, out: &mut String) {
    match arena.get(id) {
        Some(NodeKind::Text(text)) => out.push_str(text),
        Some(NodeKind::Comment(_)) | None => {}
        Some(_) => {
            for child in arena.children(id) {
                collect_text(arena, *child, out);
            }
        }
    }
}
