//! Renderer contract and the opaque references it hands out.

use crate::error::{RenderError, Result};
use crate::template::{RenderTemplateCmd, TemplateId};
use crate::view::RenderView;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};
use trellis_dom::{DomEvent, NodeId};

static NEXT_RENDERER_ID: AtomicU32 = AtomicU32::new(1);

/// Tags every reference with the renderer that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RendererId(u32);

impl RendererId {
    pub(crate) fn next() -> Self {
        Self(NEXT_RENDERER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for RendererId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "renderer-{}", self.0)
    }
}

/// Receives events raised by bound elements of a view.
pub trait RenderEventDispatcher {
    /// Returns `false` to prevent the event's default action.
    fn dispatch_render_event(
        &self,
        element_index: usize,
        event_name: &str,
        event: &DomEvent,
    ) -> bool;
}

impl<F> RenderEventDispatcher for F
where
    F: Fn(usize, &str, &DomEvent) -> bool,
{
    fn dispatch_render_event(
        &self,
        element_index: usize,
        event_name: &str,
        event: &DomEvent,
    ) -> bool {
        self(element_index, event_name, event)
    }
}

/// Compiled command sequence a view can be instantiated from.
#[derive(Debug, Clone)]
pub struct RenderProtoViewRef {
    owner: RendererId,
    commands: Rc<[RenderTemplateCmd]>,
}

impl RenderProtoViewRef {
    pub(crate) fn new(owner: RendererId, commands: Rc<[RenderTemplateCmd]>) -> Self {
        Self { owner, commands }
    }

    pub(crate) fn resolve(&self, owner: RendererId) -> Result<&Rc<[RenderTemplateCmd]>> {
        check_owner(self.owner, owner)?;
        Ok(&self.commands)
    }
}

/// Handle to a built view.
#[derive(Clone)]
pub struct RenderViewRef {
    owner: RendererId,
    view: Rc<RefCell<RenderView>>,
}

impl RenderViewRef {
    pub(crate) fn new(owner: RendererId, view: RenderView) -> Self {
        Self {
            owner,
            view: Rc::new(RefCell::new(view)),
        }
    }

    pub(crate) fn resolve(&self, owner: RendererId) -> Result<&RefCell<RenderView>> {
        check_owner(self.owner, owner)?;
        Ok(&self.view)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.view, &other.view)
    }
}

impl fmt::Debug for RenderViewRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderViewRef")
            .field("owner", &self.owner)
            .field("view", &Rc::as_ptr(&self.view))
            .finish()
    }
}

/// Ordered top-level nodes of one fragment of a view.
#[derive(Debug, Clone)]
pub struct RenderFragmentRef {
    owner: RendererId,
    nodes: Rc<[NodeId]>,
}

impl RenderFragmentRef {
    pub(crate) fn new(owner: RendererId, nodes: Rc<[NodeId]>) -> Self {
        Self { owner, nodes }
    }

    pub(crate) fn resolve(&self, owner: RendererId) -> Result<&Rc<[NodeId]>> {
        check_owner(self.owner, owner)?;
        Ok(&self.nodes)
    }
}

/// A bound element, addressed by view and bound-element index.
#[derive(Debug, Clone)]
pub struct RenderElementRef {
    pub render_view: RenderViewRef,
    pub bound_element_index: usize,
}

impl RenderElementRef {
    pub fn new(render_view: RenderViewRef, bound_element_index: usize) -> Self {
        Self {
            render_view,
            bound_element_index,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderViewWithFragments {
    pub view_ref: RenderViewRef,
    pub fragment_refs: Vec<RenderFragmentRef>,
}

fn check_owner(owner: RendererId, caller: RendererId) -> Result<()> {
    if owner == caller {
        Ok(())
    } else {
        Err(RenderError::ForeignReference)
    }
}

/// Operations a view layer needs from a renderer.
pub trait Renderer {
    /// Register (or silently replace) a component template; its styles are
    /// shared with every shadow root this renderer hosts.
    fn register_component_template(
        &self,
        template_id: TemplateId,
        commands: Vec<RenderTemplateCmd>,
        styles: Vec<String>,
    ) -> Result<()>;

    fn resolve_component_template(
        &self,
        template_id: TemplateId,
    ) -> Option<Rc<[RenderTemplateCmd]>>;

    fn create_proto_view(&self, commands: Vec<RenderTemplateCmd>) -> RenderProtoViewRef;

    /// Build a view in place over the first element matching `selector`.
    fn create_root_host_view(
        &self,
        proto_view: &RenderProtoViewRef,
        fragment_count: usize,
        selector: &str,
    ) -> Result<RenderViewWithFragments>;

    fn create_view(
        &self,
        proto_view: &RenderProtoViewRef,
        fragment_count: usize,
    ) -> Result<RenderViewWithFragments>;

    fn destroy_view(&self, view: &RenderViewRef) -> Result<()>;

    fn get_native_element_sync(&self, location: &RenderElementRef) -> Result<NodeId>;

    fn get_root_nodes(&self, fragment: &RenderFragmentRef) -> Result<Rc<[NodeId]>>;

    fn attach_fragment_after_fragment(
        &self,
        previous: &RenderFragmentRef,
        fragment: &RenderFragmentRef,
    ) -> Result<()>;

    fn attach_fragment_after_element(
        &self,
        location: &RenderElementRef,
        fragment: &RenderFragmentRef,
    ) -> Result<()>;

    fn detach_fragment(&self, fragment: &RenderFragmentRef) -> Result<()>;

    fn hydrate_view(&self, view: &RenderViewRef) -> Result<()>;

    fn dehydrate_view(&self, view: &RenderViewRef) -> Result<()>;

    fn set_element_property(
        &self,
        location: &RenderElementRef,
        name: &str,
        value: serde_json::Value,
    ) -> Result<()>;

    /// `None` removes the attribute.
    fn set_element_attribute(
        &self,
        location: &RenderElementRef,
        name: &str,
        value: Option<&str>,
    ) -> Result<()>;

    fn set_element_class(
        &self,
        location: &RenderElementRef,
        class_name: &str,
        is_add: bool,
    ) -> Result<()>;

    /// `None` removes the style.
    fn set_element_style(
        &self,
        location: &RenderElementRef,
        name: &str,
        value: Option<&str>,
    ) -> Result<()>;

    fn invoke_element_method(
        &self,
        location: &RenderElementRef,
        method: &str,
        args: &[serde_json::Value],
    ) -> Result<()>;

    fn set_text(&self, view: &RenderViewRef, text_node_index: usize, text: &str) -> Result<()>;

    fn set_event_dispatcher(
        &self,
        view: &RenderViewRef,
        dispatcher: Rc<dyn RenderEventDispatcher>,
    ) -> Result<()>;
}
