use crate::animate::{AnimationBuilder, AnimationScheduler, SharedScheduler};
use crate::api::{
    RenderElementRef, RenderEventDispatcher, RenderFragmentRef, RenderProtoViewRef, RenderViewRef,
    RenderViewWithFragments, Renderer, RendererId,
};
use crate::config::RendererConfig;
use crate::error::{RenderError, Result};
use crate::events::EventManager;
use crate::method::ElementMethod;
use crate::registry::ComponentTemplateRegistry;
use crate::styles_host::DomSharedStylesHost;
use crate::template::{RenderTemplateCmd, TemplateId};
use crate::util::{attr_pairs, camel_case_to_dash_case};
use crate::view::{EventCallback, EventDisposer, RenderView};
use crate::view_factory::{create_render_view, NodeFactory};
use std::cell::{Ref, RefCell};
use std::rc::Rc;
use tracing::{debug, debug_span, warn};
use trellis_dom::{Document, DomEvent, Listener, NodeId, SharedDocument};

/// Renderer backed by a [`Document`].
///
/// Owns the component template registry, the shared styles host, the event
/// manager and the animation builder. References it hands out are only
/// accepted back by the same instance.
pub struct DomRenderer {
    id: RendererId,
    document: SharedDocument,
    config: RendererConfig,
    templates: RefCell<ComponentTemplateRegistry>,
    styles_host: RefCell<DomSharedStylesHost>,
    event_manager: EventManager,
    animate: AnimationBuilder,
}

impl DomRenderer {
    pub fn new(document: SharedDocument) -> Self {
        Self::with_config(document, RendererConfig::default())
    }

    pub fn with_config(document: SharedDocument, config: RendererConfig) -> Self {
        let event_manager = EventManager::with_default_plugins(document.clone());
        let styles_host = DomSharedStylesHost::new(document.clone());
        let animate = AnimationBuilder::new(document.clone(), AnimationScheduler::shared());
        Self::from_parts(document, event_manager, styles_host, animate, config)
    }

    pub fn from_parts(
        document: SharedDocument,
        event_manager: EventManager,
        styles_host: DomSharedStylesHost,
        animate: AnimationBuilder,
        config: RendererConfig,
    ) -> Self {
        Self {
            id: RendererId::next(),
            document,
            config,
            templates: RefCell::new(ComponentTemplateRegistry::new()),
            styles_host: RefCell::new(styles_host),
            event_manager,
            animate,
        }
    }

    pub fn id(&self) -> RendererId {
        self.id
    }

    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Scheduler that completes enter/leave animations when ticked.
    pub fn scheduler(&self) -> &SharedScheduler {
        self.animate.scheduler()
    }

    pub fn styles_host(&self) -> Ref<'_, DomSharedStylesHost> {
        self.styles_host.borrow()
    }

    /// Runs `f` against the view behind `view`, for inspection.
    pub fn with_view<R>(
        &self,
        view: &RenderViewRef,
        f: impl FnOnce(&RenderView) -> R,
    ) -> Result<R> {
        let view = self.resolve_view(view)?.borrow();
        Ok(f(&view))
    }

    pub fn animate_nodes_enter(&self, nodes: &[NodeId]) -> Result<()> {
        for node in nodes {
            self.animate_node_enter(*node)?;
        }
        Ok(())
    }

    /// Starts the enter animation for elements carrying the animate class.
    pub fn animate_node_enter(&self, node: NodeId) -> Result<()> {
        if !self.is_animated(node) {
            return Ok(());
        }
        self.document.add_class(node, &self.config.enter_class)?;
        let animation = self
            .animate
            .css()
            .add_animation_class(&self.config.enter_active_class)
            .start(node)?;

        let document = self.document.clone();
        let enter_class = self.config.enter_class.clone();
        animation.on_complete(move || {
            if let Err(err) = document.remove_class(node, &enter_class) {
                warn!(%node, error = %err, "enter animation cleanup failed");
            }
        });
        Ok(())
    }

    /// Animates an element carrying the animate class out and removes it on
    /// completion; anything else is removed immediately.
    pub fn animate_node_leave(&self, node: NodeId) -> Result<()> {
        if !self.is_animated(node) {
            self.document.remove(node)?;
            return Ok(());
        }
        self.document.add_class(node, &self.config.leave_class)?;
        let animation = self
            .animate
            .css()
            .add_animation_class(&self.config.leave_active_class)
            .start(node)?;

        let document = self.document.clone();
        let leave_class = self.config.leave_class.clone();
        animation.on_complete(move || {
            let result = document
                .remove_class(node, &leave_class)
                .and_then(|()| document.remove(node));
            if let Err(err) = result {
                warn!(%node, error = %err, "leave animation cleanup failed");
            }
        });
        Ok(())
    }

    fn is_animated(&self, node: NodeId) -> bool {
        self.document.is_element_node(node)
            && self.document.has_class(node, &self.config.animate_class)
    }

    fn create_view_in(
        &self,
        proto_view: &RenderProtoViewRef,
        inplace_element: Option<NodeId>,
    ) -> Result<RenderViewWithFragments> {
        let commands = proto_view.resolve(self.id)?.clone();
        let view = create_render_view(commands, inplace_element, self)?;
        {
            let mut styles_host = self.styles_host.borrow_mut();
            for shadow_root in view.native_shadow_roots() {
                styles_host.add_host(*shadow_root)?;
            }
        }
        let fragment_refs = view
            .fragments()
            .iter()
            .map(|nodes| RenderFragmentRef::new(self.id, nodes.clone()))
            .collect();
        Ok(RenderViewWithFragments {
            view_ref: RenderViewRef::new(self.id, view),
            fragment_refs,
        })
    }

    fn resolve_view<'a>(&self, view: &'a RenderViewRef) -> Result<&'a RefCell<RenderView>> {
        view.resolve(self.id)
    }

    fn bound_element(&self, location: &RenderElementRef) -> Result<NodeId> {
        self.resolve_view(&location.render_view)?
            .borrow()
            .bound_element(location.bound_element_index)
    }

    fn set_attributes<'a>(
        &self,
        node: NodeId,
        attributes: impl Iterator<Item = (&'a str, &'a str)>,
    ) -> Result<()> {
        for (name, value) in attributes {
            self.document.set_attribute(node, name, value)?;
        }
        Ok(())
    }
}

impl Renderer for DomRenderer {
    fn register_component_template(
        &self,
        template_id: TemplateId,
        commands: Vec<RenderTemplateCmd>,
        styles: Vec<String>,
    ) -> Result<()> {
        if self.templates.borrow_mut().register(template_id, commands).is_some() {
            debug!("component template {} replaced", template_id);
        }
        self.styles_host.borrow_mut().add_styles(styles.as_slice())
    }

    fn resolve_component_template(
        &self,
        template_id: TemplateId,
    ) -> Option<Rc<[RenderTemplateCmd]>> {
        self.templates.borrow().resolve(template_id)
    }

    fn create_proto_view(&self, commands: Vec<RenderTemplateCmd>) -> RenderProtoViewRef {
        RenderProtoViewRef::new(self.id, commands.into())
    }

    fn create_root_host_view(
        &self,
        proto_view: &RenderProtoViewRef,
        fragment_count: usize,
        selector: &str,
    ) -> Result<RenderViewWithFragments> {
        let _span =
            debug_span!("DomRenderer::create_root_host_view", selector, fragment_count).entered();
        let element = self
            .document
            .query_selector(selector)?
            .ok_or_else(|| RenderError::SelectorNoMatch {
                selector: selector.to_string(),
            })?;
        self.create_view_in(proto_view, Some(element))
    }

    fn create_view(
        &self,
        proto_view: &RenderProtoViewRef,
        fragment_count: usize,
    ) -> Result<RenderViewWithFragments> {
        let _span = debug_span!("DomRenderer::create_view", fragment_count).entered();
        self.create_view_in(proto_view, None)
    }

    fn destroy_view(&self, view: &RenderViewRef) -> Result<()> {
        let mut view = self.resolve_view(view)?.borrow_mut();
        {
            let mut styles_host = self.styles_host.borrow_mut();
            for shadow_root in view.native_shadow_roots() {
                styles_host.remove_host(*shadow_root);
            }
        }
        view.destroy();
        Ok(())
    }

    fn get_native_element_sync(&self, location: &RenderElementRef) -> Result<NodeId> {
        self.bound_element(location)
    }

    fn get_root_nodes(&self, fragment: &RenderFragmentRef) -> Result<Rc<[NodeId]>> {
        fragment.resolve(self.id).cloned()
    }

    fn attach_fragment_after_fragment(
        &self,
        previous: &RenderFragmentRef,
        fragment: &RenderFragmentRef,
    ) -> Result<()> {
        let previous_nodes = previous.resolve(self.id)?;
        let nodes = fragment.resolve(self.id)?;
        let Some(sibling) = previous_nodes.last() else {
            debug!("previous fragment is empty, nothing to attach after");
            return Ok(());
        };
        move_nodes_after_sibling(&self.document, *sibling, nodes)?;
        self.animate_nodes_enter(nodes)
    }

    fn attach_fragment_after_element(
        &self,
        location: &RenderElementRef,
        fragment: &RenderFragmentRef,
    ) -> Result<()> {
        let element = self.bound_element(location)?;
        let nodes = fragment.resolve(self.id)?;
        move_nodes_after_sibling(&self.document, element, nodes)?;
        self.animate_nodes_enter(nodes)
    }

    fn detach_fragment(&self, fragment: &RenderFragmentRef) -> Result<()> {
        let nodes = fragment.resolve(self.id)?;
        let _span = debug_span!("DomRenderer::detach_fragment", nodes = nodes.len()).entered();
        for node in nodes.iter() {
            self.animate_node_leave(*node)?;
        }
        Ok(())
    }

    fn hydrate_view(&self, view: &RenderViewRef) -> Result<()> {
        self.resolve_view(view)?
            .borrow_mut()
            .hydrate(|target, event_name, callback| self.global_on(target, event_name, callback))
    }

    fn dehydrate_view(&self, view: &RenderViewRef) -> Result<()> {
        self.resolve_view(view)?.borrow_mut().dehydrate()
    }

    fn set_element_property(
        &self,
        location: &RenderElementRef,
        name: &str,
        value: serde_json::Value,
    ) -> Result<()> {
        let element = self.bound_element(location)?;
        self.document.set_property(element, name, value)?;
        Ok(())
    }

    fn set_element_attribute(
        &self,
        location: &RenderElementRef,
        name: &str,
        value: Option<&str>,
    ) -> Result<()> {
        let element = self.bound_element(location)?;
        let name = camel_case_to_dash_case(name);
        match value {
            Some(value) => self.document.set_attribute(element, &name, value)?,
            None => self.document.remove_attribute(element, &name)?,
        }
        Ok(())
    }

    fn set_element_class(
        &self,
        location: &RenderElementRef,
        class_name: &str,
        is_add: bool,
    ) -> Result<()> {
        let element = self.bound_element(location)?;
        if is_add {
            self.document.add_class(element, class_name)?;
        } else {
            self.document.remove_class(element, class_name)?;
        }
        Ok(())
    }

    fn set_element_style(
        &self,
        location: &RenderElementRef,
        name: &str,
        value: Option<&str>,
    ) -> Result<()> {
        let element = self.bound_element(location)?;
        let name = camel_case_to_dash_case(name);
        match value {
            Some(value) => self.document.set_style(element, &name, value)?,
            None => self.document.remove_style(element, &name)?,
        }
        Ok(())
    }

    fn invoke_element_method(
        &self,
        location: &RenderElementRef,
        method: &str,
        args: &[serde_json::Value],
    ) -> Result<()> {
        let element = self.bound_element(location)?;
        ElementMethod::parse(method, args)?.invoke(&self.document, element)
    }

    fn set_text(&self, view: &RenderViewRef, text_node_index: usize, text: &str) -> Result<()> {
        let node = self.resolve_view(view)?.borrow().bound_text_node(text_node_index)?;
        self.document.set_text(node, text)?;
        Ok(())
    }

    fn set_event_dispatcher(
        &self,
        view: &RenderViewRef,
        dispatcher: Rc<dyn RenderEventDispatcher>,
    ) -> Result<()> {
        self.resolve_view(view)?
            .borrow()
            .set_event_dispatcher(Some(dispatcher));
        Ok(())
    }
}

impl NodeFactory for DomRenderer {
    fn component_template(&self, template_id: TemplateId) -> Option<Rc<[RenderTemplateCmd]>> {
        self.templates.borrow().resolve(template_id)
    }

    fn create_template_anchor(&self, attr_name_and_values: &[String]) -> Result<NodeId> {
        self.create_element(&self.config.template_anchor_tag, attr_name_and_values)
    }

    fn create_element(&self, name: &str, attr_name_and_values: &[String]) -> Result<NodeId> {
        let attributes = attr_pairs(attr_name_and_values)?;
        let element = self.document.create_element(name);
        self.set_attributes(element, attributes)?;
        Ok(element)
    }

    fn merge_element(&self, existing: NodeId, attr_name_and_values: &[String]) -> Result<()> {
        let attributes = attr_pairs(attr_name_and_values)?;
        self.document.clear_nodes(existing)?;
        self.set_attributes(existing, attributes)
    }

    fn create_shadow_root(&self, host: NodeId) -> Result<NodeId> {
        Ok(self.document.create_shadow_root(host)?)
    }

    fn create_text(&self, value: Option<&str>) -> NodeId {
        self.document.create_text_node(value.unwrap_or(""))
    }

    fn append_child(&self, parent: NodeId, child: NodeId) -> Result<()> {
        Ok(self.document.append_child(parent, child)?)
    }

    fn on(&self, element: NodeId, event_name: &str, callback: EventCallback) -> Result<()> {
        self.event_manager
            .add_event_listener(element, event_name, decorate_prevent_default(callback))
    }

    fn global_on(
        &self,
        target: &str,
        event_name: &str,
        callback: EventCallback,
    ) -> Result<EventDisposer> {
        self.event_manager
            .add_global_event_listener(target, event_name, decorate_prevent_default(callback))
    }
}

/// Moves `nodes` directly after `sibling`, keeping their order. Does nothing
/// when `nodes` is empty or `sibling` is detached.
pub fn move_nodes_after_sibling(
    document: &Document,
    sibling: NodeId,
    nodes: &[NodeId],
) -> Result<()> {
    let (Some(first), Some(parent)) = (nodes.first(), document.parent_node(sibling)) else {
        return Ok(());
    };
    for node in nodes {
        document.insert_before(parent, *node, Some(sibling))?;
    }
    document.insert_before(parent, sibling, Some(*first))?;
    Ok(())
}

/// Wraps an event callback so a `false` return prevents the default action.
pub fn decorate_prevent_default(handler: EventCallback) -> Listener {
    Rc::new(move |event: &DomEvent| {
        if !handler(event) {
            event.prevent_default();
        }
    })
}
