//! Turns a template command stream into a [`RenderView`].
//!
//! The root commands build fragment 0. Every component found while building
//! queues a builder for its template, and every merged embedded template
//! queues a builder for a new fragment. Queued builders run after the builder
//! that queued them, depth first.

use crate::error::{RenderError, Result};
use crate::template::{
    ComponentCmd, ElementCmd, EmbeddedTemplateCmd, EventBinding, RenderTemplateCmd, TemplateId,
};
use crate::view::{
    event_handler, DispatcherSlot, EventCallback, EventDisposer, GlobalEventBinding, RenderView,
};
use std::rc::Rc;
use trellis_dom::NodeId;

/// Node construction capability the view builder runs against.
pub trait NodeFactory {
    fn component_template(&self, template_id: TemplateId) -> Option<Rc<[RenderTemplateCmd]>>;

    fn create_template_anchor(&self, attr_name_and_values: &[String]) -> Result<NodeId>;

    fn create_element(&self, name: &str, attr_name_and_values: &[String]) -> Result<NodeId>;

    /// Reuse `existing`: drop its children and apply the attributes.
    fn merge_element(&self, existing: NodeId, attr_name_and_values: &[String]) -> Result<()>;

    fn create_shadow_root(&self, host: NodeId) -> Result<NodeId>;

    /// `None` creates an empty text node.
    fn create_text(&self, value: Option<&str>) -> NodeId;

    fn append_child(&self, parent: NodeId, child: NodeId) -> Result<()>;

    fn on(&self, element: NodeId, event_name: &str, callback: EventCallback) -> Result<()>;

    fn global_on(
        &self,
        target: &str,
        event_name: &str,
        callback: EventCallback,
    ) -> Result<EventDisposer>;
}

/// Build a view from `commands`. When `inplace_element` is given, the first
/// element command is merged into it instead of creating a new node.
pub fn create_render_view<F>(
    commands: Rc<[RenderTemplateCmd]>,
    inplace_element: Option<NodeId>,
    factory: &F,
) -> Result<RenderView>
where
    F: NodeFactory + ?Sized,
{
    let mut context = BuildContext::new(factory, inplace_element);
    context.build(commands)?;
    tracing::debug!(
        fragments = context.fragments.len(),
        bound_elements = context.bound_elements.len(),
        bound_text_nodes = context.bound_text_nodes.len(),
        "render view built"
    );

    let BuildContext {
        fragments,
        bound_text_nodes,
        bound_elements,
        native_shadow_roots,
        global_event_bindings,
        dispatcher,
        ..
    } = context;
    Ok(RenderView::new(
        fragments.into_iter().map(Rc::<[NodeId]>::from).collect(),
        bound_text_nodes,
        bound_elements,
        native_shadow_roots,
        global_event_bindings,
        dispatcher,
    ))
}

/// A component host being filled with content nodes by its parent builder.
struct Component {
    host: NodeId,
    /// Shadow root for native-shadow components, the host otherwise.
    root: NodeId,
    native_shadow: bool,
    template_id: TemplateId,
    /// Component whose template declared this one.
    owner: Option<usize>,
    content_by_ng_content_index: Vec<Vec<NodeId>>,
}

impl Component {
    fn project(&self, ng_content_index: usize) -> &[NodeId] {
        self.content_by_ng_content_index
            .get(ng_content_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Copy)]
enum Parent {
    Node(NodeId),
    Component(usize),
}

struct ViewBuilder {
    parent_component: Option<usize>,
    /// Index into `BuildContext::fragments` for fragment builders.
    fragment: Option<usize>,
    commands: Rc<[RenderTemplateCmd]>,
}

struct BuildContext<'a, F: ?Sized> {
    factory: &'a F,
    inplace_element: Option<NodeId>,
    queued: Vec<ViewBuilder>,
    components: Vec<Component>,
    fragments: Vec<Vec<NodeId>>,
    bound_elements: Vec<NodeId>,
    bound_text_nodes: Vec<NodeId>,
    native_shadow_roots: Vec<NodeId>,
    global_event_bindings: Vec<GlobalEventBinding>,
    dispatcher: DispatcherSlot,
}

impl<'a, F: NodeFactory + ?Sized> BuildContext<'a, F> {
    fn new(factory: &'a F, inplace_element: Option<NodeId>) -> Self {
        Self {
            factory,
            inplace_element,
            queued: Vec::new(),
            components: Vec::new(),
            fragments: Vec::new(),
            bound_elements: Vec::new(),
            bound_text_nodes: Vec::new(),
            native_shadow_roots: Vec::new(),
            global_event_bindings: Vec::new(),
            dispatcher: DispatcherSlot::default(),
        }
    }

    fn build(&mut self, commands: Rc<[RenderTemplateCmd]>) -> Result<()> {
        self.enqueue_fragment_builder(None, commands);
        let root = self.queued.remove(0);
        self.run(root)
    }

    fn run(&mut self, builder: ViewBuilder) -> Result<()> {
        let outer = std::mem::take(&mut self.queued);
        let result = builder.build(self);
        let enqueued = std::mem::replace(&mut self.queued, outer);
        result?;
        for next in enqueued {
            self.run(next)?;
        }
        Ok(())
    }

    fn enqueue_component_builder(&mut self, component: usize) -> Result<()> {
        let template_id = self.components[component].template_id;
        let mut owner = self.components[component].owner;
        while let Some(index) = owner {
            if self.components[index].template_id == template_id {
                return Err(RenderError::RecursiveComponent(template_id));
            }
            owner = self.components[index].owner;
        }
        let commands = self
            .factory
            .component_template(template_id)
            .ok_or(RenderError::ComponentTemplateNotFound(template_id))?;
        self.queued.push(ViewBuilder {
            parent_component: Some(component),
            fragment: None,
            commands,
        });
        Ok(())
    }

    fn enqueue_fragment_builder(
        &mut self,
        parent_component: Option<usize>,
        commands: Rc<[RenderTemplateCmd]>,
    ) {
        self.fragments.push(Vec::new());
        self.queued.push(ViewBuilder {
            parent_component,
            fragment: Some(self.fragments.len() - 1),
            commands,
        });
    }

    fn consume_inplace_element(&mut self) -> Option<NodeId> {
        self.inplace_element.take()
    }

    fn add_event_listener(
        &mut self,
        bound_element_index: usize,
        binding: &EventBinding,
    ) -> Result<()> {
        match &binding.target {
            Some(target) => {
                self.global_event_bindings.push(GlobalEventBinding {
                    element_index: bound_element_index,
                    target: target.clone(),
                    name: binding.name.clone(),
                });
                Ok(())
            }
            None => {
                let handler =
                    event_handler(&self.dispatcher, bound_element_index, binding.name.clone());
                let element = self.bound_elements[bound_element_index];
                self.factory.on(element, &binding.name, handler)
            }
        }
    }

    fn add_content_node(
        &mut self,
        component: usize,
        ng_content_index: Option<usize>,
        node: NodeId,
    ) -> Result<()> {
        let component = &mut self.components[component];
        match ng_content_index {
            Some(index) => {
                if component.content_by_ng_content_index.len() <= index {
                    component.content_by_ng_content_index.resize_with(index + 1, Vec::new);
                }
                component.content_by_ng_content_index[index].push(node);
                Ok(())
            }
            // Unprojected light DOM only survives under a native shadow root.
            None if component.native_shadow => self.factory.append_child(component.host, node),
            None => Ok(()),
        }
    }
}

impl ViewBuilder {
    fn build<F: NodeFactory + ?Sized>(self, context: &mut BuildContext<'_, F>) -> Result<()> {
        let root_parent = match (self.fragment, self.parent_component) {
            (None, Some(component)) => Some(Parent::Node(context.components[component].root)),
            _ => None,
        };
        let mut state = BuilderState {
            parent_component: self.parent_component,
            fragment: self.fragment,
            parent_stack: vec![root_parent],
        };
        for cmd in self.commands.iter() {
            state.visit(cmd, context)?;
        }
        Ok(())
    }
}

struct BuilderState {
    parent_component: Option<usize>,
    fragment: Option<usize>,
    parent_stack: Vec<Option<Parent>>,
}

impl BuilderState {
    fn parent(&self) -> Option<Parent> {
        self.parent_stack.last().copied().flatten()
    }

    fn visit<F: NodeFactory + ?Sized>(
        &mut self,
        cmd: &RenderTemplateCmd,
        context: &mut BuildContext<'_, F>,
    ) -> Result<()> {
        match cmd {
            RenderTemplateCmd::Text {
                value,
                is_bound,
                ng_content_index,
            } => {
                let text = context.factory.create_text(value.as_deref());
                self.add_child(text, *ng_content_index, context)?;
                if *is_bound {
                    context.bound_text_nodes.push(text);
                }
            }
            RenderTemplateCmd::NgContent {
                index,
                ng_content_index,
            } => {
                if let Some(component) = self.parent_component {
                    let projected = context.components[component].project(*index).to_vec();
                    for node in projected {
                        self.add_child(node, *ng_content_index, context)?;
                    }
                }
            }
            RenderTemplateCmd::BeginElement(element) => {
                let el = self.begin_element(element, context)?;
                self.parent_stack.push(Some(Parent::Node(el)));
            }
            RenderTemplateCmd::BeginComponent(component) => {
                self.begin_component(component, context)?;
            }
            RenderTemplateCmd::EndElement | RenderTemplateCmd::EndComponent => {
                self.parent_stack.pop();
            }
            RenderTemplateCmd::EmbeddedTemplate(template) => {
                self.embedded_template(template, context)?;
            }
        }
        Ok(())
    }

    fn begin_component<F: NodeFactory + ?Sized>(
        &mut self,
        cmd: &ComponentCmd,
        context: &mut BuildContext<'_, F>,
    ) -> Result<()> {
        let host = self.begin_element(&cmd.element, context)?;
        let root = if cmd.native_shadow {
            let shadow_root = context.factory.create_shadow_root(host)?;
            context.native_shadow_roots.push(shadow_root);
            shadow_root
        } else {
            host
        };
        context.components.push(Component {
            host,
            root,
            native_shadow: cmd.native_shadow,
            template_id: cmd.template_id,
            owner: self.parent_component,
            content_by_ng_content_index: Vec::new(),
        });
        let component = context.components.len() - 1;
        context.enqueue_component_builder(component)?;
        self.parent_stack.push(Some(Parent::Component(component)));
        Ok(())
    }

    fn embedded_template<F: NodeFactory + ?Sized>(
        &mut self,
        cmd: &EmbeddedTemplateCmd,
        context: &mut BuildContext<'_, F>,
    ) -> Result<()> {
        let anchor = context.factory.create_template_anchor(&cmd.attr_name_and_values)?;
        self.add_child(anchor, cmd.ng_content_index, context)?;
        context.bound_elements.push(anchor);
        if cmd.is_merged {
            context.enqueue_fragment_builder(self.parent_component, cmd.children.clone().into());
        }
        Ok(())
    }

    fn begin_element<F: NodeFactory + ?Sized>(
        &mut self,
        cmd: &ElementCmd,
        context: &mut BuildContext<'_, F>,
    ) -> Result<NodeId> {
        let el = match context.consume_inplace_element() {
            Some(existing) => {
                context.factory.merge_element(existing, &cmd.attr_name_and_values)?;
                if let Some(fragment) = self.fragment {
                    context.fragments[fragment].push(existing);
                }
                existing
            }
            None => {
                let el = context.factory.create_element(&cmd.name, &cmd.attr_name_and_values)?;
                self.add_child(el, cmd.ng_content_index, context)?;
                el
            }
        };
        if cmd.is_bound {
            let bound_element_index = context.bound_elements.len();
            context.bound_elements.push(el);
            for binding in &cmd.event_bindings {
                context.add_event_listener(bound_element_index, binding)?;
            }
        }
        Ok(el)
    }

    fn add_child<F: NodeFactory + ?Sized>(
        &mut self,
        node: NodeId,
        ng_content_index: Option<usize>,
        context: &mut BuildContext<'_, F>,
    ) -> Result<()> {
        match self.parent() {
            Some(Parent::Component(component)) => {
                context.add_content_node(component, ng_content_index, node)
            }
            Some(Parent::Node(parent)) => context.factory.append_child(parent, node),
            None => {
                if let Some(fragment) = self.fragment {
                    context.fragments[fragment].push(node);
                }
                Ok(())
            }
        }
    }
}
