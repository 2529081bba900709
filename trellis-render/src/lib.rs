//! DOM renderer for a component framework.
//!
//! Template command streams are built into render views (fragments, bound
//! elements, bound text nodes) over a [`trellis_dom::Document`]. Callers
//! address nodes only through the opaque references in [`api`], mutate them
//! through the [`Renderer`] trait, and drive enter/leave animations by ticking
//! the renderer's [`animate::AnimationScheduler`].

pub mod animate;
pub mod api;
mod config;
mod dom_renderer;
mod error;
pub mod events;
mod method;
mod registry;
mod styles_host;
pub mod template;
mod util;
pub mod view;
pub mod view_factory;

pub use api::{
    RenderElementRef, RenderEventDispatcher, RenderFragmentRef, RenderProtoViewRef, RenderViewRef,
    RenderViewWithFragments, Renderer, RendererId,
};
pub use config::RendererConfig;
pub use dom_renderer::{decorate_prevent_default, move_nodes_after_sibling, DomRenderer};
pub use error::{RenderError, Result};
pub use method::ElementMethod;
pub use registry::ComponentTemplateRegistry;
pub use styles_host::{DomSharedStylesHost, SharedStylesHost};
pub use template::{
    ComponentCmd, ElementCmd, EmbeddedTemplateCmd, EventBinding, RenderTemplateCmd, TemplateId,
};
pub use util::{attr_pairs, camel_case_to_dash_case};
pub use view::{EventCallback, EventDisposer, GlobalEventBinding, HydrationState, RenderView};
pub use view_factory::{create_render_view, NodeFactory};
