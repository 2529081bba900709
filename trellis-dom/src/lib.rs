//! Arena-backed, single-threaded document model.
//!
//! Provides the slice of DOM behaviour a renderer needs: element, text,
//! comment and shadow-root nodes, attributes, class list, inline style,
//! properties, `querySelector`, listeners with bubbling and default
//! prevention, focus tracking and HTML serialisation.

mod document;
mod error;
pub mod event;
pub mod node;
pub mod selector;
mod serialize;

pub use document::{Document, SharedDocument};
pub use error::{DomError, Result};
pub use event::{DomEvent, EventTarget, Listener, ListenerId, Modifiers};
pub use node::{NodeId, NodeKind};
