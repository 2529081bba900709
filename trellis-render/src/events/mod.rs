//! Event manager and its listener plugins.

mod dom_events;
mod key_events;
mod manager;

pub use dom_events::DomEventsPlugin;
pub use key_events::{KeyEventName, KeyEventsPlugin};
pub use manager::{resolve_global_target, EventManager, EventManagerPlugin};
