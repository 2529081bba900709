mod arena;
mod types;

pub use arena::{ChildList, NodeArena};
pub use types::{ElementData, Name, NodeId, NodeKind};
