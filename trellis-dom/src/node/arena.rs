use super::types::{NodeId, NodeKind};
use smallvec::SmallVec;

pub type ChildList = SmallVec<[NodeId; 4]>;

/// Backing storage for every node of a document.
///
/// Nodes are never freed: a detached node keeps its id and can be
/// re-inserted, the same way a script keeps a reference to a removed DOM node.
pub struct NodeArena {
    nodes: Vec<NodeKind>,
    parents: Vec<Option<NodeId>>,
    children: Vec<ChildList>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            parents: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn create(&mut self, node: NodeKind) -> NodeId {
        let index = self.nodes.len();
        self.nodes.push(node);
        self.parents.push(None);
        self.children.push(ChildList::new());
        NodeId(index as u32)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeKind> {
        self.nodes.get_mut(id.index())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        *self.parents.get(id.index())?
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children
            .get(id.index())
            .map(|c| c.as_slice())
            .unwrap_or(&[])
    }

    /// Unlinks `id` from its parent, if any.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            self.children[parent.index()].retain(|c| *c != id);
            self.parents[id.index()] = None;
        }
    }

    /// Links a detached node under `parent` at `position` (clamped to the child count).
    pub fn attach(&mut self, parent: NodeId, id: NodeId, position: usize) {
        let siblings = &mut self.children[parent.index()];
        let position = position.min(siblings.len());
        siblings.insert(position, id);
        self.parents[id.index()] = Some(parent);
    }

    pub fn clear_children(&mut self, id: NodeId) {
        let removed = std::mem::take(&mut self.children[id.index()]);
        for child in removed {
            self.parents[child.index()] = None;
        }
    }

    /// Whether `ancestor` is `id` or one of its ancestors (same tree only).
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_and_detach() {
        let mut arena = NodeArena::new();
        let parent = arena.create(NodeKind::element("div"));
        let a = arena.create(NodeKind::Text("a".into()));
        let b = arena.create(NodeKind::Text("b".into()));

        arena.attach(parent, a, 0);
        arena.attach(parent, b, 0);
        assert_eq!(arena.children(parent), &[b, a]);
        assert_eq!(arena.parent(a), Some(parent));

        arena.detach(b);
        assert_eq!(arena.children(parent), &[a]);
        assert_eq!(arena.parent(b), None);
    }

    #[test]
    fn test_attach_clamps_position() {
        let mut arena = NodeArena::new();
        let parent = arena.create(NodeKind::element("ul"));
        let li = arena.create(NodeKind::element("li"));
        arena.attach(parent, li, 42);
        assert_eq!(arena.children(parent), &[li]);
    }

    #[test]
    fn test_clear_children_orphans_nodes() {
        let mut arena = NodeArena::new();
        let parent = arena.create(NodeKind::element("div"));
        let child = arena.create(NodeKind::element("span"));
        arena.attach(parent, child, 0);

        arena.clear_children(parent);
        assert!(arena.children(parent).is_empty());
        assert_eq!(arena.parent(child), None);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_inclusive_ancestor() {
        let mut arena = NodeArena::new();
        let root = arena.create(NodeKind::element("div"));
        let mid = arena.create(NodeKind::element("p"));
        let leaf = arena.create(NodeKind::Text("x".into()));
        arena.attach(root, mid, 0);
        arena.attach(mid, leaf, 0);

        assert!(arena.is_inclusive_ancestor(root, leaf));
        assert!(arena.is_inclusive_ancestor(leaf, leaf));
        assert!(!arena.is_inclusive_ancestor(leaf, root));
    }
}
