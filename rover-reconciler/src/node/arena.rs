use super::types::{NodeId, NodeKind, RetainedNode};
use crate::error::{ReconcileError, Result};

/// Slot storage for the retained tree.
///
/// Ownership runs top-down through `children` (and, for text runs, through
/// their member lists). `parents` is a lookup-only back-reference used for
/// ancestor walks; teardown never follows it.
pub struct NodeArena {
    nodes: Vec<Option<RetainedNode>>,
    parents: Vec<Option<NodeId>>,
    free_list: Vec<u32>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            parents: Vec::new(),
            free_list: Vec::new(),
        }
    }

    pub fn create(&mut self, node: RetainedNode) -> NodeId {
        let index = if let Some(idx) = self.free_list.pop() {
            idx as usize
        } else {
            self.nodes.len()
        };

        if index >= self.nodes.len() {
            self.nodes.push(Some(node));
            self.parents.push(None);
        } else {
            self.nodes[index] = Some(node);
            self.parents[index] = None;
        }

        NodeId(index as u32)
    }

    pub fn get(&self, id: NodeId) -> Option<&RetainedNode> {
        self.nodes.get(id.index())?.as_ref()
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut RetainedNode> {
        self.nodes.get_mut(id.index())?.as_mut()
    }

    /// Like `get`, for call sites that treat a stale id as a contract violation
    pub fn node(&self, id: NodeId) -> Result<&RetainedNode> {
        self.get(id).ok_or(ReconcileError::MissingNode(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut RetainedNode> {
        self.get_mut(id).ok_or(ReconcileError::MissingNode(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.get(id).map(|node| &node.kind)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        *self.parents.get(node.index())?
    }

    pub fn set_parent(&mut self, node: NodeId, parent: Option<NodeId>) {
        if let Some(p) = self.parents.get_mut(node.index()) {
            *p = parent;
        }
    }

    /// Rendered children in order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn index_of(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }

    /// Ancestors of `id`, nearest first
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// Whether `ancestor` is `id` itself or lies on its parent chain
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        id == ancestor || self.ancestors(id).any(|a| a == ancestor)
    }

    /// Insert `child` at `index` (or at the end) and point its parent at
    /// `parent`. The child must not currently be attached.
    pub fn add(&mut self, parent: NodeId, child: NodeId, index: Option<usize>) -> Result<()> {
        self.node(child)?;
        let node = self.node_mut(parent)?;
        let at = index
            .filter(|&i| i <= node.children.len())
            .unwrap_or(node.children.len());
        node.children.insert(at, child);
        self.set_parent(child, Some(parent));
        Ok(())
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<usize> {
        let node = self.node_mut(parent)?;
        let index = node
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or(ReconcileError::NotAChild { parent, child })?;
        node.children.remove(index);
        self.set_parent(child, None);
        Ok(index)
    }

    /// Detach every rendered child and return them in order
    pub fn remove_all_children(&mut self, parent: NodeId) -> Vec<NodeId> {
        let children = match self.get_mut(parent) {
            Some(node) => std::mem::take(&mut node.children),
            None => return Vec::new(),
        };
        for &child in &children {
            self.set_parent(child, None);
        }
        children
    }

    /// Free a single slot without touching its children
    pub fn dispose(&mut self, id: NodeId) -> Option<RetainedNode> {
        let slot = self.nodes.get_mut(id.index())?;
        let node = slot.take();
        if node.is_some() {
            self.parents[id.index()] = None;
            self.free_list.push(id.0);
        }
        node
    }

    /// Free `id` and everything it owns, top-down. Returns how many slots
    /// were released.
    pub fn release(&mut self, id: NodeId) -> usize {
        let Some(node) = self.dispose(id) else {
            return 0;
        };

        let mut owned = node.children;
        if let NodeKind::Run(run) = node.kind {
            // pass-through members are also rendered children
            for member in run.members {
                if !owned.contains(&member) {
                    owned.push(member);
                }
            }
        }

        1 + owned.into_iter().map(|child| self.release(child)).sum::<usize>()
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}
