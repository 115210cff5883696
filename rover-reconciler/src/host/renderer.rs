use crate::node::{NodeArena, NodeId};

/// Widget library boundary
///
/// The adapter calls `redraw` once per commit, after every dirty text run
/// has been resolved, so the tree is stable for the duration of the call.
pub trait Renderer: 'static {
    /// Draw the tree rooted at `root`
    fn redraw(&mut self, tree: &NodeArena, root: NodeId);

    /// Called after a node and its subtree were released
    fn node_destroyed(&mut self, _node: NodeId) {}
}
