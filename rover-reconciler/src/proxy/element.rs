use crate::node::NodeId;
use crate::value::Props;
use smartstring::alias::String as SmartString;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) u32);

impl ElementId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Shadow node handed to the diffing engine.
///
/// Writes land in `props` and reach the host only at the next flush. The
/// sibling links mirror the diffing engine's view of the tree and are kept
/// independently of the retained tree.
#[derive(Debug, Clone)]
pub struct PendingElement {
    pub tag: SmartString,
    pub props: Props,
    /// Queued for the next flush
    pub scheduled: bool,
    /// Backing retained node, created on first insertion
    pub node: Option<NodeId>,
    pub parent: Option<ElementId>,
    pub first_child: Option<ElementId>,
    pub last_child: Option<ElementId>,
    pub next_sibling: Option<ElementId>,
    pub prev_sibling: Option<ElementId>,
}

impl PendingElement {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.into(),
            props: Props::new(),
            scheduled: false,
            node: None,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            prev_sibling: None,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.node.is_some()
    }
}
