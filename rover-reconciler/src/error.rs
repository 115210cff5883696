use crate::node::NodeId;
use crate::proxy::ElementId;
use thiserror::Error;

/// Failures surfaced to the diffing engine driving the adapter.
///
/// Only `UnknownKind` is expected in a correct program; everything else
/// means the caller broke the mutation contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("unknown component \"{0}\"")]
    UnknownKind(String),

    #[error("node {0:?} does not exist")]
    MissingNode(NodeId),

    #[error("node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("{kind} cannot hold children")]
    NotAContainer { kind: &'static str },

    #[error("{parent} cannot hold {child}")]
    InvalidChild {
        parent: &'static str,
        child: &'static str,
    },

    #[error("element {0:?} does not exist")]
    MissingElement(ElementId),

    #[error("element {child:?} is not a child of {parent:?}")]
    NotAChildElement { parent: ElementId, child: ElementId },
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
