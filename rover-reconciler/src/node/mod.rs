mod arena;
mod kind;
mod types;

pub use arena::NodeArena;
pub use kind::{KindTag, WidgetKind};
pub use types::{
    NodeId, NodeKind, RetainedNode, TextBlock, TextLiteral, TextRun, TextSpan, TextStyle,
};
