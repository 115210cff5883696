//! Host-side reconciliation for a retained widget tree.
//!
//! A diffing engine drives [`HostAdapter`] (or the batching
//! [`PendingDom`] in front of it) with create / insert / remove / update /
//! commit calls. Literal text is consolidated into styled text blocks by the
//! text-run engine before the tree reaches the [`Renderer`].

pub mod config;
pub mod equality;
pub mod error;
pub mod host;
pub mod node;
pub mod proxy;
pub mod text;
pub mod value;

pub use config::ReconcilerConfig;
pub use equality::{is_same, is_same_at_depth, props_equal, MAX_COMPARE_DEPTH};
pub use error::{ReconcileError, Result};
pub use host::{ChangeSignal, HostAdapter, Renderer, StubRenderer};
pub use node::{NodeArena, NodeId, NodeKind, RetainedNode, WidgetKind};
pub use proxy::{ElementId, PendingDom, PendingElement};
pub use text::{Alignment, InlineStyle, TextFormat, TextFormatOverrides};
pub use value::{props, props_from_json, Callback, PropValue, Props};
