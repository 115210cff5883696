//! The mutation contract the diffing engine drives.

mod renderer;
mod stub;

pub use renderer::Renderer;
pub use stub::StubRenderer;

use crate::config::ReconcilerConfig;
use crate::equality::props_equal;
use crate::error::{ReconcileError, Result};
use crate::node::{
    KindTag, NodeArena, NodeId, NodeKind, RetainedNode, TextLiteral, TextStyle, WidgetKind,
};
use crate::text::{InlineStyle, TextFormat, TextFormatOverrides, TextRunEngine};
use crate::value::{PropValue, Props};
use tracing::{debug, warn};

/// Keys that describe the virtual tree, never the widget
const VIRTUAL_KEYS: [&str; 2] = ["children", "child"];

/// Non-empty result of `prepare_update`: the two bags differ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeSignal;

/// Applies diffing-engine mutations to the retained tree.
///
/// Text-producing children (literals, `wr-style` spans) are routed through
/// the text-run engine; everything else is placed directly. Text runs are
/// resolved lazily, at the latest on `commit`.
pub struct HostAdapter<R: Renderer> {
    arena: NodeArena,
    root: NodeId,
    renderer: R,
    config: ReconcilerConfig,
    text: TextRunEngine,
}

impl<R: Renderer> HostAdapter<R> {
    pub fn new(renderer: R) -> Self {
        Self::with_config(renderer, ReconcilerConfig::default())
    }

    pub fn with_config(renderer: R, config: ReconcilerConfig) -> Self {
        let mut arena = NodeArena::new();
        let root = arena.create(RetainedNode::new(
            NodeKind::Widget(WidgetKind::Window),
            Props::new(),
        ));
        let text = TextRunEngine::new(config.default_format().clone());

        Self {
            arena,
            root,
            renderer,
            config,
            text,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn tree(&self) -> &NodeArena {
        &self.arena
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Build a detached node for `tag`. Unknown tags are fatal.
    pub fn create_node(&mut self, tag: &str, mut props: Props) -> Result<NodeId> {
        let kind =
            KindTag::resolve(tag).ok_or_else(|| ReconcileError::UnknownKind(tag.to_string()))?;
        strip_virtual_keys(&mut props);

        let node = match kind {
            KindTag::LineBreak => RetainedNode::literal("\n"),
            KindTag::Literal => {
                let text = props
                    .get("text")
                    .map(PropValue::to_display_string)
                    .unwrap_or_default();
                RetainedNode::new(NodeKind::Literal(TextLiteral { text, run: None }), props)
            }
            KindTag::TextProvider => {
                let overrides = TextFormatOverrides::from_props(&props);
                RetainedNode::new(NodeKind::Provider(overrides), props)
            }
            KindTag::TextStyle => {
                let style = props.get("style").and_then(InlineStyle::from_prop);
                RetainedNode::new(NodeKind::Style(TextStyle { style, run: None }), props)
            }
            KindTag::Widget(widget) => RetainedNode::new(NodeKind::Widget(widget), props),
        };

        let id = self.arena.create(node);
        if self.config.log_operations() {
            debug!(tag, node = ?id, "create_node");
        }
        Ok(id)
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        let id = self.arena.create(RetainedNode::literal(text));
        if self.config.log_operations() {
            debug!(text, node = ?id, "create_text");
        }
        id
    }

    /// Insert `child` under `parent` before `before` (at the end when absent
    /// or not a child of `parent`). An attached child is moved.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: Option<NodeId>,
    ) -> Result<()> {
        if self.config.log_operations() {
            debug!(?parent, ?child, ?before, "insert_child");
        }

        let child_kind = &self.arena.node(child)?.kind;
        let text_producing = child_kind.is_text_producing();
        let child_name = child_kind.name();

        let parent_kind = &self.arena.node(parent)?.kind;
        let parent_name = parent_kind.name();
        if !parent_kind.accepts_children() {
            return Err(ReconcileError::NotAContainer { kind: parent_name });
        }
        let into_span = matches!(parent_kind, NodeKind::Style(_));
        if into_span && !text_producing {
            return Err(ReconcileError::InvalidChild {
                parent: parent_name,
                child: child_name,
            });
        }
        if self.arena.is_ancestor_or_self(child, parent) {
            return Err(ReconcileError::InvalidChild {
                parent: parent_name,
                child: child_name,
            });
        }

        self.detach(child)?;

        if into_span {
            let index = before.and_then(|b| self.arena.index_of(parent, b));
            self.arena.add(parent, child, index)?;
            self.mark_owning_run(parent);
            return Ok(());
        }

        if text_producing {
            self.text.insert(&mut self.arena, parent, child, before)?;
            return Ok(());
        }

        let index = match before {
            Some(before) => self.position_before(parent, before)?,
            None => None,
        };
        self.arena.add(parent, child, index)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_child(parent, child, None)
    }

    /// Detach `child` from `parent`. The node stays alive until `destroy`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.config.log_operations() {
            debug!(?parent, ?child, "remove_child");
        }

        let owner = match self.arena.node(child)?.kind.text_run() {
            Some(run) => Some(run),
            None => self
                .arena
                .parent(child)
                .filter(|&p| self.arena.get(p).is_some_and(RetainedNode::is_run)),
        };

        match owner {
            Some(run) if self.arena.parent(run) == Some(parent) => {
                self.text.detach(&mut self.arena, run, child)?;
                Ok(())
            }
            None if self.arena.parent(child) == Some(parent) => self.remove_direct(parent, child),
            _ => Err(ReconcileError::NotAChild { parent, child }),
        }
    }

    /// Replace the property bag of `node`
    pub fn update_props(&mut self, node: NodeId, mut props: Props) -> Result<()> {
        if self.config.log_operations() {
            debug!(?node, keys = props.len(), "update_props");
        }
        strip_virtual_keys(&mut props);

        let retained = self.arena.node_mut(node)?;
        let mut text_changed = false;
        let mut formatting_changed = false;
        let mut style_changed = false;

        match &mut retained.kind {
            NodeKind::Literal(literal) => {
                if let Some(text) = props.get("text").map(PropValue::to_display_string) {
                    text_changed = literal.text != text;
                    literal.text = text;
                }
            }
            NodeKind::Provider(overrides) => {
                let parsed = TextFormatOverrides::from_props(&props);
                formatting_changed = *overrides != parsed;
                *overrides = parsed;
            }
            NodeKind::Style(span) => {
                let parsed = props.get("style").and_then(InlineStyle::from_prop);
                style_changed = span.style != parsed;
                span.style = parsed;
            }
            _ => {}
        }
        retained.props = props;

        if text_changed {
            self.refresh_owning_run(node)?;
        }
        if formatting_changed {
            self.text.invalidate_within(&mut self.arena, node);
        }
        if style_changed {
            self.mark_owning_run(node);
        }
        Ok(())
    }

    /// Set the payload of a text literal
    pub fn commit_text_update(&mut self, node: NodeId, text: &str) -> Result<()> {
        if self.config.log_operations() {
            debug!(?node, text, "commit_text_update");
        }

        let retained = self.arena.node_mut(node)?;
        let NodeKind::Literal(literal) = &mut retained.kind else {
            warn!(?node, kind = retained.kind.name(), "text update on a non-text node");
            return Ok(());
        };
        if literal.text == text {
            return Ok(());
        }
        literal.text = text.to_string();
        retained.props.insert("text".into(), PropValue::from(text));
        self.refresh_owning_run(node)
    }

    pub fn reset_text_content(&mut self, node: NodeId) -> Result<()> {
        self.commit_text_update(node, "")
    }

    /// `None` when the bags are deeply equal, a change signal otherwise
    pub fn prepare_update(&self, old: &Props, new: &Props) -> Option<ChangeSignal> {
        if props_equal(old, new) {
            None
        } else {
            Some(ChangeSignal)
        }
    }

    /// End of a reconciliation pass: resolve pending text runs and redraw
    pub fn commit(&mut self) -> Result<()> {
        let resolved = self.text.resolve_all(&mut self.arena)?;
        if self.config.log_operations() {
            debug!(resolved, "commit");
        }
        self.renderer.redraw(&self.arena, self.root);
        Ok(())
    }

    /// Remove and destroy every child of the root window
    pub fn clear_container(&mut self) {
        if self.config.log_operations() {
            debug!("clear_container");
        }
        for child in self.arena.remove_all_children(self.root) {
            self.release(child);
        }
    }

    /// Detach `node` if attached and free it with its subtree
    pub fn destroy(&mut self, node: NodeId) -> Result<()> {
        if self.config.log_operations() {
            debug!(?node, "destroy");
        }
        if node == self.root {
            return Err(ReconcileError::InvalidChild {
                parent: "host",
                child: WidgetKind::Window.tag(),
            });
        }
        self.arena.node(node)?;
        self.detach(node)?;
        self.release(node);
        Ok(())
    }

    /// Rendered children of `node`, resolving it first if it is a dirty run
    pub fn children(&mut self, node: NodeId) -> Result<Vec<NodeId>> {
        self.resolve_if_dirty(node)?;
        Ok(self.arena.children(node).to_vec())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.parent(node)
    }

    /// Run consolidating `node`, if any
    pub fn text_run_of(&self, node: NodeId) -> Option<NodeId> {
        TextRunEngine::owning_run(&self.arena, node)
    }

    /// Formatting `node` inherits from its nearest text provider
    pub fn resolved_format(&self, node: NodeId) -> TextFormat {
        let start = self.text_run_of(node).unwrap_or(node);
        self.text.resolve_format(&self.arena, start)
    }

    /// Text of a run (all its blocks), a block, or a literal
    pub fn text_content(&mut self, node: NodeId) -> Result<String> {
        self.resolve_if_dirty(node)?;
        let retained = self.arena.node(node)?;

        let text = match &retained.kind {
            NodeKind::Literal(literal) => literal.text.clone(),
            NodeKind::Block(block) => block.text(),
            NodeKind::Run(_) => retained
                .children
                .iter()
                .filter_map(|&child| self.arena.get(child)?.as_block())
                .map(|block| block.text())
                .collect(),
            kind => return Err(ReconcileError::NotAContainer { kind: kind.name() }),
        };
        Ok(text)
    }

    fn resolve_if_dirty(&mut self, node: NodeId) -> Result<()> {
        if TextRunEngine::is_dirty(&self.arena, node) {
            self.text.resolve(&mut self.arena, node)?;
        }
        Ok(())
    }

    /// Child index to insert at so that the new node lands before `before`.
    /// A text member inside a run splits the run around the insertion point.
    fn position_before(&mut self, parent: NodeId, before: NodeId) -> Result<Option<usize>> {
        let Some(run) = self.arena.kind(before).and_then(NodeKind::text_run) else {
            return Ok(self.arena.index_of(parent, before));
        };
        if self.arena.parent(run) != Some(parent) {
            return Ok(None);
        }

        let at = self
            .arena
            .node(run)?
            .as_run()
            .and_then(|state| state.members.iter().position(|&m| m == before))
            .unwrap_or(0);
        let target = match at {
            0 => run,
            at => self.text.split(&mut self.arena, run, at)?,
        };
        Ok(self.arena.index_of(parent, target))
    }

    /// Take `node` out of wherever it currently lives
    fn detach(&mut self, node: NodeId) -> Result<()> {
        if let Some(run) = self.arena.kind(node).and_then(NodeKind::text_run) {
            self.text.detach(&mut self.arena, run, node)?;
            return Ok(());
        }

        match self.arena.parent(node) {
            Some(parent) if self.arena.get(parent).is_some_and(RetainedNode::is_run) => {
                self.text.detach(&mut self.arena, parent, node)?;
                Ok(())
            }
            Some(parent) => self.remove_direct(parent, node),
            None => Ok(()),
        }
    }

    /// Remove a directly placed child, merging runs the removal made adjacent
    fn remove_direct(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let index = self.arena.remove_child(parent, child)?;

        if matches!(self.arena.kind(parent), Some(NodeKind::Style(_))) {
            self.mark_owning_run(parent);
            return Ok(());
        }

        let children = self.arena.children(parent);
        let neighbors = index
            .checked_sub(1)
            .and_then(|prev| Some((*children.get(prev)?, *children.get(index)?)));
        if let Some((first, second)) = neighbors {
            let is_run = |id: NodeId| self.arena.get(id).is_some_and(RetainedNode::is_run);
            if is_run(first) && is_run(second) {
                self.text.merge(&mut self.arena, first, second)?;
            }
        }
        Ok(())
    }

    fn mark_owning_run(&mut self, node: NodeId) {
        if let Some(run) = TextRunEngine::owning_run(&self.arena, node) {
            self.text.mark_dirty(&mut self.arena, run);
        }
    }

    fn refresh_owning_run(&mut self, node: NodeId) -> Result<()> {
        match TextRunEngine::owning_run(&self.arena, node) {
            Some(run) => self.text.refresh_text(&mut self.arena, run),
            None => Ok(()),
        }
    }

    fn release(&mut self, node: NodeId) {
        let released = self.arena.release(node);
        self.renderer.node_destroyed(node);
        if self.config.log_operations() {
            debug!(?node, released, "released subtree");
        }
    }
}

fn strip_virtual_keys(props: &mut Props) {
    for key in VIRTUAL_KEYS {
        props.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::props;

    fn adapter() -> HostAdapter<StubRenderer> {
        HostAdapter::new(StubRenderer::new())
    }

    #[test]
    fn test_unknown_kind_is_fatal() {
        let mut host = adapter();
        assert_eq!(
            host.create_node("wr-marquee", Props::new()),
            Err(ReconcileError::UnknownKind("wr-marquee".to_string()))
        );
    }

    #[test]
    fn test_create_node_strips_virtual_children() {
        let mut host = adapter();
        let node = host
            .create_node(
                "wr-box",
                props([
                    ("children", PropValue::from("x")),
                    ("child", PropValue::from("y")),
                    ("border", PropValue::from("single")),
                ]),
            )
            .unwrap();

        let bag = &host.tree().get(node).unwrap().props;
        assert_eq!(bag.len(), 1);
        assert!(bag.contains_key("border"));
    }

    #[test]
    fn test_line_break_is_newline_literal() {
        let mut host = adapter();
        let br = host.create_node("br", Props::new()).unwrap();
        assert_eq!(host.text_content(br).unwrap(), "\n");
    }

    #[test]
    fn test_leaf_rejects_children() {
        let mut host = adapter();
        let slider = host.create_node("wr-slider", Props::new()).unwrap();
        let space = host.create_node("wr-space", Props::new()).unwrap();
        assert_eq!(
            host.append_child(slider, space),
            Err(ReconcileError::NotAContainer { kind: "wr-slider" })
        );
    }

    #[test]
    fn test_style_span_rejects_widgets() {
        let mut host = adapter();
        let span = host.create_node("wr-style", Props::new()).unwrap();
        let stack = host.create_node("wr-stack", Props::new()).unwrap();
        assert_eq!(
            host.append_child(span, stack),
            Err(ReconcileError::InvalidChild {
                parent: "wr-style",
                child: "wr-stack",
            })
        );
    }

    #[test]
    fn test_insert_into_own_subtree_fails() {
        let mut host = adapter();
        let outer = host.create_node("wr-box", Props::new()).unwrap();
        let inner = host.create_node("wr-stack", Props::new()).unwrap();
        host.append_child(outer, inner).unwrap();
        assert!(matches!(
            host.append_child(inner, outer),
            Err(ReconcileError::InvalidChild { .. })
        ));
    }

    #[test]
    fn test_remove_foreign_child() {
        let mut host = adapter();
        let a = host.create_node("wr-box", Props::new()).unwrap();
        let b = host.create_node("wr-box", Props::new()).unwrap();
        let root = host.root();
        host.append_child(root, a).unwrap();
        assert_eq!(
            host.remove_child(a, b),
            Err(ReconcileError::NotAChild { parent: a, child: b })
        );
    }

    #[test]
    fn test_prepare_update_signals() {
        let host = adapter();
        let old = props([("x", 1)]);
        assert_eq!(host.prepare_update(&old, &props([("x", 1)])), None);
        assert_eq!(
            host.prepare_update(&old, &props([("x", 2)])),
            Some(ChangeSignal)
        );
        assert_eq!(
            host.prepare_update(&old, &props([("x", 1), ("y", 2)])),
            Some(ChangeSignal)
        );
    }

    #[test]
    fn test_destroy_root_is_rejected() {
        let mut host = adapter();
        let root = host.root();
        assert!(host.destroy(root).is_err());
        assert!(host.tree().contains(root));
    }

    #[test]
    fn test_commit_text_update_on_widget_is_ignored() {
        let mut host = adapter();
        let stack = host.create_node("wr-stack", Props::new()).unwrap();
        host.commit_text_update(stack, "nope").unwrap();
        assert!(host.tree().get(stack).unwrap().props.is_empty());
    }
}
