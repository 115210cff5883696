use super::format::TextFormat;
use super::style::{merge_styles, InlineStyle};
use crate::error::{ReconcileError, Result};
use crate::node::{NodeArena, NodeId, NodeKind, RetainedNode, TextBlock, TextSpan};
use smallvec::SmallVec;
use std::collections::HashSet;
use tracing::trace;

type Spans = SmallVec<[TextSpan; 2]>;

/// One rendered child of a run: a consolidated block or a pass-through node
#[derive(Debug)]
enum Segment {
    Text(Spans),
    Node(NodeId),
}

/// Keeps text-producing nodes consolidated into as few text blocks as
/// possible, and tracks which runs need to be re-materialized.
pub struct TextRunEngine {
    defaults: TextFormat,
    /// Work list for `resolve_all`. The run's own `dirty` flag is
    /// authoritative; ids here may be stale.
    dirty_runs: HashSet<NodeId>,
}

impl TextRunEngine {
    pub fn new(defaults: TextFormat) -> Self {
        Self {
            defaults,
            dirty_runs: HashSet::new(),
        }
    }

    /// Place a text-producing `member` under the non-text `parent`, before
    /// `before` when given. Returns the run that now owns it.
    pub fn insert(
        &mut self,
        arena: &mut NodeArena,
        parent: NodeId,
        member: NodeId,
        before: Option<NodeId>,
    ) -> Result<NodeId> {
        if let Some((run, at)) = before.and_then(|b| member_position(arena, parent, b)) {
            self.add_member(arena, run, member, Some(at))?;
            return Ok(run);
        }

        let children = arena.children(parent);
        let index = before
            .and_then(|b| children.iter().position(|&c| c == b))
            .unwrap_or(children.len());
        let preceding = index
            .checked_sub(1)
            .map(|i| children[i])
            .filter(|&p| arena.get(p).is_some_and(RetainedNode::is_run));

        let run = match preceding {
            Some(run) => run,
            None => {
                let run = arena.create(RetainedNode::run());
                arena.add(parent, run, Some(index))?;
                trace!(?run, ?parent, index, "created text run");
                run
            }
        };

        self.add_member(arena, run, member, None)?;
        Ok(run)
    }

    /// Add `member` to the logical member list of `run` at `at` (or the end)
    pub fn add_member(
        &mut self,
        arena: &mut NodeArena,
        run: NodeId,
        member: NodeId,
        at: Option<usize>,
    ) -> Result<()> {
        let text_producing = arena.node(member)?.kind.is_text_producing();
        let state = arena
            .node_mut(run)?
            .as_run_mut()
            .ok_or(ReconcileError::NotAContainer { kind: "text run" })?;
        let at = at
            .filter(|&i| i <= state.members.len())
            .unwrap_or(state.members.len());
        state.members.insert(at, member);

        if text_producing {
            arena.node_mut(member)?.kind.set_text_run(Some(run));
        } else {
            arena.set_parent(member, Some(run));
        }

        self.mark_dirty(arena, run);
        Ok(())
    }

    /// Remove `member` from `run`. An emptied run is pruned from its parent
    /// and destroyed; its former parent is returned in that case.
    pub fn detach(
        &mut self,
        arena: &mut NodeArena,
        run: NodeId,
        member: NodeId,
    ) -> Result<Option<NodeId>> {
        let state = arena
            .node_mut(run)?
            .as_run_mut()
            .ok_or(ReconcileError::NotAContainer { kind: "text run" })?;
        let index = state
            .members
            .iter()
            .position(|&m| m == member)
            .ok_or(ReconcileError::NotAChild { parent: run, child: member })?;
        state.members.remove(index);
        let emptied = state.members.is_empty();

        let text_producing = arena.node(member)?.kind.is_text_producing();
        if text_producing {
            arena.node_mut(member)?.kind.set_text_run(None);
        } else if arena.remove_child(run, member).is_err() {
            arena.set_parent(member, None);
        }

        if !emptied {
            self.mark_dirty(arena, run);
            return Ok(None);
        }

        let parent = arena.parent(run);
        if let Some(parent) = parent {
            arena.remove_child(parent, run)?;
        }
        self.destroy_run(arena, run);
        trace!(?run, ?parent, "pruned empty text run");
        Ok(parent)
    }

    /// Split `run` before member `at`; members from `at` on move to a new run
    /// placed right after it. Returns the new run.
    pub fn split(&mut self, arena: &mut NodeArena, run: NodeId, at: usize) -> Result<NodeId> {
        let parent = arena.parent(run).ok_or(ReconcileError::MissingNode(run))?;
        let tail: Vec<NodeId> = {
            let state = arena
                .node_mut(run)?
                .as_run_mut()
                .ok_or(ReconcileError::NotAContainer { kind: "text run" })?;
            let at = at.min(state.members.len());
            state.members.split_off(at)
        };

        let index = arena.index_of(parent, run).map(|i| i + 1);
        let second = arena.create(RetainedNode::run());
        arena.add(parent, second, index)?;

        for member in tail {
            if arena.parent(member) == Some(run) {
                let _ = arena.remove_child(run, member);
            }
            self.add_member(arena, second, member, None)?;
        }
        self.mark_dirty(arena, run);
        trace!(?run, ?second, "split text run");
        Ok(second)
    }

    /// Append the members of `second` to `first` and destroy `second`
    pub fn merge(&mut self, arena: &mut NodeArena, first: NodeId, second: NodeId) -> Result<()> {
        let members = arena
            .node_mut(second)?
            .as_run_mut()
            .map(|state| std::mem::take(&mut state.members))
            .ok_or(ReconcileError::NotAContainer { kind: "text run" })?;

        for member in members {
            if arena.parent(member) == Some(second) {
                let _ = arena.remove_child(second, member);
            }
            self.add_member(arena, first, member, None)?;
        }

        if let Some(parent) = arena.parent(second) {
            arena.remove_child(parent, second)?;
        }
        self.destroy_run(arena, second);
        trace!(?first, ?second, "merged text runs");
        Ok(())
    }

    /// Free a run whose members were already moved out, together with the
    /// blocks it materialized. Pass-through children are only detached.
    fn destroy_run(&mut self, arena: &mut NodeArena, run: NodeId) {
        for child in arena.remove_all_children(run) {
            if arena.get(child).is_some_and(|n| n.as_block().is_some()) {
                arena.release(child);
            }
        }
        arena.dispose(run);
        self.dirty_runs.remove(&run);
    }

    pub fn mark_dirty(&mut self, arena: &mut NodeArena, run: NodeId) {
        if let Some(state) = arena.get_mut(run).and_then(RetainedNode::as_run_mut) {
            state.dirty = true;
            self.dirty_runs.insert(run);
        }
    }

    /// Whether `run` is a live text run awaiting resolution
    pub fn is_dirty(arena: &NodeArena, run: NodeId) -> bool {
        arena
            .get(run)
            .and_then(RetainedNode::as_run)
            .is_some_and(|state| state.dirty)
    }

    /// Mark every run in the rendered subtree of `node` dirty (after its
    /// formatting ancestors may have changed)
    pub fn invalidate_within(&mut self, arena: &mut NodeArena, node: NodeId) {
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if arena.get(current).is_some_and(RetainedNode::is_run) {
                self.mark_dirty(arena, current);
            }
            stack.extend_from_slice(arena.children(current));
        }
    }

    /// Run that consolidates `node`, following enclosing style spans
    pub fn owning_run(arena: &NodeArena, node: NodeId) -> Option<NodeId> {
        let mut current = node;
        loop {
            if let Some(run) = arena.kind(current)?.text_run() {
                return Some(run);
            }
            let parent = arena.parent(current)?;
            if !matches!(arena.kind(parent)?, NodeKind::Style(_)) {
                return None;
            }
            current = parent;
        }
    }

    /// Formatting for blocks under `node`: the nearest text provider (the
    /// node itself included) over the defaults
    pub fn resolve_format(&self, arena: &NodeArena, node: NodeId) -> TextFormat {
        std::iter::once(node)
            .chain(arena.ancestors(node))
            .find_map(|ancestor| match arena.kind(ancestor) {
                Some(NodeKind::Provider(overrides)) => Some(overrides.apply_to(&self.defaults)),
                _ => None,
            })
            .unwrap_or_else(|| self.defaults.clone())
    }

    /// Payload of a member changed. Rewrites existing blocks in place when
    /// the block layout is unchanged, otherwise schedules a full resolution.
    pub fn refresh_text(&mut self, arena: &mut NodeArena, run: NodeId) -> Result<()> {
        if Self::is_dirty(arena, run) {
            return Ok(());
        }

        let segments = segments(arena, run)?;
        let children = arena.children(run).to_vec();
        let same_shape = segments.len() == children.len()
            && segments.iter().zip(&children).all(|(segment, &child)| match segment {
                Segment::Text(_) => arena.get(child).is_some_and(|n| n.as_block().is_some()),
                Segment::Node(id) => *id == child,
            });

        if !same_shape {
            self.mark_dirty(arena, run);
            return Ok(());
        }

        for (segment, child) in segments.into_iter().zip(children) {
            if let (Segment::Text(spans), Some(NodeKind::Block(block))) =
                (segment, arena.get_mut(child).map(|n| &mut n.kind))
            {
                block.spans = spans;
            }
        }
        trace!(?run, "updated text blocks in place");
        Ok(())
    }

    /// Rebuild the rendered children of `run` from its members
    pub fn resolve(&mut self, arena: &mut NodeArena, run: NodeId) -> Result<()> {
        let segments = segments(arena, run)?;
        let format = self.resolve_format(arena, run);

        for child in arena.remove_all_children(run) {
            if arena.get(child).is_some_and(|n| n.as_block().is_some()) {
                arena.release(child);
            }
        }

        let mut blocks = 0;
        for segment in segments {
            let child = match segment {
                Segment::Text(spans) => {
                    blocks += 1;
                    arena.create(RetainedNode::block(TextBlock {
                        spans,
                        format: format.clone(),
                    }))
                }
                Segment::Node(id) => id,
            };
            arena.add(run, child, None)?;
        }

        if let Some(state) = arena.get_mut(run).and_then(RetainedNode::as_run_mut) {
            state.dirty = false;
        }
        self.dirty_runs.remove(&run);
        trace!(?run, blocks, "resolved text run");
        Ok(())
    }

    /// Resolve every dirty run. Returns how many were rebuilt.
    pub fn resolve_all(&mut self, arena: &mut NodeArena) -> Result<usize> {
        let mut pending: Vec<NodeId> = self.dirty_runs.drain().collect();
        pending.sort();

        let mut resolved = 0;
        for run in pending {
            if Self::is_dirty(arena, run) {
                self.resolve(arena, run)?;
                resolved += 1;
            }
        }
        Ok(resolved)
    }
}

/// Where `before` sits inside a run that is a child of `parent`
fn member_position(arena: &NodeArena, parent: NodeId, before: NodeId) -> Option<(NodeId, usize)> {
    let run = arena.kind(before)?.text_run()?;
    if arena.parent(run) != Some(parent) {
        return None;
    }
    let at = arena.get(run)?.as_run()?.members.iter().position(|&m| m == before)?;
    Some((run, at))
}

fn segments(arena: &NodeArena, run: NodeId) -> Result<Vec<Segment>> {
    let members = &arena
        .node(run)?
        .as_run()
        .ok_or(ReconcileError::NotAContainer { kind: "text run" })?
        .members;

    let mut segments = Vec::new();
    let mut buffer: Option<Spans> = None;

    for &member in members {
        match &arena.node(member)?.kind {
            NodeKind::Literal(literal) => {
                push_span(buffer.get_or_insert_with(Spans::new), &literal.text, None);
            }
            NodeKind::Style(span) => {
                collect_spans(
                    arena,
                    member,
                    span.style.as_ref(),
                    buffer.get_or_insert_with(Spans::new),
                )?;
            }
            _ => {
                if let Some(spans) = buffer.take() {
                    segments.push(Segment::Text(spans));
                }
                segments.push(Segment::Node(member));
            }
        }
    }

    if let Some(spans) = buffer {
        segments.push(Segment::Text(spans));
    }
    Ok(segments)
}

/// Spans contributed by a style span's descendants, in order
fn collect_spans(
    arena: &NodeArena,
    span: NodeId,
    style: Option<&InlineStyle>,
    out: &mut Spans,
) -> Result<()> {
    for &child in arena.children(span) {
        match &arena.node(child)?.kind {
            NodeKind::Literal(literal) => push_span(out, &literal.text, style.cloned()),
            NodeKind::Style(inner) => {
                let merged = merge_styles(style, inner.style.as_ref());
                collect_spans(arena, child, merged.as_ref(), out)?;
            }
            _ => {}
        }
    }
    Ok(())
}

fn push_span(out: &mut Spans, text: &str, style: Option<InlineStyle>) {
    match out.last_mut() {
        Some(last) if last.style == style => last.text.push_str(text),
        _ => out.push(TextSpan {
            text: text.to_string(),
            style,
        }),
    }
}
