use super::renderer::Renderer;
use crate::node::{NodeArena, NodeId, NodeKind};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

/// Debug/testing renderer that dumps the tree on every redraw
///
/// Nothing is drawn. Each frame is written as an indented outline through
/// `tracing`, and into the log buffer when one is attached.
pub struct StubRenderer {
    frames: usize,
    /// Start time for timestamps
    start_time: Instant,
    /// Optional log buffer for testing
    log_buffer: Option<Rc<RefCell<Vec<String>>>>,
}

impl StubRenderer {
    pub fn new() -> Self {
        Self {
            frames: 0,
            start_time: Instant::now(),
            log_buffer: None,
        }
    }

    /// Create a StubRenderer with a log buffer for testing
    pub fn with_buffer(buffer: Rc<RefCell<Vec<String>>>) -> Self {
        Self {
            log_buffer: Some(buffer),
            ..Self::new()
        }
    }

    /// Number of redraws so far
    pub fn frames(&self) -> usize {
        self.frames
    }

    fn timestamp(&self) -> String {
        let elapsed = self.start_time.elapsed();
        format!("[{:>6.2}s]", elapsed.as_secs_f64())
    }

    fn log(&self, msg: &str) {
        if let Some(buffer) = &self.log_buffer {
            buffer.borrow_mut().push(msg.to_string());
        }
        tracing::debug!(target: "rover_reconciler::stub", "{} {}", self.timestamp(), msg);
    }

    fn print_node(&self, tree: &NodeArena, node_id: NodeId, indent: usize) {
        let indent_str = "  ".repeat(indent);

        let Some(node) = tree.get(node_id) else {
            self.log(&format!("{}(missing {:?})", indent_str, node_id));
            return;
        };

        match &node.kind {
            NodeKind::Block(block) => {
                let mut msg = format!(
                    "{}Text(id={:?}, align={}): \"{}\"",
                    indent_str,
                    node_id,
                    block.format.alignment.as_str(),
                    block.text()
                );
                if block.format.wrap {
                    msg.push_str(" wrap");
                }
                self.log(&msg);
            }
            NodeKind::Literal(literal) => {
                self.log(&format!(
                    "{}Literal(id={:?}): \"{}\"",
                    indent_str, node_id, literal.text
                ));
            }
            kind if node.children.is_empty() => {
                self.log(&format!("{}{}(id={:?})", indent_str, kind.name(), node_id));
            }
            kind => {
                self.log(&format!("{}{}(id={:?}) {{", indent_str, kind.name(), node_id));
                for &child_id in &node.children {
                    self.print_node(tree, child_id, indent + 1);
                }
                self.log(&format!("{}}}", indent_str));
            }
        }
    }
}

impl Default for StubRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for StubRenderer {
    fn redraw(&mut self, tree: &NodeArena, root: NodeId) {
        self.frames += 1;
        self.log(&format!("=== FRAME {} ===", self.frames));
        self.print_node(tree, root, 0);
    }

    fn node_destroyed(&mut self, node: NodeId) {
        self.log(&format!("Removed(id={:?})", node));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{RetainedNode, TextBlock, TextSpan, WidgetKind};
    use crate::text::TextFormat;
    use crate::value::Props;
    use smallvec::smallvec;

    #[test]
    fn test_redraw_dumps_tree_into_buffer() {
        let buffer = Rc::new(RefCell::new(Vec::new()));
        let mut renderer = StubRenderer::with_buffer(buffer.clone());

        let mut tree = NodeArena::new();
        let root = tree.create(RetainedNode::new(
            NodeKind::Widget(WidgetKind::Window),
            Props::new(),
        ));
        let block = tree.create(RetainedNode::block(TextBlock {
            spans: smallvec![TextSpan {
                text: "hi".to_string(),
                style: None,
            }],
            format: TextFormat::default(),
        }));
        tree.add(root, block, None).unwrap();

        renderer.redraw(&tree, root);

        assert_eq!(renderer.frames(), 1);
        let lines = buffer.borrow();
        assert_eq!(lines[0], "=== FRAME 1 ===");
        assert_eq!(lines[1], format!("wr-window(id={:?}) {{", root));
        assert_eq!(lines[2], format!("  Text(id={:?}, align=left): \"hi\"", block));
        assert_eq!(lines[3], "}");
    }
}
