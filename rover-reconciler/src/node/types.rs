use super::kind::WidgetKind;
use crate::text::{InlineStyle, TextFormat, TextFormatOverrides};
use crate::value::Props;
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Literal text leaf. Never rendered directly: a text run consolidates it.
#[derive(Debug, Clone, Default)]
pub struct TextLiteral {
    pub text: String,
    /// Run that currently lists this literal as a member (lookup only)
    pub run: Option<NodeId>,
}

/// Inline style span (`wr-style`). Joins text runs like a literal; its own
/// children are literals and nested spans.
#[derive(Debug, Clone, Default)]
pub struct TextStyle {
    pub style: Option<InlineStyle>,
    pub run: Option<NodeId>,
}

/// Consolidates adjacent text members into renderable blocks
#[derive(Debug, Clone, Default)]
pub struct TextRun {
    /// Logical members in order; rendered children are derived from these
    pub members: Vec<NodeId>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpan {
    pub text: String,
    pub style: Option<InlineStyle>,
}

/// Materialized text block: one renderable text widget
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub spans: SmallVec<[TextSpan; 2]>,
    pub format: TextFormat,
}

impl TextBlock {
    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Widget(WidgetKind),
    Literal(TextLiteral),
    Style(TextStyle),
    Provider(TextFormatOverrides),
    Run(TextRun),
    Block(TextBlock),
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Widget(kind) => kind.tag(),
            NodeKind::Literal(_) => "text literal",
            NodeKind::Style(_) => "wr-style",
            NodeKind::Provider(_) => "wr-text",
            NodeKind::Run(_) => "text run",
            NodeKind::Block(_) => "text block",
        }
    }

    /// Literals and style spans are consolidated into text runs
    pub fn is_text_producing(&self) -> bool {
        matches!(self, NodeKind::Literal(_) | NodeKind::Style(_))
    }

    /// Whether the diffing engine may insert children under this kind
    pub fn accepts_children(&self) -> bool {
        match self {
            NodeKind::Widget(kind) => kind.is_container(),
            NodeKind::Style(_) | NodeKind::Provider(_) => true,
            NodeKind::Literal(_) | NodeKind::Run(_) | NodeKind::Block(_) => false,
        }
    }

    /// Run link of a text-producing node
    pub fn text_run(&self) -> Option<NodeId> {
        match self {
            NodeKind::Literal(literal) => literal.run,
            NodeKind::Style(span) => span.run,
            _ => None,
        }
    }

    pub fn set_text_run(&mut self, run: Option<NodeId>) {
        match self {
            NodeKind::Literal(literal) => literal.run = run,
            NodeKind::Style(span) => span.run = run,
            _ => {}
        }
    }
}

/// A node of the live tree the widget library renders from
#[derive(Debug, Clone)]
pub struct RetainedNode {
    pub kind: NodeKind,
    pub props: Props,
    pub children: Vec<NodeId>,
}

impl RetainedNode {
    pub fn new(kind: NodeKind, props: Props) -> Self {
        Self {
            kind,
            props,
            children: Vec::new(),
        }
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Self::new(
            NodeKind::Literal(TextLiteral {
                text: text.into(),
                run: None,
            }),
            Props::new(),
        )
    }

    pub fn run() -> Self {
        Self::new(NodeKind::Run(TextRun::default()), Props::new())
    }

    pub fn block(block: TextBlock) -> Self {
        Self::new(NodeKind::Block(block), Props::new())
    }

    pub fn as_run(&self) -> Option<&TextRun> {
        match &self.kind {
            NodeKind::Run(run) => Some(run),
            _ => None,
        }
    }

    pub fn as_run_mut(&mut self) -> Option<&mut TextRun> {
        match &mut self.kind {
            NodeKind::Run(run) => Some(run),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&TextBlock> {
        match &self.kind {
            NodeKind::Block(block) => Some(block),
            _ => None,
        }
    }

    pub fn is_run(&self) -> bool {
        matches!(self.kind, NodeKind::Run(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn test_block_text_concatenates_spans() {
        let block = TextBlock {
            spans: smallvec![
                TextSpan {
                    text: "hello ".to_string(),
                    style: None,
                },
                TextSpan {
                    text: "world".to_string(),
                    style: Some(InlineStyle {
                        bold: true,
                        ..Default::default()
                    }),
                },
            ],
            format: TextFormat::default(),
        };
        assert_eq!(block.text(), "hello world");
    }

    #[test]
    fn test_kind_capabilities() {
        let literal = RetainedNode::literal("a");
        assert!(literal.kind.is_text_producing());
        assert!(!literal.kind.accepts_children());

        let span = NodeKind::Style(TextStyle::default());
        assert!(span.is_text_producing());
        assert!(span.accepts_children());

        let stack = NodeKind::Widget(WidgetKind::Stack);
        assert!(!stack.is_text_producing());
        assert!(stack.accepts_children());
        assert!(!NodeKind::Widget(WidgetKind::Slider).accepts_children());
    }

    #[test]
    fn test_run_link() {
        let mut kind = NodeKind::Literal(TextLiteral::default());
        assert_eq!(kind.text_run(), None);
        kind.set_text_run(Some(NodeId(7)));
        assert_eq!(kind.text_run(), Some(NodeId(7)));
    }
}
