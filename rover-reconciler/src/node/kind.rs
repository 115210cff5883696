/// Widgets the consuming widget library constructs natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Window,
    Box,
    Button,
    Collapsible,
    Scrollable,
    Stack,
    Tree,
    Accordion,
    AccordionSection,
    Drawer,
    Tabs,
    TabsSection,
    Checkbox,
    CollapsibleText,
    Console,
    Digits,
    Input,
    Separator,
    Slider,
    Space,
}

impl WidgetKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "wr-window" => WidgetKind::Window,
            "wr-box" => WidgetKind::Box,
            "wr-button" => WidgetKind::Button,
            "wr-collapsible" => WidgetKind::Collapsible,
            "wr-scrollable" => WidgetKind::Scrollable,
            "wr-stack" => WidgetKind::Stack,
            "wr-tree" => WidgetKind::Tree,
            "wr-accordion" => WidgetKind::Accordion,
            "wr-accordion-section" => WidgetKind::AccordionSection,
            "wr-drawer" => WidgetKind::Drawer,
            "wr-tabs" => WidgetKind::Tabs,
            "wr-tabs-section" => WidgetKind::TabsSection,
            "wr-checkbox" => WidgetKind::Checkbox,
            "wr-collapsible-text" => WidgetKind::CollapsibleText,
            "wr-console" => WidgetKind::Console,
            "wr-digits" => WidgetKind::Digits,
            "wr-input" => WidgetKind::Input,
            "wr-separator" => WidgetKind::Separator,
            "wr-slider" => WidgetKind::Slider,
            "wr-space" => WidgetKind::Space,
            _ => return None,
        };
        Some(kind)
    }

    pub fn tag(self) -> &'static str {
        match self {
            WidgetKind::Window => "wr-window",
            WidgetKind::Box => "wr-box",
            WidgetKind::Button => "wr-button",
            WidgetKind::Collapsible => "wr-collapsible",
            WidgetKind::Scrollable => "wr-scrollable",
            WidgetKind::Stack => "wr-stack",
            WidgetKind::Tree => "wr-tree",
            WidgetKind::Accordion => "wr-accordion",
            WidgetKind::AccordionSection => "wr-accordion-section",
            WidgetKind::Drawer => "wr-drawer",
            WidgetKind::Tabs => "wr-tabs",
            WidgetKind::TabsSection => "wr-tabs-section",
            WidgetKind::Checkbox => "wr-checkbox",
            WidgetKind::CollapsibleText => "wr-collapsible-text",
            WidgetKind::Console => "wr-console",
            WidgetKind::Digits => "wr-digits",
            WidgetKind::Input => "wr-input",
            WidgetKind::Separator => "wr-separator",
            WidgetKind::Slider => "wr-slider",
            WidgetKind::Space => "wr-space",
        }
    }

    /// Leaf widgets render themselves and never take children
    pub fn is_container(self) -> bool {
        !matches!(
            self,
            WidgetKind::Checkbox
                | WidgetKind::CollapsibleText
                | WidgetKind::Console
                | WidgetKind::Digits
                | WidgetKind::Input
                | WidgetKind::Separator
                | WidgetKind::Slider
                | WidgetKind::Space
        )
    }
}

/// What a tag passed to `create_node` resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindTag {
    LineBreak,
    Literal,
    TextProvider,
    TextStyle,
    Widget(WidgetKind),
}

impl KindTag {
    pub fn resolve(tag: &str) -> Option<Self> {
        match tag {
            "br" | "wr-br" => Some(KindTag::LineBreak),
            "text" | "wr-literal" => Some(KindTag::Literal),
            "wr-text" => Some(KindTag::TextProvider),
            "wr-style" => Some(KindTag::TextStyle),
            other => WidgetKind::from_tag(other).map(KindTag::Widget),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip() {
        for kind in [
            WidgetKind::Window,
            WidgetKind::Box,
            WidgetKind::TabsSection,
            WidgetKind::Slider,
            WidgetKind::CollapsibleText,
        ] {
            assert_eq!(WidgetKind::from_tag(kind.tag()), Some(kind));
        }
    }

    #[test]
    fn test_resolve_special_tags() {
        assert_eq!(KindTag::resolve("br"), Some(KindTag::LineBreak));
        assert_eq!(KindTag::resolve("wr-br"), Some(KindTag::LineBreak));
        assert_eq!(KindTag::resolve("text"), Some(KindTag::Literal));
        assert_eq!(KindTag::resolve("wr-text"), Some(KindTag::TextProvider));
        assert_eq!(KindTag::resolve("wr-style"), Some(KindTag::TextStyle));
        assert_eq!(
            KindTag::resolve("wr-stack"),
            Some(KindTag::Widget(WidgetKind::Stack))
        );
        assert_eq!(KindTag::resolve("wr-marquee"), None);
    }

    #[test]
    fn test_leaf_widgets() {
        assert!(WidgetKind::Box.is_container());
        assert!(WidgetKind::Button.is_container());
        assert!(!WidgetKind::Checkbox.is_container());
        assert!(!WidgetKind::Space.is_container());
    }
}
