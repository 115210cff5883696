use crate::value::PropValue;
use smartstring::alias::String as SmartString;
use std::collections::HashMap;

/// Inline (SGR-encodable) text attributes.
///
/// Set by `wr-style` spans and by the `style` prop of a text provider.
/// Unset colors inherit from the enclosing style.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub foreground: Option<SmartString>,
    pub background: Option<SmartString>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikeout: bool,
    pub dim: bool,
    pub inverse: bool,
}

impl InlineStyle {
    /// Parse a `style` prop. Accepts a map/object of attributes or a bare
    /// attribute name (`"bold"`). Anything else yields `None`.
    pub fn from_prop(value: &PropValue) -> Option<Self> {
        match value {
            PropValue::String(name) => {
                let mut style = Self::default();
                style.set_flag(name, true).then_some(style)
            }
            PropValue::Shared(inner) => Self::from_prop(&inner.borrow()),
            other => other.entries().map(Self::from_entries),
        }
    }

    fn from_entries(entries: &HashMap<SmartString, PropValue>) -> Self {
        let mut style = Self::default();

        for (key, value) in entries {
            match key.as_str() {
                "foreground" | "fg" => style.foreground = to_string(value),
                "background" | "bg" => style.background = to_string(value),
                flag => {
                    if let Some(on) = value.as_bool() {
                        if !style.set_flag(flag, on) {
                            tracing::warn!(attribute = flag, "ignoring unknown style attribute");
                        }
                    }
                }
            }
        }

        style
    }

    fn set_flag(&mut self, name: &str, on: bool) -> bool {
        let slot = match name {
            "bold" => &mut self.bold,
            "italic" => &mut self.italic,
            "underline" => &mut self.underline,
            "strikeout" | "strikethrough" => &mut self.strikeout,
            "dim" => &mut self.dim,
            "inverse" => &mut self.inverse,
            _ => return false,
        };
        *slot = on;
        true
    }

    /// Layer `inner` over `self`: flags accumulate, colors are overridden.
    pub fn merge(&self, inner: &InlineStyle) -> InlineStyle {
        InlineStyle {
            foreground: inner.foreground.clone().or_else(|| self.foreground.clone()),
            background: inner.background.clone().or_else(|| self.background.clone()),
            bold: self.bold || inner.bold,
            italic: self.italic || inner.italic,
            underline: self.underline || inner.underline,
            strikeout: self.strikeout || inner.strikeout,
            dim: self.dim || inner.dim,
            inverse: self.inverse || inner.inverse,
        }
    }
}

/// Merge two optional styles, outer first
pub fn merge_styles(outer: Option<&InlineStyle>, inner: Option<&InlineStyle>) -> Option<InlineStyle> {
    match (outer, inner) {
        (Some(outer), Some(inner)) => Some(outer.merge(inner)),
        (Some(style), None) | (None, Some(style)) => Some(style.clone()),
        (None, None) => None,
    }
}

fn to_string(value: &PropValue) -> Option<SmartString> {
    match value {
        PropValue::String(s) => Some(s.clone()),
        _ => None,
    }
}
