use super::style::InlineStyle;
use crate::value::{PropValue, Props};
use smartstring::alias::String as SmartString;

pub const DEFAULT_FONT: &str = "default";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "left" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" => Some(Alignment::Right),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

/// Fully resolved formatting of one text block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFormat {
    pub alignment: Alignment,
    pub wrap: bool,
    pub font: SmartString,
    pub style: Option<InlineStyle>,
}

impl Default for TextFormat {
    fn default() -> Self {
        Self {
            alignment: Alignment::Left,
            wrap: false,
            font: DEFAULT_FONT.into(),
            style: None,
        }
    }
}

/// Formatting declared by a text provider. Unset fields fall through to the
/// defaults when a block is materialized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextFormatOverrides {
    pub alignment: Option<Alignment>,
    pub wrap: Option<bool>,
    pub font: Option<SmartString>,
    pub style: Option<InlineStyle>,
}

impl TextFormatOverrides {
    pub fn from_props(props: &Props) -> Self {
        let mut overrides = Self::default();

        if let Some(value) = props.get("alignment") {
            match value.as_str().and_then(Alignment::parse) {
                Some(alignment) => overrides.alignment = Some(alignment),
                None if value.is_nil() => {}
                None => tracing::warn!(
                    value = %value.to_display_string(),
                    "ignoring unknown text alignment"
                ),
            }
        }

        if let Some(PropValue::Bool(wrap)) = props.get("wrap") {
            overrides.wrap = Some(*wrap);
        }

        if let Some(PropValue::String(font)) = props.get("font") {
            overrides.font = Some(font.clone());
        }

        overrides.style = props.get("style").and_then(InlineStyle::from_prop);
        overrides
    }

    /// Overlay these overrides on `base`
    pub fn apply_to(&self, base: &TextFormat) -> TextFormat {
        TextFormat {
            alignment: self.alignment.unwrap_or(base.alignment),
            wrap: self.wrap.unwrap_or(base.wrap),
            font: self.font.clone().unwrap_or_else(|| base.font.clone()),
            style: self.style.clone().or_else(|| base.style.clone()),
        }
    }
}
