//! Text consolidation: literals and style spans become text blocks.

mod format;
mod run;
mod style;

pub use format::{Alignment, TextFormat, TextFormatOverrides, DEFAULT_FONT};
pub use run::TextRunEngine;
pub use style::{merge_styles, InlineStyle};
