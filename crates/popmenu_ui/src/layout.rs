//! Layout metrics for menus drawn by the [`Scene`](crate::scene::Scene).

use popmenu_core::{ItemKind, ItemNodeSpec};
use unicode_segmentation::UnicodeSegmentation;

/// Standard spacing constants for menu layout.
pub mod spacing {
    /// Extra small spacing: 4px
    pub const XS: f32 = 4.0;
    /// Small spacing: 8px
    pub const SM: f32 = 8.0;
    /// Medium spacing: 12px
    pub const MD: f32 = 12.0;
    /// Large spacing: 16px
    pub const LG: f32 = 16.0;
}

/// Standard sizing constants.
pub mod sizes {
    /// Height of a regular menu item
    pub const ITEM_HEIGHT: f32 = 28.0;
    /// Height of a separator including its margins
    pub const SEPARATOR_HEIGHT: f32 = 9.0;
    /// Vertical padding above the first and below the last item
    pub const MENU_PADDING: f32 = 4.0;
    /// Minimum width of a popup menu
    pub const MENU_MIN_WIDTH: f32 = 200.0;
    /// Height of the application menu bar
    pub const MENUBAR_HEIGHT: f32 = 28.0;
    /// Icon and check mark column
    pub const ICON_SIZE: f32 = 16.0;
    /// Submenu arrow column
    pub const ARROW_WIDTH: f32 = 16.0;
    /// Advance of one grapheme in the monospace approximation
    pub const CHAR_WIDTH: f32 = 7.0;
}

/// Approximate rendered width of `text`, counting grapheme clusters.
pub fn text_width(text: &str) -> f32 {
    text.graphemes(true).count() as f32 * sizes::CHAR_WIDTH
}

/// Height of an item row.
pub fn item_height(spec: &ItemNodeSpec) -> f32 {
    if spec.menubar_top_level {
        sizes::MENUBAR_HEIGHT
    } else if spec.kind == ItemKind::Separator {
        sizes::SEPARATOR_HEIGHT
    } else {
        sizes::ITEM_HEIGHT
    }
}

/// Width an item asks for before the menu stretches it.
pub fn item_width(spec: &ItemNodeSpec) -> f32 {
    if spec.kind == ItemKind::Separator {
        return 0.0;
    }
    if spec.menubar_top_level {
        return text_width(&spec.label) + 2.0 * spacing::MD;
    }
    let accelerator = spec
        .accelerator
        .as_deref()
        .map(|a| text_width(a) + spacing::LG)
        .unwrap_or(0.0);
    spacing::SM + sizes::ICON_SIZE + spacing::SM + text_width(&spec.label) + accelerator + sizes::ARROW_WIDTH + spacing::SM
}

/// Clamp a value between min and max.
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}
