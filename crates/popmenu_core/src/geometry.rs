//! Geometry primitives and the menu positioning rules.
//!
//! [`place_menu`] is pure: it only sees sizes and offsets, never nodes or
//! session state.

use serde::{Deserialize, Serialize};

/// A point in container coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Point {
    /// Create a point.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Size {
    /// Create a size.
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Rect {
    /// Create a rectangle.
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Size of the rectangle.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Whether the point lies inside (right and bottom edges exclusive).
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}

/// Which horizontal edge a placement's `x` is measured from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Anchor {
    /// `x` is the distance from the container's left edge.
    #[default]
    Left,
    /// `x` is the distance from the container's right edge.
    Right,
}

/// Final placement of a menu node.
///
/// Hosts set exactly one of left/right from `x` according to `anchor` and
/// leave the other at its default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Horizontal offset from the anchored edge.
    pub x: f32,
    /// Offset from the container's top edge.
    pub y: f32,
    /// Edge `x` is measured from.
    pub anchor: Anchor,
}

/// Display context of the menu being placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementContext {
    /// A context menu or any menu opened without a trigger.
    TopLevel,
    /// A dropdown opened from a top-level menu bar entry.
    MenubarSubmenu,
    /// A nested submenu opened to the side of its parent menu.
    Submenu {
        /// Offset geometry of the parent menu node holding the trigger item.
        trigger_parent: Rect,
    },
}

/// Inputs of [`place_menu`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRequest {
    /// Requested top-left position.
    pub desired: Point,
    /// Measured size of the menu node.
    pub menu: Size,
    /// Offset size of the container the menu is clipped against.
    pub container: Size,
    /// How the menu was opened.
    pub context: PlacementContext,
    /// Overlap between a flipped side submenu and its parent.
    pub submenu_overlap: f32,
}

/// Compute the clipped and possibly flipped placement of a menu.
///
/// Horizontal overflow flips the menu to right anchoring. A flipped side
/// submenu is re-expressed as the space left of its parent; if it still does
/// not fit it falls back to the left edge. Vertical overflow pulls the menu
/// up so its bottom meets the container's bottom, even when that leaves the
/// top above the container.
pub fn place_menu(request: &PlacementRequest) -> Placement {
    let PlacementRequest { desired, menu, container, context, submenu_overlap } = *request;
    let mut x = desired.x;
    let mut y = desired.y;
    let mut anchor = Anchor::Left;

    if x + menu.width > container.width {
        anchor = Anchor::Right;
        match context {
            PlacementContext::Submenu { trigger_parent } => {
                x = container.width - trigger_parent.x + submenu_overlap;
                if menu.width + x > container.width {
                    x = 0.0;
                    anchor = Anchor::Left;
                }
            }
            PlacementContext::TopLevel | PlacementContext::MenubarSubmenu => {
                x = 0.0;
            }
        }
    }

    // Menus taller than the container keep the bottom-aligned value and run
    // off the top.
    if y + menu.height > container.height {
        y = container.height - menu.height;
    }

    Placement { x, y, anchor }
}
