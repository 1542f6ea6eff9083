//! Boundary between the engine and the visual tree that displays menus.
//!
//! The engine never owns visual nodes. It asks the [`Host`] to create them
//! and keeps only opaque [`NodeId`] handles, with its own side table from
//! node to model entity.

use crate::geometry::{Placement, Rect, Size};
use crate::models::{ItemId, ItemKind, MenuId, MenuKind};

slotmap::new_key_type! {
    /// Opaque handle of a node in the host's visual tree.
    pub struct NodeId;
}

/// What the host needs to build the container node of a menu.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuNodeSpec {
    /// The menu being displayed.
    pub menu: MenuId,
    /// Context menu or menu bar.
    pub kind: MenuKind,
    /// Opened from an item of another menu.
    pub submenu: bool,
    /// Opened from a top-level menu bar entry.
    pub menubar_submenu: bool,
}

/// What the host needs to build the node of a single item.
///
/// Icon, label and accelerator layout is entirely up to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemNodeSpec {
    /// The item being displayed.
    pub item: ItemId,
    /// Item type.
    pub kind: ItemKind,
    /// Label text.
    pub label: String,
    /// Optional icon reference.
    pub icon: Option<String>,
    /// Whether the icon is a template image.
    pub icon_is_template: bool,
    /// Tooltip text.
    pub tooltip: String,
    /// Accelerator display text.
    pub accelerator: Option<String>,
    /// Checked mark; never set for top-level menu bar entries.
    pub checked: bool,
    /// Disabled items are rendered but skipped by keyboard navigation.
    pub enabled: bool,
    /// The item opens a submenu.
    pub has_submenu: bool,
    /// The item is a top-level menu bar entry.
    pub menubar_top_level: bool,
}

/// The visual tree the engine drives.
///
/// All calls are synchronous and made from within event handlers or
/// popup/popdown; implementations never call back into the session.
pub trait Host {
    /// The default top-level surface menus are attached to.
    fn root(&self) -> NodeId;

    /// Create a detached container node for a menu.
    fn create_menu_node(&mut self, spec: &MenuNodeSpec) -> NodeId;

    /// Create a detached node for an item.
    fn create_item_node(&mut self, spec: &ItemNodeSpec) -> NodeId;

    /// Create a detached full-viewport transparent overlay at `z_layer`.
    fn create_overlay(&mut self, z_layer: i32) -> NodeId;

    /// Append `child` as the last child of `parent`.
    fn append_child(&mut self, parent: NodeId, child: NodeId);

    /// Insert `child` into `parent` before `before`, or last when `None`.
    fn insert_before(&mut self, parent: NodeId, child: NodeId, before: Option<NodeId>);

    /// Put `new` at the position `old` occupies and detach `old`.
    fn replace_node(&mut self, old: NodeId, new: NodeId);

    /// Detach and discard `node` together with its subtree.
    fn remove_node(&mut self, node: NodeId);

    /// Parent of `node`, if attached.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Children of `node` in order.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Inner size of `node`.
    fn client_size(&self, node: NodeId) -> Size;

    /// Geometry of `node` relative to its offset parent.
    fn offset_rect(&self, node: NodeId) -> Rect;

    /// Geometry of `node` in viewport coordinates.
    fn bounding_rect(&self, node: NodeId) -> Rect;

    /// Apply a computed placement to a menu node.
    fn set_placement(&mut self, node: NodeId, placement: Placement);

    /// Move the overlay's top edge down, e.g. below an installed menu bar.
    fn set_overlay_top(&mut self, overlay: NodeId, top: f32);

    /// Flip the "visible" presentation state of a menu node.
    fn set_shown(&mut self, node: NodeId, shown: bool);

    /// Keyboard/hover highlight of an item node.
    fn set_active(&mut self, node: NodeId, active: bool);

    /// Marks an item whose submenu is open (and its expanded state).
    fn set_submenu_active(&mut self, node: NodeId, active: bool);

    /// Attach or detach the engine's pointer-down/up listener on `node`.
    fn set_pointer_listener(&mut self, node: NodeId, listening: bool);

    /// Attach or detach the engine's document-wide key listener.
    fn set_key_listener(&mut self, listening: bool);

    /// Whether `node` is a strict descendant of `ancestor`.
    fn is_descendant(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent(parent);
        }
        false
    }
}
