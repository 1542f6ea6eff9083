//! Retained in-memory visual tree that hosts the menu engine.
//!
//! The scene lays nodes out on demand from [`crate::layout`] metrics:
//! - the root and overlays span the viewport
//! - placed menus are fixed-positioned in viewport coordinates
//! - everything else stacks in its parent's flow (vertically, or
//!   horizontally inside a menu bar)
//!
//! Item nodes get a single button child, so pointer targets are usually a
//! descendant of the item rather than the item itself.

use slotmap::SlotMap;
use smallvec::SmallVec;

use popmenu_core::{Anchor, Host, ItemNodeSpec, MenuKind, MenuNodeSpec, NodeId, Placement, Point, Rect, Size};

use crate::layout::{self, sizes};

/// Z-layer every popup menu paints on, above any overlay.
const POPUP_Z: i32 = i32::MAX;

// ============================================================================
// SceneNode
// ============================================================================

/// What a scene node displays.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneNodeKind {
    /// The top-level surface.
    Root,
    /// Application content with a fixed size, e.g. a custom container.
    Surface { label: String, size: Size },
    /// Transparent outside-click overlay.
    Overlay { z_layer: i32 },
    /// A menu or menu bar.
    Menu(MenuNodeSpec),
    /// A menu item.
    Item(ItemNodeSpec),
    /// The clickable body inside an item.
    Button,
}

/// A node of the scene.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub kind: SceneNodeKind,
    pub parent: Option<NodeId>,
    pub children: SmallVec<[NodeId; 8]>,
    pub placement: Option<Placement>,
    pub overlay_top: f32,
    pub shown: bool,
    pub active: bool,
    pub submenu_active: bool,
    pub listening: bool,
}

impl SceneNode {
    fn new(kind: SceneNodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: SmallVec::new(),
            placement: None,
            overlay_top: 0.0,
            shown: false,
            active: false,
            submenu_active: false,
            listening: false,
        }
    }

    /// Spec of an item node.
    pub fn item_spec(&self) -> Option<&ItemNodeSpec> {
        match &self.kind {
            SceneNodeKind::Item(spec) => Some(spec),
            _ => None,
        }
    }

    /// Spec of a menu node.
    pub fn menu_spec(&self) -> Option<&MenuNodeSpec> {
        match &self.kind {
            SceneNodeKind::Menu(spec) => Some(spec),
            _ => None,
        }
    }

    fn is_menubar(&self) -> bool {
        self.menu_spec().is_some_and(|m| m.kind == MenuKind::Menubar)
    }

    /// Popups are visible once shown; everything else always is.
    pub fn is_visible(&self) -> bool {
        match self.kind {
            SceneNodeKind::Menu(_) if self.placement.is_some() => self.shown,
            _ => true,
        }
    }
}

// ============================================================================
// Scene
// ============================================================================

/// In-memory implementation of the engine's [`Host`].
#[derive(Debug)]
pub struct Scene {
    nodes: SlotMap<NodeId, SceneNode>,
    root: NodeId,
    viewport: Size,
    key_listening: bool,
}

impl Scene {
    /// Create an empty scene with the given viewport.
    pub fn new(viewport: Size) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SceneNode::new(SceneNodeKind::Root));
        tracing::debug!(width = viewport.width, height = viewport.height, "Scene created");
        Self { nodes, root, viewport, key_listening: false }
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Add application content below `parent`.
    pub fn add_surface(&mut self, parent: NodeId, label: impl Into<String>, size: Size) -> NodeId {
        let node = self.nodes.insert(SceneNode::new(SceneNodeKind::Surface { label: label.into(), size }));
        self.insert_before(parent, node, None);
        node
    }

    pub fn node(&self, node: NodeId) -> Option<&SceneNode> {
        self.nodes.get(node)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    pub fn is_shown(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(|n| n.shown)
    }

    pub fn is_active(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(|n| n.active)
    }

    pub fn is_submenu_active(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(|n| n.submenu_active)
    }

    /// Whether the engine's pointer listener is attached to `node`.
    pub fn is_listening(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(|n| n.listening)
    }

    /// Whether the engine's key listener is attached.
    pub fn is_key_listening(&self) -> bool {
        self.key_listening
    }

    /// Nodes currently carrying a pointer listener.
    pub fn listeners(&self) -> Vec<NodeId> {
        self.descendants(self.root).into_iter().filter(|&n| self.is_listening(n)).collect()
    }

    /// Number of attached nodes, root included.
    pub fn attached_count(&self) -> usize {
        self.descendants(self.root).len()
    }

    /// Attached menu nodes that are currently visible popups.
    pub fn open_popups(&self) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&n| self.nodes.get(n).is_some_and(|s| s.placement.is_some() && s.shown))
            .collect()
    }

    /// First attached item node whose label is `label`.
    pub fn find_item_by_label(&self, label: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|&n| self.nodes.get(n).and_then(|s| s.item_spec()).is_some_and(|s| s.label == label))
    }

    /// The button inside an item node.
    pub fn button_of(&self, item: NodeId) -> Option<NodeId> {
        let node = self.nodes.get(item)?;
        node.children
            .iter()
            .copied()
            .find(|&c| self.nodes.get(c).is_some_and(|c| c.kind == SceneNodeKind::Button))
    }

    /// Nearest ancestor-or-self that is an item node.
    pub fn item_ancestor(&self, node: NodeId) -> Option<NodeId> {
        self.ancestors(node)
            .into_iter()
            .find(|&n| self.nodes.get(n).is_some_and(|s| s.item_spec().is_some()))
    }

    /// `node` followed by its ancestors up to the root.
    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = self.nodes.contains_key(node).then_some(node);
        while let Some(n) = current {
            path.push(n);
            current = self.parent(n);
        }
        path
    }

    /// Pre-order walk of `node` and its subtree.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            let Some(scene_node) = self.nodes.get(n) else {
                continue;
            };
            out.push(n);
            stack.extend(scene_node.children.iter().rev().copied());
        }
        out
    }

    /// Topmost visible node under `point`, or the root.
    pub fn hit_test(&self, point: Point) -> NodeId {
        let mut best: Option<(i32, usize, NodeId)> = None;
        let mut order = 0;
        let mut stack = vec![(self.root, 0)];
        while let Some((n, z)) = stack.pop() {
            let Some(node) = self.nodes.get(n) else {
                continue;
            };
            if !node.is_visible() {
                continue;
            }
            let z = match node.kind {
                SceneNodeKind::Overlay { z_layer } => z_layer,
                SceneNodeKind::Menu(_) if node.placement.is_some() => POPUP_Z,
                _ => z,
            };
            order += 1;
            if n != self.root && self.bounding_rect(n).contains(point) {
                let candidate = (z, order, n);
                if best.map_or(true, |b| (candidate.0, candidate.1) > (b.0, b.1)) {
                    best = Some(candidate);
                }
            }
            stack.extend(node.children.iter().rev().map(|&c| (c, z)));
        }
        best.map(|(_, _, n)| n).unwrap_or(self.root)
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes.get(node).and_then(|n| n.parent) {
            if let Some(p) = self.nodes.get_mut(parent) {
                p.children.retain(|c| *c != node);
            }
        }
        if let Some(n) = self.nodes.get_mut(node) {
            n.parent = None;
        }
    }

    fn index_in_parent(&self, node: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.nodes.get(node)?.parent?;
        let index = self.nodes.get(parent)?.children.iter().position(|&c| c == node)?;
        Some((parent, index))
    }

    /// Whether `node` takes part in its parent's flow.
    fn in_flow(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(|n| match n.kind {
            SceneNodeKind::Overlay { .. } | SceneNodeKind::Root => false,
            SceneNodeKind::Menu(_) => n.placement.is_none(),
            _ => true,
        })
    }

    /// Offset of `node` within its parent's flow.
    fn flow_offset(&self, node: NodeId) -> Point {
        let Some((parent, index)) = self.index_in_parent(node) else {
            return Point::default();
        };
        let Some(p) = self.nodes.get(parent) else {
            return Point::default();
        };
        let horizontal = p.is_menubar();
        let start = if p.menu_spec().is_some() && !horizontal { sizes::MENU_PADDING } else { 0.0 };

        let mut offset = start;
        for &sibling in p.children.iter().take(index) {
            if !self.in_flow(sibling) {
                continue;
            }
            let size = self.client_size(sibling);
            offset += if horizontal { size.width } else { size.height };
        }
        if horizontal {
            Point::new(offset, 0.0)
        } else {
            Point::new(0.0, offset)
        }
    }

    fn menu_size(&self, node: &SceneNode) -> Size {
        let specs = node
            .children
            .iter()
            .filter_map(|&c| self.nodes.get(c).and_then(|c| c.item_spec()));
        if node.is_menubar() {
            let width = specs.map(layout::item_width).sum();
            return Size::new(width, sizes::MENUBAR_HEIGHT);
        }
        let (width, height) = specs.fold((sizes::MENU_MIN_WIDTH, 0.0), |(w, h), spec| {
            (f32::max(w, layout::item_width(spec)), h + layout::item_height(spec))
        });
        Size::new(width, height + 2.0 * sizes::MENU_PADDING)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Size::new(1280.0, 800.0))
    }
}

impl Host for Scene {
    fn root(&self) -> NodeId {
        self.root
    }

    fn create_menu_node(&mut self, spec: &MenuNodeSpec) -> NodeId {
        self.nodes.insert(SceneNode::new(SceneNodeKind::Menu(spec.clone())))
    }

    fn create_item_node(&mut self, spec: &ItemNodeSpec) -> NodeId {
        let item = self.nodes.insert(SceneNode::new(SceneNodeKind::Item(spec.clone())));
        let button = self.nodes.insert(SceneNode::new(SceneNodeKind::Button));
        self.append_child(item, button);
        item
    }

    fn create_overlay(&mut self, z_layer: i32) -> NodeId {
        self.nodes.insert(SceneNode::new(SceneNodeKind::Overlay { z_layer }))
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, before: Option<NodeId>) {
        if !self.nodes.contains_key(child) {
            return;
        }
        self.detach(child);
        let Some(p) = self.nodes.get_mut(parent) else {
            tracing::warn!(?parent, ?child, "Insert into unknown node");
            return;
        };
        let index = before
            .and_then(|b| p.children.iter().position(|&c| c == b))
            .unwrap_or(p.children.len());
        p.children.insert(index, child);
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
        }
    }

    fn replace_node(&mut self, old: NodeId, new: NodeId) {
        let Some((parent, index)) = self.index_in_parent(old) else {
            return;
        };
        self.detach(old);
        self.detach(new);
        if let Some(p) = self.nodes.get_mut(parent) {
            let index = index.min(p.children.len());
            p.children.insert(index, new);
        }
        if let Some(n) = self.nodes.get_mut(new) {
            n.parent = Some(parent);
        }
    }

    fn remove_node(&mut self, node: NodeId) {
        if node == self.root {
            return;
        }
        self.detach(node);
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            if let Some(removed) = self.nodes.remove(n) {
                stack.extend(removed.children);
            }
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node)?.parent
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes.get(node).map(|n| n.children.to_vec()).unwrap_or_default()
    }

    fn client_size(&self, node: NodeId) -> Size {
        let Some(n) = self.nodes.get(node) else {
            return Size::default();
        };
        match &n.kind {
            SceneNodeKind::Root => self.viewport,
            SceneNodeKind::Surface { size, .. } => *size,
            SceneNodeKind::Overlay { .. } => {
                let top = layout::clamp(n.overlay_top, 0.0, self.viewport.height);
                Size::new(self.viewport.width, self.viewport.height - top)
            }
            SceneNodeKind::Menu(_) => self.menu_size(n),
            SceneNodeKind::Item(spec) => {
                let menu = n.parent.and_then(|p| self.nodes.get(p));
                match menu {
                    Some(m) if !m.is_menubar() => Size::new(self.menu_size(m).width, layout::item_height(spec)),
                    _ => Size::new(layout::item_width(spec), layout::item_height(spec)),
                }
            }
            SceneNodeKind::Button => n.parent.map(|p| self.client_size(p)).unwrap_or_default(),
        }
    }

    fn offset_rect(&self, node: NodeId) -> Rect {
        let Some(n) = self.nodes.get(node) else {
            return Rect::default();
        };
        let size = self.client_size(node);
        match n.kind {
            SceneNodeKind::Root => Rect::new(0.0, 0.0, size.width, size.height),
            SceneNodeKind::Overlay { .. } => {
                Rect::new(0.0, self.viewport.height - size.height, size.width, size.height)
            }
            SceneNodeKind::Button => Rect::new(0.0, 0.0, size.width, size.height),
            _ => match n.placement {
                Some(Placement { x, y, anchor: Anchor::Left }) => Rect::new(x, y, size.width, size.height),
                Some(Placement { x, y, anchor: Anchor::Right }) => {
                    Rect::new(self.viewport.width - x - size.width, y, size.width, size.height)
                }
                None => {
                    let origin = self.flow_offset(node);
                    Rect::new(origin.x, origin.y, size.width, size.height)
                }
            },
        }
    }

    fn bounding_rect(&self, node: NodeId) -> Rect {
        let rect = self.offset_rect(node);
        let Some(n) = self.nodes.get(node) else {
            return rect;
        };
        let fixed = match n.kind {
            SceneNodeKind::Root | SceneNodeKind::Overlay { .. } => true,
            _ => n.placement.is_some(),
        };
        if fixed {
            return rect;
        }
        let origin = n.parent.map(|p| self.bounding_rect(p)).unwrap_or_default();
        Rect::new(origin.x + rect.x, origin.y + rect.y, rect.width, rect.height)
    }

    fn set_placement(&mut self, node: NodeId, placement: Placement) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.placement = Some(placement);
        }
    }

    fn set_overlay_top(&mut self, overlay: NodeId, top: f32) {
        if let Some(n) = self.nodes.get_mut(overlay) {
            n.overlay_top = top;
        }
    }

    fn set_shown(&mut self, node: NodeId, shown: bool) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.shown = shown;
        }
    }

    fn set_active(&mut self, node: NodeId, active: bool) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.active = active;
        }
    }

    fn set_submenu_active(&mut self, node: NodeId, active: bool) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.submenu_active = active;
        }
    }

    fn set_pointer_listener(&mut self, node: NodeId, listening: bool) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.listening = listening;
        }
    }

    fn set_key_listener(&mut self, listening: bool) {
        tracing::trace!(listening, "Key listener");
        self.key_listening = listening;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use popmenu_core::{ItemId, ItemKind, MenuId};

    fn item_spec(label: &str, top_level: bool) -> ItemNodeSpec {
        ItemNodeSpec {
            item: ItemId::default(),
            kind: ItemKind::Normal,
            label: label.to_string(),
            icon: None,
            icon_is_template: false,
            tooltip: String::new(),
            accelerator: None,
            checked: false,
            enabled: true,
            has_submenu: false,
            menubar_top_level: top_level,
        }
    }

    fn menu_spec(kind: MenuKind) -> MenuNodeSpec {
        MenuNodeSpec { menu: MenuId::default(), kind, submenu: false, menubar_submenu: false }
    }

    #[test]
    fn test_items_stack_below_padding() {
        let mut scene = Scene::default();
        let menu = scene.create_menu_node(&menu_spec(MenuKind::Contextmenu));
        let first = scene.create_item_node(&item_spec("One", false));
        let second = scene.create_item_node(&item_spec("Two", false));
        scene.append_child(menu, first);
        scene.append_child(menu, second);
        let root = scene.root();
        scene.append_child(root, menu);
        scene.set_placement(menu, Placement { x: 50.0, y: 60.0, anchor: Anchor::Left });

        assert_eq!(scene.offset_rect(second).y, sizes::MENU_PADDING + sizes::ITEM_HEIGHT);
        assert_eq!(scene.client_size(menu).width, sizes::MENU_MIN_WIDTH);
        let bounds = scene.bounding_rect(second);
        assert_eq!((bounds.x, bounds.y), (50.0, 60.0 + sizes::MENU_PADDING + sizes::ITEM_HEIGHT));
    }

    #[test]
    fn test_right_anchor_measures_from_right_edge() {
        let mut scene = Scene::new(Size::new(1000.0, 500.0));
        let menu = scene.create_menu_node(&menu_spec(MenuKind::Contextmenu));
        let root = scene.root();
        scene.append_child(root, menu);
        scene.set_placement(menu, Placement { x: 0.0, y: 0.0, anchor: Anchor::Right });

        assert_eq!(scene.offset_rect(menu).right(), 1000.0);
    }

    #[test]
    fn test_menubar_lays_entries_out_horizontally() {
        let mut scene = Scene::default();
        let bar = scene.create_menu_node(&menu_spec(MenuKind::Menubar));
        let file = scene.create_item_node(&item_spec("File", true));
        let edit = scene.create_item_node(&item_spec("Edit", true));
        scene.append_child(bar, file);
        scene.append_child(bar, edit);
        let root = scene.root();
        scene.append_child(root, bar);

        let file_rect = scene.bounding_rect(file);
        let edit_rect = scene.bounding_rect(edit);
        assert_eq!(edit_rect.x, file_rect.right());
        assert_eq!(edit_rect.y, 0.0);
        assert_eq!(scene.client_size(bar).height, sizes::MENUBAR_HEIGHT);
    }

    #[test]
    fn test_hit_test_prefers_popups_over_overlay() {
        let mut scene = Scene::new(Size::new(800.0, 600.0));
        let root = scene.root();
        let sheet = scene.create_overlay(5);
        scene.append_child(root, sheet);
        let menu = scene.create_menu_node(&menu_spec(MenuKind::Contextmenu));
        let item = scene.create_item_node(&item_spec("One", false));
        scene.append_child(menu, item);
        scene.append_child(sheet, menu);
        scene.set_placement(menu, Placement { x: 10.0, y: 10.0, anchor: Anchor::Left });

        // Not shown yet: the overlay receives the hit.
        assert_eq!(scene.hit_test(Point::new(20.0, 20.0)), sheet);

        scene.set_shown(menu, true);
        let button = scene.button_of(item).unwrap();
        assert_eq!(scene.hit_test(Point::new(20.0, 20.0)), button);
        assert_eq!(scene.hit_test(Point::new(700.0, 500.0)), sheet);
    }

    #[test]
    fn test_remove_node_drops_subtree() {
        let mut scene = Scene::default();
        let menu = scene.create_menu_node(&menu_spec(MenuKind::Contextmenu));
        let item = scene.create_item_node(&item_spec("One", false));
        scene.append_child(menu, item);
        let root = scene.root();
        scene.append_child(root, menu);
        let button = scene.button_of(item).unwrap();

        scene.remove_node(menu);

        assert!(!scene.contains(item));
        assert!(!scene.contains(button));
        assert_eq!(scene.attached_count(), 1);
    }

    #[test]
    fn test_replace_node_keeps_position() {
        let mut scene = Scene::default();
        let root = scene.root();
        let a = scene.add_surface(root, "a", Size::new(10.0, 10.0));
        let b = scene.add_surface(root, "b", Size::new(10.0, 10.0));
        let c = scene.add_surface(root, "c", Size::new(10.0, 10.0));
        scene.remove_node(c);
        let d = scene.add_surface(root, "d", Size::new(10.0, 10.0));
        scene.detach(d);

        scene.replace_node(a, d);

        assert_eq!(scene.children(root), vec![d, b]);
        assert_eq!(scene.parent(a), None);
    }
}
