//! Minimal host used by the session's unit tests.

use slotmap::SlotMap;

use crate::geometry::{Anchor, Placement, Rect, Size};
use crate::host::{Host, ItemNodeSpec, MenuNodeSpec, NodeId};
use crate::models::MenuKind;

const ITEM_HEIGHT: f32 = 20.0;
const MENU_WIDTH: f32 = 120.0;

#[derive(Debug, Default)]
struct FakeNode {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    is_item: bool,
    horizontal: bool,
    shown: bool,
    active: bool,
    submenu_active: bool,
    listening: bool,
    placement: Option<Placement>,
}

/// Nodes stack items vertically (horizontally in menu bars) with fixed
/// sizes. Menus are positioned like fixed elements in viewport space.
pub(crate) struct FakeHost {
    nodes: SlotMap<NodeId, FakeNode>,
    root: NodeId,
    viewport: Size,
    pub(crate) key_listening: bool,
}

impl FakeHost {
    pub(crate) fn new(width: f32, height: f32) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(FakeNode::default());
        Self { nodes, root, viewport: Size::new(width, height), key_listening: false }
    }

    pub(crate) fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    pub(crate) fn is_shown(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(|n| n.shown)
    }

    pub(crate) fn is_active(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(|n| n.active)
    }

    pub(crate) fn is_submenu_active(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(|n| n.submenu_active)
    }

    pub(crate) fn pointer_listening(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(|n| n.listening)
    }

    /// Nodes reachable from the root, root included.
    pub(crate) fn attached_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self.root];
        while let Some(n) = stack.pop() {
            count += 1;
            stack.extend(self.children(n));
        }
        count
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes.get(node).and_then(|n| n.parent) {
            if let Some(p) = self.nodes.get_mut(parent) {
                p.children.retain(|&c| c != node);
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
}

impl Host for FakeHost {
    fn root(&self) -> NodeId {
        self.root
    }

    fn create_menu_node(&mut self, spec: &MenuNodeSpec) -> NodeId {
        self.nodes.insert(FakeNode { horizontal: spec.kind == MenuKind::Menubar, ..FakeNode::default() })
    }

    fn create_item_node(&mut self, _spec: &ItemNodeSpec) -> NodeId {
        self.nodes.insert(FakeNode { is_item: true, ..FakeNode::default() })
    }

    fn create_overlay(&mut self, _z_layer: i32) -> NodeId {
        self.nodes.insert(FakeNode::default())
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, before: Option<NodeId>) {
        self.detach(child);
        let Some(p) = self.nodes.get_mut(parent) else {
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
        self.detach(new);
        self.detach(old);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.insert(index.min(p.children.len()), new);
        }
        if let Some(n) = self.nodes.get_mut(new) {
            n.parent = Some(parent);
        }
    }

    fn remove_node(&mut self, node: NodeId) {
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
        self.nodes.get(node).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn client_size(&self, node: NodeId) -> Size {
        let Some(n) = self.nodes.get(node) else {
            return Size::default();
        };
        let count = n.children.len() as f32;
        if n.horizontal {
            Size::new(MENU_WIDTH * count, ITEM_HEIGHT)
        } else {
            Size::new(MENU_WIDTH, ITEM_HEIGHT * count)
        }
    }

    fn offset_rect(&self, node: NodeId) -> Rect {
        if node == self.root {
            return Rect::new(0.0, 0.0, self.viewport.width, self.viewport.height);
        }
        let Some(n) = self.nodes.get(node) else {
            return Rect::default();
        };
        if n.is_item {
            let (parent, index) = self.index_in_parent(node).unwrap_or((self.root, 0));
            let horizontal = self.nodes.get(parent).is_some_and(|p| p.horizontal);
            let i = index as f32;
            return if horizontal {
                Rect::new(MENU_WIDTH * i, 0.0, MENU_WIDTH, ITEM_HEIGHT)
            } else {
                Rect::new(0.0, ITEM_HEIGHT * i, MENU_WIDTH, ITEM_HEIGHT)
            };
        }
        let size = self.client_size(node);
        match n.placement {
            Some(Placement { x, y, anchor: Anchor::Left }) => Rect::new(x, y, size.width, size.height),
            Some(Placement { x, y, anchor: Anchor::Right }) => {
                Rect::new(self.viewport.width - x - size.width, y, size.width, size.height)
            }
            None if n.children.iter().any(|&c| self.nodes.get(c).is_some_and(|c| c.is_item)) => {
                Rect::new(0.0, 0.0, size.width, size.height)
            }
            None => Rect::new(0.0, 0.0, self.viewport.width, self.viewport.height),
        }
    }

    fn bounding_rect(&self, node: NodeId) -> Rect {
        let rect = self.offset_rect(node);
        match self.nodes.get(node) {
            Some(n) if n.is_item => {
                let parent = n.parent.map(|p| self.offset_rect(p)).unwrap_or_default();
                Rect::new(parent.x + rect.x, parent.y + rect.y, rect.width, rect.height)
            }
            _ => rect,
        }
    }

    fn set_placement(&mut self, node: NodeId, placement: Placement) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.placement = Some(placement);
        }
    }

    fn set_overlay_top(&mut self, _overlay: NodeId, _top: f32) {}

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
        self.key_listening = listening;
    }
}
