//! Pointer routing and item activation.
//!
//! Two listeners can see the same pointer event: the menu bar's own
//! listener and the transient listener on the container while a tree is
//! open. An event is acted on only by the listener whose side (menu bar or
//! popup) matches where the target lies, so each event is handled once.

use crate::events::{EventResponse, PointerEvent, PointerPhase};
use crate::geometry::Point;
use crate::host::{Host, NodeId};
use crate::models::{ItemId, ItemKind};
use crate::state::{MenuSession, NodeBinding};

impl<H: Host> MenuSession<H> {
    /// Handle a pointer event delivered to one of the engine's listeners, or
    /// an enter/leave event on a menu node.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> EventResponse {
        match event.phase {
            PointerPhase::Down | PointerPhase::Up => self.handle_press(event),
            PointerPhase::Enter => {
                self.handle_enter(event.target);
                EventResponse::IGNORED
            }
            PointerPhase::Leave => {
                self.handle_leave(event.target, event.related);
                EventResponse::IGNORED
            }
        }
    }

    fn handle_press(&mut self, event: PointerEvent) -> EventResponse {
        let menubar_handler = self.menubar_node() == Some(event.current_target);
        let in_menubar = self.in_menubar(event.target);
        let item_node = self.item_node_from(event.target).map(|(_, item)| item);

        tracing::trace!(
            phase = ?event.phase,
            target = ?event.target,
            in_menubar,
            menubar_handler,
            item = ?item_node,
            "Pointer event"
        );

        if in_menubar != menubar_handler {
            return EventResponse::PREVENT_DEFAULT;
        }
        // The menu bar listens for presses only.
        if menubar_handler && event.phase == PointerPhase::Up {
            return EventResponse::PREVENT_DEFAULT;
        }
        if item_node.is_some_and(|item| !self.is_choosable(item)) {
            return EventResponse::PREVENT_DEFAULT;
        }

        match event.phase {
            PointerPhase::Down => {
                let top_level = item_node
                    .and_then(|item| self.tree.item(item))
                    .is_some_and(|i| i.is_menubar_top_level());
                let was_active = item_node
                    .and_then(|item| self.tree.item(item))
                    .is_some_and(|i| i.is_submenu_active());

                if (item_node.is_none() || top_level) && self.topmost.is_some() {
                    self.popdown_all();
                    self.notify_done(None);
                }
                if let Some(item) = item_node {
                    self.activate_submenu(item, was_active);
                }
            }
            PointerPhase::Up => {
                if let Some(item) = item_node {
                    self.doit(item);
                }
            }
            PointerPhase::Enter | PointerPhase::Leave => {}
        }
        EventResponse::PREVENT_DEFAULT
    }

    /// Whether `node` lies inside the installed menu bar and not inside a
    /// submenu hanging below it.
    pub(crate) fn in_menubar(&self, node: NodeId) -> bool {
        let Some(bar) = self.menubar_node() else {
            return false;
        };
        let mut current = Some(node);
        while let Some(n) = current {
            if n == bar {
                return true;
            }
            if let Some(NodeBinding::Menu(menu)) = self.bindings.get(&n) {
                if self.tree.menu(*menu).is_some_and(|m| m.is_submenu()) {
                    return false;
                }
            }
            current = self.host.parent(n);
        }
        false
    }

    /// Toggle the submenu of `item` after a press.
    ///
    /// `was_active` is the submenu marker as it stood before the press.
    pub(crate) fn activate_submenu(&mut self, item: ItemId, was_active: bool) {
        if self.tree.item(item).is_none() {
            return;
        }
        // Every pressed item flips its marker, with or without a submenu.
        self.show_submenu_active(item, !was_active);

        let Some(entry) = self.tree.item(item) else {
            return;
        };
        let (Some(submenu), Some(node), Some(menu)) = (entry.submenu_id(), entry.node(), entry.parent()) else {
            return;
        };
        let top_level = entry.is_menubar_top_level();

        if !was_active {
            if let Some(m) = self.tree.menu_mut(menu) {
                m.active_item = Some(item);
            }
            let rect = self.host.bounding_rect(node);
            tracing::debug!(?item, ?submenu, "Opening submenu from press");
            self.popup_submenu(item, Point::new(rect.x, rect.bottom()), top_level);
        } else {
            tracing::debug!(?item, ?submenu, "Closing submenu from press");
            self.popdown(submenu);
            if let Some(m) = self.tree.menu_mut(menu) {
                m.current_submenu = None;
                m.active_item = None;
            }
        }
    }

    /// Choose `item`: close the open tree, apply the type-specific effect,
    /// run the click handler and report the selection.
    ///
    /// Submenu triggers, separators and disabled items are never chosen.
    pub fn doit(&mut self, item: ItemId) {
        let Some(entry) = self.tree.item(item) else {
            tracing::error!(?item, "Cannot activate unknown item");
            return;
        };
        if entry.has_submenu() || !self.is_choosable(item) {
            return;
        }
        let kind = entry.kind();

        self.popdown_all();
        match kind {
            ItemKind::Checkbox => self.tree.toggle_checkbox(item),
            ItemKind::Radio => self.tree.check_radio(item),
            _ => {}
        }

        let handler = self.tree.item(item).and_then(|i| i.click_handler());
        if let (Some(handler), Some(entry)) = (handler, self.tree.item(item)) {
            handler(entry);
        }
        tracing::debug!(?item, %kind, "Item chosen");
        self.notify_done(Some(item));
    }

    /// Highlight `item` in its menu, closing any sibling submenu. With
    /// `popup_submenu` the item's own submenu is opened instead.
    pub fn select(&mut self, item: ItemId, popup_submenu: bool, menubar_submenu: bool) {
        let Some(menu) = self.tree.item(item).and_then(|i| i.parent()) else {
            return;
        };
        let (previous, current_submenu) = match self.tree.menu(menu) {
            Some(m) => (m.active_item, m.current_submenu),
            None => return,
        };

        if let Some(previous) = previous {
            self.set_item_active(previous, false);
            self.show_submenu_active(previous, false);
            if let Some(m) = self.tree.menu_mut(menu) {
                m.active_item = None;
            }
        }
        if let Some(submenu) = current_submenu {
            self.popdown(submenu);
            if let Some(m) = self.tree.menu_mut(menu) {
                m.current_submenu = None;
            }
        }

        let has_submenu = self.tree.item(item).is_some_and(|i| i.has_submenu());
        if has_submenu && popup_submenu {
            self.select_submenu(item, menubar_submenu);
        } else {
            self.set_item_active(item, true);
        }
        if let Some(m) = self.tree.menu_mut(menu) {
            m.active_item = Some(item);
        }
        tracing::trace!(?item, ?menu, "Selected item");
    }

    /// Open the submenu of `item`: below it for menu bar entries, to the
    /// side of its menu otherwise.
    pub(crate) fn select_submenu(&mut self, item: ItemId, menubar_submenu: bool) {
        let Some(entry) = self.tree.item(item) else {
            return;
        };
        let (Some(submenu), Some(node), Some(menu)) = (entry.submenu_id(), entry.node(), entry.parent()) else {
            return;
        };

        if let Some(m) = self.tree.menu_mut(menu) {
            m.current_submenu = Some(submenu);
        }
        if self.tree.menu(submenu).is_some_and(|s| s.is_open()) {
            return;
        }

        let at = if menubar_submenu {
            let rect = self.host.bounding_rect(node);
            Point::new(rect.x, rect.bottom())
        } else {
            let parent = self
                .tree
                .menu(menu)
                .and_then(|m| m.node())
                .map(|n| self.host.offset_rect(n))
                .unwrap_or_default();
            let item_rect = self.host.offset_rect(node);
            Point::new(
                parent.right() - self.config.submenu_overlap,
                parent.y + item_rect.y - self.config.submenu_vertical_offset,
            )
        };
        self.popup_submenu(item, at, menubar_submenu);
        self.show_submenu_active(item, true);
    }

    fn popup_submenu(&mut self, item: ItemId, at: Point, menubar_submenu: bool) {
        let Some(entry) = self.tree.item(item) else {
            return;
        };
        let (Some(submenu), Some(menu)) = (entry.submenu_id(), entry.parent()) else {
            return;
        };
        if let Err(e) = self.popup_with(submenu, at, Some(item), menubar_submenu) {
            tracing::error!(error = %e, ?item, "Failed to open submenu");
            return;
        }
        if let Some(m) = self.tree.menu_mut(menu) {
            m.current_submenu = Some(submenu);
        }
    }

    // ========== Hover ==========

    fn handle_enter(&mut self, target: NodeId) {
        let Some((_, item)) = self.item_node_from(target) else {
            return;
        };
        let Some(entry) = self.tree.item(item) else {
            return;
        };
        if entry.is_separator() {
            return;
        }
        if entry.is_menubar_top_level() {
            self.hover_menubar_top(item);
        } else {
            self.select(item, true, false);
        }
    }

    /// Switch the open dropdown to `item` when another top-level entry of
    /// the same bar has its dropdown open.
    fn hover_menubar_top(&mut self, item: ItemId) {
        let Some(bar) = self.tree.item(item).and_then(|i| i.parent()) else {
            return;
        };
        if let Some(previous) = self.tree.menu(bar).and_then(|m| m.active_item) {
            self.set_item_active(previous, false);
        }
        if !self.has_active_submenu(bar) {
            return;
        }
        if self.tree.item(item).is_some_and(|i| i.is_submenu_active()) {
            return;
        }
        tracing::trace!(?item, "Switching menu bar dropdown on hover");
        self.select(item, true, true);
    }

    fn handle_leave(&mut self, target: NodeId, related: Option<NodeId>) {
        let Some((item_node, item)) = self.item_node_from(target) else {
            return;
        };
        if item_node != target {
            return;
        }
        let Some(entry) = self.tree.item(item) else {
            return;
        };
        if entry.is_menubar_top_level() {
            return;
        }
        let (Some(submenu), Some(menu)) = (entry.submenu_id(), entry.parent()) else {
            return;
        };
        if !self.tree.menu(submenu).is_some_and(|s| s.is_open() && s.trigger() == Some(item)) {
            return;
        }
        let Some(to) = related else {
            return;
        };
        if to == item_node || self.host.is_descendant(item_node, to) || self.contains_node(submenu, to) {
            return;
        }

        tracing::trace!(?item, ?submenu, "Pointer left submenu trigger");
        self.popdown(submenu);
        if let Some(m) = self.tree.menu_mut(menu) {
            if m.current_submenu == Some(submenu) {
                m.current_submenu = None;
            }
        }
    }

    // ========== Helpers ==========

    fn is_choosable(&self, item: ItemId) -> bool {
        self.tree.item(item).is_some_and(|i| i.is_selectable())
    }
}
