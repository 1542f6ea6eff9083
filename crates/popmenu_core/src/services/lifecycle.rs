//! Popup and popdown of menus.
//!
//! A menu is Closed while its `node` is absent and Open while its node is
//! attached to the host tree. Closing a menu first closes every submenu it
//! opened, leaves before root.

use crate::error::MenuError;
use crate::geometry::{place_menu, PlacementContext, PlacementRequest, Point};
use crate::host::{Host, ItemNodeSpec, MenuNodeSpec, NodeId};
use crate::models::{ItemId, MenuId, MenuKind};
use crate::state::{MenuSession, NodeBinding, RevealRequest};

impl<H: Host> MenuSession<H> {
    /// Pop up `menu` with its top-left corner at `(x, y)`.
    ///
    /// Any other open menu tree is closed first.
    pub fn popup(&mut self, menu: MenuId, x: f32, y: f32) -> Result<(), MenuError> {
        self.popup_with(menu, Point::new(x, y), None, false)
    }

    /// Pop up `menu`, optionally as the submenu of `trigger`.
    ///
    /// Calling this on a menu that is already open rebuilds its node in
    /// place and keeps its previous display context.
    pub fn popup_with(
        &mut self,
        menu: MenuId,
        at: Point,
        trigger: Option<ItemId>,
        menubar_submenu: bool,
    ) -> Result<(), MenuError> {
        if let Err(e) = self.tree.try_menu(menu) {
            tracing::error!(error = %e, "Cannot pop up menu");
            return Err(e);
        }
        if let Some(item) = trigger {
            if let Err(e) = self.tree.try_item(item) {
                tracing::error!(error = %e, "Cannot pop up submenu");
                return Err(e);
            }
        }

        if trigger.is_none() {
            if let Some(current) = self.topmost.filter(|&t| t != menu) {
                tracing::debug!(?current, ?menu, "Closing open menu tree before popup");
                self.popdown_all();
            }
        }

        self.keydown_listen(true);

        let Some(previous) = self.tree.menu(menu) else {
            return Err(MenuError::unknown_menu(menu));
        };
        let old_node = previous.node;
        let was_open = old_node.is_some();
        let trigger = trigger.or(previous.trigger.filter(|_| was_open));
        let is_submenu = trigger.is_some() || (was_open && previous.is_submenu);
        let is_menubar_submenu = menubar_submenu || (was_open && previous.is_menubar_submenu);
        let parent_menu_node = if was_open { previous.parent_menu_node } else { self.current_menu_node };

        let container = self.container();
        if self.top_sheet.is_none() && self.config.top_sheet_enabled() {
            let sheet = self.host.create_overlay(self.config.top_sheet_z_index);
            self.host.append_child(container, sheet);
            self.top_sheet = Some(sheet);
            self.sync_sheet_offset();
            tracing::trace!(?sheet, "Created top sheet");
        }

        if self.topmost.is_none() {
            self.topmost = Some(menu);
            self.listener_node = Some(container);
            self.host.set_pointer_listener(container, true);
            tracing::debug!(?menu, "Menu became topmost");
        }

        if was_open {
            self.popdown_submenus(menu);
        }

        let node = self.build_menu(menu, is_submenu, is_menubar_submenu);
        if let Some(m) = self.tree.menu_mut(menu) {
            m.node = Some(node);
            m.is_submenu = is_submenu;
            m.is_menubar_submenu = is_menubar_submenu;
            m.trigger = trigger;
            m.parent_menu_node = parent_menu_node;
            m.active_item = None;
            m.current_submenu = None;
        }
        self.current_menu_node = Some(node);

        match old_node {
            Some(old) if self.host.parent(old).is_some() => {
                self.forget_nodes(old);
                self.host.replace_node(old, node);
                self.host.remove_node(old);
            }
            stale => {
                if let Some(old) = stale {
                    self.forget_nodes(old);
                    self.host.remove_node(old);
                }
                let trigger_node = trigger.and_then(|t| self.tree.item(t)).and_then(|i| i.node);
                let anchor = match (is_menubar_submenu, self.top_sheet, trigger_node) {
                    (true, _, Some(item_node)) => item_node,
                    (_, Some(sheet), _) => sheet,
                    _ => container,
                };
                self.host.append_child(anchor, node);
            }
        }

        let size = self.host.client_size(node);
        let bounds = self.host.offset_rect(container).size();
        let context = if is_menubar_submenu {
            PlacementContext::MenubarSubmenu
        } else if is_submenu {
            match self.trigger_parent_node(trigger) {
                Some(parent) => PlacementContext::Submenu { trigger_parent: self.host.offset_rect(parent) },
                None => PlacementContext::TopLevel,
            }
        } else {
            PlacementContext::TopLevel
        };
        let placement = place_menu(&PlacementRequest {
            desired: at,
            menu: size,
            container: bounds,
            context,
            submenu_overlap: self.config.submenu_overlap,
        });
        self.host.set_placement(node, placement);
        self.sync_sheet_offset();

        let request = RevealRequest { menu, node, size, desired: at, placement };
        let revealed_by_hook = self.hooks.reveal.as_mut().is_some_and(|hook| hook(&request));
        if !revealed_by_hook {
            self.host.set_shown(node, true);
        }

        tracing::debug!(
            ?menu,
            ?node,
            x = placement.x,
            y = placement.y,
            anchor = ?placement.anchor,
            submenu = is_submenu,
            menubar_submenu = is_menubar_submenu,
            rebuilt = was_open,
            "Popped up menu"
        );
        Ok(())
    }

    /// Close `menu` and every submenu it opened.
    ///
    /// Menu bars stay in the host tree; only their submenu markers are
    /// cleared. Closing a menu that is not open is a no-op apart from
    /// releasing topmost status.
    pub fn popdown(&mut self, menu: MenuId) {
        let Some(m) = self.tree.menu(menu) else {
            tracing::debug!(?menu, "popdown on unknown menu");
            return;
        };
        let kind = m.kind();

        self.popdown_submenus(menu);

        if kind != MenuKind::Menubar {
            self.remove_menu_node(menu);
        }

        if self.topmost == Some(menu) {
            self.topmost = None;
            if let Some(listener) = self.listener_node.take() {
                self.host.set_pointer_listener(listener, false);
            }
            self.current_menu_node = None;
            self.keydown_listen(false);
            tracing::debug!(?menu, "Menu tree closed");
        }

        if kind == MenuKind::Menubar {
            self.clear_active_submenu_styling(menu, None);
        }
    }

    /// Close whatever menu tree is open.
    pub fn popdown_all(&mut self) {
        if let Some(topmost) = self.topmost {
            self.popdown(topmost);
        }
    }

    /// Build a fresh node for `menu` and its visible items.
    pub(crate) fn build_menu(&mut self, menu: MenuId, submenu: bool, menubar_submenu: bool) -> NodeId {
        if let Some(hook) = self.tree.menu(menu).and_then(|m| m.before_show.clone()) {
            hook(&mut self.tree, menu);
        }

        let kind = self.tree.menu(menu).map(|m| m.kind()).unwrap_or_default();
        let node = self.host.create_menu_node(&MenuNodeSpec { menu, kind, submenu, menubar_submenu });
        self.bindings.insert(node, NodeBinding::Menu(menu));

        let top_level = kind == MenuKind::Menubar;
        for item in self.tree.items_of(menu).to_vec() {
            if let Some(hook) = self.tree.item(item).and_then(|i| i.before_show_hook()) {
                if let Some(entry) = self.tree.item_mut(item) {
                    hook(entry);
                }
            }
            let visible = self.tree.item(item).is_some_and(|i| i.is_visible());
            if visible {
                self.build_item(node, item, top_level);
            } else if let Some(entry) = self.tree.item_mut(item) {
                entry.node = None;
            }
        }

        tracing::trace!(?menu, ?node, %kind, "Built menu node");
        node
    }

    fn build_item(&mut self, menu_node: NodeId, item: ItemId, top_level: bool) {
        let Some(entry) = self.tree.item_mut(item) else {
            return;
        };
        entry.menubar_top_level = top_level;
        entry.active = false;
        entry.submenu_active = false;

        let spec = ItemNodeSpec {
            item,
            kind: entry.kind(),
            label: entry.label_text().to_string(),
            icon: entry.icon_ref().map(String::from),
            icon_is_template: entry.is_icon_template(),
            tooltip: entry.tooltip_text().to_string(),
            accelerator: entry.accelerator_text().map(String::from),
            checked: entry.is_checked() && !top_level,
            enabled: entry.is_enabled(),
            has_submenu: entry.has_submenu(),
            menubar_top_level: top_level,
        };
        let node = self.host.create_item_node(&spec);
        self.host.append_child(menu_node, node);
        entry.node = Some(node);
        self.bindings.insert(node, NodeBinding::Item(item));
    }

    /// Close the submenus `menu` opened.
    pub(crate) fn popdown_submenus(&mut self, menu: MenuId) {
        for item in self.tree.items_of(menu).to_vec() {
            let open_child = self
                .tree
                .item(item)
                .and_then(|i| i.submenu_id())
                .filter(|&sub| self.tree.menu(sub).is_some_and(|s| s.is_open() && s.trigger == Some(item)));
            if let Some(sub) = open_child {
                self.popdown(sub);
            }
        }
    }

    /// Detach a popup menu's node and reset its display state.
    fn remove_menu_node(&mut self, menu: MenuId) {
        let Some(m) = self.tree.menu(menu) else {
            return;
        };
        let Some(node) = m.node else {
            return;
        };
        let trigger = m.trigger;
        let parent_menu_node = m.parent_menu_node;

        self.current_menu_node = parent_menu_node;

        if let Some(trigger) = trigger {
            self.show_submenu_active(trigger, false);
            let parent = self.tree.item(trigger).and_then(|i| i.parent);
            let mut keep_highlight = false;
            if let Some(pm) = parent.and_then(|p| self.tree.menu_mut(p)) {
                if pm.current_submenu == Some(menu) {
                    pm.current_submenu = None;
                }
                keep_highlight = pm.active_item == Some(trigger) && pm.kind() != MenuKind::Menubar;
            }
            if keep_highlight {
                self.set_item_active(trigger, true);
            }
        }

        if let Some(hook) = self.hooks.removal.as_mut() {
            hook(menu, node);
        }

        self.forget_nodes(node);
        self.host.remove_node(node);

        for item in self.tree.items_of(menu).to_vec() {
            if let Some(entry) = self.tree.item_mut(item) {
                entry.node = None;
                entry.active = false;
                entry.submenu_active = false;
            }
        }
        if let Some(m) = self.tree.menu_mut(menu) {
            m.clear_display_state();
        }

        if let Some(sheet) = self.top_sheet {
            if self.host.children(sheet).is_empty() {
                self.host.remove_node(sheet);
                self.top_sheet = None;
                tracing::trace!(?sheet, "Removed top sheet");
            }
        }

        tracing::debug!(?menu, ?node, "Popped down menu");
    }

    /// Node of the menu holding `trigger`.
    fn trigger_parent_node(&self, trigger: Option<ItemId>) -> Option<NodeId> {
        let parent = self.tree.item(trigger?)?.parent()?;
        self.tree.menu(parent)?.node()
    }

    /// Keep the overlay below an installed menu bar.
    pub(crate) fn sync_sheet_offset(&mut self) {
        if let (Some(sheet), Some(bar)) = (self.top_sheet, self.menubar) {
            let height = self.host.offset_rect(bar.node).height;
            self.host.set_overlay_top(sheet, height);
        }
    }

    pub(crate) fn keydown_listen(&mut self, listening: bool) {
        if listening != self.keydown_listening {
            self.host.set_key_listener(listening);
            tracing::trace!(listening, "Key listener toggled");
        }
        self.keydown_listening = listening;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::config::SessionConfig;
    use crate::models::{MenuItem, MenuTree};
    use crate::services::test_support::FakeHost;

    fn session_with(tree: MenuTree) -> MenuSession<FakeHost> {
        MenuSession::with_tree(FakeHost::new(1000.0, 600.0), tree, SessionConfig::default())
    }

    fn nested_tree() -> (MenuTree, MenuId, MenuId, ItemId) {
        let mut tree = MenuTree::new();
        let sub = tree.create_menu(MenuKind::Contextmenu);
        for label in ["D", "E"] {
            let id = tree.add_item(MenuItem::normal(label));
            tree.append(sub, id).unwrap();
        }
        let root = tree.create_menu(MenuKind::Contextmenu);
        let a = tree.add_item(MenuItem::normal("A"));
        let c = tree.add_item(MenuItem::submenu("C", sub));
        tree.append(root, a).unwrap();
        tree.append(root, c).unwrap();
        (tree, root, sub, c)
    }

    #[test]
    fn test_popup_attaches_listeners_and_shows() {
        let (tree, root, _, _) = nested_tree();
        let mut session = session_with(tree);

        session.popup(root, 10.0, 10.0).unwrap();

        let node = session.tree().menu(root).unwrap().node().unwrap();
        assert_eq!(session.topmost(), Some(root));
        assert_eq!(session.current_menu_node(), Some(node));
        assert!(session.is_key_listening());
        assert!(session.host().is_shown(node));
        assert!(session.host().pointer_listening(session.container()));
        assert!(session.top_sheet().is_some());
        assert_eq!(session.host().parent(node), session.top_sheet());
    }

    #[test]
    fn test_popdown_cascades_and_releases_everything() {
        let (tree, root, sub, c) = nested_tree();
        let mut session = session_with(tree);

        session.popup(root, 10.0, 10.0).unwrap();
        session.popup_with(sub, Point::new(200.0, 30.0), Some(c), false).unwrap();
        assert!(session.tree().menu(sub).unwrap().is_open());

        session.popdown(root);

        assert!(!session.tree().menu(root).unwrap().is_open());
        assert!(!session.tree().menu(sub).unwrap().is_open());
        assert!(session.tree().items_of(sub).iter().all(|&i| session.tree().item(i).unwrap().node().is_none()));
        assert_eq!(session.topmost(), None);
        assert_eq!(session.current_menu_node(), None);
        assert!(!session.is_key_listening());
        assert!(session.top_sheet().is_none());
        assert!(!session.host().pointer_listening(session.container()));
        assert_eq!(session.host().attached_count(), 1);
    }

    #[test]
    fn test_second_context_menu_replaces_first() {
        let (mut tree, root, _, _) = nested_tree();
        let other = tree.create_menu(MenuKind::Contextmenu);
        let x = tree.add_item(MenuItem::normal("X"));
        tree.append(other, x).unwrap();
        let mut session = session_with(tree);

        session.popup(root, 10.0, 10.0).unwrap();
        session.popup(other, 50.0, 50.0).unwrap();

        assert_eq!(session.topmost(), Some(other));
        assert!(!session.tree().menu(root).unwrap().is_open());
        assert!(session.tree().menu(other).unwrap().is_open());
    }

    #[test]
    fn test_popup_on_open_menu_rebuilds_in_place() {
        let (tree, root, _, _) = nested_tree();
        let mut session = session_with(tree);

        session.popup(root, 10.0, 10.0).unwrap();
        let first = session.tree().menu(root).unwrap().node().unwrap();
        session.popup(root, 10.0, 10.0).unwrap();
        let second = session.tree().menu(root).unwrap().node().unwrap();

        assert_ne!(first, second);
        assert!(!session.host().contains(first));
        assert_eq!(session.host().parent(second), session.top_sheet());
        assert_eq!(session.menu_for_node(second), Some(root));
        assert_eq!(session.menu_for_node(first), None);
    }

    #[test]
    fn test_reveal_hook_can_veto_default_show() {
        let (tree, root, _, _) = nested_tree();
        let mut session = session_with(tree);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        session.on_reveal(move |request| {
            sink.lock().push(request.menu);
            true
        });

        session.popup(root, 10.0, 10.0).unwrap();

        let node = session.tree().menu(root).unwrap().node().unwrap();
        assert_eq!(*seen.lock(), vec![root]);
        assert!(!session.host().is_shown(node));
    }

    #[test]
    fn test_removal_hook_sees_node_before_removal() {
        let (tree, root, _, _) = nested_tree();
        let mut session = session_with(tree);
        let removed = Arc::new(Mutex::new(Vec::new()));
        let sink = removed.clone();
        session.on_removal(move |menu, node| sink.lock().push((menu, node)));

        session.popup(root, 10.0, 10.0).unwrap();
        let node = session.tree().menu(root).unwrap().node().unwrap();
        session.popdown_all();

        assert_eq!(*removed.lock(), vec![(root, node)]);
    }

    #[test]
    fn test_before_show_hooks_run_on_build() {
        let (mut tree, root, _, _) = nested_tree();
        tree.set_menu_before_show(root, |tree, menu| {
            let extra = tree.add_item(MenuItem::normal("Dynamic"));
            let _ = tree.append(menu, extra);
        })
        .unwrap();
        let hidden = tree.add_item(MenuItem::normal("Secret").on_before_show(|item| item.set_visible(false)));
        tree.append(root, hidden).unwrap();
        let mut session = session_with(tree);

        session.popup(root, 0.0, 0.0).unwrap();

        let node = session.tree().menu(root).unwrap().node().unwrap();
        // A, C and Dynamic are built; Secret hid itself.
        assert_eq!(session.host().children(node).len(), 3);
        assert!(session.tree().item(hidden).unwrap().node().is_none());
    }

    #[test]
    fn test_disabled_overlay() {
        let (tree, root, _, _) = nested_tree();
        let config = SessionConfig { top_sheet_z_index: 0, ..SessionConfig::default() };
        let mut session = MenuSession::with_tree(FakeHost::new(800.0, 600.0), tree, config);

        session.popup(root, 0.0, 0.0).unwrap();

        let node = session.tree().menu(root).unwrap().node().unwrap();
        assert!(session.top_sheet().is_none());
        assert_eq!(session.host().parent(node), Some(session.container()));
    }

    #[test]
    fn test_popup_unknown_menu_is_error() {
        let (tree, _, _, _) = nested_tree();
        let mut session = session_with(tree);
        let ghost = {
            let mut scratch = MenuTree::new();
            for _ in 0..5 {
                scratch.create_menu(MenuKind::Contextmenu);
            }
            scratch.create_menu(MenuKind::Contextmenu)
        };

        assert!(session.popup(ghost, 0.0, 0.0).is_err());
        assert_eq!(session.topmost(), None);
        assert!(!session.is_key_listening());
    }
}
