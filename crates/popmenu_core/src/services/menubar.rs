//! Application menu bar and model-tree queries.

use crate::error::MenuError;
use crate::host::{Host, NodeId};
use crate::models::{ItemId, MenuId, MenuKind};
use crate::state::{MenuSession, MenubarInstall};

impl<H: Host> MenuSession<H> {
    /// Install `menubar` as the application menu bar, replacing any previous
    /// one. The bar is inserted into `parent` (default: the container)
    /// before `before` (default: the first child). `None` uninstalls.
    pub fn set_application_menu(
        &mut self,
        menubar: Option<MenuId>,
        parent: Option<NodeId>,
        before: Option<NodeId>,
    ) -> Result<(), MenuError> {
        if let Some(menu) = menubar {
            if let Err(e) = self.tree.try_menu(menu) {
                tracing::error!(error = %e, "Cannot install application menu");
                return Err(e);
            }
        }

        if let Some(old) = self.menubar.take() {
            self.popdown(old.menu);
            self.host.set_pointer_listener(old.node, false);
            self.forget_nodes(old.node);
            self.host.remove_node(old.node);
            for item in self.tree.items_of(old.menu).to_vec() {
                if let Some(entry) = self.tree.item_mut(item) {
                    entry.node = None;
                }
            }
            if let Some(m) = self.tree.menu_mut(old.menu) {
                m.clear_display_state();
            }
            tracing::debug!(menu = ?old.menu, "Removed application menu");
        }

        let Some(menu) = menubar else {
            return Ok(());
        };
        if self.tree.menu(menu).is_some_and(|m| m.kind() != MenuKind::Menubar) {
            tracing::debug!(?menu, "Installing a non-menubar menu as application menu");
        }

        let node = self.build_menu(menu, false, false);
        let parent = parent.unwrap_or_else(|| self.container());
        let before = before.or_else(|| self.host.children(parent).first().copied());
        self.host.insert_before(parent, node, before);
        self.host.set_pointer_listener(node, true);
        if let Some(m) = self.tree.menu_mut(menu) {
            m.node = Some(node);
        }
        self.menubar = Some(MenubarInstall { menu, node });
        self.sync_sheet_offset();

        tracing::debug!(?menu, ?node, "Installed application menu");
        Ok(())
    }

    /// Activate the first top-level entry of the menu bar, opening its
    /// dropdown. Returns `false` when no bar is installed.
    pub fn focus_menubar(&mut self) -> bool {
        let Some(bar) = self.menubar else {
            return false;
        };
        let Some(&first) = self.tree.items_of(bar.menu).first() else {
            return false;
        };
        let Some(entry) = self.tree.item(first) else {
            return false;
        };
        if entry.node().is_none() {
            return false;
        }
        let was_active = entry.is_submenu_active();
        self.activate_submenu(first, was_active);
        true
    }

    /// Whether `node` belongs to the displayed tree of `menu`: its node, an
    /// item node, anything below them, or the same within open submenus.
    pub fn contains_node(&self, menu: MenuId, node: NodeId) -> bool {
        let Some(m) = self.tree.menu(menu) else {
            return false;
        };
        if let Some(menu_node) = m.node() {
            if menu_node == node || self.host.is_descendant(menu_node, node) {
                return true;
            }
        }
        for &item in m.items() {
            let Some(entry) = self.tree.item(item) else {
                continue;
            };
            let Some(item_node) = entry.node() else {
                continue;
            };
            if item_node == node || self.host.is_descendant(item_node, node) {
                return true;
            }
            let open_child = entry
                .submenu_id()
                .filter(|&sub| self.tree.menu(sub).is_some_and(|s| s.is_open() && s.trigger() == Some(item)));
            if let Some(sub) = open_child {
                if self.contains_node(sub, node) {
                    return true;
                }
            }
        }
        false
    }

    /// Whether any displayed item of `menu` has its submenu marked open.
    pub fn has_active_submenu(&self, menu: MenuId) -> bool {
        self.tree
            .items_of(menu)
            .iter()
            .any(|&i| self.tree.item(i).is_some_and(|e| e.node().is_some() && e.is_submenu_active()))
    }

    /// Clear the submenu-open marker on every item of `menu` and its open
    /// submenus, except `except`.
    pub fn clear_active_submenu_styling(&mut self, menu: MenuId, except: Option<ItemId>) {
        if self.tree.menu(menu).map_or(true, |m| m.node().is_none()) {
            return;
        }
        let mut stack = vec![menu];
        while let Some(current) = stack.pop() {
            for item in self.tree.items_of(current).to_vec() {
                let Some(entry) = self.tree.item(item) else {
                    continue;
                };
                if let Some(sub) = entry.submenu_id() {
                    if self.tree.menu(sub).is_some_and(|s| s.is_open() && s.trigger() == Some(item)) {
                        stack.push(sub);
                    }
                }
                if Some(item) != except && entry.is_submenu_active() {
                    self.show_submenu_active(item, false);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::events::{MenuKey, PointerEvent, PointerPhase};
    use crate::models::{MenuItem, MenuTree};
    use crate::services::test_support::FakeHost;

    struct Bar {
        session: MenuSession<FakeHost>,
        bar: MenuId,
        file: ItemId,
        edit: ItemId,
        file_menu: MenuId,
        edit_menu: MenuId,
    }

    fn bar() -> Bar {
        bar_with(SessionConfig::default())
    }

    fn bar_with(config: SessionConfig) -> Bar {
        let mut tree = MenuTree::new();
        let file_menu = tree.create_menu(MenuKind::Contextmenu);
        for label in ["New", "Open"] {
            let id = tree.add_item(MenuItem::normal(label));
            tree.append(file_menu, id).unwrap();
        }
        let edit_menu = tree.create_menu(MenuKind::Contextmenu);
        for label in ["Undo", "Redo"] {
            let id = tree.add_item(MenuItem::normal(label));
            tree.append(edit_menu, id).unwrap();
        }
        let bar = tree.create_menu(MenuKind::Menubar);
        let file = tree.add_item(MenuItem::submenu("File", file_menu));
        let edit = tree.add_item(MenuItem::submenu("Edit", edit_menu));
        tree.append(bar, file).unwrap();
        tree.append(bar, edit).unwrap();

        let mut session = MenuSession::with_tree(FakeHost::new(1000.0, 600.0), tree, config);
        session.set_application_menu(Some(bar), None, None).unwrap();
        Bar { session, bar, file, edit, file_menu, edit_menu }
    }

    impl Bar {
        fn press(&mut self, item: ItemId) {
            let node = self.session.tree().item(item).unwrap().node().unwrap();
            let bar_node = self.session.menubar_node().unwrap();
            self.session.handle_pointer(PointerEvent::new(PointerPhase::Down, node, bar_node));
            // The container listener sees the same press and must ignore it.
            if self.session.is_open() {
                let container = self.session.container();
                self.session.handle_pointer(PointerEvent::new(PointerPhase::Down, node, container));
            }
        }
    }

    #[test]
    fn test_install_builds_bar_with_listener() {
        let b = bar();
        let node = b.session.menubar_node().unwrap();
        assert_eq!(b.session.application_menu(), Some(b.bar));
        assert!(b.session.host().pointer_listening(node));
        assert_eq!(b.session.host().parent(node), Some(b.session.container()));
        assert!(b.session.tree().item(b.file).unwrap().is_menubar_top_level());
        assert!(!b.session.is_open());
    }

    #[test]
    fn test_press_on_entry_toggles_dropdown() {
        let mut b = bar();

        b.press(b.file);
        assert!(b.session.tree().menu(b.file_menu).unwrap().is_open());
        assert_eq!(b.session.topmost(), Some(b.file_menu));
        assert!(b.session.tree().menu(b.file_menu).unwrap().is_menubar_submenu());

        b.press(b.file);
        assert!(!b.session.tree().menu(b.file_menu).unwrap().is_open());
        assert!(!b.session.is_open());
        assert!(!b.session.has_active_submenu(b.bar));
    }

    #[test]
    fn test_dropdown_hangs_below_entry() {
        let mut b = bar();
        b.press(b.edit);

        let edit_node = b.session.tree().item(b.edit).unwrap().node().unwrap();
        let menu_node = b.session.tree().menu(b.edit_menu).unwrap().node().unwrap();
        let entry = b.session.host().bounding_rect(edit_node);
        let dropdown = b.session.host().offset_rect(menu_node);
        assert_eq!((dropdown.x, dropdown.y), (entry.x, entry.bottom()));
        assert!(b.session.contains_node(b.bar, menu_node));
    }

    #[test]
    fn test_dropdown_attaches_to_entry_without_overlay() {
        let mut b = bar_with(SessionConfig { top_sheet_z_index: 0, ..SessionConfig::default() });
        b.press(b.file);

        assert!(b.session.top_sheet().is_none());
        let file_node = b.session.tree().item(b.file).unwrap().node().unwrap();
        let menu_node = b.session.tree().menu(b.file_menu).unwrap().node().unwrap();
        assert_eq!(b.session.host().parent(menu_node), Some(file_node));

        b.press(b.file);
        assert!(!b.session.host().contains(menu_node));
        assert!(!b.session.is_open());
    }

    #[test]
    fn test_hover_switches_open_dropdown() {
        let mut b = bar();
        b.press(b.file);

        let edit_node = b.session.tree().item(b.edit).unwrap().node().unwrap();
        b.session.handle_pointer(PointerEvent::enter(edit_node));

        assert!(!b.session.tree().menu(b.file_menu).unwrap().is_open());
        assert!(b.session.tree().menu(b.edit_menu).unwrap().is_open());
        assert_eq!(b.session.topmost(), Some(b.edit_menu));
        assert!(b.session.tree().item(b.edit).unwrap().is_submenu_active());
        assert!(!b.session.tree().item(b.file).unwrap().is_submenu_active());
    }

    #[test]
    fn test_hover_without_open_dropdown_does_nothing() {
        let mut b = bar();
        let edit_node = b.session.tree().item(b.edit).unwrap().node().unwrap();
        b.session.handle_pointer(PointerEvent::enter(edit_node));
        assert!(!b.session.is_open());
    }

    #[test]
    fn test_focus_and_arrow_across_entries() {
        let mut b = bar();
        assert!(b.session.focus_menubar());
        assert!(b.session.tree().menu(b.file_menu).unwrap().is_open());

        b.session.handle_key(MenuKey::Right);
        assert!(b.session.tree().menu(b.edit_menu).unwrap().is_open());
        assert!(!b.session.tree().menu(b.file_menu).unwrap().is_open());

        b.session.handle_key(MenuKey::Left);
        assert!(b.session.tree().menu(b.file_menu).unwrap().is_open());

        b.session.handle_key(MenuKey::Escape);
        assert!(!b.session.is_open());
        assert!(!b.session.has_active_submenu(b.bar));
    }

    #[test]
    fn test_uninstall_removes_bar() {
        let mut b = bar();
        let node = b.session.menubar_node().unwrap();
        b.session.set_application_menu(None, None, None).unwrap();

        assert!(b.session.menubar_node().is_none());
        assert!(!b.session.host().contains(node));
        assert!(b.session.tree().item(b.file).unwrap().node().is_none());
        assert!(!b.session.focus_menubar());
    }
}
