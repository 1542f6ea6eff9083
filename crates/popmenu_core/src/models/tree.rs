//! Arena holding every menu and item.
//!
//! Menus reference their items by [`ItemId`]; items reference their submenu
//! and their owning menu by [`MenuId`]. All structural edits go through the
//! tree so the parent back-reference stays consistent with the item lists.
//! None of these operations touch visual nodes: an edit to a displayed menu
//! shows up the next time it is popped up.

use std::sync::Arc;

use slotmap::SlotMap;

use super::{ClickHandler, ItemId, ItemKind, Menu, MenuHook, MenuId, MenuItem, MenuKind};
use crate::error::MenuError;

/// Owner of all menus and items.
#[derive(Debug, Default)]
pub struct MenuTree {
    menus: SlotMap<MenuId, Menu>,
    items: SlotMap<ItemId, MenuItem>,
}

impl MenuTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Creation ==========

    /// Create an empty menu.
    pub fn create_menu(&mut self, kind: MenuKind) -> MenuId {
        self.menus.insert_with_key(|id| {
            let mut menu = Menu::new(kind);
            menu.id = id;
            menu
        })
    }

    /// Store a detached item and return its handle.
    ///
    /// Ownership and display fields of `item` are reset.
    pub fn add_item(&mut self, mut item: MenuItem) -> ItemId {
        item.parent = None;
        item.node = None;
        item.menubar_top_level = false;
        item.active = false;
        item.submenu_active = false;
        self.items.insert_with_key(|id| {
            item.id = id;
            item
        })
    }

    // ========== Lookup ==========

    /// Get a menu.
    pub fn menu(&self, id: MenuId) -> Option<&Menu> {
        self.menus.get(id)
    }

    /// Get a menu mutably.
    pub fn menu_mut(&mut self, id: MenuId) -> Option<&mut Menu> {
        self.menus.get_mut(id)
    }

    /// Get an item.
    pub fn item(&self, id: ItemId) -> Option<&MenuItem> {
        self.items.get(id)
    }

    /// Get an item mutably.
    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut MenuItem> {
        self.items.get_mut(id)
    }

    /// Get a menu or fail with [`MenuError::UnknownMenu`].
    pub fn try_menu(&self, id: MenuId) -> Result<&Menu, MenuError> {
        self.menus.get(id).ok_or(MenuError::unknown_menu(id))
    }

    /// Get an item or fail with [`MenuError::UnknownItem`].
    pub fn try_item(&self, id: ItemId) -> Result<&MenuItem, MenuError> {
        self.items.get(id).ok_or(MenuError::unknown_item(id))
    }

    /// Items of a menu, empty when the menu is unknown.
    pub fn items_of(&self, menu: MenuId) -> &[ItemId] {
        self.menus.get(menu).map(|m| m.items.as_slice()).unwrap_or(&[])
    }

    /// Number of menus.
    pub fn menu_count(&self) -> usize {
        self.menus.len()
    }

    /// Number of items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    // ========== Structure ==========

    /// Append `item` to `menu` and return the new length.
    pub fn append(&mut self, menu: MenuId, item: ItemId) -> Result<usize, MenuError> {
        self.check_detached(menu, item).map_err(rejected)?;
        let len = {
            let m = self.menus.get_mut(menu).ok_or_else(|| rejected(MenuError::unknown_menu(menu)))?;
            m.items.push(item);
            m.items.len()
        };
        self.set_parent(item, Some(menu));
        tracing::trace!(?menu, ?item, len, "Appended item");
        Ok(len)
    }

    /// Insert `item` at `index`, clamped to the current length.
    pub fn insert(&mut self, menu: MenuId, item: ItemId, index: usize) -> Result<(), MenuError> {
        self.check_detached(menu, item).map_err(rejected)?;
        let m = self.menus.get_mut(menu).ok_or_else(|| rejected(MenuError::unknown_menu(menu)))?;
        let index = index.min(m.items.len());
        m.items.insert(index, item);
        self.set_parent(item, Some(menu));
        tracing::trace!(?menu, ?item, index, "Inserted item");
        Ok(())
    }

    /// Remove `item` from `menu`. The item survives detached.
    pub fn remove(&mut self, menu: MenuId, item: ItemId) -> Result<(), MenuError> {
        self.try_item(item).map_err(rejected)?;
        let m = self.menus.get_mut(menu).ok_or_else(|| rejected(MenuError::unknown_menu(menu)))?;
        let Some(index) = m.items.iter().position(|&i| i == item) else {
            return Err(rejected(MenuError::item_not_in_menu(menu, item)));
        };
        m.items.remove(index);
        self.set_parent(item, None);
        tracing::trace!(?menu, ?item, index, "Removed item");
        Ok(())
    }

    /// Remove the item at `index`; out-of-range indices are a no-op.
    pub fn remove_at(&mut self, menu: MenuId, index: usize) -> Result<Option<ItemId>, MenuError> {
        let m = self.menus.get_mut(menu).ok_or_else(|| rejected(MenuError::unknown_menu(menu)))?;
        if index >= m.items.len() {
            tracing::debug!(?menu, index, len = m.items.len(), "remove_at index out of range");
            return Ok(None);
        }
        let item = m.items.remove(index);
        self.set_parent(item, None);
        Ok(Some(item))
    }

    /// Attach or detach the submenu opened by `item`.
    pub fn set_submenu(&mut self, item: ItemId, submenu: Option<MenuId>) -> Result<(), MenuError> {
        if let Some(submenu) = submenu {
            if !self.menus.contains_key(submenu) {
                return Err(rejected(MenuError::unknown_menu(submenu)));
            }
        }
        let entry = self.items.get_mut(item).ok_or_else(|| rejected(MenuError::unknown_item(item)))?;
        if let Some(previous) = entry.submenu.filter(|&p| Some(p) != submenu) {
            tracing::warn!(?item, ?previous, ?submenu, "Replacing submenu of item");
        }
        entry.submenu = submenu;
        Ok(())
    }

    /// Replace or clear the click handler of `item`.
    pub fn set_click(&mut self, item: ItemId, handler: Option<ClickHandler>) -> Result<(), MenuError> {
        let entry = self.items.get_mut(item).ok_or_else(|| rejected(MenuError::unknown_item(item)))?;
        entry.set_click(handler);
        Ok(())
    }

    /// Install a before-show hook on `menu`.
    pub fn set_menu_before_show(
        &mut self,
        menu: MenuId,
        hook: impl Fn(&mut MenuTree, MenuId) + Send + Sync + 'static,
    ) -> Result<(), MenuError> {
        let hook: MenuHook = Arc::new(hook);
        let entry = self.menus.get_mut(menu).ok_or_else(|| rejected(MenuError::unknown_menu(menu)))?;
        entry.set_before_show(Some(hook));
        Ok(())
    }

    // ========== Choice effects ==========

    /// Flip a checkbox item.
    pub(crate) fn toggle_checkbox(&mut self, item: ItemId) {
        if let Some(entry) = self.items.get_mut(item) {
            entry.set_checked(!entry.is_checked());
        }
    }

    /// Check a radio item and uncheck the contiguous run of visible radio
    /// siblings around it. Hidden items are skipped; any other item type
    /// ends the run.
    pub(crate) fn check_radio(&mut self, item: ItemId) {
        let Some(parent) = self.items.get(item).and_then(|i| i.parent) else {
            if let Some(entry) = self.items.get_mut(item) {
                entry.set_checked(true);
            }
            return;
        };
        let siblings = self.items_of(parent).to_vec();
        let Some(index) = siblings.iter().position(|&i| i == item) else {
            return;
        };

        let mut run = Vec::new();
        for &id in siblings[..index].iter().rev() {
            if !self.extend_radio_run(id, &mut run) {
                break;
            }
        }
        for &id in &siblings[index + 1..] {
            if !self.extend_radio_run(id, &mut run) {
                break;
            }
        }

        for id in run {
            if let Some(entry) = self.items.get_mut(id) {
                entry.set_checked(false);
            }
        }
        if let Some(entry) = self.items.get_mut(item) {
            entry.set_checked(true);
        }
    }

    fn extend_radio_run(&self, id: ItemId, run: &mut Vec<ItemId>) -> bool {
        match self.items.get(id) {
            Some(entry) if !entry.is_visible() => true,
            Some(entry) if entry.kind() == ItemKind::Radio => {
                run.push(id);
                true
            }
            _ => false,
        }
    }

    // ========== Helpers ==========

    fn check_detached(&self, menu: MenuId, item: ItemId) -> Result<(), MenuError> {
        if !self.menus.contains_key(menu) {
            return Err(MenuError::unknown_menu(menu));
        }
        let entry = self.try_item(item)?;
        if let Some(current) = entry.parent {
            return Err(MenuError::item_already_attached(item, current));
        }
        Ok(())
    }

    fn set_parent(&mut self, item: ItemId, parent: Option<MenuId>) {
        if let Some(entry) = self.items.get_mut(item) {
            entry.parent = parent;
        }
    }
}

fn rejected(err: MenuError) -> MenuError {
    tracing::error!(error = %err, "Rejected menu mutation");
    err
}
