//! Menu model.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{ItemId, MenuTree};
use crate::error::MenuError;
use crate::host::NodeId;

slotmap::new_key_type! {
    /// Handle of a [`Menu`] inside a [`MenuTree`].
    pub struct MenuId;
}

/// Hook invoked on a menu right before its node is built.
///
/// It receives the whole tree so it can rewrite the menu's items.
pub type MenuHook = Arc<dyn Fn(&mut MenuTree, MenuId) + Send + Sync + 'static>;

/// Menu type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuKind {
    /// Vertical popup menu.
    #[default]
    Contextmenu,
    /// Horizontal bar of top-level entries.
    Menubar,
}

impl MenuKind {
    /// Name used in settings and on visual nodes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contextmenu => "contextmenu",
            Self::Menubar => "menubar",
        }
    }
}

impl FromStr for MenuKind {
    type Err = MenuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contextmenu" => Ok(Self::Contextmenu),
            "menubar" => Ok(Self::Menubar),
            other => Err(MenuError::invalid_menu_type(other)),
        }
    }
}

impl fmt::Display for MenuKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered sequence of items, displayable as a popup or a menu bar.
#[derive(Clone, Default)]
pub struct Menu {
    pub(crate) id: MenuId,
    kind: MenuKind,
    pub(crate) items: Vec<ItemId>,
    pub(crate) before_show: Option<MenuHook>,

    // Display state; meaningful only while the menu is shown.
    pub(crate) node: Option<NodeId>,
    pub(crate) is_submenu: bool,
    pub(crate) is_menubar_submenu: bool,
    pub(crate) trigger: Option<ItemId>,
    pub(crate) parent_menu_node: Option<NodeId>,
    pub(crate) active_item: Option<ItemId>,
    pub(crate) current_submenu: Option<MenuId>,
}

impl Menu {
    pub(crate) fn new(kind: MenuKind) -> Self {
        Self { kind, ..Default::default() }
    }

    /// Handle of this menu.
    pub fn id(&self) -> MenuId {
        self.id
    }

    /// Menu type.
    pub fn kind(&self) -> MenuKind {
        self.kind
    }

    /// Whether this menu is a menu bar.
    pub fn is_menubar(&self) -> bool {
        self.kind == MenuKind::Menubar
    }

    /// Change the type.
    pub fn set_kind(&mut self, kind: MenuKind) {
        self.kind = kind;
    }

    /// Change the type from its settings name; unknown names keep the current type.
    pub fn set_type(&mut self, name: &str) -> bool {
        match name.parse() {
            Ok(kind) => {
                self.kind = kind;
                true
            }
            Err(e) => {
                tracing::debug!(menu = ?self.id, error = %e, "Ignoring menu type change");
                false
            }
        }
    }

    /// Items in display order.
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the menu has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Install or clear the before-show hook.
    pub fn set_before_show(&mut self, hook: Option<MenuHook>) {
        self.before_show = hook;
    }

    /// Current visual node; present only while displayed.
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Whether the menu is currently displayed.
    pub fn is_open(&self) -> bool {
        self.node.is_some()
    }

    /// Whether the menu was opened from an item of another menu.
    pub fn is_submenu(&self) -> bool {
        self.is_submenu
    }

    /// Whether the menu was opened from a top-level menu bar entry.
    pub fn is_menubar_submenu(&self) -> bool {
        self.is_menubar_submenu
    }

    /// Item that opened this menu, if any.
    pub fn trigger(&self) -> Option<ItemId> {
        self.trigger
    }

    /// Node of the menu that holds the trigger item.
    pub fn parent_menu_node(&self) -> Option<NodeId> {
        self.parent_menu_node
    }

    /// Highlighted item.
    pub fn active_item(&self) -> Option<ItemId> {
        self.active_item
    }

    /// Open child submenu.
    pub fn current_submenu(&self) -> Option<MenuId> {
        self.current_submenu
    }

    pub(crate) fn clear_display_state(&mut self) {
        self.node = None;
        self.is_submenu = false;
        self.is_menubar_submenu = false;
        self.trigger = None;
        self.parent_menu_node = None;
        self.active_item = None;
        self.current_submenu = None;
    }
}

impl fmt::Debug for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Menu")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("items", &self.items)
            .field("node", &self.node)
            .field("is_submenu", &self.is_submenu)
            .field("trigger", &self.trigger)
            .field("current_submenu", &self.current_submenu)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_kind_parse_and_display() {
        assert_eq!("menubar".parse::<MenuKind>().unwrap(), MenuKind::Menubar);
        assert_eq!(MenuKind::Contextmenu.to_string(), "contextmenu");
        let err = "popup".parse::<MenuKind>().unwrap_err();
        assert!(matches!(err, MenuError::InvalidMenuType { .. }));
        assert_eq!(err.category(), "Type");
        assert!(!err.is_invalid_argument());
    }

    #[test]
    fn test_set_type_keeps_previous_on_invalid() {
        let mut menu = Menu::new(MenuKind::Menubar);
        assert!(!menu.set_type("sidebar"));
        assert!(menu.is_menubar());
        assert!(menu.set_type("contextmenu"));
        assert_eq!(menu.kind(), MenuKind::Contextmenu);
    }

    #[test]
    fn test_new_menu_is_closed() {
        let menu = Menu::new(MenuKind::Contextmenu);
        assert!(!menu.is_open());
        assert!(menu.is_empty());
        assert!(menu.active_item().is_none());
    }
}
