//! The interaction session.
//!
//! A [`MenuSession`] is the single owner of everything that is global while
//! menus are on screen: the topmost menu, the menu receiving keyboard
//! navigation, the outside-click overlay, listener attachment and the
//! installed menu bar. Hosts construct one per application and route all
//! pointer and key events through it. Behavior lives in [`crate::services`].

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::SessionConfig;
use crate::geometry::{Placement, Point, Size};
use crate::host::{Host, NodeId};
use crate::models::{ItemId, MenuId, MenuItem, MenuTree};

/// Data passed to the reveal hook.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealRequest {
    pub menu: MenuId,
    pub node: NodeId,
    /// Measured size of the menu node.
    pub size: Size,
    /// Position asked for by the caller.
    pub desired: Point,
    /// Final placement already applied to the node.
    pub placement: Placement,
}

/// Called before a menu is shown; returning `true` means the hook revealed
/// the node itself and the default show is skipped.
pub type RevealHook = Box<dyn FnMut(&RevealRequest) -> bool + Send + 'static>;

/// Called right before a menu node is removed.
pub type RemovalHook = Box<dyn FnMut(MenuId, NodeId) + Send + 'static>;

/// Called when a selection finishes, with the chosen item or `None`.
pub type MenuDoneHook = Box<dyn FnMut(Option<&MenuItem>) + Send + 'static>;

/// A session shared between threads that deliver events.
pub type SharedSession<H> = Arc<Mutex<MenuSession<H>>>;

#[derive(Default)]
pub(crate) struct SessionHooks {
    pub(crate) reveal: Option<RevealHook>,
    pub(crate) removal: Option<RemovalHook>,
    pub(crate) menu_done: Option<MenuDoneHook>,
}

/// Model entity a visual node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeBinding {
    Menu(MenuId),
    Item(ItemId),
}

/// An installed application menu bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MenubarInstall {
    pub(crate) menu: MenuId,
    pub(crate) node: NodeId,
}

/// Explicit interaction session over a [`Host`].
pub struct MenuSession<H: Host> {
    pub(crate) host: H,
    pub(crate) tree: MenuTree,
    pub(crate) config: SessionConfig,
    pub(crate) hooks: SessionHooks,
    /// Substitute for the host's root surface.
    pub(crate) container: Option<NodeId>,
    pub(crate) topmost: Option<MenuId>,
    pub(crate) current_menu_node: Option<NodeId>,
    pub(crate) top_sheet: Option<NodeId>,
    /// Node the topmost pointer listener is attached to.
    pub(crate) listener_node: Option<NodeId>,
    pub(crate) keydown_listening: bool,
    pub(crate) menubar: Option<MenubarInstall>,
    pub(crate) bindings: HashMap<NodeId, NodeBinding>,
}

impl<H: Host> MenuSession<H> {
    /// Create a session with an empty menu tree.
    pub fn new(host: H, config: SessionConfig) -> Self {
        Self::with_tree(host, MenuTree::new(), config)
    }

    /// Create a session over an existing menu tree.
    pub fn with_tree(host: H, tree: MenuTree, config: SessionConfig) -> Self {
        tracing::debug!(
            top_sheet_z_index = config.top_sheet_z_index,
            submenu_overlap = config.submenu_overlap,
            "MenuSession created"
        );
        Self {
            host,
            tree,
            config,
            hooks: SessionHooks::default(),
            container: None,
            topmost: None,
            current_menu_node: None,
            top_sheet: None,
            listener_node: None,
            keydown_listening: false,
            menubar: None,
            bindings: HashMap::new(),
        }
    }

    /// Wrap the session for hosts that deliver events on several threads.
    pub fn into_shared(self) -> SharedSession<H> {
        Arc::new(Mutex::new(self))
    }

    // ========== Hooks ==========

    /// Install the reveal hook.
    pub fn on_reveal(&mut self, hook: impl FnMut(&RevealRequest) -> bool + Send + 'static) {
        self.hooks.reveal = Some(Box::new(hook));
    }

    /// Install the pre-removal hook.
    pub fn on_removal(&mut self, hook: impl FnMut(MenuId, NodeId) + Send + 'static) {
        self.hooks.removal = Some(Box::new(hook));
    }

    /// Install the selection-finished hook.
    pub fn on_menu_done(&mut self, hook: impl FnMut(Option<&MenuItem>) + Send + 'static) {
        self.hooks.menu_done = Some(Box::new(hook));
    }

    // ========== Accessors ==========

    /// Use `container` instead of the host root; `None` restores the root.
    pub fn set_container(&mut self, container: Option<NodeId>) {
        self.container = container;
    }

    /// The node menus are attached to and measured against.
    pub fn container(&self) -> NodeId {
        self.container.unwrap_or_else(|| self.host.root())
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn tree(&self) -> &MenuTree {
        &self.tree
    }

    /// Mutable access to the menu tree. Edits to displayed menus show up on
    /// their next popup.
    pub fn tree_mut(&mut self) -> &mut MenuTree {
        &mut self.tree
    }

    /// Root of the open menu tree.
    pub fn topmost(&self) -> Option<MenuId> {
        self.topmost
    }

    /// Whether any menu tree is open.
    pub fn is_open(&self) -> bool {
        self.topmost.is_some()
    }

    /// Node of the menu receiving keyboard navigation.
    pub fn current_menu_node(&self) -> Option<NodeId> {
        self.current_menu_node
    }

    /// The outside-click overlay, while it exists.
    pub fn top_sheet(&self) -> Option<NodeId> {
        self.top_sheet
    }

    /// Whether the key listener is attached.
    pub fn is_key_listening(&self) -> bool {
        self.keydown_listening
    }

    /// Node of the installed menu bar.
    pub fn menubar_node(&self) -> Option<NodeId> {
        self.menubar.map(|m| m.node)
    }

    /// The installed menu bar.
    pub fn application_menu(&self) -> Option<MenuId> {
        self.menubar.map(|m| m.menu)
    }

    /// Menu displayed by `node`.
    pub fn menu_for_node(&self, node: NodeId) -> Option<MenuId> {
        match self.bindings.get(&node)? {
            NodeBinding::Menu(menu) => Some(*menu),
            NodeBinding::Item(_) => None,
        }
    }

    /// Item displayed by `node`.
    pub fn item_for_node(&self, node: NodeId) -> Option<ItemId> {
        match self.bindings.get(&node)? {
            NodeBinding::Item(item) => Some(*item),
            NodeBinding::Menu(_) => None,
        }
    }

    // ========== Internal helpers ==========

    /// Walk up from `node` to the first node bound to an item.
    pub(crate) fn item_node_from(&self, node: NodeId) -> Option<(NodeId, ItemId)> {
        let mut current = Some(node);
        while let Some(n) = current {
            if let Some(NodeBinding::Item(item)) = self.bindings.get(&n) {
                return Some((n, *item));
            }
            current = self.host.parent(n);
        }
        None
    }

    /// Highlight state of an item, mirrored onto its node.
    pub(crate) fn set_item_active(&mut self, item: ItemId, active: bool) {
        if let Some(entry) = self.tree.item_mut(item) {
            entry.active = active;
            if let Some(node) = entry.node {
                self.host.set_active(node, active);
            }
        }
    }

    /// Submenu-open marker of an item, mirrored onto its node.
    pub(crate) fn show_submenu_active(&mut self, item: ItemId, active: bool) {
        if let Some(entry) = self.tree.item_mut(item) {
            entry.submenu_active = active;
            if let Some(node) = entry.node {
                self.host.set_submenu_active(node, active);
            }
        }
    }

    /// Drop side-table entries for `node` and everything below it.
    pub(crate) fn forget_nodes(&mut self, node: NodeId) {
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            self.bindings.remove(&n);
            stack.extend(self.host.children(n));
        }
    }

    pub(crate) fn notify_done(&mut self, item: Option<ItemId>) {
        let chosen = item.and_then(|id| self.tree.item(id));
        tracing::debug!(item = ?item, "Selection finished");
        if let Some(hook) = self.hooks.menu_done.as_mut() {
            hook(chosen);
        }
    }
}

impl<H: Host> std::fmt::Debug for MenuSession<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuSession")
            .field("topmost", &self.topmost)
            .field("current_menu_node", &self.current_menu_node)
            .field("top_sheet", &self.top_sheet)
            .field("keydown_listening", &self.keydown_listening)
            .field("menubar", &self.menubar)
            .field("bindings", &self.bindings.len())
            .finish_non_exhaustive()
    }
}
