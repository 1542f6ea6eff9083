//! Keyboard navigation over the menu that has focus.

use crate::events::{EventResponse, MenuKey};
use crate::host::Host;
use crate::models::{ItemId, MenuId};
use crate::state::MenuSession;

/// Index of the next eligible entry after `current`, wrapping around once.
///
/// Starting without a current entry scans from the first (or last) entry.
/// Returns `None` when no entry is eligible.
pub fn next_eligible(
    len: usize,
    current: Option<usize>,
    forwards: bool,
    eligible: impl Fn(usize) -> bool,
) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let mut wrapped = false;
    let mut next = current;
    loop {
        next = match next {
            Some(i) if forwards && i + 1 < len => Some(i + 1),
            Some(i) if !forwards && i > 0 && i <= len => Some(i - 1),
            _ => {
                if wrapped {
                    return None;
                }
                wrapped = true;
                Some(if forwards { 0 } else { len - 1 })
            }
        };
        if let Some(i) = next.filter(|&i| eligible(i)) {
            return Some(i);
        }
    }
}

impl<H: Host> MenuSession<H> {
    /// Handle a key press while the key listener is attached.
    pub fn handle_key(&mut self, key: MenuKey) -> EventResponse {
        if !self.keydown_listening {
            return EventResponse::IGNORED;
        }
        let Some(menu) = self.current_menu_node.and_then(|node| self.menu_for_node(node)) else {
            return EventResponse::IGNORED;
        };
        let Some((active, is_menubar_submenu)) = self.tree.menu(menu).map(|m| (m.active_item(), m.is_menubar_submenu()))
        else {
            return EventResponse::IGNORED;
        };
        tracing::trace!(?key, ?menu, ?active, "Key event");

        match key {
            MenuKey::Escape | MenuKey::Left => {
                if key == MenuKey::Left && is_menubar_submenu && self.next_menu(false).is_some() {
                    return EventResponse::CONSUMED;
                }
                self.popdown(menu);
                if self.topmost.is_none() {
                    self.notify_done(None);
                }
            }
            MenuKey::Enter | MenuKey::Space => {
                if let Some(active) = active {
                    if self.tree.item(active).is_some_and(|i| i.has_submenu()) {
                        self.open_submenu(active);
                    } else {
                        self.doit(active);
                    }
                }
            }
            MenuKey::Right => {
                let opens = active.is_some_and(|a| self.tree.item(a).is_some_and(|i| i.has_submenu()));
                match active {
                    Some(active) if opens => self.open_submenu(active),
                    _ => {
                        let in_dropdown =
                            self.topmost.and_then(|t| self.tree.menu(t)).is_some_and(|t| t.is_menubar_submenu());
                        if in_dropdown {
                            self.next_menu(true);
                        }
                    }
                }
            }
            MenuKey::Up | MenuKey::Down => {
                if let Some(next) = self.next_item(menu, active, key == MenuKey::Down) {
                    self.select(next, false, false);
                }
            }
            MenuKey::Other => return EventResponse::IGNORED,
        }
        EventResponse::CONSUMED
    }

    /// Next displayed, enabled, non-separator item of `menu` after `current`.
    pub fn next_item(&self, menu: MenuId, current: Option<ItemId>, forwards: bool) -> Option<ItemId> {
        let shown: Vec<ItemId> = self
            .tree
            .items_of(menu)
            .iter()
            .copied()
            .filter(|&i| self.tree.item(i).is_some_and(|e| e.node().is_some()))
            .collect();
        let current = current.and_then(|c| shown.iter().position(|&i| i == c));
        let index = next_eligible(shown.len(), current, forwards, |i| {
            self.tree.item(shown[i]).is_some_and(|e| e.is_selectable())
        })?;
        Some(shown[index])
    }

    /// Move the open dropdown to the adjacent top-level entry of the menu bar.
    pub(crate) fn next_menu(&mut self, forwards: bool) -> Option<ItemId> {
        let dropdown = self.topmost.filter(|&t| self.tree.menu(t).is_some_and(|m| m.is_menubar_submenu()))?;
        let trigger = self.tree.menu(dropdown)?.trigger()?;
        let bar = self.tree.item(trigger)?.parent()?;
        let current = self.tree.menu(bar)?.active_item().or(Some(trigger));
        let next = self.next_item(bar, current, forwards)?;
        tracing::debug!(?next, forwards, "Moving to adjacent menu bar entry");
        self.select(next, true, true);
        Some(next)
    }

    /// Open the submenu of `item` and highlight its first entry.
    pub(crate) fn open_submenu(&mut self, item: ItemId) {
        let menubar_submenu = self.tree.item(item).is_some_and(|i| i.is_menubar_top_level());
        self.select_submenu(item, menubar_submenu);

        let Some(submenu) = self.tree.item(item).and_then(|i| i.submenu_id()) else {
            return;
        };
        let Some(node) = self.tree.menu(submenu).and_then(|m| m.node()) else {
            return;
        };
        self.current_menu_node = Some(node);
        if let Some(first) = self.next_item(submenu, None, true) {
            self.select(first, false, false);
        }
    }
}
