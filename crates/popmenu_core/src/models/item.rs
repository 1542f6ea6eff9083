//! Menu item model.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::MenuId;
use crate::error::MenuError;
use crate::host::NodeId;

slotmap::new_key_type! {
    /// Handle of a [`MenuItem`] inside a [`MenuTree`](super::MenuTree).
    pub struct ItemId;
}

/// Handler invoked when a non-submenu item is chosen.
pub type ClickHandler = Arc<dyn Fn(&MenuItem) + Send + Sync + 'static>;

/// Hook invoked on an item right before its menu's node is built.
pub type ItemHook = Arc<dyn Fn(&mut MenuItem) + Send + Sync + 'static>;

/// Item type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Plain action item.
    #[default]
    Normal,
    /// Visual divider; never selectable.
    Separator,
    /// Toggles its checked flag when chosen.
    Checkbox,
    /// Checked exclusively among its contiguous radio siblings.
    Radio,
}

impl ItemKind {
    /// Name used in settings and on visual nodes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Separator => "separator",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
        }
    }
}

impl FromStr for ItemKind {
    type Err = MenuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "separator" => Ok(Self::Separator),
            "checkbox" => Ok(Self::Checkbox),
            "radio" => Ok(Self::Radio),
            other => Err(MenuError::invalid_item_type(other)),
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry of a [`Menu`](super::Menu).
#[derive(Clone, Default)]
pub struct MenuItem {
    pub(crate) id: ItemId,
    kind: ItemKind,
    label: String,
    icon: Option<String>,
    icon_is_template: bool,
    tooltip: String,
    checked: bool,
    enabled: bool,
    visible: bool,
    key: Option<String>,
    modifiers: Option<String>,
    accelerator: Option<String>,
    action: Option<String>,
    pub(crate) submenu: Option<MenuId>,
    click: Option<ClickHandler>,
    before_show: Option<ItemHook>,

    // Ownership and display state, maintained by the tree and the session.
    pub(crate) parent: Option<MenuId>,
    pub(crate) node: Option<NodeId>,
    pub(crate) menubar_top_level: bool,
    pub(crate) active: bool,
    pub(crate) submenu_active: bool,
}

impl MenuItem {
    /// Create an enabled, visible item of the given type.
    pub fn new(kind: ItemKind) -> Self {
        Self { kind, enabled: true, visible: true, ..Default::default() }
    }

    /// Create a normal item with a label.
    pub fn normal(label: impl Into<String>) -> Self {
        Self::new(ItemKind::Normal).label(label)
    }

    /// Create a separator.
    pub fn separator() -> Self {
        Self::new(ItemKind::Separator)
    }

    /// Create a checkbox item.
    pub fn checkbox(label: impl Into<String>, checked: bool) -> Self {
        Self::new(ItemKind::Checkbox).label(label).checked(checked)
    }

    /// Create a radio item.
    pub fn radio(label: impl Into<String>, checked: bool) -> Self {
        Self::new(ItemKind::Radio).label(label).checked(checked)
    }

    /// Create a submenu trigger.
    pub fn submenu(label: impl Into<String>, submenu: MenuId) -> Self {
        let mut item = Self::normal(label);
        item.submenu = Some(submenu);
        item
    }

    // ========== Builders ==========

    /// Builder: set the label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Builder: set the icon.
    pub fn icon(mut self, icon: impl Into<String>, is_template: bool) -> Self {
        self.icon = Some(icon.into());
        self.icon_is_template = is_template;
        self
    }

    /// Builder: set the tooltip.
    pub fn tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = tooltip.into();
        self
    }

    /// Builder: set the checked flag.
    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    /// Builder: set the enabled flag.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Builder: set the visible flag.
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Builder: set the action id reported to the host.
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Builder: set the key and optional modifiers; derives the accelerator.
    pub fn key(mut self, key: impl Into<String>, modifiers: Option<&str>) -> Self {
        self.key = Some(key.into());
        self.modifiers = modifiers.map(String::from);
        self.accelerator = None;
        self.resolve_accelerator();
        self
    }

    /// Builder: set the accelerator text; derives key and modifiers from it.
    pub fn accelerator(mut self, accelerator: impl Into<String>) -> Self {
        self.accelerator = Some(accelerator.into());
        self.key = None;
        self.modifiers = None;
        self.resolve_accelerator();
        self
    }

    /// Builder: set the click handler.
    pub fn on_click(mut self, handler: impl Fn(&MenuItem) + Send + Sync + 'static) -> Self {
        self.click = Some(Arc::new(handler));
        self
    }

    /// Builder: set the before-show hook.
    pub fn on_before_show(mut self, hook: impl Fn(&mut MenuItem) + Send + Sync + 'static) -> Self {
        self.before_show = Some(Arc::new(hook));
        self
    }

    // ========== Getters ==========

    /// Handle of this item; the null key until added to a tree.
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Item type.
    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Label text.
    pub fn label_text(&self) -> &str {
        &self.label
    }

    /// Icon reference.
    pub fn icon_ref(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    /// Whether the icon is a template image.
    pub fn is_icon_template(&self) -> bool {
        self.icon_is_template
    }

    /// Tooltip text.
    pub fn tooltip_text(&self) -> &str {
        &self.tooltip
    }

    /// Checked flag.
    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// Enabled flag.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Visible flag.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Upper-cased key, if any.
    pub fn key_text(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Modifier part of the accelerator, if any.
    pub fn modifiers_text(&self) -> Option<&str> {
        self.modifiers.as_deref()
    }

    /// Accelerator display text, if any.
    pub fn accelerator_text(&self) -> Option<&str> {
        self.accelerator.as_deref()
    }

    /// Action id, if any.
    pub fn action_id(&self) -> Option<&str> {
        self.action.as_deref()
    }

    /// Submenu opened by this item.
    pub fn submenu_id(&self) -> Option<MenuId> {
        self.submenu
    }

    /// Whether this item opens a submenu.
    pub fn has_submenu(&self) -> bool {
        self.submenu.is_some()
    }

    /// Whether this item is a separator.
    pub fn is_separator(&self) -> bool {
        self.kind == ItemKind::Separator
    }

    /// Keyboard navigation stops on enabled non-separator items.
    pub fn is_selectable(&self) -> bool {
        !self.is_separator() && self.enabled
    }

    /// Menu holding this item.
    pub fn parent(&self) -> Option<MenuId> {
        self.parent
    }

    /// Current visual node; present only while the parent menu is displayed.
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Whether the item was last built as a top-level menu bar entry.
    pub fn is_menubar_top_level(&self) -> bool {
        self.menubar_top_level
    }

    /// Keyboard/hover highlight state.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether this item's submenu is marked open.
    pub fn is_submenu_active(&self) -> bool {
        self.submenu_active
    }

    pub(crate) fn click_handler(&self) -> Option<ClickHandler> {
        self.click.clone()
    }

    pub(crate) fn before_show_hook(&self) -> Option<ItemHook> {
        self.before_show.clone()
    }

    // ========== Setters ==========

    /// Change the type from its settings name; unknown names keep the current type.
    pub fn set_type(&mut self, name: &str) -> bool {
        match name.parse() {
            Ok(kind) => {
                self.kind = kind;
                true
            }
            Err(e) => {
                tracing::debug!(item = ?self.id, error = %e, "Ignoring item type change");
                false
            }
        }
    }

    /// Change the type.
    pub fn set_kind(&mut self, kind: ItemKind) {
        self.kind = kind;
    }

    /// Change the label.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Change the checked flag.
    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }

    /// Change the enabled flag.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Change the visible flag.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Change the tooltip.
    pub fn set_tooltip(&mut self, tooltip: impl Into<String>) {
        self.tooltip = tooltip.into();
    }

    /// Replace or clear the click handler.
    pub fn set_click(&mut self, handler: Option<ClickHandler>) {
        self.click = handler;
    }

    // ========== Accelerator ==========

    /// Derive the accelerator from key/modifiers, or key/modifiers from the
    /// accelerator, whichever was given.
    fn resolve_accelerator(&mut self) {
        let mut accelerator = self.accelerator.take();
        if accelerator.is_none() {
            if let Some(key) = &self.key {
                accelerator = Some(match &self.modifiers {
                    Some(modifiers) => format!("{modifiers}+{key}"),
                    None => key.clone(),
                });
            }
        }
        let accelerator = accelerator.map(|a| normalize_accelerator(&a));

        if let (Some(accel), None) = (&accelerator, &self.key) {
            match split_accelerator(accel) {
                Some((modifiers, key)) => {
                    self.modifiers = Some(modifiers.to_string());
                    self.key = Some(key.to_string());
                }
                None => self.key = Some(accel.clone()),
            }
        }

        self.key = self.key.take().map(|k| k.to_uppercase());
        self.accelerator = accelerator;
    }
}

/// Shorten long modifier names and resolve the platform modifier.
fn normalize_accelerator(accelerator: &str) -> String {
    let Some((modifiers, key)) = split_accelerator(accelerator) else {
        return accelerator.to_string();
    };
    let platform = if cfg!(target_os = "macos") { "Cmd" } else { "Ctrl" };
    let modifiers: Vec<&str> = modifiers
        .split('+')
        .map(|m| match m.to_ascii_lowercase().as_str() {
            "command" => "Cmd",
            "control" => "Ctrl",
            "mod" | "cmdorctrl" | "commandorctrl" => platform,
            _ => m,
        })
        .collect();
    format!("{}+{}", modifiers.join("+"), key)
}

/// Split at the last `+` that is not the final character.
fn split_accelerator(accelerator: &str) -> Option<(&str, &str)> {
    let search = accelerator.len().checked_sub(1)?;
    let plus = accelerator[..search].rfind('+')?;
    if plus == 0 {
        return None;
    }
    Some((&accelerator[..plus], &accelerator[plus + 1..]))
}

impl fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuItem")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("checked", &self.checked)
            .field("enabled", &self.enabled)
            .field("visible", &self.visible)
            .field("accelerator", &self.accelerator)
            .field("submenu", &self.submenu)
            .field("parent", &self.parent)
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.kind, self.label)
    }
}
