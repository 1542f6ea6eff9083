//! Declarative menu descriptions.
//!
//! Settings deserialize from JSON and are materialised into a [`MenuTree`]
//! with [`MenuTree::build`]. Unknown type names fall back to the default
//! type instead of failing the whole description.

use serde::{Deserialize, Serialize};

use super::{ItemId, ItemKind, MenuId, MenuItem, MenuKind, MenuTree};
use crate::error::MenuError;

/// Description of a menu.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuSettings {
    /// `"contextmenu"` or `"menubar"`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Items in display order.
    pub items: Vec<MenuItemSettings>,
}

/// Description of a menu item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuItemSettings {
    /// `"normal"`, `"separator"`, `"checkbox"` or `"radio"`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub label: String,
    /// Nested submenu description.
    pub submenu: Option<MenuSettings>,
    /// Action id reported when the item is chosen.
    pub action: Option<String>,
    pub key: Option<String>,
    pub modifiers: Option<String>,
    pub accelerator: Option<String>,
    pub enabled: bool,
    pub visible: bool,
    pub checked: bool,
    pub icon: Option<String>,
    pub icon_is_template: bool,
    pub tooltip: String,
}

impl Default for MenuItemSettings {
    fn default() -> Self {
        Self {
            kind: None,
            label: String::new(),
            submenu: None,
            action: None,
            key: None,
            modifiers: None,
            accelerator: None,
            enabled: true,
            visible: true,
            checked: false,
            icon: None,
            icon_is_template: false,
            tooltip: String::new(),
        }
    }
}

impl MenuSettings {
    /// Parse a description from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, MenuError> {
        Ok(serde_json::from_str(json)?)
    }

    fn menu_kind(&self) -> MenuKind {
        parse_or_default(self.kind.as_deref())
    }
}

impl MenuItemSettings {
    fn to_item(&self) -> MenuItem {
        let kind: ItemKind = parse_or_default(self.kind.as_deref());
        let mut item = MenuItem::new(kind)
            .label(self.label.clone())
            .tooltip(self.tooltip.clone())
            .checked(self.checked)
            .enabled(self.enabled)
            .visible(self.visible);
        if let Some(icon) = &self.icon {
            item = item.icon(icon.clone(), self.icon_is_template);
        }
        if let Some(action) = &self.action {
            item = item.action(action.clone());
        }
        if let Some(accelerator) = &self.accelerator {
            item = item.accelerator(accelerator.clone());
        } else if let Some(key) = &self.key {
            item = item.key(key.clone(), self.modifiers.as_deref());
        }
        item
    }
}

fn parse_or_default<T>(name: Option<&str>) -> T
where
    T: std::str::FromStr<Err = MenuError> + Default,
{
    match name.map(str::parse::<T>) {
        Some(Ok(value)) => value,
        Some(Err(e)) => {
            tracing::debug!(error = %e, "Falling back to default type");
            T::default()
        }
        None => T::default(),
    }
}

impl MenuTree {
    /// Materialise `settings` (and nested submenus) and return the root menu.
    pub fn build(&mut self, settings: &MenuSettings) -> MenuId {
        let menu = self.create_menu(settings.menu_kind());
        for entry in &settings.items {
            let item = self.build_item(entry);
            // Freshly created items are detached, so append cannot fail.
            if let Err(e) = self.append(menu, item) {
                tracing::warn!(error = %e, "Failed to append built item");
            }
        }
        menu
    }

    fn build_item(&mut self, settings: &MenuItemSettings) -> ItemId {
        let submenu = settings.submenu.as_ref().map(|s| self.build(s));
        let mut item = settings.to_item();
        item.submenu = submenu;
        self.add_item(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EDIT_MENU: &str = r#"{
        "type": "contextmenu",
        "items": [
            { "label": "Undo", "accelerator": "CmdOrCtrl+Z", "action": "undo" },
            { "type": "separator" },
            { "label": "Copy", "key": "c", "modifiers": "Control", "enabled": false },
            { "type": "bogus", "label": "Odd" },
            { "label": "Font Size", "submenu": { "items": [
                { "type": "radio", "label": "Small", "checked": true },
                { "type": "radio", "label": "Large" }
            ] } }
        ]
    }"#;

    #[test]
    fn test_build_from_json() {
        let settings = MenuSettings::from_json_str(EDIT_MENU).unwrap();
        let mut tree = MenuTree::new();
        let menu = tree.build(&settings);

        let items = tree.items_of(menu).to_vec();
        assert_eq!(items.len(), 5);

        let undo = tree.item(items[0]).unwrap();
        assert_eq!(undo.action_id(), Some("undo"));
        assert_eq!(undo.key_text(), Some("Z"));

        assert!(tree.item(items[1]).unwrap().is_separator());

        let copy = tree.item(items[2]).unwrap();
        assert!(!copy.is_enabled());
        assert_eq!(copy.accelerator_text(), Some("Ctrl+c"));

        assert_eq!(tree.item(items[3]).unwrap().kind(), ItemKind::Normal);

        let font = tree.item(items[4]).unwrap();
        let sub = font.submenu_id().unwrap();
        assert_eq!(tree.items_of(sub).len(), 2);
        let small = tree.item(tree.items_of(sub)[0]).unwrap();
        assert_eq!(small.kind(), ItemKind::Radio);
        assert!(small.is_checked());
        assert_eq!(small.parent(), Some(sub));
    }

    #[test]
    fn test_unknown_menu_type_falls_back() {
        let settings = MenuSettings::from_json_str(r#"{ "type": "ribbon" }"#).unwrap();
        let mut tree = MenuTree::new();
        let menu = tree.build(&settings);
        assert_eq!(tree.menu(menu).unwrap().kind(), MenuKind::Contextmenu);
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = MenuSettings::from_json_str("{ items: ").unwrap_err();
        assert_eq!(err.category(), "Config");
    }
}
