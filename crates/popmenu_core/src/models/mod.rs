//! Data model for menus and menu items.

pub mod item;
pub mod menu;
pub mod settings;
pub mod tree;

pub use item::{ClickHandler, ItemHook, ItemId, ItemKind, MenuItem};
pub use menu::{Menu, MenuHook, MenuId, MenuKind};
pub use settings::{MenuItemSettings, MenuSettings};
pub use tree::MenuTree;
