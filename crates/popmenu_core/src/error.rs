//! Error types for the menu engine.
//!
//! Nothing here is fatal: every rejected call is logged and reported to the
//! caller, and the open menu tree is left as it was.

use thiserror::Error;

use crate::models::{ItemId, MenuId};

/// Main error type for menu model and session operations.
#[derive(Debug, Error)]
pub enum MenuError {
    /// The menu id is stale or belongs to another tree.
    #[error("Unknown menu: {id:?}")]
    UnknownMenu {
        /// The rejected menu id.
        id: MenuId,
    },

    /// The item id is stale or belongs to another tree.
    #[error("Unknown menu item: {id:?}")]
    UnknownItem {
        /// The rejected item id.
        id: ItemId,
    },

    /// `remove` was given an item that is not in the menu's sequence.
    #[error("Item {item:?} was not found in menu {menu:?}")]
    ItemNotInMenu {
        /// The menu that was searched.
        menu: MenuId,
        /// The item that was not found.
        item: ItemId,
    },

    /// The item already occupies a position in a menu.
    #[error("Item {item:?} is already attached to menu {menu:?}")]
    ItemAlreadyAttached {
        /// The item being attached.
        item: ItemId,
        /// The menu currently holding it.
        menu: MenuId,
    },

    /// A menu type string outside `contextmenu` / `menubar`.
    #[error("{value} is not a valid menu type")]
    InvalidMenuType {
        /// The rejected input.
        value: String,
    },

    /// An item type string outside `normal` / `separator` / `checkbox` / `radio`.
    #[error("{value} is not a valid menu item type")]
    InvalidItemType {
        /// The rejected input.
        value: String,
    },

    /// Configuration could not be read or parsed.
    #[error("Config error: {message}")]
    Config {
        /// Human-readable error message.
        message: String,
        /// Optional underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl MenuError {
    // ========== Constructors ==========

    /// Create an unknown menu error.
    pub fn unknown_menu(id: MenuId) -> Self {
        Self::UnknownMenu { id }
    }

    /// Create an unknown item error.
    pub fn unknown_item(id: ItemId) -> Self {
        Self::UnknownItem { id }
    }

    /// Create a not-in-menu error.
    pub fn item_not_in_menu(menu: MenuId, item: ItemId) -> Self {
        Self::ItemNotInMenu { menu, item }
    }

    /// Create an already-attached error.
    pub fn item_already_attached(item: ItemId, menu: MenuId) -> Self {
        Self::ItemAlreadyAttached { item, menu }
    }

    /// Create an invalid menu type error.
    pub fn invalid_menu_type(value: impl Into<String>) -> Self {
        Self::InvalidMenuType { value: value.into() }
    }

    /// Create an invalid item type error.
    pub fn invalid_item_type(value: impl Into<String>) -> Self {
        Self::InvalidItemType { value: value.into() }
    }

    /// Create a new config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into(), source: None }
    }

    /// Create a new config error with source.
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config { message: message.into(), source: Some(Box::new(source)) }
    }

    // ========== Methods ==========

    /// Check if this error came from a caller passing a bad argument.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::UnknownMenu { .. }
                | Self::UnknownItem { .. }
                | Self::ItemNotInMenu { .. }
                | Self::ItemAlreadyAttached { .. }
        )
    }

    /// Get the error category name.
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnknownMenu { .. } => "Argument",
            Self::UnknownItem { .. } => "Argument",
            Self::ItemNotInMenu { .. } => "Argument",
            Self::ItemAlreadyAttached { .. } => "Argument",
            Self::InvalidMenuType { .. } => "Type",
            Self::InvalidItemType { .. } => "Type",
            Self::Config { .. } => "Config",
        }
    }

    /// Get actionable hint for the caller.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::UnknownMenu { .. } | Self::UnknownItem { .. } => {
                Some("Ids are only valid for the tree that created them")
            }
            Self::ItemNotInMenu { .. } => None,
            Self::ItemAlreadyAttached { .. } => Some("Remove the item from its menu first"),
            Self::InvalidMenuType { .. } => Some("Use \"contextmenu\" or \"menubar\""),
            Self::InvalidItemType { .. } => {
                Some("Use \"normal\", \"separator\", \"checkbox\" or \"radio\"")
            }
            Self::Config { .. } => Some("Check the JSON syntax of the config file"),
        }
    }
}

/// Convert from std::io::Error to MenuError.
impl From<std::io::Error> for MenuError {
    fn from(err: std::io::Error) -> Self {
        MenuError::Config { message: err.to_string(), source: Some(Box::new(err)) }
    }
}

/// Convert from serde_json::Error to MenuError.
impl From<serde_json::Error> for MenuError {
    fn from(err: serde_json::Error) -> Self {
        MenuError::Config { message: format!("JSON error: {err}"), source: Some(Box::new(err)) }
    }
}
