//! Headless engine for hierarchical popup menus.
//!
//! This crate owns the menu model and all interaction rules; drawing is left
//! to a [`Host`] implementation:
//!
//! - **models**: Menus, items and the arena that holds them
//! - **geometry**: Placement and clipping of menus inside their container
//! - **host**: The visual-tree boundary the engine drives
//! - **events**: Pointer and key events delivered by the host
//! - **state**: The interaction session and its hooks
//! - **services**: Popup/popdown, pointer routing, keyboard navigation, menu bar
//! - **config**: Session tunables loaded from JSON
//! - **error**: Error handling for rejected calls
//! - **logging**: Structured logging setup

pub mod config;
pub mod error;
pub mod events;
pub mod geometry;
pub mod host;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;

pub use config::SessionConfig;
pub use error::MenuError;
pub use events::{EventResponse, MenuKey, PointerEvent, PointerPhase};
pub use geometry::{place_menu, Anchor, Placement, PlacementContext, PlacementRequest, Point, Rect, Size};
pub use host::{Host, ItemNodeSpec, MenuNodeSpec, NodeId};
pub use models::{
    ClickHandler, ItemHook, ItemId, ItemKind, Menu, MenuHook, MenuId, MenuItem, MenuItemSettings,
    MenuKind, MenuSettings, MenuTree,
};
pub use services::keyboard::next_eligible;
pub use state::{MenuDoneHook, MenuSession, RemovalHook, RevealHook, RevealRequest, SharedSession};
