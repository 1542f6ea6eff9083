//! Behavior of the interaction session.
//!
//! Each module adds methods to [`MenuSession`](crate::state::MenuSession):
//! - `lifecycle` - popup, popdown and node building
//! - `router` - pointer classification, selection and item activation
//! - `keyboard` - arrow/Enter/Escape/Space navigation
//! - `menubar` - application menu bar installation and model queries

pub mod keyboard;
pub mod lifecycle;
pub mod menubar;
pub mod router;

#[cfg(test)]
pub(crate) mod test_support;
