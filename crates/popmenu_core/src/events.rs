//! Input events delivered by the host.

use serde::{Deserialize, Serialize};

use crate::host::NodeId;

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button pressed.
    Down,
    /// Button released.
    Up,
    /// Pointer entered a node.
    Enter,
    /// Pointer left a node.
    Leave,
}

/// A pointer event as seen by one listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    /// Node the event originated on.
    pub target: NodeId,
    /// Node whose listener is being invoked.
    pub current_target: NodeId,
    /// For `Leave`, the node the pointer moved to.
    pub related: Option<NodeId>,
}

impl PointerEvent {
    /// Create an event without a related node.
    pub fn new(phase: PointerPhase, target: NodeId, current_target: NodeId) -> Self {
        Self { phase, target, current_target, related: None }
    }

    /// Pointer entering `target`.
    pub fn enter(target: NodeId) -> Self {
        Self::new(PointerPhase::Enter, target, target)
    }

    /// Pointer leaving `target` towards `related`.
    pub fn leave(target: NodeId, related: Option<NodeId>) -> Self {
        Self { related, ..Self::new(PointerPhase::Leave, target, target) }
    }
}

/// Keys the navigator reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuKey {
    Escape,
    Left,
    Right,
    Up,
    Down,
    Enter,
    Space,
    /// Any other key; never consumed.
    Other,
}

impl MenuKey {
    /// Map a legacy numeric key code.
    pub fn from_key_code(code: u32) -> Self {
        match code {
            27 => Self::Escape,
            37 => Self::Left,
            38 => Self::Up,
            39 => Self::Right,
            40 => Self::Down,
            13 => Self::Enter,
            32 => Self::Space,
            _ => Self::Other,
        }
    }
}

/// What the host should do with the event after the engine handled it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventResponse {
    /// Suppress the host's default action (scrolling, text selection).
    pub prevent_default: bool,
    /// Stop delivering the event to further listeners.
    pub stop_propagation: bool,
}

impl EventResponse {
    /// The event was not for the engine.
    pub const IGNORED: Self = Self { prevent_default: false, stop_propagation: false };

    /// Default action suppressed, propagation continues.
    pub const PREVENT_DEFAULT: Self = Self { prevent_default: true, stop_propagation: false };

    /// The event was fully consumed.
    pub const CONSUMED: Self = Self { prevent_default: true, stop_propagation: true };
}
