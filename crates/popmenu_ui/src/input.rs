//! Event delivery from the scene to a [`MenuSession`].
//!
//! Presses bubble from the target through its ancestors to every node that
//! carries the engine's pointer listener. The path is fixed when dispatch
//! starts, but a listener detached by an earlier handler is skipped.
//! Hover is translated into enter/leave pairs on item nodes.

use popmenu_core::{EventResponse, MenuKey, MenuSession, NodeId, Point, PointerEvent, PointerPhase};

use crate::scene::Scene;

/// Tracks the node under the pointer between moves.
#[derive(Debug, Default)]
pub struct PointerState {
    hovered: Option<NodeId>,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }
}

/// Deliver a press or release on `target` to every listener on its path.
pub fn dispatch_pointer(session: &mut MenuSession<Scene>, phase: PointerPhase, target: NodeId) -> EventResponse {
    let path = session.host().ancestors(target);
    let mut response = EventResponse::IGNORED;
    for node in path {
        if !session.host().is_listening(node) {
            continue;
        }
        let result = session.handle_pointer(PointerEvent::new(phase, target, node));
        response.prevent_default |= result.prevent_default;
        if result.stop_propagation {
            response.stop_propagation = true;
            break;
        }
    }
    tracing::trace!(?phase, ?target, prevent_default = response.prevent_default, "Dispatched pointer event");
    response
}

/// Press and release at `point`, as a click does.
pub fn click_at(session: &mut MenuSession<Scene>, point: Point) {
    let target = session.host().hit_test(point);
    dispatch_pointer(session, PointerPhase::Down, target);
    // The press may have replaced the node under the pointer.
    let target = session.host().hit_test(point);
    dispatch_pointer(session, PointerPhase::Up, target);
}

/// Press and release on `target` without moving the pointer.
pub fn click_node(session: &mut MenuSession<Scene>, target: NodeId) {
    dispatch_pointer(session, PointerPhase::Down, target);
    if session.host().contains(target) {
        dispatch_pointer(session, PointerPhase::Up, target);
    }
}

/// Move the pointer to `point`, emitting leave/enter on item nodes.
pub fn move_pointer(session: &mut MenuSession<Scene>, state: &mut PointerState, point: Point) {
    let target = session.host().hit_test(point);
    hover_node(session, state, target);
}

/// Move the pointer onto `target`.
pub fn hover_node(session: &mut MenuSession<Scene>, state: &mut PointerState, target: NodeId) {
    let previous = state.hovered.filter(|&n| session.host().contains(n));
    state.hovered = Some(target);
    if previous == Some(target) {
        return;
    }

    let old_items = previous.map(|n| item_chain(session.host(), n)).unwrap_or_default();
    let new_items = item_chain(session.host(), target);

    // Innermost first for leave, outermost first for enter.
    for &item in old_items.iter().filter(|n| !new_items.contains(n)) {
        if session.host().contains(item) {
            session.handle_pointer(PointerEvent::leave(item, Some(target)));
        }
    }
    for &item in new_items.iter().rev().filter(|n| !old_items.contains(n)) {
        if session.host().contains(item) {
            session.handle_pointer(PointerEvent::enter(item));
        }
    }
}

/// Deliver a key press to the session if its key listener is attached.
pub fn dispatch_key(session: &mut MenuSession<Scene>, key: MenuKey) -> EventResponse {
    if !session.host().is_key_listening() {
        return EventResponse::IGNORED;
    }
    session.handle_key(key)
}

/// Item nodes on the path from `node` to the root, innermost first.
fn item_chain(scene: &Scene, node: NodeId) -> Vec<NodeId> {
    scene
        .ancestors(node)
        .into_iter()
        .filter(|&n| scene.node(n).is_some_and(|s| s.item_spec().is_some()))
        .collect()
}
