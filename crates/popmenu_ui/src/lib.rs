//! In-memory visual tree, input dispatch and text rendering for popmenu.

pub mod input;
pub mod layout;
pub mod render;
pub mod scene;


pub use input::{click_at, click_node, dispatch_key, dispatch_pointer, hover_node, move_pointer, PointerState};
pub use render::render_outline;
pub use scene::{Scene, SceneNode, SceneNodeKind};
