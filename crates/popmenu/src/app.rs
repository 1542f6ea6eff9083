//! Demo application: one menu session over an in-memory scene.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Deserialize;

use popmenu_core::{
    MenuError, MenuId, MenuItem, MenuKey, MenuSession, MenuTree, Point, SessionConfig, SharedSession, Size,
};
use popmenu_ui::{click_at, click_node, dispatch_key, hover_node, move_pointer, render_outline, PointerState, Scene};

use crate::app_menus;

/// Actions fired by chosen menu items, in order.
pub type ActionLog = Arc<Mutex<Vec<String>>>;

/// One scripted interaction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// Open the document context menu at a point.
    Context { x: f32, y: f32 },
    /// Press and release at a point.
    Click { x: f32, y: f32 },
    /// Press and release on the item with this label.
    ClickLabel { label: String },
    /// Move the pointer to a point.
    Hover { x: f32, y: f32 },
    /// Move the pointer onto the item with this label.
    HoverLabel { label: String },
    /// Press a navigation key.
    Key { key: MenuKey },
    /// Open the first menu bar entry.
    FocusMenubar,
}

/// Root application state for the demo driver.
pub struct DemoApp {
    session: SharedSession<Scene>,
    context_menu: MenuId,
    pointer: PointerState,
    actions: ActionLog,
}

impl DemoApp {
    /// Build the menus, install the menu bar and wire item actions.
    pub fn new(config: SessionConfig, viewport: Size) -> Result<Self, MenuError> {
        let mut tree = MenuTree::new();
        let menubar = tree.build(&app_menus::app_menubar());
        let context_menu = tree.build(&app_menus::document_context_menu());

        let actions = ActionLog::default();
        register_actions(&mut tree, menubar, &actions)?;
        register_actions(&mut tree, context_menu, &actions)?;

        let mut session = MenuSession::with_tree(Scene::new(viewport), tree, config);
        session.on_menu_done(|item| match item {
            Some(item) => tracing::info!(label = item.label_text(), "Menu selection finished"),
            None => tracing::debug!("Menu dismissed"),
        });
        session.set_application_menu(Some(menubar), None, None)?;

        tracing::info!(?menubar, ?context_menu, "Demo application ready");
        Ok(Self { session: session.into_shared(), context_menu, pointer: PointerState::new(), actions })
    }

    /// Apply one scripted step.
    pub fn run_step(&mut self, step: &Step) -> Result<(), MenuError> {
        let mut guard = self.session.lock();
        let session = &mut *guard;
        tracing::debug!(?step, "Running step");

        match step {
            Step::Context { x, y } => session.popup(self.context_menu, *x, *y)?,
            Step::Click { x, y } => click_at(session, Point::new(*x, *y)),
            Step::ClickLabel { label } => {
                if let Some(target) = labelled_button(session, label) {
                    click_node(session, target);
                }
            }
            Step::Hover { x, y } => move_pointer(session, &mut self.pointer, Point::new(*x, *y)),
            Step::HoverLabel { label } => {
                if let Some(target) = labelled_button(session, label) {
                    hover_node(session, &mut self.pointer, target);
                }
            }
            Step::Key { key } => {
                dispatch_key(session, *key);
            }
            Step::FocusMenubar => {
                session.focus_menubar();
            }
        }
        Ok(())
    }

    /// Text outline of the scene.
    pub fn outline(&self) -> String {
        render_outline(self.session.lock().host())
    }

    /// Actions fired so far.
    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().clone()
    }
}

/// Button of the displayed item labelled `label`.
fn labelled_button(session: &MenuSession<Scene>, label: &str) -> Option<popmenu_core::NodeId> {
    let scene = session.host();
    let found = scene.find_item_by_label(label).and_then(|item| scene.button_of(item));
    if found.is_none() {
        tracing::warn!(label, "No displayed item with this label");
    }
    found
}

/// Attach a click handler recording the action id to every item below `menu`.
fn register_actions(tree: &mut MenuTree, menu: MenuId, log: &ActionLog) -> Result<(), MenuError> {
    let mut stack = vec![menu];
    while let Some(current) = stack.pop() {
        for item in tree.items_of(current).to_vec() {
            let Some(entry) = tree.item(item) else {
                continue;
            };
            if let Some(submenu) = entry.submenu_id() {
                stack.push(submenu);
            }
            let Some(action) = entry.action_id().map(String::from) else {
                continue;
            };
            let sink = log.clone();
            tree.set_click(
                item,
                Some(Arc::new(move |chosen: &MenuItem| {
                    tracing::info!(action = %action, checked = chosen.is_checked(), "Action fired");
                    sink.lock().push(action.clone());
                })),
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> DemoApp {
        DemoApp::new(SessionConfig::default(), Size::new(1280.0, 800.0)).unwrap()
    }

    #[test]
    fn test_steps_deserialize() {
        let steps: Vec<Step> = serde_json::from_str(
            r#"[{ "step": "click_label", "label": "File" }, { "step": "key", "key": "down" }, { "step": "focus_menubar" }]"#,
        )
        .unwrap();
        assert_eq!(steps[0], Step::ClickLabel { label: "File".into() });
        assert_eq!(steps[1], Step::Key { key: MenuKey::Down });
        assert_eq!(steps[2], Step::FocusMenubar);
    }

    #[test]
    fn test_menubar_choice_fires_action() {
        let mut app = app();
        app.run_step(&Step::ClickLabel { label: "Edit".into() }).unwrap();
        app.run_step(&Step::ClickLabel { label: "Copy".into() }).unwrap();
        assert_eq!(app.actions(), vec!["copy".to_string()]);
    }

    #[test]
    fn test_context_menu_submenu_by_hover() {
        let mut app = app();
        app.run_step(&Step::Context { x: 300.0, y: 200.0 }).unwrap();
        app.run_step(&Step::HoverLabel { label: "Transform".into() }).unwrap();
        assert!(app.outline().contains("Make Upper Case"));

        app.run_step(&Step::ClickLabel { label: "Make Upper Case".into() }).unwrap();
        assert_eq!(app.actions(), vec!["upper_case".to_string()]);
        assert!(!app.outline().contains("Make Upper Case"));
    }

    #[test]
    fn test_keyboard_toggles_checkbox() {
        let mut app = app();
        app.run_step(&Step::FocusMenubar).unwrap();
        app.run_step(&Step::Key { key: MenuKey::Right }).unwrap();
        app.run_step(&Step::Key { key: MenuKey::Right }).unwrap();
        app.run_step(&Step::Key { key: MenuKey::Down }).unwrap();
        app.run_step(&Step::Key { key: MenuKey::Enter }).unwrap();
        assert_eq!(app.actions(), vec!["toggle_sidebar".to_string()]);
    }
}
