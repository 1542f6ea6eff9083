//! Menu definitions for the demo application.
//!
//! Defines the application menu bar (File, Edit, View, etc.) and the
//! context menu shown over the document area.

use popmenu_core::{MenuItemSettings, MenuSettings};

fn action(label: &str, action: &str, accelerator: Option<&str>) -> MenuItemSettings {
    MenuItemSettings {
        label: label.into(),
        action: Some(action.into()),
        accelerator: accelerator.map(String::from),
        ..Default::default()
    }
}

fn checkbox(label: &str, action_id: &str, checked: bool) -> MenuItemSettings {
    MenuItemSettings { kind: Some("checkbox".into()), checked, ..action(label, action_id, None) }
}

fn radio(label: &str, action_id: &str, checked: bool) -> MenuItemSettings {
    MenuItemSettings { kind: Some("radio".into()), checked, ..action(label, action_id, None) }
}

fn separator() -> MenuItemSettings {
    MenuItemSettings { kind: Some("separator".into()), ..Default::default() }
}

fn submenu(label: &str, items: Vec<MenuItemSettings>) -> MenuItemSettings {
    MenuItemSettings {
        label: label.into(),
        submenu: Some(MenuSettings { kind: None, items }),
        ..Default::default()
    }
}

/// Build the application menu bar description.
pub fn app_menubar() -> MenuSettings {
    MenuSettings {
        kind: Some("menubar".into()),
        items: vec![
            // File menu
            submenu(
                "File",
                vec![
                    action("New Document", "new_document", Some("CmdOrCtrl+N")),
                    action("Open...", "open", Some("CmdOrCtrl+O")),
                    separator(),
                    action("Close Window", "close_window", Some("CmdOrCtrl+W")),
                    action("Quit", "quit", Some("CmdOrCtrl+Q")),
                ],
            ),
            // Edit menu
            submenu(
                "Edit",
                vec![
                    action("Undo", "undo", Some("CmdOrCtrl+Z")),
                    action("Redo", "redo", Some("CmdOrCtrl+Shift+Z")),
                    separator(),
                    action("Cut", "cut", Some("CmdOrCtrl+X")),
                    action("Copy", "copy", Some("CmdOrCtrl+C")),
                    action("Paste", "paste", Some("CmdOrCtrl+V")),
                    separator(),
                    action("Select All", "select_all", Some("CmdOrCtrl+A")),
                ],
            ),
            // View menu
            submenu(
                "View",
                vec![
                    checkbox("Show Sidebar", "toggle_sidebar", true),
                    checkbox("Show Status Bar", "toggle_status_bar", false),
                    separator(),
                    submenu(
                        "Editor Layout",
                        vec![
                            radio("Single", "layout_single", true),
                            radio("Split Right", "layout_split_right", false),
                            radio("Split Down", "layout_split_down", false),
                        ],
                    ),
                ],
            ),
            // Window menu
            submenu(
                "Window",
                vec![
                    action("Minimize", "minimize", Some("CmdOrCtrl+M")),
                    action("Zoom", "zoom", None),
                    MenuItemSettings { enabled: false, ..action("Bring All to Front", "front", None) },
                ],
            ),
            // Help menu
            submenu("Help", vec![action("About popmenu", "about", None)]),
        ],
    }
}

/// Build the document context menu description.
pub fn document_context_menu() -> MenuSettings {
    MenuSettings {
        kind: Some("contextmenu".into()),
        items: vec![
            action("Cut", "cut", Some("CmdOrCtrl+X")),
            action("Copy", "copy", Some("CmdOrCtrl+C")),
            action("Paste", "paste", Some("CmdOrCtrl+V")),
            separator(),
            submenu(
                "Transform",
                vec![
                    action("Make Upper Case", "upper_case", None),
                    action("Make Lower Case", "lower_case", None),
                ],
            ),
            separator(),
            action("Select All", "select_all", Some("CmdOrCtrl+A")),
        ],
    }
}
