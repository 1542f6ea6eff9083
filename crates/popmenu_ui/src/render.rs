//! Plain-text outline of a scene, one line per node.

use std::fmt::Write;

use popmenu_core::{Anchor, Host, ItemKind, ItemNodeSpec, MenuKind, NodeId};
use unicode_segmentation::UnicodeSegmentation;

use crate::scene::{Scene, SceneNodeKind};

/// Column labels are padded to before the accelerator.
const LABEL_COLUMN: usize = 24;

/// Render the attached tree below the root.
///
/// Hidden popups are listed without their items. Item markers:
/// `>` highlighted, `x` checked, `~` disabled, `+` submenu open.
pub fn render_outline(scene: &Scene) -> String {
    let mut out = String::new();
    render_node(scene, scene.root(), 0, &mut out);
    out
}

fn render_node(scene: &Scene, node: NodeId, depth: usize, out: &mut String) {
    let Some(n) = scene.node(node) else {
        return;
    };
    let indent = "  ".repeat(depth);
    let descend = match &n.kind {
        SceneNodeKind::Root => {
            let size = scene.viewport();
            let _ = writeln!(out, "{indent}root {}x{}", size.width, size.height);
            true
        }
        SceneNodeKind::Surface { label, .. } => {
            let _ = writeln!(out, "{indent}surface {label}");
            true
        }
        SceneNodeKind::Overlay { z_layer } => {
            let _ = writeln!(out, "{indent}overlay z={z_layer} top={}", n.overlay_top);
            true
        }
        SceneNodeKind::Menu(spec) => {
            let rect = scene.bounding_rect(node);
            let kind = match (spec.kind, spec.menubar_submenu, spec.submenu) {
                (MenuKind::Menubar, _, _) => "menubar",
                (_, true, _) => "dropdown",
                (_, _, true) => "submenu",
                _ => "menu",
            };
            let anchor = match n.placement.map(|p| p.anchor) {
                Some(Anchor::Right) => " right",
                _ => "",
            };
            let state = if n.is_visible() { "" } else { " hidden" };
            let _ = writeln!(out, "{indent}{kind} @{},{}{anchor}{state}", rect.x, rect.y);
            n.is_visible()
        }
        SceneNodeKind::Item(spec) => {
            let _ = writeln!(out, "{indent}{}", item_line(spec, n.active, n.submenu_active));
            true
        }
        SceneNodeKind::Button => true,
    };

    if descend {
        let child_depth = if n.kind == SceneNodeKind::Button { depth } else { depth + 1 };
        for child in scene.children(node) {
            render_node(scene, child, child_depth, out);
        }
    }
}

fn item_line(spec: &ItemNodeSpec, active: bool, submenu_active: bool) -> String {
    if spec.kind == ItemKind::Separator {
        return "----".to_string();
    }
    let mut marks = String::new();
    marks.push(if active { '>' } else { ' ' });
    marks.push(if spec.checked { 'x' } else { ' ' });
    marks.push(if spec.enabled { ' ' } else { '~' });

    let mut line = format!("{marks} {}", pad(&spec.label, LABEL_COLUMN));
    if let Some(accelerator) = &spec.accelerator {
        line.push_str(accelerator);
    }
    if spec.has_submenu {
        line.push_str(if submenu_active { " [+]" } else { " [ ]" });
    }
    line.trim_end().to_string()
}

/// Pad `text` with spaces to `width` grapheme clusters.
pub fn pad(text: &str, width: usize) -> String {
    let len = text.graphemes(true).count();
    let mut padded = text.to_string();
    padded.extend(std::iter::repeat(' ').take(width.saturating_sub(len)));
    padded
}

#[cfg(test)]
mod tests {
    use super::*;
    use popmenu_core::{ItemId, MenuId, MenuNodeSpec, Placement, Size};

    #[test]
    fn test_pad_counts_graphemes() {
        assert_eq!(pad("e\u{301}", 3), "e\u{301}  ");
        assert_eq!(pad("long", 2), "long");
    }

    #[test]
    fn test_outline_lists_visible_items() {
        let mut scene = Scene::new(Size::new(400.0, 300.0));
        let menu = scene.create_menu_node(&MenuNodeSpec {
            menu: MenuId::default(),
            kind: MenuKind::Contextmenu,
            submenu: false,
            menubar_submenu: false,
        });
        let item = scene.create_item_node(&ItemNodeSpec {
            item: ItemId::default(),
            kind: ItemKind::Checkbox,
            label: "Wrap".to_string(),
            icon: None,
            icon_is_template: false,
            tooltip: String::new(),
            accelerator: Some("Alt+Z".to_string()),
            checked: true,
            enabled: true,
            has_submenu: false,
            menubar_top_level: false,
        });
        scene.append_child(menu, item);
        let root = scene.root();
        scene.append_child(root, menu);
        scene.set_placement(menu, Placement { x: 10.0, y: 20.0, anchor: Anchor::Left });

        let hidden = render_outline(&scene);
        assert!(hidden.contains("menu @10,20 hidden"));
        assert!(!hidden.contains("Wrap"));

        scene.set_shown(menu, true);
        scene.set_active(item, true);
        let outline = render_outline(&scene);
        assert!(outline.contains(">x  Wrap"));
        assert!(outline.contains("Alt+Z"));
    }
}
