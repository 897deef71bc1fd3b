//! Behavioral guarantees of the editing engine
//!
//! History shape, resize wrapping, drop placement and read-only redirects.

use easel_editor::{
    ContentSurface, Editor, EditorConfig, InsertMode, Key, Modifiers, NodeId, PointerEvent, Rect, Size,
};

fn editor(markup: &str) -> Editor {
    Editor::new(EditorConfig::default(), ContentSurface::from_markup(markup).unwrap())
}

fn find(editor: &Editor, selector: &str) -> NodeId {
    let surface = editor.surface();
    surface
        .tree()
        .query_selector(surface.body(), selector)
        .unwrap_or_else(|| panic!("no match for {selector}"))
}

fn count(editor: &Editor, selector: &str) -> usize {
    let surface = editor.surface();
    surface.tree().query_selector_all(surface.body(), selector).len()
}

fn texts(editor: &Editor, parent: NodeId) -> Vec<String> {
    let tree = editor.surface().tree();
    tree.element_children(parent)
        .into_iter()
        .map(|c| tree.text_content(c))
        .collect()
}

// ============================================================================
// HISTORY
// ============================================================================

#[test]
fn test_undo_then_redo_returns_to_start() {
    let mut editor = editor("<p>0</p>");
    for i in 1..=6 {
        editor.insert_markup(&format!("<p>{i}</p>"), "body", InsertMode::Append);
    }
    let before = editor.surface().snapshot();

    for _ in 0..4 {
        assert!(editor.undo());
    }
    assert_eq!(count(&editor, "p"), 3);
    for _ in 0..4 {
        assert!(editor.redo());
    }
    assert_eq!(editor.surface().snapshot(), before);
    assert!(!editor.redo());
}

#[test]
fn test_new_checkpoint_clears_redo() {
    let mut editor = editor("<p>0</p>");
    editor.insert_markup("<p>1</p>", "body", InsertMode::Append);
    editor.insert_markup("<p>2</p>", "body", InsertMode::Append);
    editor.undo();
    assert!(editor.history().can_redo());

    editor.insert_markup("<p>other</p>", "body", InsertMode::Append);
    assert!(!editor.redo());
    assert_eq!(editor.surface().snapshot(), "<p>0</p><p>1</p><p>other</p>");
}

#[test]
fn test_history_is_bounded() {
    let mut editor = editor("");
    let mut states = vec![editor.surface().snapshot()];
    for i in 0..150 {
        editor.insert_markup(&format!("<i>{i}</i>"), "body", InsertMode::Append);
        states.push(editor.surface().snapshot());
    }
    assert_eq!(editor.history().undo_len(), 100);

    let mut steps = 0;
    while editor.undo() {
        steps += 1;
    }
    assert_eq!(steps, 99);
    assert_eq!(editor.surface().snapshot(), states[states.len() - 100]);
}

#[test]
fn test_undo_on_fresh_editor_is_noop() {
    let mut editor = editor("<p>x</p>");
    assert!(!editor.undo());
    assert!(!editor.redo());
    assert_eq!(editor.surface().snapshot(), "<p>x</p>");
}

// ============================================================================
// RESIZE
// ============================================================================

#[test]
fn test_attach_twice_keeps_one_wrapper() {
    let mut editor = editor("<div><img src=\"a.png\"></div>");
    let img = find(&editor, "img");
    assert!(editor.select(img));
    assert!(editor.attach_handles(img));
    assert!(editor.attach_handles(img));

    assert_eq!(count(&editor, ".resize-wrapper"), 1);
    assert_eq!(count(&editor, ".resize-handle"), 4);
    assert_eq!(count(&editor, "img"), 1);
}

#[test]
fn test_deselect_restores_position() {
    let mut editor = editor("<div id=\"p\"><h1>a</h1><p>b</p><img src=\"x.png\"><p>c</p></div>");
    let parent = find(&editor, "#p");
    let img = find(&editor, "img");

    editor.click(Some(img));
    let wrapper = find(&editor, ".resize-wrapper");
    assert_eq!(editor.surface().tree().element_index(wrapper), Some(2));

    let h1 = find(&editor, "h1");
    editor.click(Some(h1));

    let tree = editor.surface().tree();
    assert_eq!(tree.element_child_at(parent, 2), Some(img));
    assert_eq!(count(&editor, "img"), 1);
    assert_eq!(count(&editor, ".resize-wrapper"), 0);
    assert_eq!(editor.history().undo_len(), 1);
}

#[test]
fn test_ratio_locked_resize() {
    let mut editor = editor("<p>x</p><img src=\"a.png\">");
    let img = find(&editor, "img");
    editor
        .surface_mut()
        .tree_mut()
        .set_layout_box(img, Rect::from_xywh(0.0, 0.0, 100.0, 50.0));
    editor.click(Some(img));

    let handle = find(&editor, ".resize-handle.bottom-right");
    assert!(editor.pointer_down(PointerEvent::new(100.0, 50.0, Some(handle))));
    editor.pointer_move(PointerEvent::new(100.0, 60.0, None).with_modifiers(Modifiers::ctrl()));
    editor.pointer_move(PointerEvent::new(100.0, 75.0, None).with_modifiers(Modifiers::ctrl()));
    assert!(editor.pointer_up(PointerEvent::new(100.0, 75.0, None)));

    let style = editor.surface().tree().style(img).unwrap();
    assert_eq!(style.get("width"), Some("150px"));
    assert_eq!(style.get("height"), Some("75px"));
    assert!(style.is_important("width"));
    assert_eq!(editor.history().undo_len(), 2);
}

#[test]
fn test_resized_image_keeps_wrapper_after_deselect() {
    let mut editor = editor("<p>x</p><img src=\"a.png\">");
    let img = find(&editor, "img");
    editor
        .surface_mut()
        .tree_mut()
        .set_layout_box(img, Rect::from_xywh(0.0, 0.0, 100.0, 50.0));
    editor.click(Some(img));

    let handle = find(&editor, ".resize-handle.top-left");
    editor.pointer_down(PointerEvent::new(0.0, 0.0, Some(handle)));
    editor.pointer_move(PointerEvent::new(-30.0, 5.0, None));
    editor.pointer_up(PointerEvent::new(-30.0, 5.0, None));
    assert_eq!(editor.surface().tree().style(img).unwrap().get("width"), Some("130px"));

    editor.click(Some(find(&editor, "p")));
    assert_eq!(count(&editor, ".resize-wrapper"), 1);
    assert_eq!(editor.surface().clean_inner(), "<p>x</p><img src=\"a.png\" style=\"width: 130px !important; height: 50px !important; display: block !important; max-width: none !important; max-height: none !important; box-sizing: border-box !important;\" />");
}

#[test]
fn test_wrapper_from_history_unwraps_on_deselect() {
    let mut editor = editor("<p id=\"a\">a</p><img src=\"x.png\"><p id=\"b\">b</p>");
    let img = find(&editor, "img");
    editor.click(Some(img));
    let a = find(&editor, "#a");
    assert!(editor.commit_text(a, "one"));
    assert!(editor.commit_text(a, "two"));

    assert!(editor.undo());
    assert_eq!(count(&editor, ".resize-wrapper"), 1);

    let img = find(&editor, "img");
    editor.click(Some(img));
    editor.click(Some(find(&editor, "#b")));

    assert_eq!(count(&editor, ".resize-wrapper"), 0);
    assert_eq!(count(&editor, ".resize-handle"), 0);
    let body = editor.surface().body();
    assert_eq!(editor.surface().tree().element_child_at(body, 1), Some(img));
    assert!(!editor.surface().snapshot().contains("resize-wrapper"));
}

#[test]
fn test_resized_wrapper_survives_undo() {
    let mut editor = editor("<p>x</p><img src=\"a.png\">");
    let img = find(&editor, "img");
    editor
        .surface_mut()
        .tree_mut()
        .set_layout_box(img, Rect::from_xywh(0.0, 0.0, 100.0, 50.0));
    editor.click(Some(img));
    let handle = find(&editor, ".resize-handle.bottom-right");
    editor.pointer_down(PointerEvent::new(100.0, 50.0, Some(handle)));
    editor.pointer_move(PointerEvent::new(140.0, 50.0, None));
    assert!(editor.pointer_up(PointerEvent::new(140.0, 50.0, None)));

    let p = find(&editor, "p");
    assert!(editor.commit_text(p, "y"));
    assert!(editor.undo());

    let img = find(&editor, "img");
    editor.click(Some(img));
    editor.click(Some(find(&editor, "p")));
    assert_eq!(count(&editor, ".resize-wrapper"), 1);
    assert_eq!(editor.surface().tree().style(img).unwrap().get("width"), Some("140px"));
    assert!(!editor.surface().clean_inner().contains("data-easel-resized"));
}

#[test]
fn test_handle_of_unselected_image_is_ignored() {
    let mut editor = editor(
        "<p>x</p><div class=\"resize-wrapper\"><img src=\"a.png\"><div class=\"resize-handle bottom-right\" data-position=\"bottom-right\"></div></div>",
    );
    editor.click(Some(find(&editor, "p")));
    let handle = find(&editor, ".resize-handle");
    assert!(!editor.pointer_down(PointerEvent::new(0.0, 0.0, Some(handle))));
    assert!(editor.resize_drag().is_none());
}

// ============================================================================
// DRAG
// ============================================================================

#[test]
fn test_drop_on_self_or_descendant_is_rejected() {
    let mut editor = editor("<div id=\"box\"><p>inner</p></div><p>after</p>");
    let div = find(&editor, "#box");
    let inner = find(&editor, "#box p");
    let before = editor.surface().snapshot();
    editor.click(Some(div));

    for target in [div, inner] {
        assert!(editor.pointer_down(PointerEvent::new(0.0, 0.0, Some(div))));
        assert!(editor.ghost().is_some());
        assert!(!editor.pointer_up(PointerEvent::new(0.0, 0.0, Some(target))));

        assert!(editor.ghost().is_none());
        assert_eq!(editor.surface().snapshot(), before);
        assert_eq!(editor.history().undo_len(), 1);
        assert!(!editor.surface().markup().contains("easel-ghost"));
    }
}

#[test]
fn test_list_reorder_uses_midpoint() {
    for (y, expected) in [(45.0, ["b", "a", "c"]), (55.0, ["b", "c", "a"])] {
        let mut editor = editor("<ul><li>a</li><li>b</li><li>c</li></ul>");
        let ul = find(&editor, "ul");
        let items = editor.surface().tree().element_children(ul);
        for (i, &li) in items.iter().enumerate() {
            editor
                .surface_mut()
                .tree_mut()
                .set_layout_box(li, Rect::from_xywh(0.0, i as f64 * 20.0, 100.0, 20.0));
        }

        editor.click(Some(items[0]));
        assert!(editor.pointer_down(PointerEvent::new(5.0, 10.0, Some(items[0]))));
        editor.pointer_move(PointerEvent::new(5.0, y, Some(items[2])));
        assert!(editor.pointer_up(PointerEvent::new(5.0, y, Some(items[2]))));

        assert_eq!(texts(&editor, ul), expected);
        assert_eq!(editor.selection(), Some(items[0]));
        assert_eq!(editor.history().undo_len(), 2);
    }
}

#[test]
fn test_escape_cancels_drag() {
    let mut editor = editor("<p id=\"a\">a</p><p id=\"b\">b</p>");
    let a = find(&editor, "#a");
    let b = find(&editor, "#b");
    editor.click(Some(a));

    editor.pointer_down(PointerEvent::new(0.0, 0.0, Some(a)));
    editor.pointer_move(PointerEvent::new(0.0, 30.0, Some(b)));
    assert!(editor.surface().tree().has_attribute(b, "data-easel-drop-target"));

    assert!(editor.key_down(Key::Escape));
    assert!(editor.ghost().is_none());
    assert!(!editor.surface().tree().has_attribute(b, "data-easel-drop-target"));
    assert!(!editor.pointer_up(PointerEvent::new(0.0, 30.0, Some(b))));
    assert_eq!(editor.surface().snapshot(), "<p id=\"a\">a</p><p id=\"b\">b</p>");
}

// ============================================================================
// READ-ONLY REDIRECT
// ============================================================================

#[test]
fn test_locked_node_redirects_to_editable_ancestor() {
    let config = EditorConfig {
        read_only: vec![".locked".to_string()],
        editable: vec![".card".to_string()],
        ..EditorConfig::default()
    };
    let surface =
        ContentSurface::from_markup("<div class=\"card\"><header class=\"locked\"><h1>t</h1></header></div>").unwrap();
    let mut editor = Editor::new(config, surface);
    let card = find(&editor, ".card");
    let h1 = find(&editor, "h1");

    assert!(editor.click(Some(h1)));
    assert_eq!(editor.selection(), Some(card));
    assert_eq!(editor.history().undo_len(), 1);
}

#[test]
fn test_locked_node_without_fallback_is_ignored() {
    let config = EditorConfig { read_only: vec![".locked".to_string()], ..EditorConfig::default() };
    let surface = ContentSurface::from_markup("<p class=\"locked\">t</p><p id=\"free\">f</p>").unwrap();
    let mut editor = Editor::new(config, surface);

    assert!(!editor.click(Some(find(&editor, ".locked"))));
    assert!(editor.selection().is_none());

    editor.click(Some(find(&editor, "#free")));
    assert!(!editor.click(Some(find(&editor, ".locked"))));
    assert_eq!(editor.selection(), Some(find(&editor, "#free")));
    assert!(editor.frame(Size::new(800.0, 600.0), Size::new(10.0, 10.0)).is_none());
}

#[test]
fn test_locked_node_falls_back_to_default() {
    let config = EditorConfig {
        read_only: vec![".locked".to_string()],
        default_selected: Some("#main".to_string()),
        ..EditorConfig::default()
    };
    let surface = ContentSurface::from_markup("<p class=\"locked\">t</p><main id=\"main\"></main>").unwrap();
    let mut editor = Editor::new(config, surface);

    editor.click(Some(find(&editor, ".locked")));
    assert_eq!(editor.selection(), Some(find(&editor, "#main")));
}
