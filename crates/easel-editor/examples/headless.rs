//! Example: driving the editor without a host UI
//!
//! Run with `RUST_LOG=debug` to watch the state transitions.

use anyhow::Context;
use easel_editor::{
    Command, ContentSurface, DragPayload, Editor, EditorConfig, EditorEvent, Modifiers, PointerEvent, Rect,
};
use tracing_subscriber::EnvFilter;

const PAGE: &str = r#"
<header class="locked"><h1>Quarterly report</h1></header>
<section class="card">
  <p>Intro paragraph</p>
  <img src="chart.png" width="200" height="100">
  <ul><li>First</li><li>Second</li><li>Third</li></ul>
</section>
"#;

const CATALOG: &str = r#"[
    { "category": "Text", "label": "Heading", "content": "<h2>New heading</h2>" },
    { "category": "Media", "label": "Image", "content": { "type": "img" } }
]"#;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = EditorConfig::from_json(r#"{ "read_only": [".locked"], "editable": [".card"] }"#)
        .context("editor config")?;
    let surface = ContentSurface::from_markup(PAGE).context("initial content")?;
    let mut editor = Editor::new(config, surface);
    editor.register_blocks_json(CATALOG);

    let body = editor.surface().body();
    let find = |editor: &Editor, selector: &str| {
        editor
            .surface()
            .tree()
            .query_selector(body, selector)
            .with_context(|| format!("no node matches {selector}"))
    };

    // Clicking the locked heading lands on the editable card
    let heading = find(&editor, "h1")?;
    editor.click(Some(heading));
    println!("selected after locked click: {:?}", editor.selection());

    // Resize the image from its bottom-right handle with the ratio locked
    let image = find(&editor, "img")?;
    editor.click(Some(image));
    let handle = find(&editor, ".resize-handle.bottom-right")?;
    editor.pointer_down(PointerEvent::new(200.0, 100.0, Some(handle)));
    editor.pointer_move(PointerEvent::new(200.0, 150.0, None).with_modifiers(Modifiers::ctrl()));
    editor.pointer_up(PointerEvent::new(200.0, 150.0, None));

    // Drag the first list item below the third
    let items = editor.surface().tree().query_selector_all(body, "li");
    for (i, &li) in items.iter().enumerate() {
        editor
            .surface_mut()
            .tree_mut()
            .set_layout_box(li, Rect::from_xywh(0.0, 300.0 + i as f64 * 20.0, 200.0, 20.0));
    }
    editor.click(Some(items[0]));
    editor.pointer_down(PointerEvent::new(10.0, 310.0, Some(items[0])));
    editor.pointer_move(PointerEvent::new(10.0, 355.0, Some(items[2])));
    editor.pointer_up(PointerEvent::new(10.0, 355.0, Some(items[2])));

    // Drop a heading from the catalog, then copy it
    editor.clear_selection();
    editor.drop_payload(DragPayload::Block(0), None);
    let added = find(&editor, "h2")?;
    editor.click(Some(added));
    editor.handle_command(Command::Copy);

    for event in editor.drain_events() {
        if let EditorEvent::Copied(markup) = event {
            println!("copied: {markup}");
        }
    }

    println!("undo steps available: {}", editor.history().undo_len() - 1);
    let saved = editor.export();
    println!("{}", saved.to_json().context("serialize export")?);
    Ok(())
}
