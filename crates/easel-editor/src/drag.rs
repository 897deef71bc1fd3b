//! Drag Reorder
//!
//! Two protocols share one drop surface:
//! - moving the selected node, previewed by a ghost clone that follows
//!   the pointer and never takes part in snapshots
//! - dropping a payload: a catalog entry by index, or the current
//!   selection
//!
//! Placement is decided before anything moves, so a rejected drop never
//! leaves a partial edit behind.

use easel_dom::{DomTree, NodeId};

use crate::collaborators::{AssetReason, AssetRequest};
use crate::editor::parse_detached;
use crate::resize::{OriginalPosition, image_in, wrapper_of};
use crate::selection::element_for;
use crate::{DROP_TARGET_ATTR, Editor, EditorError, EditorEvent, EditorResult, GHOST_CLASS, HIGHLIGHT_ATTR, WRAPPER_CLASS};

/// Longest text preview shown in a ghost
const PREVIEW_CHARS: usize = 30;

const VOID_TAGS: &[&str] = &["area", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "wbr"];

const GHOST_STYLE: &[(&str, &str)] = &[
    ("position", "absolute"),
    ("opacity", "0.5"),
    ("pointer-events", "none"),
    ("z-index", "9999"),
    ("box-shadow", "0 4px 12px rgba(0, 0, 0, 0.2)"),
    ("border", "1px dashed #696cff"),
    ("border-radius", "6px"),
    ("background", "#ffffff"),
    ("padding", "6px"),
    ("transform", "scale(1.02)"),
];

const GHOST_TEXT_STYLE: &[(&str, &str)] = &[
    ("font-size", "12px"),
    ("color", "#333"),
    ("max-width", "200px"),
    ("overflow", "hidden"),
    ("text-overflow", "ellipsis"),
    ("white-space", "nowrap"),
];

/// What a native drop carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPayload {
    /// Catalog entry index
    Block(usize),
    /// The current selection
    Selection,
}

/// Where a dropped node lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPlacement {
    Before(NodeId),
    After(NodeId),
}

impl DropPlacement {
    pub fn anchor(self) -> NodeId {
        match self {
            DropPlacement::Before(node) | DropPlacement::After(node) => node,
        }
    }

    fn apply(self, tree: &mut DomTree, node: NodeId) -> EditorResult<()> {
        match self {
            DropPlacement::Before(anchor) => {
                let parent = tree.parent(anchor).ok_or(EditorError::Detached(anchor))?;
                tree.insert_before(parent, node, Some(anchor))?;
            }
            DropPlacement::After(anchor) => tree.insert_after(anchor, node)?,
        }
        Ok(())
    }
}

/// Decide where `moving` goes when released over `target`.
///
/// Returns `None` for drops on the moving node or inside it, on the body,
/// or outside the content. A list item dropped inside a list lands before
/// or after the item under the pointer depending on which half `y` is
/// in; without a `y` or a layout box it lands after.
pub fn resolve_drop(
    tree: &DomTree,
    body: NodeId,
    moving: NodeId,
    target: NodeId,
    y: Option<f64>,
) -> Option<DropPlacement> {
    let mut target = element_for(tree, target)?;
    if let Some(wrapper) = tree.closest(target, &format!(".{WRAPPER_CLASS}")) {
        target = wrapper;
    }
    if target == body || !tree.contains(body, target) || tree.contains(moving, target) {
        return None;
    }

    if tree.is_tag(moving, "li") {
        let item = tree
            .closest(target, "li")
            .filter(|&li| tree.parent(li).is_some_and(|p| tree.is_tag(p, "ul") || tree.is_tag(p, "ol")));
        if let Some(item) = item {
            let above = match (y, tree.layout_box(item)) {
                (Some(y), Some(rect)) => y < rect.mid_y(),
                _ => false,
            };
            return Some(if above { DropPlacement::Before(item) } else { DropPlacement::After(item) });
        }
    }
    Some(DropPlacement::After(target))
}

/// In-flight move of the selected node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDrag {
    /// Node that moves: the selection, or the wrapper around it
    pub node: NodeId,
    pub ghost: Option<NodeId>,
    pub origin: (f64, f64),
    pub drop_target: Option<NodeId>,
}

impl NodeDrag {
    /// Remove the ghost and the drop marker
    pub(crate) fn discard(self, tree: &mut DomTree) {
        if let Some(ghost) = self.ghost {
            let _ = tree.destroy(ghost);
        }
        if let Some(target) = self.drop_target {
            tree.remove_attribute(target, DROP_TARGET_ATTR);
        }
    }
}

/// Build the pointer preview for `node` and park it at the end of `body`
fn build_ghost(tree: &mut DomTree, body: NodeId, node: NodeId, x: f64, y: f64) -> EditorResult<NodeId> {
    let data = tree.element(node).cloned().ok_or(EditorError::Detached(node))?;
    let image = if tree.is_tag(node, "img") { Some(node) } else { tree.query_selector(node, "img") };

    let ghost = if VOID_TAGS.contains(&data.tag.as_str()) {
        tree.create_element("div")
    } else {
        tree.create_element_with(data)
    };
    for marker in [HIGHLIGHT_ATTR, "draggable", "contenteditable", "id"] {
        tree.remove_attribute(ghost, marker);
    }
    tree.add_class(ghost, GHOST_CLASS)?;
    for (property, value) in GHOST_STYLE {
        tree.set_style(ghost, property, value, false)?;
    }

    match image {
        Some(image) => {
            let preview = tree.create_element("img");
            if let Some(src) = tree.get_attribute(image, "src").map(str::to_string) {
                tree.set_attribute(preview, "src", &src)?;
            }
            tree.set_style(preview, "max-height", "40px", false)?;
            tree.set_style(preview, "object-fit", "contain", false)?;
            tree.append_child(ghost, preview)?;
            tree.set_style(ghost, "width", "auto", false)?;
            tree.set_style(ghost, "height", "auto", false)?;
        }
        None => {
            let text = tree.text_content(node);
            let preview: String = text.trim().chars().take(PREVIEW_CHARS).collect();
            let preview = if preview.is_empty() { "Dragging...".to_string() } else { preview };
            let text = tree.create_text(&preview);
            tree.append_child(ghost, text)?;
            for (property, value) in GHOST_TEXT_STYLE {
                tree.set_style(ghost, property, value, false)?;
            }
        }
    }

    move_ghost(tree, ghost, x, y)?;
    tree.append_child(body, ghost)?;
    Ok(ghost)
}

fn move_ghost(tree: &mut DomTree, ghost: NodeId, x: f64, y: f64) -> EditorResult<()> {
    tree.set_style(ghost, "left", &format!("{x}px"), false)?;
    tree.set_style(ghost, "top", &format!("{y}px"), false)?;
    Ok(())
}

impl Editor {
    /// Active node drag, if any
    pub fn node_drag(&self) -> Option<&NodeDrag> {
        self.drag.as_ref()
    }

    /// The ghost preview of the active node drag
    pub fn ghost(&self) -> Option<NodeId> {
        self.drag.as_ref().and_then(|d| d.ghost)
    }

    /// Node that physically moves when the selection is dragged
    pub(crate) fn moving_node(&self, selection: NodeId) -> NodeId {
        wrapper_of(self.surface.tree(), selection).unwrap_or(selection)
    }

    pub(crate) fn begin_node_drag(&mut self, selection: NodeId, x: f64, y: f64) -> EditorResult<()> {
        let body = self.surface.body();
        let node = self.moving_node(selection);
        let ghost = build_ghost(self.surface.tree_mut(), body, selection, x, y)?;
        self.drag = Some(NodeDrag { node, ghost: Some(ghost), origin: (x, y), drop_target: None });
        self.tracker.stop();
        self.collaborators.popover.hide();
        tracing::debug!("Dragging {} (ghost {})", node, ghost);
        Ok(())
    }

    pub(crate) fn update_node_drag(&mut self, x: f64, y: f64, target: Option<NodeId>) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        let tree = self.surface.tree_mut();
        if let Some(ghost) = drag.ghost {
            let _ = move_ghost(tree, ghost, x, y);
        }

        let candidate = target
            .and_then(|t| element_for(tree, t))
            .filter(|&t| !tree.contains(drag.node, t))
            .filter(|&t| drag.ghost.is_none_or(|g| !tree.contains(g, t)));
        if candidate == drag.drop_target {
            return;
        }
        if let Some(old) = drag.drop_target.take() {
            tree.remove_attribute(old, DROP_TARGET_ATTR);
        }
        if let Some(new) = candidate {
            let _ = tree.set_attribute(new, DROP_TARGET_ATTR, "true");
        }
        drag.drop_target = candidate;
    }

    /// Finish a node drag over `target`. Returns whether anything moved.
    pub(crate) fn finish_node_drag(&mut self, y: f64, target: Option<NodeId>) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        let node = drag.node;
        drag.discard(self.surface.tree_mut());

        let moved = target.is_some_and(|target| self.place(node, target, Some(y)));
        if self.selection().is_some() {
            self.tracker.start();
        }
        moved
    }

    /// Abandon a node drag without touching the content
    pub(crate) fn cancel_node_drag(&mut self) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        drag.discard(self.surface.tree_mut());
        tracing::debug!("Drag cancelled");
        if self.selection().is_some() {
            self.tracker.start();
        }
        true
    }

    /// Move `node` relative to `target` and checkpoint
    fn place(&mut self, node: NodeId, target: NodeId, y: Option<f64>) -> bool {
        let body = self.surface.body();
        let Some(placement) = resolve_drop(self.surface.tree(), body, node, target, y) else {
            tracing::debug!("Drop of {} on {} rejected", node, target);
            return false;
        };
        if let Err(err) = placement.apply(self.surface.tree_mut(), node) {
            tracing::warn!("Drop of {} failed: {}", node, err);
            return false;
        }

        let tree = self.surface.tree();
        if tree.has_class(node, WRAPPER_CLASS) {
            if let (Some(image), Some(parent), Some(index)) =
                (image_in(tree, node), tree.parent(node), tree.element_index(node))
            {
                self.positions.relocate(image, OriginalPosition { parent, index });
            }
        }

        tracing::debug!("Moved {} ({:?})", node, placement);
        if let Some(current) = self.selection() {
            self.events.push(EditorEvent::ScrollIntoView(current));
        }
        self.checkpoint();
        true
    }

    /// Begin dragging a catalog entry. Only checks the index; the host
    /// carries the payload until the drop.
    pub fn start_catalog_drag(&mut self, index: usize) -> bool {
        if self.drag.is_some() || self.resize.is_some() {
            tracing::warn!("start_catalog_drag: {}", EditorError::GestureInProgress);
            return false;
        }
        if self.blocks.get(index).is_none() {
            tracing::warn!("start_catalog_drag: {}", EditorError::UnknownBlock(index));
            return false;
        }
        true
    }

    /// Handle a native drop on the surface
    pub fn drop_payload(&mut self, payload: DragPayload, target: Option<NodeId>) -> bool {
        if self.drag.is_some() || self.resize.is_some() {
            tracing::warn!("drop_payload: {}", EditorError::GestureInProgress);
            return false;
        }
        match payload {
            DragPayload::Block(index) => match self.insert_block(index) {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!("drop_payload: {}", err);
                    false
                }
            },
            DragPayload::Selection => {
                let Some(current) = self.selection() else {
                    tracing::warn!("drop_payload: {}", EditorError::NoSelection);
                    return false;
                };
                if self.lock.is_locked(self.surface.tree(), current) {
                    tracing::warn!("drop_payload: {}", EditorError::Locked(current));
                    return false;
                }
                let Some(target) = target else {
                    tracing::debug!("Selection dropped outside the content");
                    return false;
                };
                let node = self.moving_node(current);
                self.place(node, target, None)
            }
        }
    }

    /// Instantiate a catalog entry into the selection (or the body)
    fn insert_block(&mut self, index: usize) -> EditorResult<()> {
        let block = self.blocks.get(index).ok_or(EditorError::UnknownBlock(index))?;
        let markup = block.render(&self.config.placeholder_image)?;
        let is_image = block.is_image();

        let body = self.surface.body();
        let selection = self.selection().filter(|&n| self.surface.is_content(n));
        let tree = self.surface.tree_mut();
        let nodes = parse_detached(tree, &markup)?;

        match selection {
            Some(container) if tree.tag(container).is_some_and(|t| VOID_TAGS.contains(&t)) => {
                let mut anchor = wrapper_of(tree, container).unwrap_or(container);
                for &node in &nodes {
                    tree.insert_after(anchor, node)?;
                    anchor = node;
                }
            }
            Some(container) => {
                for &node in &nodes {
                    tree.append_child(container, node)?;
                }
            }
            None => {
                for &node in &nodes {
                    tree.append_child(body, node)?;
                }
            }
        }
        tracing::debug!("Inserted block {} ({} nodes)", index, nodes.len());

        let image = nodes.iter().copied().find(|&n| tree.is_tag(n, "img"));
        self.checkpoint();

        if is_image {
            if let Some(image) = image {
                self.collaborators.assets.open(AssetRequest { target: image, reason: AssetReason::CatalogInsert });
            }
        }
        Ok(())
    }

    /// Answer an asset picker request. Empty paths and vanished targets
    /// change nothing.
    pub fn asset_chosen(&mut self, request: AssetRequest, path: &str) -> bool {
        let path = path.trim();
        if path.is_empty() {
            tracing::warn!("asset_chosen: empty path for {}", request.target);
            return false;
        }
        let target = request.target;
        if !self.surface.is_content(target) || !self.surface.tree().is_tag(target, "img") {
            tracing::warn!("asset_chosen: {}", EditorError::Detached(target));
            return false;
        }
        if let Err(err) = self.surface.tree_mut().set_attribute(target, "src", path) {
            tracing::warn!("asset_chosen: {}", err);
            return false;
        }
        tracing::debug!("Image {} now shows {}", target, path);
        self.checkpoint();
        true
    }
}
