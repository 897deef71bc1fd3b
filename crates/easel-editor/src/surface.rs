//! Content surface
//!
//! Owns the live content tree and the box it is shown in. Snapshots are
//! the serialized children of `<body>` with editor markers removed.

use easel_dom::{DomTree, NodeId, Rect, SelectorList};
use easel_html::{HtmlSerializer, parse_fragment_into, set_inner_html};

use crate::{DROP_TARGET_ATTR, EditorResult, GHOST_CLASS, HANDLE_CLASS, HIGHLIGHT_ATTR, WRAPPER_CLASS};

/// Attributes that only exist while editing
const TRANSIENT_ATTRS: &[&str] = &[HIGHLIGHT_ATTR, DROP_TARGET_ATTR, "draggable", "contenteditable"];

/// The isolated document being edited
#[derive(Debug, Clone)]
pub struct ContentSurface {
    tree: DomTree,
    body: NodeId,
    viewport: Rect,
}

impl Default for ContentSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentSurface {
    /// Empty document with a `<body>`
    pub fn new() -> Self {
        let mut tree = DomTree::new();
        let body = tree.create_element("body");
        let root = tree.root();
        // A fresh tree always accepts its first child
        let _ = tree.append_child(root, body);
        Self { tree, body, viewport: Rect::default() }
    }

    /// Document whose body holds `markup`
    pub fn from_markup(markup: &str) -> EditorResult<Self> {
        let mut surface = Self::new();
        parse_fragment_into(&mut surface.tree, surface.body, markup)?;
        Ok(surface)
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// The `<body>` element
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Surface box in window coordinates
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    /// True when the node is inside the body (body itself excluded)
    pub fn is_content(&self, id: NodeId) -> bool {
        id != self.body && self.tree.contains(self.body, id)
    }

    /// Serialized content for the history stack
    pub fn snapshot(&self) -> String {
        HtmlSerializer::new()
            .strip_attributes(TRANSIENT_ATTRS)
            .skip_elements(SelectorList::parse_lossy(&[format!(".{GHOST_CLASS}")]))
            .serialize_inner(&self.tree, self.body)
    }

    /// Serialized content with every editing affordance removed
    pub fn clean_markup(&self, node: NodeId) -> String {
        clean_serializer().serialize_outer(&self.tree, node)
    }

    /// Body content with every editing affordance removed
    pub fn clean_inner(&self) -> String {
        clean_serializer().serialize_inner(&self.tree, self.body)
    }

    /// Replace the body content with a snapshot. Every handle into the
    /// old content goes stale.
    pub fn restore(&mut self, snapshot: &str) -> EditorResult<()> {
        set_inner_html(&mut self.tree, self.body, snapshot)?;
        self.tree.clear_layout();
        Ok(())
    }

    /// Raw body markup, markers included
    pub fn markup(&self) -> String {
        easel_html::get_inner_html(&self.tree, self.body)
    }
}

fn clean_serializer() -> HtmlSerializer {
    HtmlSerializer::new()
        .strip_attributes(TRANSIENT_ATTRS)
        .strip_attributes(&["data-editable"])
        .strip_classes(&[GHOST_CLASS])
        .skip_elements(SelectorList::parse_lossy(&[format!(".{HANDLE_CLASS}"), format!(".{GHOST_CLASS}")]))
        .unwrap_elements(SelectorList::parse_lossy(&[format!(".{WRAPPER_CLASS}")]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_strips_markers() {
        let mut surface = ContentSurface::from_markup("<p>one</p><p>two</p>").unwrap();
        let body = surface.body();
        let first = surface.tree().element_children(body)[0];
        surface.tree_mut().set_attribute(first, HIGHLIGHT_ATTR, "true").unwrap();
        surface.tree_mut().set_attribute(first, "draggable", "true").unwrap();

        assert_eq!(surface.snapshot(), "<p>one</p><p>two</p>");
        assert!(surface.markup().contains(HIGHLIGHT_ATTR));
    }

    #[test]
    fn test_restore_invalidates_handles() {
        let mut surface = ContentSurface::from_markup("<p>one</p>").unwrap();
        let p = surface.tree().element_children(surface.body())[0];
        surface.restore("<h1>two</h1>").unwrap();

        assert!(!surface.tree().is_alive(p));
        assert_eq!(surface.snapshot(), "<h1>two</h1>");
    }

    #[test]
    fn test_clean_markup_unwraps_images() {
        let surface = ContentSurface::from_markup(
            "<div class=\"resize-wrapper\"><img src=\"a.png\"><div class=\"resize-handle top-left\"></div></div>",
        )
        .unwrap();
        assert_eq!(surface.clean_inner(), "<img src=\"a.png\" />");
    }

    #[test]
    fn test_is_content() {
        let surface = ContentSurface::from_markup("<p>x</p>").unwrap();
        let body = surface.body();
        let p = surface.tree().element_children(body)[0];
        assert!(surface.is_content(p));
        assert!(!surface.is_content(body));
        assert!(!surface.is_content(surface.tree().root()));
    }
}
