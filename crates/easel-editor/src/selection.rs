//! Selection and Highlight
//!
//! The node a user touches is rarely the node they mean. Selection first
//! bounces off read-only content, then resolves aliases:
//!
//! 1. a link wrapping an image selects the image
//! 2. anything inside a resize wrapper selects its image
//! 3. anything inside a list item selects the list item
//! 4. otherwise the node itself
//!
//! Exactly one node carries the highlight marker at a time.

use easel_dom::{DomTree, NodeId};

use crate::resize::{attach_handles, image_in, release_image, wrapper_of};
use crate::{Editor, EditorEvent, HIGHLIGHT_ATTR, WRAPPER_CLASS};

/// Action set the popover offers for a selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionKind {
    #[default]
    Plain,
    Link,
    Icon,
}

impl SelectionKind {
    /// Kind implied by the tag the user actually touched
    pub fn of(tag: Option<&str>) -> Self {
        match tag {
            Some("a") => SelectionKind::Link,
            Some("i") => SelectionKind::Icon,
            _ => SelectionKind::Plain,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SelectionKind::Plain => "default",
            SelectionKind::Link => "link",
            SelectionKind::Icon => "icon",
        }
    }
}

/// Current and previous resolved targets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    current: Option<NodeId>,
    previous: Option<NodeId>,
    /// Element the user touched before resolution
    origin: Option<NodeId>,
    kind: SelectionKind,
}

impl Selection {
    pub fn current(&self) -> Option<NodeId> {
        self.current
    }

    pub fn previous(&self) -> Option<NodeId> {
        self.previous
    }

    pub fn origin(&self) -> Option<NodeId> {
        self.origin
    }

    pub fn kind(&self) -> SelectionKind {
        self.kind
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }
}

/// Element for a raw target: text maps to its parent element
pub(crate) fn element_for(tree: &DomTree, node: NodeId) -> Option<NodeId> {
    if tree.element(node).is_some() {
        return Some(node);
    }
    tree.parent(node).filter(|&p| tree.element(p).is_some())
}

/// Effective target for a raw node inside `body`
pub(crate) fn resolve(tree: &DomTree, body: NodeId, node: NodeId) -> Option<NodeId> {
    let node = element_for(tree, node)?;
    if node == body || !tree.contains(body, node) {
        return None;
    }
    if let Some(link) = tree.closest(node, "a") {
        if let Some(image) = tree.query_selector(link, "img") {
            return Some(image);
        }
    }
    if let Some(image) = tree
        .closest(node, &format!(".{WRAPPER_CLASS}"))
        .and_then(|wrapper| image_in(tree, wrapper))
    {
        return Some(image);
    }
    Some(tree.closest(node, "li").unwrap_or(node))
}

impl Editor {
    /// Resolve a raw target and make it the selection. No checkpoint.
    pub fn select(&mut self, node: NodeId) -> bool {
        let tree = self.surface.tree();
        if !tree.is_alive(node) {
            tracing::warn!("select: {} no longer exists", node);
            return false;
        }
        let origin = element_for(tree, node).unwrap_or(node);

        if self.lock.is_locked(tree, node) {
            let fallback = self
                .editable
                .fallback_for(tree, node)
                .or_else(|| self.default_node())
                .filter(|&n| self.surface.is_content(n));
            let Some(fallback) = fallback else {
                tracing::warn!("select: {} is read-only and has no editable fallback", node);
                self.tracker.stop();
                self.collaborators.popover.hide();
                return false;
            };
            tracing::debug!("Redirecting read-only {} to {}", node, fallback);
            return self.apply_selection(fallback, origin);
        }

        let Some(target) = resolve(tree, self.surface.body(), node) else {
            tracing::warn!("select: {} is not selectable content", node);
            return false;
        };
        self.apply_selection(target, origin)
    }

    /// Select whatever `default_selected` points at
    pub fn select_default(&mut self) -> bool {
        match self.default_node() {
            Some(node) => self.select(node),
            None => {
                tracing::warn!("select_default: no default node configured or found");
                false
            }
        }
    }

    /// Resolved selection
    pub fn selection(&self) -> Option<NodeId> {
        self.selection.current().filter(|&n| self.surface.tree().is_alive(n))
    }

    pub fn selection_state(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_kind(&self) -> SelectionKind {
        self.selection.kind()
    }

    /// Drop the highlight and put a wrapped image back. No checkpoint.
    pub fn clear_selection(&mut self) {
        if let Some(current) = self.selection() {
            self.unmark(current);
            if let Err(err) = release_image(self.surface.tree_mut(), &mut self.positions, current, false) {
                tracing::warn!("clear_selection: {}", err);
            }
        }
        self.forget_selection();
    }

    /// Reset selection state without touching the tree
    pub(crate) fn forget_selection(&mut self) {
        let had = self.selection.current().is_some();
        self.selection = Selection::default();
        self.tracker.stop();
        self.collaborators.popover.hide();
        self.collaborators.panel.close();
        if had {
            self.events.push(EditorEvent::SelectionCleared);
        }
    }

    fn default_node(&self) -> Option<NodeId> {
        let selector = self.config.default_selected.as_deref()?;
        self.surface.tree().query_selector(self.surface.body(), selector)
    }

    fn unmark(&mut self, node: NodeId) {
        let tree = self.surface.tree_mut();
        tree.remove_attribute(node, HIGHLIGHT_ATTR);
        tree.remove_attribute(node, "draggable");
    }

    fn apply_selection(&mut self, target: NodeId, origin: NodeId) -> bool {
        if self.selection() == Some(target) {
            // Same node, possibly reached through a different origin
            let kind = SelectionKind::of(self.surface.tree().tag(origin));
            self.selection.origin = Some(origin);
            if kind != self.selection.kind {
                self.selection.kind = kind;
                self.events.push(EditorEvent::SelectionChanged { node: target, kind });
                if !self.lock.is_locked(self.surface.tree(), target) {
                    self.collaborators.popover.show_actions(kind);
                }
            }
            return true;
        }
        let previous = self.selection();

        if let Some(prev) = previous {
            self.unmark(prev);
            let tree = self.surface.tree();
            let leaving = wrapper_of(tree, prev).is_some_and(|wrapper| !tree.contains(wrapper, target));
            if leaving {
                if let Err(err) = release_image(self.surface.tree_mut(), &mut self.positions, prev, false) {
                    tracing::warn!("Failed to restore image {}: {}", prev, err);
                }
            }
        }

        if self.surface.tree().is_tag(target, "img") {
            if let Err(err) = attach_handles(self.surface.tree_mut(), &mut self.positions, target) {
                tracing::warn!("Failed to attach handles to {}: {}", target, err);
            }
        }

        let body = self.surface.body();
        let tree = self.surface.tree_mut();
        // Marker writes only fail on a dead or non-element target
        let _ = tree.set_attribute(target, HIGHLIGHT_ATTR, "true");
        let _ = tree.set_attribute(target, "draggable", "true");
        for node in tree.query_selector_all(body, "[contenteditable]") {
            if node != target {
                tree.remove_attribute(node, "contenteditable");
            }
        }

        let kind = SelectionKind::of(self.surface.tree().tag(origin));
        self.selection = Selection { current: Some(target), previous, origin: Some(origin), kind };
        tracing::debug!("Selected {} ({})", target, kind.as_str());

        self.collaborators.panel.bind(target);
        self.events.push(EditorEvent::SelectionChanged { node: target, kind });

        if self.lock.is_locked(self.surface.tree(), target) {
            self.tracker.stop();
            self.collaborators.popover.hide();
        } else {
            self.collaborators.popover.show_actions(kind);
            self.tracker.start();
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ContentSurface;

    fn surface() -> ContentSurface {
        ContentSurface::from_markup(concat!(
            "<a href=\"/\"><span>go</span><img src=\"a.png\"></a>",
            "<ul><li><b>one</b></li></ul>",
            "<div class=\"resize-wrapper\"><img src=\"b.png\"><div class=\"resize-handle\"></div></div>",
            "<p>text</p>",
        ))
        .unwrap()
    }

    #[test]
    fn test_resolution_order() {
        let surface = surface();
        let tree = surface.tree();
        let body = surface.body();

        let span = tree.query_selector(body, "span").unwrap();
        let link_img = tree.query_selector(body, "a img").unwrap();
        assert_eq!(resolve(tree, body, span), Some(link_img));

        let bold = tree.query_selector(body, "b").unwrap();
        let li = tree.query_selector(body, "li").unwrap();
        assert_eq!(resolve(tree, body, bold), Some(li));

        let handle = tree.query_selector(body, ".resize-handle").unwrap();
        let wrapped = tree.query_selector(body, ".resize-wrapper img").unwrap();
        assert_eq!(resolve(tree, body, handle), Some(wrapped));

        let p = tree.query_selector(body, "p").unwrap();
        let text = tree.children(p).next().map(|(id, _)| id).unwrap();
        assert_eq!(resolve(tree, body, text), Some(p));
    }

    #[test]
    fn test_body_is_not_selectable() {
        let surface = surface();
        assert_eq!(resolve(surface.tree(), surface.body(), surface.body()), None);
        assert_eq!(resolve(surface.tree(), surface.body(), surface.tree().root()), None);
    }

    #[test]
    fn test_kind_from_tag() {
        assert_eq!(SelectionKind::of(Some("a")), SelectionKind::Link);
        assert_eq!(SelectionKind::of(Some("i")), SelectionKind::Icon);
        assert_eq!(SelectionKind::of(Some("p")), SelectionKind::Plain);
        assert_eq!(SelectionKind::of(None).as_str(), "default");
    }
}
