//! Input dispatch
//!
//! Pointer and key events drive two gesture state machines: a handle
//! resize and a node move. Only one may run at a time, and both require
//! the pressed node to belong to the current selection.

use easel_dom::NodeId;

use crate::collaborators::{AssetReason, AssetRequest};
use crate::resize::{apply_size, image_in, measure};
use crate::selection::{element_for, resolve};
use crate::{Corner, Editor, EditorError, HANDLE_CLASS, Key, PointerEvent, RESIZED_ATTR, ResizeDrag};

impl Editor {
    /// Primary click: select the touched node, or the default node when
    /// the click landed outside the content
    pub fn click(&mut self, target: Option<NodeId>) -> bool {
        if self.drag.is_some() || self.resize.is_some() {
            return false;
        }
        match target.filter(|&t| self.surface.is_content(t)) {
            Some(target) => self.select(target),
            None => self.select_default(),
        }
    }

    /// Double activation: images open the asset picker, text-like
    /// elements become editable in place
    pub fn activate(&mut self, target: NodeId) -> bool {
        let tree = self.surface.tree();
        let Some(element) = element_for(tree, target).filter(|&e| self.surface.is_content(e)) else {
            tracing::warn!("activate: {}", EditorError::Detached(target));
            return false;
        };
        if self.lock.is_locked(tree, element) {
            tracing::warn!("activate: {}", EditorError::Locked(element));
            return false;
        }

        let image = resolve(tree, self.surface.body(), element).filter(|&n| tree.is_tag(n, "img"));
        if let Some(image) = image {
            self.collaborators.assets.open(AssetRequest { target: image, reason: AssetReason::Activation });
            return true;
        }

        let editable = tree.tag(element).is_some_and(|tag| self.config.is_editable_tag(tag));
        if !editable {
            return false;
        }
        match self.surface.tree_mut().set_attribute(element, "contenteditable", "true") {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("activate: {}", err);
                false
            }
        }
    }

    /// Start a resize (on a handle of the selected image) or a move (on
    /// the selected node)
    pub fn pointer_down(&mut self, event: PointerEvent) -> bool {
        if self.drag.is_some() || self.resize.is_some() {
            tracing::warn!("pointer_down: {}", EditorError::GestureInProgress);
            return false;
        }
        let Some(target) = event.target else {
            return false;
        };
        let Some(current) = self.selection() else {
            return false;
        };

        let tree = self.surface.tree();
        if let Some(handle) = element_for(tree, target).and_then(|t| tree.closest(t, &format!(".{HANDLE_CLASS}"))) {
            let corner = tree.get_attribute(handle, "data-position").and_then(Corner::parse);
            let wrapper = tree.parent(handle);
            let image = wrapper.and_then(|w| image_in(tree, w));
            let (Some(corner), Some(wrapper), Some(image)) = (corner, wrapper, image) else {
                tracing::warn!("pointer_down: malformed resize handle {}", handle);
                return false;
            };
            if image != current {
                tracing::warn!("pointer_down: handle belongs to unselected image {}", image);
                return false;
            }
            let start = measure(tree, image);
            self.resize = Some(ResizeDrag::new(image, wrapper, corner, (event.x, event.y), start));
            self.tracker.stop();
            self.collaborators.popover.hide();
            tracing::debug!("Resizing {} from {} ({}x{})", image, corner.as_str(), start.width, start.height);
            return true;
        }

        if resolve(tree, self.surface.body(), target) != Some(current) {
            return false;
        }
        if self.lock.is_locked(tree, current) {
            tracing::warn!("pointer_down: {}", EditorError::Locked(current));
            return false;
        }
        match self.begin_node_drag(current, event.x, event.y) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("pointer_down: {}", err);
                false
            }
        }
    }

    pub fn pointer_move(&mut self, event: PointerEvent) -> bool {
        if let Some(resize) = self.resize.as_mut() {
            let size = resize.update(event.x, event.y, event.modifiers, self.config.min_resize);
            let (image, wrapper) = (resize.image, resize.wrapper);
            if let Err(err) = apply_size(self.surface.tree_mut(), image, Some(wrapper), size) {
                tracing::warn!("Resize of {} failed: {}", image, err);
                self.resize = None;
                return false;
            }
            return true;
        }
        if self.drag.is_some() {
            self.update_node_drag(event.x, event.y, event.target);
            return true;
        }
        false
    }

    /// End the active gesture. Returns whether the content changed.
    pub fn pointer_up(&mut self, event: PointerEvent) -> bool {
        if let Some(resize) = self.resize.take() {
            let changed = resize.changed();
            if changed {
                self.positions.mark_resized(resize.image);
                if let Err(err) = self.surface.tree_mut().set_attribute(resize.wrapper, RESIZED_ATTR, "true") {
                    tracing::warn!("Could not flag wrapper {}: {}", resize.wrapper, err);
                }
            }
            tracing::debug!(
                "Resized {} to {}x{}",
                resize.image,
                resize.last.width,
                resize.last.height
            );
            self.checkpoint();
            if self.selection().is_some() {
                self.tracker.start();
            }
            return changed;
        }
        self.finish_node_drag(event.y, event.target)
    }

    pub fn key_down(&mut self, key: Key) -> bool {
        match key {
            Key::Escape => self.cancel_node_drag(),
            Key::Other => false,
        }
    }
}
