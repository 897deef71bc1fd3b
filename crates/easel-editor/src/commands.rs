//! Popover commands
//!
//! Every command acts on the current selection and, apart from `Copy`,
//! ends with a checkpoint.

use easel_dom::NodeId;

use crate::resize::wrapper_of;
use crate::{CLONED_CLASS, Editor, EditorError, EditorEvent, EditorResult, HIGHLIGHT_ATTR, WRAPPER_CLASS};

/// Action chosen in the popover
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Duplicate,
    Delete,
    /// Update the link around the selection. `text` is ignored when the
    /// link wraps an image.
    EditLink { href: String, text: Option<String> },
    EditIcon { class: String },
    /// Queue the cleaned markup of the selection as [`EditorEvent::Copied`]
    Copy,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Duplicate => "duplicate",
            Command::Delete => "delete",
            Command::EditLink { .. } => "edit-link",
            Command::EditIcon { .. } => "edit-icon",
            Command::Copy => "copy",
        }
    }
}

impl Editor {
    /// Run a popover command against the selection
    pub fn handle_command(&mut self, command: Command) -> bool {
        let Some(current) = self.selection() else {
            tracing::warn!("{}: {}", command.name(), EditorError::NoSelection);
            return false;
        };
        let name = command.name();
        let result = match command {
            Command::Duplicate => self.duplicate(current),
            Command::Delete => self.delete(current),
            Command::EditLink { href, text } => self.edit_link(current, &href, text.as_deref()),
            Command::EditIcon { class } => self.edit_icon(current, &class),
            Command::Copy => {
                let markup = self.surface.clean_markup(current);
                self.events.push(EditorEvent::Copied(markup));
                return true;
            }
        };
        match result {
            Ok(()) => {
                self.checkpoint();
                true
            }
            Err(err) => {
                tracing::warn!("{}: {}", name, err);
                false
            }
        }
    }

    /// Replace a node's content with plain text (a finished inline edit)
    pub fn commit_text(&mut self, node: NodeId, text: &str) -> bool {
        if !self.surface.is_content(node) {
            tracing::warn!("commit_text: {}", EditorError::Detached(node));
            return false;
        }
        if self.lock.is_locked(self.surface.tree(), node) {
            tracing::warn!("commit_text: {}", EditorError::Locked(node));
            return false;
        }
        if let Err(err) = self.surface.tree_mut().set_text_content(node, text) {
            tracing::warn!("commit_text: {}", err);
            return false;
        }
        self.checkpoint();
        true
    }

    fn duplicate(&mut self, current: NodeId) -> EditorResult<()> {
        let tree = self.surface.tree_mut();
        let source = tree.closest(current, "li").unwrap_or(current);
        let anchor = wrapper_of(tree, source).unwrap_or(source);

        let copy = tree.clone_subtree(source)?;
        // Wrappers in the copy have no recorded home; flatten them now
        for wrapper in tree.query_selector_all(copy, &format!(".{WRAPPER_CLASS}")) {
            let images = tree.query_selector_all(wrapper, "img");
            let parent = tree.parent(wrapper).ok_or(EditorError::Detached(wrapper))?;
            for image in images {
                tree.insert_before(parent, image, Some(wrapper))?;
            }
            tree.destroy(wrapper)?;
        }
        for node in std::iter::once(copy).chain(tree.descendants(copy)) {
            for marker in [HIGHLIGHT_ATTR, "draggable", "contenteditable"] {
                tree.remove_attribute(node, marker);
            }
        }
        tree.add_class(copy, CLONED_CLASS)?;
        tree.insert_after(anchor, copy)?;
        tracing::debug!("Duplicated {} as {}", source, copy);

        self.select(copy);
        Ok(())
    }

    fn delete(&mut self, current: NodeId) -> EditorResult<()> {
        if self.lock.is_locked(self.surface.tree(), current) {
            return Err(EditorError::Locked(current));
        }
        let tree = self.surface.tree_mut();
        let doomed = wrapper_of(tree, current).unwrap_or(current);
        tree.destroy(doomed)?;
        self.positions.take(current);
        self.positions.prune(self.surface.tree());
        tracing::debug!("Deleted {}", doomed);

        self.forget_selection();
        Ok(())
    }

    fn edit_link(&mut self, current: NodeId, href: &str, text: Option<&str>) -> EditorResult<()> {
        let tree = self.surface.tree();
        let link = self
            .selection
            .origin()
            .and_then(|origin| tree.closest(origin, "a"))
            .or_else(|| tree.closest(current, "a"))
            .filter(|&a| self.surface.is_content(a))
            .ok_or(EditorError::NoMatch("a".to_string()))?;
        let wraps_image = tree.query_selector(link, "img").is_some();

        let tree = self.surface.tree_mut();
        tree.set_attribute(link, "href", href.trim())?;
        match text {
            Some(_) if wraps_image => tracing::debug!("Link {} wraps an image; keeping its content", link),
            Some(text) => tree.set_text_content(link, text)?,
            None => {}
        }
        Ok(())
    }

    fn edit_icon(&mut self, current: NodeId, class: &str) -> EditorResult<()> {
        let tree = self.surface.tree();
        let icon = self
            .selection
            .origin()
            .filter(|&origin| tree.is_tag(origin, "i"))
            .or_else(|| tree.closest(current, "i"))
            .or_else(|| tree.query_selector(current, "i"))
            .ok_or(EditorError::NoMatch("i".to_string()))?;
        self.surface.tree_mut().set_attribute(icon, "class", class.trim())?;
        Ok(())
    }
}
