//! Editor
//!
//! One instance owns all mutable editing state for one surface:
//! selection, history, gesture sessions, catalog and collaborators.

use easel_dom::{DomTree, NodeId};
use easel_html::parse_fragment_into;

use crate::{
    BlockRegistry, Collaborators, ContentSurface, EditablePolicy, EditorConfig, EditorError, EditorEvent,
    EditorResult, History, LockPolicy, NodeDrag, PopoverTracker, PositionTable, ResizeDrag, Selection,
    TemporaryStyles,
};

/// How `insert_markup` treats the target's existing children
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InsertMode {
    #[default]
    Replace,
    Append,
    Prepend,
}

/// The editing-interaction engine
#[derive(Debug)]
pub struct Editor {
    pub(crate) config: EditorConfig,
    pub(crate) surface: ContentSurface,
    pub(crate) lock: LockPolicy,
    pub(crate) editable: EditablePolicy,
    pub(crate) history: History,
    pub(crate) selection: Selection,
    pub(crate) positions: PositionTable,
    pub(crate) resize: Option<ResizeDrag>,
    pub(crate) drag: Option<NodeDrag>,
    pub(crate) blocks: BlockRegistry,
    pub(crate) temporary: TemporaryStyles,
    pub(crate) tracker: PopoverTracker,
    pub(crate) collaborators: Collaborators,
    pub(crate) events: Vec<EditorEvent>,
}

impl Editor {
    /// Create an editor over a surface. The current content becomes the
    /// history baseline.
    pub fn new(config: EditorConfig, surface: ContentSurface) -> Self {
        let mut history = History::new(config.history_limit);
        history.reset(surface.snapshot());
        let mut positions = PositionTable::new();
        positions.adopt(surface.tree(), surface.body());
        tracing::info!(
            "Editor ready ({} read-only, {} editable selectors, history limit {})",
            config.read_only.len(),
            config.editable.len(),
            history.limit()
        );

        Self {
            lock: LockPolicy::new(&config.read_only),
            editable: EditablePolicy::new(&config.editable),
            config,
            surface,
            history,
            selection: Selection::default(),
            positions,
            resize: None,
            drag: None,
            blocks: BlockRegistry::new(),
            temporary: TemporaryStyles::new(),
            tracker: PopoverTracker::new(),
            collaborators: Collaborators::default(),
            events: Vec::new(),
        }
    }

    pub fn with_collaborators(mut self, collaborators: Collaborators) -> Self {
        self.collaborators = collaborators;
        self
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn surface(&self) -> &ContentSurface {
        &self.surface
    }

    /// Direct access for host layout updates. Structural edits made
    /// here are not checkpointed.
    pub fn surface_mut(&mut self) -> &mut ContentSurface {
        &mut self.surface
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Take queued notifications
    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    // === History ===

    /// Record the current content as a committed state
    pub fn checkpoint(&mut self) {
        self.history.push(self.surface.snapshot());
        tracing::debug!("Checkpoint ({} undo, {} redo)", self.history.undo_len(), self.history.redo_len());
    }

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().map(str::to_string) else {
            tracing::debug!("Nothing to undo");
            return false;
        };
        self.swap_content(&snapshot)
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().map(str::to_string) else {
            tracing::debug!("Nothing to redo");
            return false;
        };
        self.swap_content(&snapshot)
    }

    /// Drop every piece of state that points into the current tree
    fn discard_transient(&mut self) {
        if let Some(drag) = self.drag.take() {
            drag.discard(self.surface.tree_mut());
        }
        self.resize = None;
        self.positions.clear();
        self.forget_selection();
    }

    fn swap_content(&mut self, snapshot: &str) -> bool {
        self.discard_transient();
        match self.surface.restore(snapshot) {
            Ok(()) => {
                let adopted = self.positions.adopt(self.surface.tree(), self.surface.body());
                if adopted > 0 {
                    tracing::debug!("Adopted {} restored resize wrappers", adopted);
                }
                true
            }
            Err(err) => {
                tracing::warn!("Failed to restore snapshot: {}", err);
                false
            }
        }
    }

    // === Content ===

    /// Replace the whole content and start history over
    pub fn load(&mut self, markup: &str) -> bool {
        if !self.swap_content(markup) {
            return false;
        }
        self.history.reset(self.surface.snapshot());
        tracing::info!("Loaded content ({} bytes)", markup.len());
        true
    }

    /// Empty the content
    pub fn clear(&mut self) {
        self.discard_transient();
        let body = self.surface.body();
        self.surface.tree_mut().clear_children(body);
        self.checkpoint();
        tracing::info!("Cleared content");
    }

    /// Parse markup into the first node matching `selector` (the body
    /// itself answers to `body`)
    pub fn insert_markup(&mut self, markup: &str, selector: &str, mode: InsertMode) -> bool {
        let body = self.surface.body();
        let tree = self.surface.tree();
        let target = if tree.matches(body, selector) {
            Some(body)
        } else {
            tree.query_selector(body, selector)
        };
        let Some(target) = target else {
            tracing::warn!("insert_markup: {}", EditorError::NoMatch(selector.to_string()));
            return false;
        };

        if let Err(err) = self.insert_into(target, markup, mode) {
            tracing::warn!("insert_markup: {}", err);
            return false;
        }
        self.drop_stale_selection();
        self.checkpoint();
        true
    }

    fn insert_into(&mut self, target: NodeId, markup: &str, mode: InsertMode) -> EditorResult<()> {
        let tree = self.surface.tree_mut();
        match mode {
            InsertMode::Replace => {
                easel_html::set_inner_html(tree, target, markup)?;
            }
            InsertMode::Append => {
                parse_fragment_into(tree, target, markup)?;
            }
            InsertMode::Prepend => {
                let first = tree.children(target).next().map(|(id, _)| id);
                for node in parse_detached(tree, markup)? {
                    tree.insert_before(target, node, first)?;
                }
            }
        }
        Ok(())
    }

    /// Forget a selection whose node was destroyed by a bulk edit
    pub(crate) fn drop_stale_selection(&mut self) {
        self.positions.prune(self.surface.tree());
        if let Some(current) = self.selection.current() {
            if !self.surface.is_content(current) {
                tracing::debug!("Selection {} went away", current);
                self.forget_selection();
            }
        }
    }
}

/// Parse markup into detached top-level nodes
pub(crate) fn parse_detached(tree: &mut DomTree, markup: &str) -> EditorResult<Vec<NodeId>> {
    let scratch = tree.create_element("div");
    let nodes = parse_fragment_into(tree, scratch, markup);
    let nodes = match nodes {
        Ok(nodes) => nodes,
        Err(err) => {
            tree.destroy(scratch)?;
            return Err(err.into());
        }
    };
    for &node in &nodes {
        tree.detach(node);
    }
    tree.destroy(scratch)?;
    Ok(nodes)
}
