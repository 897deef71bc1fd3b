//! Read-only and editable-ancestor policies
//!
//! Both are driven by caller-supplied selector lists. Entries that fail
//! to parse are dropped with a debug log and never match.

use easel_dom::{DomTree, NodeId, SelectorList};

/// Decides whether a node may be selected, dragged or deleted
#[derive(Debug, Clone, Default)]
pub struct LockPolicy {
    selectors: SelectorList,
}

impl LockPolicy {
    pub fn new<S: AsRef<str>>(selectors: &[S]) -> Self {
        Self { selectors: SelectorList::parse_lossy(selectors) }
    }

    /// A node is locked when it or any ancestor matches
    pub fn is_locked(&self, tree: &DomTree, node: NodeId) -> bool {
        !self.selectors.is_empty() && tree.closest_matching(node, &self.selectors).is_some()
    }

    /// Every node under `scope` matching a read-only selector
    pub fn matches_under(&self, tree: &DomTree, scope: NodeId) -> Vec<NodeId> {
        tree.query_matching(scope, &self.selectors)
    }
}

/// Finds where a selection bounced off a locked node should land
#[derive(Debug, Clone, Default)]
pub struct EditablePolicy {
    selectors: SelectorList,
}

impl EditablePolicy {
    pub fn new<S: AsRef<str>>(selectors: &[S]) -> Self {
        Self { selectors: SelectorList::parse_lossy(selectors) }
    }

    /// Closest inclusive ancestor matching an editable selector
    pub fn fallback_for(&self, tree: &DomTree, node: NodeId) -> Option<NodeId> {
        if self.selectors.is_empty() {
            return None;
        }
        tree.closest_matching(node, &self.selectors)
    }

    /// Every node under `scope` matching an editable selector
    pub fn matches_under(&self, tree: &DomTree, scope: NodeId) -> Vec<NodeId> {
        tree.query_matching(scope, &self.selectors)
    }
}
