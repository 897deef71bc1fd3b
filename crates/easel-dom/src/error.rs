//! DOM operation errors

use crate::NodeId;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Handle refers to a destroyed node
    #[error("node {0} no longer exists")]
    StaleNode(NodeId),

    /// Operation needs an element
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),

    /// Inserting a node into itself or one of its descendants
    #[error("cannot insert {child} under {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    /// Reference node is not a child of the given parent
    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    /// Selector text could not be parsed
    #[error("invalid selector: {0}")]
    InvalidSelector(String),
}
