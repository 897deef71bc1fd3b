//! Editor errors
//!
//! Internal helpers return these; public operations turn them into a
//! logged no-op.

use easel_dom::{DomError, NodeId};
use easel_html::HtmlError;

/// Result type for editor internals
pub type EditorResult<T> = Result<T, EditorError>;

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error(transparent)]
    Dom(#[from] DomError),

    #[error(transparent)]
    Html(#[from] HtmlError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no active selection")]
    NoSelection,

    #[error("node {0} is read-only")]
    Locked(NodeId),

    #[error("node {0} is not an image")]
    NotAnImage(NodeId),

    #[error("node {0} is not part of the content")]
    Detached(NodeId),

    #[error("no block registered at index {0}")]
    UnknownBlock(usize),

    #[error("malformed block definition: {0}")]
    MalformedBlock(String),

    #[error("nothing matches selector {0:?}")]
    NoMatch(String),

    #[error("another gesture is already in progress")]
    GestureInProgress,
}
