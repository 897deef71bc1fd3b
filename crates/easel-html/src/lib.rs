//! easel HTML
//!
//! Markup codec for the content tree: html5ever-backed fragment parsing
//! into the arena and serialization back to markup.

mod parser;
mod serializer;

pub use parser::HtmlParser;
pub use serializer::{HtmlSerializer, get_inner_html, get_outer_html};

use easel_dom::{DomError, DomTree, NodeId};

/// Result type for markup operations
pub type HtmlResult<T> = Result<T, HtmlError>;

/// Markup errors
#[derive(Debug, thiserror::Error)]
pub enum HtmlError {
    #[error("failed to read markup: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Dom(#[from] DomError),
}

/// Parse a body-context fragment and append it under `parent`
pub fn parse_fragment_into(tree: &mut DomTree, parent: NodeId, markup: &str) -> HtmlResult<Vec<NodeId>> {
    HtmlParser::new().parse_fragment_into(tree, parent, markup)
}

/// Replace the children of `node` with parsed markup
pub fn set_inner_html(tree: &mut DomTree, node: NodeId, markup: &str) -> HtmlResult<Vec<NodeId>> {
    if !tree.is_alive(node) {
        return Err(DomError::StaleNode(node).into());
    }
    tree.clear_children(node);
    parse_fragment_into(tree, node, markup)
}
