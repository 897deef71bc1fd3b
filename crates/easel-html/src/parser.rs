//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts the `<body>` contents into arena
//! nodes under a caller-chosen parent.

use easel_dom::{DomError, DomTree, ElementData, NodeId};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use crate::HtmlResult;

/// HTML5 parser
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse a fragment as if it were the content of `<body>`, append
    /// the resulting nodes to `parent`, and return the new top-level
    /// nodes in order.
    pub fn parse_fragment_into(&self, tree: &mut DomTree, parent: NodeId, markup: &str) -> HtmlResult<Vec<NodeId>> {
        if !tree.is_alive(parent) {
            return Err(DomError::StaleNode(parent).into());
        }

        let wrapped = format!("<!DOCTYPE html><html><head></head><body>{markup}</body></html>");
        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut wrapped.as_bytes())?;

        let Some(body) = find_body(&dom.document) else {
            tracing::debug!("Fragment produced no body");
            return Ok(Vec::new());
        };

        let mut created = Vec::new();
        for child in body.children.borrow().iter() {
            if let Some(id) = self.convert_node(child, tree)? {
                tree.append_child(parent, id)?;
                created.push(id);
            }
        }

        tracing::debug!("Parsed fragment into {} top-level nodes", created.len());
        Ok(created)
    }

    /// Convert an RcDom node (and its subtree) into a detached arena node
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree) -> HtmlResult<Option<NodeId>> {
        let id = match &handle.data {
            RcNodeData::Text { contents } => {
                let text = contents.borrow().to_string();
                // Formatting whitespace between block tags is dropped
                if text.trim().is_empty() && text.contains('\n') {
                    return Ok(None);
                }
                tree.create_text(&text)
            }
            RcNodeData::Comment { contents } => tree.create_comment(contents),
            RcNodeData::Element { name, attrs, .. } => {
                let mut elem = ElementData::new(&name.local);
                for attr in attrs.borrow().iter() {
                    elem.set_attr(attr.name.local.as_ref(), &attr.value);
                }
                let id = tree.create_element_with(elem);
                for child in handle.children.borrow().iter() {
                    if let Some(child_id) = self.convert_node(child, tree)? {
                        tree.append_child(id, child_id)?;
                    }
                }
                id
            }
            RcNodeData::Document | RcNodeData::Doctype { .. } | RcNodeData::ProcessingInstruction { .. } => {
                return Ok(None);
            }
        };
        Ok(Some(id))
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

fn find_body(handle: &Handle) -> Option<Handle> {
    for child in handle.children.borrow().iter() {
        if let RcNodeData::Element { name, .. } = &child.data {
            if name.local.as_ref() == "body" {
                return Some(child.clone());
            }
        }
        if let Some(found) = find_body(child) {
            return Some(found);
        }
    }
    None
}
