//! Export
//!
//! The saved form of a document: cleaned markup plus the outer markup of
//! every editable and read-only region, keyed by a short selector.

use std::collections::BTreeMap;

use easel_dom::{DomTree, NodeId};
use serde::Serialize;

use crate::{Editor, EditorResult, GHOST_CLASS};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SavedDocument {
    /// Body markup with every editing affordance removed
    pub editor: String,
    pub editable: BTreeMap<String, String>,
    pub readonly: BTreeMap<String, String>,
}

impl SavedDocument {
    pub fn to_json(&self) -> EditorResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// `tag#id`, else `tag.class.class`, else the tag
fn region_key(tree: &DomTree, node: NodeId) -> Option<String> {
    let element = tree.element(node)?;
    let mut key = element.tag.clone();
    if let Some(id) = element.id() {
        key.push('#');
        key.push_str(id);
    } else {
        for class in element.classes().filter(|c| *c != GHOST_CLASS) {
            key.push('.');
            key.push_str(class);
        }
    }
    Some(key)
}

/// Drop every whitespace run that contains a line break
fn collapse_lines(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut run = String::new();
    for c in markup.chars() {
        if c.is_whitespace() {
            run.push(c);
            continue;
        }
        if !run.contains('\n') {
            out.push_str(&run);
        }
        run.clear();
        out.push(c);
    }
    if !run.contains('\n') {
        out.push_str(&run);
    }
    out
}

impl Editor {
    /// Snapshot the document in its saved form
    pub fn export(&self) -> SavedDocument {
        let tree = self.surface.tree();
        let body = self.surface.body();
        let regions = |nodes: Vec<NodeId>| -> BTreeMap<String, String> {
            nodes
                .into_iter()
                .filter_map(|node| Some((region_key(tree, node)?, collapse_lines(&self.surface.clean_markup(node)))))
                .collect()
        };

        let document = SavedDocument {
            editor: collapse_lines(&self.surface.clean_inner()),
            editable: regions(self.editable.matches_under(tree, body)),
            readonly: regions(self.lock.matches_under(tree, body)),
        };
        tracing::info!(
            "Exported document ({} editable, {} read-only regions)",
            document.editable.len(),
            document.readonly.len()
        );
        document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_lines() {
        assert_eq!(collapse_lines("<p>\n    a b\n</p>"), "<p>a b</p>");
        assert_eq!(collapse_lines("a  b"), "a  b");
        assert_eq!(collapse_lines("a \r\n b \n"), "ab");
    }

    #[test]
    fn test_region_key() {
        let mut tree = DomTree::new();
        let section = tree.create_element("section");
        tree.set_attribute(section, "class", "hero easel-ghost wide").unwrap();
        assert_eq!(region_key(&tree, section).as_deref(), Some("section.hero.wide"));

        tree.set_attribute(section, "id", "top").unwrap();
        assert_eq!(region_key(&tree, section).as_deref(), Some("section#top"));

        let text = tree.create_text("x");
        assert!(region_key(&tree, text).is_none());
    }
}
