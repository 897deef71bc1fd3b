//! Block catalog
//!
//! Definitions are append-only; the registry index is the drag payload
//! a catalog entry carries.

use std::collections::BTreeMap;

use easel_dom::DomTree;
use easel_html::{get_outer_html, parse_fragment_into};
use serde::Deserialize;

use crate::{Editor, EditorError, EditorResult};

const DEFAULT_CATEGORY: &str = "Uncategorized";

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlockDefinition {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, alias = "iconClass")]
    pub icon: Option<String>,
    pub content: BlockContent,
}

/// Raw markup or a structured descriptor
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum BlockContent {
    Markup(String),
    Descriptor(BlockDescriptor),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlockDescriptor {
    #[serde(rename = "type", default = "default_tag")]
    pub tag: String,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub src: Option<String>,
    /// Inner markup
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

fn default_tag() -> String {
    "div".to_string()
}

impl BlockDescriptor {
    /// Markup for a descriptor; images without a source get `placeholder`
    pub fn render(&self, placeholder: &str) -> EditorResult<String> {
        let mut tree = DomTree::new();
        let el = tree.create_element(&self.tag);
        tree.append_child(tree.root(), el)?;

        if let Some(class) = self.class.as_deref().filter(|c| !c.is_empty()) {
            tree.set_attribute(el, "class", class)?;
        }
        if let Some(href) = self.href.as_deref().filter(|h| !h.is_empty()) {
            tree.set_attribute(el, "href", href)?;
        }
        match self.src.as_deref().filter(|s| !s.is_empty()) {
            Some(src) => tree.set_attribute(el, "src", src)?,
            None if tree.is_tag(el, "img") => {
                tree.set_attribute(el, "src", placeholder)?;
                tree.set_attribute(el, "style", "width: 120px")?;
            }
            None => {}
        }
        for (name, value) in &self.attributes {
            tree.set_attribute(el, name, value)?;
        }
        if !self.body.is_empty() {
            parse_fragment_into(&mut tree, el, &self.body)?;
        }
        if tree.is_tag(el, "ul") {
            tree.set_attribute(el, "contenteditable", "true")?;
        }
        Ok(get_outer_html(&tree, el))
    }
}

impl BlockDefinition {
    /// Live markup for this entry
    pub fn render(&self, placeholder: &str) -> EditorResult<String> {
        match &self.content {
            BlockContent::Markup(markup) => Ok(markup.clone()),
            BlockContent::Descriptor(descriptor) => descriptor.render(placeholder),
        }
    }

    /// Whether the entry instantiates a bare image
    pub fn is_image(&self) -> bool {
        matches!(&self.content, BlockContent::Descriptor(d) if d.tag.eq_ignore_ascii_case("img"))
    }

    pub fn category(&self) -> &str {
        self.category.as_deref().filter(|c| !c.trim().is_empty()).unwrap_or(DEFAULT_CATEGORY)
    }

    fn validate(&self) -> EditorResult<()> {
        match &self.content {
            BlockContent::Markup(markup) if markup.trim().is_empty() => {
                Err(EditorError::MalformedBlock("empty markup".to_string()))
            }
            BlockContent::Descriptor(d)
                if d.tag.is_empty() || !d.tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') =>
            {
                Err(EditorError::MalformedBlock(format!("bad tag {:?}", d.tag)))
            }
            _ => Ok(()),
        }
    }
}

/// Entries sharing a category, in registration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockCategory {
    pub name: String,
    pub indices: Vec<usize>,
}

/// Append-only catalog
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    blocks: Vec<BlockDefinition>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add definitions, skipping malformed ones. Returns the new indices.
    pub fn register(&mut self, definitions: impl IntoIterator<Item = BlockDefinition>) -> Vec<usize> {
        let mut added = Vec::new();
        for definition in definitions {
            if let Err(err) = definition.validate() {
                tracing::warn!("Skipping block {:?}: {}", definition.label, err);
                continue;
            }
            added.push(self.blocks.len());
            self.blocks.push(definition);
        }
        added
    }

    /// Add definitions from a JSON array. Entries that do not parse are
    /// skipped; only a non-array document is an error.
    pub fn register_json(&mut self, text: &str) -> EditorResult<Vec<usize>> {
        let entries: Vec<serde_json::Value> = serde_json::from_str(text)?;
        let definitions = entries.into_iter().enumerate().filter_map(|(i, entry)| {
            serde_json::from_value::<BlockDefinition>(entry)
                .map_err(|err| tracing::warn!("Skipping block entry {}: {}", i, err))
                .ok()
        });
        Ok(self.register(definitions.collect::<Vec<_>>()))
    }

    pub fn get(&self, index: usize) -> Option<&BlockDefinition> {
        self.blocks.get(index)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Group entries by category in order of first appearance
    pub fn categories(&self) -> Vec<BlockCategory> {
        let mut groups: Vec<BlockCategory> = Vec::new();
        for (index, block) in self.blocks.iter().enumerate() {
            let name = block.category();
            match groups.iter_mut().find(|g| g.name == name) {
                Some(group) => group.indices.push(index),
                None => groups.push(BlockCategory { name: name.to_string(), indices: vec![index] }),
            }
        }
        groups
    }
}

impl Editor {
    pub fn register_blocks(&mut self, definitions: impl IntoIterator<Item = BlockDefinition>) -> Vec<usize> {
        let added = self.blocks.register(definitions);
        tracing::debug!("Registered {} blocks ({} total)", added.len(), self.blocks.len());
        added
    }

    /// Register from JSON; a document that is not an array registers nothing
    pub fn register_blocks_json(&mut self, text: &str) -> Vec<usize> {
        match self.blocks.register_json(text) {
            Ok(added) => added,
            Err(err) => {
                tracing::warn!("register_blocks_json: {}", err);
                Vec::new()
            }
        }
    }

    pub fn blocks(&self) -> &BlockRegistry {
        &self.blocks
    }
}
