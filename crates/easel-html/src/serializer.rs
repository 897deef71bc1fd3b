//! HTML Serialization (innerHTML/outerHTML)
//!
//! Serializes arena nodes back to markup.
//!
//! Key features:
//! - innerHTML/outerHTML serialization
//! - Proper HTML escaping
//! - Void element handling
//! - Inline style rendered as the `style` attribute
//! - Filters for editor-only attributes, classes and elements

use easel_dom::{DomTree, NodeData, NodeId, SelectorList};

/// HTML serializer
#[derive(Debug, Clone)]
pub struct HtmlSerializer {
    /// Whether to format output with indentation
    pub pretty_print: bool,
    /// Indentation string
    pub indent: String,
    /// Attributes left out of the output
    pub strip_attributes: Vec<String>,
    /// Class tokens left out of the output
    pub strip_classes: Vec<String>,
    /// Elements left out entirely
    pub skip: SelectorList,
    /// Elements replaced by their children
    pub unwrap: SelectorList,
}

/// Void elements (self-closing, no end tag)
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input",
    "link", "meta", "param", "source", "track", "wbr",
];

/// Raw text elements (no escaping for content)
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

impl Default for HtmlSerializer {
    fn default() -> Self {
        Self {
            pretty_print: false,
            indent: "  ".to_string(),
            strip_attributes: Vec::new(),
            strip_classes: Vec::new(),
            skip: SelectorList::empty(),
            unwrap: SelectorList::empty(),
        }
    }
}

impl HtmlSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self {
            pretty_print: true,
            ..Self::default()
        }
    }

    /// Leave these attributes out
    pub fn strip_attributes<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        self.strip_attributes
            .extend(names.iter().map(|n| n.as_ref().to_ascii_lowercase()));
        self
    }

    /// Leave these class tokens out
    pub fn strip_classes<S: AsRef<str>>(mut self, classes: &[S]) -> Self {
        self.strip_classes
            .extend(classes.iter().map(|c| c.as_ref().to_string()));
        self
    }

    /// Drop matching elements with their subtree
    pub fn skip_elements(mut self, selectors: SelectorList) -> Self {
        self.skip = selectors;
        self
    }

    /// Emit only the children of matching elements
    pub fn unwrap_elements(mut self, selectors: SelectorList) -> Self {
        self.unwrap = selectors;
        self
    }

    /// Serialize innerHTML of a node (children only)
    pub fn serialize_inner(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_children(tree, node_id, &mut output, 0);
        output
    }

    /// Serialize outerHTML of a node (including the node itself)
    pub fn serialize_outer(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_node(tree, node_id, &mut output, 0);
        output
    }

    /// Serialize a node and its descendants
    fn serialize_node(&self, tree: &DomTree, node_id: NodeId, output: &mut String, depth: usize) {
        let Some(node) = tree.get(node_id) else {
            return;
        };

        match &node.data {
            NodeData::Document => {
                self.serialize_children(tree, node_id, output, depth);
            }
            NodeData::Element(elem) => {
                if self.skip.matches(tree, node_id) {
                    return;
                }
                if self.unwrap.matches(tree, node_id) {
                    self.serialize_children(tree, node_id, output, depth);
                    return;
                }

                let tag = elem.tag.as_str();
                let is_void = VOID_ELEMENTS.contains(&tag);
                let is_raw = RAW_TEXT_ELEMENTS.contains(&tag);

                if self.pretty_print && depth > 0 {
                    output.push('\n');
                    for _ in 0..depth {
                        output.push_str(&self.indent);
                    }
                }

                output.push('<');
                output.push_str(tag);

                for attr in &elem.attrs {
                    if self.strip_attributes.iter().any(|n| *n == attr.name) {
                        continue;
                    }
                    let value = if attr.name == "class" && !self.strip_classes.is_empty() {
                        let kept: Vec<&str> = attr
                            .value
                            .split_whitespace()
                            .filter(|c| !self.strip_classes.iter().any(|s| s == c))
                            .collect();
                        if kept.is_empty() {
                            continue;
                        }
                        kept.join(" ")
                    } else {
                        attr.value.clone()
                    };
                    write_attribute(output, &attr.name, &value);
                }
                if !elem.style.is_empty() && !self.strip_attributes.iter().any(|n| n == "style") {
                    write_attribute(output, "style", &elem.style.to_css());
                }

                if is_void {
                    output.push_str(" />");
                } else {
                    output.push('>');

                    if is_raw {
                        self.serialize_children_raw(tree, node_id, output);
                    } else {
                        self.serialize_children(tree, node_id, output, depth + 1);
                    }

                    if self.pretty_print && node.first_child.is_some() {
                        output.push('\n');
                        for _ in 0..depth {
                            output.push_str(&self.indent);
                        }
                    }
                    output.push_str("</");
                    output.push_str(tag);
                    output.push('>');
                }
            }
            NodeData::Text(text) => {
                escape_text(&text.content, output);
            }
            NodeData::Comment(text) => {
                output.push_str("<!--");
                output.push_str(text);
                output.push_str("-->");
            }
        }
    }

    fn serialize_children(&self, tree: &DomTree, parent_id: NodeId, output: &mut String, depth: usize) {
        for (child_id, _) in tree.children(parent_id) {
            self.serialize_node(tree, child_id, output, depth);
        }
    }

    fn serialize_children_raw(&self, tree: &DomTree, parent_id: NodeId, output: &mut String) {
        for (_child_id, child) in tree.children(parent_id) {
            if let NodeData::Text(text) = &child.data {
                output.push_str(&text.content);
            }
        }
    }
}

fn write_attribute(output: &mut String, name: &str, value: &str) {
    output.push(' ');
    output.push_str(name);
    if !value.is_empty() {
        output.push_str("=\"");
        escape_attribute(value, output);
        output.push('"');
    }
}

/// Escape text content for HTML
fn escape_text(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            _ => output.push(c),
        }
    }
}

/// Escape attribute value
fn escape_attribute(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '"' => output.push_str("&quot;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}

/// Utility: Get innerHTML of an element
pub fn get_inner_html(tree: &DomTree, node_id: NodeId) -> String {
    HtmlSerializer::new().serialize_inner(tree, node_id)
}

/// Utility: Get outerHTML of an element
pub fn get_outer_html(tree: &DomTree, node_id: NodeId) -> String {
    HtmlSerializer::new().serialize_outer(tree, node_id)
}
