//! DOM Tree (arena-based allocation)
//!
//! Slots are recycled through a free list. Each slot carries a
//! generation that is bumped when its node is destroyed, which turns
//! every outstanding `NodeId` for that node into a stale handle.

use std::collections::HashMap;

use crate::{DomError, DomResult, ElementData, InlineStyle, Node, NodeData, NodeId, Rect, TextData};

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena-based DOM tree
#[derive(Debug, Clone)]
pub struct DomTree {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    root: NodeId,
    live: usize,
    /// Layout boxes reported by the host
    layout: HashMap<NodeId, Rect>,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// Create a tree holding only a document node
    pub fn new() -> Self {
        let mut tree = Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            root: NodeId { index: 0, generation: 0 },
            live: 0,
            layout: HashMap::new(),
        };
        tree.root = tree.alloc(Node::new(NodeData::Document));
        tree
    }

    /// Document node
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        self.live += 1;
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId { index, generation: slot.generation }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot { generation: 0, node: Some(node) });
            NodeId { index, generation: 0 }
        }
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(Node::new(NodeData::Element(ElementData::new(tag))))
    }

    /// Create a detached element from prepared data
    pub fn create_element_with(&mut self, data: ElementData) -> NodeId {
        self.alloc(Node::new(NodeData::Element(data)))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(Node::new(NodeData::Text(TextData { content: text.to_string() })))
    }

    /// Create a detached comment
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.alloc(Node::new(NodeData::Comment(text.to_string())))
    }

    /// Get a node by ID (None when stale)
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// Whether the handle still names a live node
    #[inline]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::StaleNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.get_mut(id).ok_or(DomError::StaleNode(id))
    }

    /// Number of live nodes (attached or detached)
    pub fn len(&self) -> usize {
        self.live
    }

    /// True when only the document node exists
    pub fn is_empty(&self) -> bool {
        self.live <= 1
    }

    // === Element access ===

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(Node::as_element_mut)
    }

    fn element_mut_or_err(&mut self, id: NodeId) -> DomResult<&mut ElementData> {
        let node = self.node_mut(id)?;
        node.as_element_mut().ok_or(DomError::NotAnElement(id))
    }

    /// Lowercase tag name
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    /// True if `id` is an element with the given tag
    pub fn is_tag(&self, id: NodeId, tag: &str) -> bool {
        self.element(id).is_some_and(|e| e.has_tag(tag))
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.get_attr(name))
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.element(id).is_some_and(|e| e.has_attr(name))
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        self.element_mut_or_err(id)?.set_attr(name, value);
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        self.element_mut(id).and_then(|e| e.remove_attr(name))
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|e| e.has_class(class))
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) -> DomResult<()> {
        self.element_mut_or_err(id)?.add_class(class);
        Ok(())
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(elem) = self.element_mut(id) {
            elem.remove_class(class);
        }
    }

    // === Inline style ===

    pub fn style(&self, id: NodeId) -> Option<&InlineStyle> {
        self.element(id).map(|e| &e.style)
    }

    pub fn style_mut(&mut self, id: NodeId) -> Option<&mut InlineStyle> {
        self.element_mut(id).map(|e| &mut e.style)
    }

    /// Set one inline declaration
    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str, important: bool) -> DomResult<()> {
        self.element_mut_or_err(id)?.style.set(property, value, important);
        Ok(())
    }

    /// Remove one inline declaration
    pub fn remove_style(&mut self, id: NodeId, property: &str) -> Option<String> {
        self.style_mut(id)
            .and_then(|s| s.remove(property))
            .map(|d| d.value)
    }

    // === Navigation ===

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Iterate children as `(id, node)` pairs
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.get(id).and_then(|n| n.first_child),
        }
    }

    /// Element children only
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .filter(|(_, node)| node.is_element())
            .map(|(child, _)| child)
            .collect()
    }

    /// Position among the parent's element children
    pub fn element_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.element_children(parent).iter().position(|&c| c == id)
    }

    /// Element child at a position
    pub fn element_child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.element_children(parent).get(index).copied()
    }

    /// Ancestors from the parent upwards
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    /// Inclusive ancestry test: `ancestor == node` or above it
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        if !self.is_alive(ancestor) || !self.is_alive(node) {
            return false;
        }
        ancestor == node || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Whether the node hangs off the document
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(self.root, id)
    }

    /// All descendants in document order (excluding `id`)
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).map(|(c, _)| c).collect();
        stack.reverse();
        while let Some(next) = stack.pop() {
            out.push(next);
            let mut kids: Vec<NodeId> = self.children(next).map(|(c, _)| c).collect();
            kids.reverse();
            stack.extend(kids);
        }
        out
    }

    // === Mutation ===

    /// Append `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` as the first child of `parent`
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let first = self.node(parent)?.first_child;
        self.insert_before(parent, child, first)
    }

    /// Insert `child` before `reference` (append when None)
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) -> DomResult<()> {
        self.node(parent)?;
        self.node(child)?;
        if child == self.root || self.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        if let Some(reference) = reference {
            if self.node(reference)?.parent != Some(parent) {
                return Err(DomError::NotAChild { parent, child: reference });
            }
            if reference == child {
                return Ok(());
            }
        }

        self.detach(child);

        let (prev, next) = match reference {
            Some(reference) => (self.node(reference)?.prev_sibling, Some(reference)),
            None => (self.node(parent)?.last_child, None),
        };

        {
            let node = self.node_mut(child)?;
            node.parent = Some(parent);
            node.prev_sibling = prev;
            node.next_sibling = next;
        }
        match prev {
            Some(prev) => self.node_mut(prev)?.next_sibling = Some(child),
            None => self.node_mut(parent)?.first_child = Some(child),
        }
        match next {
            Some(next) => self.node_mut(next)?.prev_sibling = Some(child),
            None => self.node_mut(parent)?.last_child = Some(child),
        }
        Ok(())
    }

    /// Insert `child` right after `reference`, under the same parent
    pub fn insert_after(&mut self, reference: NodeId, child: NodeId) -> DomResult<()> {
        let node = self.node(reference)?;
        let parent = node.parent.ok_or(DomError::HierarchyRequest { parent: reference, child })?;
        let next = node.next_sibling;
        if next == Some(child) {
            return Ok(());
        }
        self.insert_before(parent, child, next)
    }

    /// Put `replacement` where `old` is, detaching `old`
    pub fn replace_with(&mut self, old: NodeId, replacement: NodeId) -> DomResult<()> {
        let parent = self
            .node(old)?
            .parent
            .ok_or(DomError::HierarchyRequest { parent: old, child: replacement })?;
        self.insert_before(parent, replacement, Some(old))?;
        self.detach(old);
        Ok(())
    }

    /// Unlink a node from its parent, keeping its subtree alive
    pub fn detach(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else {
            return;
        };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);
        let Some(parent) = parent else {
            return;
        };

        match prev {
            Some(prev) => {
                if let Some(p) = self.get_mut(prev) {
                    p.next_sibling = next;
                }
            }
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.first_child = next;
                }
            }
        }
        match next {
            Some(next) => {
                if let Some(n) = self.get_mut(next) {
                    n.prev_sibling = prev;
                }
            }
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.last_child = prev;
                }
            }
        }
        if let Some(node) = self.get_mut(id) {
            node.parent = None;
            node.prev_sibling = None;
            node.next_sibling = None;
        }
    }

    /// Detach and free a node with its whole subtree
    pub fn destroy(&mut self, id: NodeId) -> DomResult<()> {
        self.node(id)?;
        if id == self.root {
            return Err(DomError::HierarchyRequest { parent: id, child: id });
        }
        self.detach(id);

        let mut doomed = self.descendants(id);
        doomed.push(id);
        for node in doomed {
            let slot = &mut self.slots[node.index as usize];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free_list.push(node.index);
            self.layout.remove(&node);
            self.live -= 1;
        }
        Ok(())
    }

    /// Destroy every child of `id`
    pub fn clear_children(&mut self, id: NodeId) {
        let kids: Vec<NodeId> = self.children(id).map(|(c, _)| c).collect();
        for kid in kids {
            let _ = self.destroy(kid);
        }
    }

    /// Deep-clone a subtree into a new detached subtree
    pub fn clone_subtree(&mut self, id: NodeId) -> DomResult<NodeId> {
        let data = self.node(id)?.data.clone();
        let copy = self.alloc(Node::new(data));
        let kids: Vec<NodeId> = self.children(id).map(|(c, _)| c).collect();
        for kid in kids {
            let kid_copy = self.clone_subtree(kid)?;
            self.append_child(copy, kid_copy)?;
        }
        Ok(copy)
    }

    // === Text ===

    /// Concatenated text of the subtree
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(text) = self.get(id).and_then(Node::as_text) {
            out.push_str(text);
        }
        for node in self.descendants(id) {
            if let Some(text) = self.get(node).and_then(Node::as_text) {
                out.push_str(text);
            }
        }
        out
    }

    /// Replace all children with a single text node
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> DomResult<()> {
        let node = self.node_mut(id)?;
        if let NodeData::Text(data) = &mut node.data {
            data.content = text.to_string();
            return Ok(());
        }
        self.clear_children(id);
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.append_child(id, text_node)?;
        }
        Ok(())
    }

    // === Layout ===

    /// Record the host's layout box for a node
    pub fn set_layout_box(&mut self, id: NodeId, rect: Rect) {
        if self.is_alive(id) {
            self.layout.insert(id, rect);
        }
    }

    pub fn layout_box(&self, id: NodeId) -> Option<Rect> {
        self.layout.get(&id).copied()
    }

    pub fn clear_layout(&mut self) {
        self.layout.clear();
    }
}

/// Child iterator
pub struct Children<'a> {
    tree: &'a DomTree,
    next: Option<NodeId>,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_tree() -> (DomTree, NodeId, Vec<NodeId>) {
        let mut tree = DomTree::new();
        let ul = tree.create_element("ul");
        tree.append_child(tree.root(), ul).unwrap();
        let items: Vec<NodeId> = (0..3)
            .map(|i| {
                let li = tree.create_element("li");
                let text = tree.create_text(&format!("item {i}"));
                tree.append_child(li, text).unwrap();
                tree.append_child(ul, li).unwrap();
                li
            })
            .collect();
        (tree, ul, items)
    }

    #[test]
    fn test_append_and_order() {
        let (tree, ul, items) = list_tree();
        assert_eq!(tree.element_children(ul), items);
        assert_eq!(tree.element_index(items[2]), Some(2));
        assert_eq!(tree.text_content(ul), "item 0item 1item 2");
    }

    #[test]
    fn test_insert_before_moves_node() {
        let (mut tree, ul, items) = list_tree();
        tree.insert_before(ul, items[2], Some(items[0])).unwrap();
        assert_eq!(tree.element_children(ul), vec![items[2], items[0], items[1]]);

        tree.insert_after(items[1], items[2]).unwrap();
        assert_eq!(tree.element_children(ul), items);
    }

    #[test]
    fn test_hierarchy_request() {
        let (mut tree, ul, items) = list_tree();
        let err = tree.append_child(items[0], ul).unwrap_err();
        assert!(matches!(err, DomError::HierarchyRequest { .. }));

        let err = tree.append_child(ul, ul).unwrap_err();
        assert!(matches!(err, DomError::HierarchyRequest { .. }));
    }

    #[test]
    fn test_destroy_makes_handles_stale() {
        let (mut tree, ul, items) = list_tree();
        let before = tree.len();
        tree.destroy(items[1]).unwrap();

        assert!(!tree.is_alive(items[1]));
        assert_eq!(tree.len(), before - 2);
        assert_eq!(tree.element_children(ul), vec![items[0], items[2]]);

        // Recycled slot must not resurrect the old handle
        let fresh = tree.create_element("li");
        assert!(tree.is_alive(fresh));
        assert!(!tree.is_alive(items[1]));
    }

    #[test]
    fn test_clone_subtree_is_detached() {
        let (mut tree, ul, _) = list_tree();
        let copy = tree.clone_subtree(ul).unwrap();

        assert_eq!(tree.parent(copy), None);
        assert_eq!(tree.element_children(copy).len(), 3);
        assert!(!tree.is_connected(copy));
        assert!(tree.is_connected(ul));
    }

    #[test]
    fn test_set_text_content() {
        let (mut tree, _, items) = list_tree();
        tree.set_text_content(items[0], "changed").unwrap();
        assert_eq!(tree.text_content(items[0]), "changed");
    }

    #[test]
    fn test_layout_dropped_on_destroy() {
        let (mut tree, _, items) = list_tree();
        tree.set_layout_box(items[0], Rect::from_xywh(0.0, 0.0, 10.0, 10.0));
        assert!(tree.layout_box(items[0]).is_some());

        tree.destroy(items[0]).unwrap();
        assert!(tree.layout_box(items[0]).is_none());
    }
}
