//! easel DOM - editable content tree
//!
//! Arena-allocated element tree with generational node handles, inline
//! style maps, selector matching and host-supplied layout boxes.

mod error;
mod geometry;
mod node;
mod selector;
mod style;
mod tree;

pub use error::{DomError, DomResult};
pub use geometry::Rect;
pub use node::{Attribute, ElementData, Node, NodeData, TextData};
pub use selector::{AttributeMatcher, AttributeSelector, Combinator, Compound, Selector, SelectorList};
pub use style::{Declaration, InlineStyle};
pub use tree::{Children, DomTree};

/// Node handle (slot index + slot generation)
///
/// A handle outlives the node it names: once the node is destroyed the
/// slot generation moves on and every lookup through the old handle
/// returns `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    /// Slot index (stable while the node lives)
    #[inline]
    pub fn index(self) -> u32 {
        self.index
    }

    /// Slot generation at the time the handle was issued
    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}
