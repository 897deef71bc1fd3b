//! Inline style contract
//!
//! Editor-driven declarations are written with `!important` so they win
//! over authored styles; clearing one falls back to whatever the content
//! itself says. Nothing here checkpoints. Callers decide when an edit is
//! complete.

use std::collections::HashMap;

use easel_dom::{Declaration, DomTree, NodeId};
use lightningcss::traits::Parse;
use lightningcss::values::color::CssColor;

use crate::{Editor, EditorError, EditorResult};

/// Set a declaration with forced precedence, or remove it when `value`
/// is empty or absent
pub(crate) fn set_declaration(tree: &mut DomTree, node: NodeId, property: &str, value: Option<&str>) -> EditorResult<()> {
    if tree.element(node).is_none() {
        return Err(EditorError::Detached(node));
    }
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => tree.set_style(node, property, value, true)?,
        None => {
            tree.remove_style(node, property);
        }
    }
    Ok(())
}

/// Geometry overrides that can be fully reverted.
///
/// The first time a property is touched on a node its prior inline
/// declaration (or its absence) is remembered; later touches keep that
/// first value.
#[derive(Debug, Clone, Default)]
pub struct TemporaryStyles {
    saved: HashMap<NodeId, Vec<(String, Option<Declaration>)>>,
    order: Vec<NodeId>,
}

impl TemporaryStyles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, tree: &mut DomTree, node: NodeId, styles: &[(&str, &str)]) -> EditorResult<()> {
        if tree.element(node).is_none() {
            return Err(EditorError::Detached(node));
        }
        if !self.saved.contains_key(&node) {
            self.order.push(node);
        }
        let saved = self.saved.entry(node).or_default();
        for (property, value) in styles {
            let property = property.trim().to_ascii_lowercase();
            if !saved.iter().any(|(p, _)| *p == property) {
                let original = tree.style(node).and_then(|s| s.declaration(&property)).cloned();
                saved.push((property.clone(), original));
            }
            tree.set_style(node, &property, value, false)?;
        }
        Ok(())
    }

    /// Put every remembered property back and forget them. Nodes that no
    /// longer exist are skipped. Returns how many nodes were restored.
    pub fn restore_all(&mut self, tree: &mut DomTree) -> usize {
        let mut restored = 0;
        for node in self.order.drain(..) {
            let Some(saved) = self.saved.remove(&node) else {
                continue;
            };
            let Some(style) = tree.style_mut(node) else {
                continue;
            };
            for (property, original) in saved {
                match original {
                    Some(decl) => style.set(&decl.property, &decl.value, decl.important),
                    None => {
                        style.remove(&property);
                    }
                }
            }
            restored += 1;
        }
        self.saved.clear();
        restored
    }

    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }
}

/// RGB color stored canonically as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse any CSS color that resolves to sRGB. Alpha is dropped;
    /// `currentColor` and other context-dependent colors give `None`.
    pub fn parse(value: &str) -> Option<Self> {
        let color = CssColor::parse_string(value.trim()).ok()?;
        match color.to_rgb().ok()? {
            CssColor::RGBA(rgba) => Some(Self::new(rgba.red, rgba.green, rgba.blue)),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Editor {
    /// Set (or with `None`/empty, remove) one declaration. No checkpoint.
    pub fn set_declaration(&mut self, node: NodeId, property: &str, value: Option<&str>) -> bool {
        if !self.surface.is_content(node) {
            tracing::warn!("set_declaration: {} is not in the content", node);
            return false;
        }
        match set_declaration(self.surface.tree_mut(), node, property, value) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("set_declaration: {}", err);
                false
            }
        }
    }

    /// Inline value of a declaration
    pub fn declaration(&self, node: NodeId, property: &str) -> Option<String> {
        self.surface.tree().style(node)?.get(property).map(str::to_string)
    }

    /// Remove the declaration when it already equals `value`, otherwise
    /// set it. Returns whether it is set afterwards. No checkpoint.
    pub fn toggle_declaration(&mut self, node: NodeId, property: &str, value: &str) -> bool {
        let active = self.declaration(node, property).as_deref() == Some(value.trim());
        if active {
            self.set_declaration(node, property, None);
            false
        } else {
            self.set_declaration(node, property, Some(value))
        }
    }

    /// Store a color canonically as `#rrggbb`. No checkpoint.
    pub fn set_color(&mut self, node: NodeId, property: &str, value: &str) -> bool {
        match Color::parse(value) {
            Some(color) => self.set_declaration(node, property, Some(&color.to_hex())),
            None => {
                tracing::warn!("set_color: unrecognised color {:?}", value);
                false
            }
        }
    }

    /// Color as a color field shows it
    pub fn display_color(&self, node: NodeId, property: &str) -> String {
        match self.declaration(node, property) {
            Some(value) => Color::parse(&value).map_or_else(|| "#ffffff".to_string(), Color::to_hex),
            None => "#000000".to_string(),
        }
    }

    /// Override styles until [`Editor::restore_all`]. No checkpoint.
    pub fn apply_temporary(&mut self, node: NodeId, styles: &[(&str, &str)]) -> bool {
        match self.temporary.apply(self.surface.tree_mut(), node, styles) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("apply_temporary: {}", err);
                false
            }
        }
    }

    /// Revert every temporary override
    pub fn restore_all(&mut self) -> usize {
        let restored = self.temporary.restore_all(self.surface.tree_mut());
        tracing::debug!("Restored temporary styles on {} nodes", restored);
        restored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn styled() -> (DomTree, NodeId) {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        tree.set_attribute(div, "style", "width: 50%; color: red").unwrap();
        tree.append_child(tree.root(), div).unwrap();
        (tree, div)
    }

    #[test]
    fn test_set_declaration_forces_precedence() {
        let (mut tree, div) = styled();
        set_declaration(&mut tree, div, "color", Some("blue")).unwrap();
        assert!(tree.style(div).unwrap().is_important("color"));
        assert_eq!(tree.style(div).unwrap().get("color"), Some("blue"));

        set_declaration(&mut tree, div, "color", Some("  ")).unwrap();
        assert!(tree.style(div).unwrap().get("color").is_none());
        assert_eq!(tree.style(div).unwrap().get("width"), Some("50%"));
    }

    #[test]
    fn test_temporary_remembers_first_touch() {
        let (mut tree, div) = styled();
        let mut temp = TemporaryStyles::new();

        temp.apply(&mut tree, div, &[("width", "100vw"), ("height", "100vh")]).unwrap();
        temp.apply(&mut tree, div, &[("width", "375px")]).unwrap();
        assert_eq!(tree.style(div).unwrap().get("width"), Some("375px"));

        assert_eq!(temp.restore_all(&mut tree), 1);
        let style = tree.style(div).unwrap();
        assert_eq!(style.get("width"), Some("50%"));
        assert!(style.get("height").is_none());
        assert!(temp.is_empty());
    }

    #[test]
    fn test_restore_skips_dead_nodes() {
        let (mut tree, div) = styled();
        let mut temp = TemporaryStyles::new();
        temp.apply(&mut tree, div, &[("width", "1px")]).unwrap();
        tree.destroy(div).unwrap();
        assert_eq!(temp.restore_all(&mut tree), 0);
    }

    #[test]
    fn test_color_parse() {
        assert_eq!(Color::parse("#F00"), Some(Color::new(255, 0, 0)));
        assert_eq!(Color::parse("#00ff7f").unwrap().to_hex(), "#00ff7f");
        assert_eq!(Color::parse("rgb(255, 0, 0)").unwrap().to_hex(), "#ff0000");
        assert_eq!(Color::parse("rgba(0 128 255 / 0.5)").unwrap().to_hex(), "#0080ff");
        assert_eq!(Color::parse("White").unwrap().to_hex(), "#ffffff");
        assert!(Color::parse("#12").is_none());
        assert!(Color::parse("rgb(1,2)").is_none());
        assert!(Color::parse("not-a-color").is_none());
    }

    #[test]
    fn test_color_parse_named_and_functional() {
        assert_eq!(Color::parse("navy").unwrap().to_hex(), "#000080");
        assert_eq!(Color::parse("teal").unwrap().to_hex(), "#008080");
        assert_eq!(Color::parse("rebeccapurple").unwrap().to_hex(), "#663399");
        assert_eq!(Color::parse("hsl(120, 100%, 25%)").unwrap().to_hex(), "#008000");
        assert_eq!(Color::parse("hsl(0deg 100% 50%)").unwrap().to_hex(), "#ff0000");
    }

    #[test]
    fn test_current_color_has_no_value() {
        assert!(Color::parse("currentColor").is_none());
        assert!(Color::parse("currentcolor").is_none());
    }
}
