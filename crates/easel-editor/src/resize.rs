//! Image Resize Handles
//!
//! An image being resized sits inside a `div.resize-wrapper` together
//! with four corner handles. The wrapper takes the image's old slot; the
//! slot is remembered in a [`PositionTable`] so deselection can put the
//! image back where it was.
//!
//! Handle drags map a pointer delta to a new size under one of three
//! modes:
//! - `Axis`: only the dominant pointer axis changes
//! - `Ratio`: the dominant axis changes and the other follows the aspect ratio
//! - `Free`: both axes change independently

use std::collections::{HashMap, HashSet};

use easel_dom::{DomTree, NodeId, Rect};

use crate::style::set_declaration;
use crate::{Editor, EditorError, EditorResult, HANDLE_CLASS, Modifiers, RESIZED_ATTR, WRAPPER_CLASS};

/// Width and height in CSS pixels
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Aspect ratio (1.0 when degenerate)
    pub fn ratio(&self) -> f64 {
        if self.width > 0.0 && self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    pub fn is_known(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Corner a handle sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::TopLeft, Corner::TopRight, Corner::BottomLeft, Corner::BottomRight];

    /// Value of the handle's `data-position` attribute
    pub fn as_str(self) -> &'static str {
        match self {
            Corner::TopLeft => "top-left",
            Corner::TopRight => "top-right",
            Corner::BottomLeft => "bottom-left",
            Corner::BottomRight => "bottom-right",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value.trim())
    }

    pub fn cursor(self) -> &'static str {
        match self {
            Corner::TopLeft | Corner::BottomRight => "nwse-resize",
            Corner::TopRight | Corner::BottomLeft => "nesw-resize",
        }
    }

    /// +1 when dragging right grows the width
    fn horizontal_sign(self) -> f64 {
        match self {
            Corner::TopRight | Corner::BottomRight => 1.0,
            Corner::TopLeft | Corner::BottomLeft => -1.0,
        }
    }

    /// +1 when dragging down grows the height
    fn vertical_sign(self) -> f64 {
        match self {
            Corner::BottomLeft | Corner::BottomRight => 1.0,
            Corner::TopLeft | Corner::TopRight => -1.0,
        }
    }

    /// `top` and `left` of the handle inside the wrapper
    fn anchor(self) -> (&'static str, &'static str) {
        match self {
            Corner::TopLeft => ("0", "0"),
            Corner::TopRight => ("0", "100%"),
            Corner::BottomLeft => ("100%", "0"),
            Corner::BottomRight => ("100%", "100%"),
        }
    }
}

/// How a handle drag maps to a size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeMode {
    #[default]
    Axis,
    Ratio,
    Free,
}

impl ResizeMode {
    /// `ctrl` locks the ratio, `shift` frees both axes
    pub fn from_modifiers(modifiers: Modifiers) -> Self {
        if modifiers.ctrl {
            ResizeMode::Ratio
        } else if modifiers.shift {
            ResizeMode::Free
        } else {
            ResizeMode::Axis
        }
    }
}

/// New size for a handle drag of `(dx, dy)` from `start`
pub fn resize_dimensions(start: Size, corner: Corner, mode: ResizeMode, dx: f64, dy: f64, min: f64) -> Size {
    let grow_w = |d: f64| (start.width + corner.horizontal_sign() * d).max(min);
    let grow_h = |d: f64| (start.height + corner.vertical_sign() * d).max(min);
    let horizontal = dx.abs() >= dy.abs();
    let ratio = start.ratio();

    match mode {
        ResizeMode::Axis if horizontal => Size::new(grow_w(dx), start.height),
        ResizeMode::Axis => Size::new(start.width, grow_h(dy)),
        ResizeMode::Ratio if horizontal => {
            let width = grow_w(dx);
            Size::new(width, (width / ratio).max(min))
        }
        ResizeMode::Ratio => {
            let height = grow_h(dy);
            Size::new((height * ratio).max(min), height)
        }
        ResizeMode::Free => Size::new(grow_w(dx), grow_h(dy)),
    }
}

/// Where a wrapped image came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OriginalPosition {
    pub parent: NodeId,
    /// Index among the parent's element children
    pub index: usize,
}

/// Side table of pre-wrap positions, keyed by generational handle.
/// Entries for destroyed images simply never resolve again.
#[derive(Debug, Clone, Default)]
pub struct PositionTable {
    records: HashMap<NodeId, OriginalPosition>,
    resized: HashSet<NodeId>,
}

impl PositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the first position only
    pub fn record(&mut self, image: NodeId, position: OriginalPosition) {
        self.records.entry(image).or_insert(position);
    }

    /// Overwrite after the wrapper itself was moved
    pub fn relocate(&mut self, image: NodeId, position: OriginalPosition) {
        self.records.insert(image, position);
    }

    /// Record for a live image
    pub fn get(&self, tree: &DomTree, image: NodeId) -> Option<OriginalPosition> {
        if !tree.is_alive(image) {
            return None;
        }
        self.records.get(&image).copied()
    }

    pub fn take(&mut self, image: NodeId) -> Option<OriginalPosition> {
        self.resized.remove(&image);
        self.records.remove(&image)
    }

    pub fn mark_resized(&mut self, image: NodeId) {
        self.resized.insert(image);
    }

    pub fn was_resized(&self, image: NodeId) -> bool {
        self.resized.contains(&image)
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.resized.clear();
    }

    /// Rebuild records for wrappers found under `scope`, such as those
    /// brought back by a restored snapshot. The wrapper's slot becomes
    /// the image's home; a wrapper flagged with [`RESIZED_ATTR`] keeps
    /// its image marked as resized. Returns how many were adopted.
    pub fn adopt(&mut self, tree: &DomTree, scope: NodeId) -> usize {
        let mut adopted = 0;
        for wrapper in tree.query_selector_all(scope, &format!(".{WRAPPER_CLASS}")) {
            let (Some(image), Some(parent), Some(index)) =
                (image_in(tree, wrapper), tree.parent(wrapper), tree.element_index(wrapper))
            else {
                continue;
            };
            self.relocate(image, OriginalPosition { parent, index });
            if tree.has_attribute(wrapper, RESIZED_ATTR) {
                self.mark_resized(image);
            }
            adopted += 1;
        }
        adopted
    }

    /// Drop entries whose image is gone
    pub fn prune(&mut self, tree: &DomTree) {
        self.records.retain(|id, _| tree.is_alive(*id));
        self.resized.retain(|id| tree.is_alive(*id));
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The wrapper around an image, if any
pub(crate) fn wrapper_of(tree: &DomTree, image: NodeId) -> Option<NodeId> {
    if !tree.is_tag(image, "img") {
        return None;
    }
    tree.parent(image).filter(|&p| tree.has_class(p, WRAPPER_CLASS))
}

/// The image a wrapper owns
pub(crate) fn image_in(tree: &DomTree, wrapper: NodeId) -> Option<NodeId> {
    tree.element_children(wrapper)
        .into_iter()
        .find(|&c| tree.is_tag(c, "img"))
}

/// Current rendered size: layout box, then inline px, then attributes
pub(crate) fn measure(tree: &DomTree, image: NodeId) -> Size {
    if let Some(rect) = tree.layout_box(image).filter(|r| !r.is_empty()) {
        return Size::new(rect.width, rect.height);
    }
    let from_style = |prop: &str| tree.style(image).and_then(|s| s.get(prop)).and_then(parse_px);
    let from_attr = |name: &str| tree.get_attribute(image, name).and_then(parse_px);
    Size::new(
        from_style("width").or_else(|| from_attr("width")).unwrap_or(0.0),
        from_style("height").or_else(|| from_attr("height")).unwrap_or(0.0),
    )
}

fn parse_px(value: &str) -> Option<f64> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value).trim();
    number.parse::<f64>().ok().filter(|v| v.is_finite() && *v > 0.0)
}

pub(crate) fn format_px(value: f64) -> String {
    format!("{}px", (value * 100.0).round() / 100.0)
}

/// Write a size to the image and its wrapper
pub(crate) fn apply_size(tree: &mut DomTree, image: NodeId, wrapper: Option<NodeId>, size: Size) -> EditorResult<()> {
    set_declaration(tree, image, "width", Some(&format_px(size.width)))?;
    set_declaration(tree, image, "height", Some(&format_px(size.height)))?;
    if let Some(wrapper) = wrapper {
        tree.set_style(wrapper, "width", &format_px(size.width), false)?;
        tree.set_style(wrapper, "height", &format_px(size.height), false)?;
    }
    for node in std::iter::once(image).chain(wrapper) {
        if let Some(rect) = tree.layout_box(node) {
            tree.set_layout_box(node, Rect::from_xywh(rect.x, rect.y, size.width, size.height));
        }
    }
    Ok(())
}

const WRAPPER_STYLE: &[(&str, &str)] = &[
    ("position", "relative"),
    ("display", "inline-block"),
    ("box-sizing", "border-box"),
    ("padding", "0"),
    ("margin", "0"),
    ("border", "none"),
    ("overflow", "visible"),
];

const HANDLE_STYLE: &[(&str, &str)] = &[
    ("position", "absolute"),
    ("width", "8px"),
    ("height", "8px"),
    ("background", "#fff"),
    ("border", "1px solid #666"),
    ("border-radius", "50%"),
    ("z-index", "9999"),
    ("user-select", "none"),
    ("pointer-events", "auto"),
    ("transform", "translate(-50%, -50%)"),
];

/// Pin the image size, wrap it if needed and make sure each corner has
/// exactly one handle. Returns the wrapper.
pub(crate) fn attach_handles(tree: &mut DomTree, positions: &mut PositionTable, image: NodeId) -> EditorResult<NodeId> {
    if !tree.is_tag(image, "img") {
        return Err(EditorError::NotAnImage(image));
    }
    let parent = tree.parent(image).ok_or(EditorError::Detached(image))?;

    let size = measure(tree, image);
    if size.is_known() {
        set_declaration(tree, image, "width", Some(&format_px(size.width)))?;
        set_declaration(tree, image, "height", Some(&format_px(size.height)))?;
    } else {
        tracing::debug!("Image {} has no measurable size; leaving it unpinned", image);
    }
    for (property, value) in [
        ("display", "block"),
        ("max-width", "none"),
        ("max-height", "none"),
        ("box-sizing", "border-box"),
    ] {
        set_declaration(tree, image, property, Some(value))?;
    }

    let wrapper = if tree.has_class(parent, WRAPPER_CLASS) {
        parent
    } else {
        let index = tree.element_index(image).unwrap_or(0);
        positions.record(image, OriginalPosition { parent, index });

        let wrapper = tree.create_element("div");
        tree.add_class(wrapper, WRAPPER_CLASS)?;
        for (property, value) in WRAPPER_STYLE {
            tree.set_style(wrapper, property, value, false)?;
        }
        tree.insert_before(parent, wrapper, Some(image))?;
        tree.append_child(wrapper, image)?;
        tracing::debug!("Wrapped image {} (slot {} of {})", image, index, parent);
        wrapper
    };

    if size.is_known() {
        tree.set_style(wrapper, "width", &format_px(size.width), false)?;
        tree.set_style(wrapper, "height", &format_px(size.height), false)?;
    }
    if let Some(rect) = tree.layout_box(image) {
        tree.set_layout_box(wrapper, rect);
    }

    ensure_handles(tree, wrapper)?;
    Ok(wrapper)
}

fn ensure_handles(tree: &mut DomTree, wrapper: NodeId) -> EditorResult<()> {
    let mut present = HashSet::new();
    for child in tree.element_children(wrapper) {
        if !tree.has_class(child, HANDLE_CLASS) {
            continue;
        }
        let corner = tree.get_attribute(child, "data-position").and_then(Corner::parse);
        match corner {
            Some(corner) if present.insert(corner) => {}
            // Duplicate or unknown corner
            _ => tree.destroy(child)?,
        }
    }

    for corner in Corner::ALL {
        if present.contains(&corner) {
            continue;
        }
        let handle = tree.create_element("div");
        tree.set_attribute(handle, "class", &format!("{HANDLE_CLASS} {}", corner.as_str()))?;
        tree.set_attribute(handle, "data-position", corner.as_str())?;
        for (property, value) in HANDLE_STYLE {
            tree.set_style(handle, property, value, false)?;
        }
        let (top, left) = corner.anchor();
        tree.set_style(handle, "top", top, false)?;
        tree.set_style(handle, "left", left, false)?;
        tree.set_style(handle, "cursor", corner.cursor(), false)?;
        tree.append_child(wrapper, handle)?;
    }
    Ok(())
}

/// Take an image out of its wrapper and destroy the wrapper.
///
/// Without `force`, a resized image or one with no recorded position
/// keeps its wrapper. Returns whether the image was unwrapped.
pub(crate) fn release_image(
    tree: &mut DomTree,
    positions: &mut PositionTable,
    image: NodeId,
    force: bool,
) -> EditorResult<bool> {
    let Some(wrapper) = wrapper_of(tree, image) else {
        return Ok(false);
    };
    if !force && positions.was_resized(image) {
        tracing::debug!("Image {} was resized; keeping its wrapper", image);
        return Ok(false);
    }
    let record = positions.get(tree, image);
    if record.is_none() && !force {
        tracing::debug!("Image {} has no recorded position; keeping its wrapper", image);
        return Ok(false);
    }

    let home = record.filter(|r| {
        tree.is_alive(r.parent) && !tree.contains(wrapper, r.parent) && tree.parent(wrapper).is_some()
    });
    match home {
        Some(record) => {
            let reference = tree.element_child_at(record.parent, record.index);
            tree.insert_before(record.parent, image, reference)?;
        }
        None => {
            let parent = tree.parent(wrapper).ok_or(EditorError::Detached(wrapper))?;
            tree.insert_before(parent, image, Some(wrapper))?;
        }
    }
    positions.take(image);
    tree.destroy(wrapper)?;
    tracing::debug!("Unwrapped image {}", image);
    Ok(true)
}

/// In-flight handle drag
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeDrag {
    pub image: NodeId,
    pub wrapper: NodeId,
    pub corner: Corner,
    pub origin: (f64, f64),
    pub start: Size,
    pub last: Size,
}

impl ResizeDrag {
    pub fn new(image: NodeId, wrapper: NodeId, corner: Corner, origin: (f64, f64), start: Size) -> Self {
        Self { image, wrapper, corner, origin, start, last: start }
    }

    /// Size for the pointer at `(x, y)`; the mode is read per move
    pub fn update(&mut self, x: f64, y: f64, modifiers: Modifiers, min: f64) -> Size {
        let mode = ResizeMode::from_modifiers(modifiers);
        self.last = resize_dimensions(self.start, self.corner, mode, x - self.origin.0, y - self.origin.1, min);
        self.last
    }

    pub fn changed(&self) -> bool {
        self.last != self.start
    }
}

impl Editor {
    /// Wrap an image and give it four handles. No checkpoint.
    pub fn attach_handles(&mut self, image: NodeId) -> bool {
        if !self.surface.is_content(image) {
            tracing::warn!("attach_handles: {} is not in the content", image);
            return false;
        }
        match attach_handles(self.surface.tree_mut(), &mut self.positions, image) {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!("attach_handles: {}", err);
                false
            }
        }
    }

    /// Put an image back where it was before wrapping. No checkpoint.
    pub fn detach_handles(&mut self, image: NodeId) -> bool {
        match release_image(self.surface.tree_mut(), &mut self.positions, image, true) {
            Ok(done) => done,
            Err(err) => {
                tracing::warn!("detach_handles: {}", err);
                false
            }
        }
    }

    /// Active handle drag, if any
    pub fn resize_drag(&self) -> Option<&ResizeDrag> {
        self.resize.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_page() -> (DomTree, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let section = tree.create_element("section");
        tree.append_child(tree.root(), section).unwrap();
        for tag in ["h1", "p"] {
            let el = tree.create_element(tag);
            tree.append_child(section, el).unwrap();
        }
        let img = tree.create_element("img");
        tree.set_attribute(img, "src", "a.png").unwrap();
        tree.append_child(section, img).unwrap();
        let tail = tree.create_element("p");
        tree.append_child(section, tail).unwrap();
        tree.set_layout_box(img, Rect::from_xywh(0.0, 0.0, 100.0, 50.0));
        (tree, section, img)
    }

    #[test]
    fn test_axis_mode_uses_dominant_axis() {
        let start = Size::new(100.0, 50.0);
        let size = resize_dimensions(start, Corner::BottomRight, ResizeMode::Axis, 30.0, 5.0, 20.0);
        assert_eq!(size, Size::new(130.0, 50.0));

        let size = resize_dimensions(start, Corner::TopLeft, ResizeMode::Axis, 2.0, 10.0, 20.0);
        assert_eq!(size, Size::new(100.0, 40.0));

        let size = resize_dimensions(start, Corner::BottomLeft, ResizeMode::Axis, 10.0, 0.0, 20.0);
        assert_eq!(size, Size::new(90.0, 50.0));
    }

    #[test]
    fn test_ratio_mode_keeps_aspect() {
        let start = Size::new(100.0, 50.0);
        let size = resize_dimensions(start, Corner::BottomRight, ResizeMode::Ratio, 0.0, 25.0, 20.0);
        assert_eq!(size, Size::new(150.0, 75.0));

        let size = resize_dimensions(start, Corner::TopLeft, ResizeMode::Ratio, -40.0, 0.0, 20.0);
        assert_eq!(size, Size::new(140.0, 70.0));
    }

    #[test]
    fn test_free_mode_and_floor() {
        let start = Size::new(100.0, 50.0);
        let size = resize_dimensions(start, Corner::TopRight, ResizeMode::Free, 20.0, 10.0, 20.0);
        assert_eq!(size, Size::new(120.0, 40.0));

        let size = resize_dimensions(start, Corner::BottomRight, ResizeMode::Free, -500.0, -500.0, 20.0);
        assert_eq!(size, Size::new(20.0, 20.0));
    }

    #[test]
    fn test_mode_from_modifiers() {
        assert_eq!(ResizeMode::from_modifiers(Modifiers::NONE), ResizeMode::Axis);
        assert_eq!(ResizeMode::from_modifiers(Modifiers::ctrl()), ResizeMode::Ratio);
        assert_eq!(ResizeMode::from_modifiers(Modifiers::shift()), ResizeMode::Free);
    }

    #[test]
    fn test_attach_is_idempotent() {
        let (mut tree, section, img) = image_page();
        let mut positions = PositionTable::new();

        let first = attach_handles(&mut tree, &mut positions, img).unwrap();
        let second = attach_handles(&mut tree, &mut positions, img).unwrap();

        assert_eq!(first, second);
        assert_eq!(tree.query_selector_all(section, ".resize-wrapper").len(), 1);
        assert_eq!(tree.query_selector_all(first, ".resize-handle").len(), 4);
        assert_eq!(positions.get(&tree, img), Some(OriginalPosition { parent: section, index: 2 }));
        assert_eq!(tree.style(img).unwrap().get("width"), Some("100px"));
        assert_eq!(tree.style(first).unwrap().get("height"), Some("50px"));
    }

    #[test]
    fn test_missing_handles_are_restored() {
        let (mut tree, _, img) = image_page();
        let mut positions = PositionTable::new();
        let wrapper = attach_handles(&mut tree, &mut positions, img).unwrap();

        let handle = tree.query_selector(wrapper, ".bottom-right").unwrap();
        tree.destroy(handle).unwrap();
        attach_handles(&mut tree, &mut positions, img).unwrap();

        assert_eq!(tree.query_selector_all(wrapper, ".resize-handle").len(), 4);
        let handle = tree.query_selector(wrapper, ".bottom-right").unwrap();
        assert_eq!(tree.style(handle).unwrap().get("cursor"), Some("nwse-resize"));
    }

    #[test]
    fn test_release_restores_slot() {
        let (mut tree, section, img) = image_page();
        let mut positions = PositionTable::new();
        attach_handles(&mut tree, &mut positions, img).unwrap();

        assert!(release_image(&mut tree, &mut positions, img, false).unwrap());
        assert_eq!(tree.element_child_at(section, 2), Some(img));
        assert_eq!(tree.element_children(section).len(), 4);
        assert!(tree.query_selector(section, ".resize-wrapper").is_none());
        assert_eq!(tree.style(img).unwrap().get("width"), Some("100px"));
        assert!(positions.is_empty());
    }

    #[test]
    fn test_resized_image_keeps_wrapper() {
        let (mut tree, _, img) = image_page();
        let mut positions = PositionTable::new();
        let wrapper = attach_handles(&mut tree, &mut positions, img).unwrap();
        positions.mark_resized(img);

        assert!(!release_image(&mut tree, &mut positions, img, false).unwrap());
        assert_eq!(tree.parent(img), Some(wrapper));

        assert!(release_image(&mut tree, &mut positions, img, true).unwrap());
        assert!(!tree.is_alive(wrapper));
    }

    #[test]
    fn test_adopt_restored_wrappers() {
        let mut tree = DomTree::new();
        let section = tree.create_element("section");
        tree.append_child(tree.root(), section).unwrap();
        easel_html::set_inner_html(
            &mut tree,
            section,
            "<p>a</p><div class=\"resize-wrapper\"><img src=\"a.png\"></div><div class=\"resize-wrapper\" data-easel-resized=\"true\"><img src=\"b.png\"></div>",
        )
        .unwrap();
        let images = tree.query_selector_all(section, "img");
        let mut positions = PositionTable::new();

        assert_eq!(positions.adopt(&tree, section), 2);
        assert_eq!(positions.get(&tree, images[0]), Some(OriginalPosition { parent: section, index: 1 }));
        assert!(!positions.was_resized(images[0]));
        assert!(positions.was_resized(images[1]));

        assert!(release_image(&mut tree, &mut positions, images[0], false).unwrap());
        assert_eq!(tree.element_child_at(section, 1), Some(images[0]));
        assert!(!release_image(&mut tree, &mut positions, images[1], false).unwrap());
    }

    #[test]
    fn test_position_table_ignores_stale_images() {
        let (mut tree, section, img) = image_page();
        let mut positions = PositionTable::new();
        positions.record(img, OriginalPosition { parent: section, index: 2 });
        tree.destroy(img).unwrap();

        assert!(positions.get(&tree, img).is_none());
        positions.prune(&tree);
        assert!(positions.is_empty());
    }

    #[test]
    fn test_drag_update() {
        let (_, _, img) = image_page();
        let mut drag = ResizeDrag::new(
            img,
            img,
            Corner::BottomRight,
            (10.0, 10.0),
            Size::new(100.0, 50.0),
        );
        let size = drag.update(10.0, 35.0, Modifiers::ctrl(), 20.0);
        assert_eq!(size, Size::new(150.0, 75.0));
        assert!(drag.changed());
    }

    #[test]
    fn test_measure_fallbacks() {
        let mut tree = DomTree::new();
        let img = tree.create_element("img");
        tree.set_attribute(img, "width", "64").unwrap();
        tree.set_attribute(img, "style", "height: 32px").unwrap();
        assert_eq!(measure(&tree, img), Size::new(64.0, 32.0));
        assert_eq!(format_px(33.333), "33.33px");
        assert_eq!(format_px(150.0), "150px");
    }
}
