//! Host collaborators
//!
//! The editor drives three pieces of host UI it does not own: an asset
//! picker, the floating action popover and the style panel. Each is a
//! trait object so a host (or a test) can plug in its own.

use easel_dom::NodeId;

use crate::{PopoverPlacement, SelectionKind};

/// Why the asset picker was opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetReason {
    /// Double activation of an existing image
    Activation,
    /// A freshly inserted image block
    CatalogInsert,
}

/// Pending asset choice. Hand it back to [`crate::Editor::asset_chosen`];
/// dropping it is fine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetRequest {
    pub target: NodeId,
    pub reason: AssetReason,
}

pub trait AssetPicker {
    fn open(&mut self, request: AssetRequest);
}

pub trait ActionPopover {
    /// Choose the action set for a new selection
    fn show_actions(&mut self, kind: SelectionKind);

    fn place(&mut self, placement: PopoverPlacement);

    fn hide(&mut self);
}

pub trait StylePanel {
    /// Load the panel fields from a newly selected node
    fn bind(&mut self, node: NodeId);

    fn close(&mut self);
}

#[derive(Debug, Default)]
pub struct NoopAssetPicker;

impl AssetPicker for NoopAssetPicker {
    fn open(&mut self, request: AssetRequest) {
        tracing::debug!("No asset picker; dropping request for {}", request.target);
    }
}

#[derive(Debug, Default)]
pub struct NoopPopover;

impl ActionPopover for NoopPopover {
    fn show_actions(&mut self, _kind: SelectionKind) {}

    fn place(&mut self, _placement: PopoverPlacement) {}

    fn hide(&mut self) {}
}

#[derive(Debug, Default)]
pub struct NoopStylePanel;

impl StylePanel for NoopStylePanel {
    fn bind(&mut self, _node: NodeId) {}

    fn close(&mut self) {}
}

/// Everything the editor calls out to
pub struct Collaborators {
    pub assets: Box<dyn AssetPicker>,
    pub popover: Box<dyn ActionPopover>,
    pub panel: Box<dyn StylePanel>,
}

impl Collaborators {
    pub fn new(assets: Box<dyn AssetPicker>, popover: Box<dyn ActionPopover>, panel: Box<dyn StylePanel>) -> Self {
        Self { assets, popover, panel }
    }
}

impl Default for Collaborators {
    fn default() -> Self {
        Self::new(Box::new(NoopAssetPicker), Box::new(NoopPopover), Box::new(NoopStylePanel))
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
