//! easel Editor - editing-interaction engine
//!
//! Selection and highlight tracking, snapshot history, image resize
//! handles, drag reordering, catalog insertion and the inline style
//! contract, all driven by discrete host input events.
//!
//! One [`Editor`] holds every piece of mutable state for one embedded
//! surface. Nothing is global, so several editors can live side by side.

mod blocks;
mod collaborators;
mod commands;
mod config;
mod drag;
mod editor;
mod error;
mod events;
mod export;
mod history;
mod input;
mod policy;
mod resize;
mod selection;
mod style;
mod surface;
mod tracking;

pub use blocks::{BlockCategory, BlockContent, BlockDefinition, BlockDescriptor, BlockRegistry};
pub use collaborators::{
    ActionPopover, AssetPicker, AssetReason, AssetRequest, Collaborators, NoopAssetPicker, NoopPopover,
    NoopStylePanel, StylePanel,
};
pub use commands::Command;
pub use config::EditorConfig;
pub use drag::{DragPayload, DropPlacement, NodeDrag, resolve_drop};
pub use editor::{Editor, InsertMode};
pub use error::{EditorError, EditorResult};
pub use events::{EditorEvent, Key, Modifiers, PointerEvent};
pub use export::SavedDocument;
pub use history::History;
pub use policy::{EditablePolicy, LockPolicy};
pub use resize::{Corner, OriginalPosition, PositionTable, ResizeDrag, ResizeMode, Size, resize_dimensions};
pub use selection::{Selection, SelectionKind};
pub use style::{Color, TemporaryStyles};
pub use surface::ContentSurface;
pub use tracking::{FrameGeometry, PopoverPlacement, PopoverTracker};

pub use easel_dom::{DomTree, NodeId, Rect};

/// Marker attribute on the highlighted node
pub const HIGHLIGHT_ATTR: &str = "data-easel-highlight";
/// Marker attribute on the prospective drop target
pub const DROP_TARGET_ATTR: &str = "data-easel-drop-target";
/// Class on the drag preview clone
pub const GHOST_CLASS: &str = "easel-ghost";
/// Class on duplicated nodes
pub const CLONED_CLASS: &str = "easel-cloned";
/// Class on the synthetic image container
pub const WRAPPER_CLASS: &str = "resize-wrapper";
/// Class on each corner handle
pub const HANDLE_CLASS: &str = "resize-handle";
/// Flag on a wrapper whose image was resized; it survives snapshots
pub const RESIZED_ATTR: &str = "data-easel-resized";
