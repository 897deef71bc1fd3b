//! Per-frame popover tracking
//!
//! While a selection exists the host calls [`Editor::frame`] once per
//! animation frame. Each tick re-reads geometry and places the action
//! popover centered above the selected node, flipping below when there
//! is no room.

use easel_dom::Rect;

use crate::{Editor, Size};

/// Gap between the node and the popover
const GAP: f64 = 8.0;
/// Closest the popover may sit to the window edge
const MARGIN: f64 = 8.0;
/// Minimum room above the node before flipping below
const FLIP_THRESHOLD: f64 = 10.0;

/// Geometry read at one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameGeometry {
    /// Host window size
    pub window: Size,
    /// Surface box in window coordinates
    pub surface: Rect,
    /// Selected node box in surface coordinates
    pub selection: Rect,
    /// Rendered popover size
    pub popover: Size,
}

/// Where the popover should go this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PopoverPlacement {
    At { left: f64, top: f64 },
    Hidden,
}

/// Cancellable tracking loop state
#[derive(Debug, Clone, Default)]
pub struct PopoverTracker {
    running: bool,
}

impl PopoverTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Compute this frame's placement. A collapsed surface stops the loop.
    pub fn tick(&mut self, geometry: &FrameGeometry) -> Option<PopoverPlacement> {
        if !self.running {
            return None;
        }
        let FrameGeometry { window, surface, selection, popover } = *geometry;
        if surface.is_empty() {
            tracing::debug!("Surface collapsed; stopping popover tracking");
            self.running = false;
            return None;
        }

        let mut left = surface.x + selection.x + selection.width / 2.0 - popover.width / 2.0;
        let mut top = surface.y + selection.y - popover.height - GAP;
        if top < FLIP_THRESHOLD {
            top = surface.y + selection.bottom() + GAP;
        }

        left = left.min(window.width - popover.width - MARGIN).max(MARGIN);
        top = top.min(window.height - popover.height - MARGIN).max(MARGIN);

        let outside = top + popover.height < surface.top()
            || top > surface.bottom()
            || left + popover.width < surface.left()
            || left > surface.right();

        Some(if outside { PopoverPlacement::Hidden } else { PopoverPlacement::At { left, top } })
    }
}

impl Editor {
    /// Run one tracking frame. Returns the placement handed to the popover.
    pub fn frame(&mut self, window: Size, popover: Size) -> Option<PopoverPlacement> {
        if !self.tracker.is_running() {
            return None;
        }
        let Some(current) = self.selection() else {
            self.tracker.stop();
            return None;
        };
        // No layout yet for this node; try again next frame
        let selection = self.surface.tree().layout_box(current)?;

        let geometry = FrameGeometry { window, surface: self.surface.viewport(), selection, popover };
        let placement = self.tracker.tick(&geometry)?;
        match placement {
            PopoverPlacement::Hidden => self.collaborators.popover.hide(),
            PopoverPlacement::At { .. } => self.collaborators.popover.place(placement),
        }
        Some(placement)
    }

    /// Whether the tracking loop is live
    pub fn is_tracking(&self) -> bool {
        self.tracker.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(selection: Rect) -> FrameGeometry {
        FrameGeometry {
            window: Size::new(1200.0, 800.0),
            surface: Rect::from_xywh(100.0, 50.0, 800.0, 600.0),
            selection,
            popover: Size::new(80.0, 30.0),
        }
    }

    #[test]
    fn test_centered_above() {
        let mut tracker = PopoverTracker::new();
        tracker.start();
        let placement = tracker.tick(&geometry(Rect::from_xywh(200.0, 100.0, 100.0, 40.0)));
        assert_eq!(placement, Some(PopoverPlacement::At { left: 310.0, top: 112.0 }));
    }

    #[test]
    fn test_flips_below_near_top() {
        let mut tracker = PopoverTracker::new();
        tracker.start();
        let mut geo = geometry(Rect::from_xywh(200.0, 0.0, 100.0, 40.0));
        geo.surface.y = 0.0;
        let placement = tracker.tick(&geo);
        assert_eq!(placement, Some(PopoverPlacement::At { left: 310.0, top: 48.0 }));
    }

    #[test]
    fn test_clamped_to_window() {
        let mut tracker = PopoverTracker::new();
        tracker.start();
        let placement = tracker.tick(&geometry(Rect::from_xywh(-120.0, 100.0, 20.0, 20.0)));
        assert_eq!(placement, Some(PopoverPlacement::At { left: 8.0, top: 112.0 }));
    }

    #[test]
    fn test_hidden_outside_surface() {
        let mut tracker = PopoverTracker::new();
        tracker.start();
        let mut geo = geometry(Rect::from_xywh(0.0, 100.0, 20.0, 20.0));
        geo.surface = Rect::from_xywh(600.0, 50.0, 200.0, 600.0);
        geo.selection = Rect::from_xywh(-590.0, 100.0, 20.0, 20.0);
        assert_eq!(tracker.tick(&geo), Some(PopoverPlacement::Hidden));
    }

    #[test]
    fn test_collapsed_surface_stops() {
        let mut tracker = PopoverTracker::new();
        tracker.start();
        let mut geo = geometry(Rect::from_xywh(0.0, 0.0, 10.0, 10.0));
        geo.surface.height = 0.0;

        assert_eq!(tracker.tick(&geo), None);
        assert!(!tracker.is_running());
        assert_eq!(tracker.tick(&geometry(Rect::default())), None);
    }
}
