//! Grid layout geometry
//!
//! The grid canvas positions widgets in whole grid cells. A dashboard's
//! layout is kept as a separate ordered map (the layout-engine
//! representation) so the canvas can reflow without touching widget
//! configuration.

use crate::id::WidgetId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered widget-id → frame map used by the grid canvas
pub type Layout = IndexMap<WidgetId, GridRect>;

/// Position and size in grid cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRect {
    /// Column of the top-left cell
    pub x: u16,
    /// Row of the top-left cell
    pub y: u16,
    /// Width in cells (≥ 1 for a valid frame)
    pub w: u16,
    /// Height in cells (≥ 1 for a valid frame)
    pub h: u16,
}

impl GridRect {
    /// Create a frame
    #[inline]
    #[must_use]
    pub fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    /// Whether the frame covers zero cells
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Whether two frames share at least one cell
    #[must_use]
    pub fn overlaps(&self, other: &GridRect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_detection() {
        let a = GridRect::new(0, 0, 4, 2);
        assert!(a.overlaps(&GridRect::new(3, 1, 2, 2)));
        assert!(!a.overlaps(&GridRect::new(4, 0, 2, 2)));
        assert!(!a.overlaps(&GridRect::new(0, 2, 4, 1)));
    }

    #[test]
    fn empty_frames_never_overlap() {
        let a = GridRect::new(0, 0, 0, 5);
        assert!(!a.overlaps(&GridRect::new(0, 0, 5, 5)));
    }
}
