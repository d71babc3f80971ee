//! # RustKit Layout
//!
//! Grid layout engine for RustKit.
//!
//! ## Design Goals
//!
//! 1. **Arena box tree**: Boxes addressed by [`BoxId`] instead of pointers
//! 2. **Track sizing**: Fixed, percentage and flexible column tracks
//! 3. **Auto-placement**: Three-phase placement with sparse and dense packing
//! 4. **Intrinsic sizing**: Memoised min/max content widths per box
//! 5. **Positioning**: Item geometry relative to the grid container
//!
//! All geometry is in whole device pixels.

pub mod dimensions;
pub mod dispatch;
pub mod grid;
pub mod intrinsic;
pub mod placement;
pub mod track_sizing;
pub mod tree;

pub use dimensions::{resolve_dimensions, ResolvedDimensions};
pub use dispatch::{FlowDispatcher, LayoutDispatcher};
pub use grid::{layout_grid, GridLayout};
pub use intrinsic::{layout_minmax_grid, IntrinsicWidths};
pub use placement::{place_items, AxisPlacement, GridArea, OccupancyMap, PlacementResult};
pub use track_sizing::{resolve_column_widths, resolve_row_minimums};
pub use tree::{BoxId, BoxTree, BoxType, LayoutBox};

use thiserror::Error;

/// Errors that can occur in layout.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Layout failed: {0}")]
    LayoutFailed(String),

    /// A scratch buffer could not be allocated; names the buffer.
    #[error("Allocation failed: {0}")]
    AllocationFailed(&'static str),
}

/// Allocate an empty vector with room for `capacity` elements.
pub(crate) fn try_vec<T>(capacity: usize, what: &'static str) -> Result<Vec<T>, LayoutError> {
    let mut v = Vec::new();
    v.try_reserve(capacity)
        .map_err(|_| LayoutError::AllocationFailed(what))?;
    Ok(v)
}

/// Allocate a vector of `len` copies of `value`.
pub(crate) fn try_filled<T: Clone>(
    len: usize,
    value: T,
    what: &'static str,
) -> Result<Vec<T>, LayoutError> {
    let mut v = try_vec(len, what)?;
    v.resize(len, value);
    Ok(v)
}

// ==================== Geometry ====================

/// A 2D rectangle in device pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Whether the two rectangles share any area.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Edge sizes (margin, padding, border).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeSizes {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl EdgeSizes {
    pub fn horizontal(&self) -> i32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> i32 {
        self.top + self.bottom
    }
}

/// Box dimensions including content, padding, border, and margin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dimensions {
    /// Content area.
    pub content: Rect,
    /// Padding.
    pub padding: EdgeSizes,
    /// Border.
    pub border: EdgeSizes,
    /// Margin.
    pub margin: EdgeSizes,
}

impl Dimensions {
    /// Get the padding box (content + padding).
    pub fn padding_box(&self) -> Rect {
        Rect {
            x: self.content.x - self.padding.left,
            y: self.content.y - self.padding.top,
            width: self.content.width.saturating_add(self.padding.horizontal()),
            height: self.content.height.saturating_add(self.padding.vertical()),
        }
    }

    /// Get the border box (content + padding + border).
    pub fn border_box(&self) -> Rect {
        let pb = self.padding_box();
        Rect {
            x: pb.x - self.border.left,
            y: pb.y - self.border.top,
            width: pb.width.saturating_add(self.border.horizontal()),
            height: pb.height.saturating_add(self.border.vertical()),
        }
    }

    /// Get the margin box (content + padding + border + margin).
    pub fn margin_box(&self) -> Rect {
        let bb = self.border_box();
        Rect {
            x: bb.x - self.margin.left,
            y: bb.y - self.margin.top,
            width: bb.width.saturating_add(self.margin.horizontal()),
            height: bb.height.saturating_add(self.margin.vertical()),
        }
    }
}
