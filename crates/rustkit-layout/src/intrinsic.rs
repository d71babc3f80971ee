//! Minimum and maximum content widths of grid containers.
//!
//! Children are folded into columns in document order, wrapping at the
//! explicit column count. Each column then takes its fixed size if the
//! template gives one, or the widest contribution of its children.

use rustkit_css::{TrackDefinition, UnitContext};
use tracing::{debug, trace};

use crate::dimensions::{length_to_px, resolve_dimensions};
use crate::dispatch::LayoutDispatcher;
use crate::grid::GridLayout;
use crate::tree::{BoxId, BoxTree};
use crate::{try_filled, try_vec, LayoutError};

/// Content-box widths a box needs: `min` without overflow when squeezed,
/// `max` with no line breaking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntrinsicWidths {
    pub min: i32,
    pub max: i32,
}

impl IntrinsicWidths {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Both widths grown by `edges`.
    pub fn outer(self, edges: i32) -> Self {
        Self::new(self.min.saturating_add(edges), self.max.saturating_add(edges))
    }
}

/// Compute and memoise the intrinsic widths of the grid container `id`.
///
/// Returns immediately if `tree[id].intrinsic` is already set. Children
/// without known widths are measured through `dispatcher`. Out-of-flow
/// children contribute nothing.
pub fn layout_minmax_grid<D>(
    tree: &mut BoxTree,
    id: BoxId,
    ctx: &UnitContext,
    dispatcher: &D,
) -> Result<(), LayoutError>
where
    D: LayoutDispatcher + ?Sized,
{
    if tree[id].intrinsic.is_some() {
        return Ok(());
    }

    // No container width is known yet; percentage gaps and tracks count as 0.
    let grid = GridLayout::from_style(&tree[id].style, ctx, 0);
    let num_cols = grid.explicit_columns().max(1);
    let mut col_min = try_filled(num_cols, 0, "intrinsic column minimums")?;
    let mut col_max = try_filled(num_cols, 0, "intrinsic column maximums")?;

    let mut children = try_vec(tree.children(id).len(), "intrinsic children")?;
    children.extend_from_slice(tree.children(id));

    let mut col = 0;
    for child in children {
        if !tree[child].is_in_flow() {
            continue;
        }
        if tree[child].intrinsic.is_none() {
            dispatcher.minmax(tree, child, ctx)?;
        }
        let edges = resolve_dimensions(ctx, 0, ctx.viewport_height, &tree[child].style)
            .horizontal_edges();
        let widths = tree[child].intrinsic.unwrap_or_default().outer(edges);
        trace!(?child, column = col, ?widths, "Folded grid item");

        col_min[col] = col_min[col].max(widths.min);
        col_max[col] = col_max[col].max(widths.max);
        col = (col + 1) % num_cols;
    }

    let tracks = grid.template_columns.tracks();
    let (mut min, mut max): (i32, i32) = (0, 0);
    for i in 0..num_cols {
        let (lo, hi) = match tracks.and_then(|list| list.cyclic(i)) {
            Some(TrackDefinition::Fixed(len)) => {
                let px = length_to_px(*len, ctx, grid.font_size, 0);
                (px, px)
            }
            Some(TrackDefinition::Percentage(_)) => (0, 0),
            _ => (col_min[i], col_max[i]),
        };
        min = min.saturating_add(lo);
        max = max.saturating_add(hi);
    }

    let gaps = (num_cols as i32 - 1).saturating_mul(grid.column_gap);
    min = min.saturating_add(gaps);
    max = max.saturating_add(gaps).max(min);

    let widths = IntrinsicWidths::new(min, max);
    debug!(?id, num_cols, ?widths, "Grid intrinsic widths");
    tree[id].intrinsic = Some(widths);
    Ok(())
}
