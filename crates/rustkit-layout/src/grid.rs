//! # CSS Grid Layout
//!
//! Positions the items of a grid container.
//!
//! ## Overview
//!
//! Layout of a container runs in order:
//! 1. Placement of every in-flow child into grid cells
//! 2. Column widths from the column template
//! 3. Pass A: each item is laid out at the width of the columns it spans
//! 4. Row heights from row minimums and item heights
//! 5. Pass B: items are positioned and auto-height items stretched
//!
//! Item coordinates are relative to the container's content box, with the
//! item's border box at the origin of its first cell. Item margins do not
//! offset items. Out-of-flow children are laid out at the container's
//! content width at the origin.

use rustkit_css::{
    ComputedStyle, Gap, GridAutoFlow, GridPlacement, GridTemplate, UnitContext,
};
use tracing::{debug, trace};

use crate::dimensions::{length_to_px, resolve_dimensions};
use crate::dispatch::LayoutDispatcher;
use crate::placement::place_items;
use crate::track_sizing::{resolve_column_widths, resolve_row_minimums};
use crate::tree::{BoxId, BoxTree, BoxType};
use crate::{try_filled, try_vec, Dimensions, LayoutError};

// ==================== Grid Container ====================

/// Grid properties of a container resolved to device pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    /// Column template.
    pub template_columns: GridTemplate,
    /// Row template.
    pub template_rows: GridTemplate,
    /// Gap between columns.
    pub column_gap: i32,
    /// Gap between rows.
    pub row_gap: i32,
    /// Auto-placement direction and packing.
    pub auto_flow: GridAutoFlow,
    /// Font size of the container in CSS pixels.
    pub font_size: f32,
}

impl GridLayout {
    /// Resolve the grid properties of `style`.
    ///
    /// Percentage column gaps resolve against `container_width`; percentage
    /// row gaps are 0 since the container height is not yet known.
    pub fn from_style(style: &ComputedStyle, ctx: &UnitContext, container_width: i32) -> Self {
        let font_size = style.font_size_px(ctx);
        let gap = |gap: Gap, basis: i32| match gap {
            Gap::Normal => 0,
            Gap::Length(len) => length_to_px(len, ctx, font_size, basis).max(0),
        };

        Self {
            template_columns: style.grid_template_columns.clone(),
            template_rows: style.grid_template_rows.clone(),
            column_gap: gap(style.column_gap, container_width),
            row_gap: gap(style.row_gap, 0),
            auto_flow: style.grid_auto_flow,
            font_size,
        }
    }

    /// Number of explicit columns.
    pub fn explicit_columns(&self) -> usize {
        self.template_columns.track_count()
    }

    /// Number of explicit rows.
    pub fn explicit_rows(&self) -> usize {
        self.template_rows.track_count()
    }
}

/// Sum of `sizes[range]` plus the gaps between them, saturating.
fn spanned(sizes: &[i32], start: usize, span: usize, gap: i32) -> i32 {
    let gaps = (span as i32 - 1).saturating_mul(gap);
    sizes[start..start + span]
        .iter()
        .fold(gaps, |total, &size| total.saturating_add(size))
}

/// Start offset of every track.
fn offsets(sizes: &[i32], gap: i32, what: &'static str) -> Result<Vec<i32>, LayoutError> {
    let mut out = try_vec(sizes.len(), what)?;
    let mut pos: i32 = 0;
    for size in sizes {
        out.push(pos);
        pos = pos.saturating_add(*size).saturating_add(gap);
    }
    Ok(out)
}

// ==================== Layout ====================

/// Lay out the grid container `id` in `available_width` device pixels.
///
/// Sets the container's edges, content width and content height and
/// positions its children. The container's own position is left to the
/// caller. An `inline-grid` with `width: auto` shrinks to fit its
/// intrinsic widths.
pub fn layout_grid<D>(
    tree: &mut BoxTree,
    id: BoxId,
    available_width: i32,
    ctx: &UnitContext,
    dispatcher: &D,
) -> Result<(), LayoutError>
where
    D: LayoutDispatcher + ?Sized,
{
    let dims = resolve_dimensions(ctx, available_width, ctx.viewport_height, &tree[id].style);
    let available_content = available_width - dims.horizontal_edges();

    let width = match dims.width {
        Some(width) => width,
        None if tree[id].box_type == BoxType::InlineGrid => {
            dispatcher.minmax(tree, id, ctx)?;
            let widths = tree[id].intrinsic.unwrap_or_default();
            widths.max.min(widths.min.max(available_content))
        }
        None => available_content,
    };

    let d = &mut tree[id].dimensions;
    d.margin = dims.margin;
    d.padding = dims.padding;
    d.border = dims.border;
    d.content.width = dims.clamp_width(width).max(0);

    layout_grid_contents(tree, id, ctx, dispatcher)?;
    if let Some(height) = dims.height {
        tree[id].dimensions.content.height = height;
    }
    Ok(())
}

/// Lay out the children of the grid container `id`, whose content width
/// is already set, and set its content height.
pub fn layout_grid_contents<D>(
    tree: &mut BoxTree,
    id: BoxId,
    ctx: &UnitContext,
    dispatcher: &D,
) -> Result<(), LayoutError>
where
    D: LayoutDispatcher + ?Sized,
{
    let width = tree[id].dimensions.content.width;
    let grid = GridLayout::from_style(&tree[id].style, ctx, width);

    let mut items: Vec<BoxId> = try_vec(tree.children(id).len(), "grid items")?;
    let mut out_of_flow: Vec<BoxId> = Vec::new();
    let mut children = try_vec(tree.children(id).len(), "grid children")?;
    children.extend_from_slice(tree.children(id));
    for child in children {
        if tree[child].box_type == BoxType::None {
            tree[child].dimensions = Dimensions::default();
        } else if tree[child].is_out_of_flow() {
            out_of_flow.push(child);
        } else {
            items.push(child);
        }
    }

    let mut placements: Vec<GridPlacement> = try_vec(items.len(), "grid placements")?;
    placements.extend(items.iter().map(|&item| tree[item].style.grid_placement()));
    let placement = place_items(
        &placements,
        grid.explicit_columns(),
        grid.explicit_rows(),
        grid.auto_flow,
    )?;

    let columns = resolve_column_widths(
        &grid.template_columns,
        placement.column_count,
        width,
        grid.column_gap,
        grid.font_size,
        ctx,
    )?;
    let column_offsets = offsets(&columns, grid.column_gap, "column offsets")?;
    let mut rows = resolve_row_minimums(
        &grid.template_rows,
        placement.row_count,
        grid.font_size,
        ctx,
    )?;

    // Pass A: lay out each item at the width of its cell.
    let mut heights = try_filled(items.len(), 0, "item heights")?;
    let mut auto_height = try_filled(items.len(), true, "item auto heights")?;
    for &index in &placement.order {
        let item = items[index];
        let area = placement.areas[index];
        let cell_width = spanned(&columns, area.column, area.column_span, grid.column_gap);
        let dims = resolve_dimensions(ctx, cell_width, ctx.viewport_height, &tree[item].style);

        let d = &mut tree[item].dimensions;
        d.margin = dims.margin;
        d.padding = dims.padding;
        d.border = dims.border;
        d.content.width = (cell_width - dims.padding.horizontal() - dims.border.horizontal()).max(0);

        dispatcher.layout_contents(tree, item, ctx)?;

        let d = &mut tree[item].dimensions;
        if let Some(height) = dims.height {
            d.content.height = height;
            auto_height[index] = false;
        }
        heights[index] = d
            .content
            .height
            .saturating_add(d.padding.vertical() + d.border.vertical());
        trace!(?item, ?area, cell_width, height = heights[index], "Laid out grid item");
    }

    // Row heights: single-row items first, then spanning items in order of
    // the row they end in, each growing only its last row.
    for &index in &placement.order {
        let area = placement.areas[index];
        if area.row_span == 1 {
            rows[area.row] = rows[area.row].max(heights[index]);
        }
    }
    let mut spanning: Vec<usize> = try_vec(placement.order.len(), "spanning items")?;
    spanning.extend(
        placement
            .order
            .iter()
            .copied()
            .filter(|&index| placement.areas[index].row_span > 1),
    );
    spanning.sort_by_key(|&index| placement.areas[index].row_end());
    for index in spanning {
        let area = placement.areas[index];
        let last = area.row_end() - 1;
        let covered = spanned(&rows, area.row, area.row_span - 1, grid.row_gap)
            .saturating_add(grid.row_gap);
        rows[last] = rows[last].max(heights[index].saturating_sub(covered));
    }
    let row_offsets = offsets(&rows, grid.row_gap, "row offsets")?;

    // Pass B: position items and stretch auto heights to the spanned rows.
    for &index in &placement.order {
        let item = items[index];
        let area = placement.areas[index];
        let d = &mut tree[item].dimensions;
        d.content.x = column_offsets[area.column].saturating_add(d.border.left + d.padding.left);
        d.content.y = row_offsets[area.row].saturating_add(d.border.top + d.padding.top);
        if auto_height[index] {
            let cell_height = spanned(&rows, area.row, area.row_span, grid.row_gap);
            d.content.height = (cell_height - d.padding.vertical() - d.border.vertical()).max(0);
        }
        trace!(?item, rect = ?d.content, "Positioned grid item");
    }

    let height = if rows.is_empty() {
        0
    } else {
        spanned(&rows, 0, rows.len(), grid.row_gap)
    };
    tree[id].dimensions.content.height = height;

    for child in out_of_flow {
        let dims = resolve_dimensions(ctx, width, ctx.viewport_height, &tree[child].style);
        let d = &mut tree[child].dimensions;
        d.margin = dims.margin;
        d.padding = dims.padding;
        d.border = dims.border;
        d.content.width = dims
            .clamp_width(dims.width.unwrap_or(width - dims.horizontal_edges()))
            .max(0);
        d.content.x = dims.margin.left + dims.border.left + dims.padding.left;
        d.content.y = dims.margin.top + dims.border.top + dims.padding.top;

        dispatcher.layout_contents(tree, child, ctx)?;
        if let Some(height) = dims.height {
            tree[child].dimensions.content.height = height;
        }
    }

    debug!(
        ?id,
        width,
        height,
        columns = columns.len(),
        rows = rows.len(),
        items = items.len(),
        "Grid layout complete"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::FlowDispatcher;
    use crate::Rect;
    use crate::intrinsic::IntrinsicWidths;
    use rustkit_css::{
        Display, GridLine, Length, Position, Stylesheet, TrackDefinition, TrackList,
        MAX_GRID_LINE,
    };

    fn style_for(sheet: &Stylesheet, selector: &str, parent: Option<&ComputedStyle>) -> ComputedStyle {
        sheet.compute_style(|s| s == selector, parent).unwrap()
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn layout(css: &str, items: &[&str], width: i32) -> (BoxTree, BoxId, Vec<BoxId>) {
        init_tracing();
        let sheet = Stylesheet::parse(css).unwrap();
        let mut tree = BoxTree::new();
        let root = tree.insert_root(ComputedStyle::new());
        let grid_style = style_for(&sheet, "grid", None);
        let grid = tree.append_child(root, grid_style.clone());
        let ids = items
            .iter()
            .map(|selector| {
                let style = style_for(&sheet, selector, Some(&grid_style));
                tree.append_child(grid, style)
            })
            .collect();
        FlowDispatcher
            .layout_root(&mut tree, root, width, &UnitContext::new())
            .unwrap();
        (tree, grid, ids)
    }

    fn rect(tree: &BoxTree, id: BoxId) -> Rect {
        tree[id].dimensions.content
    }

    #[test]
    fn test_three_equal_columns() {
        let (tree, grid, ids) = layout(
            "grid { display: grid; grid-template-columns: 1fr 1fr 1fr }
             item { height: 20px }",
            &["item", "item", "item"],
            300,
        );
        assert_eq!(rect(&tree, ids[0]), Rect::new(0, 0, 100, 20));
        assert_eq!(rect(&tree, ids[1]), Rect::new(100, 0, 100, 20));
        assert_eq!(rect(&tree, ids[2]), Rect::new(200, 0, 100, 20));
        assert_eq!(rect(&tree, grid).height, 20);
    }

    #[test]
    fn test_auto_items_wrap_to_next_row() {
        let (tree, grid, ids) = layout(
            "grid { display: grid; grid-template-columns: 100px 100px }
             item { height: 10px }",
            &["item", "item", "item"],
            400,
        );
        assert_eq!(rect(&tree, ids[2]), Rect::new(0, 10, 100, 10));
        assert_eq!(rect(&tree, grid).height, 20);
    }

    #[test]
    fn test_explicit_item_placed_first() {
        let (tree, _, ids) = layout(
            "grid { display: grid; grid-template-columns: repeat(3, 50px) }
             auto { height: 10px }
             fixed { grid-column: 2; grid-row: 1; height: 10px }",
            &["auto", "fixed", "auto"],
            300,
        );
        assert_eq!(rect(&tree, ids[1]).x, 50);
        assert_eq!(rect(&tree, ids[0]).x, 0);
        assert_eq!(rect(&tree, ids[2]).x, 100);
        assert_eq!(rect(&tree, ids[2]).y, 0);
    }

    #[test]
    fn test_dense_backfills() {
        let (tree, _, ids) = layout(
            "grid { display: grid; grid-template-columns: repeat(3, 40px); grid-auto-flow: row dense }
             wide { grid-column: span 2; height: 10px }
             item { height: 10px }",
            &["item", "item", "wide", "item"],
            300,
        );
        // The wide item wraps to the second row; the last item backfills.
        assert_eq!(rect(&tree, ids[2]), Rect::new(0, 10, 80, 10));
        assert_eq!(rect(&tree, ids[3]), Rect::new(80, 0, 40, 10));
    }

    #[test]
    fn test_gaps_offset_items() {
        let (tree, grid, ids) = layout(
            "grid { display: grid; grid-template-columns: 50px 50px; column-gap: 10px; row-gap: 4px }
             item { height: 10px }",
            &["item", "item", "item"],
            300,
        );
        assert_eq!(rect(&tree, ids[1]).x, 60);
        assert_eq!(rect(&tree, ids[2]).y, 14);
        assert_eq!(rect(&tree, grid).height, 24);
    }

    #[test]
    fn test_edges_inside_cell() {
        let (tree, _, ids) = layout(
            "grid { display: grid; grid-template-columns: 100px }
             item { padding: 5px; border-width: 2px; margin: 30px; height: 10px }",
            &["item"],
            300,
        );
        assert_eq!(rect(&tree, ids[0]), Rect::new(7, 7, 86, 10));
        assert_eq!(tree[ids[0]].dimensions.border_box().width, 100);
    }

    #[test]
    fn test_auto_height_stretches() {
        let (tree, _, ids) = layout(
            "grid { display: grid; grid-template-columns: 1fr 1fr }
             short { }
             tall { height: 40px }
             fixed { height: 15px }",
            &["short", "tall", "fixed"],
            200,
        );
        assert_eq!(rect(&tree, ids[0]).height, 40);
        assert_eq!(rect(&tree, ids[1]).height, 40);
        assert_eq!(rect(&tree, ids[2]).height, 15);
    }

    #[test]
    fn test_row_template_minimum() {
        let (tree, grid, ids) = layout(
            "grid { display: grid; grid-template-columns: 1fr; grid-template-rows: 50px 1fr }
             item { height: 10px }",
            &["item", "item", "item"],
            200,
        );
        assert_eq!(rect(&tree, ids[1]).y, 50);
        assert_eq!(rect(&tree, ids[2]).y, 60);
        // The implicit third row has no template minimum.
        assert_eq!(rect(&tree, grid).height, 70);
    }

    #[test]
    fn test_spanning_item_grows_last_row() {
        let (tree, grid, ids) = layout(
            "grid { display: grid; grid-template-columns: 1fr 1fr; row-gap: 10px }
             tall { grid-row: span 2; height: 100px }
             item { height: 20px }",
            &["tall", "item", "item"],
            200,
        );
        assert_eq!(rect(&tree, ids[1]).y, 0);
        assert_eq!(rect(&tree, ids[2]), Rect::new(100, 30, 100, 20));
        assert_eq!(rect(&tree, ids[0]).height, 100);
        // 20 + 10 + 70
        assert_eq!(rect(&tree, grid).height, 100);
    }

    #[test]
    fn test_implicit_columns_get_width() {
        let (tree, _, ids) = layout(
            "grid { display: grid; grid-template-columns: 60px }
             item { grid-column: 3; height: 10px }",
            &["item"],
            300,
        );
        assert_eq!(rect(&tree, ids[0]).x, 120);
        assert_eq!(rect(&tree, ids[0]).width, 60);
    }

    #[test]
    fn test_no_template_single_column() {
        let (tree, grid, ids) = layout(
            "grid { display: grid }
             item { height: 10px }",
            &["item", "item"],
            250,
        );
        assert_eq!(rect(&tree, ids[0]), Rect::new(0, 0, 250, 10));
        assert_eq!(rect(&tree, ids[1]), Rect::new(0, 10, 250, 10));
        assert_eq!(rect(&tree, grid).height, 20);
    }

    #[test]
    fn test_empty_grid() {
        let (tree, grid, _) = layout("grid { display: grid }", &[], 250);
        assert_eq!(rect(&tree, grid), Rect::new(0, 0, 250, 0));
    }

    #[test]
    fn test_explicit_container_height() {
        let (tree, grid, _) = layout(
            "grid { display: grid; height: 300px }
             item { height: 10px }",
            &["item"],
            250,
        );
        assert_eq!(rect(&tree, grid).height, 300);
    }

    #[test]
    fn test_hidden_and_absolute_children() {
        let (tree, grid, ids) = layout(
            "grid { display: grid; grid-template-columns: 1fr 1fr }
             hidden { display: none }
             abs { position: absolute; height: 5px }
             item { height: 10px }",
            &["hidden", "abs", "item", "item"],
            200,
        );
        assert_eq!(tree[ids[0]].dimensions, Dimensions::default());
        assert_eq!(rect(&tree, ids[1]), Rect::new(0, 0, 200, 5));
        assert_eq!(rect(&tree, ids[2]).x, 0);
        assert_eq!(rect(&tree, ids[3]).x, 100);
        assert_eq!(rect(&tree, grid).height, 10);
    }

    #[test]
    fn test_inline_grid_shrinks_to_fit() {
        let (tree, grid, _) = layout(
            "grid { display: inline-grid; grid-template-columns: 1fr 1fr; column-gap: 10px }
             item { width: 40px; height: 10px }",
            &["item", "item"],
            500,
        );
        // Blockified to a grid only inside flex and grid containers.
        assert_eq!(tree[grid].box_type, BoxType::InlineGrid);
        assert_eq!(rect(&tree, grid).width, 90);
    }

    #[test]
    fn test_inline_grid_limited_by_available() {
        let mut tree = BoxTree::new();
        let root = tree.insert_root(ComputedStyle::new());
        let grid = tree.append_child(
            root,
            ComputedStyle {
                display: Display::InlineGrid,
                ..ComputedStyle::new()
            },
        );
        let item = tree.append_child(grid, ComputedStyle::new());
        tree[item].intrinsic = Some(IntrinsicWidths::new(50, 400));

        let ctx = UnitContext::new();
        FlowDispatcher.layout_root(&mut tree, root, 300, &ctx).unwrap();
        assert_eq!(rect(&tree, grid).width, 300);
        FlowDispatcher.layout_root(&mut tree, root, 30, &ctx).unwrap();
        assert_eq!(rect(&tree, grid).width, 50);
    }

    #[test]
    fn test_nested_grid() {
        let sheet = Stylesheet::parse(
            "grid { display: grid; grid-template-columns: 1fr 1fr }
             leaf { height: 10px }",
        )
        .unwrap();
        let grid_style = style_for(&sheet, "grid", None);
        let leaf = style_for(&sheet, "leaf", None);

        let mut tree = BoxTree::new();
        let root = tree.insert_root(ComputedStyle::new());
        let outer = tree.append_child(root, grid_style.clone());
        let first = tree.append_child(outer, ComputedStyle::new());
        let inner = tree.append_child(outer, grid_style);
        let a = tree.append_child(inner, leaf.clone());
        let b = tree.append_child(inner, leaf.clone());
        let c = tree.append_child(inner, leaf);

        FlowDispatcher
            .layout_root(&mut tree, root, 400, &UnitContext::new())
            .unwrap();

        assert_eq!(rect(&tree, inner), Rect::new(200, 0, 200, 20));
        assert_eq!(rect(&tree, a), Rect::new(0, 0, 100, 10));
        assert_eq!(rect(&tree, b), Rect::new(100, 0, 100, 10));
        assert_eq!(rect(&tree, c), Rect::new(0, 10, 100, 10));
        // The first item stretches to the inner grid's height.
        assert_eq!(rect(&tree, first).height, 20);
    }

    #[test]
    fn test_items_never_overlap() {
        let mut tree = BoxTree::new();
        let root = tree.insert_root(ComputedStyle::new());
        let grid = tree.append_child(
            root,
            ComputedStyle {
                display: Display::Grid,
                grid_template_columns: GridTemplate::Tracks(TrackList::from_tracks(
                    [TrackDefinition::Flex(1.0); 4],
                )),
                ..ComputedStyle::new()
            },
        );
        let spans = [(2, 1), (1, 2), (3, 1), (1, 1), (2, 2), (1, 1), (4, 1)];
        let ids: Vec<BoxId> = spans
            .iter()
            .map(|&(columns, rows)| {
                tree.append_child(
                    grid,
                    ComputedStyle {
                        height: Length::Px(10.0),
                        grid_column_end: GridLine::span(columns).unwrap(),
                        grid_row_end: GridLine::span(rows).unwrap(),
                        ..ComputedStyle::new()
                    },
                )
            })
            .collect();

        FlowDispatcher
            .layout_root(&mut tree, root, 400, &UnitContext::new())
            .unwrap();

        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                let ra = tree[a].dimensions.border_box();
                let rb = tree[b].dimensions.border_box();
                assert!(!ra.intersects(&rb), "{ra:?} overlaps {rb:?}");
            }
        }
    }

    #[test]
    fn test_absolute_child_uses_position() {
        let mut tree = BoxTree::new();
        let root = tree.insert_root(ComputedStyle::new());
        let grid = tree.append_child(
            root,
            ComputedStyle {
                display: Display::Grid,
                ..ComputedStyle::new()
            },
        );
        let abs = tree.append_child(
            grid,
            ComputedStyle {
                position: Position::Fixed,
                width: Length::Px(30.0),
                ..ComputedStyle::new()
            },
        );
        FlowDispatcher
            .layout_root(&mut tree, root, 100, &UnitContext::new())
            .unwrap();
        assert_eq!(rect(&tree, abs).width, 30);
        assert_eq!(rect(&tree, grid).height, 0);
    }

    #[test]
    fn test_huge_line_number_clamped() {
        let (tree, grid, ids) = layout(
            "grid { display: grid; grid-template-columns: 1000px }
             item { grid-column: 3000000; height: 10px }",
            &["item"],
            300,
        );
        let last = MAX_GRID_LINE - 1;
        assert_eq!(rect(&tree, ids[0]), Rect::new(last * 1000, 0, 1000, 10));
        assert_eq!(rect(&tree, grid).height, 10);
    }

    #[test]
    fn test_huge_tracks_saturate() {
        let (tree, grid, ids) = layout(
            "grid {
                 display: grid;
                 grid-template-columns: 1000000000px;
                 grid-template-rows: 1000000000px 1000000000px 1000000000px
             }
             item { grid-column: 4; grid-row: 3; height: 10px }",
            &["item"],
            300,
        );
        assert_eq!(rect(&tree, ids[0]).x, i32::MAX);
        assert_eq!(rect(&tree, grid).height, i32::MAX);
    }

    struct FailingDispatcher;

    impl LayoutDispatcher for FailingDispatcher {
        fn layout_contents(
            &self,
            _tree: &mut BoxTree,
            _id: BoxId,
            _ctx: &UnitContext,
        ) -> Result<(), LayoutError> {
            Err(LayoutError::AllocationFailed("item contents"))
        }

        fn minmax(&self, _tree: &mut BoxTree, _id: BoxId, _ctx: &UnitContext) -> Result<(), LayoutError> {
            Ok(())
        }
    }

    #[test]
    fn test_item_error_propagates() {
        let mut tree = BoxTree::new();
        let grid = tree.insert_root(ComputedStyle {
            display: Display::Grid,
            ..ComputedStyle::new()
        });
        tree.append_child(grid, ComputedStyle::new());

        let err = layout_grid(&mut tree, grid, 100, &UnitContext::new(), &FailingDispatcher)
            .unwrap_err();
        assert_eq!(err, LayoutError::AllocationFailed("item contents"));
    }
}
