//! Layout dispatch between formatting contexts.
//!
//! Grid layout only knows how to size and position its items; what goes on
//! inside an item is delegated through [`LayoutDispatcher`].

use rustkit_css::{Length, UnitContext};
use tracing::trace;

use crate::dimensions::resolve_dimensions;
use crate::grid::{layout_grid, layout_grid_contents};
use crate::intrinsic::{layout_minmax_grid, IntrinsicWidths};
use crate::tree::{BoxId, BoxTree, BoxType};
use crate::{try_vec, Dimensions, LayoutError};

/// Lays out box contents for the grid engine.
pub trait LayoutDispatcher {
    /// Lay out the contents of `id`.
    ///
    /// The caller has already set the box's edges and content width; this
    /// sets the content height and positions the box's children.
    fn layout_contents(
        &self,
        tree: &mut BoxTree,
        id: BoxId,
        ctx: &UnitContext,
    ) -> Result<(), LayoutError>;

    /// Compute and store `tree[id].intrinsic`.
    fn minmax(&self, tree: &mut BoxTree, id: BoxId, ctx: &UnitContext) -> Result<(), LayoutError>;
}

/// Block flow with grid containers.
///
/// Non-grid boxes stack their in-flow children vertically.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowDispatcher;

impl FlowDispatcher {
    /// Lay out the whole tree below `root` at `viewport_width` device pixels.
    pub fn layout_root(
        &self,
        tree: &mut BoxTree,
        root: BoxId,
        viewport_width: i32,
        ctx: &UnitContext,
    ) -> Result<(), LayoutError> {
        tree[root].dimensions = Dimensions::default();
        tree[root].dimensions.content.width = viewport_width;
        self.layout_contents(tree, root, ctx)
    }

    fn layout_block(&self, tree: &mut BoxTree, id: BoxId, ctx: &UnitContext) -> Result<(), LayoutError> {
        let width = tree[id].dimensions.content.width;
        let mut children = try_vec(tree.children(id).len(), "block children")?;
        children.extend_from_slice(tree.children(id));

        let mut cursor: i32 = 0;
        for child in children {
            if tree[child].box_type == BoxType::None {
                tree[child].dimensions = Dimensions::default();
                continue;
            }
            let in_flow = tree[child].is_in_flow();
            let top = if in_flow { cursor } else { 0 };

            if tree[child].box_type.is_grid() {
                layout_grid(tree, child, width, ctx, self)?;
            } else {
                let dims = resolve_dimensions(ctx, width, ctx.viewport_height, &tree[child].style);
                let content_width = dims
                    .clamp_width(dims.width.unwrap_or(width - dims.horizontal_edges()))
                    .max(0);
                let d = &mut tree[child].dimensions;
                d.margin = dims.margin;
                d.padding = dims.padding;
                d.border = dims.border;
                d.content.width = content_width;

                self.layout_contents(tree, child, ctx)?;
                if let Some(height) = dims.height {
                    tree[child].dimensions.content.height = height;
                }
            }

            let d = &mut tree[child].dimensions;
            d.content.x = d.margin.left + d.border.left + d.padding.left;
            d.content.y = top.saturating_add(d.margin.top + d.border.top + d.padding.top);
            trace!(?child, rect = ?d.content, "Placed block child");

            if in_flow {
                cursor = cursor.saturating_add(d.margin_box().height);
            }
        }

        tree[id].dimensions.content.height = cursor;
        Ok(())
    }

    fn minmax_block(&self, tree: &mut BoxTree, id: BoxId, ctx: &UnitContext) -> Result<(), LayoutError> {
        let mut children = try_vec(tree.children(id).len(), "block children")?;
        children.extend_from_slice(tree.children(id));

        let mut widths = IntrinsicWidths::default();
        for child in children {
            if !tree[child].is_in_flow() {
                continue;
            }
            self.minmax(tree, child, ctx)?;
            let edges = resolve_dimensions(ctx, 0, ctx.viewport_height, &tree[child].style)
                .horizontal_edges();
            let outer = tree[child].intrinsic.unwrap_or_default().outer(edges);
            widths.min = widths.min.max(outer.min);
            widths.max = widths.max.max(outer.max);
        }

        let style = &tree[id].style;
        if !matches!(style.width, Length::Percent(_)) {
            if let Some(width) = resolve_dimensions(ctx, 0, ctx.viewport_height, style).width {
                widths = IntrinsicWidths::new(width, width);
            }
        }

        tree[id].intrinsic = Some(widths);
        Ok(())
    }
}

impl LayoutDispatcher for FlowDispatcher {
    fn layout_contents(
        &self,
        tree: &mut BoxTree,
        id: BoxId,
        ctx: &UnitContext,
    ) -> Result<(), LayoutError> {
        if tree[id].box_type.is_grid() {
            layout_grid_contents(tree, id, ctx, self)
        } else {
            self.layout_block(tree, id, ctx)
        }
    }

    fn minmax(&self, tree: &mut BoxTree, id: BoxId, ctx: &UnitContext) -> Result<(), LayoutError> {
        if tree[id].intrinsic.is_some() {
            return Ok(());
        }
        if tree[id].box_type.is_grid() {
            layout_minmax_grid(tree, id, ctx, self)
        } else {
            self.minmax_block(tree, id, ctx)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustkit_css::{ComputedStyle, Display, Position};

    fn block(height: f32) -> ComputedStyle {
        ComputedStyle {
            display: Display::Block,
            height: Length::Px(height),
            ..ComputedStyle::new()
        }
    }

    #[test]
    fn test_blocks_stack() {
        let mut tree = BoxTree::new();
        let root = tree.insert_root(ComputedStyle::new());
        let a = tree.append_child(root, block(20.0));
        let b = tree.append_child(
            root,
            ComputedStyle {
                margin_top: Length::Px(5.0),
                padding_left: Length::Px(4.0),
                ..block(30.0)
            },
        );

        FlowDispatcher
            .layout_root(&mut tree, root, 200, &UnitContext::new())
            .unwrap();

        assert_eq!(tree[a].dimensions.content.y, 0);
        assert_eq!(tree[a].dimensions.content.width, 200);
        assert_eq!(tree[b].dimensions.content.y, 25);
        assert_eq!(tree[b].dimensions.content.x, 4);
        assert_eq!(tree[b].dimensions.content.width, 196);
        assert_eq!(tree[root].dimensions.content.height, 55);
    }

    #[test]
    fn test_out_of_flow_not_stacked() {
        let mut tree = BoxTree::new();
        let root = tree.insert_root(ComputedStyle::new());
        tree.append_child(root, block(20.0));
        let abs = tree.append_child(
            root,
            ComputedStyle {
                position: Position::Absolute,
                ..block(50.0)
            },
        );
        let hidden = tree.append_child(
            root,
            ComputedStyle {
                display: Display::None,
                ..block(50.0)
            },
        );

        FlowDispatcher
            .layout_root(&mut tree, root, 100, &UnitContext::new())
            .unwrap();

        assert_eq!(tree[abs].dimensions.content.y, 0);
        assert_eq!(tree[abs].dimensions.content.height, 50);
        assert_eq!(tree[hidden].dimensions, Dimensions::default());
        assert_eq!(tree[root].dimensions.content.height, 20);
    }

    #[test]
    fn test_block_minmax() {
        let mut tree = BoxTree::new();
        let root = tree.insert_root(ComputedStyle::new());
        let inner = tree.append_child(root, ComputedStyle::new());
        tree.append_child(
            inner,
            ComputedStyle {
                width: Length::Px(70.0),
                margin_left: Length::Px(10.0),
                ..ComputedStyle::new()
            },
        );
        tree.append_child(
            inner,
            ComputedStyle {
                width: Length::Px(40.0),
                ..ComputedStyle::new()
            },
        );

        FlowDispatcher
            .minmax(&mut tree, root, &UnitContext::new())
            .unwrap();
        assert_eq!(tree[inner].intrinsic, Some(IntrinsicWidths::new(80, 80)));
        assert_eq!(tree[root].intrinsic, Some(IntrinsicWidths::new(80, 80)));
    }

    #[test]
    fn test_percentage_width_uses_content() {
        let mut tree = BoxTree::new();
        let root = tree.insert_root(ComputedStyle {
            width: Length::Percent(50.0),
            ..ComputedStyle::new()
        });
        tree.append_child(
            root,
            ComputedStyle {
                width: Length::Px(30.0),
                ..ComputedStyle::new()
            },
        );

        FlowDispatcher
            .minmax(&mut tree, root, &UnitContext::new())
            .unwrap();
        assert_eq!(tree[root].intrinsic, Some(IntrinsicWidths::new(30, 30)));
    }
}
