//! Arena-allocated box tree.
//!
//! Boxes live in a single `Vec` and refer to each other by [`BoxId`].
//! Children keep insertion order, which is also grid placement priority.

use std::ops::{Index, IndexMut};

use rustkit_css::{ComputedStyle, Display};

use crate::intrinsic::IntrinsicWidths;
use crate::Dimensions;

/// Index of a box in a [`BoxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoxId(pub usize);

/// Type of layout box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxType {
    Block,
    Inline,
    InlineBlock,
    Table,
    TableRowGroup,
    TableRow,
    TableCell,
    Flex,
    InlineFlex,
    Grid,
    InlineGrid,
    /// `display: none`; generates no geometry.
    None,
}

impl BoxType {
    /// Box type generated by a display value.
    pub fn from_display(display: Display) -> BoxType {
        match display {
            Display::Inline => BoxType::Inline,
            Display::Block => BoxType::Block,
            Display::ListItem => BoxType::Block,
            Display::RunIn => BoxType::Inline,
            Display::InlineBlock => BoxType::InlineBlock,
            Display::Table => BoxType::Table,
            Display::InlineTable => BoxType::Table,
            Display::TableRowGroup => BoxType::TableRowGroup,
            Display::TableHeaderGroup => BoxType::TableRowGroup,
            Display::TableFooterGroup => BoxType::TableRowGroup,
            Display::TableRow => BoxType::TableRow,
            Display::TableColumnGroup => BoxType::None,
            Display::TableColumn => BoxType::None,
            Display::TableCell => BoxType::TableCell,
            Display::TableCaption => BoxType::Inline,
            Display::None => BoxType::None,
            Display::Flex => BoxType::Flex,
            Display::InlineFlex => BoxType::InlineFlex,
            Display::Grid => BoxType::Grid,
            Display::InlineGrid => BoxType::InlineGrid,
        }
    }

    pub fn is_grid(self) -> bool {
        matches!(self, BoxType::Grid | BoxType::InlineGrid)
    }

    pub fn is_flex(self) -> bool {
        matches!(self, BoxType::Flex | BoxType::InlineFlex)
    }

    /// Block-level equivalent used for children of flex and grid containers.
    fn blockified(self) -> BoxType {
        match self {
            BoxType::InlineGrid => BoxType::Grid,
            BoxType::InlineFlex => BoxType::Flex,
            BoxType::Inline
            | BoxType::InlineBlock
            | BoxType::TableCell
            | BoxType::TableRow
            | BoxType::TableRowGroup => BoxType::Block,
            other => other,
        }
    }
}

/// Box type generated for `style`.
///
/// Absolutely or fixed positioned inline-level boxes become inline-blocks.
/// Otherwise the root is always a block, and children of flex and grid
/// containers are blockified.
pub fn box_type_for(style: &ComputedStyle, is_root: bool, container: Option<BoxType>) -> BoxType {
    let positioned_inline = matches!(
        style.display,
        Display::Inline | Display::InlineBlock | Display::InlineTable | Display::InlineFlex
    );
    if style.position.is_out_of_flow() && positioned_inline {
        return BoxType::InlineBlock;
    }
    if is_root {
        return BoxType::Block;
    }

    let box_type = BoxType::from_display(style.display);
    match container {
        Some(container) if container.is_grid() || container.is_flex() => box_type.blockified(),
        _ => box_type,
    }
}

/// A layout box in the layout tree.
#[derive(Debug, Clone)]
pub struct LayoutBox {
    /// Box type.
    pub box_type: BoxType,
    /// Computed style.
    pub style: ComputedStyle,
    /// Computed dimensions.
    pub dimensions: Dimensions,
    /// Memoised min/max content widths; `None` until computed.
    pub intrinsic: Option<IntrinsicWidths>,
    /// Parent box, `None` for the root.
    pub parent: Option<BoxId>,
    /// Child boxes in document order.
    pub children: Vec<BoxId>,
}

impl LayoutBox {
    /// Create a new layout box.
    pub fn new(box_type: BoxType, style: ComputedStyle) -> Self {
        Self {
            box_type,
            style,
            dimensions: Dimensions::default(),
            intrinsic: None,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Whether the box is absolutely or fixed positioned.
    pub fn is_out_of_flow(&self) -> bool {
        self.style.position.is_out_of_flow()
    }

    /// Whether the box takes part in its parent's formatting context.
    pub fn is_in_flow(&self) -> bool {
        self.box_type != BoxType::None && !self.is_out_of_flow()
    }
}

/// Arena of layout boxes.
#[derive(Debug, Clone, Default)]
pub struct BoxTree {
    boxes: Vec<LayoutBox>,
}

impl BoxTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Insert the root box.
    pub fn insert_root(&mut self, style: ComputedStyle) -> BoxId {
        let box_type = box_type_for(&style, true, None);
        self.push(LayoutBox::new(box_type, style))
    }

    /// Append a child, mapping its display to a box type.
    pub fn append_child(&mut self, parent: BoxId, style: ComputedStyle) -> BoxId {
        let box_type = box_type_for(&style, false, Some(self.boxes[parent.0].box_type));
        let mut child = LayoutBox::new(box_type, style);
        child.parent = Some(parent);
        let id = self.push(child);
        self.boxes[parent.0].children.push(id);
        id
    }

    fn push(&mut self, layout_box: LayoutBox) -> BoxId {
        let id = BoxId(self.boxes.len());
        self.boxes.push(layout_box);
        id
    }

    /// Get a box by id.
    pub fn get(&self, id: BoxId) -> Option<&LayoutBox> {
        self.boxes.get(id.0)
    }

    /// Children of `id` in document order.
    pub fn children(&self, id: BoxId) -> &[BoxId] {
        self.boxes
            .get(id.0)
            .map_or(&[][..], |b| b.children.as_slice())
    }

    pub fn parent(&self, id: BoxId) -> Option<BoxId> {
        self.boxes.get(id.0).and_then(|b| b.parent)
    }
}

impl Index<BoxId> for BoxTree {
    type Output = LayoutBox;

    fn index(&self, id: BoxId) -> &LayoutBox {
        &self.boxes[id.0]
    }
}

impl IndexMut<BoxId> for BoxTree {
    fn index_mut(&mut self, id: BoxId) -> &mut LayoutBox {
        &mut self.boxes[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustkit_css::Position;

    fn style(display: Display) -> ComputedStyle {
        ComputedStyle {
            display,
            ..ComputedStyle::new()
        }
    }

    #[test]
    fn test_from_display() {
        assert_eq!(BoxType::from_display(Display::Grid), BoxType::Grid);
        assert_eq!(BoxType::from_display(Display::InlineGrid), BoxType::InlineGrid);
        assert_eq!(BoxType::from_display(Display::ListItem), BoxType::Block);
        assert_eq!(BoxType::from_display(Display::TableHeaderGroup), BoxType::TableRowGroup);
        assert_eq!(BoxType::from_display(Display::None), BoxType::None);
        assert_eq!(BoxType::from_display(Display::InlineTable), BoxType::Table);
        assert_eq!(BoxType::from_display(Display::TableCaption), BoxType::Inline);
    }

    #[test]
    fn test_root_is_block() {
        let mut tree = BoxTree::new();
        let root = tree.insert_root(style(Display::InlineGrid));
        assert_eq!(tree[root].box_type, BoxType::Block);
        assert!(tree.parent(root).is_none());

        let mut tree = BoxTree::new();
        let root = tree.insert_root(style(Display::None));
        assert_eq!(tree[root].box_type, BoxType::Block);
    }

    #[test]
    fn test_grid_children_blockified() {
        let mut tree = BoxTree::new();
        let root = tree.insert_root(style(Display::Block));
        let grid = tree.append_child(root, style(Display::Grid));
        let a = tree.append_child(grid, style(Display::Inline));
        let b = tree.append_child(grid, style(Display::InlineGrid));
        let c = tree.append_child(grid, style(Display::TableCell));
        let d = tree.append_child(grid, style(Display::None));

        assert_eq!(tree[a].box_type, BoxType::Block);
        assert_eq!(tree[b].box_type, BoxType::Grid);
        assert_eq!(tree[c].box_type, BoxType::Block);
        assert_eq!(tree[d].box_type, BoxType::None);
        assert_eq!(tree.children(grid), &[a, b, c, d]);
        assert_eq!(tree.parent(a), Some(grid));
    }

    #[test]
    fn test_positioned_inline_becomes_inline_block() {
        let mut tree = BoxTree::new();
        let root = tree.insert_root(style(Display::Block));
        let abs = tree.append_child(
            root,
            ComputedStyle {
                position: Position::Absolute,
                ..style(Display::Inline)
            },
        );
        assert_eq!(tree[abs].box_type, BoxType::InlineBlock);
        assert!(!tree[abs].is_in_flow());

        let grid = tree.append_child(root, style(Display::Grid));
        let abs_flex = tree.append_child(
            grid,
            ComputedStyle {
                position: Position::Fixed,
                ..style(Display::InlineFlex)
            },
        );
        assert_eq!(tree[abs_flex].box_type, BoxType::InlineBlock);
    }

    #[test]
    fn test_inline_outside_grid_kept() {
        let mut tree = BoxTree::new();
        let root = tree.insert_root(style(Display::Block));
        let span = tree.append_child(root, style(Display::Inline));
        assert_eq!(tree[span].box_type, BoxType::Inline);
    }
}
