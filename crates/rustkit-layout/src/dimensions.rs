//! Resolution of box dimensions from computed style.

use rustkit_css::{ComputedStyle, Length, UnitContext};

use crate::EdgeSizes;

/// Style dimensions resolved to device pixels.
///
/// `width` and `height` are content-box sizes; `None` means `auto`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedDimensions {
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub min_width: i32,
    /// `None` means no maximum.
    pub max_width: Option<i32>,
    pub margin: EdgeSizes,
    pub padding: EdgeSizes,
    pub border: EdgeSizes,
}

/// Convert a length to device pixels. Percentages resolve against
/// `container`, which is already in device pixels. `auto` is 0.
pub fn length_to_px(len: Length, ctx: &UnitContext, font_size: f32, container: i32) -> i32 {
    match len {
        Length::Percent(pct) => (pct * container as f32 / 100.0) as i32,
        Length::Auto => 0,
        other => other.to_device_px(ctx, font_size, 0.0),
    }
}

fn definite(len: Length, ctx: &UnitContext, font_size: f32, container: i32) -> Option<i32> {
    (!len.is_auto()).then(|| length_to_px(len, ctx, font_size, container))
}

/// Resolve width, height, min/max width and box edges of `style`.
///
/// Horizontal percentages (including vertical margins and padding) resolve
/// against `available_width`. Percentage heights are treated as `auto`;
/// `vh` units use `viewport_height` (CSS pixels).
pub fn resolve_dimensions(
    ctx: &UnitContext,
    available_width: i32,
    viewport_height: f32,
    style: &ComputedStyle,
) -> ResolvedDimensions {
    let ctx = UnitContext {
        viewport_height,
        ..*ctx
    };
    let ctx = &ctx;
    let font_size = style.font_size_px(ctx);
    let edge = |top, right, bottom, left| EdgeSizes {
        top: length_to_px(top, ctx, font_size, available_width),
        right: length_to_px(right, ctx, font_size, available_width),
        bottom: length_to_px(bottom, ctx, font_size, available_width),
        left: length_to_px(left, ctx, font_size, available_width),
    };

    let height = match style.height {
        Length::Percent(_) => None,
        len => definite(len, ctx, font_size, 0),
    };

    ResolvedDimensions {
        width: definite(style.width, ctx, font_size, available_width),
        height,
        min_width: length_to_px(style.min_width, ctx, font_size, available_width).max(0),
        max_width: definite(style.max_width, ctx, font_size, available_width),
        margin: edge(
            style.margin_top,
            style.margin_right,
            style.margin_bottom,
            style.margin_left,
        ),
        padding: edge(
            style.padding_top,
            style.padding_right,
            style.padding_bottom,
            style.padding_left,
        ),
        border: edge(
            style.border_top_width,
            style.border_right_width,
            style.border_bottom_width,
            style.border_left_width,
        ),
    }
}

impl ResolvedDimensions {
    /// Apply min/max width to a content width.
    pub fn clamp_width(&self, width: i32) -> i32 {
        let capped = self.max_width.map_or(width, |max| width.min(max));
        capped.max(self.min_width)
    }

    /// Margin, border and padding on the left and right.
    pub fn horizontal_edges(&self) -> i32 {
        self.margin.horizontal() + self.border.horizontal() + self.padding.horizontal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_sizes() {
        let ctx = UnitContext::new();
        let dims = resolve_dimensions(&ctx, 300, 0.0, &ComputedStyle::new());
        assert_eq!(dims.width, None);
        assert_eq!(dims.height, None);
        assert_eq!(dims.max_width, None);
        assert_eq!(dims.margin, EdgeSizes::default());
    }

    #[test]
    fn test_percentages() {
        let ctx = UnitContext::new();
        let style = ComputedStyle {
            width: Length::Percent(50.0),
            height: Length::Percent(50.0),
            padding_top: Length::Percent(10.0),
            margin_left: Length::Auto,
            ..ComputedStyle::new()
        };
        let dims = resolve_dimensions(&ctx, 300, 0.0, &style);
        assert_eq!(dims.width, Some(150));
        assert_eq!(dims.height, None);
        assert_eq!(dims.padding.top, 30);
        assert_eq!(dims.margin.left, 0);
    }

    #[test]
    fn test_em_and_viewport_units() {
        let ctx = UnitContext::new().with_viewport(800.0, 600.0);
        let style = ComputedStyle {
            font_size: Length::Px(10.0),
            width: Length::Em(3.0),
            height: Length::Vh(10.0),
            border_left_width: Length::Px(2.0),
            ..ComputedStyle::new()
        };
        let dims = resolve_dimensions(&ctx, 300, 400.0, &style);
        assert_eq!(dims.width, Some(30));
        assert_eq!(dims.height, Some(40));
        assert_eq!(dims.border.left, 2);
    }

    #[test]
    fn test_clamp_width() {
        let dims = ResolvedDimensions {
            min_width: 50,
            max_width: Some(100),
            ..Default::default()
        };
        assert_eq!(dims.clamp_width(10), 50);
        assert_eq!(dims.clamp_width(70), 70);
        assert_eq!(dims.clamp_width(500), 100);
    }

    #[test]
    fn test_horizontal_edges() {
        let ctx = UnitContext::new();
        let style = ComputedStyle {
            margin_left: Length::Px(1.0),
            padding_right: Length::Px(2.0),
            border_left_width: Length::Px(3.0),
            border_top_width: Length::Px(50.0),
            ..ComputedStyle::new()
        };
        assert_eq!(resolve_dimensions(&ctx, 0, 0.0, &style).horizontal_edges(), 6);
    }
}
