//! # RustKit CSS
//!
//! CSS value parsing and style computation for the RustKit grid engine.
//!
//! ## Design Goals
//!
//! 1. **Property parsing**: Parse grid-related CSS values from token streams
//! 2. **Compact transport**: Carry track lists from parse time to style
//!    computation as a flat numeric stream ([`bytecode`])
//! 3. **Cascade**: Apply declarations, including CSS-wide keywords
//! 4. **Computed values**: Resolve lengths to device pixels via [`UnitContext`]

pub mod bytecode;
pub mod cascade;
pub mod grid;

pub use bytecode::{Fixed, Unit};
pub use cascade::{parse_declaration, PropertyId, SpecifiedValue};
pub use grid::{
    parse_grid_auto_flow, parse_grid_line, parse_grid_line_pair, parse_grid_template,
    parse_track, parse_track_list, CssWideKeyword, GridAutoFlow, GridLine, GridPlacement,
    GridTemplate, Specified, TrackBreadth, TrackDefinition, TrackList, MAX_GRID_LINE,
    MAX_GRID_TRACKS,
};

use rustkit_cssparser::{parse_stylesheet, Token, TokenStream};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur in CSS operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CssError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

// ==================== Units ====================

/// Context for converting CSS lengths to device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitContext {
    /// Device resolution; 96 means one device pixel per CSS pixel.
    pub device_dpi: f32,
    /// Font size used when a style does not resolve its own.
    pub font_size_default: f32,
    /// Font size of the root element (for `rem`).
    pub root_font_size: f32,
    /// Viewport width in CSS pixels.
    pub viewport_width: f32,
    /// Viewport height in CSS pixels.
    pub viewport_height: f32,
}

impl Default for UnitContext {
    fn default() -> Self {
        Self {
            device_dpi: 96.0,
            font_size_default: 16.0,
            root_font_size: 16.0,
            viewport_width: 0.0,
            viewport_height: 0.0,
        }
    }
}

impl UnitContext {
    /// Create a context at 96 dpi with a 16px default font.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the viewport size.
    pub fn with_viewport(mut self, width: f32, height: f32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set the device resolution.
    pub fn with_dpi(mut self, dpi: f32) -> Self {
        self.device_dpi = dpi;
        self
    }

    /// Scale a CSS pixel value to whole device pixels (truncating).
    pub fn css_to_device(&self, css_px: f32) -> i32 {
        (css_px * self.device_dpi / 96.0) as i32
    }
}

/// A CSS length value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Length {
    /// Pixels.
    Px(f32),
    /// Em (relative to font size).
    Em(f32),
    /// Ex (approximated as half an em).
    Ex(f32),
    /// Rem (relative to root font size).
    Rem(f32),
    /// Inches.
    In(f32),
    /// Centimetres.
    Cm(f32),
    /// Millimetres.
    Mm(f32),
    /// Points.
    Pt(f32),
    /// Picas.
    Pc(f32),
    /// Percentage.
    Percent(f32),
    /// Viewport width (1vw = 1% of viewport width).
    Vw(f32),
    /// Viewport height (1vh = 1% of viewport height).
    Vh(f32),
    /// Viewport min (1vmin = 1% of smaller viewport dimension).
    Vmin(f32),
    /// Viewport max (1vmax = 1% of larger viewport dimension).
    Vmax(f32),
    /// Auto.
    Auto,
    /// Zero.
    #[default]
    Zero,
}

impl Length {
    /// Build a length from a number and a unit name (`px`, `em`, ...).
    pub fn from_unit(value: f32, unit: &str) -> Option<Length> {
        let length = match unit.to_ascii_lowercase().as_str() {
            "px" => Length::Px(value),
            "em" => Length::Em(value),
            "ex" => Length::Ex(value),
            "rem" => Length::Rem(value),
            "in" => Length::In(value),
            "cm" => Length::Cm(value),
            "mm" => Length::Mm(value),
            "pt" => Length::Pt(value),
            "pc" => Length::Pc(value),
            "vw" => Length::Vw(value),
            "vh" => Length::Vh(value),
            "vmin" => Length::Vmin(value),
            "vmax" => Length::Vmax(value),
            _ => return None,
        };
        Some(length)
    }

    /// Whether this is `auto`.
    pub fn is_auto(&self) -> bool {
        matches!(self, Length::Auto)
    }

    /// This length multiplied by `factor`.
    pub fn scaled(self, factor: f32) -> Length {
        match self {
            Length::Px(v) => Length::Px(v * factor),
            Length::Em(v) => Length::Em(v * factor),
            Length::Ex(v) => Length::Ex(v * factor),
            Length::Rem(v) => Length::Rem(v * factor),
            Length::In(v) => Length::In(v * factor),
            Length::Cm(v) => Length::Cm(v * factor),
            Length::Mm(v) => Length::Mm(v * factor),
            Length::Pt(v) => Length::Pt(v * factor),
            Length::Pc(v) => Length::Pc(v * factor),
            Length::Percent(v) => Length::Percent(v * factor),
            Length::Vw(v) => Length::Vw(v * factor),
            Length::Vh(v) => Length::Vh(v * factor),
            Length::Vmin(v) => Length::Vmin(v * factor),
            Length::Vmax(v) => Length::Vmax(v * factor),
            Length::Auto => Length::Auto,
            Length::Zero => Length::Zero,
        }
    }

    /// Resolve a `font-size` in `em`, `ex` or `%` against the parent's
    /// computed font size. Other units, and parents without a size, leave
    /// the value unchanged.
    pub fn relative_to_font(self, parent: Length) -> Length {
        if matches!(parent, Length::Auto | Length::Zero) {
            return self;
        }
        match self {
            Length::Em(em) => parent.scaled(em),
            Length::Ex(ex) => parent.scaled(ex * 0.5),
            Length::Percent(pct) => parent.scaled(pct / 100.0),
            other => other,
        }
    }

    /// Compute the absolute CSS pixel value with viewport dimensions for vh/vw units.
    pub fn to_px_with_viewport(
        &self,
        font_size: f32,
        root_font_size: f32,
        container_size: f32,
        viewport_width: f32,
        viewport_height: f32,
    ) -> f32 {
        match self {
            Length::Px(px) => *px,
            Length::Em(em) => em * font_size,
            Length::Ex(ex) => ex * font_size * 0.5,
            Length::Rem(rem) => rem * root_font_size,
            Length::In(v) => v * 96.0,
            Length::Cm(v) => v * 96.0 / 2.54,
            Length::Mm(v) => v * 96.0 / 25.4,
            Length::Pt(v) => v * 96.0 / 72.0,
            Length::Pc(v) => v * 16.0,
            Length::Percent(pct) => pct / 100.0 * container_size,
            Length::Vw(vw) => vw / 100.0 * viewport_width,
            Length::Vh(vh) => vh / 100.0 * viewport_height,
            Length::Vmin(vmin) => vmin / 100.0 * viewport_width.min(viewport_height),
            Length::Vmax(vmax) => vmax / 100.0 * viewport_width.max(viewport_height),
            Length::Auto => 0.0, // Context-dependent
            Length::Zero => 0.0,
        }
    }

    /// Convert to whole device pixels.
    ///
    /// `container_size` is in CSS pixels and only matters for percentages.
    pub fn to_device_px(&self, ctx: &UnitContext, font_size: f32, container_size: f32) -> i32 {
        let css_px = self.to_px_with_viewport(
            font_size,
            ctx.root_font_size,
            container_size,
            ctx.viewport_width,
            ctx.viewport_height,
        );
        ctx.css_to_device(css_px)
    }
}

/// Parse a length from a single token.
pub fn length_from_token(token: &Token) -> Option<Length> {
    match token {
        Token::Dimension { value, unit, .. } => Length::from_unit(*value, unit),
        Token::Percentage(pct) => Some(Length::Percent(*pct)),
        Token::Number { value, .. } if *value == 0.0 => Some(Length::Zero),
        Token::Ident(ident) if ident.eq_ignore_ascii_case("auto") => Some(Length::Auto),
        _ => None,
    }
}

/// Parse a length value.
pub fn parse_length(value: &str) -> Option<Length> {
    let mut stream = TokenStream::new(value);
    stream.skip_whitespace();
    let length = stream.next_token().and_then(length_from_token)?;
    stream.is_exhausted().then_some(length)
}

// ==================== Box Types ====================

/// Display property values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    #[default]
    Inline,
    Block,
    ListItem,
    RunIn,
    InlineBlock,
    Table,
    InlineTable,
    TableRowGroup,
    TableHeaderGroup,
    TableFooterGroup,
    TableRow,
    TableColumnGroup,
    TableColumn,
    TableCell,
    TableCaption,
    None,
    Flex,
    InlineFlex,
    Grid,
    InlineGrid,
}

impl Display {
    /// Check if this is a flex container.
    pub fn is_flex(self) -> bool {
        matches!(self, Display::Flex | Display::InlineFlex)
    }

    /// Check if this is a grid container.
    pub fn is_grid(self) -> bool {
        matches!(self, Display::Grid | Display::InlineGrid)
    }
}

/// Parse display value.
pub fn parse_display(value: &str) -> Option<Display> {
    let display = match value.trim().to_ascii_lowercase().as_str() {
        "inline" => Display::Inline,
        "block" => Display::Block,
        "list-item" => Display::ListItem,
        "run-in" => Display::RunIn,
        "inline-block" => Display::InlineBlock,
        "table" => Display::Table,
        "inline-table" => Display::InlineTable,
        "table-row-group" => Display::TableRowGroup,
        "table-header-group" => Display::TableHeaderGroup,
        "table-footer-group" => Display::TableFooterGroup,
        "table-row" => Display::TableRow,
        "table-column-group" => Display::TableColumnGroup,
        "table-column" => Display::TableColumn,
        "table-cell" => Display::TableCell,
        "table-caption" => Display::TableCaption,
        "none" => Display::None,
        "flex" => Display::Flex,
        "inline-flex" => Display::InlineFlex,
        "grid" => Display::Grid,
        "inline-grid" => Display::InlineGrid,
        _ => return None,
    };
    Some(display)
}

/// Position property values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

impl Position {
    /// Absolutely positioned boxes are taken out of flow.
    pub fn is_out_of_flow(self) -> bool {
        matches!(self, Position::Absolute | Position::Fixed)
    }
}

/// Parse position value.
pub fn parse_position(value: &str) -> Option<Position> {
    match value.trim().to_ascii_lowercase().as_str() {
        "static" => Some(Position::Static),
        "relative" => Some(Position::Relative),
        "absolute" => Some(Position::Absolute),
        "fixed" => Some(Position::Fixed),
        "sticky" => Some(Position::Sticky),
        _ => None,
    }
}

/// `column-gap` / `row-gap` value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gap {
    /// `normal` (zero for grid containers).
    #[default]
    Normal,
    /// Explicit length or percentage.
    Length(Length),
}

// ==================== Computed Style ====================

/// Computed style for an element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputedStyle {
    // Box model
    pub display: Display,
    pub position: Position,
    pub width: Length,
    pub height: Length,
    pub min_width: Length,
    pub min_height: Length,
    pub max_width: Length,
    pub max_height: Length,

    // Margin
    pub margin_top: Length,
    pub margin_right: Length,
    pub margin_bottom: Length,
    pub margin_left: Length,

    // Padding
    pub padding_top: Length,
    pub padding_right: Length,
    pub padding_bottom: Length,
    pub padding_left: Length,

    // Border
    pub border_top_width: Length,
    pub border_right_width: Length,
    pub border_bottom_width: Length,
    pub border_left_width: Length,

    // Typography
    pub font_size: Length,

    // Gaps
    pub row_gap: Gap,
    pub column_gap: Gap,

    // Grid Container
    pub grid_template_columns: GridTemplate,
    pub grid_template_rows: GridTemplate,
    pub grid_auto_flow: GridAutoFlow,

    // Grid Item
    pub grid_column_start: GridLine,
    pub grid_column_end: GridLine,
    pub grid_row_start: GridLine,
    pub grid_row_end: GridLine,
}

impl ComputedStyle {
    /// Create default style.
    pub fn new() -> Self {
        Self {
            font_size: Length::Px(16.0),
            width: Length::Auto,
            height: Length::Auto,
            min_width: Length::Zero,
            min_height: Length::Zero,
            max_width: Length::Auto, // No max constraint
            max_height: Length::Auto,
            ..Default::default()
        }
    }

    /// Create style with inheritance from parent. The parent's font size is
    /// already computed, so relative sizes compound down the tree.
    pub fn inherit_from(parent: &ComputedStyle) -> Self {
        Self {
            font_size: parent.font_size,
            ..Self::new()
        }
    }

    /// Font size in CSS pixels.
    pub fn font_size_px(&self, ctx: &UnitContext) -> f32 {
        match self.font_size {
            Length::Auto | Length::Zero => ctx.font_size_default,
            len => len.to_px_with_viewport(
                ctx.font_size_default,
                ctx.root_font_size,
                ctx.font_size_default,
                ctx.viewport_width,
                ctx.viewport_height,
            ),
        }
    }

    /// The item's placement lines.
    pub fn grid_placement(&self) -> GridPlacement {
        GridPlacement {
            column_start: self.grid_column_start,
            column_end: self.grid_column_end,
            row_start: self.grid_row_start,
            row_end: self.grid_row_end,
        }
    }
}

// ==================== Stylesheets ====================

/// A CSS declaration, parsed into longhands.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub property: PropertyId,
    pub value: SpecifiedValue,
    pub important: bool,
}

/// A CSS rule (selector + declarations).
#[derive(Debug, Clone)]
pub struct Rule {
    pub selector: String,
    pub declarations: Vec<Declaration>,
}

/// A complete stylesheet.
#[derive(Debug, Default, Clone)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
}

impl Stylesheet {
    /// Create an empty stylesheet.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Parse a CSS string into a stylesheet.
    ///
    /// Declarations with invalid values are dropped; the rest of the sheet
    /// is unaffected.
    pub fn parse(css: &str) -> Result<Self, CssError> {
        debug!(len = css.len(), "Parsing CSS");
        let ast = parse_stylesheet(css).map_err(|e| CssError::ParseError(e.to_string()))?;

        let mut rules = Vec::with_capacity(ast.rules.len());
        for rule in ast.rules {
            let mut declarations = Vec::new();
            for decl in rule.declarations {
                match parse_declaration(&decl.property, &decl.value) {
                    Ok(longhands) => declarations.extend(longhands.into_iter().map(
                        |(property, value)| Declaration {
                            property,
                            value,
                            important: decl.important,
                        },
                    )),
                    Err(err) => {
                        debug!(property = %decl.property, value = %decl.value, %err, "Dropping declaration");
                    }
                }
            }
            rules.push(Rule {
                selector: rule.selector,
                declarations,
            });
        }

        debug!(rule_count = rules.len(), "CSS parsed");
        Ok(Stylesheet { rules })
    }

    /// Get the number of rules in this stylesheet.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Cascade every rule whose selector `matches` into a fresh style.
    ///
    /// Normal declarations apply in source order, then `!important` ones.
    pub fn compute_style(
        &self,
        matches: impl Fn(&str) -> bool,
        parent: Option<&ComputedStyle>,
    ) -> Result<ComputedStyle, CssError> {
        let mut style = match parent {
            Some(parent) => ComputedStyle::inherit_from(parent),
            None => ComputedStyle::new(),
        };

        let matched: Vec<&Rule> = self.rules.iter().filter(|r| matches(&r.selector)).collect();
        for important in [false, true] {
            for rule in &matched {
                for decl in rule.declarations.iter().filter(|d| d.important == important) {
                    style.apply(decl.property, &decl.value, parent)?;
                }
            }
        }
        Ok(style)
    }
}
