//! Declaration parsing and application to [`ComputedStyle`].
//!
//! Shorthands expand into longhands at parse time, so the cascade only ever
//! sees `(PropertyId, SpecifiedValue)` pairs. Grid track lists are carried
//! in their encoded form (see [`crate::bytecode`]) and decoded on apply.

use rustkit_cssparser::{Token, TokenStream};
use smallvec::{smallvec, SmallVec};
use tracing::trace;

use crate::grid::{
    parse_css_wide, parse_grid_auto_flow, parse_grid_line, parse_grid_line_pair,
    parse_grid_template, CssWideKeyword, GridAutoFlow, GridLine, GridTemplate, Specified,
    TrackList,
};
use crate::{
    length_from_token, parse_display, parse_position, ComputedStyle, CssError, Display, Gap,
    Length, Position,
};

/// Longhand properties understood by the style system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyId {
    Display,
    Position,
    Width,
    Height,
    MinWidth,
    MinHeight,
    MaxWidth,
    MaxHeight,
    MarginTop,
    MarginRight,
    MarginBottom,
    MarginLeft,
    PaddingTop,
    PaddingRight,
    PaddingBottom,
    PaddingLeft,
    BorderTopWidth,
    BorderRightWidth,
    BorderBottomWidth,
    BorderLeftWidth,
    FontSize,
    RowGap,
    ColumnGap,
    GridTemplateColumns,
    GridTemplateRows,
    GridAutoFlow,
    GridColumnStart,
    GridColumnEnd,
    GridRowStart,
    GridRowEnd,
}

impl PropertyId {
    /// Look up a longhand by its CSS name.
    pub fn from_name(name: &str) -> Option<Self> {
        let id = match name {
            "display" => PropertyId::Display,
            "position" => PropertyId::Position,
            "width" => PropertyId::Width,
            "height" => PropertyId::Height,
            "min-width" => PropertyId::MinWidth,
            "min-height" => PropertyId::MinHeight,
            "max-width" => PropertyId::MaxWidth,
            "max-height" => PropertyId::MaxHeight,
            "margin-top" => PropertyId::MarginTop,
            "margin-right" => PropertyId::MarginRight,
            "margin-bottom" => PropertyId::MarginBottom,
            "margin-left" => PropertyId::MarginLeft,
            "padding-top" => PropertyId::PaddingTop,
            "padding-right" => PropertyId::PaddingRight,
            "padding-bottom" => PropertyId::PaddingBottom,
            "padding-left" => PropertyId::PaddingLeft,
            "border-top-width" => PropertyId::BorderTopWidth,
            "border-right-width" => PropertyId::BorderRightWidth,
            "border-bottom-width" => PropertyId::BorderBottomWidth,
            "border-left-width" => PropertyId::BorderLeftWidth,
            "font-size" => PropertyId::FontSize,
            "row-gap" => PropertyId::RowGap,
            "column-gap" => PropertyId::ColumnGap,
            "grid-template-columns" => PropertyId::GridTemplateColumns,
            "grid-template-rows" => PropertyId::GridTemplateRows,
            "grid-auto-flow" => PropertyId::GridAutoFlow,
            "grid-column-start" => PropertyId::GridColumnStart,
            "grid-column-end" => PropertyId::GridColumnEnd,
            "grid-row-start" => PropertyId::GridRowStart,
            "grid-row-end" => PropertyId::GridRowEnd,
            _ => return None,
        };
        Some(id)
    }

    /// Inherited properties take the parent's value under `unset`.
    pub fn is_inherited(self) -> bool {
        matches!(self, PropertyId::FontSize)
    }
}

/// A parsed longhand value, ready for the cascade.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecifiedValue {
    CssWide(CssWideKeyword),
    Display(Display),
    Position(Position),
    Length(Length),
    Gap(Gap),
    /// `grid-template-*: none`.
    TemplateNone,
    /// Encoded track list.
    TrackList(Vec<i32>),
    AutoFlow(GridAutoFlow),
    Line(GridLine),
}

/// Longhands produced by one declaration.
pub type Longhands = SmallVec<[(PropertyId, SpecifiedValue); 4]>;

const MARGIN: [PropertyId; 4] = [
    PropertyId::MarginTop,
    PropertyId::MarginRight,
    PropertyId::MarginBottom,
    PropertyId::MarginLeft,
];

const PADDING: [PropertyId; 4] = [
    PropertyId::PaddingTop,
    PropertyId::PaddingRight,
    PropertyId::PaddingBottom,
    PropertyId::PaddingLeft,
];

const BORDER_WIDTH: [PropertyId; 4] = [
    PropertyId::BorderTopWidth,
    PropertyId::BorderRightWidth,
    PropertyId::BorderBottomWidth,
    PropertyId::BorderLeftWidth,
];

// ==================== Parsing ====================

fn expect_exhausted(stream: &TokenStream, property: &str) -> Result<(), CssError> {
    if stream.is_exhausted() {
        Ok(())
    } else {
        Err(CssError::InvalidValue(format!(
            "{property}: unexpected trailing tokens"
        )))
    }
}

fn parse_length_value(stream: &mut TokenStream, allow_negative: bool) -> Result<Length, CssError> {
    stream.skip_whitespace();
    let token = stream.next_token().cloned();
    let length = token
        .as_ref()
        .and_then(length_from_token)
        .ok_or_else(|| CssError::InvalidValue(format!("expected length, found {token:?}")))?;
    let negative = match length {
        Length::Px(v) | Length::Em(v) | Length::Ex(v) | Length::Rem(v) | Length::In(v)
        | Length::Cm(v) | Length::Mm(v) | Length::Pt(v) | Length::Pc(v) | Length::Percent(v)
        | Length::Vw(v) | Length::Vh(v) | Length::Vmin(v) | Length::Vmax(v) => v < 0.0,
        Length::Auto | Length::Zero => false,
    };
    if negative && !allow_negative {
        return Err(CssError::InvalidValue("negative length".into()));
    }
    Ok(length)
}

fn parse_gap(stream: &mut TokenStream) -> Result<Gap, CssError> {
    let start = stream.position();
    stream.skip_whitespace();
    if stream.next_token().is_some_and(|t| t.is_ident("normal")) {
        return Ok(Gap::Normal);
    }
    stream.rewind(start);
    match parse_length_value(stream, false)? {
        Length::Auto => Err(CssError::InvalidValue("gap cannot be auto".into())),
        len => Ok(Gap::Length(len)),
    }
}

fn parse_ident_value<T>(
    stream: &mut TokenStream,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, CssError> {
    stream.skip_whitespace();
    match stream.next_token() {
        Some(Token::Ident(ident)) => parse(ident.as_str())
            .ok_or_else(|| CssError::InvalidValue(format!("unknown keyword '{ident}'"))),
        other => Err(CssError::InvalidValue(format!("expected keyword, found {other:?}"))),
    }
}

fn parse_longhand(id: PropertyId, stream: &mut TokenStream) -> Result<SpecifiedValue, CssError> {
    if let Some(keyword) = parse_css_wide(stream) {
        return Ok(SpecifiedValue::CssWide(keyword));
    }

    let value = match id {
        PropertyId::Display => SpecifiedValue::Display(parse_ident_value(stream, parse_display)?),
        PropertyId::Position => {
            SpecifiedValue::Position(parse_ident_value(stream, parse_position)?)
        }
        PropertyId::MaxWidth | PropertyId::MaxHeight => {
            let start = stream.position();
            stream.skip_whitespace();
            if stream.next_token().is_some_and(|t| t.is_ident("none")) {
                SpecifiedValue::Length(Length::Auto)
            } else {
                stream.rewind(start);
                SpecifiedValue::Length(parse_length_value(stream, false)?)
            }
        }
        PropertyId::MarginTop
        | PropertyId::MarginRight
        | PropertyId::MarginBottom
        | PropertyId::MarginLeft => SpecifiedValue::Length(parse_length_value(stream, true)?),
        PropertyId::Width
        | PropertyId::Height
        | PropertyId::MinWidth
        | PropertyId::MinHeight
        | PropertyId::PaddingTop
        | PropertyId::PaddingRight
        | PropertyId::PaddingBottom
        | PropertyId::PaddingLeft
        | PropertyId::BorderTopWidth
        | PropertyId::BorderRightWidth
        | PropertyId::BorderBottomWidth
        | PropertyId::BorderLeftWidth
        | PropertyId::FontSize => SpecifiedValue::Length(parse_length_value(stream, false)?),
        PropertyId::RowGap | PropertyId::ColumnGap => SpecifiedValue::Gap(parse_gap(stream)?),
        PropertyId::GridTemplateColumns | PropertyId::GridTemplateRows => {
            match parse_grid_template(stream)? {
                Specified::CssWide(keyword) => SpecifiedValue::CssWide(keyword),
                Specified::Value(GridTemplate::None) => SpecifiedValue::TemplateNone,
                Specified::Value(GridTemplate::Tracks(list)) => {
                    SpecifiedValue::TrackList(list.encode())
                }
            }
        }
        PropertyId::GridAutoFlow => match parse_grid_auto_flow(stream)? {
            Specified::CssWide(keyword) => SpecifiedValue::CssWide(keyword),
            Specified::Value(flow) => SpecifiedValue::AutoFlow(flow),
        },
        PropertyId::GridColumnStart
        | PropertyId::GridColumnEnd
        | PropertyId::GridRowStart
        | PropertyId::GridRowEnd => SpecifiedValue::Line(parse_grid_line(stream)?),
    };
    Ok(value)
}

/// Expand 1-4 box values into top/right/bottom/left.
fn parse_box_shorthand(
    stream: &mut TokenStream,
    ids: [PropertyId; 4],
    allow_negative: bool,
) -> Result<Longhands, CssError> {
    if let Some(keyword) = parse_css_wide(stream) {
        return Ok(ids
            .iter()
            .map(|id| (*id, SpecifiedValue::CssWide(keyword)))
            .collect());
    }

    let mut values: SmallVec<[Length; 4]> = SmallVec::new();
    while !stream.is_exhausted() && values.len() < 4 {
        values.push(parse_length_value(stream, allow_negative)?);
    }
    let [top, right, bottom, left] = match values.as_slice() {
        [all] => [*all; 4],
        [vertical, horizontal] => [*vertical, *horizontal, *vertical, *horizontal],
        [top, horizontal, bottom] => [*top, *horizontal, *bottom, *horizontal],
        [top, right, bottom, left] => [*top, *right, *bottom, *left],
        _ => return Err(CssError::InvalidValue("expected 1 to 4 lengths".into())),
    };
    Ok([top, right, bottom, left]
        .into_iter()
        .zip(ids)
        .map(|(len, id)| (id, SpecifiedValue::Length(len)))
        .collect())
}

/// Parse one declaration into longhands.
///
/// The whole value must be consumed; anything left over rejects the
/// declaration.
pub fn parse_declaration(property: &str, value: &str) -> Result<Longhands, CssError> {
    let property = property.trim().to_ascii_lowercase();
    let mut stream = TokenStream::new(value);

    let longhands: Longhands = match property.as_str() {
        "margin" => parse_box_shorthand(&mut stream, MARGIN, true)?,
        "padding" => parse_box_shorthand(&mut stream, PADDING, false)?,
        "border-width" => parse_box_shorthand(&mut stream, BORDER_WIDTH, false)?,
        "gap" | "grid-gap" => match parse_css_wide(&mut stream) {
            Some(keyword) => smallvec![
                (PropertyId::RowGap, SpecifiedValue::CssWide(keyword)),
                (PropertyId::ColumnGap, SpecifiedValue::CssWide(keyword)),
            ],
            None => {
                let row = parse_gap(&mut stream)?;
                let column = if stream.is_exhausted() {
                    row
                } else {
                    parse_gap(&mut stream)?
                };
                smallvec![
                    (PropertyId::RowGap, SpecifiedValue::Gap(row)),
                    (PropertyId::ColumnGap, SpecifiedValue::Gap(column)),
                ]
            }
        },
        "grid-column" | "grid-row" => {
            let (start_id, end_id) = if property == "grid-column" {
                (PropertyId::GridColumnStart, PropertyId::GridColumnEnd)
            } else {
                (PropertyId::GridRowStart, PropertyId::GridRowEnd)
            };
            match parse_grid_line_pair(&mut stream)? {
                Specified::CssWide(keyword) => smallvec![
                    (start_id, SpecifiedValue::CssWide(keyword)),
                    (end_id, SpecifiedValue::CssWide(keyword)),
                ],
                Specified::Value((start, end)) => smallvec![
                    (start_id, SpecifiedValue::Line(start)),
                    (end_id, SpecifiedValue::Line(end)),
                ],
            }
        }
        name => {
            let id = PropertyId::from_name(name)
                .ok_or_else(|| CssError::InvalidValue(format!("unsupported property '{name}'")))?;
            smallvec![(id, parse_longhand(id, &mut stream)?)]
        }
    };

    expect_exhausted(&stream, &property)?;
    trace!(%property, count = longhands.len(), "Parsed declaration");
    Ok(longhands)
}

// ==================== Application ====================

macro_rules! length_properties {
    ($($id:ident => $field:ident),* $(,)?) => {
        impl ComputedStyle {
            fn length_mut(&mut self, id: PropertyId) -> Option<&mut Length> {
                match id {
                    $(PropertyId::$id => Some(&mut self.$field),)*
                    _ => None,
                }
            }

            fn length_of(&self, id: PropertyId) -> Option<Length> {
                match id {
                    $(PropertyId::$id => Some(self.$field),)*
                    _ => None,
                }
            }
        }
    };
}

length_properties! {
    Width => width,
    Height => height,
    MinWidth => min_width,
    MinHeight => min_height,
    MaxWidth => max_width,
    MaxHeight => max_height,
    MarginTop => margin_top,
    MarginRight => margin_right,
    MarginBottom => margin_bottom,
    MarginLeft => margin_left,
    PaddingTop => padding_top,
    PaddingRight => padding_right,
    PaddingBottom => padding_bottom,
    PaddingLeft => padding_left,
    BorderTopWidth => border_top_width,
    BorderRightWidth => border_right_width,
    BorderBottomWidth => border_bottom_width,
    BorderLeftWidth => border_left_width,
    FontSize => font_size,
}

fn mismatch(id: PropertyId, value: &SpecifiedValue) -> CssError {
    CssError::InvalidValue(format!("{value:?} is not a value of {id:?}"))
}

impl ComputedStyle {
    fn template_mut(&mut self, id: PropertyId) -> Option<&mut GridTemplate> {
        match id {
            PropertyId::GridTemplateColumns => Some(&mut self.grid_template_columns),
            PropertyId::GridTemplateRows => Some(&mut self.grid_template_rows),
            _ => None,
        }
    }

    fn grid_line_mut(&mut self, id: PropertyId) -> Option<&mut GridLine> {
        match id {
            PropertyId::GridColumnStart => Some(&mut self.grid_column_start),
            PropertyId::GridColumnEnd => Some(&mut self.grid_column_end),
            PropertyId::GridRowStart => Some(&mut self.grid_row_start),
            PropertyId::GridRowEnd => Some(&mut self.grid_row_end),
            _ => None,
        }
    }

    fn gap_mut(&mut self, id: PropertyId) -> Option<&mut Gap> {
        match id {
            PropertyId::RowGap => Some(&mut self.row_gap),
            PropertyId::ColumnGap => Some(&mut self.column_gap),
            _ => None,
        }
    }

    /// Copy one property's value from `from`.
    fn copy_property(&mut self, id: PropertyId, from: &ComputedStyle) {
        if let Some(len) = from.length_of(id) {
            if let Some(slot) = self.length_mut(id) {
                *slot = len;
            }
            return;
        }
        match id {
            PropertyId::Display => self.display = from.display,
            PropertyId::Position => self.position = from.position,
            PropertyId::RowGap => self.row_gap = from.row_gap,
            PropertyId::ColumnGap => self.column_gap = from.column_gap,
            PropertyId::GridTemplateColumns => {
                self.grid_template_columns = from.grid_template_columns.clone()
            }
            PropertyId::GridTemplateRows => {
                self.grid_template_rows = from.grid_template_rows.clone()
            }
            PropertyId::GridAutoFlow => self.grid_auto_flow = from.grid_auto_flow,
            PropertyId::GridColumnStart => self.grid_column_start = from.grid_column_start,
            PropertyId::GridColumnEnd => self.grid_column_end = from.grid_column_end,
            PropertyId::GridRowStart => self.grid_row_start = from.grid_row_start,
            PropertyId::GridRowEnd => self.grid_row_end = from.grid_row_end,
            _ => {}
        }
    }

    /// Apply one longhand.
    ///
    /// A CSS-wide keyword copies from `parent` (inherit) or from the initial
    /// style (initial). `unset` and `revert` act as inherit for inherited
    /// properties and as initial otherwise. Without a parent, inherit falls
    /// back to initial.
    pub fn apply(
        &mut self,
        id: PropertyId,
        value: &SpecifiedValue,
        parent: Option<&ComputedStyle>,
    ) -> Result<(), CssError> {
        match value {
            SpecifiedValue::CssWide(keyword) => {
                let inherit = match keyword {
                    CssWideKeyword::Inherit => true,
                    CssWideKeyword::Initial => false,
                    CssWideKeyword::Unset | CssWideKeyword::Revert => id.is_inherited(),
                };
                match parent {
                    Some(parent) if inherit => self.copy_property(id, parent),
                    _ => self.copy_property(id, &ComputedStyle::new()),
                }
            }
            SpecifiedValue::Display(display) if id == PropertyId::Display => {
                self.display = *display
            }
            SpecifiedValue::Position(position) if id == PropertyId::Position => {
                self.position = *position
            }
            SpecifiedValue::AutoFlow(flow) if id == PropertyId::GridAutoFlow => {
                self.grid_auto_flow = *flow
            }
            SpecifiedValue::Length(len) if id == PropertyId::FontSize => {
                self.font_size = match parent {
                    Some(parent) => len.relative_to_font(parent.font_size),
                    None => *len,
                }
            }
            SpecifiedValue::Length(len) => {
                *self.length_mut(id).ok_or_else(|| mismatch(id, value))? = *len
            }
            SpecifiedValue::Gap(gap) => *self.gap_mut(id).ok_or_else(|| mismatch(id, value))? = *gap,
            SpecifiedValue::TemplateNone => {
                *self.template_mut(id).ok_or_else(|| mismatch(id, value))? = GridTemplate::None
            }
            SpecifiedValue::TrackList(encoded) => {
                let list = TrackList::decode(encoded)?;
                *self.template_mut(id).ok_or_else(|| mismatch(id, value))? =
                    GridTemplate::Tracks(list)
            }
            SpecifiedValue::Line(line) => {
                *self.grid_line_mut(id).ok_or_else(|| mismatch(id, value))? = *line
            }
            _ => return Err(mismatch(id, value)),
        }
        Ok(())
    }
}
