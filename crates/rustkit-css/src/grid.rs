//! Grid value types and parsers.
//!
//! ## Overview
//!
//! Parsers in this module work on a [`TokenStream`] and are all-or-nothing:
//! on failure the cursor is back where it started, so the caller can try
//! another grammar (CSS-wide keywords, `none`) at the same position.
//!
//! - `grid-template-columns` / `grid-template-rows`: [`parse_grid_template`]
//! - `grid-column` / `grid-row` and their longhands: [`parse_grid_line_pair`],
//!   [`parse_grid_line`]
//! - `grid-auto-flow`: [`parse_grid_auto_flow`]

use std::num::{NonZeroI32, NonZeroU32};

use rustkit_cssparser::{Token, TokenStream};
use smallvec::SmallVec;
use tracing::trace;

use crate::{CssError, Length};

/// Maximum number of tracks kept from a single track list.
pub const MAX_GRID_TRACKS: usize = 32;

/// Largest grid line number honoured by placement, in either direction.
/// Resolved lines and spans are clamped so the grid never grows past this
/// many tracks per axis.
pub const MAX_GRID_LINE: i32 = 10_000;

/// Largest accepted `repeat()` count.
pub const MAX_REPEAT_COUNT: u32 = 32;

// ==================== Types ====================

/// One side of a `minmax()` track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackBreadth {
    Fixed(Length),
    Percentage(f32),
    /// Flexible share (`fr`); `auto` parses as `Flex(1.0)`.
    Flex(f32),
    MinContent,
    MaxContent,
}

impl TrackBreadth {
    /// Whether the breadth resolves without looking at content or free space.
    pub fn is_definite(&self) -> bool {
        matches!(self, TrackBreadth::Fixed(_) | TrackBreadth::Percentage(_))
    }
}

/// A single track in a grid template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackDefinition {
    Fixed(Length),
    Percentage(f32),
    Flex(f32),
    MinContent,
    MaxContent,
    MinMax(TrackBreadth, TrackBreadth),
}

impl From<TrackBreadth> for TrackDefinition {
    fn from(breadth: TrackBreadth) -> Self {
        match breadth {
            TrackBreadth::Fixed(len) => TrackDefinition::Fixed(len),
            TrackBreadth::Percentage(pct) => TrackDefinition::Percentage(pct),
            TrackBreadth::Flex(factor) => TrackDefinition::Flex(factor),
            TrackBreadth::MinContent => TrackDefinition::MinContent,
            TrackBreadth::MaxContent => TrackDefinition::MaxContent,
        }
    }
}

/// An ordered, non-empty list of tracks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackList(pub SmallVec<[TrackDefinition; 8]>);

impl TrackList {
    /// Build a track list from definitions.
    pub fn from_tracks(tracks: impl IntoIterator<Item = TrackDefinition>) -> Self {
        TrackList(tracks.into_iter().collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackDefinition> {
        self.0.iter()
    }

    /// Track for grid line index `index`, reusing the list cyclically for
    /// implicit tracks.
    pub fn cyclic(&self, index: usize) -> Option<&TrackDefinition> {
        if self.0.is_empty() {
            return None;
        }
        self.0.get(index % self.0.len())
    }
}

/// Computed value of `grid-template-columns` / `grid-template-rows`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GridTemplate {
    /// No explicit tracks.
    #[default]
    None,
    Tracks(TrackList),
}

impl GridTemplate {
    /// Explicit track list, if any.
    pub fn tracks(&self) -> Option<&TrackList> {
        match self {
            GridTemplate::None => None,
            GridTemplate::Tracks(list) => Some(list),
        }
    }

    /// Number of explicit tracks.
    pub fn track_count(&self) -> usize {
        self.tracks().map_or(0, TrackList::len)
    }
}

/// A grid line reference (`grid-column-start` etc).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridLine {
    #[default]
    Auto,
    /// Line number (1-based; negative counts from the end).
    Line(NonZeroI32),
    /// Span count.
    Span(NonZeroU32),
}

impl GridLine {
    /// Line reference; `None` for line 0.
    pub fn line(number: i32) -> Option<Self> {
        NonZeroI32::new(number).map(GridLine::Line)
    }

    /// Span reference; `None` for a zero span.
    pub fn span(count: u32) -> Option<Self> {
        NonZeroU32::new(count).map(GridLine::Span)
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, GridLine::Auto)
    }
}

/// Grid placement for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridPlacement {
    pub column_start: GridLine,
    pub column_end: GridLine,
    pub row_start: GridLine,
    pub row_end: GridLine,
}

impl GridPlacement {
    /// Placement with an explicit column and row line.
    pub fn at(column: i32, row: i32) -> Self {
        Self {
            column_start: GridLine::line(column).unwrap_or_default(),
            row_start: GridLine::line(row).unwrap_or_default(),
            ..Default::default()
        }
    }

    /// Auto placement spanning `columns` x `rows` tracks.
    pub fn spanning(columns: u32, rows: u32) -> Self {
        Self {
            column_start: GridLine::span(columns).unwrap_or_default(),
            row_start: GridLine::span(rows).unwrap_or_default(),
            ..Default::default()
        }
    }
}

/// `grid-auto-flow` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridAutoFlow {
    #[default]
    Row,
    Column,
    RowDense,
    ColumnDense,
}

impl GridAutoFlow {
    pub fn is_row(self) -> bool {
        matches!(self, GridAutoFlow::Row | GridAutoFlow::RowDense)
    }

    pub fn is_dense(self) -> bool {
        matches!(self, GridAutoFlow::RowDense | GridAutoFlow::ColumnDense)
    }

    fn with_dense(self) -> Self {
        if self.is_row() {
            GridAutoFlow::RowDense
        } else {
            GridAutoFlow::ColumnDense
        }
    }
}

/// `inherit` / `initial` / `revert` / `unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CssWideKeyword {
    Inherit,
    Initial,
    Revert,
    Unset,
}

impl CssWideKeyword {
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident.to_ascii_lowercase().as_str() {
            "inherit" => Some(CssWideKeyword::Inherit),
            "initial" => Some(CssWideKeyword::Initial),
            "revert" => Some(CssWideKeyword::Revert),
            "unset" => Some(CssWideKeyword::Unset),
            _ => None,
        }
    }
}

/// A parsed property value, or a CSS-wide keyword in its place.
#[derive(Debug, Clone, PartialEq)]
pub enum Specified<T> {
    CssWide(CssWideKeyword),
    Value(T),
}

// ==================== Shared helpers ====================

/// Consume a CSS-wide keyword, or leave the stream untouched.
pub fn parse_css_wide(stream: &mut TokenStream) -> Option<CssWideKeyword> {
    let start = stream.position();
    stream.skip_whitespace();
    let keyword = stream.next_token().and_then(|token| match token {
        Token::Ident(ident) => CssWideKeyword::from_ident(ident),
        _ => None,
    });
    if keyword.is_none() {
        stream.rewind(start);
    }
    keyword
}

fn parse_keyword(stream: &mut TokenStream, name: &str) -> bool {
    let start = stream.position();
    stream.skip_whitespace();
    if stream.next_token().is_some_and(|t| t.is_ident(name)) {
        return true;
    }
    stream.rewind(start);
    false
}

fn invalid(what: &str, token: Option<&Token>) -> CssError {
    match token {
        Some(token) => CssError::InvalidValue(format!("{what}: unexpected {token:?}")),
        None => CssError::InvalidValue(format!("{what}: unexpected end of value")),
    }
}

// ==================== Track lists ====================

/// Map a single token to a track breadth.
fn breadth_from_token(token: &Token) -> Option<TrackBreadth> {
    match token {
        Token::Ident(_) if token.is_ident("auto") => Some(TrackBreadth::Flex(1.0)),
        Token::Ident(_) if token.is_ident("min-content") => Some(TrackBreadth::MinContent),
        Token::Ident(_) if token.is_ident("max-content") => Some(TrackBreadth::MaxContent),
        Token::Dimension { value, unit, .. } if *value >= 0.0 => {
            if unit == "fr" {
                Some(TrackBreadth::Flex(*value))
            } else {
                Length::from_unit(*value, unit).map(TrackBreadth::Fixed)
            }
        }
        Token::Percentage(pct) if *pct >= 0.0 => Some(TrackBreadth::Percentage(*pct)),
        // Unitless numbers are taken as pixels.
        Token::Number { value, .. } if *value >= 0.0 => Some(TrackBreadth::Fixed(Length::Px(*value))),
        _ => None,
    }
}

fn parse_breadth(stream: &mut TokenStream) -> Option<TrackBreadth> {
    stream.skip_whitespace();
    stream.next_token().and_then(breadth_from_token)
}

/// Body of `minmax(` up to and including the closing parenthesis.
fn parse_minmax_body(stream: &mut TokenStream) -> Option<TrackDefinition> {
    let min = parse_breadth(stream)?;
    stream.skip_whitespace();
    if stream.peek() == Some(&Token::Comma) {
        stream.next_token();
    }
    let max = parse_breadth(stream)?;
    stream.skip_whitespace();
    match stream.next_token() {
        Some(Token::CloseParen) => Some(TrackDefinition::MinMax(min, max)),
        _ => None,
    }
}

/// Parse one track (`auto`, keyword, `minmax()`, or a dimension).
///
/// Rewinds and returns `None` if the next token cannot start a track.
pub fn parse_track(stream: &mut TokenStream) -> Option<TrackDefinition> {
    let start = stream.position();
    stream.skip_whitespace();
    let token = stream.next_token().cloned();
    let track = match token {
        Some(ref t) if t.is_function("minmax") => parse_minmax_body(stream),
        Some(ref t) => breadth_from_token(t).map(TrackDefinition::from),
        None => None,
    };
    if track.is_none() {
        stream.rewind(start);
    }
    track
}

/// Body of `repeat(` up to and including the closing parenthesis.
fn parse_repeat_body(stream: &mut TokenStream) -> Option<(u32, TrackDefinition)> {
    stream.skip_whitespace();
    let count = match stream.next_token() {
        Some(Token::Number {
            value,
            is_integer: true,
        }) if *value >= 1.0 && *value <= MAX_REPEAT_COUNT as f32 => *value as u32,
        _ => return None,
    };
    stream.skip_whitespace();
    if stream.next_token() != Some(&Token::Comma) {
        return None;
    }
    let track = parse_track(stream)?;
    stream.skip_whitespace();
    match stream.next_token() {
        Some(Token::CloseParen) => Some((count, track)),
        _ => None,
    }
}

fn push_track(tracks: &mut SmallVec<[TrackDefinition; 8]>, track: TrackDefinition) {
    if tracks.len() < MAX_GRID_TRACKS {
        tracks.push(track);
    }
}

/// Parse a track list.
///
/// Stops at the first token that cannot start a track. Tracks beyond
/// [`MAX_GRID_TRACKS`] are consumed but dropped. Fails (with the cursor
/// restored) if no track was parsed.
pub fn parse_track_list(stream: &mut TokenStream) -> Result<TrackList, CssError> {
    let start = stream.position();
    let mut tracks: SmallVec<[TrackDefinition; 8]> = SmallVec::new();

    loop {
        let before = stream.position();
        stream.skip_whitespace();

        if stream.peek().is_some_and(|t| t.is_function("repeat")) {
            stream.next_token();
            match parse_repeat_body(stream) {
                Some((count, track)) => {
                    trace!(count, ?track, "repeat()");
                    for _ in 0..count {
                        push_track(&mut tracks, track);
                    }
                    continue;
                }
                None => {
                    stream.rewind(before);
                    break;
                }
            }
        }

        match parse_track(stream) {
            Some(track) => push_track(&mut tracks, track),
            None => {
                stream.rewind(before);
                break;
            }
        }
    }

    if tracks.is_empty() {
        let found = stream.peek().cloned();
        stream.rewind(start);
        return Err(invalid("track list", found.as_ref()));
    }

    Ok(TrackList(tracks))
}

/// Parse a `grid-template-columns` / `grid-template-rows` value.
pub fn parse_grid_template(stream: &mut TokenStream) -> Result<Specified<GridTemplate>, CssError> {
    if let Some(keyword) = parse_css_wide(stream) {
        return Ok(Specified::CssWide(keyword));
    }
    if parse_keyword(stream, "none") {
        return Ok(Specified::Value(GridTemplate::None));
    }
    parse_track_list(stream).map(|list| Specified::Value(GridTemplate::Tracks(list)))
}

// ==================== Placement ====================

/// Parse a single grid line: `auto`, `span [<integer>]`, or `<integer>`.
pub fn parse_grid_line(stream: &mut TokenStream) -> Result<GridLine, CssError> {
    let start = stream.position();
    stream.skip_whitespace();
    let token = stream.next_token().cloned();

    let result = match token {
        Some(ref t) if t.is_ident("auto") => Ok(GridLine::Auto),
        Some(ref t) if t.is_ident("span") => {
            let after_span = stream.position();
            stream.skip_whitespace();
            match stream.peek().cloned() {
                Some(Token::Number {
                    value,
                    is_integer: true,
                }) => {
                    stream.next_token();
                    if value >= 1.0 {
                        GridLine::span(value.min(u32::MAX as f32) as u32)
                            .ok_or_else(|| CssError::InvalidValue("span must be positive".into()))
                    } else {
                        Err(CssError::InvalidValue(format!("span {value} is not positive")))
                    }
                }
                _ => {
                    stream.rewind(after_span);
                    Ok(GridLine::Span(NonZeroU32::MIN))
                }
            }
        }
        Some(Token::Number {
            value,
            is_integer: true,
        }) => GridLine::line(value as i32)
            .ok_or_else(|| CssError::InvalidValue("grid line 0 is invalid".into())),
        other => Err(invalid("grid line", other.as_ref())),
    };

    if result.is_err() {
        stream.rewind(start);
    }
    result
}

/// Parse a `grid-column` / `grid-row` value: `<line> [ / <line> ]`.
///
/// A missing end line is [`GridLine::Auto`].
pub fn parse_grid_line_pair(
    stream: &mut TokenStream,
) -> Result<Specified<(GridLine, GridLine)>, CssError> {
    if let Some(keyword) = parse_css_wide(stream) {
        return Ok(Specified::CssWide(keyword));
    }

    let start = stream.position();
    let first = parse_grid_line(stream)?;

    let before_slash = stream.position();
    stream.skip_whitespace();
    if !stream.peek().is_some_and(|t| t.is_delim('/')) {
        stream.rewind(before_slash);
        return Ok(Specified::Value((first, GridLine::Auto)));
    }
    stream.next_token();

    match parse_grid_line(stream) {
        Ok(second) => Ok(Specified::Value((first, second))),
        Err(err) => {
            stream.rewind(start);
            Err(err)
        }
    }
}

/// Parse a `grid-auto-flow` value.
pub fn parse_grid_auto_flow(stream: &mut TokenStream) -> Result<Specified<GridAutoFlow>, CssError> {
    if let Some(keyword) = parse_css_wide(stream) {
        return Ok(Specified::CssWide(keyword));
    }

    let start = stream.position();
    stream.skip_whitespace();
    let token = stream.next_token().cloned();
    let flow = match token {
        Some(ref t) if t.is_ident("row") => GridAutoFlow::Row,
        Some(ref t) if t.is_ident("column") => GridAutoFlow::Column,
        Some(ref t) if t.is_ident("dense") => return Ok(Specified::Value(GridAutoFlow::RowDense)),
        other => {
            stream.rewind(start);
            return Err(invalid("grid-auto-flow", other.as_ref()));
        }
    };

    if parse_keyword(stream, "dense") {
        Ok(Specified::Value(flow.with_dense()))
    } else {
        Ok(Specified::Value(flow))
    }
}
