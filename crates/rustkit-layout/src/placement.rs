//! Grid item placement.
//!
//! ## Overview
//!
//! Items are placed in three passes over document order:
//!
//! 1. Items with a definite row and column.
//! 2. Items with exactly one definite axis; the other axis is searched
//!    for the first free run of cells.
//! 3. Fully automatic items, following `grid-auto-flow` with a cursor that
//!    only moves forward (sparse) or restarts at the origin (dense).
//!
//! Explicitly placed items therefore claim their cells before any
//! auto-placed item is considered.

use std::collections::{HashMap, HashSet};

use rustkit_css::{GridAutoFlow, GridLine, GridPlacement, MAX_GRID_LINE};
use tracing::{debug, trace};

use crate::{try_vec, LayoutError};

/// Placement along one axis after resolving line numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisPlacement {
    /// Fixed start track (0-based) and span.
    Definite { start: usize, span: usize },
    /// Position chosen by auto-placement.
    Auto { span: usize },
}

impl AxisPlacement {
    pub fn span(&self) -> usize {
        match *self {
            AxisPlacement::Definite { span, .. } | AxisPlacement::Auto { span } => span,
        }
    }

    pub fn is_definite(&self) -> bool {
        matches!(self, AxisPlacement::Definite { .. })
    }

    /// Resolve a start/end line pair against `explicit_tracks` tracks.
    ///
    /// Negative lines count back from the last explicit line. A reversed
    /// pair is swapped and an empty one spans a single track. The result
    /// never reaches past [`MAX_GRID_LINE`] tracks.
    pub fn resolve(start: GridLine, end: GridLine, explicit_tracks: usize) -> AxisPlacement {
        let limit = MAX_GRID_LINE as usize;
        let line_index = |line: i32| -> usize {
            let line = line.clamp(-MAX_GRID_LINE, MAX_GRID_LINE);
            let index = if line > 0 {
                line - 1
            } else {
                explicit_tracks as i32 + 1 + line
            };
            (index.max(0) as usize).min(limit - 1)
        };
        let span_of = |line: GridLine| match line {
            GridLine::Span(n) => (n.get() as usize).min(limit),
            _ => 1,
        };

        let placement = match (start, end) {
            (GridLine::Line(s), GridLine::Line(e)) => {
                let (a, b) = (line_index(s.get()), line_index(e.get()));
                let (a, b) = if a <= b { (a, b) } else { (b, a) };
                AxisPlacement::Definite {
                    start: a,
                    span: (b - a).max(1),
                }
            }
            (GridLine::Line(s), GridLine::Auto) => AxisPlacement::Definite {
                start: line_index(s.get()),
                span: 1,
            },
            (GridLine::Line(s), GridLine::Span(n)) => AxisPlacement::Definite {
                start: line_index(s.get()),
                span: span_of(GridLine::Span(n)),
            },
            (GridLine::Span(n), GridLine::Line(e)) => {
                let end = line_index(e.get());
                let span = span_of(GridLine::Span(n));
                AxisPlacement::Definite {
                    start: end.saturating_sub(span),
                    span,
                }
            }
            (GridLine::Auto, GridLine::Line(e)) => AxisPlacement::Definite {
                start: line_index(e.get()).saturating_sub(1),
                span: 1,
            },
            (start, end) => AxisPlacement::Auto {
                span: if matches!(start, GridLine::Span(_)) {
                    span_of(start)
                } else {
                    span_of(end)
                },
            },
        };

        match placement {
            AxisPlacement::Definite { start, span } => AxisPlacement::Definite {
                start,
                span: span.min(limit - start).max(1),
            },
            auto => auto,
        }
    }
}

/// Cells assigned to one item (0-based tracks).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridArea {
    pub column: usize,
    pub row: usize,
    pub column_span: usize,
    pub row_span: usize,
}

impl GridArea {
    pub fn column_end(&self) -> usize {
        self.column + self.column_span
    }

    pub fn row_end(&self) -> usize {
        self.row + self.row_span
    }

    /// Whether the two areas share a cell.
    pub fn overlaps(&self, other: &GridArea) -> bool {
        self.column < other.column_end()
            && other.column < self.column_end()
            && self.row < other.row_end()
            && other.row < self.row_end()
    }

    fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (self.row..self.row_end())
            .flat_map(move |row| (self.column..self.column_end()).map(move |col| (col, row)))
    }
}

/// Set of occupied `(column, row)` cells.
///
/// Grows with the grid: implicit rows and columns need no reallocation
/// beyond the set itself.
#[derive(Debug, Clone, Default)]
pub struct OccupancyMap {
    cells: HashSet<(usize, usize)>,
}

impl OccupancyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_occupied(&self, column: usize, row: usize) -> bool {
        self.cells.contains(&(column, row))
    }

    /// Whether every cell of `area` is free.
    pub fn is_free(&self, area: &GridArea) -> bool {
        area.cells().all(|(col, row)| !self.is_occupied(col, row))
    }

    /// Mark every cell of `area` occupied.
    pub fn occupy(&mut self, area: &GridArea) -> Result<(), LayoutError> {
        self.cells
            .try_reserve(area.column_span * area.row_span)
            .map_err(|_| LayoutError::AllocationFailed("occupancy map"))?;
        self.cells.extend(area.cells());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Output of [`place_items`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementResult {
    /// Area of each item, indexed like the input.
    pub areas: Vec<GridArea>,
    /// Item indices in the order they were placed.
    pub order: Vec<usize>,
    /// Number of columns in use (explicit columns plus any implicit ones).
    pub column_count: usize,
    /// One past the last row occupied by any item.
    pub row_count: usize,
}

struct Placer {
    occupancy: OccupancyMap,
    areas: Vec<Option<GridArea>>,
    order: Vec<usize>,
}

impl Placer {
    fn place(&mut self, index: usize, area: GridArea) -> Result<(), LayoutError> {
        trace!(
            item = index,
            column = area.column,
            row = area.row,
            column_span = area.column_span,
            row_span = area.row_span,
            "Placed grid item"
        );
        self.occupancy.occupy(&area)?;
        self.areas[index] = Some(area);
        self.order.push(index);
        Ok(())
    }
}

/// Assign a grid area to every item.
///
/// `explicit_columns` and `explicit_rows` are the explicit track counts;
/// they bound auto-placement along the flow direction (minimum 1).
pub fn place_items(
    items: &[GridPlacement],
    explicit_columns: usize,
    explicit_rows: usize,
    flow: GridAutoFlow,
) -> Result<PlacementResult, LayoutError> {
    let mut resolved: Vec<(AxisPlacement, AxisPlacement)> =
        try_vec(items.len(), "item placements")?;
    resolved.extend(items.iter().map(|p| {
        (
            AxisPlacement::resolve(p.column_start, p.column_end, explicit_columns),
            AxisPlacement::resolve(p.row_start, p.row_end, explicit_rows),
        )
    }));

    let mut areas: Vec<Option<GridArea>> = try_vec(items.len(), "grid areas")?;
    areas.resize(items.len(), None);
    let mut placer = Placer {
        occupancy: OccupancyMap::new(),
        areas,
        order: try_vec(items.len(), "placement order")?,
    };

    // Phase 1: both axes definite.
    for (index, (column, row)) in resolved.iter().enumerate() {
        if let (
            AxisPlacement::Definite { start: col, span: cs },
            AxisPlacement::Definite { start: row, span: rs },
        ) = (*column, *row)
        {
            placer.place(
                index,
                GridArea {
                    column: col,
                    row,
                    column_span: cs,
                    row_span: rs,
                },
            )?;
        }
    }

    // Phase 2: one definite axis. Sparse packing keeps a cursor per locked
    // track so items sharing a track never move backwards.
    let mut lane_cursors: HashMap<(bool, usize), usize> = HashMap::new();
    for (index, (column, row)) in resolved.iter().enumerate() {
        let (locked_row, start, span, other_span) = match (*column, *row) {
            (AxisPlacement::Auto { span }, AxisPlacement::Definite { start, span: rs }) => {
                (true, start, span, rs)
            }
            (AxisPlacement::Definite { start, span: cs }, AxisPlacement::Auto { span }) => {
                (false, start, span, cs)
            }
            _ => continue,
        };

        let mut cursor = if flow.is_dense() {
            0
        } else {
            lane_cursors.get(&(locked_row, start)).copied().unwrap_or(0)
        };
        let area = loop {
            let candidate = if locked_row {
                GridArea {
                    column: cursor,
                    row: start,
                    column_span: span,
                    row_span: other_span,
                }
            } else {
                GridArea {
                    column: start,
                    row: cursor,
                    column_span: other_span,
                    row_span: span,
                }
            };
            if placer.occupancy.is_free(&candidate) {
                break candidate;
            }
            cursor += 1;
        };
        lane_cursors.insert((locked_row, start), cursor + span);
        placer.place(index, area)?;
    }

    // Phase 3: fully automatic items.
    let row_flow = flow.is_row();
    let bound = if row_flow {
        explicit_columns.max(1)
    } else {
        explicit_rows.max(1)
    };
    let (mut cursor_col, mut cursor_row) = (0usize, 0usize);
    for (index, (column, row)) in resolved.iter().enumerate() {
        let (AxisPlacement::Auto { span: cs }, AxisPlacement::Auto { span: rs }) = (*column, *row)
        else {
            continue;
        };
        // Spans along the flow direction cannot exceed the wrap bound.
        let (cs, rs) = if row_flow {
            (cs.min(bound), rs)
        } else {
            (cs, rs.min(bound))
        };

        if flow.is_dense() {
            cursor_col = 0;
            cursor_row = 0;
        }

        let area = loop {
            if row_flow && cursor_col + cs > bound {
                cursor_col = 0;
                cursor_row += 1;
                continue;
            }
            if !row_flow && cursor_row + rs > bound {
                cursor_row = 0;
                cursor_col += 1;
                continue;
            }
            let candidate = GridArea {
                column: cursor_col,
                row: cursor_row,
                column_span: cs,
                row_span: rs,
            };
            if placer.occupancy.is_free(&candidate) {
                break candidate;
            }
            if row_flow {
                cursor_col += 1;
            } else {
                cursor_row += 1;
            }
        };

        if row_flow {
            cursor_col = area.column_end();
        } else {
            cursor_row = area.row_end();
        }
        placer.place(index, area)?;
    }

    let mut result_areas: Vec<GridArea> = try_vec(items.len(), "grid areas")?;
    result_areas.extend(placer.areas.into_iter().map(Option::unwrap_or_default));
    let column_count = result_areas
        .iter()
        .map(GridArea::column_end)
        .fold(explicit_columns.max(1), usize::max);
    let row_count = result_areas.iter().map(GridArea::row_end).max().unwrap_or(0);

    debug!(
        items = items.len(),
        column_count,
        row_count,
        occupied = placer.occupancy.len(),
        dense = flow.is_dense(),
        "Grid placement done"
    );

    Ok(PlacementResult {
        areas: result_areas,
        order: placer.order,
        column_count,
        row_count,
    })
}
