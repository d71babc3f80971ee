//! Column track sizing.
//!
//! Fixed and percentage tracks take their size first; the space left after
//! gaps is shared among flexible tracks in whole pixels per share. Content
//! keywords (`min-content`, `max-content`) count as one flexible share.
//! Truncation loss from the per-share division is not redistributed.

use rustkit_css::{GridTemplate, TrackBreadth, TrackDefinition, UnitContext};
use tracing::{debug, trace};

use crate::dimensions::length_to_px;
use crate::{try_filled, LayoutError};

/// How a single track takes space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrackSize {
    Definite(i32),
    Shares(i32),
}

fn breadth_size(breadth: &TrackBreadth, available: i32, font_size: f32, ctx: &UnitContext) -> Option<i32> {
    match breadth {
        TrackBreadth::Fixed(len) => Some(length_to_px(*len, ctx, font_size, available)),
        TrackBreadth::Percentage(pct) => Some((pct * available as f32 / 100.0) as i32),
        _ => None,
    }
}

fn classify(
    track: Option<&TrackDefinition>,
    available: i32,
    font_size: f32,
    ctx: &UnitContext,
) -> TrackSize {
    match track {
        // No template: every column is one share.
        None => TrackSize::Shares(1),
        Some(TrackDefinition::Fixed(len)) => {
            TrackSize::Definite(length_to_px(*len, ctx, font_size, available))
        }
        Some(TrackDefinition::Percentage(pct)) => {
            TrackSize::Definite((pct * available as f32 / 100.0) as i32)
        }
        Some(TrackDefinition::Flex(factor)) => TrackSize::Shares(factor.max(0.0) as i32),
        Some(TrackDefinition::MinContent) | Some(TrackDefinition::MaxContent) => {
            TrackSize::Shares(1)
        }
        Some(TrackDefinition::MinMax(_, max)) => match breadth_size(max, available, font_size, ctx) {
            Some(px) => TrackSize::Definite(px),
            None => TrackSize::Shares(1),
        },
    }
}

/// Resolve `column_count` column widths against `available` device pixels.
///
/// Tracks beyond the explicit list reuse it cyclically.
pub fn resolve_column_widths(
    template: &GridTemplate,
    column_count: usize,
    available: i32,
    gap: i32,
    font_size: f32,
    ctx: &UnitContext,
) -> Result<Vec<i32>, LayoutError> {
    let mut widths = try_filled(column_count, 0, "column widths")?;
    let mut shares = try_filled(column_count, 0, "column shares")?;

    let tracks = template.tracks();
    let mut used: i32 = 0;
    let mut total_shares: i32 = 0;
    for (i, (width, share)) in widths.iter_mut().zip(shares.iter_mut()).enumerate() {
        let track = tracks.and_then(|list| list.cyclic(i));
        match classify(track, available, font_size, ctx) {
            TrackSize::Definite(px) => {
                *width = px;
                used = used.saturating_add(px);
            }
            TrackSize::Shares(n) => {
                *share = n;
                total_shares = total_shares.saturating_add(n);
            }
        }
        trace!(column = i, ?track, width = *width, shares = *share, "Classified track");
    }

    let gap_count = i32::try_from(column_count.saturating_sub(1)).unwrap_or(i32::MAX);
    let total_gap = gap_count.saturating_mul(gap);
    let remaining = available.saturating_sub(used).saturating_sub(total_gap).max(0);
    if total_shares > 0 {
        let per_share = remaining / total_shares;
        for (width, share) in widths.iter_mut().zip(&shares) {
            if *share > 0 {
                *width = share * per_share;
            }
        }
    }

    debug!(
        column_count,
        available,
        used,
        remaining,
        total_shares,
        ?widths,
        "Resolved column widths"
    );
    Ok(widths)
}

/// Minimum row heights from `grid-template-rows`: fixed tracks give their
/// size, everything else 0. Implicit rows past the template start at 0.
pub fn resolve_row_minimums(
    template: &GridTemplate,
    row_count: usize,
    font_size: f32,
    ctx: &UnitContext,
) -> Result<Vec<i32>, LayoutError> {
    let mut rows = try_filled(row_count, 0, "row heights")?;
    if let Some(list) = template.tracks() {
        for (i, row) in rows.iter_mut().enumerate() {
            if let Some(TrackDefinition::Fixed(len)) = list.0.get(i) {
                *row = length_to_px(*len, ctx, font_size, 0);
            }
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustkit_css::{Length, TrackList};

    fn template(tracks: &[TrackDefinition]) -> GridTemplate {
        GridTemplate::Tracks(TrackList::from_tracks(tracks.iter().copied()))
    }

    fn resolve(tracks: &[TrackDefinition], columns: usize, available: i32, gap: i32) -> Vec<i32> {
        resolve_column_widths(
            &template(tracks),
            columns,
            available,
            gap,
            16.0,
            &UnitContext::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_equal_fr_columns() {
        let fr = TrackDefinition::Flex(1.0);
        assert_eq!(resolve(&[fr, fr, fr], 3, 300, 0), vec![100, 100, 100]);
    }

    #[test]
    fn test_flex_proportional() {
        let widths = resolve(
            &[TrackDefinition::Flex(1.0), TrackDefinition::Flex(3.0)],
            2,
            400,
            0,
        );
        assert_eq!(widths, vec![100, 300]);
    }

    #[test]
    fn test_fixed_percentage_and_flex() {
        let widths = resolve(
            &[
                TrackDefinition::Fixed(Length::Px(60.0)),
                TrackDefinition::Percentage(25.0),
                TrackDefinition::Flex(1.0),
            ],
            3,
            400,
            10,
        );
        // 400 - 60 - 100 - 2 * 10 = 220 for the flexible column
        assert_eq!(widths, vec![60, 100, 220]);
    }

    #[test]
    fn test_content_keywords_are_one_share() {
        let widths = resolve(
            &[
                TrackDefinition::MinContent,
                TrackDefinition::MaxContent,
                TrackDefinition::Flex(2.0),
            ],
            3,
            400,
            0,
        );
        assert_eq!(widths, vec![100, 100, 200]);
    }

    #[test]
    fn test_minmax() {
        let widths = resolve(
            &[
                TrackDefinition::MinMax(TrackBreadth::Flex(1.0), TrackBreadth::Fixed(Length::Px(80.0))),
                TrackDefinition::MinMax(TrackBreadth::Fixed(Length::Px(500.0)), TrackBreadth::Flex(1.0)),
                TrackDefinition::MinMax(TrackBreadth::MinContent, TrackBreadth::Percentage(10.0)),
            ],
            3,
            300,
            0,
        );
        assert_eq!(widths, vec![80, 190, 30]);
    }

    #[test]
    fn test_rounding_loss_not_redistributed() {
        let fr = TrackDefinition::Flex(1.0);
        let widths = resolve(&[fr, fr, fr], 3, 100, 0);
        assert_eq!(widths, vec![33, 33, 33]);
    }

    #[test]
    fn test_zero_flex_total_leaves_zero() {
        let widths = resolve(
            &[TrackDefinition::Fixed(Length::Px(50.0)), TrackDefinition::Flex(0.0)],
            2,
            300,
            0,
        );
        assert_eq!(widths, vec![50, 0]);
    }

    #[test]
    fn test_overcommitted_fixed_tracks() {
        let px = TrackDefinition::Fixed(Length::Px(200.0));
        let widths = resolve(&[px, px, TrackDefinition::Flex(1.0)], 3, 300, 0);
        assert_eq!(widths, vec![200, 200, 0]);
    }

    #[test]
    fn test_implicit_columns_cycle() {
        let widths = resolve(
            &[TrackDefinition::Fixed(Length::Px(60.0)), TrackDefinition::Flex(1.0)],
            4,
            300,
            0,
        );
        // Two flexible columns share 300 - 120
        assert_eq!(widths, vec![60, 90, 60, 90]);
    }

    #[test]
    fn test_no_template() {
        let widths =
            resolve_column_widths(&GridTemplate::None, 4, 200, 0, 16.0, &UnitContext::new())
                .unwrap();
        assert_eq!(widths, vec![50, 50, 50, 50]);
    }

    #[test]
    fn test_hidpi_fixed_tracks() {
        let ctx = UnitContext::new().with_dpi(192.0);
        let widths = resolve_column_widths(
            &template(&[TrackDefinition::Fixed(Length::Px(60.0))]),
            1,
            400,
            0,
            16.0,
            &ctx,
        )
        .unwrap();
        assert_eq!(widths, vec![120]);
    }

    #[test]
    fn test_sum_never_exceeds_available() {
        let cases: &[(&[TrackDefinition], usize, i32, i32)] = &[
            (&[TrackDefinition::Flex(1.0)], 7, 1000, 3),
            (&[TrackDefinition::Flex(1.0), TrackDefinition::Fixed(Length::Px(20.0))], 5, 487, 11),
            (&[TrackDefinition::Percentage(10.0), TrackDefinition::Flex(1.0)], 6, 999, 1),
            (&[TrackDefinition::Fixed(Length::Px(13.0)), TrackDefinition::Flex(3.0)], 9, 641, 4),
        ];
        for (tracks, columns, available, gap) in cases {
            let widths = resolve(tracks, *columns, *available, *gap);
            let total: i32 = widths.iter().sum::<i32>() + (*columns as i32 - 1) * gap;
            assert!(total <= *available, "{total} > {available}");
            assert!(*available - total < *columns as i32, "deficit too large: {widths:?}");
        }
    }

    #[test]
    fn test_row_minimums() {
        let rows = resolve_row_minimums(
            &template(&[TrackDefinition::Fixed(Length::Px(50.0)), TrackDefinition::Flex(1.0)]),
            3,
            16.0,
            &UnitContext::new(),
        )
        .unwrap();
        assert_eq!(rows, vec![50, 0, 0]);
    }

    #[test]
    fn test_huge_fixed_tracks_saturate() {
        let px = TrackDefinition::Fixed(Length::Px(1_000_000_000.0));
        let widths = resolve(&[px, TrackDefinition::Flex(1.0)], 6, 300, 10);
        let big = widths[0];
        assert!(big >= 999_000_000);
        assert_eq!(widths, vec![big, 0, big, 0, big, 0]);
    }

    #[test]
    fn test_column_allocation_failure() {
        let ctx = UnitContext::new();
        let err = resolve_column_widths(&GridTemplate::None, usize::MAX, 100, 0, 16.0, &ctx)
            .unwrap_err();
        assert_eq!(err, LayoutError::AllocationFailed("column widths"));
    }
}
