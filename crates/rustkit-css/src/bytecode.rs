//! Flat numeric encoding of track lists.
//!
//! Track lists travel from declaration parsing to style computation as a
//! `Vec<i32>`:
//!
//! ```text
//! [count, value0, unit0, value1, unit1, ...]
//! ```
//!
//! Values are 22.10 fixed point. A `minmax()` track is a zero value tagged
//! [`Unit::MinMax`] followed by two more `(value, unit)` pairs for its sides.

use crate::grid::{TrackBreadth, TrackDefinition, TrackList, MAX_GRID_TRACKS};
use crate::{CssError, Length};

/// 22.10 fixed-point number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Fixed(pub i32);

impl Fixed {
    pub const FRAC_BITS: u32 = 10;
    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(1 << Self::FRAC_BITS);

    /// Convert from float, truncating toward zero.
    pub fn from_f32(value: f32) -> Self {
        Fixed((value * (1 << Self::FRAC_BITS) as f32) as i32)
    }

    pub fn to_f32(self) -> f32 {
        self.0 as f32 / (1 << Self::FRAC_BITS) as f32
    }

    /// Integer part (floor).
    pub fn to_int(self) -> i32 {
        self.0 >> Self::FRAC_BITS
    }
}

/// Unit tags used in the encoded stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Unit {
    Px = 0,
    Ex = 1,
    Em = 2,
    In = 3,
    Cm = 4,
    Mm = 5,
    Pt = 6,
    Pc = 7,
    Pct = 8,
    Rem = 9,
    Vw = 10,
    Vh = 11,
    Vmin = 12,
    Vmax = 13,
    Fr = 14,
    MinContent = 15,
    MaxContent = 16,
    MinMax = 17,
}

impl Unit {
    pub fn from_tag(tag: i32) -> Option<Unit> {
        let unit = match tag {
            0 => Unit::Px,
            1 => Unit::Ex,
            2 => Unit::Em,
            3 => Unit::In,
            4 => Unit::Cm,
            5 => Unit::Mm,
            6 => Unit::Pt,
            7 => Unit::Pc,
            8 => Unit::Pct,
            9 => Unit::Rem,
            10 => Unit::Vw,
            11 => Unit::Vh,
            12 => Unit::Vmin,
            13 => Unit::Vmax,
            14 => Unit::Fr,
            15 => Unit::MinContent,
            16 => Unit::MaxContent,
            17 => Unit::MinMax,
            _ => return None,
        };
        Some(unit)
    }
}

fn encode_length(length: Length) -> (Fixed, Unit) {
    match length {
        Length::Px(v) => (Fixed::from_f32(v), Unit::Px),
        Length::Em(v) => (Fixed::from_f32(v), Unit::Em),
        Length::Ex(v) => (Fixed::from_f32(v), Unit::Ex),
        Length::Rem(v) => (Fixed::from_f32(v), Unit::Rem),
        Length::In(v) => (Fixed::from_f32(v), Unit::In),
        Length::Cm(v) => (Fixed::from_f32(v), Unit::Cm),
        Length::Mm(v) => (Fixed::from_f32(v), Unit::Mm),
        Length::Pt(v) => (Fixed::from_f32(v), Unit::Pt),
        Length::Pc(v) => (Fixed::from_f32(v), Unit::Pc),
        Length::Percent(v) => (Fixed::from_f32(v), Unit::Pct),
        Length::Vw(v) => (Fixed::from_f32(v), Unit::Vw),
        Length::Vh(v) => (Fixed::from_f32(v), Unit::Vh),
        Length::Vmin(v) => (Fixed::from_f32(v), Unit::Vmin),
        Length::Vmax(v) => (Fixed::from_f32(v), Unit::Vmax),
        // An `auto` track is one flexible share.
        Length::Auto => (Fixed::ONE, Unit::Fr),
        Length::Zero => (Fixed::ZERO, Unit::Px),
    }
}

fn encode_breadth(breadth: TrackBreadth) -> (Fixed, Unit) {
    match breadth {
        TrackBreadth::Fixed(len) => encode_length(len),
        TrackBreadth::Percentage(pct) => (Fixed::from_f32(pct), Unit::Pct),
        TrackBreadth::Flex(factor) => (Fixed::from_f32(factor), Unit::Fr),
        TrackBreadth::MinContent => (Fixed::ZERO, Unit::MinContent),
        TrackBreadth::MaxContent => (Fixed::ZERO, Unit::MaxContent),
    }
}

fn decode_breadth(value: Fixed, unit: Unit) -> Result<TrackBreadth, CssError> {
    let v = value.to_f32();
    let breadth = match unit {
        Unit::Px => TrackBreadth::Fixed(Length::Px(v)),
        Unit::Ex => TrackBreadth::Fixed(Length::Ex(v)),
        Unit::Em => TrackBreadth::Fixed(Length::Em(v)),
        Unit::In => TrackBreadth::Fixed(Length::In(v)),
        Unit::Cm => TrackBreadth::Fixed(Length::Cm(v)),
        Unit::Mm => TrackBreadth::Fixed(Length::Mm(v)),
        Unit::Pt => TrackBreadth::Fixed(Length::Pt(v)),
        Unit::Pc => TrackBreadth::Fixed(Length::Pc(v)),
        Unit::Rem => TrackBreadth::Fixed(Length::Rem(v)),
        Unit::Vw => TrackBreadth::Fixed(Length::Vw(v)),
        Unit::Vh => TrackBreadth::Fixed(Length::Vh(v)),
        Unit::Vmin => TrackBreadth::Fixed(Length::Vmin(v)),
        Unit::Vmax => TrackBreadth::Fixed(Length::Vmax(v)),
        Unit::Pct => TrackBreadth::Percentage(v),
        Unit::Fr => TrackBreadth::Flex(v),
        Unit::MinContent => TrackBreadth::MinContent,
        Unit::MaxContent => TrackBreadth::MaxContent,
        Unit::MinMax => {
            return Err(CssError::InvalidValue("nested minmax in track stream".into()))
        }
    };
    Ok(breadth)
}

struct Reader<'a> {
    data: &'a [i32],
    pos: usize,
}

impl Reader<'_> {
    fn word(&mut self) -> Result<i32, CssError> {
        let word = self.data.get(self.pos).copied().ok_or_else(|| {
            CssError::InvalidValue(format!("track stream truncated at word {}", self.pos))
        })?;
        self.pos += 1;
        Ok(word)
    }

    fn pair(&mut self) -> Result<(Fixed, Unit), CssError> {
        let value = Fixed(self.word()?);
        let tag = self.word()?;
        let unit = Unit::from_tag(tag)
            .ok_or_else(|| CssError::InvalidValue(format!("unknown unit tag {tag}")))?;
        Ok((value, unit))
    }
}

impl TrackList {
    /// Serialize into the flat stream format.
    pub fn encode(&self) -> Vec<i32> {
        let mut out = Vec::with_capacity(1 + self.len() * 2);
        out.push(self.len() as i32);
        let mut push = |(value, unit): (Fixed, Unit)| {
            out.push(value.0);
            out.push(unit as i32);
        };
        for track in self.iter() {
            match *track {
                TrackDefinition::MinMax(min, max) => {
                    push((Fixed::ZERO, Unit::MinMax));
                    push(encode_breadth(min));
                    push(encode_breadth(max));
                }
                TrackDefinition::Fixed(len) => push(encode_length(len)),
                TrackDefinition::Percentage(pct) => push((Fixed::from_f32(pct), Unit::Pct)),
                TrackDefinition::Flex(factor) => push((Fixed::from_f32(factor), Unit::Fr)),
                TrackDefinition::MinContent => push((Fixed::ZERO, Unit::MinContent)),
                TrackDefinition::MaxContent => push((Fixed::ZERO, Unit::MaxContent)),
            }
        }
        out
    }

    /// Deserialize a stream produced by [`TrackList::encode`].
    pub fn decode(data: &[i32]) -> Result<TrackList, CssError> {
        let mut reader = Reader { data, pos: 0 };
        let count = reader.word()?;
        if count < 1 || count as usize > MAX_GRID_TRACKS {
            return Err(CssError::InvalidValue(format!("bad track count {count}")));
        }

        let mut tracks = TrackList::default();
        for _ in 0..count {
            let (value, unit) = reader.pair()?;
            let track = if unit == Unit::MinMax {
                if value != Fixed::ZERO {
                    return Err(CssError::InvalidValue("minmax marker must be zero".into()));
                }
                let (min_value, min_unit) = reader.pair()?;
                let (max_value, max_unit) = reader.pair()?;
                TrackDefinition::MinMax(
                    decode_breadth(min_value, min_unit)?,
                    decode_breadth(max_value, max_unit)?,
                )
            } else {
                decode_breadth(value, unit)?.into()
            };
            tracks.0.push(track);
        }

        if reader.pos != data.len() {
            return Err(CssError::InvalidValue(format!(
                "{} trailing words in track stream",
                data.len() - reader.pos
            )));
        }
        Ok(tracks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_point() {
        assert_eq!(Fixed::from_f32(1.5).0, 1536);
        assert_eq!(Fixed::from_f32(1.5).to_int(), 1);
        assert_eq!(Fixed::from_f32(-0.5).to_int(), -1);
        assert_eq!(Fixed::ONE.to_f32(), 1.0);
    }

    #[test]
    fn test_encode_layout() {
        let list = TrackList::from_tracks([
            TrackDefinition::Fixed(Length::Px(60.0)),
            TrackDefinition::MinMax(TrackBreadth::Percentage(10.0), TrackBreadth::Flex(2.0)),
        ]);
        assert_eq!(
            list.encode(),
            vec![
                2,
                60 << 10,
                Unit::Px as i32,
                0,
                Unit::MinMax as i32,
                10 << 10,
                Unit::Pct as i32,
                2 << 10,
                Unit::Fr as i32,
            ]
        );
    }

    #[test]
    fn test_decode_mixed_list() {
        let list = TrackList::from_tracks([
            TrackDefinition::Fixed(Length::Em(2.5)),
            TrackDefinition::Flex(1.0),
            TrackDefinition::MinContent,
            TrackDefinition::MinMax(TrackBreadth::MaxContent, TrackBreadth::Fixed(Length::Px(80.0))),
        ]);
        assert_eq!(TrackList::decode(&list.encode()), Ok(list));
    }

    #[test]
    fn test_decode_rejects_truncated() {
        assert!(TrackList::decode(&[]).is_err());
        assert!(TrackList::decode(&[2, 1024, Unit::Px as i32]).is_err());
        assert!(TrackList::decode(&[1, 0, Unit::MinMax as i32, 0, Unit::Px as i32]).is_err());
    }

    #[test]
    fn test_decode_rejects_bad_tags() {
        assert!(TrackList::decode(&[1, 1024, 99]).is_err());
        // Nested minmax
        assert!(TrackList::decode(&[
            1,
            0,
            Unit::MinMax as i32,
            0,
            Unit::MinMax as i32,
            0,
            Unit::Px as i32
        ])
        .is_err());
        // Non-zero minmax marker
        assert!(TrackList::decode(&[
            1,
            5,
            Unit::MinMax as i32,
            0,
            Unit::Px as i32,
            0,
            Unit::Px as i32
        ])
        .is_err());
    }

    #[test]
    fn test_decode_rejects_bad_count_and_trailing() {
        assert!(TrackList::decode(&[0]).is_err());
        assert!(TrackList::decode(&[33]).is_err());
        assert!(TrackList::decode(&[1, 1024, Unit::Fr as i32, 7]).is_err());
    }
}
