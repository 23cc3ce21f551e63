//! Simple glyphs (containing contour outlines)

use read::{tables::glyf as read_glyf, ReadError};
use types::{BoundingBox, Point};

use super::{Bbox, CurvePoint};
use crate::{error::Error, FontWrite, TableWriter};

const ON_CURVE_POINT: u8 = read_glyf::SimpleGlyphFlags::ON_CURVE_POINT;
const X_SHORT_VECTOR: u8 = read_glyf::SimpleGlyphFlags::X_SHORT_VECTOR;
const Y_SHORT_VECTOR: u8 = read_glyf::SimpleGlyphFlags::Y_SHORT_VECTOR;
const REPEAT_FLAG: u8 = read_glyf::SimpleGlyphFlags::REPEAT_FLAG;
const X_SAME_OR_POSITIVE: u8 = read_glyf::SimpleGlyphFlags::X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR;
const Y_SAME_OR_POSITIVE: u8 = read_glyf::SimpleGlyphFlags::Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR;
const OVERLAP_SIMPLE: u8 = read_glyf::SimpleGlyphFlags::OVERLAP_SIMPLE;

/// A simple (without components) glyph
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimpleGlyph {
    pub bbox: Bbox,
    contours: Vec<Contour>,
    instructions: Vec<u8>,
    overlap: bool,
}

/// A single contour, comprising only line and quadratic bezier segments
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Contour(Vec<CurvePoint>);

impl Contour {
    /// The number of points in this contour
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` if this contour is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// An iterator over the points in this contour
    pub fn iter(&self) -> impl Iterator<Item = &CurvePoint> {
        self.0.iter()
    }
}

impl From<Vec<CurvePoint>> for Contour {
    fn from(value: Vec<CurvePoint>) -> Self {
        Self(value)
    }
}

/// A delta in one coordinate, in the form it is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CoordDelta {
    // this is a repeat (set in flag) or a 0 (same as previous)
    Skip,
    Short(u8),
    Long(i16),
}

impl FontWrite for CoordDelta {
    fn write_into(&self, writer: &mut TableWriter) {
        match self {
            CoordDelta::Skip => (),
            CoordDelta::Short(val) => val.write_into(writer),
            CoordDelta::Long(val) => val.write_into(writer),
        }
    }
}

impl SimpleGlyph {
    /// Build a glyph from a flat list of points and the index of the last
    /// point of each contour, as they are stored in the font.
    ///
    /// The bounding box is computed from the points.
    pub fn from_points(
        points: &[CurvePoint],
        end_pts_of_contours: impl IntoIterator<Item = u16>,
    ) -> Result<Self, Error> {
        let mut contours = Vec::new();
        let mut start = 0;
        for end in end_pts_of_contours {
            let end = end as usize + 1;
            if end <= start || end > points.len() {
                return Err(Error::InvalidTable("contour end points out of order"));
            }
            contours.push(Contour(points[start..end].to_vec()));
            start = end;
        }
        if start != points.len() {
            return Err(Error::InvalidTable("points not covered by any contour"));
        }
        let mut glyph = SimpleGlyph {
            contours,
            ..Default::default()
        };
        glyph.recompute_bounding_box();
        Ok(glyph)
    }

    /// Convert a glyph read from a font into an owned, writable glyph.
    ///
    /// The stored bounding box is kept as is.
    pub fn from_read(glyph: &read_glyf::SimpleGlyph) -> Result<Self, ReadError> {
        let points = glyph.points()?;
        let end_pts = glyph.end_pts_of_contours().iter().map(|end| end.get());
        let mut result = Self::from_points(&points, end_pts)
            .map_err(|_| ReadError::MalformedData("bad contour end points"))?;
        result.bbox = Bbox {
            x_min: glyph.x_min(),
            y_min: glyph.y_min(),
            x_max: glyph.x_max(),
            y_max: glyph.y_max(),
        };
        result.instructions = glyph.instructions().to_vec();
        result.overlap = glyph.has_overlapping_contours();
        Ok(result)
    }

    /// Set the TrueType instructions for this glyph.
    pub fn with_instructions(mut self, instructions: impl Into<Vec<u8>>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Mark the contours of this glyph as overlapping.
    pub fn with_overlap(mut self, overlap: bool) -> Self {
        self.overlap = overlap;
        self
    }

    /// Set the bounding box to the extent of the points.
    pub fn recompute_bounding_box(&mut self) {
        self.bbox = BoundingBox::from_points(self.points().map(|pt| Point::new(pt.x, pt.y)))
            .map(Bbox::from)
            .unwrap_or_default();
    }

    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    pub fn instructions(&self) -> &[u8] {
        &self.instructions
    }

    /// All the points of the glyph, in order.
    pub fn points(&self) -> impl Iterator<Item = CurvePoint> + '_ {
        self.contours.iter().flat_map(|c| c.iter().copied())
    }

    /// Compute the flags and deltas for this glyph's points.
    ///
    /// This does not do the final binary encoding, and it also does not handle
    /// repeating flags.
    fn compute_point_deltas(&self) -> impl Iterator<Item = (u8, CoordDelta, CoordDelta)> + '_ {
        // reused for x & y by passing in the flags
        fn flag_and_delta(value: i16, short_flag: u8, same_or_pos: u8) -> (u8, CoordDelta) {
            const SHORT_MAX: i16 = u8::MAX as i16;
            const SHORT_MIN: i16 = -SHORT_MAX;
            match value {
                0 => (same_or_pos, CoordDelta::Skip),
                SHORT_MIN..=-1 => (short_flag, CoordDelta::Short(value.unsigned_abs() as u8)),
                1..=SHORT_MAX => (short_flag | same_or_pos, CoordDelta::Short(value as _)),
                _other => (0, CoordDelta::Long(value)),
            }
        }

        let (mut last_x, mut last_y) = (0i16, 0i16);
        let mut first = self.overlap;
        self.points().map(move |point| {
            let d_x = point.x.wrapping_sub(last_x);
            let d_y = point.y.wrapping_sub(last_y);
            last_x = point.x;
            last_y = point.y;

            let mut flag = 0;
            if point.on_curve {
                flag |= ON_CURVE_POINT;
            }
            if std::mem::take(&mut first) {
                flag |= OVERLAP_SIMPLE;
            }
            let (x_flag, x_data) = flag_and_delta(d_x, X_SHORT_VECTOR, X_SAME_OR_POSITIVE);
            let (y_flag, y_data) = flag_and_delta(d_y, Y_SHORT_VECTOR, Y_SAME_OR_POSITIVE);
            (flag | x_flag | y_flag, x_data, y_data)
        })
    }
}

impl FontWrite for SimpleGlyph {
    fn write_into(&self, writer: &mut TableWriter) {
        let n_contours = self.contours.len() as i16;
        if n_contours == 0 {
            // we don't bother writing empty glyphs
            return;
        }
        n_contours.write_into(writer);
        self.bbox.write_into(writer);
        // now write end points of contours:
        let mut cur = 0;
        for contour in &self.contours {
            cur += contour.len();
            (cur as u16 - 1).write_into(writer);
        }
        (self.instructions.len() as u16).write_into(writer);
        self.instructions.write_into(writer);

        let deltas = self.compute_point_deltas().collect::<Vec<_>>();
        RepeatableFlag::iter_from_flags(deltas.iter().map(|(flag, _, _)| *flag))
            .for_each(|flag| flag.write_into(writer));
        deltas.iter().for_each(|(_, x, _)| x.write_into(writer));
        deltas.iter().for_each(|(_, _, y)| y.write_into(writer));
        writer.pad_to_2byte_aligned();
    }

    fn validate(&self) -> Result<(), Error> {
        if self.contours.len() >= i16::MAX as usize {
            return Err(Error::ValueOutOfRange("number of contours"));
        }
        if self.instructions.len() >= u16::MAX as usize {
            return Err(Error::ValueOutOfRange("instructions length"));
        }
        if self.contours.iter().any(Contour::is_empty) {
            return Err(Error::InvalidTable("empty contour"));
        }
        if self.points().count() > u16::MAX as usize {
            return Err(Error::ValueOutOfRange("number of points"));
        }
        Ok(())
    }
}

/// A little helper for writing flags that may have a 'repeat' byte
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RepeatableFlag {
    flag: u8,
    repeat: u8,
}

impl FontWrite for RepeatableFlag {
    fn write_into(&self, writer: &mut TableWriter) {
        debug_assert_eq!(self.flag & REPEAT_FLAG != 0, self.repeat > 0);

        self.flag.write_into(writer);
        if self.flag & REPEAT_FLAG != 0 {
            self.repeat.write_into(writer);
        }
    }
}

impl RepeatableFlag {
    /// given an iterator over raw flags, return an iterator over flags + repeat values
    fn iter_from_flags(flags: impl IntoIterator<Item = u8>) -> impl Iterator<Item = RepeatableFlag> {
        let mut iter = flags.into_iter();
        let mut prev = None;
        // a flag that repeats exactly once costs the same either way; we
        // write it twice without the repeat bit.
        let mut decompose_single_repeat = None;

        std::iter::from_fn(move || loop {
            if let Some(repeat) = decompose_single_repeat.take() {
                return Some(repeat);
            }

            match (iter.next(), prev.take()) {
                (None, Some(RepeatableFlag { flag, repeat: 1 })) => {
                    let flag = flag & !REPEAT_FLAG;
                    decompose_single_repeat = Some(RepeatableFlag { flag, repeat: 0 });
                    return decompose_single_repeat;
                }
                (None, prev) => return prev,
                (Some(flag), None) => prev = Some(RepeatableFlag { flag, repeat: 0 }),
                (Some(flag), Some(mut last)) => {
                    if (last.flag & !REPEAT_FLAG) == flag && last.repeat < u8::MAX {
                        last.repeat += 1;
                        last.flag |= REPEAT_FLAG;
                        prev = Some(last);
                    } else {
                        // split a single repeat into two non-repeat flags
                        if last.repeat == 1 {
                            last.flag &= !REPEAT_FLAG;
                            last.repeat = 0;
                            // stash the extra flag, which we'll use at the top
                            // of the next pass of the loop
                            decompose_single_repeat = Some(last);
                        }
                        prev = Some(RepeatableFlag { flag, repeat: 0 });
                        return Some(last);
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use read::{FontData, FontRead};

    fn square() -> Vec<CurvePoint> {
        vec![
            CurvePoint::on_curve(0, 0),
            CurvePoint::on_curve(0, 500),
            CurvePoint::off_curve(400, 500),
            CurvePoint::on_curve(400, 0),
        ]
    }

    #[test]
    fn round_trip_through_reader() {
        let mut points = square();
        points.extend([
            CurvePoint::on_curve(1000, -300),
            CurvePoint::on_curve(1000, 200),
            CurvePoint::on_curve(1300, 200),
        ]);
        let glyph = SimpleGlyph::from_points(&points, [3, 6])
            .unwrap()
            .with_instructions(vec![0xb0, 0x01])
            .with_overlap(true);
        assert_eq!(
            glyph.bbox,
            Bbox {
                x_min: 0,
                y_min: -300,
                x_max: 1300,
                y_max: 500
            }
        );
        let bytes = crate::dump_table(&glyph).unwrap();
        assert_eq!(bytes.len() % 2, 0);

        let read_glyf::Glyph::Simple(read) = read_glyf::Glyph::read(FontData::new(&bytes)).unwrap()
        else {
            panic!("expected simple glyph");
        };
        assert_eq!(read.points().unwrap(), points);
        assert_eq!(read.instructions(), &[0xb0, 0x01]);
        assert!(read.has_overlapping_contours());
        assert_eq!(read.x_max(), 1300);

        let owned = SimpleGlyph::from_read(&read).unwrap();
        assert_eq!(owned, glyph);
    }

    #[test]
    fn bad_end_points() {
        assert!(SimpleGlyph::from_points(&square(), [3, 2]).is_err());
        assert!(SimpleGlyph::from_points(&square(), [2]).is_err());
        assert!(SimpleGlyph::from_points(&square(), [4]).is_err());
    }

    #[test]
    fn repeatable_flags_basic() {
        let flags = [ON_CURVE_POINT, X_SHORT_VECTOR, X_SHORT_VECTOR | Y_SHORT_VECTOR];
        let repeatable = RepeatableFlag::iter_from_flags(flags).collect::<Vec<_>>();
        let expected = flags
            .into_iter()
            .map(|flag| RepeatableFlag { flag, repeat: 0 })
            .collect::<Vec<_>>();
        assert_eq!(repeatable, expected);
    }

    #[test]
    fn repeatable_flags_repeats() {
        let some_dupes = std::iter::repeat(ON_CURVE_POINT).take(4);
        let many_dupes = std::iter::repeat(Y_SHORT_VECTOR).take(257);
        let repeatable =
            RepeatableFlag::iter_from_flags(some_dupes.chain(many_dupes)).collect::<Vec<_>>();
        assert_eq!(repeatable.len(), 3);
        assert_eq!(
            repeatable[0],
            RepeatableFlag {
                flag: ON_CURVE_POINT | REPEAT_FLAG,
                repeat: 3
            }
        );
        assert_eq!(
            repeatable[1],
            RepeatableFlag {
                flag: Y_SHORT_VECTOR | REPEAT_FLAG,
                repeat: u8::MAX,
            }
        );
        assert_eq!(
            repeatable[2],
            RepeatableFlag {
                flag: Y_SHORT_VECTOR,
                repeat: 0,
            }
        )
    }

    #[test]
    fn single_repeat_is_split() {
        let repeatable =
            RepeatableFlag::iter_from_flags([ON_CURVE_POINT, ON_CURVE_POINT, X_SHORT_VECTOR])
                .collect::<Vec<_>>();
        assert_eq!(repeatable.len(), 3);
        assert!(repeatable.iter().all(|flag| flag.repeat == 0));
    }
}
