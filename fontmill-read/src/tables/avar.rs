//! The [Axis Variations](https://docs.microsoft.com/en-us/typography/opentype/spec/avar) table

use types::{BigEndian, F2Dot14, FixedSize, Tag};

use crate::{FontData, FontRead, ReadError, TopLevelTable};

/// The [avar](https://docs.microsoft.com/en-us/typography/opentype/spec/avar)
/// table.
#[derive(Clone, Debug)]
pub struct Avar<'a> {
    data: FontData<'a>,
    axis_segment_maps: Vec<SegmentMaps<'a>>,
}

impl TopLevelTable for Avar<'_> {
    const TAG: Tag = Tag::new(b"avar");
}

impl<'a> FontRead<'a> for Avar<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let major_version: u16 = cursor.read()?;
        if major_version != 1 && major_version != 2 {
            return Err(ReadError::InvalidFormat(major_version as _));
        }
        cursor.advance::<u16>();
        cursor.advance::<u16>();
        let axis_count: u16 = cursor.read()?;
        let axis_segment_maps = (0..axis_count)
            .map(|_| {
                let position_map_count: u16 = cursor.read()?;
                let axis_value_maps = cursor.read_array(position_map_count as usize)?;
                Ok(SegmentMaps { axis_value_maps })
            })
            .collect::<Result<_, ReadError>>()?;
        Ok(Avar {
            data,
            axis_segment_maps,
        })
    }
}

impl<'a> Avar<'a> {
    pub fn axis_count(&self) -> u16 {
        self.data.read_at(6).unwrap_or_default()
    }

    /// The segment maps, one per axis in `fvar` order.
    pub fn axis_segment_maps(&self) -> &[SegmentMaps<'a>] {
        &self.axis_segment_maps
    }
}

/// The piecewise-linear mapping for a single axis.
#[derive(Clone, Copy, Debug)]
pub struct SegmentMaps<'a> {
    axis_value_maps: &'a [AxisValueMap],
}

impl<'a> SegmentMaps<'a> {
    pub fn axis_value_maps(&self) -> &'a [AxisValueMap] {
        self.axis_value_maps
    }

    /// Applies the piecewise linear mapping to a normalized coordinate.
    ///
    /// Coordinates outside the mapped range are shifted by the delta of
    /// the nearest end of the map.
    pub fn apply(&self, coord: f64) -> f64 {
        let maps = self.axis_value_maps;
        let (Some(first), Some(last)) = (maps.first(), maps.last()) else {
            return coord;
        };
        if let Some(exact) = maps.iter().find(|m| m.from_coordinate() == coord) {
            return exact.to_coordinate();
        }
        if coord < first.from_coordinate() {
            return coord + first.to_coordinate() - first.from_coordinate();
        }
        if coord > last.from_coordinate() {
            return coord + last.to_coordinate() - last.from_coordinate();
        }
        // the map is sorted by `from`, so the segment is bracketed by the
        // first entry greater than `coord` and the one before it
        let idx = maps
            .iter()
            .position(|m| m.from_coordinate() > coord)
            .unwrap_or(maps.len() - 1)
            .max(1);
        let (a, b) = (&maps[idx - 1], &maps[idx]);
        let (from_a, from_b) = (a.from_coordinate(), b.from_coordinate());
        if from_a == from_b {
            return a.to_coordinate();
        }
        a.to_coordinate()
            + (b.to_coordinate() - a.to_coordinate()) * (coord - from_a) / (from_b - from_a)
    }

    /// `true` if the map is sorted and contains the required
    /// `-1 -> -1`, `0 -> 0` and `1 -> 1` entries.
    pub fn is_well_formed(&self) -> bool {
        let maps = self.axis_value_maps;
        if maps.is_empty() {
            return true;
        }
        let sorted = maps
            .windows(2)
            .all(|pair| pair[0].from_coordinate() <= pair[1].from_coordinate());
        let has = |v: f64| {
            maps.iter()
                .any(|m| m.from_coordinate() == v && m.to_coordinate() == v)
        };
        sorted && has(-1.0) && has(0.0) && has(1.0)
    }
}

/// A single `from -> to` coordinate pair.
#[derive(Clone, Copy, Debug, bytemuck::AnyBitPattern)]
#[repr(C, packed)]
pub struct AxisValueMap {
    pub from_coordinate: BigEndian<F2Dot14>,
    pub to_coordinate: BigEndian<F2Dot14>,
}

impl FixedSize for AxisValueMap {
    const RAW_BYTE_LEN: usize = 4;
}

impl AxisValueMap {
    pub fn from_coordinate(&self) -> f64 {
        self.from_coordinate.get().to_f64()
    }

    pub fn to_coordinate(&self) -> f64 {
        self.to_coordinate.get().to_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fontmill_test_data::bebuffer::BeBuffer;
    use rstest::rstest;

    fn f2dot14(v: f64) -> F2Dot14 {
        F2Dot14::from_f64(v)
    }

    fn avar() -> BeBuffer {
        // one axis with 0.5 mapped to 0.8, a second with an empty map
        BeBuffer::new()
            .extend([1u16, 0, 0, 2])
            .push(4u16)
            .extend([-1.0, -1.0, 0.0, 0.0, 0.5, 0.8, 1.0, 1.0].map(f2dot14))
            .push(0u16)
    }

    #[rstest]
    #[case(-1.0, -1.0)]
    #[case(-0.5, -0.5)]
    #[case(0.0, 0.0)]
    #[case(0.25, 0.4)]
    #[case(0.5, 0.8)]
    #[case(0.75, 0.9)]
    #[case(1.0, 1.0)]
    fn apply_segment_map(#[case] coord: f64, #[case] expected: f64) {
        let buf = avar();
        let avar = Avar::read(FontData::new(&buf)).unwrap();
        let maps = &avar.axis_segment_maps()[0];
        assert!(maps.is_well_formed());
        assert!((maps.apply(coord) - expected).abs() < 1e-3);
    }

    #[test]
    fn empty_map_is_identity() {
        let buf = avar();
        let avar = Avar::read(FontData::new(&buf)).unwrap();
        assert_eq!(avar.axis_count(), 2);
        let maps = &avar.axis_segment_maps()[1];
        assert_eq!(maps.apply(0.3), 0.3);
    }

    #[test]
    fn unsorted_map_is_malformed() {
        let buf = BeBuffer::new()
            .extend([1u16, 0, 0, 1])
            .push(3u16)
            .extend([0.0, 0.0, -1.0, -1.0, 1.0, 1.0].map(f2dot14));
        let avar = Avar::read(FontData::new(&buf)).unwrap();
        assert!(!avar.axis_segment_maps()[0].is_well_formed());
    }
}
