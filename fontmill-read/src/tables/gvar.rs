//! The [gvar (Glyph Variations)](https://learn.microsoft.com/en-us/typography/opentype/spec/gvar) table

use types::{BigEndian, F2Dot14, GlyphId, Tag};

use super::variations::TupleVariationData;
use crate::{FontData, FontRead, ReadError, TopLevelTable};

/// The [gvar](https://learn.microsoft.com/en-us/typography/opentype/spec/gvar)
/// table.
#[derive(Clone, Copy, Debug)]
pub struct Gvar<'a> {
    data: FontData<'a>,
    shared_tuples: &'a [BigEndian<F2Dot14>],
    offsets: GvarOffsets<'a>,
}

#[derive(Clone, Copy, Debug)]
enum GvarOffsets<'a> {
    Short(&'a [BigEndian<u16>]),
    Long(&'a [BigEndian<u32>]),
}

impl TopLevelTable for Gvar<'_> {
    const TAG: Tag = Tag::new(b"gvar");
}

impl<'a> FontRead<'a> for Gvar<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let major_version: u16 = cursor.read()?;
        if major_version != 1 {
            return Err(ReadError::InvalidFormat(major_version as _));
        }
        cursor.advance::<u16>();
        let axis_count: u16 = cursor.read()?;
        let shared_tuple_count: u16 = cursor.read()?;
        let shared_tuples_offset: u32 = cursor.read()?;
        let glyph_count: u16 = cursor.read()?;
        let flags: u16 = cursor.read()?;
        cursor.advance::<u32>();
        let n_offsets = glyph_count as usize + 1;
        let offsets = if flags & Self::LONG_OFFSETS != 0 {
            GvarOffsets::Long(cursor.read_array(n_offsets)?)
        } else {
            GvarOffsets::Short(cursor.read_array(n_offsets)?)
        };
        let shared_start = shared_tuples_offset as usize;
        let shared_len = shared_tuple_count as usize * axis_count as usize * 2;
        let shared_tuples = data.read_array(shared_start..shared_start + shared_len)?;
        Ok(Gvar {
            data,
            shared_tuples,
            offsets,
        })
    }
}

impl<'a> Gvar<'a> {
    /// Flag indicating that the glyph variation data offsets are 32 bit.
    pub const LONG_OFFSETS: u16 = 0x0001;

    pub fn axis_count(&self) -> u16 {
        self.data.read_at(4).unwrap_or_default()
    }

    pub fn shared_tuple_count(&self) -> u16 {
        self.data.read_at(6).unwrap_or_default()
    }

    pub fn glyph_count(&self) -> u16 {
        self.data.read_at(12).unwrap_or_default()
    }

    pub fn flags(&self) -> u16 {
        self.data.read_at(14).unwrap_or_default()
    }

    /// Offset from the start of the table to the glyph variation data array.
    pub fn glyph_variation_data_array_offset(&self) -> u32 {
        self.data.read_at(16).unwrap_or_default()
    }

    /// The shared peak tuples, flattened; each has `axis_count` values.
    pub fn shared_tuples(&self) -> &'a [BigEndian<F2Dot14>] {
        self.shared_tuples
    }

    fn data_offset(&self, idx: usize) -> Option<usize> {
        match self.offsets {
            GvarOffsets::Short(offsets) => offsets.get(idx).map(|off| off.get() as usize * 2),
            GvarOffsets::Long(offsets) => offsets.get(idx).map(|off| off.get() as usize),
        }
    }

    /// The variation data for a glyph, or `None` if the glyph has none.
    pub fn glyph_variation_data(
        &self,
        glyph_id: GlyphId,
    ) -> Result<Option<TupleVariationData<'a>>, ReadError> {
        let idx = glyph_id.to_usize();
        let (Some(start), Some(end)) = (self.data_offset(idx), self.data_offset(idx + 1)) else {
            return Err(ReadError::OutOfBounds);
        };
        if start == end {
            return Ok(None);
        }
        if end < start {
            return Err(ReadError::MalformedData("gvar offsets are not increasing"));
        }
        let base = self.glyph_variation_data_array_offset() as usize;
        let data = self
            .data
            .slice(base + start..base + end)
            .ok_or(ReadError::OutOfBounds)?;
        TupleVariationData::read(data, 0, self.axis_count(), self.shared_tuples).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fontmill_test_data::bebuffer::BeBuffer;

    #[test]
    fn glyph_variation_data() {
        // one axis, one shared tuple (1.0), two glyphs: gid 0 has no data,
        // gid 1 has a single variation over all points
        let buf = BeBuffer::new()
            .extend([1u16, 0, 1, 1])
            .push(20u32 + 3 * 2)
            .extend([2u16, 0])
            .push(20u32 + 3 * 2 + 2)
            .extend([0u16, 0, 5])
            .push(F2Dot14::ONE)
            // glyph 1
            .extend([1u16, 8])
            .extend([2u16, 0x2000])
            .extend([0u8, 0x80]);
        let gvar = Gvar::read(FontData::new(&buf)).unwrap();
        assert_eq!(gvar.axis_count(), 1);
        assert_eq!(gvar.glyph_count(), 2);
        assert_eq!(gvar.shared_tuples().len(), 1);
        assert!(gvar.glyph_variation_data(GlyphId::new(0)).unwrap().is_none());
        let data = gvar.glyph_variation_data(GlyphId::new(1)).unwrap().unwrap();
        let tuples = data.tuples().collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(tuples.len(), 1);
        assert_eq!(tuples[0].peak().get(0), Some(F2Dot14::ONE));
        assert!(tuples[0].point_numbers().is_none());
        assert!(gvar.glyph_variation_data(GlyphId::new(2)).is_err());
    }
}
