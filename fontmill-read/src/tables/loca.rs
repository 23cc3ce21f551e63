//! The [loca (Index to Location)][loca] table
//!
//! [loca]: https://docs.microsoft.com/en-us/typography/opentype/spec/loca

use std::ops::Range;

use types::{BigEndian, GlyphId, Tag};

use crate::{FontData, ReadError, TopLevelTable};

/// The [loca] table.
///
/// [loca]: https://docs.microsoft.com/en-us/typography/opentype/spec/loca
#[derive(Clone, Copy, Debug)]
pub enum Loca<'a> {
    Short(&'a [BigEndian<u16>]),
    Long(&'a [BigEndian<u32>]),
}

impl TopLevelTable for Loca<'_> {
    const TAG: Tag = Tag::new(b"loca");
}

impl<'a> Loca<'a> {
    pub fn read(data: FontData<'a>, is_long: bool) -> Result<Self, ReadError> {
        Ok(if is_long {
            let len = data.len() / 4 * 4;
            Loca::Long(data.read_array(0..len)?)
        } else {
            let len = data.len() / 2 * 2;
            Loca::Short(data.read_array(0..len)?)
        })
    }

    /// The number of offsets, which is one more than the number of glyphs.
    pub fn len(&self) -> usize {
        match self {
            Loca::Short(data) => data.len(),
            Loca::Long(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attempt to return the offset for a given glyph id.
    pub fn get_raw(&self, idx: usize) -> Option<u32> {
        match self {
            Loca::Short(data) => data.get(idx).map(|x| x.get() as u32 * 2),
            Loca::Long(data) => data.get(idx).map(|x| x.get()),
        }
    }

    /// The byte range of a glyph's data in `glyf`.
    ///
    /// Returns `Ok(None)` for glyphs without outlines.
    pub fn glyph_range(&self, glyph_id: GlyphId) -> Result<Option<Range<usize>>, ReadError> {
        let idx = glyph_id.to_usize();
        let start = self.get_raw(idx).ok_or(ReadError::OutOfBounds)? as usize;
        let end = self.get_raw(idx + 1).ok_or(ReadError::OutOfBounds)? as usize;
        if start > end {
            return Err(ReadError::MalformedData("loca offsets decrease"));
        }
        Ok((start != end).then_some(start..end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fontmill_test_data::bebuffer::BeBuffer;

    #[test]
    fn short_offsets_are_doubled() {
        let buf = BeBuffer::new().extend([0u16, 10, 10, 24]);
        let loca = Loca::read(FontData::new(&buf), false).unwrap();
        assert_eq!(loca.len(), 4);
        assert_eq!(loca.glyph_range(GlyphId::new(0)), Ok(Some(0..20)));
        assert_eq!(loca.glyph_range(GlyphId::new(1)), Ok(None));
        assert_eq!(loca.glyph_range(GlyphId::new(2)), Ok(Some(20..48)));
        assert!(loca.glyph_range(GlyphId::new(3)).is_err());
    }

    #[test]
    fn long_offsets() {
        let buf = BeBuffer::new().extend([0u32, 12, 4]);
        let loca = Loca::read(FontData::new(&buf), true).unwrap();
        assert_eq!(loca.glyph_range(GlyphId::new(0)), Ok(Some(0..12)));
        assert!(loca.glyph_range(GlyphId::new(1)).is_err());
    }
}
