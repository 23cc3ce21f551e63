//! The [hmtx (Horizontal Metrics)](https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx) table

use types::{BigEndian, FixedSize, GlyphId, Tag};

use crate::{FontData, ReadError, TopLevelTable};

/// A paired advance width and left side bearing.
#[derive(Clone, Copy, Debug, bytemuck::AnyBitPattern)]
#[repr(C, packed)]
pub struct LongMetric {
    pub advance: BigEndian<u16>,
    pub side_bearing: BigEndian<i16>,
}

impl LongMetric {
    pub fn advance(&self) -> u16 {
        self.advance.get()
    }

    pub fn side_bearing(&self) -> i16 {
        self.side_bearing.get()
    }
}

impl FixedSize for LongMetric {
    const RAW_BYTE_LEN: usize = 4;
}

/// The [hmtx](https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx) table.
#[derive(Clone, Copy, Debug)]
pub struct Hmtx<'a> {
    h_metrics: &'a [LongMetric],
    left_side_bearings: &'a [BigEndian<i16>],
}

impl TopLevelTable for Hmtx<'_> {
    const TAG: Tag = Tag::new(b"hmtx");
}

impl<'a> Hmtx<'a> {
    /// Read the table; its shape depends on `hhea` and `maxp`.
    pub fn read(
        data: FontData<'a>,
        number_of_h_metrics: u16,
        num_glyphs: u16,
    ) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let h_metrics = cursor.read_array(number_of_h_metrics as usize)?;
        let n_bearings = num_glyphs.saturating_sub(number_of_h_metrics);
        let left_side_bearings = cursor.read_array(n_bearings as usize)?;
        Ok(Hmtx {
            h_metrics,
            left_side_bearings,
        })
    }

    pub fn h_metrics(&self) -> &'a [LongMetric] {
        self.h_metrics
    }

    pub fn left_side_bearings(&self) -> &'a [BigEndian<i16>] {
        self.left_side_bearings
    }

    /// The advance width for `glyph_id`.
    ///
    /// Glyphs past the end of the long metrics share the last advance.
    pub fn advance(&self, glyph_id: GlyphId) -> Option<u16> {
        self.h_metrics
            .get(glyph_id.to_usize())
            .or_else(|| self.h_metrics.last())
            .map(LongMetric::advance)
    }

    /// The left side bearing for `glyph_id`.
    pub fn side_bearing(&self, glyph_id: GlyphId) -> Option<i16> {
        let idx = glyph_id.to_usize();
        match self.h_metrics.get(idx) {
            Some(metric) => Some(metric.side_bearing()),
            None => self
                .left_side_bearings
                .get(idx - self.h_metrics.len())
                .map(BigEndian::get),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fontmill_test_data::bebuffer::BeBuffer;

    #[test]
    fn trailing_bearings_share_last_advance() {
        let buf = BeBuffer::new()
            .extend([500u16])
            .extend([10i16])
            .extend([600u16])
            .extend([-5i16])
            .extend([7i16, 8]);
        let hmtx = Hmtx::read(FontData::new(&buf), 2, 4).unwrap();
        assert_eq!(hmtx.advance(GlyphId::new(0)), Some(500));
        assert_eq!(hmtx.advance(GlyphId::new(3)), Some(600));
        assert_eq!(hmtx.side_bearing(GlyphId::new(1)), Some(-5));
        assert_eq!(hmtx.side_bearing(GlyphId::new(3)), Some(8));
        assert_eq!(hmtx.side_bearing(GlyphId::new(4)), None);
    }
}
