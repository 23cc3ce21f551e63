//! The [hhea](https://docs.microsoft.com/en-us/typography/opentype/spec/hhea) table

use types::Tag;

use crate::{FontData, FontRead, ReadError, TopLevelTable};

/// The [hhea](https://docs.microsoft.com/en-us/typography/opentype/spec/hhea)
/// (horizontal header) table.
#[derive(Clone, Copy, Debug)]
pub struct Hhea<'a> {
    data: FontData<'a>,
}

impl TopLevelTable for Hhea<'_> {
    const TAG: Tag = Tag::new(b"hhea");
}

impl<'a> Hhea<'a> {
    pub const RAW_BYTE_LEN: usize = 36;
    /// Byte position of the `advanceWidthMax` field.
    pub const ADVANCE_WIDTH_MAX_POS: usize = 10;
    /// Byte position of the `numberOfHMetrics` field.
    pub const NUMBER_OF_H_METRICS_POS: usize = 34;

    /// Typographic ascent.
    pub fn ascender(&self) -> i16 {
        self.data.read_at(4).unwrap_or_default()
    }

    /// Typographic descent.
    pub fn descender(&self) -> i16 {
        self.data.read_at(6).unwrap_or_default()
    }

    pub fn line_gap(&self) -> i16 {
        self.data.read_at(8).unwrap_or_default()
    }

    /// Maximum advance width value in 'hmtx' table.
    pub fn advance_width_max(&self) -> u16 {
        self.data
            .read_at(Self::ADVANCE_WIDTH_MAX_POS)
            .unwrap_or_default()
    }

    /// Number of hMetric entries in 'hmtx' table
    pub fn number_of_h_metrics(&self) -> u16 {
        self.data
            .read_at(Self::NUMBER_OF_H_METRICS_POS)
            .unwrap_or_default()
    }

    pub fn offset_data(&self) -> FontData<'a> {
        self.data
    }
}

impl<'a> FontRead<'a> for Hhea<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        data.check_in_bounds(Self::RAW_BYTE_LEN)?;
        Ok(Hhea { data })
    }
}
