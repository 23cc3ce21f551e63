//! The [head](https://docs.microsoft.com/en-us/typography/opentype/spec/head) table

use types::{Fixed, Tag};

use crate::{FontData, FontRead, ReadError, TopLevelTable};

/// The [head](https://docs.microsoft.com/en-us/typography/opentype/spec/head)
/// (font header) table.
#[derive(Clone, Copy, Debug)]
pub struct Head<'a> {
    data: FontData<'a>,
}

impl TopLevelTable for Head<'_> {
    const TAG: Tag = Tag::new(b"head");
}

impl<'a> Head<'a> {
    /// The length of the table, which has no variable parts.
    pub const RAW_BYTE_LEN: usize = 54;
    /// Byte position of the `checkSumAdjustment` field.
    pub const CHECKSUM_ADJUSTMENT_POS: usize = 8;
    /// Byte position of the `xMin` field; the bounding box follows it.
    pub const BBOX_POS: usize = 36;
    /// Byte position of the `indexToLocFormat` field.
    pub const INDEX_TO_LOC_FORMAT_POS: usize = 50;

    pub fn font_revision(&self) -> Fixed {
        self.data.read_at(4).unwrap_or_default()
    }

    pub fn checksum_adjustment(&self) -> u32 {
        self.data.read_at(Self::CHECKSUM_ADJUSTMENT_POS).unwrap_or_default()
    }

    pub fn magic_number(&self) -> u32 {
        self.data.read_at(12).unwrap_or_default()
    }

    pub fn units_per_em(&self) -> u16 {
        self.data.read_at(18).unwrap_or_default()
    }

    pub fn x_min(&self) -> i16 {
        self.data.read_at(Self::BBOX_POS).unwrap_or_default()
    }

    pub fn y_min(&self) -> i16 {
        self.data.read_at(Self::BBOX_POS + 2).unwrap_or_default()
    }

    pub fn x_max(&self) -> i16 {
        self.data.read_at(Self::BBOX_POS + 4).unwrap_or_default()
    }

    pub fn y_max(&self) -> i16 {
        self.data.read_at(Self::BBOX_POS + 6).unwrap_or_default()
    }

    /// 0 for short offsets (Offset16), 1 for long (Offset32).
    pub fn index_to_loc_format(&self) -> i16 {
        self.data
            .read_at(Self::INDEX_TO_LOC_FORMAT_POS)
            .unwrap_or_default()
    }

    pub fn offset_data(&self) -> FontData<'a> {
        self.data
    }
}

impl<'a> FontRead<'a> for Head<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        data.check_in_bounds(Self::RAW_BYTE_LEN)?;
        let head = Head { data };
        if head.magic_number() != 0x5F0F3CF5 {
            return Err(ReadError::MalformedData("bad head magic number"));
        }
        Ok(head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fontmill_test_data::bebuffer::BeBuffer;

    #[test]
    fn read_fields() {
        let buf = BeBuffer::new()
            .push(0x0001_0000u32)
            .push(0x0002_0000u32)
            .push(0u32)
            .push(0x5F0F3CF5u32)
            .push(0u16)
            .push(1000u16)
            .extend([0u32; 4])
            .extend([-10i16, -200, 600, 800])
            .extend([0u16; 3])
            .push(1i16)
            .push(0i16);
        let head = Head::read(FontData::new(&buf)).unwrap();
        assert_eq!(head.units_per_em(), 1000);
        assert_eq!(head.font_revision(), Fixed::from_f64(2.0));
        assert_eq!(
            (head.x_min(), head.y_min(), head.x_max(), head.y_max()),
            (-10, -200, 600, 800)
        );
        assert_eq!(head.index_to_loc_format(), 1);
    }

    #[test]
    fn too_short() {
        let buf = BeBuffer::new().extend([0u8; 20]);
        assert!(Head::read(FontData::new(&buf)).is_err());
    }
}
