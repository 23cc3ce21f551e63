//! The [head](https://docs.microsoft.com/en-us/typography/opentype/spec/head) table

use read::{tables::head as read_head, ReadError, TopLevelTable};
use types::Tag;

use super::{glyf::Bbox, loca::LocaFormat};
use crate::{error::Error, FontWrite, TableWriter};

/// The font header, kept as raw bytes with a few fields rewritten.
///
/// Only the fields that change when glyphs are rebuilt are exposed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Head {
    data: Vec<u8>,
}

impl TopLevelTable for Head {
    const TAG: Tag = Tag::new(b"head");
}

impl Head {
    /// Copy the header of an existing font.
    pub fn from_read(head: &read_head::Head) -> Result<Self, ReadError> {
        let data = head.offset_data().as_bytes();
        if data.len() < read_head::Head::RAW_BYTE_LEN {
            return Err(ReadError::OutOfBounds);
        }
        Ok(Head {
            data: data.to_vec(),
        })
    }

    fn set_i16(&mut self, pos: usize, value: i16) {
        self.data[pos..pos + 2].copy_from_slice(&value.to_be_bytes());
    }

    /// Set the font-wide bounding box.
    pub fn set_bbox(&mut self, bbox: Bbox) {
        let pos = read_head::Head::BBOX_POS;
        self.set_i16(pos, bbox.x_min);
        self.set_i16(pos + 2, bbox.y_min);
        self.set_i16(pos + 4, bbox.x_max);
        self.set_i16(pos + 6, bbox.y_max);
    }

    pub fn set_index_to_loc_format(&mut self, format: LocaFormat) {
        self.set_i16(read_head::Head::INDEX_TO_LOC_FORMAT_POS, format as i16);
    }

    /// Zero the checksum adjustment; [`FontBuilder`](crate::FontBuilder)
    /// fills it in when the font is assembled.
    pub fn clear_checksum_adjustment(&mut self) {
        let pos = read_head::Head::CHECKSUM_ADJUSTMENT_POS;
        self.data[pos..pos + 4].fill(0);
    }
}

impl FontWrite for Head {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write_slice(&self.data)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.data.len() < read_head::Head::RAW_BYTE_LEN {
            return Err(Error::TableTooShort {
                expected: read_head::Head::RAW_BYTE_LEN,
                found: self.data.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use read::{FontData, FontRead};

    #[test]
    fn rewrite_fields() {
        let mut raw = vec![0u8; 54];
        raw[8..12].copy_from_slice(&[1, 2, 3, 4]);
        raw[18..20].copy_from_slice(&1000u16.to_be_bytes());
        let read = read_head::Head::read(FontData::new(&raw)).unwrap();
        let mut head = Head::from_read(&read).unwrap();
        head.set_bbox(Bbox {
            x_min: -10,
            y_min: -200,
            x_max: 900,
            y_max: 800,
        });
        head.set_index_to_loc_format(LocaFormat::Long);
        head.clear_checksum_adjustment();

        let bytes = crate::dump_table(&head).unwrap();
        let read = read_head::Head::read(FontData::new(&bytes)).unwrap();
        assert_eq!(read.units_per_em(), 1000);
        assert_eq!(read.x_min(), -10);
        assert_eq!(read.y_max(), 800);
        assert_eq!(read.index_to_loc_format(), 1);
        assert_eq!(read.checksum_adjustment(), 0);
    }
}
