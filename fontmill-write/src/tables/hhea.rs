//! The [hhea](https://docs.microsoft.com/en-us/typography/opentype/spec/hhea) table

use read::{tables::hhea as read_hhea, ReadError, TopLevelTable};
use types::Tag;

use crate::{error::Error, FontWrite, TableWriter};

/// The horizontal header, kept as raw bytes with the metric summary
/// fields rewritten.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hhea {
    data: Vec<u8>,
}

impl TopLevelTable for Hhea {
    const TAG: Tag = Tag::new(b"hhea");
}

impl Hhea {
    /// Copy the header of an existing font.
    pub fn from_read(hhea: &read_hhea::Hhea) -> Result<Self, ReadError> {
        let data = hhea.offset_data().as_bytes();
        if data.len() < read_hhea::Hhea::RAW_BYTE_LEN {
            return Err(ReadError::OutOfBounds);
        }
        Ok(Hhea {
            data: data.to_vec(),
        })
    }

    pub fn set_advance_width_max(&mut self, value: u16) {
        let pos = read_hhea::Hhea::ADVANCE_WIDTH_MAX_POS;
        self.data[pos..pos + 2].copy_from_slice(&value.to_be_bytes());
    }

    pub fn set_number_of_h_metrics(&mut self, value: u16) {
        let pos = read_hhea::Hhea::NUMBER_OF_H_METRICS_POS;
        self.data[pos..pos + 2].copy_from_slice(&value.to_be_bytes());
    }
}

impl FontWrite for Hhea {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write_slice(&self.data)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.data.len() < read_hhea::Hhea::RAW_BYTE_LEN {
            return Err(Error::TableTooShort {
                expected: read_hhea::Hhea::RAW_BYTE_LEN,
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
    fn rewrite_metric_summary() {
        let mut raw = vec![0u8; 36];
        raw[4..6].copy_from_slice(&800i16.to_be_bytes());
        raw[34..36].copy_from_slice(&1u16.to_be_bytes());
        let read = read_hhea::Hhea::read(FontData::new(&raw)).unwrap();
        let mut hhea = Hhea::from_read(&read).unwrap();
        hhea.set_advance_width_max(1200);
        hhea.set_number_of_h_metrics(7);
        let bytes = crate::dump_table(&hhea).unwrap();
        let read = read_hhea::Hhea::read(FontData::new(&bytes)).unwrap();
        assert_eq!(read.ascender(), 800);
        assert_eq!(read.advance_width_max(), 1200);
        assert_eq!(read.number_of_h_metrics(), 7);
    }
}
