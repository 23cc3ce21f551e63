//! The [loca (Index to Location)][loca] table
//!
//! [loca]: https://docs.microsoft.com/en-us/typography/opentype/spec/loca

use read::TopLevelTable;
use types::Tag;

use crate::{FontWrite, TableWriter};

/// The [loca] table.
///
/// Offsets are always written as 32-bit values.
///
/// [loca]: https://docs.microsoft.com/en-us/typography/opentype/spec/loca
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Loca {
    offsets: Vec<u32>,
}

/// Whether or not the 'loca' table uses short or long offsets.
///
/// This flag is stored in the `head` table's `indexToLocFormat` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LocaFormat {
    Short = 0,
    Long = 1,
}

impl TopLevelTable for Loca {
    const TAG: Tag = Tag::new(b"loca");
}

impl Loca {
    /// Create a new loca table from 32-bit offsets.
    pub fn new(offsets: Vec<u32>) -> Self {
        Loca { offsets }
    }

    pub fn format(&self) -> LocaFormat {
        LocaFormat::Long
    }

    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }
}

impl FontWrite for Loca {
    fn write_into(&self, writer: &mut TableWriter) {
        self.offsets.write_into(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_long() {
        let loca = Loca::new(vec![0, 12, 12, 40]);
        assert_eq!(loca.format(), LocaFormat::Long);
        let bytes = crate::dump_table(&loca).unwrap();
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[4..8], &[0, 0, 0, 12]);
    }
}
