//! The [cvt (Control Value Table)](https://learn.microsoft.com/en-us/typography/opentype/spec/cvt) table

use read::TopLevelTable;
use types::Tag;

use crate::{FontWrite, TableWriter};

/// The control value table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cvt {
    pub values: Vec<i16>,
}

impl TopLevelTable for Cvt {
    const TAG: Tag = Tag::new(b"cvt ");
}

impl Cvt {
    pub fn new(values: Vec<i16>) -> Self {
        Self { values }
    }

    /// Copy the values of a table read from a font.
    pub fn from_read(cvt: &read::tables::cvt::Cvt) -> Self {
        Self::new(cvt.values().iter().map(|value| value.get()).collect())
    }
}

impl FontWrite for Cvt {
    fn write_into(&self, writer: &mut TableWriter) {
        self.values.write_into(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use read::{FontData, FontRead};

    #[test]
    fn round_trip() {
        let cvt = Cvt::new(vec![0, -12, 700, i16::MIN]);
        let bytes = crate::dump_table(&cvt).unwrap();
        assert_eq!(bytes.len(), 8);
        let read = read::tables::cvt::Cvt::read(FontData::new(&bytes)).unwrap();
        assert_eq!(Cvt::from_read(&read), cvt);
    }
}
