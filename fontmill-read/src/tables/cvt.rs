//! The [cvt (Control Value Table)](https://learn.microsoft.com/en-us/typography/opentype/spec/cvt) table

use types::{BigEndian, Tag};

use crate::{FontData, FontRead, ReadError, TopLevelTable};

/// The control value table: a flat list of FWORD values referenced by
/// hinting instructions.
#[derive(Clone, Copy, Debug)]
pub struct Cvt<'a> {
    values: &'a [BigEndian<i16>],
}

impl TopLevelTable for Cvt<'_> {
    const TAG: Tag = Tag::new(b"cvt ");
}

impl<'a> Cvt<'a> {
    pub fn values(&self) -> &'a [BigEndian<i16>] {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<'a> FontRead<'a> for Cvt<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let len = data.len() / 2 * 2;
        Ok(Cvt {
            values: data.read_array(0..len)?,
        })
    }
}
