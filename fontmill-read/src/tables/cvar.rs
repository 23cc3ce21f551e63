//! The [cvar (CVT Variations)](https://learn.microsoft.com/en-us/typography/opentype/spec/cvar) table

use types::Tag;

use super::variations::TupleVariationData;
use crate::{FontData, FontRead, ReadError, TopLevelTable};

/// The [cvar](https://learn.microsoft.com/en-us/typography/opentype/spec/cvar)
/// table.
#[derive(Clone, Copy, Debug)]
pub struct Cvar<'a> {
    data: FontData<'a>,
}

impl TopLevelTable for Cvar<'_> {
    const TAG: Tag = Tag::new(b"cvar");
}

impl<'a> FontRead<'a> for Cvar<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let major_version: u16 = data.read_at(0)?;
        if major_version != 1 {
            return Err(ReadError::InvalidFormat(major_version as _));
        }
        data.check_in_bounds(Self::HEADER_LEN)?;
        Ok(Cvar { data })
    }
}

impl<'a> Cvar<'a> {
    const HEADER_LEN: usize = 8;

    /// The tuple variations for the control value table.
    ///
    /// `cvar` does not record its axis count, so it must come from `fvar`.
    pub fn variation_data(&self, axis_count: u16) -> Result<TupleVariationData<'a>, ReadError> {
        TupleVariationData::read(self.data, 4, axis_count, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::variations::TupleIndex;
    use fontmill_test_data::bebuffer::BeBuffer;
    use types::F2Dot14;

    #[test]
    fn read_cvt_deltas() {
        let buf = BeBuffer::new()
            .extend([1u16, 0, 1, 14])
            .push(7u16)
            .push(TupleIndex::EMBEDDED_PEAK_TUPLE | TupleIndex::PRIVATE_POINT_NUMBERS)
            .push(F2Dot14::ONE)
            // points 0 and 3, then deltas 10 and -4
            .extend([2u8, 1, 0, 3])
            .extend([1u8, 10, 0xFC]);
        let cvar = Cvar::read(FontData::new(&buf)).unwrap();
        let data = cvar.variation_data(1).unwrap();
        let tuple = data.tuples().next().unwrap().unwrap();
        assert_eq!(tuple.peak().get(0), Some(F2Dot14::ONE));
        assert_eq!(tuple.point_numbers().unwrap().collect::<Vec<_>>(), vec![0, 3]);
        assert_eq!(tuple.deltas().collect::<Vec<_>>(), vec![10, -4]);
    }
}
