//! the [GPOS] table
//!
//! Only the parts needed to walk pair adjustment lookups are decoded.
//!
//! [GPOS]: https://docs.microsoft.com/en-us/typography/opentype/spec/gpos

use types::{GlyphId, Tag};

use super::layout::{ClassDef, CoverageTable, FeatureList, LookupList};
use crate::{Cursor, FontData, FontRead, ReadError, TopLevelTable};

/// The [GPOS](https://docs.microsoft.com/en-us/typography/opentype/spec/gpos)
/// (Glyph Positioning) table.
#[derive(Clone, Copy, Debug)]
pub struct Gpos<'a> {
    data: FontData<'a>,
}

impl TopLevelTable for Gpos<'_> {
    const TAG: Tag = Tag::new(b"GPOS");
}

impl<'a> FontRead<'a> for Gpos<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let major_version: u16 = data.read_at(0)?;
        if major_version != 1 {
            return Err(ReadError::InvalidFormat(major_version as _));
        }
        data.check_in_bounds(10)?;
        Ok(Gpos { data })
    }
}

impl<'a> Gpos<'a> {
    /// Lookup type for pair adjustment positioning.
    pub const PAIR_ADJUSTMENT: u16 = 2;
    /// Lookup type for extension positioning.
    pub const EXTENSION: u16 = 9;

    pub fn feature_list_offset(&self) -> u16 {
        self.data.read_at(6).unwrap_or_default()
    }

    pub fn lookup_list_offset(&self) -> u16 {
        self.data.read_at(8).unwrap_or_default()
    }

    pub fn feature_list(&self) -> Result<FeatureList<'a>, ReadError> {
        match self.feature_list_offset() {
            0 => Err(ReadError::NullOffset),
            offset => self.data.read_table_at(offset as usize),
        }
    }

    pub fn lookup_list(&self) -> Result<LookupList<'a>, ReadError> {
        match self.lookup_list_offset() {
            0 => Err(ReadError::NullOffset),
            offset => self.data.read_table_at(offset as usize),
        }
    }
}

/// [ValueFormat](https://docs.microsoft.com/en-us/typography/opentype/spec/gpos#value-record)
/// flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ValueFormat(u16);

impl ValueFormat {
    pub const X_PLACEMENT: u16 = 0x0001;
    pub const Y_PLACEMENT: u16 = 0x0002;
    pub const X_ADVANCE: u16 = 0x0004;
    pub const Y_ADVANCE: u16 = 0x0008;
    pub const X_PLACEMENT_DEVICE: u16 = 0x0010;
    pub const Y_PLACEMENT_DEVICE: u16 = 0x0020;
    pub const X_ADVANCE_DEVICE: u16 = 0x0040;
    pub const Y_ADVANCE_DEVICE: u16 = 0x0080;

    pub fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn contains(self, flag: u16) -> bool {
        self.0 & flag == flag
    }

    /// Return the number of bytes required to store a [`ValueRecord`] in this format.
    pub fn record_byte_len(self) -> usize {
        (self.0 & 0x00FF).count_ones() as usize * 2
    }
}

/// A positioning value record.
///
/// Device and variation index offsets are skipped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ValueRecord {
    pub x_placement: Option<i16>,
    pub y_placement: Option<i16>,
    pub x_advance: Option<i16>,
    pub y_advance: Option<i16>,
}

impl ValueRecord {
    fn read(cursor: &mut Cursor, format: ValueFormat) -> Result<Self, ReadError> {
        let mut field = |flag: u16| -> Result<Option<i16>, ReadError> {
            format
                .contains(flag)
                .then(|| cursor.read::<i16>())
                .transpose()
        };
        let record = ValueRecord {
            x_placement: field(ValueFormat::X_PLACEMENT)?,
            y_placement: field(ValueFormat::Y_PLACEMENT)?,
            x_advance: field(ValueFormat::X_ADVANCE)?,
            y_advance: field(ValueFormat::Y_ADVANCE)?,
        };
        let device_fields = (format.bits() & 0x00F0).count_ones() as usize;
        cursor.advance_by(device_fields * 2);
        Ok(record)
    }
}

/// [Pair Adjustment Positioning Subtable](https://docs.microsoft.com/en-us/typography/opentype/spec/gpos#lookup-type-2-pair-adjustment-positioning-subtable)
#[derive(Clone, Copy, Debug)]
pub enum PairPos<'a> {
    Format1(PairPosFormat1<'a>),
    Format2(PairPosFormat2<'a>),
}

impl<'a> FontRead<'a> for PairPos<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        match format {
            1 => PairPosFormat1::read(data).map(Self::Format1),
            2 => PairPosFormat2::read(data).map(Self::Format2),
            other => Err(ReadError::InvalidFormat(other.into())),
        }
    }
}

impl<'a> PairPos<'a> {
    pub fn coverage(&self) -> Result<CoverageTable<'a>, ReadError> {
        match self {
            PairPos::Format1(table) => table.coverage(),
            PairPos::Format2(table) => table.coverage(),
        }
    }

    pub fn value_format1(&self) -> ValueFormat {
        match self {
            PairPos::Format1(table) => table.value_format1(),
            PairPos::Format2(table) => table.value_format1(),
        }
    }

    pub fn value_format2(&self) -> ValueFormat {
        match self {
            PairPos::Format1(table) => table.value_format2(),
            PairPos::Format2(table) => table.value_format2(),
        }
    }
}

fn read_coverage(data: FontData) -> Result<CoverageTable, ReadError> {
    match data.read_at::<u16>(2)? {
        0 => Err(ReadError::NullOffset),
        offset => data.read_table_at(offset as usize),
    }
}

/// Pair positioning by individual glyph pairs.
#[derive(Clone, Copy, Debug)]
pub struct PairPosFormat1<'a> {
    data: FontData<'a>,
    pair_set_offsets: &'a [types::BigEndian<u16>],
}

impl<'a> FontRead<'a> for PairPosFormat1<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        cursor.advance_by(8);
        let pair_set_count: u16 = cursor.read()?;
        let pair_set_offsets = cursor.read_array(pair_set_count as usize)?;
        Ok(PairPosFormat1 {
            data,
            pair_set_offsets,
        })
    }
}

impl<'a> PairPosFormat1<'a> {
    pub fn coverage(&self) -> Result<CoverageTable<'a>, ReadError> {
        read_coverage(self.data)
    }

    pub fn value_format1(&self) -> ValueFormat {
        ValueFormat(self.data.read_at(4).unwrap_or_default())
    }

    pub fn value_format2(&self) -> ValueFormat {
        ValueFormat(self.data.read_at(6).unwrap_or_default())
    }

    pub fn pair_set_count(&self) -> u16 {
        self.pair_set_offsets.len() as u16
    }

    /// The pair set for the glyph at `coverage_index` in the coverage table.
    pub fn pair_set(&self, coverage_index: u16) -> Result<Vec<PairValueRecord>, ReadError> {
        let offset = self
            .pair_set_offsets
            .get(coverage_index as usize)
            .ok_or(ReadError::OutOfBounds)?
            .get();
        let data = self
            .data
            .split_off(offset as usize)
            .ok_or(ReadError::OutOfBounds)?;
        let (format1, format2) = (self.value_format1(), self.value_format2());
        let mut cursor = data.cursor();
        let count: u16 = cursor.read()?;
        (0..count)
            .map(|_| {
                Ok(PairValueRecord {
                    second_glyph: cursor.read()?,
                    value_record1: ValueRecord::read(&mut cursor, format1)?,
                    value_record2: ValueRecord::read(&mut cursor, format2)?,
                })
            })
            .collect()
    }

    /// Iterate over every `(first glyph, pair value record)` in the subtable.
    pub fn pairs(
        &self,
    ) -> Result<impl Iterator<Item = Result<(GlyphId, PairValueRecord), ReadError>> + 'a, ReadError>
    {
        let coverage = self.coverage()?;
        let this = *self;
        Ok(coverage.iter().enumerate().flat_map(move |(idx, first)| {
            let (records, err) = match this.pair_set(idx as u16) {
                Ok(records) => (records, None),
                Err(e) => (Vec::new(), Some(Err(e))),
            };
            records
                .into_iter()
                .map(move |rec| Ok((first, rec)))
                .chain(err)
        }))
    }
}

/// Part of [PairPosFormat1]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PairValueRecord {
    pub second_glyph: GlyphId,
    pub value_record1: ValueRecord,
    pub value_record2: ValueRecord,
}

/// Pair positioning by glyph classes.
#[derive(Clone, Copy, Debug)]
pub struct PairPosFormat2<'a> {
    data: FontData<'a>,
}

impl<'a> FontRead<'a> for PairPosFormat2<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let table = PairPosFormat2 { data };
        let record_len = table.value_format1().record_byte_len()
            + table.value_format2().record_byte_len();
        let len = table.class1_count() as usize * table.class2_count() as usize * record_len;
        data.check_in_bounds(Self::HEADER_LEN + len)?;
        Ok(table)
    }
}

impl<'a> PairPosFormat2<'a> {
    const HEADER_LEN: usize = 16;

    pub fn coverage(&self) -> Result<CoverageTable<'a>, ReadError> {
        read_coverage(self.data)
    }

    pub fn value_format1(&self) -> ValueFormat {
        ValueFormat(self.data.read_at(4).unwrap_or_default())
    }

    pub fn value_format2(&self) -> ValueFormat {
        ValueFormat(self.data.read_at(6).unwrap_or_default())
    }

    fn class_def_at(&self, pos: usize) -> Result<ClassDef<'a>, ReadError> {
        match self.data.read_at::<u16>(pos)? {
            0 => Err(ReadError::NullOffset),
            offset => self.data.read_table_at(offset as usize),
        }
    }

    /// Classes for the first glyph of a pair.
    pub fn class_def1(&self) -> Result<ClassDef<'a>, ReadError> {
        self.class_def_at(8)
    }

    /// Classes for the second glyph of a pair.
    pub fn class_def2(&self) -> Result<ClassDef<'a>, ReadError> {
        self.class_def_at(10)
    }

    pub fn class1_count(&self) -> u16 {
        self.data.read_at(12).unwrap_or_default()
    }

    pub fn class2_count(&self) -> u16 {
        self.data.read_at(14).unwrap_or_default()
    }

    /// The pair of value records for a class pair.
    pub fn values(&self, class1: u16, class2: u16) -> Result<(ValueRecord, ValueRecord), ReadError> {
        if class1 >= self.class1_count() || class2 >= self.class2_count() {
            return Err(ReadError::OutOfBounds);
        }
        let (format1, format2) = (self.value_format1(), self.value_format2());
        let record_len = format1.record_byte_len() + format2.record_byte_len();
        let index = class1 as usize * self.class2_count() as usize + class2 as usize;
        let mut cursor = self.data.cursor();
        cursor.advance_by(Self::HEADER_LEN + index * record_len);
        Ok((
            ValueRecord::read(&mut cursor, format1)?,
            ValueRecord::read(&mut cursor, format2)?,
        ))
    }
}

/// [Extension Positioning](https://docs.microsoft.com/en-us/typography/opentype/spec/gpos#lookuptype-9-extension-positioning)
#[derive(Clone, Copy, Debug)]
pub struct ExtensionPosFormat1<'a> {
    data: FontData<'a>,
}

impl<'a> FontRead<'a> for ExtensionPosFormat1<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format.into()));
        }
        data.check_in_bounds(8)?;
        Ok(ExtensionPosFormat1 { data })
    }
}

impl<'a> ExtensionPosFormat1<'a> {
    /// The lookup type of the wrapped subtable.
    pub fn extension_lookup_type(&self) -> u16 {
        self.data.read_at(2).unwrap_or_default()
    }

    pub fn extension_offset(&self) -> u32 {
        self.data.read_at(4).unwrap_or_default()
    }

    /// The data of the wrapped subtable.
    pub fn extension(&self) -> Result<FontData<'a>, ReadError> {
        self.data
            .split_off(self.extension_offset() as usize)
            .ok_or(ReadError::OutOfBounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fontmill_test_data::bebuffer::BeBuffer;
    use pretty_assertions::assert_eq;

    #[test]
    fn pair_pos_format1() {
        // coverage [1, 2]; glyph 1 kerns with 3, glyph 2 with 3 and 4
        let buf = BeBuffer::new()
            .extend([1u16, 14, 4, 0, 2, 22, 28])
            // coverage
            .extend([1u16, 2, 1, 2])
            // pair set for glyph 1
            .extend([1u16, 3])
            .push(-80i16)
            // pair set for glyph 2
            .extend([2u16, 3])
            .push(-20i16)
            .push(4u16)
            .push(15i16);
        let PairPos::Format1(table) = PairPos::read(FontData::new(&buf)).unwrap() else {
            panic!("expected format 1");
        };
        assert_eq!(table.value_format1(), ValueFormat::from_bits(ValueFormat::X_ADVANCE));
        let pairs = table
            .pairs()
            .unwrap()
            .map(|pair| {
                let (first, rec) = pair.unwrap();
                (first.to_u16(), rec.second_glyph.to_u16(), rec.value_record1.x_advance)
            })
            .collect::<Vec<_>>();
        assert_eq!(
            pairs,
            vec![(1, 3, Some(-80)), (2, 3, Some(-20)), (2, 4, Some(15))]
        );
    }

    #[test]
    fn pair_pos_format2() {
        // two first classes, two second classes, value format 5
        let buf = BeBuffer::new()
            .extend([2u16, 32, 5, 0, 40, 48, 2, 2])
            .extend([0i16, 0, 0, -40, 0, 0, 7, 12])
            .extend([1u16, 2, 1, 2])
            .extend([1u16, 2, 1, 1])
            .extend([1u16, 3, 1, 1]);
        let PairPos::Format2(table) = PairPos::read(FontData::new(&buf)).unwrap() else {
            panic!("expected format 2");
        };
        assert_eq!(table.class1_count(), 2);
        let class1 = table.class_def1().unwrap();
        let class2 = table.class_def2().unwrap();
        assert_eq!(class1.get(GlyphId::new(2)), 1);
        assert_eq!(class2.get(GlyphId::new(3)), 1);
        let (value, _) = table.values(0, 1).unwrap();
        assert_eq!(value.x_placement, Some(0));
        assert_eq!(value.x_advance, Some(-40));
        let (value, _) = table.values(1, 1).unwrap();
        assert_eq!(value.x_advance, Some(12));
        assert!(table.values(2, 0).is_err());
        assert_eq!(
            table.coverage().unwrap().iter().collect::<Vec<_>>(),
            vec![GlyphId::new(1), GlyphId::new(2)]
        );
    }

    #[test]
    fn extension() {
        let buf = BeBuffer::new()
            .extend([1u16, 2])
            .push(8u32)
            .extend([2u16, 0]);
        let ext = ExtensionPosFormat1::read(FontData::new(&buf)).unwrap();
        assert_eq!(ext.extension_lookup_type(), 2);
        assert_eq!(ext.extension().unwrap().read_at::<u16>(0), Ok(2));
    }

    #[test]
    fn value_record_skips_devices() {
        let format = ValueFormat::from_bits(ValueFormat::X_ADVANCE | ValueFormat::X_ADVANCE_DEVICE);
        assert_eq!(format.record_byte_len(), 4);
        let buf = BeBuffer::new().extend([-5i16, 0, 9]);
        let data = FontData::new(&buf);
        let mut cursor = data.cursor();
        let record = ValueRecord::read(&mut cursor, format).unwrap();
        assert_eq!(record.x_advance, Some(-5));
        assert_eq!(cursor.read::<i16>(), Ok(9));
    }
}
