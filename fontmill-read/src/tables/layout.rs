//! [OpenType Layout Common Table Formats](https://docs.microsoft.com/en-us/typography/opentype/spec/chapter2)

use types::{BigEndian, FixedSize, GlyphId, Tag};

use crate::{FontData, FontRead, ReadError};

/// [Coverage Table](https://docs.microsoft.com/en-us/typography/opentype/spec/chapter2#coverage-table)
#[derive(Clone, Copy, Debug)]
pub enum CoverageTable<'a> {
    Format1(&'a [BigEndian<GlyphId>]),
    Format2(&'a [RangeRecord]),
}

impl<'a> FontRead<'a> for CoverageTable<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        let count: u16 = cursor.read()?;
        match format {
            1 => cursor.read_array(count as usize).map(Self::Format1),
            2 => cursor.read_array(count as usize).map(Self::Format2),
            other => Err(ReadError::InvalidFormat(other.into())),
        }
    }
}

impl<'a> CoverageTable<'a> {
    /// Iterate over the covered glyphs, in coverage index order.
    pub fn iter(&self) -> impl Iterator<Item = GlyphId> + 'a {
        // all one expression so that we have a single return type
        let (iter1, iter2) = match *self {
            CoverageTable::Format1(glyphs) => (Some(glyphs.iter().map(|g| g.get())), None),
            CoverageTable::Format2(records) => {
                let iter = records.iter().flat_map(RangeRecord::iter);
                (None, Some(iter))
            }
        };

        iter1
            .into_iter()
            .flatten()
            .chain(iter2.into_iter().flatten())
    }

    /// The coverage index of `glyph`, if it is covered.
    pub fn get(&self, glyph: GlyphId) -> Option<u16> {
        match self {
            CoverageTable::Format1(glyphs) => glyphs
                .binary_search_by(|probe| probe.get().cmp(&glyph))
                .ok()
                .map(|idx| idx as u16),
            CoverageTable::Format2(records) => records
                .iter()
                .find(|rec| (rec.start_glyph_id()..=rec.end_glyph_id()).contains(&glyph))
                .map(|rec| {
                    rec.start_coverage_index() + glyph.to_u16() - rec.start_glyph_id().to_u16()
                }),
        }
    }
}

/// Used in [CoverageTable] format 2.
#[derive(Clone, Copy, Debug, bytemuck::AnyBitPattern)]
#[repr(C, packed)]
pub struct RangeRecord {
    pub start_glyph_id: BigEndian<GlyphId>,
    pub end_glyph_id: BigEndian<GlyphId>,
    pub start_coverage_index: BigEndian<u16>,
}

impl FixedSize for RangeRecord {
    const RAW_BYTE_LEN: usize = 6;
}

impl RangeRecord {
    pub fn start_glyph_id(&self) -> GlyphId {
        self.start_glyph_id.get()
    }

    pub fn end_glyph_id(&self) -> GlyphId {
        self.end_glyph_id.get()
    }

    pub fn start_coverage_index(&self) -> u16 {
        self.start_coverage_index.get()
    }

    fn iter(&self) -> impl Iterator<Item = GlyphId> {
        (self.start_glyph_id().to_u16()..=self.end_glyph_id().to_u16()).map(GlyphId::new)
    }
}

/// [Class Definition Table](https://docs.microsoft.com/en-us/typography/opentype/spec/chapter2#class-definition-table)
#[derive(Clone, Copy, Debug)]
pub enum ClassDef<'a> {
    Format1 {
        start_glyph_id: GlyphId,
        class_value_array: &'a [BigEndian<u16>],
    },
    Format2(&'a [ClassRangeRecord]),
}

impl<'a> FontRead<'a> for ClassDef<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        match format {
            1 => {
                let start_glyph_id = cursor.read()?;
                let count: u16 = cursor.read()?;
                Ok(ClassDef::Format1 {
                    start_glyph_id,
                    class_value_array: cursor.read_array(count as usize)?,
                })
            }
            2 => {
                let count: u16 = cursor.read()?;
                cursor.read_array(count as usize).map(ClassDef::Format2)
            }
            other => Err(ReadError::InvalidFormat(other.into())),
        }
    }
}

impl<'a> ClassDef<'a> {
    /// The class of `glyph`; glyphs not listed are in class 0.
    pub fn get(&self, glyph: GlyphId) -> u16 {
        match self {
            ClassDef::Format1 {
                start_glyph_id,
                class_value_array,
            } => glyph
                .to_u16()
                .checked_sub(start_glyph_id.to_u16())
                .and_then(|idx| class_value_array.get(idx as usize))
                .map(|class| class.get())
                .unwrap_or(0),
            ClassDef::Format2(records) => records
                .iter()
                .find(|rec| (rec.start_glyph_id()..=rec.end_glyph_id()).contains(&glyph))
                .map(|rec| rec.class())
                .unwrap_or(0),
        }
    }

    /// Iterate over every explicitly assigned `(glyph, class)` pair.
    ///
    /// Entries assigning class 0 are skipped.
    pub fn iter(&self) -> impl Iterator<Item = (GlyphId, u16)> + 'a {
        let (iter1, iter2) = match *self {
            ClassDef::Format1 {
                start_glyph_id,
                class_value_array,
            } => {
                let iter = class_value_array
                    .iter()
                    .enumerate()
                    .map(move |(i, class)| {
                        let gid = start_glyph_id.to_u16().saturating_add(i as u16);
                        (GlyphId::new(gid), class.get())
                    });
                (Some(iter), None)
            }
            ClassDef::Format2(records) => {
                let iter = records.iter().flat_map(|rec| {
                    let class = rec.class();
                    (rec.start_glyph_id().to_u16()..=rec.end_glyph_id().to_u16())
                        .map(move |gid| (GlyphId::new(gid), class))
                });
                (None, Some(iter))
            }
        };
        iter1
            .into_iter()
            .flatten()
            .chain(iter2.into_iter().flatten())
            .filter(|(_, class)| *class != 0)
    }
}

/// Used in [ClassDef] format 2.
#[derive(Clone, Copy, Debug, bytemuck::AnyBitPattern)]
#[repr(C, packed)]
pub struct ClassRangeRecord {
    pub start_glyph_id: BigEndian<GlyphId>,
    pub end_glyph_id: BigEndian<GlyphId>,
    pub class: BigEndian<u16>,
}

impl FixedSize for ClassRangeRecord {
    const RAW_BYTE_LEN: usize = 6;
}

impl ClassRangeRecord {
    pub fn start_glyph_id(&self) -> GlyphId {
        self.start_glyph_id.get()
    }

    pub fn end_glyph_id(&self) -> GlyphId {
        self.end_glyph_id.get()
    }

    pub fn class(&self) -> u16 {
        self.class.get()
    }
}

/// [Feature List Table](https://docs.microsoft.com/en-us/typography/opentype/spec/chapter2#feature-list-table)
#[derive(Clone, Copy, Debug)]
pub struct FeatureList<'a> {
    data: FontData<'a>,
    feature_records: &'a [FeatureRecord],
}

impl<'a> FontRead<'a> for FeatureList<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let count: u16 = cursor.read()?;
        let feature_records = cursor.read_array(count as usize)?;
        Ok(FeatureList {
            data,
            feature_records,
        })
    }
}

impl<'a> FeatureList<'a> {
    pub fn feature_records(&self) -> &'a [FeatureRecord] {
        self.feature_records
    }

    /// Resolve the feature table for a record of this list.
    pub fn feature(&self, record: &FeatureRecord) -> Result<Feature<'a>, ReadError> {
        self.data.read_table_at(record.feature_offset() as usize)
    }
}

/// Part of [FeatureList]
#[derive(Clone, Copy, Debug, bytemuck::AnyBitPattern)]
#[repr(C, packed)]
pub struct FeatureRecord {
    pub feature_tag: BigEndian<Tag>,
    pub feature_offset: BigEndian<u16>,
}

impl FixedSize for FeatureRecord {
    const RAW_BYTE_LEN: usize = 6;
}

impl FeatureRecord {
    pub fn feature_tag(&self) -> Tag {
        self.feature_tag.get()
    }

    /// Offset to the feature table, from the start of the feature list.
    pub fn feature_offset(&self) -> u16 {
        self.feature_offset.get()
    }
}

/// [Feature Table](https://docs.microsoft.com/en-us/typography/opentype/spec/chapter2#feature-table)
#[derive(Clone, Copy, Debug)]
pub struct Feature<'a> {
    lookup_list_indices: &'a [BigEndian<u16>],
}

impl<'a> FontRead<'a> for Feature<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        cursor.advance::<u16>();
        let count: u16 = cursor.read()?;
        let lookup_list_indices = cursor.read_array(count as usize)?;
        Ok(Feature {
            lookup_list_indices,
        })
    }
}

impl<'a> Feature<'a> {
    pub fn lookup_list_indices(&self) -> &'a [BigEndian<u16>] {
        self.lookup_list_indices
    }
}

/// [Lookup List Table](https://docs.microsoft.com/en-us/typography/opentype/spec/chapter2#lookup-list-table)
#[derive(Clone, Copy, Debug)]
pub struct LookupList<'a> {
    data: FontData<'a>,
    lookup_offsets: &'a [BigEndian<u16>],
}

impl<'a> FontRead<'a> for LookupList<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let count: u16 = cursor.read()?;
        let lookup_offsets = cursor.read_array(count as usize)?;
        Ok(LookupList {
            data,
            lookup_offsets,
        })
    }
}

impl<'a> LookupList<'a> {
    pub fn lookup_count(&self) -> u16 {
        self.lookup_offsets.len() as u16
    }

    pub fn lookup(&self, index: u16) -> Result<Lookup<'a>, ReadError> {
        let offset = self
            .lookup_offsets
            .get(index as usize)
            .ok_or(ReadError::OutOfBounds)?;
        self.data.read_table_at(offset.get() as usize)
    }
}

/// [Lookup Table](https://docs.microsoft.com/en-us/typography/opentype/spec/chapter2#lookup-table)
#[derive(Clone, Copy, Debug)]
pub struct Lookup<'a> {
    data: FontData<'a>,
    subtable_offsets: &'a [BigEndian<u16>],
}

impl<'a> FontRead<'a> for Lookup<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        cursor.advance::<u16>();
        cursor.advance::<u16>();
        let count: u16 = cursor.read()?;
        let subtable_offsets = cursor.read_array(count as usize)?;
        Ok(Lookup {
            data,
            subtable_offsets,
        })
    }
}

impl<'a> Lookup<'a> {
    pub fn lookup_type(&self) -> u16 {
        self.data.read_at(0).unwrap_or_default()
    }

    pub fn lookup_flag(&self) -> u16 {
        self.data.read_at(2).unwrap_or_default()
    }

    pub fn subtable_count(&self) -> u16 {
        self.subtable_offsets.len() as u16
    }

    /// The raw data of a subtable; its format depends on the lookup type.
    pub fn subtable_data(&self, index: u16) -> Result<FontData<'a>, ReadError> {
        let offset = self
            .subtable_offsets
            .get(index as usize)
            .ok_or(ReadError::OutOfBounds)?
            .get();
        if offset == 0 {
            return Err(ReadError::NullOffset);
        }
        self.data
            .split_off(offset as usize)
            .ok_or(ReadError::OutOfBounds)
    }

    pub fn subtables(&self) -> impl Iterator<Item = Result<FontData<'a>, ReadError>> + '_ {
        (0..self.subtable_count()).map(|idx| self.subtable_data(idx))
    }
}
