//! Reading OpenType tables
//!
//! This crate provides memory safe parsing of the font tables needed to
//! flatten `GPOS` kerning and to instance TrueType-flavoured variable fonts.
//! Tables are thin views over the underlying bytes; nothing is decoded until
//! an accessor asks for it.
//!
//! # Example
//!
//! ```no_run
//! # let path_to_my_font_file = std::path::Path::new("");
//! use fontmill_read::{FontRef, TableProvider};
//! let font_bytes = std::fs::read(path_to_my_font_file).unwrap();
//! let font = FontRef::new(&font_bytes).expect("failed to read font data");
//! let head = font.head().expect("missing 'head' table");
//! let maxp = font.maxp().expect("missing 'maxp' table");
//!
//! println!("{} units per em, {} glyphs", head.units_per_em(), maxp.num_glyphs());
//! ```

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

mod font_data;
mod read;
mod table_provider;
pub mod tables;

pub use font_data::{Cursor, FontData};
pub use read::{FontRead, ReadError, TopLevelTable};
pub use table_provider::TableProvider;

/// Public re-export of the fontmill-types crate.
pub extern crate fontmill_types as types;

use types::{BigEndian, FixedSize, Tag, TRUE_SFNT_VERSION, TT_SFNT_VERSION};

/// A record in the sfnt table directory.
#[derive(Clone, Copy, Debug, bytemuck::AnyBitPattern)]
#[repr(C, packed)]
pub struct TableRecord {
    /// Table identifier.
    pub tag: BigEndian<Tag>,
    /// Checksum for the table.
    pub checksum: BigEndian<u32>,
    /// Offset from the beginning of the font data.
    pub offset: BigEndian<u32>,
    /// Length of the table.
    pub length: BigEndian<u32>,
}

impl TableRecord {
    pub fn tag(&self) -> Tag {
        self.tag.get()
    }

    pub fn checksum(&self) -> u32 {
        self.checksum.get()
    }

    pub fn offset(&self) -> u32 {
        self.offset.get()
    }

    pub fn length(&self) -> u32 {
        self.length.get()
    }
}

impl FixedSize for TableRecord {
    const RAW_BYTE_LEN: usize = std::mem::size_of::<Self>();
}

/// The [table directory](https://learn.microsoft.com/en-us/typography/opentype/spec/otff#table-directory)
#[derive(Clone)]
pub struct TableDirectory<'a> {
    sfnt_version: u32,
    table_records: &'a [TableRecord],
}

impl<'a> TableDirectory<'a> {
    /// The size of the directory header, before the table records.
    pub const HEADER_LEN: usize = 12;

    pub fn sfnt_version(&self) -> u32 {
        self.sfnt_version
    }

    pub fn num_tables(&self) -> u16 {
        self.table_records.len() as u16
    }

    pub fn table_records(&self) -> &'a [TableRecord] {
        self.table_records
    }

    fn is_sorted(&self) -> bool {
        self.table_records
            .windows(2)
            .all(|pair| pair[0].tag() < pair[1].tag())
    }
}

impl<'a> FontRead<'a> for TableDirectory<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let sfnt_version: u32 = cursor.read()?;
        let num_tables: u16 = cursor.read()?;
        // searchRange, entrySelector, rangeShift
        cursor.advance_by(6);
        let table_records = cursor.read_array(num_tables as usize)?;
        Ok(TableDirectory {
            sfnt_version,
            table_records,
        })
    }
}

/// Reference to an in-memory font.
///
/// This is a simple implementation of the [`TableProvider`] trait backed
/// by a borrowed slice containing font data.
#[derive(Clone)]
pub struct FontRef<'a> {
    data: FontData<'a>,
    table_directory: TableDirectory<'a>,
    // fonts are required to have a sorted directory, but not all do
    table_directory_sorted: bool,
}

impl<'a> FontRef<'a> {
    /// Creates a new reference to an in-memory font backed by the given data.
    ///
    /// The data must be a single TrueType-flavoured font and must begin with a
    /// table directory to be considered valid.
    pub fn new(data: &'a [u8]) -> Result<Self, ReadError> {
        let data = FontData::new(data);
        let table_directory = TableDirectory::read(data)?;
        if ![TT_SFNT_VERSION, TRUE_SFNT_VERSION].contains(&table_directory.sfnt_version()) {
            return Err(ReadError::InvalidSfnt(table_directory.sfnt_version()));
        }
        let table_directory_sorted = table_directory.is_sorted();
        Ok(FontRef {
            data,
            table_directory,
            table_directory_sorted,
        })
    }

    /// Returns the underlying font data.
    pub fn data(&self) -> FontData<'a> {
        self.data
    }

    /// Returns the associated table directory.
    pub fn table_directory(&self) -> &TableDirectory<'a> {
        &self.table_directory
    }

    /// Iterate over the tags of all tables in the font, in directory order.
    pub fn table_tags(&self) -> impl Iterator<Item = Tag> + 'a {
        self.table_directory
            .table_records()
            .iter()
            .map(TableRecord::tag)
    }

    /// Returns the data for the table with the specified tag, if present.
    pub fn table_data(&self, tag: Tag) -> Option<FontData<'a>> {
        let records = self.table_directory.table_records();
        let entry = if self.table_directory_sorted {
            records.binary_search_by(|rec| rec.tag().cmp(&tag)).ok()
        } else {
            records.iter().position(|rec| rec.tag() == tag)
        };

        entry.and_then(|idx| records.get(idx)).and_then(|record| {
            let start = record.offset() as usize;
            let len = record.length() as usize;
            self.data.slice(start..start.checked_add(len)?)
        })
    }
}

impl<'a> TableProvider<'a> for FontRef<'a> {
    fn data_for_tag(&self, tag: Tag) -> Option<FontData<'a>> {
        self.table_data(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fontmill_test_data::bebuffer::BeBuffer;

    fn directory(version: u32, tags: &[&[u8; 4]]) -> BeBuffer {
        let header_len = TableDirectory::HEADER_LEN + tags.len() * TableRecord::RAW_BYTE_LEN;
        let mut buf = BeBuffer::new()
            .push(version)
            .push(tags.len() as u16)
            .extend([0u16; 3]);
        for (i, tag) in tags.iter().enumerate() {
            buf = buf
                .push(Tag::new(tag))
                .push(0u32)
                .push((header_len + i * 4) as u32)
                .push(4u32);
        }
        for i in 0..tags.len() {
            buf = buf.push(i as u32 + 1);
        }
        buf
    }

    #[test]
    fn table_lookup() {
        let buf = directory(TT_SFNT_VERSION, &[b"cvt ", b"head", b"maxp"]);
        let font = FontRef::new(buf.as_slice()).unwrap();
        assert_eq!(font.table_directory().num_tables(), 3);
        let maxp = font.table_data(Tag::new(b"maxp")).unwrap();
        assert_eq!(maxp.read_at::<u32>(0), Ok(3));
        assert!(font.table_data(Tag::new(b"GPOS")).is_none());
    }

    #[test]
    fn unsorted_directory() {
        let buf = directory(TT_SFNT_VERSION, &[b"maxp", b"head"]);
        let font = FontRef::new(buf.as_slice()).unwrap();
        let head = font.table_data(Tag::new(b"head")).unwrap();
        assert_eq!(head.read_at::<u32>(0), Ok(2));
    }

    #[test]
    fn reject_cff() {
        let buf = directory(types::CFF_SFNT_VERSION, &[b"head"]);
        assert!(matches!(
            FontRef::new(buf.as_slice()),
            Err(ReadError::InvalidSfnt(_))
        ));
    }
}
