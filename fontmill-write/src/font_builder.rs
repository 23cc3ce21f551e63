//!  A builder for top-level font objects

use std::borrow::Cow;
use std::collections::BTreeMap;

use read::{FontRef, TableProvider, TopLevelTable};
use types::{Tag, TT_SFNT_VERSION};

use crate::{error::BuilderError, write::dump_table, FontWrite};

const TABLE_RECORD_LEN: usize = 16;
const HEAD: Tag = Tag::new(b"head");
const CHECKSUM_ADJUSTMENT_POS: usize = 8;
const CHECKSUM_MAGIC: u32 = 0xB1B0AFBA;

/// Build a font from some set of tables.
#[derive(Debug, Clone, Default)]
pub struct FontBuilder<'a> {
    tables: BTreeMap<Tag, Cow<'a, [u8]>>,
}

/// The binary search helpers for the table directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SearchRange {
    search_range: u16,
    entry_selector: u16,
    range_shift: u16,
}

impl SearchRange {
    fn compute(n_items: usize, item_size: usize) -> Self {
        let entry_selector = (n_items as f64).log2().floor().max(0.0) as usize;
        let search_range = (1usize << entry_selector) * item_size;
        let range_shift = (n_items * item_size).saturating_sub(search_range);
        SearchRange {
            search_range: search_range as u16,
            entry_selector: entry_selector as u16,
            range_shift: range_shift as u16,
        }
    }
}

impl<'a> FontBuilder<'a> {
    /// Create a new builder to compile a binary font
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table to the builder.
    ///
    /// The table is compiled immediately; an error is returned if it fails
    /// validation.
    pub fn add_table<T>(&mut self, table: &T) -> Result<&mut Self, BuilderError>
    where
        T: FontWrite + TopLevelTable,
    {
        let tag = T::TAG;
        let bytes = dump_table(table).map_err(|inner| BuilderError { inner, tag })?;
        Ok(self.add_raw(tag, bytes))
    }

    /// A builder method to add raw data for the provided tag
    pub fn add_raw(&mut self, tag: Tag, data: impl Into<Cow<'a, [u8]>>) -> &mut Self {
        self.tables.insert(tag, data.into());
        self
    }

    /// Remove a table, returning `true` if it was present.
    pub fn remove(&mut self, tag: Tag) -> bool {
        self.tables.remove(&tag).is_some()
    }

    /// Copy each table from the source font if it does not already exist
    pub fn copy_missing_tables(&mut self, font: &FontRef<'a>) -> &mut Self {
        for record in font.table_directory().table_records() {
            let tag = record.tag();
            if !self.tables.contains_key(&tag) {
                if let Some(data) = font.data_for_tag(tag) {
                    self.add_raw(tag, data.as_bytes());
                } else {
                    log::warn!("data for '{tag}' is malformed");
                }
            }
        }
        self
    }

    /// Returns `true` if the builder contains a table with this tag.
    pub fn contains(&self, tag: Tag) -> bool {
        self.tables.contains_key(&tag)
    }

    /// The tags of the tables in the builder, in sorted order.
    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.tables.keys().copied()
    }

    /// Assemble all the tables into a binary font file with a [Table Directory].
    ///
    /// If a `head` table is present its `checkSumAdjustment` is recomputed.
    ///
    /// [Table Directory]: https://learn.microsoft.com/en-us/typography/opentype/spec/otff#table-directory
    pub fn build(&mut self) -> Vec<u8> {
        if let Some(head) = self.tables.get_mut(&HEAD) {
            if let Some(adjustment) = head
                .to_mut()
                .get_mut(CHECKSUM_ADJUSTMENT_POS..CHECKSUM_ADJUSTMENT_POS + 4)
            {
                adjustment.fill(0);
            }
        }

        let header_len = std::mem::size_of::<u32>() // sfnt
            + std::mem::size_of::<u16>() * 4 // num_tables to range_shift
            + self.tables.len() * TABLE_RECORD_LEN;
        let computed = SearchRange::compute(self.tables.len(), TABLE_RECORD_LEN);

        let mut data = Vec::with_capacity(header_len);
        data.extend_from_slice(&TT_SFNT_VERSION.to_be_bytes());
        data.extend_from_slice(&(self.tables.len() as u16).to_be_bytes());
        data.extend_from_slice(&computed.search_range.to_be_bytes());
        data.extend_from_slice(&computed.entry_selector.to_be_bytes());
        data.extend_from_slice(&computed.range_shift.to_be_bytes());

        let mut position = header_len as u32;
        let mut head_offset = None;
        for (tag, table) in &self.tables {
            let (checksum, padding) = checksum_and_padding(table);
            if *tag == HEAD {
                head_offset = Some(position as usize);
            }
            data.extend_from_slice(&tag.to_be_bytes());
            data.extend_from_slice(&checksum.to_be_bytes());
            data.extend_from_slice(&position.to_be_bytes());
            data.extend_from_slice(&(table.len() as u32).to_be_bytes());
            position += table.len() as u32 + padding;
        }

        for table in self.tables.values() {
            data.extend_from_slice(table);
            let rem = round4(table.len()) - table.len();
            let padding = [0u8; 4];
            data.extend_from_slice(&padding[..rem]);
        }

        if let Some(head_offset) = head_offset {
            let adjustment = CHECKSUM_MAGIC.wrapping_sub(compute_checksum(&data));
            let pos = head_offset + CHECKSUM_ADJUSTMENT_POS;
            if let Some(slot) = data.get_mut(pos..pos + 4) {
                slot.copy_from_slice(&adjustment.to_be_bytes());
            }
        }
        data
    }
}

/// <https://github.com/google/woff2/blob/a0d0ed7da27b708c0a4e96ad7a998bddc933c06e/src/round.h#L19>
fn round4(sz: usize) -> usize {
    (sz + 3) & !3
}

fn checksum_and_padding(table: &[u8]) -> (u32, u32) {
    let checksum = compute_checksum(table);
    let padding = round4(table.len()) - table.len();
    (checksum, padding as u32)
}

/// Compute the [checksum] of some table data, padded with zeros to a
/// multiple of four bytes.
///
/// [checksum]: https://learn.microsoft.com/en-us/typography/opentype/spec/otff#calculating-checksums
pub fn compute_checksum(table: &[u8]) -> u32 {
    let mut chunks = table.chunks_exact(4);
    let mut sum = chunks.by_ref().fold(0u32, |sum, chunk| {
        sum.wrapping_add(u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
    });
    let rem = chunks.remainder();
    if !rem.is_empty() {
        let mut last = [0u8; 4];
        last[..rem.len()].copy_from_slice(rem);
        sum = sum.wrapping_add(u32::from_be_bytes(last));
    }
    sum
}
