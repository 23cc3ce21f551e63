//! Assembling tables into a font file

use fontmill_types::{Tag, TT_SFNT_VERSION};

use crate::bebuffer::BeBuffer;

/// Wrap the given tables in an sfnt table directory.
///
/// Tables are sorted by tag and padded to four bytes. Checksums are real,
/// but `head.checkSumAdjustment` is left as written.
pub fn assemble(tables: Vec<(Tag, Vec<u8>)>) -> Vec<u8> {
    let mut tables = tables;
    tables.sort_by_key(|(tag, _)| *tag);
    let num_tables = tables.len() as u16;
    let entry_selector = (num_tables.max(1) as f64).log2().floor() as u16;
    let search_range = 2u16.pow(entry_selector as u32) * 16;
    let range_shift = num_tables * 16 - search_range.min(num_tables * 16);

    let mut directory = BeBuffer::new()
        .push(TT_SFNT_VERSION)
        .push(num_tables)
        .extend([search_range, entry_selector, range_shift]);
    let mut offset = 12 + tables.len() * 16;
    for (tag, data) in &tables {
        directory = directory
            .push(*tag)
            .push(checksum(data))
            .push(offset as u32)
            .push(data.len() as u32);
        offset += data.len().next_multiple_of(4);
    }
    let mut font = directory.into_vec();
    for (_, data) in &tables {
        font.extend_from_slice(data);
        font.resize(font.len().next_multiple_of(4), 0);
    }
    font
}

fn checksum(data: &[u8]) -> u32 {
    data.chunks(4)
        .map(|chunk| {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            u32::from_be_bytes(word)
        })
        .fold(0u32, u32::wrapping_add)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_layout() {
        let font = assemble(vec![
            (Tag::new(b"maxp"), vec![0, 0, 0x50, 0, 0, 3]),
            (Tag::new(b"head"), vec![1, 2, 3, 4]),
        ]);
        // 12 byte header, two 16 byte records, then 4 + 8 bytes of tables
        assert_eq!(font.len(), 12 + 32 + 4 + 8);
        assert_eq!(&font[12..16], b"head");
        assert_eq!(&font[28..32], b"maxp");
        // head checksum is the single word
        assert_eq!(&font[16..20], &[1, 2, 3, 4]);
        assert_eq!(&font[44..48], &[1, 2, 3, 4]);
    }
}
