//! A static font with a `GPOS` table that exercises kerning flattening.
//!
//! The `kern` feature appears twice and references these lookups:
//!
//! | lookup | type | content |
//! |---|---|---|
//! | 0 | pair, format 1 | `A V -80`, `A o 0`, `T o -60` |
//! | 1 | extension wrapping pair format 2 | classes `{T} {A} {V}` x `{.notdef A T alef beh period} {V} {o e}` |
//! | 2 | chained context | not kerning |
//! | 3 | pair, format 1, placement + advance | `alef beh <-20 0 -20 0>` |
//! | 4 | pair, format 1, placement only | `period A` |
//!
//! A `mkmk` feature references lookup 2 as well. The class matrix of lookup
//! 1 is `[[0, 0, -30], [0, -40, 0], [0, 0, -50]]`; its `A V -40` entry is
//! shadowed by the pair from lookup 0.

use fontmill_types::Tag;

use crate::{
    bebuffer::BeBuffer,
    sfnt,
    tables::{self, glyf_and_short_loca},
};

pub const GPOS: Tag = Tag::new(b"GPOS");

/// The glyph order of [`kerning_font`].
pub const GLYPH_NAMES: [&str; 9] = [
    ".notdef", "A", "V", "T", "o", "e", "alef", "beh", "period",
];

const A: u16 = 1;
const V: u16 = 2;
const T: u16 = 3;
const O: u16 = 4;
const E: u16 = 5;
const ALEF: u16 = 6;
const BEH: u16 = 7;
const PERIOD: u16 = 8;

const X_PLACEMENT: u16 = 0x0001;
const X_ADVANCE: u16 = 0x0004;

/// The complete font.
pub fn kerning_font() -> Vec<u8> {
    let num_glyphs = GLYPH_NAMES.len() as u16;
    let empty = vec![BeBuffer::new(); GLYPH_NAMES.len()];
    let (glyf, loca) = glyf_and_short_loca(&empty);
    let metrics = vec![(500u16, 0i16); GLYPH_NAMES.len()];
    sfnt::assemble(vec![
        (tables::HEAD, tables::head(1000, [0; 4], 0).into_vec()),
        (tables::HHEA, tables::hhea(800, -200, 500, num_glyphs).into_vec()),
        (tables::MAXP, tables::maxp(num_glyphs, 0).into_vec()),
        (tables::HMTX, tables::hmtx(&metrics, &[]).into_vec()),
        (tables::LOCA, loca.into_vec()),
        (tables::GLYF, glyf.into_vec()),
        (tables::POST, tables::post(&GLYPH_NAMES).into_vec()),
        (GPOS, gpos().into_vec()),
    ])
}

/// The `GPOS` table on its own.
pub fn gpos() -> BeBuffer {
    let script_list = BeBuffer::new().push(0u16);
    let features = feature_list(&[
        (Tag::new(b"kern"), &[1, 0, 2, 3, 4]),
        (Tag::new(b"kern"), &[0, 3]),
        (Tag::new(b"mkmk"), &[2]),
    ]);
    let lookups = lookup_list(vec![
        lookup(
            2,
            vec![pair_pos_format1(
                X_ADVANCE,
                &[
                    (A, &[(V, &[-80]), (O, &[0])]),
                    (T, &[(O, &[-60])]),
                ],
            )],
        ),
        lookup(9, vec![extension(2, class_pairs())]),
        lookup(8, vec![BeBuffer::new().extend([3u16, 0, 0, 0, 0])]),
        lookup(
            2,
            vec![pair_pos_format1(
                X_PLACEMENT | X_ADVANCE,
                &[(ALEF, &[(BEH, &[-20, -20])])],
            )],
        ),
        lookup(
            2,
            vec![pair_pos_format1(X_PLACEMENT, &[(PERIOD, &[(A, &[-10])])])],
        ),
    ]);
    let script_list_offset = 10u16;
    let feature_list_offset = script_list_offset + script_list.len() as u16;
    let lookup_list_offset = feature_list_offset + features.len() as u16;
    BeBuffer::new()
        .extend([1u16, 0])
        .extend([script_list_offset, feature_list_offset, lookup_list_offset])
        .append(&script_list)
        .append(&features)
        .append(&lookups)
}

fn class_pairs() -> BeBuffer {
    // A V T, as a single range
    let coverage = BeBuffer::new().extend([2u16, 1, A, T, 0]);
    // A -> 1, V -> 2, T unassigned
    let class_def1 = BeBuffer::new().extend([1u16, A, 2, 1, 2]);
    // V -> 1, o e -> 2
    let class_def2 = BeBuffer::new().extend([2u16, 2, V, V, 1, O, E, 2]);
    pair_pos_format2(
        X_ADVANCE,
        coverage,
        class_def1,
        class_def2,
        &[&[0, 0, -30], &[0, -40, 0], &[0, 0, -50]],
    )
}

type PairSet<'a> = (u16, &'a [(u16, &'a [i16])]);

/// Format 1 pair adjustment; the values of each pair must match
/// `value_format`, and `value_format2` is always empty.
pub fn pair_pos_format1(value_format: u16, pair_sets: &[PairSet]) -> BeBuffer {
    let header_len = 10 + 2 * pair_sets.len();
    let sets = pair_sets
        .iter()
        .map(|(_, pairs)| {
            pairs.iter().fold(
                BeBuffer::new().push(pairs.len() as u16),
                |buf, (second, values)| buf.push(*second).extend(values.iter().copied()),
            )
        })
        .collect::<Vec<_>>();
    let coverage_offset = header_len + sets.iter().map(|set| set.len()).sum::<usize>();
    let mut buf = BeBuffer::new()
        .push(1u16)
        .push(coverage_offset as u16)
        .extend([value_format, 0])
        .push(pair_sets.len() as u16);
    let mut offset = header_len;
    for set in &sets {
        buf = buf.push(offset as u16);
        offset += set.len();
    }
    for set in &sets {
        buf = buf.append(set);
    }
    let first_glyphs = pair_sets.iter().map(|(first, _)| *first);
    buf.extend([1u16, pair_sets.len() as u16])
        .extend(first_glyphs)
}

/// Format 2 pair adjustment with a single value per class pair.
pub fn pair_pos_format2(
    value_format: u16,
    coverage: BeBuffer,
    class_def1: BeBuffer,
    class_def2: BeBuffer,
    matrix: &[&[i16]],
) -> BeBuffer {
    let class1_count = matrix.len();
    let class2_count = matrix.first().map(|row| row.len()).unwrap_or_default();
    let header_len = 16 + class1_count * class2_count * 2;
    let coverage_offset = header_len;
    let class_def1_offset = coverage_offset + coverage.len();
    let class_def2_offset = class_def1_offset + class_def1.len();
    matrix
        .iter()
        .fold(
            BeBuffer::new()
                .push(2u16)
                .push(coverage_offset as u16)
                .extend([value_format, 0])
                .push(class_def1_offset as u16)
                .push(class_def2_offset as u16)
                .push(class1_count as u16)
                .push(class2_count as u16),
            |buf, row| buf.extend(row.iter().copied()),
        )
        .append(&coverage)
        .append(&class_def1)
        .append(&class_def2)
}

/// An extension subtable wrapping `subtable`.
pub fn extension(lookup_type: u16, subtable: BeBuffer) -> BeBuffer {
    BeBuffer::new()
        .push(1u16)
        .push(lookup_type)
        .push(8u32)
        .append(&subtable)
}

pub fn lookup(lookup_type: u16, subtables: Vec<BeBuffer>) -> BeBuffer {
    let header = BeBuffer::new()
        .push(lookup_type)
        .push(0u16)
        .push(subtables.len() as u16);
    offsets_then_items(header, subtables)
}

pub fn lookup_list(lookups: Vec<BeBuffer>) -> BeBuffer {
    let header = BeBuffer::new().push(lookups.len() as u16);
    offsets_then_items(header, lookups)
}

pub fn feature_list(features: &[(Tag, &[u16])]) -> BeBuffer {
    let mut offset = 2 + features.len() * 6;
    let mut buf = BeBuffer::new().push(features.len() as u16);
    for (tag, indices) in features {
        buf = buf.push(*tag).push(offset as u16);
        offset += 4 + 2 * indices.len();
    }
    for (_, indices) in features {
        buf = buf
            .push(0u16)
            .push(indices.len() as u16)
            .extend(indices.iter().copied());
    }
    buf
}

// a header, a u16 offset per item relative to the header start, the items
fn offsets_then_items(header: BeBuffer, items: Vec<BeBuffer>) -> BeBuffer {
    let mut offset = header.len() + 2 * items.len();
    let mut buf = header;
    for item in &items {
        buf = buf.push(offset as u16);
        offset += item.len();
    }
    items.iter().fold(buf, |buf, item| buf.append(item))
}
