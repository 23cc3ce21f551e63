//! Builders for the tables every test font carries
//!
//! These write the simplest valid form of each table: a version 1.0 `maxp`,
//! format 0 `name`, short or long `loca`, and simple glyphs whose
//! coordinates are all stored as 16-bit deltas.

use fontmill_types::{Fixed, Tag};

use crate::bebuffer::BeBuffer;

pub const HEAD: Tag = Tag::new(b"head");
pub const HHEA: Tag = Tag::new(b"hhea");
pub const MAXP: Tag = Tag::new(b"maxp");
pub const HMTX: Tag = Tag::new(b"hmtx");
pub const LOCA: Tag = Tag::new(b"loca");
pub const GLYF: Tag = Tag::new(b"glyf");
pub const NAME: Tag = Tag::new(b"name");
pub const POST: Tag = Tag::new(b"post");

/// A `head` table; `bbox` is `[x_min, y_min, x_max, y_max]`.
pub fn head(units_per_em: u16, bbox: [i16; 4], index_to_loc_format: i16) -> BeBuffer {
    BeBuffer::new()
        .extend([1u16, 0])
        .push(Fixed::ONE)
        .push(0u32)
        .push(0x5F0F3CF5u32)
        .push(0u16)
        .push(units_per_em)
        // created, modified
        .extend([0u32; 4])
        .extend(bbox)
        // macStyle, lowestRecPPEM, fontDirectionHint
        .extend([0u16, 8, 2])
        .push(index_to_loc_format)
        .push(0i16)
}

pub fn hhea(
    ascender: i16,
    descender: i16,
    advance_width_max: u16,
    number_of_h_metrics: u16,
) -> BeBuffer {
    BeBuffer::new()
        .push(0x0001_0000u32)
        .extend([ascender, descender, 0])
        .push(advance_width_max)
        // min lsb, min rsb, x max extent
        .extend([0i16; 3])
        // caret slope rise, run, offset
        .extend([1i16, 0, 0])
        .extend([0i16; 4])
        .push(0i16)
        .push(number_of_h_metrics)
}

/// A version 1.0 `maxp`; the fields other than the glyph count and
/// component depth are zero.
pub fn maxp(num_glyphs: u16, max_component_depth: u16) -> BeBuffer {
    BeBuffer::new()
        .push(0x0001_0000u32)
        .push(num_glyphs)
        .extend([0u16; 12])
        .push(max_component_depth)
}

/// An `hmtx` with a long metric per `(advance, lsb)` pair, followed by the
/// bare left side bearings.
pub fn hmtx(metrics: &[(u16, i16)], left_side_bearings: &[i16]) -> BeBuffer {
    metrics
        .iter()
        .fold(BeBuffer::new(), |buf, (advance, lsb)| {
            buf.push(*advance).push(*lsb)
        })
        .extend(left_side_bearings.iter().copied())
}

/// A version 2.0 `post` table naming the glyphs in order.
///
/// Standard Macintosh names are referenced by index; anything else is
/// stored as a Pascal string.
pub fn post(glyph_names: &[&str]) -> BeBuffer {
    let mut custom = Vec::new();
    let indices = glyph_names
        .iter()
        .map(|name| match standard_name_index(name) {
            Some(idx) => idx,
            None => {
                custom.push(*name);
                257 + custom.len() as u16
            }
        })
        .collect::<Vec<_>>();
    let mut buf = BeBuffer::new()
        .push(0x0002_0000u32)
        .push(0u32)
        .extend([-75i16, 50])
        .extend([0u32; 5])
        .push(glyph_names.len() as u16)
        .extend(indices);
    for name in custom {
        buf = buf.push(name.len() as u8).append(name.as_bytes());
    }
    buf
}

// only the part of the standard set the test fonts use
fn standard_name_index(name: &str) -> Option<u16> {
    match name.as_bytes() {
        b".notdef" => Some(0),
        b"space" => Some(3),
        b"period" => Some(17),
        [c @ b'A'..=b'Z'] => Some(36 + (c - b'A') as u16),
        [c @ b'a'..=b'z'] => Some(68 + (c - b'a') as u16),
        _ => None,
    }
}

/// A name record: `(platform, encoding, language, name id, text)`.
pub type NameEntry<'a> = (u16, u16, u16, u16, &'a str);

/// A format 0 `name` table.
///
/// Macintosh strings are written as ASCII, everything else as UTF-16BE.
/// The records are sorted as the table requires.
pub fn name(entries: &[NameEntry]) -> BeBuffer {
    let mut entries = entries.to_vec();
    entries.sort_by_key(|(p, e, l, n, _)| (*p, *e, *l, *n));
    let storage_offset = 6 + entries.len() * 12;
    let mut records = BeBuffer::new()
        .push(0u16)
        .push(entries.len() as u16)
        .push(storage_offset as u16);
    let mut storage = Vec::new();
    for (platform, encoding, language, name_id, text) in entries {
        let bytes: Vec<u8> = if platform == 1 {
            text.bytes().collect()
        } else {
            text.encode_utf16().flat_map(u16::to_be_bytes).collect()
        };
        records = records
            .extend([platform, encoding, language, name_id])
            .push(bytes.len() as u16)
            .push(storage.len() as u16);
        storage.extend(bytes);
    }
    records.append(&storage)
}

/// A simple glyph with every point on curve.
///
/// `end_points` holds the index of the last point of each contour.
pub fn simple_glyph(points: &[(i16, i16)], end_points: &[u16]) -> BeBuffer {
    let bbox = |coord: fn(&(i16, i16)) -> i16| {
        let values = points.iter().map(coord);
        (
            values.clone().min().unwrap_or_default(),
            values.max().unwrap_or_default(),
        )
    };
    let (x_min, x_max) = bbox(|pt: &(i16, i16)| pt.0);
    let (y_min, y_max) = bbox(|pt: &(i16, i16)| pt.1);
    let deltas = |coord: fn(&(i16, i16)) -> i16| {
        let mut last = 0i16;
        points
            .iter()
            .map(move |pt| {
                let delta = coord(pt) - last;
                last = coord(pt);
                delta
            })
            .collect::<Vec<_>>()
    };
    BeBuffer::new()
        .push(end_points.len() as i16)
        .extend([x_min, y_min, x_max, y_max])
        .extend(end_points.iter().copied())
        // no instructions
        .push(0u16)
        // on curve, both coordinates as words
        .extend(points.iter().map(|_| 1u8))
        .extend(deltas(|pt: &(i16, i16)| pt.0))
        .extend(deltas(|pt: &(i16, i16)| pt.1))
        .align_to(2)
}

/// A composite glyph placing each `(glyph id, dx, dy)` component by offset.
pub fn composite_glyph(bbox: [i16; 4], components: &[(u16, i16, i16)]) -> BeBuffer {
    const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
    const ARGS_ARE_XY_VALUES: u16 = 0x0002;
    const MORE_COMPONENTS: u16 = 0x0020;
    let mut buf = BeBuffer::new().push(-1i16).extend(bbox);
    for (i, (glyph, dx, dy)) in components.iter().enumerate() {
        let mut flags = ARG_1_AND_2_ARE_WORDS | ARGS_ARE_XY_VALUES;
        if i + 1 < components.len() {
            flags |= MORE_COMPONENTS;
        }
        buf = buf.push(flags).push(*glyph).push(*dx).push(*dy);
    }
    buf
}

/// Concatenate glyph data into `glyf` and a short `loca`.
pub fn glyf_and_short_loca(glyphs: &[BeBuffer]) -> (BeBuffer, BeBuffer) {
    let mut glyf = BeBuffer::new();
    let mut loca = BeBuffer::new().push(0u16);
    for glyph in glyphs {
        glyf = glyf.append(glyph).align_to(2);
        loca = loca.push((glyf.len() / 2) as u16);
    }
    (glyf, loca)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_sizes() {
        assert_eq!(head(1000, [0; 4], 0).len(), 54);
        assert_eq!(hhea(800, -200, 600, 1).len(), 36);
        assert_eq!(maxp(3, 1).len(), 32);
    }

    #[test]
    fn post_names() {
        let post = post(&[".notdef", "A", "o", "alef"]);
        // header + count + 4 indices + "alef"
        assert_eq!(post.len(), 32 + 2 + 8 + 5);
        assert_eq!(&post[34..42], &[0, 0, 0, 36, 0, 82, 1, 2]);
        assert_eq!(&post[42..], b"\x04alef");
    }

    #[test]
    fn simple_glyph_layout() {
        let glyph = simple_glyph(&[(10, 0), (10, 20), (30, 0)], &[2]);
        // header, one end point, instruction length, 3 flags, 6 words, pad
        assert_eq!(glyph.len(), 10 + 2 + 2 + 3 + 12 + 1);
        assert_eq!(&glyph[2..10], &[0, 10, 0, 0, 0, 30, 0, 20]);
    }

    #[test]
    fn short_loca() {
        let (glyf, loca) = glyf_and_short_loca(&[
            BeBuffer::new(),
            simple_glyph(&[(0, 0)], &[0]),
            BeBuffer::new(),
        ]);
        assert_eq!(glyf.len(), 20);
        assert_eq!(loca.as_slice(), &[0, 0, 0, 0, 0, 10, 0, 10]);
    }
}
