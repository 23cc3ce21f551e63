//! A variable font with one `wght` axis, for instancing tests.
//!
//! Axis: `wght` 100..400..900, with an `avar` map sending 0.5 to 0.75.
//!
//! Glyphs:
//! - 0 `.notdef`, empty
//! - 1 `A`, the square (100,0) (100,700) (500,700) (500,0), advance 600.
//!   At `wght` max every x moves 50 outwards, the top rises by 100 and the
//!   advance grows by 100. At `wght` min a second variation moves points 0
//!   and 2 only, `(+20, 0)` and `(-20, -100)`, leaving the rest to inference.
//! - 2 `B`, the triangle (50,0) (300,600) (550,0), without variations
//! - 3 `C`, a composite of `A` at (0,0) and `B` at (600,0), advance 1200.
//!   At `wght` max `B` moves 100 right and the advance grows by 200.
//! - 4 `space`, empty
//!
//! The `cvt ` holds `[100, 200, 300]`; `cvar` adds `[10, _, -21]` at
//! `wght` max. Dummy `STAT` and `HVAR` tables stand in for the other
//! variation-only tables.

use fontmill_types::{F2Dot14, Fixed, Tag};

use crate::{
    bebuffer::BeBuffer,
    sfnt,
    tables::{self, NameEntry},
};

pub const FVAR: Tag = Tag::new(b"fvar");
pub const AVAR: Tag = Tag::new(b"avar");
pub const GVAR: Tag = Tag::new(b"gvar");
pub const CVT: Tag = Tag::new(b"cvt ");
pub const CVAR: Tag = Tag::new(b"cvar");
pub const STAT: Tag = Tag::new(b"STAT");
pub const HVAR: Tag = Tag::new(b"HVAR");

/// The glyph order of [`variable_font`].
pub const GLYPH_NAMES: [&str; 5] = [".notdef", "A", "B", "C", "space"];

pub const FAMILY_NAME: &str = "Mill Sans";

const NAMES: &[NameEntry] = &[
    (1, 0, 0, 1, FAMILY_NAME),
    (1, 0, 0, 2, "Regular"),
    (1, 0, 0, 4, "Mill Sans Regular"),
    (1, 0, 0, 6, "MillSans-Regular"),
    (3, 1, 0x409, 1, FAMILY_NAME),
    (3, 1, 0x409, 2, "Regular"),
    (3, 1, 0x409, 4, "Mill Sans Regular"),
    (3, 1, 0x409, 6, "MillSans-Regular"),
    (3, 1, 0x409, 256, "Weight"),
];

/// The complete font.
pub fn variable_font() -> Vec<u8> {
    variable_font_with(fvar(), avar())
}

/// The font, with the given `fvar` and `avar` replacing the regular ones.
///
/// An empty `avar` leaves that table out.
pub fn variable_font_with(fvar: BeBuffer, avar: BeBuffer) -> Vec<u8> {
    let num_glyphs = GLYPH_NAMES.len() as u16;
    let glyphs = [
        BeBuffer::new(),
        tables::simple_glyph(&[(100, 0), (100, 700), (500, 700), (500, 0)], &[3]),
        tables::simple_glyph(&[(50, 0), (300, 600), (550, 0)], &[2]),
        tables::composite_glyph([100, 0, 1150, 700], &[(1, 0, 0), (2, 600, 0)]),
        BeBuffer::new(),
    ];
    let (glyf, loca) = tables::glyf_and_short_loca(&glyphs);
    let hmtx = tables::hmtx(&[(0, 0), (600, 100), (600, 50), (1200, 100)], &[0]);
    let mut font_tables = vec![
        (tables::HEAD, tables::head(1000, [50, 0, 1150, 700], 0).into_vec()),
        (tables::HHEA, tables::hhea(800, -200, 1200, 4).into_vec()),
        (tables::MAXP, tables::maxp(num_glyphs, 1).into_vec()),
        (tables::HMTX, hmtx.into_vec()),
        (tables::LOCA, loca.into_vec()),
        (tables::GLYF, glyf.into_vec()),
        (tables::NAME, tables::name(NAMES).into_vec()),
        (tables::POST, tables::post(&GLYPH_NAMES).into_vec()),
        (CVT, BeBuffer::new().extend([100i16, 200, 300]).into_vec()),
        (CVAR, cvar().into_vec()),
        (FVAR, fvar.into_vec()),
        (GVAR, gvar().into_vec()),
        (STAT, BeBuffer::new().extend([1u16, 1, 8, 0]).into_vec()),
        (HVAR, BeBuffer::new().extend([1u16, 0]).into_vec()),
    ];
    if !avar.is_empty() {
        font_tables.push((AVAR, avar.into_vec()));
    }
    sfnt::assemble(font_tables)
}

/// `fvar` with the given axes, as `(tag, min, default, max)`.
pub fn fvar_with_axes(axes: &[(&[u8; 4], f64, f64, f64)]) -> BeBuffer {
    let axis_count = axes.len() as u16;
    axes.iter().fold(
        BeBuffer::new()
            .extend([1u16, 0, 16, 2])
            .extend([axis_count, 20, 0, 4 + 4 * axis_count]),
        |buf, (tag, min, default, max)| {
            buf.push(Tag::new(tag))
                .extend([min, default, max].map(|v| Fixed::from_f64(*v)))
                .push(0u16)
                .push(256u16)
        },
    )
}

pub fn fvar() -> BeBuffer {
    fvar_with_axes(&[(b"wght", 100.0, 400.0, 900.0)])
}

pub fn avar() -> BeBuffer {
    let f2dot14 = |v: f64| F2Dot14::from_f64(v);
    BeBuffer::new()
        .extend([1u16, 0, 0, 1])
        .push(4u16)
        .extend(
            [(-1.0, -1.0), (0.0, 0.0), (0.5, 0.75), (1.0, 1.0)]
                .into_iter()
                .flat_map(|(from, to)| [f2dot14(from), f2dot14(to)]),
        )
}

fn cvar() -> BeBuffer {
    BeBuffer::new()
        .extend([1u16, 0, 1, 14])
        // data size, embedded peak with private points
        .extend([7u16, 0xA000])
        .push(F2Dot14::ONE)
        // points 0 and 2, deltas 10 and -21
        .extend([2u8, 1, 0, 2])
        .extend([1u8, 10, 0xEB])
}

fn gvar() -> BeBuffer {
    let glyph_a = BeBuffer::new()
        .extend([2u16, 14])
        // shared tuple 0 (wght max), all points
        .extend([34u16, 0])
        // embedded peak at wght min, private points
        .extend([10u16, 0xA000])
        .push(F2Dot14::from_f64(-1.0))
        // four outline points then four phantom points, x then y
        .push(0x47u8)
        .extend([-50i16, -50, 50, 50, 0, 100, 0, 0])
        .push(0x47u8)
        .extend([0i16, 100, 100, 0, 0, 0, 0, 0])
        // points 0 and 2
        .extend([2u8, 1, 0, 2])
        .extend([1u8, 20, 0xEC])
        .extend([1u8, 0, 0x9C]);
    let glyph_c = BeBuffer::new()
        .extend([1u16, 8])
        .extend([14u16, 0])
        // two component offsets then four phantom points
        .push(0x45u8)
        .extend([0i16, 100, 0, 200, 0, 0])
        .push(0x85u8);
    let glyph_count = GLYPH_NAMES.len() as u16;
    let offsets_len = 4 * (glyph_count as u32 + 1);
    let shared_tuples_offset = 20 + offsets_len;
    let data_offset = shared_tuples_offset + 2;
    let a_end = glyph_a.len() as u32;
    let c_end = a_end + glyph_c.len() as u32;
    BeBuffer::new()
        .extend([1u16, 0, 1, 1])
        .push(shared_tuples_offset)
        .push(glyph_count)
        // long offsets
        .push(1u16)
        .push(data_offset)
        .extend([0u32, 0, a_end, a_end, c_end, c_end])
        .push(F2Dot14::ONE)
        .append(&glyph_a)
        .append(&glyph_c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_variation_sizes() {
        let gvar = gvar();
        // header, 6 long offsets, one shared tuple, A's 58 bytes, C's 22
        assert_eq!(gvar.len(), 20 + 24 + 2 + 58 + 22);
    }

    #[test]
    fn font_is_assembled() {
        let font = variable_font();
        // 15 tables
        assert_eq!(&font[4..6], &[0, 15]);
        let without_avar = variable_font_with(fvar(), BeBuffer::new());
        assert_eq!(&without_avar[4..6], &[0, 14]);
    }
}
