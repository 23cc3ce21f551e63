//! A builder for the 'glyf' and 'loca' tables

use super::{Glyf, Glyph};
use crate::{
    error::Error,
    tables::loca::{Loca, LocaFormat},
    FontWrite, TableWriter,
};

/// A builder for constructing the 'glyf' & 'loca' tables.
///
/// These two tables are tightly coupled, and are necessarily constructed
/// together.
///
/// # Example
///
/// ```
/// use fontmill_write::tables::glyf::{Glyph, GlyfLocaBuilder};
/// # fn get_glyphs() -> Vec<(String, Glyph)> { Vec::new() }
///
/// let names_and_glyphs: Vec<(String, Glyph)> = get_glyphs();
/// let mut builder = GlyfLocaBuilder::new();
///
/// for (name, glyph) in names_and_glyphs {
///     // your error handling goes here
///     if let Err(e) = builder.add_glyph(&glyph) {
///         panic!("error compiling glyph '{name}': '{e}'");
///     }
/// }
///
/// let (_glyf, _loca, _loca_format) = builder.build();
/// // store the results somewhere
/// ```
pub struct GlyfLocaBuilder {
    glyph_writer: TableWriter,
    raw_loca: Vec<u32>,
}

impl GlyfLocaBuilder {
    /// Construct a new builder for the 'glyf' and 'loca' tables.
    pub fn new() -> Self {
        Self {
            glyph_writer: TableWriter::default(),
            raw_loca: vec![0],
        }
    }

    /// Add a glyph to the table.
    ///
    /// The glyph is validated and compiled immediately, so that the caller can
    /// associate any errors with a particular glyph.
    pub fn add_glyph(&mut self, glyph: &Glyph) -> Result<&mut Self, Error> {
        if !glyph.is_empty() {
            glyph.validate()?;
            glyph.write_into(&mut self.glyph_writer);
            // long offsets don't need it, but keep glyphs 4-byte aligned
            self.glyph_writer.pad_to_4byte_aligned();
        }
        let pos = self.glyph_writer.len();
        self.raw_loca.push(pos as u32);
        Ok(self)
    }

    /// The number of glyphs added so far.
    pub fn len(&self) -> usize {
        self.raw_loca.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Construct the final glyf and loca tables, always with long offsets.
    ///
    /// This method also returns the loca format; the caller is responsible for
    /// setting this field in the `head` table.
    #[must_use]
    pub fn build(self) -> (Glyf, Loca, LocaFormat) {
        let glyph_data = self.glyph_writer.into_data();
        let loca = Loca::new(self.raw_loca);
        let format = loca.format();
        (Glyf(glyph_data), loca, format)
    }
}

impl Default for GlyfLocaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::super::{CurvePoint, SimpleGlyph};
    use super::*;
    use read::{tables::glyf as read_glyf, tables::loca as read_loca, FontData, FontRead};
    use types::GlyphId;

    #[test]
    fn build_glyf_and_loca() {
        let triangle = SimpleGlyph::from_points(
            &[
                CurvePoint::on_curve(0, 0),
                CurvePoint::on_curve(250, 700),
                CurvePoint::on_curve(500, 0),
            ],
            [2],
        )
        .unwrap();
        let mut builder = GlyfLocaBuilder::new();
        builder
            .add_glyph(&Glyph::Empty)
            .unwrap()
            .add_glyph(&triangle.clone().into())
            .unwrap()
            .add_glyph(&Glyph::Empty)
            .unwrap();
        assert_eq!(builder.len(), 3);
        let (glyf, loca, format) = builder.build();
        assert_eq!(format, LocaFormat::Long);
        assert_eq!(glyf.0.len() % 4, 0);

        let loca_bytes = crate::dump_table(&loca).unwrap();
        let read_loca = read_loca::Loca::read(FontData::new(&loca_bytes), true).unwrap();
        assert_eq!(read_loca.len(), 4);
        let read_glyf = read_glyf::Glyf::read(FontData::new(&glyf.0)).unwrap();
        assert!(read_glyf
            .glyph(&read_loca, GlyphId::new(0))
            .unwrap()
            .is_none());
        let Some(read_glyf::Glyph::Simple(glyph)) =
            read_glyf.glyph(&read_loca, GlyphId::new(1)).unwrap()
        else {
            panic!("expected simple glyph");
        };
        assert_eq!(glyph.x_max(), 500);
        assert_eq!(glyph.num_points(), 3);
        assert!(read_glyf
            .glyph(&read_loca, GlyphId::new(2))
            .unwrap()
            .is_none());
    }
}
