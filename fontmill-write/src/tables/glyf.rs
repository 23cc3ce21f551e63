//! The [glyf (Glyph Data)](https://docs.microsoft.com/en-us/typography/opentype/spec/glyf) table

use read::TopLevelTable;
use types::{BoundingBox, Tag};

use crate::{FontWrite, TableWriter};

mod composite;
mod glyf_loca_builder;
mod simple;

pub use composite::CompositeGlyph;
pub use glyf_loca_builder::GlyfLocaBuilder;
pub use read::tables::glyf::{Anchor, Component, CompositeGlyphFlags, CurvePoint, Transform};
pub use simple::{Contour, SimpleGlyph};

/// The compiled glyph data.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Glyf(pub Vec<u8>);

impl TopLevelTable for Glyf {
    const TAG: Tag = Tag::new(b"glyf");
}

impl FontWrite for Glyf {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write_slice(&self.0)
    }
}

/// A Bounding box.
///
/// For instanced glyphs this is the extent of the points, which for
/// quadratic outlines always encloses the curve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Bbox {
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
}

impl Bbox {
    pub fn union(self, other: Bbox) -> Bbox {
        Bbox {
            x_min: self.x_min.min(other.x_min),
            y_min: self.y_min.min(other.y_min),
            x_max: self.x_max.max(other.x_max),
            y_max: self.y_max.max(other.y_max),
        }
    }
}

impl From<BoundingBox<i16>> for Bbox {
    fn from(value: BoundingBox<i16>) -> Self {
        Bbox {
            x_min: value.x_min,
            y_min: value.y_min,
            x_max: value.x_max,
            y_max: value.y_max,
        }
    }
}

impl FontWrite for Bbox {
    fn write_into(&self, writer: &mut TableWriter) {
        let Bbox {
            x_min,
            y_min,
            x_max,
            y_max,
        } = *self;
        [x_min, y_min, x_max, y_max].write_into(writer)
    }
}

/// A glyph, either simple, composite or without any outline.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Glyph {
    /// An empty glyph gets an entry in `loca`, but no data in `glyf`
    #[default]
    Empty,
    Simple(SimpleGlyph),
    Composite(CompositeGlyph),
}

impl Glyph {
    /// The bounding box for the glyph, or `None` if the glyph is empty
    pub fn bbox(&self) -> Option<Bbox> {
        match self {
            Glyph::Empty => None,
            Glyph::Simple(glyph) => Some(glyph.bbox),
            Glyph::Composite(glyph) => Some(glyph.bbox),
        }
    }

    /// `true` if the glyph contains no contours or components.
    pub fn is_empty(&self) -> bool {
        match self {
            Glyph::Empty => true,
            Glyph::Simple(glyph) => glyph.contours().is_empty(),
            Glyph::Composite(glyph) => glyph.components().is_empty(),
        }
    }
}

impl From<SimpleGlyph> for Glyph {
    fn from(value: SimpleGlyph) -> Self {
        Glyph::Simple(value)
    }
}

impl From<CompositeGlyph> for Glyph {
    fn from(value: CompositeGlyph) -> Self {
        Glyph::Composite(value)
    }
}

impl FontWrite for Glyph {
    fn write_into(&self, writer: &mut TableWriter) {
        match self {
            Glyph::Empty => (),
            Glyph::Simple(glyph) => glyph.write_into(writer),
            Glyph::Composite(glyph) => glyph.write_into(writer),
        }
    }

    fn validate(&self) -> Result<(), crate::Error> {
        match self {
            Glyph::Empty => Ok(()),
            Glyph::Simple(glyph) => glyph.validate(),
            Glyph::Composite(glyph) => glyph.validate(),
        }
    }
}
