//! Composite glyphs (containing other glyphs as components)

use read::tables::glyf as read_glyf;
use types::F2Dot14;

use super::{Anchor, Bbox, Component, CompositeGlyphFlags, Transform};
use crate::{error::Error, FontWrite, TableWriter};

/// The flags that are carried over from a component as written; the rest
/// are computed from the anchor, the transform and the component position.
const PRESERVED_FLAGS: u16 = CompositeGlyphFlags::ROUND_XY_TO_GRID
    | CompositeGlyphFlags::USE_MY_METRICS
    | CompositeGlyphFlags::OVERLAP_COMPOUND
    | CompositeGlyphFlags::SCALED_COMPONENT_OFFSET
    | CompositeGlyphFlags::UNSCALED_COMPONENT_OFFSET;

/// A glyph consisting of multiple component sub-glyphs
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositeGlyph {
    pub bbox: Bbox,
    components: Vec<Component>,
    instructions: Vec<u8>,
}

impl CompositeGlyph {
    /// Create a new composite glyph, with the provided component.
    ///
    /// The 'bbox' argument is the bounding box of the glyph after the transform
    /// has been applied.
    ///
    /// Additional components can be added with [`add_component`][Self::add_component]
    pub fn new(component: Component, bbox: impl Into<Bbox>) -> Self {
        Self {
            bbox: bbox.into(),
            components: vec![component],
            instructions: Default::default(),
        }
    }

    /// Add a new component to this glyph
    ///
    /// The 'bbox' argument is the bounding box of the glyph after the transform
    /// has been applied.
    pub fn add_component(&mut self, component: Component, bbox: impl Into<Bbox>) {
        self.components.push(component);
        self.bbox = self.bbox.union(bbox.into());
    }

    /// Convert a glyph read from a font into an owned, writable glyph.
    pub fn from_read(glyph: &read_glyf::CompositeGlyph) -> Self {
        CompositeGlyph {
            bbox: Bbox {
                x_min: glyph.x_min(),
                y_min: glyph.y_min(),
                x_max: glyph.x_max(),
                y_max: glyph.y_max(),
            },
            components: glyph.components().collect(),
            instructions: glyph.instructions().unwrap_or_default().to_vec(),
        }
    }

    /// Set the TrueType instructions for this glyph.
    pub fn with_instructions(mut self, instructions: impl Into<Vec<u8>>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Mutable access to the components, for moving them.
    pub fn components_mut(&mut self) -> &mut [Component] {
        &mut self.components
    }

    pub fn instructions(&self) -> &[u8] {
        &self.instructions
    }
}

fn anchor_flags(anchor: &Anchor) -> u16 {
    match *anchor {
        Anchor::Offset { x, y } => {
            let fits_i8 = |v: i16| (i8::MIN as i16..=i8::MAX as i16).contains(&v);
            let words = if fits_i8(x) && fits_i8(y) {
                0
            } else {
                CompositeGlyphFlags::ARG_1_AND_2_ARE_WORDS
            };
            CompositeGlyphFlags::ARGS_ARE_XY_VALUES | words
        }
        Anchor::Point { base, component } => {
            if base > u8::MAX as u16 || component > u8::MAX as u16 {
                CompositeGlyphFlags::ARG_1_AND_2_ARE_WORDS
            } else {
                0
            }
        }
    }
}

fn transform_flags(transform: &Transform) -> u16 {
    if transform.yx != F2Dot14::ZERO || transform.xy != F2Dot14::ZERO {
        CompositeGlyphFlags::WE_HAVE_A_TWO_BY_TWO
    } else if transform.xx != transform.yy {
        CompositeGlyphFlags::WE_HAVE_AN_X_AND_Y_SCALE
    } else if transform.xx != F2Dot14::ONE {
        CompositeGlyphFlags::WE_HAVE_A_SCALE
    } else {
        0
    }
}

/// Write a component, with the flags that depend on its position in the glyph.
fn write_component(component: &Component, writer: &mut TableWriter, extra_flags: u16) {
    let anchor = anchor_flags(&component.anchor);
    let transform = transform_flags(&component.transform);
    let flags = (component.flags.bits() & PRESERVED_FLAGS) | anchor | transform | extra_flags;
    flags.write_into(writer);
    component.glyph.write_into(writer);

    let words = anchor & CompositeGlyphFlags::ARG_1_AND_2_ARE_WORDS != 0;
    match component.anchor {
        Anchor::Offset { x, y } if !words => [x as i8, y as i8].write_into(writer),
        Anchor::Offset { x, y } => [x, y].write_into(writer),
        Anchor::Point { base, component } if !words => {
            [base as u8, component as u8].write_into(writer)
        }
        Anchor::Point { base, component } => [base, component].write_into(writer),
    }

    let Transform { xx, yx, xy, yy } = component.transform;
    match transform {
        CompositeGlyphFlags::WE_HAVE_A_TWO_BY_TWO => [xx, yx, xy, yy].write_into(writer),
        CompositeGlyphFlags::WE_HAVE_AN_X_AND_Y_SCALE => [xx, yy].write_into(writer),
        CompositeGlyphFlags::WE_HAVE_A_SCALE => xx.write_into(writer),
        _ => (),
    }
}

impl FontWrite for CompositeGlyph {
    fn write_into(&self, writer: &mut TableWriter) {
        const N_CONTOURS: i16 = -1;
        let Some((last, rest)) = self.components.split_last() else {
            return;
        };
        N_CONTOURS.write_into(writer);
        self.bbox.write_into(writer);
        for comp in rest {
            write_component(comp, writer, CompositeGlyphFlags::MORE_COMPONENTS);
        }
        let last_flags = if self.instructions.is_empty() {
            0
        } else {
            CompositeGlyphFlags::WE_HAVE_INSTRUCTIONS
        };
        write_component(last, writer, last_flags);

        if !self.instructions.is_empty() {
            (self.instructions.len() as u16).write_into(writer);
            self.instructions.write_into(writer);
        }
        writer.pad_to_2byte_aligned();
    }

    fn validate(&self) -> Result<(), Error> {
        if self.components.is_empty() {
            return Err(Error::InvalidTable("composite glyph must have components"));
        }
        if self.instructions.len() > u16::MAX as usize {
            return Err(Error::ValueOutOfRange("instructions len overflows"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use read::{FontData, FontRead};
    use types::GlyphId;

    fn component(glyph: u16, anchor: Anchor, transform: Transform, flags: u16) -> Component {
        Component {
            flags: CompositeGlyphFlags::from_bits(flags),
            glyph: GlyphId::new(glyph),
            anchor,
            transform,
        }
    }

    fn read_back(glyph: &CompositeGlyph) -> Vec<Component> {
        let bytes = crate::dump_table(glyph).unwrap();
        let read_glyf::Glyph::Composite(read) =
            read_glyf::Glyph::read(FontData::new(&bytes)).unwrap()
        else {
            panic!("expected composite glyph");
        };
        read.components().collect()
    }

    #[test]
    fn flags_are_recomputed() {
        let bbox = Bbox {
            x_min: 0,
            y_min: 0,
            x_max: 700,
            y_max: 700,
        };
        let half = F2Dot14::from_f64(0.5);
        // stale flags from a source glyph must not leak into the output
        let stale = CompositeGlyphFlags::ARG_1_AND_2_ARE_WORDS
            | CompositeGlyphFlags::WE_HAVE_A_SCALE
            | CompositeGlyphFlags::USE_MY_METRICS;
        let mut glyph = CompositeGlyph::new(
            component(1, Anchor::Offset { x: 10, y: -20 }, Transform::default(), stale),
            bbox,
        );
        glyph.add_component(
            component(
                2,
                Anchor::Offset { x: 300, y: 0 },
                Transform {
                    xx: half,
                    yy: half,
                    ..Default::default()
                },
                0,
            ),
            bbox,
        );
        let glyph = glyph.with_instructions(vec![1, 2, 3]);

        let components = read_back(&glyph);
        assert_eq!(components.len(), 2);
        assert_eq!(
            components[0].flags.bits(),
            CompositeGlyphFlags::ARGS_ARE_XY_VALUES
                | CompositeGlyphFlags::USE_MY_METRICS
                | CompositeGlyphFlags::MORE_COMPONENTS
        );
        assert_eq!(components[0].anchor, Anchor::Offset { x: 10, y: -20 });
        assert_eq!(
            components[1].flags.bits(),
            CompositeGlyphFlags::ARGS_ARE_XY_VALUES
                | CompositeGlyphFlags::ARG_1_AND_2_ARE_WORDS
                | CompositeGlyphFlags::WE_HAVE_A_SCALE
                | CompositeGlyphFlags::WE_HAVE_INSTRUCTIONS
        );
        assert_eq!(components[1].anchor, Anchor::Offset { x: 300, y: 0 });
        assert_eq!(components[1].transform.xx, half);
        assert_eq!(components[1].transform.yy, half);
    }

    #[test]
    fn round_trip_from_read() {
        let glyph = CompositeGlyph::new(
            component(
                3,
                Anchor::Point {
                    base: 4,
                    component: 300,
                },
                Transform {
                    xx: F2Dot14::ONE,
                    yx: F2Dot14::from_f64(0.25),
                    xy: F2Dot14::ZERO,
                    yy: F2Dot14::ONE,
                },
                0,
            ),
            Bbox::default(),
        );
        let bytes = crate::dump_table(&glyph).unwrap();
        let read_glyf::Glyph::Composite(read) =
            read_glyf::Glyph::read(FontData::new(&bytes)).unwrap()
        else {
            panic!("expected composite glyph");
        };
        let owned = CompositeGlyph::from_read(&read);
        assert_eq!(owned.components()[0].anchor, glyph.components()[0].anchor);
        assert_eq!(owned.components()[0].transform, glyph.components()[0].transform);
        assert_eq!(crate::dump_table(&owned).unwrap(), bytes);
    }

    #[test]
    fn empty_composite_is_invalid() {
        let mut glyph = CompositeGlyph::new(
            component(1, Anchor::Offset { x: 0, y: 0 }, Transform::default(), 0),
            Bbox::default(),
        );
        glyph.components.clear();
        assert!(crate::dump_table(&glyph).is_err());
    }
}
