//! The [glyf (Glyph Data)](https://docs.microsoft.com/en-us/typography/opentype/spec/glyf) table

use types::{BigEndian, F2Dot14, GlyphId, Point, Scalar, Tag};

use crate::{tables::loca::Loca, Cursor, FontData, FontRead, ReadError, TopLevelTable};

/// The [glyf](https://docs.microsoft.com/en-us/typography/opentype/spec/glyf)
/// table.
#[derive(Clone, Copy, Debug)]
pub struct Glyf<'a> {
    data: FontData<'a>,
}

impl TopLevelTable for Glyf<'_> {
    const TAG: Tag = Tag::new(b"glyf");
}

impl<'a> FontRead<'a> for Glyf<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        Ok(Glyf { data })
    }
}

impl<'a> Glyf<'a> {
    /// Return the glyph for `glyph_id`, or `None` if it has no outline.
    pub fn glyph(&self, loca: &Loca, glyph_id: GlyphId) -> Result<Option<Glyph<'a>>, ReadError> {
        let Some(range) = loca.glyph_range(glyph_id)? else {
            return Ok(None);
        };
        let data = self.data.slice(range).ok_or(ReadError::OutOfBounds)?;
        Glyph::read(data).map(Some)
    }

    pub fn offset_data(&self) -> FontData<'a> {
        self.data
    }
}

/// Flags for a point in a simple glyph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimpleGlyphFlags(u8);

impl SimpleGlyphFlags {
    pub const ON_CURVE_POINT: u8 = 0x01;
    pub const X_SHORT_VECTOR: u8 = 0x02;
    pub const Y_SHORT_VECTOR: u8 = 0x04;
    pub const REPEAT_FLAG: u8 = 0x08;
    pub const X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR: u8 = 0x10;
    pub const Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR: u8 = 0x20;
    pub const OVERLAP_SIMPLE: u8 = 0x40;

    pub fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, flag: u8) -> bool {
        self.0 & flag == flag
    }

    pub fn is_on_curve(self) -> bool {
        self.contains(Self::ON_CURVE_POINT)
    }
}

/// Flags for a component of a composite glyph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CompositeGlyphFlags(u16);

impl CompositeGlyphFlags {
    pub const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
    pub const ARGS_ARE_XY_VALUES: u16 = 0x0002;
    pub const ROUND_XY_TO_GRID: u16 = 0x0004;
    pub const WE_HAVE_A_SCALE: u16 = 0x0008;
    pub const MORE_COMPONENTS: u16 = 0x0020;
    pub const WE_HAVE_AN_X_AND_Y_SCALE: u16 = 0x0040;
    pub const WE_HAVE_A_TWO_BY_TWO: u16 = 0x0080;
    pub const WE_HAVE_INSTRUCTIONS: u16 = 0x0100;
    pub const USE_MY_METRICS: u16 = 0x0200;
    pub const OVERLAP_COMPOUND: u16 = 0x0400;
    pub const SCALED_COMPONENT_OFFSET: u16 = 0x0800;
    pub const UNSCALED_COMPONENT_OFFSET: u16 = 0x1000;

    pub fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn contains(self, flag: u16) -> bool {
        self.0 & flag == flag
    }
}

impl Scalar for CompositeGlyphFlags {
    type Raw = <u16 as Scalar>::Raw;
    fn to_raw(self) -> Self::Raw {
        self.0.to_raw()
    }
    fn from_raw(raw: Self::Raw) -> Self {
        Self(u16::from_raw(raw))
    }
}

/// A glyph outline: either simple contours or a list of components.
#[derive(Clone, Debug)]
pub enum Glyph<'a> {
    Simple(SimpleGlyph<'a>),
    Composite(CompositeGlyph<'a>),
}

macro_rules! field_getter {
    ($field:ident, $ty:ty) => {
        pub fn $field(&self) -> $ty {
            match self {
                Self::Simple(table) => table.header.$field,
                Self::Composite(table) => table.header.$field,
            }
        }
    };
}

macro_rules! header_getters {
    ($($field:ident),*) => {
        $(
            pub fn $field(&self) -> i16 {
                self.header.$field
            }
        )*
    };
}

impl Glyph<'_> {
    field_getter!(number_of_contours, i16);
    field_getter!(x_min, i16);
    field_getter!(y_min, i16);
    field_getter!(x_max, i16);
    field_getter!(y_max, i16);
}

impl<'a> FontRead<'a> for Glyph<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let header = GlyphHeader::read(data)?;
        let rest = data
            .split_off(GlyphHeader::RAW_BYTE_LEN)
            .ok_or(ReadError::OutOfBounds)?;
        if header.number_of_contours >= 0 {
            SimpleGlyph::read(header, rest).map(Glyph::Simple)
        } else {
            Ok(Glyph::Composite(CompositeGlyph {
                header,
                component_data: rest,
            }))
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct GlyphHeader {
    number_of_contours: i16,
    x_min: i16,
    y_min: i16,
    x_max: i16,
    y_max: i16,
}

impl GlyphHeader {
    const RAW_BYTE_LEN: usize = 10;

    fn read(data: FontData) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        Ok(GlyphHeader {
            number_of_contours: cursor.read()?,
            x_min: cursor.read()?,
            y_min: cursor.read()?,
            x_max: cursor.read()?,
            y_max: cursor.read()?,
        })
    }
}

/// A point in a simple glyph, with its on-curve flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CurvePoint {
    pub x: i16,
    pub y: i16,
    pub on_curve: bool,
}

impl CurvePoint {
    pub fn new(x: i16, y: i16, on_curve: bool) -> Self {
        Self { x, y, on_curve }
    }

    pub fn on_curve(x: i16, y: i16) -> Self {
        Self::new(x, y, true)
    }

    pub fn off_curve(x: i16, y: i16) -> Self {
        Self::new(x, y, false)
    }
}

/// A glyph defined by contours of points.
#[derive(Clone, Debug)]
pub struct SimpleGlyph<'a> {
    header: GlyphHeader,
    end_pts_of_contours: &'a [BigEndian<u16>],
    instructions: &'a [u8],
    glyph_data: FontData<'a>,
}

impl<'a> SimpleGlyph<'a> {
    header_getters!(x_min, y_min, x_max, y_max);

    fn read(header: GlyphHeader, data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let end_pts_of_contours = cursor.read_array(header.number_of_contours as usize)?;
        let instruction_length: u16 = cursor.read()?;
        let instructions = cursor.read_bytes(instruction_length as usize)?;
        let glyph_data = cursor.remaining().ok_or(ReadError::OutOfBounds)?;
        Ok(SimpleGlyph {
            header,
            end_pts_of_contours,
            instructions,
            glyph_data,
        })
    }

    /// Array of point indices for the last point of each contour, in
    /// increasing numeric order.
    pub fn end_pts_of_contours(&self) -> &'a [BigEndian<u16>] {
        self.end_pts_of_contours
    }

    /// The TrueType interpreter instructions.
    pub fn instructions(&self) -> &'a [u8] {
        self.instructions
    }

    /// Returns the total number of points.
    pub fn num_points(&self) -> usize {
        self.end_pts_of_contours
            .last()
            .map(|last| last.get() as usize + 1)
            .unwrap_or(0)
    }

    /// `true` if the first point carries the overlapping contours flag.
    pub fn has_overlapping_contours(&self) -> bool {
        self.glyph_data
            .read_at::<u8>(0)
            .map(|flag| SimpleGlyphFlags(flag).contains(SimpleGlyphFlags::OVERLAP_SIMPLE))
            .unwrap_or_default()
    }

    /// Reads points and flags into the provided buffers.
    ///
    /// The lengths of the buffers must be equal to the value returned by
    /// [num_points](Self::num_points).
    pub fn read_points(
        &self,
        points: &mut [Point<i32>],
        flags: &mut [SimpleGlyphFlags],
    ) -> Result<(), ReadError> {
        let n_points = self.num_points();
        if points.len() != n_points || flags.len() != n_points {
            return Err(ReadError::InvalidArrayLen);
        }
        let mut cursor = self.glyph_data.cursor();
        read_flags(&mut cursor, flags)?;
        let mut x = 0i32;
        for (flag, point) in flags.iter().zip(points.iter_mut()) {
            x = x.wrapping_add(read_coord(
                &mut cursor,
                *flag,
                SimpleGlyphFlags::X_SHORT_VECTOR,
                SimpleGlyphFlags::X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR,
            )?);
            point.x = x;
        }
        let mut y = 0i32;
        for (flag, point) in flags.iter().zip(points.iter_mut()) {
            y = y.wrapping_add(read_coord(
                &mut cursor,
                *flag,
                SimpleGlyphFlags::Y_SHORT_VECTOR,
                SimpleGlyphFlags::Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR,
            )?);
            point.y = y;
        }
        Ok(())
    }

    /// Decode all points of the glyph.
    pub fn points(&self) -> Result<Vec<CurvePoint>, ReadError> {
        let n_points = self.num_points();
        let mut points = vec![Point::default(); n_points];
        let mut flags = vec![SimpleGlyphFlags::default(); n_points];
        self.read_points(&mut points, &mut flags)?;
        Ok(points
            .iter()
            .zip(&flags)
            .map(|(point, flag)| CurvePoint::new(point.x as i16, point.y as i16, flag.is_on_curve()))
            .collect())
    }
}

fn read_flags(cursor: &mut Cursor, flags: &mut [SimpleGlyphFlags]) -> Result<(), ReadError> {
    let n_points = flags.len();
    let mut i = 0;
    while i < n_points {
        let flag = SimpleGlyphFlags(cursor.read::<u8>()?);
        if flag.contains(SimpleGlyphFlags::REPEAT_FLAG) {
            let count = (cursor.read::<u8>()? as usize + 1).min(n_points - i);
            for f in &mut flags[i..i + count] {
                *f = flag;
            }
            i += count;
        } else {
            flags[i] = flag;
            i += 1;
        }
    }
    Ok(())
}

fn read_coord(
    cursor: &mut Cursor,
    flag: SimpleGlyphFlags,
    short_vector: u8,
    same_or_positive: u8,
) -> Result<i32, ReadError> {
    Ok(if flag.contains(short_vector) {
        let delta = cursor.read::<u8>()? as i32;
        if flag.contains(same_or_positive) {
            delta
        } else {
            -delta
        }
    } else if flag.contains(same_or_positive) {
        0
    } else {
        cursor.read::<i16>()? as i32
    })
}

/// Transform for a composite component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transform {
    /// X scale factor.
    pub xx: F2Dot14,
    /// YX skew factor.
    pub yx: F2Dot14,
    /// XY skew factor.
    pub xy: F2Dot14,
    /// Y scale factor.
    pub yy: F2Dot14,
}

impl Transform {
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            xx: F2Dot14::ONE,
            yx: F2Dot14::ZERO,
            xy: F2Dot14::ZERO,
            yy: F2Dot14::ONE,
        }
    }
}

/// Anchor position for a composite component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    Offset { x: i16, y: i16 },
    Point { base: u16, component: u16 },
}

/// A reference to another glyph. Part of [CompositeGlyph].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Component {
    /// Component flags.
    pub flags: CompositeGlyphFlags,
    /// Glyph identifier.
    pub glyph: GlyphId,
    /// Anchor for component placement.
    pub anchor: Anchor,
    /// Component transformation matrix.
    pub transform: Transform,
}

/// A glyph built from references to other glyphs.
#[derive(Clone, Debug)]
pub struct CompositeGlyph<'a> {
    header: GlyphHeader,
    component_data: FontData<'a>,
}

impl<'a> CompositeGlyph<'a> {
    header_getters!(x_min, y_min, x_max, y_max);

    /// Returns an iterator over the components of the composite glyph.
    pub fn components(&self) -> impl Iterator<Item = Component> + 'a + Clone {
        ComponentIter {
            cur_flags: CompositeGlyphFlags::default(),
            done: false,
            cursor: self.component_data.cursor(),
        }
    }

    /// Returns the TrueType interpreter instructions.
    pub fn instructions(&self) -> Option<&'a [u8]> {
        ComponentIter {
            cur_flags: CompositeGlyphFlags::default(),
            done: false,
            cursor: self.component_data.cursor(),
        }
        .instructions()
    }
}

#[derive(Clone)]
struct ComponentIter<'a> {
    cur_flags: CompositeGlyphFlags,
    done: bool,
    cursor: Cursor<'a>,
}

impl<'a> ComponentIter<'a> {
    fn instructions(&mut self) -> Option<&'a [u8]> {
        while self.by_ref().next().is_some() {}
        if self
            .cur_flags
            .contains(CompositeGlyphFlags::WE_HAVE_INSTRUCTIONS)
        {
            let len = self.cursor.read::<u16>().ok()? as usize;
            self.cursor.read_bytes(len).ok()
        } else {
            None
        }
    }
}

impl Iterator for ComponentIter<'_> {
    type Item = Component;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let flags: CompositeGlyphFlags = self.cursor.read().ok()?;
        self.cur_flags = flags;
        let glyph = self.cursor.read::<GlyphId>().ok()?;
        let args_are_words = flags.contains(CompositeGlyphFlags::ARG_1_AND_2_ARE_WORDS);
        let args_are_xy_values = flags.contains(CompositeGlyphFlags::ARGS_ARE_XY_VALUES);
        let anchor = match (args_are_xy_values, args_are_words) {
            (true, true) => Anchor::Offset {
                x: self.cursor.read().ok()?,
                y: self.cursor.read().ok()?,
            },
            (true, false) => Anchor::Offset {
                x: self.cursor.read::<i8>().ok()? as _,
                y: self.cursor.read::<i8>().ok()? as _,
            },
            (false, true) => Anchor::Point {
                base: self.cursor.read().ok()?,
                component: self.cursor.read().ok()?,
            },
            (false, false) => Anchor::Point {
                base: self.cursor.read::<u8>().ok()? as _,
                component: self.cursor.read::<u8>().ok()? as _,
            },
        };
        let mut transform = Transform::default();
        if flags.contains(CompositeGlyphFlags::WE_HAVE_A_SCALE) {
            transform.xx = self.cursor.read().ok()?;
            transform.yy = transform.xx;
        } else if flags.contains(CompositeGlyphFlags::WE_HAVE_AN_X_AND_Y_SCALE) {
            transform.xx = self.cursor.read().ok()?;
            transform.yy = self.cursor.read().ok()?;
        } else if flags.contains(CompositeGlyphFlags::WE_HAVE_A_TWO_BY_TWO) {
            transform.xx = self.cursor.read().ok()?;
            transform.yx = self.cursor.read().ok()?;
            transform.xy = self.cursor.read().ok()?;
            transform.yy = self.cursor.read().ok()?;
        }
        self.done = !flags.contains(CompositeGlyphFlags::MORE_COMPONENTS);

        Some(Component {
            flags,
            glyph,
            anchor,
            transform,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fontmill_test_data::bebuffer::BeBuffer;
    use pretty_assertions::assert_eq;

    #[test]
    fn simple_glyph_points() {
        // one triangle: (0,0) on, (100,0) on, (50,-20) off
        let buf = BeBuffer::new()
            .extend([1i16, 0, -20, 100, 0])
            .push(2u16)
            .push(0u16)
            // flags
            .push(0x01u8 | 0x10 | 0x20)
            .push(0x01u8 | 0x02 | 0x10 | 0x20)
            .push(0x02u8 | 0x04)
            // x: point 1 +100 (short positive), point 2 -50 (short negative)
            .push(100u8)
            .push(50u8)
            // y: point 2 -20 (short negative)
            .push(20u8);
        let Glyph::Simple(glyph) = Glyph::read(FontData::new(&buf)).unwrap() else {
            panic!("expected simple glyph");
        };
        assert_eq!(glyph.num_points(), 3);
        assert!(glyph.instructions().is_empty());
        assert_eq!(
            glyph.points().unwrap(),
            vec![
                CurvePoint::on_curve(0, 0),
                CurvePoint::on_curve(100, 0),
                CurvePoint::off_curve(50, -20),
            ]
        );
    }

    #[test]
    fn repeated_flags_and_words() {
        let buf = BeBuffer::new()
            .extend([1i16, 0, 0, 0, 0])
            .push(3u16)
            .push(1u16)
            .push(0xB0u8)
            // same flag (on curve, word coords) for four points
            .push(0x01u8 | 0x08)
            .push(3u8)
            .extend([1000i16, -1000, 0, 500])
            .extend([-300i16, 300, 7, 0]);
        let Glyph::Simple(glyph) = Glyph::read(FontData::new(&buf)).unwrap() else {
            panic!("expected simple glyph");
        };
        assert_eq!(glyph.instructions(), &[0xB0]);
        let xs = glyph.points().unwrap().iter().map(|p| (p.x, p.y)).collect::<Vec<_>>();
        assert_eq!(xs, vec![(1000, -300), (0, 0), (0, 7), (500, 7)]);
    }

    #[test]
    fn composite_components() {
        let flags_a = CompositeGlyphFlags::ARGS_ARE_XY_VALUES
            | CompositeGlyphFlags::MORE_COMPONENTS
            | CompositeGlyphFlags::ARG_1_AND_2_ARE_WORDS;
        let flags_b = CompositeGlyphFlags::ARGS_ARE_XY_VALUES
            | CompositeGlyphFlags::WE_HAVE_A_SCALE
            | CompositeGlyphFlags::WE_HAVE_INSTRUCTIONS;
        let buf = BeBuffer::new()
            .extend([-1i16, 0, 0, 0, 0])
            .push(flags_a)
            .push(3u16)
            .extend([300i16, -2])
            .push(flags_b)
            .push(4u16)
            .extend([5i8, -6])
            .push(F2Dot14::from_f64(0.5))
            .push(2u16)
            .extend([0xAAu8, 0xBB]);
        let Glyph::Composite(glyph) = Glyph::read(FontData::new(&buf)).unwrap() else {
            panic!("expected composite glyph");
        };
        let components = glyph.components().collect::<Vec<_>>();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].glyph, GlyphId::new(3));
        assert_eq!(components[0].anchor, Anchor::Offset { x: 300, y: -2 });
        assert!(components[0].transform.is_identity());
        assert_eq!(components[1].anchor, Anchor::Offset { x: 5, y: -6 });
        assert_eq!(components[1].transform.xx, F2Dot14::from_f64(0.5));
        assert_eq!(components[1].transform.yy, F2Dot14::from_f64(0.5));
        assert_eq!(glyph.instructions(), Some(&[0xAA, 0xBB][..]));
    }
}
