//! The [fvar (Font Variations)](https://docs.microsoft.com/en-us/typography/opentype/spec/fvar) table

use types::{BigEndian, Fixed, FixedSize, NameId, Tag};

use crate::{FontData, FontRead, ReadError, TopLevelTable};

/// The [fvar](https://docs.microsoft.com/en-us/typography/opentype/spec/fvar)
/// table.
#[derive(Clone, Copy, Debug)]
pub struct Fvar<'a> {
    data: FontData<'a>,
    axes: &'a [VariationAxisRecord],
}

impl TopLevelTable for Fvar<'_> {
    const TAG: Tag = Tag::new(b"fvar");
}

impl<'a> FontRead<'a> for Fvar<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let major_version: u16 = cursor.read()?;
        if major_version != 1 {
            return Err(ReadError::InvalidFormat(major_version as _));
        }
        cursor.advance::<u16>();
        let axes_array_offset: u16 = cursor.read()?;
        cursor.advance::<u16>();
        let axis_count: u16 = cursor.read()?;
        let axis_size: u16 = cursor.read()?;
        if axis_size as usize != VariationAxisRecord::RAW_BYTE_LEN {
            return Err(ReadError::MalformedData("unexpected fvar axis size"));
        }
        if axes_array_offset == 0 {
            return Err(ReadError::NullOffset);
        }
        let start = axes_array_offset as usize;
        let end = start + axis_count as usize * VariationAxisRecord::RAW_BYTE_LEN;
        let axes = data.read_array(start..end)?;
        Ok(Fvar { data, axes })
    }
}

impl<'a> Fvar<'a> {
    pub fn axis_count(&self) -> u16 {
        self.data.read_at(8).unwrap_or_default()
    }

    pub fn instance_count(&self) -> u16 {
        self.data.read_at(12).unwrap_or_default()
    }

    /// The variation axis records, in font order.
    pub fn axes(&self) -> &'a [VariationAxisRecord] {
        self.axes
    }

    pub fn offset_data(&self) -> FontData<'a> {
        self.data
    }
}

/// Shim for the variation axis record.
#[derive(Clone, Copy, Debug, bytemuck::AnyBitPattern)]
#[repr(C, packed)]
pub struct VariationAxisRecord {
    /// Tag identifying the design variation for the axis.
    pub axis_tag: BigEndian<Tag>,
    /// The minimum coordinate value for the axis.
    pub min_value: BigEndian<Fixed>,
    /// The default coordinate value for the axis.
    pub default_value: BigEndian<Fixed>,
    /// The maximum coordinate value for the axis.
    pub max_value: BigEndian<Fixed>,
    /// Axis qualifiers.
    pub flags: BigEndian<u16>,
    /// The name ID for entries in the 'name' table that provide a display
    /// name for this axis.
    pub axis_name_id: BigEndian<NameId>,
}

impl FixedSize for VariationAxisRecord {
    const RAW_BYTE_LEN: usize = 20;
}

impl VariationAxisRecord {
    /// The axis should not be exposed directly in user interfaces.
    pub const HIDDEN_AXIS: u16 = 0x0001;

    pub fn axis_tag(&self) -> Tag {
        self.axis_tag.get()
    }

    pub fn min_value(&self) -> Fixed {
        self.min_value.get()
    }

    pub fn default_value(&self) -> Fixed {
        self.default_value.get()
    }

    pub fn max_value(&self) -> Fixed {
        self.max_value.get()
    }

    pub fn flags(&self) -> u16 {
        self.flags.get()
    }

    pub fn axis_name_id(&self) -> NameId {
        self.axis_name_id.get()
    }

    pub fn is_hidden(&self) -> bool {
        self.flags() & Self::HIDDEN_AXIS != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fontmill_test_data::bebuffer::BeBuffer;

    #[test]
    fn read_axes() {
        let buf = BeBuffer::new()
            .extend([1u16, 0, 16, 2, 2, 20, 0, 0])
            .push(Tag::new(b"wght"))
            .extend([100i32 << 16, 400 << 16, 900 << 16])
            .extend([0u16, 256])
            .push(Tag::new(b"wdth"))
            .extend([75i32 << 16, 100 << 16, 100 << 16])
            .extend([1u16, 257]);
        let fvar = Fvar::read(FontData::new(&buf)).unwrap();
        assert_eq!(fvar.axis_count(), 2);
        let axes = fvar.axes();
        assert_eq!(axes[0].axis_tag(), Tag::new(b"wght"));
        assert_eq!(axes[0].min_value(), Fixed::from_f64(100.0));
        assert_eq!(axes[0].default_value(), Fixed::from_f64(400.0));
        assert_eq!(axes[0].max_value(), Fixed::from_f64(900.0));
        assert!(!axes[0].is_hidden());
        assert_eq!(axes[1].axis_tag(), Tag::new(b"wdth"));
        assert!(axes[1].is_hidden());
        assert_eq!(axes[1].axis_name_id(), NameId::new(257));
    }

    #[test]
    fn bad_axis_size() {
        let buf = BeBuffer::new().extend([1u16, 0, 16, 2, 1, 24, 0, 0]);
        assert!(Fvar::read(FontData::new(&buf)).is_err());
    }
}
