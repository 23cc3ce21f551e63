use types::{F2Dot14, Fixed, GlyphId, NameId, Tag};

use crate::error::Error;

/// A type that that can be written out as part of a font file.
pub trait FontWrite {
    /// Write our data into this [TableWriter].
    fn write_into(&self, writer: &mut TableWriter);

    /// Check that the object can be written.
    ///
    /// The default implementation accepts everything.
    fn validate(&self) -> Result<(), Error> {
        Ok(())
    }
}

/// A buffer of big-endian bytes for a table being serialized.
#[derive(Debug, Default, Clone)]
pub struct TableWriter {
    data: Vec<u8>,
}

/// Attempt to serialize a table.
///
/// If the table is malformed, this returns the validation error, otherwise
/// it returns the bytes encoding the table.
pub fn dump_table<T: FontWrite + ?Sized>(table: &T) -> Result<Vec<u8>, Error> {
    table.validate()?;
    let mut writer = TableWriter::default();
    table.write_into(&mut writer);
    Ok(writer.into_data())
}

impl TableWriter {
    /// Write raw bytes into this table.
    ///
    /// The caller is responsible for ensuring bytes are in big-endian order.
    #[inline]
    pub fn write_slice(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes)
    }

    /// The number of bytes written so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn pad_to_2byte_aligned(&mut self) {
        if self.data.len() % 2 != 0 {
            self.data.push(0);
        }
    }

    pub fn pad_to_4byte_aligned(&mut self) {
        while self.data.len() % 4 != 0 {
            self.data.push(0);
        }
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

macro_rules! write_be_bytes {
    ($ty:ty) => {
        impl FontWrite for $ty {
            #[inline]
            fn write_into(&self, writer: &mut TableWriter) {
                writer.write_slice(&self.to_be_bytes())
            }
        }
    };
}

write_be_bytes!(u8);
write_be_bytes!(i8);
write_be_bytes!(u16);
write_be_bytes!(i16);
write_be_bytes!(u32);
write_be_bytes!(i32);

macro_rules! write_scalar {
    ($ty:ty) => {
        impl FontWrite for $ty {
            #[inline]
            fn write_into(&self, writer: &mut TableWriter) {
                writer.write_slice(types::Scalar::to_raw(*self).as_ref())
            }
        }
    };
}

write_scalar!(F2Dot14);
write_scalar!(Fixed);
write_scalar!(Tag);
write_scalar!(GlyphId);
write_scalar!(NameId);

impl<T: FontWrite> FontWrite for [T] {
    fn write_into(&self, writer: &mut TableWriter) {
        self.iter().for_each(|item| item.write_into(writer))
    }
}

impl<T: FontWrite, const N: usize> FontWrite for [T; N] {
    fn write_into(&self, writer: &mut TableWriter) {
        self.iter().for_each(|item| item.write_into(writer))
    }
}

impl<T: FontWrite> FontWrite for Vec<T> {
    fn write_into(&self, writer: &mut TableWriter) {
        self.iter().for_each(|item| item.write_into(writer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_are_big_endian() {
        let mut writer = TableWriter::default();
        0x1234u16.write_into(&mut writer);
        (-2i16).write_into(&mut writer);
        Tag::new(b"wght").write_into(&mut writer);
        F2Dot14::ONE.write_into(&mut writer);
        [1u8, 2, 3].write_into(&mut writer);
        writer.pad_to_4byte_aligned();
        assert_eq!(
            writer.into_data(),
            vec![0x12, 0x34, 0xFF, 0xFE, b'w', b'g', b'h', b't', 0x40, 0x00, 1, 2, 3, 0, 0, 0]
        );
    }
}
