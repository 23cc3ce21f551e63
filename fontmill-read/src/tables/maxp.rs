//! The [maxp](https://docs.microsoft.com/en-us/typography/opentype/spec/maxp) table

use types::Tag;

use crate::{FontData, FontRead, ReadError, TopLevelTable};

/// The [maxp](https://docs.microsoft.com/en-us/typography/opentype/spec/maxp)
/// (maximum profile) table.
#[derive(Clone, Copy, Debug)]
pub struct Maxp<'a> {
    data: FontData<'a>,
}

impl TopLevelTable for Maxp<'_> {
    const TAG: Tag = Tag::new(b"maxp");
}

impl Maxp<'_> {
    pub const VERSION_0_5: u32 = 0x0000_5000;
    pub const VERSION_1_0: u32 = 0x0001_0000;

    pub fn version(&self) -> u32 {
        self.data.read_at(0).unwrap_or_default()
    }

    /// The number of glyphs in the font.
    pub fn num_glyphs(&self) -> u16 {
        self.data.read_at(4).unwrap_or_default()
    }

    /// Maximum levels of recursion; 1 for simple components.
    ///
    /// Only present in version 1.0.
    pub fn max_component_depth(&self) -> Option<u16> {
        (self.version() == Self::VERSION_1_0)
            .then(|| self.data.read_at(30).ok())
            .flatten()
    }
}

impl<'a> FontRead<'a> for Maxp<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let version: u32 = data.read_at(0)?;
        let len = match version {
            Self::VERSION_0_5 => 6,
            Self::VERSION_1_0 => 32,
            other => return Err(ReadError::InvalidFormat(other as _)),
        };
        data.check_in_bounds(len)?;
        Ok(Maxp { data })
    }
}
