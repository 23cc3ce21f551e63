//! The [hmtx (Horizontal Metrics)](https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx) table

use read::TopLevelTable;
use types::Tag;

use crate::{FontWrite, TableWriter};

/// A paired advance width and left side bearing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LongMetric {
    pub advance: u16,
    pub side_bearing: i16,
}

impl LongMetric {
    pub fn new(advance: u16, side_bearing: i16) -> Self {
        Self {
            advance,
            side_bearing,
        }
    }
}

impl FontWrite for LongMetric {
    fn write_into(&self, writer: &mut TableWriter) {
        self.advance.write_into(writer);
        self.side_bearing.write_into(writer);
    }
}

/// The [hmtx](https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx) table,
/// with one long metric for every glyph.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Hmtx {
    pub h_metrics: Vec<LongMetric>,
}

impl TopLevelTable for Hmtx {
    const TAG: Tag = Tag::new(b"hmtx");
}

impl Hmtx {
    pub fn new(h_metrics: Vec<LongMetric>) -> Self {
        Self { h_metrics }
    }

    /// The value for `hhea.numberOfHMetrics`.
    pub fn number_of_h_metrics(&self) -> u16 {
        self.h_metrics.len() as u16
    }

    /// The value for `hhea.advanceWidthMax`.
    pub fn advance_width_max(&self) -> u16 {
        self.h_metrics
            .iter()
            .map(|metric| metric.advance)
            .max()
            .unwrap_or_default()
    }
}

impl FontWrite for Hmtx {
    fn write_into(&self, writer: &mut TableWriter) {
        self.h_metrics.write_into(writer)
    }

    fn validate(&self) -> Result<(), crate::Error> {
        if self.h_metrics.len() > u16::MAX as usize {
            return Err(crate::Error::ValueOutOfRange("too many metrics"));
        }
        Ok(())
    }
}
