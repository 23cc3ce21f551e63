//! Axes of variation and conversion between coordinate spaces.

use fontmill_read::{tables::avar::Avar, FontRef, ReadError, TableProvider};
use fontmill_types::Tag;

use crate::{
    location::{Location, Space},
    Error,
};

const FVAR: Tag = Tag::new(b"fvar");
const AVAR: Tag = Tag::new(b"avar");

/// A single axis of variation, in design units.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Axis {
    tag: Tag,
    min: f64,
    default: f64,
    max: f64,
}

impl Axis {
    /// Create an axis, checking that `min <= default <= max`.
    pub fn new(tag: Tag, min: f64, default: f64, max: f64) -> Result<Self, Error> {
        let axis = Axis {
            tag,
            min,
            default,
            max,
        };
        let finite = [min, default, max].iter().all(|v| v.is_finite());
        if !finite || min > default || default > max {
            return Err(axis.degenerate());
        }
        Ok(axis)
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn default(&self) -> f64 {
        self.default
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Clip a design coordinate to the axis range.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Map a design coordinate to `-1..=1`, with the default at `0`.
    ///
    /// The value is clipped to the axis range first.
    pub fn normalize(&self, value: f64) -> Result<f64, Error> {
        let value = self.clamp(value);
        if value == self.default {
            return Ok(0.0);
        }
        let range = if value < self.default {
            self.default - self.min
        } else {
            self.max - self.default
        };
        if range == 0.0 {
            return Err(self.degenerate());
        }
        Ok((value - self.default) / range)
    }

    /// The design coordinate for a normalized one.
    pub fn denormalize(&self, normalized: f64) -> f64 {
        let normalized = normalized.clamp(-1.0, 1.0);
        if normalized < 0.0 {
            self.default + normalized * (self.default - self.min)
        } else {
            self.default + normalized * (self.max - self.default)
        }
    }

    /// The design coordinate for a scaled one, where `-1` is the minimum and
    /// `1` the maximum.
    pub fn from_scaled(&self, scaled: f64) -> f64 {
        let scaled = scaled.clamp(-1.0, 1.0);
        self.min + (scaled + 1.0) / 2.0 * (self.max - self.min)
    }

    fn degenerate(&self) -> Error {
        Error::DegenerateAxis {
            tag: self.tag,
            min: self.min,
            default: self.default,
            max: self.max,
        }
    }
}

/// Round to the precision kept for design coordinates derived from
/// normalized or scaled ones.
fn round_design(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// The axes declared by a font, in `fvar` order.
///
/// A static font has an empty table.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AxisTable {
    axes: Vec<Axis>,
}

impl AxisTable {
    pub fn new(axes: Vec<Axis>) -> Self {
        AxisTable { axes }
    }

    /// Read the axes from `fvar`.
    pub fn from_font(font: &FontRef) -> Result<Self, Error> {
        let fvar = match font.fvar() {
            Ok(fvar) => fvar,
            Err(ReadError::TableIsMissing(_)) => return Ok(Self::default()),
            Err(e) => return Err(Error::corrupt(FVAR, e)),
        };
        fvar.axes()
            .iter()
            .map(|record| {
                Axis::new(
                    record.axis_tag(),
                    record.min_value().to_f64(),
                    record.default_value().to_f64(),
                    record.max_value().to_f64(),
                )
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Axis> + '_ {
        self.axes.iter()
    }

    pub fn get(&self, tag: Tag) -> Option<&Axis> {
        self.axes.iter().find(|axis| axis.tag == tag)
    }

    fn expect(&self, tag: Tag) -> Result<&Axis, Error> {
        self.get(tag).ok_or(Error::UnknownAxis(tag))
    }

    /// The location of every axis default, in design units.
    pub fn defaults(&self) -> Location {
        Location::raw(self.axes.iter().map(|axis| (axis.tag, axis.default)))
    }

    /// Convert a location in any space to a normalized location holding
    /// every axis of the table.
    ///
    /// Axes missing from the input are at their default (`0`). A tag the
    /// font does not declare is an error.
    pub fn normalize(&self, location: &Location) -> Result<Location, Error> {
        let mut result = Location::normalized(self.axes.iter().map(|axis| (axis.tag, 0.0)));
        for (tag, value) in location.iter() {
            let axis = self.expect(tag)?;
            let normalized = match location.space() {
                Space::Raw => axis.normalize(value)?,
                Space::Scaled => axis.normalize(axis.from_scaled(value))?,
                Space::Normalized => value.clamp(-1.0, 1.0),
            };
            result.insert(tag, normalized);
        }
        Ok(result)
    }

    /// Convert a location in any space to design units, clipped to each
    /// axis range.
    ///
    /// Raw values are only clipped. Values converted from the other spaces
    /// are rounded to four decimals, so that `0.3` of the way along an axis
    /// is `550` and not `550.0000000000001`.
    ///
    /// Only the axes present in the input appear in the result.
    pub fn denormalize(&self, location: &Location) -> Result<Location, Error> {
        location
            .iter()
            .map(|(tag, value)| {
                let axis = self.expect(tag)?;
                let raw = match location.space() {
                    Space::Raw => axis.clamp(value),
                    Space::Scaled => round_design(axis.from_scaled(value)),
                    Space::Normalized => round_design(axis.denormalize(value)),
                };
                Ok((tag, raw))
            })
            .collect::<Result<Vec<_>, Error>>()
            .map(Location::raw)
    }

    /// Clip the values of known axes to their range; other values are
    /// kept as they are.
    pub fn constrain(&self, location: &Location) -> Location {
        Location::with_values(
            location.space(),
            location.iter().map(|(tag, value)| match self.get(tag) {
                Some(axis) if location.space() == Space::Raw => (tag, axis.clamp(value)),
                Some(_) => (tag, value.clamp(-1.0, 1.0)),
                None => (tag, value),
            }),
        )
    }

    /// The coordinates of a normalized location, in axis order.
    pub fn coords(&self, normalized: &Location) -> Vec<f64> {
        self.axes
            .iter()
            .map(|axis| normalized.get(axis.tag).unwrap_or_default())
            .collect()
    }

    /// Remap normalized coordinates through the `avar` segment maps.
    pub fn apply_avar(&self, avar: &Avar, coords: &mut [f64]) -> Result<(), Error> {
        let maps = avar.axis_segment_maps();
        if maps.len() != self.axes.len() || coords.len() != maps.len() {
            return Err(Error::corrupt(
                AVAR,
                format!("{} segment maps for {} axes", maps.len(), self.axes.len()),
            ));
        }
        for (i, (map, coord)) in maps.iter().zip(coords.iter_mut()).enumerate() {
            if !map.is_well_formed() {
                return Err(Error::corrupt(AVAR, format!("malformed map for axis {i}")));
            }
            *coord = map.apply(*coord);
        }
        Ok(())
    }
}
