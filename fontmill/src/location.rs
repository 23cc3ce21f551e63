//! Positions in the design space of a variable font.

use std::collections::BTreeMap;

use fontmill_types::Tag;

/// The coordinate system a [`Location`] is expressed in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Space {
    /// Design units, as declared in `fvar` (e.g. `wght` 100..900).
    #[default]
    Raw,
    /// `-1..=1` spread evenly over the axis range, so that `-1` is the
    /// minimum and `1` the maximum, ignoring the default.
    Scaled,
    /// `-1..=1` anchored at the axis default: the default is `0`, the
    /// minimum `-1` and the maximum `1`.
    Normalized,
}

/// A mapping from axis tag to a coordinate in one [`Space`].
///
/// Axes are kept sorted by tag.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    space: Space,
    values: BTreeMap<Tag, f64>,
}

impl Location {
    /// An empty location; every axis is at its default.
    pub fn new(space: Space) -> Self {
        Location {
            space,
            values: BTreeMap::new(),
        }
    }

    pub fn raw(values: impl IntoIterator<Item = (Tag, f64)>) -> Self {
        Self::with_values(Space::Raw, values)
    }

    pub fn scaled(values: impl IntoIterator<Item = (Tag, f64)>) -> Self {
        Self::with_values(Space::Scaled, values)
    }

    pub fn normalized(values: impl IntoIterator<Item = (Tag, f64)>) -> Self {
        Self::with_values(Space::Normalized, values)
    }

    /// Construct a location; if a tag repeats, the last value wins.
    pub fn with_values(space: Space, values: impl IntoIterator<Item = (Tag, f64)>) -> Self {
        Location {
            space,
            values: values.into_iter().collect(),
        }
    }

    pub fn space(&self) -> Space {
        self.space
    }

    pub fn get(&self, tag: Tag) -> Option<f64> {
        self.values.get(&tag).copied()
    }

    pub fn insert(&mut self, tag: Tag, value: f64) -> Option<f64> {
        self.values.insert(tag, value)
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, tag: Tag, value: f64) -> Self {
        self.insert(tag, value);
        self
    }

    /// Iterate `(tag, value)` pairs in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (Tag, f64)> + '_ {
        self.values.iter().map(|(tag, value)| (*tag, *value))
    }

    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.values.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
