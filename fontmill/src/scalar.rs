//! Weighting a variation record at a location.

use fontmill_read::tables::variations::TupleVariation;

/// The tent function of one axis: zero at `start` and `end`, one at `peak`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisSupport {
    pub start: f64,
    pub peak: f64,
    pub end: f64,
}

impl AxisSupport {
    /// The default support for a peak without explicit intermediates.
    pub fn from_peak(peak: f64) -> Self {
        AxisSupport {
            start: peak.min(0.0),
            peak,
            end: peak.max(0.0),
        }
    }

    /// The weight of this axis at `coord`.
    ///
    /// Supports that are out of order or that straddle zero carry no
    /// information and weigh `1`.
    pub fn weight(&self, coord: f64) -> f64 {
        let AxisSupport { start, peak, end } = *self;
        if peak == 0.0 || coord == peak {
            return 1.0;
        }
        if start > peak || peak > end || (start < 0.0 && end > 0.0) {
            return 1.0;
        }
        if coord <= start || coord >= end {
            return 0.0;
        }
        if coord < peak {
            (coord - start) / (peak - start)
        } else {
            (end - coord) / (end - peak)
        }
    }
}

/// The region of the design space over which a variation record applies.
///
/// Axes that are not listed have full support.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SupportRegion {
    axes: Vec<(usize, AxisSupport)>,
}

impl SupportRegion {
    pub fn new(axes: impl IntoIterator<Item = (usize, AxisSupport)>) -> Self {
        SupportRegion {
            axes: axes.into_iter().collect(),
        }
    }

    /// The region described by a tuple variation header.
    pub fn from_tuple(tuple: &TupleVariation, axis_count: usize) -> Self {
        let peak = tuple.peak();
        let intermediate = tuple.intermediate_start().zip(tuple.intermediate_end());
        let axes = (0..axis_count).filter_map(|i| {
            let peak_value = peak.get(i)?.to_f64();
            if peak_value == 0.0 {
                return None;
            }
            let support = match intermediate {
                Some((start, end)) => AxisSupport {
                    start: start.get(i)?.to_f64(),
                    peak: peak_value,
                    end: end.get(i)?.to_f64(),
                },
                None => AxisSupport::from_peak(peak_value),
            };
            Some((i, support))
        });
        Self::new(axes)
    }

    pub fn axes(&self) -> &[(usize, AxisSupport)] {
        &self.axes
    }

    /// The weight of the region at a normalized location given in axis
    /// order, in `0..=1`.
    pub fn scalar(&self, coords: &[f64]) -> f64 {
        let mut scalar = 1.0;
        for (axis, support) in &self.axes {
            let coord = coords.get(*axis).copied().unwrap_or_default();
            let weight = support.weight(coord);
            if weight == 0.0 {
                return 0.0;
            }
            scalar *= weight;
        }
        scalar
    }
}

/// Round half up, the way OpenType tools round coordinates.
pub(crate) fn ot_round(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round to the nearest `i16`, or `None` if it does not fit.
pub(crate) fn round_i16(value: f64) -> Option<i16> {
    let rounded = ot_round(value);
    (i16::MIN as f64..=i16::MAX as f64)
        .contains(&rounded)
        .then_some(rounded as i16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(62.5, 63.0)]
    #[case(-15.75, -16.0)]
    #[case(-0.5, 0.0)]
    #[case(7.5, 8.0)]
    fn rounds_half_up(#[case] value: f64, #[case] expected: f64) {
        assert_eq!(ot_round(value), expected);
    }

    #[test]
    fn round_to_i16_range() {
        assert_eq!(round_i16(32767.4), Some(i16::MAX));
        assert_eq!(round_i16(32767.5), None);
        assert_eq!(round_i16(-32768.5), Some(i16::MIN));
        assert_eq!(round_i16(f64::NAN), None);
    }

    #[rstest]
    #[case(1.0, 1.0)]
    #[case(0.5, 0.5)]
    #[case(0.0, 0.0)]
    #[case(-0.5, 0.0)]
    fn positive_peak(#[case] coord: f64, #[case] expected: f64) {
        let region = SupportRegion::new([(0, AxisSupport::from_peak(1.0))]);
        assert_eq!(region.scalar(&[coord]), expected);
    }

    #[test]
    fn intermediate_region() {
        let support = AxisSupport {
            start: 0.2,
            peak: 0.6,
            end: 1.0,
        };
        let region = SupportRegion::new([(0, support)]);
        assert_eq!(region.scalar(&[0.1]), 0.0);
        assert!((region.scalar(&[0.4]) - 0.5).abs() < 1e-9);
        assert!((region.scalar(&[0.8]) - 0.5).abs() < 1e-9);
        assert_eq!(region.scalar(&[1.0]), 0.0);
    }

    #[test]
    fn product_across_axes() {
        let region = SupportRegion::new([
            (0, AxisSupport::from_peak(1.0)),
            (1, AxisSupport::from_peak(-1.0)),
        ]);
        assert_eq!(region.scalar(&[0.5, -0.5]), 0.25);
        // outside on one axis short-circuits
        assert_eq!(region.scalar(&[0.5, 0.5]), 0.0);
    }

    #[test]
    fn unlisted_axes_have_full_support() {
        let region = SupportRegion::new([(1, AxisSupport::from_peak(1.0))]);
        assert_eq!(region.scalar(&[-1.0, 1.0]), 1.0);
        assert_eq!(SupportRegion::default().scalar(&[0.3, 0.7]), 1.0);
    }

    #[test]
    fn ill_formed_support_is_ignored() {
        let straddles_zero = AxisSupport {
            start: -0.5,
            peak: 0.5,
            end: 1.0,
        };
        assert_eq!(straddles_zero.weight(-0.2), 1.0);
        let out_of_order = AxisSupport {
            start: 0.8,
            peak: 0.5,
            end: 1.0,
        };
        assert_eq!(out_of_order.weight(0.1), 1.0);
    }
}
