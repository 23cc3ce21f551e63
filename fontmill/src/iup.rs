//! Inferring deltas for points a variation record does not reference.
//!
//! See <https://learn.microsoft.com/en-us/typography/opentype/spec/gvar#inferred-deltas-for-un-referenced-point-numbers>

use std::ops::RangeInclusive;

use fontmill_types::Point;

/// Produce a delta for every point, given explicit deltas for some of them.
///
/// `original` holds the coordinates before any variation is applied and
/// `contour_ends` the index of the last point of each contour. Per contour,
/// points between two referenced points are interpolated from the original
/// coordinates of those references, with points beyond them taking the
/// nearer delta. A contour with a single reference moves as a whole; one
/// without any does not move.
///
/// Returns `None` if the inputs disagree in length or the contour ends are
/// not increasing.
pub fn infer_deltas(
    original: &[Point<f64>],
    contour_ends: &[usize],
    deltas: &[Option<Point<f64>>],
) -> Option<Vec<Point<f64>>> {
    if original.len() != deltas.len() {
        return None;
    }
    let mut inferrer = Inferrer {
        original,
        out: deltas.iter().map(|d| d.unwrap_or_default()).collect(),
    };
    let mut point_ix = 0usize;
    for &end_point_ix in contour_ends {
        if end_point_ix < point_ix || end_point_ix >= original.len() {
            return None;
        }
        let first_point_ix = point_ix;
        // first explicit delta
        while point_ix <= end_point_ix && deltas.get(point_ix)?.is_none() {
            point_ix += 1;
        }
        if point_ix > end_point_ix {
            continue;
        }
        let first_delta_ix = point_ix;
        let mut cur_delta_ix = point_ix;
        point_ix += 1;
        while point_ix <= end_point_ix {
            if deltas.get(point_ix)?.is_some() {
                inferrer.interpolate(cur_delta_ix + 1..=point_ix - 1, cur_delta_ix, point_ix)?;
                cur_delta_ix = point_ix;
            }
            point_ix += 1;
        }
        if cur_delta_ix == first_delta_ix {
            inferrer.shift(first_point_ix..=end_point_ix, cur_delta_ix)?;
        } else {
            // the run that wraps around the start of the contour
            inferrer.interpolate(cur_delta_ix + 1..=end_point_ix, cur_delta_ix, first_delta_ix)?;
            if first_delta_ix > first_point_ix {
                inferrer.interpolate(
                    first_point_ix..=first_delta_ix - 1,
                    cur_delta_ix,
                    first_delta_ix,
                )?;
            }
        }
    }
    Some(inferrer.out)
}

struct Inferrer<'a> {
    original: &'a [Point<f64>],
    out: Vec<Point<f64>>,
}

impl Inferrer<'_> {
    /// Give every point in `range` the delta of the point at `ref_ix`.
    fn shift(&mut self, range: RangeInclusive<usize>, ref_ix: usize) -> Option<()> {
        let delta = *self.out.get(ref_ix)?;
        for out in self.out.get_mut(range)? {
            *out = delta;
        }
        Some(())
    }

    /// Interpolate the deltas of the points in `range` between the two
    /// reference points, one coordinate at a time.
    fn interpolate(&mut self, range: RangeInclusive<usize>, ref1: usize, ref2: usize) -> Option<()> {
        if range.is_empty() {
            return Some(());
        }
        let (orig1, orig2) = (*self.original.get(ref1)?, *self.original.get(ref2)?);
        let (delta1, delta2) = (*self.out.get(ref1)?, *self.out.get(ref2)?);
        let originals = self.original.get(range.clone())?;
        for (point, out) in originals.iter().zip(self.out.get_mut(range)?) {
            out.x = interpolate_coord(point.x, (orig1.x, delta1.x), (orig2.x, delta2.x));
            out.y = interpolate_coord(point.y, (orig1.y, delta1.y), (orig2.y, delta2.y));
        }
        Some(())
    }
}

fn interpolate_coord(coord: f64, ref1: (f64, f64), ref2: (f64, f64)) -> f64 {
    let ((in1, d1), (in2, d2)) = if ref1.0 > ref2.0 {
        (ref2, ref1)
    } else {
        (ref1, ref2)
    };
    if in1 == in2 {
        // same coordinate but different deltas: nothing to infer from
        return if d1 == d2 { d1 } else { 0.0 };
    }
    if coord <= in1 {
        d1
    } else if coord >= in2 {
        d2
    } else {
        d1 + (coord - in1) * (d2 - d1) / (in2 - in1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn points(coords: &[(f64, f64)]) -> Vec<Point<f64>> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    fn sparse(deltas: &[Option<(f64, f64)>]) -> Vec<Option<Point<f64>>> {
        deltas
            .iter()
            .map(|d| d.map(|(x, y)| Point::new(x, y)))
            .collect()
    }

    #[test]
    fn single_reference_shifts_contour() {
        let original = points(&[(245.0, 630.0), (260.0, 700.0), (305.0, 680.0)]);
        let deltas = sparse(&[None, Some((20.0, -10.0)), None]);
        let result = infer_deltas(&original, &[2], &deltas).unwrap();
        assert_eq!(result, points(&[(20.0, -10.0); 3]));
    }

    #[test]
    fn no_references_means_no_movement() {
        let original = points(&[(0.0, 0.0), (10.0, 10.0), (50.0, 50.0), (60.0, 60.0)]);
        // the second contour has a reference, the first does not
        let deltas = sparse(&[None, None, Some((5.0, 5.0)), None]);
        let result = infer_deltas(&original, &[1, 3], &deltas).unwrap();
        assert_eq!(
            result,
            points(&[(0.0, 0.0), (0.0, 0.0), (5.0, 5.0), (5.0, 5.0)])
        );
    }

    #[test]
    fn interpolate_between_references() {
        // the example from the gvar documentation
        let original = points(&[(245.0, 630.0), (260.0, 700.0), (305.0, 680.0)]);
        let deltas = sparse(&[Some((28.0, -62.0)), None, Some((-42.0, -57.0))]);
        let result = infer_deltas(&original, &[2], &deltas).unwrap();
        assert_eq!(result[1], Point::new(10.5, -57.0));
    }

    #[test]
    fn wraps_around_contour_start() {
        // references at points 1 and 2; points 3 and 0 lie between 2 and 1
        let original = points(&[(0.0, 0.0), (0.0, 100.0), (100.0, 100.0), (100.0, 0.0)]);
        let deltas = sparse(&[None, Some((10.0, 0.0)), Some((30.0, 20.0)), None]);
        let result = infer_deltas(&original, &[3], &deltas).unwrap();
        assert_eq!(result[3], Point::new(30.0, 0.0));
        assert_eq!(result[0], Point::new(10.0, 0.0));
    }

    #[test]
    fn clamps_outside_reference_span() {
        let original = points(&[(0.0, 0.0), (50.0, 0.0), (100.0, 0.0), (200.0, 0.0)]);
        let deltas = sparse(&[None, Some((10.0, 0.0)), Some((20.0, 0.0)), None]);
        let result = infer_deltas(&original, &[3], &deltas).unwrap();
        // x = 200 and x = 0 are beyond the references at 50 and 100
        assert_eq!(result[3].x, 20.0);
        assert_eq!(result[0].x, 10.0);
    }

    #[test]
    fn same_coordinate_different_deltas() {
        let original = points(&[(0.0, 0.0), (10.0, 5.0), (0.0, 10.0)]);
        let deltas = sparse(&[Some((4.0, 0.0)), None, Some((8.0, 0.0))]);
        let result = infer_deltas(&original, &[2], &deltas).unwrap();
        assert_eq!(result[1].x, 0.0);
    }

    #[test]
    fn mismatched_input() {
        let original = points(&[(0.0, 0.0), (1.0, 1.0)]);
        assert!(infer_deltas(&original, &[1], &sparse(&[None])).is_none());
        assert!(infer_deltas(&original, &[2], &sparse(&[None, None])).is_none());
    }
}
