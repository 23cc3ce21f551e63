//! Applying `cvar` deltas to the control value table.

use fontmill_read::{tables::cvar::Cvar, FontRef, ReadError, TableProvider};
use fontmill_types::Tag;

use crate::{
    scalar::{round_i16, SupportRegion},
    Error,
};

const CVAR: Tag = Tag::new(b"cvar");

/// Computes control values at a location.
pub struct ControlValueInterpolator<'a> {
    values: Vec<i16>,
    cvar: Cvar<'a>,
    axis_count: u16,
}

impl<'a> ControlValueInterpolator<'a> {
    /// Returns `None` if the font has no `cvt ` or no `cvar`, in which case
    /// there is nothing to vary.
    pub fn new(font: &FontRef<'a>, axis_count: u16) -> Result<Option<Self>, Error> {
        let cvt = match font.cvt() {
            Ok(cvt) => cvt,
            Err(ReadError::TableIsMissing(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let cvar = match font.cvar() {
            Ok(cvar) => cvar,
            Err(ReadError::TableIsMissing(_)) => return Ok(None),
            Err(e) => return Err(Error::corrupt(CVAR, e)),
        };
        Ok(Some(ControlValueInterpolator {
            values: cvt.values().iter().map(|v| v.get()).collect(),
            cvar,
            axis_count,
        }))
    }

    /// The unvaried values.
    pub fn values(&self) -> &[i16] {
        &self.values
    }

    /// The control values at normalized `coords`, given in axis order.
    ///
    /// Deltas are summed per value and the sum is rounded once.
    pub fn interpolate(&self, coords: &[f64]) -> Result<Vec<i16>, Error> {
        let data = self
            .cvar
            .variation_data(self.axis_count)
            .map_err(|e| Error::corrupt(CVAR, e))?;
        let mut sums = vec![0.0f64; self.values.len()];
        for tuple in data.tuples() {
            let tuple = tuple.map_err(|e| Error::corrupt(CVAR, e))?;
            let scalar = SupportRegion::from_tuple(&tuple, self.axis_count as usize).scalar(coords);
            if scalar == 0.0 {
                continue;
            }
            let indices = match tuple.point_numbers() {
                Some(points) => points.map(usize::from).collect::<Vec<_>>(),
                None => (0..self.values.len()).collect(),
            };
            let deltas = tuple.deltas().take(indices.len()).collect::<Vec<_>>();
            if deltas.len() != indices.len() {
                return Err(Error::corrupt(
                    CVAR,
                    format!("expected {} deltas, found {}", indices.len(), deltas.len()),
                ));
            }
            for (index, delta) in indices.into_iter().zip(deltas) {
                let sum = sums.get_mut(index).ok_or_else(|| {
                    Error::corrupt(CVAR, format!("control value {index} does not exist"))
                })?;
                *sum += delta as f64 * scalar;
            }
        }
        self.values
            .iter()
            .zip(sums)
            .enumerate()
            .map(|(index, (value, sum))| {
                round_i16(*value as f64 + sum).ok_or_else(|| {
                    Error::corrupt(CVAR, format!("control value {index} is out of range"))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1.0, [110, 200, 279])]
    #[case(0.75, [108, 200, 284])]
    #[case(0.0, [100, 200, 300])]
    #[case(-1.0, [100, 200, 300])]
    fn interpolate_cvt(#[case] coord: f64, #[case] expected: [i16; 3]) {
        let data = fontmill_test_data::variable_font();
        let font = FontRef::new(&data).unwrap();
        let interpolator = ControlValueInterpolator::new(&font, 1).unwrap().unwrap();
        assert_eq!(interpolator.values(), &[100, 200, 300]);
        assert_eq!(interpolator.interpolate(&[coord]).unwrap(), expected);
    }

    #[test]
    fn nothing_to_vary() {
        let data = fontmill_test_data::kerning_font();
        let font = FontRef::new(&data).unwrap();
        assert!(ControlValueInterpolator::new(&font, 0).unwrap().is_none());
    }
}
