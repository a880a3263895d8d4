//! Quartile boundaries and 1-4 scoring

use crate::error::RfmError;
use crate::model::{CustomerRfm, Measure};

/// 25th, 50th and 75th percentile of one measure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuartileBoundaries {
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
}

impl QuartileBoundaries {
    /// Compute the boundaries of `measure` across all customers.
    ///
    /// Non-finite values are rejected, since a NaN would poison the
    /// interpolated boundaries.
    pub fn compute(customers: &[CustomerRfm], measure: Measure) -> Result<Self, RfmError> {
        let mut values: Vec<f64> = customers.iter().map(|c| measure.value(c)).collect();
        if values.is_empty() {
            return Err(RfmError::EmptyDataset);
        }
        if let Some((row, value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(RfmError::InvalidField {
                row,
                field: measure.name(),
                value: value.to_string(),
            });
        }
        values.sort_by(f64::total_cmp);

        Ok(Self {
            q25: quantile_sorted(&values, 0.25),
            q50: quantile_sorted(&values, 0.50),
            q75: quantile_sorted(&values, 0.75),
        })
    }

    /// Map a raw value to its quartile score.
    ///
    /// Boundaries are inclusive, so a value sitting on a boundary gets the
    /// lower score. Lower raw values always get lower scores, recency
    /// included.
    pub fn score(&self, value: f64) -> u8 {
        if value <= self.q25 {
            1
        } else if value <= self.q50 {
            2
        } else if value <= self.q75 {
            3
        } else {
            4
        }
    }

    /// True when two or more boundaries coincide, so some score bands are empty
    pub fn is_degenerate(&self) -> bool {
        self.q25 == self.q50 || self.q50 == self.q75
    }
}

/// Linear-interpolation quantile over sorted, non-empty values
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Score every customer on one measure, in input order
pub fn score_measure(
    customers: &[CustomerRfm],
    measure: Measure,
    boundaries: &QuartileBoundaries,
) -> Vec<u8> {
    customers
        .iter()
        .map(|c| boundaries.score(measure.value(c)))
        .collect()
}
