//! Summary statistics of a read-back field

use std::fmt;

/// Min/max/mean wave height and the count of disturbed cells
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSummary {
    /// Smallest value
    pub min: f32,
    /// Largest value
    pub max: f32,
    /// Arithmetic mean (accumulated in `f64`)
    pub mean: f64,
    /// Cells not exactly `0.0`
    pub nonzero: usize,
    /// Total cells
    pub cells: usize,
}

impl FieldSummary {
    /// Summarize a field; an empty slice yields all zeros
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Cell counts are far below f64 precision
    pub fn from_slice(data: &[f32]) -> Self {
        if data.is_empty() {
            return Self {
                min: 0.0,
                max: 0.0,
                mean: 0.0,
                nonzero: 0,
                cells: 0,
            };
        }

        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut sum = 0.0_f64;
        let mut nonzero = 0;
        for &v in data {
            min = min.min(v);
            max = max.max(v);
            sum += f64::from(v);
            if v != 0.0 {
                nonzero += 1;
            }
        }

        Self {
            min,
            max,
            mean: sum / data.len() as f64,
            nonzero,
            cells: data.len(),
        }
    }
}

impl fmt::Display for FieldSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "min={:.4} max={:.4} mean={:.6} nonzero={}/{}",
            self.min, self.max, self.mean, self.nonzero, self.cells
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_of_pulse() {
        let data = [0.0, 2.5, -1.0, 0.0, 10.0];
        let summary = FieldSummary::from_slice(&data);
        assert_eq!(summary.min, -1.0);
        assert_eq!(summary.max, 10.0);
        assert!((summary.mean - 2.3).abs() < 1e-9);
        assert_eq!(summary.nonzero, 3);
        assert_eq!(summary.cells, 5);
    }

    #[test]
    fn test_summary_of_empty_field() {
        let summary = FieldSummary::from_slice(&[]);
        assert_eq!(summary.nonzero, 0);
        assert_eq!(summary.mean, 0.0);
    }

    #[test]
    fn test_display() {
        let summary = FieldSummary::from_slice(&[0.0, 1.0]);
        assert_eq!(
            summary.to_string(),
            "min=0.0000 max=1.0000 mean=0.500000 nonzero=1/2"
        );
    }
}
