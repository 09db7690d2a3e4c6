//! Min-max rescaling of anomaly scores into the credit score range

use crate::error::{Result, ScoringError};
use tracing::debug;

/// Linear map from the observed [min, max] of a batch onto a target range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMaxScaler {
    target_min: f64,
    target_max: f64,
}

impl MinMaxScaler {
    pub fn new(target_min: f64, target_max: f64) -> Result<Self> {
        if !(target_min.is_finite() && target_max.is_finite() && target_min < target_max) {
            return Err(ScoringError::Config(format!(
                "score range must satisfy min < max, got [{}, {}]",
                target_min, target_max
            )));
        }
        Ok(Self {
            target_min,
            target_max,
        })
    }

    /// Rescale `values` so the smallest maps to `target_min` and the largest
    /// to `target_max`.
    ///
    /// When every value is identical the observed range is zero and all
    /// outputs collapse to `target_min`.
    pub fn fit_transform(&self, values: &[f64]) -> Vec<f64> {
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = hi - lo;

        if !(range > 0.0) {
            debug!(count = values.len(), "Degenerate score range, using target minimum");
            return vec![self.target_min; values.len()];
        }

        let span = self.target_max - self.target_min;
        values
            .iter()
            .map(|v| ((v - lo) / range * span + self.target_min).clamp(self.target_min, self.target_max))
            .collect()
    }

    /// Rescale and truncate toward zero
    pub fn fit_transform_truncated(&self, values: &[f64]) -> Vec<u32> {
        self.fit_transform(values)
            .into_iter()
            .map(|v| v.trunc() as u32)
            .collect()
    }
}
