//! Outlier model and credit score derivation

pub mod isolation_forest;
pub mod scaler;
pub mod scorer;

pub use isolation_forest::{FittedIsolationForest, IsolationForest};
pub use scaler::MinMaxScaler;
pub use scorer::CreditScorer;

use crate::error::Result;

/// Unsupervised outlier model that can be fitted on a feature matrix.
///
/// Rows are samples, columns are numeric features.
pub trait AnomalyDetector {
    type Fitted: FittedDetector;

    fn fit(&self, matrix: &[Vec<f64>]) -> Result<Self::Fitted>;
}

/// A fitted outlier model.
pub trait FittedDetector {
    /// One real-valued score per row; higher means more normal.
    fn decision_function(&self, matrix: &[Vec<f64>]) -> Vec<f64>;
}
