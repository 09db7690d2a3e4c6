//! Credit scoring on top of a fitted outlier model

use crate::config::{AppConfig, ModelConfig, ScoringConfig};
use crate::error::Result;
use crate::feature_extractor::FeatureTable;
use crate::models::isolation_forest::IsolationForest;
use crate::models::scaler::MinMaxScaler;
use crate::models::{AnomalyDetector, FittedDetector};
use crate::types::score::{ScoreTable, WalletScore};
use tracing::{debug, info};

/// Fits an outlier model on the feature table and turns its decision
/// function into integer credit scores.
pub struct CreditScorer<D = IsolationForest> {
    detector: D,
    scaler: MinMaxScaler,
}

impl CreditScorer<IsolationForest> {
    /// Create a scorer from application configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        Self::from_parts(&config.model, &config.scoring)
    }

    pub fn from_parts(model: &ModelConfig, scoring: &ScoringConfig) -> Result<Self> {
        let scaler = MinMaxScaler::new(f64::from(scoring.min_score), f64::from(scoring.max_score))?;
        info!(
            trees = model.n_estimators,
            max_samples = model.max_samples,
            contamination = model.contamination,
            seed = model.seed,
            "Credit scorer initialized"
        );
        Ok(Self::with_detector(IsolationForest::from_config(model), scaler))
    }
}

impl<D: AnomalyDetector> CreditScorer<D> {
    /// Use a custom outlier model
    pub fn with_detector(detector: D, scaler: MinMaxScaler) -> Self {
        Self { detector, scaler }
    }

    /// Score every wallet in the table.
    ///
    /// The returned table has exactly one entry per feature-table row, in
    /// row order.
    pub fn score(&self, features: &FeatureTable) -> Result<ScoreTable> {
        let matrix = features.to_matrix();
        let model = self.detector.fit(&matrix)?;
        let anomaly_scores = model.decision_function(&matrix);

        let credit_scores = self.scaler.fit_transform_truncated(&anomaly_scores);

        let scores: Vec<WalletScore> = features
            .wallets()
            .zip(credit_scores)
            .map(|(wallet, score)| WalletScore::new(wallet, score))
            .collect();

        let table = ScoreTable::new(scores, anomaly_scores);
        if let Some((lo, hi)) = table.anomaly_range() {
            debug!(wallets = table.len(), min_anomaly = lo, max_anomaly = hi, "Anomaly scores rescaled");
        }

        Ok(table)
    }
}
