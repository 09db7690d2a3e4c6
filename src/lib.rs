//! Wallet Credit Scoring Library
//!
//! Batch pipeline that turns a log of wallet transactions into a credit
//! score in [300, 1000] per wallet, using isolation-forest anomaly scores
//! as a proxy for risk.

pub mod config;
pub mod error;
pub mod feature_extractor;
pub mod loader;
pub mod models;
pub mod persister;
pub mod pipeline;
pub mod report;
pub mod types;

pub use config::AppConfig;
pub use error::{Result, ScoringError};
pub use feature_extractor::{FeatureExtractor, FeatureTable, WalletFeatures};
pub use loader::TransactionLoader;
pub use models::{AnomalyDetector, CreditScorer, FittedDetector, IsolationForest, MinMaxScaler};
pub use persister::ScoreWriter;
pub use pipeline::{Pipeline, RunSummary};
pub use report::{DistributionReporter, ScoreDistribution};
pub use types::{score::ScoreTable, score::WalletScore, transaction::TransactionRecord};
