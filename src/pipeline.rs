//! End-to-end scoring run: load, extract, score, persist, report

use crate::config::AppConfig;
use crate::error::Result;
use crate::feature_extractor::FeatureExtractor;
use crate::loader::TransactionLoader;
use crate::models::scorer::CreditScorer;
use crate::persister::ScoreWriter;
use crate::report::{DistributionReporter, ScoreDistribution};
use crate::types::score::ScoreTable;
use std::time::{Duration, Instant};
use tracing::info;

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub transactions: usize,
    pub wallets: usize,
    /// Sorted action labels seen in the batch
    pub actions: Vec<String>,
    pub scores: ScoreTable,
    pub distribution: ScoreDistribution,
    pub timings: StageTimings,
}

/// Wall-clock time spent in each stage
#[derive(Debug, Clone, Default)]
pub struct StageTimings {
    pub load: Duration,
    pub extract: Duration,
    pub score: Duration,
    pub persist: Duration,
    pub report: Duration,
}

impl StageTimings {
    pub fn total(&self) -> Duration {
        self.load + self.extract + self.score + self.persist + self.report
    }
}

/// Runs every stage in order.
///
/// Nothing is written until all wallets have been scored, so a failure in
/// loading, extraction or model fitting leaves no output behind.
pub struct Pipeline {
    config: AppConfig,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<RunSummary> {
        let mut timings = StageTimings::default();

        info!("Loading data...");
        let started = Instant::now();
        let batch = TransactionLoader::new(&self.config.input.path).load()?;
        timings.load = started.elapsed();

        info!("Extracting features...");
        let started = Instant::now();
        let features = FeatureExtractor::new().extract(&batch)?;
        timings.extract = started.elapsed();

        info!("Generating credit scores...");
        let started = Instant::now();
        let scores = CreditScorer::new(&self.config)?.score(&features)?;
        timings.score = started.elapsed();

        info!("Saving final output...");
        let started = Instant::now();
        ScoreWriter::new(&self.config.output.scores_path).write(&scores)?;
        timings.persist = started.elapsed();

        info!("Analyzing score distribution...");
        let started = Instant::now();
        let distribution = DistributionReporter::new(self.config.report.clone()).report(&scores)?;
        timings.report = started.elapsed();

        let (min_anomaly, max_anomaly) = scores.anomaly_range().unwrap_or_default();
        info!(
            transactions = batch.len(),
            wallets = scores.len(),
            min_score = scores.min_score().unwrap_or_default(),
            max_score = scores.max_score().unwrap_or_default(),
            mean_score = format!("{:.1}", scores.mean_score().unwrap_or_default()),
            min_anomaly,
            max_anomaly,
            elapsed_ms = timings.total().as_millis() as u64,
            "Pipeline complete"
        );

        Ok(RunSummary {
            transactions: batch.len(),
            wallets: features.len(),
            actions: features.actions().to_vec(),
            scores,
            distribution,
            timings,
        })
    }
}
