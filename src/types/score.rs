//! Credit score records produced by the scorer

use serde::{Deserialize, Serialize};

/// Final credit score for one wallet.
///
/// Serialized field names match the CSV header `userWallet,credit_score`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletScore {
    #[serde(rename = "userWallet")]
    pub user_wallet: String,

    pub credit_score: u32,
}

impl WalletScore {
    pub fn new(user_wallet: impl Into<String>, credit_score: u32) -> Self {
        Self {
            user_wallet: user_wallet.into(),
            credit_score,
        }
    }
}

/// Scored wallets in feature-table order, together with the raw model output.
#[derive(Debug, Clone, Default)]
pub struct ScoreTable {
    scores: Vec<WalletScore>,
    anomaly_scores: Vec<f64>,
}

impl ScoreTable {
    /// Build a table from parallel vectors of scores and raw anomaly scores.
    pub(crate) fn new(scores: Vec<WalletScore>, anomaly_scores: Vec<f64>) -> Self {
        debug_assert_eq!(scores.len(), anomaly_scores.len());
        Self {
            scores,
            anomaly_scores,
        }
    }

    pub fn scores(&self) -> &[WalletScore] {
        &self.scores
    }

    /// Lowest and highest raw decision-function values (higher = more normal)
    pub fn anomaly_range(&self) -> Option<(f64, f64)> {
        let mut values = self.anomaly_scores.iter().copied();
        let first = values.next()?;
        Some(values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Look up the credit score of a wallet
    pub fn get(&self, user_wallet: &str) -> Option<u32> {
        self.scores
            .iter()
            .find(|s| s.user_wallet == user_wallet)
            .map(|s| s.credit_score)
    }

    /// Integer credit scores in table order
    pub fn credit_scores(&self) -> impl Iterator<Item = u32> + '_ {
        self.scores.iter().map(|s| s.credit_score)
    }

    pub fn min_score(&self) -> Option<u32> {
        self.credit_scores().min()
    }

    pub fn max_score(&self) -> Option<u32> {
        self.credit_scores().max()
    }

    pub fn mean_score(&self) -> Option<f64> {
        if self.scores.is_empty() {
            return None;
        }
        let sum: u64 = self.credit_scores().map(u64::from).sum();
        Some(sum as f64 / self.scores.len() as f64)
    }
}
