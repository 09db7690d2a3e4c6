//! Per-wallet behavioral feature aggregation.
//!
//! Each signal (action counts, totals, active days, lifespan) is aggregated
//! independently over the batch and the results are merged with a full
//! outer join on wallet identifier, filling any gap with zero.

use crate::error::{Result, ScoringError};
use crate::types::transaction::TransactionRecord;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

pub const TOTAL_TRANSACTIONS: &str = "total_transactions";
pub const ACTIVE_DAYS: &str = "active_days";
pub const LIFESPAN_DAYS: &str = "wallet_lifespan_days";

/// Behavioral features of one wallet
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WalletFeatures {
    /// Count per action label; every action in the batch vocabulary is present
    pub action_counts: BTreeMap<String, u64>,
    pub total_transactions: u64,
    /// Distinct UTC calendar days with at least one transaction
    pub active_days: u64,
    /// Whole days between first and last transaction
    pub lifespan_days: u64,
}

impl WalletFeatures {
    /// Count for an action, zero when the wallet never performed it
    pub fn action_count(&self, action: &str) -> u64 {
        self.action_counts.get(action).copied().unwrap_or(0)
    }
}

/// One row per wallet, ordered by wallet identifier.
///
/// Column order is the sorted action vocabulary followed by
/// `total_transactions`, `active_days` and `wallet_lifespan_days`.
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    actions: Vec<String>,
    rows: BTreeMap<String, WalletFeatures>,
}

impl FeatureTable {
    /// Number of wallets
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sorted action labels discovered in the batch
    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    pub fn get(&self, user_wallet: &str) -> Option<&WalletFeatures> {
        self.rows.get(user_wallet)
    }

    /// Wallet identifiers in row order
    pub fn wallets(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &WalletFeatures)> {
        self.rows.iter().map(|(wallet, features)| (wallet.as_str(), features))
    }

    /// Column names, all plain strings
    pub fn feature_names(&self) -> Vec<String> {
        self.actions
            .iter()
            .cloned()
            .chain([TOTAL_TRANSACTIONS, ACTIVE_DAYS, LIFESPAN_DAYS].map(String::from))
            .collect()
    }

    pub fn feature_count(&self) -> usize {
        self.actions.len() + 3
    }

    /// Numeric feature matrix, one row per wallet in row order
    pub fn to_matrix(&self) -> Vec<Vec<f64>> {
        self.rows
            .values()
            .map(|features| {
                let mut row = Vec::with_capacity(self.feature_count());
                row.extend(self.actions.iter().map(|a| features.action_count(a) as f64));
                row.push(features.total_transactions as f64);
                row.push(features.active_days as f64);
                row.push(features.lifespan_days as f64);
                row
            })
            .collect()
    }
}

/// Aggregates a transaction batch into a [`FeatureTable`]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Build the feature table for a batch.
    ///
    /// Fails only when a timestamp cannot be represented as a calendar date.
    pub fn extract(&self, batch: &[TransactionRecord]) -> Result<FeatureTable> {
        let dated = with_datetimes(batch)?;

        let action_counts = count_actions(batch);
        let totals = count_transactions(batch);
        let active_days = count_active_days(&dated);
        let lifespans = lifespan_days(&dated);

        let actions: Vec<String> = batch
            .iter()
            .map(|tx| tx.action.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        // Full outer join on wallet identifier
        let wallets: BTreeSet<&str> = action_counts
            .keys()
            .chain(totals.keys())
            .chain(active_days.keys())
            .chain(lifespans.keys())
            .copied()
            .collect();

        let rows: BTreeMap<String, WalletFeatures> = wallets
            .into_iter()
            .map(|wallet| {
                let counts = action_counts.get(wallet);
                let action_counts = actions
                    .iter()
                    .map(|action| {
                        let count = counts.and_then(|c| c.get(action.as_str())).copied();
                        (action.clone(), count.unwrap_or(0))
                    })
                    .collect();

                let features = WalletFeatures {
                    action_counts,
                    total_transactions: totals.get(wallet).copied().unwrap_or(0),
                    active_days: active_days.get(wallet).copied().unwrap_or(0),
                    lifespan_days: lifespans.get(wallet).copied().unwrap_or(0),
                };
                (wallet.to_string(), features)
            })
            .collect();

        info!(
            wallets = rows.len(),
            actions = actions.len(),
            "Extracted wallet features"
        );
        let table = FeatureTable { actions, rows };
        debug!(columns = ?table.feature_names(), "Feature columns");

        Ok(table)
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn with_datetimes(batch: &[TransactionRecord]) -> Result<Vec<(&str, DateTime<Utc>)>> {
    batch
        .iter()
        .map(|tx| {
            tx.datetime()
                .map(|dt| (tx.user_wallet.as_str(), dt))
                .ok_or_else(|| {
                    ScoringError::Parse(format!(
                        "timestamp {} of wallet {} is out of range",
                        tx.timestamp, tx.user_wallet
                    ))
                })
        })
        .collect()
}

fn count_actions(batch: &[TransactionRecord]) -> BTreeMap<&str, BTreeMap<&str, u64>> {
    let mut counts: BTreeMap<&str, BTreeMap<&str, u64>> = BTreeMap::new();
    for tx in batch {
        *counts
            .entry(tx.user_wallet.as_str())
            .or_default()
            .entry(tx.action.as_str())
            .or_insert(0) += 1;
    }
    counts
}

fn count_transactions(batch: &[TransactionRecord]) -> BTreeMap<&str, u64> {
    let mut totals = BTreeMap::new();
    for tx in batch {
        *totals.entry(tx.user_wallet.as_str()).or_insert(0) += 1;
    }
    totals
}

fn count_active_days<'a>(dated: &[(&'a str, DateTime<Utc>)]) -> BTreeMap<&'a str, u64> {
    let mut days: BTreeMap<&str, BTreeSet<NaiveDate>> = BTreeMap::new();
    for (wallet, dt) in dated {
        days.entry(*wallet).or_default().insert(dt.date_naive());
    }
    days.into_iter()
        .map(|(wallet, dates)| (wallet, dates.len() as u64))
        .collect()
}

fn lifespan_days<'a>(dated: &[(&'a str, DateTime<Utc>)]) -> BTreeMap<&'a str, u64> {
    let mut span: BTreeMap<&str, (DateTime<Utc>, DateTime<Utc>)> = BTreeMap::new();
    for (wallet, dt) in dated {
        span.entry(*wallet)
            .and_modify(|(first, last)| {
                *first = (*first).min(*dt);
                *last = (*last).max(*dt);
            })
            .or_insert((*dt, *dt));
    }
    span.into_iter()
        .map(|(wallet, (first, last))| (wallet, (last - first).num_days().max(0) as u64))
        .collect()
}
