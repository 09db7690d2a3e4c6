//! Wallet transaction records as they appear in the input batch

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One raw wallet event.
///
/// Only the three fields the feature extractor needs are kept; any other
/// fields present in the input object are ignored during deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Wallet identifier
    #[serde(rename = "userWallet")]
    pub user_wallet: String,

    /// Action label (deposit, borrow, repay, redeemunderlying, liquidationcall, ...)
    pub action: String,

    /// Seconds since the Unix epoch
    pub timestamp: i64,
}

impl TransactionRecord {
    /// Create a new record
    pub fn new(user_wallet: impl Into<String>, action: impl Into<String>, timestamp: i64) -> Self {
        Self {
            user_wallet: user_wallet.into(),
            action: action.into(),
            timestamp,
        }
    }

    /// Timestamp as a UTC date-time, `None` when out of chrono's range.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}
