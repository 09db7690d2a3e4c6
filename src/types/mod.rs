//! Type definitions for the wallet scoring pipeline

pub mod score;
pub mod transaction;

pub use score::{ScoreTable, WalletScore};
pub use transaction::TransactionRecord;
