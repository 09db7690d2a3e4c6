//! Transaction batch loader

use crate::error::{Result, ScoringError};
use crate::types::transaction::TransactionRecord;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Reads a JSON array of transaction objects from disk
pub struct TransactionLoader {
    path: PathBuf,
}

impl TransactionLoader {
    /// Create a loader for the given file
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load the whole batch into memory
    pub fn load(&self) -> Result<Vec<TransactionRecord>> {
        let raw = fs::read_to_string(&self.path).map_err(|source| ScoringError::DataAccess {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), bytes = raw.len(), "Read transaction file");

        let records = parse_transactions(&raw)?;
        info!(
            path = %self.path.display(),
            transactions = records.len(),
            "Loaded transaction batch"
        );
        Ok(records)
    }
}

/// Parse a JSON array of transaction objects
pub fn parse_transactions(raw: &str) -> Result<Vec<TransactionRecord>> {
    serde_json::from_str(raw).map_err(|e| ScoringError::Parse(e.to_string()))
}

/// Convenience wrapper around [`TransactionLoader::load`]
pub fn load_transactions<P: AsRef<Path>>(path: P) -> Result<Vec<TransactionRecord>> {
    TransactionLoader::new(path).load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_batch() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"userWallet": "A", "action": "deposit", "timestamp": 1000}},
                {{"userWallet": "B", "action": "borrow", "timestamp": 2000, "network": "polygon"}}
            ]"#
        )
        .unwrap();

        let records = load_transactions(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], TransactionRecord::new("B", "borrow", 2000));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_transactions(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ScoringError::DataAccess { .. }));
    }

    #[test]
    fn test_not_a_list() {
        let err = parse_transactions(r#"{"userWallet": "A"}"#).unwrap_err();
        assert!(matches!(err, ScoringError::Parse(_)));
    }

    #[test]
    fn test_missing_wallet_field() {
        let err = parse_transactions(r#"[{"action": "deposit", "timestamp": 1000}]"#).unwrap_err();
        assert!(matches!(err, ScoringError::Parse(_)));
    }

    #[test]
    fn test_non_integer_timestamp() {
        let err = parse_transactions(r#"[{"userWallet": "A", "action": "deposit", "timestamp": "soon"}]"#)
            .unwrap_err();
        assert!(matches!(err, ScoringError::Parse(_)));
    }

    #[test]
    fn test_empty_list() {
        assert!(parse_transactions("[]").unwrap().is_empty());
    }
}
