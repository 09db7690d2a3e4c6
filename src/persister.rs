//! CSV writer for wallet credit scores

use crate::error::{Result, ScoringError};
use crate::types::score::ScoreTable;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes `userWallet,credit_score` rows in score-table order
pub struct ScoreWriter {
    path: PathBuf,
}

impl ScoreWriter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Write the whole table, header first
    pub fn write(&self, table: &ScoreTable) -> Result<()> {
        let map_err = |source: csv::Error| ScoringError::Output {
            path: self.path.clone(),
            source,
        };

        let mut writer = csv::Writer::from_path(&self.path).map_err(map_err)?;
        if table.is_empty() {
            writer.write_record(["userWallet", "credit_score"]).map_err(map_err)?;
        }
        for score in table.scores() {
            writer.serialize(score).map_err(map_err)?;
        }
        writer.flush().map_err(|e| map_err(e.into()))?;

        info!(path = %self.path.display(), rows = table.len(), "Saved credit scores");
        Ok(())
    }
}

/// Convenience wrapper around [`ScoreWriter::write`]
pub fn save_scores<P: AsRef<Path>>(table: &ScoreTable, path: P) -> Result<()> {
    ScoreWriter::new(path).write(table)
}
