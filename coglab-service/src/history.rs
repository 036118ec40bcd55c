//! Session history — JSONL append-only persistence of scored records.
//!
//! One JSON object per line, so the format survives partial writes and
//! streams cheaply. `append` gives durability while a session runs;
//! `write_snapshot` compacts the file to the store's final state (with
//! every rank from the last recomputation); `replay_into` rebuilds an
//! in-memory population from a file, trusting the persisted ranks.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::store::{Repository, StatisticsRecord, StoreError};

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt history line {line}: {source}")]
    Corrupt {
        line: usize,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// JSONL session file manager.
#[derive(Debug, Clone)]
pub struct SessionHistory {
    path: PathBuf,
}

impl SessionHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one scored record as a single JSON line.
    pub fn append(&self, record: &StatisticsRecord) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let line = serde_json::to_string(record)
            .map_err(|source| HistoryError::Corrupt { line: 0, source })?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    /// Load every record in file order. Blank lines are skipped; a
    /// malformed line surfaces its number rather than being dropped.
    pub fn load(&self) -> Result<Vec<StatisticsRecord>, HistoryError> {
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut records = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line)
                .map_err(|source| HistoryError::Corrupt { line: i + 1, source })?;
            records.push(record);
        }
        Ok(records)
    }

    /// Replace the file's contents with the given records — used to
    /// compact a session to its final, consistently ranked state.
    pub fn write_snapshot(&self, records: &[StatisticsRecord]) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = File::create(&self.path)?;
        for record in records {
            let line = serde_json::to_string(record)
                .map_err(|source| HistoryError::Corrupt { line: 0, source })?;
            writeln!(file, "{line}")?;
        }
        Ok(())
    }

    /// Rebuild a repository from this file. Records are saved verbatim —
    /// the persisted ranks are authoritative, no recomputation runs.
    /// Returns the number of records replayed.
    pub fn replay_into<R: Repository>(&self, repo: &R) -> Result<usize, HistoryError> {
        let records = self.load()?;
        let count = records.len();
        for record in records {
            repo.save(record)?;
        }
        Ok(count)
    }
}
