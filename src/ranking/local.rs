use log::warn;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::{rank, RankingEntry, RankingStore, LEADERBOARD_SIZE};
use crate::error::StoreError;
use crate::game::GameResult;

/// Top-5 leaderboard kept in a JSON file. Doubles as the cache of the last
/// remote read.
#[derive(Debug)]
pub struct LocalRankingStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl LocalRankingStore {
    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reads the stored entries. A missing file is an empty board.
    pub fn try_load(&self) -> Result<Vec<RankingEntry>, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Like `try_load`, but a corrupt file is discarded and reset to empty
    fn load_or_reset(&self) -> Result<Vec<RankingEntry>, StoreError> {
        match self.try_load() {
            Err(StoreError::Parse(e)) => {
                warn!(
                    "Discarding corrupt local leaderboard at {}: {e}",
                    self.path.display()
                );
                self.save(&[])?;
                Ok(Vec::new())
            }
            other => other,
        }
    }

    fn save(&self, entries: &[RankingEntry]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec(entries)?)?;
        Ok(())
    }

    /// Overwrites the board with a freshly fetched remote copy
    pub fn replace(&self, entries: &[RankingEntry]) -> Result<(), StoreError> {
        let _guard = self.guard();
        let ranked = rank(entries.iter().cloned(), LEADERBOARD_SIZE);
        self.save(&ranked)
    }
}

impl RankingStore for LocalRankingStore {
    fn insert(&self, result: &GameResult) -> Result<RankingEntry, StoreError> {
        let _guard = self.guard();
        let entry = RankingEntry::from_result(result);

        let mut entries = self.load_or_reset()?;
        entries.push(entry.clone());
        let ranked = rank(entries, LEADERBOARD_SIZE);
        self.save(&ranked)?;

        Ok(entry)
    }

    fn top(&self, n: usize) -> Result<Vec<RankingEntry>, StoreError> {
        let _guard = self.guard();
        Ok(rank(self.load_or_reset()?, n))
    }
}
