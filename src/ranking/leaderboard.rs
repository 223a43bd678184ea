use log::{info, warn};

use super::{LocalRankingStore, RankingEntry, RankingStore, LEADERBOARD_SIZE};
use crate::game::GameResult;

/// Whether the remote leaderboard answered the last time it was asked
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, strum_macros::Display)]
pub enum Connectivity {
    #[default]
    #[strum(to_string = "CHECKING")]
    Unknown,
    #[strum(to_string = "LIVE")]
    Live,
    #[strum(to_string = "OFFLINE")]
    Offline,
}

/// A leaderboard snapshot and where it came from
#[derive(Clone, Debug, PartialEq)]
pub struct Standings {
    pub entries: Vec<RankingEntry>,
    pub connectivity: Connectivity,
}

/// Outcome of saving a finished run
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
    /// Id of the saved entry, used to highlight the player's own row
    pub entry_id: String,
    pub standings: Standings,
}

/// Remote ranked store with a local fallback. Every failure degrades to the
/// local copy; nothing here returns an error.
pub struct Leaderboard {
    remote: Option<Box<dyn RankingStore>>,
    local: LocalRankingStore,
}

impl Leaderboard {
    pub fn new(remote: Option<Box<dyn RankingStore>>, local: LocalRankingStore) -> Self {
        Self { remote, local }
    }

    pub fn offline(local: LocalRankingStore) -> Self {
        Self::new(None, local)
    }

    pub fn probe(&self) -> Connectivity {
        let Some(remote) = &self.remote else {
            return Connectivity::Offline;
        };
        match remote.probe() {
            Ok(()) => {
                info!("Remote leaderboard is reachable");
                Connectivity::Live
            }
            Err(e) => {
                warn!("Remote leaderboard connection check failed: {e}");
                Connectivity::Offline
            }
        }
    }

    fn local_top(&self, n: usize) -> Vec<RankingEntry> {
        self.local.top(n).unwrap_or_else(|e| {
            warn!("Local leaderboard unavailable: {e}");
            Vec::new()
        })
    }

    /// The local copy only, without touching the network
    pub fn cached(&self, n: usize) -> Standings {
        Standings {
            entries: self.local_top(n),
            connectivity: Connectivity::Offline,
        }
    }

    /// Best `n` entries, preferring the remote store. A successful remote
    /// read refreshes the local copy.
    pub fn fetch_top(&self, n: usize) -> Standings {
        if let Some(remote) = &self.remote {
            match remote.top(n) {
                Ok(entries) => {
                    if let Err(e) = self.local.replace(&entries) {
                        warn!("Could not cache remote leaderboard locally: {e}");
                    }
                    return Standings {
                        entries,
                        connectivity: Connectivity::Live,
                    };
                }
                Err(e) => warn!("Fetching remote leaderboard failed: {e}"),
            }
        }

        self.cached(n)
    }

    /// Saves a finished run and returns the refreshed top five
    pub fn submit(&self, result: &GameResult) -> Submission {
        if let Some(remote) = &self.remote {
            match remote.insert(result) {
                Ok(entry) => {
                    return Submission {
                        entry_id: entry.id,
                        standings: self.fetch_top(LEADERBOARD_SIZE),
                    };
                }
                Err(e) => {
                    warn!("Saving to the remote leaderboard failed, saving locally instead: {e}")
                }
            }
        }

        let entry_id = match self.local.insert(result) {
            Ok(entry) => entry.id,
            Err(e) => {
                warn!("Saving to the local leaderboard failed: {e}");
                RankingEntry::from_result(result).id
            }
        };

        Submission {
            entry_id,
            standings: self.cached(LEADERBOARD_SIZE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::ranking::tests::entry;
    use crate::ranking::{rank, RemoteRankingStore};
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// In-memory stand-in for the hosted table
    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<Vec<RankingEntry>>,
        reject_writes: bool,
    }

    impl RankingStore for MemoryStore {
        fn insert(&self, result: &GameResult) -> Result<RankingEntry, StoreError> {
            if self.reject_writes {
                return Err(StoreError::Rejected("policy".into()));
            }
            let mut e = RankingEntry::from_result(result);
            e.id = format!("remote-{}", self.rows.lock().unwrap().len());
            self.rows.lock().unwrap().push(e.clone());
            Ok(e)
        }

        fn top(&self, n: usize) -> Result<Vec<RankingEntry>, StoreError> {
            Ok(rank(self.rows.lock().unwrap().clone(), n))
        }
    }

    fn result(score: u32) -> GameResult {
        GameResult {
            score,
            correct: score / 100,
            total: score / 100,
            accuracy: 1.0,
            max_streak: 3,
        }
    }

    #[test]
    fn remote_submit_highlights_remote_id_and_caches() {
        let dir = tempdir().unwrap();
        let local = LocalRankingStore::with_path(dir.path().join("lb.json"));
        let board = Leaderboard::new(Some(Box::new(MemoryStore::default())), local);

        let submission = board.submit(&result(700));
        assert_eq!(submission.entry_id, "remote-0");
        assert_eq!(submission.standings.connectivity, Connectivity::Live);
        assert_eq!(submission.standings.entries.len(), 1);

        let cached = LocalRankingStore::with_path(dir.path().join("lb.json"));
        assert_eq!(cached.top(5).unwrap()[0].id, "remote-0");
    }

    #[test]
    fn rejected_write_falls_back_to_local() {
        let dir = tempdir().unwrap();
        let local = LocalRankingStore::with_path(dir.path().join("lb.json"));
        let remote = MemoryStore {
            reject_writes: true,
            ..Default::default()
        };
        let board = Leaderboard::new(Some(Box::new(remote)), local);

        let submission = board.submit(&result(400));
        assert_eq!(submission.standings.connectivity, Connectivity::Offline);
        assert_eq!(submission.standings.entries.len(), 1);
        assert_eq!(submission.standings.entries[0].id, submission.entry_id);
    }

    #[test]
    fn unreachable_remote_degrades_silently() {
        let dir = tempdir().unwrap();
        let local = LocalRankingStore::with_path(dir.path().join("lb.json"));
        local.replace(&[entry("cached", 900, 0.9)]).unwrap();
        let remote = RemoteRankingStore::new("http://127.0.0.1:9", "key");
        let board = Leaderboard::new(Some(Box::new(remote)), local);

        assert_eq!(board.probe(), Connectivity::Offline);

        let standings = board.fetch_top(5);
        assert_eq!(standings.connectivity, Connectivity::Offline);
        assert_eq!(standings.entries[0].id, "cached");

        let submission = board.submit(&result(300));
        let ids: Vec<&str> = submission
            .standings
            .entries
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["cached", submission.entry_id.as_str()]);
    }

    #[test]
    fn offline_board_never_probes_live() {
        let dir = tempdir().unwrap();
        let board = Leaderboard::offline(LocalRankingStore::with_path(dir.path().join("lb.json")));
        assert_eq!(board.probe(), Connectivity::Offline);
        assert!(board.fetch_top(5).entries.is_empty());
    }

    #[test]
    fn standings_never_exceed_five_and_stay_sorted() {
        let dir = tempdir().unwrap();
        let board = Leaderboard::offline(LocalRankingStore::with_path(dir.path().join("lb.json")));
        for score in [100, 900, 300, 800, 200, 700, 600, 500] {
            let standings = board.submit(&result(score)).standings;
            assert!(standings.entries.len() <= LEADERBOARD_SIZE);
            assert!(standings
                .entries
                .windows(2)
                .all(|w| crate::ranking::compare(&w[0], &w[1]).is_le()));
        }
    }

    #[test]
    fn connectivity_labels() {
        assert_eq!(Connectivity::Live.to_string(), "LIVE");
        assert_eq!(Connectivity::Offline.to_string(), "OFFLINE");
        assert_eq!(Connectivity::default(), Connectivity::Unknown);
    }
}
