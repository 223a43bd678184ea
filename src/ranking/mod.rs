//! Ranked result storage: a remote table with a local top-5 fallback.

pub mod leaderboard;
pub mod local;
pub mod remote;

use chrono::{DateTime, SubsecRound, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::error::StoreError;
use crate::game::GameResult;

pub use leaderboard::{Connectivity, Leaderboard, Standings, Submission};
pub use local::LocalRankingStore;
pub use remote::RemoteRankingStore;

/// Number of rows a leaderboard keeps and shows
pub const LEADERBOARD_SIZE: usize = 5;

/// One persisted record of a completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub id: String,
    pub score: u32,
    pub correct: u32,
    pub accuracy: f64,
    pub max_streak: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl RankingEntry {
    /// A new entry with a locally generated id, stamped now. The stamp is
    /// cut to milliseconds, the precision it is stored with.
    pub fn from_result(result: &GameResult) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            score: result.score,
            correct: result.correct,
            accuracy: result.accuracy,
            max_streak: result.max_streak,
            timestamp: Utc::now().trunc_subsecs(3),
        }
    }
}

/// Leaderboard order: higher score first, then higher accuracy
pub fn compare(a: &RankingEntry, b: &RankingEntry) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| b.accuracy.total_cmp(&a.accuracy))
}

/// Sorts by leaderboard order and keeps the best `n`. Ties keep their
/// incoming order.
pub fn rank<I>(entries: I, n: usize) -> Vec<RankingEntry>
where
    I: IntoIterator<Item = RankingEntry>,
{
    entries.into_iter().sorted_by(compare).take(n).collect()
}

/// A store of ranked results
pub trait RankingStore: Send + Sync {
    /// Records a result and returns the stored entry with its id
    fn insert(&self, result: &GameResult) -> Result<RankingEntry, StoreError>;

    /// The best `n` entries in leaderboard order
    fn top(&self, n: usize) -> Result<Vec<RankingEntry>, StoreError>;

    /// Cheap reachability check
    fn probe(&self) -> Result<(), StoreError> {
        self.top(1).map(|_| ())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn entry(id: &str, score: u32, accuracy: f64) -> RankingEntry {
        RankingEntry {
            id: id.to_string(),
            score,
            correct: score / 100,
            accuracy,
            max_streak: 1,
            timestamp: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
        }
    }

    #[test]
    fn rank_orders_by_score_then_accuracy() {
        let ranked = rank(
            vec![
                entry("a", 300, 0.5),
                entry("b", 900, 0.7),
                entry("c", 300, 0.9),
                entry("d", 1200, 0.1),
            ],
            LEADERBOARD_SIZE,
        );
        let ids: Vec<&str> = ranked.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn rank_truncates_to_n() {
        let entries = (0..9).map(|i| entry(&i.to_string(), i * 100, 1.0));
        let ranked = rank(entries, LEADERBOARD_SIZE);
        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked[0].score, 800);
        assert_eq!(ranked[4].score, 400);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let ranked = rank(vec![entry("old", 500, 0.8), entry("new", 500, 0.8)], 5);
        assert_eq!(ranked[0].id, "old");
        assert_eq!(ranked[1].id, "new");
    }

    #[test]
    fn entry_json_uses_camel_case_and_millis() {
        let json = serde_json::to_value(entry("x", 100, 1.0)).unwrap();
        assert_eq!(json["maxStreak"], 1);
        assert_eq!(json["timestamp"], 1_700_000_000_000i64);
    }

    #[test]
    fn from_result_generates_unique_ids() {
        let result = GameResult {
            score: 600,
            correct: 5,
            total: 5,
            accuracy: 1.0,
            max_streak: 5,
        };
        let a = RankingEntry::from_result(&result);
        let b = RankingEntry::from_result(&result);
        assert_ne!(a.id, b.id);
        assert_eq!(a.score, 600);
        assert_eq!(a.max_streak, 5);
    }

    #[test]
    fn new_entry_survives_a_json_round_trip() {
        let result = GameResult {
            score: 120,
            correct: 1,
            total: 1,
            accuracy: 1.0,
            max_streak: 1,
        };
        let entry = RankingEntry::from_result(&result);
        let json = serde_json::to_string(&entry).unwrap();
        let back: RankingEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
