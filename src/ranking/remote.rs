use chrono::{DateTime, NaiveDateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{RankingEntry, RankingStore};
use crate::error::StoreError;
use crate::game::GameResult;

const TABLE: &str = "rankings";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Row of the hosted `rankings` table
#[derive(Deserialize, Debug, Clone)]
struct RankingRow {
    id: serde_json::Value,
    score: u32,
    correct: u32,
    accuracy: f64,
    max_streak: u32,
    #[serde(default)]
    timestamp: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
struct NewRanking {
    score: u32,
    correct: u32,
    accuracy: f64,
    max_streak: u32,
}

impl From<&GameResult> for NewRanking {
    fn from(r: &GameResult) -> Self {
        Self {
            score: r.score,
            correct: r.correct,
            accuracy: r.accuracy,
            max_streak: r.max_streak,
        }
    }
}

fn parse_timestamp(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(|s| {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    })
    .unwrap_or_else(Utc::now)
}

impl From<RankingRow> for RankingEntry {
    fn from(row: RankingRow) -> Self {
        let id = match row.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        Self {
            id,
            score: row.score,
            correct: row.correct,
            accuracy: row.accuracy,
            max_streak: row.max_streak,
            timestamp: parse_timestamp(row.timestamp.as_deref()),
        }
    }
}

/// The hosted leaderboard, spoken to over its PostgREST interface
#[derive(Debug, Clone)]
pub struct RemoteRankingStore {
    base_url: String,
    api_key: String,
    agent: ureq::Agent,
}

impl RemoteRankingStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build()
            .into();
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            agent,
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{TABLE}", self.base_url.trim_end_matches('/'))
    }

    fn top_url(&self, n: usize) -> String {
        format!(
            "{}?select=*&order=score.desc,accuracy.desc&limit={n}",
            self.table_url()
        )
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key)
    }
}

impl RankingStore for RemoteRankingStore {
    fn insert(&self, result: &GameResult) -> Result<RankingEntry, StoreError> {
        let rows: Vec<RankingRow> = self
            .agent
            .post(self.table_url())
            .header("apikey", self.api_key.as_str())
            .header("Authorization", self.bearer())
            .header("Prefer", "return=representation")
            .send_json([NewRanking::from(result)])?
            .into_body()
            .read_json()?;

        // an insert hidden by row-level policy comes back as an empty list
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Rejected("no row returned for insert".into()))?;
        let entry = RankingEntry::from(row);
        info!("Saved result {} to the remote leaderboard", entry.id);
        Ok(entry)
    }

    fn top(&self, n: usize) -> Result<Vec<RankingEntry>, StoreError> {
        let rows: Vec<RankingRow> = self
            .agent
            .get(self.top_url(n))
            .header("apikey", self.api_key.as_str())
            .header("Authorization", self.bearer())
            .call()?
            .into_body()
            .read_json()?;

        Ok(rows.into_iter().map(RankingEntry::from).collect())
    }

    fn probe(&self) -> Result<(), StoreError> {
        self.agent
            .get(format!("{}?select=id&limit=1", self.table_url()))
            .header("apikey", self.api_key.as_str())
            .header("Authorization", self.bearer())
            .call()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    fn row(json: &str) -> RankingRow {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn urls_follow_postgrest_layout() {
        let store = RemoteRankingStore::new("https://example.supabase.co/", "key");
        assert_eq!(
            store.table_url(),
            "https://example.supabase.co/rest/v1/rankings"
        );
        assert_eq!(
            store.top_url(5),
            "https://example.supabase.co/rest/v1/rankings?select=*&order=score.desc,accuracy.desc&limit=5"
        );
        assert_eq!(store.bearer(), "Bearer key");
    }

    #[test]
    fn insert_body_uses_snake_case_columns() {
        let result = GameResult {
            score: 600,
            correct: 5,
            total: 6,
            accuracy: 5.0 / 6.0,
            max_streak: 5,
        };
        let json = serde_json::to_value([NewRanking::from(&result)]).unwrap();
        assert_eq!(json[0]["max_streak"], 5);
        assert_eq!(json[0]["score"], 600);
        assert!(json[0].get("total").is_none());
    }

    #[test]
    fn numeric_and_uuid_ids_become_strings() {
        let numeric = RankingEntry::from(row(
            r#"{"id":42,"score":100,"correct":1,"accuracy":1.0,"max_streak":1,"timestamp":null}"#,
        ));
        assert_eq!(numeric.id, "42");

        let uuid = RankingEntry::from(row(
            r#"{"id":"2f1c0b7e-0000-4000-8000-000000000000","score":100,"correct":1,"accuracy":1.0,"max_streak":1}"#,
        ));
        assert_eq!(uuid.id, "2f1c0b7e-0000-4000-8000-000000000000");
    }

    #[test]
    fn timestamps_parse_with_or_without_offset() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(
            parse_timestamp(Some("2025-03-01T12:30:00.000000+00:00")),
            expected
        );
        assert_eq!(parse_timestamp(Some("2025-03-01T12:30:00")), expected);
    }

    #[test]
    fn unreachable_store_reports_http_error() {
        let store = RemoteRankingStore::new("http://127.0.0.1:9", "key");
        assert_matches!(store.top(5), Err(StoreError::Http(_)));
        assert_matches!(store.probe(), Err(StoreError::Http(_)));
    }
}
