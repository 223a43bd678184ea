use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result};
use std::path::Path;

use crate::game::GameResult;

/// A completed run as kept in the history database
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    pub result: GameResult,
    pub finished_at: DateTime<Utc>,
}

/// Every finished run, kept locally regardless of leaderboard placement
#[derive(Debug)]
pub struct HistoryDb {
    conn: Connection,
}

impl HistoryDb {
    /// Opens (creating if needed) the database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                score INTEGER NOT NULL,
                correct INTEGER NOT NULL,
                total INTEGER NOT NULL,
                accuracy REAL NOT NULL,
                max_streak INTEGER NOT NULL,
                finished_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_sessions_score ON sessions(score DESC, accuracy DESC)",
            [],
        )?;

        Ok(Self { conn })
    }

    pub fn record(&self, result: &GameResult, finished_at: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO sessions (score, correct, total, accuracy, max_streak, finished_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                result.score,
                result.correct,
                result.total,
                result.accuracy,
                result.max_streak,
                finished_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn row_to_record(row: &rusqlite::Row<'_>) -> Result<HistoryRecord> {
        let finished_at: String = row.get(5)?;
        let finished_at = DateTime::parse_from_rfc3339(&finished_at)
            .map_err(|_| {
                rusqlite::Error::InvalidColumnType(
                    5,
                    "finished_at".to_string(),
                    rusqlite::types::Type::Text,
                )
            })?
            .with_timezone(&Utc);

        Ok(HistoryRecord {
            result: GameResult {
                score: row.get(0)?,
                correct: row.get(1)?,
                total: row.get(2)?,
                accuracy: row.get(3)?,
                max_streak: row.get(4)?,
            },
            finished_at,
        })
    }

    /// Best run by leaderboard order
    pub fn personal_best(&self) -> Result<Option<HistoryRecord>> {
        self.conn
            .query_row(
                r#"
                SELECT score, correct, total, accuracy, max_streak, finished_at
                FROM sessions
                ORDER BY score DESC, accuracy DESC, id ASC
                LIMIT 1
                "#,
                [],
                Self::row_to_record,
            )
            .optional()
    }

    pub fn session_count(&self) -> Result<u64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))
    }
}
