use thiserror::Error;

/// Failures of the persistence layer. None of these reach the player: the
/// leaderboard degrades to its local copy and settings fall back to defaults.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("malformed stored data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("remote request failed: {0}")]
    Http(#[from] ureq::Error),
    #[error("remote store rejected the write: {0}")]
    Rejected(String),
    #[error("history database error: {0}")]
    Db(#[from] rusqlite::Error),
}

#[derive(Debug, Error)]
pub enum CommentaryError {
    #[error("no commentary API key configured")]
    MissingCredentials,
    #[error("commentary request failed: {0}")]
    Request(#[from] ureq::Error),
    #[error("commentary service returned no text")]
    Empty,
}
