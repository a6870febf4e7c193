use thiserror::Error;

/// Persistence-layer failure surfaced to the caller. Retry/backoff policy
/// belongs to the store, not to the league core.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum LeagueError {
    /// Goal counts must be non-negative integers; rejected at write time.
    #[error("invalid match record: home {home}, away {away}")]
    InvalidMatchRecord { home: i64, away: i64 },

    #[error(transparent)]
    Store(#[from] StoreError),
}
