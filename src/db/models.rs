use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded result between the two fixed teams. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// SQLite rowid, assigned at creation
    pub id: i64,
    pub home_goals: u32,
    pub away_goals: u32,
    /// Creation time; recency order is (recorded_at, id) descending
    pub recorded_at: DateTime<Utc>,
}

/// Listing order for stored matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOrder {
    OldestFirst,
    NewestFirst,
}
