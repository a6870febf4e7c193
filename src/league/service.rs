//! Orchestration of the league core over a match store.
//!
//! Full recomputation from the persisted match set is the sole source of
//! truth for standings. The optional snapshot cache is refreshed on every
//! mutation; on an add where nothing was purged the single-match delta is
//! applied incrementally, while deletes and resets always recompute because
//! removal has no safe inverse delta.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::RetentionMode;
use crate::db::models::{MatchOrder, MatchRecord};
use crate::db::MatchStore;
use crate::error::LeagueError;

use super::retention::{self, TrimReport};
use super::standings::{self, StandingsTable};

#[derive(Clone)]
pub struct LeagueService {
    store: Arc<dyn MatchStore>,
    window: usize,
    mode: RetentionMode,
    snapshot_cache: bool,
}

impl LeagueService {
    pub fn new(
        store: Arc<dyn MatchStore>,
        window: usize,
        mode: RetentionMode,
        snapshot_cache: bool,
    ) -> Self {
        LeagueService {
            store,
            window,
            mode,
            snapshot_cache,
        }
    }

    /// Current standings table, from the snapshot cache when enabled and
    /// populated, otherwise recomputed (and cached) from stored matches.
    pub fn standings(&self) -> Result<StandingsTable, LeagueError> {
        if self.snapshot_cache {
            if let Some(table) = self.store.read_snapshot()? {
                return Ok(table);
            }
        }
        let table = self.recompute()?;
        if self.snapshot_cache {
            self.store.write_snapshot(&table)?;
        }
        Ok(table)
    }

    /// The most recent matches, newest first, bounded by the window.
    pub fn recent_matches(&self) -> Result<Vec<MatchRecord>, LeagueError> {
        let matches = self
            .store
            .list_matches(MatchOrder::NewestFirst, Some(self.window as u32))?;
        Ok(matches)
    }

    /// Record a new match result. Goal counts are validated here; negative
    /// values are rejected rather than clamped.
    pub fn add_match(&self, home_goals: i64, away_goals: i64) -> Result<MatchRecord, LeagueError> {
        let (home, away) = validate_goals(home_goals, away_goals)?;
        let record = self.store.create_match(home, away)?;
        info!("recorded match {}: {}-{}", record.id, home, away);

        let trimmed = match self.mode {
            RetentionMode::Bounded => self.enforce_retention()?,
            RetentionMode::DisplayOnly => TrimReport::default(),
        };

        if self.snapshot_cache {
            // The single-match delta is only valid when the aggregated set
            // grew by exactly this record; any purge forces recomputation.
            let patched = if trimmed.requested == 0 {
                self.store.read_snapshot()?.map(|mut table| {
                    table.apply(&record);
                    table
                })
            } else {
                None
            };
            let table = match patched {
                Some(table) => table,
                None => self.recompute()?,
            };
            self.store.write_snapshot(&table)?;
        }

        Ok(record)
    }

    /// Delete one match. Deleting an absent id is a no-op success.
    pub fn delete_match(&self, id: i64) -> Result<bool, LeagueError> {
        let removed = self.store.delete_match(id)?;
        if removed {
            info!("deleted match {}", id);
        }
        self.refresh_snapshot()?;
        Ok(removed)
    }

    /// Season reset: purge every stored match.
    pub fn reset_season(&self) -> Result<usize, LeagueError> {
        let purged = self.store.delete_all()?;
        info!("season reset: {} matches purged", purged);
        self.refresh_snapshot()?;
        Ok(purged)
    }

    /// Purge records outside the retention window.
    ///
    /// Purging is one delete per record, so a mid-sequence failure leaves the
    /// store over the window; the report says so and the next invocation
    /// (next add, or the periodic sweep) retries the leftovers.
    pub fn enforce_retention(&self) -> Result<TrimReport, LeagueError> {
        let matches = self.store.list_matches(MatchOrder::NewestFirst, None)?;
        let excess = retention::excess_ids(&matches, self.window);
        let requested = excess.len();
        let mut purged = 0;
        for id in excess {
            match self.store.delete_match(id) {
                // An already-absent row still leaves the store within bounds,
                // so a concurrent trim racing us is benign
                Ok(_) => purged += 1,
                Err(e) => warn!("failed to purge match {}: {}", id, e),
            }
        }
        if requested > 0 {
            info!("retention trim: purged {}/{}", purged, requested);
        }
        Ok(TrimReport { requested, purged })
    }

    /// Recompute the table from the store; in bounded mode only the window
    /// feeds the aggregate, even while a failed purge leaves extra rows.
    fn recompute(&self) -> Result<StandingsTable, LeagueError> {
        let limit = match self.mode {
            RetentionMode::DisplayOnly => None,
            RetentionMode::Bounded => Some(self.window as u32),
        };
        let matches = self.store.list_matches(MatchOrder::NewestFirst, limit)?;
        Ok(standings::aggregate(&matches))
    }

    fn refresh_snapshot(&self) -> Result<(), LeagueError> {
        if self.snapshot_cache {
            let table = self.recompute()?;
            self.store.write_snapshot(&table)?;
        }
        Ok(())
    }
}

fn validate_goals(home: i64, away: i64) -> Result<(u32, u32), LeagueError> {
    match (u32::try_from(home), u32::try_from(away)) {
        (Ok(h), Ok(a)) => Ok((h, a)),
        _ => Err(LeagueError::InvalidMatchRecord { home, away }),
    }
}
