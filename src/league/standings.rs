//! Pure standings derivation.
//!
//! Folds an ordered set of match records into per-team aggregate statistics
//! and ranks the two teams. No I/O: the table is always recomputable from the
//! stored match set, and any persisted copy of it is a cache, never the
//! source of truth.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::db::models::MatchRecord;

/// The two fixed teams. Display names live in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

/// Aggregate statistics for one team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStats {
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub points: u32,
}

impl TeamStats {
    /// Goal difference; derived, not stored.
    pub fn goal_difference(&self) -> i64 {
        i64::from(self.goals_for) - i64::from(self.goals_against)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsTable {
    pub home: TeamStats,
    pub away: TeamStats,
}

impl StandingsTable {
    pub fn stats(&self, side: Side) -> &TeamStats {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    /// Fold a single match into the table. `aggregate` is a fold of this over
    /// the whole match set; the incremental snapshot path applies it to a
    /// cached table when exactly one record was added.
    pub fn apply(&mut self, m: &MatchRecord) {
        self.home.played += 1;
        self.away.played += 1;

        self.home.goals_for += m.home_goals;
        self.home.goals_against += m.away_goals;
        self.away.goals_for += m.away_goals;
        self.away.goals_against += m.home_goals;

        match m.home_goals.cmp(&m.away_goals) {
            Ordering::Greater => {
                self.home.won += 1;
                self.home.points += 3;
                self.away.lost += 1;
            }
            Ordering::Less => {
                self.away.won += 1;
                self.away.points += 3;
                self.home.lost += 1;
            }
            Ordering::Equal => {
                self.home.drawn += 1;
                self.away.drawn += 1;
                self.home.points += 1;
                self.away.points += 1;
            }
        }
    }
}

/// Derive the standings table from a set of match records.
///
/// Pure and deterministic; the result does not depend on input order. An
/// empty input yields all-zero stats for both teams.
pub fn aggregate(matches: &[MatchRecord]) -> StandingsTable {
    let mut table = StandingsTable::default();
    for m in matches {
        table.apply(m);
    }
    table
}

/// Rank the two teams: points descending, then goal difference descending.
/// On an exact tie the home team keeps its place (stable input order).
pub fn rank(table: &StandingsTable) -> [Side; 2] {
    let key = |s: &TeamStats| (s.points, s.goal_difference());
    if key(&table.away) > key(&table.home) {
        [Side::Away, Side::Home]
    } else {
        [Side::Home, Side::Away]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(id: i64, home_goals: u32, away_goals: u32) -> MatchRecord {
        MatchRecord {
            id,
            home_goals,
            away_goals,
            recorded_at: Utc::now(),
        }
    }

    fn sample() -> Vec<MatchRecord> {
        vec![record(1, 2, 1), record(2, 0, 0), record(3, 1, 3)]
    }

    #[test]
    fn empty_input_yields_zero_table() {
        let table = aggregate(&[]);
        assert_eq!(table, StandingsTable::default());
        assert_eq!(table.home.points, 0);
        assert_eq!(table.home.goal_difference(), 0);
    }

    #[test]
    fn win_draw_loss_sample() {
        // (2,1), (0,0), (1,3): one win, one draw, one loss apiece
        let table = aggregate(&sample());

        assert_eq!(table.home.played, 3);
        assert_eq!(table.home.won, 1);
        assert_eq!(table.home.drawn, 1);
        assert_eq!(table.home.lost, 1);
        assert_eq!(table.home.goals_for, 3);
        assert_eq!(table.home.goals_against, 4);
        assert_eq!(table.home.points, 4);

        assert_eq!(table.away.played, 3);
        assert_eq!(table.away.won, 1);
        assert_eq!(table.away.drawn, 1);
        assert_eq!(table.away.lost, 1);
        assert_eq!(table.away.goals_for, 4);
        assert_eq!(table.away.goals_against, 3);
        assert_eq!(table.away.points, 4);
    }

    #[test]
    fn tie_on_points_broken_by_goal_difference() {
        // Both on 4 points; away is +1 GD, home is -1
        let table = aggregate(&sample());
        assert_eq!(table.home.points, table.away.points);
        assert_eq!(rank(&table), [Side::Away, Side::Home]);
    }

    #[test]
    fn deterministic_on_repeated_input() {
        let matches = sample();
        assert_eq!(aggregate(&matches), aggregate(&matches));
    }

    #[test]
    fn order_invariant() {
        let mut matches = vec![
            record(1, 4, 0),
            record(2, 1, 1),
            record(3, 0, 2),
            record(4, 3, 3),
            record(5, 0, 5),
        ];
        let forward = aggregate(&matches);
        matches.reverse();
        assert_eq!(forward, aggregate(&matches));
        matches.swap(0, 3);
        assert_eq!(forward, aggregate(&matches));
    }

    #[test]
    fn conservation_of_goals() {
        let table = aggregate(&[record(1, 3, 2), record(2, 0, 4), record(3, 1, 1)]);
        assert_eq!(
            table.home.goals_for + table.away.goals_for,
            table.home.goals_against + table.away.goals_against
        );
        assert_eq!(table.home.goals_for, table.away.goals_against);
    }

    #[test]
    fn points_law_holds() {
        let table = aggregate(&sample());
        for stats in [table.home, table.away] {
            assert_eq!(stats.points, 3 * stats.won + stats.drawn);
            assert_eq!(stats.played, stats.won + stats.drawn + stats.lost);
        }
    }

    #[test]
    fn exact_tie_keeps_home_first() {
        // All draws with equal goals: identical points and goal difference
        let table = aggregate(&[record(1, 1, 1), record(2, 2, 2)]);
        assert_eq!(table.home, table.away);
        assert_eq!(rank(&table), [Side::Home, Side::Away]);
    }

    #[test]
    fn higher_points_rank_first() {
        let table = aggregate(&[record(1, 2, 0)]);
        assert_eq!(rank(&table), [Side::Home, Side::Away]);
        let table = aggregate(&[record(1, 0, 2)]);
        assert_eq!(rank(&table), [Side::Away, Side::Home]);
    }
}
