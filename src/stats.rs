//! Win/loss counter arithmetic.
//!
//! A player's counters are a denormalized cache of the game results they
//! appear in. [`PlayerStats`] holds the aggregate counters together with the
//! per-year breakdown, and every change goes through [`PlayerStats::apply`] so
//! the aggregate always equals the sum over years.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Which roster of a game a player belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Win,
    Loss,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Side::Win => "win",
            Side::Loss => "loss",
        };
        write!(f, "{}", s)
    }
}

impl Side {
    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "win" => Some(Side::Win),
            "loss" => Some(Side::Loss),
            _ => None,
        }
    }
}

/// Direction of a counter adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delta {
    Increment,
    Decrement,
}

impl Delta {
    pub fn amount(self) -> i64 {
        match self {
            Delta::Increment => 1,
            Delta::Decrement => -1,
        }
    }
}

/// Wins and losses for a single calendar year. Absent years are all zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRecord {
    pub wins: i64,
    pub losses: i64,
}

impl YearRecord {
    pub fn total(&self) -> i64 {
        self.wins + self.losses
    }

    pub fn win_rate(&self) -> f64 {
        win_rate(self.wins, self.losses)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerStats {
    pub win: i64,
    pub loss: i64,
    pub by_year: BTreeMap<i32, YearRecord>,
}

impl PlayerStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record for `year`, zero if the player has no games that year.
    pub fn year(&self, year: i32) -> YearRecord {
        self.by_year.get(&year).copied().unwrap_or_default()
    }

    /// Adjust one side's counter for `year` and the matching aggregate.
    ///
    /// Counters may go negative: a decrement always exactly inverts a prior
    /// increment, even if the stored data was already off. A year that
    /// returns to all-zero is dropped from the map.
    pub fn apply(&mut self, side: Side, year: i32, delta: Delta) -> YearRecord {
        let amount = delta.amount();
        let record = self.by_year.entry(year).or_default();
        match side {
            Side::Win => {
                record.wins += amount;
                self.win += amount;
            }
            Side::Loss => {
                record.losses += amount;
                self.loss += amount;
            }
        }
        let updated = *record;
        if updated == YearRecord::default() {
            self.by_year.remove(&year);
        }
        updated
    }

    /// Aggregate counters equal the per-year sums.
    pub fn is_consistent(&self) -> bool {
        let wins: i64 = self.by_year.values().map(|r| r.wins).sum();
        let losses: i64 = self.by_year.values().map(|r| r.losses).sum();
        wins == self.win && losses == self.loss
    }

    pub fn win_rate(&self) -> f64 {
        win_rate(self.win, self.loss)
    }

    pub fn wins_by_year(&self) -> BTreeMap<i32, i64> {
        self.by_year.iter().map(|(y, r)| (*y, r.wins)).collect()
    }

    pub fn losses_by_year(&self) -> BTreeMap<i32, i64> {
        self.by_year.iter().map(|(y, r)| (*y, r.losses)).collect()
    }
}

/// Win percentage in `0.0..=100.0`, or 0 when no games were played.
pub fn win_rate(wins: i64, losses: i64) -> f64 {
    let total = wins + losses;
    if total == 0 {
        0.0
    } else {
        (wins as f64 / total as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_increments_year_and_aggregate() {
        let mut stats = PlayerStats::new();

        let record = stats.apply(Side::Win, 2024, Delta::Increment);

        assert_eq!(record, YearRecord { wins: 1, losses: 0 });
        assert_eq!(stats.win, 1);
        assert_eq!(stats.loss, 0);
        assert!(stats.is_consistent());
    }

    #[test]
    fn test_apply_missing_year_defaults_to_zero() {
        let mut stats = PlayerStats::new();
        stats.apply(Side::Loss, 2023, Delta::Increment);

        assert_eq!(stats.year(2024), YearRecord::default());
        stats.apply(Side::Loss, 2024, Delta::Increment);
        assert_eq!(stats.year(2024).losses, 1);
        assert_eq!(stats.loss, 2);
    }

    #[test]
    fn test_decrement_below_zero_is_not_clamped() {
        let mut stats = PlayerStats::new();

        stats.apply(Side::Win, 2024, Delta::Decrement);

        assert_eq!(stats.year(2024).wins, -1);
        assert_eq!(stats.win, -1);
        assert!(stats.is_consistent());
    }

    #[test]
    fn test_increment_then_decrement_restores_state() {
        let mut stats = PlayerStats::new();
        stats.apply(Side::Win, 2022, Delta::Increment);
        let before = stats.clone();

        stats.apply(Side::Loss, 2024, Delta::Increment);
        stats.apply(Side::Loss, 2024, Delta::Decrement);

        assert_eq!(stats.win, before.win);
        assert_eq!(stats.loss, before.loss);
        assert_eq!(stats, before);
    }

    #[test]
    fn test_moving_a_game_between_years_keeps_aggregate() {
        let mut stats = PlayerStats::new();
        stats.apply(Side::Win, 2023, Delta::Increment);

        stats.apply(Side::Win, 2023, Delta::Decrement);
        stats.apply(Side::Win, 2024, Delta::Increment);

        assert_eq!(stats.win, 1);
        assert_eq!(stats.year(2023).wins, 0);
        assert_eq!(stats.year(2024).wins, 1);
        assert!(stats.is_consistent());
    }

    #[test]
    fn test_inconsistent_stats_detected() {
        let mut stats = PlayerStats::new();
        stats.apply(Side::Win, 2024, Delta::Increment);
        stats.win = 5;

        assert!(!stats.is_consistent());
    }

    #[test]
    fn test_win_rate() {
        assert_eq!(win_rate(0, 0), 0.0);
        assert_eq!(win_rate(3, 1), 75.0);
        assert_eq!(YearRecord { wins: 1, losses: 1 }.win_rate(), 50.0);
    }

    #[test]
    fn test_side_round_trips_through_string() {
        assert_eq!(Side::from_string(&Side::Win.to_string()), Some(Side::Win));
        assert_eq!(Side::from_string(&Side::Loss.to_string()), Some(Side::Loss));
        assert_eq!(Side::from_string("draw"), None);
    }
}
