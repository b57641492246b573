use std::cmp::Ordering;

use serde::Serialize;

use crate::db::models::{Player, PlayerId};
use crate::stats::YearRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    Wins,
    #[default]
    WinRate,
}

impl SortBy {
    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "wins" => Some(SortBy::Wins),
            "winRate" => Some(SortBy::WinRate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub id: PlayerId,
    pub name: String,
    pub wins: i64,
    pub losses: i64,
    pub total: i64,
    pub win_rate: f64,
}

/// Rank players by wins or win rate, over all years or a single one.
///
/// Equal sort keys share a rank and the next key skips ahead ("1224").
pub fn leaderboard(players: &[Player], sort: SortBy, year: Option<i32>) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = players
        .iter()
        .map(|player| {
            let record = match year {
                Some(y) => player.stats.year(y),
                None => YearRecord {
                    wins: player.stats.win,
                    losses: player.stats.loss,
                },
            };
            LeaderboardEntry {
                rank: 0,
                id: player.id,
                name: player.name.clone(),
                wins: record.wins,
                losses: record.losses,
                total: record.total(),
                win_rate: record.win_rate(),
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        let (primary, secondary) = match sort {
            SortBy::Wins => (b.wins.cmp(&a.wins), b.win_rate.total_cmp(&a.win_rate)),
            SortBy::WinRate => (b.win_rate.total_cmp(&a.win_rate), b.wins.cmp(&a.wins)),
        };
        primary.then(secondary).then_with(|| a.name.cmp(&b.name))
    });

    for i in 0..entries.len() {
        let rank = if i > 0 && same_key(&entries[i - 1], &entries[i], sort) {
            entries[i - 1].rank
        } else {
            i + 1
        };
        entries[i].rank = rank;
    }

    entries
}

fn same_key(a: &LeaderboardEntry, b: &LeaderboardEntry, sort: SortBy) -> bool {
    match sort {
        SortBy::Wins => a.wins == b.wins,
        SortBy::WinRate => a.win_rate.total_cmp(&b.win_rate) == Ordering::Equal,
    }
}
