use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::db::models::{Player, PlayerId};
use crate::error::{LedgerError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Teams {
    pub team1: Vec<PlayerId>,
    pub team2: Vec<PlayerId>,
}

/// Shuffle the selected players into two teams. Team 1 gets the smaller
/// half when the count is odd.
pub fn split_teams<R: Rng + ?Sized>(player_ids: &[PlayerId], rng: &mut R) -> Result<Teams> {
    if player_ids.len() < 2 {
        return Err(LedgerError::validation("Select at least two players"));
    }

    let mut seen = HashSet::with_capacity(player_ids.len());
    if let Some(dup) = player_ids.iter().find(|id| !seen.insert(**id)) {
        return Err(LedgerError::validation(format!("Player {dup} selected more than once")));
    }

    let mut shuffled = player_ids.to_vec();
    shuffled.shuffle(rng);

    let team2 = shuffled.split_off(shuffled.len() / 2);
    Ok(Teams {
        team1: shuffled,
        team2,
    })
}

/// Mean win rate of a team, ignoring members with a 0% rate.
pub fn team_average_win_rate(members: &[Player]) -> f64 {
    let rates: Vec<f64> = members
        .iter()
        .map(|p| p.stats.win_rate())
        .filter(|rate| *rate > 0.0)
        .collect();

    if rates.is_empty() {
        0.0
    } else {
        rates.iter().sum::<f64>() / rates.len() as f64
    }
}
