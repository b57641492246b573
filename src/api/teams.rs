use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};

use super::{AppState, games::json_body};
use crate::db::{
    self,
    models::{Player, PlayerId, PlayerRef},
};
use crate::error::Result;
use crate::teams::{split_teams, team_average_win_rate};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomizeRequest {
    #[serde(default)]
    pub player_ids: Vec<PlayerId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomizeResponse {
    pub team1: Vec<PlayerRef>,
    pub team2: Vec<PlayerRef>,
    pub team1_win_rate: f64,
    pub team2_win_rate: f64,
}

pub async fn randomize(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RandomizeRequest>, JsonRejection>,
) -> Result<Json<RandomizeResponse>> {
    let body = json_body(payload)?;
    let teams = split_teams(&body.player_ids, &mut rand::rng())?;

    let team1 = load_team(&state, &teams.team1).await?;
    let team2 = load_team(&state, &teams.team2).await?;

    Ok(Json(RandomizeResponse {
        team1_win_rate: team_average_win_rate(&team1),
        team2_win_rate: team_average_win_rate(&team2),
        team1: team1.into_iter().map(to_ref).collect(),
        team2: team2.into_iter().map(to_ref).collect(),
    }))
}

async fn load_team(state: &AppState, ids: &[PlayerId]) -> Result<Vec<Player>> {
    let mut players = Vec::with_capacity(ids.len());
    for &id in ids {
        players.push(db::players::get_player(&state.pool, id).await?);
    }
    Ok(players)
}

fn to_ref(player: Player) -> PlayerRef {
    PlayerRef {
        id: player.id,
        name: player.name,
    }
}
