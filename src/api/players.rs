use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use serde::Deserialize;

use super::{
    AppState,
    games::{json_body, path_id},
};
use crate::db::{
    self,
    models::{Player, PlayerId},
};
use crate::error::{LedgerError, Result};
use crate::leaderboard::{LeaderboardEntry, SortBy, leaderboard as rank_players};

#[derive(Debug, Deserialize)]
pub struct CreatePlayerRequest {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub sort: Option<String>,
    pub year: Option<i32>,
}

pub async fn create_player(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreatePlayerRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Player>)> {
    let body = json_body(payload)?;
    let name = body.name.unwrap_or_default();

    let player = db::players::create_player(&state.pool, &name).await?;
    Ok((StatusCode::CREATED, Json(player)))
}

pub async fn list_players(State(state): State<AppState>) -> Result<Json<Vec<Player>>> {
    let players = db::players::list_players(&state.pool).await?;
    Ok(Json(players))
}

pub async fn get_player(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<Player>> {
    let id = path_id(id)?;
    let player = db::players::get_player(&state.pool, PlayerId(id)).await?;
    Ok(Json(player))
}

pub async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>> {
    let sort = match query.sort.as_deref() {
        None => SortBy::default(),
        Some(s) => SortBy::from_string(s)
            .ok_or_else(|| LedgerError::validation(format!("Unknown sort: {s}, expected wins or winRate")))?,
    };

    let players = db::players::list_players(&state.pool).await?;
    Ok(Json(rank_players(&players, sort, query.year)))
}
