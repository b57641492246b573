use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{Value, json};

use super::AppState;
use crate::db::{
    self,
    games::Rosters,
    models::{GameId, GameResult, GameResultView, PlayerId, deserialize_date_input},
};
use crate::error::{LedgerError, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    pub win_player_ids: Option<Vec<PlayerId>>,
    pub loss_player_ids: Option<Vec<PlayerId>>,
    #[serde(default, deserialize_with = "deserialize_date_input")]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGameRequest {
    #[serde(default, deserialize_with = "deserialize_date_input")]
    pub date: Option<DateTime<Utc>>,
    pub win_player_ids: Option<Vec<PlayerId>>,
    pub loss_player_ids: Option<Vec<PlayerId>>,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

pub(crate) fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| LedgerError::validation(e.body_text()))
}

/// Numeric `{id}` segment, rejected with the same JSON error shape as bodies.
pub(crate) fn path_id(path: std::result::Result<Path<i64>, PathRejection>) -> Result<i64> {
    path.map(|Path(id)| id)
        .map_err(|e| LedgerError::validation(e.body_text()))
}

pub async fn create_game(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateGameRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GameResult>)> {
    let body = json_body(payload)?;
    let (Some(winners), Some(losers)) = (body.win_player_ids, body.loss_player_ids) else {
        return Err(LedgerError::validation("Missing winPlayerIds or lossPlayerIds"));
    };

    let rosters = Rosters::new(winners, losers)?;
    let date = body.date.unwrap_or_else(Utc::now);

    let game = db::games::create_game(&state.pool, rosters, date).await?;
    Ok((StatusCode::CREATED, Json(game)))
}

pub async fn list_games(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<GameResultView>>> {
    let raw = query
        .date
        .ok_or_else(|| LedgerError::validation("Missing date"))?;
    let day = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| LedgerError::validation(format!("Invalid date: {raw}, expected YYYY-MM-DD")))?;

    let games = db::games::list_games_by_date(&state.pool, day).await?;
    Ok(Json(games))
}

pub async fn get_game(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<GameResult>> {
    let id = path_id(id)?;
    let game = db::games::get_game(&state.pool, GameId(id)).await?;
    Ok(Json(game))
}

pub async fn update_game(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
    payload: std::result::Result<Json<UpdateGameRequest>, JsonRejection>,
) -> Result<Json<GameResult>> {
    let id = path_id(id)?;
    let body = json_body(payload)?;
    let (Some(date), Some(winners), Some(losers)) =
        (body.date, body.win_player_ids, body.loss_player_ids)
    else {
        return Err(LedgerError::validation("Invalid request data"));
    };

    let rosters = Rosters::new(winners, losers)?;
    let game = db::games::update_game(&state.pool, GameId(id), date, rosters).await?;
    Ok(Json(game))
}

pub async fn delete_game(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>> {
    let id = path_id(id)?;
    db::games::delete_game(&state.pool, GameId(id)).await?;
    Ok(Json(json!({ "message": "Game result deleted successfully" })))
}
