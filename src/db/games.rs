use std::collections::HashSet;

use chrono::{DateTime, Datelike, NaiveDate, SubsecRound, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use super::models::{
    GameId, GameResult, GameResultView, PlayerId, PlayerRef, UNKNOWN_PLAYER, day_range_keys,
    format_timestamp, is_storable, parse_timestamp,
};
use super::stats::apply_game_delta;
use crate::error::{LedgerError, Result};
use crate::stats::{Delta, Side};

/// Validated winner and loser rosters for one game.
///
/// Both lists are non-empty, free of duplicates, and disjoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rosters {
    winners: Vec<PlayerId>,
    losers: Vec<PlayerId>,
}

impl Rosters {
    pub fn new(winners: Vec<PlayerId>, losers: Vec<PlayerId>) -> Result<Self> {
        if winners.is_empty() {
            return Err(LedgerError::validation("winPlayerIds must not be empty"));
        }
        if losers.is_empty() {
            return Err(LedgerError::validation("lossPlayerIds must not be empty"));
        }

        let mut seen = HashSet::with_capacity(winners.len() + losers.len());
        for id in &winners {
            if !seen.insert(*id) {
                return Err(LedgerError::validation(format!(
                    "Player {id} appears more than once in winPlayerIds"
                )));
            }
        }
        for id in &losers {
            if !seen.insert(*id) {
                let msg = if winners.contains(id) {
                    format!("Player {id} cannot be both a winner and a loser")
                } else {
                    format!("Player {id} appears more than once in lossPlayerIds")
                };
                return Err(LedgerError::validation(msg));
            }
        }

        Ok(Self { winners, losers })
    }

    pub fn winners(&self) -> &[PlayerId] {
        &self.winners
    }

    pub fn losers(&self) -> &[PlayerId] {
        &self.losers
    }
}

/// Record a finished game and credit every player on both rosters
pub async fn create_game(pool: &SqlitePool, rosters: Rosters, date: DateTime<Utc>) -> Result<GameResult> {
    let date = storable_date(date)?;
    let date_str = format_timestamp(date);
    let year = date.year();

    let mut tx = pool.begin_with("BEGIN IMMEDIATE").await?;

    let result = sqlx::query(
        r#"
        INSERT INTO game_results (date)
        VALUES (?)
        "#,
    )
    .bind(&date_str)
    .execute(&mut *tx)
    .await?;

    let game_id = GameId(result.last_insert_rowid());

    insert_rosters(&mut tx, game_id, &rosters).await?;
    apply_game_delta(&mut tx, rosters.winners(), rosters.losers(), year, Delta::Increment).await?;

    tx.commit().await?;

    info!(
        %game_id,
        year,
        winners = rosters.winners().len(),
        losers = rosters.losers().len(),
        "game result created"
    );

    Ok(GameResult {
        id: game_id,
        date,
        win_player_ids: rosters.winners,
        loss_player_ids: rosters.losers,
    })
}

/// Replace a game's date and rosters, moving the counters with it
pub async fn update_game(
    pool: &SqlitePool,
    game_id: GameId,
    date: DateTime<Utc>,
    rosters: Rosters,
) -> Result<GameResult> {
    let date = storable_date(date)?;
    let date_str = format_timestamp(date);
    let new_year = date.year();

    let mut tx = pool.begin_with("BEGIN IMMEDIATE").await?;

    let old = fetch_game(&mut tx, game_id)
        .await?
        .ok_or_else(|| game_not_found(game_id))?;
    let old_year = old.date.year();

    apply_game_delta(
        &mut tx,
        &old.win_player_ids,
        &old.loss_player_ids,
        old_year,
        Delta::Decrement,
    )
    .await?;

    sqlx::query(
        r#"
        UPDATE game_results
        SET date = ?
        WHERE id = ?
        "#,
    )
    .bind(&date_str)
    .bind(game_id.0)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM game_result_players WHERE game_id = ?")
        .bind(game_id.0)
        .execute(&mut *tx)
        .await?;

    insert_rosters(&mut tx, game_id, &rosters).await?;
    apply_game_delta(&mut tx, rosters.winners(), rosters.losers(), new_year, Delta::Increment).await?;

    tx.commit().await?;

    info!(%game_id, old_year, new_year, "game result updated");

    Ok(GameResult {
        id: game_id,
        date,
        win_player_ids: rosters.winners,
        loss_player_ids: rosters.losers,
    })
}

/// Remove a game and take its result back from every player on it
pub async fn delete_game(pool: &SqlitePool, game_id: GameId) -> Result<()> {
    let mut tx = pool.begin_with("BEGIN IMMEDIATE").await?;

    let game = fetch_game(&mut tx, game_id)
        .await?
        .ok_or_else(|| game_not_found(game_id))?;
    let year = game.date.year();

    apply_game_delta(
        &mut tx,
        &game.win_player_ids,
        &game.loss_player_ids,
        year,
        Delta::Decrement,
    )
    .await?;

    sqlx::query("DELETE FROM game_result_players WHERE game_id = ?")
        .bind(game_id.0)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM game_results WHERE id = ?")
        .bind(game_id.0)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(%game_id, year, "game result deleted");
    Ok(())
}

/// Get a game by ID
pub async fn get_game(pool: &SqlitePool, game_id: GameId) -> Result<GameResult> {
    let mut conn = pool.acquire().await?;
    fetch_game(&mut conn, game_id)
        .await?
        .ok_or_else(|| game_not_found(game_id))
}

/// Get every game played on `day` (UTC), most recent first, with names resolved
pub async fn list_games_by_date(pool: &SqlitePool, day: NaiveDate) -> Result<Vec<GameResultView>> {
    let (start_key, end_key) = day_range_keys(day);

    let rows: Vec<(i64, String)> = sqlx::query_as(
        r#"
        SELECT id, date
        FROM game_results
        WHERE date >= ? AND date < ?
        ORDER BY date DESC, id DESC
        "#,
    )
    .bind(&start_key)
    .bind(&end_key)
    .fetch_all(pool)
    .await?;

    let mut views = Vec::with_capacity(rows.len());

    for (id, date) in rows {
        let roster_rows: Vec<(i64, String, Option<String>)> = sqlx::query_as(
            r#"
            SELECT grp.player_id, grp.side, p.name
            FROM game_result_players grp
            LEFT JOIN players p ON p.id = grp.player_id
            WHERE grp.game_id = ?
            ORDER BY grp.position ASC
            "#,
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        let mut win_players = Vec::new();
        let mut loss_players = Vec::new();
        for (player_id, side, name) in roster_rows {
            let entry = PlayerRef {
                id: PlayerId(player_id),
                name: name.unwrap_or_else(|| UNKNOWN_PLAYER.to_string()),
            };
            match Side::from_string(&side) {
                Some(Side::Win) => win_players.push(entry),
                Some(Side::Loss) => loss_players.push(entry),
                None => return Err(bad_side(&side)),
            }
        }

        views.push(GameResultView {
            id: GameId(id),
            date: parse_timestamp(&date)?,
            win_players,
            loss_players,
        });
    }

    Ok(views)
}

async fn fetch_game(conn: &mut SqliteConnection, game_id: GameId) -> Result<Option<GameResult>> {
    let date: Option<String> = sqlx::query_scalar("SELECT date FROM game_results WHERE id = ?")
        .bind(game_id.0)
        .fetch_optional(&mut *conn)
        .await?;

    let Some(date) = date else {
        return Ok(None);
    };

    let roster_rows: Vec<(i64, String)> = sqlx::query_as(
        r#"
        SELECT player_id, side
        FROM game_result_players
        WHERE game_id = ?
        ORDER BY position ASC
        "#,
    )
    .bind(game_id.0)
    .fetch_all(&mut *conn)
    .await?;

    let mut win_player_ids = Vec::new();
    let mut loss_player_ids = Vec::new();
    for (player_id, side) in roster_rows {
        match Side::from_string(&side) {
            Some(Side::Win) => win_player_ids.push(PlayerId(player_id)),
            Some(Side::Loss) => loss_player_ids.push(PlayerId(player_id)),
            None => return Err(bad_side(&side)),
        }
    }

    Ok(Some(GameResult {
        id: game_id,
        date: parse_timestamp(&date)?,
        win_player_ids,
        loss_player_ids,
    }))
}

async fn insert_rosters(conn: &mut SqliteConnection, game_id: GameId, rosters: &Rosters) -> Result<()> {
    let entries = rosters
        .winners()
        .iter()
        .enumerate()
        .map(|(pos, id)| (Side::Win, pos, id))
        .chain(
            rosters
                .losers()
                .iter()
                .enumerate()
                .map(|(pos, id)| (Side::Loss, pos, id)),
        );

    for (side, position, player_id) in entries {
        sqlx::query(
            r#"
            INSERT INTO game_result_players (game_id, player_id, side, position)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(game_id.0)
        .bind(player_id.0)
        .bind(side.to_string())
        .bind(position as i64)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Millisecond precision, matching what is stored, within the storable years
fn storable_date(date: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if !is_storable(&date) {
        return Err(LedgerError::validation(format!(
            "Date {date} is outside the supported years 0000-9999"
        )));
    }
    Ok(date.trunc_subsecs(3))
}

fn game_not_found(game_id: GameId) -> LedgerError {
    LedgerError::not_found(format!("Game result {game_id} not found"))
}

fn bad_side(side: &str) -> LedgerError {
    LedgerError::Persistence(sqlx::Error::Protocol(format!("unexpected roster side: {side}")))
}
