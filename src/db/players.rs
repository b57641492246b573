use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use super::models::{Player, PlayerId, format_timestamp, parse_timestamp};
use crate::error::{LedgerError, Result};
use crate::stats::{PlayerStats, YearRecord};

#[derive(sqlx::FromRow)]
struct PlayerRow {
    id: i64,
    name: String,
    win: i64,
    loss: i64,
    created_at: String,
}

impl PlayerRow {
    fn into_player(self, by_year: BTreeMap<i32, YearRecord>) -> Result<Player> {
        Ok(Player {
            id: PlayerId(self.id),
            name: self.name,
            stats: PlayerStats {
                win: self.win,
                loss: self.loss,
                by_year,
            },
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

/// Register a new player with zeroed counters
pub async fn create_player(pool: &SqlitePool, name: &str) -> Result<Player> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::validation("Player name is required"));
    }

    let created_at = Utc::now();
    let created_at_str = format_timestamp(created_at);

    let result = sqlx::query(
        r#"
        INSERT INTO players (name, win, loss, created_at)
        VALUES (?, 0, 0, ?)
        "#,
    )
    .bind(name)
    .bind(&created_at_str)
    .execute(pool)
    .await?;

    let id = PlayerId(result.last_insert_rowid());
    info!(player_id = %id, name, "player created");

    Ok(Player {
        id,
        name: name.to_string(),
        stats: PlayerStats::new(),
        created_at: parse_timestamp(&created_at_str)?,
    })
}

/// Get a player by ID with its per-year counters
pub async fn get_player(pool: &SqlitePool, player_id: PlayerId) -> Result<Player> {
    let row: Option<PlayerRow> = sqlx::query_as(
        r#"
        SELECT id, name, win, loss, created_at
        FROM players
        WHERE id = ?
        "#,
    )
    .bind(player_id.0)
    .fetch_optional(pool)
    .await?;

    let row = row.ok_or_else(|| LedgerError::not_found(format!("Player {player_id} not found")))?;

    let years: Vec<(i64, i64, i64)> = sqlx::query_as(
        r#"
        SELECT year, wins, losses FROM player_year_stats
        WHERE player_id = ?
        "#,
    )
    .bind(player_id.0)
    .fetch_all(pool)
    .await?;

    let by_year = years
        .into_iter()
        .map(|(year, wins, losses)| (year as i32, YearRecord { wins, losses }))
        .collect();

    row.into_player(by_year)
}

/// Get all players, ordered by ID
pub async fn list_players(pool: &SqlitePool) -> Result<Vec<Player>> {
    let rows: Vec<PlayerRow> = sqlx::query_as(
        r#"
        SELECT id, name, win, loss, created_at
        FROM players
        ORDER BY id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let year_rows: Vec<(i64, i64, i64, i64)> = sqlx::query_as(
        r#"
        SELECT player_id, year, wins, losses
        FROM player_year_stats
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut years: HashMap<i64, BTreeMap<i32, YearRecord>> = HashMap::new();
    for (player_id, year, wins, losses) in year_rows {
        years
            .entry(player_id)
            .or_default()
            .insert(year as i32, YearRecord { wins, losses });
    }

    rows.into_iter()
        .map(|row| {
            let by_year = years.remove(&row.id).unwrap_or_default();
            row.into_player(by_year)
        })
        .collect()
}
