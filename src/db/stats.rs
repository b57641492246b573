use sqlx::SqliteConnection;
use tracing::{debug, warn};

use super::models::PlayerId;
use crate::error::{LedgerError, Result};
use crate::stats::{Delta, PlayerStats, Side, YearRecord};

/// Load one player's counters, or `None` if the player does not exist
pub async fn load_stats(conn: &mut SqliteConnection, player_id: PlayerId) -> Result<Option<PlayerStats>> {
    let totals: Option<(i64, i64)> = sqlx::query_as(
        r#"
        SELECT win, loss FROM players
        WHERE id = ?
        "#,
    )
    .bind(player_id.0)
    .fetch_optional(&mut *conn)
    .await?;

    let Some((win, loss)) = totals else {
        return Ok(None);
    };

    let years: Vec<(i64, i64, i64)> = sqlx::query_as(
        r#"
        SELECT year, wins, losses FROM player_year_stats
        WHERE player_id = ?
        ORDER BY year ASC
        "#,
    )
    .bind(player_id.0)
    .fetch_all(&mut *conn)
    .await?;

    let by_year = years
        .into_iter()
        .map(|(year, wins, losses)| (year as i32, YearRecord { wins, losses }))
        .collect();

    Ok(Some(PlayerStats { win, loss, by_year }))
}

/// Apply a signed delta to one side's counters for every listed player.
///
/// Runs on the caller's connection, which is expected to be inside the same
/// transaction as the game-result write that triggered it. Only the listed
/// players are read or written.
///
/// A year whose record returns to zero is removed, so absent and zero
/// years look the same.
///
/// An unknown player aborts an increment with `NotFound`. A decrement skips
/// it: there is nothing left to take the game back from.
pub async fn apply_delta(
    conn: &mut SqliteConnection,
    player_ids: &[PlayerId],
    side: Side,
    year: i32,
    delta: Delta,
) -> Result<()> {
    for &player_id in player_ids {
        let Some(mut stats) = load_stats(conn, player_id).await? else {
            if delta == Delta::Increment {
                return Err(LedgerError::not_found(format!("Player {player_id} not found")));
            }
            warn!(%player_id, %side, year, "skipping counter decrement for missing player");
            continue;
        };

        let record = stats.apply(side, year, delta);

        if record == YearRecord::default() {
            sqlx::query("DELETE FROM player_year_stats WHERE player_id = ? AND year = ?")
                .bind(player_id.0)
                .bind(year)
                .execute(&mut *conn)
                .await?;
        } else {
            sqlx::query(
                r#"
                INSERT INTO player_year_stats (player_id, year, wins, losses)
                VALUES (?, ?, ?, ?)
                ON CONFLICT (player_id, year)
                DO UPDATE SET wins = excluded.wins, losses = excluded.losses
                "#,
            )
            .bind(player_id.0)
            .bind(year)
            .bind(record.wins)
            .bind(record.losses)
            .execute(&mut *conn)
            .await?;
        }

        sqlx::query(
            r#"
            UPDATE players
            SET win = ?, loss = ?
            WHERE id = ?
            "#,
        )
        .bind(stats.win)
        .bind(stats.loss)
        .bind(player_id.0)
        .execute(&mut *conn)
        .await?;

        debug!(%player_id, %side, year, wins = record.wins, losses = record.losses, "counters adjusted");
    }

    Ok(())
}

/// Apply `delta` to both rosters of a game for `year`
pub async fn apply_game_delta(
    conn: &mut SqliteConnection,
    win_player_ids: &[PlayerId],
    loss_player_ids: &[PlayerId],
    year: i32,
    delta: Delta,
) -> Result<()> {
    apply_delta(conn, win_player_ids, Side::Win, year, delta).await?;
    apply_delta(conn, loss_player_ids, Side::Loss, year, delta).await
}
