use chrono::{DateTime, Datelike, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::stats::PlayerStats;

/// Opaque player identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub i64);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque game result identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub i64);

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Represents a player record with its cached counters
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub stats: PlayerStats,
    pub created_at: DateTime<Utc>,
}

impl Serialize for Player {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct PlayerJson<'a> {
            id: PlayerId,
            name: &'a str,
            win: i64,
            loss: i64,
            wins_by_year: std::collections::BTreeMap<i32, i64>,
            losses_by_year: std::collections::BTreeMap<i32, i64>,
            created_at: DateTime<Utc>,
        }

        PlayerJson {
            id: self.id,
            name: &self.name,
            win: self.stats.win,
            loss: self.stats.loss,
            wins_by_year: self.stats.wins_by_year(),
            losses_by_year: self.stats.losses_by_year(),
            created_at: self.created_at,
        }
        .serialize(serializer)
    }
}

/// Represents a stored game result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub id: GameId,
    pub date: DateTime<Utc>,
    pub win_player_ids: Vec<PlayerId>,
    pub loss_player_ids: Vec<PlayerId>,
}

/// A roster entry resolved to the player's current display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerRef {
    pub id: PlayerId,
    pub name: String,
}

/// A game result with both rosters resolved to names, as shown in day listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResultView {
    pub id: GameId,
    pub date: DateTime<Utc>,
    pub win_players: Vec<PlayerRef>,
    pub loss_players: Vec<PlayerRef>,
}

/// Name used for roster ids that no longer resolve to a player.
pub const UNKNOWN_PLAYER: &str = "Unknown";

/// Years that fit the four-digit stored timestamp.
pub const STORABLE_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

pub fn is_storable(timestamp: &DateTime<Utc>) -> bool {
    STORABLE_YEARS.contains(&timestamp.year())
}

/// Fixed-width UTC timestamp so string order matches time order in SQLite.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

/// Start of `day` and start of the following day, both UTC.
pub fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(chrono::NaiveTime::MIN).and_utc();
    (start, start + chrono::Duration::days(1))
}

/// Half-open range of stored timestamp strings falling on `day`.
///
/// Bounded by the day prefix rather than the next midnight, so 9999-12-31
/// does not need a five-digit upper bound.
pub fn day_range_keys(day: NaiveDate) -> (String, String) {
    let prefix = day.format("%Y-%m-%d").to_string();
    (format!("{prefix}T"), format!("{prefix}U"))
}

/// Parse a client-supplied date: a full RFC 3339 timestamp or a bare
/// `YYYY-MM-DD`, which is taken as midnight UTC. Dates whose UTC year
/// falls outside [`STORABLE_YEARS`] are rejected.
pub fn parse_date_input(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    let parsed = match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(_) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .map(|d| day_bounds(d).0),
    };
    parsed.filter(is_storable)
}

/// Serde adapter for optional request dates in either accepted format.
pub fn deserialize_date_input<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) => parse_date_input(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {s}"))),
    }
}
