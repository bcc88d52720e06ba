//! Rating rows: one player on one date, from `darko_shiny_history`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient;

/// Rating history table.
pub const RATINGS_TABLE: &str = "darko_shiny_history";

/// Columns read for the active roster snapshot.
pub const SNAPSHOT_COLUMNS: &[&str] = &[
    "nba_id",
    "player_name",
    "team_name",
    "dpm",
    "o_dpm",
    "d_dpm",
    "box_dpm",
    "box_odpm",
    "box_ddpm",
    "position",
    "age",
    "tr_minutes",
    "tr_fg3_pct",
    "tr_ft_pct",
    "seconds_played",
    "active_roster",
    "date",
];

/// Columns read for full career history.
pub const HISTORY_COLUMNS: &[&str] = &[
    "nba_id",
    "player_name",
    "team_name",
    "dpm",
    "o_dpm",
    "d_dpm",
    "box_dpm",
    "box_odpm",
    "box_ddpm",
    "age",
    "career_game_num",
    "date",
    "tr_fg3_pct",
    "tr_ft_pct",
    "position",
];

/// Columns read for name search.
pub const SEARCH_COLUMNS: &[&str] = &["nba_id", "player_name", "team_name", "position", "dpm", "date"];

/// Per-row performance metrics. Every field is optional; junk decodes to
/// `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Daily plus-minus, the primary ranking metric.
    #[serde(default, deserialize_with = "lenient::number")]
    pub dpm: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub o_dpm: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub d_dpm: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub box_dpm: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub box_odpm: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub box_ddpm: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub tr_minutes: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub tr_fg3_pct: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub tr_ft_pct: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub seconds_played: Option<f64>,
}

/// One rating row as stored.
///
/// Columns not modelled here (from `select *`) are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RatingRow {
    #[serde(deserialize_with = "lenient::id")]
    pub nba_id: i64,
    #[serde(default)]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub player_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub team_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub age: Option<f64>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub career_game_num: Option<i64>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub active_roster: Option<i64>,
    #[serde(flatten)]
    pub metrics: Metrics,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
