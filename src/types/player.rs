//! Player identity, dimension, and merged view types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient;
use super::rating::Metrics;
use crate::{CourtsideError, Result};

/// Player dimension table.
pub const PLAYERS_TABLE: &str = "players";

/// Number of seasons covered by survival projections.
pub const SURVIVAL_SEASONS: usize = 12;

/// Explicit projection for the `players` table; it is never read with
/// `select *`.
pub const DIMENSION_COLUMNS: &[&str] = &[
    "nba_id",
    "player_name",
    "team_name",
    "position",
    "rookie_season",
    "career_games",
    "age",
    "est_retirement_age",
    "years_remaining",
    "s1",
    "s2",
    "s3",
    "s4",
    "s5",
    "s6",
    "s7",
    "s8",
    "s9",
    "s10",
    "s11",
    "s12",
];

/// A validated NBA player id (strictly positive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct PlayerId(i64);

impl PlayerId {
    /// Validate a numeric id.
    pub fn new(id: i64) -> Result<Self> {
        if id <= 0 {
            return Err(CourtsideError::InvalidInput(format!("invalid nba_id: {id}")));
        }
        Ok(Self(id))
    }

    /// Parse a route or CLI parameter.
    ///
    /// ```rust
    /// # use courtside::PlayerId;
    /// assert_eq!(PlayerId::parse(" 2544 ").unwrap().get(), 2544);
    /// assert!(PlayerId::parse("-3").is_err());
    /// assert!(PlayerId::parse("1.5").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        let id = raw
            .trim()
            .parse::<i64>()
            .map_err(|_| CourtsideError::InvalidInput(format!("invalid nba_id: {raw}")))?;
        Self::new(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for PlayerId {
    type Error = CourtsideError;

    fn try_from(id: i64) -> Result<Self> {
        Self::new(id)
    }
}

impl From<PlayerId> for i64 {
    fn from(id: PlayerId) -> Self {
        id.0
    }
}

impl FromStr for PlayerId {
    type Err = CourtsideError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Row limit for bounded player history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HistoryLimit(usize);

impl HistoryLimit {
    /// Limit used when the caller gives none (or an unusable one).
    pub const DEFAULT: usize = 1_000;
    /// Largest accepted limit.
    pub const MAX: usize = 2_000;

    /// Clamp `n` into `1..=MAX`.
    pub fn new(n: usize) -> Self {
        Self(n.clamp(1, Self::MAX))
    }

    /// Interpret a raw query parameter: missing, non-numeric or
    /// non-positive values fall back to the default; the rest are clamped.
    ///
    /// The whole trimmed value must be an integer. A numeric prefix with
    /// trailing characters, such as `"50abc"`, is not read as 50 and falls
    /// back to the default.
    pub fn from_param(raw: Option<&str>) -> Self {
        let parsed = raw
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|n| *n > 0)
            .map(|n| usize::try_from(n).unwrap_or(Self::MAX))
            .unwrap_or(Self::DEFAULT);
        Self::new(parsed)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for HistoryLimit {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// Longevity projection attributes from the dimension table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Longevity {
    pub career_games: Option<f64>,
    pub age: Option<f64>,
    pub est_retirement_age: Option<f64>,
    pub years_remaining: Option<f64>,
    /// Raw survival probabilities `s1..s12` (fraction or percentage).
    pub survival: [Option<f64>; SURVIVAL_SEASONS],
}

/// One `players` row: slowly-changing identity plus longevity projection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawDimension")]
pub struct PlayerDimension {
    pub nba_id: i64,
    pub player_name: Option<String>,
    pub team_name: Option<String>,
    pub position: Option<String>,
    pub rookie_season: Option<i64>,
    pub longevity: Longevity,
}

#[derive(Deserialize)]
struct RawDimension {
    #[serde(deserialize_with = "lenient::id")]
    nba_id: i64,
    #[serde(default, deserialize_with = "lenient::text")]
    player_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    team_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    position: Option<String>,
    #[serde(default, deserialize_with = "lenient::integer")]
    rookie_season: Option<i64>,
    #[serde(default, deserialize_with = "lenient::number")]
    career_games: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    age: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    est_retirement_age: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    years_remaining: Option<f64>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl From<RawDimension> for PlayerDimension {
    fn from(raw: RawDimension) -> Self {
        let mut survival = [None; SURVIVAL_SEASONS];
        for (i, slot) in survival.iter_mut().enumerate() {
            *slot = raw
                .rest
                .get(&format!("s{}", i + 1))
                .and_then(lenient::parse_number);
        }
        Self {
            nba_id: raw.nba_id,
            player_name: raw.player_name,
            team_name: raw.team_name,
            position: raw.position,
            rookie_season: raw.rookie_season,
            longevity: Longevity {
                career_games: raw.career_games,
                age: raw.age,
                est_retirement_age: raw.est_retirement_age,
                years_remaining: raw.years_remaining,
                survival,
            },
        }
    }
}

/// Identity fields after merging dimension and rating sources.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerProfile {
    pub nba_id: i64,
    pub player_name: Option<String>,
    pub team_name: Option<String>,
    pub position: Option<String>,
    pub age: Option<f64>,
    pub rookie_season: Option<i64>,
}

/// A rating row merged with its player's dimension record.
///
/// Used for the active roster snapshot, single-player history, and the
/// current snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerRow {
    #[serde(flatten)]
    pub profile: PlayerProfile,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub career_game_num: Option<i64>,
    #[serde(flatten)]
    pub metrics: Metrics,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// Dimension-side longevity, when the player has a dimension row.
    #[serde(skip)]
    pub longevity: Option<Longevity>,
}

/// One entry of the player index: every known player, with live metrics
/// when the player is on the active roster snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexedPlayer {
    #[serde(flatten)]
    pub profile: PlayerProfile,
    pub active: bool,
    /// Date of the attached snapshot row, if active.
    pub date: Option<String>,
    #[serde(flatten)]
    pub metrics: Metrics,
    #[serde(skip)]
    pub longevity: Longevity,
}

/// A name search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(deserialize_with = "lenient::id")]
    pub nba_id: i64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub player_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub team_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub dpm: Option<f64>,
    #[serde(default)]
    pub date: String,
}

/// Full career history with its truncation status.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FullHistory {
    pub rows: Vec<PlayerRow>,
    /// `true` when the row cap was reached with rows possibly left.
    pub truncated: bool,
    pub max_rows: usize,
}
