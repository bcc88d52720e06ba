//! Longevity projections: per-player survival rows and retirement-age
//! trajectories.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::lenient;
use super::player::SURVIVAL_SEASONS;
use super::season::{season_label, season_start_year};

/// Season-level longevity projection table.
pub const LONGEVITY_TABLE: &str = "longevity_history";

/// Columns read for a trajectory.
pub const TRAJECTORY_COLUMNS: &[&str] = &["nba_id", "season", "date", "projected_retirement_age"];

/// Bring a stored survival probability onto the 0–100 scale.
///
/// Values `<= 1` are fractions and are multiplied by 100; larger values
/// are already percentages. Non-finite or missing input stays absent.
///
/// ```rust
/// # use courtside::types::normalize_probability;
/// assert_eq!(normalize_probability(Some(0.75)), Some(75.0));
/// assert_eq!(normalize_probability(Some(75.0)), Some(75.0));
/// assert_eq!(normalize_probability(None), None);
/// ```
pub fn normalize_probability(value: Option<f64>) -> Option<f64> {
    let value = value.filter(|v| v.is_finite())?;
    Some(if value <= 1.0 { value * 100.0 } else { value })
}

/// Survival projections `p1..p12`, each on the 0–100 scale.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Projections(pub [Option<f64>; SURVIVAL_SEASONS]);

impl Projections {
    /// Normalize raw `s1..s12` values.
    pub fn from_survival(survival: &[Option<f64>; SURVIVAL_SEASONS]) -> Self {
        Self(survival.map(normalize_probability))
    }

    /// Projection for season `n` (1-based).
    pub fn season(&self, n: usize) -> Option<f64> {
        n.checked_sub(1).and_then(|i| self.0.get(i).copied().flatten())
    }
}

impl Serialize for Projections {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(SURVIVAL_SEASONS))?;
        for (i, value) in self.0.iter().enumerate() {
            map.serialize_entry(&format!("p{}", i + 1), value)?;
        }
        map.end()
    }
}

/// One row of the longevity table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongevityRow {
    pub nba_id: i64,
    pub player_name: Option<String>,
    pub team_name: Option<String>,
    pub rookie_season: Option<i64>,
    pub career_games: Option<f64>,
    pub age: Option<f64>,
    pub est_retirement_age: Option<f64>,
    pub years_remaining: Option<f64>,
    #[serde(flatten)]
    pub projections: Projections,
}

/// One `longevity_history` row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrajectoryRow {
    #[serde(deserialize_with = "lenient::id")]
    pub nba_id: i64,
    /// Season start year.
    #[serde(default, deserialize_with = "lenient::integer")]
    pub season: Option<i64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub projected_retirement_age: Option<f64>,
}

impl TrajectoryRow {
    /// Season start year: the `season` column, else derived from `date`.
    pub fn season_start_year(&self) -> Option<i32> {
        self.season
            .and_then(|s| i32::try_from(s).ok())
            .or_else(|| self.date.as_deref().and_then(season_start_year))
    }
}

/// One point of a retirement-age trajectory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryPoint {
    /// Season label, e.g. `"2023-24"`.
    pub season_start: String,
    pub season_start_year: i32,
    pub projected_retirement_age: f64,
}

impl TrajectoryPoint {
    pub fn new(season_start_year: i32, projected_retirement_age: f64) -> Self {
        Self {
            season_start: season_label(season_start_year),
            season_start_year,
            projected_retirement_age,
        }
    }
}
