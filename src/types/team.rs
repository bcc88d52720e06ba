//! Team simulation and page bundle types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient;
use super::player::PlayerRow;

/// Season simulation table (one row per team).
pub const SEASON_SIM_TABLE: &str = "season_sim";

/// Win distribution table (one row per team and win total).
pub const WIN_DISTRIBUTION_TABLE: &str = "win_distribution";

/// Canonical team name from a route slug: `_` becomes a space, then trim.
///
/// ```rust
/// # use courtside::types::canonical_team_name;
/// assert_eq!(canonical_team_name(" Boston_Celtics "), "Boston Celtics");
/// ```
pub fn canonical_team_name(raw: &str) -> String {
    raw.replace('_', " ").trim().to_owned()
}

/// One `season_sim` row. Simulation outputs not modelled here pass through
/// in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSimulation {
    pub team_name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub conference: Option<String>,
    /// Conference rank.
    #[serde(rename = "Rk", default, deserialize_with = "lenient::integer")]
    pub rank: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One `win_distribution` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinDistributionRow {
    pub team_name: String,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub wins: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Everything a team page needs, fetched together.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamBundle {
    pub team_name: String,
    pub players: Vec<PlayerRow>,
    #[serde(rename = "sim")]
    pub simulation: Option<TeamSimulation>,
    #[serde(rename = "winDist")]
    pub win_distribution: Vec<WinDistributionRow>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn simulation_keeps_passthrough_columns() {
        let sim: TeamSimulation = serde_json::from_value(json!({
            "team_name": "Boston Celtics",
            "conference": "East",
            "Rk": "1",
            "proj_wins": 61.4,
            "playoff_pct": 0.998
        }))
        .unwrap();

        assert_eq!(sim.rank, Some(1));
        assert_eq!(sim.extra.len(), 2);

        let round: Value = serde_json::to_value(&sim).unwrap();
        assert_eq!(round["Rk"], json!(1));
        assert_eq!(round["proj_wins"], json!(61.4));
    }

    #[test]
    fn empty_bundle() {
        let bundle = TeamBundle::default();
        let value = serde_json::to_value(&bundle).unwrap();
        assert_eq!(value["players"], json!([]));
        assert_eq!(value["sim"], Value::Null);
        assert_eq!(value["winDist"], json!([]));
    }

    #[test]
    fn slug_canonicalisation() {
        assert_eq!(canonical_team_name("Los_Angeles_Lakers"), "Los Angeles Lakers");
        assert_eq!(canonical_team_name("  "), "");
    }
}
