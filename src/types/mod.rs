//! Domain types: stored rows, merged views, and parameter newtypes.

pub mod lenient;
mod longevity;
mod player;
mod rating;
mod season;
mod team;

pub use longevity::{
    LONGEVITY_TABLE, LongevityRow, Projections, TRAJECTORY_COLUMNS, TrajectoryPoint,
    TrajectoryRow, normalize_probability,
};
pub use player::{
    DIMENSION_COLUMNS, FullHistory, HistoryLimit, IndexedPlayer, Longevity, PLAYERS_TABLE,
    PlayerDimension, PlayerId, PlayerProfile, PlayerRow, SURVIVAL_SEASONS, SearchHit,
};
pub use rating::{
    HISTORY_COLUMNS, Metrics, RATINGS_TABLE, RatingRow, SEARCH_COLUMNS, SNAPSHOT_COLUMNS,
};
pub use season::{parse_date, season_label, season_start_year};
pub use team::{
    SEASON_SIM_TABLE, TeamBundle, TeamSimulation, WIN_DISTRIBUTION_TABLE, WinDistributionRow,
    canonical_team_name,
};
