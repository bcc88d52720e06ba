//! Per-category cache age policy.
//!
//! Every cached query belongs to a [`QueryCategory`], which owns the cache
//! key prefix and a maximum age. Ages are tuning knobs; the one ordering
//! that must hold is that full career history (the most expensive query
//! and the slowest to change) is cached longer than the live roster
//! snapshot. [`CachePolicy::validate`] enforces it.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::ttl::DEFAULT_MAX_ENTRIES;
use crate::{CourtsideError, Result};

/// Default page size for paginated walks.
pub const DEFAULT_PAGE_SIZE: usize = 1_000;

/// Default row cap for full career history.
pub const DEFAULT_FULL_HISTORY_MAX_ROWS: usize = 5_000;

/// Logical query categories, one per cache key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryCategory {
    LatestDate,
    ActivePlayers,
    PlayerDimensions,
    PlayerDimension,
    PlayerCurrent,
    PlayerIndex,
    PlayerHistory,
    FullPlayerHistory,
    SearchPlayers,
    LongevityRows,
    LongevityTrajectory,
    ConferenceStandings,
    TeamSimulation,
    TeamWinDistribution,
}

impl QueryCategory {
    /// All categories.
    pub const ALL: [QueryCategory; 14] = [
        Self::LatestDate,
        Self::ActivePlayers,
        Self::PlayerDimensions,
        Self::PlayerDimension,
        Self::PlayerCurrent,
        Self::PlayerIndex,
        Self::PlayerHistory,
        Self::FullPlayerHistory,
        Self::SearchPlayers,
        Self::LongevityRows,
        Self::LongevityTrajectory,
        Self::ConferenceStandings,
        Self::TeamSimulation,
        Self::TeamWinDistribution,
    ];

    /// Cache key prefix.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::LatestDate => "latestDate",
            Self::ActivePlayers => "activePlayers",
            Self::PlayerDimensions => "playerDimensions",
            Self::PlayerDimension => "playerDimension",
            Self::PlayerCurrent => "playerCurrent",
            Self::PlayerIndex => "playersIndex",
            Self::PlayerHistory => "playerHistory",
            Self::FullPlayerHistory => "fullPlayerHistory",
            Self::SearchPlayers => "searchPlayers",
            Self::LongevityRows => "longevityRows",
            Self::LongevityTrajectory => "longevityTrajectory",
            Self::ConferenceStandings => "conferenceStandings",
            Self::TeamSimulation => "teamSimulation",
            Self::TeamWinDistribution => "teamWinDistribution",
        }
    }

    /// Configuration name (snake_case), as used in TOML overrides.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LatestDate => "latest_date",
            Self::ActivePlayers => "active_players",
            Self::PlayerDimensions => "player_dimensions",
            Self::PlayerDimension => "player_dimension",
            Self::PlayerCurrent => "player_current",
            Self::PlayerIndex => "player_index",
            Self::PlayerHistory => "player_history",
            Self::FullPlayerHistory => "full_player_history",
            Self::SearchPlayers => "search_players",
            Self::LongevityRows => "longevity_rows",
            Self::LongevityTrajectory => "longevity_trajectory",
            Self::ConferenceStandings => "conference_standings",
            Self::TeamSimulation => "team_simulation",
            Self::TeamWinDistribution => "team_win_distribution",
        }
    }

    /// Default maximum age.
    pub fn default_max_age(self) -> Duration {
        let secs = match self {
            Self::LatestDate | Self::ActivePlayers | Self::PlayerCurrent => 60,
            Self::ConferenceStandings | Self::TeamSimulation | Self::TeamWinDistribution => 60,
            Self::SearchPlayers => 120,
            Self::PlayerDimensions | Self::PlayerDimension | Self::PlayerIndex => 300,
            Self::PlayerHistory | Self::LongevityRows => 300,
            Self::LongevityTrajectory => 600,
            Self::FullPlayerHistory => 1_800,
        };
        Duration::from_secs(secs)
    }

    /// Build a cache key: `prefix:parameter`.
    ///
    /// Callers canonicalise `parameter` (trim, case-fold) beforehand.
    pub fn key(self, parameter: impl fmt::Display) -> String {
        format!("{}:{parameter}", self.prefix())
    }
}

impl fmt::Display for QueryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryCategory {
    type Err = CourtsideError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CourtsideError::Configuration(format!("unknown cache category '{s}'")))
    }
}

/// Cache sizing and age policy.
///
/// ```rust
/// # use courtside::{CachePolicy, QueryCategory};
/// # use std::time::Duration;
/// let policy = CachePolicy::new()
///     .max_entries(500)
///     .ttl(QueryCategory::ActivePlayers, Duration::from_secs(30));
/// assert_eq!(policy.max_age(QueryCategory::ActivePlayers), Duration::from_secs(30));
/// ```
#[derive(Debug, Clone)]
pub struct CachePolicy {
    /// Maximum number of cached entries. Default: 300.
    pub max_entries: usize,
    /// Rows requested per page by paginated walks. Default: 1,000.
    pub page_size: usize,
    /// Row cap for full career history. Default: 5,000.
    pub full_history_max_rows: usize,
    overrides: HashMap<QueryCategory, Duration>,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            page_size: DEFAULT_PAGE_SIZE,
            full_history_max_rows: DEFAULT_FULL_HISTORY_MAX_ROWS,
            overrides: HashMap::new(),
        }
    }
}

impl CachePolicy {
    /// Create a policy with the default ages and bounds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: usize) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the page size for paginated walks.
    pub fn page_size(mut self, n: usize) -> Self {
        self.page_size = n;
        self
    }

    /// Set the full career history row cap.
    pub fn full_history_max_rows(mut self, n: usize) -> Self {
        self.full_history_max_rows = n;
        self
    }

    /// Override the maximum age of one category.
    pub fn ttl(mut self, category: QueryCategory, max_age: Duration) -> Self {
        self.overrides.insert(category, max_age);
        self
    }

    /// Effective maximum age for `category`.
    pub fn max_age(&self, category: QueryCategory) -> Duration {
        self.overrides
            .get(&category)
            .copied()
            .unwrap_or_else(|| category.default_max_age())
    }

    /// Reject policies that cannot work or invert the age ordering.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(CourtsideError::Configuration(
                "page_size must be at least 1".to_string(),
            ));
        }
        if self.full_history_max_rows == 0 {
            return Err(CourtsideError::Configuration(
                "full_history_max_rows must be at least 1".to_string(),
            ));
        }
        let full = self.max_age(QueryCategory::FullPlayerHistory);
        let live = self.max_age(QueryCategory::ActivePlayers);
        if full < live {
            return Err(CourtsideError::Configuration(format!(
                "full history max age ({full:?}) must not be shorter than the active roster max age ({live:?})"
            )));
        }
        Ok(())
    }
}
