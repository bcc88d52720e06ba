//! Longevity pipelines: survival table rows and retirement-age
//! trajectories.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::DataGateway;
use crate::Result;
use crate::cache::QueryCategory;
use crate::store::{Query, decode_rows, fetch_all_pages};
use crate::types::{
    LONGEVITY_TABLE, Longevity, LongevityRow, PlayerId, PlayerProfile, Projections,
    TRAJECTORY_COLUMNS, TrajectoryPoint, TrajectoryRow,
};

impl DataGateway {
    /// Longevity table rows, from the active roster snapshot
    /// (`active_only`) or from the full player index.
    ///
    /// Only players with a dimension record carry projections; players
    /// without one are left out. Rows are sorted by years remaining
    /// descending (missing last), then by name.
    pub async fn longevity_rows(&self, active_only: bool) -> Result<Arc<Vec<LongevityRow>>> {
        let scope = if active_only { "active" } else { "all" };
        self.cached(QueryCategory::LongevityRows, scope, move |gw| async move {
            let mut rows: Vec<LongevityRow> = if active_only {
                gw.active_snapshot()
                    .await?
                    .iter()
                    .filter_map(|p| p.longevity.as_ref().map(|l| longevity_row(&p.profile, l)))
                    .collect()
            } else {
                gw.player_index()
                    .await?
                    .iter()
                    .map(|p| longevity_row(&p.profile, &p.longevity))
                    .collect()
            };
            sort_longevity(&mut rows);
            info!(rows = rows.len(), active_only, "longevity rows built");
            Ok(Arc::new(rows))
        })
        .await
    }

    /// Projected retirement age by season for one player, oldest season
    /// first.
    ///
    /// Rows sharing a season collapse to the last one read; seasons whose
    /// projection is not a finite number are skipped.
    pub async fn longevity_trajectory(&self, id: PlayerId) -> Result<Arc<Vec<TrajectoryPoint>>> {
        self.cached(QueryCategory::LongevityTrajectory, id, move |gw| async move {
            let query = Query::table(LONGEVITY_TABLE)
                .select(TRAJECTORY_COLUMNS)
                .eq("nba_id", id.get())
                .order("season", true)
                .order("date", true);
            let rows = fetch_all_pages(gw.store(), &query, gw.policy.page_size).await?;
            let rows: Vec<TrajectoryRow> = decode_rows(rows)?;
            let points = collapse_trajectory(rows);
            debug!(nba_id = id.get(), points = points.len(), "longevity trajectory built");
            Ok(Arc::new(points))
        })
        .await
    }
}

fn longevity_row(profile: &PlayerProfile, longevity: &Longevity) -> LongevityRow {
    LongevityRow {
        nba_id: profile.nba_id,
        player_name: profile.player_name.clone(),
        team_name: profile.team_name.clone(),
        rookie_season: profile.rookie_season,
        career_games: longevity.career_games,
        age: longevity.age.or(profile.age),
        est_retirement_age: longevity.est_retirement_age,
        years_remaining: longevity.years_remaining,
        projections: Projections::from_survival(&longevity.survival),
    }
}

/// Years remaining descending, missing last; ties by name ascending.
pub fn sort_longevity(rows: &mut [LongevityRow]) {
    rows.sort_by(|a, b| {
        let by_years = match (
            a.years_remaining.filter(|v| v.is_finite()),
            b.years_remaining.filter(|v| v.is_finite()),
        ) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_years.then_with(|| {
            a.player_name
                .as_deref()
                .unwrap_or("")
                .cmp(b.player_name.as_deref().unwrap_or(""))
        })
    });
}

/// One point per season, last row per season wins.
pub fn collapse_trajectory(rows: Vec<TrajectoryRow>) -> Vec<TrajectoryPoint> {
    let mut by_season = BTreeMap::new();
    for row in rows {
        if let Some(season) = row.season_start_year() {
            by_season.insert(season, row.projected_retirement_age);
        }
    }
    by_season
        .into_iter()
        .filter_map(|(season, age)| {
            age.filter(|a| a.is_finite())
                .map(|age| TrajectoryPoint::new(season, age))
        })
        .collect()
}
