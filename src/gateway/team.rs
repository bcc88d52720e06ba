//! Team pipelines: conference standings, season simulation, win
//! distribution, and the team page bundle.
//!
//! Team and conference names are trimmed, not case-folded: the store
//! matches them exactly, so differently-cased names are different keys.

use std::sync::Arc;

use tracing::debug;

use super::DataGateway;
use crate::Result;
use crate::cache::QueryCategory;
use crate::store::{Query, decode_rows, execute};
use crate::types::{
    SEASON_SIM_TABLE, TeamBundle, TeamSimulation, WIN_DISTRIBUTION_TABLE, WinDistributionRow,
};

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

impl DataGateway {
    /// Simulation rows for one conference, by rank ascending.
    pub async fn conference_standings(&self, conference: &str) -> Result<Arc<Vec<TeamSimulation>>> {
        let Some(conference) = non_blank(conference) else {
            return Ok(Arc::default());
        };
        self.cached(
            QueryCategory::ConferenceStandings,
            conference.clone(),
            move |gw| async move {
                let query = Query::table(SEASON_SIM_TABLE)
                    .eq("conference", conference.as_str())
                    .order("Rk", true);
                let rows = decode_rows(execute(gw.store(), &query).await?)?;
                Ok(Arc::new(rows))
            },
        )
        .await
    }

    /// The team's season simulation summary, if it has one.
    pub async fn team_simulation(&self, team: &str) -> Result<Option<Arc<TeamSimulation>>> {
        let Some(team) = non_blank(team) else {
            return Ok(None);
        };
        self.cached(QueryCategory::TeamSimulation, team.clone(), move |gw| async move {
            let query = Query::table(SEASON_SIM_TABLE)
                .eq("team_name", team.as_str())
                .limit(1);
            let mut rows: Vec<TeamSimulation> = decode_rows(execute(gw.store(), &query).await?)?;
            Ok(rows.pop().map(Arc::new))
        })
        .await
    }

    /// The team's simulated win distribution, by wins ascending.
    pub async fn team_win_distribution(&self, team: &str) -> Result<Arc<Vec<WinDistributionRow>>> {
        let Some(team) = non_blank(team) else {
            return Ok(Arc::default());
        };
        self.cached(
            QueryCategory::TeamWinDistribution,
            team.clone(),
            move |gw| async move {
                let query = Query::table(WIN_DISTRIBUTION_TABLE)
                    .eq("team_name", team.as_str())
                    .order("wins", true);
                let rows = decode_rows(execute(gw.store(), &query).await?)?;
                Ok(Arc::new(rows))
            },
        )
        .await
    }

    /// Roster, simulation, and win distribution for one team, fetched
    /// concurrently.
    ///
    /// Any failing part fails the whole bundle. A blank team name returns
    /// an empty bundle without any fetch.
    pub async fn team_bundle(&self, team: &str) -> Result<TeamBundle> {
        let Some(team) = non_blank(team) else {
            return Ok(TeamBundle::default());
        };

        let (players, simulation, win_distribution) = tokio::try_join!(
            self.active_players(Some(&team)),
            self.team_simulation(&team),
            self.team_win_distribution(&team),
        )?;
        debug!(team = %team, players = players.len(), "team bundle assembled");

        Ok(TeamBundle {
            team_name: team,
            players: Arc::unwrap_or_clone(players),
            simulation: simulation.map(Arc::unwrap_or_clone),
            win_distribution: Arc::unwrap_or_clone(win_distribution),
        })
    }
}
