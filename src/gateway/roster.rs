//! Roster pipelines: latest date, active roster snapshot, player index,
//! name search, current snapshot, and dimension lookups.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Days;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::DataGateway;
use super::merge::{dimension_profile, index_dimensions, merge_profiles, merge_row};
use crate::cache::QueryCategory;
use crate::store::{Query, decode_rows, decode_rows_lenient, execute, fetch_all_pages};
use crate::types::{
    DIMENSION_COLUMNS, IndexedPlayer, Metrics, PLAYERS_TABLE, PlayerDimension, PlayerId,
    PlayerRow, RATINGS_TABLE, RatingRow, SEARCH_COLUMNS, SNAPSHOT_COLUMNS, SearchHit, parse_date,
};
use crate::{CourtsideError, Result};

/// Days before the latest date still counted as "active".
pub const SNAPSHOT_WINDOW_DAYS: u64 = 7;

/// Row limit for the active roster window query.
pub const SNAPSHOT_ROW_LIMIT: usize = 10_000;

/// Shortest search term that reaches the store.
pub const SEARCH_MIN_CHARS: usize = 2;

/// Rows scanned per search.
pub const SEARCH_ROW_LIMIT: usize = 200;

/// Distinct players returned per search.
pub const SEARCH_MAX_RESULTS: usize = 15;

impl DataGateway {
    /// Most recent rating date in the dataset, if any rows exist.
    pub async fn latest_date(&self) -> Result<Option<String>> {
        self.cached(QueryCategory::LatestDate, "all", |gw| async move {
            let query = Query::table(RATINGS_TABLE)
                .select(&["date"])
                .order("date", false)
                .limit(1);
            let rows = execute(gw.store(), &query).await?;
            Ok(rows
                .first()
                .and_then(|row| row.get("date"))
                .and_then(Value::as_str)
                .map(str::to_owned))
        })
        .await
    }

    /// Active roster snapshot, optionally restricted to one team.
    ///
    /// The team filter is an exact match on the merged team name after
    /// trimming; a blank team means all players. Team views are cut from
    /// the shared all-players snapshot.
    pub async fn active_players(&self, team: Option<&str>) -> Result<Arc<Vec<PlayerRow>>> {
        let snapshot = self.active_snapshot().await?;
        match team.map(str::trim).filter(|t| !t.is_empty()) {
            None => Ok(snapshot),
            Some(team) => Ok(Arc::new(
                snapshot
                    .iter()
                    .filter(|p| p.profile.team_name.as_deref() == Some(team))
                    .cloned()
                    .collect(),
            )),
        }
    }

    pub(crate) async fn active_snapshot(&self) -> Result<Arc<Vec<PlayerRow>>> {
        self.cached(QueryCategory::ActivePlayers, "all", |gw| async move {
            gw.load_active_snapshot().await.map(Arc::new)
        })
        .await
    }

    async fn load_active_snapshot(&self) -> Result<Vec<PlayerRow>> {
        let Some(latest) = self.latest_date().await? else {
            return Ok(Vec::new());
        };
        let since = window_start(&latest)?;

        let query = Query::table(RATINGS_TABLE)
            .select(SNAPSHOT_COLUMNS)
            .eq("active_roster", 1)
            .gte("date", since)
            .lte("date", latest.as_str())
            .order("date", false)
            .limit(SNAPSHOT_ROW_LIMIT);
        let (rows, dimensions) = tokio::try_join!(self.rating_rows(&query), self.player_dimensions())?;

        let by_id = index_dimensions(&dimensions);
        let mut players: Vec<PlayerRow> = keep_latest(rows)
            .into_iter()
            .map(|row| {
                let dimension = by_id.get(&row.nba_id).copied();
                merge_row(row, dimension)
            })
            .collect();
        sort_by_metric_desc(&mut players, |p| p.metrics.dpm);

        info!(players = players.len(), latest = %latest, "active roster snapshot built");
        Ok(players)
    }

    /// The whole `players` dimension table, walked page by page.
    pub async fn player_dimensions(&self) -> Result<Arc<Vec<PlayerDimension>>> {
        self.cached(QueryCategory::PlayerDimensions, "all", |gw| async move {
            let query = Query::table(PLAYERS_TABLE)
                .select(DIMENSION_COLUMNS)
                .order("nba_id", true);
            let rows = fetch_all_pages(gw.store(), &query, gw.policy.page_size).await?;
            let dimensions: Vec<PlayerDimension> = decode_rows_lenient(PLAYERS_TABLE, rows);
            info!(players = dimensions.len(), "player dimensions loaded");
            Ok(Arc::new(dimensions))
        })
        .await
    }

    /// One player's dimension row, if present.
    pub async fn player_dimension(&self, id: PlayerId) -> Result<Option<Arc<PlayerDimension>>> {
        self.cached(QueryCategory::PlayerDimension, id, move |gw| async move {
            let query = Query::table(PLAYERS_TABLE)
                .select(DIMENSION_COLUMNS)
                .eq("nba_id", id.get())
                .limit(1);
            let rows = execute(gw.store(), &query).await?;
            let mut dimensions: Vec<PlayerDimension> = decode_rows(rows)?;
            Ok(dimensions.pop().map(Arc::new))
        })
        .await
    }

    /// Every known player, with live metrics attached when the player is
    /// on the active roster snapshot. Sorted by name (byte order).
    pub async fn player_index(&self) -> Result<Arc<Vec<IndexedPlayer>>> {
        self.cached(QueryCategory::PlayerIndex, "all", |gw| async move {
            let (dimensions, snapshot) =
                tokio::try_join!(gw.player_dimensions(), gw.active_snapshot())?;
            let index = build_index(&dimensions, &snapshot);
            info!(players = index.len(), active = snapshot.len(), "player index built");
            Ok(Arc::new(index))
        })
        .await
    }

    /// Search all players, active or not, by name.
    ///
    /// The term is trimmed and lowercased; terms shorter than two
    /// characters return nothing without touching the cache or the store.
    pub async fn search_players(&self, term: &str) -> Result<Arc<Vec<SearchHit>>> {
        let term = term.trim().to_lowercase();
        if term.chars().count() < SEARCH_MIN_CHARS {
            return Ok(Arc::default());
        }

        self.cached(QueryCategory::SearchPlayers, term.clone(), move |gw| async move {
            let query = Query::table(RATINGS_TABLE)
                .select(SEARCH_COLUMNS)
                .ilike("player_name", format!("%{term}%"))
                .order("date", false)
                .limit(SEARCH_ROW_LIMIT);
            let rows: Vec<SearchHit> =
                decode_rows_lenient(RATINGS_TABLE, execute(gw.store(), &query).await?);
            let mut seen = HashSet::new();
            let hits: Vec<SearchHit> = rows
                .into_iter()
                .filter(|hit| seen.insert(hit.nba_id))
                .take(SEARCH_MAX_RESULTS)
                .collect();
            Ok(Arc::new(hits))
        })
        .await
    }

    /// Most recent rating row for one player, merged with dimension data.
    ///
    /// Zero rows is [`CourtsideError::PlayerNotFound`].
    pub async fn player_current(&self, id: PlayerId) -> Result<Arc<PlayerRow>> {
        self.cached(QueryCategory::PlayerCurrent, id, move |gw| async move {
            let query = Query::table(RATINGS_TABLE)
                .eq("nba_id", id.get())
                .order("date", false)
                .limit(1);
            let (rows, dimension) = tokio::try_join!(gw.rating_rows(&query), gw.player_dimension(id))?;
            let row = rows
                .into_iter()
                .next()
                .ok_or(CourtsideError::PlayerNotFound(id.get()))?;
            Ok(Arc::new(merge_row(row, dimension.as_deref())))
        })
        .await
    }
}

/// First day of the active window ending at `latest` (inclusive).
fn window_start(latest: &str) -> Result<String> {
    parse_date(latest)
        .and_then(|date| date.checked_sub_days(Days::new(SNAPSHOT_WINDOW_DAYS)))
        .map(|date| date.format("%Y-%m-%d").to_string())
        .ok_or_else(|| CourtsideError::DataError(format!("unparseable latest date '{latest}'")))
}

/// Keep the first row seen for each player.
///
/// With rows ordered by date descending, this keeps each player's most
/// recent row; ties keep the store's order.
pub fn keep_latest(rows: Vec<RatingRow>) -> Vec<RatingRow> {
    let mut seen = HashSet::with_capacity(rows.len());
    rows.into_iter()
        .filter(|row| seen.insert(row.nba_id))
        .collect()
}

/// Descending by a metric; missing or non-finite values last.
fn metric_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a.filter(|v| v.is_finite()), b.filter(|v| v.is_finite())) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort, descending by `metric`, non-finite values last.
pub fn sort_by_metric_desc<T>(rows: &mut [T], metric: impl Fn(&T) -> Option<f64>) {
    rows.sort_by(|a, b| metric_desc(metric(a), metric(b)));
}

fn build_index(dimensions: &[PlayerDimension], snapshot: &[PlayerRow]) -> Vec<IndexedPlayer> {
    let live: HashMap<i64, &PlayerRow> = snapshot.iter().map(|p| (p.profile.nba_id, p)).collect();

    let mut seen = HashSet::with_capacity(dimensions.len());
    let mut index: Vec<IndexedPlayer> = dimensions
        .iter()
        .filter(|dim| seen.insert(dim.nba_id))
        .map(|dim| {
            let row = live.get(&dim.nba_id).copied();
            IndexedPlayer {
                profile: merge_profiles(
                    dim.nba_id,
                    Some(&dimension_profile(dim)),
                    row.map(|r| &r.profile),
                ),
                active: row.is_some(),
                date: row.map(|r| r.date.clone()),
                metrics: row.map(|r| r.metrics.clone()).unwrap_or_default(),
                longevity: dim.longevity.clone(),
            }
        })
        .collect();

    index.sort_by(|a, b| {
        let a = a.profile.player_name.as_deref().unwrap_or("");
        let b = b.profile.player_name.as_deref().unwrap_or("");
        a.cmp(b)
    });
    index
}

/// A player row with its 1-based position in the snapshot order.
#[derive(Debug, Clone, Serialize)]
pub struct Ranked<'a> {
    pub rank: usize,
    #[serde(flatten)]
    pub player: &'a PlayerRow,
}

/// Attach 1-based ranks in slice order.
pub fn ranked(players: &[PlayerRow]) -> Vec<Ranked<'_>> {
    players
        .iter()
        .enumerate()
        .map(|(i, player)| Ranked { rank: i + 1, player })
        .collect()
}
