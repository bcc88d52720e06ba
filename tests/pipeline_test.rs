//! Tests for the aggregation pipelines over an in-memory store.

use std::sync::Arc;

use serde_json::{Value, json};

use courtside::store::{MemoryStore, RowStore};
use courtside::{Courtside, CourtsideError, DataGateway, HistoryLimit, PlayerId};

// ============================================================================
// Fixture
// ============================================================================

fn ratings() -> Vec<Value> {
    vec![
        json!({"nba_id": 1, "date": "2024-01-05", "active_roster": 1, "dpm": 2.0, "player_name": "Alpha", "team_name": "Boston Celtics"}),
        json!({"nba_id": 1, "date": "2024-01-02", "active_roster": 1, "dpm": 9.0, "player_name": "Alpha", "team_name": "Boston Celtics"}),
        json!({"nba_id": 2, "date": "2024-01-01", "active_roster": 1, "dpm": 5.5, "player_name": "Beta", "team_name": "Denver Nuggets"}),
        json!({"nba_id": 3, "date": "2024-01-05", "active_roster": 0, "dpm": 7.0, "player_name": "Gamma"}),
        json!({"nba_id": 4, "date": "2023-12-20", "active_roster": 1, "dpm": 8.0, "player_name": "Delta"}),
        json!({"nba_id": 5, "date": "2024-01-04", "active_roster": 1, "dpm": null, "player_name": "Epsilon", "team_name": "Boston Celtics"}),
        json!({"nba_id": 7, "date": "2023-11-02", "active_roster": 0, "dpm": 0.2, "player_name": "Zeta"}),
        json!({"nba_id": 7, "date": "2023-11-03", "active_roster": 0, "dpm": 0.3, "player_name": "Zeta"}),
        json!({"nba_id": 7, "date": "2023-11-01", "active_roster": 0, "dpm": 0.1, "player_name": "Zeta"}),
    ]
}

fn players() -> Vec<Value> {
    vec![
        json!({"nba_id": 1, "player_name": "Alpha Prime", "team_name": "Boston Celtics", "position": "G",
               "rookie_season": 2018, "career_games": 400, "age": 27, "est_retirement_age": 35,
               "years_remaining": 8, "s1": 0.75, "s2": 75, "s3": null}),
        json!({"nba_id": 2, "player_name": "Beta", "team_name": "Denver Nuggets", "years_remaining": 3, "s1": 0.5}),
        json!({"nba_id": 3, "player_name": "Gamma", "years_remaining": 10}),
        json!({"nba_id": 6, "player_name": "Aaron Retired"}),
    ]
}

fn tables() -> Vec<(&'static str, Vec<Value>)> {
    vec![
        ("darko_shiny_history", ratings()),
        ("players", players()),
        (
            "longevity_history",
            vec![
                json!({"nba_id": 1, "season": 2022, "date": "2022-11-01", "projected_retirement_age": 34.0}),
                json!({"nba_id": 1, "season": 2023, "date": "2023-11-01", "projected_retirement_age": 34.5}),
                json!({"nba_id": 1, "season": 2023, "date": "2024-02-01", "projected_retirement_age": 35.0}),
            ],
        ),
        (
            "season_sim",
            vec![
                json!({"team_name": "New York Knicks", "conference": "East", "Rk": 2}),
                json!({"team_name": "Boston Celtics", "conference": "East", "Rk": 1, "proj_wins": 60.1}),
                json!({"team_name": "Denver Nuggets", "conference": "West", "Rk": 1}),
            ],
        ),
        (
            "win_distribution",
            vec![
                json!({"team_name": "Boston Celtics", "wins": 61, "prob": 0.2}),
                json!({"team_name": "Boston Celtics", "wins": 59, "prob": 0.3}),
                json!({"team_name": "Denver Nuggets", "wins": 50, "prob": 0.1}),
            ],
        ),
    ]
}

fn store_without(missing: &[&str]) -> Arc<MemoryStore> {
    let store = tables()
        .into_iter()
        .filter(|(name, _)| !missing.contains(name))
        .fold(MemoryStore::new(), |store, (name, rows)| store.with_table(name, rows));
    Arc::new(store)
}

fn gateway(store: &Arc<MemoryStore>) -> DataGateway {
    Courtside::builder()
        .shared_store(Arc::clone(store) as Arc<dyn RowStore>)
        .build()
        .unwrap()
}

fn id(n: i64) -> PlayerId {
    PlayerId::new(n).unwrap()
}

// ============================================================================
// Active roster
// ============================================================================

#[tokio::test]
async fn active_roster_keeps_latest_row_per_player() {
    let store = store_without(&[]);
    let players = gateway(&store).active_players(None).await.unwrap();

    let ids: Vec<_> = players.iter().map(|p| p.profile.nba_id).collect();
    assert_eq!(ids, vec![2, 1, 5], "sorted by dpm desc, missing dpm last");

    let alpha = players.iter().find(|p| p.profile.nba_id == 1).unwrap();
    assert_eq!(alpha.date, "2024-01-05");
    assert_eq!(alpha.metrics.dpm, Some(2.0));
}

#[tokio::test]
async fn active_roster_merges_dimension_with_fallback() {
    let store = store_without(&[]);
    let players = gateway(&store).active_players(None).await.unwrap();

    let alpha = players.iter().find(|p| p.profile.nba_id == 1).unwrap();
    assert_eq!(alpha.profile.player_name.as_deref(), Some("Alpha Prime"));
    assert_eq!(alpha.profile.position.as_deref(), Some("G"));
    assert_eq!(alpha.profile.rookie_season, Some(2018));

    let epsilon = players.iter().find(|p| p.profile.nba_id == 5).unwrap();
    assert_eq!(epsilon.profile.player_name.as_deref(), Some("Epsilon"));
    assert_eq!(epsilon.profile.position, None);
    assert!(epsilon.longevity.is_none());
}

#[tokio::test]
async fn active_roster_excludes_inactive_and_stale_rows() {
    let store = store_without(&[]);
    let players = gateway(&store).active_players(None).await.unwrap();
    assert!(players.iter().all(|p| p.profile.nba_id != 3));
    assert!(players.iter().all(|p| p.profile.nba_id != 4));
}

#[tokio::test]
async fn team_view_is_cut_from_cached_snapshot() {
    let store = store_without(&[]);
    let gateway = gateway(&store);

    gateway.active_players(None).await.unwrap();
    let queries_before = store.query_count("darko_shiny_history");

    let boston = gateway.active_players(Some("  Boston Celtics ")).await.unwrap();
    let ids: Vec<_> = boston.iter().map(|p| p.profile.nba_id).collect();
    assert_eq!(ids, vec![1, 5]);
    assert_eq!(store.query_count("darko_shiny_history"), queries_before);

    let blank = gateway.active_players(Some("   ")).await.unwrap();
    assert_eq!(blank.len(), 3);
}

#[tokio::test]
async fn empty_ratings_give_empty_roster() {
    let store = Arc::new(
        MemoryStore::new()
            .with_table("darko_shiny_history", Vec::new())
            .with_table("players", players()),
    );
    let players = gateway(&store).active_players(None).await.unwrap();
    assert!(players.is_empty());
}

#[tokio::test]
async fn malformed_rows_are_skipped_not_fatal() {
    let mut dimension_rows = players();
    dimension_rows.push(json!({"nba_id": null, "player_name": "Ghost"}));
    dimension_rows.push(json!({"nba_id": "not-a-number", "player_name": "Phantom"}));
    let mut rating_rows = ratings();
    rating_rows.push(json!({"nba_id": null, "date": "2024-01-05", "active_roster": 1, "dpm": 99.0}));

    let store = Arc::new(
        MemoryStore::new()
            .with_table("darko_shiny_history", rating_rows)
            .with_table("players", dimension_rows),
    );
    let gateway = gateway(&store);

    let active = gateway.active_players(None).await.unwrap();
    let ids: Vec<_> = active.iter().map(|p| p.profile.nba_id).collect();
    assert_eq!(ids, vec![2, 1, 5]);

    let index = gateway.player_index().await.unwrap();
    let names: Vec<_> = index
        .iter()
        .map(|p| p.profile.player_name.clone().unwrap())
        .collect();
    assert_eq!(names, vec!["Aaron Retired", "Alpha Prime", "Beta", "Gamma"]);
}

// ============================================================================
// Player index, search, current
// ============================================================================

#[tokio::test]
async fn player_index_covers_every_dimension_row() {
    let store = store_without(&[]);
    let index = gateway(&store).player_index().await.unwrap();

    let names: Vec<_> = index
        .iter()
        .map(|p| p.profile.player_name.clone().unwrap())
        .collect();
    assert_eq!(names, vec!["Aaron Retired", "Alpha Prime", "Beta", "Gamma"]);

    let active: Vec<_> = index.iter().map(|p| p.active).collect();
    assert_eq!(active, vec![false, true, true, false]);
    assert_eq!(index[1].metrics.dpm, Some(2.0));
    assert_eq!(index[3].metrics.dpm, None);
}

#[tokio::test]
async fn short_search_never_reaches_store() {
    let store = store_without(&[]);
    let gateway = gateway(&store);

    assert!(gateway.search_players(" a ").await.unwrap().is_empty());
    assert!(gateway.search_players("").await.unwrap().is_empty());
    assert!(store.queries().is_empty());
    assert!(gateway.cache().store().is_empty());
}

#[tokio::test]
async fn search_is_case_insensitive_and_deduplicated() {
    let store = store_without(&[]);
    let gateway = gateway(&store);

    let hits = gateway.search_players("  ALP ").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].nba_id, 1);
    assert_eq!(hits[0].date, "2024-01-05");

    // normalized term shares the cache entry
    gateway.search_players("alp").await.unwrap();
    assert_eq!(store.query_count("darko_shiny_history"), 1);
}

#[tokio::test]
async fn player_current_merges_latest_row() {
    let store = store_without(&[]);
    let current = gateway(&store).player_current(id(1)).await.unwrap();
    assert_eq!(current.date, "2024-01-05");
    assert_eq!(current.profile.player_name.as_deref(), Some("Alpha Prime"));
}

#[tokio::test]
async fn player_current_missing_is_not_found() {
    let store = store_without(&[]);
    let gateway = gateway(&store);
    let err = gateway.player_current(id(999)).await.unwrap_err();
    assert_eq!(err, CourtsideError::PlayerNotFound(999));
    assert!(!gateway.cache().store().contains("playerCurrent:999"));
}

// ============================================================================
// History
// ============================================================================

#[tokio::test]
async fn history_is_returned_oldest_first() {
    let store = store_without(&[]);
    let gateway = gateway(&store);

    let history = gateway
        .player_history(id(7), HistoryLimit::default())
        .await
        .unwrap();
    let dates: Vec<_> = history.iter().map(|r| r.date.as_str()).collect();
    assert_eq!(dates, vec!["2023-11-01", "2023-11-02", "2023-11-03"]);

    let full = gateway.full_player_history(id(7)).await.unwrap();
    let full_dates: Vec<_> = full.rows.iter().map(|r| r.date.as_str()).collect();
    assert_eq!(full_dates, dates);
    assert!(!full.truncated);
    assert_eq!(full.max_rows, 5_000);
}

#[tokio::test]
async fn history_limit_keeps_most_recent_rows() {
    let store = store_without(&[]);
    let history = gateway(&store)
        .player_history(id(7), HistoryLimit::new(2))
        .await
        .unwrap();
    let dates: Vec<_> = history.iter().map(|r| r.date.as_str()).collect();
    assert_eq!(dates, vec!["2023-11-02", "2023-11-03"]);
}

#[tokio::test]
async fn full_history_reports_truncation() {
    let rows = (0..30)
        .map(|day| json!({"nba_id": 9, "date": format!("2023-{:02}-{:02}", day / 28 + 1, day % 28 + 1)}))
        .collect();
    let store = Arc::new(
        MemoryStore::new()
            .with_table("darko_shiny_history", rows)
            .with_table("players", Vec::new()),
    );
    let gateway = Courtside::builder()
        .shared_store(Arc::clone(&store) as Arc<dyn RowStore>)
        .policy(
            courtside::CachePolicy::new()
                .page_size(10)
                .full_history_max_rows(25),
        )
        .build()
        .unwrap();

    let full = gateway.full_player_history(id(9)).await.unwrap();
    assert_eq!(full.rows.len(), 25);
    assert!(full.truncated);
    assert_eq!(full.max_rows, 25);
    assert_eq!(full.rows[0].date, "2023-01-01");
}

// ============================================================================
// Longevity
// ============================================================================

#[tokio::test]
async fn longevity_rows_normalize_probabilities() {
    let store = store_without(&[]);
    let rows = gateway(&store).longevity_rows(true).await.unwrap();

    let ids: Vec<_> = rows.iter().map(|r| r.nba_id).collect();
    assert_eq!(ids, vec![1, 2]);

    let alpha = &rows[0];
    assert_eq!(alpha.projections.season(1), Some(75.0));
    assert_eq!(alpha.projections.season(2), Some(75.0));
    assert_eq!(alpha.projections.season(3), None);
    assert_eq!(rows[1].projections.season(1), Some(50.0));

    let value = serde_json::to_value(alpha).unwrap();
    assert_eq!(value["p1"], json!(75.0));
    assert_eq!(value["p3"], Value::Null);
}

#[tokio::test]
async fn longevity_rows_from_full_index() {
    let store = store_without(&[]);
    let rows = gateway(&store).longevity_rows(false).await.unwrap();
    let names: Vec<_> = rows
        .iter()
        .map(|r| r.player_name.clone().unwrap())
        .collect();
    assert_eq!(names, vec!["Gamma", "Alpha Prime", "Beta", "Aaron Retired"]);
}

#[tokio::test]
async fn trajectory_collapses_seasons() {
    let store = store_without(&[]);
    let points = gateway(&store).longevity_trajectory(id(1)).await.unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].season_start, "2022-23");
    assert_eq!(points[1].season_start_year, 2023);
    assert_eq!(points[1].projected_retirement_age, 35.0);
}

// ============================================================================
// Teams
// ============================================================================

#[tokio::test]
async fn conference_standings_by_rank() {
    let store = store_without(&[]);
    let gateway = gateway(&store);

    let east = gateway.conference_standings(" East ").await.unwrap();
    let teams: Vec<_> = east.iter().map(|t| t.team_name.as_str()).collect();
    assert_eq!(teams, vec!["Boston Celtics", "New York Knicks"]);

    assert!(gateway.conference_standings("").await.unwrap().is_empty());
}

#[tokio::test]
async fn team_bundle_collects_all_parts() {
    let store = store_without(&[]);
    let bundle = gateway(&store).team_bundle("Boston Celtics").await.unwrap();

    assert_eq!(bundle.team_name, "Boston Celtics");
    assert_eq!(bundle.players.len(), 2);
    let sim = bundle.simulation.unwrap();
    assert_eq!(sim.rank, Some(1));
    assert_eq!(sim.extra["proj_wins"], json!(60.1));
    let wins: Vec<_> = bundle.win_distribution.iter().map(|w| w.wins).collect();
    assert_eq!(wins, vec![Some(59), Some(61)]);
}

#[tokio::test]
async fn blank_team_bundle_is_empty_without_fetching() {
    let store = store_without(&[]);
    let bundle = gateway(&store).team_bundle("  ").await.unwrap();
    assert!(bundle.players.is_empty());
    assert!(bundle.simulation.is_none());
    assert!(bundle.win_distribution.is_empty());
    assert!(store.queries().is_empty());
}

#[tokio::test]
async fn team_bundle_fails_when_any_part_fails() {
    let store = store_without(&["win_distribution"]);
    let gateway = gateway(&store);

    let err = gateway.team_bundle("Boston Celtics").await.unwrap_err();
    assert!(matches!(err, CourtsideError::Store { status: 404, .. }));

    // the parts that succeeded are cached individually
    assert!(gateway.team_simulation("Boston Celtics").await.unwrap().is_some());
}

#[tokio::test]
async fn unknown_team_has_no_simulation() {
    let store = store_without(&[]);
    let gateway = gateway(&store);
    assert!(gateway.team_simulation("Seattle SuperSonics").await.unwrap().is_none());
    assert!(gateway.team_simulation(" ").await.unwrap().is_none());
    assert!(
        gateway
            .team_win_distribution("Seattle SuperSonics")
            .await
            .unwrap()
            .is_empty()
    );
}
