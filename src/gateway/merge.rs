//! Typed merge of dimension and rating sources.
//!
//! A player's identity can come from the `players` dimension row, from a
//! rating row, or from both. [`merge_profiles`] takes the two optional
//! records and resolves each field through [`PROFILE_PRECEDENCE`]: the
//! preferred source if it has a value, else the other source, else `None`.

use std::collections::HashMap;

use crate::types::{PlayerDimension, PlayerProfile, PlayerRow, RatingRow};

/// Source consulted first for a merged field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Dimension,
    Rating,
}

/// Per-field source precedence.
#[derive(Debug, Clone, Copy)]
pub struct Precedence {
    pub player_name: Source,
    pub team_name: Source,
    pub position: Source,
    pub age: Source,
    pub rookie_season: Source,
}

/// Identity fields prefer the dimension row (current team, canonical
/// name); age prefers the rating row, which is dated.
pub const PROFILE_PRECEDENCE: Precedence = Precedence {
    player_name: Source::Dimension,
    team_name: Source::Dimension,
    position: Source::Dimension,
    age: Source::Rating,
    rookie_season: Source::Dimension,
};

fn pick<T: Clone>(prefer: Source, dimension: Option<&T>, rating: Option<&T>) -> Option<T> {
    let (first, second) = match prefer {
        Source::Dimension => (dimension, rating),
        Source::Rating => (rating, dimension),
    };
    first.or(second).cloned()
}

/// Merge two optional profiles for the same player.
pub fn merge_profiles(
    nba_id: i64,
    dimension: Option<&PlayerProfile>,
    rating: Option<&PlayerProfile>,
) -> PlayerProfile {
    let p = PROFILE_PRECEDENCE;
    PlayerProfile {
        nba_id,
        player_name: pick(
            p.player_name,
            dimension.and_then(|d| d.player_name.as_ref()),
            rating.and_then(|r| r.player_name.as_ref()),
        ),
        team_name: pick(
            p.team_name,
            dimension.and_then(|d| d.team_name.as_ref()),
            rating.and_then(|r| r.team_name.as_ref()),
        ),
        position: pick(
            p.position,
            dimension.and_then(|d| d.position.as_ref()),
            rating.and_then(|r| r.position.as_ref()),
        ),
        age: pick(
            p.age,
            dimension.and_then(|d| d.age.as_ref()),
            rating.and_then(|r| r.age.as_ref()),
        ),
        rookie_season: pick(
            p.rookie_season,
            dimension.and_then(|d| d.rookie_season.as_ref()),
            rating.and_then(|r| r.rookie_season.as_ref()),
        ),
    }
}

/// Profile carried by a dimension row.
pub fn dimension_profile(dimension: &PlayerDimension) -> PlayerProfile {
    PlayerProfile {
        nba_id: dimension.nba_id,
        player_name: dimension.player_name.clone(),
        team_name: dimension.team_name.clone(),
        position: dimension.position.clone(),
        age: dimension.longevity.age,
        rookie_season: dimension.rookie_season,
    }
}

/// Profile carried by a rating row.
pub fn rating_profile(row: &RatingRow) -> PlayerProfile {
    PlayerProfile {
        nba_id: row.nba_id,
        player_name: row.player_name.clone(),
        team_name: row.team_name.clone(),
        position: row.position.clone(),
        age: row.age,
        rookie_season: None,
    }
}

/// Merge one rating row with its player's dimension record, if any.
pub fn merge_row(row: RatingRow, dimension: Option<&PlayerDimension>) -> PlayerRow {
    let profile = merge_profiles(
        row.nba_id,
        dimension.map(dimension_profile).as_ref(),
        Some(&rating_profile(&row)),
    );
    PlayerRow {
        profile,
        date: row.date,
        career_game_num: row.career_game_num,
        metrics: row.metrics,
        extra: row.extra,
        longevity: dimension.map(|d| d.longevity.clone()),
    }
}

/// Dimension rows by id. Later duplicates lose to the first row.
pub fn index_dimensions(dimensions: &[PlayerDimension]) -> HashMap<i64, &PlayerDimension> {
    let mut by_id = HashMap::with_capacity(dimensions.len());
    for dimension in dimensions {
        by_id.entry(dimension.nba_id).or_insert(dimension);
    }
    by_id
}
