//! Cache slot values.
//!
//! One [`QueryCache`](crate::cache::QueryCache) serves every pipeline, so
//! its value type is a closed enum over the pipeline result types. Each
//! payload is behind an `Arc`: a settled fetch is shared by every waiter
//! and every later hit without copying, and nobody can mutate it for
//! anyone else.

use std::sync::Arc;

use crate::types::{
    FullHistory, IndexedPlayer, LongevityRow, PlayerDimension, PlayerRow, SearchHit,
    TeamSimulation, TrajectoryPoint, WinDistributionRow,
};

/// A cached pipeline result.
#[derive(Debug, Clone)]
pub enum CachedValue {
    Date(Option<String>),
    Players(Arc<Vec<PlayerRow>>),
    Player(Arc<PlayerRow>),
    Dimensions(Arc<Vec<PlayerDimension>>),
    Dimension(Option<Arc<PlayerDimension>>),
    Index(Arc<Vec<IndexedPlayer>>),
    FullHistory(Arc<FullHistory>),
    Search(Arc<Vec<SearchHit>>),
    Longevity(Arc<Vec<LongevityRow>>),
    Trajectory(Arc<Vec<TrajectoryPoint>>),
    Simulations(Arc<Vec<TeamSimulation>>),
    Simulation(Option<Arc<TeamSimulation>>),
    WinDistribution(Arc<Vec<WinDistributionRow>>),
}

/// Conversion between a pipeline result type and its cache slot variant.
pub(crate) trait Cacheable: Sized + Send + 'static {
    fn into_cached(self) -> CachedValue;
    fn from_cached(value: CachedValue) -> Option<Self>;
}

macro_rules! cacheable {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Cacheable for $ty {
                fn into_cached(self) -> CachedValue {
                    CachedValue::$variant(self)
                }

                fn from_cached(value: CachedValue) -> Option<Self> {
                    match value {
                        CachedValue::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            }
        )*
    };
}

cacheable! {
    Option<String> => Date,
    Arc<Vec<PlayerRow>> => Players,
    Arc<PlayerRow> => Player,
    Arc<Vec<PlayerDimension>> => Dimensions,
    Option<Arc<PlayerDimension>> => Dimension,
    Arc<Vec<IndexedPlayer>> => Index,
    Arc<FullHistory> => FullHistory,
    Arc<Vec<SearchHit>> => Search,
    Arc<Vec<LongevityRow>> => Longevity,
    Arc<Vec<TrajectoryPoint>> => Trajectory,
    Arc<Vec<TeamSimulation>> => Simulations,
    Option<Arc<TeamSimulation>> => Simulation,
    Arc<Vec<WinDistributionRow>> => WinDistribution,
}
