//! Courtside - cached, single-flight access to basketball player ratings
//!
//! This crate sits between HTTP endpoints and a remote relational store
//! (PostgREST / Supabase). Overlapping queries are answered from a bounded
//! in-memory TTL cache, concurrent misses for the same key share one remote
//! fetch, and a set of aggregation pipelines turn raw rating rows into
//! deduplicated, merged, sorted views.
//!
//! # Example
//!
//! ```rust,no_run
//! use courtside::{Courtside, HistoryLimit, PlayerId};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> courtside::Result<()> {
//!     let gateway = Courtside::builder()
//!         .postgrest("https://example.supabase.co", "anon-key")
//!         .build()?;
//!
//!     let roster = gateway.active_players(None).await?;
//!     println!("{} active players", roster.len());
//!
//!     let history = gateway
//!         .player_history(PlayerId::new(2544)?, HistoryLimit::default())
//!         .await?;
//!     println!("{} rows", history.len());
//!     Ok(())
//! }
//! ```
//!
//! # Layout
//!
//! - [`cache`]: TTL store, single-flight coordinator, and the read-through
//!   façade, plus per-category age policy.
//! - [`store`]: the [`RowStore`](store::RowStore) query abstraction, the
//!   PostgREST client, an in-memory store, and the pagination walker.
//! - [`gateway`]: [`DataGateway`] and its pipelines.
//! - [`types`]: stored rows, merged views, and parameter newtypes.

pub mod cache;
#[cfg(feature = "cli")]
pub mod config;
pub mod error;
pub mod gateway;
pub mod store;
pub mod telemetry;
pub mod types;
pub mod version;

// Re-export main types at crate root
pub use cache::{CachePolicy, QueryCategory};
pub use error::{CourtsideError, Result};
pub use gateway::{Courtside, CourtsideBuilder, DataGateway};
pub use types::{
    FullHistory, HistoryLimit, IndexedPlayer, LongevityRow, PlayerId, PlayerRow, SearchHit,
    TeamBundle, TeamSimulation, TrajectoryPoint, WinDistributionRow,
};
pub use version::{PKG_VERSION, version_string};
