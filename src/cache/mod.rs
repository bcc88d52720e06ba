//! Caching subsystem.
//!
//! Three composable pieces, leaf first:
//!
//! - [`TtlStore`]: bounded key/value map with per-entry write stamps and
//!   lazy, per-read age checks. Insertion-order eviction at capacity.
//!
//! - [`Coordinator`]: single-flight registry ensuring at most one
//!   in-flight fetch per key; concurrent callers share its outcome.
//!
//! - [`QueryCache`]: the read-through façade used by every pipeline:
//!   fresh value from the store, else exactly one coordinated fetch whose
//!   success is written back.
//!
//! [`CachePolicy`] carries the per-[`QueryCategory`] maximum ages and the
//! capacity bound. State lives as long as the owning
//! [`DataGateway`](crate::DataGateway); nothing is persisted.

pub mod flight;
pub mod policy;
pub mod query;
pub mod ttl;

pub use flight::Coordinator;
pub use policy::{CachePolicy, QueryCategory};
pub use query::QueryCache;
pub use ttl::{CacheEntry, TtlStore};
