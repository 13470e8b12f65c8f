//! Render-facing projections of the live store
//!
//! Filtering, snapshots and node profiles are read-only views; they never
//! mutate the store.

pub mod filter;
pub mod profile;
pub mod snapshot;

pub use filter::GraphFilter;
pub use profile::{NodeProfile, ProfileLink, Relationship};
pub use snapshot::{RenderGraph, RenderLink, RenderNode};
