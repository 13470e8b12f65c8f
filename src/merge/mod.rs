//! Incremental merge engine and multi-edge layout
//!
//! A merge pass reconciles a resolved candidate graph against the live store;
//! the layout pass then recomputes curvature for parallel edges.

pub mod engine;
pub mod layout;

pub use engine::{MergeEngine, MergeReport};
pub use layout::{golden_angle, MultiEdgeLayout, DEFAULT_BOW_STEP};
