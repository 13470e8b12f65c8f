//! Multi-edge layout
//!
//! Parallel edges between the same two nodes would render on top of each
//! other. Each group of parallel edges (either direction) gets offsets
//! symmetric around zero, scaled by a bow step, and a rotation around the
//! chord that advances by the golden angle so that bows fan out in 3D.

use crate::graph::{EdgeHandle, EdgeLayout, EdgeType, LiveGraphStore};
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::f64::consts::{PI, TAU};
use tracing::debug;

/// Default lateral bow between neighbouring parallel edges
pub const DEFAULT_BOW_STEP: f64 = 0.2;

/// Golden angle in radians, `π·(3 − √5)`
pub fn golden_angle() -> f64 {
    PI * (3.0 - 5f64.sqrt())
}

/// Assigns curvature and rotation to parallel edges
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiEdgeLayout {
    pub bow_step: f64,
}

impl Default for MultiEdgeLayout {
    fn default() -> Self {
        MultiEdgeLayout {
            bow_step: DEFAULT_BOW_STEP,
        }
    }
}

struct Member {
    handle: EdgeHandle,
    edge_type: EdgeType,
    index: u64,
}

impl MultiEdgeLayout {
    pub fn new(bow_step: f64) -> Self {
        MultiEdgeLayout { bow_step }
    }

    /// Layout of the `position`-th edge in a group of `count` sorted edges
    pub fn layout_for(&self, position: usize, count: usize) -> EdgeLayout {
        if count <= 1 {
            return EdgeLayout::default();
        }
        let offset = position as f64 - (count as f64 - 1.0) / 2.0;
        EdgeLayout {
            curvature: offset * self.bow_step,
            curve_rotation: (position as f64 * golden_angle()) % TAU,
            multi_index: position,
            multi_count: count,
        }
    }

    /// Annotate every live edge with its multi-edge layout
    ///
    /// Groups are keyed by the unordered pair of endpoint ids; within a group
    /// edges are ordered by `(type, index)` with types compared
    /// case-insensitively, so re-running on an unchanged
    /// edge set reproduces the same assignment. Returns the number of groups
    /// holding more than one edge.
    pub fn apply(&self, store: &mut LiveGraphStore) -> usize {
        let mut groups: IndexMap<(String, String), Vec<Member>> = IndexMap::new();
        for edge in store.edges() {
            let (Some(source), Some(target)) = (store.get_node(edge.source), store.get_node(edge.target))
            else {
                continue;
            };
            let (a, b) = (source.id(), target.id());
            let pair = if a <= b { (a, b) } else { (b, a) };
            groups
                .entry((pair.0.to_string(), pair.1.to_string()))
                .or_default()
                .push(Member {
                    handle: edge.handle,
                    edge_type: edge.edge_type.clone(),
                    index: edge.index,
                });
        }

        let mut multi = 0;
        for members in groups.values_mut() {
            members.sort_by(|x, y| {
                compare_types(&x.edge_type, &y.edge_type).then_with(|| x.index.cmp(&y.index))
            });
            let count = members.len();
            if count > 1 {
                multi += 1;
            }
            for (position, member) in members.iter().enumerate() {
                if let Some(edge) = store.get_edge_mut(member.handle) {
                    edge.layout = self.layout_for(position, count);
                }
            }
        }

        debug!(groups = groups.len(), multi, "assigned multi-edge layout");
        multi
    }
}

/// Case-insensitive type order; ties between spellings fall back to bytes
fn compare_types(a: &EdgeType, b: &EdgeType) -> Ordering {
    let (a, b) = (a.as_str(), b.as_str());
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b))
}
