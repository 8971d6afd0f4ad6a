//! Node field
//!
//! Owns the set of simulated nodes. Growing appends, shrinking truncates
//! from the tail; a retained node keeps its index, anchor and motion state
//! forever.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::coords::WorldExtent;
use crate::foundation::math::{Vec2, Vec3};
use crate::simulation::organic::OrganicMotion;

/// Depth of the band new anchors are spawned in, centred on `z = 0`
pub const SPAWN_DEPTH: f32 = 2.0;

/// A simulated point with a fixed anchor
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Position in the field; always equals the node's array position
    pub index: usize,
    /// Fixed anchor the node drifts around
    pub base_position: Vec3,
    /// Animated position
    pub current_position: Vec3,
    /// Planar velocity in world units per second
    pub velocity: Vec2,
}

/// Result of a [`NodeField::resize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldChange {
    /// Nodes appended
    pub added: usize,
    /// Nodes removed from the tail
    pub removed: usize,
}

/// Stable, growable set of nodes
#[derive(Debug)]
pub struct NodeField {
    nodes: Vec<Node>,
    rng: StdRng,
}

impl NodeField {
    /// Create an empty field with an entropy-seeded generator
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Create an empty field with a fixed seed for reproducible layouts
    pub fn with_seed(seed: u64) -> Self {
        Self {
            nodes: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the field is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in index order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Node at `index`
    pub fn get(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    /// Grow or shrink the field to `target_count` nodes.
    ///
    /// New anchors are drawn uniformly from `extent`. New nodes start at their
    /// organic target for `now` so they join without jumping.
    pub fn resize(
        &mut self,
        target_count: usize,
        extent: WorldExtent,
        now: f32,
        motion: &OrganicMotion,
    ) -> FieldChange {
        let current = self.nodes.len();

        if target_count <= current {
            self.nodes.truncate(target_count);
            return FieldChange {
                added: 0,
                removed: current - target_count,
            };
        }

        if !extent.is_valid() {
            log::warn!(
                "Spawning {} node(s) into a degenerate world extent {:?}",
                target_count - current,
                extent
            );
        }

        let half = extent.half();
        self.nodes.reserve(target_count - current);
        for index in current..target_count {
            let base_position = Vec3::new(
                sample_symmetric(&mut self.rng, half.x),
                sample_symmetric(&mut self.rng, half.y),
                sample_symmetric(&mut self.rng, SPAWN_DEPTH * 0.5),
            );
            let start = motion.target(base_position, index, now);
            self.nodes.push(Node {
                index,
                base_position,
                current_position: start,
                velocity: Vec2::zeros(),
            });
        }

        FieldChange {
            added: target_count - current,
            removed: 0,
        }
    }
}

impl Default for NodeField {
    fn default() -> Self {
        Self::new()
    }
}

fn sample_symmetric(rng: &mut StdRng, half: f32) -> f32 {
    if half.is_finite() && half > 0.0 {
        rng.gen_range(-half..half)
    } else {
        0.0
    }
}
