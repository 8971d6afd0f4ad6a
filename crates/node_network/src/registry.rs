//! Node position registry
//!
//! Structure-of-arrays buffer holding every node's rendered position and
//! sprite scale (the configured node radius with a slight pulse). Layout
//! matches what a renderer uploads directly: positions are tightly packed
//! `xyz` triples.
//!
//! The simulator is the only writer; writes are crate-private and require a
//! `&mut` borrow, so readers (graph builder, renderer) always observe a
//! complete frame.

use crate::foundation::math::Vec3;

/// Packed positions and scales indexed by node index
#[derive(Debug, Clone, Default)]
pub struct PositionRegistry {
    positions: Vec<f32>,
    scales: Vec<f32>,
}

impl PositionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of node slots
    pub fn len(&self) -> usize {
        self.scales.len()
    }

    /// Whether the registry holds no nodes
    pub fn is_empty(&self) -> bool {
        self.scales.is_empty()
    }

    /// Position of node `index`
    pub fn position(&self, index: usize) -> Option<Vec3> {
        let base = index.checked_mul(3)?;
        let xyz = self.positions.get(base..base + 3)?;
        Some(Vec3::new(xyz[0], xyz[1], xyz[2]))
    }

    /// Cosmetic scale of node `index`
    pub fn scale(&self, index: usize) -> Option<f32> {
        self.scales.get(index).copied()
    }

    /// Packed `xyz` positions
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Per-node scales
    pub fn scales(&self) -> &[f32] {
        &self.scales
    }

    /// Raw bytes of the position buffer for GPU upload
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Match the registry to `count` nodes, keeping existing slots intact
    pub(crate) fn resize(&mut self, count: usize) {
        self.positions.resize(count * 3, 0.0);
        self.scales.resize(count, 1.0);
    }

    /// Store the frame's position for node `index`
    pub(crate) fn write(&mut self, index: usize, position: Vec3) {
        let base = index * 3;
        if let Some(slot) = self.positions.get_mut(base..base + 3) {
            slot.copy_from_slice(&[position.x, position.y, position.z]);
        }
    }

    /// Store the frame's cosmetic scale for node `index`
    pub(crate) fn write_scale(&mut self, index: usize, scale: f32) {
        if let Some(slot) = self.scales.get_mut(index) {
            *slot = scale;
        }
    }
}
