//! Precomputed sine/cosine lookup
//!
//! Hundreds of nodes each evaluate three sinusoids per frame. A table with
//! 0.1 degree resolution is accurate enough for organic drift and avoids the
//! transcendental calls entirely.

use std::f32::consts::TAU;

/// Number of table entries per full revolution (0.1 degree steps)
pub const TRIG_TABLE_RESOLUTION: usize = 3600;

/// Sine lookup table covering one revolution
///
/// Cosine is served from the same table with a quarter-turn offset.
#[derive(Debug, Clone)]
pub struct TrigTable {
    sines: Box<[f32]>,
}

impl Default for TrigTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TrigTable {
    /// Build the table
    pub fn new() -> Self {
        let sines = (0..TRIG_TABLE_RESOLUTION)
            .map(|i| (i as f32 / TRIG_TABLE_RESOLUTION as f32 * TAU).sin())
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self { sines }
    }

    /// Table slot for an angle in radians; any finite angle is accepted.
    fn slot(radians: f32) -> usize {
        let turns = radians / TAU;
        let fraction = turns - turns.floor();
        let slot = (fraction * TRIG_TABLE_RESOLUTION as f32).round() as usize;
        slot % TRIG_TABLE_RESOLUTION
    }

    /// Approximate `sin(radians)`
    pub fn sin(&self, radians: f32) -> f32 {
        if !radians.is_finite() {
            return 0.0;
        }
        self.sines[Self::slot(radians)]
    }

    /// Approximate `cos(radians)`
    pub fn cos(&self, radians: f32) -> f32 {
        if !radians.is_finite() {
            return 1.0;
        }
        let slot = (Self::slot(radians) + TRIG_TABLE_RESOLUTION / 4) % TRIG_TABLE_RESOLUTION;
        self.sines[slot]
    }
}
