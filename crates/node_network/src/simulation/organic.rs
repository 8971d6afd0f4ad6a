//! Organic drift
//!
//! Every node wanders around its anchor along three phase-shifted sinusoids.
//! The phase offset per index keeps neighbours from moving in lockstep.

use crate::foundation::math::Vec3;
use crate::foundation::trig::TrigTable;

/// Phase offset between consecutive node indices
pub const PHASE_CONSTANT: f32 = 0.5;

/// Drift parameters shared by the simulator and node spawning
#[derive(Debug, Clone)]
pub struct OrganicMotion {
    speed: f32,
    amplitude: Vec3,
    trig: TrigTable,
}

impl OrganicMotion {
    /// Create drift with the given phase speed and per-axis amplitude
    pub fn new(speed: f32, amplitude: Vec3) -> Self {
        Self {
            speed,
            amplitude,
            trig: TrigTable::new(),
        }
    }

    /// Default per-axis drift amplitude in world units
    pub fn default_amplitude() -> Vec3 {
        Vec3::new(0.6, 0.6, 0.3)
    }

    /// Phase speed
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Change the phase speed; amplitude and table are kept
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Lookup table used for the sinusoids
    pub fn trig(&self) -> &TrigTable {
        &self.trig
    }

    /// Drift phase of node `index` at `elapsed` seconds
    pub fn phase(&self, index: usize, elapsed: f32) -> f32 {
        elapsed * self.speed + index as f32 * PHASE_CONSTANT
    }

    /// Where node `index` anchored at `base` wants to be at `elapsed`
    pub fn target(&self, base: Vec3, index: usize, elapsed: f32) -> Vec3 {
        let phase = self.phase(index, elapsed);
        let wave = Vec3::new(
            self.trig.sin(phase),
            self.trig.cos(phase * 0.8),
            self.trig.sin(phase * 0.6),
        );
        base + self.amplitude.component_mul(&wave)
    }
}
