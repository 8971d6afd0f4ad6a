//! Per-frame report returned by the engine loop

use bitflags::bitflags;

use crate::graph::TopologyStats;
use crate::simulation::SimulationStats;

bitflags! {
    /// Work performed (or skipped) during one tick
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FrameWork: u16 {
        /// Node physics advanced
        const PHYSICS = 1 << 0;
        /// Connection distances, opacities and fades refreshed
        const CONNECTIONS = 1 << 1;
        /// Topology recomputed this frame
        const TOPOLOGY = 1 << 2;
        /// Line resources written
        const RENDER = 1 << 3;
        /// Line resources could not be written this frame
        const RENDER_SKIPPED = 1 << 4;
        /// The host should refresh obstacle rectangles
        const OBSTACLES_STALE = 1 << 5;
        /// A debounced container resize was applied
        const RESIZED = 1 << 6;
        /// Nothing ran because the page is hidden or off-screen
        const SUSPENDED = 1 << 7;
        /// Nothing ran because the engine is torn down
        const TORN_DOWN = 1 << 8;
        /// The frame was rejected
        const FAILED = 1 << 9;
    }
}

impl Default for FrameWork {
    fn default() -> Self {
        Self::empty()
    }
}

/// Summary of one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    /// What ran
    pub work: FrameWork,
    /// Physics summary, zeroed when physics did not run
    pub simulation: SimulationStats,
    /// Topology summary when a pass ran this frame
    pub topology: Option<TopologyStats>,
    /// Live connections after the frame
    pub live_connections: usize,
    /// Connections fading out after the frame
    pub fading_connections: usize,
    /// Line resources checked out after the frame
    pub resources_outstanding: usize,
}

impl FrameReport {
    /// Whether the frame advanced the simulation
    pub fn advanced(&self) -> bool {
        self.work.contains(FrameWork::PHYSICS)
    }

    /// Whether the renderer has fresh line data
    pub fn rendered(&self) -> bool {
        self.work.contains(FrameWork::RENDER)
    }
}
