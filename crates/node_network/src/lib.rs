//! # Node Network
//!
//! Core of an ambient "node network" background: a field of softly drifting
//! nodes that react to the pointer and steer around page elements, joined by
//! short-lived connections that fade in and out as nodes come near.
//!
//! Rendering is left to the host. Each frame the engine publishes node
//! positions through the [`registry::PositionRegistry`] and one pooled
//! [`pool::LineResource`] per drawn connection.
//!
//! ## Features
//!
//! - **Hardware Tiers**: Node density and topology cadence picked per device
//! - **Organic Physics**: Spring-damped drift with pointer and obstacle forces
//! - **Proximity Graph**: Budgeted, throttled connection topology with fades
//! - **Resource Pooling**: Line resources recycled instead of reallocated
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use node_network::prelude::*;
//!
//! fn main() -> Result<(), EngineError> {
//!     logging::init();
//!
//!     let mut engine = NetworkEngine::new(EngineOptions::default())?;
//!     for frame in 0..600 {
//!         let report = engine.tick(frame as f32 / 60.0);
//!         if report.work.contains(FrameWork::OBSTACLES_STALE) {
//!             engine.set_obstacles(Vec::new());
//!         }
//!     }
//!     engine.teardown();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod coords;
pub mod hardware;
pub mod config;
pub mod field;
pub mod registry;
pub mod simulation;
pub mod input;
pub mod graph;
pub mod pool;
pub mod engine;

#[cfg(test)]
mod tests;

pub use engine::{EngineError, EngineOptions, EngineState, FrameReport, FrameWork, NetworkEngine};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        EngineError, EngineOptions, EngineState, FrameReport, FrameWork, NetworkEngine,
        config::{Config, ConfigError, NetworkSettings, ResolvedSettings},
        coords::{dom_to_world, mouse_to_world, world_to_dom, ContainerRect, WorldExtent},
        foundation::{
            logging,
            math::{Vec2, Vec3},
        },
        graph::{Connection, ConnectionKey, ConnectionPhase},
        hardware::{DeviceSignals, HardwareProfile, HardwareProfiler, PerformanceTier},
        pool::{LineResource, PoolError},
        registry::PositionRegistry,
        simulation::obstacles::{ColliderSource, DomCollider},
    };
}
