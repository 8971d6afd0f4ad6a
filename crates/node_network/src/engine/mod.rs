//! Visualization engine
//!
//! [`NetworkEngine`] owns every subsystem and runs them in a fixed order each
//! time the host calls [`NetworkEngine::tick`]:
//!
//! ```text
//! visibility gate → due resize → obstacle cadence → physics
//!     → topology (every Nth frame) → connection fades → line resources
//! ```
//!
//! Physics always completes before topology reads the registry. Errors
//! inside a frame are logged and reflected in the [`FrameReport`]; nothing
//! propagates out of `tick`.

mod error;
mod report;

pub use error::EngineError;
pub use report::{FrameReport, FrameWork};

use crate::config::{Config, NetworkSettings, ResolvedSettings};
use crate::coords::{dom_to_world, WorldExtent};
use crate::field::NodeField;
use crate::foundation::time::{Debounce, IntervalTimer};
use crate::graph::{Connection, ConnectionKey, GraphParams, ProximityGraphBuilder};
use crate::hardware::{DeviceSignals, HardwareProfile, HardwareProfiler, PerformanceTier};
use crate::input::PointerTracker;
use crate::pool::{LineResource, LineResourceFactory, RenderResourcePool};
use crate::registry::PositionRegistry;
use crate::simulation::obstacles::{DomCollider, ObstacleRegistry};
use crate::simulation::organic::OrganicMotion;
use crate::simulation::{FrameInput, NodeSimulator, SimulationParams};

/// Delay before a container resize is applied
pub const RESIZE_DEBOUNCE_SECS: f32 = 0.25;

/// Fallback cadence at which the host is asked to re-measure obstacles
pub const OBSTACLE_REFRESH_SECS: f32 = 0.5;

/// Default vertical field of view of the host camera
pub const DEFAULT_CAMERA_FOV_DEGREES: f32 = 75.0;

/// Default distance from the host camera to the node plane
pub const DEFAULT_CAMERA_DISTANCE: f32 = 15.0;

/// Default connection colour
pub const DEFAULT_LINE_COLOR: [f32; 3] = [0.55, 0.75, 1.0];

/// Pool of line resources keyed by connection
pub type LinePool = RenderResourcePool<ConnectionKey, LineResourceFactory>;

/// Everything needed to start an engine
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Host-supplied settings
    pub settings: NetworkSettings,
    /// Device characteristics for tier detection
    pub signals: DeviceSignals,
    /// Tier forced by the caller, wins over everything else
    pub tier_override: Option<PerformanceTier>,
    /// Container width in pixels
    pub container_width: f32,
    /// Container height in pixels
    pub container_height: f32,
    /// Vertical field of view of the host camera
    pub camera_fov_degrees: f32,
    /// Camera distance to the node plane
    pub camera_distance: f32,
    /// Seed for node placement and connection lifetimes
    pub seed: Option<u64>,
    /// Connection colour
    pub line_color: [f32; 3],
    /// Maximum number of line resources alive at once
    pub allocation_limit: Option<usize>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            settings: NetworkSettings::default(),
            signals: DeviceSignals::probe_host(),
            tier_override: None,
            container_width: 1280.0,
            container_height: 720.0,
            camera_fov_degrees: DEFAULT_CAMERA_FOV_DEGREES,
            camera_distance: DEFAULT_CAMERA_DISTANCE,
            seed: None,
            line_color: DEFAULT_LINE_COLOR,
            allocation_limit: None,
        }
    }
}

impl EngineOptions {
    /// Replace the settings with the contents of a TOML or RON file
    pub fn with_settings_file(mut self, path: &str) -> Result<Self, EngineError> {
        self.settings = NetworkSettings::load_from_file(path)?;
        log::info!("Loaded settings from {}", path);
        Ok(self)
    }
}

/// Lifecycle state of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Ticks advance the simulation
    Running,
    /// Page hidden or container off-screen; ticks do nothing
    Suspended,
    /// Resources released; ticks do nothing
    TornDown,
}

/// Ambient node-network visualization engine
pub struct NetworkEngine {
    signals: DeviceSignals,
    tier_override: Option<PerformanceTier>,
    profiler: HardwareProfiler,
    profile: HardwareProfile,
    source_settings: NetworkSettings,
    settings: ResolvedSettings,

    container_width: f32,
    container_height: f32,
    camera_fov_degrees: f32,
    camera_distance: f32,
    extent: WorldExtent,

    field: NodeField,
    registry: PositionRegistry,
    simulator: NodeSimulator,
    graph: ProximityGraphBuilder,
    pool: LinePool,

    pointer: PointerTracker,
    obstacles: ObstacleRegistry,
    obstacle_refresh: IntervalTimer,
    pending_resize: Debounce<(f32, f32)>,

    page_visible: bool,
    in_viewport: bool,
    torn_down: bool,
    frame_count: u64,
    last_elapsed: f32,
}

impl NetworkEngine {
    /// Create an engine and spawn the initial node field
    pub fn new(options: EngineOptions) -> Result<Self, EngineError> {
        let EngineOptions {
            settings: source_settings,
            signals,
            tier_override,
            container_width,
            container_height,
            camera_fov_degrees,
            camera_distance,
            seed,
            line_color,
            allocation_limit,
        } = options;

        if !usable_container(container_width, container_height) {
            return Err(EngineError::InvalidContainer {
                width: container_width,
                height: container_height,
            });
        }

        let mut profiler = HardwareProfiler::new();
        let profile = profiler.resolve(&signals, tier_override, source_settings.performance_tier);
        let settings = ResolvedSettings::resolve(&source_settings, &profile);

        let extent = WorldExtent::from_perspective(
            camera_fov_degrees,
            camera_distance,
            container_width / container_height,
        );

        let motion = OrganicMotion::new(settings.organic_movement_speed, OrganicMotion::default_amplitude());
        let simulator = NodeSimulator::new(SimulationParams::from_settings(&settings), motion);

        let (mut field, graph) = match seed {
            Some(seed) => (
                NodeField::with_seed(seed),
                ProximityGraphBuilder::with_seed(GraphParams::from_settings(&settings), seed.wrapping_add(1)),
            ),
            None => (NodeField::new(), ProximityGraphBuilder::new(GraphParams::from_settings(&settings))),
        };
        field.resize(settings.node_count, extent, 0.0, simulator.motion());

        let factory = LineResourceFactory::new(line_color, settings.connection_line_width)
            .with_allocation_limit(allocation_limit);

        log::info!(
            "Node network started: {} nodes over {:.1}x{:.1} world units, tier {}",
            field.len(),
            extent.width,
            extent.height,
            settings.tier
        );

        Ok(Self {
            signals,
            tier_override,
            profiler,
            profile,
            source_settings,
            settings,
            container_width,
            container_height,
            camera_fov_degrees,
            camera_distance,
            extent,
            field,
            registry: PositionRegistry::new(),
            simulator,
            graph,
            pool: RenderResourcePool::new(factory),
            pointer: PointerTracker::new(),
            obstacles: ObstacleRegistry::new(),
            obstacle_refresh: IntervalTimer::new(OBSTACLE_REFRESH_SECS),
            pending_resize: Debounce::new(RESIZE_DEBOUNCE_SECS),
            page_visible: true,
            in_viewport: true,
            torn_down: false,
            frame_count: 0,
            last_elapsed: 0.0,
        })
    }

    /// Advance one frame at `elapsed` seconds since start
    pub fn tick(&mut self, elapsed: f32) -> FrameReport {
        let mut report = FrameReport::default();

        match self.state() {
            EngineState::TornDown => {
                report.work |= FrameWork::TORN_DOWN;
                return report;
            }
            EngineState::Suspended => {
                if elapsed.is_finite() {
                    self.last_elapsed = elapsed;
                }
                report.work |= FrameWork::SUSPENDED;
                return self.finish_report(report);
            }
            EngineState::Running => {}
        }

        if !elapsed.is_finite() {
            log::error!("Rejected frame with non-finite time {}", elapsed);
            report.work |= FrameWork::FAILED;
            return self.finish_report(report);
        }
        self.last_elapsed = elapsed;

        if let Some((width, height)) = self.pending_resize.take_due(elapsed) {
            if self.apply_resize(width, height) {
                report.work |= FrameWork::RESIZED | FrameWork::OBSTACLES_STALE;
                self.obstacle_refresh.reset();
                self.obstacle_refresh.poll(elapsed);
            }
        }
        if self.obstacle_refresh.poll(elapsed) {
            report.work |= FrameWork::OBSTACLES_STALE;
        }

        let pointer = self.pointer.active_position(elapsed).map(|p| {
            dom_to_world(
                p.x,
                p.y,
                self.container_width,
                self.container_height,
                self.extent.width,
                self.extent.height,
            )
        });
        let input = FrameInput {
            elapsed,
            pointer,
            obstacles: self.obstacles.colliders(),
        };
        report.simulation = self.simulator.step(&mut self.field, &mut self.registry, &input);
        report.work |= FrameWork::PHYSICS;

        if self.frame_count % u64::from(self.settings.update_interval.max(1)) == 0 {
            report.topology = Some(self.graph.recompute(&self.registry, elapsed));
            report.work |= FrameWork::TOPOLOGY;
        }

        self.graph.update_frame(&self.registry, elapsed);
        report.work |= FrameWork::CONNECTIONS;

        for key in self.graph.drain_released() {
            self.pool.release(&key);
        }

        match self.sync_line_resources() {
            Ok(()) => report.work |= FrameWork::RENDER,
            Err(err) => {
                log::warn!("Skipping connection render this frame: {}", err);
                report.work |= FrameWork::RENDER_SKIPPED;
            }
        }

        self.frame_count += 1;
        self.finish_report(report)
    }

    fn finish_report(&self, mut report: FrameReport) -> FrameReport {
        report.live_connections = self.graph.connection_count();
        report.fading_connections = self.graph.fading_count();
        report.resources_outstanding = self.pool.outstanding();
        report
    }

    fn sync_line_resources(&mut self) -> Result<(), EngineError> {
        let line_width = self.settings.connection_line_width;
        for connection in self.graph.drawable() {
            let handle = self.pool.acquire(connection.key)?;
            let endpoints = (
                self.registry.position(connection.key.low()),
                self.registry.position(connection.key.high()),
            );
            if let (Some(a), Some(b), Some(line)) = (endpoints.0, endpoints.1, self.pool.get_mut(handle)) {
                line.update(a, b, connection.opacity, line_width);
            }
        }
        Ok(())
    }

    fn apply_resize(&mut self, width: f32, height: f32) -> bool {
        if !usable_container(width, height) {
            log::warn!("Ignoring resize to unusable container {}x{}", width, height);
            return false;
        }
        self.container_width = width;
        self.container_height = height;
        self.extent = WorldExtent::from_perspective(self.camera_fov_degrees, self.camera_distance, width / height);
        log::info!(
            "Container resized to {}x{} px, world extent {:.1}x{:.1}",
            width,
            height,
            self.extent.width,
            self.extent.height
        );
        true
    }

    /// Pointer moved to `(x, y)` container-relative pixels
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        if self.torn_down {
            return;
        }
        self.pointer.pointer_moved(x, y, self.last_elapsed);
    }

    /// Pointer left the container
    pub fn pointer_left(&mut self) {
        self.pointer.pointer_left();
    }

    /// Replace the obstacle rectangles, dropping malformed ones
    pub fn set_obstacles(&mut self, colliders: Vec<DomCollider>) {
        if self.torn_down {
            return;
        }
        self.obstacles.replace(colliders);
    }

    /// Page visibility changed
    pub fn set_page_visible(&mut self, visible: bool) {
        if self.page_visible != visible {
            log::debug!("Page visibility changed: {}", visible);
        }
        self.page_visible = visible;
    }

    /// Container entered or left the viewport
    pub fn set_in_viewport(&mut self, in_viewport: bool) {
        if self.in_viewport != in_viewport {
            log::debug!("Viewport intersection changed: {}", in_viewport);
        }
        self.in_viewport = in_viewport;
    }

    /// Container size changed; applied once resizes stop for a moment
    pub fn resize_container(&mut self, width: f32, height: f32) {
        if self.torn_down {
            return;
        }
        self.pending_resize.schedule((width, height), self.last_elapsed);
    }

    /// Apply new host settings, resizing the field to the new node count
    pub fn apply_settings(&mut self, settings: NetworkSettings) -> Result<(), EngineError> {
        if self.torn_down {
            return Err(EngineError::TornDown);
        }

        if settings.performance_tier != self.source_settings.performance_tier {
            self.profiler.reset();
        }
        self.profile = self.profiler.resolve(&self.signals, self.tier_override, settings.performance_tier);
        self.settings = ResolvedSettings::resolve(&settings, &self.profile);
        self.source_settings = settings;

        self.simulator.set_params(SimulationParams::from_settings(&self.settings));
        self.simulator.motion_mut().set_speed(self.settings.organic_movement_speed);
        self.graph.set_params(GraphParams::from_settings(&self.settings));
        self.pool.factory_mut().set_line_width(self.settings.connection_line_width);

        let change = self.field.resize(
            self.settings.node_count,
            self.extent,
            self.last_elapsed,
            self.simulator.motion(),
        );
        log::info!(
            "Settings applied: tier {}, {} nodes (+{} / -{})",
            self.settings.tier,
            self.field.len(),
            change.added,
            change.removed
        );
        Ok(())
    }

    /// Stop for good: cancel timers, drop connections and dispose resources
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.pending_resize.cancel();
        self.pointer.clear();
        self.obstacles.clear();
        self.graph.clear();
        for key in self.graph.drain_released() {
            self.pool.release(&key);
        }
        self.pool.dispose_all();
        self.torn_down = true;
        log::info!("Node network torn down after {} frame(s)", self.frame_count);
    }

    /// Current lifecycle state
    pub fn state(&self) -> EngineState {
        if self.torn_down {
            EngineState::TornDown
        } else if self.page_visible && self.in_viewport {
            EngineState::Running
        } else {
            EngineState::Suspended
        }
    }

    /// Node positions and scales for the renderer
    pub fn registry(&self) -> &PositionRegistry {
        &self.registry
    }

    /// Node set
    pub fn field(&self) -> &NodeField {
        &self.field
    }

    /// Connection topology
    pub fn graph(&self) -> &ProximityGraphBuilder {
        &self.graph
    }

    /// Connections to draw this frame, live and fading out
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.graph.drawable()
    }

    /// Line resource for each drawn connection
    pub fn line_resources(&self) -> impl Iterator<Item = (ConnectionKey, &LineResource)> + '_ {
        self.pool.checked_out()
    }

    /// Line resource pool
    pub fn pool(&self) -> &LinePool {
        &self.pool
    }

    /// Resolved settings in effect
    pub fn settings(&self) -> &ResolvedSettings {
        &self.settings
    }

    /// Hardware profile in effect
    pub fn profile(&self) -> &HardwareProfile {
        &self.profile
    }

    /// Visible world extent
    pub fn extent(&self) -> WorldExtent {
        self.extent
    }

    /// Container size in pixels
    pub fn container_size(&self) -> (f32, f32) {
        (self.container_width, self.container_height)
    }

    /// Obstacles in effect
    pub fn obstacles(&self) -> &[DomCollider] {
        self.obstacles.colliders()
    }

    /// Frames that advanced the simulation
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl std::fmt::Debug for NetworkEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkEngine")
            .field("state", &self.state())
            .field("tier", &self.settings.tier)
            .field("nodes", &self.field.len())
            .field("connections", &self.graph.connection_count())
            .field("frame_count", &self.frame_count)
            .finish()
    }
}

fn usable_container(width: f32, height: f32) -> bool {
    width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0
}
