//! Per-node physics
//!
//! Each frame every node is pulled toward its organic drift target by a
//! damped spring, pushed away from the pointer and steered around page
//! obstacles. The resulting positions are written to the
//! [`PositionRegistry`], which no other system writes.

pub mod obstacles;
pub mod organic;

use crate::config::ResolvedSettings;
use crate::field::NodeField;
use crate::foundation::math::{direction_2d, smoothstep, Vec2};
use crate::registry::PositionRegistry;

use obstacles::DomCollider;
use organic::OrganicMotion;

/// Integration step applied per frame regardless of the real frame time
pub const FIXED_TIME_STEP: f32 = 1.0 / 60.0;

/// Default spring pull toward the drift target
pub const DEFAULT_RETURN_FORCE: f32 = 2.4;

/// Default per-frame velocity retention
pub const DEFAULT_DAMPING_FACTOR: f32 = 0.92;

/// Amplitude of the cosmetic scale pulse
const SCALE_PULSE_AMPLITUDE: f32 = 0.15;

/// Force parameters for the simulator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParams {
    /// Pointer influence radius in world units
    pub repulsion_radius: f32,
    /// Peak pointer impulse per frame
    pub repulsion_strength: f32,
    /// Padding added around obstacles
    pub collision_padding: f32,
    /// Peak obstacle impulse per frame
    pub collision_strength: f32,
    /// Edge distance at which obstacle avoidance starts
    pub collision_threshold: f32,
    /// Spring constant toward the drift target
    pub return_force: f32,
    /// Velocity retention per frame, below 1
    pub damping_factor: f32,
    /// Sprite radius the scale pulse oscillates around
    pub node_radius: f32,
}

impl SimulationParams {
    /// Parameters from resolved settings with default spring and damping
    pub fn from_settings(settings: &ResolvedSettings) -> Self {
        Self {
            repulsion_radius: settings.mouse_repulsion_radius,
            repulsion_strength: settings.mouse_repulsion_strength,
            collision_padding: settings.dom_collision_padding,
            collision_strength: settings.dom_collision_strength,
            collision_threshold: settings.dom_collision_threshold,
            return_force: DEFAULT_RETURN_FORCE,
            damping_factor: DEFAULT_DAMPING_FACTOR,
            node_radius: settings.node_radius,
        }
    }
}

/// Inputs for one simulation step
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    /// Seconds since the visualization started
    pub elapsed: f32,
    /// Pointer in world space, `None` when absent or idle
    pub pointer: Option<Vec2>,
    /// Obstacles to steer around
    pub obstacles: &'a [DomCollider],
}

/// What a step did, for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimulationStats {
    /// Nodes advanced
    pub nodes: usize,
    /// Sum of pointer impulse magnitudes applied
    pub repulsion_impulse: f32,
    /// Sum of obstacle impulse magnitudes applied
    pub collision_impulse: f32,
}

/// Advances node physics and publishes positions
#[derive(Debug, Clone)]
pub struct NodeSimulator {
    params: SimulationParams,
    motion: OrganicMotion,
}

impl NodeSimulator {
    /// Create a simulator
    pub fn new(params: SimulationParams, motion: OrganicMotion) -> Self {
        Self { params, motion }
    }

    /// Force parameters
    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Replace force parameters
    pub fn set_params(&mut self, params: SimulationParams) {
        self.params = params;
    }

    /// Drift model, shared with node spawning
    pub fn motion(&self) -> &OrganicMotion {
        &self.motion
    }

    /// Mutable drift model
    pub fn motion_mut(&mut self) -> &mut OrganicMotion {
        &mut self.motion
    }

    /// Advance every node by one frame and write the registry.
    ///
    /// The registry is resized to the field first, so after this call it
    /// holds exactly one slot per node.
    pub fn step(
        &self,
        field: &mut NodeField,
        registry: &mut PositionRegistry,
        input: &FrameInput<'_>,
    ) -> SimulationStats {
        registry.resize(field.len());

        let mut stats = SimulationStats {
            nodes: field.len(),
            ..SimulationStats::default()
        };

        for node in field.nodes_mut() {
            let phase = self.motion.phase(node.index, input.elapsed);
            let target = self.motion.target(node.base_position, node.index, input.elapsed);
            let position = node.current_position.xy();

            if let Some(pointer) = input.pointer {
                let impulse = self.pointer_impulse(position, pointer);
                stats.repulsion_impulse += impulse.norm();
                node.velocity += impulse;
            }

            for collider in input.obstacles {
                let impulse = self.obstacle_impulse(position, collider);
                stats.collision_impulse += impulse.norm();
                node.velocity += impulse;
            }

            node.velocity += (target.xy() - position) * self.params.return_force;
            node.velocity *= self.params.damping_factor;

            let integrated = position + node.velocity * FIXED_TIME_STEP;
            node.current_position.x = integrated.x;
            node.current_position.y = integrated.y;
            node.current_position.z = target.z;

            registry.write(node.index, node.current_position);

            let pulse = 1.0 + SCALE_PULSE_AMPLITUDE * self.motion.trig().sin(phase * 1.7);
            registry.write_scale(node.index, self.params.node_radius * pulse);
        }

        stats
    }

    fn pointer_impulse(&self, position: Vec2, pointer: Vec2) -> Vec2 {
        let radius = self.params.repulsion_radius;
        if radius <= 0.0 {
            return Vec2::zeros();
        }
        let distance = (position - pointer).norm();
        if distance >= radius {
            return Vec2::zeros();
        }
        let away = direction_2d(pointer, position, Vec2::new(0.0, 1.0));
        away * (self.params.repulsion_strength * smoothstep(1.0 - distance / radius))
    }

    fn obstacle_impulse(&self, position: Vec2, collider: &DomCollider) -> Vec2 {
        let threshold = self.params.collision_threshold;
        if threshold <= 0.0 {
            return Vec2::zeros();
        }
        let edge_distance = collider.edge_distance(position, self.params.collision_padding);
        if edge_distance >= threshold {
            return Vec2::zeros();
        }
        let away = direction_2d(collider.center(), position, Vec2::new(0.0, 1.0));
        away * (self.params.collision_strength * (threshold - edge_distance) / threshold)
    }
}
