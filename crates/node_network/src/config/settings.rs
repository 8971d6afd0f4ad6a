//! Visualization settings surface
//!
//! [`NetworkSettings`] mirrors what the host page hands us: every option is
//! optional. [`ResolvedSettings`] is the concrete parameter set the engine
//! runs with after falling back to the hardware tier defaults.

use serde::{Deserialize, Serialize};

use super::Config;
use crate::hardware::{HardwareProfile, PerformanceTier};

/// Default node sprite radius in world units
pub const DEFAULT_NODE_RADIUS: f32 = 0.08;
/// Default global opacity multiplier for nodes and connections
pub const DEFAULT_NODE_OPACITY: f32 = 0.8;
/// Default organic drift speed (radians of phase per second)
pub const DEFAULT_ORGANIC_MOVEMENT_SPEED: f32 = 0.3;
/// Default connection line width in pixels
pub const DEFAULT_CONNECTION_LINE_WIDTH: f32 = 1.0;
/// Default pointer repulsion radius in world units
pub const DEFAULT_MOUSE_REPULSION_RADIUS: f32 = 3.0;
/// Default pointer repulsion impulse per frame
pub const DEFAULT_MOUSE_REPULSION_STRENGTH: f32 = 0.6;
/// Upper bound on the node count
pub const MAX_NODE_COUNT: usize = 2_000;
/// Upper bound on the connection budget
pub const MAX_CONNECTIONS: usize = 10_000;
/// Default padding added around obstacle rectangles in world units
pub const DEFAULT_DOM_COLLISION_PADDING: f32 = 0.3;
/// Default obstacle avoidance impulse per frame
pub const DEFAULT_DOM_COLLISION_STRENGTH: f32 = 0.4;
/// Default distance from an obstacle edge at which avoidance starts
pub const DEFAULT_DOM_COLLISION_THRESHOLD: f32 = 1.5;

/// Settings as supplied by the host; any subset may be present
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    /// Persisted performance tier preference
    pub performance_tier: Option<PerformanceTier>,
    /// Number of simulated nodes
    pub node_count: Option<usize>,
    /// Node sprite radius in world units
    pub node_radius: Option<f32>,
    /// Global opacity multiplier
    pub node_opacity: Option<f32>,
    /// Organic drift speed
    pub organic_movement_speed: Option<f32>,
    /// Base connection distance in world units
    pub connection_distance: Option<f32>,
    /// Connection budget
    pub max_connections: Option<usize>,
    /// Line width in pixels
    pub connection_line_width: Option<f32>,
    /// Pointer repulsion radius in world units
    pub mouse_repulsion_radius: Option<f32>,
    /// Pointer repulsion impulse
    pub mouse_repulsion_strength: Option<f32>,
    /// Padding around obstacles in world units
    pub dom_collision_padding: Option<f32>,
    /// Obstacle avoidance impulse
    pub dom_collision_strength: Option<f32>,
    /// Edge distance at which obstacle avoidance begins
    pub dom_collision_threshold: Option<f32>,
}

impl Config for NetworkSettings {}

/// Concrete parameters after applying tier defaults
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    /// Tier these settings were resolved against
    pub tier: PerformanceTier,
    /// Number of simulated nodes
    pub node_count: usize,
    /// Node sprite radius
    pub node_radius: f32,
    /// Global opacity multiplier in `[0, 1]`
    pub node_opacity: f32,
    /// Organic drift speed
    pub organic_movement_speed: f32,
    /// Base connection distance
    pub connection_distance: f32,
    /// Connection budget
    pub max_connections: usize,
    /// Line width in pixels
    pub connection_line_width: f32,
    /// Topology recompute cadence in frames (at least 1)
    pub update_interval: u32,
    /// Pointer repulsion radius
    pub mouse_repulsion_radius: f32,
    /// Pointer repulsion impulse
    pub mouse_repulsion_strength: f32,
    /// Padding around obstacles
    pub dom_collision_padding: f32,
    /// Obstacle avoidance impulse
    pub dom_collision_strength: f32,
    /// Edge distance at which obstacle avoidance begins
    pub dom_collision_threshold: f32,
}

fn non_negative(value: Option<f32>, default: f32) -> f32 {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => v,
        Some(v) => {
            log::warn!("Ignoring invalid setting value {}, using {}", v, default);
            default
        }
        None => default,
    }
}

fn bounded_count(value: Option<usize>, default: usize, max: usize) -> usize {
    match value {
        Some(v) if v > max => {
            log::warn!("Clamping setting value {} to {}", v, max);
            max
        }
        Some(v) => v,
        None => default.min(max),
    }
}

impl ResolvedSettings {
    /// Resolve `settings` against the defaults of `profile`
    pub fn resolve(settings: &NetworkSettings, profile: &HardwareProfile) -> Self {
        Self {
            tier: profile.tier,
            node_count: bounded_count(settings.node_count, profile.node_count, MAX_NODE_COUNT),
            node_radius: non_negative(settings.node_radius, DEFAULT_NODE_RADIUS),
            node_opacity: non_negative(settings.node_opacity, DEFAULT_NODE_OPACITY).min(1.0),
            organic_movement_speed: non_negative(
                settings.organic_movement_speed,
                DEFAULT_ORGANIC_MOVEMENT_SPEED,
            ),
            connection_distance: non_negative(
                settings.connection_distance,
                profile.connection_distance,
            ),
            max_connections: bounded_count(
                settings.max_connections,
                profile.max_connections,
                MAX_CONNECTIONS,
            ),
            connection_line_width: non_negative(
                settings.connection_line_width,
                DEFAULT_CONNECTION_LINE_WIDTH,
            ),
            update_interval: profile.update_interval.max(1),
            mouse_repulsion_radius: non_negative(
                settings.mouse_repulsion_radius,
                DEFAULT_MOUSE_REPULSION_RADIUS,
            ),
            mouse_repulsion_strength: non_negative(
                settings.mouse_repulsion_strength,
                DEFAULT_MOUSE_REPULSION_STRENGTH,
            ),
            dom_collision_padding: non_negative(
                settings.dom_collision_padding,
                DEFAULT_DOM_COLLISION_PADDING,
            ),
            dom_collision_strength: non_negative(
                settings.dom_collision_strength,
                DEFAULT_DOM_COLLISION_STRENGTH,
            ),
            dom_collision_threshold: non_negative(
                settings.dom_collision_threshold,
                DEFAULT_DOM_COLLISION_THRESHOLD,
            ),
        }
    }
}
