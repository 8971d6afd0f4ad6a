//! Proximity graph
//!
//! Decides which node pairs are drawn as connections. Topology is expensive
//! (quadratic in the node count), so [`ProximityGraphBuilder::recompute`]
//! runs only every Nth frame. [`ProximityGraphBuilder::update_frame`] runs
//! every frame and keeps existing connections tracking their endpoints.
//!
//! # Lifecycle
//!
//! ```text
//! absent ──(under threshold, budget left)──▶ fading-in ──▶ steady
//!   ▲                                                      │
//!   └──(resources released)── fading-out ◀──(expired or excluded)
//! ```

pub mod connection;

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ResolvedSettings;
use crate::foundation::math::Vec3;
use crate::registry::PositionRegistry;

pub use connection::{Connection, ConnectionKey, ConnectionPhase};

/// Above this node count candidate pairs are sampled instead of exhaustively checked
pub const SAMPLING_CUTOFF: usize = 150;

/// Default upper bound on pairs examined by a sampled pass
pub const DEFAULT_MAX_PAIR_CHECKS: usize = 12_000;

/// Amplitude of the breathing oscillation added to the base distance
pub const THRESHOLD_OSCILLATION: f32 = 0.3;

/// Angular frequency of the breathing oscillation in radians per second
pub const THRESHOLD_FREQUENCY: f32 = 0.5;

/// Default minimum connection lifetime in seconds
pub const DEFAULT_LIFETIME_SECS: f32 = 12.0;

/// Default random extra lifetime in seconds
pub const DEFAULT_LIFETIME_JITTER_SECS: f32 = 6.0;

/// Parameters for topology passes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphParams {
    /// Base connection distance
    pub base_distance: f32,
    /// Connection budget
    pub max_connections: usize,
    /// Pair budget for sampled passes
    pub max_pair_checks: usize,
    /// Minimum lifetime of a new connection
    pub lifetime_base: f32,
    /// Upper bound of random extra lifetime
    pub lifetime_jitter: f32,
    /// Global opacity multiplier
    pub intensity: f32,
}

impl GraphParams {
    /// Parameters from resolved settings
    pub fn from_settings(settings: &ResolvedSettings) -> Self {
        Self {
            base_distance: settings.connection_distance,
            max_connections: settings.max_connections,
            max_pair_checks: DEFAULT_MAX_PAIR_CHECKS,
            lifetime_base: DEFAULT_LIFETIME_SECS,
            lifetime_jitter: DEFAULT_LIFETIME_JITTER_SECS,
            intensity: settings.node_opacity,
        }
    }
}

/// Result of one topology pass
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TopologyStats {
    /// Threshold used for this pass
    pub threshold: f32,
    /// Pairs whose distance was computed
    pub pairs_examined: usize,
    /// Pairs found under the threshold
    pub candidates: usize,
    /// Whether the candidate search was sampled
    pub sampled: bool,
    /// Connections kept from the previous pass
    pub retained: usize,
    /// Connections created in this pass
    pub created: usize,
    /// Connections sent to fade out
    pub dropped: usize,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    i: usize,
    j: usize,
    distance_sq: f32,
}

/// Maintains the live connection set
#[derive(Debug)]
pub struct ProximityGraphBuilder {
    params: GraphParams,
    live: HashMap<ConnectionKey, Connection>,
    fading: HashMap<ConnectionKey, Connection>,
    released: Vec<ConnectionKey>,
    candidates: Vec<Candidate>,
    rng: StdRng,
}

impl ProximityGraphBuilder {
    /// Create a builder with an entropy-seeded lifetime jitter
    pub fn new(params: GraphParams) -> Self {
        Self::with_rng(params, StdRng::from_entropy())
    }

    /// Create a builder with a fixed seed
    pub fn with_seed(params: GraphParams, seed: u64) -> Self {
        Self::with_rng(params, StdRng::seed_from_u64(seed))
    }

    fn with_rng(params: GraphParams, rng: StdRng) -> Self {
        Self {
            params,
            live: HashMap::new(),
            fading: HashMap::new(),
            released: Vec::new(),
            candidates: Vec::new(),
            rng,
        }
    }

    /// Current parameters
    pub fn params(&self) -> &GraphParams {
        &self.params
    }

    /// Replace parameters; a smaller budget applies from the next pass
    pub fn set_params(&mut self, params: GraphParams) {
        self.params = params;
    }

    /// Connection threshold at `elapsed`
    pub fn dynamic_threshold(&self, elapsed: f32) -> f32 {
        self.params.base_distance + THRESHOLD_OSCILLATION * (elapsed * THRESHOLD_FREQUENCY).sin()
    }

    /// Live (not fading-out) connections
    pub fn live(&self) -> impl Iterator<Item = &Connection> {
        self.live.values()
    }

    /// Connections currently fading out
    pub fn fading(&self) -> impl Iterator<Item = &Connection> {
        self.fading.values()
    }

    /// Everything that should be drawn this frame
    pub fn drawable(&self) -> impl Iterator<Item = &Connection> {
        self.live.values().chain(self.fading.values())
    }

    /// Live connection for `key`
    pub fn get(&self, key: &ConnectionKey) -> Option<&Connection> {
        self.live.get(key)
    }

    /// Number of live connections
    pub fn connection_count(&self) -> usize {
        self.live.len()
    }

    /// Number of connections fading out
    pub fn fading_count(&self) -> usize {
        self.fading.len()
    }

    /// Keys whose connections are gone and whose resources can be reclaimed
    pub fn drain_released(&mut self) -> std::vec::Drain<'_, ConnectionKey> {
        self.released.drain(..)
    }

    /// Drop every connection, releasing all keys
    pub fn clear(&mut self) {
        self.released.extend(self.live.drain().map(|(key, _)| key));
        self.released.extend(self.fading.drain().map(|(key, _)| key));
    }

    /// Recompute topology from the frame's positions.
    ///
    /// Must run after the simulator has written the current frame.
    pub fn recompute(&mut self, registry: &PositionRegistry, now: f32) -> TopologyStats {
        let threshold = self.dynamic_threshold(now);
        let mut stats = TopologyStats {
            threshold,
            ..TopologyStats::default()
        };

        self.collect_candidates(registry, threshold, &mut stats);
        stats.candidates = self.candidates.len();

        // Pairs still fading out finish their fade before they can re-form
        let fading = &self.fading;
        self.candidates
            .retain(|candidate| !fading.contains_key(&ConnectionKey::new(candidate.i, candidate.j)));

        // Stable: equal distances keep discovery order
        self.candidates
            .sort_by(|a, b| a.distance_sq.total_cmp(&b.distance_sq));
        self.candidates.truncate(self.params.max_connections);

        let candidates = std::mem::take(&mut self.candidates);
        let mut next = HashMap::with_capacity(candidates.len());
        for candidate in &candidates {
            let key = ConnectionKey::new(candidate.i, candidate.j);
            let distance = candidate.distance_sq.sqrt();

            match self.live.remove(&key) {
                Some(mut existing) if !existing.is_expired(now) => {
                    existing.distance = distance;
                    next.insert(key, existing);
                    stats.retained += 1;
                }
                Some(mut expired) => {
                    expired.begin_fade_out(now);
                    self.fading.insert(key, expired);
                    stats.dropped += 1;
                }
                None => {
                    let lifetime = self.params.lifetime_base + self.jitter();
                    next.insert(key, Connection::new(key, distance, now, lifetime));
                    stats.created += 1;
                }
            }
        }

        self.candidates = candidates;

        for (key, mut excluded) in self.live.drain() {
            excluded.begin_fade_out(now);
            self.fading.insert(key, excluded);
            stats.dropped += 1;
        }
        self.live = next;

        log::debug!(
            "Topology pass: threshold {:.2}, {} pairs examined{}, {} candidates, {} retained, {} created, {} dropped",
            stats.threshold,
            stats.pairs_examined,
            if stats.sampled { " (sampled)" } else { "" },
            stats.candidates,
            stats.retained,
            stats.created,
            stats.dropped
        );

        stats
    }

    /// Per-frame refresh of distances, opacities and fades
    pub fn update_frame(&mut self, registry: &PositionRegistry, now: f32) {
        let threshold = self.dynamic_threshold(now);
        let intensity = self.params.intensity;

        let mut expired = Vec::new();
        for (key, connection) in &mut self.live {
            match endpoint_distance(registry, *key) {
                Some(distance) if !connection.is_expired(now) => {
                    connection.update(distance, threshold, now, intensity);
                }
                Some(distance) => {
                    connection.begin_fade_out(now);
                    connection.update(distance, threshold, now, intensity);
                    expired.push(*key);
                }
                None => {
                    // Endpoint removed by a field shrink
                    self.released.push(*key);
                    expired.push(*key);
                }
            }
        }
        for key in expired {
            if let Some(connection) = self.live.remove(&key) {
                if connection.is_fading_out() {
                    self.fading.insert(key, connection);
                }
            }
        }

        let released = &mut self.released;
        self.fading.retain(|key, connection| {
            let Some(distance) = endpoint_distance(registry, *key) else {
                released.push(*key);
                return false;
            };
            connection.update(distance, threshold, now, intensity);
            if connection.is_faded(now) {
                released.push(*key);
                false
            } else {
                true
            }
        });
    }

    fn collect_candidates(&mut self, registry: &PositionRegistry, threshold: f32, stats: &mut TopologyStats) {
        self.candidates.clear();
        let count = registry.len();
        let budget = self.params.max_connections.saturating_mul(2);
        if count < 2 || budget == 0 || threshold <= 0.0 {
            return;
        }

        let threshold_sq = threshold * threshold;
        let packed = registry.positions();
        let at = |k: usize| Vec3::new(packed[k * 3], packed[k * 3 + 1], packed[k * 3 + 2]);

        let sampled = count > SAMPLING_CUTOFF;
        stats.sampled = sampled;
        let stride = if sampled { count.div_ceil(SAMPLING_CUTOFF) } else { 1 };
        let max_checks = if sampled { self.params.max_pair_checks } else { usize::MAX };

        'outer: for i in 0..count {
            // Rotate the starting offset so different rows sample different columns
            let mut j = i + 1 + (i % stride);
            while j < count {
                if stats.pairs_examined >= max_checks {
                    break 'outer;
                }
                stats.pairs_examined += 1;

                let distance_sq = (at(i) - at(j)).norm_squared();
                if distance_sq < threshold_sq {
                    self.candidates.push(Candidate { i, j, distance_sq });
                    if self.candidates.len() >= budget {
                        break 'outer;
                    }
                }
                j += stride;
            }
        }
    }

    fn jitter(&mut self) -> f32 {
        if self.params.lifetime_jitter > 0.0 {
            self.rng.gen_range(0.0..self.params.lifetime_jitter)
        } else {
            0.0
        }
    }
}

fn endpoint_distance(registry: &PositionRegistry, key: ConnectionKey) -> Option<f32> {
    let a = registry.position(key.low())?;
    let b = registry.position(key.high())?;
    Some((a - b).norm())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(base_distance: f32, max_connections: usize) -> GraphParams {
        GraphParams {
            base_distance,
            max_connections,
            max_pair_checks: DEFAULT_MAX_PAIR_CHECKS,
            lifetime_base: 1_000.0,
            lifetime_jitter: 0.0,
            intensity: 1.0,
        }
    }

    fn registry_with(points: &[Vec3]) -> PositionRegistry {
        let mut registry = PositionRegistry::new();
        registry.resize(points.len());
        for (index, point) in points.iter().enumerate() {
            registry.write(index, *point);
        }
        registry
    }

    fn triangle() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.5, 3.0_f32.sqrt() / 2.0, 0.0),
        ]
    }

    #[test]
    fn test_equilateral_triangle_forms_three_connections() {
        let registry = registry_with(&triangle());
        let mut graph = ProximityGraphBuilder::with_seed(params(5.0, 10), 1);
        let stats = graph.recompute(&registry, 0.0);
        assert_eq!(graph.connection_count(), 3);
        assert_eq!(stats.created, 3);
        assert!(!stats.sampled);
    }

    #[test]
    fn test_budget_keeps_closest_pairs() {
        let registry = registry_with(&[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
        ]);
        let mut graph = ProximityGraphBuilder::with_seed(params(5.0, 1), 1);
        graph.recompute(&registry, 0.0);
        assert_eq!(graph.connection_count(), 1);
        assert!(graph.get(&ConnectionKey::new(0, 1)).is_some());
    }

    #[test]
    fn test_count_never_exceeds_budget() {
        let points: Vec<Vec3> = (0..60)
            .map(|i| Vec3::new((i % 8) as f32 * 0.7, (i / 8) as f32 * 0.7, 0.0))
            .collect();
        let registry = registry_with(&points);
        for budget in [0, 1, 7, 25, 80] {
            let mut graph = ProximityGraphBuilder::with_seed(params(4.0, budget), 3);
            for frame in 0..5 {
                graph.recompute(&registry, frame as f32 * 0.1);
                assert!(graph.connection_count() <= budget);
            }
        }
    }

    #[test]
    fn test_birth_time_preserved_across_passes() {
        let registry = registry_with(&[Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)]);
        let mut graph = ProximityGraphBuilder::with_seed(params(5.0, 10), 1);
        graph.recompute(&registry, 1.0);
        let key = ConnectionKey::new(0, 1);
        let birth = graph.get(&key).unwrap().birth_time;
        let lifetime = graph.get(&key).unwrap().lifetime;

        for step in 1..20 {
            let now = 1.0 + step as f32 * 0.1;
            graph.update_frame(&registry, now);
            let stats = graph.recompute(&registry, now);
            assert_eq!(stats.retained, 1);
            assert_eq!(graph.get(&key).unwrap().birth_time, birth);
            assert_eq!(graph.get(&key).unwrap().lifetime, lifetime);
        }
    }

    #[test]
    fn test_separating_pair_disconnects_until_back_in_range() {
        let mut graph = ProximityGraphBuilder::with_seed(params(5.0, 10), 1);
        let key = ConnectionKey::new(0, 1);
        let mut seen_gone = false;

        for step in 0..=19 {
            let distance = 1.0 + step as f32;
            let registry = registry_with(&[Vec3::zeros(), Vec3::new(distance, 0.0, 0.0)]);
            let now = step as f32 * 0.1;
            graph.recompute(&registry, now);
            let threshold = graph.dynamic_threshold(now);

            if distance > threshold {
                assert!(graph.get(&key).is_none(), "still connected at {}", distance);
                seen_gone = true;
            } else {
                assert!(!seen_gone, "reconnected at {} while moving apart", distance);
                assert!(graph.get(&key).is_some());
            }
        }
        assert!(seen_gone);

        let registry = registry_with(&[Vec3::zeros(), Vec3::new(2.0, 0.0, 0.0)]);
        graph.recompute(&registry, 3.0);
        assert!(graph.get(&key).is_some());
    }

    #[test]
    fn test_excluded_connection_fades_then_releases() {
        let near = registry_with(&[Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0)]);
        let far = registry_with(&[Vec3::zeros(), Vec3::new(50.0, 0.0, 0.0)]);
        let mut graph = ProximityGraphBuilder::with_seed(params(5.0, 10), 1);

        graph.recompute(&near, 0.0);
        graph.update_frame(&near, 0.5);
        graph.recompute(&far, 1.0);
        assert_eq!(graph.connection_count(), 0);
        assert_eq!(graph.fading_count(), 1);

        graph.update_frame(&far, 1.1);
        assert_eq!(graph.drain_released().count(), 0);

        graph.update_frame(&far, 2.0);
        assert_eq!(graph.fading_count(), 0);
        let released: Vec<_> = graph.drain_released().collect();
        assert_eq!(released, vec![ConnectionKey::new(0, 1)]);
    }

    #[test]
    fn test_expired_connection_fades_out() {
        let registry = registry_with(&[Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0)]);
        let mut graph = ProximityGraphBuilder::with_seed(
            GraphParams { lifetime_base: 2.0, ..params(5.0, 10) },
            1,
        );
        graph.recompute(&registry, 0.0);
        graph.update_frame(&registry, 1.0);
        assert_eq!(graph.connection_count(), 1);

        graph.update_frame(&registry, 2.5);
        assert_eq!(graph.connection_count(), 0);
        assert_eq!(graph.fading_count(), 1);
    }

    #[test]
    fn test_expired_pair_in_range_finishes_fade_before_reforming() {
        let registry = registry_with(&[Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0)]);
        let mut graph = ProximityGraphBuilder::with_seed(
            GraphParams { lifetime_base: 2.0, ..params(5.0, 10) },
            1,
        );
        let key = ConnectionKey::new(0, 1);
        graph.recompute(&registry, 0.0);

        let mut fade_started = None;
        let mut last_fading_opacity = f32::MAX;
        let mut released_at = None;
        let mut reborn_at = None;

        for frame in 1..360 {
            let now = frame as f32 / 60.0;
            graph.recompute(&registry, now);
            graph.update_frame(&registry, now);

            if let Some(fading) = graph.fading().find(|connection| connection.key == key) {
                fade_started.get_or_insert(now);
                assert!(fading.opacity <= last_fading_opacity + 1e-6);
                last_fading_opacity = fading.opacity;
                assert!(graph.get(&key).is_none());
            } else {
                last_fading_opacity = f32::MAX;
            }
            if graph.drain_released().any(|released| released == key) {
                released_at.get_or_insert(now);
            }
            if let Some(live) = graph.get(&key) {
                if live.birth_time > 0.0 && reborn_at.is_none() {
                    reborn_at = Some(live.birth_time);
                }
            }
        }

        let fade_started = fade_started.unwrap();
        let released_at = released_at.unwrap();
        let reborn_at = reborn_at.unwrap();
        assert!(released_at - fade_started >= connection::FADE_OUT_SECS - 1.0 / 60.0);
        assert!(reborn_at > released_at);
    }

    #[test]
    fn test_fading_pair_does_not_take_budget() {
        let near = registry_with(&[
            Vec3::zeros(),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
        ]);
        let mut graph = ProximityGraphBuilder::with_seed(
            GraphParams { lifetime_base: 2.0, ..params(5.0, 1) },
            1,
        );
        graph.recompute(&near, 0.0);
        assert!(graph.get(&ConnectionKey::new(0, 1)).is_some());

        graph.update_frame(&near, 2.5);
        assert_eq!(graph.fading_count(), 1);

        let stats = graph.recompute(&near, 2.6);
        assert_eq!(stats.created, 1);
        assert!(graph.get(&ConnectionKey::new(0, 1)).is_none());
        assert_eq!(graph.connection_count(), 1);
    }

    #[test]
    fn test_shrunk_endpoint_releases_immediately() {
        let mut graph = ProximityGraphBuilder::with_seed(params(5.0, 10), 1);
        graph.recompute(&registry_with(&triangle()), 0.0);

        let shrunk = registry_with(&triangle()[..2]);
        graph.update_frame(&shrunk, 0.1);
        assert_eq!(graph.connection_count(), 1);
        assert_eq!(graph.drain_released().count(), 2);
    }

    #[test]
    fn test_large_fields_are_sampled_within_budget() {
        let points: Vec<Vec3> = (0..400)
            .map(|i| Vec3::new((i % 20) as f32, (i / 20) as f32, 0.0))
            .collect();
        let registry = registry_with(&points);
        let mut graph = ProximityGraphBuilder::with_seed(
            GraphParams { max_pair_checks: 5_000, ..params(1.5, 1_000) },
            1,
        );
        let stats = graph.recompute(&registry, 0.0);
        assert!(stats.sampled);
        assert!(stats.pairs_examined <= 5_000);
        assert!(graph.connection_count() > 0);
    }

    #[test]
    fn test_opacity_bounded_by_intensity() {
        let registry = registry_with(&triangle());
        let mut graph = ProximityGraphBuilder::with_seed(
            GraphParams { intensity: 0.6, ..params(5.0, 10) },
            1,
        );
        graph.recompute(&registry, 0.0);
        for step in 0..120 {
            let now = step as f32 / 60.0;
            graph.update_frame(&registry, now);
            for connection in graph.drawable() {
                assert!(connection.opacity >= 0.0 && connection.opacity <= 0.6 + 1e-6);
            }
        }
    }
}
