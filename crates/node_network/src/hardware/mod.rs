//! Device capability classification
//!
//! Picks a coarse performance tier once at startup. The tier selects the
//! default node density, connection reach and topology cadence so weak
//! devices stay smooth without user configuration.

mod signals;

pub use signals::{DeviceSignals, HardwareError};

use serde::{Deserialize, Serialize};

/// Coarse device-capability classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceTier {
    /// Phones and very constrained machines
    Low,
    /// Typical laptops
    Medium,
    /// Workstations
    High,
}

/// Default parameters associated with a tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierProfile {
    /// Number of simulated nodes
    pub node_count: usize,
    /// Base connection distance in world units
    pub connection_distance: f32,
    /// Topology is recomputed every `update_interval` frames
    pub update_interval: u32,
    /// Upper bound on simultaneous connections
    pub max_connections: usize,
}

impl PerformanceTier {
    /// Default parameter table for this tier
    pub const fn profile(self) -> TierProfile {
        match self {
            Self::Low => TierProfile {
                node_count: 110,
                connection_distance: 5.0,
                update_interval: 6,
                max_connections: 50,
            },
            Self::Medium => TierProfile {
                node_count: 150,
                connection_distance: 6.5,
                update_interval: 3,
                max_connections: 100,
            },
            Self::High => TierProfile {
                node_count: 200,
                connection_distance: 8.0,
                update_interval: 1,
                max_connections: 150,
            },
        }
    }
}

impl std::fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.write_str(name)
    }
}

/// Resolved hardware profile: a tier and its parameter table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HardwareProfile {
    /// Selected tier
    pub tier: PerformanceTier,
    /// Number of simulated nodes
    pub node_count: usize,
    /// Base connection distance in world units
    pub connection_distance: f32,
    /// Topology recompute cadence in frames
    pub update_interval: u32,
    /// Upper bound on simultaneous connections
    pub max_connections: usize,
}

impl HardwareProfile {
    /// Profile carrying the default table of `tier`
    pub const fn for_tier(tier: PerformanceTier) -> Self {
        let table = tier.profile();
        Self {
            tier,
            node_count: table.node_count,
            connection_distance: table.connection_distance,
            update_interval: table.update_interval,
            max_connections: table.max_connections,
        }
    }
}

const MOBILE_PATTERNS: &[&str] = &[
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
    "mobile",
];

// Values assumed for a signal the host could not observe.
const NEUTRAL_CORES: u32 = 4;
const NEUTRAL_MEMORY_GB: f32 = 4.0;

fn is_mobile(user_agent: &str) -> bool {
    let agent = user_agent.to_ascii_lowercase();
    MOBILE_PATTERNS.iter().any(|pattern| agent.contains(pattern))
}

/// Classify a device from its signals.
///
/// Fails only when no signal at all is available.
pub fn classify(signals: &DeviceSignals) -> Result<PerformanceTier, HardwareError> {
    if signals.is_empty() {
        return Err(HardwareError::SignalsUnavailable);
    }

    if signals.user_agent.as_deref().is_some_and(is_mobile) {
        return Ok(PerformanceTier::Low);
    }

    let cores = signals.logical_cores.unwrap_or(NEUTRAL_CORES);
    let memory_gb = signals.memory_gb.unwrap_or(NEUTRAL_MEMORY_GB);

    let tier = if cores <= 2 || memory_gb <= 2.0 {
        PerformanceTier::Low
    } else if cores >= 8 && memory_gb >= 8.0 {
        PerformanceTier::High
    } else {
        PerformanceTier::Medium
    };
    Ok(tier)
}

/// Detect the tier for `signals`, falling back to medium on failure.
pub fn detect(signals: &DeviceSignals) -> HardwareProfile {
    let tier = match classify(signals) {
        Ok(tier) => tier,
        Err(err) => {
            log::warn!("Hardware detection failed ({}), using medium tier", err);
            PerformanceTier::Medium
        }
    };
    HardwareProfile::for_tier(tier)
}

/// Pick the tier to run with.
///
/// Precedence: explicit override, then the persisted user setting, then the
/// detected tier.
pub fn resolve_tier(
    explicit: Option<PerformanceTier>,
    persisted: Option<PerformanceTier>,
    detected: PerformanceTier,
) -> PerformanceTier {
    explicit.or(persisted).unwrap_or(detected)
}

/// One-shot profiler caching its result
///
/// The first call to [`HardwareProfiler::profile`] classifies the device;
/// later calls return the cached profile until [`HardwareProfiler::reset`].
#[derive(Debug, Default)]
pub struct HardwareProfiler {
    cached: Option<HardwareProfile>,
}

impl HardwareProfiler {
    /// Create a profiler with nothing cached
    pub fn new() -> Self {
        Self::default()
    }

    /// Profile for this device, detecting it on first use
    pub fn profile(&mut self, signals: &DeviceSignals) -> HardwareProfile {
        if let Some(profile) = self.cached {
            return profile;
        }
        let profile = detect(signals);
        log::info!(
            "Hardware tier {}: {} nodes, distance {}, topology every {} frame(s), {} max connections",
            profile.tier,
            profile.node_count,
            profile.connection_distance,
            profile.update_interval,
            profile.max_connections
        );
        self.cached = Some(profile);
        profile
    }

    /// Force a tier regardless of detection
    pub fn force_tier(&mut self, tier: PerformanceTier) -> HardwareProfile {
        let profile = HardwareProfile::for_tier(tier);
        log::info!("Hardware tier forced to {}", tier);
        self.cached = Some(profile);
        profile
    }

    /// Resolve the profile honoring an explicit override and a persisted preference
    pub fn resolve(
        &mut self,
        signals: &DeviceSignals,
        explicit: Option<PerformanceTier>,
        persisted: Option<PerformanceTier>,
    ) -> HardwareProfile {
        match explicit.or(persisted) {
            Some(tier) => self.force_tier(tier),
            None => self.profile(signals),
        }
    }

    /// Cached profile, if any
    pub fn cached(&self) -> Option<HardwareProfile> {
        self.cached
    }

    /// Forget the cached profile so the next call detects again
    pub fn reset(&mut self) {
        self.cached = None;
    }
}
