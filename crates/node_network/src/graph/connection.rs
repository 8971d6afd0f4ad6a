//! Connection records and their fade lifecycle
//!
//! A connection moves through `FadingIn → Steady → FadingOut` and is then
//! removed. Opacity is derived each frame from the phase, its age and the
//! current endpoint distance.

/// Fade-in duration in seconds
pub const FADE_IN_SECS: f32 = 1.0;

/// Fade-out duration in seconds
pub const FADE_OUT_SECS: f32 = 0.6;

/// Opacity of a steady connection at the threshold distance
pub const OPACITY_FLOOR: f32 = 0.15;

/// Unordered node pair, stored with the smaller index first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionKey {
    low: usize,
    high: usize,
}

impl ConnectionKey {
    /// Key for the pair `(a, b)` in either order
    pub fn new(a: usize, b: usize) -> Self {
        debug_assert_ne!(a, b, "a node cannot connect to itself");
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    /// Smaller node index
    pub fn low(&self) -> usize {
        self.low
    }

    /// Larger node index
    pub fn high(&self) -> usize {
        self.high
    }
}

/// Lifecycle phase of a connection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConnectionPhase {
    /// Opacity ramps up from zero
    FadingIn,
    /// Fully faded in
    Steady,
    /// Leaving; opacity ramps down from `from_opacity`
    FadingOut {
        /// Time the fade-out started
        since: f32,
        /// Opacity when the fade-out started
        from_opacity: f32,
    },
}

/// Visual edge between two nearby nodes
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    /// Node pair
    pub key: ConnectionKey,
    /// Endpoint distance at the last update
    pub distance: f32,
    /// Time the connection formed
    pub birth_time: f32,
    /// Seconds the connection may live
    pub lifetime: f32,
    /// Current opacity in `[0, intensity]`
    pub opacity: f32,
    /// Lifecycle phase
    pub phase: ConnectionPhase,
}

/// Opacity of a fully faded-in connection at `distance` from `threshold`.
///
/// Falls off linearly from 1 at zero distance to [`OPACITY_FLOOR`] at the
/// threshold.
pub fn steady_opacity(distance: f32, threshold: f32) -> f32 {
    if threshold <= 0.0 {
        return OPACITY_FLOOR;
    }
    let closeness = (1.0 - distance / threshold).clamp(0.0, 1.0);
    (OPACITY_FLOOR + (1.0 - OPACITY_FLOOR) * closeness).clamp(0.0, 1.0)
}

impl Connection {
    /// Create a connection born at `now`
    pub fn new(key: ConnectionKey, distance: f32, now: f32, lifetime: f32) -> Self {
        Self {
            key,
            distance,
            birth_time: now,
            lifetime,
            opacity: 0.0,
            phase: ConnectionPhase::FadingIn,
        }
    }

    /// Seconds since birth
    pub fn age(&self, now: f32) -> f32 {
        (now - self.birth_time).max(0.0)
    }

    /// Whether the connection outlived its lifetime
    pub fn is_expired(&self, now: f32) -> bool {
        self.age(now) > self.lifetime
    }

    /// Whether the connection is on its way out
    pub fn is_fading_out(&self) -> bool {
        matches!(self.phase, ConnectionPhase::FadingOut { .. })
    }

    /// Whether a fade-out has fully completed
    pub fn is_faded(&self, now: f32) -> bool {
        match self.phase {
            ConnectionPhase::FadingOut { since, .. } => now - since >= FADE_OUT_SECS,
            _ => false,
        }
    }

    /// Start fading out from the current opacity
    pub fn begin_fade_out(&mut self, now: f32) {
        if !self.is_fading_out() {
            self.phase = ConnectionPhase::FadingOut {
                since: now,
                from_opacity: self.opacity,
            };
        }
    }

    /// Refresh distance, phase and opacity for the frame at `now`
    pub fn update(&mut self, distance: f32, threshold: f32, now: f32, intensity: f32) {
        self.distance = distance;

        self.opacity = match self.phase {
            ConnectionPhase::FadingOut { since, from_opacity } => {
                let remaining = 1.0 - ((now - since) / FADE_OUT_SECS).clamp(0.0, 1.0);
                from_opacity * remaining
            }
            ConnectionPhase::FadingIn | ConnectionPhase::Steady => {
                let fade = (self.age(now) / FADE_IN_SECS).clamp(0.0, 1.0);
                self.phase = if fade >= 1.0 {
                    ConnectionPhase::Steady
                } else {
                    ConnectionPhase::FadingIn
                };
                steady_opacity(distance, threshold) * fade * intensity
            }
        };
    }
}
