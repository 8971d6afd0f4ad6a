//! Page-element obstacles
//!
//! The host measures foreground elements, converts their rectangles to world
//! space and hands them over periodically. Nodes steer around them so the
//! network never clutters text.

use crate::foundation::math::Vec2;

/// Opaque identifier of the page element a collider was measured from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderSource(pub u64);

/// World-space rectangle derived from a page element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomCollider {
    /// Centre X in world units
    pub world_x: f32,
    /// Centre Y in world units
    pub world_y: f32,
    /// Width in world units
    pub world_width: f32,
    /// Height in world units
    pub world_height: f32,
    /// Element this rectangle belongs to
    pub source: ColliderSource,
}

impl DomCollider {
    /// Create a collider centred at `(world_x, world_y)`
    pub fn new(world_x: f32, world_y: f32, world_width: f32, world_height: f32, source: ColliderSource) -> Self {
        Self {
            world_x,
            world_y,
            world_width,
            world_height,
            source,
        }
    }

    /// Rectangle centre
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.world_x, self.world_y)
    }

    /// Whether the geometry can take part in collision.
    ///
    /// Zero-size, negative or non-finite rectangles are rejected.
    pub fn is_valid(&self) -> bool {
        [self.world_x, self.world_y, self.world_width, self.world_height]
            .iter()
            .all(|v| v.is_finite())
            && self.world_width > 0.0
            && self.world_height > 0.0
    }

    /// Distance from `point` to the nearest edge of the rectangle grown by `padding`.
    ///
    /// Points inside the padded rectangle are at distance zero.
    pub fn edge_distance(&self, point: Vec2, padding: f32) -> f32 {
        let half_w = self.world_width * 0.5 + padding;
        let half_h = self.world_height * 0.5 + padding;
        let dx = ((point.x - self.world_x).abs() - half_w).max(0.0);
        let dy = ((point.y - self.world_y).abs() - half_h).max(0.0);
        (dx * dx + dy * dy).sqrt()
    }
}

/// Current set of valid obstacles
#[derive(Debug, Clone, Default)]
pub struct ObstacleRegistry {
    colliders: Vec<DomCollider>,
}

impl ObstacleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all colliders, dropping malformed ones.
    ///
    /// Returns the number of rectangles that were rejected.
    pub fn replace(&mut self, colliders: impl IntoIterator<Item = DomCollider>) -> usize {
        self.colliders.clear();
        let mut rejected = 0;
        for collider in colliders {
            if collider.is_valid() {
                self.colliders.push(collider);
            } else {
                rejected += 1;
            }
        }
        if rejected > 0 {
            log::debug!("Ignored {} malformed obstacle rectangle(s)", rejected);
        }
        rejected
    }

    /// Valid colliders
    pub fn colliders(&self) -> &[DomCollider] {
        &self.colliders
    }

    /// Remove every collider
    pub fn clear(&mut self) {
        self.colliders.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect(x: f32, y: f32, w: f32, h: f32) -> DomCollider {
        DomCollider::new(x, y, w, h, ColliderSource(1))
    }

    #[test]
    fn test_edge_distance_measures_to_edge_not_center() {
        let collider = rect(0.0, 0.0, 4.0, 2.0);
        // 1 unit right of the right edge, 3 units from the centre
        assert_relative_eq!(collider.edge_distance(Vec2::new(3.0, 0.0), 0.0), 1.0);
        assert_relative_eq!(collider.edge_distance(Vec2::new(3.0, 0.0), 0.5), 0.5);
    }

    #[test]
    fn test_edge_distance_inside_is_zero() {
        let collider = rect(1.0, 1.0, 2.0, 2.0);
        assert_eq!(collider.edge_distance(Vec2::new(1.5, 0.5), 0.0), 0.0);
    }

    #[test]
    fn test_corner_distance() {
        let collider = rect(0.0, 0.0, 2.0, 2.0);
        assert_relative_eq!(collider.edge_distance(Vec2::new(4.0, 5.0), 0.0), 5.0);
    }

    #[test]
    fn test_malformed_rectangles_are_dropped() {
        let mut registry = ObstacleRegistry::new();
        let rejected = registry.replace(vec![
            rect(0.0, 0.0, 1.0, 1.0),
            rect(0.0, 0.0, 0.0, 1.0),
            rect(f32::NAN, 0.0, 1.0, 1.0),
            rect(0.0, 0.0, 1.0, -2.0),
        ]);
        assert_eq!(rejected, 3);
        assert_eq!(registry.colliders().len(), 1);
    }
}
