//! Line draw resources
//!
//! One [`LineResource`] per drawn connection: a two-vertex geometry buffer and
//! a material whose opacity tracks the connection's fade.

use super::{PoolError, ResourceFactory};
use crate::foundation::math::Vec3;

/// Line endpoint as uploaded to the renderer
pub type LineVertex = [f32; 3];

/// Geometry of a single line segment, laid out as six packed floats
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineGeometry {
    /// Start then end
    pub vertices: [LineVertex; 2],
}

impl LineGeometry {
    /// Packed `[x0, y0, z0, x1, y1, z1]`
    pub fn as_floats(&self) -> [f32; 6] {
        let [a, b] = self.vertices;
        [a[0], a[1], a[2], b[0], b[1], b[2]]
    }
}

/// Line material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMaterial {
    /// Linear RGB colour
    pub color: [f32; 3],
    /// Opacity in `[0, 1]`
    pub opacity: f32,
    /// Width in pixels
    pub line_width: f32,
}

/// Pooled geometry and material for one connection
#[derive(Debug, Clone, PartialEq)]
pub struct LineResource {
    id: u32,
    geometry: LineGeometry,
    packed: [f32; 6],
    material: LineMaterial,
    visible: bool,
}

impl LineResource {
    fn new(id: u32, color: [f32; 3], line_width: f32) -> Self {
        Self {
            id,
            geometry: LineGeometry::default(),
            packed: [0.0; 6],
            material: LineMaterial {
                color,
                opacity: 0.0,
                line_width,
            },
            visible: false,
        }
    }

    /// Factory-assigned id, stable for the resource's whole life
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Point the segment at `a`/`b` and apply the frame's opacity
    pub fn update(&mut self, a: Vec3, b: Vec3, opacity: f32, line_width: f32) {
        self.geometry.vertices = [[a.x, a.y, a.z], [b.x, b.y, b.z]];
        self.packed = self.geometry.as_floats();
        self.material.opacity = opacity.clamp(0.0, 1.0);
        self.material.line_width = line_width;
        self.visible = true;
    }

    /// Hide until the next update
    pub fn hide(&mut self) {
        self.visible = false;
        self.material.opacity = 0.0;
    }

    /// Whether the line is drawn
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Current segment
    pub fn geometry(&self) -> &LineGeometry {
        &self.geometry
    }

    /// Current material
    pub fn material(&self) -> &LineMaterial {
        &self.material
    }

    /// Vertex data ready for a GPU upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.packed)
    }
}

/// Creates line resources, optionally capped at a number of live resources
#[derive(Debug, Clone)]
pub struct LineResourceFactory {
    color: [f32; 3],
    line_width: f32,
    allocation_limit: Option<usize>,
    live: usize,
    next_id: u32,
}

impl LineResourceFactory {
    /// Factory producing lines of `color` and `line_width`
    pub fn new(color: [f32; 3], line_width: f32) -> Self {
        Self {
            color,
            line_width,
            allocation_limit: None,
            live: 0,
            next_id: 0,
        }
    }

    /// Refuse to hold more than `limit` resources at once
    pub fn with_allocation_limit(mut self, limit: Option<usize>) -> Self {
        self.allocation_limit = limit;
        self
    }

    /// Resources created and not yet disposed
    pub fn live(&self) -> usize {
        self.live
    }

    /// Width applied to newly created lines
    pub fn set_line_width(&mut self, line_width: f32) {
        self.line_width = line_width;
    }
}

impl ResourceFactory for LineResourceFactory {
    type Resource = LineResource;

    fn create(&mut self) -> Result<LineResource, PoolError> {
        if let Some(limit) = self.allocation_limit {
            if self.live >= limit {
                return Err(PoolError::Exhausted { limit });
            }
        }
        self.live += 1;
        self.next_id = self.next_id.wrapping_add(1);
        Ok(LineResource::new(self.next_id, self.color, self.line_width))
    }

    fn dispose(&mut self, _resource: LineResource) {
        self.live = self.live.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::RenderResourcePool;

    fn pool(limit: Option<usize>) -> RenderResourcePool<(usize, usize), LineResourceFactory> {
        RenderResourcePool::new(LineResourceFactory::new([0.4, 0.7, 1.0], 1.0).with_allocation_limit(limit))
    }

    #[test]
    fn test_update_writes_vertex_bytes() {
        let mut pool = pool(None);
        let handle = pool.acquire((0, 1)).unwrap();
        let line = pool.get_mut(handle).unwrap();
        line.update(Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0), 0.5, 2.0);

        assert!(line.is_visible());
        assert_eq!(line.vertex_bytes().len(), 6 * std::mem::size_of::<f32>());
        assert_eq!(line.geometry().as_floats(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(line.material().opacity, 0.5);
        assert_eq!(line.material().line_width, 2.0);
    }

    #[test]
    fn test_opacity_is_clamped() {
        let mut pool = pool(None);
        let handle = pool.acquire((0, 1)).unwrap();
        let line = pool.get_mut(handle).unwrap();
        line.update(Vec3::zeros(), Vec3::x(), 3.0, 1.0);
        assert_eq!(line.material().opacity, 1.0);
    }

    #[test]
    fn test_reused_line_keeps_id() {
        let mut pool = pool(None);
        let first = pool.acquire((0, 1)).unwrap();
        let id = pool.get(first).unwrap().id();
        pool.release(&(0, 1));

        let second = pool.acquire((2, 3)).unwrap();
        assert_eq!(pool.get(second).unwrap().id(), id);
        assert_eq!(pool.factory().live(), 1);
    }

    #[test]
    fn test_limit_reports_exhaustion() {
        let mut pool = pool(Some(2));
        pool.acquire((0, 1)).unwrap();
        pool.acquire((0, 2)).unwrap();
        assert_eq!(pool.acquire((0, 3)), Err(PoolError::Exhausted { limit: 2 }));

        pool.release(&(0, 1));
        assert!(pool.acquire((0, 3)).is_ok());
    }

    #[test]
    fn test_dispose_returns_live_count_to_zero() {
        let mut pool = pool(None);
        for j in 1..6 {
            pool.acquire((0, j)).unwrap();
        }
        assert_eq!(pool.factory().live(), 5);
        pool.dispose_all();
        assert_eq!(pool.factory().live(), 0);
    }
}
