//! Pixel ↔ world coordinate mapping
//!
//! Stateless conversions between container-relative pixel space (origin at
//! the top-left, Y pointing down) and the simulation's world space (origin at
//! the container centre, Y pointing up).

use crate::foundation::math::Vec2;

/// Visible world-space extent of the simulation plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldExtent {
    /// Width in world units
    pub width: f32,
    /// Height in world units
    pub height: f32,
}

impl WorldExtent {
    /// Create an extent from explicit dimensions
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Extent visible at `z = 0` for a perspective camera looking down -Z
    ///
    /// # Arguments
    ///
    /// * `fov_degrees` - Vertical field of view
    /// * `camera_distance` - Distance from the camera to the `z = 0` plane
    /// * `aspect` - Viewport width divided by height
    pub fn from_perspective(fov_degrees: f32, camera_distance: f32, aspect: f32) -> Self {
        let height = 2.0 * (fov_degrees.to_radians() * 0.5).tan() * camera_distance;
        Self {
            width: height * aspect,
            height,
        }
    }

    /// Half the width and height
    pub fn half(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Whether the extent can be used for mapping
    pub fn is_valid(&self) -> bool {
        is_usable_extent(self.width, self.height)
    }
}

/// Container placement in client (page) pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerRect {
    /// Left edge in client pixels
    pub left: f32,
    /// Top edge in client pixels
    pub top: f32,
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

fn is_usable_extent(width: f32, height: f32) -> bool {
    width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0
}

/// Map a container-relative pixel position to world space.
///
/// Degenerate containers or worlds map everything to the origin.
pub fn dom_to_world(
    rel_x: f32,
    rel_y: f32,
    container_width: f32,
    container_height: f32,
    world_width: f32,
    world_height: f32,
) -> Vec2 {
    if !is_usable_extent(container_width, container_height)
        || !is_usable_extent(world_width, world_height)
    {
        return Vec2::zeros();
    }

    let normalized_x = (rel_x / container_width) * 2.0 - 1.0;
    let normalized_y = -((rel_y / container_height) * 2.0 - 1.0);

    Vec2::new(
        normalized_x * world_width * 0.5,
        normalized_y * world_height * 0.5,
    )
}

/// Map a world-space position back to container-relative pixels.
///
/// Exact inverse of [`dom_to_world`]; degenerate inputs map to the container
/// centre.
pub fn world_to_dom(
    world_x: f32,
    world_y: f32,
    container_width: f32,
    container_height: f32,
    world_width: f32,
    world_height: f32,
) -> Vec2 {
    if !is_usable_extent(container_width, container_height)
        || !is_usable_extent(world_width, world_height)
    {
        return Vec2::new(container_width * 0.5, container_height * 0.5);
    }

    let normalized_x = world_x / (world_width * 0.5);
    let normalized_y = world_y / (world_height * 0.5);

    Vec2::new(
        (normalized_x + 1.0) * 0.5 * container_width,
        (1.0 - normalized_y) * 0.5 * container_height,
    )
}

/// Map a client-space pointer position to world space
pub fn mouse_to_world(client_x: f32, client_y: f32, container: ContainerRect, world: WorldExtent) -> Vec2 {
    dom_to_world(
        client_x - container.left,
        client_y - container.top,
        container.width,
        container.height,
        world.width,
        world.height,
    )
}
