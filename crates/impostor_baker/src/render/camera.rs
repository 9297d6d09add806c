//! # Orthographic Capture Camera
//!
//! Provides the camera used to capture impostor views. Only orthographic
//! projection is supported; the baker never needs perspective.
//!
//! ## Coordinate System
//! Standard right-handed Y-up view space:
//! - X+ = Right
//! - Y+ = Up
//! - Z+ = Towards the viewer (the camera looks down -Z)

use crate::foundation::math::{Vec3, Mat4, Mat4Ext};
use crate::render::layers::RenderLayers;

/// Smallest half extent treated as a real projection
const MIN_HALF_EXTENT: f32 = 1e-6;

/// Orthographic camera with independent horizontal and vertical half extents
///
/// Independent extents let the baker frame a tall, thin object in a square
/// tile: the vertical extent follows the object's height while the horizontal
/// extent is sized for the widest silhouette across all capture angles.
#[derive(Debug, Clone, PartialEq)]
pub struct OrthographicCamera {
    /// Camera position in world space
    pub position: Vec3,

    /// Point the camera is looking at in world space
    pub target: Vec3,

    /// Up vector for camera orientation (typically [0, 1, 0])
    pub up: Vec3,

    /// Half of the visible width in world units
    pub half_width: f32,

    /// Half of the visible height in world units
    pub half_height: f32,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,

    /// Layers this camera renders
    pub culling_mask: RenderLayers,
}

impl OrthographicCamera {
    /// Create an orthographic camera looking at the origin with +Y up
    ///
    /// # Arguments
    /// * `position` - Camera position in world space
    /// * `half_width` - Half of the visible width in world units
    /// * `half_height` - Half of the visible height in world units
    /// * `near` - Distance to near clipping plane
    /// * `far` - Distance to far clipping plane (must be > near)
    pub fn new(position: Vec3, half_width: f32, half_height: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            target: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            half_width,
            half_height,
            near,
            far,
            culling_mask: RenderLayers::DEFAULT,
        }
    }

    /// Builder pattern: restrict the camera to the given layers
    pub fn with_culling_mask(mut self, mask: RenderLayers) -> Self {
        self.culling_mask = mask;
        self
    }

    /// Update camera position in world space
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        log::trace!("Camera position updated to: {:?}", position);
    }

    /// Configure camera to look at a specific point with custom up vector
    ///
    /// The up vector doesn't need to be perpendicular to the view direction;
    /// the view matrix orthonormalizes the basis.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        self.target = target;
        self.up = up;
        log::trace!("Camera look_at updated - target: {:?}, up: {:?}", target, up);
    }

    /// Unit vector the camera looks along
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    /// True when the projection has no area and nothing can be rasterized
    pub fn is_degenerate(&self) -> bool {
        self.half_width <= MIN_HALF_EXTENT
            || self.half_height <= MIN_HALF_EXTENT
            || self.far <= self.near
            || (self.target - self.position).norm() <= f32::EPSILON
    }

    /// Generate view matrix for world-to-camera space transformation
    pub fn get_view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.target, self.up)
    }

    /// Generate orthographic projection matrix
    pub fn get_projection_matrix(&self) -> Mat4 {
        Mat4::orthographic(self.half_width, self.half_height, self.near, self.far)
    }

    /// Generate combined view-projection matrix (P × V)
    ///
    /// Maps world space to normalized device coordinates with x and y in
    /// `[-1, 1]` (y up) and depth in `[0, 1]`.
    pub fn get_view_projection_matrix(&self) -> Mat4 {
        self.get_projection_matrix() * self.get_view_matrix()
    }
}
