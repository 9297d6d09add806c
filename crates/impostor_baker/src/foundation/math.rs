//! Math utilities and types
//!
//! Provides the fundamental math types used by the baker. Everything is built on
//! `nalgebra` with `f32` precision and Y-up right-handed conventions.

pub use nalgebra::{
    Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Unit,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Transform representing position, rotation, and scale
///
/// Used both for world-space placement of source objects and for the
/// parent-relative local transforms stored in scene and proxy trees.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Builder pattern: set scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Convert to a transformation matrix (TRS order)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Mat3, Mat4};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Wrap an angle in degrees into `[0, 360)`
    pub fn wrap_degrees(degrees: f32) -> f32 {
        degrees.rem_euclid(360.0)
    }

    /// Normal matrix (inverse transpose of the upper 3x3) for a model matrix
    ///
    /// Falls back to the plain upper 3x3 when the matrix is singular, which
    /// only happens for zero-scaled nodes that cover no pixels anyway.
    pub fn normal_matrix(model: &Mat4) -> Mat3 {
        let upper: Mat3 = model.fixed_view::<3, 3>(0, 0).into_owned();
        upper
            .try_inverse()
            .map_or(upper, |inverse| inverse.transpose())
    }
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create a look-at view matrix (right-handed, Y-up)
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;

    /// Create an orthographic projection from half extents and clip distances
    ///
    /// Maps view-space x in `[-half_width, half_width]` and y in
    /// `[-half_height, half_height]` to `[-1, 1]`, and depth in `[near, far]`
    /// to `[0, 1]`.
    fn orthographic(half_width: f32, half_height: f32, near: f32, far: f32) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let forward = (target - eye).normalize();
        let right = forward.cross(&up).normalize();
        let camera_up = right.cross(&forward);

        let translation = Mat4::new(
            1.0, 0.0, 0.0, -eye.x,
            0.0, 1.0, 0.0, -eye.y,
            0.0, 0.0, 1.0, -eye.z,
            0.0, 0.0, 0.0, 1.0,
        );

        let rotation = Mat4::new(
            right.x, right.y, right.z, 0.0,
            camera_up.x, camera_up.y, camera_up.z, 0.0,
            -forward.x, -forward.y, -forward.z, 0.0,  // Negative forward for right-handed
            0.0, 0.0, 0.0, 1.0,
        );

        rotation * translation
    }

    fn orthographic(half_width: f32, half_height: f32, near: f32, far: f32) -> Mat4 {
        let mut result = Mat4::identity();

        // View space looks down -Z, so depth = -z_view
        result[(0, 0)] = 1.0 / half_width;
        result[(1, 1)] = 1.0 / half_height;
        result[(2, 2)] = -1.0 / (far - near);
        result[(2, 3)] = -near / (far - near);

        result
    }
}
