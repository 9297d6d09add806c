//! # Orbit Camera Rig
//!
//! Derives the capture camera from a bounding box and lays out the eight
//! capture poses around it.
//!
//! ## Framing
//! - Pose 0 sits `‖extents‖ + CAMERA_MARGIN` from the bounds center along +X,
//!   looking along −X
//! - Vertical half extent: `extents.y`
//! - Horizontal half extent: `sqrt(extents.x² + extents.z²)`, wide enough for
//!   the widest horizontal silhouette, so one projection frames all poses
//!
//! ## Pose order
//! Pose `i` is pose 0 rotated by `i × 45°` about the vertical axis through the
//! pivot, counter-clockwise seen from above, and then turned to face the
//! bounds center. When the pivot is not under the bounds center the poses sit
//! at different distances from the object; the orthographic projection makes
//! that invisible as long as the far plane reaches past the object, which
//! [`OrbitCameraRig::camera`] guarantees for every pose. The order is fixed:
//! pose `i` always fills atlas cell `i`.

use crate::foundation::math::{Quat, Vec3, utils};
use crate::render::camera::OrthographicCamera;
use crate::render::layers::RenderLayers;
use crate::scene::Bounds;

/// Number of views captured per pass
pub const VIEW_COUNT: usize = 8;

/// Yaw between consecutive poses
pub const ROTATION_STEP_DEGREES: f32 = 360.0 / VIEW_COUNT as f32;

/// Extra distance between the bounds and the camera, in world units
pub const CAMERA_MARGIN: f32 = 1.0;

/// Near plane of the capture projection
const NEAR_PLANE: f32 = 0.01;

/// Closest a pose may get to the bounds center before it keeps its yaw heading
const MIN_LOOK_DISTANCE: f32 = 1e-4;

/// One capture position around the pivot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// View index, 0..VIEW_COUNT
    pub index: usize,
    /// Yaw about +Y in degrees
    pub yaw_degrees: f32,
    /// Camera position in world space
    pub position: Vec3,
    /// Point the camera looks at
    pub target: Vec3,
    /// Unit viewing direction
    pub forward: Vec3,
    /// Camera up vector
    pub up: Vec3,
}

/// Camera framing shared by all poses of a pass
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCameraRig {
    center: Vec3,
    pivot: Vec3,
    radius: f32,
    distance: f32,
    half_width: f32,
    half_height: f32,
}

impl OrbitCameraRig {
    /// Frame `bounds`, orbiting about the vertical axis through `pivot`
    pub fn new(bounds: &Bounds, pivot: Vec3) -> Self {
        let extents = bounds.extents;
        let rig = Self {
            center: bounds.center,
            pivot,
            radius: extents.norm(),
            distance: extents.norm() + CAMERA_MARGIN,
            half_width: (extents.x * extents.x + extents.z * extents.z).sqrt(),
            half_height: extents.y,
        };
        log::debug!(
            "Orbit rig: pivot {:?}, distance {:.3}, half extents {:.3} x {:.3}",
            rig.pivot,
            rig.distance,
            rig.half_width,
            rig.half_height
        );
        rig
    }

    /// Distance from the bounds center to pose 0
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Point the poses orbit around
    pub fn pivot(&self) -> Vec3 {
        self.pivot
    }

    /// Horizontal half extent of the projection
    pub fn half_width(&self) -> f32 {
        self.half_width
    }

    /// Vertical half extent of the projection
    pub fn half_height(&self) -> f32 {
        self.half_height
    }

    /// Rotation between consecutive poses
    pub fn step_rotation() -> Quat {
        Quat::from_axis_angle(&Vec3::y_axis(), utils::deg_to_rad(ROTATION_STEP_DEGREES))
    }

    /// Pose `index` (wrapped into 0..VIEW_COUNT)
    pub fn pose(&self, index: usize) -> CameraPose {
        let index = index % VIEW_COUNT;
        let yaw_degrees = utils::wrap_degrees(ROTATION_STEP_DEGREES * index as f32);
        let yaw = Quat::from_axis_angle(&Vec3::y_axis(), utils::deg_to_rad(yaw_degrees));

        let start = self.center + Vec3::x() * self.distance;
        let position = self.pivot + yaw * (start - self.pivot);

        // A pose on top of the center keeps the heading the yaw alone gives it
        let (forward, target) = match (self.center - position).try_normalize(MIN_LOOK_DISTANCE) {
            Some(forward) => (forward, self.center),
            None => {
                let forward = yaw * Vec3::new(-1.0, 0.0, 0.0);
                (forward, position + forward)
            }
        };

        CameraPose {
            index,
            yaw_degrees,
            position,
            target,
            forward,
            up: Vec3::y(),
        }
    }

    /// All poses in capture order
    pub fn poses(&self) -> [CameraPose; VIEW_COUNT] {
        std::array::from_fn(|index| self.pose(index))
    }

    /// Far plane that reaches past the object from every pose
    fn far_plane(&self) -> f32 {
        let reach = self
            .poses()
            .iter()
            .map(|pose| (pose.position - self.center).norm())
            .fold(0.0_f32, f32::max);
        (reach + self.radius + CAMERA_MARGIN).max(NEAR_PLANE * 2.0)
    }

    /// Orthographic camera for one pose, seeing only isolated proxies
    pub fn camera(&self, pose: &CameraPose) -> OrthographicCamera {
        let mut camera = OrthographicCamera::new(
            pose.position,
            self.half_width,
            self.half_height,
            NEAR_PLANE,
            self.far_plane(),
        )
        .with_culling_mask(RenderLayers::BAKE_ISOLATED);
        camera.look_at(pose.target, pose.up);
        camera
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rig() -> OrbitCameraRig {
        OrbitCameraRig::new(
            &Bounds::new(Vec3::new(0.0, 2.0, 0.0), Vec3::new(1.0, 2.0, 2.0)),
            Vec3::zeros(),
        )
    }

    #[test]
    fn test_framing_from_extents() {
        let rig = rig();
        assert_relative_eq!(rig.distance(), 4.0);
        assert_relative_eq!(rig.half_width(), 5.0_f32.sqrt());
        assert_relative_eq!(rig.half_height(), 2.0);
    }

    #[test]
    fn test_first_pose_looks_down_negative_x() {
        let pose = rig().pose(0);
        assert_relative_eq!(pose.forward, Vec3::new(-1.0, 0.0, 0.0));
        assert_relative_eq!(pose.position, Vec3::new(4.0, 2.0, 0.0));
        assert_eq!(pose.target, Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_poses_turn_counter_clockwise_from_above() {
        let poses = rig().poses();

        // A +90° yaw about +Y carries +X onto −Z
        assert_relative_eq!(poses[2].position, Vec3::new(0.0, 2.0, -4.0), epsilon = 1e-5);
        assert_relative_eq!(poses[4].position, Vec3::new(-4.0, 2.0, 0.0), epsilon = 1e-5);
        for (i, pose) in poses.iter().enumerate() {
            assert_eq!(pose.index, i);
            assert_relative_eq!((pose.position - pose.target).norm(), 4.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_eight_steps_return_to_start() {
        let step = OrbitCameraRig::step_rotation();
        let mut orientation = Quat::identity();
        for _ in 0..VIEW_COUNT {
            orientation = step * orientation;
        }

        assert!(orientation.angle_to(&Quat::identity()) < 1e-4);
        let start = rig().pose(0);
        assert_relative_eq!(orientation * start.forward, start.forward, epsilon = 1e-5);
        assert_eq!(rig().pose(VIEW_COUNT), start);
    }

    #[test]
    fn test_camera_uses_isolated_layer() {
        let rig = rig();
        let camera = rig.camera(&rig.pose(3));
        assert_eq!(camera.culling_mask, RenderLayers::BAKE_ISOLATED);
        assert_relative_eq!(camera.half_height, 2.0);
        assert!(camera.far > rig.distance() + 3.0);
    }

    #[test]
    fn test_degenerate_bounds_give_degenerate_camera() {
        let rig = OrbitCameraRig::new(&Bounds::degenerate(Vec3::zeros()), Vec3::zeros());
        assert_relative_eq!(rig.distance(), CAMERA_MARGIN);
        assert!(rig.camera(&rig.pose(0)).is_degenerate());
    }

    #[test]
    fn test_poses_orbit_the_pivot_and_face_the_center() {
        let bounds = Bounds::new(Vec3::new(3.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let rig = OrbitCameraRig::new(&bounds, Vec3::zeros());
        let reach = 3.0 + 3.0_f32.sqrt() + CAMERA_MARGIN;

        let start = rig.pose(0);
        assert_relative_eq!(start.position, Vec3::new(reach, 0.0, 0.0), epsilon = 1e-5);

        let quarter = rig.pose(2);
        assert_relative_eq!(quarter.position, Vec3::new(0.0, 0.0, -reach), epsilon = 1e-5);
        assert_eq!(quarter.target, bounds.center);
        assert_relative_eq!(
            quarter.forward,
            (bounds.center - quarter.position).normalize(),
            epsilon = 1e-5
        );

        for pose in rig.poses() {
            assert_relative_eq!(pose.position.norm(), reach, epsilon = 1e-4);
            assert_relative_eq!(pose.position.y, 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_far_plane_covers_offset_object_from_every_pose() {
        let bounds = Bounds::new(Vec3::new(3.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let rig = OrbitCameraRig::new(&bounds, Vec3::zeros());

        for pose in rig.poses() {
            let camera = rig.camera(&pose);
            let to_far_side = (pose.position - bounds.center).norm() + bounds.extents.norm();
            assert!(camera.far > to_far_side, "pose {} clips the object", pose.index);
        }
    }

    #[test]
    fn test_pose_on_the_center_keeps_its_heading() {
        // Pose 4 of this rig lands exactly on the bounds center
        let bounds = Bounds::new(Vec3::new(-0.5, 0.0, 0.0), Vec3::zeros());
        let rig = OrbitCameraRig::new(&bounds, Vec3::zeros());
        let pose = rig.pose(4);

        assert_relative_eq!(pose.position, bounds.center, epsilon = 1e-5);
        assert_relative_eq!(pose.forward, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
        assert!((pose.target - pose.position).norm() > 0.5);
    }
}
