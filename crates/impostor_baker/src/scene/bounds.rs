//! Axis-aligned bounding boxes
//!
//! Bounds are stored as center plus non-negative half extents, which is the
//! form the camera rig and billboard sizing consume directly.

use crate::foundation::math::{Mat4, Point3, Vec3};

/// Axis-Aligned Bounding Box in center/extents form
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Center of the box
    pub center: Vec3,
    /// Half size along each axis (never negative)
    pub extents: Vec3,
}

impl Bounds {
    /// Create bounds centered at a point with given extents
    ///
    /// Negative extents are folded to their absolute value.
    pub fn new(center: Vec3, extents: Vec3) -> Self {
        Self {
            center,
            extents: extents.abs(),
        }
    }

    /// Zero-size bounds at a point
    pub fn degenerate(center: Vec3) -> Self {
        Self {
            center,
            extents: Vec3::zeros(),
        }
    }

    /// Create bounds from min and max corners
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        let lo = min.inf(&max);
        let hi = min.sup(&max);
        Self {
            center: (lo + hi) * 0.5,
            extents: (hi - lo) * 0.5,
        }
    }

    /// Smallest bounds containing every point, or `None` for an empty slice
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (min, max) = rest
            .iter()
            .fold((*first, *first), |(min, max), p| (min.inf(p), max.sup(p)));
        Some(Self::from_min_max(min, max))
    }

    /// Minimum corner
    pub fn min(&self) -> Vec3 {
        self.center - self.extents
    }

    /// Maximum corner
    pub fn max(&self) -> Vec3 {
        self.center + self.extents
    }

    /// True when every extent is zero
    pub fn is_degenerate(&self) -> bool {
        self.extents == Vec3::zeros()
    }

    /// Grow this box to contain another box
    pub fn encapsulate(&mut self, other: &Bounds) {
        let min = self.min().inf(&other.min());
        let max = self.max().sup(&other.max());
        *self = Self::from_min_max(min, max);
    }

    /// The eight corners of the box
    pub fn corners(&self) -> [Vec3; 8] {
        let (min, max) = (self.min(), self.max());
        [
            Vec3::new(min.x, min.y, min.z),
            Vec3::new(max.x, min.y, min.z),
            Vec3::new(min.x, max.y, min.z),
            Vec3::new(max.x, max.y, min.z),
            Vec3::new(min.x, min.y, max.z),
            Vec3::new(max.x, min.y, max.z),
            Vec3::new(min.x, max.y, max.z),
            Vec3::new(max.x, max.y, max.z),
        ]
    }

    /// Axis-aligned box enclosing these bounds after a transform
    pub fn transformed(&self, matrix: &Mat4) -> Bounds {
        let corners = self
            .corners()
            .map(|c| matrix.transform_point(&Point3::from(c)).coords);
        // Eight corners are always present
        Self::from_points(&corners).unwrap_or(*self)
    }
}
