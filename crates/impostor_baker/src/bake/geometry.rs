//! Billboard geometry and sizing
//!
//! The billboard topology never changes: six vertices on the unit square split
//! at mid-height, four triangles, and one UV rectangle per view. Only the
//! [`BillboardParameters`] depend on the baked object.
//!
//! UV rectangle `i` covers atlas cell `i`: views 0-3 sit in the lower half
//! (v = 0), views 4-7 in the upper half (v = 0.5).

use serde::{Deserialize, Serialize};

use crate::bake::atlas::{ATLAS_COLUMNS, ATLAS_ROWS, cell_of};
use crate::bake::orbit::VIEW_COUNT;
use crate::scene::Bounds;

/// Normalized atlas region of one view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UvRect {
    /// Left edge
    pub u: f32,
    /// Bottom edge
    pub v: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl UvRect {
    /// Rectangle of the atlas cell holding view `index`
    pub fn for_view(index: usize) -> Self {
        let (row, col) = cell_of(index);
        let width = 1.0 / ATLAS_COLUMNS as f32;
        let height = 1.0 / ATLAS_ROWS as f32;
        Self {
            u: col as f32 * width,
            v: row as f32 * height,
            width,
            height,
        }
    }
}

/// Fixed billboard topology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillboardGeometry {
    /// Unit-square vertices
    pub vertices: [[f32; 2]; 6],
    /// Triangle list
    pub indices: [u16; 12],
    /// Per-view atlas regions
    pub uv_rects: [UvRect; VIEW_COUNT],
}

impl BillboardGeometry {
    /// The one billboard layout every bake produces
    pub fn standard() -> Self {
        Self {
            vertices: [
                [0.0, 0.0],
                [0.0, 0.5],
                [0.0, 1.0],
                [1.0, 0.0],
                [1.0, 0.5],
                [1.0, 1.0],
            ],
            indices: [0, 3, 4, 0, 4, 1, 1, 4, 5, 1, 5, 2],
            uv_rects: std::array::from_fn(UvRect::for_view),
        }
    }
}

impl Default for BillboardGeometry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Size and vertical offset of the billboard quad
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BillboardParameters {
    /// Quad width, covering the widest horizontal silhouette
    pub width: f32,
    /// Quad height
    pub height: f32,
    /// Offset of the quad's bottom edge from the object's origin
    pub bottom: f32,
}

impl BillboardParameters {
    /// Derive sizing from bounds and the object origin's height
    ///
    /// `height = 2·ey`, `width = 2·sqrt(ex² + ez²)`,
    /// `bottom = −(ey − (cy − origin_y))`.
    pub fn from_bounds(bounds: &Bounds, origin_y: f32) -> Self {
        let e = bounds.extents;
        Self {
            width: 2.0 * (e.x * e.x + e.z * e.z).sqrt(),
            height: 2.0 * e.y,
            bottom: -(e.y - (bounds.center.y - origin_y)),
        }
    }

    /// True for the zero-area billboard of an object without geometry
    pub fn is_degenerate(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use approx::assert_relative_eq;

    #[test]
    fn test_parameters_from_bounds() {
        let bounds = Bounds::new(Vec3::new(0.0, 3.5, 0.0), Vec3::new(1.0, 2.0, 3.0));
        let params = BillboardParameters::from_bounds(&bounds, 3.0);

        assert_relative_eq!(params.height, 4.0);
        assert_relative_eq!(params.width, 2.0 * 10.0_f32.sqrt());
        assert_relative_eq!(params.width, 6.3246, epsilon = 1e-4);
        assert_relative_eq!(params.bottom, -1.5);
    }

    #[test]
    fn test_degenerate_bounds_give_zero_area() {
        let params = BillboardParameters::from_bounds(&Bounds::degenerate(Vec3::zeros()), 0.0);
        assert!(params.is_degenerate());
        assert_relative_eq!(params.bottom, 0.0);
    }

    #[test]
    fn test_standard_topology() {
        let geometry = BillboardGeometry::standard();

        assert_eq!(geometry.vertices[4], [1.0, 0.5]);
        assert!(geometry.indices.iter().all(|&i| (i as usize) < geometry.vertices.len()));
        assert_eq!(geometry.indices.len() / 3, 4);
    }

    #[test]
    fn test_uv_rects_follow_atlas_rows() {
        let geometry = BillboardGeometry::standard();

        for (i, rect) in geometry.uv_rects.iter().enumerate() {
            assert_relative_eq!(rect.u, (i % 4) as f32 * 0.25);
            assert_relative_eq!(rect.v, if i < 4 { 0.0 } else { 0.5 });
            assert_relative_eq!(rect.width, 0.25);
            assert_relative_eq!(rect.height, 0.5);
        }
    }
}
