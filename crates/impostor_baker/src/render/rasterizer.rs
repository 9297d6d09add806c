//! Capture backends
//!
//! A [`CaptureBackend`] draws a proxy tree into a render target through an
//! orthographic camera. The pipeline only depends on the trait; the
//! [`SoftwareRasterizer`] is the deterministic CPU implementation used by the
//! command-line baker and by tests.
//!
//! ## Rasterization rules
//! - Pixel centers are sampled at `(x + 0.5, y + 0.5)`, bottom-left origin
//! - Triangle coverage uses edge functions; both windings are drawn
//! - Depth is the normalized `[0, 1]` depth of the projection, nearest wins
//! - Only nodes whose layers intersect the camera's culling mask are drawn

use crate::bake::proxy::RenderProxyNode;
use crate::foundation::math::{utils, Mat3, Mat4, Point3, Vec3, Vec4};
use crate::render::camera::OrthographicCamera;
use crate::render::material::{Material, MaterialType};
use crate::render::mesh::Mesh;
use crate::render::target::{RenderError, RenderTarget};

/// Ambient term of the lit shading model
const LIT_AMBIENT: f32 = 0.35;

/// Diffuse term of the lit shading model
const LIT_DIFFUSE: f32 = 0.65;

/// Something that can draw a proxy tree into a render target
pub trait CaptureBackend {
    /// Clear `target` to transparent black and draw every visible proxy node
    fn capture(
        &mut self,
        camera: &OrthographicCamera,
        proxy: &RenderProxyNode,
        target: &mut RenderTarget,
    ) -> Result<(), RenderError>;
}

impl<B: CaptureBackend + ?Sized> CaptureBackend for &mut B {
    fn capture(
        &mut self,
        camera: &OrthographicCamera,
        proxy: &RenderProxyNode,
        target: &mut RenderTarget,
    ) -> Result<(), RenderError> {
        (**self).capture(camera, proxy, target)
    }
}

/// Per-draw transform state
struct DrawContext {
    view_projection: Mat4,
    view_rotation: Mat3,
    toward_camera: Vec3,
    width: f32,
    height: f32,
}

/// Vertex after projection to the target
#[derive(Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    depth: f32,
    world_normal: Vec3,
}

/// Deterministic CPU rasterizer
#[derive(Debug, Default)]
pub struct SoftwareRasterizer {
    fallback_material: Material,
    triangles_drawn: usize,
}

impl SoftwareRasterizer {
    /// Create a rasterizer that shades slot-less drawables with the default material
    pub fn new() -> Self {
        Self::default()
    }

    /// Triangles submitted by the most recent capture
    pub fn triangles_drawn(&self) -> usize {
        self.triangles_drawn
    }

    fn draw_mesh(
        &mut self,
        ctx: &DrawContext,
        world: &Mat4,
        mesh: &Mesh,
        materials: &[Material],
        target: &mut RenderTarget,
    ) {
        let mvp = ctx.view_projection * world;
        let normal_matrix = utils::normal_matrix(world);

        let projected: Vec<ScreenVertex> = mesh
            .vertices
            .iter()
            .map(|vertex| {
                let ndc = mvp.transform_point(&Point3::from(vertex.position_vec()));
                ScreenVertex {
                    x: (ndc.x * 0.5 + 0.5) * ctx.width,
                    y: (ndc.y * 0.5 + 0.5) * ctx.height,
                    depth: ndc.z,
                    world_normal: normal_matrix * vertex.normal_vec(),
                }
            })
            .collect();

        for (slot, submesh) in mesh.submesh_ranges().iter().enumerate() {
            // Fewer materials than submeshes: the last one covers the rest
            let material = materials
                .get(slot)
                .or_else(|| materials.last())
                .unwrap_or(&self.fallback_material);

            let end = (submesh.index_start + submesh.index_count).min(mesh.indices.len());
            let indices = mesh.indices.get(submesh.index_start..end).unwrap_or(&[]);
            for triangle in indices.chunks_exact(3) {
                let corners = [
                    projected.get(triangle[0] as usize),
                    projected.get(triangle[1] as usize),
                    projected.get(triangle[2] as usize),
                ];
                if let [Some(a), Some(b), Some(c)] = corners {
                    Self::fill_triangle(ctx, [*a, *b, *c], material, target);
                    self.triangles_drawn += 1;
                }
            }
        }
    }

    fn fill_triangle(
        ctx: &DrawContext,
        [a, b, c]: [ScreenVertex; 3],
        material: &Material,
        target: &mut RenderTarget,
    ) {
        let area = edge(&a, &b, c.x, c.y);
        if area.abs() <= f32::EPSILON {
            return;
        }

        let width = target.color.width();
        let height = target.color.height();
        let min_x = a.x.min(b.x).min(c.x).floor().max(0.0) as u32;
        let min_y = a.y.min(b.y).min(c.y).floor().max(0.0) as u32;
        let max_x = (a.x.max(b.x).max(c.x).ceil().max(0.0) as u32).min(width);
        let max_y = (a.y.max(b.y).max(c.y).ceil().max(0.0) as u32).min(height);

        for py in min_y..max_y {
            for px in min_x..max_x {
                let (sx, sy) = (px as f32 + 0.5, py as f32 + 0.5);

                // Normalized barycentrics; dividing by the signed area accepts either winding
                let w0 = edge(&b, &c, sx, sy) / area;
                let w1 = edge(&c, &a, sx, sy) / area;
                let w2 = edge(&a, &b, sx, sy) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * a.depth + w1 * b.depth + w2 * c.depth;
                if !(0.0..=1.0).contains(&depth) {
                    continue;
                }
                let index = py as usize * width as usize + px as usize;
                if depth >= target.depth[index] {
                    continue;
                }

                let normal = w0 * a.world_normal + w1 * b.world_normal + w2 * c.world_normal;
                target.depth[index] = depth;
                target.color.set_pixel(px, py, shade(ctx, material, &normal));
            }
        }
    }
}

impl CaptureBackend for SoftwareRasterizer {
    fn capture(
        &mut self,
        camera: &OrthographicCamera,
        proxy: &RenderProxyNode,
        target: &mut RenderTarget,
    ) -> Result<(), RenderError> {
        target.clear();
        self.triangles_drawn = 0;

        if camera.is_degenerate() {
            log::debug!("Degenerate capture camera, leaving target cleared");
            return Ok(());
        }

        let view = camera.get_view_matrix();
        let ctx = DrawContext {
            view_projection: camera.get_view_projection_matrix(),
            view_rotation: view.fixed_view::<3, 3>(0, 0).into_owned(),
            toward_camera: -camera.forward(),
            width: target.color.width() as f32,
            height: target.color.height() as f32,
        };

        proxy.visit_world(|node, world| {
            if !node.layers.visible_to(camera.culling_mask) {
                return;
            }
            if let Some(drawable) = &node.drawable {
                self.draw_mesh(&ctx, world, &drawable.mesh, &drawable.materials, target);
            }
        });

        log::trace!("Rasterized {} triangles", self.triangles_drawn);
        Ok(())
    }
}

/// Signed doubled area of `(a, b, p)`
fn edge(a: &ScreenVertex, b: &ScreenVertex, px: f32, py: f32) -> f32 {
    (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x)
}

fn to_unorm8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn shade(ctx: &DrawContext, material: &Material, world_normal: &Vec3) -> [u8; 4] {
    let normal = world_normal.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros);

    let color: Vec4 = match &material.material_type {
        MaterialType::Unlit { color } => *color,
        MaterialType::Lit { color } => {
            let light = LIT_AMBIENT + LIT_DIFFUSE * normal.dot(&ctx.toward_camera).max(0.0);
            Vec4::new(color.x * light, color.y * light, color.z * light, color.w)
        }
        MaterialType::NormalEncode => {
            let view_normal = ctx.view_rotation * normal;
            let encoded = view_normal * 0.5 + Vec3::new(0.5, 0.5, 0.5);
            Vec4::new(encoded.x, encoded.y, encoded.z, 1.0)
        }
    };

    let alpha = if material.writes_alpha { to_unorm8(color.w) } else { 0 };
    [to_unorm8(color.x), to_unorm8(color.y), to_unorm8(color.z), alpha]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::bake::proxy::ProxyBuilder;
    use crate::config::TileSize;
    use crate::render::layers::RenderLayers;
    use crate::render::mesh::{SubMesh, Vertex};
    use crate::scene::{Drawable, SourceNode};

    fn camera_on_x() -> OrthographicCamera {
        let mut camera = OrthographicCamera::new(Vec3::new(5.0, 0.0, 0.0), 2.0, 2.0, 0.1, 10.0)
            .with_culling_mask(RenderLayers::BAKE_ISOLATED);
        camera.look_at(Vec3::zeros(), Vec3::y());
        camera
    }

    fn cube_proxy(material: Material) -> RenderProxyNode {
        let source = SourceNode::new("cube")
            .with_drawable(Drawable::single(Arc::new(Mesh::cube()), material));
        ProxyBuilder::build(&source, None)
    }

    fn capture(proxy: &RenderProxyNode, camera: &OrthographicCamera) -> RenderTarget {
        let mut target = RenderTarget::new(TileSize::new(32, 32)).unwrap();
        SoftwareRasterizer::new().capture(camera, proxy, &mut target).unwrap();
        target
    }

    #[test]
    fn test_unlit_cube_covers_center_only() {
        let red = Material::unlit("red", Vec4::new(1.0, 0.0, 0.0, 1.0));
        let target = capture(&cube_proxy(red), &camera_on_x());

        // Cube spans ±1 of a ±2 view: the middle half of the tile
        assert_eq!(target.color.pixel(16, 16), [255, 0, 0, 255]);
        assert_eq!(target.color.pixel(2, 2), [0, 0, 0, 0]);
        assert_eq!(target.color.covered_pixel_count(), 16 * 16);
    }

    #[test]
    fn test_lit_face_toward_camera_is_fully_lit() {
        let white = Material::lit("white", Vec4::new(1.0, 1.0, 1.0, 1.0));
        let target = capture(&cube_proxy(white), &camera_on_x());
        assert_eq!(target.color.pixel(16, 16), [255, 255, 255, 255]);
    }

    #[test]
    fn test_normal_encode_faces_viewer() {
        let target = capture(&cube_proxy(Material::normal_encode()), &camera_on_x());
        // +X face seen from +X is +Z in view space
        assert_eq!(target.color.pixel(16, 16), [128, 128, 255, 255]);
    }

    #[test]
    fn test_missing_alpha_writes_leave_alpha_zero() {
        let material = Material::unlit("no_alpha", Vec4::new(0.0, 1.0, 0.0, 1.0)).with_alpha_writes(false);
        let target = capture(&cube_proxy(material), &camera_on_x());
        assert_eq!(target.color.pixel(16, 16), [0, 255, 0, 0]);
    }

    #[test]
    fn test_culling_mask_hides_proxy() {
        let red = Material::unlit("red", Vec4::new(1.0, 0.0, 0.0, 1.0));
        let camera = camera_on_x().with_culling_mask(RenderLayers::DEFAULT);
        let target = capture(&cube_proxy(red), &camera);
        assert_eq!(target.color.covered_pixel_count(), 0);
    }

    #[test]
    fn test_degenerate_camera_draws_nothing() {
        let red = Material::unlit("red", Vec4::new(1.0, 0.0, 0.0, 1.0));
        let mut camera = camera_on_x();
        camera.half_width = 0.0;
        let target = capture(&cube_proxy(red), &camera);
        assert_eq!(target.color.covered_pixel_count(), 0);
    }

    #[test]
    fn test_nearest_surface_wins() {
        let near = Material::unlit("near", Vec4::new(0.0, 0.0, 1.0, 1.0));
        let far = Material::unlit("far", Vec4::new(1.0, 0.0, 0.0, 1.0));
        let source = SourceNode::new("root")
            .with_child(
                SourceNode::new("far")
                    .with_position(Vec3::new(-2.0, 0.0, 0.0))
                    .with_drawable(Drawable::single(Arc::new(Mesh::cube()), far)),
            )
            .with_child(
                SourceNode::new("near")
                    .with_position(Vec3::new(1.5, 0.0, 0.0))
                    .with_drawable(Drawable::single(
                        Arc::new(Mesh::cuboid(Vec3::new(0.25, 0.25, 0.25))),
                        near,
                    )),
            );
        let target = capture(&ProxyBuilder::build(&source, None), &camera_on_x());

        assert_eq!(target.color.pixel(16, 16), [0, 0, 255, 255]);
        assert_eq!(target.color.pixel(10, 16), [255, 0, 0, 255]);
    }

    #[test]
    fn test_submeshes_reuse_last_material() {
        // Square facing +Z, one triangle per submesh
        let normal = [0.0, 0.0, 1.0];
        let vertices = vec![
            Vertex::new([-1.0, -1.0, 0.0], normal, [0.0, 0.0]),
            Vertex::new([1.0, -1.0, 0.0], normal, [1.0, 0.0]),
            Vertex::new([1.0, 1.0, 0.0], normal, [1.0, 1.0]),
            Vertex::new([-1.0, 1.0, 0.0], normal, [0.0, 1.0]),
        ];
        let mesh = Mesh::new(vertices, vec![0, 1, 2, 2, 3, 0]).with_submeshes(vec![
            SubMesh { index_start: 0, index_count: 3 },
            SubMesh { index_start: 3, index_count: 3 },
        ]);
        let only = Material::unlit("only", Vec4::new(1.0, 1.0, 0.0, 1.0));
        let source = SourceNode::new("quad").with_drawable(Drawable::single(Arc::new(mesh), only));

        let mut camera = OrthographicCamera::new(Vec3::new(0.0, 0.0, 5.0), 2.0, 2.0, 0.1, 10.0)
            .with_culling_mask(RenderLayers::BAKE_ISOLATED);
        camera.look_at(Vec3::zeros(), Vec3::y());
        let target = capture(&ProxyBuilder::build(&source, None), &camera);

        assert_eq!(target.color.covered_pixel_count(), 16 * 16);
        assert_eq!(target.color.pixel(12, 20), [255, 255, 0, 255]);
        assert_eq!(target.color.pixel(20, 12), [255, 255, 0, 255]);
    }

    #[test]
    fn test_capture_is_deterministic() {
        let lit = Material::lit("lit", Vec4::new(0.3, 0.6, 0.9, 1.0));
        let mut camera = camera_on_x();
        camera.set_position(Vec3::new(3.0, 1.0, 4.0));
        let proxy = cube_proxy(lit);

        assert_eq!(capture(&proxy, &camera).color, capture(&proxy, &camera).color);
    }
}
