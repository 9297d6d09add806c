//! World-space bounds of a proxy tree

use crate::bake::proxy::RenderProxyNode;
use crate::scene::Bounds;

/// Computes the combined bounds of every drawable in a proxy tree
pub struct BoundsCalculator;

impl BoundsCalculator {
    /// Union of the world-space boxes of all drawable proxy nodes
    ///
    /// Starts from a zero-size box at the proxy root's position, so a tree
    /// without drawables yields that degenerate box. Meshes without vertices
    /// contribute nothing.
    pub fn calculate(proxy: &RenderProxyNode) -> Bounds {
        let mut bounds = Bounds::degenerate(proxy.world_position());

        proxy.visit_world(|node, world| {
            let local = node
                .drawable
                .as_ref()
                .and_then(|drawable| drawable.mesh.local_bounds());
            if let Some(local) = local {
                bounds.encapsulate(&local.transformed(world));
            }
        });

        log::debug!(
            "Proxy bounds: center {:?}, extents {:?}",
            bounds.center,
            bounds.extents
        );
        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::bake::proxy::ProxyBuilder;
    use crate::foundation::math::{Quat, Transform, Vec3, constants::PI};
    use crate::render::material::Material;
    use crate::render::mesh::Mesh;
    use crate::scene::{Drawable, SourceNode};
    use approx::assert_relative_eq;

    fn cuboid(half: Vec3) -> Drawable {
        Drawable::single(Arc::new(Mesh::cuboid(half)), Material::default())
    }

    #[test]
    fn test_no_drawables_gives_degenerate_box_at_root() {
        let source = SourceNode::new("empty")
            .with_position(Vec3::new(7.0, 3.0, -1.0))
            .with_child(SourceNode::new("child").with_position(Vec3::new(1.0, 1.0, 1.0)));
        let proxy = ProxyBuilder::build(&source, None);

        let bounds = BoundsCalculator::calculate(&proxy);
        assert!(bounds.is_degenerate());
        assert_eq!(bounds.center, proxy.world_position());
    }

    #[test]
    fn test_bounds_ignore_source_world_position() {
        let source = SourceNode::new("tree")
            .with_position(Vec3::new(100.0, 50.0, 25.0))
            .with_drawable(cuboid(Vec3::new(1.0, 2.0, 3.0)));
        let bounds = BoundsCalculator::calculate(&ProxyBuilder::build(&source, None));

        assert_relative_eq!(bounds.center, Vec3::zeros());
        assert_relative_eq!(bounds.extents, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_seed_point_is_always_enclosed() {
        // Drawable floats above the pivot; the pivot still stretches the box
        let source = SourceNode::new("root").with_child(
            SourceNode::new("canopy")
                .with_position(Vec3::new(0.0, 4.0, 0.0))
                .with_drawable(cuboid(Vec3::new(1.0, 1.0, 1.0))),
        );
        let bounds = BoundsCalculator::calculate(&ProxyBuilder::build(&source, None));

        assert_relative_eq!(bounds.min(), Vec3::new(-1.0, 0.0, -1.0));
        assert_relative_eq!(bounds.max(), Vec3::new(1.0, 5.0, 1.0));
    }

    #[test]
    fn test_child_transforms_are_applied() {
        let source = SourceNode::new("root")
            .with_transform(
                Transform::from_position_rotation(
                    Vec3::new(3.0, 0.0, 0.0),
                    Quat::from_axis_angle(&Vec3::y_axis(), PI / 2.0),
                )
                .with_scale(Vec3::new(2.0, 2.0, 2.0)),
            )
            .with_drawable(cuboid(Vec3::new(1.0, 1.0, 0.5)))
            .with_child(
                SourceNode::new("offset")
                    .with_position(Vec3::new(0.0, 0.0, 2.0))
                    .with_drawable(cuboid(Vec3::new(0.5, 0.5, 0.5))),
            );
        let bounds = BoundsCalculator::calculate(&ProxyBuilder::build(&source, None));

        // Root box after 90° yaw and 2x scale spans x ±1, y ±2, z ±2;
        // the child sits at local z = 2 which maps to world x = 4 (±1)
        assert_relative_eq!(bounds.min(), Vec3::new(-1.0, -2.0, -2.0), epsilon = 1e-5);
        assert_relative_eq!(bounds.max(), Vec3::new(5.0, 2.0, 2.0), epsilon = 1e-5);
    }
}
