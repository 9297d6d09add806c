//! Render proxy construction
//!
//! A render proxy is an isolated, render-only mirror of a source hierarchy.
//! Capturing from a proxy instead of the source keeps the bake from touching
//! anything the source belongs to, and lets the normal pass swap every
//! material without modifying the user's object.
//!
//! # Pivot
//! The proxy root is moved to the world origin while keeping its rotation and
//! scale. All bounds and camera math downstream is relative to that pivot;
//! children keep their original local offsets.

use std::sync::Arc;

use crate::foundation::math::{Mat4, Transform, Vec3};
use crate::render::layers::RenderLayers;
use crate::render::material::Material;
use crate::scene::{Drawable, SourceNode};

/// Node of a render proxy tree
#[derive(Debug, Clone)]
pub struct RenderProxyNode {
    /// Name copied from the source node
    pub name: String,
    /// Transform relative to the parent proxy node
    pub transform: Transform,
    /// Mesh reference and materials, if the source node was drawable
    pub drawable: Option<Drawable>,
    /// Layers the node renders on
    pub layers: RenderLayers,
    /// Owned children, in source order
    pub children: Vec<RenderProxyNode>,
}

impl RenderProxyNode {
    /// Visit every node depth-first with its world matrix
    ///
    /// Iterative, so arbitrarily deep hierarchies don't grow the call stack.
    pub fn visit_world<F>(&self, mut visit: F)
    where
        F: FnMut(&RenderProxyNode, &Mat4),
    {
        let mut stack: Vec<(&RenderProxyNode, Mat4)> = vec![(self, self.transform.to_matrix())];
        while let Some((node, world)) = stack.pop() {
            visit(node, &world);
            // Reverse so children are visited in source order
            for child in node.children.iter().rev() {
                stack.push((child, world * child.transform.to_matrix()));
            }
        }
    }

    /// World position of this node when treated as a root
    pub fn world_position(&self) -> Vec3 {
        self.transform.position
    }

    /// Number of nodes in this subtree
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.visit_world(|_, _| count += 1);
        count
    }

    /// Number of nodes carrying a drawable
    pub fn drawable_count(&self) -> usize {
        let mut count = 0;
        self.visit_world(|node, _| {
            if node.drawable.is_some() {
                count += 1;
            }
        });
        count
    }
}

/// Partially built proxy node waiting for its active children
struct Frame<'s> {
    source: &'s SourceNode,
    node: RenderProxyNode,
    next_child: usize,
}

impl<'s> Frame<'s> {
    fn new(source: &'s SourceNode, node: RenderProxyNode) -> Self {
        Self { source, node, next_child: 0 }
    }

    fn next_active_child(&mut self) -> Option<&'s SourceNode> {
        let source = self.source;
        while let Some(child) = source.children.get(self.next_child) {
            self.next_child += 1;
            if child.active {
                return Some(child);
            }
        }
        None
    }
}

/// Builds render proxies from source hierarchies
pub struct ProxyBuilder;

impl ProxyBuilder {
    /// Build a proxy tree for `source`
    ///
    /// Inactive children are omitted together with their subtrees. Drawable
    /// nodes keep the source mesh reference and either the source materials
    /// or, with `material_override`, the override repeated once per slot
    /// (at least once).
    /// Nodes without a drawable are still created so their descendants keep
    /// the right transforms. Every node is placed on
    /// [`RenderLayers::BAKE_ISOLATED`].
    pub fn build(source: &SourceNode, material_override: Option<&Material>) -> RenderProxyNode {
        let mut root_node = Self::mirror(source, material_override);
        root_node.transform.position = Vec3::zeros();

        let mut root = Frame::new(source, root_node);
        let mut stack: Vec<Frame<'_>> = Vec::new();

        loop {
            let next = match stack.last_mut() {
                Some(frame) => frame.next_active_child(),
                None => root.next_active_child(),
            };
            if let Some(child) = next {
                stack.push(Frame::new(child, Self::mirror(child, material_override)));
                continue;
            }

            let Some(finished) = stack.pop() else {
                break;
            };
            match stack.last_mut() {
                Some(parent) => parent.node.children.push(finished.node),
                None => root.node.children.push(finished.node),
            }
        }

        log::debug!(
            "Built proxy for '{}': {} nodes, {} drawable{}",
            source.name,
            root.node.node_count(),
            root.node.drawable_count(),
            if material_override.is_some() { ", materials overridden" } else { "" }
        );
        root.node
    }

    fn mirror(source: &SourceNode, material_override: Option<&Material>) -> RenderProxyNode {
        let drawable = source.drawable.as_ref().map(|drawable| Drawable {
            mesh: Arc::clone(&drawable.mesh),
            materials: match material_override {
                // A slotless drawable still gets one slot so the override reaches it
                Some(material) => vec![material.clone(); drawable.materials.len().max(1)],
                None => drawable.materials.clone(),
            },
        });

        RenderProxyNode {
            name: source.name.clone(),
            transform: source.transform.clone(),
            drawable,
            layers: RenderLayers::BAKE_ISOLATED,
            children: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Quat, Vec4, constants::PI};
    use crate::render::mesh::Mesh;
    use approx::assert_relative_eq;

    fn drawable(slots: usize) -> Drawable {
        let materials = (0..slots)
            .map(|i| Material::unlit(format!("slot{}", i), Vec4::new(1.0, 0.0, 0.0, 1.0)))
            .collect();
        Drawable::new(Arc::new(Mesh::cube()), materials)
    }

    fn tree() -> SourceNode {
        SourceNode::new("root")
            .with_transform(
                Transform::from_position_rotation(
                    Vec3::new(10.0, 2.0, -3.0),
                    Quat::from_axis_angle(&Vec3::y_axis(), PI / 2.0),
                )
                .with_scale(Vec3::new(2.0, 2.0, 2.0)),
            )
            .with_drawable(drawable(2))
            .with_child(
                SourceNode::new("group")
                    .with_position(Vec3::new(0.0, 1.0, 0.0))
                    .with_child(SourceNode::new("leaf").with_drawable(drawable(3))),
            )
            .with_child(
                SourceNode::new("hidden")
                    .with_active(false)
                    .with_drawable(drawable(1))
                    .with_child(SourceNode::new("hidden_child").with_drawable(drawable(1))),
            )
            .with_child(SourceNode::new("tail").with_drawable(drawable(1)))
    }

    #[test]
    fn test_root_moves_to_origin_keeping_rotation_and_scale() {
        let source = tree();
        let proxy = ProxyBuilder::build(&source, None);

        assert_eq!(proxy.transform.position, Vec3::zeros());
        assert_eq!(proxy.transform.rotation, source.transform.rotation);
        assert_eq!(proxy.transform.scale, source.transform.scale);
        assert_eq!(proxy.children[0].transform.position, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_inactive_subtrees_are_omitted() {
        let proxy = ProxyBuilder::build(&tree(), None);

        let names: Vec<&str> = proxy.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["group", "tail"]);
        assert_eq!(proxy.node_count(), 4);
        assert_eq!(proxy.drawable_count(), 3);
    }

    #[test]
    fn test_non_drawable_nodes_are_kept_for_hierarchy() {
        let proxy = ProxyBuilder::build(&tree(), None);
        let group = &proxy.children[0];

        assert!(group.drawable.is_none());
        assert_eq!(group.children[0].name, "leaf");
    }

    #[test]
    fn test_override_fills_every_slot() {
        let source = tree();
        let normal = Material::normal_encode();
        let proxy = ProxyBuilder::build(&source, Some(&normal));

        let leaf = &proxy.children[0].children[0];
        let leaf_drawable = leaf.drawable.as_ref().unwrap();
        assert_eq!(leaf_drawable.materials, vec![normal.clone(); 3]);

        let root_drawable = proxy.drawable.as_ref().unwrap();
        assert_eq!(root_drawable.materials.len(), 2);
        let source_mesh = &source.drawable.as_ref().unwrap().mesh;
        assert!(Arc::ptr_eq(&root_drawable.mesh, source_mesh));
    }

    #[test]
    fn test_override_reaches_drawable_without_materials() {
        let source = SourceNode::new("bare").with_drawable(drawable(0));
        let normal = Material::normal_encode();

        let plain = ProxyBuilder::build(&source, None);
        assert!(plain.drawable.as_ref().unwrap().materials.is_empty());

        let overridden = ProxyBuilder::build(&source, Some(&normal));
        assert_eq!(overridden.drawable.as_ref().unwrap().materials, vec![normal]);
    }

    #[test]
    fn test_without_override_materials_are_copied() {
        let source = tree();
        let proxy = ProxyBuilder::build(&source, None);
        assert_eq!(
            proxy.drawable.as_ref().unwrap().materials,
            source.drawable.as_ref().unwrap().materials
        );
    }

    #[test]
    fn test_every_node_is_isolated() {
        let proxy = ProxyBuilder::build(&tree(), None);
        proxy.visit_world(|node, _| assert_eq!(node.layers, RenderLayers::BAKE_ISOLATED));
    }

    #[test]
    fn test_world_matrices_follow_local_chain() {
        let proxy = ProxyBuilder::build(&tree(), None);
        let mut leaf_origin = None;
        proxy.visit_world(|node, world| {
            if node.name == "leaf" {
                leaf_origin = Some(world.transform_point(&crate::foundation::math::Point3::origin()));
            }
        });

        // Group offset (0, 1, 0) scaled by the root's 2x scale; rotation about Y keeps it vertical
        let origin = leaf_origin.unwrap();
        assert_relative_eq!(origin.coords, Vec3::new(0.0, 2.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_deep_hierarchy_builds_iteratively() {
        let mut source = SourceNode::new("n0").with_drawable(drawable(1));
        for depth in 1..5000 {
            source = SourceNode::new(format!("n{}", depth)).with_child(source);
        }

        let proxy = ProxyBuilder::build(&source, None);
        assert_eq!(proxy.node_count(), 5000);
        assert_eq!(proxy.drawable_count(), 1);
        // Dropping 5000 nested nodes recursively is fine well below default stack limits
    }
}
