//! Source object hierarchy
//!
//! A [`SourceNode`] tree is what the user wants baked. The root's transform is
//! its world placement; every child's transform is relative to its parent.

use std::sync::Arc;

use crate::foundation::math::{Transform, Vec3};
use crate::render::material::Material;
use crate::render::mesh::Mesh;

/// Mesh plus the ordered material slots it is drawn with
#[derive(Debug, Clone)]
pub struct Drawable {
    /// Shared geometry
    pub mesh: Arc<Mesh>,
    /// One material per submesh, in submesh order
    pub materials: Vec<Material>,
}

impl Drawable {
    /// Create a drawable from a mesh and its material slots
    pub fn new(mesh: Arc<Mesh>, materials: Vec<Material>) -> Self {
        Self { mesh, materials }
    }

    /// Drawable with a single material slot
    pub fn single(mesh: Arc<Mesh>, material: Material) -> Self {
        Self::new(mesh, vec![material])
    }
}

/// Node of the object being baked
#[derive(Debug, Clone)]
pub struct SourceNode {
    /// Node name for logs and lookups
    pub name: String,
    /// Inactive nodes and their subtrees are ignored by the baker
    pub active: bool,
    /// Transform relative to the parent (world transform for the root)
    pub transform: Transform,
    /// Optional geometry
    pub drawable: Option<Drawable>,
    /// Ordered children
    pub children: Vec<SourceNode>,
}

impl SourceNode {
    /// Create an active, empty node with an identity transform
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: true,
            transform: Transform::identity(),
            drawable: None,
            children: Vec::new(),
        }
    }

    /// Builder pattern: set the local transform
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Builder pattern: set the local position only
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    /// Builder pattern: attach geometry
    pub fn with_drawable(mut self, drawable: Drawable) -> Self {
        self.drawable = Some(drawable);
        self
    }

    /// Builder pattern: append a child
    pub fn with_child(mut self, child: SourceNode) -> Self {
        self.children.push(child);
        self
    }

    /// Builder pattern: set the active flag
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// World position of this node when used as a bake root
    pub fn world_position(&self) -> Vec3 {
        self.transform.position
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SourceNode {
        SourceNode::new("root")
            .with_position(Vec3::new(4.0, 1.0, 0.0))
            .with_child(SourceNode::new("trunk"))
            .with_child(
                SourceNode::new("canopy")
                    .with_active(false)
                    .with_child(SourceNode::new("leaves")),
            )
    }

    #[test]
    fn test_builder_keeps_children_in_order() {
        let tree = sample();
        let names: Vec<&str> = tree.children.iter().map(|c| c.name.as_str()).collect();

        assert_eq!(names, vec!["trunk", "canopy"]);
        assert!(!tree.children[1].active);
        assert_eq!(tree.children[1].children[0].name, "leaves");
        assert_eq!(tree.world_position(), Vec3::new(4.0, 1.0, 0.0));
    }
}
