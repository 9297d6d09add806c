//! # Impostor Baker
//!
//! Bakes a 3D object into an 8-view billboard impostor for distant LODs.
//!
//! ## Output
//!
//! - **Color atlas**: eight orthographic views in a 4 × 2 grid
//! - **Normal atlas**: the same views with view-space normals encoded as color
//! - **Billboard geometry**: a fixed six-vertex quad and one UV rectangle per view
//! - **Billboard parameters**: width, height and bottom offset from the object's bounds
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use impostor_baker::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tree = SourceNode::new("tree").with_drawable(Drawable::single(
//!         Arc::new(Mesh::cuboid(Vec3::new(0.5, 2.0, 0.5))),
//!         Material::lit("bark", Vec4::new(0.4, 0.25, 0.1, 1.0)),
//!     ));
//!
//!     let config = BakeConfiguration::default();
//!     let mut pipeline = BakePipeline::new(SoftwareRasterizer::new());
//!     let output = pipeline.bake(Some(&tree), &config)?;
//!
//!     let mut store = DirectoryAssetStore::new("baked")?;
//!     persist_bundle(output, &config, "tree", &mut store)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod scene;
pub mod render;
pub mod assets;
pub mod bake;

/// Common imports for baker users
pub mod prelude {
    pub use crate::{
        foundation::math::{Vec3, Vec4, Quat, Transform},
        config::{BakeConfiguration, Config, TileSize},
        scene::{Bounds, Drawable, SourceNode},
        render::{CaptureBackend, Material, Mesh, RenderLayers, ShaderLibrary, SoftwareRasterizer},
        assets::ObjLoader,
        bake::{
            persist_bundle, AssetPersistence, BakeError, BakeOutput, BakePipeline,
            DirectoryAssetStore, MemoryAssetStore,
        },
    };
}
