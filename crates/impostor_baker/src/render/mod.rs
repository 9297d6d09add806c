//! Rendering for impostor capture
//!
//! Everything the bake needs to turn a proxy tree into pixels: meshes and
//! materials, an orthographic camera, layer masks, off-screen targets, scoped
//! resource tracking, and the capture backends.

pub mod camera;
pub mod layers;
pub mod material;
pub mod mesh;
pub mod rasterizer;
pub mod resources;
pub mod target;

pub use camera::OrthographicCamera;
pub use layers::RenderLayers;
pub use material::{Material, MaterialType, ShaderLibrary};
pub use mesh::{Mesh, SubMesh, Vertex};
pub use rasterizer::{CaptureBackend, SoftwareRasterizer};
pub use resources::{ResourceKind, ResourceTracker, Tracked};
pub use target::{PixelBuffer, RenderError, RenderTarget};
