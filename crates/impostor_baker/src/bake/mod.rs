//! Impostor bake pipeline
//!
//! Leaf components first:
//!
//! - [`proxy`]: isolated, render-only mirror of a source hierarchy
//! - [`bounds_calculator`]: combined world-space bounds of a proxy
//! - [`orbit`]: camera framing and the eight capture poses
//! - [`frame`]: one capture into a view frame, with the alpha fix
//! - [`atlas`]: eight frames into a 4 × 2 atlas
//! - [`geometry`]: billboard topology, UV rectangles and sizing
//! - [`pipeline`]: the color and normal passes and the output bundle
//! - [`persistence`]: handing the bundle to a store

pub mod atlas;
pub mod bounds_calculator;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod orbit;
pub mod persistence;
pub mod pipeline;
pub mod proxy;

pub use atlas::{AtlasCompositor, AtlasImage};
pub use bounds_calculator::BoundsCalculator;
pub use error::BakeError;
pub use frame::{apply_alpha_fix, FrameRenderer, ViewFrame};
pub use geometry::{BillboardGeometry, BillboardParameters, UvRect};
pub use orbit::{CameraPose, OrbitCameraRig, CAMERA_MARGIN, ROTATION_STEP_DEGREES, VIEW_COUNT};
pub use persistence::{
    persist_bundle, AssetHandle, AssetPersistence, AssetRef, BillboardAsset, DirectoryAssetStore,
    MemoryAssetStore, PersistedBundle, PersistenceError,
};
pub use pipeline::{BakeOutput, BakePipeline, BakeState, BillboardMaterialDescriptor};
pub use proxy::{ProxyBuilder, RenderProxyNode};
