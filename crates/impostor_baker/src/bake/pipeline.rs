//! # Bake Pipeline
//!
//! Orchestrates a full impostor bake: a color pass and a normal pass of eight
//! captures each, two atlases, and the billboard geometry and sizing.
//!
//! ## States
//! ```text
//! Idle → ValidatingInput → BuildingColorViews → CompositingColorAtlas
//!      → BuildingNormalViews → CompositingNormalAtlas → BuildingGeometry
//!      → AssemblingBundle → Done
//! ```
//! Any state after `Idle` may instead move to `Failed`. States are entered in
//! order and never revisited within one bake.
//!
//! ## Resources
//! Proxy trees, cameras and render targets are acquired through the
//! pipeline's [`ResourceTracker`] and released by their guards, so
//! [`BakePipeline::live_resources`] is zero after every bake, successful or
//! not. Validation happens before anything is acquired.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bake::atlas::{AtlasCompositor, AtlasImage};
use crate::bake::bounds_calculator::BoundsCalculator;
use crate::bake::error::BakeError;
use crate::bake::frame::{FrameRenderer, ViewFrame};
use crate::bake::geometry::{BillboardGeometry, BillboardParameters};
use crate::bake::orbit::{OrbitCameraRig, VIEW_COUNT};
use crate::bake::proxy::ProxyBuilder;
use crate::config::{BakeConfiguration, TileSize};
use crate::render::material::{Material, ShaderLibrary, BILLBOARD_SHADER, NORMAL_ENCODE_SHADER};
use crate::render::rasterizer::CaptureBackend;
use crate::render::resources::{ResourceKind, ResourceTracker};
use crate::scene::{Bounds, SourceNode};

/// Shaders a bake cannot run without
pub const REQUIRED_SHADERS: [&str; 2] = [NORMAL_ENCODE_SHADER, BILLBOARD_SHADER];

/// Texture slot the billboard shader samples base color from
pub const COLOR_TEXTURE_BINDING: &str = "base_color_atlas";

/// Texture slot the billboard shader samples normals from
pub const NORMAL_TEXTURE_BINDING: &str = "normal_atlas";

/// Pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BakeState {
    /// Nothing started
    Idle,
    /// Checking the source object and shader availability
    ValidatingInput,
    /// Capturing the eight color views
    BuildingColorViews,
    /// Packing the color atlas
    CompositingColorAtlas,
    /// Capturing the eight normal views
    BuildingNormalViews,
    /// Packing the normal atlas
    CompositingNormalAtlas,
    /// Deriving billboard topology and sizing
    BuildingGeometry,
    /// Putting the output bundle together
    AssemblingBundle,
    /// Bake finished with a bundle
    Done,
    /// Bake aborted with an error
    Failed,
}

impl fmt::Display for BakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Material the runtime billboard is drawn with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillboardMaterialDescriptor {
    /// Billboard shader family
    pub shader_name: String,
    /// Texture binding for the color atlas
    pub color_texture_binding: String,
    /// Texture binding for the normal atlas
    pub normal_texture_binding: String,
}

impl Default for BillboardMaterialDescriptor {
    fn default() -> Self {
        Self {
            shader_name: BILLBOARD_SHADER.to_string(),
            color_texture_binding: COLOR_TEXTURE_BINDING.to_string(),
            normal_texture_binding: NORMAL_TEXTURE_BINDING.to_string(),
        }
    }
}

/// Everything a successful bake produces
#[derive(Debug, Clone, PartialEq)]
pub struct BakeOutput {
    /// Color captures, alpha-fixed
    pub color_atlas: AtlasImage,
    /// Normal captures, raw alpha
    pub normal_atlas: AtlasImage,
    /// Material binding both atlases
    pub material: BillboardMaterialDescriptor,
    /// Billboard topology and UV rectangles
    pub geometry: BillboardGeometry,
    /// Billboard size and offset
    pub parameters: BillboardParameters,
    /// Bounds of the color pass proxy
    pub bounds: Bounds,
}

impl BakeOutput {
    /// Tile size both atlases were captured at
    pub fn tile_size(&self) -> TileSize {
        self.color_atlas.tile_size()
    }
}

/// Frames and framing of one capture pass
struct ViewPass {
    frames: Vec<ViewFrame>,
    bounds: Bounds,
    pivot_y: f32,
}

/// Impostor bake driver over a capture backend
pub struct BakePipeline<B: CaptureBackend> {
    backend: B,
    shaders: ShaderLibrary,
    tracker: ResourceTracker,
    history: Vec<BakeState>,
}

impl<B: CaptureBackend> BakePipeline<B> {
    /// Create a pipeline with the built-in shader library
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            shaders: ShaderLibrary::default(),
            tracker: ResourceTracker::new(),
            history: vec![BakeState::Idle],
        }
    }

    /// Builder pattern: replace the shader library
    pub fn with_shader_library(mut self, shaders: ShaderLibrary) -> Self {
        self.shaders = shaders;
        self
    }

    /// Capture backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Current state
    pub fn state(&self) -> BakeState {
        self.history.last().copied().unwrap_or(BakeState::Idle)
    }

    /// States visited by the most recent bake, in order
    pub fn state_history(&self) -> &[BakeState] {
        &self.history
    }

    /// Resource tracker, for inspecting acquisitions
    pub fn tracker(&self) -> &ResourceTracker {
        &self.tracker
    }

    /// Bake-scoped resources still alive
    pub fn live_resources(&self) -> usize {
        self.tracker.live_total()
    }

    /// Bake `source` with `config`
    ///
    /// Returns the complete bundle or an error; never a partial result.
    pub fn bake(
        &mut self,
        source: Option<&SourceNode>,
        config: &BakeConfiguration,
    ) -> Result<BakeOutput, BakeError> {
        self.history.clear();
        self.history.push(BakeState::Idle);

        let result = self.run(source, config);
        match &result {
            Ok(output) => {
                self.enter(BakeState::Done);
                log::info!(
                    "Bake complete: {}x{} atlases, billboard {:.3} x {:.3}",
                    output.color_atlas.width(),
                    output.color_atlas.height(),
                    output.parameters.width,
                    output.parameters.height
                );
            }
            Err(e) => {
                log::error!("Bake failed during {}: {}", self.state(), e);
                self.enter(BakeState::Failed);
            }
        }
        result
    }

    fn enter(&mut self, state: BakeState) {
        log::debug!("Bake state: {} -> {}", self.state(), state);
        self.history.push(state);
    }

    fn run(
        &mut self,
        source: Option<&SourceNode>,
        config: &BakeConfiguration,
    ) -> Result<BakeOutput, BakeError> {
        self.enter(BakeState::ValidatingInput);
        let source = source.ok_or(BakeError::MissingInput)?;
        if let Some(missing) = self.shaders.first_missing(&REQUIRED_SHADERS) {
            return Err(BakeError::MissingCapability(missing.to_string()));
        }
        let tile_size = config.effective_tile_size();
        log::info!(
            "Baking '{}' at {}x{} per view",
            source.name,
            tile_size.width,
            tile_size.height
        );

        self.enter(BakeState::BuildingColorViews);
        let color = capture_views(&mut self.backend, &self.tracker, source, None, tile_size, true)?;

        self.enter(BakeState::CompositingColorAtlas);
        let color_atlas = AtlasCompositor::composite(&color.frames, tile_size)?;

        self.enter(BakeState::BuildingNormalViews);
        let normal_material = Material::normal_encode();
        let normal = capture_views(
            &mut self.backend,
            &self.tracker,
            source,
            Some(&normal_material),
            tile_size,
            false,
        )?;

        self.enter(BakeState::CompositingNormalAtlas);
        let normal_atlas = AtlasCompositor::composite(&normal.frames, tile_size)?;

        self.enter(BakeState::BuildingGeometry);
        let geometry = BillboardGeometry::standard();
        let parameters = BillboardParameters::from_bounds(&color.bounds, color.pivot_y);
        if parameters.is_degenerate() {
            log::warn!("'{}' has no drawable geometry, billboard is zero-sized", source.name);
        }

        self.enter(BakeState::AssemblingBundle);
        Ok(BakeOutput {
            color_atlas,
            normal_atlas,
            material: BillboardMaterialDescriptor::default(),
            geometry,
            parameters,
            bounds: color.bounds,
        })
    }
}

/// Build a proxy and capture all views of it
///
/// Proxy and camera guards drop at the end of the pass.
fn capture_views<B: CaptureBackend + ?Sized>(
    backend: &mut B,
    tracker: &ResourceTracker,
    source: &SourceNode,
    material_override: Option<&Material>,
    tile_size: TileSize,
    alpha_fix: bool,
) -> Result<ViewPass, BakeError> {
    let proxy = tracker.acquire(
        ResourceKind::ProxyTree,
        ProxyBuilder::build(source, material_override),
    );
    let bounds = BoundsCalculator::calculate(&proxy);
    let pivot = proxy.world_position();
    let rig = OrbitCameraRig::new(&bounds, pivot);
    let poses = rig.poses();

    let mut camera = tracker.acquire(ResourceKind::Camera, rig.camera(&poses[0]));
    let renderer = FrameRenderer::new(tracker, tile_size);

    let mut frames = Vec::with_capacity(VIEW_COUNT);
    for pose in &poses {
        camera.set_position(pose.position);
        camera.look_at(pose.target, pose.up);
        frames.push(renderer.capture(backend, &camera, pose.index, &proxy, alpha_fix)?);
    }

    Ok(ViewPass {
        frames,
        bounds,
        pivot_y: pivot.y,
    })
}
