//! Single-view capture
//!
//! [`FrameRenderer`] turns one camera pose into one [`ViewFrame`]: it
//! allocates a tracked render target of exactly the tile size, lets the
//! capture backend draw the proxy, reads the pixels back and optionally
//! applies the alpha fix.
//!
//! ## Alpha fix
//! Materials whose shaders never write alpha leave covered pixels at alpha 0,
//! which the billboard would treat as empty. For color captures, any pixel
//! with some red, green or blue but zero alpha gets alpha 1. Everything else
//! is untouched. Renderers that alpha-test above 1/255 still discard those
//! pixels; this is a known limitation.

use crate::bake::proxy::RenderProxyNode;
use crate::config::TileSize;
use crate::render::camera::OrthographicCamera;
use crate::render::rasterizer::CaptureBackend;
use crate::render::resources::{ResourceKind, ResourceTracker};
use crate::render::target::{PixelBuffer, RenderError, RenderTarget};

/// Alpha written by the alpha fix
pub const ALPHA_FIX_VALUE: u8 = 1;

/// Pixels captured from one pose
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewFrame {
    /// View index, 0..VIEW_COUNT
    pub index: usize,
    /// Captured RGBA8 pixels
    pub pixels: PixelBuffer,
}

impl ViewFrame {
    /// Tag a buffer with its view index
    pub fn new(index: usize, pixels: PixelBuffer) -> Self {
        Self { index, pixels }
    }

    /// Size of the captured buffer
    pub fn size(&self) -> TileSize {
        TileSize::new(self.pixels.width(), self.pixels.height())
    }
}

/// Give colored pixels with zero alpha an alpha of 1
///
/// Returns the number of pixels changed.
pub fn apply_alpha_fix(pixels: &mut PixelBuffer) -> usize {
    let mut fixed = 0;
    for px in pixels.pixels_mut() {
        if px[3] == 0 && (px[0] > 0 || px[1] > 0 || px[2] > 0) {
            px[3] = ALPHA_FIX_VALUE;
            fixed += 1;
        }
    }
    fixed
}

/// Captures view frames of a fixed tile size
pub struct FrameRenderer<'t> {
    tracker: &'t ResourceTracker,
    tile_size: TileSize,
}

impl<'t> FrameRenderer<'t> {
    /// Create a renderer whose targets are tracked by `tracker`
    pub fn new(tracker: &'t ResourceTracker, tile_size: TileSize) -> Self {
        Self { tracker, tile_size }
    }

    /// Tile size of every captured frame
    pub fn tile_size(&self) -> TileSize {
        self.tile_size
    }

    /// Capture view `index` of `proxy` through `camera`
    ///
    /// The render target is released before returning, on success and on
    /// failure alike.
    pub fn capture<B: CaptureBackend + ?Sized>(
        &self,
        backend: &mut B,
        camera: &OrthographicCamera,
        index: usize,
        proxy: &RenderProxyNode,
        alpha_fix: bool,
    ) -> Result<ViewFrame, RenderError> {
        let mut target = self
            .tracker
            .acquire(ResourceKind::RenderTarget, RenderTarget::new(self.tile_size)?);

        backend.capture(camera, proxy, &mut target)?;

        let size = target.size();
        if size != self.tile_size {
            return Err(RenderError::TargetSizeMismatch {
                expected_width: self.tile_size.width,
                expected_height: self.tile_size.height,
                width: size.width,
                height: size.height,
            });
        }

        let mut pixels = target.read_back();
        if alpha_fix {
            let fixed = apply_alpha_fix(&mut pixels);
            log::debug!("View {}: alpha fix touched {} pixels", index, fixed);
        }
        log::debug!(
            "View {}: {} covered pixels",
            index,
            pixels.covered_pixel_count()
        );

        Ok(ViewFrame::new(index, pixels))
    }
}
