//! Atlas compositing
//!
//! Eight view frames are packed into a 4 column × 2 row grid. Frame `i` lands
//! in row `i / 4`, column `i % 4`, with row 0 in the lower half of the image.
//! Since [`PixelBuffer`] has a bottom-left origin, cell `(row, col)` starts at
//! pixel `(col × tile_width, row × tile_height)` and lines up with the UV
//! rectangle of the same view.

use crate::bake::frame::ViewFrame;
use crate::bake::orbit::VIEW_COUNT;
use crate::config::TileSize;
use crate::render::target::{PixelBuffer, RenderError};

/// Columns in the atlas grid
pub const ATLAS_COLUMNS: u32 = 4;

/// Rows in the atlas grid
pub const ATLAS_ROWS: u32 = 2;

/// Composited atlas of eight views
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasImage {
    tile_size: TileSize,
    pixels: PixelBuffer,
}

impl AtlasImage {
    /// Tile size of one cell
    pub fn tile_size(&self) -> TileSize {
        self.tile_size
    }

    /// Atlas width in pixels
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Atlas height in pixels
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Pixel at `(x, y)`, bottom-left origin
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels.pixel(x, y)
    }

    /// Underlying pixel buffer
    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    /// Bottom-left pixel of the cell holding view `index`
    pub fn cell_origin(&self, index: usize) -> (u32, u32) {
        cell_origin(index, self.tile_size)
    }
}

/// Bottom-left pixel of the cell holding view `index` for a tile size
pub fn cell_origin(index: usize, tile_size: TileSize) -> (u32, u32) {
    let (row, col) = cell_of(index);
    (col * tile_size.width, row * tile_size.height)
}

/// Grid `(row, col)` of view `index`
pub fn cell_of(index: usize) -> (u32, u32) {
    let index = (index % VIEW_COUNT) as u32;
    (index / ATLAS_COLUMNS, index % ATLAS_COLUMNS)
}

/// Packs view frames into an [`AtlasImage`]
pub struct AtlasCompositor;

impl AtlasCompositor {
    /// Copy eight frames verbatim into their grid cells
    ///
    /// Frames are placed by position in `frames`, which must match each
    /// frame's own view index. No resizing or filtering is done.
    pub fn composite(frames: &[ViewFrame], tile_size: TileSize) -> Result<AtlasImage, RenderError> {
        if frames.len() != VIEW_COUNT {
            return Err(RenderError::FrameCountMismatch {
                expected: VIEW_COUNT,
                actual: frames.len(),
            });
        }

        let mut pixels = PixelBuffer::new(
            tile_size.width * ATLAS_COLUMNS,
            tile_size.height * ATLAS_ROWS,
        );

        for (index, frame) in frames.iter().enumerate() {
            if frame.index != index {
                return Err(RenderError::FrameOrderMismatch {
                    position: index,
                    index: frame.index,
                });
            }
            if frame.size() != tile_size {
                return Err(RenderError::TargetSizeMismatch {
                    expected_width: tile_size.width,
                    expected_height: tile_size.height,
                    width: frame.pixels.width(),
                    height: frame.pixels.height(),
                });
            }

            let (x, y) = cell_origin(index, tile_size);
            pixels.blit(&frame.pixels, x, y)?;
        }

        log::debug!("Composited {}x{} atlas", pixels.width(), pixels.height());
        Ok(AtlasImage { tile_size, pixels })
    }
}
