//! Pixel buffers and off-screen render targets
//!
//! # Pixel Origin
//! [`PixelBuffer`] uses texture conventions: pixel `(0, 0)` is the bottom-left
//! corner and rows are stored bottom to top. This keeps atlas cells and UV
//! rectangles in the same frame of reference (v = 0 is the bottom row).
//! Conversion to the `image` crate, whose origin is top-left, flips rows.

use image::RgbaImage;

use crate::config::TileSize;

/// Errors raised by render targets and pixel operations
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RenderError {
    /// A buffer did not have the size the operation requires
    #[error("Expected a {expected_width}x{expected_height} buffer, got {width}x{height}")]
    TargetSizeMismatch {
        /// Required width
        expected_width: u32,
        /// Required height
        expected_height: u32,
        /// Actual width
        width: u32,
        /// Actual height
        height: u32,
    },

    /// A render target was requested with a zero dimension
    #[error("Render target size {width}x{height} is not usable")]
    InvalidTargetSize {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// A copy would write outside the destination buffer
    #[error("Region at ({x}, {y}) of size {width}x{height} exceeds the destination")]
    RegionOutOfBounds {
        /// Destination x
        x: u32,
        /// Destination y
        y: u32,
        /// Region width
        width: u32,
        /// Region height
        height: u32,
    },

    /// Compositing got the wrong number of view frames
    #[error("Expected {expected} view frames, got {actual}")]
    FrameCountMismatch {
        /// Required frame count
        expected: usize,
        /// Supplied frame count
        actual: usize,
    },

    /// A view frame sits at the wrong position in capture order
    #[error("View frame {index} found at position {position}")]
    FrameOrderMismatch {
        /// Position in the frame list
        position: usize,
        /// View index carried by the frame
        index: usize,
    },
}

/// Tightly packed RGBA8 pixels with a bottom-left origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Fully transparent buffer
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, [0, 0, 0, 0])
    }

    /// Buffer filled with one color
    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = width as usize * height as usize;
        Self {
            width,
            height,
            data: color.repeat(pixel_count),
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw bytes, bottom row first
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Pixel at `(x, y)` or `None` outside the buffer
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Pixel at `(x, y)`
    ///
    /// # Panics
    /// Panics when `(x, y)` lies outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.get_pixel(x, y)
            .unwrap_or_else(|| panic!("pixel ({x}, {y}) outside {}x{} buffer", self.width, self.height))
    }

    /// Overwrite the pixel at `(x, y)`; out-of-range writes are ignored
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x < self.width && y < self.height {
            let i = self.offset(x, y);
            self.data[i..i + 4].copy_from_slice(&rgba);
        }
    }

    /// Mutable RGBA chunks in storage order
    pub fn pixels_mut(&mut self) -> std::slice::ChunksExactMut<'_, u8> {
        self.data.chunks_exact_mut(4)
    }

    /// RGBA chunks in storage order
    pub fn pixels(&self) -> std::slice::ChunksExact<'_, u8> {
        self.data.chunks_exact(4)
    }

    /// Reset every pixel to one color
    pub fn clear(&mut self, color: [u8; 4]) {
        for px in self.pixels_mut() {
            px.copy_from_slice(&color);
        }
    }

    /// Copy `source` verbatim so its bottom-left pixel lands on `(x, y)`
    pub fn blit(&mut self, source: &PixelBuffer, x: u32, y: u32) -> Result<(), RenderError> {
        let fits_x = x.checked_add(source.width).is_some_and(|end| end <= self.width);
        let fits_y = y.checked_add(source.height).is_some_and(|end| end <= self.height);
        if !fits_x || !fits_y {
            return Err(RenderError::RegionOutOfBounds {
                x,
                y,
                width: source.width,
                height: source.height,
            });
        }

        let row_bytes = source.width as usize * 4;
        for row in 0..source.height {
            let src = source.offset(0, row);
            let dst = self.offset(x, y + row);
            self.data[dst..dst + row_bytes].copy_from_slice(&source.data[src..src + row_bytes]);
        }
        Ok(())
    }

    /// Number of pixels with non-zero alpha
    pub fn covered_pixel_count(&self) -> usize {
        self.pixels().filter(|px| px[3] > 0).count()
    }

    /// Convert to an `image` buffer (top-left origin)
    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            image::Rgba(self.pixel(x, self.height - 1 - y))
        })
    }

    /// Convert from an `image` buffer (top-left origin)
    pub fn from_rgba_image(image: &RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let mut buffer = Self::new(width, height);
        for (x, y, px) in image.enumerate_pixels() {
            buffer.set_pixel(x, height - 1 - y, px.0);
        }
        buffer
    }
}

/// Off-screen color and depth target
///
/// Depth stores normalized projection depth in `[0, 1]`; smaller is closer.
/// Cleared targets hold transparent black and infinite depth.
#[derive(Debug, Clone)]
pub struct RenderTarget {
    /// Color attachment
    pub color: PixelBuffer,
    /// Depth attachment, same layout as `color`
    pub depth: Vec<f32>,
}

impl RenderTarget {
    /// Allocate a cleared target of the given size
    pub fn new(size: TileSize) -> Result<Self, RenderError> {
        if size.width == 0 || size.height == 0 {
            return Err(RenderError::InvalidTargetSize {
                width: size.width,
                height: size.height,
            });
        }
        Ok(Self {
            color: PixelBuffer::new(size.width, size.height),
            depth: vec![f32::INFINITY; size.pixel_count()],
        })
    }

    /// Target size
    pub fn size(&self) -> TileSize {
        TileSize::new(self.color.width(), self.color.height())
    }

    /// Clear color to transparent black and depth to infinity
    pub fn clear(&mut self) {
        self.color.clear([0, 0, 0, 0]);
        self.depth.fill(f32::INFINITY);
    }

    /// Copy the color attachment out of the target
    pub fn read_back(&self) -> PixelBuffer {
        self.color.clone()
    }
}
