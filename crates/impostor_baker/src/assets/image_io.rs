//! PNG encoding and decoding for pixel buffers
//!
//! Pixel buffers are bottom-up; PNG rows are top-down. Every function here
//! flips on the way through, so a round trip returns the same buffer.

use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, ImageResult};

use crate::render::target::PixelBuffer;

/// Encode a buffer as PNG bytes
pub fn encode_png(pixels: &PixelBuffer) -> ImageResult<Vec<u8>> {
    let mut bytes = Vec::new();
    pixels
        .to_rgba_image()
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Decode PNG bytes into a buffer
pub fn decode_png(bytes: &[u8]) -> ImageResult<PixelBuffer> {
    let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
    Ok(PixelBuffer::from_rgba_image(&image.to_rgba8()))
}

/// Write a buffer to a PNG file
pub fn save_png<P: AsRef<Path>>(pixels: &PixelBuffer, path: P) -> ImageResult<()> {
    let path = path.as_ref();
    pixels.to_rgba_image().save_with_format(path, ImageFormat::Png)?;
    log::debug!("Wrote {}x{} PNG to {:?}", pixels.width(), pixels.height(), path);
    Ok(())
}

/// Read a PNG file into a buffer
pub fn load_png<P: AsRef<Path>>(path: P) -> ImageResult<PixelBuffer> {
    let path = path.as_ref();
    let image = image::open(path)?.to_rgba8();
    log::debug!("Loaded {}x{} image from {:?}", image.width(), image.height(), path);
    Ok(PixelBuffer::from_rgba_image(&image))
}
