//! # Bake Configuration
//!
//! The only tunable input of the bake pipeline besides the source object.
//!
//! Configuration never fails validation. Tile dimensions outside the supported
//! range are clamped, and power-of-two snapping is applied after clamping, so
//! every value read from disk or typed by a user resolves to a usable tile size.

use serde::{Serialize, Deserialize};

use super::Config;

/// Smallest supported tile edge in pixels
pub const MIN_TILE_SIZE: u32 = 32;

/// Largest supported tile edge in pixels
pub const MAX_TILE_SIZE: u32 = 2048;

/// Resolved per-view tile resolution in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileSize {
    /// Tile width in pixels
    pub width: u32,
    /// Tile height in pixels
    pub height: u32,
}

impl TileSize {
    /// Create a tile size
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels in one tile
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// User-facing bake settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BakeConfiguration {
    /// Requested width of one view tile in pixels
    pub tile_width: u32,

    /// Requested height of one view tile in pixels
    pub tile_height: u32,

    /// Snap both tile dimensions to the nearest power of two
    pub snap_to_power_of_two: bool,

    /// Store atlases, material and mesh inside a single container asset
    pub pack_assets: bool,

    /// Also write the atlases as encoded image files
    ///
    /// Only consulted when `pack_assets` is false.
    pub export_as_encoded_file: bool,
}

impl Default for BakeConfiguration {
    fn default() -> Self {
        Self {
            tile_width: 256,
            tile_height: 256,
            snap_to_power_of_two: true,
            pack_assets: true,
            export_as_encoded_file: false,
        }
    }
}

impl Config for BakeConfiguration {}

impl BakeConfiguration {
    /// Builder pattern: set the requested tile dimensions
    pub fn with_tile_size(mut self, width: u32, height: u32) -> Self {
        self.tile_width = width;
        self.tile_height = height;
        self
    }

    /// Builder pattern: enable or disable power-of-two snapping
    pub fn with_power_of_two_snapping(mut self, enabled: bool) -> Self {
        self.snap_to_power_of_two = enabled;
        self
    }

    /// Builder pattern: choose packed or separate asset output
    pub fn with_packed_assets(mut self, packed: bool) -> Self {
        self.pack_assets = packed;
        self
    }

    /// Builder pattern: request encoded image files next to separate assets
    pub fn with_encoded_export(mut self, export: bool) -> Self {
        self.export_as_encoded_file = export;
        self
    }

    /// Whether encoded image files should be written for this configuration
    pub fn wants_encoded_export(&self) -> bool {
        !self.pack_assets && self.export_as_encoded_file
    }

    /// Resolve the tile size actually used for rendering
    ///
    /// Each dimension is clamped to `[MIN_TILE_SIZE, MAX_TILE_SIZE]` first and
    /// then, if enabled, snapped with [`nearest_power_of_two`].
    pub fn effective_tile_size(&self) -> TileSize {
        TileSize::new(
            self.resolve_dimension("tile_width", self.tile_width),
            self.resolve_dimension("tile_height", self.tile_height),
        )
    }

    fn resolve_dimension(&self, label: &str, requested: u32) -> u32 {
        let clamped = requested.clamp(MIN_TILE_SIZE, MAX_TILE_SIZE);
        if clamped != requested {
            log::warn!(
                "{} {} outside [{}, {}], clamped to {}",
                label, requested, MIN_TILE_SIZE, MAX_TILE_SIZE, clamped
            );
        }

        if self.snap_to_power_of_two {
            let snapped = nearest_power_of_two(clamped);
            if snapped != clamped {
                log::debug!("{} snapped from {} to {}", label, clamped, snapped);
            }
            snapped
        } else {
            clamped
        }
    }
}

/// Round to the closest power of two, breaking exact midpoints upward
///
/// 96 lies exactly between 64 and 128 and resolves to 128; 95 resolves to 64.
/// Zero is treated as one.
pub fn nearest_power_of_two(value: u32) -> u32 {
    if value <= 1 {
        return 1;
    }
    if value.is_power_of_two() {
        return value;
    }

    let lower = 1u32 << (31 - value.leading_zeros());
    let Some(upper) = lower.checked_mul(2) else {
        return lower;
    };

    if value - lower < upper - value {
        lower
    } else {
        upper
    }
}
