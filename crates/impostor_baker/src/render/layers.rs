//! Render layer masks
//!
//! Every drawable carries a layer mask and every camera a culling mask; a
//! drawable is only rasterized when the two intersect. Bake proxies live alone
//! on [`RenderLayers::BAKE_ISOLATED`] so a capture never picks up anything else.

use bitflags::bitflags;

bitflags! {
    /// Bit mask of render layers
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RenderLayers: u32 {
        /// Regular scene content
        const DEFAULT = 1 << 0;
        /// Isolated layer reserved for impostor capture proxies
        const BAKE_ISOLATED = 1 << 31;
    }
}

impl RenderLayers {
    /// Whether content on `self` is seen by a camera with culling mask `mask`
    pub fn visible_to(self, mask: RenderLayers) -> bool {
        self.intersects(mask)
    }
}

impl Default for RenderLayers {
    fn default() -> Self {
        RenderLayers::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isolated_layer_is_hidden_from_default_cameras() {
        assert!(!RenderLayers::DEFAULT.visible_to(RenderLayers::BAKE_ISOLATED));
        assert!(RenderLayers::BAKE_ISOLATED.visible_to(RenderLayers::BAKE_ISOLATED));
        assert!(!RenderLayers::BAKE_ISOLATED.visible_to(RenderLayers::all() - RenderLayers::BAKE_ISOLATED));
    }
}
