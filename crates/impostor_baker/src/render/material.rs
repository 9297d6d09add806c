//! Material definitions and the shader library
//!
//! Materials carry just enough for the capture backend to shade a proxy: a
//! shading model, a color, and whether the shader writes alpha. The shader
//! library describes which shader families the hosting render environment
//! provides, so the pipeline can refuse to bake before allocating anything
//! when a required family is missing.

use std::collections::BTreeSet;

use crate::foundation::math::Vec4;

/// Shader used for flat, unshaded color
pub const UNLIT_SHADER: &str = "impostor/unlit";

/// Shader used for simple diffuse shading
pub const LIT_SHADER: &str = "impostor/lit";

/// Shader that writes view-space normals as color
pub const NORMAL_ENCODE_SHADER: &str = "impostor/normal_encode";

/// Shader the baked billboard is rendered with at runtime
pub const BILLBOARD_SHADER: &str = "impostor/billboard";

/// Shading model of a material
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialType {
    /// Flat color, no lighting
    Unlit {
        /// RGBA color in `[0, 1]`
        color: Vec4,
    },
    /// Diffuse color lit from the viewer's direction
    Lit {
        /// RGBA color in `[0, 1]`
        color: Vec4,
    },
    /// Encodes the view-space surface normal into RGB
    NormalEncode,
}

/// Material resource referenced by drawables
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Name for debugging
    pub name: String,
    /// Shader family this material needs
    pub shader_name: String,
    /// Shading model and parameters
    pub material_type: MaterialType,
    /// Whether the shader writes the alpha channel
    ///
    /// Shaders that leave alpha untouched produce covered pixels with zero
    /// alpha; the color pass compensates for these with the alpha fix.
    pub writes_alpha: bool,
}

impl Material {
    /// Create an unlit material
    pub fn unlit(name: impl Into<String>, color: Vec4) -> Self {
        Self {
            name: name.into(),
            shader_name: UNLIT_SHADER.to_string(),
            material_type: MaterialType::Unlit { color },
            writes_alpha: true,
        }
    }

    /// Create a lit material
    pub fn lit(name: impl Into<String>, color: Vec4) -> Self {
        Self {
            name: name.into(),
            shader_name: LIT_SHADER.to_string(),
            material_type: MaterialType::Lit { color },
            writes_alpha: true,
        }
    }

    /// Create the override material used for the normal pass
    pub fn normal_encode() -> Self {
        Self {
            name: "normal_encode".to_string(),
            shader_name: NORMAL_ENCODE_SHADER.to_string(),
            material_type: MaterialType::NormalEncode,
            writes_alpha: true,
        }
    }

    /// Builder pattern: mark the shader as (not) writing alpha
    pub fn with_alpha_writes(mut self, writes_alpha: bool) -> Self {
        self.writes_alpha = writes_alpha;
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::lit("default", Vec4::new(0.8, 0.8, 0.8, 1.0))
    }
}

/// Set of shader families available in the hosting render environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderLibrary {
    shaders: BTreeSet<String>,
}

impl ShaderLibrary {
    /// Library with no shaders at all
    pub fn empty() -> Self {
        Self { shaders: BTreeSet::new() }
    }

    /// Library with every shader the baker ships
    pub fn with_builtin_shaders() -> Self {
        let mut library = Self::empty();
        for name in [UNLIT_SHADER, LIT_SHADER, NORMAL_ENCODE_SHADER, BILLBOARD_SHADER] {
            library.register(name);
        }
        library
    }

    /// Register a shader family
    pub fn register(&mut self, name: impl Into<String>) {
        self.shaders.insert(name.into());
    }

    /// Remove a shader family, returning whether it was present
    pub fn unregister(&mut self, name: &str) -> bool {
        self.shaders.remove(name)
    }

    /// Check whether a shader family is available
    pub fn contains(&self, name: &str) -> bool {
        self.shaders.contains(name)
    }

    /// First of the given shader names that is not available
    pub fn first_missing<'a>(&self, required: &[&'a str]) -> Option<&'a str> {
        required.iter().copied().find(|name| !self.contains(name))
    }
}

impl Default for ShaderLibrary {
    fn default() -> Self {
        Self::with_builtin_shaders()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_library_has_bake_shaders() {
        let library = ShaderLibrary::default();
        assert_eq!(library.first_missing(&[NORMAL_ENCODE_SHADER, BILLBOARD_SHADER]), None);
    }

    #[test]
    fn test_first_missing_reports_in_order() {
        let mut library = ShaderLibrary::with_builtin_shaders();
        assert!(library.unregister(BILLBOARD_SHADER));
        assert!(library.unregister(NORMAL_ENCODE_SHADER));

        assert_eq!(
            library.first_missing(&[NORMAL_ENCODE_SHADER, BILLBOARD_SHADER]),
            Some(NORMAL_ENCODE_SHADER)
        );
    }

    #[test]
    fn test_material_constructors_pick_shaders() {
        assert_eq!(Material::unlit("leaf", Vec4::zeros()).shader_name, UNLIT_SHADER);
        assert_eq!(Material::normal_encode().shader_name, NORMAL_ENCODE_SHADER);
        assert!(!Material::default().with_alpha_writes(false).writes_alpha);
    }
}
