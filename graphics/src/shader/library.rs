//! Built-in shader library modules.
//!
//! The WGSL sources live in `graphics/shaders/`:
//! - `common.wgsl` - Camera and object uniforms, texture bindings
//! - `lighting.wgsl` - Light and material blocks, Phong `shade()`
//! - `draw2d.wgsl` - 2D pipeline entry points
//! - `draw3d.wgsl` - 3D pipeline entry points
//!
//! | Include Path | Description |
//! |--------------|-------------|
//! | `oflike/common.wgsl` | Shared bindings for every pipeline |
//! | `oflike/lighting.wgsl` | Lighting for lit 3D draws |

// =============================================================================
// Shader Module Sources (loaded from files at compile time)
// =============================================================================

/// Camera, object and texture bindings.
const COMMON_MODULE: &str = include_str!("../../shaders/common.wgsl");

/// Light and material uniform blocks plus the shading function.
const LIGHTING_MODULE: &str = include_str!("../../shaders/lighting.wgsl");

/// 2D pipeline source: `vs_main`, `fs_flat`, `fs_textured`.
pub const SHADER_2D_SOURCE: &str = include_str!("../../shaders/draw2d.wgsl");

/// 3D pipeline source: `vs_main`, `fs_unlit`, `fs_unlit_textured`, `fs_lit`,
/// `fs_lit_textured`.
pub const SHADER_3D_SOURCE: &str = include_str!("../../shaders/draw3d.wgsl");

// =============================================================================
// ShaderLibrary
// =============================================================================

/// Collection of shader modules that can be included.
pub struct ShaderLibrary {
    modules: Vec<(&'static str, &'static str)>,
}

impl ShaderLibrary {
    /// The built-in modules used by the 2D and 3D pipelines.
    pub fn standard() -> Self {
        Self {
            modules: vec![
                ("oflike/common.wgsl", COMMON_MODULE),
                ("oflike/lighting.wgsl", LIGHTING_MODULE),
            ],
        }
    }

    /// Create an empty shader library.
    pub fn empty() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Get an iterator over all modules (path, source).
    pub fn modules(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.modules.iter().copied()
    }

    /// Add a custom module to the library.
    pub fn with_module(mut self, path: &'static str, source: &'static str) -> Self {
        self.modules.push((path, source));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_library_modules() {
        let library = ShaderLibrary::standard();
        let modules: Vec<_> = library.modules().collect();

        assert_eq!(modules.len(), 2);
        assert!(modules.iter().any(|(path, _)| *path == "oflike/common.wgsl"));
        assert!(modules.iter().any(|(path, _)| *path == "oflike/lighting.wgsl"));
    }

    #[test]
    fn test_custom_module() {
        let library = ShaderLibrary::empty().with_module("custom/one.wgsl", "const ONE: f32 = 1.0;");
        assert_eq!(library.modules().count(), 1);
    }

    #[test]
    fn test_module_contents() {
        assert!(COMMON_MODULE.contains("struct Camera"));
        assert!(COMMON_MODULE.contains("var<uniform> object_data"));
        assert!(LIGHTING_MODULE.contains("fn shade"));
        assert!(LIGHTING_MODULE.contains("const MAX_LIGHTS: u32 = 8u;"));
        assert!(SHADER_2D_SOURCE.contains("#include \"oflike/common.wgsl\""));
        assert!(SHADER_3D_SOURCE.contains("#include \"oflike/lighting.wgsl\""));
    }
}
