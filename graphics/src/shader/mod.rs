//! Shader composition and the built-in WGSL library.
//!
//! - [`ShaderComposer`] - Resolves `#include` directives and validates the
//!   result with naga
//! - [`ShaderLibrary`] - Modules available for inclusion
//! - [`CameraUniforms`] / [`ObjectUniforms`] - Host mirrors of the shared
//!   uniform blocks
//!
//! ```ignore
//! use oflike_graphics::shader::{ShaderComposer, SHADER_3D_SOURCE};
//!
//! let composer = ShaderComposer::with_standard_library();
//! let module = composer.compose("draw_3d", SHADER_3D_SOURCE)?;
//! assert!(module.entry_points.iter().any(|ep| ep.name == "fs_lit"));
//! ```

pub mod library;

use std::collections::{HashMap, HashSet};

use oflike_core::math::{Mat4, mat4_to_cols_array_2d};
use static_assertions::assert_eq_size;

use crate::error::GraphicsError;
use crate::profiling::profile_scope;

pub use library::{SHADER_2D_SOURCE, SHADER_3D_SOURCE, ShaderLibrary};

/// Resolves includes and turns WGSL into a validated naga module.
///
/// ```wgsl
/// #include "oflike/common.wgsl"
/// #include "oflike/lighting.wgsl"
/// ```
///
/// Every path is expanded at most once per composition, so modules may be
/// included from several places.
pub struct ShaderComposer {
    /// Registered include sources: path -> source text.
    includes: HashMap<String, String>,
}

impl Default for ShaderComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderComposer {
    pub fn new() -> Self {
        Self {
            includes: HashMap::new(),
        }
    }

    /// Create a composer with the standard library pre-loaded.
    pub fn with_standard_library() -> Self {
        let mut composer = Self::new();
        composer.add_library(&ShaderLibrary::standard());
        composer
    }

    /// Make every module in `library` available for `#include`.
    pub fn add_library(&mut self, library: &ShaderLibrary) {
        for (path, source) in library.modules() {
            self.register_include(path, source);
        }
    }

    /// Register a single include source under `path`.
    pub fn register_include(&mut self, path: &str, source: &str) {
        self.includes.insert(path.to_string(), source.to_string());
    }

    /// Expand all `#include` directives in `source`.
    pub fn resolve(&self, name: &'static str, source: &str) -> Result<String, GraphicsError> {
        let mut included = HashSet::new();
        self.resolve_includes(name, source, &mut included)
    }

    /// Resolve includes, parse the WGSL and validate the module.
    pub fn compose(&self, name: &'static str, source: &str) -> Result<naga::Module, GraphicsError> {
        profile_scope!("shader_compose");

        let resolved = self.resolve(name, source)?;
        let module = naga::front::wgsl::parse_str(&resolved).map_err(|e| GraphicsError::Shader {
            name,
            message: e.emit_to_string(&resolved),
        })?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| GraphicsError::Shader {
                name,
                message: format!("validation error: {e}"),
            })?;

        log::debug!(
            "composed shader '{}' ({} entry points)",
            name,
            module.entry_points.len()
        );
        Ok(module)
    }

    /// Resolve `#include "path"` directives recursively.
    fn resolve_includes(
        &self,
        name: &'static str,
        source: &str,
        included: &mut HashSet<String>,
    ) -> Result<String, GraphicsError> {
        let mut result = String::with_capacity(source.len());

        for line in source.lines() {
            let trimmed = line.trim();
            if let Some(path) = parse_include_directive(trimmed) {
                if !included.insert(path.to_string()) {
                    continue;
                }

                let include_source = self.includes.get(path).ok_or_else(|| GraphicsError::Shader {
                    name,
                    message: format!("include not found: \"{path}\""),
                })?;

                let resolved = self.resolve_includes(name, include_source, included)?;
                result.push_str(&resolved);
                result.push('\n');
            } else {
                result.push_str(line);
                result.push('\n');
            }
        }

        Ok(result)
    }
}

/// Parse a `#include "path"` directive, returning the path if found.
fn parse_include_directive(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("#include")?;
    let rest = rest.trim();
    if let Some(inner) = rest.strip_prefix('"') {
        inner.strip_suffix('"')
    } else if let Some(inner) = rest.strip_prefix('<') {
        inner.strip_suffix('>')
    } else {
        None
    }
}

// ============================================================================
// Shared uniform blocks
// ============================================================================

/// The shader's `Camera` block (slot 0).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

impl CameraUniforms {
    pub fn new(view: &Mat4, projection: &Mat4) -> Self {
        Self {
            view: mat4_to_cols_array_2d(view),
            projection: mat4_to_cols_array_2d(projection),
        }
    }
}

/// The shader's `Object` block (slot 1).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
}

impl ObjectUniforms {
    pub fn new(model: &Mat4) -> Self {
        Self {
            model: mat4_to_cols_array_2d(model),
        }
    }
}

assert_eq_size!(CameraUniforms, [u8; 128]);
assert_eq_size!(ObjectUniforms, [u8; 64]);
