//! # oflike core
//!
//! CPU-side building blocks shared by the oflike crates: math helpers,
//! colors, vertex formats, meshes and their generators, PLY I/O, materials
//! and lights.

pub mod color;
pub mod light;
pub mod material;
pub mod math;
pub mod mesh;
pub mod profiling;

pub use color::Color;
pub use light::{Light, LightKind};
pub use material::Material;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn init() {
    log::info!("oflike core v{} initialized", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
