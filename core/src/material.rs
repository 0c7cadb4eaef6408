//! Phong surface material.

use crate::color::Color;

/// Surface response to lighting.
///
/// Materials are plain values. A draw captures the material current at
/// record time, so editing a material afterwards does not affect commands
/// already recorded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub emissive: Color,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Color::new(0.2, 0.2, 0.2, 1.0),
            diffuse: Color::new(0.8, 0.8, 0.8, 1.0),
            specular: Color::new(0.0, 0.0, 0.0, 1.0),
            emissive: Color::new(0.0, 0.0, 0.0, 1.0),
            shininess: 0.2,
        }
    }
}

impl Material {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ambient(mut self, color: Color) -> Self {
        self.ambient = color;
        self
    }

    pub fn with_diffuse(mut self, color: Color) -> Self {
        self.diffuse = color;
        self
    }

    pub fn with_specular(mut self, color: Color) -> Self {
        self.specular = color;
        self
    }

    pub fn with_emissive(mut self, color: Color) -> Self {
        self.emissive = color;
        self
    }

    /// Specular exponent. Negative values are clamped to zero.
    pub fn with_shininess(mut self, shininess: f32) -> Self {
        self.shininess = shininess.max(0.0);
        self
    }

    /// Set all four colors at once.
    pub fn set_colors(&mut self, diffuse: Color, ambient: Color, specular: Color, emissive: Color) {
        self.diffuse = diffuse;
        self.ambient = ambient;
        self.specular = specular;
        self.emissive = emissive;
    }
}
