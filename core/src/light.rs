//! Light sources.

use crate::color::Color;
use crate::math::Vec3;

/// Light source kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LightKind {
    /// Omnidirectional light at a position.
    #[default]
    Point,
    /// Infinitely distant light along a direction.
    Directional,
    /// Cone of light from a position along a direction.
    Spot,
}

impl LightKind {
    /// Value stored in the shader's light type field.
    pub fn shader_id(&self) -> u32 {
        match self {
            LightKind::Point => 0,
            LightKind::Directional => 1,
            LightKind::Spot => 2,
        }
    }
}

/// A light source. Position and direction are in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub position: Vec3,
    pub direction: Vec3,
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    /// Constant, linear and quadratic distance falloff.
    pub attenuation: [f32; 3],
    /// Half angle of the spot cone in degrees.
    pub spot_cutoff: f32,
    pub spot_concentration: f32,
    pub enabled: bool,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            kind: LightKind::Point,
            position: Vec3::zeros(),
            direction: Vec3::new(0.0, 0.0, -1.0),
            ambient: Color::BLACK,
            diffuse: Color::WHITE,
            specular: Color::WHITE,
            attenuation: [1.0, 0.0, 0.0],
            spot_cutoff: 45.0,
            spot_concentration: 0.0,
            enabled: false,
        }
    }
}

impl Light {
    pub fn point(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn directional(direction: Vec3) -> Self {
        let mut light = Self {
            kind: LightKind::Directional,
            ..Default::default()
        };
        light.set_direction(direction);
        light
    }

    pub fn spot(position: Vec3, direction: Vec3, cutoff: f32, concentration: f32) -> Self {
        let mut light = Self::point(position);
        light.set_direction(direction);
        light.set_spotlight(cutoff, concentration);
        light
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_point_light(&mut self) {
        self.kind = LightKind::Point;
    }

    pub fn set_directional(&mut self) {
        self.kind = LightKind::Directional;
    }

    /// Turn this light into a spot light with the given cone.
    pub fn set_spotlight(&mut self, cutoff: f32, concentration: f32) {
        self.kind = LightKind::Spot;
        self.spot_cutoff = cutoff;
        self.spot_concentration = concentration;
    }

    pub fn set_attenuation(&mut self, constant: f32, linear: f32, quadratic: f32) {
        self.attenuation = [constant, linear, quadratic];
    }

    /// Set the direction. A zero vector leaves the direction unchanged.
    pub fn set_direction(&mut self, direction: Vec3) {
        if let Some(dir) = direction.try_normalize(f32::EPSILON) {
            self.direction = dir;
        }
    }

    /// Point the light at `target` from its current position.
    pub fn look_at(&mut self, target: Vec3) {
        self.set_direction(target - self.position);
    }

    pub fn with_colors(mut self, ambient: Color, diffuse: Color, specular: Color) -> Self {
        self.ambient = ambient;
        self.diffuse = diffuse;
        self.specular = specular;
        self
    }

    pub fn enabled(mut self) -> Self {
        self.enabled = true;
        self
    }
}
