//! Light registry and uniform packing for lit 3D draws.
//!
//! Lights live in one of [`MAX_LIGHTS`] registry slots. When a 3D draw is
//! recorded the enabled lights are copied into a [`LightSnapshot`] and
//! interned in the draw list, so later edits to a light never change
//! commands that were already recorded. At walk time the renderer packs the
//! snapshot into [`LightingUniforms`] and the material into
//! [`MaterialUniforms`].

use oflike_core::math::{Mat4, mat4_to_cols_array_2d};
use oflike_core::{Color, Light, Material};
use static_assertions::{assert_eq_size, const_assert_eq};

/// Maximum number of simultaneous lights.
pub const MAX_LIGHTS: usize = 8;

/// Index of a registry slot, `0..MAX_LIGHTS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LightSlot(u8);

impl LightSlot {
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    pub fn bit(&self) -> u8 {
        1 << self.0
    }
}

/// Fixed-size table of lights.
#[derive(Debug, Clone, Default)]
pub struct LightRegistry {
    slots: [Option<Light>; MAX_LIGHTS],
}

impl LightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `light` in the first free slot. Returns `None` when all slots
    /// are taken.
    pub fn register(&mut self, light: Light) -> Option<LightSlot> {
        let index = self.slots.iter().position(Option::is_none)?;
        self.slots[index] = Some(light);
        log::debug!("registered light in slot {}", index);
        Some(LightSlot(index as u8))
    }

    /// Remove a light, freeing its slot.
    pub fn unregister(&mut self, slot: LightSlot) -> Option<Light> {
        self.slots.get_mut(slot.index()).and_then(Option::take)
    }

    pub fn get(&self, slot: LightSlot) -> Option<&Light> {
        self.slots.get(slot.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, slot: LightSlot) -> Option<&mut Light> {
        self.slots.get_mut(slot.index()).and_then(Option::as_mut)
    }

    /// Enable a registered light. Returns `false` for an empty slot.
    pub fn enable(&mut self, slot: LightSlot) -> bool {
        self.get_mut(slot).map(|l| l.enable()).is_some()
    }

    /// Disable a registered light. Returns `false` for an empty slot.
    pub fn disable(&mut self, slot: LightSlot) -> bool {
        self.get_mut(slot).map(|l| l.disable()).is_some()
    }

    /// Bitmask of slots holding an enabled light.
    pub fn active_mask(&self) -> u8 {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, l)| l.as_ref().is_some_and(Light::is_enabled))
            .fold(0u8, |mask, (i, _)| mask | (1 << i))
    }

    pub fn active_count(&self) -> usize {
        self.active_mask().count_ones() as usize
    }

    /// Copy of the enabled lights.
    pub fn snapshot(&self) -> LightSnapshot {
        let mut snapshot = LightSnapshot::default();
        for (i, light) in self.slots.iter().enumerate() {
            if let Some(light) = light.filter(Light::is_enabled) {
                snapshot.lights[i] = Some(light);
            }
        }
        snapshot
    }

    pub fn clear(&mut self) {
        self.slots = Default::default();
    }
}

/// Enabled lights at the moment a draw was recorded, by slot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LightSnapshot {
    lights: [Option<Light>; MAX_LIGHTS],
}

impl LightSnapshot {
    pub fn mask(&self) -> u8 {
        self.lights
            .iter()
            .enumerate()
            .filter(|(_, l)| l.is_some())
            .fold(0u8, |mask, (i, _)| mask | (1 << i))
    }

    pub fn is_empty(&self) -> bool {
        self.lights.iter().all(Option::is_none)
    }

    /// Lights in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Light> {
        self.lights.iter().flatten()
    }
}

// ============================================================================
// Uniform blocks
// ============================================================================

/// One light as laid out in the shader's `Light` struct.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    /// World position, `w = 0` for directional lights.
    pub position: [f32; 4],
    pub direction: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    /// Constant, linear, quadratic, unused.
    pub attenuation: [f32; 4],
    /// Cosine of the cutoff, concentration, kind, unused.
    pub spot: [f32; 4],
}

impl From<&Light> for LightUniform {
    fn from(light: &Light) -> Self {
        let w = if light.kind == oflike_core::LightKind::Directional {
            0.0
        } else {
            1.0
        };
        let [c, l, q] = light.attenuation;
        Self {
            position: [light.position.x, light.position.y, light.position.z, w],
            direction: [light.direction.x, light.direction.y, light.direction.z, 0.0],
            ambient: light.ambient.to_array(),
            diffuse: light.diffuse.to_array(),
            specular: light.specular.to_array(),
            attenuation: [c, l, q, 0.0],
            spot: [
                light.spot_cutoff.to_radians().cos(),
                light.spot_concentration,
                light.kind.shader_id() as f32,
                0.0,
            ],
        }
    }
}

/// The shader's `Lighting` block.
///
/// Lights are in world space; the shader moves them to view space with
/// `view`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniforms {
    pub view: [[f32; 4]; 4],
    pub lights: [LightUniform; MAX_LIGHTS],
    pub light_count: u32,
    pub _pad: [u32; 3],
    pub global_ambient: [f32; 4],
}

impl LightingUniforms {
    /// Pack `snapshot` in slot order.
    pub fn pack(snapshot: &LightSnapshot, view: &Mat4, global_ambient: Color) -> Self {
        let mut uniforms: Self = bytemuck::Zeroable::zeroed();
        uniforms.view = mat4_to_cols_array_2d(view);
        for (packed, light) in uniforms.lights.iter_mut().zip(snapshot.iter()) {
            *packed = LightUniform::from(light);
            uniforms.light_count += 1;
        }
        uniforms.global_ambient = global_ambient.to_array();
        uniforms
    }
}

/// The shader's `Material` block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniforms {
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub emissive: [f32; 4],
    pub shininess: f32,
    pub _pad: [f32; 3],
}

impl From<&Material> for MaterialUniforms {
    fn from(material: &Material) -> Self {
        Self {
            ambient: material.ambient.to_array(),
            diffuse: material.diffuse.to_array(),
            specular: material.specular.to_array(),
            emissive: material.emissive.to_array(),
            shininess: material.shininess,
            _pad: [0.0; 3],
        }
    }
}

assert_eq_size!(LightUniform, [u8; 112]);
assert_eq_size!(MaterialUniforms, [u8; 80]);
const_assert_eq!(std::mem::size_of::<LightingUniforms>(), 64 + 112 * MAX_LIGHTS + 32);
const_assert_eq!(std::mem::size_of::<LightingUniforms>() % 16, 0);
