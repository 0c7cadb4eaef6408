//! Scoped materials.

use std::ops::{Deref, DerefMut};

use oflike_core::Material;

use crate::context::Graphics;

/// Active material. Dereferences to the [`Graphics`] context; dropping it
/// (or calling [`end`](Self::end)) restores the previous material.
pub struct MaterialScope<'a> {
    graphics: &'a mut Graphics,
    previous: Material,
}

impl Graphics {
    /// Use `material` for 3D draws until the returned scope ends.
    ///
    /// Draws capture the material by value, so editing the original
    /// afterwards does not change what was recorded.
    pub fn begin_material(&mut self, material: &Material) -> MaterialScope<'_> {
        let previous = std::mem::replace(&mut self.material, *material);
        MaterialScope {
            graphics: self,
            previous,
        }
    }
}

impl MaterialScope<'_> {
    pub fn end(self) {}
}

impl Deref for MaterialScope<'_> {
    type Target = Graphics;

    fn deref(&self) -> &Graphics {
        self.graphics
    }
}

impl DerefMut for MaterialScope<'_> {
    fn deref_mut(&mut self) -> &mut Graphics {
        self.graphics
    }
}

impl Drop for MaterialScope<'_> {
    fn drop(&mut self) {
        self.graphics.material = self.previous;
    }
}
