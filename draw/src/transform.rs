//! Matrix stacks for 2D and 3D drawing.
//!
//! A stack has one mutable top. [`push`](TransformStack::push) saves a copy
//! of the top and [`pop`](TransformStack::pop) restores it. Every operation
//! composes on the right, so it acts in the current local frame.

use oflike_core::math::{
    Affine2, Mat4, Vec3, mat4_rotation_degrees, mat4_scaling, mat4_translation,
};

/// Values a [`TransformStack`] can hold.
pub trait Transform: Copy + PartialEq + std::fmt::Debug {
    fn identity() -> Self;

    /// `self * rhs`.
    fn then(&self, rhs: &Self) -> Self;
}

impl Transform for Affine2 {
    fn identity() -> Self {
        Affine2::IDENTITY
    }

    fn then(&self, rhs: &Self) -> Self {
        self.compose(rhs)
    }
}

impl Transform for Mat4 {
    fn identity() -> Self {
        Mat4::identity()
    }

    fn then(&self, rhs: &Self) -> Self {
        self * rhs
    }
}

/// Stack of saved transforms plus the current one.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformStack<T: Transform> {
    top: T,
    saved: Vec<T>,
}

impl<T: Transform> Default for TransformStack<T> {
    fn default() -> Self {
        Self {
            top: T::identity(),
            saved: Vec::new(),
        }
    }
}

impl<T: Transform> TransformStack<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn top(&self) -> &T {
        &self.top
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn push(&mut self) {
        self.saved.push(self.top);
    }

    /// Restore the last pushed transform. Returns `false`, leaving the top
    /// unchanged, when nothing was pushed.
    pub fn pop(&mut self) -> bool {
        match self.saved.pop() {
            Some(top) => {
                self.top = top;
                true
            }
            None => false,
        }
    }

    /// Compose `transform` onto the top in the local frame.
    pub fn multiply(&mut self, transform: &T) {
        self.top = self.top.then(transform);
    }

    /// Replace the top without touching saved entries.
    pub fn load(&mut self, transform: T) {
        self.top = transform;
    }

    /// Identity top, empty stack.
    pub fn reset(&mut self) {
        self.top = T::identity();
        self.saved.clear();
    }
}

pub type TransformStack2D = TransformStack<Affine2>;
pub type TransformStack3D = TransformStack<Mat4>;

impl TransformStack2D {
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.multiply(&Affine2::translation(dx, dy));
    }

    /// Positive angles turn clockwise on a +Y down screen.
    pub fn rotate(&mut self, degrees: f32) {
        self.multiply(&Affine2::rotation_degrees(degrees));
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.multiply(&Affine2::scaling(sx, sy));
    }

    /// Map a local point to screen space.
    pub fn apply(&self, x: f32, y: f32) -> [f32; 2] {
        self.top.apply(x, y)
    }
}

impl TransformStack3D {
    pub fn translate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.multiply(&mat4_translation(dx, dy, dz));
    }

    pub fn rotate(&mut self, degrees: f32, axis: Vec3) {
        self.multiply(&mat4_rotation_degrees(degrees, axis));
    }

    pub fn scale(&mut self, sx: f32, sy: f32, sz: f32) {
        self.multiply(&mat4_scaling(sx, sy, sz));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oflike_core::math::mat4_approx_eq;

    #[test]
    fn test_pop_restores_pushed_value() {
        let mut stack = TransformStack2D::new();
        stack.translate(3.0, 4.0);
        let before = *stack.top();
        stack.push();
        stack.rotate(33.0);
        stack.scale(2.0, 0.5);
        stack.push();
        stack.translate(-1.0, 1.0);
        assert!(stack.pop());
        assert!(stack.pop());
        assert_eq!(*stack.top(), before);
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_pop_empty_is_noop() {
        let mut stack = TransformStack3D::new();
        stack.translate(1.0, 2.0, 3.0);
        let top = *stack.top();
        assert!(!stack.pop());
        assert_eq!(*stack.top(), top);
    }

    #[test]
    fn test_operations_compose_in_local_frame() {
        let mut stack = TransformStack2D::new();
        stack.translate(10.0, 0.0);
        stack.scale(2.0, 2.0);
        let p = stack.apply(1.0, 1.0);
        assert_eq!(p, [12.0, 2.0]);
    }

    #[test]
    fn test_rotate_back_returns_identity() {
        let mut stack = TransformStack3D::new();
        let axis = Vec3::new(0.3, -1.0, 0.5);
        stack.rotate(71.0, axis);
        stack.rotate(-71.0, axis);
        assert!(mat4_approx_eq(stack.top(), &Mat4::identity(), 1e-5));
    }

    #[test]
    fn test_reset() {
        let mut stack = TransformStack3D::new();
        stack.push();
        stack.scale(2.0, 2.0, 2.0);
        stack.reset();
        assert_eq!(*stack.top(), Mat4::identity());
        assert_eq!(stack.depth(), 0);
    }
}
