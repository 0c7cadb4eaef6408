//! Perspective cameras and the scope that applies one.

use std::ops::{Deref, DerefMut};

use oflike_core::math::{Mat4, Vec3, look_at_rh, perspective_rh};
use oflike_graphics::DrawCommand;

use crate::context::Graphics;

/// A perspective camera looking from `position` at `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 500.0),
            target: Vec3::zeros(),
            up: Vec3::y(),
            fov: 60.0,
            near: 1.0,
            far: 10_000.0,
        }
    }
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            ..Default::default()
        }
    }

    pub fn with_fov(mut self, degrees: f32) -> Self {
        self.fov = degrees;
        self
    }

    pub fn with_clip_planes(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn view(&self) -> Mat4 {
        look_at_rh(&self.position, &self.target, &self.up)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        let fov = self.fov.clamp(1.0, 179.0).to_radians();
        let near = self.near.max(f32::EPSILON);
        let far = self.far.max(near * 2.0);
        perspective_rh(fov, aspect.max(f32::EPSILON), near, far)
    }
}

/// Active camera. Dereferences to the [`Graphics`] context; dropping it
/// (or calling [`end`](Self::end)) restores the previous camera and model
/// matrix.
pub struct CameraScope<'a> {
    graphics: &'a mut Graphics,
    previous: Option<Camera>,
}

impl Graphics {
    /// Draw the following 3D content through `camera`.
    ///
    /// The model matrix starts from identity inside the scope.
    pub fn begin_camera(&mut self, camera: &Camera) -> CameraScope<'_> {
        let previous = self.camera.replace(*camera);
        self.matrix_3d.push();
        self.matrix_3d.load(Mat4::identity());
        let (view, projection) = self.camera_matrices(Some(camera));
        self.push_command(DrawCommand::SetCamera { view, projection });
        CameraScope {
            graphics: self,
            previous,
        }
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }
}

impl CameraScope<'_> {
    pub fn end(self) {}
}

impl Deref for CameraScope<'_> {
    type Target = Graphics;

    fn deref(&self) -> &Graphics {
        self.graphics
    }
}

impl DerefMut for CameraScope<'_> {
    fn deref_mut(&mut self) -> &mut Graphics {
        self.graphics
    }
}

impl Drop for CameraScope<'_> {
    fn drop(&mut self) {
        let g = &mut *self.graphics;
        g.matrix_3d.pop();
        g.camera = self.previous;
        let (view, projection) = g.camera_matrices(self.previous.as_ref());
        g.push_command(DrawCommand::SetCamera { view, projection });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oflike_core::math::{mat4_approx_eq, screen_perspective, transform_point};

    #[test]
    fn test_view_moves_eye_to_origin() {
        let camera = Camera::new(Vec3::new(0.0, 2.0, 10.0), Vec3::zeros());
        let eye = transform_point(&camera.view(), [0.0, 2.0, 10.0]);
        assert!(eye.iter().all(|c| c.abs() < 1e-5));
    }

    #[test]
    fn test_scope_emits_and_restores_camera() {
        let mut g = Graphics::default();
        g.set_background_auto(false);
        g.begin_frame();
        g.translate_3d(5.0, 0.0, 0.0);
        let model = *g.model_matrix();
        {
            let mut scope = g.begin_camera(&Camera::default());
            assert_eq!(*scope.model_matrix(), Mat4::identity());
            scope.draw_box(1.0, 1.0, 1.0);
        }
        assert_eq!(*g.model_matrix(), model);
        assert!(g.camera().is_none());

        let commands = g.list().commands();
        assert_eq!(commands.len(), 3);
        let DrawCommand::SetCamera { view, projection } = commands[2] else {
            panic!("expected camera reset, got {:?}", commands[2]);
        };
        let (default_view, default_projection) = screen_perspective(1024.0, 768.0, 60.0);
        assert!(mat4_approx_eq(&view, &default_view, 1e-4));
        assert!(mat4_approx_eq(&projection, &default_projection, 1e-4));
    }

    #[test]
    fn test_nested_cameras() {
        let outer = Camera::new(Vec3::new(0.0, 0.0, 100.0), Vec3::zeros());
        let inner = Camera::new(Vec3::new(100.0, 0.0, 0.0), Vec3::zeros());
        let mut g = Graphics::default();
        g.begin_frame();
        {
            let mut a = g.begin_camera(&outer);
            {
                let b = a.begin_camera(&inner);
                assert_eq!(b.camera(), Some(&inner));
                b.end();
            }
            assert_eq!(a.camera(), Some(&outer));
        }
        assert_eq!(g.camera(), None);
    }
}
