//! Placed objects and orbiting cameras.

use oflike_core::math::nalgebra::Unit;
use oflike_core::math::{Mat4, Quat, Vec3, mat4_scaling, mat4_translation};

use crate::camera::Camera;
use crate::context::Graphics;

/// Position, orientation and scale of something in the scene.
///
/// The local transform is `T * R * S`. Looking direction is -Z, up is +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub position: Vec3,
    pub orientation: Quat,
    pub scale: Vec3,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            orientation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Node {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn move_by(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Rotate about an axis given in parent space. A zero axis does nothing.
    pub fn rotate_deg(&mut self, degrees: f32, axis: Vec3) {
        if let Some(axis) = Unit::try_new(axis, f32::EPSILON) {
            self.orientation = Quat::from_axis_angle(&axis, degrees.to_radians()) * self.orientation;
        }
    }

    fn rotate_local(&mut self, degrees: f32, axis: Unit<Vec3>) {
        self.orientation *= Quat::from_axis_angle(&axis, degrees.to_radians());
    }

    /// Rotate about the node's own X axis.
    pub fn tilt_deg(&mut self, degrees: f32) {
        self.rotate_local(degrees, Vec3::x_axis());
    }

    /// Rotate about the node's own Y axis.
    pub fn pan_deg(&mut self, degrees: f32) {
        self.rotate_local(degrees, Vec3::y_axis());
    }

    /// Rotate about the node's own Z axis.
    pub fn roll_deg(&mut self, degrees: f32) {
        self.rotate_local(degrees, Vec3::z_axis());
    }

    pub fn x_axis(&self) -> Vec3 {
        self.orientation * Vec3::x()
    }

    pub fn y_axis(&self) -> Vec3 {
        self.orientation * Vec3::y()
    }

    pub fn z_axis(&self) -> Vec3 {
        self.orientation * Vec3::z()
    }

    pub fn look_at_dir(&self) -> Vec3 {
        -self.z_axis()
    }

    /// Turn so -Z points at `target`. Nothing happens when `target` is the
    /// node's own position.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let back = self.position - target;
        if back.norm() <= f32::EPSILON {
            return;
        }
        self.orientation = Quat::face_towards(&back, &up);
    }

    /// Place the node on a sphere around `center`: `longitude` turns about
    /// +Y from +Z, `latitude` lifts towards +Y. The node then looks at
    /// `center`.
    pub fn orbit_deg(&mut self, longitude: f32, latitude: f32, radius: f32, center: Vec3) {
        self.position = center + spherical(longitude, latitude, radius);
        self.look_at(center, Vec3::y());
    }

    pub fn local_transform(&self) -> Mat4 {
        let [x, y, z] = [self.position.x, self.position.y, self.position.z];
        mat4_translation(x, y, z)
            * self.orientation.to_homogeneous()
            * mat4_scaling(self.scale.x, self.scale.y, self.scale.z)
    }
}

fn spherical(longitude: f32, latitude: f32, radius: f32) -> Vec3 {
    let (lon, lat) = (longitude.to_radians(), latitude.to_radians());
    Vec3::new(
        radius * lat.cos() * lon.sin(),
        radius * lat.sin(),
        radius * lat.cos() * lon.cos(),
    )
}

/// A camera circling a target point, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    /// Turn about +Y, measured from +Z.
    pub longitude: f32,
    /// Height above the horizontal plane.
    pub latitude: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Latitude stays within `-max_latitude..=max_latitude`.
    pub max_latitude: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,
}

impl OrbitCamera {
    pub fn new(target: Vec3, distance: f32) -> Self {
        Self {
            target,
            distance,
            longitude: 0.0,
            latitude: 0.0,
            min_distance: 1.0,
            max_distance: 10_000.0,
            max_latitude: 89.0,
            fov: 60.0,
        }
    }

    pub fn with_angles(mut self, longitude: f32, latitude: f32) -> Self {
        self.longitude = longitude;
        self.latitude = latitude.clamp(-self.max_latitude, self.max_latitude);
        self
    }

    pub fn with_distance_range(mut self, min: f32, max: f32) -> Self {
        self.min_distance = min;
        self.max_distance = max;
        self.distance = self.distance.clamp(min, max);
        self
    }

    /// Jump to a new orbit around `target`.
    pub fn orbit(&mut self, longitude: f32, latitude: f32, distance: f32, target: Vec3) {
        self.target = target;
        self.longitude = longitude;
        self.latitude = latitude.clamp(-self.max_latitude, self.max_latitude);
        self.distance = distance.clamp(self.min_distance, self.max_distance);
    }

    /// Turn by angle deltas, e.g. from a mouse drag.
    pub fn rotate(&mut self, delta_longitude: f32, delta_latitude: f32) {
        self.longitude = (self.longitude + delta_longitude) % 360.0;
        self.latitude =
            (self.latitude + delta_latitude).clamp(-self.max_latitude, self.max_latitude);
    }

    /// Positive values move closer.
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance - delta).clamp(self.min_distance, self.max_distance);
    }

    pub fn position(&self) -> Vec3 {
        self.target + spherical(self.longitude, self.latitude, self.distance)
    }

    pub fn camera(&self) -> Camera {
        Camera::new(self.position(), self.target).with_fov(self.fov)
    }

    pub fn node(&self) -> Node {
        let mut node = Node::default();
        node.orbit_deg(self.longitude, self.latitude, self.distance, self.target);
        node
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(Vec3::zeros(), 500.0)
    }
}

impl Graphics {
    /// Save the matrix and compose `node`'s transform onto it. Undo with
    /// [`pop_matrix`](Self::pop_matrix).
    pub fn transform_node(&mut self, node: &Node) {
        self.push_matrix();
        self.mult_matrix(node.local_transform());
    }
}
