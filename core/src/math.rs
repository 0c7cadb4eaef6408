//! Math type aliases and helper functions.
//!
//! 3D math uses nalgebra types (f32). 2D transforms use the compact
//! [`Affine2`] so that CPU-side pre-transformation of 2D geometry stays cheap.
//! Angles passed to the public helpers are in degrees.

pub use nalgebra;

/// 2D vector (f32).
pub type Vec2 = nalgebra::Vector2<f32>;

/// 3D vector (f32).
pub type Vec3 = nalgebra::Vector3<f32>;

/// 4D vector (f32).
pub type Vec4 = nalgebra::Vector4<f32>;

/// 3x3 matrix (f32).
pub type Mat3 = nalgebra::Matrix3<f32>;

/// 4x4 matrix (f32).
pub type Mat4 = nalgebra::Matrix4<f32>;

/// Unit quaternion rotation (f32).
pub type Quat = nalgebra::UnitQuaternion<f32>;

/// A 2D affine transform stored as six scalars.
///
/// Maps `(x, y)` to `(a*x + c*y + tx, b*x + d*y + ty)`, i.e. the matrix
///
/// ```text
/// | a  c  tx |
/// | b  d  ty |
/// | 0  0  1  |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine2 {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Affine2 {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// Pure translation.
    pub fn translation(dx: f32, dy: f32) -> Self {
        Self {
            tx: dx,
            ty: dy,
            ..Self::IDENTITY
        }
    }

    /// Rotation about the origin. Positive angles turn +X towards +Y, which
    /// is clockwise on screen because 2D space is Y-down.
    pub fn rotation_degrees(degrees: f32) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        Self {
            a: c,
            b: s,
            c: -s,
            d: c,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Non-uniform scale about the origin.
    pub fn scaling(sx: f32, sy: f32) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    /// Returns `self * rhs`: `rhs` is applied first, then `self`.
    pub fn compose(&self, rhs: &Affine2) -> Affine2 {
        Affine2 {
            a: self.a * rhs.a + self.c * rhs.b,
            b: self.b * rhs.a + self.d * rhs.b,
            c: self.a * rhs.c + self.c * rhs.d,
            d: self.b * rhs.c + self.d * rhs.d,
            tx: self.a * rhs.tx + self.c * rhs.ty + self.tx,
            ty: self.b * rhs.tx + self.d * rhs.ty + self.ty,
        }
    }

    /// Transform a point.
    #[inline]
    pub fn apply(&self, x: f32, y: f32) -> [f32; 2] {
        [
            self.a * x + self.c * y + self.tx,
            self.b * x + self.d * y + self.ty,
        ]
    }

    /// Transform a direction (translation ignored).
    #[inline]
    pub fn apply_vector(&self, x: f32, y: f32) -> [f32; 2] {
        [self.a * x + self.c * y, self.b * x + self.d * y]
    }

    /// Determinant of the linear part.
    pub fn determinant(&self) -> f32 {
        self.a * self.d - self.b * self.c
    }

    /// Inverse transform, or `None` if the linear part is singular.
    pub fn inverse(&self) -> Option<Affine2> {
        let det = self.determinant();
        if det.abs() <= f32::EPSILON {
            return None;
        }
        let inv = 1.0 / det;
        let a = self.d * inv;
        let b = -self.b * inv;
        let c = -self.c * inv;
        let d = self.a * inv;
        Some(Affine2 {
            a,
            b,
            c,
            d,
            tx: -(a * self.tx + c * self.ty),
            ty: -(b * self.tx + d * self.ty),
        })
    }

    /// Whether every component is within `eps` of `other`.
    pub fn approx_eq(&self, other: &Affine2, eps: f32) -> bool {
        (self.a - other.a).abs() <= eps
            && (self.b - other.b).abs() <= eps
            && (self.c - other.c).abs() <= eps
            && (self.d - other.d).abs() <= eps
            && (self.tx - other.tx).abs() <= eps
            && (self.ty - other.ty).abs() <= eps
    }

    /// Whether this is exactly the identity.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Length scale factor along the transformed axes, used to size
    /// tessellation in screen space.
    pub fn max_scale(&self) -> f32 {
        let sx = (self.a * self.a + self.b * self.b).sqrt();
        let sy = (self.c * self.c + self.d * self.d).sqrt();
        sx.max(sy)
    }

    /// Expand into a 4x4 matrix acting on the XY plane.
    pub fn to_mat4(&self) -> Mat4 {
        #[rustfmt::skip]
        let m = Mat4::new(
            self.a, self.c, 0.0, self.tx,
            self.b, self.d, 0.0, self.ty,
            0.0,    0.0,    1.0, 0.0,
            0.0,    0.0,    0.0, 1.0,
        );
        m
    }

    /// The XY part of `m`. Z terms and projection are dropped.
    pub fn from_mat4(m: &Mat4) -> Self {
        Self {
            a: m[(0, 0)],
            b: m[(1, 0)],
            c: m[(0, 1)],
            d: m[(1, 1)],
            tx: m[(0, 3)],
            ty: m[(1, 3)],
        }
    }
}

impl Default for Affine2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl std::ops::Mul for Affine2 {
    type Output = Affine2;

    fn mul(self, rhs: Affine2) -> Affine2 {
        self.compose(&rhs)
    }
}

/// Translation-only 4x4 matrix.
pub fn mat4_translation(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::new_translation(&Vec3::new(x, y, z))
}

/// Rotation of `degrees` about `axis`. A zero axis yields the identity.
pub fn mat4_rotation_degrees(degrees: f32, axis: Vec3) -> Mat4 {
    let Some(axis) = nalgebra::Unit::try_new(axis, f32::EPSILON) else {
        return Mat4::identity();
    };
    nalgebra::Rotation3::from_axis_angle(&axis, degrees.to_radians()).to_homogeneous()
}

/// Non-uniform scale 4x4 matrix.
pub fn mat4_scaling(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::new_nonuniform_scaling(&Vec3::new(x, y, z))
}

/// Build a right-handed perspective projection with depth range [0, 1] (wgpu convention).
pub fn perspective_rh(yfov: f32, aspect: f32, znear: f32, zfar: f32) -> Mat4 {
    let f = 1.0 / (yfov / 2.0).tan();
    let nf = 1.0 / (znear - zfar);
    #[rustfmt::skip]
    let result = Mat4::new(
        f / aspect, 0.0,  0.0,              0.0,
        0.0,        f,    0.0,              0.0,
        0.0,        0.0,  zfar * nf,        znear * zfar * nf,
        0.0,        0.0,  -1.0,             0.0,
    );
    result
}

/// Build a right-handed orthographic projection with depth range [0, 1] (wgpu convention).
pub fn orthographic_rh(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let rml = right - left;
    let tmb = top - bottom;
    let fmn = far - near;
    #[rustfmt::skip]
    let result = Mat4::new(
        2.0 / rml, 0.0,       0.0,         -(right + left) / rml,
        0.0,       2.0 / tmb, 0.0,         -(top + bottom) / tmb,
        0.0,       0.0,       -1.0 / fmn,  -near / fmn,
        0.0,       0.0,       0.0,          1.0,
    );
    result
}

/// Orthographic projection for 2D content: origin top-left, +Y down, in points.
pub fn screen_projection(width: f32, height: f32) -> Mat4 {
    orthographic_rh(0.0, width, height, 0.0, -1.0, 1.0)
}

/// View and projection for 3D content in screen coordinates.
///
/// The eye sits on the screen center looking down -Z, far enough that the
/// plane `z = 0` maps one unit to one point with +Y down, matching 2D.
pub fn screen_perspective(width: f32, height: f32, fov_degrees: f32) -> (Mat4, Mat4) {
    let width = width.max(1.0);
    let height = height.max(1.0);
    let half_fov = (fov_degrees.clamp(1.0, 179.0) * 0.5).to_radians();
    let distance = height * 0.5 / half_fov.tan();
    let center = Vec3::new(width * 0.5, height * 0.5, 0.0);
    let eye = center + Vec3::new(0.0, 0.0, distance);
    let view = look_at_rh(&eye, &center, &Vec3::y());
    let flip = mat4_scaling(1.0, -1.0, 1.0);
    let projection = flip * perspective_rh(half_fov * 2.0, width / height, distance / 10.0, distance * 10.0);
    (view, projection)
}

/// Right-handed look-at view matrix.
pub fn look_at_rh(eye: &Vec3, target: &Vec3, up: &Vec3) -> Mat4 {
    let eye_point = nalgebra::Point3::from(*eye);
    let target_point = nalgebra::Point3::from(*target);
    nalgebra::Isometry3::look_at_rh(&eye_point, &target_point, up).to_homogeneous()
}

/// Inverse-transpose of the upper-left 3x3 of `model_view`.
///
/// Falls back to the plain upper-left 3x3 when it is singular.
pub fn normal_matrix(model_view: &Mat4) -> Mat3 {
    let upper: Mat3 = model_view.fixed_view::<3, 3>(0, 0).into_owned();
    match upper.try_inverse() {
        Some(inv) => inv.transpose(),
        None => upper,
    }
}

/// Transform a point by a 4x4 matrix (w assumed 1, no perspective divide).
pub fn transform_point(m: &Mat4, p: [f32; 3]) -> [f32; 3] {
    let v = m * Vec4::new(p[0], p[1], p[2], 1.0);
    [v.x, v.y, v.z]
}

/// Convert a 4x4 matrix to a column-major `[[f32; 4]; 4]` array.
pub fn mat4_to_cols_array_2d(m: &Mat4) -> [[f32; 4]; 4] {
    let s = m.as_slice();
    [
        [s[0], s[1], s[2], s[3]],
        [s[4], s[5], s[6], s[7]],
        [s[8], s[9], s[10], s[11]],
        [s[12], s[13], s[14], s[15]],
    ]
}

/// Component-wise comparison of two matrices.
pub fn mat4_approx_eq(a: &Mat4, b: &Mat4, eps: f32) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() <= eps)
}
