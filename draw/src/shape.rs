//! Free-form shapes built vertex by vertex.
//!
//! Between [`Graphics::begin_shape`] and [`Graphics::end_shape`] points are
//! only collected; nothing is recorded until the shape ends. Filled contours
//! are fan-triangulated from their first vertex, which is exact for convex
//! contours only.

use oflike_graphics::Misuse;

use crate::context::Graphics;
use crate::shapes2d::{fan, polyline};
use crate::state::FillMode;

#[derive(Debug, Clone, Default, PartialEq)]
struct Contour {
    points: Vec<[f32; 2]>,
    closed: bool,
}

/// Points collected for the shape being built.
#[derive(Debug, Clone, Default)]
pub struct ShapeBuilder {
    active: bool,
    contours: Vec<Contour>,
    current: Contour,
    /// Catmull-Rom control points of the curve being built.
    curve: Vec<[f32; 2]>,
}

impl ShapeBuilder {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    fn begin(&mut self) {
        self.reset();
        self.active = true;
    }

    fn finish_contour(&mut self, close: bool) {
        self.curve.clear();
        let mut contour = std::mem::take(&mut self.current);
        if contour.points.is_empty() {
            return;
        }
        contour.closed = close;
        self.contours.push(contour);
    }

    fn last_point(&self) -> Option<[f32; 2]> {
        self.current.points.last().copied()
    }
}

/// Point on the Catmull-Rom segment between `p1` and `p2`, tension 0.5.
pub fn catmull_rom(p0: [f32; 2], p1: [f32; 2], p2: [f32; 2], p3: [f32; 2], t: f32) -> [f32; 2] {
    let t2 = t * t;
    let t3 = t2 * t;
    let axis = |i: usize| {
        0.5 * (2.0 * p1[i]
            + (-p0[i] + p2[i]) * t
            + (2.0 * p0[i] - 5.0 * p1[i] + 4.0 * p2[i] - p3[i]) * t2
            + (-p0[i] + 3.0 * p1[i] - 3.0 * p2[i] + p3[i]) * t3)
    };
    [axis(0), axis(1)]
}

/// Point on the cubic Bezier curve `p0 c1 c2 p3`.
pub fn cubic_bezier(p0: [f32; 2], c1: [f32; 2], c2: [f32; 2], p3: [f32; 2], t: f32) -> [f32; 2] {
    let u = 1.0 - t;
    let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
    [
        a * p0[0] + b * c1[0] + c * c2[0] + d * p3[0],
        a * p0[1] + b * c1[1] + c * c2[1] + d * p3[1],
    ]
}

impl Graphics {
    /// Start a new shape. An unfinished shape is discarded.
    pub fn begin_shape(&mut self) {
        if self.shape.is_active() {
            log::debug!("begin_shape() while building a shape; previous points discarded");
        }
        self.shape.begin();
    }

    fn shape_active(&mut self, call: &str) -> bool {
        if !self.shape.is_active() {
            self.report(
                Misuse::END_WITHOUT_BEGIN,
                format!("{call}() outside begin_shape()/end_shape(); ignored"),
            );
            return false;
        }
        true
    }

    /// Add a corner point.
    pub fn vertex(&mut self, x: f32, y: f32) {
        if !self.shape_active("vertex") {
            return;
        }
        self.shape.curve.clear();
        self.shape.current.points.push([x, y]);
    }

    /// Add a Catmull-Rom control point.
    ///
    /// Every four consecutive control points add the span between the middle
    /// two, so the first and last control points only steer the curve.
    pub fn curve_vertex(&mut self, x: f32, y: f32) {
        if !self.shape_active("curve_vertex") {
            return;
        }
        let resolution = self.state.curve_resolution();
        let shape = &mut self.shape;
        shape.curve.push([x, y]);
        let n = shape.curve.len();
        if n < 4 {
            return;
        }
        let [p0, p1, p2, p3] = [
            shape.curve[n - 4],
            shape.curve[n - 3],
            shape.curve[n - 2],
            shape.curve[n - 1],
        ];
        if n == 4 {
            shape.current.points.push(p1);
        }
        for i in 1..=resolution {
            let t = i as f32 / resolution as f32;
            shape.current.points.push(catmull_rom(p0, p1, p2, p3, t));
        }
    }

    /// Add a cubic Bezier from the last point through the two control
    /// points to `(x, y)`. Without a previous point the curve starts at the
    /// first control point.
    pub fn bezier_vertex(&mut self, c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32) {
        if !self.shape_active("bezier_vertex") {
            return;
        }
        let resolution = self.state.curve_resolution();
        let shape = &mut self.shape;
        shape.curve.clear();
        let start = match shape.last_point() {
            Some(p) => p,
            None => {
                shape.current.points.push([c1x, c1y]);
                [c1x, c1y]
            }
        };
        for i in 1..=resolution {
            let t = i as f32 / resolution as f32;
            shape
                .current
                .points
                .push(cubic_bezier(start, [c1x, c1y], [c2x, c2y], [x, y], t));
        }
    }

    /// Finish the current contour and start another one in the same shape.
    pub fn next_contour(&mut self, close: bool) {
        if !self.shape_active("next_contour") {
            return;
        }
        self.shape.finish_contour(close);
    }

    /// Finish the shape and record it.
    ///
    /// Contours with fewer than two points record nothing.
    pub fn end_shape(&mut self, close: bool) {
        if !self.shape_active("end_shape") {
            return;
        }
        self.shape.finish_contour(close);
        let contours = std::mem::take(&mut self.shape.contours);
        self.shape.reset();

        let mut out = Vec::new();
        for contour in contours.iter().filter(|c| c.points.len() >= 2) {
            match self.state.fill {
                FillMode::Fill => {
                    let vertices: Vec<_> = contour
                        .points
                        .iter()
                        .map(|&[x, y]| self.screen_vertex(x, y))
                        .collect();
                    fan(&vertices, &mut out);
                }
                FillMode::Outline => {
                    let points: Vec<_> = contour
                        .points
                        .iter()
                        .map(|&[x, y]| self.matrix_2d.apply(x, y))
                        .collect();
                    polyline(&points, contour.closed, self.line_width(), self.state.color, &mut out);
                }
            }
        }
        self.emit_triangles_2d(&out, None);
    }
}
