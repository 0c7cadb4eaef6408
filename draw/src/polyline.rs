//! Reusable 2D outlines.
//!
//! A [`Polyline`] is built once, edited freely and drawn any number of
//! times with [`Graphics::draw_polyline`]. Curves and arcs are flattened into
//! plain vertices when they are added.

use std::f32::consts::TAU;

use oflike_graphics::Rect;

use crate::context::Graphics;
use crate::shape::{catmull_rom, cubic_bezier};
use crate::shapes2d::polyline;

/// An open or closed chain of 2D points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline {
    vertices: Vec<[f32; 2]>,
    closed: bool,
}

impl Polyline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vertices(vertices: impl IntoIterator<Item = [f32; 2]>) -> Self {
        Self {
            vertices: vertices.into_iter().collect(),
            closed: false,
        }
    }

    pub fn add_vertex(&mut self, x: f32, y: f32) {
        self.vertices.push([x, y]);
    }

    pub fn add_vertices(&mut self, vertices: impl IntoIterator<Item = [f32; 2]>) {
        self.vertices.extend(vertices);
    }

    /// Same as [`add_vertex`](Self::add_vertex).
    pub fn line_to(&mut self, x: f32, y: f32) {
        self.add_vertex(x, y);
    }

    /// Catmull-Rom segment from the last vertex to `(x, y)`, tangent to the
    /// previous segment. On an empty polyline the point is added as is.
    pub fn curve_to(&mut self, x: f32, y: f32, resolution: u32) {
        let Some(&p1) = self.vertices.last() else {
            self.add_vertex(x, y);
            return;
        };
        let p0 = self
            .vertices
            .len()
            .checked_sub(2)
            .map_or(p1, |i| self.vertices[i]);
        let resolution = resolution.max(1);
        for i in 1..=resolution {
            let t = i as f32 / resolution as f32;
            self.vertices.push(catmull_rom(p0, p1, [x, y], [x, y], t));
        }
    }

    /// Cubic Bezier from the last vertex to `(x, y)`.
    pub fn bezier_to(&mut self, c1: [f32; 2], c2: [f32; 2], x: f32, y: f32, resolution: u32) {
        let Some(&p0) = self.vertices.last() else {
            self.add_vertex(x, y);
            return;
        };
        let resolution = resolution.max(1);
        for i in 1..=resolution {
            let t = i as f32 / resolution as f32;
            self.vertices.push(cubic_bezier(p0, c1, c2, [x, y], t));
        }
    }

    /// Arc around `(cx, cy)` from `begin` to `end` degrees, increasing
    /// angle. `resolution` is the segment count of a full circle; shorter
    /// arcs get a proportional share, never fewer than 3.
    pub fn arc(&mut self, cx: f32, cy: f32, radius: f32, begin: f32, end: f32, resolution: u32) {
        self.add_arc(cx, cy, radius, begin, end, resolution, false);
    }

    /// Arc with decreasing angle.
    pub fn arc_negative(&mut self, cx: f32, cy: f32, radius: f32, begin: f32, end: f32, resolution: u32) {
        self.add_arc(cx, cy, radius, begin, end, resolution, true);
    }

    #[allow(clippy::too_many_arguments)]
    fn add_arc(
        &mut self,
        cx: f32,
        cy: f32,
        radius: f32,
        begin: f32,
        end: f32,
        resolution: u32,
        negative: bool,
    ) {
        let start = begin.to_radians();
        let mut span = (end - begin).to_radians();
        if negative && span > 0.0 {
            span -= TAU;
        } else if !negative && span < 0.0 {
            span += TAU;
        }
        let segments = ((resolution as f32 * span.abs() / TAU) as u32).max(3);
        for i in 0..=segments {
            let angle = start + span * i as f32 / segments as f32;
            let point = [cx + radius * angle.cos(), cy + radius * angle.sin()];
            if self.vertices.last() != Some(&point) {
                self.vertices.push(point);
            }
        }
    }

    /// Join the last vertex back to the first when drawn.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn set_closed(&mut self, closed: bool) {
        self.closed = closed;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.closed = false;
    }

    pub fn vertices(&self) -> &[[f32; 2]] {
        &self.vertices
    }

    pub fn vertices_mut(&mut self) -> &mut Vec<[f32; 2]> {
        &mut self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Length of all segments, including the closing one.
    pub fn perimeter(&self) -> f32 {
        let open: f32 = self.vertices.windows(2).map(|w| distance(w[0], w[1])).sum();
        match (self.closed, self.vertices.first(), self.vertices.last()) {
            (true, Some(&first), Some(&last)) if self.vertices.len() > 2 => {
                open + distance(last, first)
            }
            _ => open,
        }
    }

    /// Unsigned shoelace area. Open polylines have none.
    pub fn area(&self) -> f32 {
        if !self.closed || self.vertices.len() < 3 {
            return 0.0;
        }
        let n = self.vertices.len();
        let twice: f32 = (0..n)
            .map(|i| {
                let [ax, ay] = self.vertices[i];
                let [bx, by] = self.vertices[(i + 1) % n];
                ax * by - bx * ay
            })
            .sum();
        twice.abs() * 0.5
    }

    pub fn centroid(&self) -> Option<[f32; 2]> {
        if self.vertices.is_empty() {
            return None;
        }
        let n = self.vertices.len() as f32;
        let [sx, sy] = self
            .vertices
            .iter()
            .fold([0.0, 0.0], |[sx, sy], [x, y]| [sx + x, sy + y]);
        Some([sx / n, sy / n])
    }

    pub fn bounding_box(&self) -> Rect {
        let Some(&[x0, y0]) = self.vertices.first() else {
            return Rect::default();
        };
        let (mut min, mut max) = ([x0, y0], [x0, y0]);
        for &[x, y] in &self.vertices {
            min = [min[0].min(x), min[1].min(y)];
            max = [max[0].max(x), max[1].max(y)];
        }
        Rect::new(min[0], min[1], max[0] - min[0], max[1] - min[1])
    }

    /// Even-odd test against a closed polyline.
    pub fn inside(&self, x: f32, y: f32) -> bool {
        if !self.closed || self.vertices.len() < 3 {
            return false;
        }
        let n = self.vertices.len();
        let mut inside = false;
        for i in 0..n {
            let [ax, ay] = self.vertices[i];
            let [bx, by] = self.vertices[(i + 1) % n];
            if (ay > y) != (by > y) && x < ax + (y - ay) * (bx - ax) / (by - ay) {
                inside = !inside;
            }
        }
        inside
    }

    /// Closest point on any segment to `(x, y)`.
    pub fn closest_point(&self, x: f32, y: f32) -> Option<[f32; 2]> {
        match self.vertices.as_slice() {
            [] => None,
            [only] => Some(*only),
            vertices => vertices
                .windows(2)
                .map(|w| project_on_segment([x, y], w[0], w[1]))
                .min_by(|a, b| distance(*a, [x, y]).total_cmp(&distance(*b, [x, y]))),
        }
    }

    /// Drop vertices closer than `tolerance` to the simplified outline
    /// (Ramer-Douglas-Peucker). End points are always kept.
    pub fn simplify(&mut self, tolerance: f32) {
        let n = self.vertices.len();
        if n < 3 {
            return;
        }
        let mut keep = vec![false; n];
        keep[0] = true;
        keep[n - 1] = true;
        let mut pending = vec![(0, n - 1)];
        while let Some((start, end)) = pending.pop() {
            if end - start < 2 {
                continue;
            }
            let (a, b) = (self.vertices[start], self.vertices[end]);
            let farthest = (start + 1..end)
                .map(|i| (i, distance(self.vertices[i], project_on_segment(self.vertices[i], a, b))))
                .max_by(|x, y| x.1.total_cmp(&y.1));
            if let Some((i, d)) = farthest {
                if d > tolerance {
                    keep[i] = true;
                    pending.push((start, i));
                    pending.push((i, end));
                }
            }
        }
        let mut flags = keep.into_iter();
        self.vertices.retain(|_| flags.next().unwrap_or(false));
    }

    /// Points spaced `spacing` apart along the outline, plus the last vertex.
    pub fn resampled_by_spacing(&self, spacing: f32) -> Polyline {
        if self.vertices.len() < 2 || spacing.is_nan() || spacing <= 0.0 {
            return self.clone();
        }
        let mut out = vec![self.vertices[0]];
        let mut carried = 0.0;
        for w in self.vertices.windows(2) {
            let (from, to) = (w[0], w[1]);
            let length = distance(from, to);
            if length <= 0.0 {
                continue;
            }
            let mut offset = spacing - carried;
            while offset <= length {
                let t = offset / length;
                out.push([from[0] + (to[0] - from[0]) * t, from[1] + (to[1] - from[1]) * t]);
                offset += spacing;
            }
            carried = length - (offset - spacing);
        }
        if out.last() != self.vertices.last() {
            out.extend(self.vertices.last().copied());
        }
        Polyline {
            vertices: out,
            closed: self.closed,
        }
    }

    /// `count` points spread evenly along the open outline.
    pub fn resampled_by_count(&self, count: usize) -> Polyline {
        if count < 2 || self.vertices.len() < 2 {
            return self.clone();
        }
        let open: f32 = self.vertices.windows(2).map(|w| distance(w[0], w[1])).sum();
        self.resampled_by_spacing(open / (count - 1) as f32)
    }
}

fn distance(a: [f32; 2], b: [f32; 2]) -> f32 {
    (b[0] - a[0]).hypot(b[1] - a[1])
}

fn project_on_segment(p: [f32; 2], a: [f32; 2], b: [f32; 2]) -> [f32; 2] {
    let (dx, dy) = (b[0] - a[0], b[1] - a[1]);
    let length_sq = dx * dx + dy * dy;
    if length_sq <= f32::EPSILON {
        return a;
    }
    let t = (((p[0] - a[0]) * dx + (p[1] - a[1]) * dy) / length_sq).clamp(0.0, 1.0);
    [a[0] + dx * t, a[1] + dy * t]
}

impl Graphics {
    /// Outline `line` with the current line width, color and 2D matrix.
    pub fn draw_polyline(&mut self, line: &Polyline) {
        if line.len() < 2 {
            return;
        }
        let points: Vec<[f32; 2]> = line
            .vertices()
            .iter()
            .map(|&[x, y]| self.matrix_2d.apply(x, y))
            .collect();
        let mut out = Vec::with_capacity(points.len() * 6);
        polyline(&points, line.is_closed(), self.line_width(), self.state.color, &mut out);
        self.emit_triangles_2d(&out, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polyline {
        let mut line = Polyline::from_vertices([[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]);
        line.close();
        line
    }

    #[test]
    fn test_square_measurements() {
        let line = square();
        assert_eq!(line.perimeter(), 40.0);
        assert_eq!(line.area(), 100.0);
        assert_eq!(line.centroid(), Some([5.0, 5.0]));
        assert_eq!(line.bounding_box(), Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(line.inside(5.0, 5.0));
        assert!(!line.inside(15.0, 5.0));
    }

    #[test]
    fn test_open_line_has_no_area() {
        let mut line = square();
        line.set_closed(false);
        assert_eq!(line.area(), 0.0);
        assert_eq!(line.perimeter(), 30.0);
        assert!(!line.inside(5.0, 5.0));
    }

    #[test]
    fn test_arc_quarter_endpoints() {
        let mut line = Polyline::new();
        line.arc(0.0, 0.0, 10.0, 0.0, 90.0, 32);
        // a quarter of 32 segments
        assert_eq!(line.len(), 9);
        let [x, y] = line.vertices()[8];
        assert!(x.abs() < 1e-4 && (y - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_arc_negative_goes_the_other_way() {
        let mut line = Polyline::new();
        line.arc_negative(0.0, 0.0, 10.0, 0.0, 90.0, 32);
        // three quarters, clockwise through -Y
        assert_eq!(line.len(), 25);
        assert!(line.vertices()[1][1] < 0.0);
    }

    #[test]
    fn test_simplify_drops_collinear_points() {
        let mut line = Polyline::from_vertices((0..=10).map(|i| [i as f32, 0.0]));
        line.add_vertex(10.0, 5.0);
        line.simplify(0.1);
        assert_eq!(line.vertices(), &[[0.0, 0.0], [10.0, 0.0], [10.0, 5.0]]);
    }

    #[test]
    fn test_simplify_keeps_points_above_tolerance() {
        let mut line = Polyline::from_vertices([[0.0, 0.0], [5.0, 1.0], [10.0, 0.0]]);
        line.simplify(0.5);
        assert_eq!(line.len(), 3);
        line.simplify(2.0);
        assert_eq!(line.len(), 2);
    }

    #[test]
    fn test_curve_and_bezier_end_on_target() {
        let mut line = Polyline::from_vertices([[0.0, 0.0], [10.0, 0.0]]);
        line.curve_to(20.0, 10.0, 8);
        assert_eq!(line.len(), 10);
        assert_eq!(line.vertices()[9], [20.0, 10.0]);

        let mut line = Polyline::new();
        line.bezier_to([1.0, 1.0], [2.0, 1.0], 3.0, 0.0, 4);
        assert_eq!(line.vertices(), &[[3.0, 0.0]]);
        line.bezier_to([4.0, 1.0], [5.0, 1.0], 6.0, 0.0, 4);
        assert_eq!(line.len(), 5);
        assert_eq!(line.vertices()[4], [6.0, 0.0]);
    }

    #[test]
    fn test_resample_by_spacing() {
        let line = Polyline::from_vertices([[0.0, 0.0], [10.0, 0.0]]);
        let resampled = line.resampled_by_spacing(2.5);
        assert_eq!(resampled.len(), 5);
        assert_eq!(resampled.vertices()[2], [5.0, 0.0]);
        assert_eq!(line.resampled_by_count(3).vertices()[1], [5.0, 0.0]);
    }

    #[test]
    fn test_closest_point_on_segment() {
        let line = square();
        assert_eq!(line.closest_point(5.0, -3.0), Some([5.0, 0.0]));
        assert_eq!(Polyline::new().closest_point(0.0, 0.0), None);
    }

    #[test]
    fn test_draw_closed_polyline() {
        let mut g = Graphics::default();
        g.set_background_auto(false);
        g.begin_frame();
        g.draw_polyline(&square());
        // four sides, one quad each
        assert_eq!(g.list().vertices_2d().len(), 24);
        g.draw_polyline(&Polyline::from_vertices([[1.0, 1.0]]));
        assert_eq!(g.list().command_count(), 1);
    }
}
