//! 2D shapes.
//!
//! All geometry is tessellated into screen-space triangle lists at record
//! time, so shapes drawn with the same blend mode and texture batch into a
//! single command regardless of color or transform. Outlines are quads of
//! the current line width with square caps; the native line primitive is
//! never used.

use std::f32::consts::TAU;

use oflike_core::Color;
use oflike_core::mesh::Vertex2D;
use oflike_graphics::TextureHandle;

use crate::context::Graphics;
use crate::shape::{catmull_rom, cubic_bezier};
use crate::state::FillMode;

/// Segments used for a corner arc of a rounded rectangle when none are given.
const MIN_CORNER_SEGMENTS: u32 = 1;

/// Two triangles covering the quad `a b c d`, given in winding order.
fn quad(a: Vertex2D, b: Vertex2D, c: Vertex2D, d: Vertex2D, out: &mut Vec<Vertex2D>) {
    out.extend_from_slice(&[a, b, c, a, c, d]);
}

/// Square-capped line quad between two screen-space points.
pub(crate) fn line_quad(
    p0: [f32; 2],
    p1: [f32; 2],
    width: f32,
    color: Color,
    out: &mut Vec<Vertex2D>,
) {
    let (dx, dy) = (p1[0] - p0[0], p1[1] - p0[1]);
    let length = (dx * dx + dy * dy).sqrt();
    if length <= f32::EPSILON {
        return;
    }
    let half = width * 0.5;
    let (ux, uy) = (dx / length * half, dy / length * half);
    let (nx, ny) = (-uy, ux);
    let start = [p0[0] - ux, p0[1] - uy];
    let end = [p1[0] + ux, p1[1] + uy];
    let v = |x: f32, y: f32| Vertex2D::new(x, y, color);
    quad(
        v(start[0] + nx, start[1] + ny),
        v(end[0] + nx, end[1] + ny),
        v(end[0] - nx, end[1] - ny),
        v(start[0] - nx, start[1] - ny),
        out,
    );
}

/// Line quads along screen-space `points`, closing back to the first point
/// when `closed`.
pub(crate) fn polyline(
    points: &[[f32; 2]],
    closed: bool,
    width: f32,
    color: Color,
    out: &mut Vec<Vertex2D>,
) {
    for pair in points.windows(2) {
        line_quad(pair[0], pair[1], width, color, out);
    }
    if closed && points.len() > 2 {
        line_quad(points[points.len() - 1], points[0], width, color, out);
    }
}

/// Triangle fan from `points[0]` as a triangle list.
pub(crate) fn fan(points: &[Vertex2D], out: &mut Vec<Vertex2D>) {
    if points.len() < 3 {
        return;
    }
    for pair in points[1..].windows(2) {
        out.extend_from_slice(&[points[0], pair[0], pair[1]]);
    }
}

/// Clamp corner radii so the radii along each side fit inside it.
///
/// Order is top-left, top-right, bottom-right, bottom-left.
fn clamp_radii(width: f32, height: f32, radii: [f32; 4]) -> [f32; 4] {
    let radii = radii.map(|r| if r.is_finite() { r.max(0.0) } else { 0.0 });
    let [tl, tr, br, bl] = radii;
    let fit = |side: f32, sum: f32| if sum > side { side / sum } else { 1.0 };
    let factor = fit(width, tl + tr)
        .min(fit(width, bl + br))
        .min(fit(height, tl + bl))
        .min(fit(height, tr + br));
    radii.map(|r| r * factor)
}

/// Axis-aligned origin and size with non-negative extents.
fn normalize_rect(x: f32, y: f32, w: f32, h: f32) -> (f32, f32, f32, f32) {
    let (x, w) = if w < 0.0 { (x + w, -w) } else { (x, w) };
    let (y, h) = if h < 0.0 { (y + h, -h) } else { (y, h) };
    (x, y, w, h)
}

impl Graphics {
    fn screen_points(&self, local: &[[f32; 2]]) -> Vec<[f32; 2]> {
        local.iter().map(|&[x, y]| self.matrix_2d.apply(x, y)).collect()
    }

    /// Fill or outline a closed convex outline given in local coordinates,
    /// fanning from `center`.
    fn emit_closed_outline(&mut self, center: [f32; 2], local: &[[f32; 2]]) {
        let mut out = Vec::new();
        match self.state.fill {
            FillMode::Fill => {
                let center = self.screen_vertex(center[0], center[1]);
                let n = local.len();
                for i in 0..n {
                    let a = local[i];
                    let b = local[(i + 1) % n];
                    out.extend_from_slice(&[
                        center,
                        self.screen_vertex(a[0], a[1]),
                        self.screen_vertex(b[0], b[1]),
                    ]);
                }
            }
            FillMode::Outline => {
                let points = self.screen_points(local);
                polyline(&points, true, self.line_width(), self.state.color, &mut out);
            }
        }
        self.emit_triangles_2d(&out, None);
    }

    /// Axis-aligned rectangle with its top-left corner at `(x, y)`.
    pub fn draw_rectangle(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let (x, y, w, h) = normalize_rect(x, y, w, h);
        let corners = [[x, y], [x + w, y], [x + w, y + h], [x, y + h]];
        let mut out = Vec::with_capacity(6);
        match self.state.fill {
            FillMode::Fill => {
                let [a, b, c, d] = corners.map(|[px, py]| self.screen_vertex(px, py));
                quad(a, b, c, d, &mut out);
            }
            FillMode::Outline => {
                let points = self.screen_points(&corners);
                polyline(&points, true, self.line_width(), self.state.color, &mut out);
            }
        }
        self.emit_triangles_2d(&out, None);
    }

    /// Rectangle with the same radius on every corner. The arc resolution
    /// follows the circle resolution.
    pub fn draw_rect_rounded(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32) {
        let scale = self.matrix_2d.top().max_scale();
        let segments = (self.state.circle_segments(radius, self.content_scale(), scale) / 4)
            .max(MIN_CORNER_SEGMENTS);
        self.draw_rect_rounded_corners(x, y, w, h, radius, radius, radius, radius, segments);
    }

    /// Rectangle with per-corner radii, clockwise from the top-left corner.
    ///
    /// Radii shrink proportionally when two corners on a side would overlap.
    /// Zero-radius corners are sharp and all-zero radii draw a plain
    /// rectangle.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_rect_rounded_corners(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        top_left: f32,
        top_right: f32,
        bottom_right: f32,
        bottom_left: f32,
        segments: u32,
    ) {
        let (x, y, w, h) = normalize_rect(x, y, w, h);
        let radii = clamp_radii(w, h, [top_left, top_right, bottom_right, bottom_left]);
        if radii.iter().all(|&r| r == 0.0) {
            self.draw_rectangle(x, y, w, h);
            return;
        }
        let segments = segments.max(MIN_CORNER_SEGMENTS);
        let [tl, tr, br, bl] = radii;
        // arc centers and start angles, clockwise on a +Y down screen
        let corners = [
            ([x + tl, y + tl], tl, 0.5),
            ([x + w - tr, y + tr], tr, 0.75),
            ([x + w - br, y + h - br], br, 0.0),
            ([x + bl, y + h - bl], bl, 0.25),
        ];
        let mut outline: Vec<[f32; 2]> = Vec::with_capacity(4 * (segments as usize + 1));
        for (center, radius, start_turn) in corners {
            if radius == 0.0 {
                outline.push(center);
                continue;
            }
            for i in 0..=segments {
                let angle = (start_turn + 0.25 * i as f32 / segments as f32) * TAU;
                let point = [center[0] + radius * angle.cos(), center[1] + radius * angle.sin()];
                if outline.last() != Some(&point) {
                    outline.push(point);
                }
            }
        }
        if outline.len() > 1 && outline.first() == outline.last() {
            outline.pop();
        }
        self.emit_closed_outline([x + w * 0.5, y + h * 0.5], &outline);
    }

    /// Circle with the current circle resolution.
    pub fn draw_circle(&mut self, cx: f32, cy: f32, radius: f32) {
        let scale = self.matrix_2d.top().max_scale();
        let segments = self.state.circle_segments(radius, self.content_scale(), scale);
        self.draw_ellipse_segments(cx, cy, radius, radius, segments);
    }

    /// Circle with an explicit segment count, at least 3.
    pub fn draw_circle_segments(&mut self, cx: f32, cy: f32, radius: f32, segments: u32) {
        self.draw_ellipse_segments(cx, cy, radius, radius, segments);
    }

    /// Ellipse of the given width and height centered on `(cx, cy)`.
    pub fn draw_ellipse(&mut self, cx: f32, cy: f32, w: f32, h: f32) {
        let (rx, ry) = (w.abs() * 0.5, h.abs() * 0.5);
        let scale = self.matrix_2d.top().max_scale();
        let segments = self.state.circle_segments(rx.max(ry), self.content_scale(), scale);
        self.draw_ellipse_segments(cx, cy, rx, ry, segments);
    }

    fn draw_ellipse_segments(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, segments: u32) {
        let segments = segments.max(3);
        let outline: Vec<[f32; 2]> = (0..segments)
            .map(|i| {
                let angle = TAU * i as f32 / segments as f32;
                [cx + rx * angle.cos(), cy + ry * angle.sin()]
            })
            .collect();
        self.emit_closed_outline([cx, cy], &outline);
    }

    pub fn draw_triangle(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) {
        let local = [[x1, y1], [x2, y2], [x3, y3]];
        let mut out = Vec::with_capacity(3);
        match self.state.fill {
            FillMode::Fill => {
                out.extend(local.iter().map(|&[x, y]| self.screen_vertex(x, y)));
            }
            FillMode::Outline => {
                let points = self.screen_points(&local);
                polyline(&points, true, self.line_width(), self.state.color, &mut out);
            }
        }
        self.emit_triangles_2d(&out, None);
    }

    /// Line of the current width. Zero-length lines draw nothing.
    pub fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let p0 = self.matrix_2d.apply(x1, y1);
        let p1 = self.matrix_2d.apply(x2, y2);
        let mut out = Vec::with_capacity(6);
        line_quad(p0, p1, self.line_width(), self.state.color, &mut out);
        self.emit_triangles_2d(&out, None);
    }

    /// Outline through points of a local curve sampled at `t` in `0..=1`.
    fn draw_sampled_curve(&mut self, curve: impl Fn(f32) -> [f32; 2]) {
        let resolution = self.state.curve_resolution().max(1);
        let points: Vec<[f32; 2]> = (0..=resolution)
            .map(|i| {
                let [x, y] = curve(i as f32 / resolution as f32);
                self.matrix_2d.apply(x, y)
            })
            .collect();
        let mut out = Vec::with_capacity(resolution as usize * 6);
        polyline(&points, false, self.line_width(), self.state.color, &mut out);
        self.emit_triangles_2d(&out, None);
    }

    /// Catmull-Rom curve from `(x1, y1)` to `(x2, y2)`, bent towards the
    /// outer points, with the current curve resolution.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_curve(
        &mut self,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        x3: f32,
        y3: f32,
    ) {
        self.draw_sampled_curve(|t| catmull_rom([x0, y0], [x1, y1], [x2, y2], [x3, y3], t));
    }

    /// Cubic Bezier from `(x0, y0)` to `(x3, y3)` with the current curve
    /// resolution.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_bezier(
        &mut self,
        x0: f32,
        y0: f32,
        cx1: f32,
        cy1: f32,
        cx2: f32,
        cy2: f32,
        x3: f32,
        y3: f32,
    ) {
        self.draw_sampled_curve(|t| cubic_bezier([x0, y0], [cx1, cy1], [cx2, cy2], [x3, y3], t));
    }

    /// Textured quad with UVs spanning the whole texture, tinted by the
    /// current color.
    pub fn draw_texture(&mut self, texture: TextureHandle, x: f32, y: f32, w: f32, h: f32) {
        let corners = [
            (x, y, 0.0, 0.0),
            (x + w, y, 1.0, 0.0),
            (x + w, y + h, 1.0, 1.0),
            (x, y + h, 0.0, 1.0),
        ];
        let [a, b, c, d] =
            corners.map(|(px, py, u, v)| self.screen_vertex(px, py).with_uv(u, v));
        let mut out = Vec::with_capacity(6);
        quad(a, b, c, d, &mut out);
        self.emit_triangles_2d(&out, Some(texture));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oflike_graphics::DrawCommand;

    fn frame() -> Graphics {
        let mut g = Graphics::default();
        g.set_background_auto(false);
        g.begin_frame();
        g
    }

    fn vertex_count(g: &Graphics) -> usize {
        g.list().vertices_2d().len()
    }

    #[test]
    fn test_filled_rectangle_is_two_triangles() {
        let mut g = frame();
        g.draw_rectangle(1.0, 2.0, 3.0, 4.0);
        assert_eq!(g.list().command_count(), 1);
        let positions: Vec<_> = g.list().vertices_2d().iter().map(|v| v.position).collect();
        assert_eq!(
            positions,
            [[1.0, 2.0], [4.0, 2.0], [4.0, 6.0], [1.0, 2.0], [4.0, 6.0], [1.0, 6.0]]
        );
    }

    #[test]
    fn test_outlined_rectangle_is_four_quads() {
        let mut g = frame();
        g.no_fill();
        g.draw_rectangle(0.0, 0.0, 10.0, 10.0);
        assert_eq!(vertex_count(&g), 24);
    }

    #[test]
    fn test_circle_resolution_three_is_three_triangles() {
        let mut g = frame();
        g.set_circle_resolution(3);
        g.draw_circle(0.0, 0.0, 10.0);
        assert_eq!(vertex_count(&g), 9);
    }

    #[test]
    fn test_circle_segments_clamped() {
        let mut g = frame();
        g.draw_circle_segments(0.0, 0.0, 10.0, 1);
        assert_eq!(vertex_count(&g), 9);
    }

    #[test]
    fn test_line_square_caps() {
        let mut g = frame();
        g.set_line_width(2.0);
        g.draw_line(0.0, 0.0, 10.0, 0.0);
        let xs: Vec<f32> = g.list().vertices_2d().iter().map(|v| v.position[0]).collect();
        let min = xs.iter().cloned().fold(f32::MAX, f32::min);
        let max = xs.iter().cloned().fold(f32::MIN, f32::max);
        assert_eq!((min, max), (-1.0, 11.0));
    }

    #[test]
    fn test_zero_length_line_emits_nothing() {
        let mut g = frame();
        g.draw_line(3.0, 3.0, 3.0, 3.0);
        assert!(g.list().is_empty());
    }

    #[test]
    fn test_rounded_rect_radii_clamped() {
        assert_eq!(clamp_radii(10.0, 4.0, [5.0; 4]), [2.0; 4]);
        assert_eq!(clamp_radii(10.0, 10.0, [-1.0, 2.0, 0.0, 3.0]), [0.0, 2.0, 0.0, 3.0]);
    }

    #[test]
    fn test_rounded_rect_sharp_corner() {
        let mut g = frame();
        g.draw_rect_rounded_corners(0.0, 0.0, 20.0, 20.0, 0.0, 5.0, 5.0, 5.0, 4);
        let has_corner = g
            .list()
            .vertices_2d()
            .iter()
            .any(|v| v.position == [0.0, 0.0]);
        assert!(has_corner);
        // 1 + 3 * 5 outline points, one triangle each
        assert_eq!(vertex_count(&g), 16 * 3);
    }

    #[test]
    fn test_texture_quad_uvs() {
        let mut g = frame();
        let texture = TextureHandle::new(1, oflike_graphics::DeviceId(1));
        g.draw_texture(texture, 0.0, 0.0, 8.0, 8.0);
        let uvs: Vec<_> = g.list().vertices_2d().iter().map(|v| v.uv).collect();
        assert_eq!(uvs[2], [1.0, 1.0]);
        assert!(matches!(
            g.list().commands()[0],
            DrawCommand::Draw2D(d) if d.texture == Some(texture)
        ));
    }

    #[test]
    fn test_default_circle_has_32_segments() {
        let mut g = frame();
        g.draw_circle(0.0, 0.0, 10.0);
        assert_eq!(vertex_count(&g), 32 * 3);
        g.draw_circle(0.0, 0.0, 400.0);
        assert_eq!(vertex_count(&g), 2 * 32 * 3);
    }

    #[test]
    fn test_curve_uses_curve_resolution() {
        let mut g = frame();
        g.set_curve_resolution(5);
        g.draw_curve(0.0, 0.0, 10.0, 0.0, 20.0, 10.0, 30.0, 10.0);
        assert_eq!(vertex_count(&g), 5 * 6);
    }

    #[test]
    fn test_bezier_ends_on_anchor() {
        let mut g = frame();
        g.set_curve_resolution(4);
        g.set_line_width(2.0);
        g.draw_bezier(0.0, 0.0, 0.0, 10.0, 10.0, 10.0, 10.0, 0.0);
        assert_eq!(vertex_count(&g), 4 * 6);
        // square cap reaches one half width past the end point
        let max_x = g
            .list()
            .vertices_2d()
            .iter()
            .map(|v| v.position[0])
            .fold(f32::MIN, f32::max);
        assert!(max_x >= 10.0);
    }

    #[test]
    fn test_color_is_per_vertex() {
        let mut g = frame();
        g.set_color(255, 0, 0);
        g.draw_triangle(0.0, 0.0, 1.0, 0.0, 0.0, 1.0);
        g.set_color_f(Color::BLUE);
        g.draw_triangle(0.0, 0.0, 1.0, 0.0, 0.0, 1.0);
        let colors: Vec<_> = g.list().vertices_2d().iter().map(|v| v.color).collect();
        assert_eq!(colors[0], Color::RED.to_array());
        assert_eq!(colors[3], Color::BLUE.to_array());
    }
}
