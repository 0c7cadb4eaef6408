//! Headless demo: draws a 2D grid of shapes and a lit 3D scene every frame
//! and reports how many draw calls were needed.

use oflike_app::{App, AppArgs, AppContext, AppHandler, DefaultAppArgs};
use oflike_core::math::Vec3;
use oflike_core::{Color, Light, Material};
use oflike_draw::{Camera, Graphics};
use oflike_graphics::LightSlot;

#[derive(Default)]
struct Gallery {
    angle: f32,
    light: Option<LightSlot>,
}

impl AppHandler for Gallery {
    fn setup(&mut self, g: &mut Graphics, _ctx: &AppContext) {
        g.background(30, 30, 36);
        self.light = g.register_light(Light::point(Vec3::new(200.0, 300.0, 400.0)));
    }

    fn update(&mut self, ctx: &AppContext) -> bool {
        self.angle = (self.angle + 45.0 * ctx.delta_time()) % 360.0;
        true
    }

    fn draw(&mut self, g: &mut Graphics, ctx: &AppContext) {
        for row in 0..8 {
            for col in 0..12 {
                let x = 40.0 + col as f32 * 60.0;
                let y = 40.0 + row as f32 * 60.0;
                g.set_color((col * 20) as u8, (row * 30) as u8, 200);
                if (row + col) % 2 == 0 {
                    g.draw_rect_rounded(x - 20.0, y - 20.0, 40.0, 40.0, 8.0);
                } else {
                    g.draw_circle(x, y, 20.0);
                }
            }
        }

        g.no_fill();
        g.set_line_width(2.0);
        g.set_color(255, 255, 255);
        g.begin_shape();
        for i in 0..6 {
            let t = i as f32 / 6.0 * std::f32::consts::TAU;
            g.vertex(900.0 + 60.0 * t.cos(), 120.0 + 60.0 * t.sin());
        }
        g.end_shape(true);
        g.fill();

        let Some(light) = self.light else {
            return;
        };
        g.enable_depth_test();
        g.enable_light(light);
        {
            let eye = Vec3::new(0.0, 150.0, 600.0);
            let mut cam = g.begin_camera(&Camera::new(eye, Vec3::zeros()).with_fov(50.0));
            cam.rotate_3d(self.angle, Vec3::y());
            let mut m = cam.begin_material(
                &Material::default()
                    .with_diffuse(Color::from_rgba8(220, 120, 60, 255))
                    .with_shininess(32.0),
            );
            m.draw_box(120.0, 120.0, 120.0);
            m.translate_3d(200.0, 0.0, 0.0);
            m.draw_sphere(60.0);
            m.translate_3d(-400.0, 0.0, 0.0);
            m.draw_cone(60.0, 120.0);
        }
        g.disable_light(light);
        g.disable_depth_test();

        if ctx.frame_number() == 0 {
            log::info!(
                "first frame recorded {} commands",
                g.list().command_count()
            );
        }
    }
}

fn main() {
    let args = DefaultAppArgs::parse();
    let args = match args.max_frames() {
        Some(_) => args,
        None => args.with_max_frames(60),
    };

    match App::run(Gallery::default(), args) {
        Ok(summary) => println!(
            "{} frames, {} dropped, {:.1} draw calls per frame",
            summary.frames,
            summary.dropped_frames,
            summary.draw_calls as f64 / summary.frames.max(1) as f64
        ),
        Err(err) => {
            eprintln!("oflike-headless: {err}");
            std::process::exit(1);
        }
    }
}
