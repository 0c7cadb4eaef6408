//! Draw list, optimizer and renderer integration tests.
//!
//! Backend-parameterized cases run against the dummy backend always and
//! against wgpu when the `wgpu-backend` feature is enabled and an adapter is
//! present:
//!
//! ```bash
//! cargo test -p oflike-graphics --features wgpu-backend --test pipeline_tests
//! ```

mod common;

use rstest::rstest;

use common::{Backend, assert_ranges_in_bounds, init_logging, record_mesh, record_rect};
use oflike_core::mesh::generators::{generate_box, generate_icosphere};
use oflike_core::mesh::PrimitiveTopology;
use oflike_core::{Color, Material};
use oflike_graphics::{
    BackendError, BlendMode, DrawCommand, DrawList, DummyBackend, FailurePoint, GpuBackend,
    GpuCall, GraphicsError, Renderer, RendererConfig, TextureHandle,
};

fn textured_backend() -> (DummyBackend, TextureHandle) {
    let mut backend = DummyBackend::new();
    let texture = backend.create_texture(2, 2, &[255; 16]).unwrap();
    (backend, texture)
}

/// A list mixing 2D, 3D, state changes and blended draws.
fn mixed_list() -> DrawList {
    let mut list = DrawList::new();
    list.add_command(DrawCommand::SetClear { color: Color::BLACK }).unwrap();
    for i in 0..5 {
        record_rect(&mut list, i as f32 * 10.0, 0.0, 8.0, 8.0, Color::RED);
    }
    record_mesh(&mut list, &generate_box(1.0, 1.0, 1.0, [1, 1, 1]), Material::default(), None);
    record_mesh(&mut list, &generate_icosphere(1.0, 1), Material::default(), None);
    list.add_command(DrawCommand::SetScissor { rect: None }).unwrap();
    for i in 0..3 {
        record_rect(&mut list, 0.0, i as f32 * 10.0, 8.0, 8.0, Color::BLUE);
    }
    record_mesh(
        &mut list,
        &generate_box(2.0, 1.0, 1.0, [1, 1, 1]),
        Material::default().with_shininess(32.0),
        None,
    );
    list
}

// ============================================================================
// Draw list invariants
// ============================================================================

#[test]
fn test_ranges_stay_in_bounds_through_optimize_and_sort() {
    init_logging();
    let mut list = mixed_list();
    assert_ranges_in_bounds(&list);
    list.optimize();
    assert_ranges_in_bounds(&list);
    list.sort_commands();
    assert_ranges_in_bounds(&list);
    list.optimize();
    assert_ranges_in_bounds(&list);
}

#[test]
fn test_optimize_twice_is_identical() {
    let mut once = mixed_list();
    once.optimize();
    let mut twice = once.clone();
    twice.optimize();
    assert_eq!(once, twice);
}

#[test]
fn test_merged_counts_are_preserved() {
    let mut list = mixed_list();
    let vertices_before = |list: &DrawList| -> (u32, u32) {
        list.commands()
            .iter()
            .filter_map(DrawCommand::range)
            .fold((0, 0), |(v, i), r| (v + r.vertex_count, i + r.index_count))
    };
    let (vertices, _) = vertices_before(&list);
    let triangles_3d: u32 = list
        .commands()
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Draw3D(d) => Some(d.range.element_count()),
            _ => None,
        })
        .sum();

    list.optimize();

    let (merged_vertices, _) = vertices_before(&list);
    assert_eq!(merged_vertices, vertices);
    let merged_triangles_3d: u32 = list
        .commands()
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Draw3D(d) => Some(d.range.element_count()),
            _ => None,
        })
        .sum();
    assert_eq!(merged_triangles_3d, triangles_3d);
    // five rects + two meshes, barrier, three rects + one mesh
    assert_eq!(list.command_count(), 6);
}

#[test]
fn test_reset_clears_everything() {
    let mut list = mixed_list();
    list.optimize();
    list.reset();
    assert_eq!(list.command_count(), 0);
    assert!(list.vertices_2d().is_empty());
    assert!(list.vertices_3d().is_empty());
    assert!(list.indices().is_empty());
}

#[test]
fn test_misplaced_clear_rejected() {
    let mut list = DrawList::new();
    record_rect(&mut list, 0.0, 0.0, 1.0, 1.0, Color::WHITE);
    assert!(list
        .add_command(DrawCommand::SetClear { color: Color::BLACK })
        .is_err());
    assert_eq!(list.command_count(), 1);
}

// ============================================================================
// Renderer
// ============================================================================

#[test]
fn test_shared_material_meshes_issue_one_indexed_draw() {
    init_logging();
    let (mut backend, texture) = textured_backend();
    let mut list = DrawList::new();
    let material = Material::default().with_shininess(16.0);
    record_mesh(&mut list, &generate_box(1.0, 1.0, 1.0, [1, 1, 1]), material, Some(texture));
    record_mesh(&mut list, &generate_icosphere(0.5, 1), material, Some(texture));

    list.optimize();
    assert_eq!(list.command_count(), 1);

    let stats = Renderer::default().render(&mut list, &mut backend).unwrap();
    assert_eq!(stats.draw_calls, 1);
    let draws: Vec<_> = backend.draw_calls().collect();
    assert_eq!(draws.len(), 1);
    assert!(matches!(
        draws[0],
        GpuCall::DrawIndexed {
            topology: PrimitiveTopology::Triangles,
            first: 0,
            ..
        }
    ));
}

#[rstest]
#[case::upload(FailurePoint::Upload)]
#[case::begin_pass(FailurePoint::BeginPass)]
fn test_dropped_frame_issues_no_draws(#[case] point: FailurePoint) {
    init_logging();
    let mut backend = DummyBackend::new();
    backend.inject_failure(point);
    let mut renderer = Renderer::default();
    let mut list = mixed_list();
    list.optimize();

    let err = renderer.render(&mut list, &mut backend).unwrap_err();
    assert_eq!(err, GraphicsError::Backend(BackendError::OutOfMemory));
    assert!(list.is_empty());
    assert_eq!(backend.draw_calls().count(), 0);
    assert!(!backend.in_pass());

    // the next frame is unaffected
    let mut list = mixed_list();
    let stats = renderer.render(&mut list, &mut backend).unwrap();
    assert!(stats.draw_calls > 0);
}

#[test]
fn test_failed_present_reports_error() {
    let mut backend = DummyBackend::new();
    backend.inject_failure(FailurePoint::Present);
    let mut list = mixed_list();
    let result = Renderer::default().render(&mut list, &mut backend);
    assert!(result.is_err());
    assert!(list.is_empty());
}

#[test]
fn test_foreign_texture_skipped_once_logged() {
    init_logging();
    let mut other = DummyBackend::with_device(oflike_graphics::DeviceId(9));
    let foreign = other.create_texture(1, 1, &[0; 4]).unwrap();
    let mut backend = DummyBackend::new();
    let mut renderer = Renderer::default();

    let mut list = DrawList::new();
    record_mesh(&mut list, &generate_box(1.0, 1.0, 1.0, [1, 1, 1]), Material::default(), Some(foreign));
    record_rect(&mut list, 0.0, 0.0, 4.0, 4.0, Color::WHITE);

    let stats = renderer.render(&mut list, &mut backend).unwrap();
    assert_eq!(stats.skipped_commands, 1);
    assert_eq!(stats.draw_calls, 1);
    assert!(!backend
        .calls()
        .iter()
        .any(|c| matches!(c, GpuCall::BindTexture { .. })));
}

#[test]
fn test_blended_draws_keep_order_after_sort() {
    let mut list = DrawList::new();
    let a = record_rect(&mut list, 0.0, 0.0, 1.0, 1.0, Color::RED);
    let mesh = record_mesh(&mut list, &generate_box(1.0, 1.0, 1.0, [1, 1, 1]), Material::default(), None);
    let b = record_rect(&mut list, 2.0, 0.0, 1.0, 1.0, Color::BLUE);
    list.sort_commands();

    let blends: Vec<_> = list.commands().iter().filter_map(DrawCommand::blend).collect();
    assert_eq!(blends, [BlendMode::Alpha, BlendMode::Opaque, BlendMode::Alpha]);
    assert_eq!(list.commands()[0].blend(), a.blend());
    assert_eq!(list.commands()[1].dimension(), mesh.dimension());
    assert_eq!(list.commands()[2].blend(), b.blend());
}

#[rstest]
#[case::dummy(Backend::Dummy)]
#[case::wgpu(Backend::Wgpu)]
fn test_render_mixed_frame(#[case] backend: Backend) {
    init_logging();
    let Some(mut gpu) = backend.create(64, 64) else {
        eprintln!("Backend {:?} not available, skipping", backend);
        return;
    };
    let mut renderer = Renderer::new(RendererConfig {
        width: 64,
        height: 64,
        ..Default::default()
    });
    for _ in 0..3 {
        let mut list = mixed_list();
        list.optimize();
        let stats = renderer.render(&mut list, gpu.as_mut()).unwrap();
        assert_eq!(stats.draw_calls, 4);
        assert_eq!(stats.skipped_commands, 0);
    }
    assert_eq!(renderer.frame_index(), 3);
}

#[cfg(feature = "wgpu-backend")]
#[test]
fn test_wgpu_clear_and_fill_readback() {
    init_logging();
    let Ok(mut gpu) = oflike_graphics::WgpuBackend::new(16, 16) else {
        eprintln!("wgpu backend not available, skipping");
        return;
    };
    let mut renderer = Renderer::new(RendererConfig {
        width: 16,
        height: 16,
        ..Default::default()
    });
    let mut list = DrawList::new();
    list.add_command(DrawCommand::SetClear { color: Color::BLUE }).unwrap();
    record_rect(&mut list, 0.0, 0.0, 8.0, 16.0, Color::RED);
    renderer.render(&mut list, &mut gpu).unwrap();

    let pixels = gpu.read_pixels().unwrap();
    let pixel = |x: usize, y: usize| &pixels[(y * 16 + x) * 4..(y * 16 + x) * 4 + 4];
    assert_eq!(pixel(2, 8), [255, 0, 0, 255]);
    assert_eq!(pixel(13, 8), [0, 0, 255, 255]);
}
