//! End-to-end painter scenarios
//!
//! These tests verify that:
//! - Full and incremental repaints produce identical pixels
//! - Incremental repaints leave clean levels byte-for-byte untouched
//! - Motion blur trails decay, resize is idempotent, loading overlays clean up
//! - Export and sprite conversion produce decodable images

use std::ops::ControlFlow;
use std::rc::Rc;

use strata_core::{
    BrushError, DirtySet, MemoryScene, SceneStore, Shape, ShapeDelta, ShapeId, ShapeKind, ShapeRegistry, ShapeSet,
    ShapeStyle, TraversalOrder, UpdateQueue, ZLevel,
};
use strata_paint::{decode_rgba, CapturedFrame, Color, ImageFormat, Surface};
use strata_render::{
    FixedContainer, LayerConfig, LoadingOptions, Painter, PainterConfig, RenderError, SurfaceBackend, SurfaceId,
};

const SIZE: f32 = 10.0;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn rect(id: &str, zlevel: ZLevel, x: f32, color: Color) -> Shape {
    Shape::new(id, ShapeKind::RECTANGLE)
        .with_zlevel(zlevel)
        .with_style(ShapeStyle::rect(x, 0.0, 4.0, 4.0).with_color(color))
}

fn three_level_scene() -> MemoryScene {
    let mut scene = MemoryScene::new();
    scene.add(rect("low", 0, 0.0, Color::RED));
    scene.add(rect("mid", 1, 2.0, Color::GREEN));
    scene.add(rect("high", 2, 4.0, Color::BLUE));
    scene
}

fn painter_with(scene: MemoryScene, config: PainterConfig) -> Painter<MemoryScene> {
    init_tracing();
    Painter::new(FixedContainer::new(SIZE, SIZE), scene, ShapeRegistry::with_builtins(), config).unwrap()
}

fn painter(scene: MemoryScene) -> Painter<MemoryScene> {
    painter_with(scene, PainterConfig::default())
}

fn snapshot(painter: &Painter<MemoryScene>) -> Vec<(SurfaceId, CapturedFrame)> {
    painter
        .surfaces()
        .paint_order()
        .into_iter()
        .map(|id| (id, painter.surface(id).unwrap().capture()))
        .collect()
}

fn level(painter: &Painter<MemoryScene>, z: ZLevel) -> CapturedFrame {
    painter.surface(SurfaceId::Level(z)).unwrap().capture()
}

#[test]
fn test_render_paints_every_level_bottom_to_top() {
    let mut painter = painter(three_level_scene());
    let stats = painter.render().unwrap();

    assert_eq!(stats.shapes_painted, 3);
    // background plus levels 0..=2
    assert_eq!(stats.levels_cleared, 4);
    assert_eq!(level(&painter, 0).get_pixel(0, 0), Some([255, 0, 0, 255]));
    assert_eq!(level(&painter, 1).get_pixel(2, 0), Some([0, 255, 0, 255]));
    assert_eq!(level(&painter, 2).get_pixel(4, 0), Some([0, 0, 255, 255]));

    // Overlaps resolve to the higher level
    let frame = painter.compose();
    assert_eq!(frame.pixel(3, 0), Some([0, 255, 0, 255]));
    assert_eq!(frame.pixel(5, 0), Some([0, 0, 255, 255]));
    assert!(painter.scene().dirty_zlevels().is_empty());
}

#[test]
fn test_update_repaints_only_the_changed_level() {
    let mut painter = painter(three_level_scene());
    painter.render().unwrap();
    let before = snapshot(&painter);

    let stats = painter
        .update([ShapeDelta::new("mid").style(ShapeStyle::rect(6.0, 6.0, 2.0, 2.0).with_color(Color::WHITE))])
        .unwrap();
    assert_eq!(stats.levels_cleared, 1);
    assert_eq!(stats.shapes_painted, 1);

    for (id, frame) in snapshot(&painter) {
        let old = &before.iter().find(|(old_id, _)| *old_id == id).unwrap().1;
        if id == SurfaceId::Level(1) {
            // 16 pixels of the old rect gone, 4 of the new one drawn
            assert_eq!(frame.diff_pixel_count(old), 20);
            assert_eq!(frame.get_pixel(2, 0), Some([0, 0, 0, 0]));
            assert_eq!(frame.get_pixel(7, 7), Some([255, 255, 255, 255]));
        } else {
            assert!(frame.is_identical_to(old), "{} changed", id);
        }
    }
}

#[test]
fn test_refresh_all_matches_render() {
    let mut painter = painter(three_level_scene());
    painter.render().unwrap();
    let rendered = snapshot(&painter);

    painter.scene_mut().mark_all_dirty();
    let stats = painter.refresh().unwrap();
    assert_eq!(stats.levels_cleared, 4);
    assert_eq!(snapshot(&painter), rendered);
}

#[test]
fn test_refresh_of_one_dirty_level_matches_full_repaint() {
    let mut painter = painter(three_level_scene());
    painter.render().unwrap();
    let before = snapshot(&painter);

    painter.scene_mut().add(rect("extra", 2, 0.0, Color::WHITE));
    assert_eq!(painter.scene().dirty_zlevels(), [2].into_iter().collect::<DirtySet>());
    painter.refresh().unwrap();

    for ((id, frame), (_, old)) in snapshot(&painter).into_iter().zip(&before) {
        if id != SurfaceId::Level(2) {
            assert!(frame.is_identical_to(old), "{} changed", id);
        }
    }

    let mut reference_scene = three_level_scene();
    reference_scene.add(rect("extra", 2, 0.0, Color::WHITE));
    let mut reference = painter_with(reference_scene, PainterConfig::default());
    reference.render().unwrap();
    assert!(level(&painter, 2).is_identical_to(&level(&reference, 2)));
}

#[test]
fn test_motion_blur_residual_decays_geometrically() {
    let mut scene = MemoryScene::new();
    scene.add(
        Shape::new("fill", ShapeKind::RECTANGLE)
            .with_style(ShapeStyle::rect(0.0, 0.0, SIZE, SIZE).with_color(Color::RED)),
    );
    let mut painter = painter(scene);
    painter.configure_layer(
        SurfaceId::Level(0),
        LayerConfig::new().with_motion_blur(true).with_last_frame_alpha(0.5),
    );
    painter.render().unwrap();
    assert_eq!(level(&painter, 0).get_pixel(5, 5), Some([255, 0, 0, 255]));

    let mut expected = 255.0_f32;
    for _ in 0..3 {
        painter.clear_layer(SurfaceId::Level(0));
        expected *= 0.5;
        let [r, _, _, a] = level(&painter, 0).get_pixel(5, 5).unwrap();
        assert!((a as f32 - expected).abs() <= 2.0, "alpha {} expected {}", a, expected);
        assert_eq!(r, a);
    }
}

#[test]
fn test_configure_layer_merges_in_call_order() {
    let mut painter = painter(three_level_scene());
    painter.configure_layer(SurfaceId::Level(1), LayerConfig::new().with_clear_color(Color::BLACK));
    painter.configure_layer(SurfaceId::Level(1), LayerConfig::new().with_last_frame_alpha(0.2));
    painter.configure_layer(SurfaceId::Hover, LayerConfig::new().with_motion_blur(true));

    let config = painter.layer_config(SurfaceId::Level(1)).unwrap();
    assert_eq!(config.clear_color, Some(Color::BLACK));
    assert_eq!(config.last_frame_alpha, Some(0.2));
    assert!(!config.motion_blur_enabled());
    assert!(painter.layer_config(SurfaceId::Hover).is_none());

    painter.render().unwrap();
    assert_eq!(level(&painter, 1).get_pixel(9, 9), Some([0, 0, 0, 255]));
}

#[test]
fn test_background_clear_color_from_config() {
    let config = PainterConfig::from_toml_str(
        r##"
        [background]
        clear_color = "#0000ff"
        "##,
    )
    .unwrap();
    let mut painter = painter_with(three_level_scene(), config);
    painter.render().unwrap();
    assert_eq!(
        painter.surface(SurfaceId::Background).unwrap().pixel(9, 9),
        Some([0, 0, 255, 255])
    );
}

#[test]
fn test_resize_is_idempotent() {
    let host = Rc::new(FixedContainer::new(SIZE, SIZE));
    let mut painter = Painter::new(
        host.clone(),
        three_level_scene(),
        ShapeRegistry::with_builtins(),
        PainterConfig::default(),
    )
    .unwrap();
    painter.render().unwrap();

    host.set_size(20.0, 12.0);
    let stats = painter.resize().unwrap().expect("size changed");
    assert_eq!(stats.shapes_painted, 3);
    assert_eq!(painter.hover_surface().pixel_size(), (20, 12));

    let before = snapshot(&painter);
    assert!(painter.resize().unwrap().is_none());
    assert!(painter.resize_to(20.0, 12.0).unwrap().is_none());
    assert!(painter.scene().dirty_zlevels().is_empty());
    assert_eq!(snapshot(&painter), before);
}

#[test]
fn test_levels_only_grow() {
    let mut painter = painter(three_level_scene());
    assert_eq!(painter.surfaces().max_level(), 2);

    painter.update([ShapeDelta::new("high").zlevel(0)]).unwrap();
    assert_eq!(painter.surfaces().max_level(), 2);
    assert_eq!(painter.surfaces().surface_count(), 5);

    painter.update([ShapeDelta::new("high").zlevel(4)]).unwrap();
    assert_eq!(painter.surfaces().max_level(), 4);
    assert_eq!(level(&painter, 4).get_pixel(4, 0), Some([0, 0, 255, 255]));
}

#[test]
fn test_loading_overlay_lifecycle() {
    let mut painter = painter(three_level_scene());
    painter.render().unwrap();
    let main_before = snapshot(&painter);

    painter.show_loading(LoadingOptions::new().with_text("Loading")).unwrap();
    assert!(painter.is_loading());
    assert!(!painter.hover_surface().capture().is_blank());
    assert_eq!(painter.scene().hover_len(), 0);
    assert_eq!(painter.tick_loading().unwrap(), 1);

    painter.hide_loading();
    assert!(!painter.is_loading());
    assert!(painter.hover_surface().capture().is_blank());
    assert_eq!(painter.tick_loading().unwrap(), 0);

    // The overlay never touches main levels
    for ((id, frame), (_, old)) in snapshot(&painter).into_iter().zip(&main_before) {
        if id != SurfaceId::Hover {
            assert!(frame.is_identical_to(old));
        }
    }
}

#[test]
fn test_render_stops_loading() {
    let mut painter = painter(three_level_scene());
    painter.show_loading(LoadingOptions::new()).unwrap();
    painter.render().unwrap();
    assert!(!painter.is_loading());
    assert!(painter.hover_surface().capture().is_blank());
}

#[test]
fn test_unknown_loading_effect() {
    let mut painter = painter(three_level_scene());
    let err = painter
        .show_loading(LoadingOptions::new().with_effect("whirl"))
        .unwrap_err();
    assert!(matches!(err, RenderError::UnknownEffect(_)));
    assert!(!painter.is_loading());
}

#[test]
fn test_failed_restart_takes_old_animation_off_the_overlay() {
    let mut painter = painter(three_level_scene());
    painter.show_loading(LoadingOptions::new()).unwrap();
    assert!(!painter.hover_surface().capture().is_blank());

    let err = painter
        .show_loading(LoadingOptions::new().with_effect("whirl"))
        .unwrap_err();
    assert!(matches!(err, RenderError::UnknownEffect(_)));
    assert!(!painter.is_loading());
    assert!(painter.hover_surface().capture().is_blank());
    assert_eq!(painter.tick_loading().unwrap(), 0);
}

#[test]
fn test_refresh_hover_draws_and_discards() {
    let mut painter = painter(three_level_scene());
    painter.scene_mut().add_hover(rect("hl", 7, 0.0, Color::WHITE));

    let stats = painter.refresh_hover().unwrap();
    assert_eq!(stats.shapes_painted, 1);
    assert_eq!(painter.hover_surface().pixel(1, 1), Some([255, 255, 255, 255]));
    assert_eq!(painter.scene().hover_len(), 0);
    // Hover shapes don't allocate levels
    assert_eq!(painter.surfaces().max_level(), 2);
}

fn failing_registry() -> ShapeRegistry {
    let mut registry = ShapeRegistry::with_builtins();
    registry.register(
        "broken",
        |_: &mut Surface, _: &Shape, _: bool, _: &mut UpdateQueue| Err::<(), _>(BrushError::Failed("no ink".into())),
    );
    registry
}

#[test]
fn test_brush_errors_isolated_by_default() {
    let mut scene = three_level_scene();
    scene.add(Shape::new("bad", "broken").with_zlevel(1));
    scene.add(Shape::new("unknown", "hexagon").with_zlevel(1));

    init_tracing();
    let mut painter = Painter::new(
        FixedContainer::new(SIZE, SIZE),
        scene,
        failing_registry(),
        PainterConfig::default(),
    )
    .unwrap();
    let stats = painter.render().unwrap();
    assert_eq!(stats.failures, 2);
    assert_eq!(stats.shapes_painted, 3);
}

#[test]
fn test_brush_errors_propagate_when_not_caught() {
    let mut scene = three_level_scene();
    scene.add(Shape::new("bad", "broken").with_zlevel(1));

    init_tracing();
    let config = PainterConfig {
        catch_brush_errors: false,
        ..Default::default()
    };
    let mut painter = Painter::new(FixedContainer::new(SIZE, SIZE), scene, failing_registry(), config).unwrap();
    let err = painter.render().unwrap_err();
    match err {
        RenderError::Brush { kind, id, .. } => {
            assert_eq!(kind.as_str(), "broken");
            assert_eq!(id.as_str(), "bad");
        }
        other => panic!("unexpected error {:?}", other),
    }
    // Traversal stopped before level 2
    assert!(level(&painter, 2).is_blank());
}

/// A store that reports a lower maximum z-level than it holds
struct StaleMaxScene(MemoryScene);

impl SceneStore for StaleMaxScene {
    fn max_zlevel(&self) -> ZLevel {
        0
    }

    fn visit_shapes(&self, set: ShapeSet, order: TraversalOrder, visitor: &mut dyn FnMut(&Shape) -> ControlFlow<()>) {
        self.0.visit_shapes(set, order, visitor)
    }

    fn dirty_zlevels(&self) -> DirtySet {
        self.0.dirty_zlevels()
    }

    fn clear_dirty(&mut self) {
        self.0.clear_dirty()
    }

    fn mark_all_dirty(&mut self) {
        self.0.mark_all_dirty()
    }

    fn merge_shape(&mut self, delta: ShapeDelta) -> bool {
        self.0.merge_shape(delta)
    }

    fn add_hover(&mut self, shape: Shape) {
        self.0.add_hover(shape)
    }

    fn discard_hover_shapes(&mut self) {
        self.0.discard_hover_shapes()
    }
}

#[test]
fn test_missing_surface_is_skipped() {
    init_tracing();
    let mut painter = Painter::new(
        FixedContainer::new(SIZE, SIZE),
        StaleMaxScene(three_level_scene()),
        ShapeRegistry::with_builtins(),
        PainterConfig::default(),
    )
    .unwrap();

    let stats = painter.render().unwrap();
    assert_eq!(stats.shapes_painted, 1);
    assert_eq!(stats.shapes_skipped, 2);
    assert!(painter.surface(SurfaceId::Level(1)).is_none());
}

/// A painter whose single "spin" shape queues `rotation + 1` every time it
/// is drawn
fn spinner_painter() -> Painter<MemoryScene> {
    let mut registry = ShapeRegistry::with_builtins();
    registry.register(
        "spinner",
        |_: &mut Surface, shape: &Shape, _: bool, updates: &mut UpdateQueue| {
            updates.push(ShapeDelta::new(shape.id.clone()).rotation(shape.rotation + 1.0));
            Ok::<(), BrushError>(())
        },
    );
    let mut scene = MemoryScene::new();
    scene.add(Shape::new("spin", "spinner"));

    init_tracing();
    Painter::new(FixedContainer::new(SIZE, SIZE), scene, registry, PainterConfig::default()).unwrap()
}

fn spin_rotation(painter: &Painter<MemoryScene>) -> f32 {
    painter.scene().get(&ShapeId::from("spin")).unwrap().rotation
}

#[test]
fn test_routine_updates_get_one_follow_up() {
    let mut painter = spinner_painter();

    let stats = painter.render().unwrap();
    // The render pass plus exactly one follow-up
    assert_eq!(stats.shapes_painted, 2);
    assert_eq!(painter.pending_updates(), 1);
    assert_eq!(spin_rotation(&painter), 1.0);

    // The leftover merges at the start of the next refresh
    painter.refresh().unwrap();
    assert_eq!(spin_rotation(&painter), 3.0);
    assert_eq!(painter.pending_updates(), 1);
}

#[test]
fn test_explicit_update_wins_over_queued_routine_delta() {
    let mut painter = spinner_painter();
    painter.render().unwrap();
    // rotation 2.0 is still queued from the follow-up pass
    assert_eq!(painter.pending_updates(), 1);

    painter.update([ShapeDelta::new("spin").rotation(100.0)]).unwrap();
    // 100 from the caller, then +1 from the follow-up pass
    assert_eq!(spin_rotation(&painter), 101.0);
    assert_eq!(painter.pending_updates(), 1);
}

#[test]
fn test_export_flattens_over_background() {
    let mut painter = painter(three_level_scene());
    let bytes = painter.export_image(ImageFormat::Png, None).unwrap().unwrap();
    let image = decode_rgba(&bytes).unwrap();

    assert_eq!(image.dimensions(), (10, 10));
    assert_eq!(image.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(image.get_pixel(3, 0).0, [0, 255, 0, 255]);
    assert_eq!(image.get_pixel(5, 0).0, [0, 0, 255, 255]);
    assert_eq!(image.get_pixel(9, 9).0, [255, 255, 255, 255]);

    let jpeg = painter
        .export_image(ImageFormat::Jpeg, Some(Color::BLACK))
        .unwrap()
        .unwrap();
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
}

#[test]
fn test_shim_backend_disables_export() {
    let config = PainterConfig {
        surface_backend: SurfaceBackend::Shim,
        device_pixel_ratio: 2.0,
        ..Default::default()
    };
    let mut painter = painter_with(three_level_scene(), config);
    painter.render().unwrap();
    assert_eq!(painter.hover_surface().pixel_size(), (10, 10));
    assert!(painter.export_image(ImageFormat::Png, None).unwrap().is_none());

    let mut shape = rect("s", 0, 0.0, Color::RED).with_position(3.0, 3.0);
    let same = painter.shape_to_image("sprite", &mut shape, 4.0, 4.0).unwrap();
    assert_eq!(same.id, shape.id);
    assert_eq!(same.kind, ShapeKind::RECTANGLE);
}

#[test]
fn test_shape_to_image_bakes_untransformed_shape() {
    let mut painter = painter(MemoryScene::new());
    let mut shape = rect("s", 3, 0.0, Color::RED)
        .with_position(5.0, 5.0)
        .with_rotation(0.5)
        .with_scale(2.0, 2.0);

    let sprite = painter.shape_to_image("sprite", &mut shape, 4.0, 4.0).unwrap();
    assert_eq!(sprite.kind, ShapeKind::IMAGE);
    assert_eq!(sprite.id.as_str(), "sprite");
    assert_eq!(sprite.zlevel, 3);
    assert_eq!(sprite.position, shape.position);
    assert_eq!(sprite.rotation, 0.5);
    assert_eq!(sprite.scale, (2.0, 2.0));
    // The source keeps its transform
    assert_eq!(shape.position.x, 5.0);

    let image = sprite.style.image.as_ref().unwrap().decoded().unwrap();
    assert_eq!(image.dimensions(), (4, 4));
    assert!(image.pixels().all(|px| px.0 == [255, 0, 0, 255]));

    // The sprite surface is reused and cleared between calls
    let mut small = rect("t", 0, 0.0, Color::GREEN).with_style(ShapeStyle::rect(0.0, 0.0, 1.0, 1.0).with_color(Color::GREEN));
    let second = painter.shape_to_image("sprite2", &mut small, 4.0, 4.0).unwrap();
    let image = second.style.image.as_ref().unwrap().decoded().unwrap();
    assert_eq!(image.get_pixel(0, 0).0, [0, 255, 0, 255]);
    assert_eq!(image.get_pixel(3, 3).0, [0, 0, 0, 0]);
}

#[test]
fn test_dispose_returns_scene() {
    let mut painter = painter(three_level_scene());
    painter.show_loading(LoadingOptions::new()).unwrap();
    let scene = painter.dispose();
    assert_eq!(scene.len(), 3);
    assert_eq!(scene.hover_len(), 0);
}
