use egui::{Color32, Rect, pos2, vec2};
use futures::executor::block_on;
use image::{Rgba, RgbaImage};
use layered_canvas::geometry::Reprojection;
use layered_canvas::widgets::Corner;
use layered_canvas::{
    Bitmap, CanvasError, CompositionSnapshot, EditorState, LayerId, ReorderDirection, render_for_generation,
    render_preview,
};

fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255]))
}

fn solid(width: u32, height: u32, color: [u8; 4]) -> Bitmap {
    Bitmap::from_pixels(RgbaImage::from_pixel(width, height, Rgba(color))).unwrap()
}

fn assert_close(actual: &Rgba<u8>, expected: [u8; 4]) {
    let close = actual.0.iter().zip(expected).all(|(a, e)| a.abs_diff(e) <= 2);
    assert!(close, "expected {:?}, got {:?}", expected, actual);
}

/// 1000x800 gradient base shown at 400x320 in the workspace's top-left corner
fn canvas_with_base() -> (EditorState, LayerId) {
    let mut state = EditorState::default();
    let base = state.add_layer(Bitmap::from_pixels(gradient(1000, 800)).unwrap(), pos2(0.0, 0.0));
    assert_eq!(state.layers.get(base).unwrap().size(), vec2(400.0, 320.0));
    (state, base)
}

#[test]
fn test_reprojection_scales_relative_to_base() {
    let projection = Reprojection::new(
        Rect::from_min_size(pos2(0.0, 0.0), vec2(400.0, 320.0)),
        vec2(1000.0, 800.0),
    );

    let placed = projection.rect(Rect::from_min_size(pos2(40.0, 32.0), vec2(80.0, 64.0)));

    assert_eq!(placed, Rect::from_min_size(pos2(100.0, 80.0), vec2(200.0, 160.0)));
    assert_eq!(projection.width(4.0), 10.0);
}

#[test]
fn test_overlay_lands_at_native_scale() {
    let (mut state, base) = canvas_with_base();
    state.add_layer(solid(80, 64, [255, 0, 0, 255]), pos2(40.0, 32.0));
    let snapshot = CompositionSnapshot::capture(&state);

    let composite = block_on(render_for_generation(&snapshot, Some(base))).unwrap();

    assert_eq!(composite.dimensions(), (1000, 800));
    assert_close(composite.get_pixel(100, 80), [255, 0, 0, 255]);
    assert_close(composite.get_pixel(150, 120), [255, 0, 0, 255]);
    assert_close(composite.get_pixel(299, 239), [255, 0, 0, 255]);
    // Just outside the overlay the base shows through untouched
    let base_pixels = gradient(1000, 800);
    assert_eq!(composite.get_pixel(99, 79), base_pixels.get_pixel(99, 79));
    assert_eq!(composite.get_pixel(300, 240), base_pixels.get_pixel(300, 240));
    assert_eq!(composite.get_pixel(777, 555), base_pixels.get_pixel(777, 555));
}

#[test]
fn test_stroke_width_follows_base_scale() {
    let (mut state, base) = canvas_with_base();
    let stroke = state.strokes.begin_stroke(pos2(200.0, 0.0), Color32::BLACK, 4.0);
    state.strokes.append_point(stroke, pos2(200.0, 320.0)).unwrap();
    state.strokes.finish_stroke(stroke).unwrap();
    let snapshot = CompositionSnapshot::capture(&state);

    let composite = block_on(render_for_generation(&snapshot, Some(base))).unwrap();

    assert_close(composite.get_pixel(500, 400), [0, 0, 0, 255]);
    assert_close(composite.get_pixel(503, 400), [0, 0, 0, 255]);
    assert_eq!(composite.get_pixel(490, 400), gradient(1000, 800).get_pixel(490, 400));
}

#[test]
fn test_oversized_overlay_keeps_visible_pixels() {
    let (mut state, base) = canvas_with_base();
    let split = RgbaImage::from_fn(40, 40, |x, _| {
        if x < 20 { Rgba([255, 0, 0, 255]) } else { Rgba([0, 0, 255, 255]) }
    });
    let overlay = state.add_layer(Bitmap::from_pixels(split).unwrap(), pos2(0.0, 0.0));
    let start = state.layers.get(overlay).unwrap().rect();
    assert!(state.layers.resize_from(overlay, Corner::BottomRight, start, vec2(4000.0, 0.0)).unwrap());
    // 4040x4040 box with only its bottom-right corner over the base; the red half is far off-canvas
    state.layers.move_to(overlay, pos2(-3800.0, -3840.0)).unwrap();
    let snapshot = CompositionSnapshot::capture(&state);

    let composite = block_on(render_for_generation(&snapshot, Some(base))).unwrap();

    assert_eq!(composite.dimensions(), (1000, 800));
    assert_close(composite.get_pixel(0, 0), [0, 0, 255, 255]);
    assert_close(composite.get_pixel(300, 250), [0, 0, 255, 255]);
    assert_close(composite.get_pixel(590, 490), [0, 0, 255, 255]);
    let base_pixels = gradient(1000, 800);
    assert_eq!(composite.get_pixel(610, 510), base_pixels.get_pixel(610, 510));
    assert_eq!(composite.get_pixel(900, 100), base_pixels.get_pixel(900, 100));
}

#[test]
fn test_long_zigzag_stroke_composites() {
    let mut state = EditorState::default();
    let base = state.add_layer(Bitmap::from_pixels(gradient(2000, 1500)).unwrap(), pos2(0.0, 0.0));
    assert_eq!(state.layers.get(base).unwrap().size(), vec2(400.0, 300.0));
    let stroke = state.strokes.begin_stroke(pos2(20.0, 10.0), Color32::BLACK, 4.0);
    for i in 1..300 {
        let y = if i % 2 == 0 { 10.0 } else { 290.0 };
        state.strokes.append_point(stroke, pos2(20.0 + i as f32 * 1.2, y)).unwrap();
    }
    state.strokes.finish_stroke(stroke).unwrap();
    let snapshot = CompositionSnapshot::capture(&state);

    let composite = block_on(render_for_generation(&snapshot, Some(base))).unwrap();

    assert_eq!(composite.dimensions(), (2000, 1500));
    // First leg runs from native (100, 50) to (106, 1450)
    assert_close(composite.get_pixel(103, 750), [0, 0, 0, 255]);
    let base_pixels = gradient(2000, 1500);
    assert_eq!(composite.get_pixel(1950, 750), base_pixels.get_pixel(1950, 750));
    assert_eq!(composite.get_pixel(500, 20), base_pixels.get_pixel(500, 20));
}

#[test]
fn test_drawing_only_canvas_uses_workspace_size() {
    let mut state = EditorState::default();
    state.workspace_size = vec2(320.0, 240.0);
    state.strokes.begin_stroke(pos2(10.0, 10.0), Color32::RED, 6.0);
    let snapshot = CompositionSnapshot::capture(&state);

    let composite = block_on(render_for_generation(&snapshot, None)).unwrap();

    assert_eq!(composite.dimensions(), (320, 240));
    assert_close(composite.get_pixel(10, 10), [255, 0, 0, 255]);
}

#[test]
fn test_unknown_base_falls_back_to_preview() {
    let (state, _) = canvas_with_base();
    let snapshot = CompositionSnapshot::capture(&state);

    let composite = block_on(render_for_generation(&snapshot, Some(LayerId::next()))).unwrap();

    assert_eq!(composite.dimensions(), (1024, 768));
}

#[test]
fn test_undecodable_layer_is_skipped() {
    let (mut state, base) = canvas_with_base();
    state.add_layer(Bitmap::from_encoded(vec![1u8, 2, 3], 80, 64).unwrap(), pos2(40.0, 32.0));
    let snapshot = CompositionSnapshot::capture(&state);

    let composite = block_on(render_for_generation(&snapshot, Some(base))).unwrap();

    assert_eq!(composite.dimensions(), (1000, 800));
    assert_eq!(composite.get_pixel(150, 120), gradient(1000, 800).get_pixel(150, 120));
}

#[test]
fn test_undecodable_base_falls_back_to_preview() {
    let mut state = EditorState::default();
    let base = state.add_layer(Bitmap::from_encoded(vec![0u8; 16], 1000, 800).unwrap(), pos2(0.0, 0.0));
    state.strokes.begin_stroke(pos2(50.0, 50.0), Color32::BLACK, 4.0);
    let snapshot = CompositionSnapshot::capture(&state);

    let composite = block_on(render_for_generation(&snapshot, Some(base))).unwrap();

    assert_eq!(composite.dimensions(), (1024, 768));
}

#[test]
fn test_empty_canvas_is_refused() {
    let snapshot = CompositionSnapshot::capture(&EditorState::default());
    assert!(matches!(
        block_on(render_for_generation(&snapshot, None)),
        Err(CanvasError::NothingToCompose)
    ));
}

#[test]
fn test_preview_respects_z_order() {
    let mut state = EditorState::default();
    let red = state.add_layer(solid(100, 100, [255, 0, 0, 255]), pos2(0.0, 0.0));
    state.add_layer(solid(100, 100, [0, 255, 0, 255]), pos2(50.0, 50.0));

    let preview = render_preview(&CompositionSnapshot::capture(&state));
    assert_eq!(*preview.get_pixel(75, 75), Rgba([0, 255, 0, 255]));

    state.layers.reorder(red, ReorderDirection::Up).unwrap();
    let preview = render_preview(&CompositionSnapshot::capture(&state));
    assert_eq!(*preview.get_pixel(75, 75), Rgba([255, 0, 0, 255]));
    assert_eq!(*preview.get_pixel(500, 500), Rgba([255, 255, 255, 255]));
}
