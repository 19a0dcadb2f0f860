use egui::{Vec2, pos2};
use image::RgbaImage;
use layered_canvas::{
    Bitmap, CanvasError, EditorState, Gesture, InteractionController, Key, KeyEvent, LayerId, PointerEvent,
    Selection, StrokeId, ToolKind,
};

fn create_bitmap(width: u32, height: u32) -> Bitmap {
    Bitmap::from_pixels(RgbaImage::new(width, height)).unwrap()
}

/// One 200x100 layer at (50, 50)
fn setup() -> (EditorState, InteractionController, LayerId) {
    let mut state = EditorState::default();
    let layer = state.add_layer(create_bitmap(200, 100), pos2(50.0, 50.0));
    (state, InteractionController::new(), layer)
}

fn key(key: Key) -> KeyEvent {
    KeyEvent { key, text_focus: false }
}

fn click(controller: &mut InteractionController, state: &mut EditorState, x: f32, y: f32) {
    controller.handle_pointer(PointerEvent::down(pos2(x, y)), state).unwrap();
    controller.handle_pointer(PointerEvent::up(pos2(x, y)), state).unwrap();
}

#[test]
fn test_drag_moves_layer_by_pointer_offset() {
    let (mut state, mut controller, layer) = setup();

    controller.handle_pointer(PointerEvent::down(pos2(60.0, 60.0)), &mut state).unwrap();
    assert!(matches!(controller.gesture(), Gesture::DraggingLayer { layer: l, .. } if *l == layer));
    assert_eq!(controller.state_name(), "DraggingLayer");

    controller.handle_pointer(PointerEvent::moved(pos2(160.0, 110.0)), &mut state).unwrap();
    controller.handle_pointer(PointerEvent::up(pos2(160.0, 110.0)), &mut state).unwrap();

    assert!(controller.gesture().is_idle());
    assert_eq!(state.layers.get(layer).unwrap().position(), pos2(150.0, 100.0));
    assert_eq!(state.selection(), Selection::Layer(layer));
}

#[test]
fn test_leave_ends_drag_like_up() {
    let (mut state, mut controller, layer) = setup();

    controller.handle_pointer(PointerEvent::down(pos2(60.0, 60.0)), &mut state).unwrap();
    controller.handle_pointer(PointerEvent::moved(pos2(70.0, 60.0)), &mut state).unwrap();
    controller.handle_pointer(PointerEvent::leave(pos2(70.0, 60.0)), &mut state).unwrap();
    assert!(controller.gesture().is_idle());

    // Moves after leaving no longer drag anything
    controller.handle_pointer(PointerEvent::moved(pos2(500.0, 500.0)), &mut state).unwrap();
    assert_eq!(state.layers.get(layer).unwrap().position(), pos2(60.0, 50.0));
}

#[test]
fn test_drag_never_retargets() {
    let mut state = EditorState::default();
    let mut controller = InteractionController::new();
    let dragged = state.add_layer(create_bitmap(100, 100), pos2(0.0, 0.0));
    let other = state.add_layer(create_bitmap(100, 100), pos2(300.0, 0.0));

    controller.handle_pointer(PointerEvent::down(pos2(50.0, 50.0)), &mut state).unwrap();
    controller.handle_pointer(PointerEvent::moved(pos2(350.0, 50.0)), &mut state).unwrap();
    // A second press over the other layer is ignored
    controller.handle_pointer(PointerEvent::down(pos2(350.0, 50.0)), &mut state).unwrap();
    controller.handle_pointer(PointerEvent::moved(pos2(360.0, 60.0)), &mut state).unwrap();
    controller.handle_pointer(PointerEvent::up(pos2(360.0, 60.0)), &mut state).unwrap();

    assert_eq!(state.layers.get(dragged).unwrap().position(), pos2(310.0, 10.0));
    assert_eq!(state.layers.get(other).unwrap().position(), pos2(300.0, 0.0));
    assert_eq!(state.selection(), Selection::Layer(dragged));
}

#[test]
fn test_click_on_empty_workspace_clears_selection() {
    let (mut state, mut controller, layer) = setup();
    click(&mut controller, &mut state, 60.0, 60.0);
    assert_eq!(state.selection(), Selection::Layer(layer));

    controller.handle_pointer(PointerEvent::down(pos2(900.0, 700.0)), &mut state).unwrap();

    assert!(controller.gesture().is_idle());
    assert!(state.selection().is_none());
}

#[test]
fn test_corner_handle_resizes_selected_layer() {
    let (mut state, mut controller, layer) = setup();
    click(&mut controller, &mut state, 60.0, 60.0);

    controller.handle_pointer(PointerEvent::down(pos2(250.0, 150.0)), &mut state).unwrap();
    assert!(matches!(controller.gesture(), Gesture::ResizingLayer { .. }));
    controller.handle_pointer(PointerEvent::moved(pos2(270.0, 152.0)), &mut state).unwrap();
    controller.handle_pointer(PointerEvent::moved(pos2(290.0, 155.0)), &mut state).unwrap();
    controller.handle_pointer(PointerEvent::up(pos2(290.0, 155.0)), &mut state).unwrap();

    let resized = state.layers.get(layer).unwrap();
    assert_eq!(resized.position(), pos2(50.0, 50.0));
    assert_eq!(resized.size(), egui::vec2(240.0, 120.0));
}

#[test]
fn test_stroke_drag_follows_cumulative_delta() {
    let (mut state, mut controller, _) = setup();
    let stroke = state.strokes.begin_stroke(pos2(400.0, 400.0), egui::Color32::BLUE, 4.0);
    state.strokes.append_point(stroke, pos2(450.0, 400.0)).unwrap();
    state.strokes.finish_stroke(stroke).unwrap();

    controller.handle_pointer(PointerEvent::down(pos2(425.0, 400.0)), &mut state).unwrap();
    assert!(matches!(controller.gesture(), Gesture::DraggingStroke { .. }));
    assert_eq!(state.selection(), Selection::Stroke(stroke));

    controller.handle_pointer(PointerEvent::moved(pos2(430.0, 405.0)), &mut state).unwrap();
    controller.handle_pointer(PointerEvent::moved(pos2(435.0, 420.0)), &mut state).unwrap();
    controller.handle_pointer(PointerEvent::up(pos2(435.0, 420.0)), &mut state).unwrap();

    assert_eq!(
        state.strokes.get(stroke).unwrap().points(),
        &[pos2(410.0, 420.0), pos2(460.0, 420.0)]
    );
}

#[test]
fn test_draw_tool_records_stroke_over_layer() {
    let (mut state, mut controller, layer) = setup();
    controller.set_tool(ToolKind::Draw, &mut state).unwrap();

    controller.handle_pointer(PointerEvent::down(pos2(60.0, 60.0)), &mut state).unwrap();
    assert_eq!(controller.state_name(), "Drawing");
    for x in [70.0, 80.0, 90.0] {
        controller.handle_pointer(PointerEvent::moved(pos2(x, 60.0)), &mut state).unwrap();
    }
    controller.handle_pointer(PointerEvent::up(pos2(90.0, 60.0)), &mut state).unwrap();

    assert_eq!(state.strokes.len(), 1);
    assert!(state.strokes.in_progress().is_none());
    let stroke = state.strokes.iter().next().unwrap();
    assert_eq!(stroke.points().len(), 4);
    assert_eq!(stroke.color(), state.brush.color);
    assert_eq!(state.layers.get(layer).unwrap().position(), pos2(50.0, 50.0));
}

#[test]
fn test_leave_finishes_stroke() {
    let (mut state, mut controller, _) = setup();
    controller.set_tool(ToolKind::Draw, &mut state).unwrap();

    controller.handle_pointer(PointerEvent::down(pos2(400.0, 400.0)), &mut state).unwrap();
    controller.handle_pointer(PointerEvent::moved(pos2(420.0, 400.0)), &mut state).unwrap();
    controller.handle_pointer(PointerEvent::leave(pos2(420.0, 400.0)), &mut state).unwrap();

    assert!(controller.gesture().is_idle());
    assert!(state.strokes.in_progress().is_none());
    assert_eq!(state.strokes.len(), 1);
}

#[test]
fn test_tool_switch_finishes_open_stroke() {
    let (mut state, mut controller, _) = setup();
    controller.set_tool(ToolKind::Draw, &mut state).unwrap();
    controller.handle_pointer(PointerEvent::down(pos2(400.0, 400.0)), &mut state).unwrap();
    controller.handle_pointer(PointerEvent::moved(pos2(410.0, 410.0)), &mut state).unwrap();

    controller.set_tool(ToolKind::Select, &mut state).unwrap();

    assert!(controller.gesture().is_idle());
    assert_eq!(state.active_tool(), ToolKind::Select);
    assert!(state.strokes.in_progress().is_none());
    assert_eq!(state.strokes.len(), 1);
}

#[test]
fn test_delete_key_removes_selection() {
    let (mut state, mut controller, layer) = setup();
    click(&mut controller, &mut state, 60.0, 60.0);

    let typing = KeyEvent { key: Key::Backspace, text_focus: true };
    assert!(!controller.handle_key(typing, &mut state).unwrap());
    assert!(state.layers.get(layer).is_some());

    assert!(controller.handle_key(key(Key::Delete), &mut state).unwrap());
    assert!(state.layers.get(layer).is_none());
    assert!(state.selection().is_none());
}

#[test]
fn test_delete_key_ignored_mid_gesture() {
    let (mut state, mut controller, layer) = setup();
    controller.handle_pointer(PointerEvent::down(pos2(60.0, 60.0)), &mut state).unwrap();

    assert!(!controller.handle_key(key(Key::Delete), &mut state).unwrap());
    assert!(state.layers.get(layer).is_some());
}

#[test]
fn test_escape_clears_selection_when_idle() {
    let (mut state, mut controller, _) = setup();
    click(&mut controller, &mut state, 60.0, 60.0);

    assert!(controller.handle_key(key(Key::Escape), &mut state).unwrap());
    assert!(state.selection().is_none());
    assert!(!controller.handle_key(key(Key::Escape), &mut state).unwrap());
}

#[test]
fn test_commands_refused_while_dragging() {
    let (mut state, mut controller, layer) = setup();
    controller.handle_pointer(PointerEvent::down(pos2(60.0, 60.0)), &mut state).unwrap();

    assert!(matches!(controller.raise(layer, &mut state), Err(CanvasError::GestureInProgress)));
    assert!(matches!(controller.delete_layer(layer, &mut state), Err(CanvasError::GestureInProgress)));
    assert!(matches!(controller.undo_stroke(&mut state), Err(CanvasError::GestureInProgress)));
    assert!(controller.start_crop(layer, &mut state).is_err());
    assert!(matches!(controller.gesture(), Gesture::DraggingLayer { .. }));

    controller.handle_pointer(PointerEvent::up(pos2(60.0, 60.0)), &mut state).unwrap();
    assert!(controller.raise(layer, &mut state).is_ok());
    assert!(controller.undo_stroke(&mut state).unwrap().is_none());
}

#[test]
fn test_gestures_only_pass_through_idle() {
    let layer = LayerId::next();
    let dragging = Gesture::DraggingLayer { layer, offset: Vec2::ZERO };
    let drawing = Gesture::Drawing { stroke: StrokeId::next() };

    assert!(!dragging.can_transition_to(&drawing));
    assert!(dragging.can_transition_to(&Gesture::Idle));
    assert!(Gesture::Idle.can_transition_to(&drawing));
}

#[test]
fn test_clear_canvas_empties_both_stores() {
    let (mut state, mut controller, _) = setup();
    controller.set_tool(ToolKind::Draw, &mut state).unwrap();
    click(&mut controller, &mut state, 400.0, 400.0);

    controller.clear_canvas(&mut state).unwrap();

    assert!(state.is_empty());
    assert!(state.selection().is_none());
}
