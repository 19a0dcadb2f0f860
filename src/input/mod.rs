use egui::{Context, Pos2, Rect};

/// What happened to the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    /// The pointer left the workspace. Handled exactly like `Up`.
    Leave,
}

/// Pointer input in workspace coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub position: Pos2,
}

impl PointerEvent {
    pub fn down(position: Pos2) -> Self {
        Self { kind: PointerKind::Down, position }
    }

    pub fn moved(position: Pos2) -> Self {
        Self { kind: PointerKind::Move, position }
    }

    pub fn up(position: Pos2) -> Self {
        Self { kind: PointerKind::Up, position }
    }

    pub fn leave(position: Pos2) -> Self {
        Self { kind: PointerKind::Leave, position }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Delete,
    Backspace,
    Escape,
    Enter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    /// A text field has keyboard focus; delete keys belong to it
    pub text_focus: bool,
}

/// Turns raw egui input into workspace events for one canvas area
#[derive(Debug, Default)]
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    pressed: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects this frame's events. `canvas_rect` is the screen rect of the workspace; emitted
    /// positions are relative to its top-left corner.
    pub fn process_input(&mut self, ctx: &Context, canvas_rect: Rect) -> (Vec<PointerEvent>, Vec<KeyEvent>) {
        let mut pointer_events = Vec::new();
        let mut key_events = Vec::new();
        let text_focus = ctx.wants_keyboard_input();
        let to_workspace = |pos: Pos2| (pos - canvas_rect.min).to_pos2();

        ctx.input(|input| {
            let hover = input.pointer.latest_pos().filter(|pos| canvas_rect.contains(*pos));

            if input.pointer.primary_pressed() {
                if let Some(pos) = hover {
                    self.pressed = true;
                    pointer_events.push(PointerEvent::down(to_workspace(pos)));
                }
            }

            match hover {
                Some(pos) if Some(pos) != self.last_pointer_pos => {
                    pointer_events.push(PointerEvent::moved(to_workspace(pos)));
                }
                None if self.pressed => {
                    // Left the canvas mid-gesture
                    let last = self.last_pointer_pos.unwrap_or(canvas_rect.min);
                    pointer_events.push(PointerEvent::leave(to_workspace(last)));
                    self.pressed = false;
                }
                _ => {}
            }

            if input.pointer.primary_released() && self.pressed {
                let pos = hover.or(self.last_pointer_pos).unwrap_or(canvas_rect.min);
                pointer_events.push(PointerEvent::up(to_workspace(pos)));
                self.pressed = false;
            }

            if hover.is_some() {
                self.last_pointer_pos = hover;
            }

            for (egui_key, key) in [
                (egui::Key::Delete, Key::Delete),
                (egui::Key::Backspace, Key::Backspace),
                (egui::Key::Escape, Key::Escape),
                (egui::Key::Enter, Key::Enter),
            ] {
                if input.key_pressed(egui_key) {
                    key_events.push(KeyEvent { key, text_focus });
                }
            }
        });

        (pointer_events, key_events)
    }
}
