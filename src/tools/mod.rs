//! The interaction controller: one active gesture at a time, routed to the tool that owns it.

use std::sync::Arc;

use egui::{Pos2, Rect, Vec2};
use log::{debug, info, warn};

use crate::error::{CanvasError, CanvasResult, TransitionError};
use crate::geometry::hit_testing::crop_handle_at;
use crate::id_generator::{LayerId, StrokeId};
use crate::input::{Key, KeyEvent, PointerEvent, PointerKind};
use crate::layer::ReorderDirection;
use crate::state::{EditorState, ToolKind};
use crate::stroke::Stroke;
use crate::widgets::{Corner, CropHandle};

mod crop_tool;
mod draw_stroke_tool;
mod selection_tool;

pub use crop_tool::{CropDrag, CropSession, clamp_crop_box};
pub use draw_stroke_tool::DrawStrokeTool;
pub use selection_tool::SelectionTool;

/// A tool turns pointer input into a [`Gesture`] and drives that gesture against the stores
pub trait Tool {
    fn name(&self) -> &'static str;

    /// Decides what a pointer-down starts. Returning `Gesture::Idle` means nothing started.
    fn on_pointer_down(&mut self, pos: Pos2, state: &mut EditorState) -> Gesture;

    fn on_pointer_move(&mut self, pos: Pos2, gesture: &Gesture, state: &mut EditorState) -> CanvasResult<()>;

    /// Finalizes `gesture`. Called for pointer-up and pointer-leave alike.
    fn on_pointer_up(&mut self, gesture: &Gesture, state: &mut EditorState) -> CanvasResult<()>;
}

/// Transient bookkeeping for the gesture in flight
#[derive(Debug, Clone, Default)]
pub enum Gesture {
    #[default]
    Idle,
    DraggingLayer {
        layer: LayerId,
        /// Pointer position minus layer position at pointer-down
        offset: Vec2,
    },
    ResizingLayer {
        layer: LayerId,
        handle: Corner,
        start_rect: Rect,
        origin: Pos2,
    },
    DraggingStroke {
        stroke: StrokeId,
        snapshot: Arc<Vec<Pos2>>,
        origin: Pos2,
    },
    Drawing {
        stroke: StrokeId,
    },
    Cropping(CropSession),
}

impl Gesture {
    pub fn name(&self) -> &'static str {
        match self {
            Gesture::Idle => "Idle",
            Gesture::DraggingLayer { .. } => "DraggingLayer",
            Gesture::ResizingLayer { .. } => "ResizingLayer",
            Gesture::DraggingStroke { .. } => "DraggingStroke",
            Gesture::Drawing { .. } => "Drawing",
            Gesture::Cropping(_) => "Cropping",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    pub fn is_cropping(&self) -> bool {
        matches!(self, Gesture::Cropping(_))
    }

    /// Every gesture starts from and ends in `Idle`; there are no direct hops between gestures
    pub fn can_transition_to(&self, next: &Gesture) -> bool {
        match (self, next) {
            (Gesture::Idle, _) => true,
            (_, Gesture::Idle) => true,
            _ => false,
        }
    }

    fn is_select_gesture(&self) -> bool {
        matches!(
            self,
            Gesture::DraggingLayer { .. } | Gesture::ResizingLayer { .. } | Gesture::DraggingStroke { .. }
        )
    }
}

/// Owns the gesture state machine. The stores live in [`EditorState`], which is passed in on
/// every call; the controller only holds what the current gesture needs.
#[derive(Debug, Default)]
pub struct InteractionController {
    gesture: Gesture,
    select_tool: SelectionTool,
    draw_tool: DrawStrokeTool,
    /// Tool picked while cropping, applied when the session ends
    pending_tool: Option<ToolKind>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn state_name(&self) -> &'static str {
        self.gesture.name()
    }

    /// A pointer gesture is in flight: a drag, resize, draw, or a handle drag inside a crop session
    pub fn is_busy(&self) -> bool {
        match &self.gesture {
            Gesture::Idle => false,
            Gesture::Cropping(session) => session.drag().is_some(),
            _ => true,
        }
    }

    pub fn crop_session(&self) -> Option<&CropSession> {
        match &self.gesture {
            Gesture::Cropping(session) => Some(session),
            _ => None,
        }
    }

    fn transition_to(&mut self, next: Gesture) -> Result<(), TransitionError> {
        if !self.gesture.can_transition_to(&next) {
            return Err(TransitionError::InvalidStateTransition {
                from: self.gesture.name(),
                to: next.name(),
            });
        }
        if self.gesture.name() != next.name() {
            debug!("Gesture {} -> {}", self.gesture.name(), next.name());
        }
        self.gesture = next;
        Ok(())
    }

    pub fn handle_pointer(&mut self, event: PointerEvent, state: &mut EditorState) -> CanvasResult<()> {
        let result = match event.kind {
            PointerKind::Down => self.pointer_down(event.position, state),
            PointerKind::Move => self.pointer_move(event.position, state),
            PointerKind::Up | PointerKind::Leave => self.pointer_up(state),
        };
        if result.is_err() && !self.gesture.is_cropping() {
            // Whatever went wrong, the editor must not stay stuck in a gesture
            self.gesture = Gesture::Idle;
        }
        result
    }

    fn pointer_down(&mut self, pos: Pos2, state: &mut EditorState) -> CanvasResult<()> {
        if let Gesture::Cropping(session) = &mut self.gesture {
            if session.drag().is_none() {
                if let Some(handle) = crop_handle_at(session.crop_box(), pos, state.config.handle_radius) {
                    debug!("Crop handle {:?} grabbed", handle);
                    session.begin_drag(handle, pos);
                }
            }
            return Ok(());
        }
        if !self.gesture.is_idle() {
            // A second press mid-gesture never retargets it
            return Ok(());
        }

        let tool: &mut dyn Tool = match state.active_tool() {
            ToolKind::Select => &mut self.select_tool,
            ToolKind::Draw => &mut self.draw_tool,
        };
        debug!("{} tool pressed at {:?}", tool.name(), pos);
        let next = tool.on_pointer_down(pos, state);
        self.transition_to(next)?;
        Ok(())
    }

    fn pointer_move(&mut self, pos: Pos2, state: &mut EditorState) -> CanvasResult<()> {
        if let Gesture::Cropping(session) = &mut self.gesture {
            if let Some(drag) = session.drag() {
                session.update_handle(drag.handle, pos - drag.origin);
            }
            return Ok(());
        }
        match self.gesture {
            Gesture::Idle => Ok(()),
            Gesture::Drawing { .. } => self.draw_tool.on_pointer_move(pos, &self.gesture, state),
            _ => self.select_tool.on_pointer_move(pos, &self.gesture, state),
        }
    }

    fn pointer_up(&mut self, state: &mut EditorState) -> CanvasResult<()> {
        if let Gesture::Cropping(session) = &mut self.gesture {
            session.end_drag();
            return Ok(());
        }
        let gesture = std::mem::take(&mut self.gesture);
        if let Gesture::Drawing { stroke } = &gesture {
            self.draw_tool.on_pointer_up(&gesture, state)?;
            info!("✏️ Finished {}", stroke);
        } else if gesture.is_select_gesture() {
            self.select_tool.on_pointer_up(&gesture, state)?;
        }
        if !gesture.is_idle() {
            debug!("Gesture {} -> Idle", gesture.name());
        }
        Ok(())
    }

    /// Returns whether the key did anything
    pub fn handle_key(&mut self, event: KeyEvent, state: &mut EditorState) -> CanvasResult<bool> {
        match event.key {
            Key::Delete | Key::Backspace => {
                if event.text_focus || !self.gesture.is_idle() {
                    return Ok(false);
                }
                state.delete_selected()
            }
            Key::Escape => {
                if self.gesture.is_cropping() {
                    self.cancel_crop(state)?;
                    Ok(true)
                } else if self.gesture.is_idle() && !state.selection().is_none() {
                    state.clear_selection();
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            Key::Enter => {
                if event.text_focus || !self.gesture.is_cropping() {
                    return Ok(false);
                }
                self.confirm_crop(state).map(|_| true)
            }
        }
    }

    /// Switches tools. An in-flight gesture is finalized first; while cropping the switch waits
    /// until the session ends.
    pub fn set_tool(&mut self, tool: ToolKind, state: &mut EditorState) -> CanvasResult<()> {
        if self.gesture.is_cropping() {
            self.pending_tool = Some(tool);
            return Ok(());
        }
        let finalized = self.pointer_up(state);
        self.gesture = Gesture::Idle;
        state.set_active_tool(tool);
        debug!("Tool switched to {}", tool.name());
        finalized
    }

    pub fn start_crop(&mut self, layer: LayerId, state: &mut EditorState) -> CanvasResult<()> {
        let session = CropSession::start(&state.layers, layer)?;
        self.transition_to(Gesture::Cropping(session))?;
        state.clear_selection();
        Ok(())
    }

    pub fn update_crop_handle(&mut self, handle: CropHandle, pointer_delta: Vec2) -> CanvasResult<()> {
        match &mut self.gesture {
            Gesture::Cropping(session) => {
                session.update_handle(handle, pointer_delta);
                Ok(())
            }
            _ => Err(CanvasError::NoCropSession),
        }
    }

    /// Applies the crop and selects the cropped layer. On failure the session is gone and the
    /// layer is untouched.
    pub fn confirm_crop(&mut self, state: &mut EditorState) -> CanvasResult<LayerId> {
        let session = self.take_crop_session(state)?;
        let layer = session.confirm(&mut state.layers)?;
        info!("✂️ Cropped {}", layer);
        state.select_layer(layer);
        Ok(layer)
    }

    pub fn cancel_crop(&mut self, state: &mut EditorState) -> CanvasResult<()> {
        let session = self.take_crop_session(state)?;
        debug!("Crop of {} cancelled", session.target());
        Ok(())
    }

    fn take_crop_session(&mut self, state: &mut EditorState) -> CanvasResult<CropSession> {
        if !self.gesture.is_cropping() {
            return Err(CanvasError::NoCropSession);
        }
        let Gesture::Cropping(session) = std::mem::take(&mut self.gesture) else {
            return Err(CanvasError::NoCropSession);
        };
        if let Some(tool) = self.pending_tool.take() {
            state.set_active_tool(tool);
        }
        Ok(session)
    }

    pub fn raise(&mut self, layer: LayerId, state: &mut EditorState) -> CanvasResult<()> {
        self.reorder(layer, ReorderDirection::Up, state)
    }

    pub fn lower(&mut self, layer: LayerId, state: &mut EditorState) -> CanvasResult<()> {
        self.reorder(layer, ReorderDirection::Down, state)
    }

    fn reorder(&mut self, layer: LayerId, direction: ReorderDirection, state: &mut EditorState) -> CanvasResult<()> {
        self.ensure_idle()?;
        state.layers.reorder(layer, direction)
    }

    pub fn delete_layer(&mut self, layer: LayerId, state: &mut EditorState) -> CanvasResult<()> {
        self.ensure_idle()?;
        state.remove_layer(layer).map(|_| ())
    }

    pub fn undo_stroke(&mut self, state: &mut EditorState) -> CanvasResult<Option<Stroke>> {
        self.ensure_not_busy()?;
        Ok(state.undo_stroke())
    }

    pub fn clear_strokes(&mut self, state: &mut EditorState) -> CanvasResult<()> {
        self.ensure_not_busy()?;
        state.clear_strokes();
        Ok(())
    }

    /// Removes every layer and stroke
    pub fn clear_canvas(&mut self, state: &mut EditorState) -> CanvasResult<()> {
        self.ensure_idle()?;
        state.clear_selection();
        state.layers.clear();
        state.strokes.clear_all();
        info!("🧹 Canvas cleared");
        Ok(())
    }

    fn ensure_not_busy(&self) -> CanvasResult<()> {
        if self.is_busy() {
            warn!("Refused while {} is in progress", self.gesture.name());
            return Err(CanvasError::GestureInProgress);
        }
        Ok(())
    }

    /// Layer commands also wait for a crop session to end
    fn ensure_idle(&self) -> CanvasResult<()> {
        if !self.gesture.is_idle() {
            warn!("Refused while {} is in progress", self.gesture.name());
            return Err(CanvasError::GestureInProgress);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::Bitmap;
    use egui::pos2;
    use image::RgbaImage;

    fn state_with_layer() -> (EditorState, LayerId) {
        let mut state = EditorState::default();
        let bitmap = Bitmap::from_pixels(RgbaImage::new(100, 100)).unwrap();
        let id = state.add_layer(bitmap, pos2(0.0, 0.0));
        (state, id)
    }

    #[test]
    fn gestures_only_hop_through_idle() {
        let drawing = Gesture::Drawing { stroke: StrokeId::next() };
        let dragging = Gesture::DraggingLayer {
            layer: LayerId::next(),
            offset: Vec2::ZERO,
        };
        assert!(Gesture::Idle.can_transition_to(&drawing));
        assert!(drawing.can_transition_to(&Gesture::Idle));
        assert!(!drawing.can_transition_to(&dragging));
    }

    #[test]
    fn crop_cannot_start_mid_drag() {
        let (mut state, id) = state_with_layer();
        let mut controller = InteractionController::new();
        controller
            .handle_pointer(PointerEvent::down(pos2(50.0, 50.0)), &mut state)
            .unwrap();
        let err = controller.start_crop(id, &mut state).unwrap_err();
        assert!(matches!(err, CanvasError::Transition(_)));
        assert_eq!(controller.state_name(), "DraggingLayer");
    }

    #[test]
    fn tool_switch_waits_for_crop_to_end() {
        let (mut state, id) = state_with_layer();
        let mut controller = InteractionController::new();
        controller.start_crop(id, &mut state).unwrap();
        controller.set_tool(ToolKind::Draw, &mut state).unwrap();
        assert_eq!(state.active_tool(), ToolKind::Select);
        controller.cancel_crop(&mut state).unwrap();
        assert_eq!(state.active_tool(), ToolKind::Draw);
    }
}
