use egui::Pos2;

use super::{Gesture, Tool};
use crate::error::CanvasResult;
use crate::state::EditorState;

/// Freehand drawing with the current brush
#[derive(Debug, Clone, Copy, Default)]
pub struct DrawStrokeTool;

impl Tool for DrawStrokeTool {
    fn name(&self) -> &'static str {
        "Draw"
    }

    fn on_pointer_down(&mut self, pos: Pos2, state: &mut EditorState) -> Gesture {
        let brush = state.brush;
        let stroke = state.strokes.begin_stroke(pos, brush.color, brush.width);
        Gesture::Drawing { stroke }
    }

    fn on_pointer_move(&mut self, pos: Pos2, gesture: &Gesture, state: &mut EditorState) -> CanvasResult<()> {
        match gesture {
            Gesture::Drawing { stroke } => state.strokes.append_point(*stroke, pos),
            _ => Ok(()),
        }
    }

    fn on_pointer_up(&mut self, gesture: &Gesture, state: &mut EditorState) -> CanvasResult<()> {
        match gesture {
            Gesture::Drawing { stroke } => state.strokes.finish_stroke(*stroke),
            _ => Ok(()),
        }
    }
}
