use egui::Pos2;
use log::debug;

use super::{Gesture, Tool};
use crate::error::{CanvasError, CanvasResult};
use crate::geometry::hit_testing::corner_handle_at;
use crate::state::EditorState;

/// Picks, drags and resizes layers and strokes
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionTool;

impl Tool for SelectionTool {
    fn name(&self) -> &'static str {
        "Select"
    }

    /// Hit order: resize handles of the selected layer, then strokes (they are drawn above the
    /// layers), then layers from the top down. Empty workspace clears the selection.
    fn on_pointer_down(&mut self, pos: Pos2, state: &mut EditorState) -> Gesture {
        let handle_radius = state.config.handle_radius;
        let handle_hit = state.selected_layer().and_then(|layer| {
            corner_handle_at(layer.rect(), pos, handle_radius).map(|corner| (layer.id(), corner, layer.rect()))
        });
        if let Some((layer, handle, start_rect)) = handle_hit {
            debug!("Resizing {} from {}", layer, handle.as_str());
            return Gesture::ResizingLayer {
                layer,
                handle,
                start_rect,
                origin: pos,
            };
        }

        let tolerance = state.config.hit_tolerance;
        let stroke_hit = state
            .strokes
            .stroke_at(pos, tolerance)
            .map(|stroke| (stroke.id(), stroke.points_snapshot()));
        if let Some((stroke, snapshot)) = stroke_hit {
            state.select_stroke(stroke);
            return Gesture::DraggingStroke {
                stroke,
                snapshot,
                origin: pos,
            };
        }

        let layer_hit = state
            .layers
            .top_layer_at(pos)
            .map(|layer| (layer.id(), pos - layer.position()));
        if let Some((layer, offset)) = layer_hit {
            state.select_layer(layer);
            return Gesture::DraggingLayer { layer, offset };
        }

        state.clear_selection();
        Gesture::Idle
    }

    fn on_pointer_move(&mut self, pos: Pos2, gesture: &Gesture, state: &mut EditorState) -> CanvasResult<()> {
        match gesture {
            Gesture::DraggingLayer { layer, offset } => state.layers.move_to(*layer, pos - *offset),
            Gesture::ResizingLayer {
                layer,
                handle,
                start_rect,
                origin,
            } => state
                .layers
                .resize_from(*layer, *handle, *start_rect, pos - *origin)
                .map(|_| ()),
            Gesture::DraggingStroke {
                stroke,
                snapshot,
                origin,
            } => state.strokes.translate_from(*stroke, snapshot, pos - *origin),
            _ => Ok(()),
        }
    }

    fn on_pointer_up(&mut self, gesture: &Gesture, state: &mut EditorState) -> CanvasResult<()> {
        match gesture {
            Gesture::DraggingLayer { layer, .. } | Gesture::ResizingLayer { layer, .. } => state
                .layers
                .get(*layer)
                .map(|layer| debug!("{} settled at {:?}", layer.id(), layer.rect()))
                .ok_or(CanvasError::UnknownLayer(*layer)),
            Gesture::DraggingStroke { stroke, .. } => state
                .strokes
                .get(*stroke)
                .map(|_| debug!("{} dropped", stroke))
                .ok_or(CanvasError::UnknownStroke(*stroke)),
            _ => Ok(()),
        }
    }
}
