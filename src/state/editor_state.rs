//! Everything the canvas knows about, in one place.
//!
//! `EditorState` owns both stores and the selection. The interaction controller and the
//! compositor borrow it; there is no process-wide editor state.

use egui::{Color32, Pos2, Vec2};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::bitmap::Bitmap;
use crate::config::EditorConfig;
use crate::error::CanvasResult;
use crate::id_generator::{LayerId, StrokeId};
use crate::layer::{Layer, LayerStore};
use crate::selection::Selection;
use crate::stroke::{Stroke, StrokeStore};

/// Which tool pointer-downs on the workspace are routed to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolKind {
    #[default]
    Select,
    Draw,
}

impl ToolKind {
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Select => "Select",
            ToolKind::Draw => "Draw",
        }
    }
}

/// Color and thickness for new strokes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushSettings {
    pub color: Color32,
    pub width: f32,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            color: Color32::BLACK,
            width: 4.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EditorState {
    pub layers: LayerStore,
    pub strokes: StrokeStore,
    selection: Selection,
    active_tool: ToolKind,
    pub brush: BrushSettings,
    pub workspace_size: Vec2,
    pub config: EditorConfig,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorState {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            layers: LayerStore::new(),
            strokes: StrokeStore::new(),
            selection: Selection::None,
            active_tool: ToolKind::default(),
            brush: BrushSettings {
                color: config.brush_color,
                width: config.brush_width,
            },
            workspace_size: config.workspace_size,
            config,
        }
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn select_layer(&mut self, id: LayerId) {
        self.selection = Selection::Layer(id);
    }

    pub fn select_stroke(&mut self, id: StrokeId) {
        self.selection = Selection::Stroke(id);
    }

    pub fn clear_selection(&mut self) {
        if !self.selection.is_none() {
            debug!("Selection cleared");
        }
        self.selection = Selection::None;
    }

    pub fn selected_layer(&self) -> Option<&Layer> {
        self.selection.layer().and_then(|id| self.layers.get(id))
    }

    pub fn selected_stroke(&self) -> Option<&Stroke> {
        self.selection.stroke().and_then(|id| self.strokes.get(id))
    }

    pub fn active_tool(&self) -> ToolKind {
        self.active_tool
    }

    /// Switching tools always drops the selection
    pub(crate) fn set_active_tool(&mut self, tool: ToolKind) {
        self.active_tool = tool;
        self.clear_selection();
    }

    /// Inserts a decoded bitmap from an upload or an external drop
    pub fn add_layer(&mut self, bitmap: Bitmap, suggested_position: Pos2) -> LayerId {
        self.layers.add(bitmap, suggested_position, self.config.max_initial_extent)
    }

    pub fn remove_layer(&mut self, id: LayerId) -> CanvasResult<Layer> {
        let layer = self.layers.remove(id)?;
        if self.selection == Selection::Layer(id) {
            self.selection = Selection::None;
        }
        Ok(layer)
    }

    pub fn remove_stroke(&mut self, id: StrokeId) -> CanvasResult<Stroke> {
        let stroke = self.strokes.remove(id)?;
        if self.selection == Selection::Stroke(id) {
            self.selection = Selection::None;
        }
        Ok(stroke)
    }

    /// Deletes whatever is selected. Returns whether anything was removed.
    pub fn delete_selected(&mut self) -> CanvasResult<bool> {
        match self.selection {
            Selection::None => Ok(false),
            Selection::Layer(id) => self.remove_layer(id).map(|_| true),
            Selection::Stroke(id) => self.remove_stroke(id).map(|_| true),
        }
    }

    /// Undo for strokes only; layers have no history
    pub fn undo_stroke(&mut self) -> Option<Stroke> {
        let stroke = self.strokes.undo_last()?;
        if self.selection == Selection::Stroke(stroke.id()) {
            self.selection = Selection::None;
        }
        Some(stroke)
    }

    pub fn clear_strokes(&mut self) {
        if self.selection.stroke().is_some() {
            self.selection = Selection::None;
        }
        self.strokes.clear_all();
    }

    /// True when there is neither a layer nor a stroke to compose
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty() && self.strokes.is_empty()
    }
}
