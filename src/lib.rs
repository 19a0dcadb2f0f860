#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod bitmap;
pub mod compositor;
pub mod config;
pub mod error;
pub mod file_handler;
pub mod generation;
pub mod geometry;
pub mod id_generator;
pub mod input;
pub mod layer;
pub mod panels;
pub mod presets;
pub mod renderer;
pub mod selection;
pub mod state;
pub mod stroke;
pub mod texture_manager;
pub mod tools;
pub mod widgets;

pub use app::CanvasApp;
pub use bitmap::Bitmap;
pub use compositor::{CompositionSnapshot, encode_png, render_for_generation, render_preview};
pub use config::EditorConfig;
pub use error::{CanvasError, CanvasResult, TransitionError};
pub use id_generator::{BitmapId, LayerId, StrokeId};
pub use input::{Key, KeyEvent, PointerEvent, PointerKind};
pub use layer::{Layer, LayerStore, ReorderDirection};
pub use renderer::Renderer;
pub use selection::Selection;
pub use state::{BrushSettings, EditorState, ToolKind};
pub use stroke::{Stroke, StrokeStore};
pub use tools::{CropSession, Gesture, InteractionController, Tool};
