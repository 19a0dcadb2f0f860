mod editor_state;

pub use editor_state::{BrushSettings, EditorState, ToolKind};
