use serde::{Deserialize, Serialize};

use crate::id_generator::{LayerId, StrokeId};

/// At most one entity is selected; layers and strokes exclude each other
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    #[default]
    None,
    Layer(LayerId),
    Stroke(StrokeId),
}

impl Selection {
    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }

    pub fn layer(&self) -> Option<LayerId> {
        match self {
            Selection::Layer(id) => Some(*id),
            _ => None,
        }
    }

    pub fn stroke(&self) -> Option<StrokeId> {
        match self {
            Selection::Stroke(id) => Some(*id),
            _ => None,
        }
    }
}
