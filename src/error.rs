use thiserror::Error;

use crate::id_generator::{LayerId, StrokeId};

/// Errors raised by the canvas core.
///
/// Gesture limits (minimum size, crop containment) are clamps and never show up here.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// The bitmap bytes could not be decoded
    #[error("failed to decode bitmap: {0}")]
    Decode(#[from] image::ImageError),

    #[error("bitmap has no pixels")]
    EmptyBitmap,

    #[error("unknown layer {0}")]
    UnknownLayer(LayerId),

    #[error("unknown stroke {0}")]
    UnknownStroke(StrokeId),

    /// Points may only be appended to the stroke currently being drawn
    #[error("stroke {0} is not being drawn")]
    StrokeNotInProgress(StrokeId),

    #[error("no crop session is active")]
    NoCropSession,

    #[error("a gesture is in progress")]
    GestureInProgress,

    /// Both stores are empty; the caller must not request a composite
    #[error("canvas is empty, nothing to compose")]
    NothingToCompose,

    #[error("failed to encode composite: {0}")]
    Encode(String),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Errors that can occur during controller state transitions
#[derive(Debug, Error)]
pub enum TransitionError {
    /// Attempted to transition between incompatible states
    #[error("cannot transition from {from} to {to}")]
    InvalidStateTransition {
        from: &'static str,
        to: &'static str,
    },
}

pub type CanvasResult<T> = Result<T, CanvasError>;
