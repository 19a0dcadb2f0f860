use egui::{Pos2, Rect, Vec2};
use log::{debug, info, warn};

use crate::error::{CanvasError, CanvasResult};
use crate::geometry::{MIN_LAYER_SIZE, rect_to_native};
use crate::id_generator::LayerId;
use crate::layer::LayerStore;
use crate::widgets::CropHandle;

/// A handle drag inside a crop session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropDrag {
    pub handle: CropHandle,
    pub origin: Pos2,
}

/// Transient rectangular crop of one layer.
///
/// The box is kept inside the layer's placement at all times and never gets smaller than
/// [`MIN_LAYER_SIZE`] (or the layer itself, if that is smaller).
#[derive(Debug, Clone, PartialEq)]
pub struct CropSession {
    target: LayerId,
    bounds: Rect,
    crop_box: Rect,
    /// Box at the start of the current handle drag
    snapshot: Rect,
    drag: Option<CropDrag>,
}

impl CropSession {
    /// Opens a session whose box starts out as the layer's whole placement
    pub fn start(layers: &LayerStore, target: LayerId) -> CanvasResult<Self> {
        let layer = layers.get(target).ok_or(CanvasError::UnknownLayer(target))?;
        let bounds = layer.rect();
        info!("✂️ Cropping {} within {:?}", target, bounds);
        Ok(Self {
            target,
            bounds,
            crop_box: bounds,
            snapshot: bounds,
            drag: None,
        })
    }

    pub fn target(&self) -> LayerId {
        self.target
    }

    pub fn crop_box(&self) -> Rect {
        self.crop_box
    }

    /// The layer's placement the box is confined to
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn drag(&self) -> Option<CropDrag> {
        self.drag
    }

    /// Remembers the current box; following `update_handle` deltas are measured from it
    pub fn begin_drag(&mut self, handle: CropHandle, origin: Pos2) {
        self.snapshot = self.crop_box;
        self.drag = Some(CropDrag { handle, origin });
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
        self.snapshot = self.crop_box;
    }

    /// Recomputes the box from the pre-drag snapshot plus the cumulative `pointer_delta`
    pub fn update_handle(&mut self, handle: CropHandle, pointer_delta: Vec2) {
        let candidate = apply_handle(self.snapshot, handle, pointer_delta);
        self.crop_box = clamp_crop_box(candidate, self.bounds, handle);
    }

    /// Cuts the layer's bitmap down to the box and places the result exactly over the box
    pub fn confirm(self, layers: &mut LayerStore) -> CanvasResult<LayerId> {
        let layer = layers.get(self.target).ok_or(CanvasError::UnknownLayer(self.target))?;
        let native_rect = rect_to_native(self.crop_box, layer.rect(), layer.bitmap().native_size());
        let cropped = layer.bitmap().crop_native(native_rect)?;
        debug!("Crop box {:?} maps to native {:?}", self.crop_box, native_rect);
        layers.replace_bitmap(self.target, cropped, self.crop_box.min, self.crop_box.size())?;
        Ok(self.target)
    }
}

fn apply_handle(start: Rect, handle: CropHandle, delta: Vec2) -> Rect {
    if handle == CropHandle::Move {
        return start.translate(delta);
    }
    let mut rect = start;
    if handle.moves_left() {
        rect.min.x += delta.x;
    }
    if handle.moves_right() {
        rect.max.x += delta.x;
    }
    if handle.moves_top() {
        rect.min.y += delta.y;
    }
    if handle.moves_bottom() {
        rect.max.y += delta.y;
    }
    rect
}

/// Confines `rect` to `bounds`.
///
/// `Move` slides the box back inside without changing its size. Every other handle clamps each
/// edge to the matching edge of `bounds`, then floors the size by pushing the dragged edge back.
pub fn clamp_crop_box(rect: Rect, bounds: Rect, handle: CropHandle) -> Rect {
    let min_width = MIN_LAYER_SIZE.min(bounds.width());
    let min_height = MIN_LAYER_SIZE.min(bounds.height());

    let clamped = if handle == CropHandle::Move {
        let width = rect.width().clamp(min_width, bounds.width());
        let height = rect.height().clamp(min_height, bounds.height());
        let x = rect.min.x.min(bounds.max.x - width).max(bounds.min.x);
        let y = rect.min.y.min(bounds.max.y - height).max(bounds.min.y);
        Rect::from_min_size(Pos2::new(x, y), Vec2::new(width, height))
    } else {
        let mut left = rect.min.x.max(bounds.min.x);
        let mut right = rect.max.x.min(bounds.max.x);
        let mut top = rect.min.y.max(bounds.min.y);
        let mut bottom = rect.max.y.min(bounds.max.y);

        if right - left < min_width {
            if handle.moves_left() {
                left = right - min_width;
            } else {
                right = left + min_width;
            }
        }
        if bottom - top < min_height {
            if handle.moves_top() {
                top = bottom - min_height;
            } else {
                bottom = top + min_height;
            }
        }

        // The floor may have pushed an edge past the layer when the opposite edge was already
        // outside; pull it back in
        left = left.max(bounds.min.x);
        top = top.max(bounds.min.y);
        right = right.min(bounds.max.x);
        bottom = bottom.min(bounds.max.y);
        Rect::from_min_max(Pos2::new(left, top), Pos2::new(right, bottom))
    };

    if clamped.width() > 0.0 && clamped.height() > 0.0 {
        clamped
    } else {
        warn!("Degenerate crop box {:?}, resetting to {:?}", clamped, bounds);
        bounds
    }
}
