use egui::{Pos2, Rect, Vec2, vec2};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::bitmap::Bitmap;
use crate::error::{CanvasError, CanvasResult};
use crate::geometry::{self, MIN_LAYER_SIZE, transform::fit_within};
use crate::id_generator::LayerId;
use crate::widgets::Corner;

/// Direction of a z-order step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReorderDirection {
    /// Towards the top of the stack
    Up,
    /// Towards the bottom of the stack
    Down,
}

/// A placed image on the canvas
#[derive(Debug, Clone)]
pub struct Layer {
    id: LayerId,
    bitmap: Bitmap,
    position: Pos2,
    size: Vec2,
    /// `native_width / native_height`, captured when the bitmap was set
    aspect_ratio: f32,
}

impl Layer {
    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    pub fn position(&self) -> Pos2 {
        self.position
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Workspace-space placement box
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.position, self.size)
    }

    pub fn hit_test(&self, pos: Pos2) -> bool {
        self.rect().contains(pos)
    }

    /// Maps a workspace point into this layer's bitmap pixels
    pub fn to_native(&self, point: Pos2) -> Pos2 {
        geometry::to_native(point, self.rect(), self.bitmap.native_size())
    }
}

/// Computes an anchor-locked resize of `start`.
///
/// `handle` is the dragged corner; the diagonally opposite one stays put. The dominant axis of
/// `delta` drives the new extent and the other axis follows `aspect_ratio`. Returns `None` when
/// either side would drop below [`MIN_LAYER_SIZE`].
pub fn resized_rect(start: Rect, handle: Corner, delta: Vec2, aspect_ratio: f32) -> Option<Rect> {
    let sign = handle.growth_sign();
    let (width, height) = if delta.x.abs() >= delta.y.abs() {
        let width = start.width() + sign.x * delta.x;
        (width, width / aspect_ratio)
    } else {
        let height = start.height() + sign.y * delta.y;
        (height * aspect_ratio, height)
    };

    if !(width >= MIN_LAYER_SIZE && height >= MIN_LAYER_SIZE) {
        return None;
    }

    let min_x = if sign.x > 0.0 { start.min.x } else { start.max.x - width };
    let min_y = if sign.y > 0.0 { start.min.y } else { start.max.y - height };
    Some(Rect::from_min_size(Pos2::new(min_x, min_y), vec2(width, height)))
}

/// Ordered list of layers. Index 0 is the bottom of the stack.
#[derive(Debug, Clone, Default)]
pub struct LayerStore {
    layers: Vec<Layer>,
}

impl LayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `bitmap` on top of the stack at `suggested_position`, fitted inside
    /// `max_extent` without distorting it.
    pub fn add(&mut self, bitmap: Bitmap, suggested_position: Pos2, max_extent: f32) -> LayerId {
        let size = fit_within(bitmap.native_size(), max_extent);
        let layer = Layer {
            id: LayerId::next(),
            aspect_ratio: bitmap.aspect_ratio(),
            bitmap,
            position: suggested_position,
            size,
        };
        let id = layer.id;
        info!("🖼️ Added {} ({}) at {:?} size {:?}", id, layer.bitmap.id(), layer.position, layer.size);
        self.layers.push(layer);
        id
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    fn get_mut(&mut self, id: LayerId) -> CanvasResult<&mut Layer> {
        self.layers
            .iter_mut()
            .find(|layer| layer.id == id)
            .ok_or(CanvasError::UnknownLayer(id))
    }

    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|layer| layer.id == id)
    }

    /// Layers from bottom to top
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn ids(&self) -> Vec<LayerId> {
        self.layers.iter().map(Layer::id).collect()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// The bottom-most layer; its native resolution defines generation output
    pub fn base_layer(&self) -> Option<&Layer> {
        self.layers.first()
    }

    /// Topmost layer containing `pos`
    pub fn top_layer_at(&self, pos: Pos2) -> Option<&Layer> {
        self.layers.iter().rev().find(|layer| layer.hit_test(pos))
    }

    pub fn move_to(&mut self, id: LayerId, new_position: Pos2) -> CanvasResult<()> {
        let layer = self.get_mut(id)?;
        layer.position = new_position;
        Ok(())
    }

    /// Resizes against the layer's current box. Returns whether the layer changed.
    pub fn resize(&mut self, id: LayerId, handle: Corner, pointer_delta: Vec2) -> CanvasResult<bool> {
        let start = self.get_mut(id)?.rect();
        self.resize_from(id, handle, start, pointer_delta)
    }

    /// Resizes against a pre-gesture box with the cumulative pointer delta.
    /// A result below the minimum size leaves the layer untouched for this frame.
    pub fn resize_from(
        &mut self,
        id: LayerId,
        handle: Corner,
        start: Rect,
        pointer_delta: Vec2,
    ) -> CanvasResult<bool> {
        let layer = self.get_mut(id)?;
        match resized_rect(start, handle, pointer_delta, layer.aspect_ratio) {
            Some(rect) => {
                layer.position = rect.min;
                layer.size = rect.size();
                Ok(true)
            }
            None => {
                debug!("Resize of {} below minimum size ignored", id);
                Ok(false)
            }
        }
    }

    /// Swaps the layer with its neighbour. No-op at either end of the stack.
    pub fn reorder(&mut self, id: LayerId, direction: ReorderDirection) -> CanvasResult<()> {
        let index = self.index_of(id).ok_or(CanvasError::UnknownLayer(id))?;
        let neighbour = match direction {
            ReorderDirection::Up if index + 1 < self.layers.len() => index + 1,
            ReorderDirection::Down if index > 0 => index - 1,
            _ => return Ok(()),
        };
        self.layers.swap(index, neighbour);
        debug!("Moved {} {:?} to index {}", id, direction, neighbour);
        Ok(())
    }

    /// Removes and returns the layer. Selection bookkeeping lives in `EditorState::remove_layer`.
    pub fn remove(&mut self, id: LayerId) -> CanvasResult<Layer> {
        let index = self.index_of(id).ok_or(CanvasError::UnknownLayer(id))?;
        let layer = self.layers.remove(index);
        info!("🗑️ Removed {}", id);
        Ok(layer)
    }

    /// Swaps in a new bitmap together with its placement (crop confirm)
    pub fn replace_bitmap(
        &mut self,
        id: LayerId,
        bitmap: Bitmap,
        new_position: Pos2,
        new_size: Vec2,
    ) -> CanvasResult<()> {
        let layer = self.get_mut(id)?;
        layer.aspect_ratio = bitmap.aspect_ratio();
        layer.bitmap = bitmap;
        layer.position = new_position;
        layer.size = new_size;
        info!("✂️ {} now shows {} in {:?}", id, layer.bitmap.id(), layer.rect());
        Ok(())
    }

    pub fn clear(&mut self) {
        self.layers.clear();
    }
}
