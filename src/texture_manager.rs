use std::collections::HashMap;

use egui::{ColorImage, Context, TextureHandle, TextureId, TextureOptions};
use log::debug;

use crate::bitmap::Bitmap;
use crate::error::CanvasResult;
use crate::id_generator::BitmapId;

/// GPU textures for layer bitmaps, keyed by bitmap id.
///
/// A bitmap never changes its pixels (crop produces a new bitmap), so an id is a complete
/// cache key. Least recently drawn entries are dropped once the cache is full.
pub struct TextureCache {
    textures: HashMap<BitmapId, TextureHandle>,
    last_used: HashMap<BitmapId, u64>,
    current_frame: u64,
    max_cache_size: usize,
}

impl TextureCache {
    pub fn new(max_cache_size: usize) -> Self {
        Self {
            textures: HashMap::new(),
            last_used: HashMap::new(),
            current_frame: 0,
            max_cache_size,
        }
    }

    /// Call once at the start of each frame
    pub fn begin_frame(&mut self) {
        self.current_frame += 1;
    }

    /// Uploads `bitmap` on first use. Decoding failures are returned so the caller can draw a
    /// placeholder instead.
    pub fn texture_for(&mut self, ctx: &Context, bitmap: &Bitmap) -> CanvasResult<TextureId> {
        let id = bitmap.id();
        if let Some(handle) = self.textures.get(&id) {
            self.last_used.insert(id, self.current_frame);
            return Ok(handle.id());
        }

        self.prune_cache_if_needed();

        let pixels = bitmap.pixels()?;
        let size = [pixels.width() as usize, pixels.height() as usize];
        let image = ColorImage::from_rgba_unmultiplied(size, pixels.as_raw());
        let handle = ctx.load_texture(id.to_string(), image, TextureOptions::LINEAR);
        debug!("Uploaded texture for {} ({}x{})", id, size[0], size[1]);

        let texture_id = handle.id();
        self.textures.insert(id, handle);
        self.last_used.insert(id, self.current_frame);
        Ok(texture_id)
    }

    pub fn invalidate(&mut self, id: BitmapId) {
        self.textures.remove(&id);
        self.last_used.remove(&id);
    }

    fn prune_cache_if_needed(&mut self) {
        if self.textures.len() < self.max_cache_size {
            return;
        }

        let mut entries: Vec<(BitmapId, u64)> = self.last_used.iter().map(|(id, frame)| (*id, *frame)).collect();
        entries.sort_by_key(|(_, frame)| *frame);

        let to_remove = entries.len() + 1 - self.max_cache_size.max(1);
        for (id, _) in entries.into_iter().take(to_remove) {
            self.invalidate(id);
        }
    }
}
