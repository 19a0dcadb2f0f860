//! Flattens layers and strokes into a single raster.
//!
//! Two paths: a preview at workspace resolution, and the generation composite at the base
//! layer's native resolution. Both read from a [`CompositionSnapshot`], never from the live
//! stores, so a composite in flight does not see gestures that happen after it started.

use std::io::Cursor;
use std::sync::Arc;

use egui::{Color32, Pos2, Rect, Vec2};
use futures::future::join_all;
use image::{ImageFormat, RgbaImage};
use log::{debug, info, warn};

use crate::error::{CanvasError, CanvasResult};
use crate::geometry::Reprojection;
use crate::id_generator::LayerId;
use crate::layer::Layer;
use crate::state::EditorState;
use crate::stroke::Stroke;

pub mod raster;

/// Frozen copy of everything a composite needs
#[derive(Debug, Clone)]
pub struct CompositionSnapshot {
    layers: Vec<Layer>,
    strokes: Vec<Stroke>,
    workspace_size: Vec2,
    background: Color32,
}

impl CompositionSnapshot {
    /// Bitmaps and point lists are shared, so this is cheap even for large canvases
    pub fn capture(state: &EditorState) -> Self {
        Self {
            layers: state.layers.iter().cloned().collect(),
            strokes: state.strokes.iter().cloned().collect(),
            workspace_size: state.workspace_size,
            background: state.config.background,
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// The bottom-most layer, the conventional generation base
    pub fn base_layer(&self) -> Option<&Layer> {
        self.layers.first()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty() && self.strokes.is_empty()
    }
}

/// Workspace-resolution raster of the snapshot, for on-screen feedback only.
///
/// Layers are drawn bottom to top, then every stroke. A layer whose bitmap cannot be decoded
/// is skipped.
pub fn render_preview(snapshot: &CompositionSnapshot) -> RgbaImage {
    let width = snapshot.workspace_size.x.round().max(1.0) as u32;
    let height = snapshot.workspace_size.y.round().max(1.0) as u32;
    let mut canvas = raster::filled(width, height, snapshot.background);

    for layer in &snapshot.layers {
        match layer.bitmap().pixels() {
            Ok(pixels) => raster::draw_bitmap(&mut canvas, &pixels, layer.rect()),
            Err(err) => warn!("⚠️ Skipping {} in preview: {}", layer.id(), err),
        }
    }
    draw_strokes(&mut canvas, &snapshot.strokes, Reprojection::IDENTITY);
    canvas
}

/// The composite handed to the image generator.
///
/// The output has `base`'s native size. `base` is drawn 1:1; every other layer and stroke is
/// reprojected relative to `base`'s workspace box (see [`Reprojection`]). Without a usable
/// base (no id, unknown id, or a base that fails to decode) this falls back to
/// [`render_preview`].
pub async fn render_for_generation(snapshot: &CompositionSnapshot, base: Option<LayerId>) -> CanvasResult<RgbaImage> {
    if snapshot.is_empty() {
        return Err(CanvasError::NothingToCompose);
    }
    let Some(base_layer) = base.and_then(|id| snapshot.layers.iter().find(|layer| layer.id() == id)) else {
        info!("🖌️ No base layer, composing at workspace resolution");
        return Ok(render_preview(snapshot));
    };

    let decoded = join_all(snapshot.layers.iter().map(decode_layer)).await;

    let base_pixels = decoded
        .iter()
        .find(|(layer, _)| layer.id() == base_layer.id())
        .and_then(|(_, pixels)| pixels.clone());
    let Some(base_pixels) = base_pixels else {
        warn!("⚠️ Base {} failed to decode, composing at workspace resolution", base_layer.id());
        return Ok(render_preview(snapshot));
    };

    let output_size = base_layer.bitmap().native_size();
    let mut canvas = raster::filled(
        base_layer.bitmap().native_width(),
        base_layer.bitmap().native_height(),
        snapshot.background,
    );
    raster::draw_bitmap(&mut canvas, &base_pixels, Rect::from_min_size(Pos2::ZERO, output_size));

    let projection = Reprojection::new(base_layer.rect(), output_size);
    debug!("Reprojecting onto {} with scale {:?}", base_layer.id(), projection.scale());
    for (layer, pixels) in &decoded {
        if layer.id() == base_layer.id() {
            continue;
        }
        // Failed decodes were already reported
        if let Some(pixels) = pixels {
            raster::draw_bitmap(&mut canvas, pixels, projection.rect(layer.rect()));
        }
    }
    draw_strokes(&mut canvas, &snapshot.strokes, projection);

    info!(
        "🖼️ Composed {} layers and {} strokes at {}x{}",
        snapshot.layers.len(),
        snapshot.strokes.len(),
        canvas.width(),
        canvas.height()
    );
    Ok(canvas)
}

async fn decode_layer(layer: &Layer) -> (&Layer, Option<Arc<RgbaImage>>) {
    match layer.bitmap().pixels() {
        Ok(pixels) => (layer, Some(pixels)),
        Err(err) => {
            warn!("⚠️ Skipping {}: {}", layer.id(), err);
            (layer, None)
        }
    }
}

fn draw_strokes(canvas: &mut RgbaImage, strokes: &[Stroke], projection: Reprojection) {
    for stroke in strokes {
        let points: Vec<_> = stroke.points().iter().map(|point| projection.point(*point)).collect();
        raster::draw_polyline(canvas, &points, projection.width(stroke.width()), stroke.color());
    }
}

/// PNG bytes of a composite
pub fn encode_png(composite: &RgbaImage) -> CanvasResult<Vec<u8>> {
    let mut bytes = Vec::new();
    composite
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|err| CanvasError::Encode(err.to_string()))?;
    Ok(bytes)
}
