//! On-screen painting of the editor with `egui::Painter`.
//!
//! Everything is drawn in workspace coordinates shifted by the canvas rect's origin. This is
//! display only; composites for generation go through `compositor`.

use egui::{Color32, Context, Painter, Pos2, Rect, Shape, Stroke as LineStroke, Vec2, pos2};
use log::debug;

use crate::geometry::hit_testing::{corner_position, crop_handle_position};
use crate::geometry::selection_outline;
use crate::layer::Layer;
use crate::state::EditorState;
use crate::stroke::Stroke;
use crate::texture_manager::TextureCache;
use crate::tools::{CropSession, InteractionController};
use crate::widgets::{Corner, CropHandle, draw_corner_handle, draw_crop_handle};

const SELECTION_COLOR: Color32 = Color32::from_rgb(30, 144, 255);
const CROP_SHADE: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 140);
const MISSING_BITMAP: Color32 = Color32::from_gray(180);
const TEXTURE_CACHE_SIZE: usize = 64;

pub struct Renderer {
    textures: TextureCache,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            textures: TextureCache::new(TEXTURE_CACHE_SIZE),
        }
    }

    pub fn begin_frame(&mut self) {
        self.textures.begin_frame();
    }

    pub fn render(
        &mut self,
        ctx: &Context,
        painter: &Painter,
        canvas_rect: Rect,
        state: &EditorState,
        controller: &InteractionController,
    ) {
        let offset = canvas_rect.min.to_vec2();
        let to_screen = |rect: Rect| rect.translate(offset);

        painter.rect_filled(canvas_rect, 0.0, state.config.background);

        for layer in state.layers.iter() {
            self.draw_layer(ctx, painter, layer, to_screen(layer.rect()));
        }
        for stroke in state.strokes.iter() {
            draw_stroke(painter, stroke, canvas_rect.min);
        }

        if let Some(stroke) = state.selected_stroke() {
            if let Some(outline) = selection_outline(stroke.points(), stroke.width(), state.config.selection_padding) {
                painter.rect_stroke(to_screen(outline), 2.0, LineStroke::new(1.5, SELECTION_COLOR));
            }
        }
        if let Some(layer) = state.selected_layer() {
            let rect = to_screen(layer.rect());
            painter.rect_stroke(rect, 0.0, LineStroke::new(2.0, SELECTION_COLOR));
            for corner in Corner::ALL {
                draw_corner_handle(painter, corner_position(rect, corner), state.config.handle_radius * 0.75);
            }
        }

        if let Some(session) = controller.crop_session() {
            draw_crop_overlay(painter, session, offset, state.config.handle_radius);
        }
    }

    fn draw_layer(&mut self, ctx: &Context, painter: &Painter, layer: &Layer, screen_rect: Rect) {
        match self.textures.texture_for(ctx, layer.bitmap()) {
            Ok(texture) => {
                let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
                painter.image(texture, screen_rect, uv, Color32::WHITE);
            }
            Err(err) => {
                debug!("Placeholder for {}: {}", layer.id(), err);
                painter.rect_filled(screen_rect, 0.0, MISSING_BITMAP);
            }
        }
    }
}

fn draw_stroke(painter: &Painter, stroke: &Stroke, origin: Pos2) {
    let points: Vec<Pos2> = stroke.points().iter().map(|point| *point + origin.to_vec2()).collect();
    match points.as_slice() {
        [] => {}
        [only] => {
            painter.circle_filled(*only, stroke.width() / 2.0, stroke.color());
        }
        _ => {
            painter.add(Shape::line(points, LineStroke::new(stroke.width(), stroke.color())));
        }
    }
}

/// Shades the part of the layer that will be cut away and draws the box with its handles
fn draw_crop_overlay(painter: &Painter, session: &CropSession, offset: Vec2, handle_radius: f32) {
    let bounds = session.bounds().translate(offset);
    let crop = session.crop_box().translate(offset);

    let shades = [
        Rect::from_min_max(bounds.min, pos2(bounds.max.x, crop.min.y)),
        Rect::from_min_max(pos2(bounds.min.x, crop.max.y), bounds.max),
        Rect::from_min_max(pos2(bounds.min.x, crop.min.y), pos2(crop.min.x, crop.max.y)),
        Rect::from_min_max(pos2(crop.max.x, crop.min.y), pos2(bounds.max.x, crop.max.y)),
    ];
    for shade in shades.into_iter().filter(|rect| rect.width() > 0.0 && rect.height() > 0.0) {
        painter.rect_filled(shade, 0.0, CROP_SHADE);
    }

    painter.rect_stroke(crop, 0.0, LineStroke::new(1.5, Color32::WHITE));
    for handle in CropHandle::ALL.into_iter().filter(|handle| *handle != CropHandle::Move) {
        draw_crop_handle(painter, crop_handle_position(crop, handle), handle_radius);
    }
}
