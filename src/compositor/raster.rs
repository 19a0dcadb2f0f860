//! CPU rasterization primitives for composites. Straight (non-premultiplied) alpha throughout.

use egui::{Color32, Pos2, Rect, pos2};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::geometry::bounding_box;
use crate::geometry::hit_testing::distance_to_line_segment;

pub fn to_rgba(color: Color32) -> Rgba<u8> {
    Rgba(color.to_srgba_unmultiplied())
}

/// An opaque or translucent canvas of at least 1x1 pixels
pub fn filled(width: u32, height: u32, color: Color32) -> RgbaImage {
    RgbaImage::from_pixel(width.max(1), height.max(1), to_rgba(color))
}

/// "Over" compositing of `top` onto `base`, with `top`'s alpha scaled by `coverage`
pub fn blend_over(base: Rgba<u8>, top: Rgba<u8>, coverage: f32) -> Rgba<u8> {
    let top_a = top[3] as f32 / 255.0 * coverage.clamp(0.0, 1.0);
    if top_a <= 0.0 {
        return base;
    }
    let base_a = base[3] as f32 / 255.0;
    let out_a = top_a + base_a * (1.0 - top_a);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |i: usize| {
        let value = (top[i] as f32 * top_a + base[i] as f32 * base_a * (1.0 - top_a)) / out_a;
        value.round().clamp(0.0, 255.0) as u8
    };
    Rgba([channel(0), channel(1), channel(2), (out_a * 255.0).round() as u8])
}

/// Scales `pixels` into `dest` (in canvas pixels) and blends it over the canvas.
///
/// Only the part of `dest` that lands on the canvas is resampled: the matching source region is
/// cut out first, so an enlarged layer that mostly hangs off the canvas stays cheap.
pub fn draw_bitmap(canvas: &mut RgbaImage, pixels: &RgbaImage, dest: Rect) {
    let width = dest.width().round();
    let height = dest.height().round();
    if width < 1.0 || height < 1.0 || pixels.width() == 0 || pixels.height() == 0 {
        return;
    }
    let (width, height) = (width as i64, height as i64);
    let left = dest.min.x.round() as i64;
    let top = dest.min.y.round() as i64;

    // Visible columns and rows, relative to `dest`
    let visible_x = (left.max(0) - left, (left + width).min(canvas.width() as i64) - left);
    let visible_y = (top.max(0) - top, (top + height).min(canvas.height() as i64) - top);
    if visible_x.0 >= visible_x.1 || visible_y.0 >= visible_y.1 {
        return;
    }

    let (source_width, source_height) = pixels.dimensions();
    let columns = source_span(visible_x, width, source_width);
    let rows = source_span(visible_y, height, source_height);
    let piece_width = (columns.dest.1 - columns.dest.0).max(1) as u32;
    let piece_height = (rows.dest.1 - rows.dest.0).max(1) as u32;
    let x = left + columns.dest.0;
    let y = top + rows.dest.0;

    let whole_source = columns.source == (0, source_width) && rows.source == (0, source_height);
    if whole_source && (piece_width, piece_height) == (source_width, source_height) {
        imageops::overlay(canvas, pixels, x, y);
        return;
    }

    let region = imageops::crop_imm(
        pixels,
        columns.source.0,
        rows.source.0,
        columns.source.1 - columns.source.0,
        rows.source.1 - rows.source.0,
    )
    .to_image();
    let piece = if region.dimensions() == (piece_width, piece_height) {
        region
    } else {
        imageops::resize(&region, piece_width, piece_height, FilterType::Triangle)
    };
    imageops::overlay(canvas, &piece, x, y);
}

/// Source pixels `[start, end)` needed to fill a visible dest range, and the dest range they
/// cover once scaled. Scaled pieces stay on the same pixel grid as the whole placement.
struct Span {
    source: (u32, u32),
    dest: (i64, i64),
}

fn source_span(visible: (i64, i64), dest_len: i64, source_len: u32) -> Span {
    let scale = source_len as f64 / dest_len as f64;
    let last = source_len as i64;
    let start = ((visible.0 as f64 * scale).floor() as i64).clamp(0, last - 1);
    let end = ((visible.1 as f64 * scale).ceil() as i64).clamp(start + 1, last);
    let to_dest = |source: i64| (source as f64 / scale).round() as i64;
    Span {
        source: (start as u32, end as u32),
        dest: (to_dest(start), to_dest(end)),
    }
}

/// Strokes a polyline with round caps and joins.
///
/// Each segment only visits the pixels of its own padded bounds and writes the highest coverage
/// seen into a mask over the stroke; the mask is blended once, so overlapping segments never
/// blend twice.
pub fn draw_polyline(canvas: &mut RgbaImage, points: &[Pos2], width: f32, color: Color32) {
    let Some(bounds) = bounding_box(points) else {
        return;
    };
    let radius = (width / 2.0).max(0.5);
    let Some(area) = pixel_area(bounds.expand(radius + 1.0), canvas) else {
        return;
    };

    let mut mask = CoverageMask::new(area);
    let segments: Vec<(Pos2, Pos2)> = match points {
        [only] => vec![(*only, *only)],
        _ => points.windows(2).map(|pair| (pair[0], pair[1])).collect(),
    };
    for (start, end) in segments {
        let reach = Rect::from_two_pos(start, end).expand(radius + 1.0);
        let Some(segment_area) = pixel_area(reach, canvas) else {
            continue;
        };
        for y in segment_area.y.0..segment_area.y.1 {
            for x in segment_area.x.0..segment_area.x.1 {
                let center = pos2(x as f32 + 0.5, y as f32 + 0.5);
                let coverage = radius + 0.5 - distance_to_line_segment(center, start, end);
                if coverage > 0.0 {
                    mask.raise(x, y, coverage.min(1.0));
                }
            }
        }
    }

    let rgba = to_rgba(color);
    for (x, y, coverage) in mask.covered() {
        let pixel = canvas.get_pixel_mut(x, y);
        *pixel = blend_over(*pixel, rgba, coverage);
    }
}

/// Half-open pixel ranges `[x.0, x.1) x [y.0, y.1)` on a canvas
#[derive(Debug, Clone, Copy)]
struct PixelArea {
    x: (u32, u32),
    y: (u32, u32),
}

fn pixel_area(rect: Rect, canvas: &RgbaImage) -> Option<PixelArea> {
    let x0 = rect.min.x.floor().max(0.0) as u32;
    let y0 = rect.min.y.floor().max(0.0) as u32;
    let x1 = (rect.max.x.ceil().max(0.0) as u32).min(canvas.width());
    let y1 = (rect.max.y.ceil().max(0.0) as u32).min(canvas.height());
    (x0 < x1 && y0 < y1).then_some(PixelArea { x: (x0, x1), y: (y0, y1) })
}

struct CoverageMask {
    area: PixelArea,
    values: Vec<f32>,
}

impl CoverageMask {
    fn new(area: PixelArea) -> Self {
        let len = (area.x.1 - area.x.0) as usize * (area.y.1 - area.y.0) as usize;
        Self {
            area,
            values: vec![0.0; len],
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        let stride = (self.area.x.1 - self.area.x.0) as usize;
        (y - self.area.y.0) as usize * stride + (x - self.area.x.0) as usize
    }

    fn raise(&mut self, x: u32, y: u32, coverage: f32) {
        let index = self.index(x, y);
        if coverage > self.values[index] {
            self.values[index] = coverage;
        }
    }

    fn covered(&self) -> impl Iterator<Item = (u32, u32, f32)> + '_ {
        let stride = self.area.x.1 - self.area.x.0;
        self.values
            .iter()
            .enumerate()
            .filter(|(_, coverage)| **coverage > 0.0)
            .map(move |(index, coverage)| {
                let index = index as u32;
                (self.area.x.0 + index % stride, self.area.y.0 + index / stride, *coverage)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::vec2;

    #[test]
    fn opaque_over_anything_is_opaque() {
        let red = Rgba([255, 0, 0, 255]);
        assert_eq!(blend_over(Rgba([0, 0, 255, 255]), red, 1.0), red);
        assert_eq!(blend_over(Rgba([0, 0, 0, 0]), red, 1.0), red);
    }

    #[test]
    fn zero_coverage_keeps_base() {
        let base = Rgba([10, 20, 30, 255]);
        assert_eq!(blend_over(base, Rgba([255, 255, 255, 255]), 0.0), base);
    }

    #[test]
    fn bitmap_is_scaled_into_dest() {
        let mut canvas = filled(40, 40, Color32::WHITE);
        let source = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        draw_bitmap(&mut canvas, &source, Rect::from_min_size(pos2(10.0, 10.0), vec2(20.0, 20.0)));
        assert_eq!(canvas.get_pixel(10, 10), &Rgba([0, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(29, 29), &Rgba([0, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(9, 9), &Rgba([255, 255, 255, 255]));
        assert_eq!(canvas.get_pixel(30, 30), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn bitmap_off_canvas_is_clipped() {
        let mut canvas = filled(10, 10, Color32::WHITE);
        let source = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255]));
        draw_bitmap(&mut canvas, &source, Rect::from_min_size(pos2(-4.0, 6.0), vec2(8.0, 8.0)));
        assert_eq!(canvas.get_pixel(0, 9), &Rgba([0, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(4, 9), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn oversized_bitmap_only_resamples_visible_part() {
        let mut canvas = filled(100, 100, Color32::WHITE);
        let source = RgbaImage::from_fn(10, 10, |x, _| {
            if x < 5 { Rgba([255, 0, 0, 255]) } else { Rgba([0, 0, 255, 255]) }
        });
        // 10000px wide, only its last 50 columns land on the canvas
        draw_bitmap(&mut canvas, &source, Rect::from_min_size(pos2(-9950.0, 0.0), vec2(10000.0, 100.0)));
        assert_eq!(canvas.get_pixel(0, 50), &Rgba([0, 0, 255, 255]));
        assert_eq!(canvas.get_pixel(49, 99), &Rgba([0, 0, 255, 255]));
        assert_eq!(canvas.get_pixel(50, 50), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn source_span_covers_visible_range() {
        let span = source_span((9950, 10000), 10000, 10);
        assert_eq!(span.source, (9, 10));
        assert_eq!(span.dest, (9000, 10000));

        let whole = source_span((0, 200), 200, 80);
        assert_eq!(whole.source, (0, 80));
        assert_eq!(whole.dest, (0, 200));
    }

    #[test]
    fn doubled_back_polyline_blends_once() {
        let mut canvas = filled(30, 30, Color32::WHITE);
        let ink = Color32::from_rgba_unmultiplied(0, 0, 0, 128);
        draw_polyline(&mut canvas, &[pos2(5.0, 15.0), pos2(25.0, 15.0), pos2(5.0, 15.0)], 4.0, ink);
        let once = blend_over(Rgba([255, 255, 255, 255]), to_rgba(ink), 1.0);
        assert_eq!(canvas.get_pixel(15, 15), &once);
    }

    #[test]
    fn single_point_polyline_is_a_dot() {
        let mut canvas = filled(20, 20, Color32::WHITE);
        draw_polyline(&mut canvas, &[pos2(10.0, 10.0)], 6.0, Color32::BLACK);
        assert_eq!(canvas.get_pixel(10, 10), &Rgba([0, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(10, 2), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn polyline_covers_its_path_only() {
        let mut canvas = filled(30, 30, Color32::WHITE);
        draw_polyline(&mut canvas, &[pos2(5.0, 15.0), pos2(25.0, 15.0)], 4.0, Color32::BLACK);
        assert_eq!(canvas.get_pixel(15, 14), &Rgba([0, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(15, 2), &Rgba([255, 255, 255, 255]));
    }
}
