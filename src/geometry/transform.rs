//! Mapping between workspace space (pixels of the editing surface) and native space
//! (pixels of a bitmap as it was decoded).
//!
//! Nothing here is used for on-screen rendering; these functions only run while
//! compositing and while rasterizing a crop.

use egui::{Pos2, Rect, Vec2, pos2, vec2};

/// Maps a workspace point into the native pixel space of a bitmap that is displayed
/// inside `placement`.
///
/// `scale = native_size / placement.size`, measured from `placement.min`.
pub fn to_native(point: Pos2, placement: Rect, native_size: Vec2) -> Pos2 {
    let scale_x = native_size.x / placement.width();
    let scale_y = native_size.y / placement.height();
    pos2(
        (point.x - placement.min.x) * scale_x,
        (point.y - placement.min.y) * scale_y,
    )
}

/// Maps a workspace rectangle into native space. See [`to_native`].
pub fn rect_to_native(rect: Rect, placement: Rect, native_size: Vec2) -> Rect {
    Rect::from_min_max(
        to_native(rect.min, placement, native_size),
        to_native(rect.max, placement, native_size),
    )
}

/// Axis-aligned bounds of a point sequence, `None` when there are no points.
pub fn bounding_box(points: &[Pos2]) -> Option<Rect> {
    let (first, rest) = points.split_first()?;
    let mut bounds = Rect::from_min_max(*first, *first);
    for point in rest {
        bounds.extend_with(*point);
    }
    Some(bounds)
}

/// Outline drawn around a selected stroke. Expanded by half the stroke width plus
/// `padding` so hair-thin strokes still get a grabbable box.
pub fn selection_outline(points: &[Pos2], stroke_width: f32, padding: f32) -> Option<Rect> {
    bounding_box(points).map(|bounds| bounds.expand(stroke_width / 2.0 + padding))
}

/// Fits `native` inside a `max_extent` square without upscaling, keeping the aspect ratio.
pub fn fit_within(native: Vec2, max_extent: f32) -> Vec2 {
    let longest = native.x.max(native.y);
    if longest <= max_extent || longest <= 0.0 {
        return native;
    }
    let factor = max_extent / longest;
    vec2(native.x * factor, native.y * factor)
}

/// Projects workspace geometry into the native space of a base layer.
///
/// Every other entity is placed relative to the base layer's workspace origin and scaled by
/// `output_size / base_size`, so a composite looks the same whatever zoom the user edited at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reprojection {
    origin: Pos2,
    scale: Vec2,
}

impl Reprojection {
    /// Identity projection, used when there is no base layer
    pub const IDENTITY: Self = Self {
        origin: Pos2::ZERO,
        scale: Vec2::splat(1.0),
    };

    pub fn new(base_placement: Rect, output_size: Vec2) -> Self {
        Self {
            origin: base_placement.min,
            scale: vec2(
                output_size.x / base_placement.width(),
                output_size.y / base_placement.height(),
            ),
        }
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn point(&self, point: Pos2) -> Pos2 {
        pos2(
            (point.x - self.origin.x) * self.scale.x,
            (point.y - self.origin.y) * self.scale.y,
        )
    }

    pub fn rect(&self, rect: Rect) -> Rect {
        Rect::from_min_size(
            self.point(rect.min),
            vec2(rect.width() * self.scale.x, rect.height() * self.scale.y),
        )
    }

    /// Stroke widths have no direction; take the mean of both axis factors.
    pub fn width(&self, width: f32) -> f32 {
        width * (self.scale.x + self.scale.y) / 2.0
    }
}
