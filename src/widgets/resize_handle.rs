use egui::{Color32, CursorIcon, Painter, Pos2, Rect, Stroke, Vec2};
use serde::{Deserialize, Serialize};

/// Represents a corner of a layer or crop box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Corner::TopLeft => "top_left",
            Corner::TopRight => "top_right",
            Corner::BottomLeft => "bottom_left",
            Corner::BottomRight => "bottom_right",
        }
    }

    /// Direction the box grows in when this corner moves by a positive delta.
    /// `+1` for right/bottom, `-1` for left/top.
    pub fn growth_sign(&self) -> Vec2 {
        match self {
            Corner::TopLeft => Vec2::new(-1.0, -1.0),
            Corner::TopRight => Vec2::new(1.0, -1.0),
            Corner::BottomLeft => Vec2::new(-1.0, 1.0),
            Corner::BottomRight => Vec2::new(1.0, 1.0),
        }
    }

    pub fn cursor_icon(&self) -> CursorIcon {
        match self {
            Corner::TopLeft => CursorIcon::ResizeNwSe,
            Corner::TopRight => CursorIcon::ResizeNeSw,
            Corner::BottomLeft => CursorIcon::ResizeNeSw,
            Corner::BottomRight => CursorIcon::ResizeNwSe,
        }
    }
}

/// A grab point on the crop box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CropHandle {
    Corner(Corner),
    Top,
    Bottom,
    Left,
    Right,
    /// Translate the whole box without resizing it
    Move,
}

impl CropHandle {
    pub const ALL: [CropHandle; 9] = [
        CropHandle::Corner(Corner::TopLeft),
        CropHandle::Corner(Corner::TopRight),
        CropHandle::Corner(Corner::BottomLeft),
        CropHandle::Corner(Corner::BottomRight),
        CropHandle::Top,
        CropHandle::Bottom,
        CropHandle::Left,
        CropHandle::Right,
        CropHandle::Move,
    ];

    pub fn moves_left(&self) -> bool {
        matches!(
            self,
            CropHandle::Left | CropHandle::Corner(Corner::TopLeft | Corner::BottomLeft)
        )
    }

    pub fn moves_right(&self) -> bool {
        matches!(
            self,
            CropHandle::Right | CropHandle::Corner(Corner::TopRight | Corner::BottomRight)
        )
    }

    pub fn moves_top(&self) -> bool {
        matches!(
            self,
            CropHandle::Top | CropHandle::Corner(Corner::TopLeft | Corner::TopRight)
        )
    }

    pub fn moves_bottom(&self) -> bool {
        matches!(
            self,
            CropHandle::Bottom | CropHandle::Corner(Corner::BottomLeft | Corner::BottomRight)
        )
    }

    pub fn cursor_icon(&self) -> CursorIcon {
        match self {
            CropHandle::Corner(corner) => corner.cursor_icon(),
            CropHandle::Top | CropHandle::Bottom => CursorIcon::ResizeVertical,
            CropHandle::Left | CropHandle::Right => CursorIcon::ResizeHorizontal,
            CropHandle::Move => CursorIcon::Grab,
        }
    }
}

const HANDLE_FILL: Color32 = Color32::from_rgb(30, 120, 255);

/// Draw a round resize handle
pub fn draw_corner_handle(painter: &Painter, position: Pos2, radius: f32) {
    painter.circle_filled(position, radius, HANDLE_FILL);
    painter.circle_stroke(position, radius, Stroke::new(1.0, Color32::WHITE));
}

/// Draw a square crop handle
pub fn draw_crop_handle(painter: &Painter, position: Pos2, size: f32) {
    let rect = Rect::from_center_size(position, Vec2::splat(size));
    painter.rect_filled(rect, 2.0, Color32::WHITE);
    painter.rect_stroke(rect, 2.0, Stroke::new(1.0, HANDLE_FILL));
}
