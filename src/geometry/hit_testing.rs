use egui::{Pos2, Rect};

use crate::widgets::{Corner, CropHandle};

/// Distance from a point to a line segment
pub fn distance_to_line_segment(point: Pos2, line_start: Pos2, line_end: Pos2) -> f32 {
    let line_vec = line_end - line_start;
    let point_vec = point - line_start;

    let length_sq = line_vec.length_sq();
    if length_sq == 0.0 {
        return point_vec.length();
    }

    let t = (point_vec.dot(line_vec) / length_sq).clamp(0.0, 1.0);
    let projection = line_start + line_vec * t;
    (point - projection).length()
}

/// Whether `pos` lies within `reach` of the polyline through `points`.
/// A single point behaves like a dot.
pub fn polyline_hit(points: &[Pos2], pos: Pos2, reach: f32) -> bool {
    match points {
        [] => false,
        [only] => only.distance(pos) <= reach,
        _ => points
            .windows(2)
            .any(|pair| distance_to_line_segment(pos, pair[0], pair[1]) <= reach),
    }
}

pub fn corner_position(rect: Rect, corner: Corner) -> Pos2 {
    match corner {
        Corner::TopLeft => rect.left_top(),
        Corner::TopRight => rect.right_top(),
        Corner::BottomLeft => rect.left_bottom(),
        Corner::BottomRight => rect.right_bottom(),
    }
}

/// Returns the resize handle of `rect` under `pos`, if any
pub fn corner_handle_at(rect: Rect, pos: Pos2, radius: f32) -> Option<Corner> {
    // Corners are tested in a fixed order so overlapping handles on tiny boxes resolve the same way
    Corner::ALL
        .into_iter()
        .find(|corner| pos.distance(corner_position(rect, *corner)) <= radius)
}

pub fn crop_handle_position(rect: Rect, handle: CropHandle) -> Pos2 {
    match handle {
        CropHandle::Corner(corner) => corner_position(rect, corner),
        CropHandle::Top => rect.center_top(),
        CropHandle::Bottom => rect.center_bottom(),
        CropHandle::Left => rect.left_center(),
        CropHandle::Right => rect.right_center(),
        CropHandle::Move => rect.center(),
    }
}

/// Picks the crop handle under `pos`: corners first, then edges (anywhere along them),
/// then `Move` for the interior.
pub fn crop_handle_at(rect: Rect, pos: Pos2, radius: f32) -> Option<CropHandle> {
    if let Some(corner) = corner_handle_at(rect, pos, radius) {
        return Some(CropHandle::Corner(corner));
    }

    let within_x = pos.x >= rect.min.x - radius && pos.x <= rect.max.x + radius;
    let within_y = pos.y >= rect.min.y - radius && pos.y <= rect.max.y + radius;

    if within_x && (pos.y - rect.min.y).abs() <= radius {
        Some(CropHandle::Top)
    } else if within_x && (pos.y - rect.max.y).abs() <= radius {
        Some(CropHandle::Bottom)
    } else if within_y && (pos.x - rect.min.x).abs() <= radius {
        Some(CropHandle::Left)
    } else if within_y && (pos.x - rect.max.x).abs() <= radius {
        Some(CropHandle::Right)
    } else if rect.contains(pos) {
        Some(CropHandle::Move)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let a = pos2(0.0, 0.0);
        let b = pos2(10.0, 0.0);
        assert_eq!(distance_to_line_segment(pos2(5.0, 3.0), a, b), 3.0);
        assert_eq!(distance_to_line_segment(pos2(13.0, 4.0), a, b), 5.0);
        assert_eq!(distance_to_line_segment(pos2(-3.0, 0.0), a, a), 3.0);
    }

    #[test]
    fn polyline_hit_uses_segments_not_bounds() {
        let diagonal = [pos2(0.0, 0.0), pos2(100.0, 100.0)];
        assert!(polyline_hit(&diagonal, pos2(50.0, 52.0), 3.0));
        // Inside the bounding box but far from the line
        assert!(!polyline_hit(&diagonal, pos2(90.0, 10.0), 3.0));
    }

    #[test]
    fn crop_handles_resolve_in_order() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(100.0, 80.0));
        assert_eq!(
            crop_handle_at(rect, pos2(1.0, 2.0), 6.0),
            Some(CropHandle::Corner(Corner::TopLeft))
        );
        assert_eq!(crop_handle_at(rect, pos2(50.0, 79.0), 6.0), Some(CropHandle::Bottom));
        assert_eq!(crop_handle_at(rect, pos2(103.0, 40.0), 6.0), Some(CropHandle::Right));
        assert_eq!(crop_handle_at(rect, pos2(50.0, 40.0), 6.0), Some(CropHandle::Move));
        assert_eq!(crop_handle_at(rect, pos2(150.0, 40.0), 6.0), None);
    }
}
