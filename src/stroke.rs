use egui::{Color32, Pos2, Vec2};
use log::{debug, info};
use std::sync::Arc;

use crate::error::{CanvasError, CanvasResult};
use crate::geometry::hit_testing;
use crate::id_generator::StrokeId;

/// A freehand drawing: an ordered point list in workspace space.
///
/// Points live behind an `Arc` so snapshots (drag origin, composition) are cheap; writers go
/// through `Arc::make_mut`.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    id: StrokeId,
    points: Arc<Vec<Pos2>>,
    color: Color32,
    width: f32,
}

impl Stroke {
    pub fn id(&self) -> StrokeId {
        self.id
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    /// Shared handle to the current point list
    pub fn points_snapshot(&self) -> Arc<Vec<Pos2>> {
        Arc::clone(&self.points)
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// Hit when `pos` is within half the width plus `tolerance` of any segment
    pub fn hit_test(&self, pos: Pos2, tolerance: f32) -> bool {
        hit_testing::polyline_hit(&self.points, pos, self.width / 2.0 + tolerance)
    }
}

/// Every stroke on the canvas, in creation order
#[derive(Debug, Clone, Default)]
pub struct StrokeStore {
    strokes: Vec<Stroke>,
    in_progress: Option<StrokeId>,
}

impl StrokeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a stroke with a single point and marks it as in progress.
    /// Any stroke still open is finished first.
    pub fn begin_stroke(&mut self, origin: Pos2, color: Color32, width: f32) -> StrokeId {
        if let Some(open) = self.in_progress.take() {
            debug!("Finishing {} implicitly", open);
        }
        let stroke = Stroke {
            id: StrokeId::next(),
            points: Arc::new(vec![origin]),
            color,
            width,
        };
        let id = stroke.id;
        self.strokes.push(stroke);
        self.in_progress = Some(id);
        debug!("🖌️ Began {} at {:?}", id, origin);
        id
    }

    /// Appends to the stroke being drawn. Any other stroke is immutable.
    pub fn append_point(&mut self, id: StrokeId, point: Pos2) -> CanvasResult<()> {
        if self.in_progress != Some(id) {
            return Err(CanvasError::StrokeNotInProgress(id));
        }
        let stroke = self.get_mut(id)?;
        Arc::make_mut(&mut stroke.points).push(point);
        Ok(())
    }

    /// Closes the in-progress stroke
    pub fn finish_stroke(&mut self, id: StrokeId) -> CanvasResult<()> {
        if self.in_progress != Some(id) {
            return Err(CanvasError::StrokeNotInProgress(id));
        }
        self.in_progress = None;
        if let Some(stroke) = self.get(id) {
            info!("🖌️ Finished {} with {} points", id, stroke.points.len());
        }
        Ok(())
    }

    pub fn in_progress(&self) -> Option<StrokeId> {
        self.in_progress
    }

    pub fn get(&self, id: StrokeId) -> Option<&Stroke> {
        self.strokes.iter().find(|stroke| stroke.id == id)
    }

    fn get_mut(&mut self, id: StrokeId) -> CanvasResult<&mut Stroke> {
        self.strokes
            .iter_mut()
            .find(|stroke| stroke.id == id)
            .ok_or(CanvasError::UnknownStroke(id))
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Stroke> {
        self.strokes.iter()
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Adds `delta` to every point
    pub fn translate(&mut self, id: StrokeId, delta: Vec2) -> CanvasResult<()> {
        let stroke = self.get_mut(id)?;
        let moved = stroke.points.iter().map(|point| *point + delta).collect();
        stroke.points = Arc::new(moved);
        Ok(())
    }

    /// Sets the points to `snapshot` shifted by `delta`. Used while dragging so the offset is
    /// always measured from the pre-gesture points and never accumulates rounding error.
    pub fn translate_from(&mut self, id: StrokeId, snapshot: &[Pos2], delta: Vec2) -> CanvasResult<()> {
        let stroke = self.get_mut(id)?;
        stroke.points = Arc::new(snapshot.iter().map(|point| *point + delta).collect());
        Ok(())
    }

    /// Most recently created stroke under `pos`
    pub fn stroke_at(&self, pos: Pos2, tolerance: f32) -> Option<&Stroke> {
        self.strokes.iter().rev().find(|stroke| stroke.hit_test(pos, tolerance))
    }

    pub fn remove(&mut self, id: StrokeId) -> CanvasResult<Stroke> {
        let index = self
            .strokes
            .iter()
            .position(|stroke| stroke.id == id)
            .ok_or(CanvasError::UnknownStroke(id))?;
        if self.in_progress == Some(id) {
            self.in_progress = None;
        }
        Ok(self.strokes.remove(index))
    }

    /// Removes the most recently completed stroke. The stroke being drawn is left alone.
    pub fn undo_last(&mut self) -> Option<Stroke> {
        let index = self
            .strokes
            .iter()
            .rposition(|stroke| Some(stroke.id) != self.in_progress)?;
        let stroke = self.strokes.remove(index);
        info!("↩️ Undid {}", stroke.id);
        Some(stroke)
    }

    pub fn clear_all(&mut self) {
        self.strokes.clear();
        self.in_progress = None;
    }
}
