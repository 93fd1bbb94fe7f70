use crate::error::{Error, Result};
use crate::{Color, Point, Stroke, StrokeId};

/// Ordered strokes of one session. Insertion order is paint order, and
/// strokes are never removed or reordered.
#[derive(Clone, Debug, Default)]
pub struct StrokeStore {
    strokes: Vec<Stroke>,
}

impl StrokeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_stroke(&mut self, color: Color, stroke_width: f32, point: Point) -> StrokeId {
        let id = StrokeId::generate();
        self.strokes.push(Stroke {
            id,
            color,
            stroke_width,
            points: vec![point],
        });
        id
    }

    pub fn append_point(&mut self, id: StrokeId, point: Point) -> Result<()> {
        // The active stroke is almost always the newest one.
        let stroke = self
            .strokes
            .iter_mut()
            .rev()
            .find(|stroke| stroke.id == id)
            .ok_or(Error::UnknownStroke(id))?;
        stroke.points.push(point);
        Ok(())
    }

    pub fn snapshot(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn get(&self, id: StrokeId) -> Option<&Stroke> {
        self.strokes.iter().find(|stroke| stroke.id == id)
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }
}
