use log::{debug, warn};

use crate::store::StrokeStore;
use crate::{Color, Point, StrokeId, Tool};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Leave,
}

/// Pointer position in client (page viewport) coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerPosition {
    pub client_x: f64,
    pub client_y: f64,
}

impl PointerPosition {
    pub fn new(client_x: f64, client_y: f64) -> Self {
        Self { client_x, client_y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Live geometry of the drawing surface. Queried on every event, never cached.
pub trait SurfaceGeometry {
    fn bounding_box(&self) -> Option<SurfaceRect>;
}

impl SurfaceGeometry for SurfaceRect {
    fn bounding_box(&self) -> Option<SurfaceRect> {
        Some(*self)
    }
}

impl SurfaceGeometry for Option<SurfaceRect> {
    fn bounding_box(&self) -> Option<SurfaceRect> {
        *self
    }
}

/// The `{tool, color}` pair published by the tool and color pickers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToolSelection {
    pub tool: Tool,
    pub color: Color,
}

pub struct CaptureContext<'a> {
    pub store: &'a mut StrokeStore,
    pub selection: ToolSelection,
    pub surface: &'a dyn SurfaceGeometry,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CaptureState {
    #[default]
    Idle,
    Painting {
        stroke_id: StrokeId,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureOutcome {
    Ignored,
    Started(StrokeId),
    Extended(StrokeId),
    Finished(StrokeId),
}

/// Falls back to the surface origin when either the pointer position or the
/// surface box is unavailable.
pub fn to_canvas_point(position: Option<PointerPosition>, surface: &dyn SurfaceGeometry) -> Point {
    let (Some(position), Some(rect)) = (position, surface.bounding_box()) else {
        return Point::ORIGIN;
    };
    let point = Point::new(
        (position.client_x - rect.left) as f32,
        (position.client_y - rect.top) as f32,
    );
    if point.is_finite() {
        point
    } else {
        Point::ORIGIN
    }
}

#[derive(Debug, Default)]
pub struct PointerCapture {
    state: CaptureState,
}

impl PointerCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn is_painting(&self) -> bool {
        matches!(self.state, CaptureState::Painting { .. })
    }

    pub fn handle_pointer_event(
        &mut self,
        kind: PointerKind,
        position: Option<PointerPosition>,
        context: &mut CaptureContext<'_>,
    ) -> CaptureOutcome {
        match (kind, self.state) {
            (PointerKind::Down, CaptureState::Idle) => self.start(position, context),
            (PointerKind::Down, CaptureState::Painting { stroke_id }) => {
                debug!("pointer down while painting {stroke_id}, finalizing it");
                self.state = CaptureState::Idle;
                self.start(position, context)
            }
            (PointerKind::Move, CaptureState::Painting { stroke_id }) => {
                if !context.selection.tool.is_drawing() {
                    return CaptureOutcome::Ignored;
                }
                let point = to_canvas_point(position, context.surface);
                match context.store.append_point(stroke_id, point) {
                    Ok(()) => CaptureOutcome::Extended(stroke_id),
                    Err(error) => {
                        warn!("dropping gesture: {error}");
                        self.state = CaptureState::Idle;
                        CaptureOutcome::Ignored
                    }
                }
            }
            (PointerKind::Up | PointerKind::Leave, CaptureState::Painting { stroke_id }) => {
                debug!("stroke {stroke_id} finished on {kind:?}");
                self.state = CaptureState::Idle;
                CaptureOutcome::Finished(stroke_id)
            }
            (_, CaptureState::Idle) => CaptureOutcome::Ignored,
        }
    }

    fn start(
        &mut self,
        position: Option<PointerPosition>,
        context: &mut CaptureContext<'_>,
    ) -> CaptureOutcome {
        let selection = context.selection;
        let Some(width) = selection.tool.stroke_width() else {
            return CaptureOutcome::Ignored;
        };
        let point = to_canvas_point(position, context.surface);
        let stroke_id = context.store.begin_stroke(selection.color, width, point);
        debug!(
            "stroke {stroke_id} started at ({}, {}) with {:?} {}",
            point.x, point.y, selection.tool, selection.color
        );
        self.state = CaptureState::Painting { stroke_id };
        CaptureOutcome::Started(stroke_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SURFACE: SurfaceRect = SurfaceRect {
        left: 100.0,
        top: 50.0,
        width: 500.0,
        height: 500.0,
    };

    fn at(x: f64, y: f64) -> Option<PointerPosition> {
        Some(PointerPosition::new(SURFACE.left + x, SURFACE.top + y))
    }

    fn pen(color: Color) -> ToolSelection {
        ToolSelection {
            tool: Tool::Pen,
            color,
        }
    }

    fn feed(
        capture: &mut PointerCapture,
        store: &mut StrokeStore,
        selection: ToolSelection,
        kind: PointerKind,
        position: Option<PointerPosition>,
    ) -> CaptureOutcome {
        let mut context = CaptureContext {
            store,
            selection,
            surface: &SURFACE,
        };
        capture.handle_pointer_event(kind, position, &mut context)
    }

    #[test]
    fn pen_gesture_records_canvas_local_points() {
        let mut capture = PointerCapture::new();
        let mut store = StrokeStore::new();
        let red = Color::rgb(255, 0, 0);
        feed(&mut capture, &mut store, pen(red), PointerKind::Down, at(10.0, 10.0));
        feed(&mut capture, &mut store, pen(red), PointerKind::Move, at(20.0, 10.0));
        feed(&mut capture, &mut store, pen(red), PointerKind::Up, at(20.0, 10.0));

        let strokes = store.snapshot();
        assert_eq!(strokes.len(), 1);
        assert_eq!(
            strokes[0].points,
            vec![Point::new(10.0, 10.0), Point::new(20.0, 10.0)]
        );
        assert_eq!(strokes[0].color.to_string(), "#ff0000");
        assert_eq!(strokes[0].stroke_width, 4.0);
        assert_eq!(capture.state(), CaptureState::Idle);
    }

    #[test]
    fn n_moves_yield_n_plus_one_points_with_color_fixed_at_down() {
        for n in [0usize, 1, 7, 40] {
            let mut capture = PointerCapture::new();
            let mut store = StrokeStore::new();
            let start = pen(Color::rgb(0, 0, 255));
            feed(&mut capture, &mut store, start, PointerKind::Down, at(0.0, 0.0));
            for i in 0..n {
                // The picker may change color mid-gesture; the stroke keeps its own.
                let changed = pen(Color::rgb(i as u8, 200, 0));
                feed(
                    &mut capture,
                    &mut store,
                    changed,
                    PointerKind::Move,
                    at(i as f64 + 1.0, 2.0 * i as f64),
                );
            }
            feed(&mut capture, &mut store, start, PointerKind::Up, None);

            let stroke = &store.snapshot()[0];
            assert_eq!(stroke.points.len(), n + 1);
            assert_eq!(stroke.color, Color::rgb(0, 0, 255));
            assert_eq!(stroke.stroke_width, 4.0);
            for (i, point) in stroke.points.iter().skip(1).enumerate() {
                assert_eq!(*point, Point::new(i as f32 + 1.0, 2.0 * i as f32));
            }
        }
    }

    #[test]
    fn moves_while_idle_do_not_touch_store() {
        let mut capture = PointerCapture::new();
        let mut store = StrokeStore::new();
        let selection = pen(Color::BLACK);
        let outcome = feed(&mut capture, &mut store, selection, PointerKind::Move, at(5.0, 5.0));
        assert_eq!(outcome, CaptureOutcome::Ignored);
        assert!(store.is_empty());

        feed(&mut capture, &mut store, selection, PointerKind::Down, at(1.0, 1.0));
        feed(&mut capture, &mut store, selection, PointerKind::Up, at(1.0, 1.0));
        let before = store.snapshot().to_vec();
        feed(&mut capture, &mut store, selection, PointerKind::Move, at(9.0, 9.0));
        feed(&mut capture, &mut store, selection, PointerKind::Up, at(9.0, 9.0));
        assert_eq!(store.snapshot(), before.as_slice());
    }

    #[test]
    fn select_tool_never_draws() {
        let mut capture = PointerCapture::new();
        let mut store = StrokeStore::new();
        let select = ToolSelection {
            tool: Tool::Select,
            color: Color::BLACK,
        };
        let outcome = feed(&mut capture, &mut store, select, PointerKind::Down, at(1.0, 1.0));
        assert_eq!(outcome, CaptureOutcome::Ignored);
        assert_eq!(capture.state(), CaptureState::Idle);
        assert!(store.is_empty());
    }

    #[test]
    fn switching_to_select_mid_gesture_guards_moves() {
        let mut capture = PointerCapture::new();
        let mut store = StrokeStore::new();
        let select = ToolSelection {
            tool: Tool::Select,
            color: Color::BLACK,
        };
        feed(&mut capture, &mut store, pen(Color::BLACK), PointerKind::Down, at(1.0, 1.0));
        let outcome = feed(&mut capture, &mut store, select, PointerKind::Move, at(2.0, 2.0));
        assert_eq!(outcome, CaptureOutcome::Ignored);
        assert!(capture.is_painting());
        assert_eq!(store.snapshot()[0].points.len(), 1);
    }

    #[test]
    fn leave_finalizes_gesture() {
        let mut capture = PointerCapture::new();
        let mut store = StrokeStore::new();
        let selection = pen(Color::BLACK);
        let started = feed(&mut capture, &mut store, selection, PointerKind::Down, at(1.0, 1.0));
        let CaptureOutcome::Started(id) = started else {
            panic!("expected a stroke to start, got {started:?}");
        };
        let outcome = feed(&mut capture, &mut store, selection, PointerKind::Leave, None);
        assert_eq!(outcome, CaptureOutcome::Finished(id));
        assert!(!capture.is_painting());
    }

    #[test]
    fn unknown_position_falls_back_to_origin() {
        let mut capture = PointerCapture::new();
        let mut store = StrokeStore::new();
        let selection = pen(Color::BLACK);
        feed(&mut capture, &mut store, selection, PointerKind::Down, None);
        feed(
            &mut capture,
            &mut store,
            selection,
            PointerKind::Move,
            Some(PointerPosition::new(f64::NAN, 3.0)),
        );
        assert_eq!(store.snapshot()[0].points, vec![Point::ORIGIN, Point::ORIGIN]);
        assert!(capture.is_painting());
    }

    #[test]
    fn missing_surface_box_falls_back_to_origin() {
        let none: Option<SurfaceRect> = None;
        assert_eq!(to_canvas_point(at(4.0, 4.0), &none), Point::ORIGIN);
        assert_eq!(to_canvas_point(at(4.0, 4.0), &SURFACE), Point::new(4.0, 4.0));
    }

    #[test]
    fn geometry_is_read_at_event_time() {
        let mut capture = PointerCapture::new();
        let mut store = StrokeStore::new();
        let selection = pen(Color::BLACK);
        let before = SurfaceRect {
            left: 0.0,
            top: 0.0,
            width: 100.0,
            height: 100.0,
        };
        let after = SurfaceRect {
            left: 30.0,
            top: 10.0,
            ..before
        };
        let position = Some(PointerPosition::new(50.0, 50.0));
        let mut context = CaptureContext {
            store: &mut store,
            selection,
            surface: &before,
        };
        capture.handle_pointer_event(PointerKind::Down, position, &mut context);
        let mut context = CaptureContext {
            store: &mut store,
            selection,
            surface: &after,
        };
        capture.handle_pointer_event(PointerKind::Move, position, &mut context);
        assert_eq!(
            store.snapshot()[0].points,
            vec![Point::new(50.0, 50.0), Point::new(20.0, 40.0)]
        );
    }

    #[test]
    fn two_gestures_keep_creation_order() {
        let mut capture = PointerCapture::new();
        let mut store = StrokeStore::new();
        let selection = pen(Color::BLACK);
        let mut ids = Vec::new();
        for _ in 0..2 {
            if let CaptureOutcome::Started(id) =
                feed(&mut capture, &mut store, selection, PointerKind::Down, at(10.0, 10.0))
            {
                ids.push(id);
            }
            feed(&mut capture, &mut store, selection, PointerKind::Move, at(11.0, 11.0));
            feed(&mut capture, &mut store, selection, PointerKind::Up, None);
        }
        let order: Vec<_> = store.snapshot().iter().map(|stroke| stroke.id).collect();
        assert_eq!(order, ids);
    }

    #[test]
    fn down_while_painting_starts_a_fresh_stroke() {
        let mut capture = PointerCapture::new();
        let mut store = StrokeStore::new();
        let selection = pen(Color::BLACK);
        feed(&mut capture, &mut store, selection, PointerKind::Down, at(1.0, 1.0));
        let outcome = feed(&mut capture, &mut store, selection, PointerKind::Down, at(2.0, 2.0));
        assert!(matches!(outcome, CaptureOutcome::Started(_)));
        feed(&mut capture, &mut store, selection, PointerKind::Move, at(3.0, 3.0));
        assert_eq!(store.len(), 2);
        assert_eq!(store.snapshot()[0].points.len(), 1);
        assert_eq!(store.snapshot()[1].points.len(), 2);
    }
}
