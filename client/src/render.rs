use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use maskpad_core::{CaptureOutcome, Color, NodeKind, Point, RenderMode, Scene, StrokeStore};

use crate::state::State;

pub fn draw_dot(ctx: &CanvasRenderingContext2d, point: Point, color: Color, width: f32) {
    ctx.set_fill_style_str(&color.to_string());
    ctx.begin_path();
    let _ = ctx.arc(
        point.x as f64,
        point.y as f64,
        width as f64 / 2.0,
        0.0,
        std::f64::consts::PI * 2.0,
    );
    ctx.fill();
}

pub fn draw_segment(
    ctx: &CanvasRenderingContext2d,
    from: Point,
    to: Point,
    color: Color,
    width: f32,
) {
    ctx.set_stroke_style_str(&color.to_string());
    ctx.set_line_width(width as f64);
    ctx.set_line_cap("round");
    ctx.set_line_join("round");
    ctx.begin_path();
    ctx.move_to(from.x as f64, from.y as f64);
    ctx.line_to(to.x as f64, to.y as f64);
    ctx.stroke();
}

fn draw_polyline(ctx: &CanvasRenderingContext2d, points: &[Point], color: Color, width: f32) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    if rest.iter().all(|point| point == first) {
        draw_dot(ctx, *first, color, width);
        return;
    }
    ctx.set_stroke_style_str(&color.to_string());
    ctx.set_line_width(width as f64);
    ctx.set_line_cap("round");
    ctx.set_line_join("round");
    ctx.begin_path();
    ctx.move_to(first.x as f64, first.y as f64);
    for point in rest {
        ctx.line_to(point.x as f64, point.y as f64);
    }
    ctx.stroke();
}

pub fn draw_scene(
    ctx: &CanvasRenderingContext2d,
    scene: &Scene,
    image_surface: Option<&HtmlCanvasElement>,
) {
    let width = scene.viewport().width() as f64;
    let height = scene.viewport().height() as f64;
    ctx.clear_rect(0.0, 0.0, width, height);
    for node in scene.nodes() {
        match &node.kind {
            NodeKind::Background { color } => {
                ctx.set_fill_style_str(&color.to_string());
                ctx.fill_rect(0.0, 0.0, width, height);
            }
            NodeKind::Image { .. } => {
                if let Some(surface) = image_surface {
                    let _ = ctx.draw_image_with_html_canvas_element_and_dw_and_dh(
                        surface, 0.0, 0.0, width, height,
                    );
                }
            }
            NodeKind::Polyline {
                points,
                color,
                width,
            } => draw_polyline(ctx, points, *color, *width),
        }
    }
}

pub fn redraw(state: &mut State) {
    let scene = state.session.compose(RenderMode::Full);
    draw_scene(&state.ctx, &scene, state.image_surface.as_ref());
}

/// Paints only what the last pointer event added.
pub fn draw_outcome(ctx: &CanvasRenderingContext2d, store: &StrokeStore, outcome: CaptureOutcome) {
    let id = match outcome {
        CaptureOutcome::Started(id) | CaptureOutcome::Extended(id) => id,
        CaptureOutcome::Finished(_) | CaptureOutcome::Ignored => return,
    };
    let Some(stroke) = store.get(id) else {
        return;
    };
    match stroke.points.as_slice() {
        [] => {}
        [point] => draw_dot(ctx, *point, stroke.color, stroke.stroke_width),
        [.., from, to] => draw_segment(ctx, *from, *to, stroke.color, stroke.stroke_width),
    }
}
