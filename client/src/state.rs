use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement};

use maskpad_core::Session;

pub struct State {
    pub session: Session,
    pub canvas: HtmlCanvasElement,
    pub ctx: CanvasRenderingContext2d,
    pub container: HtmlElement,
    /// Offscreen copy of the session's base image, ready for `drawImage`.
    pub image_surface: Option<HtmlCanvasElement>,
}

impl State {
    pub fn new(
        session: Session,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        container: HtmlElement,
    ) -> Self {
        Self {
            session,
            canvas,
            ctx,
            container,
            image_surface: None,
        }
    }
}
