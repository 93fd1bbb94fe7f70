use log::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlButtonElement, HtmlCanvasElement, PointerEvent, Window};

use maskpad_core::{PointerPosition, SurfaceGeometry, SurfaceRect};

use crate::render::redraw;
use crate::state::State;

pub fn get_element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    let element = document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Missing element: {id}")))?;
    element
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("Invalid element type: {id}")))
}

pub fn set_tool_button(button: &HtmlButtonElement, active: bool) {
    let pressed = if active { "true" } else { "false" };
    let _ = button.set_attribute("aria-pressed", pressed);
}

pub fn set_busy(button: &HtmlButtonElement, busy: bool) {
    let value = if busy { "true" } else { "false" };
    let _ = button.set_attribute("aria-busy", value);
}

pub fn set_cursor(canvas: &HtmlCanvasElement, cursor: &str) {
    let _ = canvas.style().set_property("cursor", cursor);
}

/// The toast in the corner of the page.
#[derive(Clone)]
pub struct Status {
    el: Element,
    text: Element,
}

impl Status {
    pub fn new(document: &Document) -> Result<Self, JsValue> {
        Ok(Self {
            el: get_element(document, "status")?,
            text: get_element(document, "status-text")?,
        })
    }

    pub fn success(&self, text: &str) {
        self.set("success", text);
    }

    pub fn error(&self, text: &str) {
        self.set("error", text);
    }

    fn set(&self, state: &str, text: &str) {
        let _ = self.el.set_attribute("data-state", state);
        self.text.set_text_content(Some(text));
    }
}

/// Reads the canvas box from the DOM on every call.
pub struct CanvasSurface<'a> {
    canvas: &'a HtmlCanvasElement,
}

impl<'a> CanvasSurface<'a> {
    pub fn new(canvas: &'a HtmlCanvasElement) -> Self {
        Self { canvas }
    }
}

impl SurfaceGeometry for CanvasSurface<'_> {
    fn bounding_box(&self) -> Option<SurfaceRect> {
        if !self.canvas.is_connected() {
            return None;
        }
        let rect = self.canvas.get_bounding_client_rect();
        Some(SurfaceRect {
            left: rect.left(),
            top: rect.top(),
            width: rect.width(),
            height: rect.height(),
        })
    }
}

pub fn event_position(event: &PointerEvent) -> PointerPosition {
    PointerPosition::new(event.client_x() as f64, event.client_y() as f64)
}

/// Measures the container, republishes the viewport, then sizes the canvas
/// backing store for the device pixel ratio.
pub fn resize_canvas(window: &Window, state: &mut State) {
    let rect = state.container.get_bounding_client_rect();
    state
        .session
        .observe_container(Some((rect.width(), rect.height())));
    let viewport = state.session.viewport();
    let dpr = window.device_pixel_ratio();
    debug!(
        "sizing canvas to {}x{} at dpr {dpr}",
        viewport.width(),
        viewport.height()
    );

    let style = state.canvas.style();
    let _ = style.set_property("width", &format!("{}px", viewport.width()));
    let _ = style.set_property("height", &format!("{}px", viewport.height()));
    state
        .canvas
        .set_width((viewport.width() as f64 * dpr).round() as u32);
    state
        .canvas
        .set_height((viewport.height() as f64 * dpr).round() as u32);
    let _ = state.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
    redraw(state);
}
