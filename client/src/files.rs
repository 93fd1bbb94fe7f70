use js_sys::{Array, Function, Promise, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Blob, BlobPropertyBag, CanvasRenderingContext2d, Document, FileReader, HtmlAnchorElement,
    HtmlCanvasElement, HtmlImageElement, ImageData, ProgressEvent, Url,
};

use maskpad_core::BaseImage;

pub fn download_bytes(
    document: &Document,
    file_name: &str,
    bytes: &[u8],
    mime_type: &str,
) -> Result<(), JsValue> {
    let parts = Array::new();
    parts.push(&Uint8Array::from(bytes));
    let options = BlobPropertyBag::new();
    options.set_type(mime_type);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let anchor: HtmlAnchorElement = document
        .create_element("a")?
        .dyn_into()
        .map_err(|_| JsValue::from_str("Invalid element type: a"))?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();
    Url::revoke_object_url(&url)
}

pub fn read_array_buffer(event: &ProgressEvent) -> Option<Vec<u8>> {
    let reader: FileReader = event.target()?.dyn_into().ok()?;
    let result = reader.result().ok()?;
    Some(Uint8Array::new(&result).to_vec())
}

fn scratch_canvas(
    document: &Document,
    width: u32,
    height: u32,
) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), JsValue> {
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")?
        .dyn_into()
        .map_err(|_| JsValue::from_str("Invalid element type: canvas"))?;
    canvas.set_width(width);
    canvas.set_height(height);
    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("Missing 2d context"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| JsValue::from_str("Invalid 2d context"))?;
    Ok((canvas, ctx))
}

/// Straight RGBA pixels of a loaded image. Fails on a cross-origin image the
/// server did not allow, since the canvas it was drawn to is then tainted.
pub fn image_pixels(
    document: &Document,
    image: &HtmlImageElement,
) -> Result<(u32, u32, Vec<u8>), JsValue> {
    let width = image.natural_width();
    let height = image.natural_height();
    if width == 0 || height == 0 {
        return Ok((width, height, Vec::new()));
    }
    let (_, ctx) = scratch_canvas(document, width, height)?;
    ctx.draw_image_with_html_image_element(image, 0.0, 0.0)?;
    let data = ctx.get_image_data(0.0, 0.0, width as f64, height as f64)?;
    Ok((width, height, data.data().0))
}

/// Uploads the base image into a canvas the renderer can `drawImage` from.
pub fn image_surface(document: &Document, image: &BaseImage) -> Result<HtmlCanvasElement, JsValue> {
    let (canvas, ctx) = scratch_canvas(document, image.width(), image.height())?;
    if image.width() > 0 && image.height() > 0 {
        let data = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(image.rgba()),
            image.width(),
            image.height(),
        )?;
        ctx.put_image_data(&data, 0.0, 0.0)?;
    }
    Ok(canvas)
}

/// Resolves on the next macrotask so the browser can paint and dispatch input.
pub async fn yield_to_browser() {
    let promise = Promise::new(&mut |resolve: Function, _reject: Function| {
        let scheduled = web_sys::window()
            .map(|window| window.set_timeout_with_callback(&resolve).is_ok())
            .unwrap_or(false);
        if !scheduled {
            let _ = resolve.call0(&JsValue::NULL);
        }
    });
    let _ = JsFuture::from(promise).await;
}
