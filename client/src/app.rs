use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info, log_enabled, warn, Level};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    CanvasRenderingContext2d, Document, Event, FileReader, HtmlButtonElement, HtmlCanvasElement,
    HtmlElement, HtmlImageElement, HtmlInputElement, PointerEvent, ProgressEvent, Url,
    UrlSearchParams, Window,
};

use maskpad_core::{
    BaseImage, CaptureOutcome, Color, Config, ExportKind, ImageSource, PointerKind, Session, Tool,
};

use crate::dom::{
    event_position, get_element, resize_canvas, set_busy, set_cursor, set_tool_button,
    CanvasSurface, Status,
};
use crate::files::{
    download_bytes, image_pixels, image_surface, read_array_buffer, yield_to_browser,
};
use crate::render::{draw_outcome, redraw};
use crate::state::State;

const TOOLS: [Tool; 3] = [Tool::Pen, Tool::Brush, Tool::Select];

fn debug_enabled(window: &Window) -> bool {
    let search = window.location().search().ok().unwrap_or_default();
    search.contains("debug=1") || search.contains("debug=true")
}

/// Embedded `<script id="maskpad-config">` JSON, with `?image=` taking
/// precedence over its base image URL.
fn load_config(window: &Window, document: &Document) -> Config {
    let text = document
        .get_element_by_id("maskpad-config")
        .and_then(|element| element.text_content())
        .unwrap_or_default();
    let mut config = Config::from_json(&text).unwrap_or_else(|err| {
        warn!("ignoring page config: {err}");
        Config::default()
    });
    let search = window.location().search().ok().unwrap_or_default();
    if let Ok(params) = UrlSearchParams::new_with_str(&search) {
        if let Some(image) = params.get("image").filter(|url| !url.is_empty()) {
            config.base_image_url = Some(image);
        }
    }
    config
}

fn handle_pointer(state: &Rc<RefCell<State>>, kind: PointerKind, event: &PointerEvent) {
    let mut state = state.borrow_mut();
    let state = &mut *state;
    let surface = CanvasSurface::new(&state.canvas);
    let outcome = state
        .session
        .handle_pointer_event(kind, Some(event_position(event)), &surface);
    draw_outcome(&state.ctx, state.session.store(), outcome);
    if let CaptureOutcome::Finished(id) = outcome {
        if log_enabled!(Level::Debug) {
            if let Some(stroke) = state.session.store().get(id) {
                match serde_json::to_string(stroke) {
                    Ok(json) => debug!("stroke {json}"),
                    Err(err) => warn!("cannot dump stroke {id}: {err}"),
                }
            }
        }
    }
}

fn listen_pointer(
    canvas: &HtmlCanvasElement,
    state: &Rc<RefCell<State>>,
    event_name: &str,
    kind: PointerKind,
) -> Result<(), JsValue> {
    let pointer_state = state.clone();
    let onpointer = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
        if kind == PointerKind::Down {
            if event.button() != 0 {
                return;
            }
            event.prevent_default();
        }
        handle_pointer(&pointer_state, kind, &event);
    });
    canvas.add_event_listener_with_callback(event_name, onpointer.as_ref().unchecked_ref())?;
    onpointer.forget();
    Ok(())
}

/// Rebuilds the drawable copy of whatever base image the session now holds.
fn sync_image_surface(document: &Document, state: &mut State) {
    state.image_surface = match state.session.base_image() {
        Some(image) => match image_surface(document, image) {
            Ok(surface) => Some(surface),
            Err(err) => {
                warn!("cannot upload base image: {err:?}");
                None
            }
        },
        None => None,
    };
}

fn load_base_image(
    state: &Rc<RefCell<State>>,
    document: &Document,
    status: &Status,
    url: String,
    object_url: bool,
) -> Result<(), JsValue> {
    let image = HtmlImageElement::new()?;
    if !object_url {
        image.set_cross_origin(Some("anonymous"));
    }

    let load_state = state.clone();
    let load_document = document.clone();
    let load_status = status.clone();
    let load_url = url.clone();
    let onload = Closure::once_into_js(move |event: Event| {
        if object_url {
            let _ = Url::revoke_object_url(&load_url);
        }
        let Some(image) = event
            .target()
            .and_then(|target| target.dyn_into::<HtmlImageElement>().ok())
        else {
            return;
        };
        let decoded = image_pixels(&load_document, &image)
            .map_err(|err| format!("{err:?}"))
            .and_then(|(width, height, rgba)| {
                BaseImage::from_rgba(ImageSource::Url(load_url.clone()), width, height, rgba)
                    .map_err(|err| err.to_string())
            });
        let image = match decoded {
            Ok(image) => image,
            Err(err) => {
                warn!("cannot read pixels of {load_url}: {err}");
                load_status.error("Image could not be read");
                return;
            }
        };
        let mut state = load_state.borrow_mut();
        state.session.set_base_image(image);
        sync_image_surface(&load_document, &mut state);
        redraw(&mut state);
    });

    let error_status = status.clone();
    let error_url = url.clone();
    let onerror = Closure::once_into_js(move |_: Event| {
        warn!("failed to load image {error_url}");
        error_status.error("Image failed to load");
    });

    image.set_onload(Some(onload.unchecked_ref()));
    image.set_onerror(Some(onerror.unchecked_ref()));
    debug!("loading base image {url}");
    image.set_src(&url);
    Ok(())
}

#[wasm_bindgen(start)]
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;

    let level = if debug_enabled(&window) {
        Level::Debug
    } else {
        Level::Info
    };
    if console_log::init_with_level(level).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }

    let config = load_config(&window, &document);
    debug!("config {config:?}");

    let canvas: HtmlCanvasElement = get_element(&document, "canvas")?;
    let container: HtmlElement = get_element(&document, "canvas-container")?;
    let color_input: HtmlInputElement = get_element(&document, "color")?;
    let export_button: HtmlButtonElement = get_element(&document, "export")?;
    let export_mask_button: HtmlButtonElement = get_element(&document, "export-mask")?;
    let zip_input: HtmlInputElement = get_element(&document, "import-zip")?;
    let image_input: HtmlInputElement = get_element(&document, "import-image")?;
    let status = Status::new(&document)?;
    let tool_buttons = TOOLS
        .iter()
        .map(|tool| {
            get_element::<HtmlButtonElement>(&document, &format!("tool-{}", tool.name()))
                .map(|button| (*tool, button))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("Missing 2d context"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| JsValue::from_str("Invalid 2d context"))?;

    let base_image_url = config.base_image_url.clone();
    let session = Session::new(config);
    color_input.set_value(&session.selection().color.to_string());
    for (tool, button) in &tool_buttons {
        set_tool_button(button, *tool == session.selection().tool);
    }

    let state = Rc::new(RefCell::new(State::new(
        session,
        canvas.clone(),
        ctx,
        container,
    )));

    {
        let resize_state = state.clone();
        let window_cb = window.clone();
        let onresize = Closure::<dyn FnMut()>::new(move || {
            let mut state = resize_state.borrow_mut();
            resize_canvas(&window_cb, &mut state);
        });
        window.add_event_listener_with_callback("resize", onresize.as_ref().unchecked_ref())?;
        onresize.forget();
    }

    {
        let mut state = state.borrow_mut();
        resize_canvas(&window, &mut state);
    }

    listen_pointer(&canvas, &state, "pointerdown", PointerKind::Down)?;
    listen_pointer(&canvas, &state, "pointermove", PointerKind::Move)?;
    listen_pointer(&canvas, &state, "pointerup", PointerKind::Up)?;
    listen_pointer(&canvas, &state, "pointerleave", PointerKind::Leave)?;
    listen_pointer(&canvas, &state, "pointercancel", PointerKind::Leave)?;

    for (event_name, cursor) in [("pointerenter", "crosshair"), ("pointerleave", "default")] {
        let cursor_canvas = canvas.clone();
        let oncursor = Closure::<dyn FnMut(Event)>::new(move |_| {
            set_cursor(&cursor_canvas, cursor);
        });
        canvas.add_event_listener_with_callback(event_name, oncursor.as_ref().unchecked_ref())?;
        oncursor.forget();
    }

    for (tool, button) in &tool_buttons {
        let tool = *tool;
        let tool_state = state.clone();
        let buttons = tool_buttons.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            tool_state.borrow_mut().session.set_tool(tool);
            for (other, button) in &buttons {
                set_tool_button(button, *other == tool);
            }
            debug!("tool {}", tool.name());
        });
        button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let color_state = state.clone();
        let color_input_cb = color_input.clone();
        let oninput = Closure::<dyn FnMut(Event)>::new(move |_| {
            let value = color_input_cb.value();
            match value.parse::<Color>() {
                Ok(color) => color_state.borrow_mut().session.set_color(color),
                Err(err) => warn!("{err}"),
            }
        });
        color_input.add_event_listener_with_callback("input", oninput.as_ref().unchecked_ref())?;
        oninput.forget();
    }

    for (button, kind) in [
        (export_button, ExportKind::Full),
        (export_mask_button, ExportKind::Mask),
    ] {
        let export_state = state.clone();
        let export_status = status.clone();
        let export_document = document.clone();
        let button_cb = button.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            let job = export_state.borrow().session.export(kind);
            let job = match job {
                Ok(job) => job,
                Err(err) => {
                    export_status.error(&err.to_string());
                    return;
                }
            };
            set_busy(&button_cb, true);
            let status = export_status.clone();
            let document = export_document.clone();
            let button = button_cb.clone();
            spawn_local(async move {
                let result = job.run_with_yield(yield_to_browser).await;
                set_busy(&button, false);
                let artifact = match result {
                    Ok(artifact) => artifact,
                    Err(err) => {
                        warn!("export failed: {err}");
                        status.error(&err.to_string());
                        return;
                    }
                };
                match download_bytes(
                    &document,
                    &artifact.file_name,
                    &artifact.bytes,
                    "application/zip",
                ) {
                    Ok(()) => status.success(&format!("Saved {}", artifact.file_name)),
                    Err(err) => {
                        warn!("download failed: {err:?}");
                        status.error("Download failed");
                    }
                }
            });
        });
        button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let import_state = state.clone();
        let import_status = status.clone();
        let import_document = document.clone();
        let zip_input_cb = zip_input.clone();
        let onchange = Closure::<dyn FnMut(Event)>::new(move |_| {
            let Some(file) = zip_input_cb.files().and_then(|list| list.get(0)) else {
                return;
            };
            zip_input_cb.set_value("");
            let reader = match FileReader::new() {
                Ok(reader) => reader,
                Err(_) => return,
            };
            let media_type = file.type_();
            let state = import_state.clone();
            let status = import_status.clone();
            let document = import_document.clone();
            let onload = Closure::once_into_js(move |event: ProgressEvent| {
                let Some(bytes) = read_array_buffer(&event) else {
                    status.error("Could not read file");
                    return;
                };
                let mut state = state.borrow_mut();
                match state.session.import_archive(&media_type, &bytes) {
                    Ok(_) => {
                        sync_image_surface(&document, &mut state);
                        redraw(&mut state);
                        info!("imported base image from archive");
                        status.success("Image imported");
                    }
                    Err(err) => status.error(&err.to_string()),
                }
            });
            reader.set_onload(Some(onload.unchecked_ref()));
            if let Err(err) = reader.read_as_array_buffer(&file) {
                warn!("cannot read archive: {err:?}");
                import_status.error("Could not read file");
            }
        });
        zip_input.add_event_listener_with_callback("change", onchange.as_ref().unchecked_ref())?;
        onchange.forget();
    }

    {
        let image_state = state.clone();
        let image_status = status.clone();
        let image_document = document.clone();
        let image_input_cb = image_input.clone();
        let onchange = Closure::<dyn FnMut(Event)>::new(move |_| {
            let Some(file) = image_input_cb.files().and_then(|list| list.get(0)) else {
                return;
            };
            image_input_cb.set_value("");
            let loaded = Url::create_object_url_with_blob(&file).and_then(|url| {
                load_base_image(&image_state, &image_document, &image_status, url, true)
            });
            if let Err(err) = loaded {
                warn!("cannot open image file: {err:?}");
                image_status.error("Image failed to load");
            }
        });
        image_input.add_event_listener_with_callback("change", onchange.as_ref().unchecked_ref())?;
        onchange.forget();
    }

    if let Some(url) = base_image_url {
        load_base_image(&state, &document, &status, url, false)?;
    }

    info!("maskpad ready");
    Ok(())
}
