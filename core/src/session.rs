use std::rc::Rc;

use log::{info, warn};

use crate::capture::{
    CaptureContext, CaptureOutcome, PointerCapture, PointerKind, PointerPosition, SurfaceGeometry,
    ToolSelection,
};
use crate::config::Config;
use crate::error::Result;
use crate::export::{ExportGate, ExportJob, ExportKind};
use crate::image::{BaseImage, ImageSource};
use crate::import::extract_first_entry;
use crate::scene::{compose, RenderMode, Scene};
use crate::store::StrokeStore;
use crate::viewport::{Viewport, ViewportSizer};
use crate::{Color, Stroke, Tool};

/// Everything one drawing session owns. The host holds a single instance and
/// feeds it DOM events in delivery order.
#[derive(Debug)]
pub struct Session {
    config: Config,
    store: StrokeStore,
    capture: PointerCapture,
    sizer: ViewportSizer,
    selection: ToolSelection,
    base_image: Option<Rc<BaseImage>>,
    exports: ExportGate,
}

impl Session {
    pub fn new(config: Config) -> Self {
        let selection = ToolSelection {
            tool: config.default_tool,
            color: config.default_color,
        };
        Self {
            sizer: ViewportSizer::new(config.default_viewport),
            store: StrokeStore::new(),
            capture: PointerCapture::new(),
            selection,
            base_image: None,
            exports: ExportGate::new(),
            config,
        }
    }

    pub fn store(&self) -> &StrokeStore {
        &self.store
    }

    pub fn strokes(&self) -> &[Stroke] {
        self.store.snapshot()
    }

    pub fn viewport(&self) -> Viewport {
        self.sizer.viewport()
    }

    pub fn observe_container(&mut self, measured: Option<(f64, f64)>) -> bool {
        self.sizer.observe(measured)
    }

    pub fn selection(&self) -> ToolSelection {
        self.selection
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.selection.tool = tool;
    }

    pub fn set_color(&mut self, color: Color) {
        self.selection.color = color;
    }

    pub fn handle_pointer_event(
        &mut self,
        kind: PointerKind,
        position: Option<PointerPosition>,
        surface: &dyn SurfaceGeometry,
    ) -> CaptureOutcome {
        let mut context = CaptureContext {
            store: &mut self.store,
            selection: self.selection,
            surface,
        };
        self.capture.handle_pointer_event(kind, position, &mut context)
    }

    pub fn is_painting(&self) -> bool {
        self.capture.is_painting()
    }

    pub fn base_image(&self) -> Option<&Rc<BaseImage>> {
        self.base_image.as_ref()
    }

    pub fn set_base_image(&mut self, image: BaseImage) {
        info!(
            "base image {}x{} from {}",
            image.width(),
            image.height(),
            describe(image.source())
        );
        self.base_image = Some(Rc::new(image));
    }

    /// Replaces the base image with the first entry of a zip archive, in any
    /// format [`BaseImage::decode`] reads. The source is always announced as
    /// a PNG data URL. On any error the current base image is left as it was.
    pub fn import_archive(&mut self, media_type: &str, archive: &[u8]) -> Result<ImageSource> {
        let entry = extract_first_entry(media_type, archive).inspect_err(|error| {
            warn!("archive import failed: {error}");
        })?;
        let source = ImageSource::Data(entry.data_url());
        let image = BaseImage::decode(source.clone(), &entry.bytes).inspect_err(|error| {
            warn!("entry {} is not a readable image: {error}", entry.name);
        })?;
        self.set_base_image(image);
        Ok(source)
    }

    pub fn compose(&self, mode: RenderMode) -> Scene {
        compose(
            self.base_image.as_ref(),
            self.config.background,
            self.store.snapshot(),
            self.viewport(),
            mode,
        )
    }

    /// Captures the current scene for `kind`. The returned job holds the
    /// export slot until it finishes or is dropped.
    pub fn export(&self, kind: ExportKind) -> Result<ExportJob> {
        let permit = self.exports.try_acquire().inspect_err(|_| {
            warn!("{kind:?} export requested while another is running");
        })?;
        let full = self.compose(RenderMode::Full);
        let scene = match kind {
            ExportKind::Full => full,
            ExportKind::Mask => full.without_excludable(),
        };
        Ok(ExportJob::new(kind, scene, permit))
    }

    pub fn export_full(&self) -> Result<ExportJob> {
        self.export(ExportKind::Full)
    }

    pub fn export_mask(&self) -> Result<ExportJob> {
        self.export(ExportKind::Mask)
    }

    pub fn export_in_flight(&self) -> bool {
        self.exports.is_busy()
    }
}

fn describe(source: &ImageSource) -> &str {
    match source {
        ImageSource::Url(url) => url,
        ImageSource::Data(_) => "imported archive",
    }
}
