use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod capture;
mod color;
mod config;
mod error;
mod export;
mod image;
mod import;
mod raster;
mod scene;
mod session;
mod store;
mod viewport;

pub use capture::{
    to_canvas_point, CaptureContext, CaptureOutcome, CaptureState, PointerCapture, PointerKind,
    PointerPosition, SurfaceGeometry, SurfaceRect, ToolSelection,
};
pub use color::Color;
pub use config::{Config, DEFAULT_BASE_IMAGE_URL, DEFAULT_VIEWPORT_SIZE};
pub use error::{Error, Result};
pub use export::{
    assemble_archive, ExportArtifact, ExportGate, ExportJob, ExportKind, ExportPermit, SUPERSAMPLE,
};
pub use image::{BaseImage, ImageSource};
pub use import::{
    data_url_for_png, extract_first_entry, is_zip_media_type, ArchiveEntry, ZIP_MEDIA_TYPES,
};
pub use raster::{rasterize, Raster};
pub use scene::{compose, NodeKind, RenderMode, Scene, SceneNode};
pub use session::Session;
pub use store::StrokeStore;
pub use viewport::{Viewport, ViewportSizer};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct StrokeId(Uuid);

impl StrokeId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for StrokeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Stroke {
    pub id: StrokeId,
    pub color: Color,
    pub stroke_width: f32,
    pub points: Vec<Point>,
}

/// Drawing tools each carry one fixed stroke width; `Select` never draws.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Pen,
    Brush,
    Select,
}

impl Tool {
    pub fn stroke_width(self) -> Option<f32> {
        match self {
            Tool::Pen => Some(4.0),
            Tool::Brush => Some(12.0),
            Tool::Select => None,
        }
    }

    pub fn is_drawing(self) -> bool {
        self.stroke_width().is_some()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "pen" => Some(Tool::Pen),
            "brush" => Some(Tool::Brush),
            "select" => Some(Tool::Select),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tool::Pen => "pen",
            Tool::Brush => "brush",
            Tool::Select => "select",
        }
    }
}
