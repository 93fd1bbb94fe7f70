use std::cell::Cell;
use std::future::{ready, Future};
use std::io::{Cursor, Write};
use std::rc::Rc;

use log::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Error, Result};
use crate::raster::rasterize;
use crate::scene::Scene;

/// Export resolution multiplier over the on-screen viewport.
pub const SUPERSAMPLE: u32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportKind {
    Full,
    Mask,
}

impl ExportKind {
    pub fn base_name(self) -> &'static str {
        match self {
            ExportKind::Full => "drawn",
            ExportKind::Mask => "mask",
        }
    }

    pub fn archive_name(self) -> String {
        format!("{}.zip", self.base_name())
    }

    pub fn entry_name(self) -> String {
        format!("{}.png", self.base_name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    pub kind: ExportKind,
    /// Suggested download name, `{base}.zip`.
    pub file_name: String,
    pub entry_name: String,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

/// Admits one export at a time.
#[derive(Clone, Debug, Default)]
pub struct ExportGate {
    busy: Rc<Cell<bool>>,
}

impl ExportGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    pub fn try_acquire(&self) -> Result<ExportPermit> {
        if self.busy.replace(true) {
            return Err(Error::ExportInFlight);
        }
        Ok(ExportPermit {
            busy: Rc::clone(&self.busy),
        })
    }
}

/// Held for the lifetime of an export. Dropping it reopens the gate.
#[derive(Debug)]
pub struct ExportPermit {
    busy: Rc<Cell<bool>>,
}

impl Drop for ExportPermit {
    fn drop(&mut self) {
        self.busy.set(false);
    }
}

/// A scene captured at request time, waiting to be rendered and packaged.
#[derive(Debug)]
pub struct ExportJob {
    kind: ExportKind,
    scene: Scene,
    _permit: ExportPermit,
}

impl ExportJob {
    pub fn new(kind: ExportKind, scene: Scene, permit: ExportPermit) -> Self {
        Self {
            kind,
            scene,
            _permit: permit,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Runs the job without pausing between stages.
    pub async fn run(self) -> Result<ExportArtifact> {
        self.run_with_yield(|| ready(())).await
    }

    /// Runs the job, awaiting `yield_now` after rasterizing and after PNG
    /// encoding. Each stage itself is synchronous CPU work; the hook is where
    /// a single-threaded host gets to paint and handle input between them.
    pub async fn run_with_yield<F, Fut>(self, mut yield_now: F) -> Result<ExportArtifact>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        let raster = rasterize(&self.scene, SUPERSAMPLE)?;
        yield_now().await;
        let png = raster.encode_png()?;
        yield_now().await;
        debug!(
            "{:?} export rendered {}x{} ({} PNG bytes)",
            self.kind,
            raster.width(),
            raster.height(),
            png.len()
        );
        let entry_name = self.kind.entry_name();
        let bytes = assemble_archive(&entry_name, &png)?;
        let file_name = self.kind.archive_name();
        info!("exported {file_name} ({} bytes)", bytes.len());
        Ok(ExportArtifact {
            kind: self.kind,
            file_name,
            entry_name,
            width: raster.width(),
            height: raster.height(),
            bytes,
        })
    }
}

/// Packs `payload` as the only entry of a new zip archive. Blocks until done.
pub fn assemble_archive(entry_name: &str, payload: &[u8]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    writer
        .start_file(entry_name, options)
        .map_err(|e| Error::ArchiveAssembly(e.to_string()))?;
    writer
        .write_all(payload)
        .map_err(|e| Error::ArchiveAssembly(e.to_string()))?;
    let cursor = writer
        .finish()
        .map_err(|e| Error::ArchiveAssembly(e.to_string()))?;
    Ok(cursor.into_inner())
}
