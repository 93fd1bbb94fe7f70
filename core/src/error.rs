use crate::StrokeId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unsupported file type: {0:?} (expected a zip archive)")]
    UnsupportedFileType(String),

    #[error("Archive contains no entries")]
    EmptyArchive,

    #[error("Invalid archive: {0}")]
    InvalidArchive(#[from] zip::result::ZipError),

    #[error("Image decode error: {0}")]
    ImageDecode(String),

    #[error("Rasterization failed: {0}")]
    Rasterization(String),

    #[error("Archive assembly failed: {0}")]
    ArchiveAssembly(String),

    #[error("An export is already in progress")]
    ExportInFlight,

    #[error("Unknown stroke {0}")]
    UnknownStroke(StrokeId),

    #[error("Invalid color: {0:?}")]
    InvalidColor(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
