use crate::error::{Error, Result};

/// Where a base image came from. Kept alongside the pixels so the host can
/// display the same source it handed in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    Url(String),
    Data(String),
}

/// Decoded base image in straight-alpha RGBA8. Read-only to the core.
#[derive(Clone, Debug, PartialEq)]
pub struct BaseImage {
    source: ImageSource,
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl BaseImage {
    pub fn from_rgba(source: ImageSource, width: u32, height: u32, rgba: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(Error::ImageDecode(format!(
                "expected {expected} bytes for {width}x{height}, got {}",
                rgba.len()
            )));
        }
        Ok(Self {
            source,
            width,
            height,
            rgba,
        })
    }

    /// Decodes PNG, JPEG, GIF, WebP or BMP bytes, sniffing the format from
    /// its signature.
    pub fn decode(source: ImageSource, bytes: &[u8]) -> Result<Self> {
        let decoded =
            ::image::load_from_memory(bytes).map_err(|e| Error::ImageDecode(e.to_string()))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba(source, width, height, rgba.into_raw())
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }
}
