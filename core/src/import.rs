use std::io::{Cursor, Read};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{debug, info};
use zip::ZipArchive;

use crate::error::{Error, Result};

pub const ZIP_MEDIA_TYPES: [&str; 2] = ["application/zip", "application/x-zip-compressed"];

pub fn is_zip_media_type(media_type: &str) -> bool {
    let media_type = media_type.trim();
    ZIP_MEDIA_TYPES
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(media_type))
}

pub fn data_url_for_png(bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(bytes))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ArchiveEntry {
    pub fn data_url(&self) -> String {
        data_url_for_png(&self.bytes)
    }
}

/// Opens the archive and returns its first entry, whatever its name.
pub fn extract_first_entry(media_type: &str, archive: &[u8]) -> Result<ArchiveEntry> {
    if !is_zip_media_type(media_type) {
        return Err(Error::UnsupportedFileType(media_type.to_string()));
    }
    let mut archive = ZipArchive::new(Cursor::new(archive))?;
    debug!("archive has {} entries", archive.len());
    if archive.is_empty() {
        return Err(Error::EmptyArchive);
    }
    let mut file = archive.by_index(0)?;
    let name = file.name().to_string();
    // Declared sizes are header data and never sized up front.
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| Error::InvalidArchive(e.into()))?;
    info!("extracted {name} ({} bytes) from archive", bytes.len());
    Ok(ArchiveEntry { name, bytes })
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write;

    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    use super::*;

    pub(crate) fn zip_of(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, bytes) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn accepts_zip_media_types_only() {
        assert!(is_zip_media_type("application/zip"));
        assert!(is_zip_media_type("application/x-zip-compressed"));
        assert!(!is_zip_media_type("image/png"));
        assert!(!is_zip_media_type(""));
    }

    #[test]
    fn rejects_non_zip_media_type() {
        let archive = zip_of(&[("image.png", b"bytes".as_slice())]);
        let result = extract_first_entry("image/png", &archive);
        assert!(matches!(result, Err(Error::UnsupportedFileType(kind)) if kind == "image/png"));
    }

    #[test]
    fn empty_archive_is_reported() {
        let archive = zip_of(&[]);
        let result = extract_first_entry("application/zip", &archive);
        assert!(matches!(result, Err(Error::EmptyArchive)));
    }

    #[test]
    fn first_entry_wins_regardless_of_name() {
        let archive = zip_of(&[("notes.txt", b"first".as_slice()), ("image.png", b"second".as_slice())]);
        let entry = extract_first_entry("application/zip", &archive).unwrap();
        assert_eq!(entry.name, "notes.txt");
        assert_eq!(entry.bytes, b"first");
    }

    #[test]
    fn data_url_wraps_base64_of_entry_bytes() {
        let archive = zip_of(&[("image.png", [0x89, b'P', b'N', b'G'].as_slice())]);
        let entry = extract_first_entry("application/x-zip-compressed", &archive).unwrap();
        assert_eq!(entry.data_url(), "data:image/png;base64,iVBORw==");
    }

    fn patch_u32(bytes: &mut [u8], offset: usize, value: u32) {
        bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    #[test]
    fn declared_entry_size_does_not_drive_allocation() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        writer.start_file("image.png", options).unwrap();
        writer.write_all(b"abcd").unwrap();
        let mut archive = writer.finish().unwrap().into_inner();

        // Uncompressed size lives at +22 in the local header and +24 in the central directory.
        patch_u32(&mut archive, 22, 0xFFFF_FFFE);
        let central = archive
            .windows(4)
            .position(|window| window == b"PK\x01\x02")
            .unwrap();
        patch_u32(&mut archive, central + 24, 0xFFFF_FFFE);

        let entry = extract_first_entry("application/zip", &archive).unwrap();
        assert_eq!(entry.bytes, b"abcd");
        assert!(entry.bytes.capacity() < 1 << 20);
    }

    #[test]
    fn garbage_bytes_are_an_invalid_archive() {
        let result = extract_first_entry("application/zip", b"definitely not a zip");
        assert!(matches!(result, Err(Error::InvalidArchive(_))));
    }
}
