//! Icon file type detection.
//!
//! Files are classified by extension first (`.svg`, `.svgz`, `.svg.gz`,
//! case-insensitive). Files with any other extension are sniffed by content:
//! a gzip stream whose inflated head contains an `<svg` element is a
//! compressed SVG, plain text containing `<svg` is an SVG, anything else is
//! treated as a raster image.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;

/// Number of bytes inspected when sniffing content.
const SNIFF_LEN: u64 = 1024;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Kind of file passed to `add_file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// Plain SVG document.
    Svg,
    /// Gzip-compressed SVG document.
    CompressedSvg,
    /// Anything else (assumed to be a raster image).
    Other,
}

impl FileType {
    /// Check if this is a vector type.
    pub fn is_svg(self) -> bool {
        matches!(self, FileType::Svg | FileType::CompressedSvg)
    }
}

/// Classify a file by name, falling back to its content.
pub fn detect_file_type(path: &Path) -> FileType {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    if name.ends_with(".svg") {
        return FileType::Svg;
    }
    if name.ends_with(".svgz") || name.ends_with(".svg.gz") {
        return FileType::CompressedSvg;
    }

    sniff_content(path).unwrap_or(FileType::Other)
}

fn sniff_content(path: &Path) -> Option<FileType> {
    let mut head = Vec::new();
    File::open(path)
        .ok()?
        .take(SNIFF_LEN)
        .read_to_end(&mut head)
        .ok()?;
    Some(classify_bytes(&head))
}

/// Classify the first bytes of a file.
pub fn classify_bytes(head: &[u8]) -> FileType {
    if head.starts_with(&GZIP_MAGIC) {
        let mut inflated = Vec::new();
        // A truncated stream still yields its leading bytes
        let mut decoder = GzDecoder::new(head).take(SNIFF_LEN);
        let _ = decoder.read_to_end(&mut inflated);
        return if contains_svg_tag(&inflated) {
            FileType::CompressedSvg
        } else {
            FileType::Other
        };
    }

    if contains_svg_tag(head) {
        FileType::Svg
    } else {
        FileType::Other
    }
}

fn contains_svg_tag(data: &[u8]) -> bool {
    data.windows(4).any(|w| w.eq_ignore_ascii_case(b"<svg"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SVG: &[u8] = br#"<?xml version="1.0"?><svg xmlns="http://www.w3.org/2000/svg"/>"#;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(detect_file_type(Path::new("icons/save.svg")), FileType::Svg);
        assert_eq!(detect_file_type(Path::new("icons/SAVE.SVG")), FileType::Svg);
        assert_eq!(
            detect_file_type(Path::new("icons/save.svgz")),
            FileType::CompressedSvg
        );
        assert_eq!(
            detect_file_type(Path::new("icons/save.svg.gz")),
            FileType::CompressedSvg
        );
    }

    #[test]
    fn test_missing_file_is_other() {
        let missing = Path::new("/nonexistent/icon.png");
        assert_eq!(detect_file_type(missing), FileType::Other);
    }

    #[test]
    fn test_classify_bytes() {
        assert_eq!(classify_bytes(SVG), FileType::Svg);
        assert_eq!(classify_bytes(&gzip(SVG)), FileType::CompressedSvg);
        assert_eq!(classify_bytes(b"\x89PNG\r\n\x1a\n"), FileType::Other);
        assert_eq!(classify_bytes(&gzip(b"plain text")), FileType::Other);
    }

    #[test]
    fn test_sniff_file_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("icon");
        std::fs::write(&path, SVG).unwrap();
        assert_eq!(detect_file_type(&path), FileType::Svg);

        let zpath = dir.path().join("icon.bin");
        std::fs::write(&zpath, gzip(SVG)).unwrap();
        assert_eq!(detect_file_type(&zpath), FileType::CompressedSvg);
    }

    #[test]
    fn test_is_svg() {
        assert!(FileType::Svg.is_svg());
        assert!(FileType::CompressedSvg.is_svg());
        assert!(!FileType::Other.is_svg());
    }
}
