//! Content type detection for imported files.
//!
//! Magic bytes decide first (`infer`); the extension is only consulted when
//! the header is not recognised, which is the normal case for plain text.

use std::path::Path;

use serde::{Deserialize, Serialize};

use mydocs_shared::constants::IMAGE_EXTENSIONS;

const OCTET_STREAM: &str = "application/octet-stream";

/// The file families the application accepts as attachments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Pdf,
    Image,
    Text,
    Archive,
    Other,
}

impl AttachmentKind {
    pub fn from_mime(mime: &str) -> Self {
        match mime {
            "application/pdf" => Self::Pdf,
            m if m.starts_with("image/") => Self::Image,
            m if m.starts_with("text/") => Self::Text,
            "application/zip"
            | "application/gzip"
            | "application/x-tar"
            | "application/x-bzip2"
            | "application/x-xz"
            | "application/x-7z-compressed"
            | "application/vnd.rar"
            | "application/x-rar-compressed" => Self::Archive,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    pub mime_type: String,
    pub kind: AttachmentKind,
}

impl MediaType {
    fn from_mime(mime: &str) -> Self {
        Self {
            mime_type: mime.to_string(),
            kind: AttachmentKind::from_mime(mime),
        }
    }

    pub fn is_image(&self) -> bool {
        self.kind == AttachmentKind::Image
    }
}

/// Detect the content type of the file at `path`.
pub fn detect(path: &Path) -> MediaType {
    match infer::get_from_path(path) {
        Ok(Some(kind)) => return MediaType::from_mime(kind.mime_type()),
        Ok(None) => {}
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "content sniffing failed");
        }
    }

    MediaType::from_mime(mime_from_extension(path))
}

fn mime_from_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return match ext.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "heic" => "image/heic",
            "heif" => "image/heif",
            "bmp" => "image/bmp",
            _ => "image/tiff",
        };
    }

    match ext.as_str() {
        "pdf" => "application/pdf",
        "txt" | "log" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "json" => "application/json",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",
        "7z" => "application/x-7z-compressed",
        "rar" => "application/vnd.rar",
        _ => OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_bytes_win_over_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.txt");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR").unwrap();

        let media = detect(&path);
        assert_eq!(media.mime_type, "image/png");
        assert!(media.is_image());
    }

    #[test]
    fn test_pdf_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contrato");
        std::fs::write(&path, b"%PDF-1.7\n%....").unwrap();

        let media = detect(&path);
        assert_eq!(media.kind, AttachmentKind::Pdf);
        assert!(!media.is_image());
    }

    #[test]
    fn test_plain_text_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notas.TXT");
        std::fs::write(&path, b"hola").unwrap();

        let media = detect(&path);
        assert_eq!(media.mime_type, "text/plain");
        assert_eq!(media.kind, AttachmentKind::Text);
    }

    #[test]
    fn test_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        std::fs::write(&path, b"just some bytes").unwrap();

        assert_eq!(detect(&path).kind, AttachmentKind::Other);
    }

    #[test]
    fn test_kind_from_mime() {
        assert_eq!(AttachmentKind::from_mime("application/zip"), AttachmentKind::Archive);
        assert_eq!(AttachmentKind::from_mime("image/heic"), AttachmentKind::Image);
        assert_eq!(AttachmentKind::from_mime("video/mp4"), AttachmentKind::Other);
    }
}
