//! Intake types and content-type filtering.
//!
//! Candidates arrive as name + media type + bytes, the same shape a browser
//! drop zone or a CLI argument list produces. Filtering is by declared media
//! type: images (`image/*`), plain text, and OOXML word-processing documents
//! survive; everything else is dropped silently. For the source-document slot
//! the media type must be exactly `application/pdf` and the bytes must carry
//! the `%PDF` magic — a meaningful rejection beats a pdfium crash later.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Media type accepted for the source-document slot.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// OOXML word-processing media type. Accepted at intake for parity with the
/// selection filter, but never convertible — see [`ContentKind::WordDocument`].
pub const WORD_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Content category a staged file falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentKind {
    /// Any `image/*` media type.
    Image,
    /// `text/plain`.
    PlainText,
    /// OOXML word-processing document. Survives intake filtering but is
    /// skipped during assembly — there is no converter behind it.
    WordDocument,
}

impl ContentKind {
    /// Classify a declared media type, or `None` if it is not accepted.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        if media_type.starts_with("image/") {
            Some(ContentKind::Image)
        } else if media_type == "text/plain" {
            Some(ContentKind::PlainText)
        } else if media_type == WORD_MEDIA_TYPE {
            Some(ContentKind::WordDocument)
        } else {
            None
        }
    }

    /// Classify by file extension, or `None` if the extension is not accepted.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        media_type_for_path(path).and_then(ContentKind::from_media_type)
    }
}

/// Map a file extension to the media type it conventionally declares.
///
/// Returns `None` for extensions pageforge has no use for.
pub fn media_type_for_path(path: impl AsRef<Path>) -> Option<&'static str> {
    let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some(PDF_MEDIA_TYPE),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "webp" => Some("image/webp"),
        "tif" | "tiff" => Some("image/tiff"),
        "txt" => Some("text/plain"),
        "docx" => Some(WORD_MEDIA_TYPE),
        _ => None,
    }
}

/// Check for the `%PDF` magic at the start of a byte buffer.
pub fn is_pdf(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && &bytes[..4] == b"%PDF"
}

/// A file offered for intake, before filtering.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    /// Display name, usually the original file name.
    pub name: String,
    /// Declared media type, e.g. `image/png`.
    pub media_type: String,
    /// File content.
    pub bytes: Vec<u8>,
}

impl FileCandidate {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Read a candidate from disk, deriving the media type from the file
    /// extension. Unknown extensions get `application/octet-stream`, which
    /// the staging filter will drop.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let media_type = media_type_for_path(path).unwrap_or("application/octet-stream");
        Ok(Self::new(name, media_type, bytes))
    }
}

/// A file that survived intake filtering, staged for PDF assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub name: String,
    pub kind: ContentKind,
    pub bytes: Vec<u8>,
}

/// Filter candidates down to the accepted content categories,
/// preserving the given order.
pub fn filter_staged(candidates: Vec<FileCandidate>) -> Vec<StagedFile> {
    candidates
        .into_iter()
        .filter_map(|candidate| match ContentKind::from_media_type(&candidate.media_type) {
            Some(kind) => Some(StagedFile {
                name: candidate.name,
                kind,
                bytes: candidate.bytes,
            }),
            None => {
                debug!(
                    "dropping '{}': media type '{}' not accepted",
                    candidate.name, candidate.media_type
                );
                None
            }
        })
        .collect()
}
