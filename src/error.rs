//! Error types for the pageforge library.
//!
//! Conversion runs are all-or-nothing: the first failure aborts the run and
//! no partial outputs are kept. Every failure mode therefore surfaces as a
//! single [`ConvertError`] from the top-level controller methods.
//!
//! Intake rejection (wrong content type when staging files or setting the
//! source document) is deliberately *not* an error — those operations filter
//! silently, matching the accept-or-ignore behaviour of a drop zone.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pageforge library.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Source document errors ────────────────────────────────────────────
    /// The source bytes could not be opened as a PDF.
    #[error("Could not open the source document as a PDF: {detail}\nThe file may be corrupt or not a PDF at all.")]
    CorruptPdf { detail: String },

    /// pdfium returned an error while rasterising a specific page.
    #[error("Rendering failed for page {page}: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// pdfium returned an error while extracting text from a specific page.
    #[error("Text extraction failed for page {page}: {detail}")]
    ExtractFailed { page: usize, detail: String },

    /// A rendered page could not be encoded into the requested image format.
    #[error("Image encoding failed for page {page}: {detail}")]
    EncodeFailed { page: usize, detail: String },

    // ── Assembly errors ───────────────────────────────────────────────────
    /// A staged image could not be decoded for placement into the new PDF.
    #[error("Could not decode staged image '{name}': {detail}")]
    ImageDecodeFailed { name: String, detail: String },

    // ── Control errors ────────────────────────────────────────────────────
    /// The requested export format has no real implementation.
    ///
    /// Word-document export in particular is rejected rather than silently
    /// degraded to plain text.
    #[error("Output format '{format}' is not supported for export.\nChoose one of: jpg, png, txt.")]
    UnsupportedFormat { format: String },

    /// A second conversion was requested while one is still running.
    #[error("A conversion is already in progress; wait for it to finish before starting another.")]
    ConversionInProgress,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not write an output artifact to disk.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (e.g. a worker task panicked).
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_failed_display() {
        let e = ConvertError::RenderFailed {
            page: 4,
            detail: "bitmap allocation failed".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("page 4"), "got: {msg}");
        assert!(msg.contains("bitmap allocation failed"));
    }

    #[test]
    fn unsupported_format_display() {
        let e = ConvertError::UnsupportedFormat {
            format: "docx".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("docx"));
        assert!(msg.contains("jpg, png, txt"));
    }

    #[test]
    fn image_decode_display_names_the_file() {
        let e = ConvertError::ImageDecodeFailed {
            name: "scan-01.png".into(),
            detail: "unexpected EOF".into(),
        };
        assert!(e.to_string().contains("scan-01.png"));
    }

    #[test]
    fn output_write_failed_carries_source() {
        let e = ConvertError::OutputWriteFailed {
            path: PathBuf::from("/out/page-1.png"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.to_string().contains("page-1.png"));
        assert!(std::error::Error::source(&e).is_some());
    }
}
