//! Output artifacts and export format selection.

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The export format for the PDF-to-other-formats direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// One JPEG image per page.
    Jpeg,
    /// One PNG image per page.
    Png,
    /// A single plain-text artifact with per-page headers.
    Text,
    /// Word-processing document. Accepted by the parser for a clear error
    /// message, but rejected at conversion time — there is no real
    /// implementation behind it.
    Word,
}

impl OutputFormat {
    /// File extension for artifacts in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Text => "txt",
            OutputFormat::Word => "docx",
        }
    }

    /// The raster sub-format, if this is an image export.
    pub fn raster(&self) -> Option<RasterFormat> {
        match self {
            OutputFormat::Jpeg => Some(RasterFormat::Jpeg),
            OutputFormat::Png => Some(RasterFormat::Png),
            OutputFormat::Text | OutputFormat::Word => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "txt" | "text" => Ok(OutputFormat::Text),
            "docx" | "word" => Ok(OutputFormat::Word),
            other => Err(ConvertError::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }
}

/// Image encodings supported for raster export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Jpeg,
    Png,
}

impl RasterFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            RasterFormat::Jpeg => "jpg",
            RasterFormat::Png => "png",
        }
    }
}

/// One produced artifact: a suggested file name plus its bytes.
///
/// Outputs are produced in batch per conversion run and never mutated after
/// creation; the next run's batch replaces them wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutput {
    /// Suggested file name, e.g. `page-3.png` or `extracted-text.txt`.
    pub filename: String,
    /// The artifact's content.
    pub bytes: Vec<u8>,
}

impl ConversionOutput {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Write this artifact into `dir` under its suggested file name.
    ///
    /// Uses atomic write (temp file + rename) to prevent partial files.
    /// Returns the final path.
    pub async fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ConvertError> {
        let dir = dir.as_ref();
        let path = dir.join(&self.filename);

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| ConvertError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;

        let tmp_path = dir.join(format!("{}.tmp", self.filename));
        tokio::fs::write(&tmp_path, &self.bytes)
            .await
            .map_err(|e| ConvertError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;

        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| ConvertError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;

        Ok(path)
    }
}
