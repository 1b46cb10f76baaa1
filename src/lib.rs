//! # pageforge
//!
//! Two-way PDF conversion: export a PDF's pages as images or extracted text,
//! or assemble a set of image/text files into a new PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF → other formats
//!  │
//!  ├─ intake    accept exactly one application/pdf source
//!  ├─ render    rasterise pages via pdfium at a fixed scale (spawn_blocking)
//!  ├─ encode    JPEG (quality 90) or PNG per page
//!  └─ output    page-1.png … page-N.png, or one extracted-text.txt
//!
//! other formats → PDF
//!  │
//!  ├─ intake    filter to image/*, text/plain, word documents; keep order
//!  ├─ assemble  one printpdf page per file: images fitted and centred,
//!  │            text wrapped from a fixed top-left origin
//!  └─ output    one converted-document.pdf
//! ```
//!
//! Pages and files are processed strictly one at a time, in order — output
//! ordering is deterministic and a run either completes with a full batch of
//! artifacts or aborts on the first failure with none.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pageforge::{ConversionConfig, ConversionController, FileCandidate, OutputFormat};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut controller = ConversionController::new(ConversionConfig::default());
//!
//!     let candidate = FileCandidate::from_path("document.pdf")?;
//!     if !controller.accept_pdf(candidate) {
//!         return Err("not a PDF".into());
//!     }
//!
//!     let outputs = controller.convert_from_pdf(OutputFormat::Png).await?;
//!     for output in &outputs {
//!         output.write_to_dir("out").await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pageforge` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pageforge = { version = "0.2", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod controller;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, PageLayout};
pub use controller::{ConversionController, RunState, SourceDocument};
pub use error::ConvertError;
pub use output::{ConversionOutput, OutputFormat, RasterFormat};
pub use pipeline::input::{ContentKind, FileCandidate, StagedFile};
pub use progress::{
    NoopProgressObserver, ProgressObserver, ProgressReporter, ProgressState,
    SharedProgressObserver,
};
