//! The conversion controller: intake state plus the two conversion workflows.
//!
//! A [`ConversionController`] is an explicitly constructed, explicitly owned
//! object — there is no process-wide instance. It holds the uploaded source
//! document, the ordered staged-file set, the progress readout, and the last
//! run's output batch.
//!
//! Both workflows drive a strictly sequential loop: pages and files are
//! processed one at a time, in order, so `page-1`, `page-2`, … and the page
//! sequence of an assembled PDF are deterministic. A run either completes
//! with a full output batch or aborts on the first failure with none; while a
//! run is active a second convert call is rejected with
//! [`ConvertError::ConversionInProgress`].

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use crate::output::{ConversionOutput, OutputFormat};
use crate::pipeline::{assemble, encode, extract, input, render};
use crate::pipeline::input::{FileCandidate, StagedFile};
use crate::progress::{ProgressReporter, ProgressState};
use std::time::Duration;
use tracing::{debug, info, warn};

/// The uploaded PDF to be converted into other formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Display name, usually the original file name.
    pub name: String,
    /// Raw PDF content.
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Size in MiB.
    pub fn size_mib(&self) -> f64 {
        self.bytes.len() as f64 / (1024.0 * 1024.0)
    }

    /// One-line summary: name plus size in MiB to two decimals.
    pub fn summary(&self) -> String {
        format!("{} ({:.2} MiB)", self.name, self.size_mib())
    }
}

/// Lifecycle of a conversion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No run has happened yet.
    Idle,
    /// A run is active; further convert calls are rejected.
    Running,
    /// The last run finished and its outputs are available.
    Completed,
    /// The last run aborted; no outputs are kept.
    Failed,
}

/// Owns intake state and drives the two conversion workflows.
pub struct ConversionController {
    config: ConversionConfig,
    source: Option<SourceDocument>,
    staged: Vec<StagedFile>,
    progress: ProgressReporter,
    outputs: Vec<ConversionOutput>,
    state: RunState,
}

impl ConversionController {
    pub fn new(config: ConversionConfig) -> Self {
        let progress = ProgressReporter::new(config.progress_observer.clone());
        Self {
            config,
            source: None,
            staged: Vec::new(),
            progress,
            outputs: Vec::new(),
            state: RunState::Idle,
        }
    }

    // ── Intake ───────────────────────────────────────────────────────────

    /// Offer a candidate for the source-document slot.
    ///
    /// Accepted only if the declared media type is exactly
    /// `application/pdf` and the bytes carry the `%PDF` magic; a successful
    /// intake replaces any previous source wholesale. Returns whether the
    /// candidate was accepted — rejection changes no state.
    pub fn accept_pdf(&mut self, candidate: FileCandidate) -> bool {
        if candidate.media_type != input::PDF_MEDIA_TYPE || !input::is_pdf(&candidate.bytes) {
            debug!(
                "rejected source candidate '{}' ({})",
                candidate.name, candidate.media_type
            );
            return false;
        }

        let document = SourceDocument {
            name: candidate.name,
            bytes: candidate.bytes,
        };
        info!("source document set: {}", document.summary());
        self.source = Some(document);
        true
    }

    /// Offer candidates for the staged-file set.
    ///
    /// Filters to images, plain text, and word documents, then **replaces**
    /// the staged set with the survivors — a new selection overwrites the
    /// prior one. Returns the number of files now staged.
    pub fn accept_files(&mut self, candidates: Vec<FileCandidate>) -> usize {
        self.staged = input::filter_staged(candidates);
        info!("{} file(s) staged for assembly", self.staged.len());
        self.staged.len()
    }

    /// Remove the staged file at `index`, keeping the relative order of the
    /// rest. Out-of-range indices are ignored.
    pub fn remove_staged(&mut self, index: usize) {
        if index >= self.staged.len() {
            debug!("remove_staged({index}) out of range, ignoring");
            return;
        }
        let removed = self.staged.remove(index);
        debug!("unstaged '{}'", removed.name);
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn source(&self) -> Option<&SourceDocument> {
        self.source.as_ref()
    }

    pub fn staged(&self) -> &[StagedFile] {
        &self.staged
    }

    /// The last successful run's output batch. Replaced wholesale per run;
    /// empty after a failed run.
    pub fn outputs(&self) -> &[ConversionOutput] {
        &self.outputs
    }

    pub fn can_convert_from_pdf(&self) -> bool {
        self.source.is_some()
    }

    pub fn can_convert_to_pdf(&self) -> bool {
        !self.staged.is_empty()
    }

    pub fn run_state(&self) -> RunState {
        self.state
    }

    /// Snapshot of the progress readout.
    pub fn progress(&self) -> ProgressState {
        self.progress.snapshot()
    }

    // ── Export: PDF → other formats ──────────────────────────────────────

    /// Convert the source document into the requested format.
    ///
    /// Without a source document this is a no-op returning an empty batch.
    /// [`OutputFormat::Word`] is rejected up front — there is no real
    /// word-document exporter, and silently emitting text under a `.docx`
    /// label would mislead the caller.
    pub async fn convert_from_pdf(
        &mut self,
        format: OutputFormat,
    ) -> Result<Vec<ConversionOutput>, ConvertError> {
        if self.state == RunState::Running {
            return Err(ConvertError::ConversionInProgress);
        }
        let Some(source) = self.source.clone() else {
            debug!("convert_from_pdf without a source document, nothing to do");
            return Ok(Vec::new());
        };
        if format == OutputFormat::Word {
            return Err(ConvertError::UnsupportedFormat {
                format: format.to_string(),
            });
        }

        self.begin_run();
        let result = self.export_pdf(source, format).await;
        self.finish_run(result).await
    }

    async fn export_pdf(
        &self,
        source: SourceDocument,
        format: OutputFormat,
    ) -> Result<Vec<ConversionOutput>, ConvertError> {
        match format.raster() {
            Some(raster) => {
                self.progress.update(10.0, "Loading PDF...");

                let reporter = self.progress.clone();
                let images =
                    render::render_pages(source.bytes, self.config.render_scale, move |page, total| {
                        reporter.update(
                            page_percent(page, total),
                            format!("Converting page {page} of {total}..."),
                        );
                    })
                    .await?;

                let mut outputs = Vec::with_capacity(images.len());
                for (index, image) in images.iter().enumerate() {
                    let bytes = encode::encode_image(image, raster, self.config.jpeg_quality)
                        .map_err(|e| ConvertError::EncodeFailed {
                            page: index + 1,
                            detail: e.to_string(),
                        })?;
                    outputs.push(ConversionOutput::new(
                        format!("page-{}.{}", index + 1, raster.extension()),
                        bytes,
                    ));
                }

                self.progress.update(100.0, "Conversion complete!");
                Ok(outputs)
            }
            None => {
                self.progress.update(10.0, "Extracting text...");

                let reporter = self.progress.clone();
                let text = extract::extract_text(source.bytes, move |page, total| {
                    reporter.update(
                        page_percent(page, total),
                        format!("Processing page {page} of {total}..."),
                    );
                })
                .await?;

                self.progress.update(100.0, "Text extraction complete!");
                Ok(vec![ConversionOutput::new(
                    "extracted-text.txt",
                    text.into_bytes(),
                )])
            }
        }
    }

    // ── Export: other formats → PDF ──────────────────────────────────────

    /// Assemble the staged files into a new PDF.
    ///
    /// Without staged files this is a no-op returning an empty batch.
    pub async fn convert_to_pdf(&mut self) -> Result<Vec<ConversionOutput>, ConvertError> {
        if self.state == RunState::Running {
            return Err(ConvertError::ConversionInProgress);
        }
        if self.staged.is_empty() {
            debug!("convert_to_pdf with nothing staged, nothing to do");
            return Ok(Vec::new());
        }

        self.begin_run();

        let reporter = self.progress.clone();
        let files = self.staged.clone();
        let layout = self.config.layout;
        let title = self.config.document_title.clone();

        let result = async {
            let bytes = assemble::assemble_pdf(files, layout, title, move |index, total, name| {
                reporter.update(file_percent(index, total), format!("Processing {name}..."));
            })
            .await?;

            self.progress.update(100.0, "Generating PDF...");
            Ok(vec![ConversionOutput::new("converted-document.pdf", bytes)])
        }
        .await;

        self.finish_run(result).await
    }

    // ── Run lifecycle ────────────────────────────────────────────────────

    fn begin_run(&mut self) {
        self.state = RunState::Running;
        // The previous batch is superseded even if this run fails.
        self.outputs.clear();
        self.progress.show();
    }

    async fn finish_run(
        &mut self,
        result: Result<Vec<ConversionOutput>, ConvertError>,
    ) -> Result<Vec<ConversionOutput>, ConvertError> {
        match result {
            Ok(outputs) => {
                // Let observers display the final status before the readout
                // disappears and the results replace it.
                if self.config.settle_delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(self.config.settle_delay_ms)).await;
                }
                self.progress.hide();
                self.outputs.clone_from(&outputs);
                self.state = RunState::Completed;
                info!("conversion complete: {} output(s)", outputs.len());
                self.progress.run_complete(outputs.len());
                Ok(outputs)
            }
            Err(error) => {
                warn!("conversion run failed: {error}");
                self.progress.hide();
                self.state = RunState::Failed;
                self.progress.run_error(&error.to_string());
                Err(error)
            }
        }
    }
}

/// Per-page progress for the PDF-export direction: a 10 % head start for
/// loading, then 80 points spread across the pages.
fn page_percent(page: usize, total: usize) -> f32 {
    10.0 + (page as f32 / total as f32) * 80.0
}

/// Per-file progress for the assembly direction: 90 points across the files,
/// the last 10 reserved for serialisation.
fn file_percent(index: usize, total: usize) -> f32 {
    (index as f32 / total as f32) * 90.0
}
