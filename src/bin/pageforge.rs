//! CLI binary for pageforge.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig`, feeds files through the controller, and writes the
//! resulting artifacts to disk.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pageforge::{
    ConversionConfig, ConversionController, FileCandidate, OutputFormat, ProgressObserver,
    SharedProgressObserver,
};
use pageforge::pipeline::{input, render};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress observer using indicatif ────────────────────────────────────

/// Terminal progress observer: mirrors the library's percent/status readout
/// onto an [indicatif] bar anchored at the bottom of the terminal.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(100);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} [{bar:42.green/238}] {pos:>3}%  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        bar.set_style(style);
        Arc::new(Self { bar })
    }
}

impl ProgressObserver for CliProgress {
    fn on_run_start(&self) {
        self.bar.set_position(0);
        self.bar.set_message("starting…");
    }

    fn on_progress(&self, percent: f32, status: &str) {
        self.bar.set_position(percent.round() as u64);
        self.bar.set_message(status.to_string());
    }

    fn on_run_complete(&self, _outputs: usize) {
        self.bar.finish_and_clear();
    }

    fn on_run_error(&self, _error: &str) {
        // The error itself is reported by main's Result path.
        self.bar.finish_and_clear();
    }
}

// ── CLI definition ───────────────────────────────────────────────────────────

const AFTER_HELP: &str = r#"EXAMPLES:
  # Export every page as a PNG into ./out/
  pageforge export document.pdf --format png -o out

  # Export as JPEG at a softer quality
  pageforge export document.pdf --format jpg --quality 80 -o out

  # Extract the text of all pages
  pageforge export document.pdf --format txt -o out

  # Assemble images and text files into one PDF, in argument order
  pageforge assemble cover.png chapter1.txt photo.jpg -o book.pdf

  # Page count and size of a PDF
  pageforge inspect document.pdf --json
"#;

#[derive(Parser)]
#[command(
    name = "pageforge",
    version,
    about = "Export PDF pages as images or text, or assemble images/text into a PDF",
    after_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a PDF into per-page images or one extracted-text file.
    Export {
        /// Path to the source PDF.
        input: PathBuf,

        /// Output format: jpg, png, or txt.
        #[arg(short, long, default_value = "png")]
        format: String,

        /// Directory the artifacts are written into.
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Render scale factor (pixels per natural page unit).
        #[arg(long)]
        scale: Option<f32>,

        /// JPEG quality, 1-100.
        #[arg(long)]
        quality: Option<u8>,
    },

    /// Assemble image and text files into a single PDF, in argument order.
    Assemble {
        /// Files to include: images (png/jpg/gif/bmp/webp/tiff) and .txt.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Path of the PDF to write.
        #[arg(short, long, default_value = "converted-document.pdf")]
        output: PathBuf,

        /// Title metadata embedded in the PDF.
        #[arg(long)]
        title: Option<String>,
    },

    /// Print name, size, and page count of a PDF.
    Inspect {
        /// Path to the PDF.
        input: PathBuf,

        /// Emit JSON instead of human-readable text.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Export {
            input,
            format,
            out_dir,
            scale,
            quality,
        } => export(input, &format, out_dir, scale, quality).await,
        Command::Assemble {
            files,
            output,
            title,
        } => assemble(files, output, title).await,
        Command::Inspect { input, json } => inspect(input, json).await,
    }
}

fn build_config(
    scale: Option<f32>,
    quality: Option<u8>,
    title: Option<String>,
) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder().progress_observer(CliProgress::new() as SharedProgressObserver);
    if let Some(scale) = scale {
        builder = builder.render_scale(scale);
    }
    if let Some(quality) = quality {
        builder = builder.jpeg_quality(quality);
    }
    if let Some(title) = title {
        builder = builder.document_title(title);
    }
    builder.build().context("invalid configuration")
}

async fn export(
    input: PathBuf,
    format: &str,
    out_dir: PathBuf,
    scale: Option<f32>,
    quality: Option<u8>,
) -> Result<()> {
    let format: OutputFormat = format
        .parse()
        .with_context(|| format!("unrecognised format '{format}'"))?;

    let candidate = FileCandidate::from_path(&input)
        .with_context(|| format!("cannot read '{}'", input.display()))?;

    let mut controller = ConversionController::new(build_config(scale, quality, None)?);
    if !controller.accept_pdf(candidate) {
        bail!("'{}' is not a PDF", input.display());
    }

    let start = Instant::now();
    let outputs = controller.convert_from_pdf(format).await?;

    let mut written = Vec::with_capacity(outputs.len());
    for output in &outputs {
        written.push(output.write_to_dir(&out_dir).await?);
    }

    eprintln!(
        "{} {} artifact(s) written to {}  {}",
        green("✔"),
        bold(&written.len().to_string()),
        out_dir.display(),
        dim(&format!("{:.1}s", start.elapsed().as_secs_f64())),
    );
    for path in &written {
        println!("{}", path.display());
    }
    Ok(())
}

async fn assemble(files: Vec<PathBuf>, output: PathBuf, title: Option<String>) -> Result<()> {
    let mut candidates = Vec::with_capacity(files.len());
    for path in &files {
        candidates.push(
            FileCandidate::from_path(path)
                .with_context(|| format!("cannot read '{}'", path.display()))?,
        );
    }

    let mut controller = ConversionController::new(build_config(None, None, title)?);
    let staged = controller.accept_files(candidates);
    if staged == 0 {
        bail!("none of the given files are supported (images and .txt are accepted)");
    }
    if staged < files.len() {
        eprintln!(
            "{} {} of {} file(s) skipped (unsupported type)",
            dim("·"),
            files.len() - staged,
            files.len()
        );
    }

    let start = Instant::now();
    let outputs = controller.convert_to_pdf().await?;

    // Single artifact; write it under the caller's chosen path.
    let Some(artifact) = outputs.first() else {
        bail!("conversion produced no output");
    };
    tokio::fs::write(&output, &artifact.bytes)
        .await
        .with_context(|| format!("cannot write '{}'", output.display()))?;

    eprintln!(
        "{} wrote {}  {}",
        green("✔"),
        bold(&output.display().to_string()),
        dim(&format!(
            "from {} file(s), {:.1}s",
            staged,
            start.elapsed().as_secs_f64()
        )),
    );
    Ok(())
}

async fn inspect(input: PathBuf, json: bool) -> Result<()> {
    let candidate = FileCandidate::from_path(&input)
        .with_context(|| format!("cannot read '{}'", input.display()))?;
    if !input::is_pdf(&candidate.bytes) {
        bail!("'{}' is not a PDF", input.display());
    }

    let size_mib = candidate.bytes.len() as f64 / (1024.0 * 1024.0);
    let pages = render::page_count(candidate.bytes).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "name": candidate.name,
                "size_bytes": std::fs::metadata(&input)?.len(),
                "size_mib": format!("{size_mib:.2}"),
                "pages": pages,
            })
        );
    } else {
        println!("{}", bold(&candidate.name));
        println!("  size:  {size_mib:.2} MiB");
        println!("  pages: {pages}");
    }
    Ok(())
}
