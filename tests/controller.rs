//! Controller behaviour tests: intake filtering, staged-set editing, run
//! lifecycle, and the progress readout. None of these touch pdfium, so they
//! run everywhere.

use pageforge::{
    ContentKind, ConversionConfig, ConversionController, ConvertError, FileCandidate,
    OutputFormat, ProgressObserver, RunState, SharedProgressObserver,
};
use std::sync::{Arc, Mutex};

const WORD_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

fn controller() -> ConversionController {
    // No settle delay in tests.
    let config = ConversionConfig::builder().settle_delay_ms(0).build().unwrap();
    ConversionController::new(config)
}

fn pdf_candidate(name: &str) -> FileCandidate {
    FileCandidate::new(name, "application/pdf", b"%PDF-1.7\nfake".to_vec())
}

/// Records every progress event for later inspection.
#[derive(Default)]
struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Start,
    Progress(f32, String),
    Complete(usize),
    Error(String),
}

impl RecordingObserver {
    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressObserver for RecordingObserver {
    fn on_run_start(&self) {
        self.events.lock().unwrap().push(Event::Start);
    }
    fn on_progress(&self, percent: f32, status: &str) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Progress(percent, status.to_string()));
    }
    fn on_run_complete(&self, outputs: usize) {
        self.events.lock().unwrap().push(Event::Complete(outputs));
    }
    fn on_run_error(&self, error: &str) {
        self.events.lock().unwrap().push(Event::Error(error.to_string()));
    }
}

// ── Source intake ────────────────────────────────────────────────────────

#[test]
fn accept_pdf_takes_only_pdf_media_type() {
    let mut c = controller();

    assert!(!c.accept_pdf(FileCandidate::new("a.png", "image/png", b"%PDF-".to_vec())));
    assert!(c.source().is_none());
    assert!(!c.can_convert_from_pdf());

    assert!(c.accept_pdf(pdf_candidate("doc.pdf")));
    assert!(c.can_convert_from_pdf());
    assert_eq!(c.source().unwrap().name, "doc.pdf");
}

#[test]
fn accept_pdf_requires_magic_bytes() {
    let mut c = controller();
    let mislabeled = FileCandidate::new("doc.pdf", "application/pdf", b"not a pdf".to_vec());
    assert!(!c.accept_pdf(mislabeled));
    assert!(c.source().is_none());
}

#[test]
fn accept_pdf_replaces_previous_source_wholesale() {
    let mut c = controller();
    assert!(c.accept_pdf(pdf_candidate("first.pdf")));
    assert!(c.accept_pdf(pdf_candidate("second.pdf")));
    assert_eq!(c.source().unwrap().name, "second.pdf");

    // A rejected candidate leaves the previous source untouched.
    assert!(!c.accept_pdf(FileCandidate::new("x.txt", "text/plain", vec![])));
    assert_eq!(c.source().unwrap().name, "second.pdf");
}

// ── Staged-file intake ───────────────────────────────────────────────────

#[test]
fn accept_files_filters_and_preserves_order() {
    let mut c = controller();
    let staged = c.accept_files(vec![
        FileCandidate::new("a.png", "image/png", vec![1]),
        FileCandidate::new("movie.mp4", "video/mp4", vec![2]),
        FileCandidate::new("notes.txt", "text/plain", vec![3]),
        FileCandidate::new("report.docx", WORD_MEDIA_TYPE, vec![4]),
    ]);

    assert_eq!(staged, 3);
    assert!(c.can_convert_to_pdf());
    let names: Vec<&str> = c.staged().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a.png", "notes.txt", "report.docx"]);
    assert_eq!(c.staged()[0].kind, ContentKind::Image);
}

#[test]
fn accept_files_with_no_survivors_disables_assembly() {
    let mut c = controller();
    let staged = c.accept_files(vec![
        FileCandidate::new("a.pdf", "application/pdf", vec![1]),
        FileCandidate::new("b.html", "text/html", vec![2]),
    ]);
    assert_eq!(staged, 0);
    assert!(!c.can_convert_to_pdf());
}

#[test]
fn accept_files_replaces_rather_than_appends() {
    let mut c = controller();
    c.accept_files(vec![FileCandidate::new("a.png", "image/png", vec![1])]);
    c.accept_files(vec![
        FileCandidate::new("b.png", "image/png", vec![2]),
        FileCandidate::new("c.txt", "text/plain", vec![3]),
    ]);
    let names: Vec<&str> = c.staged().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["b.png", "c.txt"]);
}

#[test]
fn remove_staged_keeps_relative_order() {
    let mut c = controller();
    c.accept_files(vec![
        FileCandidate::new("a.png", "image/png", vec![1]),
        FileCandidate::new("b.png", "image/png", vec![2]),
        FileCandidate::new("c.png", "image/png", vec![3]),
        FileCandidate::new("d.png", "image/png", vec![4]),
    ]);

    c.remove_staged(1);
    let names: Vec<&str> = c.staged().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a.png", "c.png", "d.png"]);
}

#[test]
fn remove_staged_out_of_range_is_a_noop() {
    let mut c = controller();
    c.accept_files(vec![FileCandidate::new("a.png", "image/png", vec![1])]);

    c.remove_staged(5);
    assert_eq!(c.staged().len(), 1);

    c.remove_staged(0);
    assert!(c.staged().is_empty());
    assert!(!c.can_convert_to_pdf());

    // Removing from an empty set is also fine.
    c.remove_staged(0);
}

// ── Run lifecycle ────────────────────────────────────────────────────────

#[tokio::test]
async fn convert_from_pdf_without_source_is_a_noop() {
    let mut c = controller();
    let outputs = c.convert_from_pdf(OutputFormat::Png).await.unwrap();
    assert!(outputs.is_empty());
    assert_eq!(c.run_state(), RunState::Idle);
    assert!(!c.progress().visible);
}

#[tokio::test]
async fn convert_to_pdf_without_staged_files_is_a_noop() {
    let mut c = controller();
    let outputs = c.convert_to_pdf().await.unwrap();
    assert!(outputs.is_empty());
    assert_eq!(c.run_state(), RunState::Idle);
}

#[tokio::test]
async fn word_export_is_rejected_with_a_clear_error() {
    let mut c = controller();
    assert!(c.accept_pdf(pdf_candidate("doc.pdf")));

    let err = c.convert_from_pdf(OutputFormat::Word).await.unwrap_err();
    assert!(matches!(err, ConvertError::UnsupportedFormat { .. }));
    assert!(err.to_string().contains("docx"));

    // The rejection happens before the run starts.
    assert_eq!(c.run_state(), RunState::Idle);
    assert!(!c.progress().visible);
}

#[tokio::test]
async fn failed_run_hides_progress_and_keeps_no_outputs() {
    let observer = Arc::new(RecordingObserver::default());
    let config = ConversionConfig::builder()
        .settle_delay_ms(0)
        .progress_observer(observer.clone() as SharedProgressObserver)
        .build()
        .unwrap();
    let mut c = ConversionController::new(config);

    // Staged as an image, but the bytes are not decodable.
    c.accept_files(vec![FileCandidate::new(
        "broken.png",
        "image/png",
        b"definitely not an image".to_vec(),
    )]);

    let err = c.convert_to_pdf().await.unwrap_err();
    assert!(matches!(err, ConvertError::ImageDecodeFailed { .. }));

    assert_eq!(c.run_state(), RunState::Failed);
    assert!(!c.progress().visible);
    assert!(c.outputs().is_empty());

    let events = observer.events();
    assert_eq!(events.first(), Some(&Event::Start));
    assert!(matches!(events.last(), Some(Event::Error(_))));
    assert!(!events.iter().any(|e| matches!(e, Event::Complete(_))));
}

#[tokio::test]
async fn failure_supersedes_previous_outputs() {
    let mut c = controller();

    // First run succeeds: a tiny valid PNG.
    c.accept_files(vec![FileCandidate::new("ok.png", "image/png", tiny_png())]);
    let outputs = c.convert_to_pdf().await.unwrap();
    assert_eq!(outputs.len(), 1);
    assert_eq!(c.outputs().len(), 1);

    // Second run fails: the old batch must not survive.
    c.accept_files(vec![FileCandidate::new(
        "bad.png",
        "image/png",
        b"garbage".to_vec(),
    )]);
    assert!(c.convert_to_pdf().await.is_err());
    assert!(c.outputs().is_empty());
}

#[tokio::test]
async fn successful_run_reaches_exactly_100_before_results() {
    let observer = Arc::new(RecordingObserver::default());
    let config = ConversionConfig::builder()
        .settle_delay_ms(0)
        .progress_observer(observer.clone() as SharedProgressObserver)
        .build()
        .unwrap();
    let mut c = ConversionController::new(config);

    c.accept_files(vec![FileCandidate::new("ok.png", "image/png", tiny_png())]);
    let outputs = c.convert_to_pdf().await.unwrap();

    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].filename, "converted-document.pdf");
    assert_eq!(c.run_state(), RunState::Completed);
    assert!(!c.progress().visible);

    let events = observer.events();
    // The last progress update before completion is exactly 100.
    let last_progress = events
        .iter()
        .rev()
        .find_map(|e| match e {
            Event::Progress(p, s) => Some((*p, s.clone())),
            _ => None,
        })
        .expect("at least one progress event");
    assert_eq!(last_progress.0, 100.0);
    assert_eq!(last_progress.1, "Generating PDF...");
    assert_eq!(events.last(), Some(&Event::Complete(1)));
}

#[tokio::test]
async fn assembly_progress_names_each_file() {
    let observer = Arc::new(RecordingObserver::default());
    let config = ConversionConfig::builder()
        .settle_delay_ms(0)
        .progress_observer(observer.clone() as SharedProgressObserver)
        .build()
        .unwrap();
    let mut c = ConversionController::new(config);

    c.accept_files(vec![
        FileCandidate::new("one.png", "image/png", tiny_png()),
        FileCandidate::new("two.txt", "text/plain", b"hello".to_vec()),
    ]);
    c.convert_to_pdf().await.unwrap();

    let statuses: Vec<String> = observer
        .events()
        .iter()
        .filter_map(|e| match e {
            Event::Progress(_, s) => Some(s.clone()),
            _ => None,
        })
        .collect();
    assert!(statuses.contains(&"Processing one.png...".to_string()));
    assert!(statuses.contains(&"Processing two.txt...".to_string()));

    // Per-file percents follow the 90-point curve in order.
    let percents: Vec<f32> = observer
        .events()
        .iter()
        .filter_map(|e| match e {
            Event::Progress(p, _) => Some(*p),
            _ => None,
        })
        .collect();
    assert_eq!(percents, vec![0.0, 45.0, 100.0]);
}

/// A valid 1×1 PNG produced by the `image` crate.
fn tiny_png() -> Vec<u8> {
    use image::{Rgba, RgbaImage};
    let img = image::DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([0, 128, 255, 255])));
    let mut buf = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}
