//! Progress state and observer callbacks for conversion runs.
//!
//! A run reports progress as a percentage (0–100) plus a human-readable
//! status line. The current values live in a shared [`ProgressState`] that
//! callers can snapshot at any time; an optional [`ProgressObserver`] receives
//! the same updates as they happen, which is how the CLI drives its terminal
//! progress bar without the library knowing anything about terminals.
//!
//! The state is `visible` exactly while a run is active: `show` flips it on
//! when the run starts, `hide` flips it off after the settle delay on success
//! or immediately on failure.
//!
//! The observer trait is `Send + Sync` because per-page updates are issued
//! from the blocking worker thread that drives pdfium.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Receives progress events as a conversion run advances.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ProgressObserver: Send + Sync {
    /// Called once when a run starts, before any work is done.
    fn on_run_start(&self) {}

    /// Called on every progress update.
    ///
    /// # Arguments
    /// * `percent` — completion in the range 0–100
    /// * `status`  — human-readable status line
    fn on_progress(&self, percent: f32, status: &str) {
        let _ = (percent, status);
    }

    /// Called after a successful run, once progress is hidden and the
    /// output batch has replaced the previous one.
    fn on_run_complete(&self, outputs: usize) {
        let _ = outputs;
    }

    /// Called when a run aborts. No outputs are kept.
    fn on_run_error(&self, error: &str) {
        let _ = error;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressObserver;

impl ProgressObserver for NoopProgressObserver {}

/// Convenience alias matching the type stored in
/// [`crate::config::ConversionConfig`].
pub type SharedProgressObserver = Arc<dyn ProgressObserver>;

/// Snapshot of the progress readout at one point in time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProgressState {
    /// True exactly while a conversion run is active.
    pub visible: bool,
    /// Percent complete, 0–100.
    pub percent: f32,
    /// Human-readable status line.
    pub status: String,
}

/// Shared handle through which a run publishes its progress.
///
/// Cloning is cheap; clones share the same underlying state, so a clone can
/// be moved into the blocking render/assemble task while the controller keeps
/// its own handle for snapshots.
#[derive(Clone, Default)]
pub struct ProgressReporter {
    state: Arc<Mutex<ProgressState>>,
    observer: Option<SharedProgressObserver>,
}

impl ProgressReporter {
    pub fn new(observer: Option<SharedProgressObserver>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ProgressState::default())),
            observer,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ProgressState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark the readout visible and reset it for a new run.
    pub fn show(&self) {
        {
            let mut state = self.lock();
            state.visible = true;
            state.percent = 0.0;
            state.status.clear();
        }
        if let Some(ref observer) = self.observer {
            observer.on_run_start();
        }
    }

    /// Publish a new percent/status pair.
    pub fn update(&self, percent: f32, status: impl Into<String>) {
        let status = status.into();
        {
            let mut state = self.lock();
            state.percent = percent;
            state.status.clone_from(&status);
        }
        if let Some(ref observer) = self.observer {
            observer.on_progress(percent, &status);
        }
    }

    /// Hide the readout. Percent and status keep their last values.
    pub fn hide(&self) {
        self.lock().visible = false;
    }

    /// Notify the observer that the run finished successfully.
    pub fn run_complete(&self, outputs: usize) {
        if let Some(ref observer) = self.observer {
            observer.on_run_complete(outputs);
        }
    }

    /// Notify the observer that the run aborted.
    pub fn run_error(&self, error: &str) {
        if let Some(ref observer) = self.observer {
            observer.on_run_error(error);
        }
    }

    /// Current state of the readout.
    pub fn snapshot(&self) -> ProgressState {
        self.lock().clone()
    }
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("state", &self.snapshot())
            .field("observer", &self.observer.as_ref().map(|_| "<dyn ProgressObserver>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingObserver {
        starts: AtomicUsize,
        updates: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
    }

    impl TrackingObserver {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                starts: AtomicUsize::new(0),
                updates: AtomicUsize::new(0),
                completes: AtomicUsize::new(0),
                errors: AtomicUsize::new(0),
            })
        }
    }

    impl ProgressObserver for TrackingObserver {
        fn on_run_start(&self) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }
        fn on_progress(&self, _percent: f32, _status: &str) {
            self.updates.fetch_add(1, Ordering::SeqCst);
        }
        fn on_run_complete(&self, _outputs: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }
        fn on_run_error(&self, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn show_update_hide_transitions() {
        let reporter = ProgressReporter::new(None);
        assert!(!reporter.snapshot().visible);

        reporter.show();
        let state = reporter.snapshot();
        assert!(state.visible);
        assert_eq!(state.percent, 0.0);

        reporter.update(42.5, "Converting page 2 of 5...");
        let state = reporter.snapshot();
        assert_eq!(state.percent, 42.5);
        assert_eq!(state.status, "Converting page 2 of 5...");

        reporter.hide();
        let state = reporter.snapshot();
        assert!(!state.visible);
        // Last percent/status are retained after hiding.
        assert_eq!(state.percent, 42.5);
    }

    #[test]
    fn show_resets_previous_run() {
        let reporter = ProgressReporter::new(None);
        reporter.show();
        reporter.update(100.0, "Conversion complete!");
        reporter.hide();

        reporter.show();
        let state = reporter.snapshot();
        assert_eq!(state.percent, 0.0);
        assert!(state.status.is_empty());
    }

    #[test]
    fn clones_share_state() {
        let reporter = ProgressReporter::new(None);
        let clone = reporter.clone();
        clone.update(73.0, "Processing photo.png...");
        assert_eq!(reporter.snapshot().percent, 73.0);
    }

    #[test]
    fn observer_receives_events() {
        let tracker = TrackingObserver::new();
        let reporter = ProgressReporter::new(Some(tracker.clone() as SharedProgressObserver));

        reporter.show();
        reporter.update(10.0, "Loading PDF...");
        reporter.update(100.0, "Conversion complete!");
        reporter.run_complete(3);
        reporter.run_error("boom");

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.updates.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn noop_observer_does_not_panic() {
        let observer = NoopProgressObserver;
        observer.on_run_start();
        observer.on_progress(50.0, "halfway");
        observer.on_run_complete(1);
        observer.on_run_error("nope");
    }
}
