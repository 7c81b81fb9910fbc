//! Recording-session state machine.
//!
//! Coordinates the exclusive input device, the per-take staging artifact, and
//! the capture worker. Every transition out of `Recording` joins the worker
//! synchronously before anything may re-open the device; a fire-and-forget
//! stop would let two workers contend for the one physical line.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use tracing::debug;

use crate::audio::{CaptureBackend, CaptureWorker, SaveIntent, StagingArtifact, TakeOutcome};
use crate::error::RecorderError;
use crate::store::TakeStore;

struct ActiveTake {
    name: String,
    worker: CaptureWorker,
}

pub struct RecordingSession {
    backend: Arc<Mutex<dyn CaptureBackend>>,
    store: TakeStore,
    active: Option<ActiveTake>,
}

impl RecordingSession {
    pub fn new(backend: Arc<Mutex<dyn CaptureBackend>>, store: TakeStore) -> Self {
        Self {
            backend,
            store,
            active: None,
        }
    }

    pub fn store(&self) -> &TakeStore {
        &self.store
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.as_ref().map(|take| take.name.as_str())
    }

    pub fn recording_since(&self) -> Option<Instant> {
        self.active.as_ref().map(|take| take.worker.started_at())
    }

    /// Begin a take for `name`. An in-flight take is saved first; its worker
    /// join is what frees the device for the new take.
    pub fn start(&mut self, name: &str) -> Result<(), RecorderError> {
        self.stop_and_save()?;
        let artifact = StagingArtifact::new(self.store.dir())?;
        let dest = self.store.path_for(name);
        let worker = CaptureWorker::spawn(Arc::clone(&self.backend), artifact, dest);
        debug!(take = name, "capture started");
        self.active = Some(ActiveTake {
            name: name.to_string(),
            worker,
        });
        Ok(())
    }

    /// Stop the active take and commit it under its name. No-op when idle.
    pub fn stop_and_save(&mut self) -> Result<Option<TakeOutcome>, RecorderError> {
        let Some(take) = self.active.take() else {
            return Ok(None);
        };
        let outcome = take.worker.stop(SaveIntent::Save)?;
        debug!(take = %take.name, ?outcome, "take stopped with save intent");
        Ok(Some(outcome))
    }

    /// Stop the active take and destroy its artifact. No-op when idle.
    pub fn stop_and_discard(&mut self) -> Result<(), RecorderError> {
        let Some(take) = self.active.take() else {
            return Ok(());
        };
        take.worker.stop(SaveIntent::Discard)?;
        debug!(take = %take.name, "take stopped with discard intent");
        Ok(())
    }

    /// Discard the active take and immediately re-record under the same
    /// name. Returns false when idle, since there is nothing to retry.
    pub fn retry(&mut self) -> Result<bool, RecorderError> {
        let Some(name) = self.active_name().map(str::to_string) else {
            return Ok(false);
        };
        self.stop_and_discard()?;
        self.start(&name)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::FakeBackend;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Fixture {
        session: RecordingSession,
        store: TakeStore,
        streams: Arc<AtomicUsize>,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TakeStore::new(dir.path());
        let backend = FakeBackend::new();
        let streams = backend.open_streams.clone();
        let backend: Arc<Mutex<dyn CaptureBackend>> = Arc::new(Mutex::new(backend));
        Fixture {
            session: RecordingSession::new(backend, store.clone()),
            store,
            streams,
            _dir: dir,
        }
    }

    fn settle() {
        std::thread::sleep(Duration::from_millis(15));
    }

    fn committed_files(store: &TakeStore) -> usize {
        std::fs::read_dir(store.dir()).expect("read dir").count()
    }

    #[test]
    fn save_commits_exactly_the_named_take() {
        let mut fx = fixture();
        fx.session.start("go_now").expect("start");
        assert!(fx.session.is_recording());
        assert_eq!(fx.session.active_name(), Some("go_now"));
        settle();

        let outcome = fx.session.stop_and_save().expect("stop").expect("active");
        assert!(matches!(outcome, TakeOutcome::Committed(_)));
        assert!(!fx.session.is_recording());
        assert!(fx.store.exists("go_now"));
        assert_eq!(fx.streams.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn discard_leaves_no_committed_recording() {
        let mut fx = fixture();
        fx.session.start("go_now").expect("start");
        settle();
        fx.session.stop_and_discard().expect("discard");

        assert!(!fx.store.exists("go_now"));
        assert_eq!(committed_files(&fx.store), 0);
        assert_eq!(fx.streams.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn starting_while_recording_saves_the_prior_take_first() {
        let mut fx = fixture();
        fx.session.start("go_now").expect("first start");
        settle();
        fx.session.start("stop_here").expect("second start");

        // The first take is durable before the second worker runs.
        assert!(fx.store.exists("go_now"));
        assert!(fx.session.is_recording());
        assert_eq!(fx.session.active_name(), Some("stop_here"));
        settle();

        fx.session.stop_and_save().expect("final stop");
        assert!(fx.store.exists("stop_here"));
        assert_eq!(fx.streams.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn retry_discards_the_first_attempt() {
        let mut fx = fixture();
        fx.session.start("go_now").expect("start");
        settle();
        assert!(fx.session.retry().expect("retry"));
        assert_eq!(fx.session.active_name(), Some("go_now"));
        // Nothing committed while the retried take is still rolling.
        assert!(!fx.store.exists("go_now"));
        settle();

        fx.session.stop_and_save().expect("stop");
        assert!(fx.store.exists("go_now"));
        assert_eq!(committed_files(&fx.store), 1);
    }

    #[test]
    fn retry_when_idle_reports_nothing_to_do() {
        let mut fx = fixture();
        assert!(!fx.session.retry().expect("retry"));
        assert!(!fx.session.is_recording());
        assert_eq!(committed_files(&fx.store), 0);
    }

    #[test]
    fn idle_stops_are_no_ops() {
        let mut fx = fixture();
        assert!(fx.session.stop_and_save().expect("save").is_none());
        fx.session.stop_and_discard().expect("discard");
        assert!(!fx.session.is_recording());
        assert_eq!(fx.streams.load(Ordering::SeqCst), 0);
        assert_eq!(committed_files(&fx.store), 0);
    }

    #[test]
    fn device_is_held_exactly_while_recording() {
        let mut fx = fixture();
        assert_eq!(fx.streams.load(Ordering::SeqCst), 0);
        fx.session.start("go_now").expect("start");
        settle();
        assert_eq!(fx.streams.load(Ordering::SeqCst), 1);
        fx.session.stop_and_discard().expect("stop");
        assert_eq!(fx.streams.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn rapid_transitions_never_overlap_workers() {
        // FakeBackend panics the worker if two streams are ever live at once,
        // which stop() would surface as an error here.
        let mut fx = fixture();
        for round in 0..5 {
            fx.session.start(&format!("take_{round}")).expect("start");
            assert!(fx.session.retry().expect("retry"));
        }
        fx.session.stop_and_save().expect("stop");
        assert!(fx.store.exists("take_4"));
        assert_eq!(fx.streams.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failed_worker_surfaces_recoverable_error_and_goes_idle() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TakeStore::new(dir.path());
        let backend: Arc<Mutex<dyn CaptureBackend>> =
            Arc::new(Mutex::new(FakeBackend::failing()));
        let mut session = RecordingSession::new(backend, store.clone());

        session.start("go_now").expect("spawn succeeds");
        let err = session.stop_and_save().expect_err("worker failure");
        assert!(matches!(err, RecorderError::StreamingTransferFailed(_)));
        assert!(!session.is_recording());
        assert!(!store.exists("go_now"));
    }
}
