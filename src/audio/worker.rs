//! Per-take capture worker: one background thread streaming device samples
//! into a staging artifact until the session signals stop.
//!
//! The stop signal's payload is the final save-intent. The worker applies it
//! exactly once, after sample flow has halted and the queue has drained, so a
//! late discard can never race an in-flight commit.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{bounded, select, Receiver, Sender};
use tracing::debug;

use crate::audio::device::CaptureBackend;
use crate::audio::staging::StagingArtifact;
use crate::error::RecorderError;

/// Queue depth between the device callback and the worker's writer loop.
const FRAME_QUEUE_CAPACITY: usize = 128;

/// Final decision for a take, fixed by the control thread before the stop
/// signal is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveIntent {
    Save,
    Discard,
}

/// How a finished take ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TakeOutcome {
    /// Artifact committed under the destination path.
    Committed(PathBuf),
    /// Artifact destroyed without touching the store.
    Discarded,
}

/// Handle for the single in-flight capture worker. `stop` is the only exit:
/// it delivers the intent and joins the thread.
pub struct CaptureWorker {
    stop_tx: Sender<SaveIntent>,
    handle: JoinHandle<Result<TakeOutcome, RecorderError>>,
    started_at: Instant,
}

impl CaptureWorker {
    /// Spawn the take's worker bound to the shared device, a fresh staging
    /// artifact, and the destination a save commits to.
    pub fn spawn(
        backend: Arc<Mutex<dyn CaptureBackend>>,
        artifact: StagingArtifact,
        dest: PathBuf,
    ) -> Self {
        let (stop_tx, stop_rx) = bounded(1);
        let handle = thread::spawn(move || run_take(backend, artifact, dest, stop_rx));
        Self {
            stop_tx,
            handle,
            started_at: Instant::now(),
        }
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Deliver the final save-intent and block until the worker terminates
    /// and the device is released.
    pub fn stop(self, intent: SaveIntent) -> Result<TakeOutcome, RecorderError> {
        // Send only fails when the worker already exited; the join below
        // still surfaces its result.
        let _ = self.stop_tx.send(intent);
        match self.handle.join() {
            Ok(outcome) => outcome,
            Err(_) => Err(RecorderError::StreamingTransferFailed(
                "capture worker panicked".to_string(),
            )),
        }
    }
}

fn run_take(
    backend: Arc<Mutex<dyn CaptureBackend>>,
    mut artifact: StagingArtifact,
    dest: PathBuf,
    stop_rx: Receiver<SaveIntent>,
) -> Result<TakeOutcome, RecorderError> {
    // Exclusive hold on the device for the lifetime of the take.
    let mut device = match backend.lock() {
        Ok(guard) => guard,
        Err(_) => {
            artifact.discard();
            return Err(RecorderError::StreamingTransferFailed(
                "capture device lock poisoned".to_string(),
            ));
        }
    };

    let (frame_tx, frame_rx) = bounded(FRAME_QUEUE_CAPACITY);
    let mut stream = match device.open_stream(frame_tx) {
        Ok(stream) => stream,
        Err(err) => {
            artifact.discard();
            return Err(err);
        }
    };

    let intent = loop {
        select! {
            recv(frame_rx) -> frame => match frame {
                Ok(samples) => {
                    if let Err(err) = artifact.write_samples(&samples) {
                        stream.stop();
                        drop(stream);
                        artifact.discard();
                        // Keep the join point ordered: wait for the session's
                        // stop before reporting the failure.
                        let _ = stop_rx.recv();
                        return Err(err);
                    }
                }
                // Stream ended on its own; the session's stop signal still
                // decides the take.
                Err(_) => break stop_rx.recv().unwrap_or(SaveIntent::Discard),
            },
            recv(stop_rx) -> intent => break intent.unwrap_or(SaveIntent::Discard),
        }
    };

    // Halt sample flow, then drain whatever the callback already queued so
    // the artifact holds the full transfer before the intent is applied.
    stream.stop();
    drop(stream);
    for samples in frame_rx.try_iter() {
        if let Err(err) = artifact.write_samples(&samples) {
            artifact.discard();
            return Err(err);
        }
    }
    drop(device);

    match intent {
        SaveIntent::Save => {
            let committed = artifact.commit(&dest)?;
            debug!(take = %committed.display(), "take committed");
            Ok(TakeOutcome::Committed(committed))
        }
        SaveIntent::Discard => {
            artifact.discard();
            debug!(take = %dest.display(), "take discarded");
            Ok(TakeOutcome::Discarded)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::FakeBackend;
    use std::time::Duration;

    fn worker_fixture(
        dir: &std::path::Path,
        dest_name: &str,
    ) -> (CaptureWorker, Arc<std::sync::atomic::AtomicUsize>) {
        let backend = FakeBackend::new();
        let streams = backend.open_streams.clone();
        let backend: Arc<Mutex<dyn CaptureBackend>> = Arc::new(Mutex::new(backend));
        let artifact = StagingArtifact::new(dir).expect("staging artifact");
        let worker = CaptureWorker::spawn(backend, artifact, dir.join(dest_name));
        (worker, streams)
    }

    #[test]
    fn save_intent_commits_the_drained_transfer() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (worker, streams) = worker_fixture(dir.path(), "go_now.wav");
        std::thread::sleep(Duration::from_millis(25));

        let outcome = worker.stop(SaveIntent::Save).expect("worker outcome");
        let TakeOutcome::Committed(path) = outcome else {
            panic!("expected a committed take, got {outcome:?}");
        };
        let reader = hound::WavReader::open(&path).expect("committed wav");
        assert!(reader.len() > 0, "committed take should hold samples");
        assert_eq!(streams.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn discard_intent_destroys_the_artifact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (worker, streams) = worker_fixture(dir.path(), "go_now.wav");
        std::thread::sleep(Duration::from_millis(10));

        let outcome = worker.stop(SaveIntent::Discard).expect("worker outcome");
        assert_eq!(outcome, TakeOutcome::Discarded);
        assert_eq!(std::fs::read_dir(dir.path()).expect("read dir").count(), 0);
        assert_eq!(streams.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn immediate_stop_still_commits_an_empty_take() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (worker, _streams) = worker_fixture(dir.path(), "go_now.wav");

        let outcome = worker.stop(SaveIntent::Save).expect("worker outcome");
        assert!(matches!(outcome, TakeOutcome::Committed(_)));
    }

    #[test]
    fn failed_stream_open_discards_and_surfaces_the_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = FakeBackend::failing();
        let backend: Arc<Mutex<dyn CaptureBackend>> = Arc::new(Mutex::new(backend));
        let artifact = StagingArtifact::new(dir.path()).expect("staging artifact");
        let worker = CaptureWorker::spawn(backend, artifact, dir.path().join("go_now.wav"));

        let err = worker.stop(SaveIntent::Save).expect_err("open failure");
        assert!(matches!(err, RecorderError::StreamingTransferFailed(_)));
        assert_eq!(std::fs::read_dir(dir.path()).expect("read dir").count(), 0);
    }
}
