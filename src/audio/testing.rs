//! Synthetic capture source so worker and session behavior can be exercised
//! without audio hardware.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Sender, TrySendError};

use super::device::{CaptureBackend, CaptureStream};
use crate::error::RecorderError;

/// Fake device that pumps silence frames from a helper thread. Opening a
/// second stream while one is live panics the test, which is exactly the
/// double-acquisition the session must never allow.
pub(crate) struct FakeBackend {
    pub(crate) open_streams: Arc<AtomicUsize>,
    fail_open: bool,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self {
            open_streams: Arc::new(AtomicUsize::new(0)),
            fail_open: false,
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            open_streams: Arc::new(AtomicUsize::new(0)),
            fail_open: true,
        }
    }
}

impl CaptureBackend for FakeBackend {
    fn open_stream(
        &mut self,
        frames: Sender<Vec<i16>>,
    ) -> Result<Box<dyn CaptureStream>, RecorderError> {
        if self.fail_open {
            return Err(RecorderError::StreamingTransferFailed(
                "fake stream refused to open".to_string(),
            ));
        }
        let prior = self.open_streams.fetch_add(1, Ordering::SeqCst);
        assert_eq!(prior, 0, "second capture stream opened while one was live");

        let running = Arc::new(AtomicBool::new(true));
        let pump_running = running.clone();
        let pump = thread::spawn(move || {
            while pump_running.load(Ordering::SeqCst) {
                match frames.try_send(vec![0i16; 160]) {
                    Ok(()) | Err(TrySendError::Full(_)) => {}
                    Err(TrySendError::Disconnected(_)) => break,
                }
                thread::sleep(Duration::from_millis(2));
            }
        });

        Ok(Box::new(FakeStream {
            running,
            open_streams: self.open_streams.clone(),
            pump: Some(pump),
        }))
    }
}

struct FakeStream {
    running: Arc<AtomicBool>,
    open_streams: Arc<AtomicUsize>,
    pump: Option<JoinHandle<()>>,
}

impl CaptureStream for FakeStream {
    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(pump) = self.pump.take() {
            let _ = pump.join();
        }
    }
}

impl Drop for FakeStream {
    fn drop(&mut self) {
        self.stop();
        self.open_streams.fetch_sub(1, Ordering::SeqCst);
    }
}
