//! Review playback for committed takes.
//!
//! One take plays at a time; starting a new one or recording again cuts the
//! current sink. A missing recording is reported before any output device is
//! touched so the caller can surface it as a status line, not a crash.

use std::fs::File;
use std::io::BufReader;

use rodio::{Decoder, OutputStream, Sink};
use tracing::debug;

use crate::error::RecorderError;
use crate::store::TakeStore;

pub struct PlaybackController {
    store: TakeStore,
    current: Option<PlaybackHandle>,
}

struct PlaybackHandle {
    sink: Sink,
    // The output stream must outlive the sink or playback goes silent.
    _stream: OutputStream,
}

impl PlaybackController {
    pub fn new(store: TakeStore) -> Self {
        Self {
            store,
            current: None,
        }
    }

    /// Play the committed take for `name`, cutting whatever was playing.
    pub fn play(&mut self, name: &str) -> Result<(), RecorderError> {
        self.stop_current();

        let path = self.store.path_for(name);
        if !path.is_file() {
            return Err(RecorderError::PlaybackSourceMissing {
                name: name.to_string(),
            });
        }

        let file = File::open(&path)
            .map_err(|err| RecorderError::PlaybackFailed(format!("opening take: {err}")))?;
        let source = Decoder::new(BufReader::new(file))
            .map_err(|err| RecorderError::PlaybackFailed(format!("decoding take: {err}")))?;

        let (stream, handle) = OutputStream::try_default()
            .map_err(|err| RecorderError::PlaybackFailed(format!("output device: {err}")))?;
        let sink = Sink::try_new(&handle)
            .map_err(|err| RecorderError::PlaybackFailed(format!("output sink: {err}")))?;
        sink.append(source);
        debug!(take = name, "playback started");

        self.current = Some(PlaybackHandle {
            sink,
            _stream: stream,
        });
        Ok(())
    }

    /// Cut playback immediately. No-op when nothing is playing.
    pub fn stop_current(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.sink.stop();
            debug!("playback stopped");
        }
    }

    pub fn is_playing(&self) -> bool {
        self.current
            .as_ref()
            .map(|handle| !handle.sink.empty())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_take_errors_before_any_device_is_opened() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut playback = PlaybackController::new(TakeStore::new(dir.path()));
        let err = playback.play("go_now").expect_err("missing take");
        assert!(matches!(
            err,
            RecorderError::PlaybackSourceMissing { ref name } if name == "go_now"
        ));
        assert!(!playback.is_playing());
    }

    #[test]
    fn stop_when_idle_is_a_no_op() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut playback = PlaybackController::new(TakeStore::new(dir.path()));
        playback.stop_current();
        assert!(!playback.is_playing());
    }

    // Needs a real output device.
    #[test]
    #[ignore]
    fn plays_a_committed_take() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TakeStore::new(dir.path());
        let mut artifact =
            crate::audio::StagingArtifact::new(dir.path()).expect("staging artifact");
        artifact
            .write_samples(&vec![0i16; 1600])
            .expect("write samples");
        artifact.commit(&store.path_for("go_now")).expect("commit");

        let mut playback = PlaybackController::new(store);
        playback.play("go_now").expect("playback");
        assert!(playback.is_playing());
        playback.stop_current();
        assert!(!playback.is_playing());
    }
}
