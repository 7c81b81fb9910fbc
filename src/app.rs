//! Command dispatch tying the navigator, the recording session, and playback
//! together. The terminal loop translates keys into [`AppCommand`] values and
//! reads back a status line plus the recording flag for redraws.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use tracing::{debug, warn};

use crate::audio::CaptureBackend;
use crate::error::RecorderError;
use crate::navigator::{NavTarget, SessionNavigator};
use crate::playback::PlaybackController;
use crate::session::RecordingSession;
use crate::store::TakeStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Save the in-flight take, if any, and record the next prompt.
    RecordNext,
    /// Throw away the in-flight take and re-record the same prompt.
    Retry,
    /// Stop recording or playback without saving anything.
    Stop,
    /// Play back the most recently completed take.
    PlayPrevious,
    Advance,
    Retreat,
    ToggleHelp,
    Quit,
}

pub struct RecorderApp {
    navigator: SessionNavigator,
    session: RecordingSession,
    playback: PlaybackController,
    status: String,
    show_full_keymap: bool,
}

impl RecorderApp {
    pub fn new(
        navigator: SessionNavigator,
        backend: Arc<Mutex<dyn CaptureBackend>>,
        store: TakeStore,
    ) -> Self {
        Self {
            navigator,
            session: RecordingSession::new(backend, store.clone()),
            playback: PlaybackController::new(store),
            status: "Press space to start".to_string(),
            show_full_keymap: false,
        }
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn show_full_keymap(&self) -> bool {
        self.show_full_keymap
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_recording()
    }

    pub fn recording_since(&self) -> Option<Instant> {
        self.session.recording_since()
    }

    pub fn navigator(&self) -> &SessionNavigator {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut SessionNavigator {
        &mut self.navigator
    }

    /// Apply one command. Returns true when the loop should exit.
    pub fn handle_command(&mut self, command: AppCommand) -> bool {
        debug!(?command, cursor = self.navigator.cursor(), "command");
        match command {
            AppCommand::RecordNext => self.record_next(),
            AppCommand::Retry => self.retry(),
            AppCommand::Stop => self.stop(),
            AppCommand::PlayPrevious => self.play_previous(),
            AppCommand::Advance => {
                self.discard_in_flight();
                let target = self.navigator.advance();
                self.apply_target(target);
            }
            AppCommand::Retreat => {
                self.discard_in_flight();
                let target = self.navigator.retreat();
                self.apply_target(target);
            }
            AppCommand::ToggleHelp => self.show_full_keymap = !self.show_full_keymap,
            AppCommand::Quit => return true,
        }
        false
    }

    /// Release the device and cut playback on the way out. In-flight audio is
    /// discarded: only an explicit save commits.
    pub fn shutdown(&mut self) {
        self.discard_in_flight();
        self.playback.stop_current();
    }

    fn record_next(&mut self) {
        let target = self.navigator.advance();
        self.apply_target(target);
    }

    fn apply_target(&mut self, target: NavTarget) {
        match target {
            NavTarget::Prompt { text, destination } => {
                self.playback.stop_current();
                match self.session.start(&destination) {
                    Ok(()) => self.status = text,
                    Err(err) => self.report_failure(err),
                }
            }
            NavTarget::Exhausted => {
                self.status = "You have reached the end!".to_string();
                self.finish_in_flight();
            }
            NavTarget::BeforeStart => {
                self.status = "You are at the beginning".to_string();
                self.finish_in_flight();
            }
        }
    }

    fn retry(&mut self) {
        match self.session.retry() {
            Ok(true) => {}
            Ok(false) => {
                // Idle retry re-records the prompt under the cursor when one
                // is there, matching what the operator sees on screen.
                let target = self.navigator.current().map(|prompt| NavTarget::Prompt {
                    text: prompt.text().to_string(),
                    destination: prompt.destination_name(),
                });
                match target {
                    Some(target) => self.apply_target(target),
                    None => self.status = "Nothing to retry".to_string(),
                }
            }
            Err(err) => self.report_failure(err),
        }
    }

    fn stop(&mut self) {
        self.playback.stop_current();
        self.status = "Stopped".to_string();
        self.discard_in_flight();
    }

    fn play_previous(&mut self) {
        let Some(name) = self
            .navigator
            .previous()
            .map(|prompt| prompt.destination_name())
        else {
            self.status = "No previous recordings".to_string();
            return;
        };
        match self.playback.play(&name) {
            Ok(()) => self.status = "Playing...".to_string(),
            Err(RecorderError::PlaybackSourceMissing { name }) => {
                self.status = format!("No recording for {name}");
            }
            Err(err) => self.report_failure(err),
        }
    }

    fn finish_in_flight(&mut self) {
        if let Err(err) = self.session.stop_and_save() {
            self.report_failure(err);
        }
    }

    fn discard_in_flight(&mut self) {
        if let Err(err) = self.session.stop_and_discard() {
            self.report_failure(err);
        }
    }

    fn report_failure(&mut self, err: RecorderError) {
        warn!(%err, "capture failure");
        self.status = format!("Capture failed: {err}");
    }
}
