//! Typed failures for the recording pipeline.
//!
//! The split matters operationally: `DeviceUnavailable` and
//! `PromptSourceInvalid` abort startup, the rest are reported as status text
//! and leave the session idle.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecorderError {
    /// No input device supports the fixed capture format, or the platform
    /// refused to hand one over.
    #[error("no usable audio input device: {0}")]
    DeviceUnavailable(String),

    /// The streaming transfer into the staging artifact failed. The take is
    /// discarded and the session returns to idle.
    #[error("streaming capture transfer failed: {0}")]
    StreamingTransferFailed(String),

    /// Playback was requested for a name with no committed recording.
    #[error("no committed recording named '{name}'")]
    PlaybackSourceMissing { name: String },

    /// The platform playback path broke after the source was found.
    #[error("playback failed: {0}")]
    PlaybackFailed(String),

    /// The prompt file could not be read or held no usable rows.
    #[error("invalid prompt source '{}': {reason}", path.display())]
    PromptSourceInvalid { path: PathBuf, reason: String },
}
