//! Capture pipeline: the exclusive input device, per-take staging artifacts,
//! and the worker thread that streams between them.
//!
//! The format is fixed for downstream speech-model compatibility and is not
//! exposed as configuration.

mod device;
mod staging;
#[cfg(test)]
pub(crate) mod testing;
mod worker;

/// Fixed capture rate.
pub const SAMPLE_RATE: u32 = 16_000;

/// Samples are signed 16-bit little-endian.
pub const BITS_PER_SAMPLE: u16 = 16;

/// Mono capture.
pub const CHANNELS: u16 = 1;

pub use device::{list_input_devices, CaptureBackend, CaptureStream, InputDevice};
pub use staging::StagingArtifact;
pub use worker::{CaptureWorker, SaveIntent, TakeOutcome};
