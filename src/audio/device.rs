//! CPAL input-device wrapper and the capture seam the worker streams through.
//!
//! Device selection happens at startup so a missing or incompatible
//! microphone fails fast; the stream itself is opened on the worker thread
//! because `cpal::Stream` must stay on the thread that built it.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use crossbeam_channel::Sender;
use tracing::debug;

use crate::audio::SAMPLE_RATE;
use crate::error::RecorderError;

/// Live stream handle. `stop` halts sample flow; dropping the handle releases
/// the platform line.
pub trait CaptureStream {
    fn stop(&mut self);
}

/// Seam between the capture worker and the hardware. The production
/// implementation wraps a CPAL device; tests substitute a synthetic source.
pub trait CaptureBackend: Send {
    /// Open the fixed-format stream and start sample flow into `frames`.
    /// The returned handle never leaves the calling thread.
    fn open_stream(
        &mut self,
        frames: Sender<Vec<i16>>,
    ) -> Result<Box<dyn CaptureStream>, RecorderError>;
}

/// The single physical input line this process records from.
pub struct InputDevice {
    device: cpal::Device,
}

impl InputDevice {
    /// Pick an input device able to deliver 16 kHz capture, optionally forced
    /// by name so the operator can choose between multiple microphones.
    pub fn new(preferred: Option<&str>) -> Result<Self, RecorderError> {
        let host = cpal::default_host();
        let device = match preferred {
            Some(name) => host
                .input_devices()
                .map_err(|err| RecorderError::DeviceUnavailable(err.to_string()))?
                .find(|d| d.name().map(|n| n == name).unwrap_or(false))
                .ok_or_else(|| {
                    RecorderError::DeviceUnavailable(format!("input device '{name}' not found"))
                })?,
            None => host.default_input_device().ok_or_else(|| {
                RecorderError::DeviceUnavailable("no default input device".to_string())
            })?,
        };
        // Validate the fixed format up front; startup aborts here rather than
        // mid-session.
        pick_config(&device)?;
        Ok(Self { device })
    }

    pub fn name(&self) -> String {
        self.device
            .name()
            .unwrap_or_else(|_| "unknown input device".to_string())
    }
}

impl CaptureBackend for InputDevice {
    fn open_stream(
        &mut self,
        frames: Sender<Vec<i16>>,
    ) -> Result<Box<dyn CaptureStream>, RecorderError> {
        let (config, format) = pick_config(&self.device)?;
        let channels = usize::from(config.channels.max(1));
        let err_fn = |err| debug!(%err, "audio stream error");

        let stream = match format {
            SampleFormat::I16 => self.device.build_input_stream(
                &config,
                move |data: &[i16], _| push_frame(&frames, data, channels, |s| s),
                err_fn,
                None,
            ),
            SampleFormat::F32 => self.device.build_input_stream(
                &config,
                move |data: &[f32], _| {
                    push_frame(&frames, data, channels, |s| {
                        (s.clamp(-1.0, 1.0) * 32_767.0) as i16
                    })
                },
                err_fn,
                None,
            ),
            SampleFormat::U16 => self.device.build_input_stream(
                &config,
                move |data: &[u16], _| {
                    push_frame(&frames, data, channels, |s| (i32::from(s) - 32_768) as i16)
                },
                err_fn,
                None,
            ),
            other => {
                return Err(RecorderError::StreamingTransferFailed(format!(
                    "unsupported sample format: {other:?}"
                )))
            }
        }
        .map_err(|err| RecorderError::StreamingTransferFailed(err.to_string()))?;

        stream
            .play()
            .map_err(|err| RecorderError::StreamingTransferFailed(err.to_string()))?;
        Ok(Box::new(CpalCaptureStream { stream }))
    }
}

struct CpalCaptureStream {
    stream: cpal::Stream,
}

impl CaptureStream for CpalCaptureStream {
    fn stop(&mut self) {
        if let Err(err) = self.stream.pause() {
            debug!(%err, "failed to pause input stream");
        }
    }
}

/// Downmix one callback buffer to mono i16 and queue it. A full queue drops
/// the frame rather than blocking the audio callback.
fn push_frame<T: Copy>(
    frames: &Sender<Vec<i16>>,
    data: &[T],
    channels: usize,
    convert: impl Fn(T) -> i16,
) {
    let channels = channels.max(1);
    let mut mono = Vec::with_capacity(data.len() / channels + 1);
    for group in data.chunks(channels) {
        let sum: i32 = group.iter().map(|&s| i32::from(convert(s))).sum();
        mono.push((sum / group.len() as i32) as i16);
    }
    let _ = frames.try_send(mono);
}

/// Find a supported config covering the fixed 16 kHz rate, preferring fewer
/// channels and native i16.
fn pick_config(device: &cpal::Device) -> Result<(StreamConfig, SampleFormat), RecorderError> {
    let ranges = device
        .supported_input_configs()
        .map_err(|err| RecorderError::DeviceUnavailable(err.to_string()))?;

    let mut best: Option<cpal::SupportedStreamConfigRange> = None;
    for range in ranges {
        if !matches!(
            range.sample_format(),
            SampleFormat::I16 | SampleFormat::F32 | SampleFormat::U16
        ) {
            continue;
        }
        if range.min_sample_rate().0 > SAMPLE_RATE || range.max_sample_rate().0 < SAMPLE_RATE {
            continue;
        }
        let better = match &best {
            None => true,
            Some(current) => {
                range.channels() < current.channels()
                    || (range.channels() == current.channels()
                        && range.sample_format() == SampleFormat::I16
                        && current.sample_format() != SampleFormat::I16)
            }
        };
        if better {
            best = Some(range);
        }
    }

    let range = best.ok_or_else(|| {
        RecorderError::DeviceUnavailable(format!("no input config supports {SAMPLE_RATE} Hz"))
    })?;
    let format = range.sample_format();
    let config = StreamConfig {
        channels: range.channels(),
        sample_rate: SampleRate(SAMPLE_RATE),
        buffer_size: cpal::BufferSize::Default,
    };
    Ok((config, format))
}

/// Microphone names for the `--list-input-devices` flag.
pub fn list_input_devices() -> Result<Vec<String>, RecorderError> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|err| RecorderError::DeviceUnavailable(err.to_string()))?;
    Ok(devices.filter_map(|d| d.name().ok()).collect())
}
