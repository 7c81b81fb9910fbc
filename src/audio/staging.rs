//! Transient capture sink for one take.
//!
//! Samples stream into a temp WAV created next to the committed store so a
//! commit is a same-filesystem rename. Exactly one of `commit` or `discard`
//! consumes the artifact; dropping it unlinks the temp file either way.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};
use tempfile::NamedTempFile;

use crate::audio::{BITS_PER_SAMPLE, CHANNELS, SAMPLE_RATE};
use crate::error::RecorderError;

fn wav_spec() -> WavSpec {
    WavSpec {
        channels: CHANNELS,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    }
}

pub struct StagingArtifact {
    file: NamedTempFile,
    writer: Option<WavWriter<BufWriter<File>>>,
}

impl StagingArtifact {
    pub fn new(dir: &Path) -> Result<Self, RecorderError> {
        let file = tempfile::Builder::new()
            .prefix(".take-")
            .suffix(".wav.part")
            .tempfile_in(dir)
            .map_err(|err| {
                RecorderError::StreamingTransferFailed(format!("staging file: {err}"))
            })?;
        let handle = file.reopen().map_err(|err| {
            RecorderError::StreamingTransferFailed(format!("staging file: {err}"))
        })?;
        let writer = WavWriter::new(BufWriter::new(handle), wav_spec()).map_err(|err| {
            RecorderError::StreamingTransferFailed(format!("staging writer: {err}"))
        })?;
        Ok(Self {
            file,
            writer: Some(writer),
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn write_samples(&mut self, samples: &[i16]) -> Result<(), RecorderError> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            RecorderError::StreamingTransferFailed("staging writer already finalized".to_string())
        })?;
        for &sample in samples {
            writer.write_sample(sample).map_err(|err| {
                RecorderError::StreamingTransferFailed(format!("writing samples: {err}"))
            })?;
        }
        Ok(())
    }

    /// Finalize the WAV header and move the file over `dest`, replacing any
    /// earlier take committed under the same name.
    pub fn commit(mut self, dest: &Path) -> Result<PathBuf, RecorderError> {
        if let Some(writer) = self.writer.take() {
            writer.finalize().map_err(|err| {
                RecorderError::StreamingTransferFailed(format!("finalizing take: {err}"))
            })?;
        }
        self.file.persist(dest).map_err(|err| {
            RecorderError::StreamingTransferFailed(format!("persisting committed take: {err}"))
        })?;
        Ok(dest.to_path_buf())
    }

    /// Destroy the staged take; the temp file unlinks on drop.
    pub fn discard(self) {}
}
