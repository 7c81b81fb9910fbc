//! Committed-recording store: one durable WAV per destination name.

use std::path::{Path, PathBuf};

pub const RECORDING_EXT: &str = "wav";

#[derive(Debug, Clone)]
pub struct TakeStore {
    dir: PathBuf,
}

impl TakeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{RECORDING_EXT}"))
    }

    /// Whether a committed recording exists; drives skip-existing resume.
    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).is_file()
    }
}
