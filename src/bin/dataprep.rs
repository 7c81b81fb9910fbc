//! Dataset preparation entrypoint: augment committed recordings with ffmpeg
//! and emit train/test manifests.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use promptrec::dataset::build_dataset;

#[derive(Debug, Parser)]
#[command(about = "Build train/test manifests from recorded prompts", author, version)]
struct DataprepConfig {
    /// Directory of committed recordings
    #[arg(value_name = "INPUT_DIR")]
    input_dir: PathBuf,

    /// Directory manifests and augmented audio are written to
    #[arg(long = "output-dir", default_value = ".")]
    output_dir: PathBuf,

    /// Regenerate augmented audio that already exists
    #[arg(short, long, default_value_t = false)]
    overwrite: bool,
}

fn main() -> Result<()> {
    let config = DataprepConfig::parse();

    if !config.input_dir.is_dir() {
        bail!(
            "input directory '{}' does not exist",
            config.input_dir.display()
        );
    }
    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "failed to create output directory '{}'",
            config.output_dir.display()
        )
    })?;

    build_dataset(&config.input_dir, &config.output_dir, config.overwrite)
}
