//! Command-line parsing and validation.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;

/// CLI options for the prompt recorder. Validated values keep the session
/// from starting against a prompt file or output directory that cannot work.
#[derive(Debug, Parser, Clone)]
#[command(about = "Prompted audio-capture sessions for speech datasets", author, version)]
pub struct AppConfig {
    /// CSV file of prompts to record, one phrase per row
    #[arg(value_name = "PROMPTS", required_unless_present = "list_input_devices")]
    pub prompts: Option<PathBuf>,

    /// Directory committed recordings are written to
    #[arg(long = "output-dir", default_value = ".")]
    pub output_dir: PathBuf,

    /// Start from the first prompt without a committed recording
    #[arg(long = "skip-existing", default_value_t = false)]
    pub skip_existing: bool,

    /// Preferred audio input device name
    #[arg(long)]
    pub input_device: Option<String>,

    /// Print detected audio input devices and exit
    #[arg(long = "list-input-devices", default_value_t = false)]
    pub list_input_devices: bool,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "PROMPTREC_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "PROMPTREC_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,
}

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values and normalize paths.
    pub fn validate(&mut self) -> Result<()> {
        if let Some(prompts) = &mut self.prompts {
            if !prompts.is_file() {
                bail!("prompt file '{}' does not exist", prompts.display());
            }
            *prompts = prompts
                .canonicalize()
                .with_context(|| format!("failed to canonicalize '{}'", prompts.display()))?;
        }

        if let Some(device) = &self.input_device {
            if device.trim().is_empty() {
                bail!("--input-device cannot be empty");
            }
        }

        if self.output_dir.as_os_str().is_empty() {
            bail!("--output-dir cannot be empty");
        }
        if self.output_dir.exists() && !self.output_dir.is_dir() {
            bail!(
                "--output-dir '{}' exists but is not a directory",
                self.output_dir.display()
            );
        }

        Ok(())
    }
}
