//! Prompt recorder entrypoint.
//!
//! Walks an ordered prompt list, recording one fixed-format WAV per prompt.
//! The terminal runs raw on the alternate screen; a single worker thread
//! streams capture while the main loop polls keys at a steady tick.

mod event_loop;
mod ui;

use std::fs;
use std::io;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;

use promptrec::app::RecorderApp;
use promptrec::audio::{list_input_devices, CaptureBackend, InputDevice};
use promptrec::config::AppConfig;
use promptrec::init_tracing;
use promptrec::navigator::SessionNavigator;
use promptrec::prompts::load_prompts;
use promptrec::store::TakeStore;
use promptrec::terminal_restore::TerminalRestoreGuard;

fn main() -> Result<()> {
    let mut config = AppConfig::parse();

    if config.list_input_devices {
        print_input_devices();
        return Ok(());
    }

    config.validate()?;
    init_tracing(&config);

    let prompts_path = config
        .prompts
        .as_ref()
        .context("a prompt file is required")?;
    let prompts = load_prompts(prompts_path)?;

    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "failed to create output directory '{}'",
            config.output_dir.display()
        )
    })?;
    let store = TakeStore::new(&config.output_dir);

    let device = InputDevice::new(config.input_device.as_deref())?;
    tracing::debug!(device = %device.name(), "input device acquired");
    let backend: Arc<Mutex<dyn CaptureBackend>> = Arc::new(Mutex::new(device));

    let mut navigator = SessionNavigator::new(prompts);
    if config.skip_existing {
        navigator.resume_from_existing(|name| store.exists(name));
    }

    let mut app = RecorderApp::new(navigator, backend, store);

    let guard = TerminalRestoreGuard::new();
    guard.enable_raw_mode()?;
    guard.enter_alt_screen(&mut io::stdout())?;

    let result = event_loop::run(&mut app);

    app.shutdown();
    guard.restore();
    result
}

fn print_input_devices() {
    match list_input_devices() {
        Ok(devices) if devices.is_empty() => println!("No audio input devices detected"),
        Ok(devices) => {
            println!("Detected audio input devices:");
            for device in devices {
                println!("  {device}");
            }
        }
        Err(err) => println!("Failed to list audio input devices: {err}"),
    }
}
