//! Screen rendering: centered status line, keymap hint, and the recording
//! banner with its elapsed counter.

use std::io::{self, Write};
use std::time::Instant;

use anyhow::Result;
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor,
        SetForegroundColor},
    terminal::{size, Clear, ClearType},
};

use promptrec::app::RecorderApp;

const FULL_KEYMAP: [&str; 8] = [
    "q             - Quit",
    "<space>       - Save and continue",
    "h             - Toggle this text",
    "r             - Retry",
    "p             - Play last recording",
    "s             - Stop recording",
    "<left arrow>  - Previous phrase",
    "<right arrow> - Next phrase",
];

const KEYMAP_HINT: &str = "q - Quit, <space> - Save and continue, h - Toggle full keymap text";

pub fn draw(app: &RecorderApp) -> Result<()> {
    let (cols, rows) = size()?;
    let mut stdout = io::stdout();
    queue!(stdout, Clear(ClearType::All))?;

    if app.show_full_keymap() {
        for (offset, line) in FULL_KEYMAP.iter().enumerate() {
            queue!(stdout, MoveTo(0, 1 + offset as u16), Print(line))?;
        }
    } else {
        queue!(stdout, MoveTo(0, rows.saturating_sub(1)), Print(KEYMAP_HINT))?;
    }

    let status = app.status();
    let col = (cols / 2).saturating_sub(status.chars().count() as u16 / 2);
    queue!(stdout, MoveTo(col, rows / 2), Print(status))?;

    if app.is_recording() {
        draw_recording_banner(&mut stdout, cols, app.recording_since())?;
    }

    stdout.flush()?;
    Ok(())
}

fn draw_recording_banner(
    stdout: &mut impl Write,
    cols: u16,
    since: Option<Instant>,
) -> Result<()> {
    queue!(
        stdout,
        MoveTo(0, 0),
        SetBackgroundColor(Color::Red),
        SetForegroundColor(Color::Black),
        SetAttribute(Attribute::SlowBlink),
        Print("Recording"),
        SetAttribute(Attribute::Reset),
        ResetColor,
    )?;

    if let Some(since) = since {
        let elapsed = since.elapsed();
        let time = format!("{}.{}s", elapsed.as_secs(), elapsed.subsec_millis() / 100);
        let col = cols.saturating_sub(time.chars().count() as u16);
        queue!(stdout, MoveTo(col, 0), Print(time))?;
    }
    Ok(())
}
