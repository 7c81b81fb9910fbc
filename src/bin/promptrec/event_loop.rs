//! Key polling loop. One command per tick keeps navigation deterministic even
//! when keys arrive faster than the session can stop and restart capture.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};

use promptrec::app::{AppCommand, RecorderApp};

use crate::ui;

/// Poll cadence for the input loop.
const TICK: Duration = Duration::from_millis(16);

pub fn run(app: &mut RecorderApp) -> Result<()> {
    let mut dirty = true;
    loop {
        let mut command = None;
        if event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) => command = map_key(key),
                Event::Resize(_, _) => dirty = true,
                _ => {}
            }
        }

        if let Some(command) = command {
            if app.handle_command(command) {
                return Ok(());
            }
            dirty = true;
        }

        // Recording redraws every tick so the elapsed counter moves.
        if dirty || app.is_recording() {
            ui::draw(app)?;
            dirty = false;
        }

        std::thread::sleep(TICK);
    }
}

fn map_key(key: KeyEvent) -> Option<AppCommand> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char(' ') => Some(AppCommand::RecordNext),
        KeyCode::Char('r') => Some(AppCommand::Retry),
        KeyCode::Char('s') => Some(AppCommand::Stop),
        KeyCode::Char('p') => Some(AppCommand::PlayPrevious),
        KeyCode::Char('h') => Some(AppCommand::ToggleHelp),
        KeyCode::Char('q') => Some(AppCommand::Quit),
        KeyCode::Left => Some(AppCommand::Retreat),
        KeyCode::Right => Some(AppCommand::Advance),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn keys_map_to_their_commands() {
        assert_eq!(
            map_key(press(KeyCode::Char(' '))),
            Some(AppCommand::RecordNext)
        );
        assert_eq!(map_key(press(KeyCode::Char('r'))), Some(AppCommand::Retry));
        assert_eq!(map_key(press(KeyCode::Char('s'))), Some(AppCommand::Stop));
        assert_eq!(
            map_key(press(KeyCode::Char('p'))),
            Some(AppCommand::PlayPrevious)
        );
        assert_eq!(
            map_key(press(KeyCode::Char('h'))),
            Some(AppCommand::ToggleHelp)
        );
        assert_eq!(map_key(press(KeyCode::Char('q'))), Some(AppCommand::Quit));
        assert_eq!(map_key(press(KeyCode::Left)), Some(AppCommand::Retreat));
        assert_eq!(map_key(press(KeyCode::Right)), Some(AppCommand::Advance));
        assert_eq!(map_key(press(KeyCode::Char('x'))), None);
    }

    #[test]
    fn releases_are_ignored() {
        let mut key = press(KeyCode::Char(' '));
        key.kind = KeyEventKind::Release;
        assert_eq!(map_key(key), None);
    }
}
