//! Cursor over the ordered prompt list.
//!
//! The cursor lives in the closed range `[-1, prompt_count]`. The sentinels
//! (`-1` before the first prompt, `prompt_count` past the last) are parking
//! positions: the cursor reports them but never moves beyond them.

use crate::prompts::Prompt;

/// Where a cursor move landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavTarget {
    /// Parked at `-1`, before the first prompt.
    BeforeStart,
    /// Parked at `prompt_count`, every prompt exhausted.
    Exhausted,
    /// A recordable prompt with its derived destination name.
    Prompt { text: String, destination: String },
}

pub struct SessionNavigator {
    prompts: Vec<Prompt>,
    cursor: isize,
}

impl SessionNavigator {
    pub fn new(prompts: Vec<Prompt>) -> Self {
        Self { prompts, cursor: -1 }
    }

    pub fn cursor(&self) -> isize {
        self.cursor
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.len()
    }

    /// Move one prompt forward, clamping at the past-last sentinel.
    pub fn advance(&mut self) -> NavTarget {
        self.cursor += 1;
        self.clamp_and_report()
    }

    /// Move one prompt back: step the cursor back two and re-apply the
    /// forward move, so boundary clamping stays identical to `advance`.
    pub fn retreat(&mut self) -> NavTarget {
        self.cursor -= 2;
        self.advance()
    }

    /// Prompt under the cursor, when the cursor is in range.
    pub fn current(&self) -> Option<&Prompt> {
        usize::try_from(self.cursor)
            .ok()
            .and_then(|idx| self.prompts.get(idx))
    }

    /// Prompt just behind the cursor: the most recently completed take.
    pub fn previous(&self) -> Option<&Prompt> {
        usize::try_from(self.cursor - 1)
            .ok()
            .and_then(|idx| self.prompts.get(idx))
    }

    /// Park the cursor one before the first prompt whose destination has no
    /// committed recording, so the next `advance` targets it. When every
    /// destination exists, the cursor lands past the final element.
    pub fn resume_from_existing(&mut self, exists: impl Fn(&str) -> bool) {
        self.cursor = match self
            .prompts
            .iter()
            .position(|prompt| !exists(&prompt.destination_name()))
        {
            Some(first_missing) => first_missing as isize - 1,
            None => self.prompts.len() as isize,
        };
    }

    fn clamp_and_report(&mut self) -> NavTarget {
        let count = self.prompts.len() as isize;
        if self.cursor >= count {
            self.cursor = count;
            return NavTarget::Exhausted;
        }
        if self.cursor <= -1 {
            self.cursor = -1;
            return NavTarget::BeforeStart;
        }
        let prompt = &self.prompts[self.cursor as usize];
        NavTarget::Prompt {
            text: prompt.text().to_string(),
            destination: prompt.destination_name(),
        }
    }
}
