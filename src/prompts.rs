//! Prompt-list loading and destination naming.
//!
//! The prompt source is a delimited text file: one record per line, the
//! phrase in the first column, header row skipped. A quoted first column is
//! honored so phrases may contain the delimiter.

use std::fs;
use std::path::Path;

use crate::error::RecorderError;

/// Immutable phrase text presented to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    text: String,
}

impl Prompt {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Name the committed artifact for this prompt: every whitespace
    /// character becomes an underscore.
    pub fn destination_name(&self) -> String {
        self.text
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect()
    }
}

/// Load the prompt column. Any parse problem is fatal at startup.
pub fn load_prompts(path: &Path) -> Result<Vec<Prompt>, RecorderError> {
    let raw = fs::read_to_string(path).map_err(|err| RecorderError::PromptSourceInvalid {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;

    let mut prompts = Vec::new();
    for (number, line) in raw.lines().enumerate() {
        if number == 0 {
            // Header row.
            continue;
        }
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        let phrase = first_field(line);
        if phrase.is_empty() {
            return Err(RecorderError::PromptSourceInvalid {
                path: path.to_path_buf(),
                reason: format!("empty phrase on line {}", number + 1),
            });
        }
        prompts.push(Prompt::new(phrase));
    }

    if prompts.is_empty() {
        return Err(RecorderError::PromptSourceInvalid {
            path: path.to_path_buf(),
            reason: "no prompt rows after the header".to_string(),
        });
    }
    Ok(prompts)
}

/// First comma-delimited field, honoring double-quote escaping.
fn first_field(line: &str) -> String {
    let Some(rest) = line.strip_prefix('"') else {
        return line.split(',').next().unwrap_or_default().to_string();
    };

    let mut field = String::new();
    let mut chars = rest.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '"' {
            if chars.peek() == Some(&'"') {
                chars.next();
                field.push('"');
            } else {
                break;
            }
        } else {
            field.push(c);
        }
    }
    field
}
