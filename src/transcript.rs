//! Transcript: the ordered chat history behind the panel view.
//!
//! Entries keep their full display text (`User: …` / `GPT: …`) plus the
//! role for styling and an optional `HH:MM` timestamp. Replaying a saved
//! session restores lines verbatim — saved lines already carry their
//! prefixes and are never re-timestamped.

use chrono::Local;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    Error,
}

impl Role {
    /// CSS class the host view puts on this entry's element.
    pub fn css_class(self) -> &'static str {
        match self {
            Role::User => "user-message",
            Role::Assistant => "gpt-message",
            Role::Error => "error-message",
        }
    }

    /// Infer the role of a replayed session line from its prefix.
    fn infer(line: &str) -> Role {
        if line.starts_with("User:") {
            Role::User
        } else if line.starts_with("Error:") {
            Role::Error
        } else {
            Role::Assistant
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TranscriptEntry {
    pub role: Role,
    /// Display text including the role prefix.
    pub text: String,
    /// `HH:MM`, present only when timestamps were enabled at push time.
    pub timestamp: Option<String>,
}

impl TranscriptEntry {
    /// The line as shown in the panel: `[HH:MM]User: …` or `User: …`.
    pub fn display_line(&self) -> String {
        match &self.timestamp {
            Some(ts) => format!("[{ts}]{}", self.text),
            None => self.text.clone(),
        }
    }
}

/// Local wall-clock `HH:MM`, the same resolution the original plugin used.
pub fn current_timestamp() -> String {
    Local::now().format("%H:%M").to_string()
}

#[derive(Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, message: &str, timestamped: bool) {
        self.push(Role::User, format!("User: {message}"), timestamped);
    }

    pub fn push_assistant(&mut self, message: &str, timestamped: bool) {
        self.push(Role::Assistant, format!("GPT: {message}"), timestamped);
    }

    /// Error entries are never timestamped; the text is already the full
    /// user-facing string from the failure taxonomy.
    pub fn push_error(&mut self, message: &str) {
        self.push(Role::Error, message.to_string(), false);
    }

    /// The greeting shown on open and after a session switch.
    pub fn push_greeting(&mut self, greeting: &str) {
        self.push(Role::Assistant, format!("GPT: {greeting}"), false);
    }

    fn push(&mut self, role: Role, text: String, timestamped: bool) {
        let timestamp = timestamped.then(current_timestamp);
        self.entries.push(TranscriptEntry { role, text, timestamp });
    }

    /// Clear the view and restore a saved session's lines verbatim.
    pub fn replay(&mut self, lines: &[String]) {
        self.entries.clear();
        for line in lines {
            self.entries.push(TranscriptEntry {
                role: Role::infer(line),
                text: line.clone(),
                timestamp: None,
            });
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Display lines in order, ready for the host view.
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(TranscriptEntry::display_line).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
