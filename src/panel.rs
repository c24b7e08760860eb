//! Chat panel: thin orchestration over the session manager, completion
//! client, transcript, and editor surface.
//!
//! All state is injected through the constructor and commands arrive
//! through one explicit dispatch table ([`PanelCommand`]) instead of
//! callback wiring. The only suspension point is the in-flight completion
//! request; concurrent sends are neither queued nor deduplicated, matching
//! the single-UI-thread model of the host.

use std::sync::Arc;

use crate::completion::CompletionClient;
use crate::editor::{EditorSurface, apply_action, detect_action};
use crate::session::SessionManager;
use crate::settings::{ChatSettings, ChatTheme, SettingsStore};
use crate::transcript::Transcript;

/// Panel triggers, keyed by what the host surface fired.
#[derive(Clone, Debug, PartialEq)]
pub enum PanelCommand {
    /// Input box submit.
    SendMessage(String),
    /// Session dropdown change.
    LoadSession(usize),
    /// Sidebar close (also fired by deactivate).
    SaveSession,
    /// "Clear sessions" action in the settings form.
    ClearSessions,
    /// Theme dropdown change in the settings form.
    SetTheme(ChatTheme),
}

/// Lifecycle hooks the host drives; replaces the original's view base-class
/// overrides.
pub trait PanelLifecycle {
    /// Panel opened: apply theme and show the greeting.
    fn activate(&mut self);
    /// Panel closing: fold the in-progress buffer into the saved sessions.
    fn deactivate(&mut self);
    /// Ordered display lines for the host view.
    fn render(&self) -> Vec<String>;
}

pub struct ChatPanel<E: EditorSurface> {
    transcript: Transcript,
    sessions: SessionManager,
    client: CompletionClient,
    editor: E,
}

impl<E: EditorSurface> ChatPanel<E> {
    pub fn new(store: Arc<dyn SettingsStore + Send + Sync>, editor: E) -> Self {
        let sessions = SessionManager::new(store);
        let client = CompletionClient::new(sessions.settings());
        Self {
            transcript: Transcript::new(),
            sessions,
            client,
            editor,
        }
    }

    /// Dispatch one panel command. Async because `SendMessage` awaits the
    /// completion request.
    pub async fn handle(&mut self, command: PanelCommand) {
        match command {
            PanelCommand::SendMessage(text) => self.send_message(&text).await,
            PanelCommand::LoadSession(index) => self.load_session(index),
            PanelCommand::SaveSession => self.sessions.save_current_session(),
            PanelCommand::ClearSessions => {
                self.sessions.clear_sessions();
                self.transcript.clear();
            }
            PanelCommand::SetTheme(theme) => {
                self.update_settings(|s| s.chat_theme = theme);
            }
        }
    }

    /// Mutate settings (theme, greeting, API key, …), persist, and rebuild
    /// the completion client so endpoint/key changes take effect on the
    /// next request.
    pub fn update_settings(&mut self, f: impl FnOnce(&mut ChatSettings)) {
        self.sessions.update_settings(f);
        self.client = CompletionClient::new(self.sessions.settings());
    }

    /// One user message, end to end: transcript entry, optional
    /// selected-text augmentation, the completion round-trip, then the
    /// editor action keyed off the original command text.
    async fn send_message(&mut self, message: &str) {
        let timestamped = self.sessions.settings().enable_timestamps;
        self.transcript.push_user(message, timestamped);

        let selection = self.editor.selection();
        let prompt = if selection.is_empty() {
            message.to_string()
        } else {
            format!("{message} [Selected Text: {selection}]")
        };

        match self.client.request_completion(&prompt).await {
            Ok(reply) => {
                self.transcript.push_assistant(&reply, timestamped);
                self.sessions.append_exchange(&prompt, &reply);
                if let Some(action) = detect_action(message) {
                    apply_action(action, &mut self.editor, &reply);
                }
            }
            Err(e) => {
                // Failure never mutates the document; it becomes a
                // transcript entry and nothing else.
                tracing::warn!("completion failed: {e}");
                self.transcript.push_error(&e.user_message());
            }
        }
    }

    /// Replay a saved session into the view. Out of range is a no-op.
    fn load_session(&mut self, index: usize) {
        let Some(lines) = self.sessions.load_session(index) else {
            return;
        };
        let lines = lines.to_vec();
        self.transcript.replay(&lines);
        let greeting = self.sessions.settings().default_greeting.clone();
        self.transcript.push_greeting(&greeting);
    }

    /// CSS class for the messages container.
    pub fn theme_class(&self) -> &'static str {
        self.sessions.settings().chat_theme.css_class()
    }

    /// Dropdown labels for the saved sessions.
    pub fn session_labels(&self) -> Vec<String> {
        self.sessions.session_labels()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut E {
        &mut self.editor
    }
}

impl<E: EditorSurface> PanelLifecycle for ChatPanel<E> {
    fn activate(&mut self) {
        let greeting = self.sessions.settings().default_greeting.clone();
        self.transcript.push_greeting(&greeting);
    }

    fn deactivate(&mut self) {
        self.sessions.save_current_session();
    }

    fn render(&self) -> Vec<String> {
        self.transcript.lines()
    }
}
